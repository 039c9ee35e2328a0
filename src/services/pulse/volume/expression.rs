use std::{fmt, str::FromStr};

use tracing::warn;

use super::{VOLUME_NORM, Volume, VolumeError};

/// Level a silent channel is treated as before `*` and `/` are applied,
/// so relative changes on a zeroed channel still move it.
const ZERO_BOOTSTRAP: f64 = 10.0;

/// Arithmetic applied by a volume change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeOperator {
    /// Absolute set (no operator character)
    Set,
    /// Linear increase (`+`)
    Increase,
    /// Linear decrease (`-`)
    Decrease,
    /// Multiplicative increase (`*`)
    Multiply,
    /// Multiplicative decrease (`/`)
    Divide,
}

impl VolumeOperator {
    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Self::Increase),
            '-' => Some(Self::Decrease),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::Set => "",
            Self::Increase => "+",
            Self::Decrease => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

/// A parsed numeric volume change such as `+5%` or `*2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeChange {
    /// Operator to apply
    pub operator: VolumeOperator,
    /// Non-negative magnitude
    pub magnitude: f64,
    /// Whether the magnitude carried a trailing `%`
    pub percentage: bool,
}

impl VolumeChange {
    /// Compute the new level of a single channel currently at `level`
    ///
    /// Set, increase, multiply and divide are capped at `VOLUME_NORM`.
    /// A decrease only stops at zero, so a channel amplified above
    /// `VOLUME_NORM` is lowered from its actual level. Fractional results
    /// are truncated toward zero, and a percentage decrease removes whole
    /// volume units only.
    pub fn apply(&self, level: u32) -> u32 {
        let norm = f64::from(VOLUME_NORM);
        let current = f64::from(level);
        let n = self.magnitude;

        let target = match (self.operator, self.percentage) {
            (VolumeOperator::Set, false) => n,
            (VolumeOperator::Set, true) => n / 100.0 * norm,
            (VolumeOperator::Increase, false) => current + n,
            (VolumeOperator::Increase, true) => current + n / 100.0 * norm,
            (VolumeOperator::Decrease, percentage) => {
                let step = if percentage { (n / 100.0 * norm).trunc() } else { n };
                current - step
            }
            (VolumeOperator::Multiply, percentage) => {
                let current = bootstrap(current);
                if percentage {
                    current * n / 100.0
                } else {
                    current * n
                }
            }
            (VolumeOperator::Divide, percentage) => {
                let current = bootstrap(current);
                let n = if n == 0.0 { 1.0 } else { n };
                if percentage {
                    current / n * 100.0
                } else {
                    current / n
                }
            }
        };

        let ceiling = match self.operator {
            VolumeOperator::Decrease => current,
            _ => norm,
        };
        target.clamp(0.0, ceiling) as u32
    }

    /// Apply the change to the selected channels of `volume`
    ///
    /// With `channels` set to `None` every channel is changed. Indices
    /// outside the volume's channel count are logged, skipped and
    /// returned so the caller can report them.
    pub fn apply_to_channels(&self, volume: &mut Volume, channels: Option<&[usize]>) -> Vec<usize> {
        let Some(selected) = channels else {
            for channel in 0..volume.channels() {
                if let Some(level) = volume.channel(channel) {
                    volume.set_channel(channel, self.apply(level));
                }
            }
            return Vec::new();
        };

        let mut skipped = Vec::new();
        for &channel in selected {
            match volume.channel(channel) {
                Some(level) => {
                    volume.set_channel(channel, self.apply(level));
                }
                None => {
                    warn!(
                        channel,
                        channels = volume.channels(),
                        "Skipping channel outside of the device's channel count"
                    );
                    skipped.push(channel);
                }
            }
        }
        skipped
    }
}

impl fmt::Display for VolumeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.symbol(), self.magnitude)?;
        if self.percentage {
            write!(f, "%")?;
        }
        Ok(())
    }
}

fn bootstrap(level: f64) -> f64 {
    if level == 0.0 { ZERO_BOOTSTRAP } else { level }
}

/// A textual volume directive
///
/// Either a numeric [`VolumeChange`] or one of the `mute` / `unmute`
/// keywords, which only ever touch the mute flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeDirective {
    /// Change channel levels
    Change(VolumeChange),
    /// Set the mute flag
    Mute(bool),
}

impl VolumeDirective {
    /// Parse a directive such as `50%`, `+1000`, `*2`, `/10%` or `mute`
    ///
    /// # Errors
    /// Returns `VolumeError::InvalidFormat` if the text matches no form
    pub fn parse(text: &str) -> Result<Self, VolumeError> {
        let trimmed = text.trim();
        let invalid = || VolumeError::InvalidFormat(text.to_string());

        if trimmed.eq_ignore_ascii_case("mute") {
            return Ok(Self::Mute(true));
        }
        if trimmed.eq_ignore_ascii_case("unmute") {
            return Ok(Self::Mute(false));
        }

        let mut chars = trimmed.chars();
        let (operator, rest) = match chars.next().and_then(VolumeOperator::from_symbol) {
            Some(operator) => (operator, chars.as_str()),
            None => (VolumeOperator::Set, trimmed),
        };

        let (number, percentage) = match rest.strip_suffix('%') {
            Some(number) => (number, true),
            None => (rest, false),
        };

        if !is_plain_decimal(number) {
            return Err(invalid());
        }
        let magnitude: f64 = number.parse().map_err(|_| invalid())?;

        Ok(Self::Change(VolumeChange {
            operator,
            magnitude,
            percentage,
        }))
    }

    /// Numeric change carried by this directive, if any
    pub fn change(&self) -> Option<&VolumeChange> {
        match self {
            Self::Change(change) => Some(change),
            Self::Mute(_) => None,
        }
    }

    /// Mute flag requested by this directive, if any
    pub fn mute(&self) -> Option<bool> {
        match self {
            Self::Mute(muted) => Some(*muted),
            Self::Change(_) => None,
        }
    }
}

impl FromStr for VolumeDirective {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VolumeDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Change(change) => change.fmt(f),
            Self::Mute(true) => write!(f, "mute"),
            Self::Mute(false) => write!(f, "unmute"),
        }
    }
}

/// Digits with at most one decimal point, and at least one digit
fn is_plain_decimal(text: &str) -> bool {
    let mut digits = 0;
    let mut points = 0;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}
