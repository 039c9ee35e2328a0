use serde::Serialize;

/// Reference "0 dB" level (`PA_VOLUME_NORM`), the ceiling used by every
/// volume directive
pub const VOLUME_NORM: u32 = 0x10000;

/// Multi-channel volume in raw PulseAudio units
///
/// One level per channel. The channel count is fixed when the volume is
/// created from a server snapshot. Levels above [`VOLUME_NORM`] are kept
/// as reported, since the server allows amplification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Volume {
    levels: Vec<u32>,
}

impl Volume {
    /// Create a volume from per-channel levels
    pub fn new(levels: Vec<u32>) -> Self {
        Self { levels }
    }

    /// Create a volume with the same level on every channel
    pub fn uniform(level: u32, channels: usize) -> Self {
        Self::new(vec![level; channels])
    }

    /// Get level for a specific channel
    pub fn channel(&self, channel: usize) -> Option<u32> {
        self.levels.get(channel).copied()
    }

    /// Set level for a specific channel
    ///
    /// Returns true if channel exists, false otherwise.
    pub fn set_channel(&mut self, channel: usize, level: u32) -> bool {
        if let Some(slot) = self.levels.get_mut(channel) {
            *slot = level;
            true
        } else {
            false
        }
    }

    /// Get number of channels
    pub fn channels(&self) -> usize {
        self.levels.len()
    }

    /// Get all channel levels
    pub fn as_slice(&self) -> &[u32] {
        &self.levels
    }

    /// Get average level across all channels
    pub fn average(&self) -> u32 {
        if self.levels.is_empty() {
            return 0;
        }
        let sum: u64 = self.levels.iter().map(|&level| u64::from(level)).sum();
        (sum / self.levels.len() as u64) as u32
    }

    /// Get every channel as a percentage of [`VOLUME_NORM`]
    pub fn to_percentage(&self) -> Vec<f64> {
        self.levels.iter().map(|&level| percentage(level)).collect()
    }

    /// Check if every channel is silent
    pub fn is_silent(&self) -> bool {
        self.levels.iter().all(|&level| level == 0)
    }
}

/// Express a raw level as a percentage of [`VOLUME_NORM`]
pub fn percentage(level: u32) -> f64 {
    f64::from(level) / f64::from(VOLUME_NORM) * 100.0
}
