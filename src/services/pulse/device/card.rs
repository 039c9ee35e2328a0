use serde::Serialize;

/// A named hardware configuration of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardProfile {
    /// Profile name, e.g. `output:analog-stereo`
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Number of sinks this profile creates
    pub n_sinks: u32,
    /// Number of sources this profile creates
    pub n_sources: u32,
    /// Ordering hint, higher is preferred
    pub priority: u32,
    /// Whether the profile can currently be activated
    pub available: bool,
}

impl CardProfile {
    /// Create an available profile with no devices
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            n_sinks: 0,
            n_sources: 0,
            priority: 0,
            available: true,
        }
    }
}

/// Card information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardInfo {
    /// Card index
    pub index: u32,
    /// Card name
    pub name: String,
    /// Driver name
    pub driver: String,
    /// Profiles in server order
    pub profiles: Vec<CardProfile>,
    /// Index into `profiles` of the active profile
    pub active_profile: Option<usize>,
}

impl CardInfo {
    /// Create a card with no profiles
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            driver: String::new(),
            profiles: Vec::new(),
            active_profile: None,
        }
    }

    /// Currently active profile
    pub fn active_profile(&self) -> Option<&CardProfile> {
        self.active_profile.and_then(|i| self.profiles.get(i))
    }

    /// Position of a profile by exact name
    pub fn profile_position(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name == name)
    }
}
