// crates/solstice-engine/src/config.rs
//
// Engine configuration: emission parameters and fee caps.
// Loaded from a TOML file or populated with sensible defaults.
//
// The creation-time and edit-time fee caps are deliberately independent;
// the observed source behavior differs between the two paths and the
// asymmetry is preserved as configuration rather than silently unified.

use serde::Deserialize;
use std::fs;

/// Runtime configuration for one engine deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Emission rate during the deployment year, in motes per second.
    #[serde(default = "default_emission_year1")]
    pub emission_year1: u64,

    /// Emission rate during the first full year, in motes per second.
    /// Halves at each subsequent calendar-year boundary.
    #[serde(default = "default_emission_base")]
    pub emission_base: u64,

    /// Number of halvings after which emission is permanently zero.
    #[serde(default = "default_max_halvings")]
    pub max_halvings: u32,

    /// Maximum deposit fee accepted when a pool is created, in basis points.
    #[serde(default = "default_creation_fee_cap_bps")]
    pub creation_fee_cap_bps: u16,

    /// Maximum deposit fee accepted when an existing pool's fee is edited,
    /// in basis points.
    #[serde(default = "default_edit_fee_cap_bps")]
    pub edit_fee_cap_bps: u16,
}

fn default_emission_year1() -> u64 {
    // 10 SLX per second.
    10_000_000_000
}

fn default_emission_base() -> u64 {
    // 5 SLX per second; halving from year 1 keeps year-over-year rates
    // in a strict /2 progression.
    5_000_000_000
}

fn default_max_halvings() -> u32 {
    30
}

fn default_creation_fee_cap_bps() -> u16 {
    5_000
}

fn default_edit_fee_cap_bps() -> u16 {
    2_500
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            emission_year1: default_emission_year1(),
            emission_base: default_emission_base(),
            max_halvings: default_max_halvings(),
            creation_fee_cap_bps: default_creation_fee_cap_bps(),
            edit_fee_cap_bps: default_edit_fee_cap_bps(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.emission_year1, 10_000_000_000);
        assert_eq!(config.emission_base, 5_000_000_000);
        assert_eq!(config.max_halvings, 30);
        assert_eq!(config.creation_fee_cap_bps, 5_000);
        assert_eq!(config.edit_fee_cap_bps, 2_500);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: EngineConfig = toml::from_str("emission_year1 = 42\n").unwrap();
        assert_eq!(config.emission_year1, 42);
        assert_eq!(config.emission_base, default_emission_base());
        assert_eq!(config.edit_fee_cap_bps, default_edit_fee_cap_bps());
    }
}
