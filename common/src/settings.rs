use crate::consts::{GRAVITY, MAX_SOLDIERS, MAX_VELOCITY, TICK_RATE};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use tracing::{error, warn};

/// Tunables that change how a world simulates. Loaded from a RON file so a
/// server operator can tweak them without recompiling; every field falls
/// back to its default when missing from the file.
///
/// `gravity` and `max_velocity` feed straight into the engine, so two peers
/// simulating the same soldier must agree on them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Downward acceleration in map units per tick squared.
    pub gravity: f32,
    /// Per-axis speed limit in map units per tick.
    pub max_velocity: f32,
    /// Upper bound on render frames per second. The tick rate is fixed;
    /// this only throttles how often the outer loop spins.
    pub fps_cap: u32,
    pub max_players: usize,
    pub server_name: String,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_velocity: MAX_VELOCITY,
            fps_cap: TICK_RATE * 2,
            max_players: MAX_SOLDIERS,
            server_name: "jetfall server".to_owned(),
        }
    }
}

impl SimSettings {
    /// Loads settings from `path`, falling back to defaults when the file
    /// is missing or malformed. A missing file is written out with the
    /// defaults so the operator has something to edit.
    pub fn load(path: &Path) -> Self {
        match fs::File::open(path) {
            Ok(file) => match ron::de::from_reader(file) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(?path, "failed to parse settings file, using defaults: {}", e);
                    Self::default()
                },
            },
            Err(_) => {
                let default_settings = Self::default();
                if let Err(e) = default_settings.save_to_file(path) {
                    error!(?path, "failed to create default settings file: {}", e);
                }
                default_settings
            },
        }
    }

    pub fn save_to_file(&self, path: &Path) -> io::Result<()> {
        let s = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ron_roundtrip_preserves_settings() {
        let settings = SimSettings {
            gravity: 0.03,
            max_velocity: 8.0,
            fps_cap: 144,
            max_players: 6,
            server_name: "roundtrip".to_owned(),
        };
        let text = ron::ser::to_string(&settings).unwrap();
        let back: SimSettings = ron::de::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: SimSettings = ron::de::from_str("(gravity: 0.12)").unwrap();
        assert_eq!(parsed.gravity, 0.12);
        assert_eq!(parsed.max_velocity, SimSettings::default().max_velocity);
        assert_eq!(parsed.server_name, SimSettings::default().server_name);
    }
}
