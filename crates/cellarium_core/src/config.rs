//! Configuration structures mapping to `config.toml`.
//!
//! Defaults are hardcoded in the `Default` impls and overridden by the
//! config file when present. Runtime API inputs (density, interval) are
//! clamped at the call site; this module rejects out-of-range values in the
//! file itself so a bad `config.toml` fails fast at startup.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [grid]
//! width = 100
//! height = 100
//! cell_size = 5
//!
//! [simulation]
//! update_interval = 0.1
//! density = 0.3
//!
//! [render]
//! alive_color = "#FFFFFF"
//! dead_color = "#000000"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! ```

use serde::{Deserialize, Serialize};

/// Lower bound for the background loop's update interval, in seconds.
pub const MIN_UPDATE_INTERVAL: f64 = 0.01;
/// Upper bound for the background loop's update interval, in seconds.
pub const MAX_UPDATE_INTERVAL: f64 = 2.0;

/// Grid dimensions and the rendering cell multiplier.
///
/// `cell_size` is a rendering hint only: each logical cell is expanded to
/// `cell_size × cell_size` pixels by the render crate. Engine logic never
/// reads it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GridConfig {
    pub width: u16,
    pub height: u16,
    pub cell_size: u16,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            cell_size: 5,
        }
    }
}

/// Background loop and initialization parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SimulationConfig {
    /// Seconds between steps while the loop runs.
    pub update_interval: f64,
    /// Default live-cell density for random initialization.
    pub density: f64,
    /// Seed for reproducible random initialization.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            update_interval: 0.1,
            density: 0.3,
            seed: None,
        }
    }
}

/// Colors and export parameters for the rendering collaborator.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RenderConfig {
    /// `#RRGGBB` color for alive cells.
    pub alive_color: String,
    /// `#RRGGBB` color for dead cells.
    pub dead_color: String,
    /// Directory exported animations are written to.
    pub output_dir: String,
    /// Filename prefix for exported animations.
    pub filename_prefix: String,
    /// Frames per second for exported animations.
    pub fps: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            alive_color: "#FFFFFF".to_string(),
            dead_color: "#000000".to_string(),
            output_dir: "./output".to_string(),
            filename_prefix: "cellarium".to_string(),
            fps: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a
    /// description of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.grid.width > 0, "Grid width must be positive");
        anyhow::ensure!(self.grid.width <= 1000, "Grid width too large (max 1000)");
        anyhow::ensure!(self.grid.height > 0, "Grid height must be positive");
        anyhow::ensure!(
            self.grid.height <= 1000,
            "Grid height too large (max 1000)"
        );
        anyhow::ensure!(self.grid.cell_size > 0, "Cell size must be positive");
        anyhow::ensure!(
            self.grid.cell_size <= 20,
            "Cell size too large (max 20 pixels)"
        );

        anyhow::ensure!(
            (MIN_UPDATE_INTERVAL..=MAX_UPDATE_INTERVAL).contains(&self.simulation.update_interval),
            "Update interval must be in [{}, {}] seconds",
            MIN_UPDATE_INTERVAL,
            MAX_UPDATE_INTERVAL
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.simulation.density),
            "Density must be in [0.0, 1.0]"
        );

        for (label, color) in [
            ("Alive color", &self.render.alive_color),
            ("Dead color", &self.render.dead_color),
        ] {
            anyhow::ensure!(
                color.starts_with('#') && color.len() == 7,
                "{} must be a #RRGGBB hex string",
                label
            );
        }
        anyhow::ensure!(self.render.fps > 0, "FPS must be positive");
        anyhow::ensure!(self.render.fps <= 60, "FPS too high (max 60)");
        anyhow::ensure!(
            !self.render.output_dir.is_empty(),
            "Output directory must not be empty"
        );

        anyhow::ensure!(!self.server.host.is_empty(), "Server host must not be empty");
        anyhow::ensure!(self.server.port > 0, "Server port must be positive");

        Ok(())
    }

    /// Loads and validates configuration from TOML content.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_grid_width() {
        let config = AppConfig {
            grid: GridConfig {
                width: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_cell_size() {
        let config = AppConfig {
            grid: GridConfig {
                cell_size: 21,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_out_of_bounds() {
        let config = AppConfig {
            simulation: SimulationConfig {
                update_interval: 5.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_color() {
        let config = AppConfig {
            render: RenderConfig {
                alive_color: "white".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial_file_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [grid]
            width = 64
            height = 48
            cell_size = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.width, 64);
        assert_eq!(config.simulation.update_interval, 0.1);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_from_toml_rejects_invalid_values() {
        let result = AppConfig::from_toml(
            r#"
            [simulation]
            update_interval = 0.001
            "#,
        );
        assert!(result.is_err());
    }
}
