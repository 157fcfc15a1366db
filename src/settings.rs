//! # Settings Module
//!
//! ## Purpose
//! Tuning of the extraction procedures kept in a JSON file: segmentation fractions of the IV
//! curve fit, reference conditions of the De Soto fit, tolerances of the nonlinear solver and
//! the log level of the binary.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "vlim": 0.2,
//!   "ilim": 0.1,
//!   "temp_ref": 25.0,
//!   "irrad_ref": 1000.0,
//!   "solver": { "xtol": 1.49012e-8, "ftol": 1.49012e-8, "max_fev": 1200 },
//!   "log_level": "info"
//! }
//! ```
//! Missing keys take their default values. When no file is found the defaults are used.
//!
//! ## Usage
//! ```rust
//! use PVfit::settings::ExtractionSettings;
//! let settings = ExtractionSettings::load_or_default(None).unwrap();
//! let options = settings.sandia_options();
//! assert_eq!(options.vlim, settings.vlim);
//! ```
use crate::IVtools::sde_sandia::SandiaOptions;
use crate::Numerics::{LMSettings, NalgebraBackend};
use log::{LevelFilter, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "pvfit_config.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// fraction of v_oc bounding the initial linear region
    pub vlim: f64,
    /// fraction of i_sc selecting the exponential region
    pub ilim: f64,
    /// reference temperature of the De Soto fit [C]
    pub temp_ref: f64,
    /// reference irradiance of the De Soto fit [W/m2]
    pub irrad_ref: f64,
    pub solver: LMSettings,
    /// "off", "error", "warn", "info", "debug" or "trace"
    pub log_level: String,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            vlim: 0.2,
            ilim: 0.1,
            temp_ref: 25.0,
            irrad_ref: 1000.0,
            solver: LMSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ExtractionSettings {
    /// Reads and validates settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let settings: ExtractionSettings = serde_json::from_str(&contents)?;
        settings.validate()?;
        info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    /// Settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when `path` is `None`.
    /// A missing file gives the defaults; a malformed one is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in [("vlim", self.vlim), ("ilim", self.ilim)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(SettingsError::Invalid(format!(
                    "{} must lie in (0, 1), got {}",
                    name, value
                )));
            }
        }
        if !self.temp_ref.is_finite() || !self.irrad_ref.is_finite() {
            return Err(SettingsError::Invalid(
                "reference conditions must be finite".to_string(),
            ));
        }
        if !(self.solver.xtol > 0.0 && self.solver.ftol > 0.0) {
            return Err(SettingsError::Invalid(
                "solver tolerances must be positive".to_string(),
            ));
        }
        if self.solver.max_fev == 0 {
            return Err(SettingsError::Invalid(
                "solver max_fev must be positive".to_string(),
            ));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, SettingsError> {
        LevelFilter::from_str(self.log_level.trim()).map_err(|_| {
            SettingsError::Invalid(format!("unknown log level '{}'", self.log_level))
        })
    }

    pub fn sandia_options(&self) -> SandiaOptions {
        SandiaOptions {
            vlim: self.vlim,
            ilim: self.ilim,
            ..SandiaOptions::default()
        }
    }

    pub fn backend(&self) -> NalgebraBackend {
        NalgebraBackend::with_lm_settings(self.solver)
    }
}
