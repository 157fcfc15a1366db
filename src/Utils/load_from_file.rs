//! JSON task files for the binary.
//!
//! IV curve task:
//! ```json
//! { "voltage": [0.0, 1.0], "current": [8.0, 0.0], "v_oc": 1.0, "i_sc": 8.0, "v_mp_i_mp": [0.8, 7.0] }
//! ```
//! Datasheet task:
//! ```json
//! { "celltype": "monoSi", "v_mp": 31.0, "i_mp": 7.61, "v_oc": 37.9, "i_sc": 8.09,
//!   "alpha_sc": 0.004, "beta_voc": -0.127, "cells_in_series": 60, "temp_ref": 25.0 }
//! ```
//! Landmarks of the curve and the reference conditions are optional.
use crate::IVtools::iv_types::{DatasheetSpecs, IVCurve};
use crate::IVtools::ivtools_errors::ExtractionError;
use crate::IVtools::sde_sandia::SandiaOptions;
use log::info;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File '{0}' does not exist")]
    NotFound(String),
    #[error("Failed to open file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// IV curve with optional landmarks
#[derive(Debug, Clone, Deserialize)]
pub struct CurveTask {
    pub voltage: Vec<f64>,
    pub current: Vec<f64>,
    #[serde(default)]
    pub v_oc: Option<f64>,
    #[serde(default)]
    pub i_sc: Option<f64>,
    #[serde(default)]
    pub v_mp_i_mp: Option<(f64, f64)>,
}

impl CurveTask {
    pub fn curve(&self) -> Result<IVCurve, ExtractionError> {
        IVCurve::new(self.voltage.clone(), self.current.clone())
    }

    /// landmarks of the task with the given segmentation fractions
    pub fn options(&self, vlim: f64, ilim: f64) -> SandiaOptions {
        SandiaOptions {
            v_oc: self.v_oc,
            i_sc: self.i_sc,
            v_mp_i_mp: self.v_mp_i_mp,
            vlim,
            ilim,
        }
    }
}

/// Datasheet values with cell type and optional reference conditions
#[derive(Debug, Clone, Deserialize)]
pub struct DatasheetTask {
    pub celltype: String,
    #[serde(flatten)]
    pub specs: DatasheetSpecs,
    #[serde(default)]
    pub temp_ref: Option<f64>,
    #[serde(default)]
    pub irrad_ref: Option<f64>,
}

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }

    pub fn load_curve(&self) -> Result<CurveTask, LoadError> {
        load_json(&self.file_name)
    }

    pub fn load_datasheet(&self) -> Result<DatasheetTask, LoadError> {
        load_json(&self.file_name)
    }
}

pub fn load_json<T: DeserializeOwned>(file_name: &str) -> Result<T, LoadError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(LoadError::NotFound(file_name.to_string()));
    }
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: file_name.to_string(),
        source,
    })?;
    let parsed = serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
        path: file_name.to_string(),
        source,
    })?;
    info!("loaded task file '{}'", file_name);
    Ok(parsed)
}
