// ─────────────────────────────────────────────────────────────────────
// SCPN MT3D — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{
    DEFAULT_AIR_LAYERS, DEFAULT_AIR_MAX_HEIGHT, DEFAULT_AIR_MIN_TOP_DZ, SIGMA_AIR,
};
use crate::error::{MtError, MtResult};
use crate::grid::Grid3D;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How stored model values relate to conductivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParamType {
    /// Values are conductivity (S/m).
    Linear,
    /// Values are ln(conductivity).
    #[default]
    Loge,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Linear => write!(f, "LINEAR"),
            ParamType::Loge => write!(f, "LOGE"),
        }
    }
}

/// Air-layer generation above the earth model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AirLayersConfig {
    /// Interface heights log-spaced from `min_top_dz` to `max_height`.
    FixedHeight {
        n_layers: usize,
        min_top_dz: f64,
        max_height: f64,
    },
    /// Geometric growth from the top earth layer thickness.
    Mirror { n_layers: usize, factor: f64 },
    /// Thicknesses given top-down.
    Explicit { dz: Vec<f64> },
}

impl Default for AirLayersConfig {
    fn default() -> Self {
        AirLayersConfig::FixedHeight {
            n_layers: DEFAULT_AIR_LAYERS,
            min_top_dz: DEFAULT_AIR_MIN_TOP_DZ,
            max_height: DEFAULT_AIR_MAX_HEIGHT,
        }
    }
}

impl AirLayersConfig {
    /// Air thicknesses ordered top-down, ready to prepend to the earth `dz`.
    pub fn thicknesses(&self, top_earth_dz: f64) -> MtResult<Vec<f64>> {
        match *self {
            AirLayersConfig::FixedHeight {
                n_layers,
                min_top_dz,
                max_height,
            } => {
                if n_layers == 0 {
                    return Ok(Vec::new());
                }
                if !(min_top_dz.is_finite() && max_height.is_finite())
                    || min_top_dz <= 0.0
                    || max_height <= min_top_dz
                {
                    return Err(MtError::Config(format!(
                        "air_layers: need 0 < min_top_dz < max_height, got {min_top_dz} and {max_height}"
                    )));
                }
                if n_layers == 1 {
                    return Ok(vec![max_height]);
                }
                let z0 = min_top_dz.log10();
                let step = (max_height.log10() - z0) / (n_layers - 1) as f64;
                // heights of the interfaces above the surface, bottom-up
                let heights: Vec<f64> = (0..n_layers)
                    .map(|i| 10f64.powf(z0 + step * i as f64))
                    .collect();
                let mut dz: Vec<f64> = heights
                    .iter()
                    .enumerate()
                    .map(|(i, &h)| if i == 0 { h } else { h - heights[i - 1] })
                    .collect();
                dz.reverse();
                Ok(dz)
            }
            AirLayersConfig::Mirror { n_layers, factor } => {
                if !factor.is_finite() || factor < 1.0 {
                    return Err(MtError::Config(format!(
                        "air_layers.factor must be finite and >= 1, got {factor}"
                    )));
                }
                let mut dz: Vec<f64> = (1..=n_layers)
                    .map(|i| top_earth_dz * factor.powf(i as f64))
                    .collect();
                dz.reverse();
                Ok(dz)
            }
            AirLayersConfig::Explicit { ref dz } => Ok(dz.clone()),
        }
    }
}

/// Mesh definition: horizontal widths, earth layers, air layer recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
    pub dz_earth: Vec<f64>,
    #[serde(default)]
    pub air_layers: AirLayersConfig,
}

impl GridConfig {
    pub fn from_file(path: &str) -> MtResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> MtResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Build the grid, stacking generated air layers on top of `dz_earth`.
    pub fn create_grid(&self) -> MtResult<Grid3D> {
        let top = self
            .dz_earth
            .first()
            .copied()
            .ok_or_else(|| MtError::Config("dz_earth must not be empty".to_string()))?;
        let air = self.air_layers.thicknesses(top)?;
        let nz_air = air.len();
        let dz = air.into_iter().chain(self.dz_earth.iter().copied()).collect();
        Grid3D::new(self.dx.clone(), self.dy.clone(), dz, nz_air)
    }
}

/// Starting model description, in physical units (S/m).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub param_type: ParamType,
    #[serde(default = "default_air_conductivity")]
    pub air_conductivity: f64,
    pub background_conductivity: f64,
}

fn default_air_conductivity() -> f64 {
    SIGMA_AIR
}

impl ModelConfig {
    pub fn from_json_str(json: &str) -> MtResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MtResult<()> {
        for (name, v) in [
            ("air_conductivity", self.air_conductivity),
            ("background_conductivity", self.background_conductivity),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(MtError::Config(format!(
                    "model.{name} must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Stored (air, earth) values in this config's parameterization.
    pub fn stored_values(&self) -> (f64, f64) {
        match self.param_type {
            ParamType::Linear => (self.air_conductivity, self.background_conductivity),
            ParamType::Loge => (
                self.air_conductivity.ln(),
                self.background_conductivity.ln(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID_JSON: &str = r#"{
        "dx": [500.0, 500.0, 500.0, 500.0],
        "dy": [500.0, 500.0, 500.0],
        "dz_earth": [50.0, 100.0, 200.0],
        "air_layers": { "method": "fixed_height", "n_layers": 5, "min_top_dz": 10.0, "max_height": 100000.0 }
    }"#;

    #[test]
    fn test_grid_config_creates_grid() {
        let cfg = GridConfig::from_json_str(GRID_JSON).unwrap();
        let grid = cfg.create_grid().unwrap();
        assert_eq!(grid.nz_air(), 5);
        assert_eq!(grid.nz_earth(), 3);
        assert_eq!(grid.cell_shape(), [4, 3, 8]);
        let air_total: f64 = grid.dz().iter().take(5).sum();
        assert!((air_total - 100000.0).abs() < 1e-6);
        // layer touching the surface is the thinnest
        assert!((grid.dz()[4] - 10.0).abs() < 1e-9);
        assert!(grid.dz()[0] > grid.dz()[1]);
    }

    #[test]
    fn test_air_layers_default_when_omitted() {
        let json = r#"{ "dx": [1.0], "dy": [1.0], "dz_earth": [1.0] }"#;
        let cfg = GridConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.air_layers, AirLayersConfig::default());
        let grid = cfg.create_grid().unwrap();
        assert_eq!(grid.nz_air(), DEFAULT_AIR_LAYERS);
    }

    #[test]
    fn test_mirror_air_layers_grow_upwards() {
        let layers = AirLayersConfig::Mirror {
            n_layers: 3,
            factor: 2.0,
        };
        let dz = layers.thicknesses(10.0).unwrap();
        assert_eq!(dz, vec![80.0, 40.0, 20.0]);
    }

    #[test]
    fn test_mirror_air_layers_follow_factor_powers() {
        let layers = AirLayersConfig::Mirror {
            n_layers: 40,
            factor: 1.5,
        };
        let dz = layers.thicknesses(4.0).unwrap();
        assert_eq!(dz.len(), 40);
        for (k, &h) in dz.iter().rev().enumerate() {
            let expected = 4.0 * 1.5f64.powf((k + 1) as f64);
            assert!((h - expected).abs() <= 1e-12 * expected, "layer {k}: {h} vs {expected}");
        }
    }

    #[test]
    fn test_explicit_air_layers_roundtrip() {
        let json = r#"{ "method": "explicit", "dz": [300.0, 30.0] }"#;
        let layers: AirLayersConfig = serde_json::from_str(json).unwrap();
        assert_eq!(layers.thicknesses(1.0).unwrap(), vec![300.0, 30.0]);
        let back = serde_json::to_string(&layers).unwrap();
        assert!(back.contains("\"method\":\"explicit\""));
    }

    #[test]
    fn test_rejects_bad_air_layers() {
        let bad = AirLayersConfig::FixedHeight {
            n_layers: 4,
            min_top_dz: 100.0,
            max_height: 10.0,
        };
        assert!(matches!(bad.thicknesses(1.0), Err(MtError::Config(_))));
        let cfg = GridConfig {
            dx: vec![1.0],
            dy: vec![1.0],
            dz_earth: vec![],
            air_layers: AirLayersConfig::default(),
        };
        assert!(matches!(cfg.create_grid(), Err(MtError::Config(_))));
    }

    #[test]
    fn test_model_config_loge_values() {
        let cfg = ModelConfig::from_json_str(r#"{ "background_conductivity": 0.01 }"#).unwrap();
        assert_eq!(cfg.param_type, ParamType::Loge);
        let (air, earth) = cfg.stored_values();
        assert!((air - SIGMA_AIR.ln()).abs() < 1e-12);
        assert!((earth - 0.01f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_model_config_rejects_nonpositive() {
        let err = ModelConfig::from_json_str(
            r#"{ "param_type": "LINEAR", "background_conductivity": -1.0 }"#,
        )
        .unwrap_err();
        match err {
            MtError::Config(msg) => assert!(msg.contains("background_conductivity")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }
}
