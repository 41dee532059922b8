// ─────────────────────────────────────────────────────────────────────
// SCPN MT3D — Model Parameter
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Conductivity model: earth-cell values, a frozen air value, and the
//! parameterization they are stored in.

use crate::field::same_grid;
use mt_types::config::{ModelConfig, ParamType};
use mt_types::error::{MtError, MtResult};
use mt_types::grid::Grid3D;
use ndarray::{Array3, ArrayViewMut3, Zip};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ModelParam {
    grid: Option<Arc<Grid3D>>,
    param_type: ParamType,
    cell_value: Array3<f64>,
    air_value: f64,
    zero_valued: bool,
}

fn earth_dim(grid: &Grid3D) -> (usize, usize, usize) {
    let [nx, ny, nz] = grid.earth_shape();
    (nx, ny, nz)
}

impl ModelParam {
    /// Wrap earth-cell values of shape `(nx, ny, nz_earth)`.
    pub fn new(
        grid: Arc<Grid3D>,
        param_type: ParamType,
        cell_value: Array3<f64>,
        air_value: f64,
    ) -> MtResult<Self> {
        let expected = grid.earth_shape();
        if cell_value.shape() != expected {
            let s = cell_value.shape();
            return Err(MtError::ShapeMismatch {
                expected,
                found: [s[0], s[1], s[2]],
            });
        }
        Ok(ModelParam {
            grid: Some(grid),
            param_type,
            cell_value,
            air_value,
            zero_valued: false,
        })
    }

    /// Homogeneous half-space; `value` and `air_value` are stored values.
    pub fn uniform(grid: Arc<Grid3D>, param_type: ParamType, value: f64, air_value: f64) -> Self {
        let cell_value = Array3::from_elem(earth_dim(&grid), value);
        ModelParam {
            grid: Some(grid),
            param_type,
            cell_value,
            air_value,
            zero_valued: false,
        }
    }

    /// Zero perturbation on `grid`.
    pub fn zeros(grid: Arc<Grid3D>, param_type: ParamType) -> Self {
        let cell_value = Array3::zeros(earth_dim(&grid));
        ModelParam {
            grid: Some(grid),
            param_type,
            cell_value,
            air_value: 0.0,
            zero_valued: true,
        }
    }

    pub fn unallocated(param_type: ParamType) -> Self {
        ModelParam {
            grid: None,
            param_type,
            cell_value: Array3::zeros((0, 0, 0)),
            air_value: 0.0,
            zero_valued: true,
        }
    }

    pub fn from_config(grid: Arc<Grid3D>, config: &ModelConfig) -> MtResult<Self> {
        config.validate()?;
        let (air, earth) = config.stored_values();
        Ok(Self::uniform(grid, config.param_type, earth, air))
    }

    pub fn grid(&self) -> Option<&Arc<Grid3D>> {
        self.grid.as_ref()
    }

    pub fn is_allocated(&self) -> bool {
        self.grid.is_some()
    }

    pub fn require_grid(&self, operation: &str) -> MtResult<&Arc<Grid3D>> {
        self.grid.as_ref().ok_or_else(|| {
            MtError::InvalidState(format!("{operation}: model parameter is not allocated"))
        })
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn air_value(&self) -> f64 {
        self.air_value
    }

    pub fn is_zero_valued(&self) -> bool {
        self.zero_valued
    }

    pub fn cell_value(&self) -> &Array3<f64> {
        &self.cell_value
    }

    /// Mutable earth values; the parameter is no longer treated as zero.
    pub fn cell_value_mut(&mut self) -> ArrayViewMut3<'_, f64> {
        self.zero_valued = false;
        self.cell_value.view_mut()
    }

    /// Air conductivity in S/m.
    pub fn air_conductivity(&self) -> f64 {
        match self.param_type {
            ParamType::Linear => self.air_value,
            ParamType::Loge => self.air_value.exp(),
        }
    }

    /// Earth conductivity in S/m.
    pub fn to_conductivity(&self) -> MtResult<Array3<f64>> {
        self.require_grid("ModelParam::to_conductivity")?;
        Ok(match self.param_type {
            ParamType::Linear => self.cell_value.clone(),
            ParamType::Loge => self.cell_value.mapv(f64::exp),
        })
    }

    /// Reuse this container for `grid`, reallocating when the grid or the
    /// earth shape differs. Values are zeroed either way.
    pub fn ensure_allocated(&mut self, grid: &Arc<Grid3D>) {
        let reusable = match &self.grid {
            Some(g) => same_grid(g, grid) && self.cell_value.shape() == grid.earth_shape(),
            None => false,
        };
        if reusable {
            self.cell_value.fill(0.0);
            self.air_value = 0.0;
            self.zero_valued = true;
        } else {
            *self = ModelParam::zeros(Arc::clone(grid), self.param_type);
        }
    }

    pub fn zero(&mut self) {
        self.cell_value.fill(0.0);
        self.air_value = 0.0;
        self.zero_valued = true;
    }

    /// Scale earth values; the air value is left alone.
    pub fn scale(&mut self, a: f64) {
        self.cell_value.mapv_inplace(|v| a * v);
        if a == 0.0 {
            self.zero_valued = true;
        }
    }

    fn check_compatible(&self, other: &ModelParam, operation: &str) -> MtResult<Arc<Grid3D>> {
        let g1 = self.require_grid(operation)?;
        let g2 = other.require_grid(operation)?;
        if !same_grid(g1, g2) {
            return Err(MtError::GridMismatch(format!(
                "{operation}: model parameters live on different grids"
            )));
        }
        if self.param_type != other.param_type {
            return Err(MtError::InvalidState(format!(
                "{operation}: parameterizations differ ({} vs {})",
                self.param_type, other.param_type
            )));
        }
        Ok(Arc::clone(g1))
    }

    /// `a * m1 + b * m2` over earth cells; air follows `m1`.
    pub fn lin_comb(a: f64, m1: &ModelParam, b: f64, m2: &ModelParam) -> MtResult<ModelParam> {
        let grid = m1.check_compatible(m2, "ModelParam::lin_comb")?;
        let mut cell_value = Array3::zeros(earth_dim(&grid));
        Zip::from(&mut cell_value)
            .and(&m1.cell_value)
            .and(&m2.cell_value)
            .for_each(|out, &u, &v| *out = a * u + b * v);
        let zero_valued = (a == 0.0 || m1.zero_valued) && (b == 0.0 || m2.zero_valued);
        Ok(ModelParam {
            grid: Some(grid),
            param_type: m1.param_type,
            cell_value,
            air_value: m1.air_value,
            zero_valued,
        })
    }

    /// Unweighted inner product over earth cells.
    pub fn dot(&self, other: &ModelParam) -> MtResult<f64> {
        self.check_compatible(other, "ModelParam::dot")?;
        Ok((&self.cell_value * &other.cell_value).sum())
    }

    /// Convert stored values to another parameterization in place.
    pub fn set_param_type(&mut self, param_type: ParamType) -> MtResult<()> {
        if self.param_type == param_type {
            return Ok(());
        }
        match param_type {
            ParamType::Linear => {
                self.cell_value.mapv_inplace(f64::exp);
                self.air_value = self.air_value.exp();
            }
            ParamType::Loge => {
                if self.air_value <= 0.0 || self.cell_value.iter().any(|&v| v <= 0.0) {
                    return Err(MtError::Config(
                        "cannot take the log of a non-positive conductivity".to_string(),
                    ));
                }
                self.cell_value.mapv_inplace(f64::ln);
                self.air_value = self.air_value.ln();
            }
        }
        self.param_type = param_type;
        Ok(())
    }
}
