// ─────────────────────────────────────────────────────────────────────
// SCPN MT3D — Parameter to Grid Mapping
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Model parameter → grid conductivity, nonlinear and linearized.
//!
//! With cell conductivity `s` (air layers filled in):
//!   edges: E = D_E^{-1} · P · D_C · s      (P = cell_to_edge)
//!   nodes: N = D_N^{-1} · Q · D_C · s      (Q = cell_to_node)
//! where D_C, D_E, D_N are the diagonal cell, edge and node volumes.
//!
//! Nonlinear mode fills `s` with conductivity. Linearized mode about a
//! LOGE background `m0` fills earth cells with `dm · exp(m0)` and the air
//! with exact zeros.

use crate::field::{same_grid, EdgeField, GridLocation, ScalarField};
use crate::model::ModelParam;
use mt_math::averaging::{cell_to_edge_into, cell_to_node};
use mt_types::config::ParamType;
use mt_types::error::{MtError, MtResult};
use mt_types::grid::Grid3D;
use ndarray::{s, Array3, Zip};
use std::sync::Arc;

/// Which form of the parameter → conductivity map to apply.
#[derive(Debug, Clone, Copy)]
pub enum MapMode<'a> {
    /// Full map: stored values → conductivity.
    Nonlinear,
    /// First-order map of a perturbation about `background`.
    Linearized { background: &'a ModelParam },
}

impl MapMode<'_> {
    pub fn is_linearized(&self) -> bool {
        matches!(self, MapMode::Linearized { .. })
    }
}

/// Cell-resident conductivity (or its perturbation) over the full grid.
pub(crate) fn cell_conductivity(
    m: &ModelParam,
    mode: MapMode<'_>,
    operation: &'static str,
) -> MtResult<(Arc<Grid3D>, Array3<f64>)> {
    let grid = Arc::clone(m.require_grid(operation)?);
    let [nx, ny, nz] = grid.cell_shape();
    let [_, _, nz_earth] = grid.earth_shape();

    let (earth, air) = match mode {
        MapMode::Nonlinear => match m.param_type() {
            ParamType::Loge => (m.cell_value().mapv(f64::exp), m.air_value().exp()),
            ParamType::Linear => (m.cell_value().clone(), m.air_value()),
        },
        MapMode::Linearized { background } => {
            if m.param_type() == ParamType::Linear {
                return Err(MtError::UnsupportedParameterization {
                    operation,
                    param_type: ParamType::Linear,
                });
            }
            let bg_grid = background.require_grid(operation)?;
            if !same_grid(&grid, bg_grid) {
                return Err(MtError::GridMismatch(format!(
                    "{operation}: perturbation and background live on different grids"
                )));
            }
            if background.param_type() != ParamType::Loge {
                return Err(MtError::InvalidState(format!(
                    "{operation}: background must be LOGE, got {}",
                    background.param_type()
                )));
            }
            let earth = if m.is_zero_valued() {
                Array3::zeros((nx, ny, nz_earth))
            } else {
                Zip::from(m.cell_value())
                    .and(background.cell_value())
                    .map_collect(|&dm, &m0| dm * m0.exp())
            };
            (earth, 0.0)
        }
    };

    let mut cells = Array3::from_elem((nx, ny, nz), air);
    cells
        .slice_mut(s![.., .., grid.nz_air()..])
        .assign(&earth);
    Ok((grid, cells))
}

/// Cell conductivity including the air layers.
pub fn map_to_cell(m: &ModelParam) -> MtResult<ScalarField> {
    let mut out = ScalarField::unallocated(GridLocation::Center);
    map_to_cell_into(m, &mut out)?;
    Ok(out)
}

pub fn map_to_cell_into(m: &ModelParam, out: &mut ScalarField) -> MtResult<()> {
    let (grid, cells) = cell_conductivity(m, MapMode::Nonlinear, "map_to_cell")?;
    out.location = GridLocation::Center;
    out.ensure_allocated(&grid);
    out.v.assign(&cells);
    tracing::trace!(nx = grid.nx(), ny = grid.ny(), nz = grid.nz(), "mapped model to cells");
    Ok(())
}

pub fn map_to_edge(m: &ModelParam, mode: MapMode<'_>) -> MtResult<EdgeField> {
    let mut out = EdgeField::unallocated();
    map_to_edge_into(m, mode, &mut out)?;
    Ok(out)
}

/// Edge conductivity `D_E^{-1} P D_C s`, written into `out`
/// (reallocated when its grid or shape is stale).
pub fn map_to_edge_into(m: &ModelParam, mode: MapMode<'_>, out: &mut EdgeField) -> MtResult<()> {
    let (grid, mut cells) = cell_conductivity(m, mode, "map_to_edge")?;
    out.ensure_allocated(&grid);
    if mode.is_linearized() && m.is_zero_valued() {
        return Ok(());
    }

    cells *= grid.cell_volume();
    cell_to_edge_into(&grid, cells.view(), out.arrays_mut())?;
    for (e, v) in out.arrays_mut().iter_mut().zip(grid.edge_volume().iter()) {
        *e /= v;
    }
    tracing::trace!(
        linearized = mode.is_linearized(),
        param_type = %m.param_type(),
        "mapped model to edges"
    );
    Ok(())
}

pub fn map_to_node(m: &ModelParam, mode: MapMode<'_>) -> MtResult<ScalarField> {
    let mut out = ScalarField::unallocated(GridLocation::Corner);
    map_to_node_into(m, mode, &mut out)?;
    Ok(out)
}

/// Node conductivity `D_N^{-1} Q D_C s`. One-way: no adjoint is provided.
pub fn map_to_node_into(m: &ModelParam, mode: MapMode<'_>, out: &mut ScalarField) -> MtResult<()> {
    let (grid, mut cells) = cell_conductivity(m, mode, "map_to_node")?;
    cells *= grid.cell_volume();
    let nodes = cell_to_node(&grid, cells.view())? / grid.node_volume();

    out.location = GridLocation::Corner;
    out.ensure_allocated(&grid);
    out.v.assign(&nodes);
    tracing::trace!(linearized = mode.is_linearized(), "mapped model to nodes");
    Ok(())
}
