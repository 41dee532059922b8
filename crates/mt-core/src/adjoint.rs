// ─────────────────────────────────────────────────────────────────────
// SCPN MT3D — Adjoint Edge Mapping
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Transpose of the linearized edge map.
//!
//! Forward: L = D_E^{-1} · P · D_C · X · diag(exp(m0)) (X embeds earth
//! cells into the full grid with zero air). Diagonal factors are their own
//! transposes, so
//!   L^T = diag(exp(m0)) · X^T · D_C · P^T · D_E^{-1}
//! with P^T = edge_to_cell and X^T dropping the air layers.

use crate::field::{same_grid, EdgeField};
use crate::model::ModelParam;
use mt_math::averaging::edge_to_cell;
use mt_types::config::ParamType;
use mt_types::error::{MtError, MtResult};
use mt_types::grid::Axis;
use ndarray::{s, Zip};
use std::sync::Arc;

const OPERATION: &str = "edge_to_parameter";

/// Pull an edge-resident vector back into model space.
pub fn edge_to_parameter(
    e: &EdgeField,
    param_type: ParamType,
    background: Option<&ModelParam>,
) -> MtResult<ModelParam> {
    let mut out = ModelParam::unallocated(param_type);
    edge_to_parameter_into(e, background, &mut out)?;
    Ok(out)
}

/// [`edge_to_parameter`] into `out`, whose parameterization selects the
/// chain-rule factor. `out` is reallocated if it sits on a stale grid.
pub fn edge_to_parameter_into(
    e: &EdgeField,
    background: Option<&ModelParam>,
    out: &mut ModelParam,
) -> MtResult<()> {
    let grid = Arc::clone(e.require_allocated(OPERATION)?);
    let param_type = out.param_type();

    if let Some(bg) = background {
        let bg_grid = bg.require_grid(OPERATION)?;
        if !same_grid(&grid, bg_grid) {
            return Err(MtError::GridMismatch(format!(
                "{OPERATION}: edge field and background live on different grids"
            )));
        }
    }
    let chain = match (param_type, background) {
        (ParamType::Linear, _) => None,
        (ParamType::Loge, None) => {
            return Err(MtError::MissingBackground(format!(
                "{OPERATION}: LOGE parameterization needs a background model"
            )))
        }
        (ParamType::Loge, Some(bg)) => {
            if bg.param_type() != ParamType::Loge {
                return Err(MtError::InvalidState(format!(
                    "{OPERATION}: background must be LOGE, got {}",
                    bg.param_type()
                )));
            }
            Some(bg)
        }
    };

    let ve = grid.edge_volume();
    let unscaled = Axis::ALL.map(|a| e.component(a) / &ve[a.index()]);
    let mut cells = edge_to_cell(
        &grid,
        [unscaled[0].view(), unscaled[1].view(), unscaled[2].view()],
    )?;
    cells *= grid.cell_volume();

    out.ensure_allocated(&grid);
    let earth = cells.slice(s![.., .., grid.nz_air()..]);
    let mut target = out.cell_value_mut();
    match chain {
        None => target.assign(&earth),
        Some(bg) => Zip::from(&mut target)
            .and(&earth)
            .and(bg.cell_value())
            .for_each(|t, &c, &m0| *t = c * m0.exp()),
    }
    tracing::trace!(param_type = %param_type, "pulled edge vector back to model space");
    Ok(())
}
