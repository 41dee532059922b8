//! Conductivity on a single edge, for field evaluation at receivers.
//!
//! Area-weighted average of the earth cells sharing the edge. Weights are
//! products of the two transverse cell widths. Cells above the air/earth
//! interface and cells beyond the lateral boundary are left out, so an
//! edge on the interface plane averages only the two cells below it.

use crate::model::ModelParam;
use mt_types::config::ParamType;
use mt_types::error::{MtError, MtResult};
use mt_types::grid::Axis;
use std::ops::Range;

/// Cells adjacent to node index `idx` along an axis with `n` cells.
fn neighbours(idx: usize, n: usize) -> Range<usize> {
    idx.saturating_sub(1)..(idx + 1).min(n)
}

fn identity(v: f64) -> f64 {
    v
}

/// Conductivity (S/m) on the `axis`-oriented edge `(ix, iy, iz)`.
///
/// Indices follow the edge layout of [`mt_types::grid::Grid3D`]. Edges whose
/// neighbourhood lies entirely in the air return the air conductivity.
pub fn conductivity_at_edge(
    m: &ModelParam,
    axis: Axis,
    ix: usize,
    iy: usize,
    iz: usize,
) -> MtResult<f64> {
    let grid = m.require_grid("conductivity_at_edge")?;
    let idx = [ix, iy, iz];
    let limits = grid.edge_shape(axis);
    for (d, (&i, &limit)) in idx.iter().zip(limits.iter()).enumerate() {
        if i >= limit {
            return Err(MtError::IndexOutOfRange {
                axis: Axis::ALL[d].label(),
                index: i,
                limit,
            });
        }
    }

    let to_sigma: fn(f64) -> f64 = match m.param_type() {
        ParamType::Loge => f64::exp,
        ParamType::Linear => identity,
    };

    let widths = [grid.dx(), grid.dy(), grid.dz()];
    let counts = grid.cell_shape();
    let along = axis.index();
    let candidates: [Range<usize>; 3] = [0, 1, 2].map(|d| {
        if d == along {
            idx[d]..idx[d] + 1
        } else {
            neighbours(idx[d], counts[d])
        }
    });

    let nz_air = grid.nz_air();
    let layers = candidates[2].start.max(nz_air)..candidates[2].end;
    if layers.is_empty() {
        return Ok(to_sigma(m.air_value()));
    }

    let weight = |d: usize, i: usize| if d == along { 1.0 } else { widths[d][i] };
    let cells = m.cell_value();
    let mut num = 0.0;
    let mut den = 0.0;
    for i in candidates[0].clone() {
        for j in candidates[1].clone() {
            for k in layers.clone() {
                let w = weight(0, i) * weight(1, j) * weight(2, k);
                num += w * to_sigma(cells[[i, j, k - nz_air]]);
                den += w;
            }
        }
    }
    Ok(num / den)
}
