// ─────────────────────────────────────────────────────────────────────
// SCPN MT3D — Grid Field Containers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Scalar (cell / node) and edge-vector containers tagged with their grid.

use mt_types::error::{MtError, MtResult};
use mt_types::grid::{Axis, Grid3D};
use ndarray::{Array3, ArrayView3, ArrayViewMut3};
use std::sync::Arc;

/// Two handles refer to the same mesh.
pub fn same_grid(a: &Arc<Grid3D>, b: &Arc<Grid3D>) -> bool {
    Arc::ptr_eq(a, b) || **a == **b
}

/// Where a scalar field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLocation {
    /// One value per cell.
    Center,
    /// One value per node.
    Corner,
}

impl GridLocation {
    pub fn shape(self, grid: &Grid3D) -> [usize; 3] {
        match self {
            GridLocation::Center => grid.cell_shape(),
            GridLocation::Corner => grid.node_shape(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScalarField {
    pub location: GridLocation,
    grid: Option<Arc<Grid3D>>,
    pub v: Array3<f64>,
}

impl ScalarField {
    pub fn unallocated(location: GridLocation) -> Self {
        ScalarField {
            location,
            grid: None,
            v: Array3::zeros((0, 0, 0)),
        }
    }

    pub fn zeros(grid: &Arc<Grid3D>, location: GridLocation) -> Self {
        ScalarField {
            location,
            grid: Some(Arc::clone(grid)),
            v: Array3::zeros(location.shape(grid)),
        }
    }

    pub fn grid(&self) -> Option<&Arc<Grid3D>> {
        self.grid.as_ref()
    }

    pub fn is_allocated(&self) -> bool {
        self.grid.is_some()
    }

    /// Allocated on `grid` with the right shape for its location.
    pub fn matches(&self, grid: &Arc<Grid3D>) -> bool {
        match &self.grid {
            Some(g) => same_grid(g, grid) && self.v.shape() == self.location.shape(grid),
            None => false,
        }
    }

    /// Make this field a zeroed container on `grid`, reallocating when the
    /// grid or shape differs.
    pub fn ensure_allocated(&mut self, grid: &Arc<Grid3D>) {
        if self.matches(grid) {
            self.v.fill(0.0);
        } else {
            *self = ScalarField::zeros(grid, self.location);
        }
    }

    pub fn require_allocated(&self, operation: &str) -> MtResult<&Arc<Grid3D>> {
        self.grid.as_ref().ok_or_else(|| {
            MtError::InvalidState(format!("{operation}: scalar field is not allocated"))
        })
    }

    pub fn dot(&self, other: &ScalarField) -> MtResult<f64> {
        let grid = self.require_allocated("ScalarField::dot")?;
        if !other.matches(grid) || self.location != other.location {
            return Err(MtError::GridMismatch(
                "ScalarField::dot: fields live on different grids or locations".to_string(),
            ));
        }
        Ok((&self.v * &other.v).sum())
    }

    pub fn scale(&mut self, a: f64) {
        self.v.mapv_inplace(|v| a * v);
    }

    /// `a * s1 + b * s2` on a shared grid and location.
    pub fn lin_comb(a: f64, s1: &ScalarField, b: f64, s2: &ScalarField) -> MtResult<ScalarField> {
        let grid = s1.require_allocated("ScalarField::lin_comb")?;
        if !s2.matches(grid) || s1.location != s2.location {
            return Err(MtError::GridMismatch(
                "ScalarField::lin_comb: fields live on different grids or locations".to_string(),
            ));
        }
        Ok(ScalarField {
            location: s1.location,
            grid: Some(Arc::clone(grid)),
            v: &s1.v * a + &s2.v * b,
        })
    }
}

/// One value per edge per Cartesian direction.
#[derive(Debug, Clone)]
pub struct EdgeField {
    grid: Option<Arc<Grid3D>>,
    e: [Array3<f64>; 3],
}

impl EdgeField {
    pub fn unallocated() -> Self {
        EdgeField {
            grid: None,
            e: [
                Array3::zeros((0, 0, 0)),
                Array3::zeros((0, 0, 0)),
                Array3::zeros((0, 0, 0)),
            ],
        }
    }

    pub fn zeros(grid: &Arc<Grid3D>) -> Self {
        EdgeField {
            grid: Some(Arc::clone(grid)),
            e: Axis::ALL.map(|a| Array3::zeros(grid.edge_shape(a))),
        }
    }

    /// Wrap existing component arrays; shapes must match `grid`.
    pub fn from_arrays(grid: &Arc<Grid3D>, e: [Array3<f64>; 3]) -> MtResult<Self> {
        for axis in Axis::ALL {
            let expected = grid.edge_shape(axis);
            let shape = e[axis.index()].shape();
            if shape != expected {
                return Err(MtError::ShapeMismatch {
                    expected,
                    found: [shape[0], shape[1], shape[2]],
                });
            }
        }
        Ok(EdgeField {
            grid: Some(Arc::clone(grid)),
            e,
        })
    }

    pub fn grid(&self) -> Option<&Arc<Grid3D>> {
        self.grid.as_ref()
    }

    pub fn is_allocated(&self) -> bool {
        self.grid.is_some()
    }

    pub fn x(&self) -> &Array3<f64> {
        &self.e[0]
    }

    pub fn y(&self) -> &Array3<f64> {
        &self.e[1]
    }

    pub fn z(&self) -> &Array3<f64> {
        &self.e[2]
    }

    pub fn component(&self, axis: Axis) -> &Array3<f64> {
        &self.e[axis.index()]
    }

    pub fn component_mut(&mut self, axis: Axis) -> ArrayViewMut3<'_, f64> {
        self.e[axis.index()].view_mut()
    }

    pub fn views(&self) -> [ArrayView3<'_, f64>; 3] {
        [self.e[0].view(), self.e[1].view(), self.e[2].view()]
    }

    pub(crate) fn arrays_mut(&mut self) -> &mut [Array3<f64>; 3] {
        &mut self.e
    }

    pub fn matches(&self, grid: &Arc<Grid3D>) -> bool {
        match &self.grid {
            Some(g) => {
                same_grid(g, grid)
                    && Axis::ALL
                        .iter()
                        .all(|&a| self.e[a.index()].shape() == grid.edge_shape(a))
            }
            None => false,
        }
    }

    /// Make this field a zeroed container on `grid`, reallocating when the
    /// grid or any component shape differs.
    pub fn ensure_allocated(&mut self, grid: &Arc<Grid3D>) {
        if self.matches(grid) {
            self.e.iter_mut().for_each(|a| a.fill(0.0));
        } else {
            *self = EdgeField::zeros(grid);
        }
    }

    pub fn require_allocated(&self, operation: &str) -> MtResult<&Arc<Grid3D>> {
        self.grid.as_ref().ok_or_else(|| {
            MtError::InvalidState(format!("{operation}: edge field is not allocated"))
        })
    }

    pub fn dot(&self, other: &EdgeField) -> MtResult<f64> {
        let grid = self.require_allocated("EdgeField::dot")?;
        if !other.matches(grid) {
            return Err(MtError::GridMismatch(
                "EdgeField::dot: fields live on different grids".to_string(),
            ));
        }
        mt_math::averaging::dot_edges(self.views(), other.views())
    }

    pub fn scale(&mut self, a: f64) {
        self.e.iter_mut().for_each(|c| c.mapv_inplace(|v| a * v));
    }

    /// `a * e1 + b * e2` on a shared grid.
    pub fn lin_comb(a: f64, e1: &EdgeField, b: f64, e2: &EdgeField) -> MtResult<EdgeField> {
        let grid = e1.require_allocated("EdgeField::lin_comb")?;
        if !e2.matches(grid) {
            return Err(MtError::GridMismatch(
                "EdgeField::lin_comb: fields live on different grids".to_string(),
            ));
        }
        let e = Axis::ALL.map(|ax| {
            let i = ax.index();
            &e1.e[i] * a + &e2.e[i] * b
        });
        Ok(EdgeField {
            grid: Some(Arc::clone(grid)),
            e,
        })
    }
}
