// ─────────────────────────────────────────────────────────────────────
// SCPN MT3D — Staggered Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! 3D staggered finite-difference grid with an owned volume cache.
//!
//! Layout (0-based, z increases downwards, layer 0 is the top of the air):
//!   cells   [nx,   ny,   nz]
//!   x-edges [nx,   ny+1, nz+1]
//!   y-edges [nx+1, ny,   nz+1]
//!   z-edges [nx+1, ny+1, nz]
//!   nodes   [nx+1, ny+1, nz+1]
//! Node plane `nz_air` is the air/earth interface.

use crate::error::{MtError, MtResult};
use ndarray::{Array1, Array3};
use std::sync::OnceLock;

/// Cartesian edge orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn label(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }
}

/// Diagonal volume weights for every grid location kind.
///
/// `edge` is indexed by [`Axis::index`].
#[derive(Debug, Clone)]
pub struct VolumeWeights {
    pub cell: Array3<f64>,
    pub edge: [Array3<f64>; 3],
    pub node: Array3<f64>,
}

/// Staggered 3D mesh: per-axis cell widths plus the air/earth split.
///
/// Geometry is only reachable through accessors so the volume cache can
/// never go stale behind a mutation.
#[derive(Debug, Clone)]
pub struct Grid3D {
    dx: Array1<f64>,
    dy: Array1<f64>,
    dz: Array1<f64>,
    nz_air: usize,
    volumes: OnceLock<VolumeWeights>,
}

fn validate_spacing(name: &str, d: &[f64]) -> MtResult<()> {
    if d.is_empty() {
        return Err(MtError::Config(format!("{name} must contain at least one cell")));
    }
    if let Some((idx, &v)) = d.iter().enumerate().find(|(_, v)| !v.is_finite() || **v <= 0.0) {
        return Err(MtError::Config(format!(
            "{name}[{idx}] = {v} must be finite and > 0"
        )));
    }
    Ok(())
}

/// Dual (node-centred) lengths: half-sums of neighbouring widths,
/// half a width on the two boundary nodes.
pub fn dual_lengths(d: &Array1<f64>) -> Array1<f64> {
    let n = d.len();
    Array1::from_shape_fn(n + 1, |i| {
        let left = if i > 0 { d[i - 1] } else { 0.0 };
        let right = if i < n { d[i] } else { 0.0 };
        0.5 * (left + right)
    })
}

fn node_positions(d: &Array1<f64>, origin_index: usize) -> Array1<f64> {
    let mut out = Array1::zeros(d.len() + 1);
    for i in 0..d.len() {
        out[i + 1] = out[i] + d[i];
    }
    let shift = out[origin_index];
    out.mapv_inplace(|v| v - shift);
    out
}

impl Grid3D {
    /// Build a grid from cell widths. `dz` runs top-down and its first
    /// `nz_air` entries are air layers.
    pub fn new(dx: Vec<f64>, dy: Vec<f64>, dz: Vec<f64>, nz_air: usize) -> MtResult<Self> {
        validate_spacing("dx", &dx)?;
        validate_spacing("dy", &dy)?;
        validate_spacing("dz", &dz)?;
        if nz_air >= dz.len() {
            return Err(MtError::Config(format!(
                "nz_air={nz_air} leaves no earth layers in nz={}",
                dz.len()
            )));
        }
        Ok(Grid3D {
            dx: Array1::from(dx),
            dy: Array1::from(dy),
            dz: Array1::from(dz),
            nz_air,
            volumes: OnceLock::new(),
        })
    }

    /// Equal spacing `h` along every axis.
    pub fn uniform(nx: usize, ny: usize, nz_air: usize, nz_earth: usize, h: f64) -> MtResult<Self> {
        Self::new(
            vec![h; nx],
            vec![h; ny],
            vec![h; nz_air + nz_earth],
            nz_air,
        )
    }

    pub fn nx(&self) -> usize {
        self.dx.len()
    }

    pub fn ny(&self) -> usize {
        self.dy.len()
    }

    pub fn nz(&self) -> usize {
        self.dz.len()
    }

    pub fn nz_air(&self) -> usize {
        self.nz_air
    }

    pub fn nz_earth(&self) -> usize {
        self.dz.len() - self.nz_air
    }

    pub fn dx(&self) -> &Array1<f64> {
        &self.dx
    }

    pub fn dy(&self) -> &Array1<f64> {
        &self.dy
    }

    pub fn dz(&self) -> &Array1<f64> {
        &self.dz
    }

    /// Widths of the earth layers only.
    pub fn dz_earth(&self) -> ndarray::ArrayView1<'_, f64> {
        self.dz.slice(ndarray::s![self.nz_air..])
    }

    pub fn cell_shape(&self) -> [usize; 3] {
        [self.nx(), self.ny(), self.nz()]
    }

    pub fn earth_shape(&self) -> [usize; 3] {
        [self.nx(), self.ny(), self.nz_earth()]
    }

    pub fn node_shape(&self) -> [usize; 3] {
        [self.nx() + 1, self.ny() + 1, self.nz() + 1]
    }

    pub fn edge_shape(&self, axis: Axis) -> [usize; 3] {
        let (nx, ny, nz) = (self.nx(), self.ny(), self.nz());
        match axis {
            Axis::X => [nx, ny + 1, nz + 1],
            Axis::Y => [nx + 1, ny, nz + 1],
            Axis::Z => [nx + 1, ny + 1, nz],
        }
    }

    /// Node x-coordinates, origin on the western boundary.
    pub fn x_nodes(&self) -> Array1<f64> {
        node_positions(&self.dx, 0)
    }

    /// Node y-coordinates, origin on the southern boundary.
    pub fn y_nodes(&self) -> Array1<f64> {
        node_positions(&self.dy, 0)
    }

    /// Node depths, zero on the air/earth interface, negative in the air.
    pub fn z_nodes(&self) -> Array1<f64> {
        node_positions(&self.dz, self.nz_air)
    }

    /// Replace the air layers (top-down thicknesses). Invalidates volumes.
    pub fn set_air_layers(&mut self, dz_air: &[f64]) -> MtResult<()> {
        if !dz_air.is_empty() {
            validate_spacing("dz_air", dz_air)?;
        }
        let earth = self.dz_earth().to_vec();
        self.dz = dz_air.iter().copied().chain(earth).collect();
        self.nz_air = dz_air.len();
        self.invalidate_volumes();
        Ok(())
    }

    /// Drop cached volume weights; the next accessor recomputes them.
    pub fn invalidate_volumes(&mut self) {
        self.volumes = OnceLock::new();
    }

    pub fn volumes_cached(&self) -> bool {
        self.volumes.get().is_some()
    }

    pub fn volumes(&self) -> &VolumeWeights {
        self.volumes.get_or_init(|| self.compute_volumes())
    }

    pub fn cell_volume(&self) -> &Array3<f64> {
        &self.volumes().cell
    }

    pub fn edge_volume(&self) -> &[Array3<f64>; 3] {
        &self.volumes().edge
    }

    pub fn node_volume(&self) -> &Array3<f64> {
        &self.volumes().node
    }

    fn compute_volumes(&self) -> VolumeWeights {
        let (nx, ny, nz) = (self.nx(), self.ny(), self.nz());
        tracing::debug!(nx, ny, nz, nz_air = self.nz_air, "computing volume weights");

        let (dx, dy, dz) = (&self.dx, &self.dy, &self.dz);
        let ddx = dual_lengths(dx);
        let ddy = dual_lengths(dy);
        let ddz = dual_lengths(dz);

        let cell = Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| dx[i] * dy[j] * dz[k]);
        let ex = Array3::from_shape_fn((nx, ny + 1, nz + 1), |(i, j, k)| {
            dx[i] * ddy[j] * ddz[k]
        });
        let ey = Array3::from_shape_fn((nx + 1, ny, nz + 1), |(i, j, k)| {
            ddx[i] * dy[j] * ddz[k]
        });
        let ez = Array3::from_shape_fn((nx + 1, ny + 1, nz), |(i, j, k)| {
            ddx[i] * ddy[j] * dz[k]
        });
        let node = Array3::from_shape_fn((nx + 1, ny + 1, nz + 1), |(i, j, k)| {
            ddx[i] * ddy[j] * ddz[k]
        });

        VolumeWeights {
            cell,
            edge: [ex, ey, ez],
            node,
        }
    }
}

/// Geometry equality; the cache state is ignored.
impl PartialEq for Grid3D {
    fn eq(&self, other: &Self) -> bool {
        self.nz_air == other.nz_air
            && self.dx == other.dx
            && self.dy == other.dy
            && self.dz == other.dz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stretched() -> Grid3D {
        Grid3D::new(
            vec![100.0, 200.0, 300.0],
            vec![50.0, 150.0],
            vec![1000.0, 100.0, 10.0, 20.0, 40.0],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_grid_counts() {
        let grid = stretched();
        assert_eq!(grid.cell_shape(), [3, 2, 5]);
        assert_eq!(grid.earth_shape(), [3, 2, 3]);
        assert_eq!(grid.nz_air(), 2);
        assert_eq!(grid.nz_earth(), 3);
        assert_eq!(grid.edge_shape(Axis::X), [3, 3, 6]);
        assert_eq!(grid.edge_shape(Axis::Y), [4, 2, 6]);
        assert_eq!(grid.edge_shape(Axis::Z), [4, 3, 5]);
        assert_eq!(grid.node_shape(), [4, 3, 6]);
        assert_eq!(grid.dz_earth().to_vec(), vec![10.0, 20.0, 40.0]);
    }

    #[test]
    fn test_rejects_malformed_grid() {
        assert!(matches!(
            Grid3D::new(vec![], vec![1.0], vec![1.0, 1.0], 1),
            Err(MtError::Config(_))
        ));
        assert!(matches!(
            Grid3D::new(vec![1.0, -2.0], vec![1.0], vec![1.0, 1.0], 1),
            Err(MtError::Config(_))
        ));
        assert!(matches!(
            Grid3D::new(vec![1.0], vec![f64::NAN], vec![1.0, 1.0], 1),
            Err(MtError::Config(_))
        ));
        let err = Grid3D::new(vec![1.0], vec![1.0], vec![1.0, 1.0], 2).unwrap_err();
        match err {
            MtError::Config(msg) => assert!(msg.contains("no earth layers"), "{msg}"),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_dual_lengths_boundary_halves() {
        let d = Array1::from(vec![2.0, 4.0, 6.0]);
        let dual = dual_lengths(&d);
        assert_eq!(dual.to_vec(), vec![1.0, 3.0, 5.0, 3.0]);
        assert!((dual.sum() - d.sum()).abs() < 1e-12);
    }

    #[test]
    fn test_volumes_partition_domain() {
        let grid = stretched();
        let total = grid.dx().sum() * grid.dy().sum() * grid.dz().sum();
        let v = grid.volumes();
        assert!((v.cell.sum() - total).abs() < 1e-6 * total);
        assert!((v.node.sum() - total).abs() < 1e-6 * total);
        for axis in Axis::ALL {
            let s = v.edge[axis.index()].sum();
            assert!((s - total).abs() < 1e-6 * total, "{axis:?} edge volume sum {s}");
        }
    }

    #[test]
    fn test_edge_volume_entries() {
        let grid = stretched();
        let ex = &grid.edge_volume()[Axis::X.index()];
        // interior x-edge (1, 1, 3): dx[1] * (dy0+dy1)/2 * (dz2+dz3)/2
        let expected = 200.0 * 100.0 * 15.0;
        assert!((ex[[1, 1, 3]] - expected).abs() < 1e-9);
        // corner x-edge (0, 0, 0): dx[0] * dy0/2 * dz0/2
        assert!((ex[[0, 0, 0]] - 100.0 * 25.0 * 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_cache_reused_then_invalidated() {
        let mut grid = stretched();
        assert!(!grid.volumes_cached());
        let first = grid.cell_volume().as_ptr();
        assert!(grid.volumes_cached());
        assert_eq!(first, grid.cell_volume().as_ptr());

        grid.set_air_layers(&[500.0, 50.0, 5.0]).unwrap();
        assert!(!grid.volumes_cached());
        assert_eq!(grid.nz_air(), 3);
        assert_eq!(grid.cell_volume().dim(), (3, 2, 6));
        assert_eq!(grid.dz_earth().to_vec(), vec![10.0, 20.0, 40.0]);
    }

    #[test]
    fn test_z_nodes_zero_at_interface() {
        let grid = stretched();
        let z = grid.z_nodes();
        assert_eq!(z.len(), 6);
        assert!(z[2].abs() < 1e-12);
        assert!((z[0] + 1100.0).abs() < 1e-12);
        assert!((z[5] - 70.0).abs() < 1e-12);
        let x = grid.x_nodes();
        assert!((x[3] - 600.0).abs() < 1e-12);
        let y = grid.y_nodes();
        assert_eq!(y.len(), 3);
        assert_eq!(y[0], 0.0);
        assert!((y[1] - 50.0).abs() < 1e-12);
        assert!((y[2] - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_equality_ignores_cache() {
        let a = stretched();
        let b = stretched();
        let _ = a.node_volume();
        assert_eq!(a, b);
        let mut c = stretched();
        c.set_air_layers(&[10.0]).unwrap();
        assert_ne!(a, c);
    }
}
