//! Cell → edge / node averaging on the staggered grid.
//!
//! Each cell hands one quarter of its value to each of its 12 edges
//! (four per orientation) and one eighth to each of its 8 corners.
//! `edge_to_cell` gathers with the same weights, so it is the exact
//! transpose of `cell_to_edge` under the unweighted inner product.
//! No volume weighting happens here.

use mt_types::error::{MtError, MtResult};
use mt_types::grid::{Axis, Grid3D};
use ndarray::{s, Array3, ArrayView3};

const EDGE_SHARE: f64 = 0.25;
const NODE_SHARE: f64 = 0.125;

fn dim3(shape: &[usize]) -> [usize; 3] {
    let mut out = [0usize; 3];
    for (dst, &src) in out.iter_mut().zip(shape.iter()) {
        *dst = src;
    }
    out
}

fn check_shape(expected: [usize; 3], found: &[usize]) -> MtResult<()> {
    if found != expected {
        return Err(MtError::ShapeMismatch {
            expected,
            found: dim3(found),
        });
    }
    Ok(())
}

/// Distribute a cell-centred scalar onto x, y and z edges.
pub fn cell_to_edge(grid: &Grid3D, cells: ArrayView3<'_, f64>) -> MtResult<[Array3<f64>; 3]> {
    let mut out = Axis::ALL.map(|a| Array3::zeros(grid.edge_shape(a)));
    cell_to_edge_into(grid, cells, &mut out)?;
    Ok(out)
}

/// [`cell_to_edge`] into preallocated edge arrays (overwritten).
pub fn cell_to_edge_into(
    grid: &Grid3D,
    cells: ArrayView3<'_, f64>,
    out: &mut [Array3<f64>; 3],
) -> MtResult<()> {
    check_shape(grid.cell_shape(), cells.shape())?;
    for axis in Axis::ALL {
        check_shape(grid.edge_shape(axis), out[axis.index()].shape())?;
    }

    let [ex, ey, ez] = out;
    ex.fill(0.0);
    ey.fill(0.0);
    ez.fill(0.0);

    for ((i, j, k), &c) in cells.indexed_iter() {
        let v = EDGE_SHARE * c;
        ex.slice_mut(s![i, j..j + 2, k..k + 2]).mapv_inplace(|e| e + v);
        ey.slice_mut(s![i..i + 2, j, k..k + 2]).mapv_inplace(|e| e + v);
        ez.slice_mut(s![i..i + 2, j..j + 2, k]).mapv_inplace(|e| e + v);
    }
    Ok(())
}

/// Transpose of [`cell_to_edge`]: gather edge values back onto cells.
pub fn edge_to_cell(grid: &Grid3D, edges: [ArrayView3<'_, f64>; 3]) -> MtResult<Array3<f64>> {
    for axis in Axis::ALL {
        check_shape(grid.edge_shape(axis), edges[axis.index()].shape())?;
    }
    let [ex, ey, ez] = edges;
    let (nx, ny, nz) = (grid.nx(), grid.ny(), grid.nz());

    let cells = Array3::from_shape_fn((nx, ny, nz), |(i, j, k)| {
        let sx = ex.slice(s![i, j..j + 2, k..k + 2]).sum();
        let sy = ey.slice(s![i..i + 2, j, k..k + 2]).sum();
        let sz = ez.slice(s![i..i + 2, j..j + 2, k]).sum();
        EDGE_SHARE * (sx + sy + sz)
    });
    Ok(cells)
}

/// Distribute a cell-centred scalar onto grid nodes.
pub fn cell_to_node(grid: &Grid3D, cells: ArrayView3<'_, f64>) -> MtResult<Array3<f64>> {
    check_shape(grid.cell_shape(), cells.shape())?;
    let [nx, ny, nz] = grid.node_shape();
    let mut nodes = Array3::zeros((nx, ny, nz));
    for ((i, j, k), &c) in cells.indexed_iter() {
        let v = NODE_SHARE * c;
        nodes
            .slice_mut(s![i..i + 2, j..j + 2, k..k + 2])
            .mapv_inplace(|n| n + v);
    }
    Ok(nodes)
}

/// Unweighted inner product of two edge triples.
pub fn dot_edges(a: [ArrayView3<'_, f64>; 3], b: [ArrayView3<'_, f64>; 3]) -> MtResult<f64> {
    let mut total = 0.0;
    for (ua, ub) in a.iter().zip(b.iter()) {
        check_shape(dim3(ua.shape()), ub.shape())?;
        total += (ua * ub).sum();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid3D {
        Grid3D::new(
            vec![1.0, 2.0, 3.0],
            vec![2.0, 1.0],
            vec![4.0, 1.0, 0.5, 2.0],
            1,
        )
        .unwrap()
    }

    fn pattern(shape: [usize; 3], seed: f64) -> Array3<f64> {
        Array3::from_shape_fn(shape, |(i, j, k)| {
            ((i as f64 + 1.3) * seed + (j as f64) * 0.7 - (k as f64) * 1.1).sin()
        })
    }

    #[test]
    fn test_single_cell_reaches_twelve_edges() {
        let g = grid();
        let mut cells = Array3::zeros((3, 2, 4));
        cells[[1, 0, 2]] = 4.0;
        let [ex, ey, ez] = cell_to_edge(&g, cells.view()).unwrap();
        let count = |a: &Array3<f64>| a.iter().filter(|&&v| v != 0.0).count();
        assert_eq!(count(&ex), 4);
        assert_eq!(count(&ey), 4);
        assert_eq!(count(&ez), 4);
        assert_eq!(ex[[1, 1, 3]], 1.0);
        assert_eq!(ey[[2, 0, 2]], 1.0);
        assert_eq!(ez[[1, 0, 2]], 1.0);
    }

    #[test]
    fn test_edge_to_cell_is_transpose() {
        let g = grid();
        let c = pattern(g.cell_shape(), 0.9);
        let e = Axis::ALL.map(|a| pattern(g.edge_shape(a), 1.7 + a.index() as f64));

        let pc = cell_to_edge(&g, c.view()).unwrap();
        let lhs = dot_edges(
            [pc[0].view(), pc[1].view(), pc[2].view()],
            [e[0].view(), e[1].view(), e[2].view()],
        )
        .unwrap();
        let pte = edge_to_cell(&g, [e[0].view(), e[1].view(), e[2].view()]).unwrap();
        let rhs = (&c * &pte).sum();

        assert!(
            (lhs - rhs).abs() <= 1e-12 * lhs.abs().max(1.0),
            "lhs={lhs}, rhs={rhs}"
        );
    }

    #[test]
    fn test_volume_weighted_edge_average_preserves_constant() {
        let g = grid();
        let vc = g.cell_volume();
        let weighted = vc.mapv(|v| 3.5 * v);
        let pe = cell_to_edge(&g, weighted.view()).unwrap();
        for axis in Axis::ALL {
            let ve = &g.edge_volume()[axis.index()];
            for (&e, &v) in pe[axis.index()].iter().zip(ve.iter()) {
                assert!((e / v - 3.5).abs() < 1e-12, "{axis:?}: {}", e / v);
            }
        }
    }

    #[test]
    fn test_volume_weighted_node_average_preserves_constant() {
        let g = grid();
        let weighted = g.cell_volume().mapv(|v| -2.0 * v);
        let pn = cell_to_node(&g, weighted.view()).unwrap();
        for (&n, &v) in pn.iter().zip(g.node_volume().iter()) {
            assert!((n / v + 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let g = grid();
        let wrong = Array3::zeros((3, 2, 3));
        match cell_to_edge(&g, wrong.view()) {
            Err(MtError::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, [3, 2, 4]);
                assert_eq!(found, [3, 2, 3]);
            }
            other => panic!("Unexpected result: {other:?}"),
        }
        assert!(cell_to_node(&g, wrong.view()).is_err());
    }
}
