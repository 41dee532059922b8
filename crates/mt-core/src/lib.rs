//! Parameter–field mapping engine for 3D magnetotelluric modelling.
//!
//! Forward map (model → cells/edges/nodes), its linearization about a
//! background model, and the exact adjoint of the linearized edge map.

pub mod adjoint;
pub mod edge_interp;
pub mod field;
pub mod mapping;
pub mod model;
pub mod observe;
