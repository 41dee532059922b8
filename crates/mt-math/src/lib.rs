//! Mathematical primitives for SCPN MT3D.

pub mod averaging;
