// ─────────────────────────────────────────────────────────────────────
// SCPN MT3D — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Default air conductivity (S/m).
/// Small but nonzero so LOGE models can store ln(sigma_air).
pub const SIGMA_AIR: f64 = 1e-10;

/// Default number of air layers when a config omits them.
pub const DEFAULT_AIR_LAYERS: usize = 10;

/// Default top of the air column (m).
pub const DEFAULT_AIR_MAX_HEIGHT: f64 = 200_000.0;

/// Default thickness of the air layer touching the surface (m).
pub const DEFAULT_AIR_MIN_TOP_DZ: f64 = 10.0;
