//! Coupled waveguide resonator bank.
//!
//! Eight resonant delay lines with fractional-delay tuning, all-pass
//! dispersion, high-shelf damping and a lossless scattering ring coupling
//! neighboring resonators.

pub mod dispersion;
pub mod resonator_bank;
pub mod scattering;
pub mod tuning;

pub use resonator_bank::{ResonatorBank, ResonatorParams};

/// Number of resonators in the bank.
pub const NUM_RESONATORS: usize = 8;
