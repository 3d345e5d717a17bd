//! Shared DSP building blocks.

pub mod delay_line;
pub mod filter;
pub mod units;
