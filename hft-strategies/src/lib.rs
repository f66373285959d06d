//! Strategy implementations carried alongside the graded core for
//! architectural symmetry, not wired into `hft_core::run` by default.
//!
//! The §4.3 market-making rule itself lives in `hft_core::strategy`; this
//! crate exists only to show the teacher's habit of shipping more than one
//! strategy behind its own crate boundary.

pub mod fees;
pub mod inventory_based;
pub mod volatility;

pub use inventory_based::{InventoryMaker, InventoryParams};
