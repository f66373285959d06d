//! Shared value types, identifiers, and error kinds used across every stage.

pub mod errors;
pub mod ids;
pub mod types;

pub use errors::{AuditError, ConfigError, DecodeError};
pub use ids::IdGenerator;
pub use types::{
    Fill, MarketDataTick, Order, PositionSnapshot, PriceLevel, RecordType, Side, BOOK_DEPTH,
};
