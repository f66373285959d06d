//! Per-order lifecycle state inside the execution simulator.

use crate::core::types::Order;

/// `Queued(release_time) -> Ready -> {Filled, PartiallyFilled, CanceledByVenue}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderState {
    Queued { release_time: i64 },
    Ready,
    Filled,
    PartiallyFilled,
    CanceledByVenue,
}

impl OrderState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderState::Filled | OrderState::PartiallyFilled | OrderState::CanceledByVenue
        )
    }
}

/// An order pending in the simulator, ordered by `release_time` with ties
/// broken by arrival order (§4.5 "Ordering").
#[derive(Debug, Clone, Copy)]
pub struct PendingOrder {
    pub order: Order,
    pub state: OrderState,
    pub arrival_index: u64,
}

impl PendingOrder {
    pub fn release_time(&self) -> i64 {
        match self.state {
            OrderState::Queued { release_time } => release_time,
            _ => i64::MIN,
        }
    }
}

impl PartialEq for PendingOrder {
    fn eq(&self, other: &Self) -> bool {
        self.release_time() == other.release_time() && self.arrival_index == other.arrival_index
    }
}
impl Eq for PendingOrder {}

impl PartialOrd for PendingOrder {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingOrder {
    /// Reversed so a `BinaryHeap` (a max-heap) pops the earliest
    /// `release_time` first, ties broken by earliest arrival.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .release_time()
            .cmp(&self.release_time())
            .then_with(|| other.arrival_index.cmp(&self.arrival_index))
    }
}
