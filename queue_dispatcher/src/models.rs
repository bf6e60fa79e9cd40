use serde::{Deserialize, Serialize};

/// Delivery semantic attached to a queue entry. Numeric values (1 =
/// at-least-once, 2 = timeout-based) keep the wire representation a plain
/// integer rather than a string enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Semantic {
    AtLeastOnce = 1,
    TimeoutBased = 2,
}

/// Wire structure exchanged across every RPC procedure. `seq` is assigned by
/// the server on insert and echoed back on every subsequent exchange;
/// producers never set it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub seq: u64,
    pub message: String,
    pub visible: bool,
    pub semantic: Semantic,
    pub timeout_secs: u64,
}

impl QueueEntry {
    pub fn new(message: String, semantic: Semantic, timeout_secs: u64) -> Self {
        Self { seq: 0, message, visible: true, semantic, timeout_secs }
    }
}
