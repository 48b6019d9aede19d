//! Protocol limits.

/// Every transaction carries at least this many outputs.
pub const CARROT_MIN_TX_OUTPUTS: usize = 2;

/// Upper bound on outputs per transaction.
pub const CARROT_MAX_TX_OUTPUTS: usize = 16;
