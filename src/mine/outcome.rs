//! Outcomes of lifecycle operations.
//!
//! A veto from the lifecycle hooks is a normal outcome, not an error.

/// Result of `Mine::reset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Completed,
    Vetoed,
    /// Another reset of the same mine is in flight; nothing was touched
    AlreadyRunning,
}

/// Result of `Mine::expand`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    Expanded,
    /// The blocking material was found next to the mining region.
    /// `upgraded` reports whether the border upgrade went through.
    Blocked { upgraded: bool },
    AtMaxSize,
    Vetoed,
}

/// Result of `Mine::upgrade`
#[derive(Debug, Clone, PartialEq)]
pub enum UpgradeOutcome {
    Upgraded { from: String, to: String },
    /// Already on the last tier; nothing was charged
    FinalTier,
    InsufficientFunds { balance: f64, cost: f64 },
    Vetoed,
}

/// Result of `Mine::delete`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Vetoed,
}
