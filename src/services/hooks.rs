//! Veto hooks evaluated before lifecycle operations

use crate::core::types::PlayerId;

/// Operation about to run against a mine
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Reset { owner: PlayerId },
    Expand { owner: PlayerId, amount: i32 },
    Upgrade { owner: PlayerId, from: String, to: String },
    Delete { owner: PlayerId },
}

impl LifecycleEvent {
    pub fn owner(&self) -> PlayerId {
        match self {
            LifecycleEvent::Reset { owner }
            | LifecycleEvent::Expand { owner, .. }
            | LifecycleEvent::Upgrade { owner, .. }
            | LifecycleEvent::Delete { owner } => *owner,
        }
    }
}

/// Result of a hook evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Allow,
    Veto,
}

/// Pure pre-operation check. A veto cancels the operation before any
/// mutation; it is an outcome, not an error.
pub trait LifecycleHooks: Send + Sync {
    fn evaluate(&self, event: &LifecycleEvent) -> Verdict;
}

/// Hooks that never veto
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl LifecycleHooks for AllowAll {
    fn evaluate(&self, _event: &LifecycleEvent) -> Verdict {
        Verdict::Allow
    }
}

impl<F> LifecycleHooks for F
where
    F: Fn(&LifecycleEvent) -> Verdict + Send + Sync,
{
    fn evaluate(&self, event: &LifecycleEvent) -> Verdict {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_hooks() {
        let no_deletes = |event: &LifecycleEvent| match event {
            LifecycleEvent::Delete { .. } => Verdict::Veto,
            _ => Verdict::Allow,
        };
        let owner = PlayerId::new_v4();
        assert_eq!(no_deletes.evaluate(&LifecycleEvent::Delete { owner }), Verdict::Veto);
        assert_eq!(no_deletes.evaluate(&LifecycleEvent::Reset { owner }), Verdict::Allow);
        assert_eq!(AllowAll.evaluate(&LifecycleEvent::Delete { owner }), Verdict::Allow);
    }

    #[test]
    fn test_event_owner() {
        let owner = PlayerId::new_v4();
        let event = LifecycleEvent::Upgrade { owner, from: "Stone".into(), to: "Iron".into() };
        assert_eq!(event.owner(), owner);
    }
}
