//! Cooperative cancellation between workflow steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gate::{WorkflowError, WorkflowStage};

/// Shared flag checked before research, before each generation attempt, and
/// before publishing. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns [`WorkflowError::Cancelled`] if the flag is set.
    pub fn check(&self, stage: WorkflowStage) -> Result<(), WorkflowError> {
        if self.is_cancelled() {
            Err(WorkflowError::Cancelled { stage })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(flag.check(WorkflowStage::Research).is_ok());

        other.cancel();
        assert!(flag.is_cancelled());
        assert!(matches!(
            flag.check(WorkflowStage::Publishing),
            Err(WorkflowError::Cancelled {
                stage: WorkflowStage::Publishing
            })
        ));
    }
}
