//! Checkpoint/rollback contract for external collaborators.
//!
//! The engine checkpoints every collaborator it mutates before a transaction
//! and hands the checkpoint back on failure, so a failed operation leaves
//! token and collateral balances exactly as they were.

/// State that can be captured and restored
pub trait Journaled {
    /// Captured state
    type Checkpoint;

    /// Capture current state
    fn checkpoint(&self) -> Self::Checkpoint;

    /// Restore a previously captured state
    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}
