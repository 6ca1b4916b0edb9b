use std::fmt;

use serde::{Deserialize, Serialize};

use super::gate::Escalation;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewTicketId(pub String);

impl fmt::Display for ReviewTicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound hand-off for escalated questions. Persisting and resolving the
/// ticket belongs to the queue, not to this crate.
pub trait ReviewQueue: Send + Sync {
    fn enqueue(&self, escalation: &Escalation) -> Result<ReviewTicketId, ReviewQueueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewQueueError {
    #[error("review queue unavailable: {0}")]
    Unavailable(String),
    #[error("review queue rejected the escalation: {0}")]
    Rejected(String),
}
