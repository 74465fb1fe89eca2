//! Caller identity handed to every engine entry point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stowage_core::types::OwnerId;

/// Context for the current caller.
///
/// Produced by whatever authenticates the caller and passed into every
/// service method, so each operation is scoped to one owner explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerContext {
    /// The account whose hierarchy is being operated on.
    pub owner_id: OwnerId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl OwnerContext {
    /// Creates a new owner context.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            request_time: Utc::now(),
        }
    }
}
