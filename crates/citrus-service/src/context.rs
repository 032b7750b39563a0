//! Request context carrying the acting owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use citrus_core::types::OwnerId;

/// Context for the current request.
///
/// Built by the API layer from the identity the auth collaborator supplies
/// and passed into every service method, so each operation knows exactly
/// whose tree it acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The owner whose entries are being read or changed.
    pub owner_id: OwnerId,
    /// Correlation id for log lines of this request.
    pub request_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `owner_id`.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            request_id: Uuid::new_v4(),
            request_time: Utc::now(),
        }
    }
}
