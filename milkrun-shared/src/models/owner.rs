use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A distributor account. The email is the identity every other record is scoped to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerAccount {
    pub email: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

impl OwnerAccount {
    pub fn new(email: String, name: String) -> Self {
        Self {
            email,
            name,
            joined_at: Utc::now(),
        }
    }
}
