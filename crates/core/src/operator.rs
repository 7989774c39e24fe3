use serde::{Deserialize, Serialize};

use crate::node::OperatorId;

/// A human user from the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: OperatorId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Operator {
    pub fn new(id: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            id: OperatorId::new(id),
            full_name: None,
            email: email.map(str::to_string),
        }
    }

    /// Registered email address, ignoring blank entries.
    pub fn email_address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }
}
