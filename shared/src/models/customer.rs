//! Customer models

use serde::{Deserialize, Serialize};

/// Whether a customer checked out as a guest or holds an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Guest,
    Registered,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Guest => "guest",
            CustomerType::Registered => "registered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "guest" => Some(CustomerType::Guest),
            "registered" => Some(CustomerType::Registered),
            _ => None,
        }
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
