use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A laboratory role as issued by the backend in the `role` claim.
///
/// Unknown role strings are kept verbatim in [`Role::Custom`]; they never
/// fail a decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    QcManager,
    ShiftChemist,
    Chemist,
    Other,
    Custom(String),
}

impl Role {
    /// The wire name used in tokens and configuration.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::QcManager => "qc_manager",
            Role::ShiftChemist => "shift_chemist",
            Role::Chemist => "chemist",
            Role::Other => "other",
            Role::Custom(s) => s.as_str(),
        }
    }

    /// Human label, e.g. `qc_manager` -> "QC Manager".
    pub fn display_name(&self) -> String {
        match self {
            Role::QcManager => "QC Manager".to_string(),
            other => other
                .as_str()
                .split('_')
                .filter(|w| !w.is_empty())
                .map(|w| {
                    let mut chars = w.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "qc_manager" => Role::QcManager,
            "shift_chemist" => Role::ShiftChemist,
            "chemist" => Role::Chemist,
            "other" => Role::Other,
            _ => Role::Custom(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::from(s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
