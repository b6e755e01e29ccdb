use jiff::Timestamp;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod gateway;
pub mod provider;

/// Opaque identifier of an authenticated caller, issued by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A signed-in caller: who they are plus the delegation the directory
/// expects on every call.
#[derive(Clone, Debug)]
pub struct Identity {
    pub principal: Principal,
    pub delegation: SecretString,
    pub expires_at: Timestamp,
}

impl Identity {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }
}
