use std::fmt;

use serde::{Deserialize, Serialize};

/// Base URL identifying one backend server.
///
/// The string is kept exactly as supplied. It is never validated here:
/// consumers that need a parsed URL must treat a parse failure as
/// "not this server".
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerIdentity(String);

impl ServerIdentity {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServerIdentity").field(&self.0).finish()
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ServerIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ServerIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
