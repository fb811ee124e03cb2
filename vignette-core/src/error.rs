use thiserror::Error;
use vignette_model::ServerIdentity;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientLookupError {
    #[error("no authenticated client registered for {server}")]
    NotRegistered { server: ServerIdentity },

    #[error("authenticated client for {server} is unavailable: {reason}")]
    Unavailable {
        server: ServerIdentity,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ClientLookupError>;
