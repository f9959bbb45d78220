use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid mail address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("failed to configure SMTP transport for {host}: {source}")]
    Setup {
        host: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("mail transmission failed: {0}")]
    Transmission(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl NotifyError {
    /// True when a session was attempted and did not complete.
    pub fn is_transmission_failure(&self) -> bool {
        matches!(self, Self::Transmission(_))
    }
}
