use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccrualError {
    /// The observation time precedes the recorded payment, so no span can accrue.
    #[error("observation time {now} is earlier than last payment {last_paid}")]
    ClockSkew { last_paid: i64, now: i64 },
}
