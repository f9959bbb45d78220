//! Core types for rentnotice: renter ledger, rent accrual, notice text, and configuration.

pub mod config;
pub mod error;
pub mod notice;
pub mod renter;

pub use config::{NotificationConfig, SmtpEndpoint};
pub use error::{AccrualError, ConfigError};
pub use notice::Notice;
pub use renter::{RenterRecord, SECONDS_IN_WEEK, format_unix};
