//! Notification layer: composes the rent notice email and submits it over SMTP.

mod error;
pub mod mail;

pub use error::NotifyError;
pub use mail::{MailTransport, Notifier, SmtpMailer, build_message};
