//! Notification configuration sourced from the process environment.
//!
//! Built once at startup and passed by reference to whatever needs it.
//!
//! | variable | required | meaning |
//! |---|---|---|
//! | `EMAIL` | yes | sender address and SMTP login |
//! | `PASSWORD` | yes | SMTP password or app token |
//! | `BSB` | yes | bank routing code printed in the notice |
//! | `ACCOUNT` | yes | bank account number printed in the notice |
//! | `SMTP_HOST` | no | submission host, default `smtp.gmail.com` |
//! | `SMTP_PORT` | no | submission port, default `587` |

use std::fmt;

use crate::ConfigError;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Mail submission endpoint. The session is always upgraded with STARTTLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpEndpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
        }
    }
}

/// Mail credentials and the bank details quoted in every notice.
#[derive(Clone)]
pub struct NotificationConfig {
    pub sender: String,
    pub password: String,
    pub bsb: String,
    pub account: String,
    pub smtp: SmtpEndpoint,
}

impl NotificationConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let password = require("PASSWORD")?;
        let sender = require("EMAIL")?;
        let bsb = require("BSB")?;
        let account = require("ACCOUNT")?;

        let mut smtp = SmtpEndpoint::default();
        if let Some(host) = get("SMTP_HOST") {
            smtp.host = host;
        }
        if let Some(port) = get("SMTP_PORT") {
            smtp.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "SMTP_PORT",
                value: port.clone(),
            })?;
        }

        Ok(Self {
            sender,
            password,
            bsb,
            account,
            smtp,
        })
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("bsb", &self.bsb)
            .field("account", &self.account)
            .field("smtp", &self.smtp)
            .finish()
    }
}

impl fmt::Display for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config(email={}, bsb={}, account={}, smtp={}:{})",
            self.sender, self.bsb, self.account, self.smtp.host, self.smtp.port
        )
    }
}
