//! Plain-text rent notice.

use crate::NotificationConfig;

pub const SUBJECT: &str = "Rent Notice";

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

impl Notice {
    /// Compose the notice for `amount` owed, quoting the payment details from `config`.
    pub fn compose(config: &NotificationConfig, amount: f64) -> Self {
        let body = format!(
            "Amount owing: {amount:.2}\n\
             \n\
             BSB: {bsb}\n\
             Account: {account}\n\
             \n\
             Please contact me within 24 hours if there are any issues!\n\
             \n\
             Best,\n",
            bsb = config.bsb,
            account = config.account,
        );
        Self {
            subject: SUBJECT.to_string(),
            body,
        }
    }
}
