//! One billing cycle for one renter.
//!
//! ```text
//! Pending --notify ok--> Notified --persist--> Persisted
//!    \--notify err--> Failed
//! ```
//!
//! The record is only marked paid once the notice has been handed off
//! successfully. A `Failed` cycle writes nothing, so the next run bills the
//! same span again.

use anyhow::Context;
use rentnotice_core::{AccrualError, NotificationConfig, RenterRecord, format_unix};
use rentnotice_notify::{Notifier, NotifyError};
use rentnotice_store::{RecordStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

/// Amount computed, notice not yet sent.
#[derive(Debug)]
pub struct Pending {
    key: String,
    record: RenterRecord,
    now: i64,
    amount: f64,
}

/// Notice sent, record not yet updated.
#[derive(Debug)]
pub struct Notified {
    key: String,
    record: RenterRecord,
    now: i64,
    amount: f64,
}

/// Record updated on disk.
#[derive(Debug)]
pub struct Persisted {
    pub record: RenterRecord,
    pub amount: f64,
    pub previous_paid: i64,
}

/// Notice could not be sent; the record is unchanged.
#[derive(Debug, Error)]
#[error("rent notice to {email} was not sent", email = .record.email)]
pub struct Failed {
    pub record: RenterRecord,
    pub amount: f64,
    #[source]
    pub error: NotifyError,
}

impl Pending {
    /// Start a cycle for `record`, stored under `key`, observed at `now`.
    pub fn begin(
        key: impl Into<String>,
        record: RenterRecord,
        now: i64,
    ) -> Result<Self, AccrualError> {
        let amount = record.amount_owed(now)?;
        Ok(Self {
            key: key.into(),
            record,
            now,
            amount,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub async fn notify(
        self,
        notifier: &Notifier,
        config: &NotificationConfig,
    ) -> Result<Notified, Failed> {
        match notifier.notify(config, &self.record, self.amount).await {
            Ok(()) => Ok(Notified {
                key: self.key,
                record: self.record,
                now: self.now,
                amount: self.amount,
            }),
            Err(error) => Err(Failed {
                record: self.record,
                amount: self.amount,
                error,
            }),
        }
    }
}

impl Notified {
    /// Mark the record paid as of the observation time and save it.
    pub fn persist(self, store: &RecordStore) -> Result<Persisted, StoreError> {
        let paid = self.record.mark_paid(self.now);
        store.save(&self.key, &paid)?;
        Ok(Persisted {
            previous_paid: self.record.last_paid_timestamp,
            record: paid,
            amount: self.amount,
        })
    }
}

/// Load, bill, notify and persist the renter stored under `email`.
pub async fn run_cycle(
    store: &RecordStore,
    notifier: &Notifier,
    config: &NotificationConfig,
    email: &str,
    now: i64,
) -> anyhow::Result<Persisted> {
    let record = store
        .load(email)
        .with_context(|| format!("loading record {}", store.path_for(email).display()))?;
    info!(%record, "parsed renter record");
    if record.email != email {
        warn!(key = email, renter = %record.email, "record email differs from its file name");
    }

    let pending = Pending::begin(email, record, now)?;
    info!(renter = email, amount = %format!("{:.2}", pending.amount()), "computed rent owing");

    let notified = match pending.notify(notifier, config).await {
        Ok(notified) => notified,
        Err(failed) => {
            warn!(
                renter = %failed.record.email,
                amount = %format!("{:.2}", failed.amount),
                error = %failed.error,
                "notice not sent, record left unchanged"
            );
            return Err(failed.into());
        }
    };

    let persisted = notified
        .persist(store)
        .with_context(|| format!("saving record {}", store.path_for(email).display()))?;
    info!(
        renter = %persisted.record.email,
        amount = %format!("{:.2}", persisted.amount),
        time_last_paid = %format_unix(persisted.previous_paid),
        time_paid = %format_unix(persisted.record.last_paid_timestamp),
        "recorded rent notice"
    );
    Ok(persisted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lettre::Message;
    use rentnotice_core::SmtpEndpoint;
    use rentnotice_notify::MailTransport;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const EMAIL: &str = "tenant@example.com";
    const PAID: i64 = 1_748_258_028;
    const NOW: i64 = 1_749_467_628;

    #[derive(Default)]
    struct CountingTransport {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl MailTransport for CountingTransport {
        async fn send(&self, _message: Message) -> Result<(), NotifyError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RejectingTransport;

    #[async_trait]
    impl MailTransport for RejectingTransport {
        async fn send(&self, _message: Message) -> Result<(), NotifyError> {
            Err(NotifyError::Transmission(Box::new(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "535 authentication rejected",
            ))))
        }
    }

    fn config() -> NotificationConfig {
        NotificationConfig {
            sender: "landlord@example.com".into(),
            password: "hunter2".into(),
            bsb: "062-000".into(),
            account: "12345678".into(),
            smtp: SmtpEndpoint::default(),
        }
    }

    fn seeded_store() -> (TempDir, RecordStore) {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path());
        store
            .save(EMAIL, &RenterRecord::new(EMAIL, 260.0, PAID))
            .unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn successful_send_marks_paid() {
        let (_tmp, store) = seeded_store();
        let transport = Arc::new(CountingTransport::default());
        let notifier = Notifier::new(transport.clone());

        let persisted = run_cycle(&store, &notifier, &config(), EMAIL, NOW)
            .await
            .unwrap();

        assert_eq!(transport.sent.load(Ordering::SeqCst), 1);
        assert!((persisted.amount - 520.0).abs() < 1e-9);
        assert_eq!(persisted.previous_paid, PAID);
        assert_eq!(store.load(EMAIL).unwrap().last_paid_timestamp, NOW);
    }

    #[tokio::test]
    async fn failed_send_leaves_record_untouched() {
        let (_tmp, store) = seeded_store();
        let before = fs::read(store.path_for(EMAIL)).unwrap();
        let notifier = Notifier::new(Arc::new(RejectingTransport));

        let err = run_cycle(&store, &notifier, &config(), EMAIL, NOW)
            .await
            .unwrap_err();

        let failed = err.downcast_ref::<Failed>().expect("expected Failed");
        assert!(failed.error.is_transmission_failure());
        assert_eq!(failed.record.last_paid_timestamp, PAID);
        assert_eq!(fs::read(store.path_for(EMAIL)).unwrap(), before);
    }

    #[tokio::test]
    async fn pending_notify_failure_returns_record() {
        let record = RenterRecord::new(EMAIL, 260.0, PAID);
        let pending = Pending::begin(EMAIL, record.clone(), NOW).unwrap();
        let notifier = Notifier::new(Arc::new(RejectingTransport));

        let failed = pending.notify(&notifier, &config()).await.unwrap_err();
        assert_eq!(failed.record, record);
        assert!((failed.amount - 520.0).abs() < 1e-9);
        assert!(failed.to_string().contains(EMAIL));
    }

    #[tokio::test]
    async fn clock_skew_sends_nothing() {
        let (_tmp, store) = seeded_store();
        let before = fs::read(store.path_for(EMAIL)).unwrap();
        let transport = Arc::new(CountingTransport::default());
        let notifier = Notifier::new(transport.clone());

        let err = run_cycle(&store, &notifier, &config(), EMAIL, PAID - 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AccrualError>(),
            Some(AccrualError::ClockSkew { .. })
        ));
        assert_eq!(transport.sent.load(Ordering::SeqCst), 0);
        assert_eq!(fs::read(store.path_for(EMAIL)).unwrap(), before);
    }

    #[tokio::test]
    async fn missing_record_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path());
        let transport = Arc::new(CountingTransport::default());
        let notifier = Notifier::new(transport.clone());

        let err = run_cycle(&store, &notifier, &config(), EMAIL, NOW)
            .await
            .unwrap_err();

        let store_err = err.downcast_ref::<StoreError>().expect("expected StoreError");
        assert!(store_err.is_malformed());
        assert_eq!(transport.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn same_instant_bills_zero() {
        let (_tmp, store) = seeded_store();
        let notifier = Notifier::new(Arc::new(CountingTransport::default()));

        let persisted = run_cycle(&store, &notifier, &config(), EMAIL, PAID)
            .await
            .unwrap();
        assert_eq!(persisted.amount, 0.0);
        assert_eq!(persisted.record.last_paid_timestamp, PAID);
    }

    #[tokio::test]
    async fn persists_under_load_key() {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::new(tmp.path());
        store
            .save("alias", &RenterRecord::new(EMAIL, 260.0, PAID))
            .unwrap();
        let notifier = Notifier::new(Arc::new(CountingTransport::default()));

        run_cycle(&store, &notifier, &config(), "alias", NOW)
            .await
            .unwrap();

        assert_eq!(store.load("alias").unwrap().last_paid_timestamp, NOW);
        assert!(!store.path_for(EMAIL).exists());
    }
}
