//! Customer dashboard: own application, payment details, payment countdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{ClientError, Result};
use crate::models::{ApplicationRecord, BankAccount, Session};
use crate::notice::Notice;
use crate::services::FranchiseBackend;

/// How long the payment modal stays open.
pub const PAYMENT_WINDOW: Duration = Duration::from_secs(180);

/// Shortest refresh period the polling task accepts.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where the customer has been told to pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentTarget {
    /// The generic payment QR code
    QrCode,
    Account(BankAccount),
}

/// State of the customer's dashboard page.
///
/// The latest application is published on a watch channel so a polling
/// task and the page can share it.
pub struct CustomerDashboard<B: ?Sized> {
    backend: Arc<B>,
    email: String,
    application: watch::Sender<Option<ApplicationRecord>>,
    banks: Vec<BankAccount>,
}

impl<B: FranchiseBackend + ?Sized + 'static> CustomerDashboard<B> {
    /// Dashboard for the customer signed in with `session`.
    ///
    /// # Errors
    ///
    /// `SessionMissing` if the session is not a customer session.
    pub fn new(backend: Arc<B>, session: &Session) -> Result<Self> {
        let email = session
            .customer_email()
            .ok_or(ClientError::SessionMissing)?
            .to_string();
        let (application, _) = watch::channel(None);
        Ok(Self {
            backend,
            email,
            application,
            banks: Vec::new(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Latest fetched application.
    pub fn application(&self) -> Option<ApplicationRecord> {
        self.application.borrow().clone()
    }

    /// Receive every refresh of the application.
    pub fn subscribe(&self) -> watch::Receiver<Option<ApplicationRecord>> {
        self.application.subscribe()
    }

    /// Name for the greeting.
    pub fn display_name(&self) -> String {
        self.application
            .borrow()
            .as_ref()
            .map(|a| a.name().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Customer".to_string())
    }

    /// Fetch the application once and replace the local copy.
    pub async fn refresh(&self) -> Result<ApplicationRecord> {
        let record = fetch(&*self.backend, &self.email).await?;
        self.application.send_replace(Some(record.clone()));
        Ok(record)
    }

    /// Fetch now and then every `interval` until the handle is dropped.
    ///
    /// Failed fetches are logged and leave the last good copy in place.
    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn start_polling(&self, interval: Duration) -> PollingHandle {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let backend = Arc::clone(&self.backend);
        let email = self.email.clone();
        let sender = self.application.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match fetch(&*backend, &email).await {
                    Ok(record) => {
                        sender.send_replace(Some(record));
                    }
                    Err(e) => tracing::warn!("application refresh failed: {}", e),
                }
            }
        });
        tracing::debug!(interval_secs = interval.as_secs(), "customer polling started");
        PollingHandle { task }
    }

    pub async fn load_banks(&mut self) -> Result<&[BankAccount]> {
        self.banks = self.backend.list_banks().await.inspect_err(|e| {
            tracing::error!("failed to load bank details: {}", e);
        })?;
        Ok(&self.banks)
    }

    /// Resolve the application's assigned bank against the loaded accounts.
    ///
    /// `None` when nothing is assigned yet or the account is unknown.
    pub fn payment_target(&self) -> Option<PaymentTarget> {
        let assigned = self.application.borrow().as_ref()?.assigned_bank.clone()?;
        if assigned == "qr_code" {
            return Some(PaymentTarget::QrCode);
        }
        self.banks
            .iter()
            .find(|bank| bank.id == assigned)
            .cloned()
            .map(PaymentTarget::Account)
    }
}

async fn fetch<B: FranchiseBackend + ?Sized>(backend: &B, email: &str) -> Result<ApplicationRecord> {
    backend.application_by_email(email).await
}

/// Owns the polling task; dropping it stops the polling.
#[derive(Debug)]
pub struct PollingHandle {
    task: JoinHandle<()>,
}

impl PollingHandle {
    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Countdown shown while the payment modal is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCountdown {
    remaining: u64,
    open: bool,
}

impl Default for PaymentCountdown {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentCountdown {
    pub fn new() -> Self {
        Self {
            remaining: PAYMENT_WINDOW.as_secs(),
            open: false,
        }
    }

    /// Open the modal with a full window. Restarting resets the clock.
    pub fn open(&mut self) {
        self.remaining = PAYMENT_WINDOW.as_secs();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_secs(self.remaining)
    }

    /// One second passed. Returns the expiry notice when time runs out,
    /// which also closes the modal.
    pub fn tick(&mut self) -> Option<Notice> {
        if !self.open {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.open = false;
            return Some(Notice::error("Payment session expired. Please try again."));
        }
        None
    }

    /// `m:ss`
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
