//! Manual and simulated QR check-ins.

use rand::seq::SliceRandom;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use gymdesk_database::{CheckIn, CheckInMethod, CreateCheckInRequest, Member, Repository, StoreError};

/// How long a simulated QR scan takes.
pub const DEFAULT_SCAN_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum CheckInError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("No members available for a QR scan")]
    EmptyPool,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CheckInResult<T> = Result<T, CheckInError>;

/// Records check-ins against the check-in collection.
///
/// The scanning flag is published on a watch channel so a UI can show a
/// "scanning" state while a simulated scan is in flight.
pub struct CheckInRecorder {
    check_ins: Repository<CheckIn>,
    scan_delay: Duration,
    scanning: watch::Sender<bool>,
}

impl CheckInRecorder {
    pub fn new(check_ins: Repository<CheckIn>) -> Self {
        let (scanning, _) = watch::channel(false);
        Self {
            check_ins,
            scan_delay: DEFAULT_SCAN_DELAY,
            scanning,
        }
    }

    pub fn with_scan_delay(mut self, scan_delay: Duration) -> Self {
        self.scan_delay = scan_delay;
        self
    }

    pub fn scan_delay(&self) -> Duration {
        self.scan_delay
    }

    pub fn is_scanning(&self) -> bool {
        *self.scanning.borrow()
    }

    pub fn subscribe_scanning(&self) -> watch::Receiver<bool> {
        self.scanning.subscribe()
    }

    /// Record a manual check-in for `member_id`, which must name one of
    /// `members`. Nothing is written when validation fails.
    pub async fn check_in_member(
        &self,
        member_id: &str,
        members: &[Member],
    ) -> CheckInResult<CheckIn> {
        let member_id = member_id.trim();
        if member_id.is_empty() {
            return Err(CheckInError::Validation(
                "member id must not be empty".to_string(),
            ));
        }

        let member = members
            .iter()
            .find(|m| m.id == member_id)
            .ok_or_else(|| CheckInError::MemberNotFound(member_id.to_string()))?;

        self.record(member, CheckInMethod::Manual).await
    }

    /// Simulate a QR scan: wait for the scan delay, then check in a member
    /// picked uniformly at random.
    pub async fn check_in_random(&self, members: &[Member]) -> CheckInResult<CheckIn> {
        if members.is_empty() {
            return Err(CheckInError::EmptyPool);
        }

        let _scan = ScanGuard::start(&self.scanning);
        debug!(delay_ms = self.scan_delay.as_millis() as u64, "scanning");
        tokio::time::sleep(self.scan_delay).await;

        let member = members
            .choose(&mut rand::thread_rng())
            .ok_or(CheckInError::EmptyPool)?;
        self.record(member, CheckInMethod::Qr).await
    }

    async fn record(&self, member: &Member, method: CheckInMethod) -> CheckInResult<CheckIn> {
        let check_in = self
            .check_ins
            .create(CreateCheckInRequest::new(member.id.clone(), method))
            .await?;

        info!(
            member_id = %member.id,
            member = %member.full_name(),
            method = %method,
            "member checked in"
        );
        Ok(check_in)
    }
}

/// Holds the scanning flag up until dropped, including when the scan
/// future is cancelled mid-flight.
struct ScanGuard<'a>(&'a watch::Sender<bool>);

impl<'a> ScanGuard<'a> {
    fn start(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self(flag)
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}
