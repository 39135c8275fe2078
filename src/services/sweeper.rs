//! Reminder and retention sweeper
//!
//! Two independent periodic passes over the loan store: one texts users
//! whose loans come due soon, one purges returned records past the
//! retention cutoff. A failure on one item never aborts the rest of a pass.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    clock::Clock,
    config::PolicyConfig,
    error::{AppError, AppResult},
    models::loan::Loan,
    repository::{AccountStore, CatalogStore, LoanStore, Repository},
    services::sms::Notifier,
};

pub struct Sweeper {
    repository: Repository,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    reminder_lead_days: i64,
    retention_days: i64,
    interval: Duration,
}

impl Sweeper {
    pub fn new(
        repository: Repository,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        policy: &PolicyConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            clock,
            reminder_lead_days: policy.reminder_lead_days,
            retention_days: policy.retention_days,
            interval: Duration::from_secs(policy.sweep_interval_secs),
        }
    }

    /// Start both passes on their own timers.
    pub fn spawn(self: Arc<Self>) {
        let sweeper = Arc::clone(&self);
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(sweeper.interval);
            loop {
                timer.tick().await;
                if let Err(err) = sweeper.reminder_pass().await {
                    tracing::error!("reminder pass failed: {}", err);
                }
            }
        });

        let sweeper = self;
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(sweeper.interval);
            loop {
                timer.tick().await;
                if let Err(err) = sweeper.retention_pass().await {
                    tracing::error!("retention pass failed: {}", err);
                }
            }
        });
    }

    /// Text every user whose unreturned loan is due in exactly
    /// `reminder_lead_days`. Returns how many reminders went out.
    pub async fn reminder_pass(&self) -> AppResult<usize> {
        let due = self.clock.today() + chrono::Duration::days(self.reminder_lead_days);
        let loans = self.repository.loans.find_due_on(due).await?;

        let mut sent = 0;
        for loan in &loans {
            match self.remind(loan).await {
                Ok(()) => sent += 1,
                Err(err) => {
                    tracing::warn!(loan = loan.id, "reminder skipped: {}", err);
                }
            }
        }

        tracing::info!(due = %due, sent, of = loans.len(), "reminder pass complete");
        Ok(sent)
    }

    async fn remind(&self, loan: &Loan) -> AppResult<()> {
        let user = self
            .repository
            .users
            .get(loan.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", loan.user_id)))?;
        let book = self
            .repository
            .books
            .get(loan.book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", loan.book_id)))?;

        let message = format!(
            "Reminder: Only {} days left to return \"{}\" (Due: {}).",
            self.reminder_lead_days, book.title, loan.due_date
        );
        self.notifier.send(&user.mobile, &message).await
    }

    /// Delete returned loans whose due date fell out of the retention
    /// window. Returns how many records were purged.
    pub async fn retention_pass(&self) -> AppResult<u64> {
        let cutoff = self.clock.today() - chrono::Duration::days(self.retention_days);
        let stale = self.repository.loans.find_returned_before(cutoff).await?;
        if stale.is_empty() {
            tracing::debug!("no returned loans past the retention cutoff");
            return Ok(0);
        }

        let ids: Vec<i64> = stale.iter().map(|loan| loan.id).collect();
        let deleted = self.repository.loans.delete_all(&ids).await?;
        tracing::info!(count = deleted, "purged returned loans past the retention cutoff");
        Ok(deleted)
    }
}
