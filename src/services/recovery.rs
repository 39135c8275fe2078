//! OTP-based credential recovery
//!
//! Each account holds at most one outstanding code; issuing a new one
//! overwrites the old. Codes live for a fixed window after generation and
//! are consumed on first successful verification.

use std::sync::Arc;

use chrono::Duration;
use rand::Rng;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    repository::AccountStore,
    services::{sms::Notifier, users},
};

#[derive(Clone)]
pub struct RecoveryService {
    accounts: Arc<dyn AccountStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    otp_window: Duration,
}

impl RecoveryService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        otp_window_secs: i64,
    ) -> Self {
        Self {
            accounts,
            notifier,
            clock,
            otp_window: Duration::seconds(otp_window_secs),
        }
    }

    /// Generate a 6-digit code, store it on the account and send it out.
    pub async fn request_otp(&self, mobile: &str) -> AppResult<()> {
        let mut user = self
            .accounts
            .find_by_mobile(mobile)
            .await?
            .ok_or_else(|| AppError::NotFound("Mobile number not registered".to_string()))?;

        let code = format!("{:06}", rand::thread_rng().gen_range(100_000..=999_999));
        user.otp_code = Some(code.clone());
        user.otp_generated_at = Some(self.clock.now());
        self.accounts.save(&user).await?;

        self.notifier
            .send(mobile, &format!("Your Library OTP is: {}", code))
            .await?;

        tracing::info!(user = user.id, "recovery OTP issued");
        Ok(())
    }

    /// Check a candidate code.
    ///
    /// Fails closed: unknown account, empty slot and expired window all
    /// come back `false` with no further signal. A match consumes the code;
    /// a wrong guess leaves it intact so the right one can still be tried
    /// until the window closes.
    pub async fn verify_otp(&self, mobile: &str, candidate: &str) -> AppResult<bool> {
        let Some(mut user) = self.accounts.find_by_mobile(mobile).await? else {
            return Ok(false);
        };
        let (Some(code), Some(generated_at)) = (user.otp_code.clone(), user.otp_generated_at)
        else {
            return Ok(false);
        };

        if self.clock.now() >= generated_at + self.otp_window {
            return Ok(false);
        }
        if code != candidate {
            return Ok(false);
        }

        user.otp_code = None;
        user.otp_generated_at = None;
        self.accounts.save(&user).await?;
        Ok(true)
    }

    /// Replace the account's credential.
    ///
    /// Callers are expected to have verified an OTP first; nothing here
    /// enforces that sequencing.
    pub async fn reset_password(&self, mobile: &str, new_password: &str) -> AppResult<()> {
        let mut user = self
            .accounts
            .find_by_mobile(mobile)
            .await?
            .ok_or_else(|| AppError::NotFound("Mobile number not registered".to_string()))?;

        user.password = users::hash_password(new_password)?;
        self.accounts.save(&user).await?;

        tracing::info!(user = user.id, "password reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        clock::fixed::FixedClock,
        models::user::{NewUser, Role},
        repository::memory::InMemoryAccounts,
        services::sms::MockNotifier,
    };

    const MOBILE: &str = "9999999999";

    fn clock() -> Arc<FixedClock> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc();
        Arc::new(FixedClock::at(start))
    }

    fn quiet_notifier() -> Arc<MockNotifier> {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().returning(|_, _| Ok(()));
        Arc::new(notifier)
    }

    async fn accounts_with_user() -> Arc<InMemoryAccounts> {
        let accounts = Arc::new(InMemoryAccounts::new());
        accounts
            .insert(NewUser {
                name: "Asha Reader".to_string(),
                email: "asha@example.org".to_string(),
                password: "hash".to_string(),
                role: Role::User,
                mobile: MOBILE.to_string(),
            })
            .await
            .unwrap();
        accounts
    }

    fn service(
        accounts: Arc<InMemoryAccounts>,
        notifier: Arc<MockNotifier>,
        clock: Arc<FixedClock>,
    ) -> RecoveryService {
        RecoveryService::new(accounts, notifier, clock, 120)
    }

    async fn stored_code(accounts: &InMemoryAccounts) -> Option<String> {
        accounts
            .find_by_mobile(MOBILE)
            .await
            .unwrap()
            .unwrap()
            .otp_code
    }

    #[tokio::test]
    async fn request_issues_six_digit_code_and_sends_it() {
        let accounts = accounts_with_user().await;
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .withf(|mobile, message| {
                mobile == MOBILE && message.starts_with("Your Library OTP is: ")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(accounts.clone(), Arc::new(notifier), clock());
        service.request_otp(MOBILE).await.unwrap();

        let code = stored_code(&accounts).await.unwrap();
        assert_eq!(code.len(), 6);
        let value: u32 = code.parse().unwrap();
        assert!((100_000..=999_999).contains(&value));
    }

    #[tokio::test]
    async fn request_for_unknown_mobile_is_not_found() {
        let accounts = Arc::new(InMemoryAccounts::new());
        let service = service(accounts, quiet_notifier(), clock());
        let result = service.request_otp("0000000000").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn correct_code_inside_window_verifies_once() {
        let accounts = accounts_with_user().await;
        let clock = clock();
        let service = service(accounts.clone(), quiet_notifier(), clock.clone());

        service.request_otp(MOBILE).await.unwrap();
        let code = stored_code(&accounts).await.unwrap();

        clock.advance(Duration::seconds(90));
        assert!(service.verify_otp(MOBILE, &code).await.unwrap());

        // Consumed: the same code no longer verifies
        assert_eq!(stored_code(&accounts).await, None);
        assert!(!service.verify_otp(MOBILE, &code).await.unwrap());
    }

    #[tokio::test]
    async fn expired_code_fails_closed() {
        let accounts = accounts_with_user().await;
        let clock = clock();
        let service = service(accounts.clone(), quiet_notifier(), clock.clone());

        service.request_otp(MOBILE).await.unwrap();
        let code = stored_code(&accounts).await.unwrap();

        clock.advance(Duration::seconds(121));
        assert!(!service.verify_otp(MOBILE, &code).await.unwrap());
    }

    #[tokio::test]
    async fn window_boundary_is_exclusive() {
        let accounts = accounts_with_user().await;
        let clock = clock();
        let service = service(accounts.clone(), quiet_notifier(), clock.clone());

        service.request_otp(MOBILE).await.unwrap();
        let code = stored_code(&accounts).await.unwrap();

        clock.advance(Duration::seconds(120));
        assert!(!service.verify_otp(MOBILE, &code).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_guess_keeps_the_code_alive() {
        let accounts = accounts_with_user().await;
        let clock = clock();
        let service = service(accounts.clone(), quiet_notifier(), clock.clone());

        service.request_otp(MOBILE).await.unwrap();
        let code = stored_code(&accounts).await.unwrap();

        assert!(!service.verify_otp(MOBILE, "000000").await.unwrap());
        // Still verifiable after the bad attempt
        assert!(service.verify_otp(MOBILE, &code).await.unwrap());
    }

    #[tokio::test]
    async fn new_request_overwrites_the_outstanding_code() {
        let accounts = accounts_with_user().await;
        let clock = clock();
        let service = service(accounts.clone(), quiet_notifier(), clock.clone());

        service.request_otp(MOBILE).await.unwrap();
        let first = stored_code(&accounts).await.unwrap();

        // Regenerate until the second code differs; the range makes a
        // collision overwhelmingly unlikely but not impossible
        let second = loop {
            service.request_otp(MOBILE).await.unwrap();
            let code = stored_code(&accounts).await.unwrap();
            if code != first {
                break code;
            }
        };

        assert!(!service.verify_otp(MOBILE, &first).await.unwrap());
        assert!(service.verify_otp(MOBILE, &second).await.unwrap());
    }

    #[tokio::test]
    async fn verify_for_unknown_mobile_is_false_not_error() {
        let accounts = Arc::new(InMemoryAccounts::new());
        let service = service(accounts, quiet_notifier(), clock());
        assert!(!service.verify_otp("0000000000", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn reset_password_replaces_the_hash() {
        let accounts = accounts_with_user().await;
        let service = service(accounts.clone(), quiet_notifier(), clock());

        service.reset_password(MOBILE, "new-secret").await.unwrap();

        let user = accounts.find_by_mobile(MOBILE).await.unwrap().unwrap();
        assert_ne!(user.password, "hash");
        assert!(users::verify_password(&user.password, "new-secret"));
    }
}
