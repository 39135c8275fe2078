//! SMS notification transport
//!
//! Delivers OTPs and due-date reminders through a Twilio-compatible REST
//! gateway. Numbers without an international prefix get the configured
//! country code prepended before dispatch.

use async_trait::async_trait;

use crate::{
    config::SmsConfig,
    error::{AppError, AppResult},
};

/// Outbound text-message channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, mobile: &str, message: &str) -> AppResult<()>;
}

pub struct SmsNotifier {
    config: SmsConfig,
    client: reqwest::Client,
}

impl SmsNotifier {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn normalize(&self, mobile: &str) -> String {
        if mobile.starts_with('+') {
            mobile.to_string()
        } else {
            format!("{}{}", self.config.country_prefix, mobile)
        }
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    async fn send(&self, mobile: &str, message: &str) -> AppResult<()> {
        let to = self.normalize(mobile);
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_url, self.config.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", message),
            ])
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("SMS dispatch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Notification(format!(
                "SMS gateway returned {}",
                response.status()
            )));
        }

        tracing::debug!(to = %to, "sent SMS");
        Ok(())
    }
}
