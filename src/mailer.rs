use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::AppConfig;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound mail seam. Implementations report success as a value so the
/// caller decides whether a failed dispatch fails the whole request
/// (send-link path) or is merely logged (status notifications).
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> bool;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .context("failed to create SMTP transport")?
            .port(config.smtp_port)
            .timeout(Some(SMTP_TIMEOUT));

        if let (Some(username), Some(password)) =
            (config.smtp_username.clone(), config.smtp_password.clone())
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.mail_from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> bool {
        let message = match build_message(&self.from, to, subject, html) {
            Ok(message) => message,
            Err(err) => {
                error!(error = %err, to = %to, "failed to build outbound email");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                info!(to = %to, subject = %subject, "email dispatched");
                true
            }
            Err(err) => {
                error!(error = %err, to = %to, subject = %subject, "email dispatch failed");
                false
            }
        }
    }
}

fn build_message(from: &str, to: &str, subject: &str, html: &str) -> Result<Message> {
    Ok(Message::builder()
        .from(from.parse().context("invalid from address")?)
        .to(to.parse().context("invalid to address")?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html.to_string())
        .context("failed to build email")?)
}

pub fn onboarding_link_email(first_name: &str, link: &str) -> (String, String) {
    let subject = "Complete your driver onboarding".to_string();
    let html = format!(
        "<p>Hi {first_name},</p>\
         <p>Thanks for applying to drive with us. Use the link below to add your \
         vehicle details and upload your documents. The link is valid for 7 days \
         and stops working once you submit.</p>\
         <p><a href=\"{link}\">Complete your onboarding</a></p>\
         <p>If the button does not work, copy this address into your browser:<br>{link}</p>"
    );
    (subject, html)
}

pub fn application_decision_email(first_name: &str, approved: bool) -> (String, String) {
    if approved {
        (
            "Your driver application has been approved".to_string(),
            format!(
                "<p>Hi {first_name},</p>\
                 <p>Good news: your application and documents have been approved. \
                 We will be in touch shortly with your start details.</p>"
            ),
        )
    } else {
        (
            "Update on your driver application".to_string(),
            format!(
                "<p>Hi {first_name},</p>\
                 <p>We are sorry to let you know that your application was not \
                 successful this time. You are welcome to apply again in future.</p>"
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_email_contains_the_link_twice() {
        let (subject, html) =
            onboarding_link_email("Ada", "https://example.com/driver/onboarding?token=abc");
        assert!(subject.contains("onboarding"));
        assert_eq!(
            html.matches("https://example.com/driver/onboarding?token=abc")
                .count(),
            2
        );
    }

    #[test]
    fn rejects_invalid_addresses() {
        assert!(build_message("not-an-address", "a@b.c", "s", "<p>x</p>").is_err());
        assert!(build_message("a@b.c", "not-an-address", "s", "<p>x</p>").is_err());
    }
}
