//! Outbound email.
//!
//! Delivery is best-effort everywhere it is used: a failed send is logged
//! and never fails the operation that triggered it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::MailConfig;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Writes mail to the log instead of sending it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        info!(to, subject, "Mail delivery disabled, message not sent");
        Ok(())
    }
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from_address
            .parse()
            .with_context(|| format!("Invalid mail.from_address: {}", config.from_address))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .with_context(|| format!("Invalid SMTP host: {}", config.smtp_host))?
            .port(config.smtp_port);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(SmtpCredentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().with_context(|| format!("Invalid recipient: {to}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .context("Failed to build email")?;

        self.transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;

        Ok(())
    }
}

/// Sends and swallows any failure after logging it.
pub async fn send_best_effort(notifier: &dyn Notifier, to: &str, subject: &str, body: &str) {
    if let Err(e) = notifier.send(to, subject, body).await {
        metrics::counter!("notifications_failed_total").increment(1);
        warn!(error = %e, to, subject, "Failed to send notification");
    }
}

/// Subject and HTML body for each outgoing message.
pub mod templates {
    use html_escape::encode_text;

    pub fn registration_otp(code: &str) -> (&'static str, String) {
        (
            "Verify Your Account - OTP",
            format!(
                "<h1>Welcome to Hotel Booking!</h1>\
                 <p>Your OTP is <b>{}</b>. It expires in 15 minutes.</p>",
                encode_text(code)
            ),
        )
    }

    pub fn login_otp(username: &str, code: &str) -> (&'static str, String) {
        (
            "Your Login Verification Code",
            format!(
                "<p>Hello {},</p><p>Your login code is <b>{}</b>. It expires in 15 minutes.</p>",
                encode_text(username),
                encode_text(code)
            ),
        )
    }

    pub fn login_success(username: &str) -> (&'static str, String) {
        (
            "Login Successful",
            format!(
                "<p>Hello {},</p>\
                 <p>You have successfully logged into your Hotel Booking account.</p>\
                 <p>If this wasn't you, please contact our support team immediately.</p>",
                encode_text(username)
            ),
        )
    }

    pub fn password_reset_otp(code: &str) -> (&'static str, String) {
        (
            "Your OTP for Password Reset",
            format!(
                "<p>Your OTP code is <b>{}</b>. It expires in 15 minutes.</p>",
                encode_text(code)
            ),
        )
    }

    pub fn payment_confirmed(username: &str, booking_id: i32, total_cents: i64) -> (&'static str, String) {
        (
            "Booking Payment Confirmed",
            format!(
                "<p>Hello {},</p><p>We received your payment of <b>{}.{:02}</b> for booking #{}.</p>",
                encode_text(username),
                total_cents / 100,
                total_cents % 100,
                booking_id
            ),
        )
    }

}
