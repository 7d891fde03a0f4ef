pub mod report;

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use ordercheck_core::CheckError;

pub use report::Report;

/// Sends one plain-text report per run over an authenticated STARTTLS relay.
/// The SMTP connection lives only for the single send.
pub struct Notifier {
    host: String,
    port: u16,
    user: String,
    password: String,
    recipient: String,
}

impl Notifier {
    pub fn new(host: &str, port: u16, user: &str, password: &str, recipient: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            user: user.to_string(),
            password: password.to_string(),
            recipient: recipient.to_string(),
        }
    }

    pub fn send(&self, report: &Report) -> Result<(), CheckError> {
        let message = Message::builder()
            .from(self.user.parse().map_err(|e| CheckError::Mail(format!("bad sender address: {}", e)))?)
            .to(self
                .recipient
                .parse()
                .map_err(|e| CheckError::Mail(format!("bad recipient address: {}", e)))?)
            .subject(report.subject.clone())
            .body(report.body.clone())
            .map_err(|e| CheckError::Mail(format!("cannot build message: {}", e)))?;

        let transport = SmtpTransport::starttls_relay(&self.host)
            .map_err(|e| CheckError::Mail(format!("smtp relay: {}", e)))?
            .port(self.port)
            .credentials(Credentials::new(self.user.clone(), self.password.clone()))
            .build();

        transport
            .send(&message)
            .map_err(|e| CheckError::Mail(format!("smtp send: {}", e)))?;

        info!(to = %self.recipient, subject = %report.subject, "report sent");
        Ok(())
    }
}
