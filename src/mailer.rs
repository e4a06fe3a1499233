use std::sync::Arc;

use tracing::{error, info};

/// Outbound notification. Delivery is best-effort everywhere: a failed send
/// is logged and never fails the parent request.
#[derive(Debug)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Seam for the delivery transport. Constructor-injected so handlers never
/// touch a process-global client.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: OutgoingMail) -> anyhow::Result<()>;
}

/// Default transport: writes the message to the application log. Swapped for
/// a real SMTP/API client at the composition root in deployments that need
/// actual delivery.
pub struct LogMailer {
    pub from: String,
}

impl Mailer for LogMailer {
    fn send(&self, mail: OutgoingMail) -> anyhow::Result<()> {
        info!(
            from = %self.from,
            to = %mail.to,
            subject = %mail.subject,
            "outgoing mail"
        );
        Ok(())
    }
}

pub type SharedMailer = Arc<dyn Mailer>;

/// Fire-and-forget send; the only trace of a failure is the log line.
pub fn send_best_effort(mailer: &SharedMailer, mail: OutgoingMail) {
    let to = mail.to.clone();
    if let Err(e) = mailer.send(mail) {
        error!(error = %e, to = %to, "Failed to send notification mail");
    }
}
