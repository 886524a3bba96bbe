use crate::Result;
use crate::digest::Digest;
use crate::error::Error;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

/// Delivers a finished digest.
pub trait Notifier {
    fn send(&self, digest: &Digest) -> Result<()>;
}

/// Sends the digest as one HTML email per recipient, stopping at the first failure.
pub struct SmtpNotifier<T = SmtpTransport> {
    transport: T,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl SmtpNotifier<SmtpTransport> {
    /// Unauthenticated plaintext relay such as a local debugging SMTP server.
    pub fn local_relay(from: Mailbox, host: &str, port: u16) -> Self {
        let transport = SmtpTransport::builder_dangerous(host).port(port).build();
        let recipients = vec![from.clone()];
        Self::with_transport(transport, from, recipients)
    }

    /// Sends to the sender's own mailbox through an authenticated relay.
    pub fn direct_to_self(from: Mailbox, password: String, relay: &str) -> Result<Self> {
        let recipients = vec![from.clone()];
        Self::mailing_list(from, recipients, password, relay)
    }

    pub fn mailing_list(
        from: Mailbox,
        recipients: Vec<Mailbox>,
        password: String,
        relay: &str,
    ) -> Result<Self> {
        let credentials = Credentials::new(from.email.to_string(), password);
        let transport = SmtpTransport::relay(relay)
            .map_err(Error::delivery)?
            .credentials(credentials)
            .build();
        Ok(Self::with_transport(transport, from, recipients))
    }
}

impl<T> SmtpNotifier<T> {
    pub fn with_transport(transport: T, from: Mailbox, recipients: Vec<Mailbox>) -> Self {
        Self {
            transport,
            from,
            recipients,
        }
    }

    pub fn recipients(&self) -> &[Mailbox] {
        &self.recipients
    }

    fn build_message(&self, to: &Mailbox, digest: &Digest) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(to.clone())
            .subject(digest.subject.as_str())
            .multipart(MultiPart::alternative().singlepart(SinglePart::html(digest.body.clone())))
            .map_err(Error::delivery)
    }
}

impl<T> Notifier for SmtpNotifier<T>
where
    T: Transport,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    fn send(&self, digest: &Digest) -> Result<()> {
        for to in &self.recipients {
            info!(from = %self.from, to = %to, jobs = digest.job_count, "sending digest");
            let message = self.build_message(to, digest)?;
            self.transport.send(&message).map_err(Error::delivery)?;
        }
        Ok(())
    }
}

/// Logs the digest instead of sending it.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, digest: &Digest) -> Result<()> {
        info!(subject = %digest.subject, jobs = digest.job_count, "dry run, digest not sent");
        debug!(body = %digest.body);
        Ok(())
    }
}
