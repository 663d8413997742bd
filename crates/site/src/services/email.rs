//! Email service for contact notifications and auto-replies.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and plain text
//! templates. Every message goes out as `multipart/alternative`.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
    transport::stub::{AsyncStubTransport, Error as StubError},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use social_culture_core::{ContactMessage, TicketId};

use crate::config::EmailConfig;
use crate::filters;

/// Display name used on the auto-reply.
pub const SENDER_NAME: &str = "Social Culture";

/// Subject of the owner notification.
pub const NOTIFICATION_SUBJECT: &str = "رسالة جديدة من الموقع";

/// HTML template for the owner notification.
#[derive(Template)]
#[template(path = "email/contact_notification.html")]
struct ContactNotificationHtml<'a> {
    contact: &'a ContactMessage,
}

/// Plain text template for the owner notification.
#[derive(Template)]
#[template(path = "email/contact_notification.txt")]
struct ContactNotificationText<'a> {
    contact: &'a ContactMessage,
}

/// HTML template for the sender's auto-reply.
#[derive(Template)]
#[template(path = "email/auto_reply.html")]
struct AutoReplyHtml<'a> {
    name: &'a str,
    ticket: &'a TicketId,
    whatsapp_url: &'a str,
}

/// Plain text template for the sender's auto-reply.
#[derive(Template)]
#[template(path = "email/auto_reply.txt")]
struct AutoReplyText<'a> {
    name: &'a str,
    ticket: &'a TicketId,
    whatsapp_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// In-memory transport error.
    #[error("Stub transport error: {0}")]
    Stub(#[from] StubError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Outgoing transport.
#[derive(Clone)]
enum Mailer {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Stub(AsyncStubTransport),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: Mailer,
    owner: Mailbox,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// The configured username doubles as the owner's address: it receives
    /// notifications and is the sender of auto-replies.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid or the username is not an
    /// email address.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer: Mailer::Smtp(mailer),
            owner: parse_mailbox(&config.username)?,
        })
    }

    /// Create an email service that records messages in memory.
    ///
    /// # Errors
    ///
    /// Returns error if `owner` is not an email address.
    pub fn stub(owner: &str, transport: AsyncStubTransport) -> Result<Self, EmailError> {
        Ok(Self {
            mailer: Mailer::Stub(transport),
            owner: parse_mailbox(owner)?,
        })
    }

    /// Address that receives contact notifications.
    #[must_use]
    pub fn owner(&self) -> &Mailbox {
        &self.owner
    }

    /// Notify the site owner about a new contact message.
    ///
    /// Replies go straight to the sender.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_contact_notification(
        &self,
        contact: &ContactMessage,
    ) -> Result<(), EmailError> {
        let html = ContactNotificationHtml { contact }.render()?;
        let text = ContactNotificationText { contact }.render()?;

        let message = Message::builder()
            .from(self.owner.clone())
            .reply_to(parse_mailbox(contact.email.as_str())?)
            .to(self.owner.clone())
            .subject(NOTIFICATION_SUBJECT)
            .multipart(alternative(&text, &html))?;

        self.send(message, NOTIFICATION_SUBJECT).await
    }

    /// Confirm receipt to the person who wrote in.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_auto_reply(
        &self,
        contact: &ContactMessage,
        ticket: &TicketId,
        whatsapp_url: &str,
    ) -> Result<(), EmailError> {
        let name = contact.name.as_str();
        let html = AutoReplyHtml {
            name,
            ticket,
            whatsapp_url,
        }
        .render()?;
        let text = AutoReplyText {
            name,
            ticket,
            whatsapp_url,
        }
        .render()?;

        let subject = auto_reply_subject(ticket);
        let from = Mailbox::new(Some(SENDER_NAME.to_string()), self.owner.email.clone());

        let message = Message::builder()
            .from(from)
            .to(parse_mailbox(contact.email.as_str())?)
            .subject(subject.as_str())
            .multipart(alternative(&text, &html))?;

        self.send(message, &subject).await
    }

    async fn send(&self, message: Message, subject: &str) -> Result<(), EmailError> {
        match &self.mailer {
            Mailer::Smtp(transport) => {
                transport.send(message).await?;
            }
            Mailer::Stub(transport) => {
                transport.send(message).await?;
            }
        }

        tracing::info!(subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Subject line of the auto-reply for a ticket.
#[must_use]
pub fn auto_reply_subject(ticket: &TicketId) -> String {
    format!("تم استلام رسالتك ✔ | Ticket {ticket}")
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

fn alternative(text_body: &str, html_body: &str) -> MultiPart {
    MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text_body.to_string()),
        )
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html_body.to_string()),
        )
}
