//! Contact form relay and chat deep-link.
//!
//! The contact page posts its form straight to a transactional-email relay
//! (EmailJS-compatible JSON endpoint). [`ContactForm`] is the same contract
//! for the CLI: validate, send through a [`Relay`], notify once, and clear
//! the fields only when the relay accepted the message.

use crate::config::{ChatConfig, ContactConfig};
use crate::content::ContactInfo;
use crate::notify::{Notification, Notifier};
use serde::Serialize;
use thiserror::Error;

pub const SENT_MESSAGE: &str = "Message sent successfully! We'll get back to you soon.";
pub const FAILED_MESSAGE: &str = "Oops! Something went wrong, please try again.";

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("'{0}' is not an email address")]
    InvalidEmail(String),
    #[error("contact relay is not configured (set [contact] service_id, template_id and public_key)")]
    NotConfigured,
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Form fields, named the way the relay template expects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub user_name: String,
    pub user_email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), ContactError> {
        for (field, value) in [
            ("user_name", &self.user_name),
            ("user_email", &self.user_email),
            ("subject", &self.subject),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(ContactError::Missing { field });
            }
        }
        if !looks_like_email(&self.user_email) {
            return Err(ContactError::InvalidEmail(self.user_email.clone()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// JSON body of the relay's send endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayRequest<'a> {
    pub service_id: &'a str,
    pub template_id: &'a str,
    pub user_id: &'a str,
    pub template_params: &'a ContactMessage,
}

impl<'a> RelayRequest<'a> {
    pub fn new(config: &'a ContactConfig, message: &'a ContactMessage) -> Self {
        Self {
            service_id: &config.service_id,
            template_id: &config.template_id,
            user_id: &config.public_key,
            template_params: message,
        }
    }
}

pub trait Relay {
    fn send(&self, request: &RelayRequest<'_>) -> Result<(), ContactError>;
}

/// Posts to the configured relay endpoint.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Relay for HttpRelay {
    fn send(&self, request: &RelayRequest<'_>) -> Result<(), ContactError> {
        let response = self.client.post(&self.endpoint).json(request).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(ContactError::Rejected {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

/// A filled-in contact form bound to the relay config.
#[derive(Debug)]
pub struct ContactForm<'a> {
    config: &'a ContactConfig,
    pub fields: ContactMessage,
}

impl<'a> ContactForm<'a> {
    pub fn new(config: &'a ContactConfig) -> Self {
        Self {
            config,
            fields: ContactMessage::default(),
        }
    }

    pub fn with_fields(config: &'a ContactConfig, fields: ContactMessage) -> Self {
        Self { config, fields }
    }

    /// Validate and send. Invalid input is rejected before the relay is
    /// contacted and without a notification; a relay outcome notifies once.
    pub fn submit(&mut self, relay: &dyn Relay, notifier: &dyn Notifier) -> Result<(), ContactError> {
        self.fields.validate()?;
        if !self.config.is_configured() {
            return Err(ContactError::NotConfigured);
        }
        match relay.send(&RelayRequest::new(self.config, &self.fields)) {
            Ok(()) => {
                tracing::info!(subject = %self.fields.subject, "contact message sent");
                self.fields = ContactMessage::default();
                notifier.notify(Notification::success(SENT_MESSAGE));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "contact relay failed");
                notifier.notify(Notification::error(FAILED_MESSAGE));
                Err(e)
            }
        }
    }
}

// =============================================================================
// Chat deep-link
// =============================================================================

/// `https://wa.me/<digits>`. Anything but digits is dropped.
pub fn whatsapp_link(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!("https://wa.me/{digits}")
}

/// The chat number: stored contact info first, then config. `None` hides
/// the chat button.
pub fn chat_number(info: Option<&ContactInfo>, config: &ChatConfig) -> Option<String> {
    info.and_then(|i| i.whatsapp_number.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| Some(config.whatsapp_number.trim()).filter(|n| !n.is_empty()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::test_helpers::RecordingNotifier;
    use std::cell::RefCell;

    /// Relay double that records payloads and answers with a fixed outcome.
    struct ScriptedRelay {
        reject: bool,
        sent: RefCell<Vec<serde_json::Value>>,
    }

    impl ScriptedRelay {
        fn accepting() -> Self {
            Self {
                reject: false,
                sent: RefCell::new(Vec::new()),
            }
        }

        fn rejecting() -> Self {
            Self {
                reject: true,
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Relay for ScriptedRelay {
        fn send(&self, request: &RelayRequest<'_>) -> Result<(), ContactError> {
            self.sent
                .borrow_mut()
                .push(serde_json::to_value(request).unwrap());
            if self.reject {
                return Err(ContactError::Rejected {
                    status: 400,
                    body: "The user_id parameter is invalid".into(),
                });
            }
            Ok(())
        }
    }

    fn configured() -> ContactConfig {
        ContactConfig {
            service_id: "service_test".into(),
            template_id: "template_test".into(),
            public_key: "pk_test".into(),
            ..ContactConfig::default()
        }
    }

    fn filled() -> ContactMessage {
        ContactMessage {
            user_name: "Ada".into(),
            user_email: "ada@example.com".into(),
            subject: "New site".into(),
            message: "We need a landing page.".into(),
        }
    }

    // =========================================================================
    // submit
    // =========================================================================

    #[test]
    fn success_clears_form_and_notifies() {
        let config = configured();
        let relay = ScriptedRelay::accepting();
        let notifier = RecordingNotifier::default();
        let mut form = ContactForm::with_fields(&config, filled());

        form.submit(&relay, &notifier).unwrap();

        assert!(form.fields.is_empty());
        assert_eq!(notifier.messages(), [SENT_MESSAGE]);
        assert_eq!(notifier.levels(), [Level::Success]);
    }

    #[test]
    fn payload_matches_relay_contract() {
        let config = configured();
        let relay = ScriptedRelay::accepting();
        let mut form = ContactForm::with_fields(&config, filled());
        form.submit(&relay, &RecordingNotifier::default()).unwrap();

        let sent = relay.sent.borrow();
        assert_eq!(sent[0]["service_id"], "service_test");
        assert_eq!(sent[0]["template_id"], "template_test");
        assert_eq!(sent[0]["user_id"], "pk_test");
        assert_eq!(sent[0]["template_params"]["user_email"], "ada@example.com");
    }

    #[test]
    fn failure_keeps_fields() {
        let config = configured();
        let relay = ScriptedRelay::rejecting();
        let notifier = RecordingNotifier::default();
        let mut form = ContactForm::with_fields(&config, filled());

        let err = form.submit(&relay, &notifier).unwrap_err();

        assert!(matches!(err, ContactError::Rejected { status: 400, .. }));
        assert_eq!(form.fields, filled());
        assert_eq!(notifier.messages(), [FAILED_MESSAGE]);
        assert_eq!(notifier.levels(), [Level::Error]);
    }

    #[test]
    fn invalid_input_never_reaches_relay() {
        let config = configured();
        let relay = ScriptedRelay::accepting();
        let notifier = RecordingNotifier::default();
        let mut form = ContactForm::with_fields(
            &config,
            ContactMessage {
                subject: "  ".into(),
                ..filled()
            },
        );

        let err = form.submit(&relay, &notifier).unwrap_err();
        assert!(matches!(err, ContactError::Missing { field: "subject" }));

        form.fields = ContactMessage {
            user_email: "not-an-email".into(),
            ..filled()
        };
        assert!(matches!(
            form.submit(&relay, &notifier),
            Err(ContactError::InvalidEmail(_))
        ));
        assert!(relay.sent.borrow().is_empty());
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn unconfigured_relay_is_rejected() {
        let config = ContactConfig::default();
        let relay = ScriptedRelay::accepting();
        let mut form = ContactForm::with_fields(&config, filled());
        assert!(matches!(
            form.submit(&relay, &RecordingNotifier::default()),
            Err(ContactError::NotConfigured)
        ));
        assert!(relay.sent.borrow().is_empty());
    }

    // =========================================================================
    // Chat link
    // =========================================================================

    #[test]
    fn link_keeps_digits_only() {
        assert_eq!(whatsapp_link("+44 7355 612987"), "https://wa.me/447355612987");
    }

    #[test]
    fn stored_number_wins_over_config() {
        let config = ChatConfig {
            whatsapp_number: "15550100".into(),
        };
        let info = ContactInfo {
            id: String::new(),
            revision: 0,
            email: "hi@example.com".into(),
            phone: String::new(),
            address: String::new(),
            whatsapp_number: Some("447355612987".into()),
        };
        assert_eq!(chat_number(Some(&info), &config).as_deref(), Some("447355612987"));

        let blank = ContactInfo {
            whatsapp_number: Some(" ".into()),
            ..info
        };
        assert_eq!(chat_number(Some(&blank), &config).as_deref(), Some("15550100"));
        assert_eq!(chat_number(None, &ChatConfig::default()), None);
    }
}
