//! Mail send (`POST /v3/mail/send`).
//!
//! An [`Email`] is both the request and its JSON body. The API answers
//! `202 Accepted` with an empty body, so the model is `()`.
//!
//! ```ignore
//! use sendkit::api::mail::{Address, Content, Email, Personalization};
//!
//! let email = Email::new(
//!     Address::new("news@example.com"),
//!     Personalization::to(Address::named("ada@example.com", "Ada")),
//! )
//! .subject("Hello")
//! .content(Content::plain("Hi Ada!"));
//!
//! session.send(&email).await?;
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    Binary, EncodingStrategy, Method, Request, Timestamp, Validate, ValidationError,
};

// ============================================================================
// Value Objects
// ============================================================================

/// An email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    /// The address itself.
    #[validate(email)]
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
}

impl Address {
    /// Address without display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Address with a display name.
    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

/// Recipients and per-recipient overrides of a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Validate)]
pub struct Personalization {
    /// Primary recipients.
    #[validate(count(min = 1, max = 1000), nested)]
    pub to: Vec<Address>,
    /// Carbon copy recipients.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub cc: Vec<Address>,
    /// Blind carbon copy recipients.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub bcc: Vec<Address>,
    /// Subject override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Data for dynamic templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_template_data: Option<serde_json::Value>,
    /// Scheduled delivery override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_at: Option<Timestamp>,
}

impl Personalization {
    /// Personalization with a single recipient.
    #[must_use]
    pub fn to(recipient: Address) -> Self {
        Self {
            to: vec![recipient],
            ..Self::default()
        }
    }

    /// Add a primary recipient.
    #[must_use]
    pub fn add_to(mut self, recipient: Address) -> Self {
        self.to.push(recipient);
        self
    }

    /// Add a carbon copy recipient.
    #[must_use]
    pub fn cc(mut self, recipient: Address) -> Self {
        self.cc.push(recipient);
        self
    }

    /// Add a blind carbon copy recipient.
    #[must_use]
    pub fn bcc(mut self, recipient: Address) -> Self {
        self.bcc.push(recipient);
        self
    }

    /// Set template data.
    #[must_use]
    pub fn dynamic_template_data(mut self, data: serde_json::Value) -> Self {
        self.dynamic_template_data = Some(data);
        self
    }
}

/// A body part of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    /// MIME type, e.g. `text/plain`.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// The content.
    pub value: String,
}

impl Content {
    /// `text/plain` content.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            mime_type: "text/plain".to_string(),
            value: value.into(),
        }
    }

    /// `text/html` content.
    pub fn html(value: impl Into<String>) -> Self {
        Self {
            mime_type: "text/html".to_string(),
            value: value.into(),
        }
    }
}

/// How an attachment is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Displayed in the body, referenced by its content id.
    Inline,
    /// Offered as a download.
    Attachment,
}

/// A file attached to the message. The content is sent base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[validate(custom = "Attachment::check")]
pub struct Attachment {
    /// Raw file content.
    pub content: Binary,
    /// File name shown to recipients.
    pub filename: String,
    /// MIME type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<Disposition>,
    /// Identifier referenced from inline HTML.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

impl Attachment {
    /// Attachment offered as a download.
    pub fn new(filename: impl Into<String>, content: impl Into<Binary>) -> Self {
        Self {
            content: content.into(),
            filename: filename.into(),
            mime_type: None,
            disposition: None,
            content_id: None,
        }
    }

    /// Set the MIME type.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Display the attachment inline under the given content id.
    #[must_use]
    pub fn inline(mut self, content_id: impl Into<String>) -> Self {
        self.disposition = Some(Disposition::Inline);
        self.content_id = Some(content_id.into());
        self
    }

    fn check(&self) -> Result<(), ValidationError> {
        if self.filename.is_empty() {
            return Err(ValidationError::invalid_value("filename", "must not be empty"));
        }
        if self.disposition == Some(Disposition::Inline) && self.content_id.is_none() {
            return Err(ValidationError::invalid_value(
                "content_id",
                "required for inline attachments",
            ));
        }
        Ok(())
    }
}

/// A toggle. `enable` is always sent, even when `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Setting {
    /// Whether the setting is on.
    pub enable: bool,
}

impl Setting {
    /// Turned on.
    pub const ON: Self = Self { enable: true };
    /// Turned off.
    pub const OFF: Self = Self { enable: false };
}

/// Delivery settings of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MailSettings {
    /// Ignore unsubscribe groups and suppressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_list_management: Option<Setting>,
    /// Validate the request without delivering it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox_mode: Option<Setting>,
}

// ============================================================================
// Mail Send
// ============================================================================

/// A message to send.
///
/// Scheduled delivery times are sent as seconds since the Unix epoch.
/// Impersonating a subuser is not allowed for this endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[validate(custom = "Email::check_body")]
pub struct Email {
    /// Recipients, each with its own overrides.
    #[validate(count(min = 1, max = 1000), nested)]
    pub personalizations: Vec<Personalization>,
    /// Sender.
    #[validate(nested)]
    pub from: Address,
    /// Reply-to address.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub reply_to: Option<Address>,
    /// Default subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Body parts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
    /// Attached files.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub attachments: Vec<Attachment>,
    /// Template to render instead of `content`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Categories used for statistics.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[validate(count(min = 0, max = 10))]
    pub categories: Vec<String>,
    /// Scheduled delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_at: Option<Timestamp>,
    /// Batch the message belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// Delivery settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_settings: Option<MailSettings>,
}

impl Email {
    /// A message from `from` to the recipients of `personalization`.
    #[must_use]
    pub fn new(from: Address, personalization: Personalization) -> Self {
        Self {
            personalizations: vec![personalization],
            from,
            reply_to: None,
            subject: None,
            content: Vec::new(),
            attachments: Vec::new(),
            template_id: None,
            categories: Vec::new(),
            send_at: None,
            batch_id: None,
            mail_settings: None,
        }
    }

    /// Add another personalization.
    #[must_use]
    pub fn personalization(mut self, personalization: Personalization) -> Self {
        self.personalizations.push(personalization);
        self
    }

    /// Set the reply-to address.
    #[must_use]
    pub fn reply_to(mut self, address: Address) -> Self {
        self.reply_to = Some(address);
        self
    }

    /// Set the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Add a body part.
    #[must_use]
    pub fn content(mut self, content: Content) -> Self {
        self.content.push(content);
        self
    }

    /// Add an attachment.
    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Render a template.
    #[must_use]
    pub fn template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Add a category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Schedule delivery.
    #[must_use]
    pub const fn send_at(mut self, at: Timestamp) -> Self {
        self.send_at = Some(at);
        self
    }

    /// Set the delivery settings.
    #[must_use]
    pub const fn mail_settings(mut self, settings: MailSettings) -> Self {
        self.mail_settings = Some(settings);
        self
    }

    fn check_body(&self) -> Result<(), ValidationError> {
        if self.content.is_empty() && self.template_id.is_none() {
            return Err(ValidationError::invalid_value(
                "content",
                "required unless a template_id is set",
            ));
        }
        if self.content.iter().any(|part| part.value.is_empty()) {
            return Err(ValidationError::invalid_value(
                "content",
                "parts must not be empty",
            ));
        }
        Ok(())
    }
}

impl Request for Email {
    type Params = Self;
    type Model = ();

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self) -> String {
        "/v3/mail/send".to_string()
    }

    fn parameters(&self) -> Option<&Self> {
        Some(self)
    }

    fn encoding_strategy(&self) -> EncodingStrategy {
        EncodingStrategy::unix_seconds()
    }

    fn supports_impersonation(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::{Encoded, Validatable};

    use super::*;

    fn email() -> Email {
        Email::new(
            Address::named("news@example.com", "News"),
            Personalization::to(Address::new("ada@example.com")),
        )
        .subject("Hello")
        .content(Content::plain("Hi!"))
    }

    #[test]
    fn valid_email() {
        assert_eq!(email().validate(), Ok(()));
        assert!(!email().supports_impersonation());
    }

    #[test]
    fn body_keeps_field_order() {
        let email = email()
            .send_at(Timestamp::from_unix(1_700_000_000).expect("timestamp"))
            .mail_settings(MailSettings {
                sandbox_mode: Some(Setting::OFF),
                ..MailSettings::default()
            });

        let Encoded::Body { bytes, .. } = email.encode_parameters().expect("encode") else {
            panic!("mail send has a body");
        };
        insta::assert_snapshot!(
            String::from_utf8(bytes.to_vec()).expect("utf8"),
            @r#"{"personalizations":[{"to":[{"email":"ada@example.com"}]}],"from":{"email":"news@example.com","name":"News"},"subject":"Hello","content":[{"type":"text/plain","value":"Hi!"}],"send_at":1700000000,"mail_settings":{"sandbox_mode":{"enable":false}}}"#
        );
    }

    #[test]
    fn attachment_is_base64() {
        let email = email().attachment(
            Attachment::new("hello.txt", &b"hello"[..]).mime_type("text/plain"),
        );

        let Encoded::Body { bytes, .. } = email.encode_parameters().expect("encode") else {
            panic!("mail send has a body");
        };
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(
            json["attachments"],
            serde_json::json!([{"content": "aGVsbG8=", "filename": "hello.txt", "type": "text/plain"}])
        );
    }

    #[test]
    fn content_or_template_is_required() {
        let mut email = email();
        email.content.clear();
        assert_eq!(
            email.validate(),
            Err(ValidationError::invalid_value(
                "content",
                "required unless a template_id is set"
            ))
        );

        let email = email.template_id("d-123");
        assert_eq!(email.validate(), Ok(()));
    }

    #[test]
    fn first_violation_wins() {
        let mut email = email();
        email.from = Address::new("not-an-address");
        email.personalizations.clear();

        assert_eq!(
            email.validate(),
            Err(ValidationError::InvalidCount {
                field: "personalizations",
                count: 0,
                range: 1..=1000,
            })
        );

        email.personalizations.push(Personalization::to(Address::new("bob@example.com")));
        assert_eq!(
            email.validate(),
            Err(ValidationError::MalformedEmailAddress("not-an-address".to_string()))
        );
    }

    #[test]
    fn recipients_are_checked_in_order() {
        let personalization = Personalization::to(Address::new("ok@example.com"))
            .add_to(Address::new("first@bad"))
            .cc(Address::new("second@bad"));

        assert_eq!(
            personalization.validate(),
            Err(ValidationError::MalformedEmailAddress("first@bad".to_string()))
        );
        assert!(matches!(
            Personalization::default().validate(),
            Err(ValidationError::InvalidCount { field: "to", .. })
        ));
    }

    #[test]
    fn inline_attachment_needs_content_id() {
        let mut attachment = Attachment::new("logo.png", vec![1, 2, 3]).inline("logo");
        assert_eq!(attachment.validate(), Ok(()));

        attachment.content_id = None;
        assert!(matches!(
            attachment.validate(),
            Err(ValidationError::InvalidValue { field: "content_id", .. })
        ));
    }

    #[test]
    fn categories_are_limited() {
        let email = (0..11).fold(email(), |email, i| email.category(format!("c{i}")));
        assert!(matches!(
            email.validate(),
            Err(ValidationError::InvalidCount { field: "categories", count: 11, .. })
        ));
    }
}
