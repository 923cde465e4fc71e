//! Inbound mail ingestion.
//!
//! Turns a raw inbound-parse envelope into a dispatch request: pick the
//! first recipient address out of the `To` header, match its local part
//! against the enabled addresses, decode the headers and body with their
//! declared charsets, and compose the relay message. Ingestion never
//! fails; whatever cannot be resolved is rejected and the mail is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use mail_parser::decoders::charsets::map::charset_decoder;
use mail_parser::decoders::html::html_to_text;
use mail_parser::parsers::MessageStream;
use tracing::{debug, warn};

use crate::metrics::record_ingest;
use mailcast_storage::{Recipient, Store, StoreError};

/// Inbound mail envelope as posted by the mail provider.
///
/// Header and body fields are kept as raw bytes: the provider forwards
/// them in their original encoding and `charsets` names the label per
/// field.
#[derive(Clone, Debug, Default)]
pub struct Envelope {
    /// `To` header value
    pub to: String,
    /// `From` header value in its original encoding
    pub from: Vec<u8>,
    /// `Subject` header value in its original encoding
    pub subject: Vec<u8>,
    /// JSON object mapping field names to charset labels
    pub charsets: String,
    /// Plain-text body, when the mail carried one
    pub text: Option<Vec<u8>>,
    /// HTML body, when the mail carried one
    pub html: Option<Vec<u8>>,
}

/// Why an envelope was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The `To` header held no parseable address
    InvalidRecipientAddress,
    /// No enabled address matches the recipient's local part
    UnknownAddress,
}

/// Outcome of ingesting one envelope.
#[derive(Debug)]
pub enum IngestOutcome {
    /// The envelope resolved to a recipient and is ready to dispatch
    Dispatch(DispatchRequest),
    /// The envelope was dropped
    Rejected(RejectReason),
}

/// A fully resolved unit of work for the dispatch gateway.
#[derive(Clone, Debug)]
pub struct DispatchRequest {
    /// Chat target the message goes to
    pub recipient: Recipient,
    /// Decoded subject line
    pub subject: String,
    /// Composed message text
    pub message: String,
}

/// Resolves inbound envelopes against the address book.
#[derive(Clone)]
pub struct MailPipeline {
    store: Arc<dyn Store>,
}

impl MailPipeline {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Ingest one envelope.
    ///
    /// Never returns an error: mail to an unknown or disabled alias is
    /// dropped, and a store failure degrades to the same rejection
    /// instead of bouncing the mail back to the provider.
    pub async fn ingest(&self, envelope: &Envelope) -> IngestOutcome {
        let Some(to_address) = first_address(&envelope.to) else {
            debug!("envelope rejected: no parseable recipient address");
            record_ingest("invalid_recipient");
            return IngestOutcome::Rejected(RejectReason::InvalidRecipientAddress);
        };

        let local_part = match to_address.split_once('@') {
            Some((local, _domain)) => local.to_lowercase(),
            None => to_address.to_lowercase(),
        };

        let address = match self
            .store
            .get_enabled_address_by_local_part(&local_part)
            .await
        {
            Ok(address) => address,
            Err(StoreError::NotFound) => {
                debug!("envelope rejected: no enabled address for {}", local_part);
                record_ingest("unknown_address");
                return IngestOutcome::Rejected(RejectReason::UnknownAddress);
            }
            Err(e) => {
                warn!("address lookup for {} failed: {}", local_part, e);
                record_ingest("unknown_address");
                return IngestOutcome::Rejected(RejectReason::UnknownAddress);
            }
        };

        let recipient = match self.store.get_recipient_by_id(&address.recipient_id).await {
            Ok(recipient) => recipient,
            Err(e) => {
                warn!(
                    "recipient lookup for address {} failed: {}",
                    address.public_id, e
                );
                record_ingest("unknown_address");
                return IngestOutcome::Rejected(RejectReason::UnknownAddress);
            }
        };

        let charsets = parse_charsets(&envelope.charsets);
        let from = decode_field(&envelope.from, charsets.get("from"));
        let subject = decode_field(&envelope.subject, charsets.get("subject"));
        let body = match (&envelope.text, &envelope.html) {
            (Some(text), _) => decode_field(text, charsets.get("text")),
            (None, Some(html)) => html_to_text(&decode_field(html, charsets.get("html"))),
            (None, None) => String::new(),
        };

        record_ingest("dispatch");
        IngestOutcome::Dispatch(DispatchRequest {
            recipient,
            subject: subject.clone(),
            message: compose_message(&from, &subject, &body),
        })
    }
}

/// Extract the first address from an RFC 5322 address header value.
pub(crate) fn first_address(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    MessageStream::new(value.as_bytes())
        .parse_address()
        .into_address()
        .and_then(|address| address.into_list().into_iter().next())
        .and_then(|addr| addr.address)
        .map(|addr| addr.to_string())
}

fn parse_charsets(raw: &str) -> HashMap<String, String> {
    if raw.is_empty() {
        return HashMap::new();
    }
    match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(e) => {
            debug!("charsets field is not valid JSON ({}), assuming utf-8", e);
            HashMap::new()
        }
    }
}

/// Decode one raw field using its declared charset. Fields labeled utf-8,
/// unlabeled, or labeled with a charset we have no decoder for fall back
/// to lossy UTF-8.
fn decode_field(raw: &[u8], charset: Option<&String>) -> String {
    if let Some(name) = charset {
        if !name.eq_ignore_ascii_case("utf-8") {
            if let Some(decoder) = charset_decoder(name.as_bytes()) {
                return decoder(raw);
            }
        }
    }
    String::from_utf8_lossy(raw).into_owned()
}

fn compose_message(from: &str, subject: &str, body: &str) -> String {
    format!("From: {}\r\nSubject: {}\r\n\r\n{}", from, subject, body)
}
