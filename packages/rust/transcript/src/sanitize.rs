//! Redaction of sensitive substrings before text leaves the machine.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use bandsite_shared::Variant;

pub const PHONE_PLACEHOLDER: &str = "[REDACTED_PHONE]";
pub const EMAIL_PLACEHOLDER: &str = "[REDACTED_EMAIL]";
pub const PRIVATE_PLACEHOLDER: &str = "[REDACTED_PRIVATE_CONTEXT]";

/// Fewest digits a run needs before it counts as a phone number.
const MIN_PHONE_DIGITS: usize = 9;

/// Candidate phone runs. Only those carrying enough digits are masked.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s\-()]{7,}\d").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static PRIVATE_TOPIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(payment|money|rent|drama|fight|argument|complaint|salary|invoice)\b")
        .expect("valid regex")
});

/// Mask phone numbers, then email addresses.
///
/// Phones go first so digits inside an address are never half-masked by the
/// email pass.
pub fn redact_contacts(text: &str) -> String {
    let text = PHONE_RE.replace_all(text, |caps: &Captures| {
        let run = &caps[0];
        if run.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS {
            PHONE_PLACEHOLDER.to_string()
        } else {
            run.to_string()
        }
    });
    EMAIL_RE.replace_all(&text, EMAIL_PLACEHOLDER).into_owned()
}

/// Contact redaction plus an all-or-nothing drop of messages touching money
/// or interpersonal conflict.
pub fn sanitize_public(text: &str) -> String {
    let text = redact_contacts(text);
    if PRIVATE_TOPIC_RE.is_match(&text) {
        PRIVATE_PLACEHOLDER.to_string()
    } else {
        text
    }
}

/// Redaction policy applied to message text before chunking and extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    /// Phones and emails only.
    Contacts,
    /// Contacts plus whole-message private-topic redaction.
    Public,
}

impl Sanitizer {
    /// Policy used by each site variant.
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Operational | Variant::Creative => Self::Contacts,
            Variant::Public => Self::Public,
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Contacts => redact_contacts(text),
            Self::Public => sanitize_public(text),
        }
    }
}
