use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

const ID_BYTES: usize = 12;
const ID_HEX_LEN: usize = ID_BYTES * 2;
const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Store-assigned quote identifier: twelve bytes rendered as 24 lowercase hex
/// characters (seconds, process-unique value, counter).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuoteId(String);

impl QuoteId {
    /// Accepts exactly 24 ASCII hex digits in either case and normalizes them
    /// to lowercase. Says nothing about whether a record exists.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let well_formed =
            raw.len() == ID_HEX_LEN && raw.bytes().all(|byte| byte.is_ascii_hexdigit());
        if !well_formed {
            return Err(ValidationError::MalformedIdentifier(raw.to_string()));
        }

        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn generate() -> Self {
        Self::from_parts(Utc::now().timestamp() as u32, process_unique(), next_counter())
    }

    fn from_parts(seconds: u32, unique: &[u8; 5], counter: u32) -> Self {
        let mut bytes = [0u8; ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(unique);
        bytes[9..].copy_from_slice(&(counter & COUNTER_MASK).to_be_bytes()[1..]);

        Self(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Seconds component encoded in the first four bytes.
    pub fn timestamp(&self) -> u32 {
        u32::from_str_radix(&self.0[..8], 16).unwrap_or_default()
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QuoteId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for QuoteId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QuoteId> for String {
    fn from(value: QuoteId) -> Self {
        value.0
    }
}

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(rand::random)
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
        .fetch_add(1, Ordering::Relaxed)
        & COUNTER_MASK
}

/// Current time truncated to the millisecond precision quotes are stored with.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// The caller-supplied part of a quote, used for both create and edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteContent {
    pub quote: String,
    pub author: String,
}

impl QuoteContent {
    pub fn new(quote: impl Into<String>, author: impl Into<String>) -> Self {
        Self { quote: quote.into(), author: author.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub quote: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn create(content: QuoteContent, created_at: DateTime<Utc>) -> Self {
        Self {
            id: QuoteId::generate(),
            quote: content.quote,
            author: content.author,
            created_at,
            modified_at: None,
        }
    }

    /// Overwrites text and author and stamps `modified_at`, never earlier than
    /// `created_at`.
    pub fn apply_edit(&mut self, content: QuoteContent, modified_at: DateTime<Utc>) {
        self.quote = content.quote;
        self.author = content.author;
        self.modified_at = Some(modified_at.max(self.created_at));
    }

    /// Case-insensitive substring match on the author field.
    pub fn author_contains(&self, needle: &str) -> bool {
        self.author.to_lowercase().contains(&needle.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{timestamp_now, Quote, QuoteContent, QuoteId};
    use crate::errors::ValidationError;

    fn quote(author: &str) -> Quote {
        Quote::create(QuoteContent::new("Keep going.", author), timestamp_now())
    }

    #[test]
    fn generated_ids_are_well_formed_and_distinct() {
        let first = QuoteId::generate();
        let second = QuoteId::generate();

        assert_ne!(first, second);
        assert_eq!(QuoteId::parse(first.as_str()), Ok(first.clone()));
        assert!(first.as_str().chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn id_layout_encodes_seconds_then_counter() {
        let id = QuoteId::from_parts(0x62ef_e4f2, &[0x9a, 0x85, 0xd0, 0xa4, 0xa9], 0x01d1_8cfe);

        assert_eq!(id.as_str(), "62efe4f29a85d0a4a9d18cfe");
        assert_eq!(id.timestamp(), 0x62ef_e4f2);
    }

    #[test]
    fn parse_normalizes_case() {
        let id = QuoteId::parse("62EFE4F29A85D0A4A9D18CFE").expect("uppercase hex is well-formed");
        assert_eq!(id.as_str(), "62efe4f29a85d0a4a9d18cfe");
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_hex() {
        for raw in ["", "123", "62efe4f29a85d0a4a9d18cf", "62efe4f29a85d0a4a9d18cfz", "not-an-id"] {
            assert_eq!(
                QuoteId::parse(raw),
                Err(ValidationError::MalformedIdentifier(raw.to_string())),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn serializes_camel_case_without_modified_at_until_edited() {
        let mut quote = quote("Winston Churchill");
        let json = serde_json::to_value(&quote).expect("serialize");

        assert_eq!(json["id"], quote.id.as_str());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("modifiedAt").is_none());

        quote.apply_edit(QuoteContent::new("Never give in.", "Churchill"), timestamp_now());
        let json = serde_json::to_value(&quote).expect("serialize");
        assert!(json.get("modifiedAt").is_some());
        assert_eq!(json["quote"], "Never give in.");
    }

    #[test]
    fn edit_never_stamps_before_creation() {
        let mut quote = quote("Mark Twain");
        let earlier = quote.created_at - Duration::seconds(30);

        quote.apply_edit(QuoteContent::new("Edited", "Mark Twain"), earlier);

        assert_eq!(quote.modified_at, Some(quote.created_at));
    }

    #[test]
    fn author_match_is_case_insensitive_substring() {
        let quote = quote("Winston Churchill");

        assert!(quote.author_contains("churchill"));
        assert!(quote.author_contains("STON CH"));
        assert!(!quote.author_contains("Twain"));
    }

    #[test]
    fn timestamps_are_truncated_to_millis() {
        let now = timestamp_now();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
        assert!(now <= Utc::now());
    }
}
