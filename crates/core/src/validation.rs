//! Request validation for quote payloads.
//!
//! Every handler runs its input through here before touching the store. The
//! functions are pure: they either return a sanitized, typed value or a
//! [`ValidationError`] describing the first rule that failed.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::quote::QuoteContent;
use crate::errors::ValidationError;

pub const QUOTE_FIELD: &str = "quote";
pub const AUTHOR_FIELD: &str = "author";

#[derive(Debug, Default, Deserialize)]
struct RawQuoteBody {
    quote: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAuthorQuery {
    author: Option<String>,
}

/// Sanitized author fragment for substring search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorQuery(String);

impl AuthorQuery {
    pub fn validate(author: Option<String>) -> Result<Self, ValidationError> {
        required_field(author, AUTHOR_FIELD).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl QuoteContent {
    /// Both fields must be present and non-empty after trimming; the stored
    /// values are the trimmed, escaped forms.
    pub fn validate(
        quote: Option<String>,
        author: Option<String>,
    ) -> Result<Self, ValidationError> {
        let quote = required_field(quote, QUOTE_FIELD)?;
        let author = required_field(author, AUTHOR_FIELD)?;
        Ok(Self { quote, author })
    }
}

/// Parses a create/edit body (`{"quote": ..., "author": ...}`).
pub fn parse_quote_body(body: &[u8]) -> Result<QuoteContent, ValidationError> {
    let raw: RawQuoteBody = parse_object(body)?;
    QuoteContent::validate(raw.quote, raw.author)
}

/// Parses a search body (`{"author": ...}`).
pub fn parse_author_query(body: &[u8]) -> Result<AuthorQuery, ValidationError> {
    let raw: RawAuthorQuery = parse_object(body)?;
    AuthorQuery::validate(raw.author)
}

/// An absent or whitespace-only body counts as missing.
pub fn require_body(body: &[u8]) -> Result<(), ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::MissingBody);
    }
    Ok(())
}

fn parse_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationError> {
    require_body(body)?;

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|error| ValidationError::InvalidBody(error.to_string()))?;
    if !value.is_object() {
        return Err(ValidationError::InvalidBody("expected a JSON object".to_string()));
    }

    serde_json::from_value(value).map_err(|error| ValidationError::InvalidBody(error.to_string()))
}

fn required_field(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingRequiredField(field))?;
    let sanitized = sanitize(&value);
    if sanitized.is_empty() {
        return Err(ValidationError::EmptyRequiredField(field));
    }
    Ok(sanitized)
}

/// Trims surrounding whitespace and escapes HTML-significant characters.
pub fn sanitize(value: &str) -> String {
    let trimmed = value.trim();
    let mut escaped = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            '`' => escaped.push_str("&#96;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{parse_author_query, parse_quote_body, sanitize};
    use crate::domain::quote::QuoteContent;
    use crate::errors::ValidationError;

    #[test]
    fn accepts_and_trims_valid_body() {
        let content = parse_quote_body(br#"{"quote":"  Test ","author":"Ada"}"#)
            .expect("valid body should parse");

        assert_eq!(content, QuoteContent::new("Test", "Ada"));
    }

    #[test]
    fn escapes_markup_in_fields() {
        let content = parse_quote_body(br#"{"quote":"<b>bold</b> & 'so'","author":"A/B `x`"}"#)
            .expect("valid body should parse");

        assert_eq!(content.quote, "&lt;b&gt;bold&lt;&#x2F;b&gt; &amp; &#x27;so&#x27;");
        assert_eq!(content.author, "A&#x2F;B &#96;x&#96;");
    }

    #[test]
    fn empty_body_is_missing() {
        assert_eq!(parse_quote_body(b""), Err(ValidationError::MissingBody));
        assert_eq!(parse_quote_body(b"  \n"), Err(ValidationError::MissingBody));
        assert_eq!(parse_author_query(b""), Err(ValidationError::MissingBody));
    }

    #[test]
    fn non_object_or_mistyped_body_is_invalid() {
        assert!(matches!(parse_quote_body(b"[1,2]"), Err(ValidationError::InvalidBody(_))));
        assert!(matches!(parse_quote_body(b"{not json"), Err(ValidationError::InvalidBody(_))));
        assert!(matches!(
            parse_quote_body(br#"{"quote":5,"author":"Ada"}"#),
            Err(ValidationError::InvalidBody(_))
        ));
    }

    #[test]
    fn missing_and_empty_fields_are_distinguished() {
        assert_eq!(
            parse_quote_body(br#"{"author":"Ada"}"#),
            Err(ValidationError::MissingRequiredField("quote"))
        );
        assert_eq!(
            parse_quote_body(br#"{"quote":"Test","author":null}"#),
            Err(ValidationError::MissingRequiredField("author"))
        );
        assert_eq!(
            parse_quote_body(br#"{"quote":"   ","author":"Ada"}"#),
            Err(ValidationError::EmptyRequiredField("quote"))
        );
    }

    #[test]
    fn author_query_requires_non_empty_author() {
        assert_eq!(
            parse_author_query(b"{}"),
            Err(ValidationError::MissingRequiredField("author"))
        );
        assert_eq!(
            parse_author_query(br#"{"author":""}"#),
            Err(ValidationError::EmptyRequiredField("author"))
        );

        let query = parse_author_query(br#"{"author":" winston ","extra":1}"#).expect("valid");
        assert_eq!(query.as_str(), "winston");
    }

    #[test]
    fn sanitize_leaves_plain_text_untouched() {
        assert_eq!(sanitize("Mark Twain"), "Mark Twain");
        assert_eq!(sanitize("Zoë Ünïcode"), "Zoë Ünïcode");
    }
}
