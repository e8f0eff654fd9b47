pub mod config;
pub mod domain;
pub mod errors;
pub mod validation;

pub use domain::quote::{timestamp_now, Quote, QuoteContent, QuoteId};
pub use errors::{ApplicationError, InterfaceError, ValidationError};
pub use validation::{
    parse_author_query, parse_quote_body, require_body, sanitize, AuthorQuery,
};
