//! Field validation for user payloads.
//!
//! Rules run in a fixed order and report only the first violation, so a
//! client fixing one field at a time always sees the next problem in the
//! same sequence.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::domain::UserDetails;

/// First violated rule for a user payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("first name is required")]
    FirstNameRequired,
    #[error("last name is required")]
    LastNameRequired,
    #[error("nickname is required")]
    NicknameRequired,
    #[error("password is required")]
    PasswordRequired,
    #[error("email is required")]
    EmailRequired,
    #[error("email is invalid")]
    EmailInvalid,
    #[error("country is required")]
    CountryRequired,
}

/// Validate the client-editable user fields.
///
/// # Errors
/// Returns the first rule the payload violates.
///
/// # Examples
/// ```
/// use user_service::domain::{UserDetails, UserValidationError, validate_user_details};
///
/// let details = UserDetails {
///     first_name: "Frank".into(),
///     ..UserDetails::default()
/// };
/// assert_eq!(
///     validate_user_details(&details),
///     Err(UserValidationError::LastNameRequired)
/// );
/// ```
pub fn validate_user_details(details: &UserDetails) -> Result<(), UserValidationError> {
    if details.first_name.is_empty() {
        return Err(UserValidationError::FirstNameRequired);
    }
    if details.last_name.is_empty() {
        return Err(UserValidationError::LastNameRequired);
    }
    if details.nickname.is_empty() {
        return Err(UserValidationError::NicknameRequired);
    }
    if details.password.is_empty() {
        return Err(UserValidationError::PasswordRequired);
    }
    if details.email.is_empty() {
        return Err(UserValidationError::EmailRequired);
    }
    if !is_valid_mailbox(&details.email) {
        return Err(UserValidationError::EmailInvalid);
    }
    if details.country.is_empty() {
        return Err(UserValidationError::CountryRequired);
    }
    Ok(())
}

const ATEXT: &str = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~\-[^\x00-\x7F]]";
const QUOTED: &str = r#""(?:[^"\\\r\n]|\\.)*""#;
const LITERAL: &str = r"\[[^\[\]\\\r\n]*\]";

fn addr_spec() -> String {
    let dot_atom = format!(r"{ATEXT}+(?:\.{ATEXT}+)*");
    format!(r"(?:{dot_atom}|{QUOTED})@(?:{dot_atom}|{LITERAL})")
}

/// Display name: atoms (dots allowed) or quoted strings.
fn phrase() -> String {
    let word = format!(r"(?:(?:{ATEXT}|\.)+|{QUOTED})");
    format!(r"{word}(?:\s*{word})*")
}

fn mailbox_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            let addr = addr_spec();
            let phrase = phrase();
            Regex::new(&format!(r"^(?:{addr}|(?:{phrase}\s*)?<{addr}>)$")).ok()
        })
        .as_ref()
}

/// Whether `raw` is a mailbox: a bare `local@domain` address or
/// `Display Name <local@domain>`.
#[must_use]
pub fn is_valid_mailbox(raw: &str) -> bool {
    let trimmed = raw.trim();
    mailbox_pattern().is_some_and(|pattern| pattern.is_match(trimmed))
}
