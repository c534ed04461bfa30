//! Request body extraction and the field rules shared by request DTOs.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::web::error::ApiError;

/// JSON body that passed its `validator` rules.
///
/// Unparsable bodies answer 400 (415 without a JSON content type); rule
/// violations answer 422 with messages per field.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state).await?;
        body.validate()?;
        Ok(Self(body))
    }
}

fn reject(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// A single directory entry name: not blank, no separators, not `.`/`..`.
pub fn entry_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(reject("blank", "Name must not be blank"));
    }
    if value == "." || value == ".." {
        return Err(reject("reserved", "Name must not be . or .."));
    }
    if value.contains(['/', '\\']) {
        return Err(reject("separator", "Name must not contain / or \\"));
    }
    no_control_chars(value)
}

/// Names and paths are single-line.
pub fn no_control_chars(value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_control) {
        return Err(reject("control_chars", "Must not contain control characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_accepts_ordinary_names() {
        assert!(entry_name("report 2024.pdf").is_ok());
        assert!(entry_name("日本語.txt").is_ok());
        assert!(entry_name(".hidden").is_ok());
    }

    #[test]
    fn test_entry_name_rejections() {
        let code = |value: &str| entry_name(value).unwrap_err().code.to_string();

        assert_eq!(code(""), "blank");
        assert_eq!(code("  \t"), "blank");
        assert_eq!(code(".."), "reserved");
        assert_eq!(code("a/b"), "separator");
        assert_eq!(code("..\\b"), "separator");
        assert_eq!(code("a\u{7}b"), "control_chars");
    }

    #[test]
    fn test_no_control_chars() {
        assert!(no_control_chars("/docs/2024").is_ok());
        assert!(no_control_chars("/docs\n").is_err());
        assert!(no_control_chars("/do\x00cs").is_err());
    }
}
