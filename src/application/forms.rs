//! Explicit form validation.
//!
//! Submitted fields are validated by plain functions returning either the
//! cleaned value or a list of per-field errors; nothing is persisted on
//! failure and the HTTP layer re-renders the form with the errors attached.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw post form fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub text: String,
    /// Group id as an opaque form value; empty means no group.
    pub group: Option<String>,
}

/// A post form that passed field validation. Group existence is checked by
/// the service, which owns the repository handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPost {
    pub text: String,
    pub group_id: Option<Uuid>,
}

pub fn validate_post(input: &PostInput) -> Result<ValidPost, Vec<FieldError>> {
    let mut errors = Vec::new();

    let text = input.text.trim();
    if text.is_empty() {
        errors.push(FieldError::new("text", "Post text must not be empty"));
    }

    let group_id = match input.group.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("group", "Select a valid group"));
                None
            }
        },
    };

    if errors.is_empty() {
        Ok(ValidPost {
            text: text.to_string(),
            group_id,
        })
    } else {
        Err(errors)
    }
}

pub fn validate_comment(text: &str) -> Result<String, Vec<FieldError>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(vec![FieldError::new(
            "text",
            "Comment text must not be empty",
        )]);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_post_text_is_rejected() {
        let input = PostInput {
            text: "   ".to_string(),
            group: None,
        };
        let errors = validate_post(&input).expect_err("blank text rejected");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "text");
    }

    #[test]
    fn valid_post_is_trimmed() {
        let input = PostInput {
            text: "  hello  ".to_string(),
            group: Some(String::new()),
        };
        let valid = validate_post(&input).expect("valid");
        assert_eq!(valid.text, "hello");
        assert_eq!(valid.group_id, None);
    }

    #[test]
    fn malformed_group_id_is_a_field_error() {
        let input = PostInput {
            text: "hello".to_string(),
            group: Some("not-a-uuid".to_string()),
        };
        let errors = validate_post(&input).expect_err("bad group rejected");
        assert_eq!(errors[0].field, "group");
    }

    #[test]
    fn well_formed_group_id_parses() {
        let id = Uuid::new_v4();
        let input = PostInput {
            text: "hello".to_string(),
            group: Some(id.to_string()),
        };
        assert_eq!(validate_post(&input).expect("valid").group_id, Some(id));
    }

    #[test]
    fn empty_comment_is_rejected() {
        assert!(validate_comment("").is_err());
        assert_eq!(validate_comment(" hi ").expect("valid"), "hi");
    }
}
