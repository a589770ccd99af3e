use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::config::*;
use crate::core::errors::ApiError;
use crate::models::models::PostInput;

fn avatar_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(https?:)?//[^\s/]+\S*$").expect("Regex should compile"))
}

fn field<'a>(body: &'a serde_json::Value, name: &str) -> Result<&'a str, &'static str> {
    match body.get(name) {
        None | Some(serde_json::Value::Null) => Ok(""),
        Some(serde_json::Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err("must be a string"),
    }
}

/// Checks a `{text, name, avatar}` body, collecting every field error.
/// Accepted strings are returned exactly as sent.
pub fn validate_post_input(body: &serde_json::Value) -> Result<PostInput, ApiError> {
    if !body.is_object() {
        return Err(ApiError::invalid_field("body", "Request body must be a JSON object"));
    }

    let mut errors = BTreeMap::new();

    let text = match field(body, "text") {
        Ok(raw) => {
            let len = raw.chars().count();
            if raw.trim().is_empty() {
                errors.insert("text".to_string(), "Text field is required".to_string());
            } else if len < MIN_TEXT_LENGTH || len > MAX_TEXT_LENGTH {
                errors.insert(
                    "text".to_string(),
                    format!(
                        "Text must be between {} and {} characters",
                        MIN_TEXT_LENGTH, MAX_TEXT_LENGTH
                    ),
                );
            }
            raw
        }
        Err(msg) => {
            errors.insert("text".to_string(), format!("Text {}", msg));
            ""
        }
    };

    let name = match field(body, "name") {
        Ok(raw) => {
            if raw.chars().count() > MAX_NAME_LENGTH {
                errors.insert(
                    "name".to_string(),
                    format!("Name must be at most {} characters", MAX_NAME_LENGTH),
                );
            }
            raw
        }
        Err(msg) => {
            errors.insert("name".to_string(), format!("Name {}", msg));
            ""
        }
    };

    let avatar = match field(body, "avatar") {
        Ok(raw) => {
            if raw.len() > MAX_AVATAR_LENGTH {
                errors.insert(
                    "avatar".to_string(),
                    format!("Avatar must be at most {} characters", MAX_AVATAR_LENGTH),
                );
            } else if !raw.is_empty() && !avatar_regex().is_match(raw) {
                errors.insert("avatar".to_string(), "Avatar must be a URL".to_string());
            }
            raw
        }
        Err(msg) => {
            errors.insert("avatar".to_string(), format!("Avatar {}", msg));
            ""
        }
    };

    if !errors.is_empty() {
        return Err(ApiError::InvalidInput(errors));
    }

    Ok(PostInput {
        text: text.to_string(),
        name: name.to_string(),
        avatar: avatar.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(result: Result<PostInput, ApiError>) -> BTreeMap<String, String> {
        match result {
            Err(ApiError::InvalidInput(errors)) => errors,
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn accepts_minimal_body() {
        let input = validate_post_input(&json!({"text": "hi"})).unwrap();
        assert_eq!(input.text, "hi");
        assert_eq!(input.name, "");
        assert_eq!(input.avatar, "");
    }

    #[test]
    fn accepts_protocol_relative_avatar() {
        let input = validate_post_input(&json!({
            "text": "hello",
            "name": "Alice",
            "avatar": "//www.gravatar.com/avatar/abc?s=200"
        }))
        .unwrap();
        assert_eq!(input.avatar, "//www.gravatar.com/avatar/abc?s=200");
    }

    #[test]
    fn markup_characters_are_stored_verbatim() {
        let input = validate_post_input(&json!({
            "text": "a < b && c > d",
            "name": "Tom & Jerry"
        }))
        .unwrap();
        assert_eq!(input.text, "a < b && c > d");
        assert_eq!(input.name, "Tom & Jerry");

        let input = validate_post_input(&json!({"text": "<b>bold</b> \"quoted\""})).unwrap();
        assert_eq!(input.text, "<b>bold</b> \"quoted\"");
    }

    #[test]
    fn length_limit_applies_to_the_stored_text() {
        let at_limit = "<".repeat(MAX_TEXT_LENGTH);
        let input = validate_post_input(&json!({"text": at_limit})).unwrap();
        assert_eq!(input.text.chars().count(), MAX_TEXT_LENGTH);

        let over = "<".repeat(MAX_TEXT_LENGTH + 1);
        let errors = field_errors(validate_post_input(&json!({"text": over})));
        assert!(errors.contains_key("text"));
    }

    #[test]
    fn missing_text_is_reported() {
        let errors = field_errors(validate_post_input(&json!({"name": "Alice"})));
        assert_eq!(errors.get("text").unwrap(), "Text field is required");
    }

    #[test]
    fn whitespace_text_counts_as_missing() {
        let errors = field_errors(validate_post_input(&json!({"text": "   "})));
        assert!(errors.contains_key("text"));
    }

    #[test]
    fn collects_every_field_error() {
        let errors = field_errors(validate_post_input(&json!({
            "text": "a".repeat(MAX_TEXT_LENGTH + 1),
            "name": 42,
            "avatar": "not a url"
        })));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("name").unwrap(), "Name must be a string");
    }

    #[test]
    fn rejects_non_object_body() {
        let errors = field_errors(validate_post_input(&json!(["text"])));
        assert!(errors.contains_key("body"));
    }
}
