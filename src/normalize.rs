//! Best-effort extraction of generated text from a variably-shaped
//! upstream response.
//!
//! The chat endpoint is not under this crate's control and has
//! historically returned its text under several different keys. The
//! normalizer tries a fixed, ordered list of shape extractors and takes
//! the first non-empty match. The precedence is advisory plumbing, not a
//! contract with the upstream service.

use serde_json::Value;
use tracing::debug;

type Extractor = fn(&Value) -> Option<&str>;

/// Shape checks in precedence order. First non-empty match wins.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("string", |v| v.as_str()),
    ("response", |v| field_str(v, "response")),
    ("message", |v| field_str(v, "message")),
    ("content", |v| field_str(v, "content")),
    ("data", |v| field_str(v, "data")),
    ("result.content", |v| field_str(v.get("result")?, "content")),
    ("choices[0].message.content", |v| {
        field_str(first_choice(v)?.get("message")?, "content")
    }),
    ("choices[0].text", |v| field_str(first_choice(v)?, "text")),
];

fn field_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key)?.as_str()
}

fn first_choice(value: &Value) -> Option<&Value> {
    value.get("choices")?.as_array()?.first()
}

/// Map an arbitrary response value to a plain text string.
///
/// Returns the empty string when no text can be found under any known
/// shape. Never panics, regardless of input shape.
pub fn normalize(response: &Value) -> String {
    for (shape, extract) in EXTRACTORS {
        if let Some(text) = extract(response) {
            if !text.is_empty() {
                debug!(shape, chars = text.len(), "extracted response text");
                return text.to_string();
            }
        }
    }
    debug!("no recognized shape in upstream response");
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_returned_verbatim() {
        assert_eq!(normalize(&json!("raw text")), "raw text");
    }

    #[test]
    fn test_response_field() {
        assert_eq!(normalize(&json!({"response": "from response"})), "from response");
    }

    #[test]
    fn test_message_field() {
        assert_eq!(normalize(&json!({"message": "from message"})), "from message");
    }

    #[test]
    fn test_content_field() {
        assert_eq!(normalize(&json!({"content": "from content"})), "from content");
    }

    #[test]
    fn test_data_field() {
        assert_eq!(normalize(&json!({"data": "from data"})), "from data");
    }

    #[test]
    fn test_nested_result_content() {
        assert_eq!(
            normalize(&json!({"result": {"content": "nested"}})),
            "nested"
        );
    }

    #[test]
    fn test_openai_style_message_content() {
        let value = json!({"choices": [{"message": {"content": "Hello world"}}]});
        assert_eq!(normalize(&value), "Hello world");
    }

    #[test]
    fn test_openai_style_text() {
        let value = json!({"choices": [{"text": "completion text"}]});
        assert_eq!(normalize(&value), "completion text");
    }

    #[test]
    fn test_response_wins_over_choices() {
        let value = json!({
            "response": "direct",
            "choices": [{"message": {"content": "openai"}}]
        });
        assert_eq!(normalize(&value), "direct");
    }

    #[test]
    fn test_message_wins_over_content() {
        let value = json!({"message": "msg", "content": "cnt"});
        assert_eq!(normalize(&value), "msg");
    }

    #[test]
    fn test_empty_string_field_falls_through() {
        // First non-empty match wins: an empty `response` must not mask
        // text found under a later key.
        let value = json!({"response": "", "message": "fallback"});
        assert_eq!(normalize(&value), "fallback");
    }

    #[test]
    fn test_null_returns_empty() {
        assert_eq!(normalize(&Value::Null), "");
    }

    #[test]
    fn test_number_returns_empty() {
        assert_eq!(normalize(&json!(42)), "");
    }

    #[test]
    fn test_bare_array_returns_empty() {
        assert_eq!(normalize(&json!(["a", "b"])), "");
    }

    #[test]
    fn test_unrecognized_object_returns_empty() {
        assert_eq!(normalize(&json!({"status": "ok", "id": 7})), "");
    }

    #[test]
    fn test_non_string_known_field_is_skipped() {
        let value = json!({"response": {"nested": true}, "message": "text"});
        assert_eq!(normalize(&value), "text");
    }

    #[test]
    fn test_empty_choices_array_returns_empty() {
        assert_eq!(normalize(&json!({"choices": []})), "");
    }

    #[test]
    fn test_choices_without_text_or_message_returns_empty() {
        assert_eq!(normalize(&json!({"choices": [{"index": 0}]})), "");
    }
}
