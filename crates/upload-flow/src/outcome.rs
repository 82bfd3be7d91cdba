//! Response classification
//!
//! Normalizes a completed HTTP exchange into a tagged outcome,
//! parameterized by the shape each task type expects. Downstream code
//! matches on [`Outcome`] exhaustively instead of probing optional
//! fields.

use serde_json::Value;

use crate::error::FlowError;
use crate::results::AnalysisResult;

/// Transport-level view of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub ok: bool,
    pub body: RawBody,
}

/// Response body as decoded by the transport from the content type.
#[derive(Debug, Clone)]
pub enum RawBody {
    Json(Value),
    Bytes(Vec<u8>),
}

/// The response shape a task type expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// JSON object carrying an array of result records under `key`.
    Structured { key: &'static str },
    /// Opaque byte payload intended for download.
    Binary,
}

/// Tagged outcome of a successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Structured(Vec<AnalysisResult>),
    Binary(Vec<u8>),
}

/// Classify a raw response against the expected shape.
pub fn interpret(expected: Expectation, raw: RawResponse) -> Result<Outcome, FlowError> {
    if !raw.ok {
        return Err(server_error(&raw));
    }
    match expected {
        Expectation::Structured { key } => interpret_structured(key, raw),
        Expectation::Binary => interpret_binary(raw),
    }
}

/// Non-2xx response: surface a server-provided `error` message verbatim
/// when the body carries one.
fn server_error(raw: &RawResponse) -> FlowError {
    if let RawBody::Json(value) = &raw.body {
        if let Some(msg) = value.get("error").and_then(Value::as_str) {
            return FlowError::Server(msg.to_string());
        }
    }
    FlowError::Transport(format!("HTTP {}", raw.status))
}

fn interpret_structured(key: &str, raw: RawResponse) -> Result<Outcome, FlowError> {
    let value = match raw.body {
        RawBody::Json(value) => value,
        RawBody::Bytes(_) => return Err(FlowError::Shape("expected a JSON body".to_string())),
    };

    let records = value
        .get(key)
        .ok_or_else(|| FlowError::Shape(format!("missing `{}` field", key)))?
        .as_array()
        .ok_or_else(|| FlowError::Shape(format!("`{}` is not an array", key)))?;

    // All-or-nothing: one malformed record fails the whole response.
    let mut results = Vec::with_capacity(records.len());
    for record in records {
        let parsed: AnalysisResult = serde_json::from_value(record.clone())
            .map_err(|e| FlowError::Shape(format!("malformed record: {}", e)))?;
        if parsed.subject.is_empty() {
            return Err(FlowError::Shape("record has an empty name".to_string()));
        }
        results.push(parsed);
    }
    Ok(Outcome::Structured(results))
}

fn interpret_binary(raw: RawResponse) -> Result<Outcome, FlowError> {
    let bytes = match raw.body {
        RawBody::Bytes(bytes) => bytes,
        RawBody::Json(_) => return Err(FlowError::Shape("expected a binary body".to_string())),
    };
    if bytes.is_empty() {
        return Err(FlowError::Shape("empty binary payload".to_string()));
    }
    Ok(Outcome::Binary(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: Expectation = Expectation::Structured { key: "results" };

    fn ok_json(value: Value) -> RawResponse {
        RawResponse {
            status: 200,
            ok: true,
            body: RawBody::Json(value),
        }
    }

    #[test]
    fn test_structured_response_parses_records() {
        let raw = ok_json(json!({
            "results": [
                {"name": "X", "count": 12, "average": 30.2, "text": "para1\npara2"}
            ]
        }));
        let outcome = interpret(KEY, raw).unwrap();
        let Outcome::Structured(results) = outcome else {
            panic!("expected structured outcome");
        };
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].subject, "X");
        assert_eq!(results[0].narrative_paragraphs().len(), 2);
    }

    #[test]
    fn test_structured_empty_list_is_success() {
        let raw = ok_json(json!({ "results": [] }));
        assert_eq!(interpret(KEY, raw).unwrap(), Outcome::Structured(vec![]));
    }

    #[test]
    fn test_missing_key_is_shape_error() {
        let raw = ok_json(json!({ "stories": [] }));
        assert!(matches!(interpret(KEY, raw), Err(FlowError::Shape(_))));
    }

    #[test]
    fn test_key_not_an_array_is_shape_error() {
        let raw = ok_json(json!({ "results": "nope" }));
        assert!(matches!(interpret(KEY, raw), Err(FlowError::Shape(_))));
    }

    #[test]
    fn test_malformed_record_fails_whole_response() {
        let raw = ok_json(json!({
            "results": [
                {"name": "X", "count": 1, "average": 2.0, "text": "ok"},
                {"name": "Y"}
            ]
        }));
        assert!(matches!(interpret(KEY, raw), Err(FlowError::Shape(_))));
    }

    #[test]
    fn test_empty_subject_is_shape_error() {
        let raw = ok_json(json!({
            "results": [{"name": "", "count": 1, "average": 2.0, "text": "ok"}]
        }));
        assert!(matches!(interpret(KEY, raw), Err(FlowError::Shape(_))));
    }

    #[test]
    fn test_binary_body_for_structured_expectation_is_shape_error() {
        let raw = RawResponse {
            status: 200,
            ok: true,
            body: RawBody::Bytes(vec![1, 2, 3]),
        };
        assert!(matches!(interpret(KEY, raw), Err(FlowError::Shape(_))));
    }

    #[test]
    fn test_binary_outcome_passes_bytes_through() {
        let raw = RawResponse {
            status: 200,
            ok: true,
            body: RawBody::Bytes(vec![0xDE, 0xAD]),
        };
        assert_eq!(
            interpret(Expectation::Binary, raw).unwrap(),
            Outcome::Binary(vec![0xDE, 0xAD])
        );
    }

    #[test]
    fn test_empty_binary_payload_is_shape_error() {
        let raw = RawResponse {
            status: 200,
            ok: true,
            body: RawBody::Bytes(vec![]),
        };
        assert!(matches!(
            interpret(Expectation::Binary, raw),
            Err(FlowError::Shape(_))
        ));
    }

    #[test]
    fn test_json_body_for_binary_expectation_is_shape_error() {
        let raw = ok_json(json!({ "ok": true }));
        assert!(matches!(
            interpret(Expectation::Binary, raw),
            Err(FlowError::Shape(_))
        ));
    }

    #[test]
    fn test_error_body_message_surfaces_verbatim() {
        let raw = RawResponse {
            status: 400,
            ok: false,
            body: RawBody::Json(json!({ "error": "bad file" })),
        };
        assert_eq!(
            interpret(KEY, raw),
            Err(FlowError::Server("bad file".to_string()))
        );
    }

    #[test]
    fn test_error_without_message_is_transport() {
        let raw = RawResponse {
            status: 502,
            ok: false,
            body: RawBody::Bytes(vec![]),
        };
        assert!(matches!(interpret(KEY, raw), Err(FlowError::Transport(_))));
    }

    #[test]
    fn test_error_status_wins_over_binary_body() {
        // A non-2xx with a JSON error body must fail even when the task
        // expected a binary payload.
        let raw = RawResponse {
            status: 500,
            ok: false,
            body: RawBody::Json(json!({ "error": "Failed to generate report" })),
        };
        assert_eq!(
            interpret(Expectation::Binary, raw),
            Err(FlowError::Server("Failed to generate report".to_string()))
        );
    }
}
