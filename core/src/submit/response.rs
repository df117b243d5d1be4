// core/src/submit/response.rs
use crate::rpc::message::Response;
use uuid::Uuid;

/// The scheduler appends group confirmations after the job uuids.
const GROUPS_MARKER: &str = " submitted groups";

/// Outcome of one submission attempt against one cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    /// Created; carries the accepted job uuids.
    Succeeded(Vec<String>),
    /// The cluster answered but refused the batch.
    Rejected(String),
    /// The cluster could not be reached.
    Unavailable(String),
    /// No answer before the read timeout; the batch may have been created.
    Ambiguous,
    /// The reply was cut off after the request was sent; the batch may have
    /// been created.
    Interrupted,
}

/// Classifies a response that did arrive.
pub fn interpret(response: &Response) -> Attempt {
    if response.status == 201 {
        Attempt::Succeeded(accepted_uuids(&response.text))
    } else {
        Attempt::Rejected(failure_reason(response))
    }
}

/// Job uuids from a 201 body such as
/// `"Submitted jobs 1f...e2, 3a...9c submitted groups 77...01"`.
pub fn accepted_uuids(text: &str) -> Vec<String> {
    let text = text.strip_prefix('"').unwrap_or(text);
    let text = text.strip_suffix('"').unwrap_or(text);
    let text = match text.find(GROUPS_MARKER) {
        Some(index) => &text[..index],
        None => text,
    };
    text.split_whitespace()
        .filter(|token| Uuid::parse_str(token).is_ok())
        .map(str::to_string)
        .collect()
}

/// Failure reason from a non-201 body: `errors`, then `error`, then the whole
/// JSON document, then the raw text.
pub fn failure_reason(response: &Response) -> String {
    match response.json() {
        Some(data) => {
            if let Some(errors) = data.get("errors") {
                errors.to_string()
            } else if let Some(error) = data.get("error") {
                match error.as_str() {
                    Some(s) => s.to_string(),
                    None => error.to_string(),
                }
            } else {
                data.to_string()
            }
        }
        None => format!("{}\n", response.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "abc123e4-5678-4abc-9def-0123456789ab";
    const B: &str = "def456e7-1111-4222-8333-444455556666";

    #[test]
    fn test_uuids_before_groups_marker() {
        let text = format!("\"{} {} submitted groups 0f0f0f0f-1111-4222-8333-444455556666\"", A, B);
        assert_eq!(accepted_uuids(&text), vec![A.to_string(), B.to_string()]);
    }

    #[test]
    fn test_non_uuid_tokens_dropped() {
        let text = format!("submitted jobs {} and {},", A, B);
        // "B," carries a comma and is not a well-formed uuid
        assert_eq!(accepted_uuids(&text), vec![A.to_string()]);
    }

    #[test]
    fn test_only_one_layer_of_quotes_stripped() {
        let text = format!("\"\"{}\"\"", A);
        assert!(accepted_uuids(&text).is_empty());
        assert_eq!(accepted_uuids(&format!("\"{}\"", A)), vec![A.to_string()]);
    }

    #[test]
    fn test_created_is_success() {
        let attempt = interpret(&Response::new(201, format!("submitted jobs {}", A)));
        assert_eq!(attempt, Attempt::Succeeded(vec![A.to_string()]));
    }

    #[test]
    fn test_reason_prefers_errors() {
        let response = Response::new(400, r#"{"errors": ["bad cpus", "bad mem"], "error": "ignored"}"#);
        assert_eq!(interpret(&response), Attempt::Rejected(r#"["bad cpus","bad mem"]"#.to_string()));
    }

    #[test]
    fn test_reason_uses_error_text() {
        let response = Response::new(401, r#"{"error": "not authorized"}"#);
        assert_eq!(failure_reason(&response), "not authorized");
    }

    #[test]
    fn test_reason_serializes_opaque_json() {
        let response = Response::new(500, r#"{"message": "boom"}"#);
        assert_eq!(failure_reason(&response), r#"{"message":"boom"}"#);
    }

    #[test]
    fn test_reason_falls_back_to_text() {
        let response = Response::new(502, "Bad Gateway");
        assert_eq!(failure_reason(&response), "Bad Gateway\n");
    }

    #[test]
    fn test_200_is_not_success() {
        assert!(matches!(interpret(&Response::new(200, A)), Attempt::Rejected(_)));
    }
}
