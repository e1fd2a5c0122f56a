//! SparkPost API responses

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize};

use crate::domain::mailer::SendReceipt;

use super::SparkPostError;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    results: Option<T>,

    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

/// One entry of an error body
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetail {
    /// Short error message
    pub message: String,

    /// Longer explanation
    #[serde(default)]
    pub description: Option<String>,

    /// SparkPost error code
    #[serde(default)]
    pub code: Option<String>,
}

impl fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }

        if let Some(code) = &self.code {
            write!(f, " (code {code})")?;
        }

        Ok(())
    }
}

/// The content previewer's rendering of a message
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PreviewResults {
    /// The rendered subject
    #[serde(default)]
    pub subject: Option<String>,

    /// The rendered HTML body
    #[serde(default)]
    pub html: Option<String>,

    /// The rendered text body
    #[serde(default)]
    pub text: Option<String>,
}

/// The transmissions endpoint's answer
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TransmissionResults {
    /// The transmission id
    pub id: String,

    /// Number of accepted recipients
    pub total_accepted_recipients: u64,

    /// Number of rejected recipients
    pub total_rejected_recipients: u64,
}

impl From<TransmissionResults> for SendReceipt {
    fn from(results: TransmissionResults) -> Self {
        SendReceipt {
            transmission_id: results.id,
            total_accepted: results.total_accepted_recipients,
            total_rejected: results.total_rejected_recipients,
        }
    }
}

fn join_errors(errors: &[ApiErrorDetail]) -> String {
    errors
        .iter()
        .map(ApiErrorDetail::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Turns a status code and body into the endpoint's `results`.
///
/// Non-2xx statuses and bodies with `errors` become [`SparkPostError::Api`]; bodies
/// that are not JSON or lack `results` become [`SparkPostError::MalformedResponse`].
pub fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, SparkPostError> {
    if !(200..300).contains(&status) {
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(response) if !response.errors.is_empty() => join_errors(&response.errors),
            _ if body.trim().is_empty() => "empty response".to_string(),
            _ => body.trim().to_string(),
        };

        return Err(SparkPostError::Api { status, message });
    }

    let response: ApiResponse<T> = serde_json::from_str(body)?;

    if !response.errors.is_empty() {
        return Err(SparkPostError::Api {
            status,
            message: join_errors(&response.errors),
        });
    }

    response
        .results
        .ok_or_else(|| SparkPostError::MalformedResponse("missing results".to_string()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_parse_transmission_results() -> TestResult {
        let results: TransmissionResults = parse_response(
            200,
            r#"{"results": {"total_rejected_recipients": 0, "total_accepted_recipients": 1, "id": "11668787484950529"}}"#,
        )?;

        let receipt = SendReceipt::from(results);

        assert_eq!(receipt.transmission_id, "11668787484950529");
        assert_eq!(receipt.total_accepted, 1);
        assert_eq!(receipt.total_rejected, 0);

        Ok(())
    }

    #[test]
    fn test_parse_preview_results() -> TestResult {
        let results: PreviewResults = parse_response(
            200,
            r#"{"results": {"subject": "Hello there!", "html": "This is test body for {contactfield=email}!"}}"#,
        )?;

        assert_eq!(results.subject.as_deref(), Some("Hello there!"));
        assert!(results.text.is_none());

        Ok(())
    }

    #[test]
    fn test_error_status_uses_error_body() {
        let result: Result<PreviewResults, _> = parse_response(
            422,
            r#"{"errors": [{"message": "substitution language syntax error in template content", "description": "Error while compiling part html: line 1: syntax error near '}}'", "code": "3000"}]}"#,
        );

        match result {
            Err(SparkPostError::Api { status, message }) => {
                assert_eq!(status, 422);
                assert!(message.starts_with("substitution language syntax error"));
                assert!(message.ends_with("(code 3000)"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_error_status_with_truncated_body() {
        let result: Result<PreviewResults, _> =
            parse_response(502, r#"{"errors": [{"message": "Bad gateway""#);

        assert!(matches!(
            result,
            Err(SparkPostError::Api { status: 502, message })
                if message == r#"{"errors": [{"message": "Bad gateway""#
        ));
    }

    #[test]
    fn test_error_status_with_plain_body() {
        let result: Result<PreviewResults, _> = parse_response(401, "Unauthorized.\n");

        assert!(matches!(
            result,
            Err(SparkPostError::Api { status: 401, message }) if message == "Unauthorized."
        ));
    }

    #[test]
    fn test_success_status_with_errors_body() {
        let result: Result<TransmissionResults, _> =
            parse_response(200, r#"{"errors": [{"message": "Unauthorized."}]}"#);

        assert!(matches!(result, Err(SparkPostError::Api { status: 200, .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result: Result<TransmissionResults, _> = parse_response(200, "<html>oops</html>");

        assert!(matches!(result, Err(SparkPostError::MalformedResponse(_))));
    }

    #[test]
    fn test_missing_results() {
        let result: Result<TransmissionResults, _> = parse_response(200, "{}");

        assert!(matches!(result, Err(SparkPostError::MalformedResponse(_))));
    }
}
