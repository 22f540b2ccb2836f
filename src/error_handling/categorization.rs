//! Error categorization.

use super::types::RequestFailureKind;

/// Categorizes a `reqwest::Error` into a `RequestFailureKind`.
///
/// Order matters: a redirect-limit overflow is also a request error, and a
/// connect timeout is also a connect error; the more specific kind wins.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> RequestFailureKind {
    if error.is_builder() {
        RequestFailureKind::Builder
    } else if error.is_redirect() {
        RequestFailureKind::Redirect
    } else if error.is_status() {
        RequestFailureKind::Status
    } else if error.is_timeout() {
        RequestFailureKind::Timeout
    } else if error.is_connect() {
        RequestFailureKind::Connect
    } else if error.is_request() {
        RequestFailureKind::Request
    } else if error.is_body() {
        RequestFailureKind::Body
    } else if error.is_decode() {
        RequestFailureKind::Decode
    } else {
        RequestFailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_categorize_builder_error() {
        let client = reqwest::Client::new();
        let error = client
            .get("not a url")
            .send()
            .await
            .expect_err("relative URL must not build");
        assert_eq!(categorize_reqwest_error(&error), RequestFailureKind::Builder);
    }

    #[tokio::test]
    async fn test_categorize_connect_error() {
        // Port 9 on localhost is almost never listening
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let error = client
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .expect_err("nothing listens on the discard port");
        let kind = categorize_reqwest_error(&error);
        assert!(
            matches!(kind, RequestFailureKind::Connect | RequestFailureKind::Timeout),
            "unexpected kind {kind}"
        );
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(RequestFailureKind::Timeout.to_string(), "timeout");
        assert_eq!(RequestFailureKind::Redirect.to_string(), "redirect");
    }
}
