use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use super::{RecognizeOptions, Recognizer, RecognizerFuture};
use crate::canvas::Bitmap;
use crate::error::{Result, ScribeError};

const BASE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Cloud recognition against the document-text-detection endpoint. One
/// request per invocation; retrying is the caller's decision. The annotate
/// API has no accuracy or correction knobs, so the request options only
/// drive the local engine.
#[derive(Debug, Clone)]
pub struct RemoteRecognizer {
    key: String,
    endpoint: String,
}

impl RemoteRecognizer {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            endpoint: BASE_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        if !endpoint.trim().is_empty() {
            self.endpoint = endpoint;
        }
        self
    }
}

impl Recognizer for RemoteRecognizer {
    fn recognize(self, bitmap: Bitmap, _options: RecognizeOptions) -> RecognizerFuture {
        Box::pin(async move {
            let client = reqwest::Client::new();
            let encoded = BASE64.encode(bitmap.png_bytes());
            let body = json!({
                "requests": [
                    {
                        "image": { "content": encoded },
                        "features": [ { "type": "DOCUMENT_TEXT_DETECTION" } ]
                    }
                ]
            });

            let url = format!("{}?key={}", self.endpoint, self.key);
            tracing::debug!("posting {}x{} bitmap to annotate endpoint", bitmap.width(), bitmap.height());
            let response = client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|err| ScribeError::Recognition(format!("network failure: {}", err)))?;

            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(ScribeError::Recognition(format!(
                    "annotate endpoint returned {}: {}",
                    status,
                    extract_vision_error(&text).unwrap_or(text)
                )));
            }
            extract_annotation_text(&text)
        })
    }
}

/// Pulls recognized text out of an annotate response: the full-text
/// annotation when present, else the first per-region annotation.
fn extract_annotation_text(text: &str) -> Result<String> {
    let payload: AnnotateResponse = serde_json::from_str(text).map_err(|err| {
        ScribeError::Recognition(format!("failed to parse annotate response: {}", err))
    })?;
    let first = payload
        .responses
        .first()
        .ok_or_else(|| ScribeError::Recognition("empty annotate response".to_string()))?;

    if let Some(full) = &first.full_text_annotation {
        if let Some(text) = &full.text {
            return Ok(text.clone());
        }
    }
    if let Some(annotation) = first.text_annotations.first() {
        if let Some(description) = &annotation.description {
            return Ok(description.clone());
        }
    }
    Err(ScribeError::Recognition(
        "no text found in annotate response".to_string(),
    ))
}

fn extract_vision_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<VisionError>,
    }

    #[derive(Deserialize)]
    struct VisionError {
        message: Option<String>,
        status: Option<String>,
        code: Option<i32>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    let mut parts = Vec::new();
    if let Some(message) = error.message {
        if !message.trim().is_empty() {
            parts.push(message);
        }
    }
    if let Some(status) = error.status {
        if !status.trim().is_empty() {
            parts.push(format!("status: {}", status));
        }
    }
    if let Some(code) = error.code {
        parts.push(format!("code: {}", code));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResult {
    #[serde(rename = "fullTextAnnotation")]
    full_text_annotation: Option<FullTextAnnotation>,
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<TextAnnotation>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{capture, Stroke, StrokePoint, StrokeSurface};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_bitmap() -> Bitmap {
        let surface = StrokeSurface {
            width: 8.0,
            height: 8.0,
            strokes: vec![Stroke {
                points: vec![
                    StrokePoint { x: 1.0, y: 4.0 },
                    StrokePoint { x: 7.0, y: 4.0 },
                ],
                width: 1.0,
            }],
        };
        capture(&surface, 2.0).unwrap()
    }

    #[test]
    fn full_text_annotation_wins_over_regions() {
        let body = r#"{"responses":[{"fullTextAnnotation":{"text":"x = 1"},"textAnnotations":[{"description":"ignored"}]}]}"#;
        assert_eq!(extract_annotation_text(body).unwrap(), "x = 1");
    }

    #[test]
    fn falls_back_to_first_region_annotation() {
        let body = r#"{"responses":[{"textAnnotations":[{"description":"int main(){}"}]}]}"#;
        assert_eq!(extract_annotation_text(body).unwrap(), "int main(){}");
    }

    #[test]
    fn missing_text_in_both_shapes_is_an_error() {
        let body = r#"{"responses":[{}]}"#;
        let err = extract_annotation_text(body).unwrap_err();
        assert!(err.to_string().contains("no text found"));
    }

    #[test]
    fn empty_responses_array_is_an_error() {
        let err = extract_annotation_text(r#"{"responses":[]}"#).unwrap_err();
        assert!(err.to_string().contains("empty annotate response"));
    }

    #[test]
    fn undecodable_payload_is_an_error() {
        let err = extract_annotation_text("<html>backend down</html>").unwrap_err();
        assert!(matches!(err, ScribeError::Recognition(_)));
    }

    #[tokio::test]
    async fn posts_document_text_detection_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": [ { "fullTextAnnotation": { "text": "if x:\ny" } } ]
            })))
            .mount(&server)
            .await;

        let recognizer = RemoteRecognizer::new("test-key").with_endpoint(server.uri());
        let text = recognizer
            .recognize(test_bitmap(), RecognizeOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "if x:\ny");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body["requests"][0]["features"][0]["type"],
            "DOCUMENT_TEXT_DETECTION"
        );
        let content = body["requests"][0]["image"]["content"].as_str().unwrap();
        assert!(!content.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_surfaced_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": { "message": "key expired", "status": "PERMISSION_DENIED", "code": 403 }
            })))
            .mount(&server)
            .await;

        let recognizer = RemoteRecognizer::new("bad-key").with_endpoint(server.uri());
        let err = recognizer
            .recognize(test_bitmap(), RecognizeOptions::default())
            .await
            .unwrap_err();
        match err {
            ScribeError::Recognition(message) => {
                assert!(message.contains("403"));
                assert!(message.contains("key expired"));
            }
            other => panic!("expected recognition error, got {:?}", other),
        }

        // a single attempt, no retries
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn network_failure_is_a_recognition_error() {
        // A builder-created server is not pooled, so dropping it actually
        // closes the listener and the endpoint refuses connections.
        let server = MockServer::builder().start().await;
        let endpoint = server.uri();
        drop(server);

        let recognizer = RemoteRecognizer::new("key").with_endpoint(endpoint);
        let err = recognizer
            .recognize(test_bitmap(), RecognizeOptions::default())
            .await
            .unwrap_err();
        match err {
            ScribeError::Recognition(message) => assert!(message.contains("network failure")),
            other => panic!("expected recognition error, got {:?}", other),
        }
    }
}
