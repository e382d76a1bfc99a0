use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::settings::InsightSettings;

use super::{ContentPart, InsightError, InsightProvider};

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY: usize = 512;

/// Client for the Generative Language `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(settings: &InsightSettings) -> Result<Self, InsightError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self::with_http(http, settings))
    }

    pub fn with_http(http: reqwest::Client, settings: &InsightSettings) -> Self {
        Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl InsightProvider for GeminiClient {
    async fn generate(&self, parts: Vec<ContentPart>) -> Result<String, InsightError> {
        let api_key = self.api_key.as_deref().ok_or(InsightError::MissingApiKey)?;
        let body = GenerateContentRequest::from_parts(&parts);
        debug!("POST {} ({} parts)", self.url(), parts.len());

        let response = self
            .http
            .post(self.url())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(InsightError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        parse_response(&raw)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_parts(parts: &'a [ContentPart]) -> Self {
        let parts = parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => RequestPart::Text { text },
                ContentPart::InlineImage(image) => RequestPart::Inline {
                    inline_data: InlineData {
                        mime_type: &image.mime_type,
                        data: &image.data,
                    },
                },
            })
            .collect();
        Self {
            contents: vec![RequestContent { parts }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Joins the text parts of the first candidate. A response with no
/// candidates (blocked prompt, say) yields an empty string, not an error.
fn parse_response(raw: &str) -> Result<String, InsightError> {
    let response: GenerateContentResponse =
        serde_json::from_str(raw).map_err(|err| InsightError::Decode(err.to_string()))?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::EncodedImage;
    use serde_json::json;

    fn settings(api_key: Option<&str>, endpoint: &str) -> InsightSettings {
        InsightSettings {
            api_key: api_key.map(String::from),
            endpoint: endpoint.to_string(),
            ..InsightSettings::default()
        }
    }

    #[test]
    fn request_body_shape() {
        let parts = vec![
            ContentPart::Text("hello".into()),
            ContentPart::InlineImage(EncodedImage::from_jpeg_bytes(b"\xff\xd8")),
        ];
        let body = serde_json::to_value(GenerateContentRequest::from_parts(&parts)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        { "text": "hello" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "/9g=" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn parses_and_joins_candidate_text() {
        let raw = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "Open a window. " }, { "text": "🌿✨" } ], "role": "model" } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        })
        .to_string();
        assert_eq!(parse_response(&raw).unwrap(), "Open a window. 🌿✨");
    }

    #[test]
    fn no_candidates_is_empty_text() {
        assert_eq!(parse_response(r#"{"promptFeedback":{}}"#).unwrap(), "");
        assert_eq!(parse_response(r#"{"candidates":[{}]}"#).unwrap(), "");
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            parse_response("<html>"),
            Err(InsightError::Decode(_))
        ));
    }

    #[test]
    fn url_uses_model_and_trims_slash() {
        let client = GeminiClient::new(&settings(Some("k"), "http://localhost:9/v1beta/")).unwrap();
        assert_eq!(
            client.url(),
            format!("http://localhost:9/v1beta/models/{}:generateContent", InsightSettings::default().model)
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let client = GeminiClient::new(&settings(Some("   "), "http://127.0.0.1:9")).unwrap();
        assert!(!client.has_api_key());
        let err = client
            .generate(vec![ContentPart::Text("hi".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::MissingApiKey));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Bind then drop a listener to get a port nobody is serving.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client =
            GeminiClient::new(&settings(Some("key"), &format!("http://127.0.0.1:{port}"))).unwrap();
        let err = client
            .generate(vec![ContentPart::Text("hi".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::Transport(_)), "got {err:?}");
    }

    /// Serves exactly one HTTP response and hands back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            // Every request body here is a JSON object, so its last byte is `}`.
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.ends_with(b"}") {
                    break;
                }
            }
            let reply = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len(),
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (addr, server)
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let (addr, server) =
            serve_once("429 Too Many Requests", r#"{"error":{"code":429,"message":"quota"}}"#).await;

        let client = GeminiClient::new(&settings(Some("key"), &format!("http://{addr}"))).unwrap();
        let err = client
            .generate(vec![ContentPart::Text("hi".into())])
            .await
            .unwrap_err();
        match err {
            InsightError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("quota"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn successful_reply_is_parsed() {
        let (addr, server) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"Mist my leaves. 🌱"}]}}]}"#,
        )
        .await;

        let client = GeminiClient::new(&settings(Some("secret"), &format!("http://{addr}"))).unwrap();
        let text = client
            .generate(vec![ContentPart::Text("hi".into())])
            .await
            .unwrap();
        assert_eq!(text, "Mist my leaves. 🌱");

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("post /models/"));
        assert!(request.contains("x-goog-api-key: secret"));
        assert!(request.contains(r#""parts":[{"text":"hi"}]"#));
    }
}
