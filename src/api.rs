//! HTTP surface for Cruxify.
//!
//! - `GET /` – Welcome message.
//! - `GET /health` – Liveness probe.
//! - `POST /summarize/text` – Summarize `{ "text": ... }`; returns `summary`, `original_length`,
//!   `summary_length`.
//! - `POST /summarize/text/form` – Same as above for a urlencoded `text` field. The payload keeps
//!   the capitalized `Summary` key that older clients read.
//! - `POST /summarize/file` – Multipart upload (`file` field) of a PDF, Word document, or image.
//! - `GET /metrics` – Request counters.
//!
//! Every failure is rendered as `{ "detail": "..." }` with `400` for input, format, and
//! extraction problems and `500` when the remote summarizer fails. Bodies the extractors cannot
//! parse keep axum's status (`400`, `413`, `415`, `422`) but still use the `detail` shape. CORS
//! is wide open.

use crate::processing::{ProcessingError, SummarizeApi, SummaryResult};
use axum::{
    Form, Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const SERVICE_NAME: &str = "Cruxify AI API";

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: SummarizeApi + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/summarize/text", post(summarize_text::<S>))
        .route("/summarize/text/form", post(summarize_text_form::<S>))
        .route("/summarize/file", post(summarize_file::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to Cruxify AI API",
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

/// Request body for `POST /summarize/text` and `POST /summarize/text/form`.
#[derive(Deserialize)]
struct TextSummaryRequest {
    text: String,
}

/// Summarize plain text submitted as JSON.
async fn summarize_text<S>(
    State(service): State<Arc<S>>,
    request: Result<Json<TextSummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryResult>, AppError>
where
    S: SummarizeApi,
{
    let Json(request) = request?;
    let result = service.summarize_text(&request.text).await?;
    tracing::info!(
        original_length = result.original_length,
        summary_length = result.summary_length,
        "Text summarized"
    );
    Ok(Json(result))
}

/// Legacy payload returned by the form endpoint.
#[derive(Serialize)]
struct LegacySummaryResponse {
    #[serde(rename = "Summary")]
    summary: String,
    original_length: usize,
    summary_length: usize,
}

impl From<SummaryResult> for LegacySummaryResponse {
    fn from(result: SummaryResult) -> Self {
        Self {
            summary: result.summary,
            original_length: result.original_length,
            summary_length: result.summary_length,
        }
    }
}

/// Summarize plain text submitted as a urlencoded form.
async fn summarize_text_form<S>(
    State(service): State<Arc<S>>,
    request: Result<Form<TextSummaryRequest>, FormRejection>,
) -> Result<Json<LegacySummaryResponse>, AppError>
where
    S: SummarizeApi,
{
    let Form(request) = request?;
    let result = service.summarize_text(&request.text).await?;
    tracing::info!(
        original_length = result.original_length,
        summary_length = result.summary_length,
        "Form text summarized"
    );
    Ok(Json(result.into()))
}

/// Summarize the contents of an uploaded PDF, Word document, or image.
async fn summarize_file<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryResult>, AppError>
where
    S: SummarizeApi,
{
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::multipart("Failed to read form field", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::multipart("Failed to read file data", e))?;
        upload = Some((file_name, data.to_vec()));
    }

    let (file_name, bytes) = upload
        .filter(|(file_name, _)| !file_name.is_empty())
        .ok_or_else(|| AppError::bad_request("No file uploaded"))?;

    tracing::info!(file_name = %file_name, bytes = bytes.len(), "File upload received");
    let result = service.summarize_file(&file_name, bytes).await?;
    tracing::info!(
        file_name = %file_name,
        original_length = result.original_length,
        summary_length = result.summary_length,
        "File summarized"
    );
    Ok(Json(result))
}

/// Return request counters since startup.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: SummarizeApi,
{
    Json(service.metrics_snapshot())
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

enum AppError {
    Processing(ProcessingError),
    /// Request body rejected before the pipeline runs, with the status axum assigned.
    Rejected { status: StatusCode, detail: String },
}

impl AppError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self::Rejected {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn multipart(context: &str, error: MultipartError) -> Self {
        Self::Rejected {
            status: error.status(),
            detail: format!("{context}: {}", error.body_text()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Processing(error) if error.is_client_error() => {
                tracing::warn!(error = %error, "Request rejected");
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            Self::Processing(error) => {
                tracing::warn!(error = %error, "Summarization failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
            Self::Rejected { status, detail } => {
                tracing::warn!(status = %status, detail = %detail, "Malformed request");
                (status, detail)
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::extraction::{Extractor, TesseractOcr};
    use crate::processing::SummarizationService;
    use crate::summarization::{
        ChatCompletionClient, ChatCompletionRequest, SummarizationClientError,
    };
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "cruxify-test-boundary";

    struct StubClient {
        reply: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl ChatCompletionClient for StubClient {
        async fn complete(
            &self,
            _request: ChatCompletionRequest,
        ) -> Result<String, SummarizationClientError> {
            self.reply.map(str::to_string).map_err(|reason| {
                SummarizationClientError::ProviderUnavailable(reason.to_string())
            })
        }
    }

    fn app(reply: Result<&'static str, &'static str>) -> Router {
        app_with_limit(reply, 1024 * 1024)
    }

    fn app_with_limit(
        reply: Result<&'static str, &'static str>,
        max_upload_bytes: usize,
    ) -> Router {
        let service = SummarizationService::new(
            Box::new(StubClient { reply }),
            Extractor::new(Box::new(TesseractOcr::new("tesseract"))),
            "test-model",
        );
        create_router(Arc::new(service), max_upload_bytes)
    }

    fn raw_request(uri: &str, content_type: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("request")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn json_request(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    fn form_request(text: &str) -> Request<Body> {
        let encoded: String = text
            .bytes()
            .map(|byte| match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => (byte as char).to_string(),
                b' ' => "+".to_string(),
                other => format!("%{other:02X}"),
            })
            .collect();
        Request::builder()
            .method(Method::POST)
            .uri("/summarize/text/form")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("text={encoded}")))
            .expect("request")
    }

    fn multipart_request(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/summarize/file")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let (status, body) = send(
            app(Ok("unused")),
            Request::get("/").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to Cruxify AI API");

        let (status, body) = send(
            app(Ok("unused")),
            Request::get("/health").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "healthy", "service": "Cruxify AI API" }));
    }

    #[tokio::test]
    async fn text_route_returns_summary_with_lengths() {
        let text = "word ".repeat(20);
        let (status, body) = send(
            app(Ok("stub summary")),
            json_request("/summarize/text", json!({ "text": text })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "summary": "stub summary", "original_length": 100, "summary_length": 12 })
        );
    }

    #[tokio::test]
    async fn text_route_rejects_short_and_blank_input() {
        let (status, body) = send(
            app(Ok("unused")),
            json_request("/summarize/text", json!({ "text": "a".repeat(49) })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["detail"]
                .as_str()
                .expect("detail")
                .contains("minimum 50 characters")
        );

        let (status, body) = send(
            app(Ok("unused")),
            json_request("/summarize/text", json!({ "text": "    " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Text cannot be empty");
    }

    #[tokio::test]
    async fn form_route_keeps_legacy_summary_key() {
        let text = "word ".repeat(20);
        let (status, body) = send(app(Ok("stub summary")), form_request(&text)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "Summary": "stub summary", "original_length": 100, "summary_length": 12 })
        );
    }

    #[tokio::test]
    async fn form_route_rejects_short_input() {
        let (status, body) = send(app(Ok("unused")), form_request(&"a".repeat(49))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().expect("detail").contains("minimum 50"));
    }

    #[tokio::test]
    async fn remote_failure_is_internal_error() {
        let (status, body) = send(
            app(Err("connection refused")),
            json_request("/summarize/text", json!({ "text": "word ".repeat(20) })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().expect("detail");
        assert!(detail.contains("Error generating summary"));
        assert!(detail.contains("connection refused"));
    }

    #[tokio::test]
    async fn unsupported_upload_is_bad_request() {
        let (status, body) = send(
            app(Ok("unused")),
            multipart_request("file", "notes.txt", b"some plain text notes"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["detail"]
                .as_str()
                .expect("detail")
                .contains("Unsupported file type")
        );
    }

    #[tokio::test]
    async fn upload_without_file_field_is_bad_request() {
        let (status, body) = send(
            app(Ok("unused")),
            multipart_request("attachment", "report.pdf", b"%PDF-1.5"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No file uploaded");
    }

    #[tokio::test]
    async fn corrupt_pdf_upload_reports_extraction_error() {
        let (status, body) = send(
            app(Ok("unused")),
            multipart_request("file", "broken.pdf", b"not really a pdf"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["detail"]
                .as_str()
                .expect("detail")
                .starts_with("Error extracting text from PDF:")
        );
    }

    #[tokio::test]
    async fn docx_upload_is_summarized() {
        let paragraph = "Meeting notes: the team agreed to ship the release candidate on Friday.";
        let docx = crate::extraction::fixtures::docx_with_paragraphs(&[paragraph]);

        let (status, body) = send(
            app(Ok("ship friday")),
            multipart_request("file", "notes.DOCX", &docx),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "ship friday");
        assert_eq!(body["original_length"], paragraph.len());
        assert_eq!(body["summary_length"], 11);
    }

    #[tokio::test]
    async fn short_docx_upload_reports_extracted_text_too_short() {
        let docx = crate::extraction::fixtures::docx_with_paragraphs(&["Too short."]);

        let (status, body) = send(
            app(Ok("unused")),
            multipart_request("file", "brief.docx", &docx),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["detail"]
                .as_str()
                .expect("detail")
                .starts_with("Extracted text too short")
        );
    }

    #[tokio::test]
    async fn metrics_reflect_handled_requests() {
        let app = app(Ok("stub summary"));
        let _ = send(
            app.clone(),
            json_request("/summarize/text", json!({ "text": "word ".repeat(20) })),
        )
        .await;
        let _ = send(
            app.clone(),
            json_request("/summarize/text", json!({ "text": "short" })),
        )
        .await;

        let (status, body) = send(
            app,
            Request::get("/metrics").body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["texts_summarized"], 1);
        assert_eq!(body["failed_requests"], 1);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let response = app(Ok("unused"))
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/summarize/text")
                    .header(header::ORIGIN, "https://frontend.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .expect("allow-origin header"),
            "*"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_reported_as_detail() {
        let (status, body) = send(
            app(Ok("unused")),
            raw_request("/summarize/text", "application/json", "{not json"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["detail"]
                .as_str()
                .expect("detail")
                .contains("Failed to parse the request body as JSON")
        );

        let (status, body) = send(
            app(Ok("unused")),
            raw_request("/summarize/text", "application/json", "{}"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().expect("detail").contains("missing field `text`"));
    }

    #[tokio::test]
    async fn form_without_text_field_is_reported_as_detail() {
        let (status, body) = send(
            app(Ok("unused")),
            raw_request(
                "/summarize/text/form",
                "application/x-www-form-urlencoded",
                "other=1",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().expect("detail").contains("missing field `text`"));
    }

    #[tokio::test]
    async fn upload_without_multipart_boundary_is_reported_as_detail() {
        let (status, body) = send(
            app(Ok("unused")),
            raw_request("/summarize/file", "application/json", "{}"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().expect("detail").contains("boundary"));
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let content = vec![b'x'; 4096];
        let (status, body) = send(
            app_with_limit(Ok("unused"), 256),
            multipart_request("file", "big.pdf", &content),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["detail"].is_string());
    }
}
