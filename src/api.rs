//! HTTP surface for docquiz.
//!
//! - `GET /` – Liveness message.
//! - `POST /process` – Multipart upload (field `pdf`) of a PDF. Returns
//!   `{ "summary": string, "quiz": [{ "question", "options", "correct" }] }`.
//! - `GET /metrics` – Pipeline counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools.
//!
//! Fatal pipeline errors are reported as a bare status code with an empty body.

use crate::processing::{PipelineError, ProcessedDocument, ProcessingApi};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Multipart field expected to carry the document.
const UPLOAD_FIELD: &str = "pdf";

/// Build the HTTP router exposing the pipeline.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: ProcessingApi + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/process", post(process_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(service)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "docquiz is running" }))
}

/// Summarize an uploaded document and build its quiz.
///
/// The document is read from the `pdf` field; when no such field exists the first field that
/// carries a file name is used instead.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<ProcessedDocument>, AppError>
where
    S: ProcessingApi,
{
    let document = read_upload(multipart).await?;
    tracing::info!(bytes = document.len(), "Received document upload");
    let processed = service.process_document(document).await?;
    tracing::info!(
        summary_chars = processed.summary.len(),
        quiz_items = processed.quiz.len(),
        "Process request completed"
    );
    Ok(Json(processed))
}

async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    let mut fallback = None;
    while let Some(field) = multipart.next_field().await.map_err(|error| {
        tracing::warn!(error = %error, "Malformed multipart body");
        AppError::BadUpload
    })? {
        let is_upload = field.name() == Some(UPLOAD_FIELD);
        let is_file = field.file_name().is_some();
        if !is_upload && (!is_file || fallback.is_some()) {
            continue;
        }
        let bytes = field.bytes().await.map_err(|error| {
            tracing::warn!(error = %error, "Failed to read upload field");
            AppError::BadUpload
        })?;
        if is_upload {
            return Ok(bytes.to_vec());
        }
        fallback = Some(bytes.to_vec());
    }
    fallback.ok_or(AppError::BadUpload)
}

/// Return the pipeline counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: ProcessingApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "process",
                method: "POST",
                path: "/process",
                description: "Upload a PDF as multipart field 'pdf'. Response returns { \"summary\": string, \"quiz\": [{ \"question\", \"options\", \"correct\" }] }.",
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return pipeline counters (documents, chunks, questions, fallback items).",
            },
            CommandDescriptor {
                name: "root",
                method: "GET",
                path: "/",
                description: "Liveness check.",
            },
        ],
    })
}

enum AppError {
    BadUpload,
    Pipeline(PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::BadUpload => StatusCode::BAD_REQUEST,
            Self::Pipeline(PipelineError::DocumentFormat(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Pipeline(
                PipelineError::ReduceSummarization(_) | PipelineError::QuestionGeneration(_),
            ) => StatusCode::BAD_GATEWAY,
            Self::Pipeline(PipelineError::Chunking(_) | PipelineError::ExtractionTask(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        status.into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self::Pipeline(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::extraction::DocumentFormatError;
    use crate::metrics::MetricsSnapshot;
    use crate::models::ModelClientError;
    use crate::processing::{PipelineError, ProcessedDocument, ProcessingApi, QuizItem};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    const BOUNDARY: &str = "docquiz-test-boundary";

    #[derive(Clone, Copy)]
    enum Behavior {
        Succeed,
        BadDocument,
        ModelDown,
    }

    struct StubPipeline {
        uploads: Mutex<Vec<Vec<u8>>>,
        behavior: Behavior,
    }

    impl StubPipeline {
        fn new(behavior: Behavior) -> Self {
            Self {
                uploads: Mutex::new(Vec::new()),
                behavior,
            }
        }
    }

    #[async_trait]
    impl ProcessingApi for StubPipeline {
        async fn process_document(
            &self,
            document: Vec<u8>,
        ) -> Result<ProcessedDocument, PipelineError> {
            self.uploads.lock().await.push(document);
            match self.behavior {
                Behavior::Succeed => Ok(ProcessedDocument {
                    summary: "Short summary".into(),
                    quiz: vec![QuizItem {
                        question: "Q1".into(),
                        options: [
                            "A".into(),
                            "A".into(),
                            "None of the above".into(),
                            "I don't know".into(),
                        ],
                        correct: "A".into(),
                    }],
                }),
                Behavior::BadDocument => {
                    Err(PipelineError::DocumentFormat(DocumentFormatError::Unreadable(
                        "not a pdf".into(),
                    )))
                }
                Behavior::ModelDown => Err(PipelineError::QuestionGeneration(
                    ModelClientError::ProviderUnavailable("offline".into()),
                )),
            }
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_processed: 3,
                ..MetricsSnapshot::default()
            }
        }
    }

    fn multipart_body(field: &str, file_name: Option<&str>, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match file_name {
            Some(name) => format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n"
            ),
            None => format!("Content-Disposition: form-data; name=\"{field}\"\r\n"),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/process")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    #[tokio::test]
    async fn commands_catalog_exposes_process_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let process = commands
            .iter()
            .find(|cmd| cmd.name == "process")
            .expect("process command present");

        assert_eq!(process.method, "POST");
        assert_eq!(process.path, "/process");
        assert!(process.description.contains("pdf"));
    }

    #[tokio::test]
    async fn process_route_returns_summary_and_quiz() {
        let service = Arc::new(StubPipeline::new(Behavior::Succeed));
        let app = create_router(service.clone(), 1024 * 1024);

        let response = app
            .oneshot(upload_request(multipart_body(
                "pdf",
                Some("notes.pdf"),
                b"%PDF-1.5 fake",
            )))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["summary"], "Short summary");
        assert_eq!(json["quiz"][0]["question"], "Q1");
        assert_eq!(json["quiz"][0]["options"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["quiz"][0]["correct"], "A");

        let uploads = service.uploads.lock().await;
        assert_eq!(uploads.as_slice(), &[b"%PDF-1.5 fake".to_vec()]);
    }

    #[tokio::test]
    async fn any_file_field_is_accepted() {
        let service = Arc::new(StubPipeline::new(Behavior::Succeed));
        let app = create_router(service.clone(), 1024 * 1024);

        let response = app
            .oneshot(upload_request(multipart_body(
                "document",
                Some("paper.pdf"),
                b"bytes",
            )))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(service.uploads.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn missing_upload_is_bad_request() {
        let service = Arc::new(StubPipeline::new(Behavior::Succeed));
        let app = create_router(service.clone(), 1024 * 1024);

        let response = app
            .oneshot(upload_request(multipart_body("note", None, b"just text")))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(service.uploads.lock().await.is_empty());
    }

    #[tokio::test]
    async fn fatal_errors_have_status_and_empty_body() {
        for (behavior, expected) in [
            (Behavior::BadDocument, StatusCode::UNPROCESSABLE_ENTITY),
            (Behavior::ModelDown, StatusCode::BAD_GATEWAY),
        ] {
            let app = create_router(Arc::new(StubPipeline::new(behavior)), 1024 * 1024);
            let response = app
                .oneshot(upload_request(multipart_body("pdf", Some("a.pdf"), b"x")))
                .await
                .expect("router response");

            assert_eq!(response.status(), expected);
            let body = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body bytes");
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn root_and_metrics_routes_respond() {
        let app = create_router(Arc::new(StubPipeline::new(Behavior::Succeed)), 1024);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["documents_processed"], 3);
        assert_eq!(json["fallback_quiz_items"], 0);
    }
}
