pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Browsers may call /analyze from exactly one origin. /health is not exposed cross-origin.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([state.config.allowed_origin.clone()]))
        .allow_methods([Method::POST])
        .allow_headers(Any);

    let analysis = Router::new()
        .route("/analyze", post(handlers::handle_analyze))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors);

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(analysis)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, HeaderValue, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::docx::tests::{docx_with_body, paragraph};
    use crate::llm_client::{LlmError, TextGenerator, DEFAULT_API_BASE};

    const ORIGIN: &str = "https://theresumeanalyzer.netlify.app";
    const BOUNDARY: &str = "analyzer-test-boundary";

    /// Canned generator that records the last prompt it was given.
    struct StubGenerator {
        reply: Option<&'static str>,
        last_prompt: Mutex<Option<String>>,
    }

    impl StubGenerator {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply),
                last_prompt: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                last_prompt: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match self.reply {
                Some(reply) => Ok(reply.to_string()),
                None => Err(LlmError::Api {
                    status: 503,
                    message: "model overloaded".to_string(),
                }),
            }
        }

        fn model_name(&self) -> &str {
            "stub-model"
        }
    }

    fn test_config() -> Config {
        Config {
            gemini_api_key: None,
            gemini_model: "stub-model".to_string(),
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            llm_timeout_secs: 5,
            allowed_origin: HeaderValue::from_static(ORIGIN),
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app(llm: Option<Arc<dyn TextGenerator>>) -> Router {
        app_with_config(llm, test_config())
    }

    fn app_with_config(llm: Option<Arc<dyn TextGenerator>>, config: Config) -> Router {
        build_router(AppState { llm, config })
    }

    enum Part<'a> {
        File(&'a str, &'a str, Vec<u8>),
        Text(&'a str, &'a str),
    }

    fn multipart_request(parts: Vec<Part<'_>>) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File(name, file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(&bytes);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn sample_docx() -> Vec<u8> {
        docx_with_body(&[paragraph("Jane Doe"), paragraph("Rust backend engineer")].concat())
    }

    const JD: &str = "Backend Developer. Python and databases. AWS is a plus.";

    #[tokio::test]
    async fn test_analyze_docx_returns_cleaned_result() {
        let stub = StubGenerator::replying(
            "## Fit Score\n**82**\n# Missing Skills\n1. **AWS**\n2. *Python*\n3. SQL\n## Tailored Bullet Points\n- Built APIs",
        );
        let response = app(Some(stub.clone()))
            .oneshot(multipart_request(vec![
                Part::File("resume", "cv.docx", sample_docx()),
                Part::Text("job_description", JD),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let result = body["analysis_result"].as_str().unwrap();
        assert!(!result.contains("**"));
        assert!(!result.lines().any(|line| line.starts_with('#')));
        assert!(result.contains("Fit Score\n82"));

        let prompt = stub.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("RESUME:\nJane Doe\nRust backend engineer\n"));
        assert!(prompt.contains(JD));
    }

    #[tokio::test]
    async fn test_missing_resume_is_bad_request() {
        let response = app(Some(StubGenerator::replying("unused")))
            .oneshot(multipart_request(vec![Part::Text("job_description", JD)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "MISSING_INPUT");
        assert!(body["error"].as_str().unwrap().contains("No resume file"));
    }

    #[tokio::test]
    async fn test_resume_sent_as_text_counts_as_missing() {
        let response = app(Some(StubGenerator::replying("unused")))
            .oneshot(multipart_request(vec![
                Part::Text("resume", "Jane Doe"),
                Part::Text("job_description", JD),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "MISSING_INPUT");
    }

    #[tokio::test]
    async fn test_missing_job_description_is_bad_request() {
        let response = app(Some(StubGenerator::replying("unused")))
            .oneshot(multipart_request(vec![
                Part::File("resume", "cv.docx", sample_docx()),
                Part::Text("job_description", "   "),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "MISSING_INPUT");
        assert!(body["error"].as_str().unwrap().contains("job description"));
    }

    #[tokio::test]
    async fn test_txt_resume_is_unsupported() {
        let stub = StubGenerator::replying("unused");
        let response = app(Some(stub.clone()))
            .oneshot(multipart_request(vec![
                Part::File("resume", "cv.txt", b"Jane Doe".to_vec()),
                Part::Text("job_description", JD),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "UNSUPPORTED_TYPE");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Unsupported file type"));
        assert!(stub.last_prompt.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_parse_failure() {
        let response = app(Some(StubGenerator::replying("unused")))
            .oneshot(multipart_request(vec![
                Part::File("resume", "cv.pdf", b"not really a pdf".to_vec()),
                Part::Text("job_description", JD),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "PARSE_FAILURE");
    }

    #[tokio::test]
    async fn test_unconfigured_model_short_circuits() {
        let response = app(None)
            .oneshot(multipart_request(vec![
                Part::File("resume", "cv.docx", sample_docx()),
                Part::Text("job_description", JD),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["kind"], "MODEL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_model_failure_is_reported() {
        let response = app(Some(StubGenerator::failing()))
            .oneshot(multipart_request(vec![
                Part::File("resume", "cv.docx", sample_docx()),
                Part::Text("job_description", JD),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "MODEL_CALL_FAILURE");
        assert!(body["error"].as_str().unwrap().contains("model overloaded"));
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_invalid_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app(Some(StubGenerator::replying("unused")))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_payload_too_large() {
        let config = Config {
            max_upload_bytes: 1024,
            ..test_config()
        };
        let response = app_with_config(Some(StubGenerator::replying("unused")), config)
            .oneshot(multipart_request(vec![
                Part::Text("job_description", JD),
                Part::File("resume", "cv.pdf", vec![b'x'; 8 * 1024]),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "PAYLOAD_TOO_LARGE");
        assert!(body["error"].as_str().unwrap().contains("too large"));
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/analyze")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_only_configured_origin() {
        let allowed = app(None).oneshot(preflight(ORIGIN)).await.unwrap();
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static(ORIGIN))
        );

        let foreign = app(None)
            .oneshot(preflight("https://evil.example"))
            .await
            .unwrap();
        assert!(foreign
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_health_reports_model_configuration() {
        let request = || {
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap()
        };

        let body = json_body(app(None).oneshot(request()).await.unwrap()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model_configured"], false);

        let stub: Arc<dyn TextGenerator> = StubGenerator::replying("unused");
        let body = json_body(app(Some(stub)).oneshot(request()).await.unwrap()).await;
        assert_eq!(body["model_configured"], true);
        assert_eq!(body["model"], "stub-model");
    }
}
