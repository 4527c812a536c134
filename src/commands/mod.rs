// HTTP boundary: thin axum handlers over the services layer.

pub mod analyze;
pub mod error;
pub mod session;
pub mod system;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::AppSettings;
use crate::services::analysis::Analyzer;
use crate::services::gemini::ModelGateway;
use crate::services::presentation::ControlRegistry;

/// Header carrying the client's session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Allowance on top of the image limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub controls: Arc<ControlRegistry>,
    pub settings: Arc<AppSettings>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(settings: AppSettings, gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            analyzer: Arc::new(Analyzer::new(gateway)),
            controls: Arc::new(ControlRegistry::new(settings.max_upload_bytes)),
            settings: Arc::new(settings),
            started_at: Instant::now(),
        }
    }
}

pub(crate) fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

pub fn router(state: AppState) -> Router {
    let body_limit = state
        .settings
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);
    let static_files = ServeDir::new(&state.settings.static_dir);

    Router::new()
        .route("/analyze", post(analyze::analyze))
        .route("/session", get(session::snapshot))
        .route("/session/reset", post(session::reset))
        .route("/status", get(system::get_system_status))
        .layer(DefaultBodyLimit::max(body_limit))
        .fallback_service(static_files)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gemini::testing::StubGateway;
    use crate::services::gemini::GatewayError;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    const BOUNDARY: &str = "bloodlens-test-boundary";

    const HEMOGLOBIN: &str = r#"{"biomarkers":[{"parameter":"HEMOGLOBIN","result":"10.2","range":"13-17","status":"Low ⚠️"}],"docsNote":"Your hemoglobin is a little low.","hindiSummary":"","actionableSteps":["Eat iron-rich food"],"nutritionPlan":["Spinach","Lentils"],"risk":null}"#;

    fn state_with(gateway: Arc<StubGateway>) -> AppState {
        let settings = AppSettings {
            max_upload_bytes: 64 * 1024,
            static_dir: std::env::temp_dir().join("bloodlens-no-static"),
            ..AppSettings::default()
        };
        AppState::new(settings, gateway)
    }

    fn multipart_body(field: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"report.jpg\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(field: &str, content_type: &str, session: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(id) = session {
            builder = builder.header(SESSION_HEADER, id);
        }
        builder
            .body(Body::from(multipart_body(field, content_type, &[0xFF, 0xD8, 0xFF, 0xE0])))
            .unwrap()
    }

    fn oversized_request(bytes: usize) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body("report", "image/jpeg", &vec![0xAB; bytes])))
            .unwrap()
    }

    async fn json_of(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn analyze_returns_render_view() {
        let gateway = Arc::new(StubGateway::replying(&format!("```json\n{HEMOGLOBIN}\n```")));
        let app = router(state_with(gateway.clone()));

        let response = app.oneshot(upload_request("report", "image/jpeg", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_of(response).await;
        let row = &json["biomarkers"][0];
        assert_eq!(row["parameter"], "HEMOGLOBIN");
        assert_eq!(row["status"], "Low");
        assert_eq!(row["severityColor"], "danger");
        assert_eq!(row["scalePercent"], 20);
        assert!(row["description"].as_str().unwrap().contains("oxygen"));
        assert_eq!(json["docsNote"], "Your hemoglobin is a little low.");
        assert_eq!(json["nutritionPlan"][1], "Lentils");
        assert_eq!(json["hasRiskAlert"], false);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn non_image_rejected_without_gateway_call() {
        let gateway = Arc::new(StubGateway::replying(HEMOGLOBIN));
        let app = router(state_with(gateway.clone()));

        let response = app
            .oneshot(upload_request("report", "application/pdf", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_of(response).await["error"],
            "Please upload a valid image file of your report."
        );
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_report_field_is_400() {
        let gateway = Arc::new(StubGateway::replying(HEMOGLOBIN));
        let app = router(state_with(gateway));

        let response = app.oneshot(upload_request("photo", "image/jpeg", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["error"], "No file uploaded.");
    }

    #[tokio::test]
    async fn upload_over_body_limit_is_413() {
        let gateway = Arc::new(StubGateway::replying(HEMOGLOBIN));
        let app = router(state_with(gateway.clone()));

        // 64 KiB image limit, so the body limit is 64 KiB + 1 MiB.
        let response = app.oneshot(oversized_request(2 * 1024 * 1024)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_of(response).await["error"], "Image too large (max 1 MB).");
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn upload_over_image_limit_is_413() {
        let gateway = Arc::new(StubGateway::replying(HEMOGLOBIN));
        let app = router(state_with(gateway.clone()));

        let response = app.oneshot(oversized_request(128 * 1024)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn prose_reply_is_generic_500() {
        let gateway = Arc::new(StubGateway::replying("Sorry, I cannot process this."));
        let app = router(state_with(gateway));

        let response = app.oneshot(upload_request("report", "image/png", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_of(response).await;
        assert_eq!(json["error"], "Analysis failed. Please try again.");
        assert!(!json.to_string().contains("Sorry"));
    }

    #[tokio::test]
    async fn quota_error_is_429() {
        let gateway = Arc::new(StubGateway::failing(|| GatewayError::Api {
            status: 429,
            body: "RESOURCE_EXHAUSTED".into(),
        }));
        let app = router(state_with(gateway));

        let response = app.oneshot(upload_request("report", "image/png", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn same_session_second_upload_conflicts() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(StubGateway::replying(HEMOGLOBIN).gated(gate.clone()));
        let app = router(state_with(gateway.clone()));

        let (first, second) = tokio::join!(
            app.clone().oneshot(upload_request("report", "image/jpeg", Some("tab-1"))),
            async {
                // Let the first request reach the gateway before the second arrives.
                while gateway.call_count() == 0 {
                    tokio::task::yield_now().await;
                }
                let response = app
                    .clone()
                    .oneshot(upload_request("report", "image/jpeg", Some("tab-1")))
                    .await;
                gate.notify_one();
                response
            }
        );

        assert_eq!(first.unwrap().status(), StatusCode::OK);
        let second = second.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(json_of(second).await["error"], "An analysis is already in progress.");
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn session_snapshot_and_reset() {
        let gateway = Arc::new(StubGateway::replying("not json"));
        let app = router(state_with(gateway));

        let response = app
            .clone()
            .oneshot(upload_request("report", "image/png", Some("tab-9")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let snapshot = |method: &str, uri: &str| {
            Request::builder()
                .method(method)
                .uri(uri)
                .header(SESSION_HEADER, "tab-9")
                .body(Body::empty())
                .unwrap()
        };

        let json = json_of(app.clone().oneshot(snapshot("GET", "/session")).await.unwrap()).await;
        assert_eq!(json["state"]["phase"], "failed");
        assert_eq!(json["affordance"]["enabled"], true);
        assert_eq!(json["affordanceToggles"], 2);

        let json = json_of(app.oneshot(snapshot("POST", "/session/reset")).await.unwrap()).await;
        assert_eq!(json["state"]["phase"], "idle");
    }

    #[tokio::test]
    async fn status_reports_configuration() {
        let gateway = Arc::new(StubGateway::replying(HEMOGLOBIN));
        let app = router(state_with(gateway));

        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["model"], "gemini-2.5-flash");
        assert_eq!(json["gemini_configured"], false);
    }
}
