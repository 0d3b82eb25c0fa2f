//! Axum route handlers for the Layout API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::document::{normalize_with_title, ResumeDocument};
use crate::errors::AppError;
use crate::layout::plan::BlockKind;
use crate::layout::{LayoutEngine, LayoutPlan};
use crate::state::AppState;
use crate::templates::{ColorOverride, Colors, TemplateConfig, TemplateKind};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    /// Raw resume record in any of the accepted shapes (object or JSON string).
    #[serde(default)]
    pub resume: Value,
    pub template: Option<String>,
    #[serde(default)]
    pub colors: ColorOverride,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    #[serde(flatten)]
    pub plan: LayoutPlan,
    /// Template colors after the request's override.
    pub colors: Colors,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    #[serde(default)]
    pub resume: Value,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub default: TemplateKind,
    pub templates: Vec<TemplateConfig>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
///
/// Lists every built-in template with its limits and geometry.
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        default: state.config.default_template,
        templates: TemplateKind::ALL.iter().map(TemplateKind::config).collect(),
    })
}

/// POST /api/v1/layout
///
/// Normalizes the raw record and computes its layout plan. The engine is
/// CPU-bound, so it runs on the blocking pool.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    let kind = match request.template.as_deref() {
        Some(name) => name.parse::<TemplateKind>()?,
        None => state.config.default_template,
    };
    let config = kind.config().with_colors(&request.colors);
    let colors = config.colors.clone();
    let scorer = Arc::clone(&state.scorer);
    let resume = request.resume;
    let title = request.title;

    let plan = tokio::task::spawn_blocking(move || {
        let doc = normalize_with_title(&resume, title.as_deref());
        let plan = LayoutEngine::new(scorer.as_ref()).layout(&doc, &config);
        debug_assert!(plan.verify().is_ok(), "layout plan violates geometry invariants");
        plan
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))?;

    info!(
        template = %kind,
        blocks = plan.blocks.len(),
        jobs = plan.count_of(BlockKind::JobHeader),
        page_height = plan.page_height,
        rescaled = plan.rescaled,
        trimmed = plan.trimmed.len(),
        overflow = plan.overflow,
        "Layout computed"
    );

    Ok(Json(LayoutResponse { plan, colors }))
}

/// POST /api/v1/normalize
///
/// Returns the canonical document the engine would lay out.
pub async fn handle_normalize(Json(request): Json<NormalizeRequest>) -> Json<ResumeDocument> {
    Json(normalize_with_title(&request.resume, request.title.as_deref()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::routes::build_router;

    fn router() -> axum::Router {
        build_router(AppState::new(Config::default()))
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn read_json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn sample_resume() -> Value {
        json!({
            "personalInfo": {"fullName": "Ada Lovelace", "email": "ada@example.com"},
            "summary": "Engineer who ships. Likes analytical engines.",
            "experience": [{
                "title": "Staff Engineer",
                "company": "Analytical Co",
                "startDate": "2019-01",
                "endDate": "present",
                "achievements": ["Reduced build times by 60%", "Built the release pipeline"]
            }],
            "skills": ["Rust", "SQL"]
        })
    }

    #[tokio::test]
    async fn test_list_templates_returns_all_four() {
        let response = router()
            .oneshot(Request::get("/api/v1/templates").body(Body::empty()).unwrap())
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["default"], "professional");
        let names: Vec<&str> = payload["templates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["professional", "modern", "minimal", "creative"]);
    }

    #[tokio::test]
    async fn test_layout_returns_plan_for_requested_template() {
        let body = json!({
            "resume": sample_resume(),
            "template": "Modern",
            "colors": {"primary": "#000000"}
        });
        let response = router()
            .oneshot(post_json("/api/v1/layout", &body))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["template"], "modern");
        assert_eq!(payload["colors"]["primary"], "#000000");
        assert_eq!(payload["overflow"], false);
        let blocks = payload["blocks"].as_array().unwrap();
        assert_eq!(blocks[0]["kind"], "header");
        assert!(blocks[0]["content"].as_str().unwrap().starts_with("Ada Lovelace"));
        assert!(blocks.iter().any(|b| b["kind"] == "achievement"));
    }

    #[tokio::test]
    async fn test_layout_uses_default_template_and_accepts_string_record() {
        let body = json!({ "resume": sample_resume().to_string() });
        let response = router()
            .oneshot(post_json("/api/v1/layout", &body))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["template"], "professional");
        assert!(payload["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .any(|b| b["kind"] == "job_header"));
    }

    #[tokio::test]
    async fn test_unknown_template_is_validation_error() {
        let body = json!({ "resume": {}, "template": "glossy" });
        let response = router()
            .oneshot(post_json("/api/v1/layout", &body))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json_body(response).await;
        assert_eq!(payload["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_normalize_applies_title_fallback() {
        let body = json!({ "resume": {"summary": "Hello."}, "title": "Grace Hopper" });
        let response = router()
            .oneshot(post_json("/api/v1/normalize", &body))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["identity"]["full_name"], "Grace Hopper");
        assert_eq!(payload["summary"], "Hello.");
    }
}
