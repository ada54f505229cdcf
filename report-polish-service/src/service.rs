use std::any::Any;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware::{Next, from_fn},
    response::{IntoResponse, Json, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    config::DeepSeekConfig,
    error::{PolishError, Result},
    models::{ChatCompletionRequest, PolishRequest, PolishedReport, TEMPERATURE},
    prompt::build_messages,
    report::{ModelReply, extract_content, normalize},
    upstream::{CompletionApi, DeepSeekClient},
};

/// Request bodies larger than this are rejected as a server exception.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DeepSeekConfig>,
    pub completions: Arc<dyn CompletionApi>,
}

impl AppState {
    pub fn new(config: DeepSeekConfig, completions: Arc<dyn CompletionApi>) -> Self {
        Self {
            config: Arc::new(config),
            completions,
        }
    }
}

/// Router backed by the real DeepSeek client.
pub fn create_app(config: DeepSeekConfig) -> std::result::Result<Router, reqwest::Error> {
    let client = DeepSeekClient::new(&config)?;
    Ok(build_router(AppState::new(config, Arc::new(client))))
}

/// Every path is served by the same handler; the CORS headers go on every response,
/// including 405s and contained panics.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .layer(from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags each request with a fresh correlation id and runs it inside a matching span.
async fn correlation_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn handle_request(State(state): State<AppState>, method: Method, body: Body) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    if method != Method::POST {
        warn!(%method, "Rejecting unsupported method");
        return PolishError::MethodNotAllowed.into_response();
    }

    match polish_dictation(&state, body).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn polish_dictation(state: &AppState, body: Body) -> Result<PolishedReport> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES).await?;
    let request = PolishRequest::from_body(&bytes)?;

    let text = request.trimmed_text();
    if text.is_empty() {
        warn!("Rejecting request without text");
        return Err(PolishError::MissingText);
    }

    let api_key = state.config.api_key.as_deref().ok_or_else(|| {
        error!("DEEPSEEK_API_KEY is not configured");
        PolishError::MissingApiKey
    })?;

    info!(
        text_len = text.len(),
        has_template = !request.template.is_empty(),
        "Polishing dictation"
    );

    let completion = ChatCompletionRequest {
        model: state.config.model.clone(),
        messages: build_messages(&request, text),
        temperature: TEMPERATURE,
    };

    let response = state.completions.complete(api_key, &completion).await?;

    let content = extract_content(&response);
    let reply = ModelReply::parse(&content);
    if !reply.is_structured() {
        warn!(
            content_len = content.len(),
            "Model reply is not a JSON object, using it as findings"
        );
    }

    let report = normalize(reply, text);
    info!(
        findings_len = report.findings.len(),
        impression_len = report.impression.len(),
        "Report polished"
    );

    Ok(report)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    error!(%details, "Request handler panicked");
    PolishError::Exception(details).into_response()
}
