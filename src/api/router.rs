use std::time::Duration;

use axum::{
    body::Body,
    http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    http::{HeaderName, Method, Request, Response},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::api::{handlers, submissions, taking};
use crate::core::{config::Settings, state::AppState};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub(crate) fn router(state: AppState) -> Router {
    let settings = state.settings();
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let mut app: Router<AppState> = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz).head(handlers::healthz))
        .nest(&settings.api().api_v1_str, api_v1());

    if settings.telemetry().prometheus_enabled {
        app = app.route("/metrics", get(handlers::metrics));
    }

    let app = app
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(request_span).on_response(record_response))
        .layer(cors_layer(settings));

    app.with_state(state)
}

fn api_v1() -> Router<AppState> {
    Router::new().nest("/exams", taking::router()).nest("/submissions", submissions::router())
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id
    )
}

fn record_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status().as_u16().to_string();
    metrics::counter!("http_requests_total", "status" => status.clone()).increment(1);
    metrics::histogram!("http_request_duration_seconds", "status" => status)
        .record(latency.as_secs_f64());
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors()
        .origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::HEAD, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            ORIGIN,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        // Credentials cannot be combined with a wildcard origin.
        layer.allow_origin(Any)
    } else {
        layer.allow_credentials(true).allow_origin(AllowOrigin::list(origins))
    }
}
