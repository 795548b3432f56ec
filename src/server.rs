use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::codec::{ImageCodec, RasterCodec};
use crate::config::ServerConfig;
use crate::convert::convert_to_base64;
use crate::error::ConvertError;
use crate::validate::{require_file, require_format};
use crate::{upload, ALLOWED_HEADERS, ALLOWED_METHODS, ALLOWED_ORIGIN, JSON_BODY_LIMIT};

pub const PROCESS_IMAGE_PATH: &str = "/process-image";

/// Hardening headers set on every response.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';\
         frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';\
         script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<dyn ImageCodec>,
    pub max_upload_bytes: u64,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            codec: Arc::new(RasterCodec),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PROCESS_IMAGE_PATH, post(process_image).options(preflight))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(fixed_headers))
                .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT)),
        )
        .with_state(state)
}

/// Binds the listener and serves until the process ends.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let app = router(AppState::new(&config));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(max_upload_bytes = config.max_upload_bytes, "Serwer: http://localhost:{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn process_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<String, ConvertError> {
    let span = tracing::info_span!("process_image", request_id = %Uuid::new_v4());

    async move {
        let form = upload::receive(&headers, body, state.max_upload_bytes).await?;
        let file = require_file(form.image)?;
        let format = require_format(form.format.as_deref())?;

        tracing::info!(
            format = %format,
            content_type = %file.content_type,
            size = file.bytes.len(),
            "converting image"
        );

        convert_to_base64(state.codec, file.bytes, format).await
    }
    .instrument(span)
    .await
}

async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, "POST")])
}

async fn fixed_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for &(name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOWED_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );

    response
}
