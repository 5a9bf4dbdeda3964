// src/routes/cors.rs
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        HeaderValue, Method, StatusCode,
        header::{ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    },
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AllowedOrigins;

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        // Entries were checked as header values when the config was parsed.
        AllowedOrigins::List(list) => {
            AllowOrigin::list(list.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// `CorsLayer` answers every preflight with 200 and just omits the allow
/// header for strangers. This turns those into an explicit 403.
pub async fn reject_unlisted_preflight(
    State(origins): State<Arc<AllowedOrigins>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let is_preflight =
        req.method() == Method::OPTIONS && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD);

    if is_preflight
        && let Some(origin) = req.headers().get(ORIGIN)
        && !origin.to_str().is_ok_and(|o| origins.permits(o))
    {
        tracing::warn!(origin = ?origin, "rejected CORS preflight from unlisted origin");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}
