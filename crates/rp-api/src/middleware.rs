//! repute/crates/rp-api/src/middleware.rs Middleware
//!
//! Request logging and CORS for the repute API.

use actix_cors::Cors;
use actix_web::middleware::Logger;

/// Access log line per request, emitted through the `log` facade and picked up by tracing.
pub fn standard_middleware() -> Logger {
    Logger::new(r#"%a "%r" %s %b %Dms"#)
}

/// The dashboard front end is served from a different origin.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .max_age(3600)
}
