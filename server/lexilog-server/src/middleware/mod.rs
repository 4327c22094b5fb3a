//! Request middleware: authentication extractors and the CORS layer.

mod auth_context;

pub use auth_context::{AuthContext, RefreshContext};

use tower_http::cors::{Any, CorsLayer};

pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
