pub mod api;

pub use api::{build_router, create_api_routes};
