//! Server module: application state, token gate, router and builder

pub mod builder;
pub mod gate;
pub mod router;
pub mod state;

pub use builder::{ServerBuilder, ServerError};
pub use gate::{Gate, require_token};
pub use router::{SERVICE_NAME, build_router, health_routes};
pub use state::AppState;
