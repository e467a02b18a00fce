pub mod guards;
pub mod router;
pub mod routes;

pub use router::{AppState, app_router};
