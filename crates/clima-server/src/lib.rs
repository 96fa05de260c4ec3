//! HTTP surface of the clima gateway: one prediction route merging the
//! short-term forecast with the ML next-month prediction.

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
