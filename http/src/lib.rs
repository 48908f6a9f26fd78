//! HTTP surface of the exporter: `/metrics` in the Prometheus text format and `/health`.

pub mod error;
pub mod router;

pub use router::{
    create_router,
    AppState,
};
