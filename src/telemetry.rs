//! ioseq telemetry modules.

pub mod tracing {
    //! Tracing core re-export and utilities, for your convenience

    pub use ::ioseq_core::telemetry::tracing::*;

    pub use ::tracing_subscriber as subscriber;
}
