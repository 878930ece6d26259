//! Source generation for a dependency-injection runtime.
//!
//! - [`types`], [`value`] and [`model`]: the declaration model of Java-like source.
//! - [`builder`]: validated construction of that model.
//! - [`render`]: deterministic source text with resolved imports.
//! - [`pipeline`]: discovery of annotated elements and dispatch to generators.
//! - [`di`]: the bean recipe and enum qualifier generators.
//! - [`manifest`]: a JSON host feeding the pipeline.
pub mod builder;
pub mod cli;
pub mod config;
pub mod di;
pub mod error;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod types;
pub mod value;

use std::sync::Once;

pub use error::{DefinitionError, LoadError, ProcessingError};

static TRACING_INIT: Once = Once::new();

/// Initialize logging to stderr.
///
/// Safe to call multiple times. Defaults to `tendril=info`; override with
/// `RUST_LOG`, e.g. `RUST_LOG=tendril=debug` to follow pipeline stages.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tendril=info"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
            .with(filter)
            .init();
    });
}
