pub mod app;
pub mod config;
pub mod error;
pub mod mapper;
pub mod model;
pub mod page;
pub mod pipeline;
pub mod schema;
pub mod trigger;

pub use error::PredictError;
pub use model::{CancellationScorer, ModelHandle};
