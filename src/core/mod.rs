//! Core application primitives (cycle runner, its dependencies, endpoint)

pub mod context;
pub mod http;
pub mod runtime;
pub mod scheduler;

pub use context::MonitorContext;
pub use runtime::{CycleReport, CycleState, MonitorRuntime, RowOutcome};
pub use scheduler::{Sleeper, TokioSleeper};
