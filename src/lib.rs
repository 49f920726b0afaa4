//! Scientific calculator core: expression evaluation, function sampling for
//! graphs, calculator session state and the AI analysis client.

pub mod ai;
pub mod calc_engine;
pub mod config;
pub mod logging;
pub mod sampler;
pub mod session;

pub use calc_engine::{evaluate, evaluate_value, CalcError, EvaluationResult};
pub use sampler::{sample_points, PlotPoint};
pub use session::{HistoryEntry, Session, SessionMode};
