//! Red-category matching: pure functions over a catalog snapshot.

pub mod engine;
pub mod export;
pub mod selection;

pub use engine::{Evaluation, MatchResult, MatchState, evaluate};
pub use export::ExportRow;
pub use selection::{Selection, SelectionError, SelectionGroup};
