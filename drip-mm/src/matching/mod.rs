//! Outfit compatibility matching engine
//!
//! Three pieces:
//! - `selection` - which garment and target category are active (pure state)
//! - `orchestrator` - concurrent compatibility fan-out, result commit
//! - `ranker` - score aggregation, filtering, ordering (pure)

pub mod orchestrator;
pub mod ranker;
pub mod selection;

pub use orchestrator::{MatchEngine, MatchPhase};
pub use ranker::MatchResult;
pub use selection::Selection;

use serde::{Deserialize, Serialize};

/// Which selection policy a match invocation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Rank all candidates within one target category
    Category,
    /// Pick the single best candidate from every other category
    Outfit,
}
