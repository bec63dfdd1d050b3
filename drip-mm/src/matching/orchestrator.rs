//! Match orchestration
//!
//! Translates a match request into a batch of concurrent compatibility
//! lookups, joins on the full batch, and commits the ranked outcome.
//!
//! # Concurrency
//! One batch per invocation: every candidate is scored concurrently
//! (`join_all`), and nothing is published until the whole batch has
//! settled. The only suspension points are the scoring round-trips.
//!
//! # Failure isolation
//! A single scoring call failing or timing out substitutes a neutral
//! fallback score for that candidate instead of aborting the batch.
//!
//! # Staleness
//! Invocations carry a ticket from a monotonically increasing counter.
//! Selecting a new anchor, clearing, or starting a newer batch advances
//! the counter; a batch whose ticket is no longer current is discarded at
//! commit time instead of overwriting newer results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use drip_common::api::types::Garment;
use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ranker::{self, MatchResult, FALLBACK_SCORE};
use super::selection::Selection;
use super::MatchMode;

/// Orchestrator activity tag, exposed for UI feedback only. Reset when a
/// batch commits or the engine is cleared; carries no correctness
/// obligation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPhase {
    Idle,
    /// Category match in flight, with the target category
    Category(String),
    /// Full-outfit match in flight
    Outfit,
}

impl MatchPhase {
    pub fn is_matching(&self) -> bool {
        *self != MatchPhase::Idle
    }

    pub fn mode(&self) -> Option<MatchMode> {
        match self {
            MatchPhase::Idle => None,
            MatchPhase::Category(_) => Some(MatchMode::Category),
            MatchPhase::Outfit => Some(MatchMode::Outfit),
        }
    }
}

/// State mutated only under the lock: selection, the published result
/// set, and the in-flight phase tag. Never held across an await.
struct Shared {
    selection: Selection,
    phase: MatchPhase,
    /// Ticket of the batch that set the current phase
    phase_ticket: u64,
    results: Vec<MatchResult>,
}

/// The matching engine: selection state, concurrent orchestration, and
/// the committed result set.
///
/// Collaborators are injected, so the engine is independently testable
/// with synthetic scorers.
pub struct MatchEngine {
    scorer: Arc<dyn crate::scoring::CompatibilityScorer>,
    per_call_timeout: Duration,
    shared: Mutex<Shared>,
    invocation: AtomicU64,
}

impl MatchEngine {
    pub fn new(
        scorer: Arc<dyn crate::scoring::CompatibilityScorer>,
        per_call_timeout: Duration,
    ) -> Self {
        Self {
            scorer,
            per_call_timeout,
            shared: Mutex::new(Shared {
                selection: Selection::new(),
                phase: MatchPhase::Idle,
                phase_ticket: 0,
                results: Vec::new(),
            }),
            invocation: AtomicU64::new(0),
        }
    }

    // ------------------------------------------------------------------
    // Selection state
    // ------------------------------------------------------------------

    /// Replace the anchor garment. Outstanding batches become stale:
    /// their results are discarded at commit time.
    pub fn select_item(&self, garment: Garment) {
        let mut shared = self.shared.lock().unwrap();
        shared.selection.select_item(garment);
        self.invocation.fetch_add(1, Ordering::SeqCst);
    }

    /// Set the target category for a category-scoped match.
    pub fn select_category(&self, category: &str) {
        let mut shared = self.shared.lock().unwrap();
        shared.selection.select_category(category);
    }

    /// Clear selection, phase, and published results. Outstanding
    /// batches become stale.
    pub fn clear(&self) {
        let mut shared = self.shared.lock().unwrap();
        shared.selection.clear();
        shared.phase = MatchPhase::Idle;
        shared.results.clear();
        self.invocation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn anchor(&self) -> Option<Garment> {
        self.shared.lock().unwrap().selection.anchor().cloned()
    }

    pub fn is_item_selected(&self, id: Uuid) -> bool {
        self.shared.lock().unwrap().selection.is_item_selected(id)
    }

    pub fn is_category_selected(&self, category: &str) -> bool {
        self.shared
            .lock()
            .unwrap()
            .selection
            .is_category_selected(category)
    }

    // ------------------------------------------------------------------
    // Published state
    // ------------------------------------------------------------------

    /// Snapshot of the most recently committed result set.
    pub fn results(&self) -> Vec<MatchResult> {
        self.shared.lock().unwrap().results.clone()
    }

    pub fn phase(&self) -> MatchPhase {
        self.shared.lock().unwrap().phase.clone()
    }

    pub fn is_matching(&self) -> bool {
        self.phase().is_matching()
    }

    // ------------------------------------------------------------------
    // Match operations
    // ------------------------------------------------------------------

    /// Rank every candidate in `target_category` against the anchor.
    ///
    /// An empty candidate set completes immediately with an empty result
    /// list; it is not an error. The returned list is this batch's own
    /// ranking; it is published to [`results`](Self::results) only if no
    /// newer selection or invocation superseded the batch while it was
    /// in flight.
    pub async fn match_by_category(
        &self,
        anchor: &Garment,
        target_category: &str,
        all_garments: &[Garment],
    ) -> Vec<MatchResult> {
        let ticket = self.begin(MatchPhase::Category(target_category.to_string()));

        let candidates: Vec<&Garment> = all_garments
            .iter()
            .filter(|g| g.category == target_category && g.id != anchor.id)
            .collect();

        if candidates.is_empty() {
            debug!(target_category, "no candidates in target category");
            self.commit(ticket, Vec::new());
            return Vec::new();
        }

        let scored = self.score_batch(anchor.id, &candidates).await;
        let ranked = ranker::rank(MatchMode::Category, scored);
        self.commit(ticket, ranked.clone());
        ranked
    }

    /// Assemble a full outfit: the single best candidate from every
    /// category other than the anchor's own.
    ///
    /// Categories are scored concurrently with each other and internally
    /// (two-level fan-out); each non-empty category contributes exactly
    /// one result. Ties within a category go to the first-seen garment.
    pub async fn match_full_outfit(
        &self,
        anchor: &Garment,
        all_garments: &[Garment],
    ) -> Vec<MatchResult> {
        let ticket = self.begin(MatchPhase::Outfit);

        // Distinct categories in first-seen order, minus the anchor's own
        let mut categories: Vec<&str> = Vec::new();
        for garment in all_garments {
            if garment.category != anchor.category
                && !categories.contains(&garment.category.as_str())
            {
                categories.push(&garment.category);
            }
        }

        let per_category = categories.iter().map(|category| {
            let candidates: Vec<&Garment> = all_garments
                .iter()
                .filter(|g| g.category == *category)
                .collect();
            async move {
                let scored = self.score_batch(anchor.id, &candidates).await;
                // Highest score wins; strict comparison keeps the
                // first-seen garment on ties
                scored
                    .into_iter()
                    .reduce(|best, next| if next.1 > best.1 { next } else { best })
            }
        });

        let winners: Vec<(Garment, f64)> = join_all(per_category)
            .await
            .into_iter()
            .flatten()
            .collect();

        let ranked = ranker::rank(MatchMode::Outfit, winners);
        self.commit(ticket, ranked.clone());
        ranked
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Score one batch of candidates concurrently. A failed or timed-out
    /// lookup yields the neutral fallback score for that candidate.
    async fn score_batch(&self, anchor_id: Uuid, candidates: &[&Garment]) -> Vec<(Garment, f64)> {
        let lookups = candidates.iter().map(|garment| {
            let scorer = Arc::clone(&self.scorer);
            let garment = (*garment).clone();
            let per_call_timeout = self.per_call_timeout;
            async move {
                let score =
                    match tokio::time::timeout(per_call_timeout, scorer.score(anchor_id, garment.id))
                        .await
                    {
                        Ok(Ok(score)) => score.clamp(0.0, 1.0),
                        Ok(Err(e)) => {
                            warn!(
                                candidate = %garment.id,
                                error = %e,
                                "compatibility lookup failed, substituting neutral score"
                            );
                            FALLBACK_SCORE
                        }
                        Err(_) => {
                            warn!(
                                candidate = %garment.id,
                                "compatibility lookup timed out, substituting neutral score"
                            );
                            FALLBACK_SCORE
                        }
                    };
                (garment, score)
            }
        });

        join_all(lookups).await
    }

    /// Start a new invocation: clear stale results, set the phase tag,
    /// and hand out this batch's ticket.
    fn begin(&self, phase: MatchPhase) -> u64 {
        let mut shared = self.shared.lock().unwrap();
        let ticket = self.invocation.fetch_add(1, Ordering::SeqCst) + 1;
        shared.results.clear();
        shared.phase = phase;
        shared.phase_ticket = ticket;
        ticket
    }

    /// Publish a batch's ranking if the batch is still current.
    ///
    /// A superseded batch clears its own phase tag (if nothing newer
    /// replaced it) and is otherwise dropped without touching the
    /// published results.
    fn commit(&self, ticket: u64, results: Vec<MatchResult>) -> bool {
        let mut shared = self.shared.lock().unwrap();

        if self.invocation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "stale match batch discarded");
            if shared.phase_ticket == ticket {
                shared.phase = MatchPhase::Idle;
            }
            return false;
        }

        shared.results = results;
        shared.phase = MatchPhase::Idle;
        true
    }
}
