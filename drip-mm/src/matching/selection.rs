//! Anchor and target-category selection state
//!
//! Pure state with no I/O: which garment is the current anchor for
//! matching, and which category a category-scoped match should target.
//! Clearing stale match results is the orchestrator's job, not this
//! module's; selecting a new anchor only replaces the anchor here.

use drip_common::api::types::Garment;
use uuid::Uuid;

/// Current anchor garment and optional target category.
///
/// Two states: idle (no anchor) and anchored (anchor set, target category
/// optional). Re-selecting a different anchor while anchored is legal at
/// any time.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    anchor: Option<Garment>,
    target_category: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the anchor garment.
    pub fn select_item(&mut self, garment: Garment) {
        self.anchor = Some(garment);
    }

    /// Set the target category for a category-scoped match.
    pub fn select_category(&mut self, category: impl Into<String>) {
        self.target_category = Some(category.into());
    }

    /// Back to idle: no anchor, no target category.
    pub fn clear(&mut self) {
        self.anchor = None;
        self.target_category = None;
    }

    pub fn anchor(&self) -> Option<&Garment> {
        self.anchor.as_ref()
    }

    pub fn target_category(&self) -> Option<&str> {
        self.target_category.as_deref()
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    /// Whether the given garment is the current anchor. Pure predicate
    /// for highlighting; no side effects.
    pub fn is_item_selected(&self, id: Uuid) -> bool {
        self.anchor.as_ref().map(|g| g.id) == Some(id)
    }

    /// Whether the given category is the current target. Pure predicate
    /// for highlighting; no side effects.
    pub fn is_category_selected(&self, category: &str) -> bool {
        self.target_category.as_deref() == Some(category)
    }
}
