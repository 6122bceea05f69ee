// Selection state for the photo grid
// Handles single/multi select and when a completion is reported to the host

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::models::PhotoId;

/// Per-photo selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    Selected,
}

/// How the grid reacts to clicks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Ignore clicks entirely when false
    pub allow_selection: bool,
    /// Multi-select instead of single-select
    pub multiple: bool,
    /// Report a completion on every change instead of waiting for `confirm`
    pub confirm_immediately: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            allow_selection: false,
            multiple: false,
            confirm_immediately: true,
        }
    }
}

/// Result handed to the host when a selection is completed.
///
/// The variant is fixed by the selection mode, not by how many photos are
/// selected: single mode always yields `Single`, even with nothing selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Single(Option<PhotoId>),
    Multiple(Vec<PhotoId>),
}

impl Completion {
    pub fn ids(&self) -> Vec<PhotoId> {
        match self {
            Completion::Single(id) => id.iter().copied().collect(),
            Completion::Multiple(ids) => ids.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Completion::Single(id) => id.is_none(),
            Completion::Multiple(ids) => ids.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionModel {
    config: SelectionConfig,
    /// Selected ids in the order they were selected.
    selected: Vec<PhotoId>,
    /// Ids in the order the grid currently displays them.
    display_order: Vec<PhotoId>,
    /// Set once a layout pass has reported its display order.
    laid_out: bool,
}

impl SelectionModel {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            selected: Vec::new(),
            display_order: Vec::new(),
            laid_out: false,
        }
    }

    /// Seeds the selection, e.g. with ids restored from preferences.
    ///
    /// Single mode keeps only the first id. Seeded ids that never appear in a
    /// layout are left out of completions.
    pub fn with_initial<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = PhotoId>,
    {
        for id in ids {
            if !self.config.multiple && !self.selected.is_empty() {
                break;
            }
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn state(&self, id: PhotoId) -> SelectionState {
        if self.selected.contains(&id) {
            SelectionState::Selected
        } else {
            SelectionState::Unselected
        }
    }

    /// Currently selected ids as a set, for ordering and persistence.
    pub fn selected_ids(&self) -> HashSet<PhotoId> {
        self.selected.iter().copied().collect()
    }

    /// Records the display order produced by the latest layout pass.
    pub fn sync_display_order<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = PhotoId>,
    {
        self.display_order = ids.into_iter().collect();
        self.laid_out = true;
        trace!(count = self.display_order.len(), "Synced selection display order");
    }

    /// Selects `id`. Single mode clears every other selection first.
    ///
    /// Returns a completion when selection is enabled and confirms immediately.
    /// Once a layout has run, ids that are not displayed are ignored.
    pub fn select_one(&mut self, id: PhotoId) -> Option<Completion> {
        if !self.config.allow_selection {
            return None;
        }
        if self.laid_out && !self.display_order.contains(&id) {
            debug!(%id, "Ignoring selection of photo not on display");
            return None;
        }

        if !self.config.multiple {
            self.selected.clear();
        }
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
        debug!(%id, selected = self.selected.len(), "Selected photo");

        self.completion_if_immediate()
    }

    /// Deselects `id`.
    ///
    /// Returns a completion when selection is enabled and confirms immediately,
    /// which in single mode is an empty `Single(None)`.
    pub fn deselect_one(&mut self, id: PhotoId) -> Option<Completion> {
        if !self.config.allow_selection {
            return None;
        }

        self.selected.retain(|selected| *selected != id);
        debug!(%id, selected = self.selected.len(), "Deselected photo");

        self.completion_if_immediate()
    }

    /// Gathers every selected photo across all rows into a completion.
    pub fn confirm(&self) -> Completion {
        let ordered = self.selected_in_order();
        if self.config.multiple {
            Completion::Multiple(ordered)
        } else {
            Completion::Single(ordered.first().copied())
        }
    }

    fn completion_if_immediate(&self) -> Option<Completion> {
        self.config.confirm_immediately.then(|| self.confirm())
    }

    /// Selected ids that are on display, in display order.
    pub fn selected_in_order(&self) -> Vec<PhotoId> {
        let selected: HashSet<PhotoId> = self.selected_ids();
        self.display_order
            .iter()
            .filter(|id| selected.contains(id))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_immediate() -> SelectionModel {
        SelectionModel::new(SelectionConfig {
            allow_selection: true,
            multiple: false,
            confirm_immediately: true,
        })
    }

    fn multi(confirm_immediately: bool) -> SelectionModel {
        SelectionModel::new(SelectionConfig {
            allow_selection: true,
            multiple: true,
            confirm_immediately,
        })
    }

    #[test]
    fn test_selection_disabled_ignores_clicks() {
        let mut model = SelectionModel::new(SelectionConfig::default());
        assert_eq!(model.select_one(PhotoId(1)), None);
        assert_eq!(model.deselect_one(PhotoId(1)), None);
        assert_eq!(model.state(PhotoId(1)), SelectionState::Unselected);
    }

    #[test]
    fn test_single_select_emits_only_latest() {
        let mut model = single_immediate();
        model.sync_display_order([PhotoId(1), PhotoId(2), PhotoId(3)]);

        assert_eq!(
            model.select_one(PhotoId(1)),
            Some(Completion::Single(Some(PhotoId(1))))
        );
        assert_eq!(
            model.select_one(PhotoId(3)),
            Some(Completion::Single(Some(PhotoId(3))))
        );
        assert_eq!(model.state(PhotoId(1)), SelectionState::Unselected);
        assert_eq!(model.state(PhotoId(3)), SelectionState::Selected);
    }

    #[test]
    fn test_single_select_clears_initial_selection() {
        let mut model = single_immediate().with_initial([PhotoId(5), PhotoId(6)]);
        assert_eq!(model.selected_ids().len(), 1);
        model.sync_display_order([PhotoId(5), PhotoId(6), PhotoId(7)]);

        let completion = model.select_one(PhotoId(7));
        assert_eq!(completion, Some(Completion::Single(Some(PhotoId(7)))));
        assert_eq!(model.state(PhotoId(5)), SelectionState::Unselected);
    }

    #[test]
    fn test_single_deselect_emits_empty_completion() {
        let mut model = single_immediate();
        model.select_one(PhotoId(4));

        let completion = model.deselect_one(PhotoId(4)).unwrap();
        assert_eq!(completion, Completion::Single(None));
        assert!(completion.is_empty());
    }

    #[test]
    fn test_multi_select_keeps_others() {
        let mut model = multi(true);
        model.sync_display_order([PhotoId(9), PhotoId(8), PhotoId(7)]);

        model.select_one(PhotoId(7));
        let completion = model.select_one(PhotoId(9)).unwrap();
        assert_eq!(completion, Completion::Multiple(vec![PhotoId(9), PhotoId(7)]));

        let completion = model.deselect_one(PhotoId(9)).unwrap();
        assert_eq!(completion, Completion::Multiple(vec![PhotoId(7)]));
    }

    #[test]
    fn test_explicit_confirm_waits() {
        let mut model = multi(false);
        model.sync_display_order([PhotoId(1), PhotoId(2), PhotoId(3)]);

        assert_eq!(model.select_one(PhotoId(3)), None);
        assert_eq!(model.select_one(PhotoId(1)), None);
        assert_eq!(
            model.confirm(),
            Completion::Multiple(vec![PhotoId(1), PhotoId(3)])
        );
    }

    #[test]
    fn test_confirm_excludes_ids_not_on_display() {
        let mut model = multi(false).with_initial([PhotoId(42)]);
        model.sync_display_order([PhotoId(2), PhotoId(1)]);
        model.select_one(PhotoId(2));

        assert_eq!(model.confirm(), Completion::Multiple(vec![PhotoId(2)]));
        assert!(model.selected_in_order().iter().all(|id| *id != PhotoId(42)));
    }

    #[test]
    fn test_unknown_id_ignored_after_layout() {
        let mut model = single_immediate();
        model.sync_display_order([PhotoId(1)]);
        model.select_one(PhotoId(1));

        assert_eq!(model.select_one(PhotoId(99)), None);
        assert_eq!(model.state(PhotoId(99)), SelectionState::Unselected);
        assert_eq!(model.confirm(), Completion::Single(Some(PhotoId(1))));
    }

    #[test]
    fn test_duplicate_select_is_idempotent() {
        let mut model = multi(false);
        model.sync_display_order([PhotoId(1), PhotoId(2)]);
        model.select_one(PhotoId(1));
        model.select_one(PhotoId(1));
        assert_eq!(model.confirm().ids(), vec![PhotoId(1)]);
    }
}
