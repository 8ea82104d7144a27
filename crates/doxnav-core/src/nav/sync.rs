//! Cross-panel selection synchronization.
//!
//! The rendered site shows two sibling panels, a navigation-tree panel and
//! a content panel. Selection in one panel propagates to the other only
//! while synchronization is enabled, and only when the other panel has a
//! node with the same target link. The toggle lives for the session: one
//! `PanelSync` per session, never shared across sessions.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::models::SyncMessages;
use crate::nav::tree::NavNode;

// ---------------------------------------------------------------------------
// SyncMode
// ---------------------------------------------------------------------------

/// The two states of the synchronization toggle. Both are valid initial
/// states; there is no terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    Synchronized,
    Independent,
}

impl SyncMode {
    fn toggled(self) -> Self {
        match self {
            Self::Synchronized => Self::Independent,
            Self::Independent => Self::Synchronized,
        }
    }
}

// ---------------------------------------------------------------------------
// PanelSync
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PanelState {
    mode_independent: bool,
    tree_selection: Option<String>,
    content_selection: Option<String>,
}

/// Per-session selection state for the two panels.
///
/// The link sets are fixed at construction (the trees are immutable); only
/// the selections and the toggle mutate, behind one mutex with a single
/// expected writer.
#[derive(Debug)]
pub struct PanelSync {
    tree_links: HashSet<String>,
    content_links: HashSet<String>,
    state: Mutex<PanelState>,
}

impl PanelSync {
    /// New session state, synchronized by default (matching the shipped
    /// site, whose hint reads "click to disable panel synchronization").
    pub fn new(tree_links: HashSet<String>, content_links: HashSet<String>) -> Self {
        Self {
            tree_links,
            content_links,
            state: Mutex::new(PanelState::default()),
        }
    }

    /// Session state for two concrete panel trees.
    pub fn for_panels(tree: &NavNode, content: &NavNode) -> Self {
        Self::new(tree.links(), content.links())
    }

    pub fn with_mode(self, mode: SyncMode) -> Self {
        self.state.lock().mode_independent = mode == SyncMode::Independent;
        self
    }

    pub fn mode(&self) -> SyncMode {
        if self.state.lock().mode_independent {
            SyncMode::Independent
        } else {
            SyncMode::Synchronized
        }
    }

    /// Flip the toggle and return the new mode.
    pub fn toggle(&self) -> SyncMode {
        let mut state = self.state.lock();
        state.mode_independent = !state.mode_independent;
        if state.mode_independent {
            SyncMode::Independent
        } else {
            SyncMode::Synchronized
        }
    }

    /// Select a node in the tree panel. Propagates to the content panel
    /// only when synchronized and the content panel has the same link.
    pub fn select_in_tree(&self, link: &str) {
        let mut state = self.state.lock();
        state.tree_selection = Some(link.to_string());
        if !state.mode_independent && self.content_links.contains(link) {
            state.content_selection = Some(link.to_string());
        }
    }

    /// Select a node in the content panel; mirror of
    /// [`select_in_tree`](Self::select_in_tree).
    pub fn select_in_content(&self, link: &str) {
        let mut state = self.state.lock();
        state.content_selection = Some(link.to_string());
        if !state.mode_independent && self.tree_links.contains(link) {
            state.tree_selection = Some(link.to_string());
        }
    }

    pub fn tree_selection(&self) -> Option<String> {
        self.state.lock().tree_selection.clone()
    }

    pub fn content_selection(&self) -> Option<String> {
        self.state.lock().content_selection.clone()
    }

    /// The toggle-affordance hint for the current mode.
    pub fn hint<'a>(&self, messages: &'a SyncMessages) -> &'a str {
        match self.mode() {
            SyncMode::Synchronized => &messages.enabled_hint,
            SyncMode::Independent => &messages.disabled_hint,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
