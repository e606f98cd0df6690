//! Session-driven navigation: tree selection, the live tree, and header actions.

mod header;
mod tree;

pub use header::{resolve, HeaderAction, JOURNAL_ID_PARAM};
pub use tree::{
    compose, screens, select_tree, LiveTree, RegionId, Screen, ScreenContext, ScreenSpec,
    StackSpec, TabEntry, TabSpec, TreeDescription, TreeKind, AUTHENTICATED_TREE,
    UNAUTHENTICATED_TREE,
};

use log::{debug, info};
use thiserror::Error;

/// Parameters attached to a stack entry when it is pushed.
pub type RouteParams = serde_json::Map<String, serde_json::Value>;

pub fn route_params(value: serde_json::Value) -> Option<RouteParams> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("no screen named `{0}` in the active navigation tree")]
    UnknownRoute(String),
    #[error("no tab region named `{0}` in the active navigation tree")]
    UnknownRegion(String),
}

/// Holds the live tree of whichever navigation tree the session selects.
#[derive(Clone, Debug)]
pub struct Navigator {
    tree: LiveTree,
}

impl Navigator {
    pub fn new(session_active: bool) -> Self {
        Self {
            tree: compose(select_tree(session_active)),
        }
    }

    /// Rebuilds the live tree when the session selects the other tree.
    /// In-stack history is dropped on every rebuild.
    pub fn sync_session(&mut self, session_active: bool) -> bool {
        let description = select_tree(session_active);
        if description.kind() == self.tree.kind() {
            return false;
        }
        self.tree = compose(description);
        info!(
            "event=tree_rebuild module=navigation status=ok tree={:?}",
            self.tree.kind()
        );
        true
    }

    pub fn tree(&self) -> &LiveTree {
        &self.tree
    }

    pub fn kind(&self) -> TreeKind {
        self.tree.kind()
    }

    pub fn focused(&self) -> ScreenContext {
        self.tree.focused()
    }

    pub fn header_actions(&self) -> Vec<HeaderAction> {
        let ctx = self.tree.focused();
        resolve(ctx.region, ctx.screen, ctx.params.as_ref())
    }

    pub fn navigate(&mut self, name: &str, params: Option<RouteParams>) -> Result<(), NavError> {
        self.tree.navigate(name, params)?;
        debug!(
            "event=navigate module=navigation status=ok screen={}",
            self.tree.focused().screen
        );
        Ok(())
    }

    pub fn push(&mut self, name: &str, params: Option<RouteParams>) -> Result<(), NavError> {
        self.tree.push(name, params)
    }

    pub fn go_back(&mut self) -> bool {
        self.tree.go_back()
    }

    pub fn focus_tab(&mut self, region: RegionId) -> Result<(), NavError> {
        self.tree.focus_tab(region)
    }

    pub fn pop_entry(&mut self, key: u64) -> bool {
        self.tree.pop_entry(key)
    }
}
