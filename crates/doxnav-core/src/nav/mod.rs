//! Navigation tree and cross-panel synchronization.

pub mod sync;
pub mod tree;

pub use sync::{PanelSync, SyncMode};
pub use tree::{Find, NavNode};
