//! doxnav core library — an in-memory model of a Doxygen-generated
//! documentation index.
//!
//! The generated site ships its navigation data as JavaScript index
//! scripts: the annotated class listing, the inheritance listing, the
//! navigation tree with its alphabetical shard boundaries, and one member
//! listing per namespace. This crate loads those scripts into a typed,
//! immutable model:
//!
//! - [`catalog::EntityCatalog`] — flat table of documented entities keyed
//!   by qualified name, plus the containment tree.
//! - [`hierarchy::HierarchyGraph`] — inheritance and template
//!   specialization edges, with breadth-first ancestor traversal and an
//!   inheritance-cycle integrity check.
//! - [`nav::NavNode`] — the sitemap tree, with order-preserving search and
//!   per-session cross-panel selection sync ([`nav::PanelSync`]).
//! - [`shards::ShardTable`] — binary-search routing of lookup keys to
//!   alphabetical listing pages.
//!
//! [`ingest::DocIndex::load_dir`] is the front door: one blocking scan of
//! a documentation root, fail-fast parsing, and an index that is immutable
//! thereafter and safe to share across readers.

pub mod catalog;
pub mod errors;
pub mod hierarchy;
pub mod ingest;
pub mod models;
pub mod nav;
pub mod shards;

pub use catalog::EntityCatalog;
pub use errors::{IndexError, IndexResult};
pub use hierarchy::{Ancestors, Edge, HierarchyGraph};
pub use ingest::DocIndex;
pub use models::{EdgeKind, Entity, EntityId, EntityKind, NavEntry, QualifiedName, SyncMessages};
pub use nav::{NavNode, PanelSync, SyncMode};
pub use shards::ShardTable;
