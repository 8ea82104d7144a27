//! Inheritance/specialization graph over catalog entities.
//!
//! The hierarchy listing nests each entity's *derived* entities beneath it,
//! so edges run child row -> parent row with kind `Inherits`. Rows whose
//! name carries a template-argument tuple stand for instantiations of a
//! primary template; they become distinct entities (keyed by the full
//! tuple, sharing the primary's documentation page) connected to the
//! primary by a `Specializes` edge, which keeps the inheritance subgraph
//! genuinely acyclic.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::catalog::EntityCatalog;
use crate::errors::{IndexError, IndexResult};
use crate::models::{EdgeKind, EntityId, EntityKind, NavEntry, QualifiedName};

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// A directed relation between two catalog entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: EntityId,
    pub target: EntityId,
    pub kind: EdgeKind,
}

// ---------------------------------------------------------------------------
// HierarchyGraph
// ---------------------------------------------------------------------------

/// Owns all hierarchy edges; entities hold no edge state of their own.
#[derive(Debug, Default)]
pub struct HierarchyGraph {
    edges: Vec<Edge>,
    outgoing: HashMap<EntityId, Vec<(EntityId, EdgeKind)>>,
}

impl HierarchyGraph {
    /// Build the graph from a decoded hierarchy listing, registering the
    /// listing's template-instantiation rows (and any entity the annotated
    /// listing did not carry) into the catalog first.
    pub fn load(catalog: &mut EntityCatalog, entries: &[NavEntry]) -> IndexResult<Self> {
        let mut graph = Self::default();
        for entry in entries {
            graph.load_row(catalog, entry, None)?;
        }
        debug!(edges = graph.edges.len(), "hierarchy loaded");
        Ok(graph)
    }

    fn load_row(
        &mut self,
        catalog: &mut EntityCatalog,
        entry: &NavEntry,
        base: Option<&QualifiedName>,
    ) -> IndexResult<()> {
        let name = register_row(catalog, entry)?;
        if name.is_templated() {
            let primary = name.without_args();
            self.add_edge(catalog, &name, &primary, EdgeKind::Specializes)?;
        }
        if let Some(base) = base {
            self.add_edge(catalog, &name, base, EdgeKind::Inherits)?;
        }
        for child in &entry.children {
            self.load_row(catalog, child, Some(&name))?;
        }
        Ok(())
    }

    /// Add one edge. Both endpoints must already exist in the catalog.
    pub fn add_edge(
        &mut self,
        catalog: &EntityCatalog,
        source: &QualifiedName,
        target: &QualifiedName,
        kind: EdgeKind,
    ) -> IndexResult<()> {
        let source_id = catalog
            .resolve_id(source)
            .map_err(|_| IndexError::DanglingReference(source.clone()))?;
        let target_id = catalog
            .resolve_id(target)
            .map_err(|_| IndexError::DanglingReference(target.clone()))?;
        self.edges.push(Edge {
            source: source_id,
            target: target_id,
            kind,
        });
        self.outgoing
            .entry(source_id)
            .or_default()
            .push((target_id, kind));
        Ok(())
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Direct bases of `id`, in listing order.
    pub fn bases_of(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .filter(|(_, kind)| *kind == EdgeKind::Inherits)
            .map(|(target, _)| *target)
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// Lazy breadth-first traversal of all transitive bases of `start`.
    ///
    /// Each ancestor is yielded at most once even under diamond-shaped
    /// multiple inheritance; `Specializes` edges are not followed. The
    /// iterator is finite even on malformed (cyclic) data, and calling the
    /// method again restarts the walk.
    pub fn ancestors_of(&self, start: EntityId) -> Ancestors<'_> {
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut queue = VecDeque::new();
        for base in self.bases_of(start) {
            if visited.insert(base) {
                queue.push_back(base);
            }
        }
        Ancestors {
            graph: self,
            queue,
            visited,
        }
    }

    // -----------------------------------------------------------------------
    // Integrity
    // -----------------------------------------------------------------------

    /// Every entity lying on an `Inherits` cycle, in ascending id order.
    ///
    /// A non-empty result denotes a malformed source model; the load
    /// pipeline turns it into [`IndexError::CycleDetected`].
    pub fn detect_cycles(&self) -> Vec<EntityId> {
        let mut members: Vec<EntityId> = self
            .outgoing
            .keys()
            .copied()
            .filter(|&id| self.inherits_reaches(id, id))
            .collect();
        members.sort_unstable();
        members
    }

    /// Whether `target` is reachable from `start`'s bases over `Inherits`
    /// edges. With `start == target` this asks whether `start` lies on a
    /// cycle.
    fn inherits_reaches(&self, start: EntityId, target: EntityId) -> bool {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<EntityId> = self.bases_of(start).collect();
        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if visited.insert(current) {
                queue.extend(self.bases_of(current));
            }
        }
        false
    }
}

/// See [`HierarchyGraph::ancestors_of`].
pub struct Ancestors<'a> {
    graph: &'a HierarchyGraph,
    queue: VecDeque<EntityId>,
    visited: HashSet<EntityId>,
}

impl Iterator for Ancestors<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        let current = self.queue.pop_front()?;
        for base in self.graph.bases_of(current) {
            if self.visited.insert(base) {
                self.queue.push_back(base);
            }
        }
        Some(current)
    }
}

// ---------------------------------------------------------------------------
// Row registration
// ---------------------------------------------------------------------------

/// Ensure the entity named by a hierarchy row exists in the catalog.
///
/// The hierarchy listing uses full display names, so nested classes and
/// template instantiations may appear here without an annotated-listing
/// counterpart; those are registered on first sight. Instantiation rows
/// (and the primary they imply) share one documentation page.
fn register_row(catalog: &mut EntityCatalog, entry: &NavEntry) -> IndexResult<QualifiedName> {
    let name = QualifiedName::parse(&entry.label)?;
    if catalog.contains(&name) {
        if name.is_templated() && !catalog.contains(&name.without_args()) {
            // An instantiation must never outlive its primary template.
            return Err(IndexError::DanglingReference(name.without_args()));
        }
        return Ok(name);
    }

    let anchor = entry
        .link
        .clone()
        .ok_or_else(|| IndexError::Parse(format!("hierarchy row {:?} has no link", entry.label)))?;
    let kind = EntityKind::from_link(&anchor).unwrap_or(EntityKind::Class);
    let parent = name
        .parent()
        .and_then(|scope| catalog.resolve_id(&scope).ok());

    if name.is_templated() {
        let primary = name.without_args();
        if !catalog.contains(&primary) {
            let primary_parent = primary
                .parent()
                .and_then(|scope| catalog.resolve_id(&scope).ok());
            catalog.insert(primary.clone(), kind, anchor.clone(), primary_parent)?;
        }
        catalog.insert_shared_anchor(name.clone(), kind, anchor, parent)?;
    } else {
        catalog.insert(name.clone(), kind, anchor, parent)?;
    }
    Ok(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
