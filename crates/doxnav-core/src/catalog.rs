//! Flat entity catalog plus containment tree, built from the annotated
//! listing and immutable once the load pipeline returns it.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::errors::{IndexError, IndexResult};
use crate::models::{Entity, EntityId, EntityKind, NavEntry, QualifiedName};

// ---------------------------------------------------------------------------
// EntityCatalog
// ---------------------------------------------------------------------------

/// All documented entities, keyed by full qualified name, with parent and
/// child links forming a strict containment tree.
#[derive(Debug, Default)]
pub struct EntityCatalog {
    entities: Vec<Entity>,
    by_name: IndexMap<QualifiedName, EntityId>,
    by_anchor: HashMap<String, EntityId>,
    roots: Vec<EntityId>,
}

impl EntityCatalog {
    /// Build a catalog from a decoded annotated listing.
    ///
    /// Each row's qualified name is the path of labels from the root; the
    /// row's link is its anchor. Duplicate names or anchors abort the load.
    pub fn load(entries: &[NavEntry]) -> IndexResult<Self> {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert_listing(entry, None)?;
        }
        debug!(entities = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    fn insert_listing(&mut self, entry: &NavEntry, parent: Option<EntityId>) -> IndexResult<()> {
        let anchor = entry.link.clone().ok_or_else(|| {
            IndexError::Parse(format!("listing row {:?} has no link", entry.label))
        })?;
        let kind = EntityKind::from_link(&anchor).ok_or_else(|| {
            IndexError::Parse(format!("cannot derive entity kind from link {anchor:?}"))
        })?;
        let name = match parent {
            Some(id) => self.entities[id].name.child(&entry.label),
            None => QualifiedName::parse(&entry.label)?,
        };
        let id = self.insert(name, kind, anchor, parent)?;
        for child in &entry.children {
            self.insert_listing(child, Some(id))?;
        }
        Ok(())
    }

    /// Insert one entity, enforcing name and anchor uniqueness.
    pub(crate) fn insert(
        &mut self,
        name: QualifiedName,
        kind: EntityKind,
        anchor: String,
        parent: Option<EntityId>,
    ) -> IndexResult<EntityId> {
        if self.by_anchor.contains_key(&anchor) {
            return Err(IndexError::DuplicateAnchor(anchor));
        }
        self.insert_shared_anchor(name, kind, anchor, parent)
    }

    /// Insert a template specialization, which shares its primary template's
    /// documentation page. Name uniqueness still applies; the anchor lookup
    /// keeps the first entity registered for the page.
    pub(crate) fn insert_shared_anchor(
        &mut self,
        name: QualifiedName,
        kind: EntityKind,
        anchor: String,
        parent: Option<EntityId>,
    ) -> IndexResult<EntityId> {
        if self.by_name.contains_key(&name) {
            return Err(IndexError::DuplicateEntity(name));
        }
        let id = self.entities.len();
        self.entities.push(Entity {
            id,
            name: name.clone(),
            kind,
            anchor: anchor.clone(),
            parent,
            children: Vec::new(),
        });
        self.by_name.insert(name, id);
        self.by_anchor.entry(anchor).or_insert(id);
        match parent {
            Some(p) => self.entities[p].children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Exact-match lookup by qualified name. No fuzzy matching.
    pub fn resolve(&self, name: &QualifiedName) -> IndexResult<&Entity> {
        self.by_name
            .get(name)
            .map(|&id| &self.entities[id])
            .ok_or_else(|| IndexError::NotFound(name.clone()))
    }

    pub fn resolve_id(&self, name: &QualifiedName) -> IndexResult<EntityId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| IndexError::NotFound(name.clone()))
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.by_name.contains_key(name)
    }

    /// The entity documented at `anchor`, if any. For a page shared by
    /// template specializations this is the first entity registered for it.
    pub fn by_anchor(&self, anchor: &str) -> Option<&Entity> {
        self.by_anchor.get(anchor).map(|&id| &self.entities[id])
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    /// All entities in load order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Top-level entities in listing order.
    pub fn roots(&self) -> impl Iterator<Item = &Entity> {
        self.roots.iter().map(move |&id| &self.entities[id])
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
