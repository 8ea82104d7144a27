//! Single-pass load pipeline: scripts in, immutable documentation index out.
//!
//! Construction is one blocking read of the doc root followed by pure
//! in-memory parsing (member scripts in parallel). The first error aborts
//! the whole load; no partial index is ever exposed. The returned
//! [`DocIndex`] is immutable and may be shared and read concurrently.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rayon::prelude::*;
use tracing::info;

use crate::catalog::EntityCatalog;
use crate::errors::{IndexError, IndexResult};
use crate::hierarchy::HierarchyGraph;
use crate::ingest::scanner::{scan_doc_root, ScriptRole, ScriptSource};
use crate::ingest::script::{
    decode_entries, decode_keys, decode_message, parse_script, ScriptFile,
};
use crate::models::{
    EntityKind, NavEntry, QualifiedName, SyncMessages, NAVTREE_INDEX_VAR, NAVTREE_VAR,
    SYNC_OFF_VAR, SYNC_ON_VAR,
};
use crate::nav::sync::PanelSync;
use crate::nav::tree::NavNode;
use crate::shards::ShardTable;

// ---------------------------------------------------------------------------
// DocIndex
// ---------------------------------------------------------------------------

/// The fully loaded documentation index.
#[derive(Debug)]
pub struct DocIndex {
    pub catalog: EntityCatalog,
    pub hierarchy: HierarchyGraph,
    pub nav_root: NavNode,
    pub shards: ShardTable,
    pub sync_messages: Option<SyncMessages>,
}

impl DocIndex {
    /// Scan a generated-documentation root and load everything it holds.
    pub fn load_dir(root: &Path) -> IndexResult<Self> {
        let sources = scan_doc_root(root)?;
        Self::load_sources(&sources)
    }

    /// Load from already-discovered script sources.
    pub fn load_sources(sources: &[ScriptSource]) -> IndexResult<Self> {
        let parsed: Vec<(&ScriptSource, ScriptFile)> = sources
            .par_iter()
            .map(|source| parse_script(&source.text).map(|file| (source, file)))
            .collect::<IndexResult<_>>()?;

        // Decode every listing script up front; the navtree splices them in
        // as deferred children by stem name.
        let mut listings: HashMap<String, Vec<NavEntry>> = HashMap::new();
        let mut navtree: Option<&ScriptFile> = None;
        for (source, file) in &parsed {
            match &source.role {
                ScriptRole::NavTree => navtree = Some(file),
                _ => {
                    let entries = decode_entries(file.require(&source.stem)?)?;
                    listings.insert(source.stem.clone(), entries);
                }
            }
        }

        // Catalog from the annotated listing.
        let annotated = parsed
            .iter()
            .find(|(source, _)| source.role == ScriptRole::Annotated)
            .map(|(source, _)| &listings[&source.stem])
            .ok_or_else(|| IndexError::Parse("missing annotated_dup script".into()))?;
        let mut catalog = EntityCatalog::load(annotated)?;

        // Enums and enumerators from the per-namespace member listings.
        for (source, _) in &parsed {
            if let ScriptRole::NamespaceMembers(namespace) = &source.role {
                load_namespace_members(&mut catalog, namespace, &listings[&source.stem])?;
            }
        }

        // Inheritance graph, then the integrity check.
        let hierarchy = match parsed
            .iter()
            .find(|(source, _)| source.role == ScriptRole::Hierarchy)
        {
            Some((source, _)) => HierarchyGraph::load(&mut catalog, &listings[&source.stem])?,
            None => HierarchyGraph::default(),
        };
        let cycle = hierarchy.detect_cycles();
        if !cycle.is_empty() {
            let names = cycle
                .into_iter()
                .filter_map(|id| catalog.get(id))
                .map(|e| e.name.to_string())
                .collect();
            return Err(IndexError::CycleDetected(names));
        }

        // Navigation tree, shard table, and sync messages.
        let (nav_root, shards, sync_messages) = match navtree {
            Some(file) => {
                let entries = decode_entries(file.require(NAVTREE_VAR)?)?;
                let shards = match file.get(NAVTREE_INDEX_VAR) {
                    Some(value) => ShardTable::new(decode_keys(value)?)?,
                    None => ShardTable::default(),
                };
                let messages = match (file.get(SYNC_ON_VAR), file.get(SYNC_OFF_VAR)) {
                    (Some(on), Some(off)) => Some(SyncMessages {
                        enabled_hint: decode_message(on)?,
                        disabled_hint: decode_message(off)?,
                    }),
                    _ => None,
                };
                (NavNode::build(&entries, &listings), shards, messages)
            }
            None => (NavNode::build(&[], &listings), ShardTable::default(), None),
        };

        info!(
            entities = catalog.len(),
            edges = hierarchy.edges().len(),
            shards = shards.len(),
            "documentation index loaded"
        );

        Ok(Self {
            catalog,
            hierarchy,
            nav_root,
            shards,
            sync_messages,
        })
    }

    /// Fresh per-session panel state: the tree panel holds the navigation
    /// tree's links, the content panel every documented page.
    pub fn session(&self) -> PanelSync {
        let content: HashSet<String> = self
            .catalog
            .entities()
            .map(|e| e.anchor.clone())
            .collect();
        PanelSync::new(self.nav_root.links(), content)
    }
}

// ---------------------------------------------------------------------------
// Member listings
// ---------------------------------------------------------------------------

/// Fold one namespace member listing into the catalog.
///
/// Anchored rows (`….html#a…`) define enums, their children enumerators.
/// Unanchored rows re-list classes the annotated listing already defined
/// and are skipped rather than re-inserted.
fn load_namespace_members(
    catalog: &mut EntityCatalog,
    namespace: &QualifiedName,
    entries: &[NavEntry],
) -> IndexResult<()> {
    let parent = catalog
        .resolve_id(namespace)
        .map_err(|_| IndexError::DanglingReference(namespace.clone()))?;

    for entry in entries {
        let link = match &entry.link {
            Some(link) if link.contains('#') => link.clone(),
            _ => continue,
        };
        let enum_name = namespace.child(&entry.label);
        let enum_id = catalog.insert(enum_name.clone(), EntityKind::Enum, link, Some(parent))?;
        for child in &entry.children {
            let child_link = child.link.clone().ok_or_else(|| {
                IndexError::Parse(format!("enumerator row {:?} has no link", child.label))
            })?;
            let child_name = enum_name.child(&child.label);
            catalog.insert(child_name, EntityKind::Enumerator, child_link, Some(enum_id))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EdgeKind;

    const ANNOTATED_JS: &str = r#"var annotated_dup =
[
    [ "SRL", "namespaceSRL.html", [
      [ "Input", "namespaceSRL_1_1Input.html", [
        [ "Analog", "structSRL_1_1Input_1_1Analog.html", "structSRL_1_1Input_1_1Analog" ],
        [ "Digital", "structSRL_1_1Input_1_1Digital.html", "structSRL_1_1Input_1_1Digital" ],
        [ "PeripheralGeneric", "structSRL_1_1Input_1_1PeripheralGeneric.html", "structSRL_1_1Input_1_1PeripheralGeneric" ]
      ] ]
    ] ]
];
"#;

    const HIERARCHY_JS: &str = r#"var hierarchy =
[
    [ "SRL::Input::PeripheralGeneric", "structSRL_1_1Input_1_1PeripheralGeneric.html", [
      [ "SRL::Input::Analog", "structSRL_1_1Input_1_1Analog.html", null ],
      [ "SRL::Input::Digital", "structSRL_1_1Input_1_1Digital.html", null ]
    ] ]
];
"#;

    const NAVTREE_JS: &str = r#"var NAVTREE =
[
  [ "SaturnRingLibrary", "index.html", [
    [ "Classes", "annotated.html", [
      [ "Class List", "annotated.html", "annotated_dup" ],
      [ "Class Hierarchy", "hierarchy.html", "hierarchy" ]
    ] ]
  ] ]
];

var NAVTREEINDEX =
[
"annotated.html",
"namespaceSRL.html",
"structSRL_1_1Input_1_1Digital.html"
];

var SYNCONMSG = 'click to disable panel synchronization';
var SYNCOFFMSG = 'click to enable panel synchronization';
"#;

    const NAMESPACE_JS: &str = r#"var namespaceSRL_1_1Input =
[
    [ "Analog", "structSRL_1_1Input_1_1Analog.html", "structSRL_1_1Input_1_1Analog" ],
    [ "PeripheralFamily", "namespaceSRL_1_1Input_abb3.html#abb3", [
      [ "Digital", "namespaceSRL_1_1Input_abb3.html#abb3a0bb8", null ],
      [ "Analog", "namespaceSRL_1_1Input_abb3.html#abb3a3d95", null ]
    ] ]
];
"#;

    fn write_site(dir: &Path) {
        std::fs::write(dir.join("annotated_dup.js"), ANNOTATED_JS).unwrap();
        std::fs::write(dir.join("hierarchy.js"), HIERARCHY_JS).unwrap();
        std::fs::write(dir.join("navtreedata.js"), NAVTREE_JS).unwrap();
        std::fs::write(dir.join("namespaceSRL_1_1Input.js"), NAMESPACE_JS).unwrap();
    }

    fn load_site() -> DocIndex {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());
        DocIndex::load_dir(dir.path()).unwrap()
    }

    fn name(text: &str) -> QualifiedName {
        QualifiedName::parse(text).unwrap()
    }

    #[test]
    fn test_end_to_end_catalog() {
        let index = load_site();
        let analog = index.catalog.resolve(&name("SRL::Input::Analog")).unwrap();
        assert_eq!(analog.kind, EntityKind::Struct);
        // Namespaces, three structs, one enum, two enumerators.
        assert_eq!(index.catalog.len(), 8);
    }

    #[test]
    fn test_end_to_end_enum_members() {
        let index = load_site();
        let family = index
            .catalog
            .resolve(&name("SRL::Input::PeripheralFamily"))
            .unwrap();
        assert_eq!(family.kind, EntityKind::Enum);
        assert_eq!(family.children.len(), 2);
        let digital = index
            .catalog
            .resolve(&name("SRL::Input::PeripheralFamily::Digital"))
            .unwrap();
        assert_eq!(digital.kind, EntityKind::Enumerator);
        assert_eq!(digital.parent, Some(family.id));
    }

    #[test]
    fn test_end_to_end_hierarchy() {
        let index = load_site();
        let analog = index.catalog.resolve_id(&name("SRL::Input::Analog")).unwrap();
        let generic = index
            .catalog
            .resolve_id(&name("SRL::Input::PeripheralGeneric"))
            .unwrap();
        let ancestors: Vec<_> = index.hierarchy.ancestors_of(analog).collect();
        assert_eq!(ancestors, [generic]);
        assert!(index
            .hierarchy
            .edges()
            .iter()
            .all(|e| e.kind == EdgeKind::Inherits));
    }

    #[test]
    fn test_end_to_end_navtree_splices_listings() {
        let index = load_site();
        assert_eq!(index.nav_root.label, "SaturnRingLibrary");
        let class_list = index
            .nav_root
            .find(|n| n.label == "Class List")
            .next()
            .unwrap();
        assert_eq!(class_list.children[0].label, "SRL");
        let hierarchy_node = index
            .nav_root
            .find(|n| n.label == "Class Hierarchy")
            .next()
            .unwrap();
        assert_eq!(
            hierarchy_node.children[0].label,
            "SRL::Input::PeripheralGeneric"
        );
    }

    #[test]
    fn test_end_to_end_shards_and_messages() {
        let index = load_site();
        assert_eq!(index.shards.len(), 3);
        assert_eq!(index.shards.shard_for("index.html").unwrap(), 0);
        assert_eq!(
            index.shards.shard_for("namespaceSRL_1_1Input.html").unwrap(),
            1
        );
        let messages = index.sync_messages.as_ref().unwrap();
        assert_eq!(messages.enabled_hint, "click to disable panel synchronization");
    }

    #[test]
    fn test_end_to_end_session_sync() {
        let index = load_site();
        let session = index.session();
        session.select_in_tree("structSRL_1_1Input_1_1Analog.html");
        assert_eq!(
            session.content_selection().as_deref(),
            Some("structSRL_1_1Input_1_1Analog.html")
        );
    }

    #[test]
    fn test_missing_annotated_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("navtreedata.js"), NAVTREE_JS).unwrap();
        assert!(matches!(
            DocIndex::load_dir(dir.path()),
            Err(IndexError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_entity_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());
        let duplicated = r#"var annotated_dup =
[
    [ "SRL", "namespaceSRL.html", null ],
    [ "SRL", "namespaceSRL_again.html", null ]
];
"#;
        std::fs::write(dir.path().join("annotated_dup.js"), duplicated).unwrap();
        assert!(matches!(
            DocIndex::load_dir(dir.path()),
            Err(IndexError::DuplicateEntity(_))
        ));
    }

    #[test]
    fn test_inheritance_cycle_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());
        let cyclic = r#"var hierarchy =
[
    [ "SRL::Input::Analog", "structSRL_1_1Input_1_1Analog.html", [
      [ "SRL::Input::Digital", "structSRL_1_1Input_1_1Digital.html", [
        [ "SRL::Input::Analog", "structSRL_1_1Input_1_1Analog.html", null ]
      ] ]
    ] ]
];
"#;
        std::fs::write(dir.path().join("hierarchy.js"), cyclic).unwrap();
        match DocIndex::load_dir(dir.path()) {
            Err(IndexError::CycleDetected(members)) => {
                assert_eq!(
                    members,
                    ["SRL::Input::Analog", "SRL::Input::Digital"]
                );
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }
}
