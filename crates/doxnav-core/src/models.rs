//! Shared typed models used across ingestion, catalog, and navigation layers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{IndexError, IndexResult};

// ---------------------------------------------------------------------------
// Well-known script variables
// ---------------------------------------------------------------------------

/// Variable holding the navigation tree in `navtreedata.js`.
pub const NAVTREE_VAR: &str = "NAVTREE";

/// Variable holding the alphabetical shard boundaries in `navtreedata.js`.
pub const NAVTREE_INDEX_VAR: &str = "NAVTREEINDEX";

/// Toggle-affordance message shown while panel synchronization is enabled.
pub const SYNC_ON_VAR: &str = "SYNCONMSG";

/// Toggle-affordance message shown while panel synchronization is disabled.
pub const SYNC_OFF_VAR: &str = "SYNCOFFMSG";

/// Variable holding the class/struct listing in `annotated_dup.js`.
pub const ANNOTATED_VAR: &str = "annotated_dup";

/// Variable holding the inheritance listing in `hierarchy.js`.
pub const HIERARCHY_VAR: &str = "hierarchy";

// ---------------------------------------------------------------------------
// 1. QualifiedName
// ---------------------------------------------------------------------------

/// A scope-qualified entity name, e.g. `SRL::Math::Types::Fxp`.
///
/// Template instantiations keep their full argument tuple, so
/// `SglType< Attribute, ATTR >` and `SglType< Mesh, PDATA >` hash and
/// compare as distinct names even though they share one documentation page.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    segments: Vec<String>,
    template_args: Vec<String>,
}

impl QualifiedName {
    /// Parse a display-form name: `A::B::C` or `A::B::C< X, Y >`.
    pub fn parse(text: &str) -> IndexResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(IndexError::Parse("empty qualified name".into()));
        }

        let (path, args) = match trimmed.find('<') {
            Some(open) => {
                let close = trimmed
                    .rfind('>')
                    .ok_or_else(|| IndexError::Parse(format!("unclosed template args in {trimmed:?}")))?;
                if close < open {
                    return Err(IndexError::Parse(format!("malformed template args in {trimmed:?}")));
                }
                let args: Vec<String> = trimmed[open + 1..close]
                    .split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect();
                (trimmed[..open].trim_end(), args)
            }
            None => (trimmed, Vec::new()),
        };

        let segments: Vec<String> = path.split("::").map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(IndexError::Parse(format!("empty segment in {trimmed:?}")));
        }

        Ok(Self {
            segments,
            template_args: args,
        })
    }

    /// Build a name from bare segments (no template arguments).
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            template_args: Vec::new(),
        }
    }

    /// The name of a child scope: `self::segment`.
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self {
            segments,
            template_args: Vec::new(),
        }
    }

    /// The containing scope, or `None` for a top-level name.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            template_args: Vec::new(),
        })
    }

    /// This name with the template-argument tuple stripped.
    pub fn without_args(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            template_args: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn template_args(&self) -> &[String] {
        &self.template_args
    }

    /// The unqualified final segment.
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_templated(&self) -> bool {
        !self.template_args.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("::"))?;
        if !self.template_args.is_empty() {
            write!(f, "< {} >", self.template_args.join(", "))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 2. EntityKind
// ---------------------------------------------------------------------------

/// Kind tag of a documented entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Namespace,
    Class,
    Struct,
    Enum,
    Enumerator,
}

impl EntityKind {
    /// Derive the kind from the page-name prefix of a documentation link,
    /// e.g. `classSRL_1_1Core.html` or `structSRL_1_1Bitmap_1_1TGA.html`.
    ///
    /// Anchored member links (`….html#a…`) carry no kind of their own; the
    /// caller decides from context (enum row vs. enumerator row).
    pub fn from_link(link: &str) -> Option<Self> {
        let page = link.rsplit('/').next().unwrap_or(link);
        if page.starts_with("class") {
            Some(Self::Class)
        } else if page.starts_with("struct") {
            Some(Self::Struct)
        } else if page.starts_with("namespace") {
            Some(Self::Namespace)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Entity
// ---------------------------------------------------------------------------

/// Arena index of an entity inside its catalog.
pub type EntityId = usize;

/// A documented namespace, class, struct, enum, or enumerator.
///
/// Created once at load time and immutable thereafter.
#[derive(Clone, Debug, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: QualifiedName,
    pub kind: EntityKind,
    /// Opaque documentation link; unique across the catalog except for
    /// template specializations, which share their primary's page.
    pub anchor: String,
    pub parent: Option<EntityId>,
    /// Contained entities, in listing order.
    pub children: Vec<EntityId>,
}

// ---------------------------------------------------------------------------
// 4. EdgeKind
// ---------------------------------------------------------------------------

/// Kind of a directed hierarchy relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Derived entity inherits from a base entity. Must stay acyclic.
    Inherits,
    /// Template instantiation specializes a primary template. Exempt from
    /// acyclicity checking.
    Specializes,
}

// ---------------------------------------------------------------------------
// 5. NavEntry
// ---------------------------------------------------------------------------

/// One row of the positional ingestion format: `[label, link, third]`.
///
/// The third slot is `null`, an inline array of child rows, or the name of
/// another script variable whose rows are this entry's deferred children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavEntry {
    pub label: String,
    pub link: Option<String>,
    pub deferred: Option<String>,
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    pub fn leaf(label: &str, link: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            link: link.map(str::to_string),
            deferred: None,
            children: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// 6. SyncMessages
// ---------------------------------------------------------------------------

/// The panel-synchronization hint strings from `navtreedata.js`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMessages {
    /// Shown while synchronization is enabled (`SYNCONMSG`).
    pub enabled_hint: String,
    /// Shown while synchronization is disabled (`SYNCOFFMSG`).
    pub disabled_hint: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        let name = QualifiedName::parse("SRL::Math::Types::Fxp").unwrap();
        assert_eq!(name.segments(), ["SRL", "Math", "Types", "Fxp"]);
        assert!(name.template_args().is_empty());
        assert_eq!(name.to_string(), "SRL::Math::Types::Fxp");
    }

    #[test]
    fn test_parse_templated_name() {
        let name = QualifiedName::parse("SRL::SGL::SglType< Attribute, ATTR >").unwrap();
        assert_eq!(name.segments(), ["SRL", "SGL", "SglType"]);
        assert_eq!(name.template_args(), ["Attribute", "ATTR"]);
        assert_eq!(name.to_string(), "SRL::SGL::SglType< Attribute, ATTR >");
    }

    #[test]
    fn test_templated_names_are_distinct() {
        let a = QualifiedName::parse("SRL::SGL::SglType< Attribute, ATTR >").unwrap();
        let b = QualifiedName::parse("SRL::SGL::SglType< Mesh, PDATA >").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.without_args(), b.without_args());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(QualifiedName::parse("").is_err());
        assert!(QualifiedName::parse("A::::B").is_err());
        assert!(QualifiedName::parse("A::B< C").is_err());
    }

    #[test]
    fn test_child_and_parent() {
        let ns = QualifiedName::from_segments(["SRL", "Input"]);
        let child = ns.child("Analog");
        assert_eq!(child.to_string(), "SRL::Input::Analog");
        assert_eq!(child.parent().unwrap(), ns);
        assert!(QualifiedName::from_segments(["SRL"]).parent().is_none());
    }

    #[test]
    fn test_kind_from_link() {
        assert_eq!(
            EntityKind::from_link("classSRL_1_1Core.html"),
            Some(EntityKind::Class)
        );
        assert_eq!(
            EntityKind::from_link("structSRL_1_1Bitmap_1_1TGA.html"),
            Some(EntityKind::Struct)
        );
        assert_eq!(
            EntityKind::from_link("namespaceSRL_1_1Input.html"),
            Some(EntityKind::Namespace)
        );
        assert_eq!(EntityKind::from_link("index.html"), None);
    }
}
