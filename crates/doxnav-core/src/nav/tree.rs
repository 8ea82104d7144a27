//! Navigation tree: the rendered sitemap as an explicit tagged node
//! structure rather than the positional triples of the wire shape.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::models::NavEntry;

// ---------------------------------------------------------------------------
// NavNode
// ---------------------------------------------------------------------------

/// One sitemap node: display label, optional target link, ordered children.
///
/// `deferred` records the name of the script variable a child listing was
/// (or is still to be) loaded from; when the pipeline had that script at
/// hand its rows are spliced into `children`, otherwise the node stays a
/// leaf and keeps the reference for the embedding site to load on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavNode {
    pub label: String,
    pub link: Option<String>,
    pub deferred: Option<String>,
    pub children: Vec<NavNode>,
}

impl NavNode {
    /// Construct the tree root from an ordered description. A single
    /// top-level row becomes the root itself; several rows hang off a
    /// synthetic unlabeled root.
    pub fn build(entries: &[NavEntry], scripts: &HashMap<String, Vec<NavEntry>>) -> NavNode {
        if entries.len() == 1 {
            return Self::from_entry(&entries[0], scripts);
        }
        NavNode {
            label: String::new(),
            link: None,
            deferred: None,
            children: entries.iter().map(|e| Self::from_entry(e, scripts)).collect(),
        }
    }

    fn from_entry(entry: &NavEntry, scripts: &HashMap<String, Vec<NavEntry>>) -> NavNode {
        let mut children: Vec<NavNode> = entry
            .children
            .iter()
            .map(|c| Self::from_entry(c, scripts))
            .collect();
        if let Some(script) = &entry.deferred {
            if let Some(rows) = scripts.get(script) {
                children.extend(rows.iter().map(|r| Self::from_entry(r, scripts)));
            }
        }
        NavNode {
            label: entry.label.clone(),
            link: entry.link.clone(),
            deferred: entry.deferred.clone(),
            children,
        }
    }

    /// Lazy depth-first preorder search; child order is render order and is
    /// visited exactly as listed. Restartable by calling again.
    pub fn find<'a, P>(&'a self, predicate: P) -> Find<'a, P>
    where
        P: FnMut(&NavNode) -> bool,
    {
        Find {
            stack: vec![self],
            predicate,
        }
    }

    /// Every link reachable from this node, for panel-membership tests.
    pub fn links(&self) -> HashSet<String> {
        self.find(|n| n.link.is_some())
            .filter_map(|n| n.link.clone())
            .collect()
    }

    /// Re-serialize to the positional `[label, link, third]` shape.
    ///
    /// Spliced-in deferred children are not inlined: the third slot keeps
    /// the script reference, so serializing a freshly parsed tree
    /// reproduces its source listing.
    pub fn to_value(&self) -> Value {
        let third = if let Some(script) = &self.deferred {
            Value::String(script.clone())
        } else if self.children.is_empty() {
            Value::Null
        } else {
            Value::Array(self.children.iter().map(NavNode::to_value).collect())
        };
        Value::Array(vec![
            Value::String(self.label.clone()),
            self.link
                .as_ref()
                .map(|l| Value::String(l.clone()))
                .unwrap_or(Value::Null),
            third,
        ])
    }
}

/// See [`NavNode::find`].
pub struct Find<'a, P> {
    stack: Vec<&'a NavNode>,
    predicate: P,
}

impl<'a, P> Iterator for Find<'a, P>
where
    P: FnMut(&NavNode) -> bool,
{
    type Item = &'a NavNode;

    fn next(&mut self) -> Option<&'a NavNode> {
        while let Some(node) = self.stack.pop() {
            for child in node.children.iter().rev() {
                self.stack.push(child);
            }
            if (self.predicate)(node) {
                return Some(node);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
