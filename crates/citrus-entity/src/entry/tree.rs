//! Materialized entry trees.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use citrus_core::types::EntryId;

use super::model::Entry;
use super::table::EntryTable;

/// An entry together with its (recursively materialized) children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryNode {
    /// The entry at this node.
    pub entry: Entry,
    /// Children in listing order.
    pub children: Vec<EntryNode>,
}

impl EntryNode {
    /// A node without children.
    pub fn leaf(entry: Entry) -> Self {
        Self {
            entry,
            children: Vec::new(),
        }
    }

    /// Materialize the full subtree under `root`.
    ///
    /// Built bottom-up from a post-order walk, so depth is bounded only by
    /// memory. Returns `None` if `root` is not in the table.
    pub fn from_table(table: &EntryTable, root: EntryId) -> Option<Self> {
        Self::from_table_where(table, root, |_| true)
    }

    /// Like [`EntryNode::from_table`], keeping only entries accepted by
    /// `include`. A rejected entry prunes everything beneath it.
    pub fn from_table_where(
        table: &EntryTable,
        root: EntryId,
        include: impl Fn(EntryId) -> bool,
    ) -> Option<Self> {
        let mut built: HashMap<EntryId, EntryNode> = HashMap::new();
        for id in table.subtree_post_order(root) {
            if !include(id) {
                continue;
            }
            let entry = table.get(id)?.clone();
            let children = table
                .children_of(Some(id))
                .into_iter()
                .filter_map(|child| built.remove(&child.id))
                .collect();
            built.insert(id, EntryNode { entry, children });
        }
        built.remove(&root)
    }

    /// Total number of entries in this tree, including the root.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children.iter());
        }
        total
    }

    /// Pre-order walk yielding `(depth, entry)` pairs.
    pub fn flatten(&self) -> Vec<(usize, &Entry)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, &node.entry));
            stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }

    /// Ids of every entry in this tree, pre-order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.flatten().into_iter().map(|(_, e)| e.id).collect()
    }
}

impl Drop for EntryNode {
    // Unlink children onto a heap stack so dropping a deep chain does not recurse.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
