//! Flat arena of one owner's entries with a parent → children index.
//!
//! All traversals are iterative so that arbitrarily deep folder chains
//! never exhaust the stack.

use std::collections::{HashMap, HashSet};

use citrus_core::types::EntryId;

use super::model::Entry;

/// An owner's entries keyed by id, plus an index from parent to children.
///
/// `None` in the children index stands for the root level.
#[derive(Debug, Clone, Default)]
pub struct EntryTable {
    entries: HashMap<EntryId, Entry>,
    children: HashMap<Option<EntryId>, Vec<EntryId>>,
}

impl EntryTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a flat list of entries.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.upsert(entry);
        }
        table
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry.
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    /// Whether an entry with this id exists.
    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Iterate over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Consume the table, yielding its entries.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries.into_values().collect()
    }

    /// Direct children of `parent`, sorted by name, then creation time, then id.
    pub fn children_of(&self, parent: Option<EntryId>) -> Vec<&Entry> {
        let mut children: Vec<&Entry> = self
            .children
            .get(&parent)
            .map(|ids| ids.iter().filter_map(|id| self.entries.get(id)).collect())
            .unwrap_or_default();
        sort_siblings(&mut children);
        children
    }

    /// Insert or replace an entry, keeping the children index in step.
    pub fn upsert(&mut self, entry: Entry) {
        if let Some(previous) = self.entries.get(&entry.id) {
            if previous.parent_id != entry.parent_id {
                let old_parent = previous.parent_id;
                self.unlink(old_parent, entry.id);
                self.link(entry.parent_id, entry.id);
            }
        } else {
            self.link(entry.parent_id, entry.id);
        }
        self.entries.insert(entry.id, entry);
    }

    /// Remove a single entry. Its children, if any, are left dangling.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let entry = self.entries.remove(&id)?;
        self.unlink(entry.parent_id, id);
        self.children.remove(&Some(id));
        Some(entry)
    }

    /// Ancestor chain of `id`, nearest first, excluding `id` itself.
    ///
    /// Stops at the root or at a parent that is not in the table.
    pub fn ancestors(&self, id: EntryId) -> Vec<EntryId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut cursor = self.entries.get(&id).and_then(|e| e.parent_id);
        while let Some(parent) = cursor {
            if !seen.insert(parent) {
                break;
            }
            let Some(entry) = self.entries.get(&parent) else {
                break;
            };
            chain.push(parent);
            cursor = entry.parent_id;
        }
        chain
    }

    /// Whether `candidate` equals `root` or lies anywhere beneath it.
    pub fn is_descendant_or_self(&self, candidate: EntryId, root: EntryId) -> bool {
        candidate == root || self.ancestors(candidate).contains(&root)
    }

    /// `root` and every entry beneath it, children before their parents.
    ///
    /// Returns an empty list if `root` is not in the table.
    pub fn subtree_post_order(&self, root: EntryId) -> Vec<EntryId> {
        if !self.contains(root) {
            return Vec::new();
        }
        let mut order = Vec::new();
        let mut stack = vec![(root, false)];
        let mut visited = HashSet::new();
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            if let Some(kids) = self.children.get(&Some(id)) {
                stack.extend(kids.iter().map(|kid| (*kid, false)));
            }
        }
        order
    }

    /// Whether the parent relation contains no cycle.
    pub fn is_acyclic(&self) -> bool {
        // 0 = unvisited, 1 = on the current path, 2 = done
        let mut state: HashMap<EntryId, u8> = HashMap::with_capacity(self.entries.len());
        for start in self.entries.keys() {
            if state.contains_key(start) {
                continue;
            }
            let mut path = Vec::new();
            let mut cursor = Some(*start);
            while let Some(id) = cursor {
                match state.get(&id) {
                    Some(1) => return false,
                    Some(_) => break,
                    None => {}
                }
                let Some(entry) = self.entries.get(&id) else {
                    break;
                };
                state.insert(id, 1);
                path.push(id);
                cursor = entry.parent_id;
            }
            for id in path {
                state.insert(id, 2);
            }
        }
        true
    }

    /// Entries whose parent is missing or is not a folder.
    pub fn dangling_parents(&self) -> Vec<EntryId> {
        self.entries
            .values()
            .filter(|entry| match entry.parent_id {
                Some(parent) => !self.entries.get(&parent).is_some_and(|p| p.is_folder),
                None => false,
            })
            .map(|entry| entry.id)
            .collect()
    }

    fn link(&mut self, parent: Option<EntryId>, id: EntryId) {
        self.children.entry(parent).or_default().push(id);
    }

    fn unlink(&mut self, parent: Option<EntryId>, id: EntryId) {
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|sibling| *sibling != id);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
    }
}

/// Stable listing order for siblings.
pub fn sort_siblings(entries: &mut [&Entry]) {
    entries.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}
