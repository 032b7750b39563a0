//! Favorites view.
//!
//! An entry belongs to the view if it is starred itself or sits anywhere
//! below a starred folder. Only directly starred entries become roots.

use std::collections::{HashMap, HashSet};

use citrus_core::types::EntryId;
use citrus_entity::entry::table::sort_siblings;
use citrus_entity::entry::{EntryNode, EntryTable};

/// Build the favorites forest of one owner's table.
///
/// Whether an entry lies below a starred folder is memoized per node, so the
/// whole computation is linear in the number of entries.
pub fn favorites_forest(table: &EntryTable) -> Vec<EntryNode> {
    let starred_folders: HashSet<EntryId> = table
        .iter()
        .filter(|e| e.is_starred && e.is_folder)
        .map(|e| e.id)
        .collect();

    let mut covered: HashMap<EntryId, bool> = HashMap::with_capacity(table.len());
    for entry in table.iter() {
        resolve_covered(table, &starred_folders, &mut covered, entry.id);
    }

    let included: HashSet<EntryId> = table
        .iter()
        .filter(|e| e.is_starred || covered.get(&e.id).copied().unwrap_or(false))
        .map(|e| e.id)
        .collect();

    let mut roots: Vec<_> = table.iter().filter(|e| e.is_starred).collect();
    sort_siblings(&mut roots);

    roots
        .into_iter()
        .filter_map(|root| {
            EntryNode::from_table_where(table, root.id, |id| included.contains(&id))
        })
        .collect()
}

/// Fill `covered` for `id` and every unresolved ancestor on its chain.
fn resolve_covered(
    table: &EntryTable,
    starred_folders: &HashSet<EntryId>,
    covered: &mut HashMap<EntryId, bool>,
    id: EntryId,
) {
    let mut path = Vec::new();
    let mut cursor = Some(id);
    let mut verdict = false;

    while let Some(current) = cursor {
        if let Some(known) = covered.get(&current) {
            verdict = *known;
            break;
        }
        let Some(parent) = table.get(current).and_then(|e| e.parent_id) else {
            break;
        };
        path.push(current);
        if path.len() > table.len() {
            break;
        }
        if starred_folders.contains(&parent) {
            verdict = true;
            break;
        }
        cursor = Some(parent);
    }

    // Everything on the walked path shares the verdict of the point where
    // the walk stopped, except the starred folder itself, which was not pushed.
    for node in path {
        covered.insert(node, verdict);
    }
    covered.entry(id).or_insert(verdict);
}

#[cfg(test)]
mod tests {
    use super::*;
    use citrus_core::types::OwnerId;
    use citrus_entity::entry::{Entry, NewEntry};

    fn names(forest: &[EntryNode]) -> Vec<Vec<String>> {
        forest
            .iter()
            .map(|root| {
                root.flatten()
                    .into_iter()
                    .map(|(depth, e)| format!("{}{}", "-".repeat(depth), e.name))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_nothing_starred_is_empty() {
        let owner = OwnerId::new();
        let table = EntryTable::from_entries([
            Entry::create(NewEntry::folder(owner, "a", None)),
            Entry::create(NewEntry::file(owner, "b", None)),
        ]);
        assert!(favorites_forest(&table).is_empty());
    }

    #[test]
    fn test_starred_folder_brings_whole_subtree() {
        let owner = OwnerId::new();
        let f1 = Entry::create(NewEntry::folder(owner, "F1", None).starred());
        let f2 = Entry::create(NewEntry::folder(owner, "F2", Some(f1.id)));
        let a = Entry::create(NewEntry::file(owner, "A", Some(f2.id)));
        let other = Entry::create(NewEntry::file(owner, "other", None));
        let table = EntryTable::from_entries([f1, f2, a, other]);

        assert_eq!(names(&favorites_forest(&table)), vec![vec!["F1", "-F2", "--A"]]);
    }

    #[test]
    fn test_starred_leaf_is_childless_root() {
        let owner = OwnerId::new();
        let folder = Entry::create(NewEntry::folder(owner, "Docs", None));
        let leaf = Entry::create(NewEntry::file(owner, "cv.pdf", Some(folder.id)).starred());
        let table = EntryTable::from_entries([folder, leaf]);

        let forest = favorites_forest(&table);
        assert_eq!(names(&forest), vec![vec!["cv.pdf"]]);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_nested_star_is_root_and_child() {
        let owner = OwnerId::new();
        let outer = Entry::create(NewEntry::folder(owner, "outer", None).starred());
        let inner = Entry::create(NewEntry::folder(owner, "inner", Some(outer.id)).starred());
        let leaf = Entry::create(NewEntry::file(owner, "leaf", Some(inner.id)));
        let table = EntryTable::from_entries([outer, inner, leaf]);

        assert_eq!(
            names(&favorites_forest(&table)),
            vec![vec!["inner", "-leaf"], vec!["outer", "-inner", "--leaf"]]
        );
    }

    #[test]
    fn test_starred_file_does_not_cover_siblings() {
        let owner = OwnerId::new();
        let folder = Entry::create(NewEntry::folder(owner, "plain", None));
        let starred = Entry::create(NewEntry::file(owner, "x", Some(folder.id)).starred());
        let sibling = Entry::create(NewEntry::file(owner, "y", Some(folder.id)));
        let table = EntryTable::from_entries([folder, starred, sibling]);

        let forest = favorites_forest(&table);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].count(), 1);
    }

    #[test]
    fn test_memoization_handles_deep_chain() {
        let owner = OwnerId::new();
        let top = Entry::create(NewEntry::folder(owner, "top", None).starred());
        let mut parent = top.id;
        let mut entries = vec![top];
        for i in 0..5_000 {
            let e = Entry::create(NewEntry::folder(owner, format!("n{i}"), Some(parent)));
            parent = e.id;
            entries.push(e);
        }
        let table = EntryTable::from_entries(entries);
        let forest = favorites_forest(&table);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].count(), 5_001);
    }
}
