//! Property tests of tree invariants through the service layer.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use citrus_core::error::ErrorKind;
use citrus_core::types::{EntryId, OwnerId};
use citrus_database::MemoryEntryRepository;
use citrus_service::{CreateEntryRequest, EntryService, RequestContext};
use citrus_storage::MemoryBlobStore;

/// Random forest shape: entry `i` hangs under `parents[i]` if it names an
/// earlier entry, otherwise at the root level.
fn forest_shape() -> impl Strategy<Value = Vec<Option<usize>>> {
    (2usize..24).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    prop::option::of(0..i).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn is_self_or_descendant(parents: &HashMap<EntryId, Option<EntryId>>, node: EntryId, of: EntryId) -> bool {
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        if current == of {
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_move_is_cyclic_iff_target_in_subtree(
        shape in forest_shape(),
        moves in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 1..16),
    ) {
        runtime().block_on(async {
            let service = EntryService::new(
                Arc::new(MemoryEntryRepository::new()),
                Arc::new(MemoryBlobStore::new()),
                1024,
            );
            let ctx = RequestContext::new(OwnerId::new());

            let mut ids: Vec<EntryId> = Vec::with_capacity(shape.len());
            let mut parents: HashMap<EntryId, Option<EntryId>> = HashMap::new();
            for (i, parent) in shape.iter().enumerate() {
                let parent_id = parent.map(|p| ids[p]);
                let entry = service
                    .create_entry(&ctx, CreateEntryRequest {
                        name: format!("n{i}"),
                        is_folder: true,
                        parent_id,
                        ..Default::default()
                    })
                    .await
                    .expect("create folder");
                parents.insert(entry.id, parent_id);
                ids.push(entry.id);
            }

            for (source, target) in moves {
                let source = ids[source.index(ids.len())];
                let target = ids[target.index(ids.len())];
                let expect_cycle = is_self_or_descendant(&parents, target, source);

                match service.move_entry(&ctx, source, Some(target)).await {
                    Ok(moved) => {
                        assert!(!expect_cycle, "move of {source} under {target} should fail");
                        assert_eq!(moved.parent_id, Some(target));
                        parents.insert(source, Some(target));
                    }
                    Err(e) => {
                        assert!(expect_cycle, "unexpected error {e}");
                        assert_eq!(e.kind, ErrorKind::CyclicMove);
                    }
                }
            }

            // Every entry still reaches the root level.
            for id in &ids {
                let chain = service.breadcrumbs(&ctx, *id).await.expect("breadcrumbs");
                assert!(chain.len() <= ids.len());
                assert!(chain[0].parent_id.is_none());
                assert_eq!(chain.last().map(|e| e.id), Some(*id));
            }
        });
    }

    #[test]
    fn prop_delete_leaves_no_dangling_parents(
        shape in forest_shape(),
        victim in any::<prop::sample::Index>(),
    ) {
        runtime().block_on(async {
            let service = EntryService::new(
                Arc::new(MemoryEntryRepository::new()),
                Arc::new(MemoryBlobStore::new()),
                1024,
            );
            let ctx = RequestContext::new(OwnerId::new());

            let mut ids: Vec<EntryId> = Vec::with_capacity(shape.len());
            let mut parents: HashMap<EntryId, Option<EntryId>> = HashMap::new();
            for (i, parent) in shape.iter().enumerate() {
                let parent_id = parent.map(|p| ids[p]);
                let entry = service
                    .create_entry(&ctx, CreateEntryRequest {
                        name: format!("n{i}"),
                        is_folder: true,
                        parent_id,
                        ..Default::default()
                    })
                    .await
                    .expect("create folder");
                parents.insert(entry.id, parent_id);
                ids.push(entry.id);
            }

            let victim = ids[victim.index(ids.len())];
            let expected: Vec<EntryId> = ids
                .iter()
                .copied()
                .filter(|id| is_self_or_descendant(&parents, *id, victim))
                .collect();

            let removed = service.delete_entry(&ctx, victim).await.expect("delete");
            assert_eq!(removed, expected.len() as u64);

            for id in &ids {
                let found = service.get_entry(&ctx, *id).await;
                if expected.contains(id) {
                    assert_eq!(found.unwrap_err().kind, ErrorKind::NotFound);
                } else {
                    let entry = found.expect("survivor");
                    if let Some(parent) = entry.parent_id {
                        assert!(service.get_entry(&ctx, parent).await.is_ok());
                    }
                }
            }
        });
    }
}
