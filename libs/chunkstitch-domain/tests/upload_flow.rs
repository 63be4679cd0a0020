//! End-to-end upload flow tests: chunks go in through the ChunkStore and
//! come back out of the ReassemblyEngine as one ordered artifact.

use std::sync::Arc;

use tempfile::TempDir;

use chunkstitch_domain::upload::{ChunkStore, ReassemblyEngine, StorageLayout, UploadError};

fn scratch_layout(dir: &TempDir) -> StorageLayout {
    StorageLayout::new(dir.path().join("temp"), dir.path().join("uploads"))
}

#[tokio::test]
async fn ingest_then_merge_produces_ordered_artifact() {
    let dir = TempDir::new().unwrap();
    let layout = scratch_layout(&dir);
    let store = ChunkStore::new(layout.clone());
    let engine = ReassemblyEngine::new(layout.clone());

    store.ingest("demo.bin", 0, &b"AB"[..]).await.unwrap();
    store.ingest("demo.bin", 1, &b"CD"[..]).await.unwrap();
    store.ingest("demo.bin", 2, &b"EF"[..]).await.unwrap();

    engine.merge("demo.bin", 3).await.unwrap();

    let artifact = std::fs::read(layout.artifact_path("demo.bin")).unwrap();
    assert_eq!(artifact, b"ABCDEF");

    // No demo.bin.part* files remain in temporary storage.
    let leftovers = std::fs::read_dir(layout.temp_dir())
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn ingest_order_does_not_matter() {
    let dir = TempDir::new().unwrap();
    let layout = scratch_layout(&dir);
    let store = ChunkStore::new(layout.clone());
    let engine = ReassemblyEngine::new(layout.clone());

    // Index 1 arrives before index 0.
    store.ingest("swap.bin", 1, &b"second"[..]).await.unwrap();
    store.ingest("swap.bin", 0, &b"first-"[..]).await.unwrap();

    engine.merge("swap.bin", 2).await.unwrap();

    let artifact = std::fs::read(layout.artifact_path("swap.bin")).unwrap();
    assert_eq!(artifact, b"first-second");
}

#[tokio::test]
async fn latest_reingest_wins() {
    let dir = TempDir::new().unwrap();
    let layout = scratch_layout(&dir);
    let store = ChunkStore::new(layout.clone());
    let engine = ReassemblyEngine::new(layout.clone());

    store.ingest("retry.bin", 0, &b"garbled"[..]).await.unwrap();
    store.ingest("retry.bin", 1, &b"-tail"[..]).await.unwrap();
    // Client retries chunk 0 before merging.
    store.ingest("retry.bin", 0, &b"head"[..]).await.unwrap();

    engine.merge("retry.bin", 2).await.unwrap();

    let artifact = std::fs::read(layout.artifact_path("retry.bin")).unwrap();
    assert_eq!(artifact, b"head-tail");
}

#[tokio::test]
async fn merge_with_never_ingested_index_fails() {
    let dir = TempDir::new().unwrap();
    let layout = scratch_layout(&dir);
    let store = ChunkStore::new(layout.clone());
    let engine = ReassemblyEngine::new(layout);

    store.ingest("gap.bin", 0, &b"AA"[..]).await.unwrap();
    store.ingest("gap.bin", 2, &b"CC"[..]).await.unwrap();

    let result = engine.merge("gap.bin", 3).await;
    assert!(matches!(result, Err(UploadError::MissingChunk { index: 1 })));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_ingests_across_artifacts_do_not_interfere() {
    let dir = TempDir::new().unwrap();
    let layout = scratch_layout(&dir);
    let store = Arc::new(ChunkStore::new(layout.clone()));
    let engine = ReassemblyEngine::new(layout.clone());

    let mut handles = Vec::new();
    for artifact in ["one.bin", "two.bin", "three.bin"] {
        for index in 0..4u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let payload = format!("{}:{};", artifact, index).into_bytes();
                store.ingest(artifact, index, &payload[..]).await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    engine.merge("two.bin", 4).await.unwrap();

    let artifact = std::fs::read(layout.artifact_path("two.bin")).unwrap();
    assert_eq!(artifact, b"two.bin:0;two.bin:1;two.bin:2;two.bin:3;");
}

#[tokio::test]
async fn merge_output_spanning_many_chunks_is_exact() {
    let dir = TempDir::new().unwrap();
    let layout = scratch_layout(&dir);
    let store = ChunkStore::new(layout.clone());
    let engine = ReassemblyEngine::new(layout.clone());

    let total = 32u64;
    let mut expected = Vec::new();
    for index in 0..total {
        let payload = vec![index as u8; 100 + index as usize];
        expected.extend_from_slice(&payload);
        store.ingest("wide.bin", index, &payload[..]).await.unwrap();
    }

    engine.merge("wide.bin", total).await.unwrap();

    let artifact = std::fs::read(layout.artifact_path("wide.bin")).unwrap();
    assert_eq!(artifact, expected);
}
