//! Vector store contract tests against the in-memory backend.

use serde_json::json;
use uuid::Uuid;

use docent::types::Metadata;
use docent::{AppError, MemoryVectorStore, VectorStore};

fn meta(content: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("content".to_string(), json!(content));
    metadata
}

#[tokio::test]
async fn known_cosine_ordering() {
    let store = MemoryVectorStore::new();
    let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

    // #1 is orthogonal to the query, #2 identical, #3 close.
    store
        .add_vectors(
            &ids,
            &[
                vec![0.0, 1.0, 0.0, 0.0],
                vec![0.6, 0.0, 0.8, 0.0],
                vec![0.6, 0.1, 0.79, 0.0],
            ],
            &[meta("one"), meta("two"), meta("three")],
        )
        .await
        .unwrap();

    let results = store
        .search(&[0.6, 0.0, 0.8, 0.0], 2, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk_id, ids[1]);
    assert!((results[0].score - 1.0).abs() < 1e-5);
    assert_eq!(results[1].chunk_id, ids[2]);
}

#[tokio::test]
async fn mismatched_argument_lengths_are_invalid() {
    let store = MemoryVectorStore::new();
    let result = store
        .add_vectors(
            &[Uuid::new_v4(), Uuid::new_v4()],
            &[vec![0.1, 0.2]],
            &[Metadata::new(), Metadata::new()],
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn dimension_is_sticky_across_inserts_and_queries() {
    let store = MemoryVectorStore::new();
    store
        .add_vectors(&[Uuid::new_v4()], &[vec![0.0; 8]], &[meta("a")])
        .await
        .unwrap();

    let insert = store
        .add_vectors(&[Uuid::new_v4()], &[vec![0.0; 4]], &[meta("b")])
        .await;
    assert!(matches!(insert, Err(AppError::DimensionMismatch(_))));

    let query = store.search(&[0.0; 4], 1, None).await;
    assert!(matches!(query, Err(AppError::DimensionMismatch(_))));
}

#[tokio::test]
async fn scores_are_non_increasing_and_bounded_by_count() {
    let store = MemoryVectorStore::new();
    let vectors: Vec<Vec<f32>> = (0..6)
        .map(|i| {
            let angle = i as f32 * 0.3;
            vec![angle.cos(), angle.sin()]
        })
        .collect();
    let ids: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();
    let metadata: Vec<Metadata> = (0..6).map(|i| meta(&format!("v{}", i))).collect();
    store.add_vectors(&ids, &vectors, &metadata).await.unwrap();

    let results = store.search(&[1.0, 0.0], 10, None).await.unwrap();
    assert_eq!(results.len(), 6);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let capped = store.search(&[1.0, 0.0], 4, None).await.unwrap();
    assert_eq!(capped.len(), 4);
}
