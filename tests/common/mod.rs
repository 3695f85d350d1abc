//! Shared test fixtures: counting provider wrappers and corpus seeding.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use docent::db::SearchFilters;
use docent::types::{ChunkResult, Metadata, Result};
use docent::{EmbeddingProvider, MemoryVectorStore, VectorStore};

static TRACING: Once = Once::new();

/// Install a per-process test subscriber so `RUST_LOG` filters apply to
/// test runs and output lands in the captured test writer.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Embedding provider wrapper that counts calls, for asserting that a
/// code path never reached the provider.
pub struct CountingEmbedding<P> {
    inner: P,
    calls: AtomicUsize,
}

impl<P> CountingEmbedding<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CountingEmbedding<P> {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_query(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Vector store wrapper that counts searches.
pub struct CountingStore {
    inner: MemoryVectorStore,
    searches: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: MemoryVectorStore) -> Self {
        Self {
            inner,
            searches: AtomicUsize::new(0),
        }
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for CountingStore {
    fn provider_name(&self) -> &'static str {
        "counting-memory"
    }

    async fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
        filters: Option<&SearchFilters>,
    ) -> Result<Vec<ChunkResult>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query_vector, top_k, filters).await
    }

    async fn add_vectors(
        &self,
        chunk_ids: &[Uuid],
        vectors: &[Vec<f32>],
        metadata: &[Metadata],
    ) -> Result<()> {
        self.inner.add_vectors(chunk_ids, vectors, metadata).await
    }

    async fn delete_vectors(&self, chunk_ids: &[Uuid]) -> Result<()> {
        self.inner.delete_vectors(chunk_ids).await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

/// Index one chunk of `text` under the given document title and page,
/// using the same embedder the strategy will query with.
pub async fn seed_chunk(
    store: &dyn VectorStore,
    embedder: &dyn EmbeddingProvider,
    text: &str,
    document_title: &str,
    page: u32,
) {
    let vector = embedder
        .embed_query(text)
        .await
        .expect("embedding seed text");

    let mut metadata = Metadata::new();
    metadata.insert("content".to_string(), json!(text));
    metadata.insert("document_title".to_string(), json!(document_title));
    metadata.insert("page_number".to_string(), json!(page));
    metadata.insert("section_title".to_string(), json!(""));

    store
        .add_vectors(&[Uuid::new_v4()], &[vector], &[metadata])
        .await
        .expect("seeding vector store");
}
