//! In-process providers for driving the orchestrator in tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use convo_rag::providers::{DocumentInfo, GenerationOptions};
use convo_rag::{
    DocumentIngestion, EmbeddingProvider, GenerationProvider, Message, ProviderError, RagConfig,
    RagOrchestrator, Role, SearchIndex, SearchResult,
};

#[derive(Default)]
pub struct FakeEmbedder {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Timeout(Duration::from_secs(5)));
        }
        Ok(vec![text.len() as f32, 1.0])
    }

    fn name(&self) -> &str {
        "fake-embedder"
    }
}

#[derive(Default)]
pub struct FakeIndex {
    pub results: Mutex<Vec<SearchResult>>,
    pub fail: AtomicBool,
    pub last_top_k: AtomicUsize,
}

impl FakeIndex {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results: Mutex::new(results),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SearchIndex for FakeIndex {
    async fn query(
        &self,
        _embedding: &[f32],
        _text: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        self.last_top_k.store(top_k, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::unavailable("index offline"));
        }
        let mut results = self.results.lock().clone();
        results.truncate(top_k);
        Ok(results)
    }

    fn name(&self) -> &str {
        "fake-index"
    }
}

/// Answers "Answer to '<question>' [1]" and records every request
#[derive(Default)]
pub struct FakeGenerator {
    pub requests: Mutex<Vec<Vec<Message>>>,
    pub fail: AtomicBool,
    pub unhealthy: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
}

impl FakeGenerator {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Mutex::new(Some(delay)),
            ..Default::default()
        }
    }

    pub fn request(&self, n: usize) -> Vec<Message> {
        self.requests.lock()[n].clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

pub fn question_of(messages: &[Message]) -> String {
    let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
    last.rsplit("Question: ").next().unwrap_or_default().to_string()
}

#[async_trait]
impl GenerationProvider for FakeGenerator {
    async fn complete(
        &self,
        messages: &[Message],
        _options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        self.requests.lock().push(messages.to_vec());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                status: 503,
                body: "model overloaded".to_string(),
            });
        }

        assert_eq!(messages.last().map(|m| m.role), Some(Role::User));
        Ok(format!("Answer to '{}' [1]", question_of(messages)))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(!self.unhealthy.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        "fake-generator"
    }
}

#[derive(Default)]
pub struct FailingIngestion;

#[async_trait]
impl DocumentIngestion for FailingIngestion {
    async fn index(&self, _: &str, _: &[u8], _: &str) -> Result<(), ProviderError> {
        Err(ProviderError::NotImplemented("document indexing"))
    }

    async fn list(&self) -> Result<Vec<DocumentInfo>, ProviderError> {
        Err(ProviderError::NotImplemented("document listing"))
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        Err(ProviderError::unavailable("ingestion backend offline"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub struct Harness {
    pub embedder: Arc<FakeEmbedder>,
    pub index: Arc<FakeIndex>,
    pub generator: Arc<FakeGenerator>,
    pub orchestrator: Arc<RagOrchestrator>,
}

impl Harness {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self::with(results, FakeGenerator::default(), RagConfig::default())
    }

    pub fn with(results: Vec<SearchResult>, generator: FakeGenerator, config: RagConfig) -> Self {
        let embedder = Arc::new(FakeEmbedder::default());
        let index = Arc::new(FakeIndex::with_results(results));
        let generator = Arc::new(generator);

        let orchestrator = RagOrchestrator::builder()
            .config(config)
            .embedder(embedder.clone())
            .search_index(index.clone())
            .generator(generator.clone())
            .build()
            .expect("orchestrator");

        Self {
            embedder,
            index,
            generator,
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub async fn transcript_len(&self, id: &str) -> usize {
        self.orchestrator
            .transcript(id)
            .await
            .unwrap()
            .map(|t| t.len())
            .unwrap_or(0)
    }
}

pub fn policy_results() -> Vec<SearchResult> {
    vec![
        SearchResult::new("doc1", "Refunds are issued within 30 days of purchase.", 0.91)
            .with_title("Policy A"),
        SearchResult::new("doc2", "International orders are refunded as store credit.", 0.77)
            .with_title("Policy B"),
    ]
}
