//! Interactive grounded chat against a local corpus and Ollama
//!
//! Run with: cargo run -p convo-rag --features cli -- --corpus docs.json

use anyhow::Context;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convo_rag::providers::{LocalSearchIndex, OllamaClient, OllamaEmbedder, OllamaGenerator};
use convo_rag::{ChatResult, RagConfig, RagOrchestrator};

#[derive(Debug, Parser)]
#[command(name = "convo-rag", version, about = "Grounded, cited chat over a document corpus")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON array of documents ({id, title?, content, embedding?})
    #[arg(long)]
    corpus: PathBuf,

    /// Continue an existing conversation
    #[arg(long)]
    conversation: Option<String>,

    /// Ask a single question and exit
    #[arg(short, long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "convo_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RagConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RagConfig::default(),
    };
    config.apply_env_overrides()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Ollama: {}", config.ollama.base_url);
    tracing::info!("  - Embedding model: {}", config.ollama.embed_model);
    tracing::info!("  - Chat model: {}", config.ollama.chat_model);
    tracing::info!("  - Top-k: {}", config.retrieval.top_k);

    let client = Arc::new(OllamaClient::new(&config.ollama)?);
    let embedder = Arc::new(OllamaEmbedder::from_client(Arc::clone(&client)));
    let generator = Arc::new(OllamaGenerator::from_client(client));

    let index = Arc::new(LocalSearchIndex::new(config.retrieval.hybrid_alpha));
    index
        .load_json(&args.corpus, embedder.as_ref())
        .await
        .with_context(|| format!("loading corpus from {}", args.corpus.display()))?;

    let orchestrator = RagOrchestrator::builder()
        .config(config)
        .embedder(embedder)
        .search_index(index)
        .generator(generator)
        .build()?;

    let health = orchestrator.health().await;
    if !health.healthy {
        tracing::warn!("Some providers are not healthy; answers may fail");
    }

    let mut conversation = args.conversation;

    if let Some(query) = args.query {
        let result = orchestrator.chat(&query, conversation.as_deref()).await?;
        print_result(&result);
        return Ok(());
    }

    println!("Type a question, or an empty line to quit.\n");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }

        match orchestrator.chat(line.trim(), conversation.as_deref()).await {
            Ok(result) => {
                print_result(&result);
                conversation = Some(result.conversation_id);
            }
            Err(e) if e.is_retryable() => eprintln!("error (safe to retry): {}", e),
            Err(e) => eprintln!("error: {}", e),
        }
    }

    Ok(())
}

fn print_result(result: &ChatResult) {
    println!("\n{}\n", result.answer);
    if !result.citations.is_empty() {
        println!("Sources:");
        for citation in &result.citations {
            let marker = if result.referenced.contains(&citation.index) { "*" } else { " " };
            println!(" {} {}  ({})", marker, citation.format_inline(), citation.source_id);
        }
    }
    println!("\nconversation: {}\n", result.conversation_id);
}
