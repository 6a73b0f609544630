//! Command-line interface for the dosage assistant
//!
//! Modes: `--validate-config` checks settings and exits, `--ingest` adds
//! documents to the knowledge base, `--query` answers one question. With no
//! mode flag the CLI enters an interactive session.

use anyhow::Context;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use medirag::agent::{AgentReply, AssistantAgent};
use medirag::config::AssistantConfig;
use medirag::providers::{GatewayClient, GatewayEmbedder, GatewayLlm};
use medirag::store::DocumentStore;

/// Medirag - an AI assistant to help clinicians with medication decisions
#[derive(Parser, Debug)]
#[command(name = "medirag", version, about)]
struct Args {
    /// Path to documents to ingest into the knowledge base
    #[arg(long, value_name = "PATH")]
    ingest: Option<PathBuf>,

    /// Single query to process (non-interactive mode)
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medirag=warn".into()),
        )
        .init();

    let args = Args::parse();

    // Validate configuration before anything contacts the network
    let config = match AssistantConfig::from_env().and_then(|c| {
        c.validate()?;
        Ok(c)
    }) {
        Ok(config) => {
            if args.validate_config {
                println!("{} Configuration is valid", style("✓").green());
                return Ok(());
            }
            config
        }
        Err(e) => {
            eprintln!("{} Configuration error: {}", style("✗").red(), e);
            std::process::exit(1);
        }
    };

    let assistant = Assistant::new(&config).context("failed to initialize assistant")?;

    if let Some(path) = &args.ingest {
        if let Err(e) = assistant.ingest(path).await {
            eprintln!("{} Error ingesting documents: {}", style("✗").red(), e);
            std::process::exit(1);
        }
    }

    match args.query {
        Some(question) => {
            let reply = assistant.ask(&question, "").await?;
            print_reply(&reply);
        }
        None => {
            // Only enter interactive mode when no one-shot work was requested
            if args.ingest.is_none() {
                assistant.run_interactive().await?;
            }
        }
    }

    Ok(())
}

/// CLI-side wiring of the document store and agent pipeline
struct Assistant {
    store: Arc<DocumentStore>,
    agent: AssistantAgent,
}

impl Assistant {
    fn new(config: &AssistantConfig) -> anyhow::Result<Self> {
        let gateway = Arc::new(GatewayClient::new(&config.gateway, &config.embeddings)?);
        let embedder = Arc::new(GatewayEmbedder::new(
            Arc::clone(&gateway),
            config.embeddings.dimensions,
        ));
        let llm = Arc::new(GatewayLlm::new(
            Arc::clone(&gateway),
            config.gateway.model.clone(),
        ));

        let store = Arc::new(DocumentStore::new(config, embedder)?);
        let retriever: Arc<dyn medirag::providers::ContextRetriever> = store.clone();
        let agent = AssistantAgent::new(retriever, llm, &config.retrieval);

        Ok(Self { store, agent })
    }

    async fn ingest(&self, path: &PathBuf) -> anyhow::Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .expect("valid progress template"),
        );
        spinner.set_message(format!("Ingesting {}...", path.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.store.ingest(path).await;
        spinner.finish_and_clear();

        let report = result?;
        println!(
            "{} Ingested {} chunks from {} document(s)",
            style("✓").green(),
            report.total_chunks,
            report.documents.len()
        );
        if !report.skipped.is_empty() {
            println!(
                "  {} file(s) skipped as already ingested",
                report.skipped.len()
            );
        }
        for error in &report.errors {
            println!("{} {}: {}", style("✗").red(), error.filename, error.error);
        }
        Ok(())
    }

    async fn ask(&self, question: &str, patient_info: &str) -> anyhow::Result<AgentReply> {
        Ok(self.agent.invoke(question, patient_info).await?)
    }

    async fn run_interactive(&self) -> anyhow::Result<()> {
        println!("{}", "=".repeat(60));
        println!("Medirag - Interactive Mode");
        println!("{}", "=".repeat(60));
        println!("\nI'm your medical assistant. I can help you:");
        println!("- Find appropriate medications for patient conditions");
        println!("- Recommend dosages based on patient information");
        println!("- Identify potential drug interactions");
        println!("\nType 'quit' or 'exit' to end the session.");
        println!("Type 'ingest <path>' to add documents to the knowledge base.");
        println!("{}", "-".repeat(60));

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout.write_all(b"\nDoctor: ").await?;
            stdout.flush().await?;

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };
            let input = line.trim();

            if input.is_empty() {
                continue;
            }

            if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
                println!("\nThank you for using Medirag. Goodbye!");
                break;
            }

            if let Some(path) = input.strip_prefix("ingest ") {
                if let Err(e) = self.ingest(&PathBuf::from(path.trim())).await {
                    eprintln!("{} Error ingesting documents: {}", style("✗").red(), e);
                }
                continue;
            }

            match self.ask(input, "").await {
                Ok(reply) => {
                    println!("\n{} {}", style("Assistant:").cyan().bold(), reply.answer);
                    if !reply.citations.is_empty() {
                        println!("\n{}", style("Sources:").dim());
                        for citation in &reply.citations {
                            println!("  {}", style(citation.format_inline()).dim());
                        }
                    }
                }
                Err(e) => {
                    eprintln!("\n{} {}", style("Error:").red(), e);
                    eprintln!("Please try again or type 'quit' to exit.");
                }
            }
        }

        Ok(())
    }
}

fn print_reply(reply: &AgentReply) {
    println!("{}", reply.answer);
    if !reply.citations.is_empty() {
        println!("\nSources:");
        for citation in &reply.citations {
            println!("  {}", citation.format_inline());
        }
    }
}
