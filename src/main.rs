//! sift - Entry point for the triage CLI

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use sift::config::Settings;
use sift::domain::{Category, MessageId, ThreadId};
use sift::providers::ai::OpenAiCompatibleProvider;
use sift::providers::mail::{GmailCredentials, GmailStore};
use sift::services::{RunMode, RunParams, TriageReport, TriageService};

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Classifies inbox threads and keeps one category label on each", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose per-thread logging.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Triage a page of inbox threads.
    Batch {
        /// Maximum number of threads to triage.
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Triage one thread, located by message id, thread id, or recency.
    Single {
        /// Message id whose thread to triage.
        #[arg(long, conflicts_with = "thread")]
        message: Option<String>,

        /// Thread id to triage.
        #[arg(long)]
        thread: Option<String>,
    },
}

impl Cli {
    fn into_params(self) -> RunParams {
        match self.command {
            None => RunParams {
                mode: RunMode::Batch,
                ..Default::default()
            },
            Some(Command::Batch { limit }) => RunParams {
                mode: RunMode::Batch,
                limit,
                ..Default::default()
            },
            Some(Command::Single { message, thread }) => RunParams {
                mode: RunMode::Single,
                message_id: message.map(MessageId::from),
                thread_id: thread.map(ThreadId::from),
                ..Default::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("loading configuration")?;

    init_logging(cli.debug || settings.debug_logging);
    tracing::info!(model = settings.ai.model.as_str(), "starting sift");

    let store = build_store(&settings)?;
    let llm = build_llm(&settings)?;
    let service = TriageService::new(store, llm, &settings.triage);

    // An unreachable store or provider means nothing can be triaged.
    service.prepare().await.context("startup checks failed")?;

    let params = cli.into_params();
    let report = service.run(&params).await.context("triage run failed")?;

    print_report(&report, &settings);
    Ok(())
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn build_store(settings: &Settings) -> anyhow::Result<Arc<GmailStore>> {
    let credentials = GmailCredentials {
        client_id: settings.gmail.client_id.clone(),
        client_secret: settings.gmail.client_secret.clone(),
        refresh_token: settings.gmail.refresh_token.clone(),
    };
    let store = GmailStore::new(credentials, settings.transport.timeout())
        .context("building mail store client")?;
    Ok(Arc::new(store))
}

fn build_llm(settings: &Settings) -> anyhow::Result<Arc<OpenAiCompatibleProvider>> {
    let client = reqwest::Client::builder()
        .timeout(settings.transport.timeout())
        .build()
        .context("building llm http client")?;

    let provider = match &settings.ai.base_url {
        Some(base_url) => OpenAiCompatibleProvider::custom(
            base_url,
            Some(settings.ai.api_key.clone()),
            &settings.ai.model,
        ),
        None => OpenAiCompatibleProvider::openai(&settings.ai.api_key, &settings.ai.model),
    }
    .with_client(client);

    Ok(Arc::new(provider))
}

fn print_report(report: &TriageReport, settings: &Settings) {
    println!();
    println!(
        "Triaged {} thread(s) in {}ms: {} labeled, {} failed, {} defaulted",
        report.processed, report.duration_ms, report.applied, report.failed, report.fallbacks
    );
    if report.processed > 0 {
        let rate = report.applied as f64 / report.processed as f64 * 100.0;
        println!("Success rate: {:.1}%", rate);
    }
    for category in Category::ALL {
        let count = report.counts.get(category);
        if count > 0 {
            println!("  {:<16} {}", settings.triage.labels.name_for(category), count);
        }
    }
    println!(
        "Settings: history threshold {} days, model {}",
        settings.triage.history_days, settings.ai.model
    );
    if !report.errors.is_empty() {
        println!("Errors:");
        for error in &report.errors {
            println!("  {}", error);
        }
    }
}
