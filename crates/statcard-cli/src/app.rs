//! Wiring: intake -> fetch -> render -> delivery.

use std::path::{Path, PathBuf};

use statcard_core::domain::{FetchRequest, GitHubStats, RenderedCard, parse_github_username};
use statcard_core::ports::{CardRenderer, StatsProvider};
use statcard_core::{QueueError, TaskHandle, TaskQueue, TaskResult, stage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use ulid::Ulid;

use crate::config::Config;
use crate::error::AppError;
use crate::github::GitHubClient;
use crate::render::HtmlCardRenderer;

/// Routing information carried with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryMeta {
    pub request_id: Ulid,
    pub username: String,
}

pub type CardResult = TaskResult<RenderedCard, DeliveryMeta>;
pub type Pipeline = TaskQueue<FetchRequest, RenderedCard, DeliveryMeta>;

/// The two stage queues and their composition.
pub struct Stages {
    pub fetcher: TaskQueue<FetchRequest, GitHubStats, DeliveryMeta>,
    pub generator: TaskQueue<GitHubStats, RenderedCard, DeliveryMeta>,
    pub pipeline: Pipeline,
}

impl Stages {
    pub fn new<S, R>(provider: S, renderer: R) -> Self
    where
        S: StatsProvider,
        R: CardRenderer,
    {
        let fetcher = stage::fetcher(provider);
        let generator = stage::generator(renderer);
        let pipeline = fetcher.pipe(&generator);
        Self {
            fetcher,
            generator,
            pipeline,
        }
    }

    /// Launch order: generator, fetcher, pipeline.
    pub fn start(&self) -> Result<(), QueueError> {
        self.generator.start()?;
        self.fetcher.start()?;
        self.pipeline.start()
    }

    /// Shutdown order: pipeline first, so its task in flight can still finish
    /// through the stages.
    pub async fn stop(&self) {
        self.pipeline.stop().await;
        self.fetcher.stop().await;
        self.generator.stop().await;
    }
}

/// Submit one line of input; `None` when it is not a GitHub username.
pub fn submit(pipeline: &Pipeline, input: &str) -> Option<TaskHandle<RenderedCard, DeliveryMeta>> {
    let Some(username) = parse_github_username(input) else {
        warn!(input, "not a GitHub username; skipped");
        println!("`{}` is not a GitHub username, skipped.", input.trim());
        return None;
    };

    let meta = DeliveryMeta {
        request_id: Ulid::new(),
        username: username.to_string(),
    };
    info!(request_id = %meta.request_id, username, "request accepted");
    println!("Fetching stats for {username}...");
    Some(pipeline.add_task(FetchRequest::new(username), meta))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Drain results until every sender is gone.
pub async fn deliver(
    mut results: mpsc::UnboundedReceiver<CardResult>,
    output_dir: PathBuf,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    while let Some(result) = results.recv().await {
        let (meta, outcome) = result.into_parts();
        let delivered = match outcome {
            Ok(card) => write_card(&output_dir, &meta, &card).await,
            Err(err) => {
                error!(request_id = %meta.request_id, username = %meta.username, error = %err, "stats generation failed");
                false
            }
        };
        if delivered {
            report.delivered += 1;
        } else {
            println!("Failed to generate stats for {}, sorry.", meta.username);
            report.failed += 1;
        }
    }
    report
}

async fn write_card(output_dir: &Path, meta: &DeliveryMeta, card: &RenderedCard) -> bool {
    let path = output_dir.join(format!("{}_stats.{}", meta.username, card.extension()));
    match tokio::fs::write(&path, &card.bytes).await {
        Ok(()) => {
            info!(request_id = %meta.request_id, path = %path.display(), "card delivered");
            println!("{}", path.display());
            true
        }
        Err(err) => {
            error!(request_id = %meta.request_id, path = %path.display(), error = %err, "cannot write card");
            false
        }
    }
}

async fn intake(config: &Config, pipeline: &Pipeline) -> Result<(), AppError> {
    let mut handles = Vec::new();
    if config.usernames.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            handles.extend(submit(pipeline, &line));
        }
    } else {
        for input in &config.usernames {
            handles.extend(submit(pipeline, input));
        }
    }

    for handle in handles {
        handle.await;
    }
    Ok(())
}

pub async fn run(config: Config) -> Result<DeliveryReport, AppError> {
    let provider = GitHubClient::new(&config)?;
    let renderer = HtmlCardRenderer::new(config.blueprint.clone());
    let stages = Stages::new(provider, renderer);

    let (results, inbox) = mpsc::unbounded_channel();
    stages.pipeline.set_consumer(move |result: &CardResult| {
        results
            .send(result.clone())
            .map_err(|_| "delivery task is gone".into())
    });
    let delivery = tokio::spawn(deliver(inbox, config.output_dir.clone()));

    stages.start()?;
    tokio::select! {
        res = intake(&config, &stages.pipeline) => res?,
        res = tokio::signal::ctrl_c() => {
            res?;
            warn!("interrupted; shutting down");
        }
    }

    stages.stop().await;
    // drops the consumer's sender so delivery ends once drained
    stages.pipeline.clear_consumer();
    let report = delivery.await?;
    info!(delivered = report.delivered, failed = report.failed, "done");
    Ok(report)
}
