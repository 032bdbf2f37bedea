mod cli;
mod command;
mod render;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser as _;
use genui_core::observability::init_observability;
use genui_core::prelude::*;
use genui_core::remote::RemoteConfig;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{debug, warn};

use crate::cli::Args;
use crate::command::{Command, HELP};
use crate::render::Renderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_observability(&args.log_level);

    let agent = build_agent(&args).await?;
    match args.prompt.as_deref() {
        Some(prompt) => {
            let mut input = TurnInput::new(prompt);
            if let Some(path) = &args.file {
                input = input.file(FileAttachment::from_path(path).await?);
            }
            run_turn(&agent, input).await?;
        }
        None => repl(&agent).await?,
    }
    Ok(())
}

async fn build_agent(args: &Args) -> anyhow::Result<Agent> {
    if let Some(path) = &args.replay {
        return replay_agent(path).await;
    }
    let mut config = RemoteConfig::from_env()?;
    if let Some(url) = &args.url {
        config = config.url(url.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config = config.timeout(Duration::from_secs(secs));
    }
    debug!(url = %config.url, timeout = ?config.timeout, "connecting to remote agent");
    Ok(Agent::remote(config)?)
}

async fn replay_agent(path: &Path) -> anyhow::Result<Agent> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read replay file {}", path.display()))?;
    let source = ReplaySource::from_jsonl(path.display().to_string(), &text)?;
    Ok(Agent::builder().source(Arc::new(source)).build()?)
}

/// Runs one turn, rendering its UI live. Returns `None` when the turn failed
/// or was aborted; the failure has already been reported.
async fn run_turn(agent: &Agent, input: TurnInput) -> anyhow::Result<Option<TurnOutcome>> {
    let mut turn = agent.submit(input)?;
    let abort = turn.abort_handle();
    let mut renderer = Renderer::new(std::io::stdout());

    loop {
        tokio::select! {
            update = turn.ui().next_update() => match update {
                Some(update) => renderer.render(&update)?,
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                eprintln!("\naborting turn...");
                abort.abort();
            }
        }
    }
    renderer.finish()?;

    match turn.finish().await {
        Ok(outcome) => Ok(Some(outcome)),
        Err(GenUiError::TurnFailed(TurnFailure::Cancelled)) => {
            eprintln!("turn cancelled");
            Ok(None)
        }
        Err(GenUiError::TurnFailed(failure)) => {
            eprintln!("turn failed: {failure}");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

async fn repl(agent: &Agent) -> anyhow::Result<()> {
    println!("genui-chat connected to {}. Type /help for commands.", agent.endpoint());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history = ChatHistory::default();
    let mut staged: Option<FileAttachment> = None;

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Unknown(raw) => eprintln!("unknown command {raw:?}; try /help"),
            Command::History => println!("{}", serde_json::to_string_pretty(&history)?),
            Command::Attach(path) => match FileAttachment::from_path(&path).await {
                Ok(file) => {
                    println!("attached {} ({})", path.display(), file.extension);
                    staged = Some(file);
                }
                Err(err) => eprintln!("{err}"),
            },
            Command::Message(message) => {
                let mut input = TurnInput::new(message).history(history.clone());
                if let Some(file) = staged.take() {
                    input = input.file(file);
                }
                match run_turn(agent, input).await {
                    Ok(Some(outcome)) => history = outcome.history,
                    Ok(None) => {}
                    Err(err) => {
                        warn!(error = %err, "turn could not be run");
                        eprintln!("error: {err:#}");
                    }
                }
            }
        }
    }
    Ok(())
}
