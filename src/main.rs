//! WayChat - a terminal chat client for an OpenAI-compatible endpoint
//!
//! Keeps a short rolling conversation in SQLite, sends it with every
//! message and renders labelled replies.

mod config;
mod db;
mod format;
mod history;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;
mod terminal;

use config::{ChatConfig, MISSING_KEY_STATUS};
use db::Database;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use history::HistoryStore;
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::{Finished, LlmClient, Presenter, ProductionRuntime, ServiceLlmClient, Session};
use std::io::IsTerminal;
use std::sync::Arc;
use terminal::{Input, TerminalPresenter, HELP};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Runtime = ProductionRuntime<TerminalPresenter<std::io::Stdout>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waychat=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env()?;

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let service = OpenAIService::new(
        config.api_key.clone(),
        &config.base_url,
        config.model.clone(),
        config.dialect,
    )?;
    let endpoint = service.endpoint().to_string();
    let service: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(service)));

    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let history = HistoryStore::new(db);
    let mut session = Session::init(&history);
    let mut runtime: Runtime = Runtime::new(
        history,
        ServiceLlmClient::new(service),
        TerminalPresenter::new(stdout, color),
        config.model.clone(),
        config.trim_policy,
    );

    let llm = runtime.llm_client();
    tracing::info!(
        model = llm.model_id(),
        endpoint = %endpoint,
        trim = ?config.trim_policy,
        turns = session.conversation().len(),
        "Chat client initialized"
    );

    runtime.replay(&session);
    if config.has_api_key() {
        runtime.presenter_mut().show_status("Ready", false);
    } else {
        tracing::warn!("OPENAI_API_KEY not set; requests will be rejected");
        runtime.presenter_mut().show_status(MISSING_KEY_STATUS, true);
    }
    runtime.presenter_mut().reset_input();

    run(&mut runtime, &mut session).await?;
    Ok(())
}

/// Read lines until EOF or `/quit`, keeping any number of requests in flight
async fn run(runtime: &mut Runtime, session: &mut Session) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: FuturesUnordered<BoxFuture<'static, Finished>> = FuturesUnordered::new();

    loop {
        tokio::select! {
            Some(finished) = pending.next(), if !pending.is_empty() => {
                runtime.finish(session, finished);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Input::parse(&line) {
                    Input::Quit => break,
                    Input::Message(text) => match runtime.submit(session, &text) {
                        Some(in_flight) => {
                            let llm = runtime.llm_client();
                            pending.push(async move { in_flight.run(llm.as_ref()).await }.boxed());
                        }
                        None => runtime.presenter_mut().reset_input(),
                    },
                    input => handle_command(runtime.presenter_mut(), input),
                }
            }
        }
    }

    // Let outstanding replies land before exiting
    while let Some(finished) = pending.next().await {
        runtime.finish(session, finished);
    }
    Ok(())
}

fn handle_command<W: std::io::Write>(presenter: &mut TerminalPresenter<W>, input: Input) {
    match input {
        Input::SetTemperature(Some(temperature)) => {
            presenter.set_temperature(temperature);
            let applied = presenter.controls().temperature;
            presenter.notice(&format!("Temperature set to {applied}"));
        }
        Input::SetTemperature(None) => {
            presenter.show_status("Temperature must be a number from 0 to 2", true);
        }
        Input::SetMaxOutputTokens(Some(max)) => {
            presenter.set_max_output_tokens(max);
            presenter.notice(&format!("Max output tokens set to {max}"));
        }
        Input::SetMaxOutputTokens(None) => {
            presenter.show_status("Max tokens must be a positive whole number", true);
        }
        Input::Help => presenter.notice(HELP),
        Input::Message(_) | Input::Quit => {}
    }
    presenter.reset_input();
}
