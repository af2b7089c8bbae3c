//! Terminal panel for one overview run.
//!
//! Shows the intro, starts generation, spins while loading and prints the
//! final display. Ctrl-C dismisses the panel at any point: the orchestrator
//! is reset and whatever the in-flight request returns is ignored.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use repoview::generator::OverviewGenerator;
use repoview::overview::{GenerationState, Orchestrator};
use repoview::present::{DisplayPayload, Formatting, render};
use repoview::source::RepositorySource;
use repoview::tree::TreeNode;
use tokio::sync::oneshot;
use tracing::{debug, instrument};

/// How the panel was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Finished(GenerationState),
    Dismissed,
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn show(payload: &DisplayPayload) {
    match payload {
        DisplayPayload::Error { .. } => eprintln!("{payload}"),
        _ => println!("{payload}"),
    }
}

fn dismiss<S, G>(orchestrator: &Orchestrator<S, G>, formatting: &Formatting) -> Outcome
where
    S: RepositorySource + 'static,
    G: OverviewGenerator + 'static,
{
    orchestrator.reset();
    println!();
    show(&render(&orchestrator.state(), formatting));
    Outcome::Dismissed
}

/// Wait for Enter. Returns false if the user pressed Ctrl-C instead.
///
/// Stdin is read on a detached thread so a pending read never holds up
/// runtime shutdown after a dismissal.
async fn confirm_start() -> anyhow::Result<bool> {
    println!("\nPress Enter to generate, Ctrl-C to dismiss.");
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = tx.send(std::io::stdin().read_line(&mut line).map(|_| ()));
    });
    tokio::select! {
        read = rx => {
            read??;
            Ok(true)
        }
        _ = tokio::signal::ctrl_c() => Ok(false),
    }
}

#[instrument(skip_all, fields(source = %orchestrator.source().describe()))]
pub async fn run<S, G>(
    orchestrator: &Orchestrator<S, G>,
    tree: TreeNode,
    formatting: &Formatting,
    confirm: bool,
) -> anyhow::Result<Outcome>
where
    S: RepositorySource + 'static,
    G: OverviewGenerator + 'static,
{
    show(&render(&orchestrator.state(), formatting));
    if confirm && !confirm_start().await? {
        return Ok(dismiss(orchestrator, formatting));
    }

    let mut states = orchestrator.subscribe();
    let Some(handle) = orchestrator.start(tree) else {
        return Ok(Outcome::Finished(orchestrator.state()));
    };

    let mut busy: Option<ProgressBar> = None;
    loop {
        let state = states.borrow_and_update().clone();
        match &state {
            GenerationState::Loading => {
                if busy.is_none() {
                    if let DisplayPayload::Busy { message } = render(&state, formatting) {
                        busy = Some(spinner(&message)?);
                    }
                }
            }
            GenerationState::Idle => {
                debug!("Panel reset while waiting");
                if let Some(spinner) = busy.take() {
                    spinner.finish_and_clear();
                }
                return Ok(Outcome::Dismissed);
            }
            GenerationState::Success(_) | GenerationState::Failure(_) => {
                if let Some(spinner) = busy.take() {
                    spinner.finish_and_clear();
                }
                println!();
                show(&render(&state, formatting));
                handle.await?;
                return Ok(Outcome::Finished(state));
            }
        }

        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(Outcome::Finished(orchestrator.state()));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(spinner) = busy.take() {
                    spinner.finish_and_clear();
                }
                return Ok(dismiss(orchestrator, formatting));
            }
        }
    }
}
