//! A terminal front-end for the movli assistant.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use movli::core::{Snapshot, SubmitOutcome};
use movli::http::ApiConfigBuilder;
use movli::{SessionBuilder, StaticTokenProvider};
use movli_model::{Message, Role};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(tokens) = StaticTokenProvider::from_env() else {
        eprintln!("MOVLI_USER_ID and MOVLI_ID_TOKEN must be set");
        return;
    };
    let mut config = ApiConfigBuilder::new();
    if let Ok(base_url) = env::var("MOVLI_API_BASE_URL") {
        config = config.with_base_url(base_url);
    }

    let (change_tx, mut change_rx) = mpsc::unbounded_channel();
    let session = SessionBuilder::with_token_provider(tokens.clone())
        .with_config(config.build())
        .with_identity_updates(tokens.subscribe())
        .on_change(move |snapshot| {
            change_tx.send(snapshot.clone()).ok();
        })
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let mut shown = Vec::new();

    let Some(snapshot) = wait_until_settled(
        &mut change_rx,
        &progress_style,
        "📼 Loading your history...",
    )
    .await
    else {
        return;
    };
    render(&snapshot, &mut shown, true);

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        // Anything left over belongs to changes we have already rendered.
        while change_rx.try_recv().is_ok() {}

        let Ok(current) = session.snapshot().await else {
            break;
        };
        let (waiting_msg, full) = match line.trim() {
            "/quit" => break,
            "/history" => {
                render(&current, &mut shown, true);
                continue;
            }
            "/logout" if current.identity.is_some() => {
                tokens.sign_out();
                ("👋 Signing out...", true)
            }
            "/login" if current.identity.is_none() => {
                tokens.sign_in();
                ("📼 Loading your history...", true)
            }
            "/logout" | "/login" => {
                println!("{}", "Nothing to do.".dimmed());
                continue;
            }
            input => match session.send_message(input).await {
                Ok(SubmitOutcome::Accepted) => ("🍿 Thinking...", false),
                Ok(SubmitOutcome::EmptyInput) => continue,
                Ok(SubmitOutcome::Busy) => {
                    println!("{}", "Still waiting for a reply.".dimmed());
                    continue;
                }
                Ok(SubmitOutcome::NoIdentity) => {
                    println!("{}", movli::SIGNED_OUT_HINT.yellow());
                    continue;
                }
                Err(err) => {
                    error!("session stopped: {err}");
                    break;
                }
            },
        };

        let Some(snapshot) =
            wait_until_settled(&mut change_rx, &progress_style, waiting_msg)
                .await
        else {
            break;
        };
        render(&snapshot, &mut shown, full);
    }
}

/// Waits for the first change after which no request is outstanding.
async fn wait_until_settled(
    change_rx: &mut mpsc::UnboundedReceiver<Snapshot>,
    progress_style: &ProgressStyle,
    message: &'static str,
) -> Option<Snapshot> {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(progress_style.clone());
    progress_bar.set_message(message);

    let snapshot = loop {
        progress_bar.inc(1);
        let tick = sleep(Duration::from_millis(100));
        select! {
            snapshot = change_rx.recv() => {
                let snapshot = snapshot?;
                if !snapshot.pending {
                    break snapshot;
                }
            }
            _ = tick => {}
        }
    };
    progress_bar.finish_and_clear();
    Some(snapshot)
}

/// Prints the messages added since the last render, or the whole
/// conversation if `full` is set or it was replaced meanwhile. Messages
/// the user just typed are not echoed back.
fn render(snapshot: &Snapshot, shown: &mut Vec<Message>, full: bool) {
    if let Some(hint) = movli::empty_state(snapshot) {
        println!("{}", hint.yellow());
        shown.clear();
        return;
    }

    if full || !snapshot.messages.starts_with(shown.as_slice()) {
        snapshot.messages.iter().for_each(print_message);
    } else {
        snapshot.messages[shown.len()..]
            .iter()
            .filter(|msg| msg.role == Role::Assistant)
            .for_each(print_message);
    }
    *shown = snapshot.messages.clone();
}

fn print_message(msg: &Message) {
    match msg.role {
        Role::User => {
            println!("{}🙂 {}", BAR_CHAR.bright_green(), msg.content)
        }
        Role::Assistant => println!(
            "{}🤖 {}",
            BAR_CHAR.bright_cyan(),
            msg.content.bright_white()
        ),
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
