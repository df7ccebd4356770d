//! Console driver: runs one session over a stream socket.
//!
//! One task owns the [`Session`] and serialises everything that can move it:
//! frames from the peer, console commands and Ctrl+C. Socket reads and writes
//! run in their own tasks and talk to it over channels, so the session itself
//! never waits on I/O.

use std::io::{self, Write};

use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::session::{Event, Role, RoundSummary, Session, SessionConfig};
use crate::transport::tcp::{read_frame, write_frame};
use crate::transport::{ChannelTransport, ConnectionState, Transport};
use crate::{Error, Result};

/// A console command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Perform the next protocol step.
    Next,
    /// Send chat text.
    Say(String),
    /// Show the session state.
    Status,
    /// Show the command list.
    Help,
    /// Leave the session.
    Quit,
    /// Anything else; carries the message to show, empty for blank input.
    Unknown(String),
}

impl Command {
    /// Parses one console line. Lines without a leading `/` are chat text.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        if input.is_empty() {
            return Command::Unknown(String::new());
        }

        if !input.starts_with('/') {
            return Command::Say(input.to_string());
        }

        let (cmd, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));

        match cmd.to_lowercase().as_str() {
            "/next" | "/n" => Command::Next,
            "/say" | "/s" if !rest.trim().is_empty() => Command::Say(rest.trim().to_string()),
            "/status" | "/st" => Command::Status,
            "/help" | "/h" | "/?" => Command::Help,
            "/quit" | "/exit" | "/q" => Command::Quit,
            _ => Command::Unknown(format!(
                "Unknown command: {cmd}. Type /help for available commands."
            )),
        }
    }
}

/// Writes `text` to stdout in `color`.
pub fn print_colored(color: Color, text: &str) {
    let mut stdout = io::stdout();
    execute!(stdout, SetForegroundColor(color), Print(text), ResetColor).ok();
    stdout.flush().ok();
}

/// Like [`print_colored`], followed by a newline.
pub fn println_colored(color: Color, text: &str) {
    print_colored(color, text);
    println!();
}

/// Prints a boxed title line.
pub fn display_banner(title: &str) {
    let rule = format!("+{}+", "-".repeat(57));
    println!();
    println_colored(Color::Cyan, &rule);
    println_colored(Color::Cyan, &format!("|{title:^57}|"));
    println_colored(Color::Cyan, &rule);
    println!();
}

/// Prints the command list.
pub fn display_help() {
    println!();
    println_colored(Color::Yellow, "Available Commands:");
    println!();
    println!("  /next                - Perform the next protocol step");
    println!("  /say <text>          - Send a chat message (or type without '/')");
    println!("  /status              - Show role, round and verdicts");
    println!("  /help                - Show this help message");
    println!("  /quit or /exit       - Leave the session");
    println!();
}

fn display_status<T: Transport>(session: &Session<T>) {
    let summary = session.summary();
    println!();
    println_colored(Color::Cyan, "Session Status:");
    println_colored(Color::White, &format!("  Role: {}", session.role()));
    println_colored(
        Color::White,
        &format!("  Peer: {}", session.remote_identity().unwrap_or("unknown")),
    );
    if let Some(n) = session.modulus() {
        println_colored(Color::White, &format!("  N = {n}"));
    }
    if let Some(state) = session.prover_state() {
        println_colored(Color::White, &format!("  Prover state: {state}"));
    }
    if let Some(state) = session.verifier_state() {
        println_colored(Color::White, &format!("  Verifier state: {state}"));
    }
    println_colored(Color::White, &format!("  Round: {}", session.round()));
    println_colored(
        Color::White,
        &format!(
            "  Accepted: {}/{}",
            summary.accepted, summary.completed
        ),
    );
    println!();
}

fn report(peer: &str, events: &[Event]) {
    for event in events {
        match event {
            Event::Sent(step) => println_colored(Color::Green, &format!("Me: sent {step}")),
            Event::Received(step) => println_colored(Color::Cyan, &format!("{peer}: sent {step}")),
            Event::WaitingOnPeer(step) => {
                println_colored(Color::Yellow, &format!("Me: Waiting for {peer} ({step})..."))
            }
            Event::Verdict { round, accepted } => {
                let (color, verdict) = if *accepted {
                    (Color::Green, "accepted")
                } else {
                    (Color::Red, "rejected")
                };
                println_colored(color, &format!("Round {round}: {verdict}"));
            }
            Event::Text(text) => println_colored(Color::White, &format!("{peer}: {text}")),
            Event::RoundLimitReached => {
                println_colored(Color::Yellow, "All configured rounds have been played")
            }
        }
    }
}

fn report_error(err: &Error) {
    println_colored(Color::Red, &format!("Error: {err}"));
}

/// Runs a session in `role` over `stream` until the user quits, the peer
/// disconnects, or (with `auto_advance`) the configured rounds are done.
///
/// `commands` supplies console lines; at end of input the session keeps
/// running on peer frames alone.
pub async fn run<S, C>(
    role: Role,
    stream: S,
    peer: String,
    config: SessionConfig,
    commands: C,
) -> Result<RoundSummary>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
    C: AsyncBufRead + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);

    let (transport, mut outbound) = ChannelTransport::new();
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(e) = write_frame(&mut writer, &frame).await {
                warn!("failed to write frame: {e}");
                break;
            }
        }
        writer.shutdown().await.ok();
    });

    let (inbound_tx, mut inbound) = mpsc::unbounded_channel();
    let reader_task = tokio::spawn(async move {
        loop {
            let frame = read_frame(&mut reader).await;
            let last = !matches!(frame, Ok(Some(_)));
            if inbound_tx.send(frame).is_err() || last {
                break;
            }
        }
    });

    let mut session = Session::new(role, config, transport);
    session.on_connection_state_changed(ConnectionState::Connecting)?;
    session.on_connection_state_changed(ConnectionState::Connected)?;
    session.set_remote_identity(peer.clone());
    info!(%role, %peer, "connected");
    println_colored(Color::Green, &format!("Connected to {peer} as {role}"));

    if session.config().auto_advance {
        match session.drive() {
            Ok(events) => report(&peer, &events),
            Err(e) => report_error(&e),
        }
    }

    let mut lines = commands.lines();
    let mut commands_open = true;

    let outcome = loop {
        if finished(&session) {
            break Ok(());
        }

        tokio::select! {
            frame = inbound.recv() => match frame {
                Some(Ok(Some(bytes))) => match session.on_frame_received(&bytes) {
                    Ok(events) => report(&peer, &events),
                    Err(e) => report_error(&e),
                },
                Some(Ok(None)) | None => {
                    info!(%peer, "peer closed the connection");
                    println_colored(Color::Yellow, &format!("{peer} disconnected"));
                    break Ok(());
                }
                Some(Err(e)) => break Err(e.into()),
            },
            line = lines.next_line(), if commands_open => match line {
                Ok(Some(line)) => match Command::parse(&line) {
                    Command::Next => match session.on_local_advance() {
                        Ok(event) => report(&peer, &[event]),
                        Err(e) => report_error(&e),
                    },
                    Command::Say(text) => {
                        if let Err(e) = session.send_text(&text) {
                            report_error(&e);
                        }
                    }
                    Command::Status => display_status(&session),
                    Command::Help => display_help(),
                    Command::Quit => break Ok(()),
                    Command::Unknown(msg) => {
                        if !msg.is_empty() {
                            println_colored(Color::Red, &msg);
                        }
                    }
                },
                Ok(None) => commands_open = false,
                Err(e) => {
                    warn!("console input failed: {e}");
                    commands_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C signal");
                break Ok(());
            }
        }
    };

    let summary = session.summary();
    session.on_connection_state_changed(ConnectionState::None)?;
    drop(session);

    writer_task.await.ok();
    reader_task.abort();

    outcome.map(|()| summary)
}

fn finished<T: Transport>(session: &Session<T>) -> bool {
    let config = session.config();
    config.auto_advance
        && config
            .rounds
            .is_some_and(|rounds| session.summary().completed >= rounds)
}
