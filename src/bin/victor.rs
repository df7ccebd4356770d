use clap::Parser;
use crossterm::style::Color;
use feige_fiat_shamir::runner::{self, display_banner, display_help, println_colored};
use feige_fiat_shamir::{Role, SessionConfig};
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "victor")]
#[command(about = "Feige-Fiat-Shamir verifier: challenges a prover over TCP", long_about = None)]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, env = "VICTOR_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "VICTOR_PORT", default_value = "7878")]
    port: u16,

    /// Answer rounds without waiting for /next
    #[arg(long)]
    auto: bool,

    /// Stop after this many rounds
    #[arg(long)]
    rounds: Option<u64>,

    /// Expected size of the prover's basis
    #[arg(long)]
    basis_len: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    display_banner("Feige-Fiat-Shamir Verifier (Victor)");

    let mut config = SessionConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        SessionConfig::default()
    });
    if args.auto {
        config.auto_advance = true;
    }
    if let Some(rounds) = args.rounds {
        config.rounds = Some(rounds);
    }
    if let Some(len) = args.basis_len {
        config.basis_len = len;
    }

    if let Err(e) = config.validate() {
        println_colored(Color::Red, &format!("Configuration validation failed: {e}"));
        return Err(format!("Invalid configuration: {e}").into());
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");
    println_colored(Color::Yellow, &format!("Waiting for a prover on {addr}..."));

    let (stream, peer) = listener.accept().await?;
    drop(listener);

    if !config.auto_advance {
        display_help();
    }

    let summary = runner::run(
        Role::Verifier,
        stream,
        peer.to_string(),
        config,
        BufReader::new(tokio::io::stdin()),
    )
    .await?;

    if summary.identified() {
        println_colored(
            Color::Green,
            &format!("Prover identified after {} rounds", summary.completed),
        );
    } else {
        println_colored(
            Color::Red,
            &format!(
                "Prover not identified ({}/{} rounds accepted)",
                summary.accepted, summary.completed
            ),
        );
    }
    Ok(())
}
