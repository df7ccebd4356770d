use clap::Parser;
use crossterm::style::Color;
use feige_fiat_shamir::runner::{self, display_banner, display_help, println_colored};
use feige_fiat_shamir::{Role, SessionConfig};
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "peggy")]
#[command(about = "Feige-Fiat-Shamir prover: proves knowledge of a secret basis", long_about = None)]
#[command(version)]
struct Args {
    /// Verifier host to connect to
    #[arg(short = 'H', long, env = "PEGGY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Verifier port
    #[arg(short, long, env = "PEGGY_PORT", default_value = "7878")]
    port: u16,

    /// Play rounds without waiting for /next
    #[arg(long)]
    auto: bool,

    /// Stop after this many rounds
    #[arg(long)]
    rounds: Option<u64>,

    /// Bit length of each prime factor of N
    #[arg(long)]
    prime_bits: Option<u64>,

    /// Size of the secret basis
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

    display_banner("Feige-Fiat-Shamir Prover (Peggy)");

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
    if let Some(bits) = args.prime_bits {
        config.prime_bits = bits;
    }
    if let Some(len) = args.basis_len {
        config.basis_len = len;
    }

    if let Err(e) = config.validate() {
        println_colored(Color::Red, &format!("Configuration validation failed: {e}"));
        return Err(format!("Invalid configuration: {e}").into());
    }

    let addr = format!("{}:{}", args.host, args.port);
    info!("Connecting to verifier at {addr}");
    let stream = TcpStream::connect(&addr).await?;
    let peer = stream.peer_addr()?.to_string();

    if !config.auto_advance {
        display_help();
    }

    let summary = runner::run(
        Role::Prover,
        stream,
        peer,
        config,
        BufReader::new(tokio::io::stdin()),
    )
    .await?;

    println_colored(
        Color::Cyan,
        &format!(
            "Rounds accepted: {}/{}",
            summary.accepted, summary.completed
        ),
    );
    Ok(())
}
