use feige_fiat_shamir::runner;
use feige_fiat_shamir::{Role, RoundSummary, SessionConfig};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

#[tokio::test]
async fn auto_sessions_identify_the_prover_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = SessionConfig {
        auto_advance: true,
        rounds: Some(3),
        ..SessionConfig::default()
    };

    let victor_config = config.clone();
    let victor = tokio::spawn(async move {
        let (stream, peer) = listener.accept().await.unwrap();
        runner::run(
            Role::Verifier,
            stream,
            peer.to_string(),
            victor_config,
            BufReader::new(tokio::io::empty()),
        )
        .await
    });

    let stream = TcpStream::connect(addr).await.unwrap();
    let peggy = runner::run(
        Role::Prover,
        stream,
        addr.to_string(),
        config,
        BufReader::new(tokio::io::empty()),
    )
    .await
    .unwrap();
    let victor = victor.await.unwrap().unwrap();

    let expected = RoundSummary {
        completed: 3,
        accepted: 3,
        last_verdict: Some(true),
    };
    assert_eq!(peggy, expected);
    assert_eq!(victor, expected);
}

#[tokio::test]
async fn quitting_ends_both_sides() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let victor = tokio::spawn(async move {
        let (stream, peer) = listener.accept().await.unwrap();
        runner::run(
            Role::Verifier,
            stream,
            peer.to_string(),
            SessionConfig::default(),
            BufReader::new(tokio::io::empty()),
        )
        .await
    });

    let stream = TcpStream::connect(addr).await.unwrap();
    let commands: &[u8] = b"hello victor\n/status\n/quit\n";
    let peggy = runner::run(
        Role::Prover,
        stream,
        addr.to_string(),
        SessionConfig::default(),
        commands,
    )
    .await
    .unwrap();

    assert_eq!(peggy, RoundSummary::default());
    assert_eq!(victor.await.unwrap().unwrap(), RoundSummary::default());
}
