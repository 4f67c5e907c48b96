// Join a session and print everything it broadcasts.
//
// Usage:
//   cargo run --example watch_session -- <session-id> <display-name>
//
// Server URL and the rest of the knobs come from
// `~/.quizlink/config.toml` (defaults to a local server).

use anyhow::Context;
use tracing::info;

use quizlink_client::{ClientConfig, SessionClient, SessionEvent, WsTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let session_id = args.next().context("usage: watch_session <session-id> <display-name>")?;
    let config = ClientConfig::load();
    let display_name = args
        .next()
        .or_else(|| config.display_name.clone())
        .context("no display name given and none configured")?;

    info!(url = %config.server_url, %session_id, "connecting");
    let mut client = SessionClient::new(config, WsTransport::new());
    client.connect().await.context("could not reach the session server")?;
    client
        .join_session(&session_id, &display_name, None)
        .await
        .context("join was rejected")?;

    loop {
        match client.next_event().await {
            Ok(SessionEvent::CountdownTick { remaining_secs }) => {
                println!("  {remaining_secs}s remaining");
            }
            Ok(SessionEvent::SessionEnded) => {
                println!("session over");
                break;
            }
            Ok(event) => println!("{event:?}"),
            Err(error) => {
                eprintln!("client stopped: {error}");
                break;
            }
        }
    }

    client.shutdown().await;
    Ok(())
}
