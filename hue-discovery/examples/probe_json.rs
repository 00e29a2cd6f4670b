//! Send an M-SEARCH and print every answering bridge as JSON
//!
//! Usage: cargo run -p hue-emulator-discovery --example probe_json [host:port] [timeout_secs]

use std::net::SocketAddr;
use std::time::Duration;

use hue_discovery::probe;

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let target: Option<SocketAddr> = args.next().and_then(|s| s.parse().ok());
    let timeout = Duration::from_secs(args.next().and_then(|s| s.parse().ok()).unwrap_or(3));

    let result = match target {
        Some(target) => probe::probe(target, "ssdp:all", timeout).await,
        None => probe::probe_multicast(timeout).await,
    };

    match result {
        Ok(responses) => match serde_json::to_string_pretty(&responses) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to encode responses: {e}"),
        },
        Err(e) => eprintln!("Probe failed: {e}"),
    }
}
