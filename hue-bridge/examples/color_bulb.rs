//! Serve two lights and print every change a hue app makes to them.
//!
//! ```text
//! cargo run -p hue-emulator-bridge --example color_bulb -- 8080
//! ```
//!
//! Pair from any hue app on the same network, then switch "foo" on and off.

use hue_bridge::logging::{self, LoggingMode};
use hue_bridge::{BridgeConfig, ChangeCallback, HueBridge};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging(LoggingMode::Development)?;

    let port = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(8080);

    let bridge = HueBridge::start(BridgeConfig::default().with_port(port)).await?;

    bridge.add_light(
        "foo",
        Some(ChangeCallback::from_fn(|key, value| {
            println!("foo.{key} => {value}");
        })),
    )?;
    bridge.add_light("bar", None)?;

    println!("Bridge listening at {}", bridge.base_url());
    tokio::signal::ctrl_c().await?;
    bridge.shutdown().await;
    Ok(())
}
