use std::net::Ipv4Addr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hue_bridge::logging::{self, LoggingMode};
use hue_bridge::{BridgeConfig, ChangeCallback, HueBridge, Profile};

/// Emulated Philips hue bridge
///
/// Answers SSDP searches and serves the bridge REST API so hue apps can
/// pair with it and control the configured lights.
#[derive(Parser, Debug)]
#[command(name = "hue-bridge")]
#[command(version)]
pub struct Args {
    /// HTTP port of the control plane
    #[arg(short, long, env = "HUE_EMULATOR_PORT", default_value_t = hue_bridge::config::DEFAULT_HTTP_PORT)]
    pub port: u16,

    /// Trace every request, search and state change
    #[arg(short, long, env = "HUE_EMULATOR_DEBUG")]
    pub debug: bool,

    /// Route set: "full" (whitelist, groups, scenes) or "demo"
    #[arg(long, env = "HUE_EMULATOR_PROFILE", default_value_t = Profile::Full)]
    pub profile: Profile,

    /// UDP port for SSDP searches
    #[arg(long, env = "HUE_EMULATOR_DISCOVERY_PORT", default_value_t = hue_bridge::config::DEFAULT_DISCOVERY_PORT)]
    pub discovery_port: u16,

    /// Address to advertise instead of the detected one
    #[arg(long, env = "HUE_EMULATOR_ADVERTISE_IP")]
    pub advertise_ip: Option<Ipv4Addr>,

    /// JSON file holding lights, users, groups and scenes
    #[arg(long, env = "HUE_EMULATOR_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Light to add at startup; repeat for more
    #[arg(short, long = "light", env = "HUE_EMULATOR_LIGHTS", value_delimiter = ',')]
    pub lights: Vec<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "HUE_EMULATOR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                    self.log_level
                ));
            }
        }

        if self.lights.iter().any(|name| name.trim().is_empty()) {
            return Err(anyhow::anyhow!("Light names must not be empty"));
        }

        Ok(())
    }

    fn config(&self) -> BridgeConfig {
        let mut config = BridgeConfig::default()
            .with_port(self.port)
            .with_debug(self.debug)
            .with_profile(self.profile)
            .with_discovery_port(self.discovery_port);

        if let Some(ip) = self.advertise_ip {
            config = config.with_advertise_ip(ip);
        }
        if let Some(path) = &self.storage {
            config = config.with_storage_path(path);
        }
        config
    }
}

/// Log every change a client makes to a light started from the command line.
fn logging_callback(name: &str) -> ChangeCallback {
    let name = name.to_string();
    ChangeCallback::from_fn(move |key, value| {
        info!("{}.{} => {}", name, key, value);
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;

    let mode = if args.debug {
        LoggingMode::Debug
    } else {
        LoggingMode::Development
    };
    logging::init_logging_with_level(mode, &args.log_level)
        .context("Failed to initialize logging")?;

    let bridge = HueBridge::start(args.config())
        .await
        .context("Failed to start bridge")?;

    for name in &args.lights {
        let id = bridge
            .add_light(name, Some(logging_callback(name)))
            .with_context(|| format!("Failed to add light '{name}'"))?;
        info!("Serving light {} as /lights/{}", name, id);
    }

    info!(
        "Bridge {} ready at {} (press Ctrl+C to stop)",
        bridge.identity().bridge_id(),
        bridge.base_url()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Shutting down");
    bridge.shutdown().await;
    Ok(())
}
