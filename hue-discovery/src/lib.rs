//! Network presence of the emulated hue bridge.
//!
//! Clients find a bridge by multicasting an SSDP `M-SEARCH` and then
//! fetching the UPnP description document named in the response's LOCATION
//! header. This crate provides both halves:
//!
//! - [`BridgeIdentity`]: serial number, bridge id and UUID, fixed for the
//!   process lifetime.
//! - [`DiscoveryResponder`]: UDP listener on port 1900 that answers every
//!   search with three responses.
//! - [`description_xml`]: the description document served over HTTP.
//! - [`detect_advertise_ip`]: the address put into LOCATION.
//!
//! # Quick Start
//!
//! ```no_run
//! use hue_discovery::{ssdp, BridgeIdentity, DiscoveryResponder, ResponderConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> hue_discovery::Result<()> {
//! let ip = hue_discovery::detect_advertise_ip()?;
//! let config = ResponderConfig::new(BridgeIdentity::default(), ssdp::location_url(ip, 80));
//! let responder = DiscoveryResponder::bind(config).await?;
//! println!("answering searches on {}", responder.local_addr());
//! # responder.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod address;
mod description;
mod error;
mod identity;
pub mod probe;
mod responder;
pub mod ssdp;

pub use address::{detect_advertise_ip, select_advertise_ip};
pub use description::description_xml;
pub use error::{DiscoveryError, Result};
pub use identity::BridgeIdentity;
pub use responder::{DiscoveryResponder, ResponderConfig};
