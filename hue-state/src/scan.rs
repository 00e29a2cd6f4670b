//! Search for new lights.
//!
//! A search is instantaneous: it records the time and picks one candidate
//! from the template catalogue. The candidate only joins the registry when a
//! client polls for new lights, mirroring the two steps of a hardware scan.

use chrono::Local;
use parking_lot::Mutex;

use crate::error::Result;
use crate::model::{Light, LightId};
use crate::random;
use crate::templates;

/// `lastscan` timestamp format, local time.
pub const LASTSCAN_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current local time as a `lastscan` value.
pub fn timestamp() -> String {
    Local::now().format(LASTSCAN_FORMAT).to_string()
}

/// Outcome of polling for new lights.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLights {
    /// Light committed by this poll, if a search had found one
    pub found: Option<(LightId, String)>,
    pub lastscan: String,
}

#[derive(Debug)]
struct ScanState {
    last_scan: String,
    pending: Option<Light>,
}

/// Last search time plus the candidate it found.
#[derive(Debug)]
pub struct LightScan {
    state: Mutex<ScanState>,
}

impl LightScan {
    /// Start with `lastscan` set to now and nothing pending.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScanState {
                last_scan: timestamp(),
                pending: None,
            }),
        }
    }

    /// Record a search and pick a random catalogue light with a fresh
    /// unique id.
    pub fn search(&self) -> Result<()> {
        let mut catalogue = templates::catalogue()?;
        let candidate = random::index(catalogue.len()).map(|index| {
            let mut light = catalogue.swap_remove(index);
            light.uniqueid = random::light_uniqueid();
            light
        });

        let mut state = self.state.lock();
        state.last_scan = timestamp();
        if let Some(light) = &candidate {
            tracing::debug!(model = %light.modelid, uniqueid = %light.uniqueid, "Search found light");
        }
        state.pending = candidate;
        Ok(())
    }

    /// Take the pending candidate, leaving nothing pending.
    pub fn take_pending(&self) -> (Option<Light>, String) {
        let mut state = self.state.lock();
        (state.pending.take(), state.last_scan.clone())
    }

    pub fn last_scan(&self) -> String {
        self.state.lock().last_scan.clone()
    }

    pub fn has_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }
}

impl Default for LightScan {
    fn default() -> Self {
        Self::new()
    }
}
