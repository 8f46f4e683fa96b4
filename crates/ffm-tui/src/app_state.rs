//! AppState — shared read-only data passed to all components during
//! render/event. Components read this but never mutate it; the App
//! event-loop is the only writer.

use std::collections::{BTreeMap, VecDeque};

use ffm_proto::i18n::Catalog;

use crate::navigator::{ClipRef, Navigator, Station};

/// Rolling PCM history kept for the scope: ~2 seconds at 44.1 kHz.
pub const PCM_RING_MAX: usize = 88_200;

pub struct AppState {
    /// The session state machine. All transitions go through the App loop.
    pub navigator: Navigator,

    /// Known stations from the registry (name -> frequency), refreshed
    /// whenever a station is persisted.
    pub stations: BTreeMap<String, f64>,

    /// Translation catalog for the configured locale.
    pub catalog: Catalog,

    // ── Microphone ───────────────────────────────────────────────────────────
    /// A live input stream exists and the record toggle works.
    pub mic_ready: bool,
    /// Capture failed in a way that disables recording for this run.
    pub record_disabled: bool,
    /// Localized capture error, shown where the record hint would be.
    pub mic_error: Option<String>,

    // ── Scope ────────────────────────────────────────────────────────────────
    /// Rolling buffer of normalised mono f32 PCM samples.
    pub pcm_ring: VecDeque<f32>,
}

impl AppState {
    pub fn new(navigator: Navigator, stations: BTreeMap<String, f64>, catalog: Catalog) -> Self {
        Self {
            navigator,
            stations,
            catalog,
            mic_ready: false,
            record_disabled: false,
            mic_error: None,
            pcm_ring: VecDeque::with_capacity(PCM_RING_MAX),
        }
    }

    /// Convenience: the active station, if any.
    pub fn station(&self) -> Option<&Station> {
        self.navigator.session().map(|s| &s.station)
    }

    /// Convenience: the active session's clip rows.
    pub fn clips(&self) -> &[ClipRef] {
        self.navigator
            .session()
            .map(|s| s.files.as_slice())
            .unwrap_or(&[])
    }

    pub fn push_pcm(&mut self, samples: &[f32]) {
        for &s in samples {
            if self.pcm_ring.len() == PCM_RING_MAX {
                self.pcm_ring.pop_front();
            }
            self.pcm_ring.push_back(s);
        }
    }
}
