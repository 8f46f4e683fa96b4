//! Session navigator — the state machine tying login, recording, upload
//! and history navigation together.
//!
//! Design principles (mirroring the component/action split used by the UI):
//! - The navigator is pure: it consumes `NavEvent`s and returns
//!   `Vec<NavEffect>`s. It never touches the network, the microphone, the
//!   disk or the terminal.
//! - The App event-loop performs effects and feeds their results back in
//!   as further events, so history navigation and user input drive the
//!   exact same transition code.

use ffm_proto::stations::derive_frequency;
use serde::{Deserialize, Serialize};

use crate::history::{HistoryEntry, NavigationHistory};

/// Top-level UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    /// Station picker visible, no session.
    LoggedOut,
    /// Listing request in flight for a submitted name.
    Authenticating,
    /// Session on screen, recorder available.
    Active,
    /// Listing failed; picker remains usable for a retry.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipStatus {
    /// Upload dispatched, no result yet.
    Saving,
    /// Stored remotely (or listed from the server).
    Saved,
    /// Upload failed; the row stays, marked in place.
    Failed,
}

/// One recording: listed from the server, or freshly captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRef {
    pub id: u64,
    pub remote_url: Option<String>,
    pub file_name: Option<String>,
    pub label: String,
    pub status: ClipStatus,
}

impl ClipRef {
    fn from_listing(id: u64, relative_url: &str) -> Self {
        let file_name = relative_url
            .rsplit('/')
            .next()
            .unwrap_or(relative_url)
            .to_string();
        Self {
            id,
            remote_url: Some(relative_url.to_string()),
            file_name: Some(file_name.clone()),
            label: file_name,
            status: ClipStatus::Saved,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Station {
    pub name: String,
    pub frequency: f64,
}

/// The one live session. At most one exists at a time.
#[derive(Debug, Clone)]
pub struct Session {
    pub station: Station,
    pub files: Vec<ClipRef>,
    pub pushed_to_history: bool,
}

/// Everything that can drive a transition: user input, listing results,
/// upload results, history navigation.
#[derive(Debug, Clone)]
pub enum NavEvent {
    Submit { name: String },
    ListingLoaded { files: Vec<String> },
    ListingEmpty,
    ListingFailed { message: String },
    Back,
    Forward,
    ToggleRecord,
    UploadFinished { clip_id: u64, result: Result<UploadedClip, String> },
    DeleteClip { clip_id: u64 },
}

#[derive(Debug, Clone)]
pub struct UploadedClip {
    pub file_name: String,
    pub remote_url: String,
}

/// Side effects for the App layer to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEffect {
    FetchListing { username: String, credential: String },
    PersistStation { name: String, frequency: f64 },
    AcquireMicrophone,
    ReleaseMicrophone,
    StartCapture,
    /// Flush the capture buffer into one blob and upload it for this row.
    StopCapture { clip_id: u64 },
    /// Discard buffered audio without uploading (back-navigation teardown).
    AbortCapture,
    DeleteRemote { file_name: String },
}

pub struct Navigator {
    token: String,
    state: NavState,
    pending_username: Option<String>,
    session: Option<Session>,
    last_error: Option<String>,
    history: NavigationHistory,
    recording: bool,
    next_clip_id: u64,
    session_clip_count: u64,
}

impl Navigator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            state: NavState::LoggedOut,
            pending_username: None,
            session: None,
            last_error: None,
            history: NavigationHistory::default(),
            recording: false,
            next_clip_id: 1,
            session_clip_count: 0,
        }
    }

    // ── Read accessors (for rendering) ───────────────────────────────────────

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending_username(&self) -> Option<&str> {
        self.pending_username.as_deref()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    /// Bearer credential for a station name: raw `name + token`
    /// concatenation.
    pub fn credential_for(&self, name: &str) -> String {
        format!("{}{}", name, self.token)
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: NavEvent) -> Vec<NavEffect> {
        match event {
            NavEvent::Submit { name } => self.on_submit(name),
            NavEvent::ListingLoaded { files } => self.on_listing(files),
            NavEvent::ListingEmpty => self.on_listing(Vec::new()),
            NavEvent::ListingFailed { message } => self.on_listing_failed(message),
            NavEvent::Back => self.on_back(),
            NavEvent::Forward => self.on_forward(),
            NavEvent::ToggleRecord => self.on_toggle_record(),
            NavEvent::UploadFinished { clip_id, result } => self.on_upload_finished(clip_id, result),
            NavEvent::DeleteClip { clip_id } => self.on_delete_clip(clip_id),
        }
    }

    fn on_submit(&mut self, name: String) -> Vec<NavEffect> {
        if !matches!(self.state, NavState::LoggedOut | NavState::Error) {
            return Vec::new();
        }
        let name = name.trim().to_string();
        if name.is_empty() {
            return Vec::new();
        }
        self.state = NavState::Authenticating;
        self.last_error = None;
        let credential = self.credential_for(&name);
        self.pending_username = Some(name.clone());
        vec![NavEffect::FetchListing {
            username: name,
            credential,
        }]
    }

    fn on_listing(&mut self, relative_urls: Vec<String>) -> Vec<NavEffect> {
        if self.state != NavState::Authenticating {
            return Vec::new();
        }
        let Some(username) = self.pending_username.take() else {
            return Vec::new();
        };
        let files = relative_urls
            .iter()
            .map(|url| ClipRef::from_listing(self.take_clip_id(), url))
            .collect();
        self.activate(username, files, true)
    }

    fn on_listing_failed(&mut self, message: String) -> Vec<NavEffect> {
        if self.state != NavState::Authenticating {
            return Vec::new();
        }
        self.pending_username = None;
        self.last_error = Some(message);
        self.state = NavState::Error;
        Vec::new()
    }

    fn on_back(&mut self) -> Vec<NavEffect> {
        if self.state != NavState::Active {
            return Vec::new();
        }
        let pushed = self
            .session
            .as_ref()
            .is_some_and(|s| s.pushed_to_history);
        let effects = self.teardown_session();
        if pushed {
            self.history.go_back();
        }
        self.state = NavState::LoggedOut;
        effects
    }

    fn on_forward(&mut self) -> Vec<NavEffect> {
        if !matches!(self.state, NavState::LoggedOut | NavState::Active) {
            return Vec::new();
        }
        let Some(entry) = self.history.go_forward().cloned() else {
            return Vec::new();
        };
        let mut effects = if self.state == NavState::Active {
            self.teardown_session()
        } else {
            Vec::new()
        };

        // Rehydrate straight from the snapshot — no listing round-trip.
        self.session = Some(Session {
            station: Station {
                name: entry.username,
                frequency: entry.frequency,
            },
            files: entry.station_files,
            pushed_to_history: true,
        });
        self.state = NavState::Active;
        self.recording = false;
        self.session_clip_count = 0;
        effects.push(NavEffect::AcquireMicrophone);
        effects
    }

    fn on_toggle_record(&mut self) -> Vec<NavEffect> {
        if self.state != NavState::Active {
            return Vec::new();
        }
        if !self.recording {
            self.recording = true;
            return vec![NavEffect::StartCapture];
        }

        // Stop: flush everything buffered into one clip and upload it.
        self.recording = false;
        self.session_clip_count += 1;
        let clip_id = self.take_clip_id();
        let count = self.session_clip_count;
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.files.push(ClipRef {
            id: clip_id,
            remote_url: None,
            file_name: None,
            label: format!("{} clip {}", session.station.name, count),
            status: ClipStatus::Saving,
        });
        vec![NavEffect::StopCapture { clip_id }]
    }

    fn on_upload_finished(
        &mut self,
        clip_id: u64,
        result: Result<UploadedClip, String>,
    ) -> Vec<NavEffect> {
        // A result for a session that is gone is simply dropped.
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let Some(clip) = session.files.iter_mut().find(|c| c.id == clip_id) else {
            return Vec::new();
        };
        match result {
            Ok(uploaded) => {
                clip.status = ClipStatus::Saved;
                clip.label = uploaded.file_name.clone();
                clip.file_name = Some(uploaded.file_name);
                clip.remote_url = Some(uploaded.remote_url);
            }
            Err(_) => {
                clip.status = ClipStatus::Failed;
            }
        }
        Vec::new()
    }

    fn on_delete_clip(&mut self, clip_id: u64) -> Vec<NavEffect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let Some(pos) = session.files.iter().position(|c| c.id == clip_id) else {
            return Vec::new();
        };
        let clip = session.files.remove(pos);
        match clip.file_name {
            Some(file_name) => vec![NavEffect::DeleteRemote { file_name }],
            // Never uploaded — nothing to tell the server.
            None => Vec::new(),
        }
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn activate(&mut self, username: String, files: Vec<ClipRef>, push: bool) -> Vec<NavEffect> {
        let frequency = derive_frequency(&self.credential_for(&username));
        if push {
            self.history.push(HistoryEntry {
                username: username.clone(),
                frequency,
                station_files: files.clone(),
            });
        }
        self.session = Some(Session {
            station: Station {
                name: username.clone(),
                frequency,
            },
            files,
            pushed_to_history: push,
        });
        self.state = NavState::Active;
        self.recording = false;
        self.session_clip_count = 0;

        let mut effects = Vec::new();
        if push {
            effects.push(NavEffect::PersistStation {
                name: username,
                frequency,
            });
        }
        effects.push(NavEffect::AcquireMicrophone);
        effects
    }

    /// Common teardown when leaving an active session: a recording in
    /// flight is discarded (only an explicit stop uploads), the mic is
    /// released, the clip rows disappear with the session.
    fn teardown_session(&mut self) -> Vec<NavEffect> {
        let mut effects = Vec::new();
        if self.recording {
            self.recording = false;
            effects.push(NavEffect::AbortCapture);
        }
        effects.push(NavEffect::ReleaseMicrophone);
        self.session = None;
        effects
    }

    fn take_clip_id(&mut self) -> u64 {
        let id = self.next_clip_id;
        self.next_clip_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in(nav: &mut Navigator, name: &str, files: Vec<String>) {
        nav.handle(NavEvent::Submit {
            name: name.to_string(),
        });
        nav.handle(NavEvent::ListingLoaded { files });
        assert_eq!(nav.state(), NavState::Active);
    }

    #[test]
    fn test_submit_fetches_listing_with_credential() {
        let mut nav = Navigator::new("tok");
        let effects = nav.handle(NavEvent::Submit {
            name: "alice".to_string(),
        });
        assert_eq!(nav.state(), NavState::Authenticating);
        assert_eq!(
            effects,
            vec![NavEffect::FetchListing {
                username: "alice".to_string(),
                credential: "alicetok".to_string(),
            }]
        );
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut nav = Navigator::new("tok");
        assert!(nav.handle(NavEvent::Submit { name: "  ".into() }).is_empty());
        assert_eq!(nav.state(), NavState::LoggedOut);
    }

    #[test]
    fn test_empty_listing_activates_with_zero_clips() {
        let mut nav = Navigator::new("tok");
        nav.handle(NavEvent::Submit { name: "alice".into() });
        let effects = nav.handle(NavEvent::ListingEmpty);
        // 404 is a first-time station, not an error
        assert_eq!(nav.state(), NavState::Active);
        let session = nav.session().unwrap();
        assert!(session.files.is_empty());
        assert!(session.pushed_to_history);
        assert!(effects.iter().any(|e| matches!(e, NavEffect::PersistStation { .. })));
        assert!(effects.contains(&NavEffect::AcquireMicrophone));
    }

    #[test]
    fn test_listing_failure_is_retryable() {
        let mut nav = Navigator::new("tok");
        nav.handle(NavEvent::Submit { name: "alice".into() });
        nav.handle(NavEvent::ListingFailed {
            message: "connection refused".into(),
        });
        assert_eq!(nav.state(), NavState::Error);
        assert_eq!(nav.last_error(), Some("connection refused"));

        // next submit retries from scratch
        let effects = nav.handle(NavEvent::Submit { name: "alice".into() });
        assert_eq!(nav.state(), NavState::Authenticating);
        assert!(!effects.is_empty());
    }

    #[test]
    fn test_listing_populates_clip_rows() {
        let mut nav = Navigator::new("tok");
        logged_in(
            &mut nav,
            "alice",
            vec!["/audio/tok/alice01.wav".into(), "/audio/tok/alice02.wav".into()],
        );
        let session = nav.session().unwrap();
        assert_eq!(session.files.len(), 2);
        assert_eq!(session.files[0].file_name.as_deref(), Some("alice01.wav"));
        assert_eq!(session.files[0].status, ClipStatus::Saved);
    }

    #[test]
    fn test_frequency_matches_pure_derivation() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", Vec::new());
        let expected = ffm_proto::stations::derive_frequency("alicetok");
        assert_eq!(nav.session().unwrap().station.frequency, expected);
    }

    #[test]
    fn test_back_then_forward_restores_without_refetch() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", vec!["/audio/tok/alice01.wav".into()]);

        let effects = nav.handle(NavEvent::Back);
        assert_eq!(nav.state(), NavState::LoggedOut);
        assert!(nav.session().is_none());
        assert!(effects.contains(&NavEffect::ReleaseMicrophone));

        let effects = nav.handle(NavEvent::Forward);
        assert_eq!(nav.state(), NavState::Active);
        // identical visible clip set, and no listing fetch on the forward leg
        let session = nav.session().unwrap();
        assert_eq!(session.files.len(), 1);
        assert_eq!(session.files[0].file_name.as_deref(), Some("alice01.wav"));
        assert!(!effects.iter().any(|e| matches!(e, NavEffect::FetchListing { .. })));
        assert!(effects.contains(&NavEffect::AcquireMicrophone));
    }

    #[test]
    fn test_back_discards_recording_in_progress() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", Vec::new());
        nav.handle(NavEvent::ToggleRecord);
        assert!(nav.is_recording());

        let effects = nav.handle(NavEvent::Back);
        assert!(!nav.is_recording());
        assert!(effects.contains(&NavEffect::AbortCapture));
        // teardown never uploads
        assert!(!effects.iter().any(|e| matches!(e, NavEffect::StopCapture { .. })));
    }

    #[test]
    fn test_record_toggle_creates_saving_row() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", Vec::new());

        let effects = nav.handle(NavEvent::ToggleRecord);
        assert_eq!(effects, vec![NavEffect::StartCapture]);

        let effects = nav.handle(NavEvent::ToggleRecord);
        let session = nav.session().unwrap();
        assert_eq!(session.files.len(), 1);
        assert_eq!(session.files[0].status, ClipStatus::Saving);
        assert_eq!(session.files[0].label, "alice clip 1");
        assert!(matches!(effects[0], NavEffect::StopCapture { .. }));
    }

    #[test]
    fn test_upload_failure_marks_row_in_place() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", Vec::new());

        // two rapid start/stop cycles -> two independent uploads
        nav.handle(NavEvent::ToggleRecord);
        nav.handle(NavEvent::ToggleRecord);
        nav.handle(NavEvent::ToggleRecord);
        nav.handle(NavEvent::ToggleRecord);
        let ids: Vec<u64> = nav.session().unwrap().files.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 2);

        // they complete out of order; the first one fails
        nav.handle(NavEvent::UploadFinished {
            clip_id: ids[1],
            result: Ok(UploadedClip {
                file_name: "alice02.wav".into(),
                remote_url: "/audio/tok/alice02.wav".into(),
            }),
        });
        nav.handle(NavEvent::UploadFinished {
            clip_id: ids[0],
            result: Err("boom".into()),
        });

        let session = nav.session().unwrap();
        assert_eq!(session.files.len(), 2);
        assert_eq!(session.files[0].status, ClipStatus::Failed);
        assert_eq!(session.files[1].status, ClipStatus::Saved);
        assert_eq!(session.files[1].file_name.as_deref(), Some("alice02.wav"));
    }

    #[test]
    fn test_upload_result_after_teardown_is_dropped() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", Vec::new());
        nav.handle(NavEvent::ToggleRecord);
        nav.handle(NavEvent::ToggleRecord);
        let clip_id = nav.session().unwrap().files[0].id;

        nav.handle(NavEvent::Back);
        let effects = nav.handle(NavEvent::UploadFinished {
            clip_id,
            result: Err("late".into()),
        });
        assert!(effects.is_empty());
        assert_eq!(nav.state(), NavState::LoggedOut);
    }

    #[test]
    fn test_delete_uploaded_clip_hits_server() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", vec!["/audio/tok/alice01.wav".into()]);
        let clip_id = nav.session().unwrap().files[0].id;

        let effects = nav.handle(NavEvent::DeleteClip { clip_id });
        assert_eq!(
            effects,
            vec![NavEffect::DeleteRemote {
                file_name: "alice01.wav".to_string()
            }]
        );
        assert!(nav.session().unwrap().files.is_empty());
    }

    #[test]
    fn test_delete_unsaved_clip_is_local_only() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", Vec::new());
        nav.handle(NavEvent::ToggleRecord);
        nav.handle(NavEvent::ToggleRecord);
        let clip_id = nav.session().unwrap().files[0].id;

        let effects = nav.handle(NavEvent::DeleteClip { clip_id });
        assert!(effects.is_empty());
        assert!(nav.session().unwrap().files.is_empty());
    }

    #[test]
    fn test_stale_listing_result_is_ignored() {
        let mut nav = Navigator::new("tok");
        logged_in(&mut nav, "alice", Vec::new());
        // a listing result arriving while Active must not clobber the session
        let effects = nav.handle(NavEvent::ListingLoaded {
            files: vec!["/audio/tok/ghost.wav".into()],
        });
        assert!(effects.is_empty());
        assert!(nav.session().unwrap().files.is_empty());
    }
}
