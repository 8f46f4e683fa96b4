//! App — the component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for
//!   components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from the
//!   terminal reader thread and background tasks; a second channel carries
//!   raw PCM from the capture callback.
//! - The loop draws a frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action into the
//!   session navigator and performs the effects the navigator returns.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use ffm_proto::i18n::Catalog;
use ffm_proto::stations::StationRegistry;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        clip_list::ClipList, header::Header, scope_panel::ScopePanel,
        station_picker::StationPicker,
    },
    navigator::{NavEffect, NavEvent, NavState, Navigator, UploadedClip},
    recorder::{CaptureError, Recorder},
    remote::{ListOutcome, RemoteClient, RemoteError},
    widgets::{status_bar, toast::ToastManager},
};

// ── Internal event bus ────────────────────────────────────────────────────────

pub enum AppMessage {
    /// A terminal event from the reader thread.
    Event(Event),
    /// Listing result for a submitted station name.
    ListingOutcome {
        username: String,
        outcome: Result<ListOutcome, RemoteError>,
    },
    /// One upload finished (success carries file name + remote url).
    UploadOutcome {
        clip_id: u64,
        result: Result<UploadedClip, String>,
    },
    /// A remote delete finished.
    DeleteOutcome {
        file_name: String,
        result: Result<(), String>,
    },
    /// The post-activation warmup elapsed; time to open the microphone.
    MicWarmupElapsed { generation: u64 },
}

pub struct App {
    // ── Shared state (passed read-only to components) ─────────────────────────
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    station_picker: StationPicker,
    clip_list: ClipList,
    scope_panel: ScopePanel,

    // ── Session bookkeeping ───────────────────────────────────────────────────
    remote: Arc<RemoteClient>,
    registry: StationRegistry,
    token: String,
    recorder: Option<Recorder>,
    /// Bumped on every acquire/release so a stale warmup can't open a mic
    /// for a session that has already been torn down.
    mic_generation: u64,
    warmup: Duration,

    msg_tx: mpsc::Sender<AppMessage>,
    pcm_tx: mpsc::Sender<Vec<f32>>,

    focus: ComponentId,
    toast: ToastManager,
    clipboard: Option<arboard::Clipboard>,
    should_quit: bool,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        token: String,
        catalog: Catalog,
        registry: StationRegistry,
        remote: RemoteClient,
        warmup_ms: u64,
        msg_tx: mpsc::Sender<AppMessage>,
        pcm_tx: mpsc::Sender<Vec<f32>>,
    ) -> Self {
        let stations = registry.list();
        let navigator = Navigator::new(token.clone());
        Self {
            state: AppState::new(navigator, stations, catalog),
            header: Header,
            station_picker: StationPicker::new(),
            clip_list: ClipList::new(),
            scope_panel: ScopePanel::default(),
            remote: Arc::new(remote),
            registry,
            token,
            recorder: None,
            mic_generation: 0,
            warmup: Duration::from_millis(warmup_ms),
            msg_tx,
            pcm_tx,
            focus: ComponentId::StationPicker,
            toast: ToastManager::default(),
            clipboard: None,
            should_quit: false,
        }
    }

    // ── Main loop ────────────────────────────────────────────────────────────

    pub async fn run(
        mut self,
        mut msg_rx: mpsc::Receiver<AppMessage>,
        mut pcm_rx: mpsc::Receiver<Vec<f32>>,
    ) -> anyhow::Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let result = self.event_loop(&mut msg_rx, &mut pcm_rx).await;
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        result
    }

    async fn event_loop(
        &mut self,
        msg_rx: &mut mpsc::Receiver<AppMessage>,
        pcm_rx: &mut mpsc::Receiver<Vec<f32>>,
    ) -> anyhow::Result<()> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        let mut tick = tokio::time::interval(Duration::from_millis(50));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                Some(msg) = msg_rx.recv() => {
                    self.on_message(msg);
                    // Drain whatever else is queued before redrawing
                    while let Ok(msg) = msg_rx.try_recv() {
                        self.on_message(msg);
                    }
                }
                Some(chunk) = pcm_rx.recv() => {
                    self.state.push_pcm(&chunk);
                    while let Ok(chunk) = pcm_rx.try_recv() {
                        self.state.push_pcm(&chunk);
                    }
                }
                _ = tick.tick() => {
                    self.toast.tick();
                }
            }
        }
        Ok(())
    }

    // ── Message handling ─────────────────────────────────────────────────────

    fn on_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.on_key(key);
            }
            AppMessage::Event(_) => {}
            AppMessage::ListingOutcome { username, outcome } => {
                self.toast.dismiss_spinner();
                let event = match outcome {
                    Ok(ListOutcome::Files(files)) => {
                        info!("Listing for {}: {} clips", username, files.len());
                        NavEvent::ListingLoaded { files }
                    }
                    Ok(ListOutcome::NoRecordings) => {
                        info!("Listing for {}: first-time station", username);
                        NavEvent::ListingEmpty
                    }
                    Err(e) => {
                        warn!("Listing for {} failed: {}", username, e);
                        NavEvent::ListingFailed {
                            message: e.to_string(),
                        }
                    }
                };
                self.feed_navigator(event);
            }
            AppMessage::UploadOutcome { clip_id, result } => {
                if let Err(message) = &result {
                    warn!("Upload for clip {} failed: {}", clip_id, message);
                    self.toast.error(self.state.catalog.get("save_failed"));
                }
                self.feed_navigator(NavEvent::UploadFinished { clip_id, result });
            }
            AppMessage::DeleteOutcome { file_name, result } => match result {
                Ok(()) => {
                    self.toast.info(
                        self.state
                            .catalog
                            .format("deleted", &[("file", &file_name)]),
                    );
                }
                Err(message) => {
                    self.toast.error(self.state.catalog.format(
                        "delete_failed",
                        &[("file", &file_name), ("error", &message)],
                    ));
                }
            },
            AppMessage::MicWarmupElapsed { generation } => self.on_mic_warmup(generation),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        // Global keys first
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        let nav_state = self.state.navigator.state();
        let actions = match nav_state {
            NavState::LoggedOut | NavState::Authenticating | NavState::Error => {
                self.station_picker.handle_key(key, &self.state)
            }
            NavState::Active => match key.code {
                KeyCode::Char('q') => vec![Action::Quit],
                KeyCode::Char('r') => vec![Action::ToggleRecord],
                KeyCode::Left | KeyCode::Backspace => vec![Action::Back],
                KeyCode::Right => vec![Action::Forward],
                KeyCode::Tab => {
                    self.focus = if self.focus == self.scope_panel.id() {
                        self.clip_list.id()
                    } else {
                        self.scope_panel.id()
                    };
                    Vec::new()
                }
                _ => match self.focus {
                    ComponentId::ScopePanel => self.scope_panel.handle_key(key, &self.state),
                    _ => self.clip_list.handle_key(key, &self.state),
                },
            },
        };
        for action in actions {
            self.dispatch(action);
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Submit(name) => {
                self.feed_navigator(NavEvent::Submit { name });
            }
            Action::Back => self.feed_navigator(NavEvent::Back),
            Action::Forward => self.feed_navigator(NavEvent::Forward),
            Action::ToggleRecord => {
                if self.state.record_disabled {
                    let message = self
                        .state
                        .mic_error
                        .clone()
                        .unwrap_or_else(|| self.state.catalog.get("mic_unsupported"));
                    self.toast.warning(message);
                    return;
                }
                if !self.state.mic_ready && !self.state.navigator.is_recording() {
                    // Mic still warming up; nothing to arm yet.
                    return;
                }
                self.feed_navigator(NavEvent::ToggleRecord);
            }
            Action::DeleteClip(clip_id) => {
                self.feed_navigator(NavEvent::DeleteClip { clip_id });
            }
            Action::CopyToClipboard(text) => self.copy_to_clipboard(&text),
            Action::Quit => self.should_quit = true,
        }
    }

    fn feed_navigator(&mut self, event: NavEvent) {
        let effects = self.state.navigator.handle(event);
        for effect in effects {
            self.run_effect(effect);
        }
        // Keep focus sensible across state changes
        self.focus = match self.state.navigator.state() {
            NavState::Active => {
                if self.focus == ComponentId::StationPicker {
                    ComponentId::ClipList
                } else {
                    self.focus
                }
            }
            _ => ComponentId::StationPicker,
        };
    }

    // ── Effects ──────────────────────────────────────────────────────────────

    fn run_effect(&mut self, effect: NavEffect) {
        match effect {
            NavEffect::FetchListing {
                username,
                credential,
            } => {
                self.toast.spinner(
                    self.state
                        .catalog
                        .format("tuning", &[("name", &username)]),
                );
                let remote = Arc::clone(&self.remote);
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let outcome = remote.list_recordings(&credential).await;
                    let _ = tx
                        .send(AppMessage::ListingOutcome { username, outcome })
                        .await;
                });
            }
            NavEffect::PersistStation { name, frequency } => {
                if let Err(e) = self.registry.upsert(&name, frequency) {
                    warn!("Could not persist station {}: {}", name, e);
                }
                self.state.stations = self.registry.list();
            }
            NavEffect::AcquireMicrophone => {
                self.mic_generation += 1;
                let generation = self.mic_generation;
                let tx = self.msg_tx.clone();
                let warmup = self.warmup;
                tokio::spawn(async move {
                    tokio::time::sleep(warmup).await;
                    let _ = tx.send(AppMessage::MicWarmupElapsed { generation }).await;
                });
            }
            NavEffect::ReleaseMicrophone => {
                self.mic_generation += 1;
                self.recorder = None;
                self.state.mic_ready = false;
                self.state.pcm_ring.clear();
            }
            NavEffect::StartCapture => {
                if let Some(recorder) = &self.recorder {
                    recorder.arm();
                }
            }
            NavEffect::StopCapture { clip_id } => self.stop_capture(clip_id),
            NavEffect::AbortCapture => {
                if let Some(recorder) = &self.recorder {
                    recorder.abort();
                }
            }
            NavEffect::DeleteRemote { file_name } => {
                let Some(station) = self.state.station() else {
                    return;
                };
                let credential = self.state.navigator.credential_for(&station.name);
                let token = self.token.clone();
                let remote = Arc::clone(&self.remote);
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let result = remote
                        .delete_clip(&credential, &token, &file_name)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = tx.send(AppMessage::DeleteOutcome { file_name, result }).await;
                });
            }
        }
    }

    /// Flush the recorder into one blob and dispatch its upload.
    /// Fire-and-forget: rapid start/stop cycles yield independent uploads
    /// whose completions may arrive in any order.
    fn stop_capture(&mut self, clip_id: u64) {
        let Some(recorder) = &self.recorder else {
            self.feed_navigator(NavEvent::UploadFinished {
                clip_id,
                result: Err("no capture stream".to_string()),
            });
            return;
        };
        let blob = match recorder.flush() {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Could not flush capture buffer: {}", e);
                self.feed_navigator(NavEvent::UploadFinished {
                    clip_id,
                    result: Err(e.to_string()),
                });
                return;
            }
        };
        let Some(station) = self.state.station() else {
            return;
        };
        let credential = self.state.navigator.credential_for(&station.name);
        let token = self.token.clone();
        let remote = Arc::clone(&self.remote);
        let tx = self.msg_tx.clone();
        debug!("Dispatching upload for clip {}", clip_id);
        tokio::spawn(async move {
            let result = remote
                .upload_clip(&credential, blob.bytes, &blob.mime)
                .await
                .map(|file_name| UploadedClip {
                    remote_url: format!("/audio/{token}/{file_name}"),
                    file_name,
                })
                .map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::UploadOutcome { clip_id, result }).await;
        });
    }

    fn on_mic_warmup(&mut self, generation: u64) {
        // A capture failure disables recording for the rest of this run;
        // later sessions don't retry.
        if self.state.record_disabled
            || generation != self.mic_generation
            || self.state.navigator.state() != NavState::Active
            || self.recorder.is_some()
        {
            return;
        }
        match Recorder::open(self.pcm_tx.clone()) {
            Ok(recorder) => {
                self.recorder = Some(recorder);
                self.state.mic_ready = true;
                self.state.mic_error = None;
            }
            Err(e) => {
                warn!("Microphone acquisition failed: {}", e);
                let message = match &e {
                    CaptureError::PermissionDenied => self.state.catalog.get("mic_denied"),
                    CaptureError::DeviceNotFound => self.state.catalog.get("mic_missing"),
                    CaptureError::Unsupported => self.state.catalog.get("mic_unsupported"),
                    CaptureError::Other(detail) => self
                        .state
                        .catalog
                        .format("mic_error", &[("error", detail)]),
                };
                // Terminal for this page load: the record control stays off.
                self.state.record_disabled = true;
                self.state.mic_error = Some(message.clone());
                self.toast.error(message);
            }
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        if self.clipboard.is_none() {
            self.clipboard = arboard::Clipboard::new().ok();
        }
        match self.clipboard.as_mut().map(|c| c.set_text(text.to_string())) {
            Some(Ok(())) => self.toast.info(self.state.catalog.get("copied_url")),
            _ => self.toast.warning("Clipboard unavailable"),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        match self.state.navigator.state() {
            NavState::Active => self.draw_station(frame, area),
            _ => {
                self.station_picker
                    .draw(frame, area, true, &self.state);
            }
        }
        self.toast.draw(frame, area);
    }

    fn draw_station(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // header
                Constraint::Length(8),  // scope
                Constraint::Min(3),     // clips
                Constraint::Length(1),  // separator
                Constraint::Length(1),  // keys
            ])
            .split(area);

        self.header.draw(frame, rows[0], &self.state);
        self.scope_panel.draw(
            frame,
            rows[1],
            self.focus == ComponentId::ScopePanel,
            &self.state,
        );
        self.clip_list.draw(
            frame,
            rows[2],
            self.focus == ComponentId::ClipList,
            &self.state,
        );
        status_bar::draw_separator(frame, rows[3]);

        let record_label = if self.state.navigator.is_recording() {
            self.state.catalog.get("stop")
        } else {
            self.state.catalog.get("record")
        };
        let hints = [
            ("d", "delete".to_string()),
            ("y", "copy url".to_string()),
            ("←", "back".to_string()),
            ("q", "quit".to_string()),
        ];
        status_bar::draw_keys_bar(
            frame,
            rows[4],
            self.state.navigator.is_recording(),
            &record_label,
            &hints,
        );
    }
}
