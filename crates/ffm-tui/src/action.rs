//! Action enum — user-initiated intents produced by components and
//! dispatched by the App event-loop.

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    StationPicker,
    ClipList,
    ScopePanel,
}

/// All actions that can flow through the system.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Session ──────────────────────────────────────────────────────────────
    Submit(String), // station name entered or picked
    Back,
    Forward,

    // ── Recording / clips ────────────────────────────────────────────────────
    ToggleRecord,
    DeleteClip(u64),
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
