//! ScopePanel — live waveform of the microphone feed.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Chart},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    scope::{GraphConfig, Oscilloscope},
};

/// Default number of PCM samples displayed per frame.
pub const SCOPE_SAMPLES: u32 = 2048;

pub struct ScopePanel {
    oscilloscope: Oscilloscope,
    graph_cfg: GraphConfig,
    window: Vec<f32>,
}

impl Default for ScopePanel {
    fn default() -> Self {
        Self {
            oscilloscope: Oscilloscope::default(),
            graph_cfg: GraphConfig {
                samples: SCOPE_SAMPLES,
                ..GraphConfig::default()
            },
            window: Vec::new(),
        }
    }
}

impl Component for ScopePanel {
    fn id(&self) -> ComponentId {
        ComponentId::ScopePanel
    }

    /// Scope-tui-style zoom keys.
    ///
    /// Up / Down    — scale ± 0.01 (× 10 with Shift)
    /// PgUp / PgDn  — sample window ± 256
    /// Esc          — reset to defaults
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        let magnitude: f64 = if key.modifiers.contains(KeyModifiers::SHIFT) {
            10.0
        } else {
            1.0
        };
        match key.code {
            KeyCode::Up => {
                self.graph_cfg.scale = (self.graph_cfg.scale + 0.01 * magnitude).clamp(0.01, 10.0);
            }
            KeyCode::Down => {
                self.graph_cfg.scale = (self.graph_cfg.scale - 0.01 * magnitude).clamp(0.01, 10.0);
            }
            KeyCode::PageUp => {
                self.graph_cfg.samples =
                    self.graph_cfg.samples.saturating_add(256).min(SCOPE_SAMPLES * 4);
            }
            KeyCode::PageDown => {
                self.graph_cfg.samples = self.graph_cfg.samples.saturating_sub(256).max(64);
            }
            KeyCode::Esc => {
                self.graph_cfg.scale = 1.0;
                self.graph_cfg.samples = SCOPE_SAMPLES;
            }
            _ => {}
        }
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let n = self.graph_cfg.samples as usize;
        let ring = &state.pcm_ring;
        let skip = ring.len().saturating_sub(n);
        self.window.clear();
        self.window.extend(ring.iter().skip(skip));

        self.oscilloscope.process(&self.graph_cfg, &self.window);

        let chart = Chart::new(self.oscilloscope.datasets(&self.graph_cfg))
            .block(Block::default().style(Style::default().bg(crate::theme::C_BG)))
            .x_axis(self.graph_cfg.x_axis())
            .y_axis(self.graph_cfg.y_axis());
        frame.render_widget(chart, area);
    }
}
