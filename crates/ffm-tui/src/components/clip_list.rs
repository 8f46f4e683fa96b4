//! ClipList — the active station's recordings, one row per clip.
//!
//! Each upload owns its row: a row flips from Saving to Saved or Failed on
//! its own result and never moves, so out-of-order completions cannot
//! cross-talk.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    navigator::{ClipRef, ClipStatus},
    theme::{
        style_focused_border, style_muted, style_selected_focused, style_unfocused_border,
        C_BADGE_FAILED, C_BADGE_SAVED, C_BADGE_SAVING, C_PRIMARY, C_SECONDARY,
    },
};

pub struct ClipList {
    list_state: ListState,
}

impl ClipList {
    pub fn new() -> Self {
        Self {
            list_state: ListState::default(),
        }
    }

    fn selected_clip<'a>(&self, state: &'a AppState) -> Option<&'a ClipRef> {
        state.clips().get(self.list_state.selected()?)
    }

    fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        self.list_state.select(Some(next));
    }

    fn status_spans<'a>(clip: &'a ClipRef, state: &AppState) -> (Span<'a>, String) {
        match clip.status {
            ClipStatus::Saving => (
                Span::styled("● ", Style::default().fg(C_BADGE_SAVING)),
                state.catalog.format(
                    "saving",
                    &[(
                        "name",
                        state.station().map(|s| s.name.as_str()).unwrap_or(""),
                    )],
                ),
            ),
            ClipStatus::Saved => (
                Span::styled("✓ ", Style::default().fg(C_BADGE_SAVED)),
                match clip.file_name.as_deref() {
                    Some(file) => state.catalog.format("saved_as", &[("file", file)]),
                    None => String::new(),
                },
            ),
            ClipStatus::Failed => (
                Span::styled("✗ ", Style::default().fg(C_BADGE_FAILED)),
                state.catalog.get("save_failed"),
            ),
        }
    }
}

impl Component for ClipList {
    fn id(&self) -> ComponentId {
        ComponentId::ClipList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let len = state.clips().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1, len);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1, len);
                Vec::new()
            }
            KeyCode::Char('d') => match self.selected_clip(state) {
                Some(clip) => vec![Action::DeleteClip(clip.id)],
                None => Vec::new(),
            },
            KeyCode::Char('y') => match self.selected_clip(state).and_then(|c| c.remote_url.clone())
            {
                Some(url) => vec![Action::CopyToClipboard(url)],
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let border_style = if focused {
            style_focused_border()
        } else {
            style_unfocused_border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Sound clips ", Style::default().fg(C_SECONDARY)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let clips = state.clips();
        if clips.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(state.catalog.get("no_clips"), style_muted())),
                inner,
            );
            return;
        }

        if let Some(idx) = self.list_state.selected() {
            if idx >= clips.len() {
                self.list_state.select(Some(clips.len() - 1));
            }
        } else {
            self.list_state.select(Some(0));
        }

        let label_width = inner.width.saturating_sub(4) as usize / 2;
        let items: Vec<ListItem> = clips
            .iter()
            .map(|clip| {
                let (badge, status_text) = Self::status_spans(clip, state);
                let mut label = clip.label.clone();
                while label.width() > label_width && !label.is_empty() {
                    label.pop();
                }
                ListItem::new(Line::from(vec![
                    badge,
                    Span::styled(format!("{label}  "), Style::default().fg(C_PRIMARY)),
                    Span::styled(status_text, Style::default().fg(C_SECONDARY)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(style_selected_focused())
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, inner, &mut self.list_state);
    }
}
