//! StationPicker — the login screen: a name input plus the list of
//! stations this installation has broadcast under before.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    navigator::NavState,
    theme::{
        style_default, style_focused_border, style_muted, style_secondary, style_selected_focused,
        C_ACCENT, C_FREQUENCY, C_PRIMARY, C_TOAST_ERROR,
    },
};

pub struct StationPicker {
    input: Input,
    list_state: ListState,
}

impl StationPicker {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            list_state: ListState::default(),
        }
    }

    fn station_names(state: &AppState) -> Vec<(String, f64)> {
        state
            .stations
            .iter()
            .map(|(name, freq)| (name.clone(), *freq))
            .collect()
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
}

impl Component for StationPicker {
    fn id(&self) -> ComponentId {
        ComponentId::StationPicker
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        // Ignore input while a listing request is in flight.
        if state.navigator.state() == NavState::Authenticating {
            return Vec::new();
        }
        let stations = Self::station_names(state);
        match key.code {
            KeyCode::Enter => {
                let typed = self.input.value().trim().to_string();
                if !typed.is_empty() {
                    return vec![Action::Submit(typed)];
                }
                if let Some(idx) = self.list_state.selected() {
                    if let Some((name, _)) = stations.get(idx) {
                        return vec![Action::Submit(name.clone())];
                    }
                }
                Vec::new()
            }
            KeyCode::Up => {
                self.move_selection(-1, stations.len());
                Vec::new()
            }
            KeyCode::Down => {
                self.move_selection(1, stations.len());
                Vec::new()
            }
            // Forward-navigation back into a left session, but only when it
            // can't be meant as cursor movement.
            KeyCode::Right if self.input.value().is_empty() => {
                if state.navigator.can_go_forward() {
                    vec![Action::Forward]
                } else {
                    Vec::new()
                }
            }
            KeyCode::Esc => {
                self.input = Input::default();
                Vec::new()
            }
            _ => {
                self.input
                    .handle_event(&ratatui::crossterm::event::Event::Key(key));
                Vec::new()
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style_focused_border())
            .title(Span::styled(
                " Françoise FM ",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // prompt
                Constraint::Length(1), // input
                Constraint::Length(1), // hint / error
                Constraint::Length(1), // spacer
                Constraint::Min(1),    // saved stations
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                state.catalog.get("login_prompt"),
                style_default(),
            )),
            rows[0],
        );

        let value = self.input.value();
        let scroll = self.input.visual_scroll(rows[1].width.saturating_sub(3) as usize);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("> ", style_secondary()),
                Span::styled(&value[scroll..], Style::default().fg(C_PRIMARY)),
            ])),
            rows[1],
        );
        let cursor_x = rows[1].x + 2 + (self.input.visual_cursor() - scroll) as u16;
        let max_x = (rows[1].x + rows[1].width).saturating_sub(1);
        frame.set_cursor_position((cursor_x.min(max_x), rows[1].y));

        match state.navigator.state() {
            NavState::Error => {
                let message = state.navigator.last_error().unwrap_or("");
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        state.catalog.format("listing_failed", &[("error", message)]),
                        Style::default().fg(C_TOAST_ERROR),
                    )),
                    rows[2],
                );
            }
            NavState::Authenticating => {
                let name = state.navigator.pending_username().unwrap_or("");
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        state.catalog.format("tuning", &[("name", name)]),
                        style_secondary(),
                    )),
                    rows[2],
                );
            }
            _ => {
                frame.render_widget(
                    Paragraph::new(Span::styled(state.catalog.get("login_hint"), style_muted())),
                    rows[2],
                );
            }
        }

        let stations = Self::station_names(state);
        if let Some(idx) = self.list_state.selected() {
            if idx >= stations.len() {
                self.list_state.select(stations.last().map(|_| stations.len() - 1));
            }
        }
        let items: Vec<ListItem> = stations
            .iter()
            .map(|(name, freq)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{name} "), Style::default().fg(C_PRIMARY)),
                    Span::styled(format!("{freq:.1} FM"), Style::default().fg(C_FREQUENCY)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(style_selected_focused())
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, rows[4], &mut self.list_state);
    }
}
