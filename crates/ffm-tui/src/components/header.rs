//! Header — station name, dial position and the on-air lamp.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    app_state::AppState,
    theme::{style_unfocused_border, C_ACCENT, C_FREQUENCY, C_MUTED, C_ON_AIR, C_PRIMARY},
};

pub struct Header;

impl Header {
    pub fn draw(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style_unfocused_border())
            .title(Span::styled(
                " Françoise FM ",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(station) = state.station() else {
            return;
        };
        let frequency = format!("{:.1}", station.frequency);

        let mut spans = vec![
            Span::styled(
                format!("{frequency} FM "),
                Style::default().fg(C_FREQUENCY).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                state.catalog.format(
                    "on_air",
                    &[("name", station.name.as_str()), ("frequency", &frequency)],
                ),
                Style::default().fg(C_PRIMARY),
            ),
        ];
        if state.navigator.is_recording() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                "● ON AIR",
                Style::default().fg(C_ON_AIR).add_modifier(Modifier::BOLD),
            ));
        }
        if let Some(mic_error) = &state.mic_error {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                mic_error.clone(),
                Style::default().fg(C_MUTED),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), inner);

        // Studio clock, right-aligned
        let clock = chrono::Local::now().format("%H:%M").to_string();
        let clock_width = clock.len() as u16;
        if inner.width > clock_width {
            let clock_area = Rect {
                x: inner.x + inner.width - clock_width,
                y: inner.y,
                width: clock_width,
                height: 1,
            };
            frame.render_widget(
                Paragraph::new(Span::styled(clock, Style::default().fg(C_MUTED))),
                clock_area,
            );
        }
    }
}
