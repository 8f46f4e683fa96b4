//! Status bar — bottom line with the record state and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::{C_MUTED, C_ON_AIR, C_SECONDARY, C_SEPARATOR};

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer. `record_label` is the localized toggle
/// label ("Record" or "Stop"); `hints` are `(key, label)` pairs.
pub fn draw_keys_bar(
    frame: &mut Frame,
    area: Rect,
    recording: bool,
    record_label: &str,
    hints: &[(&str, String)],
) {
    let mut spans = Vec::new();
    if recording {
        spans.push(Span::styled(
            " ● ",
            Style::default().fg(C_ON_AIR).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(
        format!("r {record_label}"),
        Style::default().fg(C_SECONDARY),
    ));

    for (key, label) in hints {
        spans.push(Span::styled("  ·  ", Style::default().fg(C_MUTED)));
        spans.push(Span::styled(
            format!("{key} {label}"),
            Style::default().fg(C_SECONDARY),
        ));
    }

    // Truncate from the right if the terminal is too narrow
    let mut width = 0u16;
    let mut kept = Vec::new();
    for span in spans {
        let w = span.content.width() as u16;
        if width + w > area.width {
            break;
        }
        width += w;
        kept.push(span);
    }

    frame.render_widget(Paragraph::new(Line::from(kept)), area);
}
