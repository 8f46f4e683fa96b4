//! Oscilloscope rendering — time-domain PCM drawn as a connected polyline.
//!
//! Kept deliberately close to scope-tui's shape: a `GraphConfig` describing
//! the sample window and vertical scale, and a processing step that turns a
//! sample slice into ratatui `Chart` datasets with a zero-line reference.

use ratatui::{
    style::{Color, Style},
    symbols::Marker,
    widgets::{Axis, Dataset, GraphType},
};

#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Number of PCM samples per frame (the X extent).
    pub samples: u32,
    /// Vertical half-range; 1.0 fits the full -1..1 PCM range exactly.
    pub scale: f64,
    pub marker_type: Marker,
    pub trace_color: Color,
    pub axis_color: Color,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            samples: 2048,
            scale: 1.0,
            marker_type: Marker::Braille,
            trace_color: crate::theme::C_SCOPE_TRACE,
            axis_color: Color::Rgb(40, 40, 40),
        }
    }
}

impl GraphConfig {
    pub fn x_axis(&self) -> Axis<'_> {
        Axis::default()
            .style(Style::default().fg(self.axis_color))
            .bounds([0.0, f64::from(self.samples)])
    }

    pub fn y_axis(&self) -> Axis<'_> {
        Axis::default()
            .style(Style::default().fg(self.axis_color))
            .bounds([-self.scale, self.scale])
    }
}

pub struct Oscilloscope {
    /// Zero-line reference plus the trace, rebuilt each frame.
    reference: Vec<(f64, f64)>,
    trace: Vec<(f64, f64)>,
}

impl Default for Oscilloscope {
    fn default() -> Self {
        Self {
            reference: Vec::new(),
            trace: Vec::new(),
        }
    }
}

impl Oscilloscope {
    /// Rebuild the point sets for one frame. `window` is the most recent
    /// slice of PCM, padded on the left when shorter than the configured
    /// sample count so the trace stays right-aligned.
    pub fn process(&mut self, cfg: &GraphConfig, window: &[f32]) {
        let n = cfg.samples as usize;

        self.reference.clear();
        self.reference.push((0.0, 0.0));
        self.reference.push((n as f64, 0.0));

        self.trace.clear();
        self.trace.reserve(window.len().min(n));
        let offset = n.saturating_sub(window.len());
        let take = window.len().min(n);
        for (i, &s) in window[window.len() - take..].iter().enumerate() {
            self.trace.push(((offset + i) as f64, f64::from(s)));
        }
    }

    pub fn datasets<'a>(&'a self, cfg: &GraphConfig) -> Vec<Dataset<'a>> {
        vec![
            Dataset::default()
                .marker(cfg.marker_type)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(cfg.axis_color))
                .data(&self.reference),
            Dataset::default()
                .marker(cfg.marker_type)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(cfg.trace_color))
                .data(&self.trace),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_window_is_right_aligned() {
        let cfg = GraphConfig {
            samples: 8,
            ..GraphConfig::default()
        };
        let mut scope = Oscilloscope::default();
        scope.process(&cfg, &[0.5, -0.5]);
        assert_eq!(scope.trace.len(), 2);
        assert_eq!(scope.trace[0].0, 6.0);
        assert_eq!(scope.trace[1], (7.0, -0.5));
    }

    #[test]
    fn test_long_window_keeps_most_recent() {
        let cfg = GraphConfig {
            samples: 4,
            ..GraphConfig::default()
        };
        let mut scope = Oscilloscope::default();
        let window: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
        scope.process(&cfg, &window);
        assert_eq!(scope.trace.len(), 4);
        // the newest sample lands on the right edge
        assert!((scope.trace[3].1 - 0.9).abs() < 1e-6);
    }
}
