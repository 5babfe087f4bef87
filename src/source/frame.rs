//! Tracing a frame of straight lines at a given drawing frequency

use crate::effects::RenderControls;
use crate::source::GeometrySource;
use crate::vector::Vector2;

/// A straight segment of a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub start: Vector2,
    pub end: Vector2,
}

impl Line {
    pub fn new(start: Vector2, end: Vector2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).magnitude()
    }

    /// Point at `t` in [0, 1] along the line
    pub fn point_at(&self, t: f64) -> Vector2 {
        self.start + (self.end - self.start) * t
    }
}

/// Walks along a path made of consecutive segments of known lengths,
/// covering the `[trace_min, trace_max]` portion once per cycle.
#[derive(Clone, Debug, Default)]
pub struct PathTracer {
    /// Running total of segment lengths, one entry per segment
    cumulative: Vec<f64>,
    drawn: f64,
}

impl PathTracer {
    pub fn new(lengths: impl IntoIterator<Item = f64>) -> Self {
        let mut total = 0.0;
        let cumulative = lengths
            .into_iter()
            .map(|length| {
                total += length;
                total
            })
            .collect();
        Self { cumulative, drawn: 0.0 }
    }

    pub fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.drawn = 0.0;
    }

    /// Advance by one sample and return `(segment index, position in segment)`.
    /// `None` when the path is empty.
    pub fn advance(&mut self, frequency: f64, trace: (f64, f64), sample_rate: f64) -> Option<(usize, f64)> {
        let total = self.total_length();
        if self.cumulative.is_empty() {
            return None;
        }

        let (trace_min, trace_max) = trace;
        let start = trace_min.clamp(0.0, 1.0) * total;
        let end = trace_max.clamp(0.0, 1.0).max(trace_min.clamp(0.0, 1.0)) * total;
        let span = end - start;

        let position = start + self.drawn;
        if span > 0.0 && sample_rate > 0.0 {
            self.drawn += span * frequency / sample_rate;
            if self.drawn >= span {
                self.drawn %= span;
            }
        } else {
            self.drawn = 0.0;
        }

        let index = self
            .cumulative
            .partition_point(|&c| c <= position)
            .min(self.cumulative.len() - 1);
        let segment_end = self.cumulative[index];
        let segment_start = if index == 0 { 0.0 } else { self.cumulative[index - 1] };
        let length = segment_end - segment_start;
        let t = if length > 0.0 {
            ((position - segment_start) / length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some((index, t))
    }
}

/// A flat frame of lines, traced at the drawing frequency
#[derive(Clone, Debug)]
pub struct ShapeFrame {
    lines: Vec<Line>,
    tracer: PathTracer,
    sample_rate: f64,
}

impl ShapeFrame {
    pub fn new(lines: Vec<Line>) -> Self {
        let tracer = PathTracer::new(lines.iter().map(Line::length));
        Self {
            lines,
            tracer,
            sample_rate: 44100.0,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}

/// Square shown when no file is selected
pub fn default_shape() -> ShapeFrame {
    let corners = [
        Vector2::new(-0.5, -0.5),
        Vector2::new(0.5, -0.5),
        Vector2::new(0.5, 0.5),
        Vector2::new(-0.5, 0.5),
    ];
    let lines = (0..corners.len())
        .map(|i| Line::new(corners[i], corners[(i + 1) % corners.len()]))
        .collect();
    ShapeFrame::new(lines)
}

impl GeometrySource for ShapeFrame {
    fn next_vector(&mut self, controls: &RenderControls) -> Vector2 {
        match self
            .tracer
            .advance(controls.frequency(), controls.trace_range(), self.sample_rate)
        {
            Some((index, t)) => self.lines[index].point_at(t),
            None => Vector2::default(),
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.tracer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_traced_once_per_cycle() {
        let controls = RenderControls::new();
        controls.set_frequency(1.0);
        let mut square = default_shape();
        square.set_sample_rate(8.0);

        let points: Vec<Vector2> = (0..8).map(|_| square.next_vector(&controls)).collect();
        assert_eq!(points[0], Vector2::new(-0.5, -0.5));
        assert_eq!(points[2], Vector2::new(0.5, -0.5));
        assert_eq!(points[4], Vector2::new(0.5, 0.5));
        assert_eq!(points[6], Vector2::new(-0.5, 0.5));
        assert_eq!(square.next_vector(&controls), points[0], "cycle restarts");
    }

    #[test]
    fn test_trace_range_limits_drawing() {
        let controls = RenderControls::new();
        controls.set_frequency(1.0);
        controls.set_trace_min(0.25);
        controls.set_trace_max(0.5);
        let mut square = default_shape();
        square.set_sample_rate(16.0);
        for _ in 0..64 {
            let p = square.next_vector(&controls);
            assert_eq!(p.x, 0.5, "only the right edge should be drawn, got {:?}", p);
        }
    }

    #[test]
    fn test_empty_frame_is_silent() {
        let controls = RenderControls::new();
        let mut frame = ShapeFrame::new(Vec::new());
        assert_eq!(frame.next_vector(&controls), Vector2::default());
    }
}
