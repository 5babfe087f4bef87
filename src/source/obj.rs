//! Wavefront `.obj` wireframes
//!
//! Faces and polylines become edges. The model is centred and scaled into
//! the unit sphere at load time; each sample traces one point along the
//! edge list, rotates it by the object camera controls and projects it.

use std::f64::consts::PI;

use crate::effects::{linear_speed_to_actual_speed, RenderControls};
use crate::source::frame::PathTracer;
use crate::source::GeometrySource;
use crate::vector::Vector2;

/// Distance from the camera to the model centre
const CAMERA_DISTANCE: f64 = 2.0;

type Point3 = [f64; 3];

#[derive(Clone, Copy, Debug, PartialEq)]
struct Edge {
    start: Point3,
    end: Point3,
}

impl Edge {
    fn length(&self) -> f64 {
        let d = [self.end[0] - self.start[0], self.end[1] - self.start[1], self.end[2] - self.start[2]];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }

    fn point_at(&self, t: f64) -> Point3 {
        [
            self.start[0] + (self.end[0] - self.start[0]) * t,
            self.start[1] + (self.end[1] - self.start[1]) * t,
            self.start[2] + (self.end[2] - self.start[2]) * t,
        ]
    }
}

pub struct ObjSource {
    edges: Vec<Edge>,
    tracer: PathTracer,
    rotation: [f64; 3],
    sample_rate: f64,
}

impl ObjSource {
    /// Parse `.obj` text. Malformed lines are skipped; `None` when no edges
    /// could be built.
    pub fn parse(text: &str) -> Option<Self> {
        let mut vertices: Vec<Point3> = Vec::new();
        let mut polylines: Vec<(Vec<usize>, bool)> = Vec::new();

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let coords: Vec<f64> = tokens.take(3).filter_map(|t| t.parse().ok()).collect();
                    if let [x, y, z] = coords.as_slice() {
                        vertices.push([*x, *y, *z]);
                    }
                }
                Some(kind @ ("f" | "l")) => {
                    // Indices are 1-based and may carry /texture/normal suffixes
                    let indices: Vec<usize> = tokens
                        .filter_map(|t| t.split('/').next())
                        .filter_map(|t| t.parse::<i64>().ok())
                        .filter_map(|i| resolve_index(i, vertices.len()))
                        .collect();
                    polylines.push((indices, kind == "f"));
                }
                _ => {}
            }
        }

        let (centre, scale) = bounds(&vertices)?;
        let normalise = |p: Point3| {
            [
                (p[0] - centre[0]) * scale,
                (p[1] - centre[1]) * scale,
                (p[2] - centre[2]) * scale,
            ]
        };

        let mut edges = Vec::new();
        for (indices, closed) in polylines {
            for pair in indices.windows(2) {
                edges.push(Edge {
                    start: normalise(vertices[pair[0]]),
                    end: normalise(vertices[pair[1]]),
                });
            }
            if closed && indices.len() > 2 {
                edges.push(Edge {
                    start: normalise(vertices[indices[indices.len() - 1]]),
                    end: normalise(vertices[indices[0]]),
                });
            }
        }
        if edges.is_empty() {
            return None;
        }

        let tracer = PathTracer::new(edges.iter().map(Edge::length));
        Some(Self {
            edges,
            tracer,
            rotation: [0.0; 3],
            sample_rate: 44100.0,
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

fn resolve_index(index: i64, count: usize) -> Option<usize> {
    let resolved = if index < 0 { count as i64 + index } else { index - 1 };
    (0..count as i64).contains(&resolved).then_some(resolved as usize)
}

/// Centre of the bounding box and the scale that fits the model in the unit sphere
fn bounds(vertices: &[Point3]) -> Option<(Point3, f64)> {
    let first = vertices.first()?;
    let (mut min, mut max) = (*first, *first);
    for v in vertices {
        for axis in 0..3 {
            min[axis] = min[axis].min(v[axis]);
            max[axis] = max[axis].max(v[axis]);
        }
    }
    let centre = [(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0, (min[2] + max[2]) / 2.0];
    let radius = vertices
        .iter()
        .map(|v| ((v[0] - centre[0]).powi(2) + (v[1] - centre[1]).powi(2) + (v[2] - centre[2]).powi(2)).sqrt())
        .fold(0.0, f64::max);
    let scale = if radius > 0.0 { 1.0 / radius } else { 1.0 };
    Some((centre, scale))
}

fn rotate(p: Point3, angles: [f64; 3]) -> Point3 {
    let [x, y, z] = p;

    let (sin, cos) = angles[0].sin_cos();
    let y2 = cos * y - sin * z;
    let z2 = sin * y + cos * z;

    let (sin, cos) = angles[1].sin_cos();
    let x2 = cos * x + sin * z2;
    let z3 = -sin * x + cos * z2;

    let (sin, cos) = angles[2].sin_cos();
    [cos * x2 - sin * y2, sin * x2 + cos * y2, z3]
}

impl GeometrySource for ObjSource {
    fn next_vector(&mut self, controls: &RenderControls) -> Vector2 {
        let speed = linear_speed_to_actual_speed(controls.obj_rotate_speed());
        let base = controls.obj_rotate();
        let fixed = controls.obj_fixed_rotate();
        let mut angles = [0.0; 3];
        for axis in 0..3 {
            if fixed[axis] {
                self.rotation[axis] = 0.0;
            } else {
                self.rotation[axis] += base[axis] * PI * speed;
            }
            angles[axis] = base[axis] * PI + self.rotation[axis];
        }

        let Some((index, t)) = self
            .tracer
            .advance(controls.frequency(), controls.trace_range(), self.sample_rate)
        else {
            return Vector2::default();
        };
        let [x, y, z] = rotate(self.edges[index].point_at(t), angles);
        let focal = controls.focal_length();
        Vector2::new(x * focal / (CAMERA_DISTANCE - z), y * focal / (CAMERA_DISTANCE - z))
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.tracer.reset();
        self.rotation = [0.0; 3];
    }
}
