//! 3D perspective projection of the 2D image
//!
//! The point is lifted to `(x, y, 0)`, optionally remapped by user code,
//! rotated around X then Y then Z and projected through a pinhole camera.
//! The result is blended with the untouched input by the strength value.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::effect::EffectApplication;
use crate::effects::linear_speed_to_actual_speed;
use crate::parameter::BooleanParameter;
use crate::script::{ScriptEngine, ScriptVariables, ScriptedFunction, DEFAULT_PERSPECTIVE_CODE};
use crate::vector::Vector2;

const FOCAL_LENGTH: f64 = 1.0;

pub struct PerspectiveEffect {
    function: ScriptedFunction,
    fixed_rotate: [Arc<BooleanParameter>; 3],
    current_rotate: [f64; 3],
}

impl PerspectiveEffect {
    pub fn new(engine: &dyn ScriptEngine, variables: Arc<ScriptVariables>) -> Self {
        Self {
            function: ScriptedFunction::new(engine, DEFAULT_PERSPECTIVE_CODE, variables),
            fixed_rotate: [
                Arc::new(BooleanParameter::new("Perspective Fixed Rotate X", "perspectiveFixedRotateX", false)),
                Arc::new(BooleanParameter::new("Perspective Fixed Rotate Y", "perspectiveFixedRotateY", false)),
                Arc::new(BooleanParameter::new("Perspective Fixed Rotate Z", "perspectiveFixedRotateZ", false)),
            ],
            current_rotate: [0.0; 3],
        }
    }

    /// Flags that stop rotation accumulating around each axis
    pub fn fixed_rotate_parameters(&self) -> &[Arc<BooleanParameter>; 3] {
        &self.fixed_rotate
    }
}

/// Depth of the camera plane for a [0, 1] position, 0.1 being the default
pub fn depth_for(position: f64) -> f64 {
    1.0 + (position - 0.1) * 3.0
}

impl EffectApplication for PerspectiveEffect {
    fn apply(&mut self, _index: usize, input: Vector2, values: &[f64], _sample_rate: f64) -> Vector2 {
        let strength = values[0];
        let depth = depth_for(values[1]);
        let speed = linear_speed_to_actual_speed(values[2]);
        let base = [values[3] * PI, values[4] * PI, values[5] * PI];

        for axis in 0..3 {
            if self.fixed_rotate[axis].get() {
                self.current_rotate[axis] = 0.0;
            } else {
                self.current_rotate[axis] += base[axis] * speed;
            }
        }

        if strength == 0.0 {
            return input;
        }

        let (mut x, mut y, mut z) = (input.x, input.y, 0.0);
        if let Some([sx, sy, sz]) = self.function.evaluate_xyz(x, y, z) {
            x = sx;
            y = sy;
            z = sz;
        }

        let rotate_x = base[0] + self.current_rotate[0];
        let rotate_y = base[1] + self.current_rotate[1];
        let rotate_z = base[2] + self.current_rotate[2];

        let (sin, cos) = rotate_x.sin_cos();
        let y2 = cos * y - sin * z;
        let z2 = sin * y + cos * z;

        let (sin, cos) = rotate_y.sin_cos();
        let x2 = cos * x + sin * z2;
        let z3 = -sin * x + cos * z2;

        let (sin, cos) = rotate_z.sin_cos();
        let x3 = cos * x2 - sin * y2;
        let y3 = sin * x2 + cos * y2;

        let projected = Vector2::new(x3 * FOCAL_LENGTH / (z3 - depth), y3 * FOCAL_LENGTH / (z3 - depth));
        input * (1.0 - strength) + projected * strength
    }

    fn script(&self) -> Option<&ScriptedFunction> {
        Some(&self.function)
    }

    fn script_mut(&mut self) -> Option<&mut ScriptedFunction> {
        Some(&mut self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::PassthroughScriptEngine;

    fn perspective() -> PerspectiveEffect {
        PerspectiveEffect::new(&PassthroughScriptEngine, Arc::new(ScriptVariables::new(26)))
    }

    #[test]
    fn test_default_depth() {
        assert_eq!(depth_for(0.1), 1.0);
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let mut effect = perspective();
        let input = Vector2::new(0.37, -0.81);
        for i in 0..100 {
            let out = effect.apply(i, input, &[0.0, 0.9, 1.0, 0.3, -0.6, 0.8], 48000.0);
            assert_eq!(out, input);
        }
    }

    #[test]
    fn test_full_strength_projects_without_rotation() {
        let mut effect = perspective();
        let out = effect.apply(0, Vector2::new(0.5, 0.25), &[1.0, 0.1, 0.0, 0.0, 0.0, 0.0], 48000.0);
        // z = 0 and depth = 1: x' = x / (0 - 1)
        assert!((out.x + 0.5).abs() < 1e-12);
        assert!((out.y + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_axis_does_not_accumulate() {
        let mut effect = perspective();
        for axis in effect.fixed_rotate_parameters() {
            axis.set(true);
        }
        let values = [1.0, 0.1, 1.0, 0.5, 0.5, 0.5];
        let first = effect.apply(0, Vector2::new(0.3, 0.3), &values, 48000.0);
        let later = effect.apply(1, Vector2::new(0.3, 0.3), &values, 48000.0);
        assert_eq!(first, later);
    }
}
