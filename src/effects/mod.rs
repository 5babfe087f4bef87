//! Transform library and the static effect catalog

pub mod bit_crush;
pub mod bulge;
pub mod controls;
pub mod delay;
pub mod distort;
pub mod perspective;
pub mod rotate;
pub mod scripted;
pub mod smooth;
pub mod trace;
pub mod translate;
pub mod vector_cancelling;
pub mod wobble;

pub use self::bit_crush::*;
pub use self::bulge::*;
pub use self::controls::*;
pub use self::delay::*;
pub use self::distort::*;
pub use self::perspective::*;
pub use self::rotate::*;
pub use self::scripted::*;
pub use self::smooth::*;
pub use self::trace::*;
pub use self::translate::*;
pub use self::vector_cancelling::*;
pub use self::wobble::*;

use std::sync::Arc;

use crate::effect::Effect;
use crate::parameter::{BooleanParameter, EffectParameter};
use crate::script::{slot_name, ScriptEngine, ScriptVariables};

pub const PERSPECTIVE_ID: &str = "perspective";
pub const TRACE_MIN_ID: &str = "traceMin";
pub const TRACE_MAX_ID: &str = "traceMax";

/// Step of the scripted slot sliders
const SCRIPTED_STEP: f64 = 0.001;

/// Map a linear [-1, 1] speed onto an angular increment per sample.
/// Odd and monotonic, flat around zero so small values rotate slowly.
pub fn linear_speed_to_actual_speed(speed: f64) -> f64 {
    let magnitude = speed.abs().min(10.0);
    speed.signum() * ((3.0 * magnitude).exp() - 1.0) / 50000.0
}

/// User-orderable effects in catalog order, plus the perspective effect's
/// fixed-rotation flags (registered as boolean parameters by the pipeline)
pub fn toggleable_effects(
    controls: &Arc<RenderControls>,
    engine: &dyn ScriptEngine,
    variables: &Arc<ScriptVariables>,
) -> (Vec<Effect>, [Arc<BooleanParameter>; 3]) {
    let perspective = PerspectiveEffect::new(engine, variables.clone());
    let fixed_rotate = perspective.fixed_rotate_parameters().clone();

    let effects = vec![
        Effect::new(
            BitCrushEffect::new(),
            vec![EffectParameter::new("Bit Crush", "bitCrush", 0.0, 0.0, 1.0)],
            "bitCrush",
        ),
        Effect::new(
            BulgeEffect::new(),
            vec![EffectParameter::new("Bulge", "bulge", 0.0, 0.0, 1.0)],
            "bulge",
        ),
        Effect::new(
            RotateEffect::new(),
            vec![EffectParameter::new("2D Rotate", "2DRotateSpeed", 0.0, 0.0, 1.0)],
            "2DRotate",
        ),
        Effect::new(
            VectorCancellingEffect::new(),
            vec![EffectParameter::new("Vector Cancelling", "vectorCancelling", 0.0, 0.0, 1.0)],
            "vectorCancelling",
        ),
        Effect::new(
            DistortEffect::new(DistortAxis::X),
            vec![EffectParameter::new("Distort X", "distortX", 0.0, 0.0, 1.0)],
            "distortX",
        ),
        Effect::new(
            DistortEffect::new(DistortAxis::Y),
            vec![EffectParameter::new("Distort Y", "distortY", 0.0, 0.0, 1.0)],
            "distortY",
        ),
        Effect::new(
            TranslateEffect::new(),
            vec![
                EffectParameter::new("Translate X", "translateX", 0.0, -1.0, 1.0),
                EffectParameter::new("Translate Y", "translateY", 0.0, -1.0, 1.0),
            ],
            "translate",
        ),
        Effect::new(
            SmoothEffect::new(),
            vec![EffectParameter::new("Smoothing", "smoothing", 0.0, 0.0, 1.0)],
            "smoothing",
        ),
        Effect::new(
            WobbleEffect::new(controls.clone()),
            vec![EffectParameter::new("Wobble", "wobble", 0.0, 0.0, 1.0)],
            "wobble",
        ),
        Effect::new(
            DelayEffect::new(),
            vec![
                EffectParameter::new("Delay Decay", "delayDecay", 0.0, 0.0, 1.0),
                EffectParameter::new("Delay Length", "delayLength", 0.5, 0.0, 1.0),
            ],
            "delay",
        ),
        Effect::new(
            perspective,
            vec![
                EffectParameter::new("3D Perspective", "perspectiveStrength", 0.0, 0.0, 1.0),
                EffectParameter::new("Depth (z)", "perspectiveZPos", 0.1, 0.0, 1.0),
                EffectParameter::new("Rotate Speed", "perspectiveRotateSpeed", 0.0, -1.0, 1.0),
                EffectParameter::new("Rotate X", "perspectiveRotateX", 1.0, -1.0, 1.0),
                EffectParameter::new("Rotate Y", "perspectiveRotateY", 1.0, -1.0, 1.0),
                EffectParameter::new("Rotate Z", "perspectiveRotateZ", 0.0, -1.0, 1.0),
            ],
            PERSPECTIVE_ID,
        ),
        Effect::new(
            TraceEffect::new(controls.clone(), TraceBound::Max),
            vec![EffectParameter::new("Trace max", TRACE_MAX_ID, 1.0, 0.0, 1.0)],
            TRACE_MAX_ID,
        ),
        Effect::new(
            TraceEffect::new(controls.clone(), TraceBound::Min),
            vec![EffectParameter::new("Trace min", TRACE_MIN_ID, 0.0, 0.0, 1.0)],
            TRACE_MIN_ID,
        ),
    ];

    (effects, fixed_rotate)
}

/// Always-on effects in their fixed order
pub fn permanent_effects(controls: &Arc<RenderControls>) -> Vec<Effect> {
    let control = |target, parameter: EffectParameter, id: &str| {
        let mut effect = Effect::new(ControlEffect::new(controls.clone(), target), vec![parameter], id);
        effect.mark_enableable(false);
        effect.set_enabled(true);
        effect
    };

    vec![
        control(
            ControlTarget::Frequency,
            EffectParameter::with_step("Frequency", "frequency", 440.0, 0.0, 12000.0, 0.1),
            "frequency",
        ),
        control(
            ControlTarget::Volume,
            EffectParameter::new("Volume", "volume", 1.0, 0.0, 3.0),
            "volume",
        ),
        control(
            ControlTarget::Threshold,
            EffectParameter::new("Threshold", "threshold", 1.0, 0.0, 1.0),
            "threshold",
        ),
        control(
            ControlTarget::ObjRotateSpeed,
            EffectParameter::new("Rotate Speed", "objRotateSpeed", 0.0, -1.0, 1.0),
            "objRotateSpeed",
        ),
        control(
            ControlTarget::ObjRotateX,
            EffectParameter::new("Rotate X", "objRotateX", 1.0, -1.0, 1.0),
            "objRotateX",
        ),
        control(
            ControlTarget::ObjRotateY,
            EffectParameter::new("Rotate Y", "objRotateY", 1.0, -1.0, 1.0),
            "objRotateY",
        ),
        control(
            ControlTarget::ObjRotateZ,
            EffectParameter::new("Rotate Z", "objRotateZ", 0.0, -1.0, 1.0),
            "objRotateZ",
        ),
        control(
            ControlTarget::ObjFocalLength,
            EffectParameter::new("Focal length", "objFocalLength", 1.0, 0.0, 2.0),
            "objFocalLength",
        ),
    ]
}

/// Scripted slot number `number` (1-based): `luaA`, `luaB`, ...
pub fn scripted_effect(number: usize, variables: &Arc<ScriptVariables>) -> Effect {
    let name = slot_name(number);
    let id = format!("lua{name}");
    let parameter = EffectParameter::with_step(&format!("Lua {name}"), &id, 0.0, 0.0, 1.0, SCRIPTED_STEP).without_lfo();
    let mut effect = Effect::scripted(ScriptedTransform::new(name, number - 1, variables.clone()), parameter, &id);
    effect.mark_enableable(false);
    effect.set_enabled(true);
    effect
}
