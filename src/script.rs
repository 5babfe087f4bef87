//! Scripting boundary
//!
//! The sandboxed expression language lives outside this crate. The pipeline
//! only sees a [`ScriptEngine`] that compiles source text into a
//! [`ScriptEvaluator`], which takes named numeric inputs and writes a small
//! ordered result set into a caller-provided buffer.

use std::sync::Arc;

use crate::error::ScriptError;
use crate::parameter::AtomicF64;

/// Code the perspective effect starts with: pass the point through
pub const DEFAULT_PERSPECTIVE_CODE: &str = "return { x, y, z }";

/// Variable names for the scripted slider slots, in slot order
pub const SLIDER_NAMES: [&str; 26] = [
    "slider_a", "slider_b", "slider_c", "slider_d", "slider_e", "slider_f", "slider_g",
    "slider_h", "slider_i", "slider_j", "slider_k", "slider_l", "slider_m", "slider_n",
    "slider_o", "slider_p", "slider_q", "slider_r", "slider_s", "slider_t", "slider_u",
    "slider_v", "slider_w", "slider_x", "slider_y", "slider_z",
];

/// A compiled user script
///
/// Implementations must not block and must not allocate unboundedly;
/// `run` is called from the audio thread.
pub trait ScriptEvaluator: Send {
    fn set_variable(&mut self, name: &str, value: f64);

    /// Run the script, writing results into `output`.
    /// Returns how many results were written.
    fn run(&mut self, output: &mut [f64]) -> Result<usize, ScriptError>;
}

/// Compiles user code into evaluators
pub trait ScriptEngine: Send + Sync {
    fn compile(&self, code: &str) -> Result<Box<dyn ScriptEvaluator>, ScriptError>;
}

/// Engine used when no scripting sandbox is attached: every script returns
/// its `x`, `y`, `z` inputs unchanged.
#[derive(Debug, Default)]
pub struct PassthroughScriptEngine;

impl ScriptEngine for PassthroughScriptEngine {
    fn compile(&self, _code: &str) -> Result<Box<dyn ScriptEvaluator>, ScriptError> {
        Ok(Box::new(PassthroughEvaluator::default()))
    }
}

#[derive(Debug, Default)]
struct PassthroughEvaluator {
    xyz: [f64; 3],
}

impl ScriptEvaluator for PassthroughEvaluator {
    fn set_variable(&mut self, name: &str, value: f64) {
        match name {
            "x" => self.xyz[0] = value,
            "y" => self.xyz[1] = value,
            "z" => self.xyz[2] = value,
            _ => {}
        }
    }

    fn run(&mut self, output: &mut [f64]) -> Result<usize, ScriptError> {
        let n = output.len().min(3);
        output[..n].copy_from_slice(&self.xyz[..n]);
        Ok(n)
    }
}

/// Slider values published by the scripted slots and read by every script
#[derive(Debug)]
pub struct ScriptVariables {
    values: Vec<AtomicF64>,
}

impl ScriptVariables {
    pub fn new(slots: usize) -> Self {
        Self {
            values: (0..slots).map(|_| AtomicF64::new(0.0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, slot: usize) -> f64 {
        self.values.get(slot).map(AtomicF64::load).unwrap_or(0.0)
    }

    pub fn set(&self, slot: usize, value: f64) {
        if let Some(v) = self.values.get(slot) {
            v.store(value);
        }
    }

    /// Hand every named slider value to an evaluator
    pub fn apply_to(&self, evaluator: &mut dyn ScriptEvaluator) {
        for (value, name) in self.values.iter().zip(SLIDER_NAMES.iter()) {
            evaluator.set_variable(name, value.load());
        }
    }
}

/// Source code plus its compiled evaluator, owned by a transform
pub struct ScriptedFunction {
    code: String,
    evaluator: Option<Box<dyn ScriptEvaluator>>,
    variables: Arc<ScriptVariables>,
    failed: bool,
}

impl ScriptedFunction {
    pub fn new(engine: &dyn ScriptEngine, code: &str, variables: Arc<ScriptVariables>) -> Self {
        let mut function = Self {
            code: String::new(),
            evaluator: None,
            variables,
            failed: false,
        };
        if let Err(e) = function.update_code(engine, code) {
            log::warn!("script failed to compile: {}", e);
        }
        function
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replace the code. On a compile error the code is still stored, the
    /// previous evaluator is dropped and evaluation passes input through.
    pub fn update_code(&mut self, engine: &dyn ScriptEngine, code: &str) -> Result<(), ScriptError> {
        let compiled = engine.compile(code);
        self.install(code, compiled)
    }

    /// Install an already compiled evaluator (compile outside the effect lock)
    pub fn install(&mut self, code: &str, compiled: Result<Box<dyn ScriptEvaluator>, ScriptError>) -> Result<(), ScriptError> {
        self.code = code.to_string();
        self.failed = false;
        match compiled {
            Ok(evaluator) => {
                self.evaluator = Some(evaluator);
                Ok(())
            }
            Err(e) => {
                self.evaluator = None;
                Err(e)
            }
        }
    }

    /// Whether the last run reported an error
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Evaluate with `x`, `y`, `z` inputs. Returns `None` when there is no
    /// evaluator, when the script fails, or when it produced fewer than
    /// three results.
    pub fn evaluate_xyz(&mut self, x: f64, y: f64, z: f64) -> Option<[f64; 3]> {
        let evaluator = self.evaluator.as_mut()?;
        evaluator.set_variable("x", x);
        evaluator.set_variable("y", y);
        evaluator.set_variable("z", z);
        self.variables.apply_to(evaluator.as_mut());

        let mut out = [0.0; 3];
        match evaluator.run(&mut out) {
            Ok(n) if n >= 3 => {
                self.failed = false;
                Some(out)
            }
            Ok(_) => None,
            Err(_) => {
                self.failed = true;
                None
            }
        }
    }
}

/// Spreadsheet-style column name for a 1-based slot number: A..Z, AA, AB, ...
pub fn slot_name(mut number: usize) -> String {
    let mut name = Vec::new();
    while number > 0 {
        let rem = (number - 1) % 26;
        name.push(b'A' + rem as u8);
        number = (number - rem) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}
