use std::sync::Arc;

use crate::script::ScriptVariables;
use crate::vector::Vector2;

/// Body of a user-programmable slot. Publishes the slot's slider value into
/// the shared script variables, where every evaluator reads it.
#[derive(Debug)]
pub struct ScriptedTransform {
    name: String,
    slot: usize,
    variables: Arc<ScriptVariables>,
}

impl ScriptedTransform {
    pub fn new(name: impl Into<String>, slot: usize, variables: Arc<ScriptVariables>) -> Self {
        Self {
            name: name.into(),
            slot,
            variables,
        }
    }

    /// Slot letter sequence: A, B, ... Z, AA, ...
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub(crate) fn apply(&mut self, input: Vector2, values: &[f64]) -> Vector2 {
        self.variables.set(self.slot, values.first().copied().unwrap_or(0.0));
        input
    }
}
