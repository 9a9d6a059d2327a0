//! Meter configuration: the position alphabet, allowed position shapes,
//! constraint set, categorical subset, and weights.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::constraints::Constraint;
use crate::error::ParseError;
use crate::syllable::SecondaryStressMode;

/// A position shape: a string over `{w, s}`, length >= 1 (e.g. `"w"`,
/// `"ww"`, `"s"`).
pub type MeterPositionShape = String;

fn valid_shape(shape: &str) -> bool {
    !shape.is_empty() && shape.chars().all(|c| c == 'w' || c == 's')
}

/// Immutable, validated meter configuration. Construct via
/// [`MeterConfigBuilder`].
pub struct MeterConfig {
    position_shapes: Vec<MeterPositionShape>,
    max_w: usize,
    max_s: usize,
    constraints: Vec<Arc<dyn Constraint>>,
    constraint_weights: HashMap<String, f64>,
    categorical_constraint_names: HashSet<String>,
    secondary_stress_mode: SecondaryStressMode,
    prefer_rising: bool,
    /// Whether ambiguous stress readings should spawn separate matrices.
    /// That expansion happens upstream of this core, in whatever layer
    /// resolves a word into one or more `WordFormMatrix` readings; the
    /// core never acts on this flag itself, it only threads it through
    /// for round-trip fidelity with callers that persist a `MeterConfig`.
    resolve_optionality: bool,
}

impl MeterConfig {
    pub fn builder() -> MeterConfigBuilder {
        MeterConfigBuilder::default()
    }

    pub fn position_shapes(&self) -> &[MeterPositionShape] {
        &self.position_shapes
    }

    /// Shapes whose leading symbol differs from `prev_meter_val`, in
    /// declared order, for deterministic child enumeration.
    pub fn shapes_starting_differently_than(&self, prev_meter_val: char) -> Vec<&str> {
        self.position_shapes
            .iter()
            .map(|s| s.as_str())
            .filter(|s| s.chars().next() != Some(prev_meter_val))
            .collect()
    }

    pub fn max_for(&self, meter_val: char) -> usize {
        if meter_val == 's' {
            self.max_s
        } else {
            self.max_w
        }
    }

    pub fn constraints(&self) -> &[Arc<dyn Constraint>] {
        &self.constraints
    }

    pub fn weight_of(&self, name: &str) -> f64 {
        self.constraint_weights.get(name).copied().unwrap_or(1.0)
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.categorical_constraint_names.contains(name)
    }

    pub fn secondary_stress_mode(&self) -> SecondaryStressMode {
        self.secondary_stress_mode
    }

    pub fn prefer_rising(&self) -> bool {
        self.prefer_rising
    }

    pub fn resolve_optionality(&self) -> bool {
        self.resolve_optionality
    }
}

/// Builder for [`MeterConfig`]; performs all configuration-error
/// validation at `build()` time.
pub struct MeterConfigBuilder {
    position_shapes: Vec<MeterPositionShape>,
    max_w: usize,
    max_s: usize,
    constraints: Vec<Arc<dyn Constraint>>,
    constraint_weights: HashMap<String, f64>,
    categorical_constraint_names: HashSet<String>,
    secondary_stress_mode: SecondaryStressMode,
    prefer_rising: bool,
    resolve_optionality: bool,
}

impl Default for MeterConfigBuilder {
    fn default() -> Self {
        MeterConfigBuilder {
            position_shapes: Vec::new(),
            max_w: 2,
            max_s: 2,
            constraints: Vec::new(),
            constraint_weights: HashMap::new(),
            categorical_constraint_names: HashSet::new(),
            secondary_stress_mode: SecondaryStressMode::Stressed,
            prefer_rising: true,
            resolve_optionality: true,
        }
    }
}

impl MeterConfigBuilder {
    pub fn position_shapes<I, S>(mut self, shapes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MeterPositionShape>,
    {
        self.position_shapes = shapes.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_w(mut self, n: usize) -> Self {
        self.max_w = n;
        self
    }

    pub fn max_s(mut self, n: usize) -> Self {
        self.max_s = n;
        self
    }

    pub fn constraint(mut self, c: Arc<dyn Constraint>) -> Self {
        self.constraints.push(c);
        self
    }

    pub fn weight(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.constraint_weights.insert(name.into(), weight);
        self
    }

    pub fn categorical(mut self, name: impl Into<String>) -> Self {
        self.categorical_constraint_names.insert(name.into());
        self
    }

    pub fn secondary_stress_mode(mut self, mode: SecondaryStressMode) -> Self {
        self.secondary_stress_mode = mode;
        self
    }

    pub fn prefer_rising(mut self, v: bool) -> Self {
        self.prefer_rising = v;
        self
    }

    pub fn resolve_optionality(mut self, v: bool) -> Self {
        self.resolve_optionality = v;
        self
    }

    pub fn build(self) -> Result<MeterConfig, ParseError> {
        if self.position_shapes.is_empty() {
            return Err(ParseError::MeterMisconfigured(
                "position_shapes must not be empty".into(),
            ));
        }
        for shape in &self.position_shapes {
            if !valid_shape(shape) {
                return Err(ParseError::MeterMisconfigured(format!(
                    "shape '{shape}' uses characters outside the {{w, s}} alphabet"
                )));
            }
        }
        if !self.position_shapes.iter().any(|s| s.starts_with('w')) {
            return Err(ParseError::MeterMisconfigured(
                "position_shapes must include at least one w-shape".into(),
            ));
        }
        if !self.position_shapes.iter().any(|s| s.starts_with('s')) {
            return Err(ParseError::MeterMisconfigured(
                "position_shapes must include at least one s-shape".into(),
            ));
        }

        let registered: HashSet<&str> = self.constraints.iter().map(|c| c.name()).collect();
        for name in self.constraint_weights.keys() {
            if !registered.contains(name.as_str()) {
                return Err(ParseError::MeterMisconfigured(format!(
                    "weight given for unregistered constraint '{name}'"
                )));
            }
        }
        for (name, weight) in &self.constraint_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ParseError::MeterMisconfigured(format!(
                    "weight for '{name}' must be finite and non-negative, got {weight}"
                )));
            }
        }
        for name in &self.categorical_constraint_names {
            if !registered.contains(name.as_str()) {
                return Err(ParseError::MeterMisconfigured(format!(
                    "categorical constraint '{name}' is not in the constraint list"
                )));
            }
        }

        Ok(MeterConfig {
            position_shapes: self.position_shapes,
            max_w: self.max_w,
            max_s: self.max_s,
            constraints: self.constraints,
            constraint_weights: self.constraint_weights,
            categorical_constraint_names: self.categorical_constraint_names,
            secondary_stress_mode: self.secondary_stress_mode,
            prefer_rising: self.prefer_rising,
            resolve_optionality: self.resolve_optionality,
        })
    }
}
