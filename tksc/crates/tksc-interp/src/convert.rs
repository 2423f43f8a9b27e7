//! Conversion plumbing: evaluating spec scripts and composing BFS paths.
//!
//! Managers store conversion routes as parsed scripts; this module walks a
//! route, evaluating each hop with `input` bound to the running value in a
//! fresh reference frame, and wraps the final result back into the target
//! subtype when the script returned raw data.

use indexmap::IndexMap;

use tksc_spec::color::HEX_COLOR_URI;
use tksc_spec::{Config, Script};
use tksc_sym::ops::UnitCoercion;
use tksc_sym::value::is_valid_hex;
use tksc_sym::{Color, Unit, Value, WithUnit};
use tracing::trace;

use crate::error::{EvalError, Result};
use crate::interp::Interpreter;
use crate::refs::{RefEntry, References};

/// Evaluates a spec script with the `input` reference bound to `input`.
///
/// Each script runs in a fresh interpreter and reference frame so nested
/// evaluation cannot leak into the calling scope.
pub fn eval_script(config: &Config, script: &Script, input: Value) -> Result<Value> {
    let mut refs = References::new();
    refs.insert("input".to_string(), RefEntry::Value(input));
    let mut interpreter = Interpreter::new(config);
    interpreter.evaluate(&script.program, &refs)
}

/// Converts a color to the subtype named in a `.to.<subtype>()` call.
pub fn convert_color(config: &Config, color: &Color, target_subtype: &str) -> Result<Value> {
    let source_uri = match color {
        Color::Hex(_) => HEX_COLOR_URI.trim_end_matches('/').to_string(),
        Color::Dynamic { subtype, .. } => config
            .colors
            .uri_for_subtype(subtype)
            .ok_or_else(|| tksc_spec::SpecError::UnknownSubtype {
                subtype: subtype.clone(),
            })?
            .clone(),
    };
    let target_spec = config.colors.spec_by_subtype(target_subtype).ok_or_else(|| {
        tksc_spec::SpecError::UnknownSubtype {
            subtype: target_subtype.to_string(),
        }
    })?;
    let target_uri = target_spec.uri.clone();
    let target_name = target_spec.name.clone();

    let path = config.colors.conversion_path(&source_uri, &target_uri)?;
    trace!(from = %source_uri, to = %target_uri, hops = path.len(), "converting color");

    let mut current = Value::Color(color.clone());
    for edge in path {
        current = eval_script(config, &edge.script, current)?;
    }
    wrap_color_result(config, current, &target_name)
}

/// Wraps a script result into a color of `subtype`: colors pass through,
/// dictionaries become dynamic colors, hex-shaped strings become hex
/// literals.
pub fn wrap_color_result(_config: &Config, value: Value, subtype: &str) -> Result<Value> {
    match value {
        Value::Color(color) => Ok(Value::Color(color)),
        Value::Dictionary(dict) => {
            let attrs: IndexMap<String, Value> = dict.entries;
            Ok(Value::Color(Color::Dynamic {
                subtype: subtype.to_string(),
                attrs,
            }))
        }
        Value::Str(text) if is_valid_hex(&text) => Ok(Value::Color(Color::Hex(text))),
        other => Err(EvalError::BadConversionResult {
            found: other.type_name(),
        }),
    }
}

/// Converts a dimensioned number to another unit through the shortest
/// registered conversion path.
pub fn convert_unit(config: &Config, value: &WithUnit, target: &str) -> Result<WithUnit> {
    if value.unit.as_str() == target.to_lowercase() {
        return Ok(value.clone());
    }

    let path = config.units.conversion_path(value.unit.as_str(), target)?;
    trace!(from = %value.unit, to = %target, hops = path.len(), "converting unit");

    let mut current = Value::WithUnit(value.clone());
    for edge in path {
        let result = eval_script(config, &edge.script, current)?;
        // A bare number from a hop takes on the hop's target unit.
        current = match result {
            Value::WithUnit(n) => Value::WithUnit(n),
            Value::Number(n) => {
                let keyword = config
                    .units
                    .keyword_for_uri(&edge.target)
                    .unwrap_or(target);
                Value::WithUnit(WithUnit::new(n.value, n.is_float, Unit::new(keyword)))
            }
            other => {
                return Err(EvalError::BadUnitConversionResult {
                    found: other.type_name(),
                })
            }
        };
    }

    match current {
        Value::WithUnit(n) => Ok(n),
        other => Err(EvalError::BadUnitConversionResult {
            found: other.type_name(),
        }),
    }
}

/// The [`UnitCoercion`] seam the operation kernels call into: finds the
/// common format for two dimensioned operands and converts both.
pub struct UnitCoercer<'c> {
    config: &'c Config,
}

impl<'c> UnitCoercer<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }
}

impl UnitCoercion for UnitCoercer<'_> {
    fn to_common(&self, left: &WithUnit, right: &WithUnit) -> Option<(WithUnit, WithUnit)> {
        let common = self.config.units.common_format(&[left, right])?;
        let left = convert_unit(self.config, left, common.as_str()).ok()?;
        let right = convert_unit(self.config, right, common.as_str()).ok()?;
        Some((left, right))
    }
}
