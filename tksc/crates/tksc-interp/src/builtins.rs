//! Built-in function implementations.
//!
//! The function manager only names builtins; their behavior lives here so
//! the aggregates can reach the unit manager for mixed-unit inputs.
//! Aggregates flatten list arguments, convert mixed units to a common
//! format, and (deliberately) return unit-less numbers for `min`/`max`.

use tksc_spec::{Builtin, Config};
use tksc_sym::methods::MethodSig;
use tksc_sym::number::{format_number, round_half_even, round_to_precision};
use tksc_sym::{Number, Value, WithUnit};

use crate::convert;
use crate::error::{EvalError, Result};

/// Evaluates a builtin call. Arguments arrive already evaluated and with
/// explicit lists flattened.
pub fn call_builtin(builtin: Builtin, args: Vec<Value>, config: &Config) -> Result<Value> {
    let name = builtin.name();
    signature(builtin).check_arity(name, args.len())?;

    match builtin {
        Builtin::Min => aggregate(name, args, config, |values| {
            values
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min)
        }),
        Builtin::Max => aggregate(name, args, config, |values| {
            values
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max)
        }),

        Builtin::Sum => {
            let numbers = numeric_inputs(name, args, config)?;
            let total: f64 = numbers.values.iter().sum();
            Ok(numbers.rewrap(total))
        }

        Builtin::Average => {
            let numbers = numeric_inputs(name, args, config)?;
            let count = numbers.values.len() as f64;
            let total: f64 = numbers.values.iter().sum();
            Ok(Value::Number(Number::float(total / count)))
        }

        Builtin::Mod => {
            let a = number_arg(name, &args[0])?;
            let b = number_arg(name, &args[1])?;
            if b == 0.0 {
                return Err(tksc_sym::SymbolError::DivisionByZero.into());
            }
            Ok(rewrap_like(&args[0], a % b))
        }

        Builtin::Round => Ok(rewrap_like(&args[0], round_half_even(number_arg(name, &args[0])?))),
        Builtin::Floor => Ok(rewrap_like(&args[0], number_arg(name, &args[0])?.floor())),
        Builtin::Ceil => Ok(rewrap_like(&args[0], number_arg(name, &args[0])?.ceil())),
        Builtin::Abs => Ok(rewrap_like(&args[0], number_arg(name, &args[0])?.abs())),

        Builtin::RoundTo => {
            let value = number_arg(name, &args[0])?;
            let precision = integer_arg(name, &args[1])?;
            Ok(rewrap_like(
                &args[0],
                round_to_precision(value, precision as i32),
            ))
        }

        Builtin::Sqrt => numeric(name, &args[0], f64::sqrt),
        Builtin::Sin => numeric(name, &args[0], f64::sin),
        Builtin::Cos => numeric(name, &args[0], f64::cos),
        Builtin::Tan => numeric(name, &args[0], f64::tan),
        Builtin::Asin => numeric(name, &args[0], f64::asin),
        Builtin::Acos => numeric(name, &args[0], f64::acos),
        Builtin::Atan => numeric(name, &args[0], f64::atan),

        Builtin::Atan2 => {
            let y = number_arg(name, &args[0])?;
            let x = number_arg(name, &args[1])?;
            Ok(Value::Number(Number::float(y.atan2(x))))
        }

        Builtin::Pow => {
            let base = number_arg(name, &args[0])?;
            let exponent = number_arg(name, &args[1])?;
            let result = base.powf(exponent);
            Ok(Value::Number(Number::new(result, result.fract() != 0.0)))
        }

        Builtin::Log => {
            let x = number_arg(name, &args[0])?;
            let result = match args.get(1) {
                Some(base) => x.log(number_arg(name, base)?),
                None => x.ln(),
            };
            Ok(Value::Number(Number::float(result)))
        }

        Builtin::ParseInt => {
            let text = string_arg(name, &args[0])?;
            let radix = match args.get(1) {
                Some(arg) => integer_arg(name, arg)?,
                None => 10,
            };
            if !(2..=36).contains(&radix) {
                return Err(tksc_sym::SymbolError::InvalidRadix { radix }.into());
            }
            let parsed = i64::from_str_radix(text.trim().to_lowercase().as_str(), radix as u32)
                .map_err(|_| EvalError::InvalidArgument {
                    function: name.to_string(),
                    message: format!("cannot parse '{text}' with radix {radix}"),
                })?;
            Ok(Value::int(parsed as f64))
        }

        Builtin::Pi => Ok(Value::Number(Number::float(std::f64::consts::PI))),

        Builtin::Type => {
            let type_name = args[0].type_name();
            let segment = type_name.rsplit('.').next().unwrap_or(&type_name);
            Ok(Value::Str(segment.to_lowercase()))
        }

        // Pass-through formatters re-emit the call as text.
        Builtin::LinearGradient | Builtin::Rgba => {
            let body = args
                .iter()
                .map(Value::render)
                .collect::<Vec<_>>()
                .join(", ");
            Ok(Value::Str(format!("{name}({body})")))
        }
    }
}

/// Arity table for the builtins.
fn signature(builtin: Builtin) -> MethodSig {
    match builtin {
        Builtin::Min | Builtin::Max | Builtin::Sum | Builtin::Average => {
            MethodSig::new("args", 1, 0, true)
        }
        Builtin::Mod | Builtin::Atan2 | Builtin::Pow | Builtin::RoundTo => {
            MethodSig::new("args", 2, 0, false)
        }
        Builtin::Round
        | Builtin::Abs
        | Builtin::Sqrt
        | Builtin::Sin
        | Builtin::Cos
        | Builtin::Tan
        | Builtin::Asin
        | Builtin::Acos
        | Builtin::Atan
        | Builtin::Floor
        | Builtin::Ceil
        | Builtin::Type => MethodSig::new("args", 1, 0, false),
        Builtin::ParseInt | Builtin::Log => MethodSig::new("args", 1, 1, false),
        Builtin::Pi => MethodSig::new("args", 0, 0, false),
        Builtin::LinearGradient | Builtin::Rgba => MethodSig::new("args", 0, 0, true),
    }
}

/// Flattened numeric inputs with their common unit, if any.
struct NumericInputs {
    values: Vec<f64>,
    /// Common unit after conversion; `None` for all-scalar input.
    unit: Option<tksc_sym::Unit>,
    any_float: bool,
}

impl NumericInputs {
    /// Wraps an aggregate result back into the common format.
    fn rewrap(&self, value: f64) -> Value {
        let is_float = self.any_float || value.fract() != 0.0;
        match &self.unit {
            Some(unit) => Value::WithUnit(WithUnit::new(value, is_float, unit.clone())),
            None => Value::Number(Number::new(value, is_float)),
        }
    }
}

/// Collects numbers from arguments, descending into lists, converting
/// mixed units to the unit manager's common format.
fn numeric_inputs(name: &str, args: Vec<Value>, config: &Config) -> Result<NumericInputs> {
    let mut flat: Vec<Value> = Vec::new();
    flatten_into(args, &mut flat);

    let mut dimensioned: Vec<WithUnit> = Vec::new();
    let mut scalars: Vec<Number> = Vec::new();
    for value in &flat {
        match value {
            Value::Number(n) => scalars.push(*n),
            Value::WithUnit(n) => dimensioned.push(n.clone()),
            other => {
                return Err(EvalError::InvalidArgument {
                    function: name.to_string(),
                    message: format!("expected numeric arguments, got {}", other.type_name()),
                })
            }
        }
    }

    let mut unit = None;
    if !dimensioned.is_empty() {
        let refs: Vec<&WithUnit> = dimensioned.iter().collect();
        let common = config
            .units
            .common_format(&refs)
            .expect("non-empty dimensioned inputs");
        let mut converted = Vec::with_capacity(dimensioned.len());
        for value in &dimensioned {
            converted.push(convert::convert_unit(config, value, common.as_str())?);
        }
        dimensioned = converted;
        unit = Some(common);
    }

    let mut values = Vec::with_capacity(flat.len());
    let mut any_float = false;
    // Input order: preserve the original argument order.
    let mut dim_iter = dimensioned.into_iter();
    let mut scalar_iter = scalars.into_iter();
    for value in &flat {
        match value {
            Value::Number(_) => {
                let n = scalar_iter.next().expect("counted above");
                any_float |= n.is_float;
                values.push(n.value);
            }
            Value::WithUnit(_) => {
                let n = dim_iter.next().expect("counted above");
                any_float |= n.is_float;
                values.push(n.value);
            }
            _ => unreachable!("filtered above"),
        }
    }

    Ok(NumericInputs {
        values,
        unit,
        any_float,
    })
}

fn flatten_into(args: Vec<Value>, out: &mut Vec<Value>) {
    for value in args {
        match value {
            Value::List(list) => flatten_into(list.items, out),
            other => out.push(other),
        }
    }
}

/// Shared shape of `min`/`max`: aggregate the values, drop the unit.
fn aggregate(
    name: &str,
    args: Vec<Value>,
    config: &Config,
    fold: impl Fn(&[f64]) -> f64,
) -> Result<Value> {
    let numbers = numeric_inputs(name, args, config)?;
    let result = fold(&numbers.values);
    Ok(Value::Number(Number::new(result, result.fract() != 0.0)))
}

fn number_arg(name: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => Ok(n.value),
        Value::WithUnit(n) => Ok(n.value),
        other => Err(EvalError::InvalidArgument {
            function: name.to_string(),
            message: format!("expected a number, got {}", other.type_name()),
        }),
    }
}

fn integer_arg(name: &str, value: &Value) -> Result<i64> {
    let number = number_arg(name, value)?;
    if number.fract() != 0.0 {
        return Err(EvalError::InvalidArgument {
            function: name.to_string(),
            message: format!("expected an integer, got {}", format_number(number)),
        });
    }
    Ok(number as i64)
}

fn string_arg(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(EvalError::InvalidArgument {
            function: name.to_string(),
            message: format!("expected a string, got {}", other.type_name()),
        }),
    }
}

/// Unary numeric builtins keep the receiver's unit: `abs(-2px)` is `2px`.
fn rewrap_like(template: &Value, value: f64) -> Value {
    match template {
        Value::WithUnit(n) => Value::WithUnit(WithUnit::new(
            value,
            n.is_float && value.fract() != 0.0,
            n.unit.clone(),
        )),
        _ => Value::Number(Number::new(value, value.fract() != 0.0)),
    }
}

/// Numeric function returning a plain float Number.
fn numeric(name: &str, value: &Value, f: impl Fn(f64) -> f64) -> Result<Value> {
    let result = f(number_arg(name, value)?);
    Ok(Value::Number(Number::new(result, result.fract() != 0.0)))
}
