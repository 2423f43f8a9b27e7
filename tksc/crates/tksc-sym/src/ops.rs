//! Type-directed operation kernels.
//!
//! The kernels know nothing about registered unit specs: when two
//! dimensioned operands disagree, they ask the [`UnitCoercion`] seam for a
//! common format and fail with an incompatible-units error if none exists.
//! The interpreter implements the seam on top of the unit manager.

use std::fmt;

use crate::error::{Result, SymbolError};
use crate::value::{Number, Unit, Value, WithUnit};

/// Arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Right-associative `^`.
    Pow,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Pow => "^",
        };
        write!(f, "{symbol}")
    }
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{symbol}")
    }
}

/// Brings two dimensioned numbers to a common unit.
pub trait UnitCoercion {
    /// Returns both values expressed in one shared unit, or `None` when no
    /// conversion path exists.
    fn to_common(&self, left: &WithUnit, right: &WithUnit) -> Option<(WithUnit, WithUnit)>;
}

/// Coercion that only accepts identical units; used where no unit manager
/// is in play.
pub struct NoCoercion;

impl UnitCoercion for NoCoercion {
    fn to_common(&self, _left: &WithUnit, _right: &WithUnit) -> Option<(WithUnit, WithUnit)> {
        None
    }
}

/// Applies an arithmetic operator.
pub fn binary(op: ArithOp, lhs: &Value, rhs: &Value, units: &dyn UnitCoercion) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            let value = arith(op, a.value, b.value)?;
            Ok(Value::Number(Number::new(
                value,
                result_is_float(a.is_float, b.is_float, value),
            )))
        }

        // A scalar combined with a dimensioned operand takes on the
        // dimensioned side's unit; `number ^ unit-exponent` stays scalar.
        (Value::Number(a), Value::WithUnit(b)) => {
            let value = arith(op, a.value, b.value)?;
            let is_float = result_is_float(a.is_float, b.is_float, value);
            if op == ArithOp::Pow {
                Ok(Value::Number(Number::new(value, is_float)))
            } else {
                Ok(Value::WithUnit(WithUnit::new(
                    value,
                    is_float,
                    b.unit.clone(),
                )))
            }
        }
        (Value::WithUnit(a), Value::Number(b)) => {
            let value = arith(op, a.value, b.value)?;
            Ok(Value::WithUnit(WithUnit::new(
                value,
                result_is_float(a.is_float, b.is_float, value),
                a.unit.clone(),
            )))
        }

        (Value::WithUnit(a), Value::WithUnit(b)) => {
            let (a, b) = if a.unit == b.unit {
                (a.clone(), b.clone())
            } else if op == ArithOp::Pow {
                // `^` on two different units is an error outright; it is
                // never bridged by unit conversion.
                return Err(SymbolError::IncompatibleUnits {
                    left: a.unit.to_string(),
                    right: b.unit.to_string(),
                });
            } else {
                units
                    .to_common(a, b)
                    .ok_or_else(|| SymbolError::IncompatibleUnits {
                        left: a.unit.to_string(),
                        right: b.unit.to_string(),
                    })?
            };
            let value = arith(op, a.value, b.value)?;
            Ok(Value::WithUnit(WithUnit::new(
                value,
                result_is_float(a.is_float, b.is_float, value),
                a.unit,
            )))
        }

        (Value::Str(a), Value::Str(b)) if op == ArithOp::Add => Ok(Value::Str(format!("{a}{b}"))),

        _ => Err(invalid(op.to_string(), lhs, rhs)),
    }
}

/// Applies a comparison operator, yielding a Boolean.
pub fn compare(op: CmpOp, lhs: &Value, rhs: &Value, units: &dyn UnitCoercion) -> Result<Value> {
    // Numeric comparisons work across Number/NumberWithUnit; a scalar
    // compares against the dimensioned value directly.
    let numeric = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Some((a.value, b.value)),
        (Value::Number(a), Value::WithUnit(b)) => Some((a.value, b.value)),
        (Value::WithUnit(a), Value::Number(b)) => Some((a.value, b.value)),
        (Value::WithUnit(a), Value::WithUnit(b)) => {
            if a.unit == b.unit {
                Some((a.value, b.value))
            } else {
                let (a, b) = units
                    .to_common(a, b)
                    .ok_or_else(|| SymbolError::IncompatibleUnits {
                        left: a.unit.to_string(),
                        right: b.unit.to_string(),
                    })?;
                Some((a.value, b.value))
            }
        }
        _ => None,
    };

    if let Some((a, b)) = numeric {
        let result = match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        };
        return Ok(Value::Boolean(result));
    }

    // Equality is defined for same-type values and for null checks;
    // ordering is numeric-only.
    match op {
        CmpOp::Eq | CmpOp::Ne => {
            let same_type = lhs.type_equals(rhs)
                || matches!(lhs, Value::Null)
                || matches!(rhs, Value::Null)
                || matches!((lhs, rhs), (Value::Color(_), Value::Color(_)));
            if !same_type {
                return Err(invalid(op.to_string(), lhs, rhs));
            }
            let equal = lhs.equals(rhs);
            Ok(Value::Boolean(if op == CmpOp::Eq { equal } else { !equal }))
        }
        _ => Err(invalid(op.to_string(), lhs, rhs)),
    }
}

/// Unary minus; numeric operands only.
pub fn negate(value: &Value) -> Result<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(Number::new(-n.value, n.is_float))),
        Value::WithUnit(n) => Ok(Value::WithUnit(WithUnit::new(
            -n.value,
            n.is_float,
            n.unit.clone(),
        ))),
        other => Err(SymbolError::InvalidOperands {
            op: "-".to_string(),
            lhs: other.type_name(),
            rhs: String::new(),
        }),
    }
}

/// Logical `!`; requires a Boolean.
pub fn logical_not(value: &Value) -> Result<Value> {
    match value {
        Value::Boolean(b) => Ok(Value::Boolean(!b)),
        other => Err(SymbolError::TypeMismatch {
            expected: "Boolean".to_string(),
            found: other.type_name(),
        }),
    }
}

fn arith(op: ArithOp, lhs: f64, rhs: f64) -> Result<f64> {
    match op {
        ArithOp::Add => Ok(lhs + rhs),
        ArithOp::Sub => Ok(lhs - rhs),
        ArithOp::Mul => Ok(lhs * rhs),
        ArithOp::Div => {
            if rhs == 0.0 {
                Err(SymbolError::DivisionByZero)
            } else {
                Ok(lhs / rhs)
            }
        }
        ArithOp::Pow => Ok(lhs.powf(rhs)),
    }
}

/// Integer printability survives any operation whose inputs were integers
/// and whose result is whole.
fn result_is_float(lhs_float: bool, rhs_float: bool, result: f64) -> bool {
    lhs_float || rhs_float || result.fract() != 0.0
}

fn invalid(op: String, lhs: &Value, rhs: &Value) -> SymbolError {
    SymbolError::InvalidOperands {
        op,
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

/// Convenience for building unit tags in tests and conversions.
pub fn unit(keyword: &str) -> Unit {
    Unit::new(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn px(v: f64) -> Value {
        Value::with_unit(v, false, "px")
    }

    #[test]
    fn test_number_arithmetic() {
        let v = binary(ArithOp::Add, &Value::int(1.0), &Value::int(2.0), &NoCoercion).unwrap();
        assert_eq!(v.render(), "3");

        let v = binary(ArithOp::Pow, &Value::int(2.0), &Value::int(10.0), &NoCoercion).unwrap();
        assert_eq!(v.render(), "1024");
    }

    #[test]
    fn test_integer_division_stays_integer() {
        let v = binary(ArithOp::Div, &Value::int(6.0), &Value::int(2.0), &NoCoercion).unwrap();
        assert_eq!(v, Value::int(3.0));

        let v = binary(ArithOp::Div, &Value::int(7.0), &Value::int(2.0), &NoCoercion).unwrap();
        assert_eq!(v, Value::float(3.5));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            binary(ArithOp::Div, &Value::int(1.0), &Value::int(0.0), &NoCoercion),
            Err(SymbolError::DivisionByZero)
        );
    }

    #[test]
    fn test_scalar_adopts_unit() {
        let v = binary(ArithOp::Mul, &Value::int(16.0), &px(2.0), &NoCoercion).unwrap();
        assert_eq!(v.render(), "32px");

        let v = binary(ArithOp::Add, &px(16.0), &Value::int(8.0), &NoCoercion).unwrap();
        assert_eq!(v.render(), "24px");
    }

    #[test]
    fn test_same_unit_addition() {
        let v = binary(ArithOp::Add, &px(1.0), &px(2.0), &NoCoercion).unwrap();
        assert_eq!(v.render(), "3px");
    }

    #[test]
    fn test_incompatible_units() {
        let em = Value::with_unit(1.0, false, "em");
        assert!(matches!(
            binary(ArithOp::Add, &px(1.0), &em, &NoCoercion),
            Err(SymbolError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_coercion_seam_is_consulted() {
        struct EmToPx;
        impl UnitCoercion for EmToPx {
            fn to_common(&self, left: &WithUnit, right: &WithUnit) -> Option<(WithUnit, WithUnit)> {
                let scale = |n: &WithUnit| {
                    let value = if n.unit.as_str() == "em" {
                        n.value * 16.0
                    } else {
                        n.value
                    };
                    WithUnit::new(value, n.is_float, unit("px"))
                };
                Some((scale(left), scale(right)))
            }
        }

        let em = Value::with_unit(1.0, false, "em");
        let v = binary(ArithOp::Add, &px(4.0), &em, &EmToPx).unwrap();
        assert_eq!(v.render(), "20px");
    }

    #[test]
    fn test_pow_preserves_unit_on_dimensioned_base() {
        let v = binary(ArithOp::Pow, &px(3.0), &Value::int(2.0), &NoCoercion).unwrap();
        assert_eq!(v.render(), "9px");
    }

    #[test]
    fn test_pow_with_two_units_errors() {
        let em = Value::with_unit(2.0, false, "em");
        assert!(matches!(
            binary(ArithOp::Pow, &px(2.0), &em, &NoCoercion),
            Err(SymbolError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_pow_never_consults_the_coercion_seam() {
        // A seam that would happily convert; `^` must still reject the
        // mismatch without asking it.
        struct AlwaysPx;
        impl UnitCoercion for AlwaysPx {
            fn to_common(&self, left: &WithUnit, right: &WithUnit) -> Option<(WithUnit, WithUnit)> {
                Some((
                    WithUnit::new(left.value, left.is_float, unit("px")),
                    WithUnit::new(right.value, right.is_float, unit("px")),
                ))
            }
        }

        let em = Value::with_unit(2.0, false, "em");
        assert!(matches!(
            binary(ArithOp::Pow, &px(2.0), &em, &AlwaysPx),
            Err(SymbolError::IncompatibleUnits { .. })
        ));
        // The same seam still serves the additive operators.
        let sum = binary(ArithOp::Add, &px(1.0), &em, &AlwaysPx).unwrap();
        assert_eq!(sum.render(), "3px");
    }

    #[test]
    fn test_string_concatenation() {
        let v = binary(
            ArithOp::Add,
            &Value::str("a"),
            &Value::str("b"),
            &NoCoercion,
        )
        .unwrap();
        assert_eq!(v, Value::str("ab"));

        assert!(binary(ArithOp::Mul, &Value::str("a"), &Value::str("b"), &NoCoercion).is_err());
    }

    #[test]
    fn test_string_plus_number_errors() {
        assert!(matches!(
            binary(ArithOp::Add, &Value::str("a"), &Value::int(1.0), &NoCoercion),
            Err(SymbolError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn test_numeric_comparison() {
        let v = compare(CmpOp::Gt, &px(21.0), &px(20.0), &NoCoercion).unwrap();
        assert_eq!(v, Value::Boolean(true));

        let v = compare(CmpOp::Le, &Value::int(2.0), &px(3.0), &NoCoercion).unwrap();
        assert_eq!(v, Value::Boolean(true));
    }

    #[test]
    fn test_equality_on_strings_and_null() {
        let v = compare(
            CmpOp::Eq,
            &Value::str("a"),
            &Value::str("a"),
            &NoCoercion,
        )
        .unwrap();
        assert_eq!(v, Value::Boolean(true));

        let v = compare(CmpOp::Ne, &Value::str("a"), &Value::Null, &NoCoercion).unwrap();
        assert_eq!(v, Value::Boolean(true));
    }

    #[test]
    fn test_ordering_on_strings_errors() {
        assert!(matches!(
            compare(CmpOp::Lt, &Value::str("a"), &Value::str("b"), &NoCoercion),
            Err(SymbolError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn test_mismatched_comparison_errors() {
        assert!(matches!(
            compare(CmpOp::Eq, &Value::str("a"), &Value::Boolean(true), &NoCoercion),
            Err(SymbolError::InvalidOperands { .. })
        ));
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(&px(3.0)).unwrap().render(), "-3px");
        assert_eq!(negate(&Value::int(3.0)).unwrap().render(), "-3");
        assert!(negate(&Value::str("x")).is_err());
    }

    #[test]
    fn test_logical_not_requires_boolean() {
        assert_eq!(
            logical_not(&Value::Boolean(true)).unwrap(),
            Value::Boolean(false)
        );
        assert!(logical_not(&Value::int(1.0)).is_err());
    }

    proptest! {
        /// Scaling a dimensioned value by a scalar preserves its unit, on
        /// both sides of the operator.
        #[test]
        fn unit_propagates_through_scaling(n in -1e6f64..1e6, u in 1e-3f64..1e3) {
            let scalar = Value::float(n);
            let sized = Value::with_unit(u, true, "rem");
            for (lhs, rhs) in [(&scalar, &sized), (&sized, &scalar)] {
                let v = binary(ArithOp::Mul, lhs, rhs, &NoCoercion).unwrap();
                match v {
                    Value::WithUnit(out) => prop_assert_eq!(out.unit.as_str(), "rem"),
                    other => return Err(TestCaseError::fail(format!("expected unit, got {other:?}"))),
                }
            }
        }
    }
}
