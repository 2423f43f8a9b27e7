//! Table-driven method dispatch.
//!
//! Each value type declares its methods as [`MethodSig`] entries; dispatch
//! checks arity against the table before running the implementation. List
//! and dictionary mutators deep-copy their non-primitive arguments before
//! storing them, so a stored element never aliases a live variable.

use crate::error::{Result, SymbolError};
use crate::number::{format_number, to_radix_string};
use crate::value::{List, Value};

/// A method signature: fixed parameters, optional tail, and an optional
/// variadic (`unpack`) parameter that absorbs any overflow.
#[derive(Clone, Copy, Debug)]
pub struct MethodSig {
    pub name: &'static str,
    pub required: usize,
    pub optional: usize,
    pub unpack: bool,
}

impl MethodSig {
    pub const fn new(name: &'static str, required: usize, optional: usize, unpack: bool) -> Self {
        Self {
            name,
            required,
            optional,
            unpack,
        }
    }

    /// Checks `supplied` against `required ..= required + optional`
    /// (unbounded above with `unpack`).
    pub fn check_arity(&self, callee: &str, supplied: usize) -> Result<()> {
        let max = self.required + self.optional;
        let ok = supplied >= self.required && (self.unpack || supplied <= max);
        if ok {
            return Ok(());
        }
        let expected = if self.unpack {
            format!("at least {}", self.required)
        } else if self.optional == 0 {
            format!("{}", self.required)
        } else {
            format!("{} to {}", self.required, max)
        };
        Err(SymbolError::ArityMismatch {
            callee: callee.to_string(),
            expected,
            supplied,
        })
    }
}

const NUMBER_METHODS: &[MethodSig] = &[MethodSig::new("to_string", 0, 1, false)];

const WITH_UNIT_METHODS: &[MethodSig] = &[
    MethodSig::new("to_string", 0, 0, false),
    MethodSig::new("to_number", 0, 0, false),
];

const STRING_METHODS: &[MethodSig] = &[
    MethodSig::new("upper", 0, 0, false),
    MethodSig::new("lower", 0, 0, false),
    MethodSig::new("length", 0, 0, false),
    MethodSig::new("concat", 1, 0, false),
    MethodSig::new("split", 0, 1, false),
    MethodSig::new("to_string", 0, 0, false),
];

const LIST_METHODS: &[MethodSig] = &[
    MethodSig::new("append", 1, 0, false),
    MethodSig::new("extend", 1, 0, false),
    MethodSig::new("insert", 2, 0, false),
    MethodSig::new("delete", 1, 0, false),
    MethodSig::new("update", 2, 0, false),
    MethodSig::new("length", 0, 0, false),
    MethodSig::new("index", 1, 0, false),
    MethodSig::new("get", 1, 0, false),
    MethodSig::new("join", 0, 1, false),
    MethodSig::new("to_string", 0, 0, false),
];

const DICTIONARY_METHODS: &[MethodSig] = &[
    MethodSig::new("set", 2, 0, false),
    MethodSig::new("get", 1, 0, false),
    MethodSig::new("delete", 1, 0, false),
    MethodSig::new("keys", 0, 0, false),
    MethodSig::new("values", 0, 0, false),
    MethodSig::new("key_exists", 1, 0, false),
    MethodSig::new("length", 0, 0, false),
    MethodSig::new("clear", 0, 0, false),
    MethodSig::new("to_string", 0, 0, false),
];

const COLOR_METHODS: &[MethodSig] = &[MethodSig::new("to_string", 0, 0, false)];

const BOOLEAN_METHODS: &[MethodSig] = &[MethodSig::new("to_string", 0, 0, false)];

const NULL_METHODS: &[MethodSig] = &[MethodSig::new("to_string", 0, 0, false)];

/// The method table for a value's type.
pub fn method_table(value: &Value) -> &'static [MethodSig] {
    match value {
        Value::Null => NULL_METHODS,
        Value::Number(_) => NUMBER_METHODS,
        Value::WithUnit(_) => WITH_UNIT_METHODS,
        Value::Str(_) => STRING_METHODS,
        Value::Boolean(_) => BOOLEAN_METHODS,
        Value::List(_) => LIST_METHODS,
        Value::Dictionary(_) => DICTIONARY_METHODS,
        Value::Color(_) => COLOR_METHODS,
    }
}

/// True if the value's type declares the method.
pub fn has_method(value: &Value, name: &str) -> bool {
    let canonical = canonical_name(name);
    method_table(value).iter().any(|sig| sig.name == canonical)
}

/// Method names are matched case-insensitively; `keyExists` is the spelled
/// alias of `key_exists`.
fn canonical_name(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower == "keyexists" {
        "key_exists".to_string()
    } else {
        lower
    }
}

/// Dispatches a method call on `value`.
///
/// Mutating list/dictionary methods update the receiver in place and
/// return `Null`; the interpreter routes variable receivers here through
/// the symbol table's mutable slot so the mutation sticks.
pub fn call_method(value: &mut Value, name: &str, args: Vec<Value>) -> Result<Value> {
    let canonical = canonical_name(name);
    let type_name = value.type_name();

    let sig = method_table(value)
        .iter()
        .find(|sig| sig.name == canonical)
        .ok_or_else(|| SymbolError::UnknownMethod {
            type_name: type_name.clone(),
            method: name.to_string(),
        })?;

    let callee = format!("{type_name}.{}", sig.name);
    sig.check_arity(&callee, args.len())?;

    // Rendered up front: `to_string` arms cannot re-borrow the receiver
    // while a variant binding is live.
    let rendered = value.render();

    match value {
        Value::Number(n) => match canonical.as_str() {
            "to_string" => match args.first() {
                None => Ok(Value::Str(format_number(n.value))),
                Some(radix) => {
                    let radix = expect_integer(&callee, radix)?;
                    Ok(Value::Str(to_radix_string(n.value, radix)?))
                }
            },
            _ => unreachable!("method table covers dispatch"),
        },
        Value::WithUnit(n) => match canonical.as_str() {
            "to_string" => Ok(Value::Str(rendered)),
            "to_number" => Ok(Value::Number(n.to_number())),
            _ => unreachable!("method table covers dispatch"),
        },
        Value::Str(s) => match canonical.as_str() {
            "upper" => Ok(Value::Str(s.to_uppercase())),
            "lower" => Ok(Value::Str(s.to_lowercase())),
            "length" => Ok(Value::int(s.chars().count() as f64)),
            "concat" => {
                let other = expect_string(&callee, &args[0])?;
                Ok(Value::Str(format!("{s}{other}")))
            }
            "split" => {
                let parts: Vec<Value> = match args.first() {
                    Some(delim) => {
                        let delim = expect_string(&callee, delim)?;
                        s.split(delim.as_str()).map(Value::str).collect()
                    }
                    // No delimiter: one element per character.
                    None => s.chars().map(|c| Value::str(c.to_string())).collect(),
                };
                Ok(Value::List(List::explicit(parts)))
            }
            "to_string" => Ok(Value::Str(s.clone())),
            _ => unreachable!("method table covers dispatch"),
        },
        Value::List(list) => match canonical.as_str() {
            "append" => {
                list.items.push(copy_for_store(&args[0]));
                Ok(Value::Null)
            }
            "extend" => {
                match &args[0] {
                    Value::List(other) => {
                        list.items.extend(other.items.iter().map(copy_for_store));
                    }
                    single => list.items.push(copy_for_store(single)),
                }
                Ok(Value::Null)
            }
            "insert" => {
                let index = expect_integer(&callee, &args[0])?;
                if index < 0 || index as usize > list.items.len() {
                    return Err(SymbolError::IndexOutOfBounds {
                        index,
                        length: list.items.len(),
                    });
                }
                list.items.insert(index as usize, copy_for_store(&args[1]));
                Ok(Value::Null)
            }
            "delete" => {
                let index = expect_index(&callee, &args[0], list.items.len())?;
                list.items.remove(index);
                Ok(Value::Null)
            }
            "update" => {
                let index = expect_index(&callee, &args[0], list.items.len())?;
                list.items[index] = copy_for_store(&args[1]);
                Ok(Value::Null)
            }
            "length" => Ok(Value::int(list.items.len() as f64)),
            "index" => {
                let found = list.items.iter().position(|item| item.equals(&args[0]));
                match found {
                    Some(i) => Ok(Value::int(i as f64)),
                    None => Ok(Value::Null),
                }
            }
            "get" => {
                let index = expect_index(&callee, &args[0], list.items.len())?;
                Ok(list.items[index].deep_copy())
            }
            "join" => {
                let sep = match args.first() {
                    Some(arg) => expect_string(&callee, arg)?,
                    None => ", ".to_string(),
                };
                let joined = list
                    .items
                    .iter()
                    .map(Value::render)
                    .collect::<Vec<_>>()
                    .join(&sep);
                Ok(Value::Str(joined))
            }
            "to_string" => Ok(Value::Str(rendered)),
            _ => unreachable!("method table covers dispatch"),
        },
        Value::Dictionary(dict) => match canonical.as_str() {
            "set" => {
                let key = expect_string(&callee, &args[0])?;
                dict.entries.insert(key, copy_for_store(&args[1]));
                Ok(Value::Null)
            }
            "get" => {
                let key = expect_string(&callee, &args[0])?;
                Ok(dict
                    .entries
                    .get(&key)
                    .map(Value::deep_copy)
                    .unwrap_or(Value::Null))
            }
            "delete" => {
                let key = expect_string(&callee, &args[0])?;
                // shift_remove keeps the insertion order of the rest.
                dict.entries.shift_remove(&key);
                Ok(Value::Null)
            }
            "keys" => Ok(Value::List(List::explicit(
                dict.entries.keys().map(Value::str).collect(),
            ))),
            "values" => Ok(Value::List(List::explicit(
                dict.entries.values().map(Value::deep_copy).collect(),
            ))),
            "key_exists" => {
                let key = expect_string(&callee, &args[0])?;
                Ok(Value::Boolean(dict.entries.contains_key(&key)))
            }
            "length" => Ok(Value::int(dict.entries.len() as f64)),
            "clear" => {
                dict.entries.clear();
                Ok(Value::Null)
            }
            "to_string" => Ok(Value::Str(rendered)),
            _ => unreachable!("method table covers dispatch"),
        },
        Value::Color(_) | Value::Boolean(_) | Value::Null => match canonical.as_str() {
            "to_string" => Ok(Value::Str(rendered)),
            _ => unreachable!("method table covers dispatch"),
        },
    }
}

/// Containers store deep copies of non-primitive arguments.
fn copy_for_store(value: &Value) -> Value {
    if value.is_primitive() {
        value.clone()
    } else {
        value.deep_copy()
    }
}

fn expect_string(callee: &str, value: &Value) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(SymbolError::TypeMismatch {
            expected: format!("String for {callee}"),
            found: other.type_name(),
        }),
    }
}

fn expect_integer(callee: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) if n.value.fract() == 0.0 => Ok(n.value as i64),
        other => Err(SymbolError::TypeMismatch {
            expected: format!("integer Number for {callee}"),
            found: other.type_name(),
        }),
    }
}

fn expect_index(callee: &str, value: &Value, length: usize) -> Result<usize> {
    let index = expect_integer(callee, value)?;
    if index < 0 || index as usize >= length {
        return Err(SymbolError::IndexOutOfBounds { index, length });
    }
    Ok(index as usize)
}
