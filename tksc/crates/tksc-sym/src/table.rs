//! Lexical scope chain and the type registry.
//!
//! Identifiers are case-insensitive: frames store lowercased names and
//! every lookup lowercases its query. The registry lives beside the root
//! frame and answers `variable x: Type.Sub` declarations; registering a
//! color spec or unit spec extends it.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use crate::error::{Result, SymbolError};
use crate::value::{Dictionary, List, Number, Unit, Value, WithUnit};

/// A stack of scope frames over a shared type registry.
pub struct SymbolTable {
    frames: Vec<FxHashMap<String, Value>>,
    registry: TypeRegistry,
}

impl SymbolTable {
    /// Creates a table with one root frame and the default registry.
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::default())
    }

    /// Creates a table owning a pre-extended registry.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            frames: vec![FxHashMap::default()],
            registry,
        }
    }

    /// Opens a child frame.
    pub fn push_frame(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Closes the innermost frame. The root frame stays.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Declares `name` in the current frame; redeclaring in the same frame
    /// is an error.
    pub fn define(&mut self, name: &str, value: Value) -> Result<()> {
        let key = name.to_lowercase();
        let frame = self.frames.last_mut().expect("root frame always exists");
        if frame.contains_key(&key) {
            return Err(SymbolError::Redeclaration {
                name: name.to_string(),
            });
        }
        frame.insert(key, value);
        Ok(())
    }

    /// Reassigns the nearest frame that owns `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        let key = name.to_lowercase();
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(&key) {
                *slot = value;
                return Ok(());
            }
        }
        Err(SymbolError::UndefinedVariable {
            name: name.to_string(),
        })
    }

    /// Case-insensitive lookup through the frame chain.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let key = name.to_lowercase();
        self.frames.iter().rev().find_map(|frame| frame.get(&key))
    }

    /// Mutable lookup; used for in-place method receivers.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let key = name.to_lowercase();
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(&key))
    }

    /// True if any frame defines `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The registry owned by this table.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Registered type names, consulted by variable declarations.
///
/// Base types are fixed; the `color` entry carries a subtype sub-registry
/// (`hex` plus registered color specs) and `numberwithunit` accepts any
/// registered unit keyword.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    /// Lowercased color subtype names.
    color_subtypes: IndexSet<String>,
    /// Lowercased unit keywords.
    units: IndexSet<String>,
}

/// Units every registry starts with; mirrors the lexer's closed set.
const DEFAULT_UNITS: &[&str] = &[
    "px", "em", "rem", "vw", "vh", "pt", "in", "cm", "mm", "deg", "%",
];

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = Self {
            color_subtypes: IndexSet::new(),
            units: IndexSet::new(),
        };
        registry.color_subtypes.insert("hex".to_string());
        for unit in DEFAULT_UNITS {
            registry.units.insert((*unit).to_string());
        }
        registry
    }
}

impl TypeRegistry {
    /// Registers a color subtype (from a color spec registration).
    pub fn register_color_subtype(&mut self, name: &str) {
        self.color_subtypes.insert(name.to_lowercase());
    }

    /// Registers a unit keyword (from a unit spec registration).
    pub fn register_unit(&mut self, keyword: &str) {
        self.units.insert(keyword.to_lowercase());
    }

    pub fn has_color_subtype(&self, name: &str) -> bool {
        self.color_subtypes.contains(&name.to_lowercase())
    }

    pub fn has_unit(&self, keyword: &str) -> bool {
        self.units.contains(&keyword.to_lowercase())
    }

    /// Builds the value for a declaration: the initializer when present
    /// (type-checked against the declared type), the type's empty value
    /// otherwise.
    pub fn instantiate(
        &self,
        base: &str,
        sub: Option<&str>,
        init: Option<Value>,
    ) -> Result<Value> {
        let base_lower = base.to_lowercase();
        let declared = self.check_declared(&base_lower, base, sub)?;

        match init {
            Some(value) => {
                if declared_matches(&declared, &value) {
                    Ok(value)
                } else {
                    Err(SymbolError::TypeMismatch {
                        expected: declared.describe(),
                        found: value.type_name(),
                    })
                }
            }
            None => Ok(declared.empty_value()),
        }
    }

    fn check_declared(
        &self,
        base_lower: &str,
        base: &str,
        sub: Option<&str>,
    ) -> Result<DeclaredType> {
        match base_lower {
            "null" => Ok(DeclaredType::Null),
            "number" => Ok(DeclaredType::Number),
            "string" => Ok(DeclaredType::String),
            "boolean" => Ok(DeclaredType::Boolean),
            "list" => Ok(DeclaredType::List),
            "dictionary" => Ok(DeclaredType::Dictionary),
            "numberwithunit" => {
                let unit = match sub {
                    Some(keyword) => {
                        if !self.has_unit(keyword) {
                            return Err(SymbolError::UnknownSubtype {
                                base: base.to_string(),
                                sub: keyword.to_string(),
                            });
                        }
                        Some(Unit::new(keyword))
                    }
                    None => None,
                };
                Ok(DeclaredType::WithUnit(unit))
            }
            "color" => {
                let subtype = match sub {
                    Some(name) => {
                        if !self.has_color_subtype(name) {
                            return Err(SymbolError::UnknownSubtype {
                                base: base.to_string(),
                                sub: name.to_string(),
                            });
                        }
                        Some(name.to_lowercase())
                    }
                    None => None,
                };
                Ok(DeclaredType::Color(subtype))
            }
            _ => Err(SymbolError::UnknownType {
                name: base.to_string(),
            }),
        }
    }
}

/// A checked declaration target.
enum DeclaredType {
    Null,
    Number,
    String,
    Boolean,
    List,
    Dictionary,
    /// Unit constraint when the declaration names one.
    WithUnit(Option<Unit>),
    /// Lowercased subtype constraint when the declaration names one.
    Color(Option<String>),
}

impl DeclaredType {
    fn describe(&self) -> String {
        match self {
            DeclaredType::Null => "Null".into(),
            DeclaredType::Number => "Number".into(),
            DeclaredType::String => "String".into(),
            DeclaredType::Boolean => "Boolean".into(),
            DeclaredType::List => "List".into(),
            DeclaredType::Dictionary => "Dictionary".into(),
            DeclaredType::WithUnit(Some(unit)) => format!("NumberWithUnit.{}", unit.capitalized()),
            DeclaredType::WithUnit(None) => "NumberWithUnit".into(),
            DeclaredType::Color(Some(sub)) => format!("Color.{sub}"),
            DeclaredType::Color(None) => "Color".into(),
        }
    }

    fn empty_value(&self) -> Value {
        match self {
            DeclaredType::Null => Value::Null,
            DeclaredType::Number => Value::Number(Number::int(0.0)),
            DeclaredType::String => Value::Str(String::new()),
            DeclaredType::Boolean => Value::Boolean(false),
            DeclaredType::List => Value::List(List::default()),
            DeclaredType::Dictionary => Value::Dictionary(Dictionary::default()),
            DeclaredType::WithUnit(Some(unit)) => {
                Value::WithUnit(WithUnit::new(0.0, false, unit.clone()))
            }
            // No unit named: a plain zero until assigned.
            DeclaredType::WithUnit(None) => Value::Number(Number::int(0.0)),
            // No schema-valid empty color exists.
            DeclaredType::Color(_) => Value::Null,
        }
    }
}

fn declared_matches(declared: &DeclaredType, value: &Value) -> bool {
    match (declared, value) {
        (DeclaredType::Null, Value::Null) => true,
        (DeclaredType::Number, Value::Number(_)) => true,
        (DeclaredType::String, Value::Str(_)) => true,
        (DeclaredType::Boolean, Value::Boolean(_)) => true,
        (DeclaredType::List, Value::List(_)) => true,
        (DeclaredType::Dictionary, Value::Dictionary(_)) => true,
        (DeclaredType::WithUnit(None), Value::WithUnit(_)) => true,
        (DeclaredType::WithUnit(Some(unit)), Value::WithUnit(n)) => n.unit == *unit,
        (DeclaredType::Color(None), Value::Color(_)) => true,
        (DeclaredType::Color(Some(sub)), Value::Color(color)) => {
            color.subtype_name().to_lowercase() == *sub
        }
        // Declared colors start out unset.
        (DeclaredType::Color(_), Value::Null) => true,
        _ => false,
    }
}
