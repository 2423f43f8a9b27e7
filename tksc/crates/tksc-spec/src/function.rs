//! The function manager: built-in functions plus user-registered scripts.
//!
//! Builtins are identifiers here - the interpreter owns their behavior.
//! User functions carry a script parsed once at registration and evaluated
//! with `input` bound to the argument list.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, SpecError};
use crate::schema::FunctionSpecJson;
use crate::script::Script;

/// Built-in functions; evaluation lives in the interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Min,
    Max,
    Sum,
    Mod,
    Average,
    Round,
    Abs,
    Sqrt,
    Pow,
    ParseInt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Log,
    Floor,
    Ceil,
    RoundTo,
    Pi,
    Type,
    /// Pass-through formatter: re-emits its arguments as text.
    LinearGradient,
    /// Pass-through formatter: re-emits its arguments as text.
    Rgba,
}

impl Builtin {
    /// The call keyword, lowercase.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Mod => "mod",
            Builtin::Average => "average",
            Builtin::Round => "round",
            Builtin::Abs => "abs",
            Builtin::Sqrt => "sqrt",
            Builtin::Pow => "pow",
            Builtin::ParseInt => "parse_int",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Asin => "asin",
            Builtin::Acos => "acos",
            Builtin::Atan => "atan",
            Builtin::Atan2 => "atan2",
            Builtin::Log => "log",
            Builtin::Floor => "floor",
            Builtin::Ceil => "ceil",
            Builtin::RoundTo => "round_to",
            Builtin::Pi => "pi",
            Builtin::Type => "type",
            Builtin::LinearGradient => "linear-gradient",
            Builtin::Rgba => "rgba",
        }
    }

    /// Every builtin, in seeding order.
    pub fn all() -> &'static [Builtin] {
        &[
            Builtin::Min,
            Builtin::Max,
            Builtin::Sum,
            Builtin::Mod,
            Builtin::Average,
            Builtin::Round,
            Builtin::Abs,
            Builtin::Sqrt,
            Builtin::Pow,
            Builtin::ParseInt,
            Builtin::Sin,
            Builtin::Cos,
            Builtin::Tan,
            Builtin::Asin,
            Builtin::Acos,
            Builtin::Atan,
            Builtin::Atan2,
            Builtin::Log,
            Builtin::Floor,
            Builtin::Ceil,
            Builtin::RoundTo,
            Builtin::Pi,
            Builtin::Type,
            Builtin::LinearGradient,
            Builtin::Rgba,
        ]
    }
}

/// A user-registered function.
#[derive(Clone, Debug)]
pub struct UserFunction {
    pub name: String,
    pub keyword: String,
    pub script: Script,
}

/// What a call keyword maps to.
#[derive(Clone, Debug)]
pub enum FunctionImpl {
    Builtin(Builtin),
    User(UserFunction),
}

/// Registry of callable functions.
#[derive(Clone, Debug)]
pub struct FunctionManager {
    /// Lowercased keyword → implementation, seeded with every builtin.
    functions: IndexMap<String, FunctionImpl>,
}

impl Default for FunctionManager {
    fn default() -> Self {
        let mut functions = IndexMap::new();
        for builtin in Builtin::all() {
            functions.insert(builtin.name().to_string(), FunctionImpl::Builtin(*builtin));
        }
        Self { functions }
    }
}

impl FunctionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function spec JSON under `keyword`. User registrations
    /// may shadow builtins.
    pub fn register(&mut self, keyword: &str, json: &serde_json::Value) -> Result<()> {
        let spec: FunctionSpecJson = serde_json::from_value(json.clone())?;
        if spec.kind != "function" {
            return Err(SpecError::invalid(format!(
                "expected type \"function\", got \"{}\"",
                spec.kind
            )));
        }
        if !spec.keyword.eq_ignore_ascii_case(keyword) {
            return Err(SpecError::invalid(format!(
                "registration keyword '{keyword}' does not match spec keyword '{}'",
                spec.keyword
            )));
        }

        let script = Script::parse(&spec.script)?;
        debug!(keyword = %keyword, "registered function spec");
        self.functions.insert(
            keyword.to_lowercase(),
            FunctionImpl::User(UserFunction {
                name: spec.name,
                keyword: spec.keyword,
                script,
            }),
        );
        Ok(())
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&FunctionImpl> {
        self.functions.get(&name.to_lowercase())
    }
}
