//! The evaluator: a standard tree walk over the parsed AST.

use tksc_par::ast::{
    AttrExpr, Block, Expr, LValue, MethodCallExpr, Program, Stmt, UnaryOp,
};
use tksc_par::ast::{BinOp as AstBinOp, CmpOp as AstCmpOp, LogicalOp};
use tksc_spec::{Config, FunctionImpl};
use tksc_sym::methods;
use tksc_sym::ops::{self, ArithOp, CmpOp};
use tksc_sym::{Color, List, SymbolTable, SymbolError, Unit, Value, WithUnit};
use tksc_util::Span;
use tracing::trace;

use crate::builtins;
use crate::convert::{self, UnitCoercer};
use crate::error::{EvalError, Result, ITERATION_LIMIT};
use crate::is_uninterpreted_keyword;
use crate::refs::References;

/// Statement outcome inside one evaluation.
enum Flow {
    /// Plain statement, nothing to carry.
    Normal,
    /// An expression statement; its value becomes the program result if it
    /// is the last one.
    Value(Value),
    /// `return` unwinding to the program boundary.
    Return(Value),
}

/// The tree-walking evaluator.
///
/// One instance lives for a whole batch: the resolver calls
/// [`Interpreter::evaluate`] once per token with the shared reference map.
/// Scope state never leaks between evaluations - each one runs in a fresh
/// child frame.
pub struct Interpreter<'c> {
    config: &'c Config,
    scope: SymbolTable,
}

impl<'c> Interpreter<'c> {
    /// Creates an interpreter over the given managers.
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            scope: SymbolTable::with_registry(config.type_registry()),
        }
    }

    /// The managers this interpreter evaluates against.
    pub fn config(&self) -> &'c Config {
        self.config
    }

    /// Evaluates a program against the active reference map.
    pub fn evaluate(&mut self, program: &Program, refs: &References) -> Result<Value> {
        self.scope.push_frame();
        let result = self.eval_program(program, refs);
        self.scope.pop_frame();
        result
    }

    fn eval_program(&mut self, program: &Program, refs: &References) -> Result<Value> {
        let mut last = Value::Null;
        for stmt in &program.stmts {
            match self.exec_stmt(stmt, refs)? {
                Flow::Return(value) => return Ok(value),
                Flow::Value(value) => last = value,
                Flow::Normal => {}
            }
        }
        if let Some(trailing) = &program.trailing {
            last = self.eval_expr(trailing, refs)?;
        }
        Ok(last)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, refs: &References) -> Result<Flow> {
        match stmt {
            Stmt::VarDecl(decl) => {
                if decl
                    .name
                    .chars()
                    .any(|c| matches!(c, '.' | '[' | '-'))
                {
                    return Err(EvalError::InvalidVariableName {
                        name: decl.name.clone(),
                    });
                }
                let init = match &decl.init {
                    Some(expr) => Some(self.eval_expr(expr, refs)?),
                    None => None,
                };
                let value =
                    self.scope
                        .registry()
                        .instantiate(&decl.ty.base, decl.ty.sub.as_deref(), init)?;
                self.scope.define(&decl.name, value)?;
                Ok(Flow::Normal)
            }

            Stmt::Assign(assign) => {
                let value = self.eval_expr(&assign.value, refs)?;
                match &assign.target {
                    LValue::Var { name, span } => {
                        self.scope.assign(name, value).map_err(|err| match err {
                            SymbolError::UndefinedVariable { name } => {
                                EvalError::UndefinedVariable { name, span: *span }
                            }
                            other => other.into(),
                        })?;
                    }
                    LValue::Attr { base, chain, span } => {
                        let config = self.config;
                        let slot = self.scope.get_mut(base).ok_or_else(|| {
                            EvalError::UndefinedVariable {
                                name: base.clone(),
                                span: *span,
                            }
                        })?;
                        match slot {
                            Value::Color(color) => {
                                config.colors.set_attribute(color, chain, value)?
                            }
                            other => {
                                return Err(SymbolError::UnknownAttribute {
                                    type_name: other.type_name(),
                                    attribute: chain.join("."),
                                }
                                .into())
                            }
                        }
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::If(stmt) => {
                for arm in &stmt.arms {
                    if self.eval_condition(&arm.cond, refs)? {
                        return self.exec_block_flow(&arm.body, refs);
                    }
                }
                if let Some(block) = &stmt.else_block {
                    return self.exec_block_flow(block, refs);
                }
                Ok(Flow::Normal)
            }

            Stmt::While(stmt) => {
                let mut iterations = 0usize;
                while self.eval_condition(&stmt.cond, refs)? {
                    iterations += 1;
                    if iterations > ITERATION_LIMIT {
                        return Err(EvalError::IterationCap {
                            limit: ITERATION_LIMIT,
                        });
                    }
                    if let Some(value) = self.exec_block(&stmt.body, refs)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Return(stmt) => {
                let value = self.eval_expr(&stmt.value, refs)?;
                Ok(Flow::Return(value))
            }

            Stmt::Expr(stmt) => {
                let value = self.eval_expr(&stmt.expr, refs)?;
                Ok(Flow::Value(value))
            }
        }
    }

    fn eval_condition(&mut self, cond: &Expr, refs: &References) -> Result<bool> {
        match self.eval_expr(cond, refs)? {
            Value::Boolean(b) => Ok(b),
            other => Err(EvalError::ConditionNotBoolean {
                found: other.type_name(),
                span: cond.span(),
            }),
        }
    }

    /// Runs a block in a child frame; `Some` carries a `return` value.
    fn exec_block(&mut self, block: &Block, refs: &References) -> Result<Option<Value>> {
        self.scope.push_frame();
        let mut outcome = Ok(None);
        for stmt in &block.stmts {
            match self.exec_stmt(stmt, refs) {
                Ok(Flow::Return(value)) => {
                    outcome = Ok(Some(value));
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        self.scope.pop_frame();
        outcome
    }

    fn exec_block_flow(&mut self, block: &Block, refs: &References) -> Result<Flow> {
        Ok(match self.exec_block(block, refs)? {
            Some(value) => Flow::Return(value),
            None => Flow::Normal,
        })
    }

    fn eval_expr(&mut self, expr: &Expr, refs: &References) -> Result<Value> {
        match expr {
            Expr::Number(lit) => Ok(Value::Number(tksc_sym::Number::new(
                lit.value,
                lit.is_float,
            ))),

            // A bare identifier is a variable when one is in scope and a
            // plain string otherwise.
            Expr::Str(lit) => match self.scope.get(&lit.value) {
                Some(value) => Ok(value.deep_copy()),
                None => Ok(Value::Str(lit.value.clone())),
            },

            Expr::ExplicitStr(lit) => Ok(Value::Str(lit.value.clone())),

            Expr::HexColor(lit) => Ok(Value::Color(Color::hex(lit.value.clone())?)),

            Expr::Bool(lit) => Ok(Value::Boolean(lit.value)),

            Expr::Null(_) => Ok(Value::Null),

            Expr::Reference(reference) => match refs.get(&reference.name) {
                Some(entry) => {
                    trace!(name = %reference.name, "resolved reference");
                    Ok(entry.to_value())
                }
                None => Err(EvalError::UnresolvedReference {
                    name: reference.name.clone(),
                    span: reference.span,
                }),
            },

            Expr::UnitSuffix(suffix) => {
                let inner = self.eval_expr(&suffix.expr, refs)?;
                match inner {
                    Value::Number(n) => Ok(Value::WithUnit(WithUnit::new(
                        n.value,
                        n.is_float,
                        Unit::new(&suffix.unit),
                    ))),
                    other => Err(EvalError::UnitSuffixNotNumber {
                        found: other.type_name(),
                        span: suffix.span,
                    }),
                }
            }

            Expr::Unary(unary) => {
                let value = self.eval_expr(&unary.expr, refs)?;
                let result = match unary.op {
                    UnaryOp::Neg => ops::negate(&value)?,
                    UnaryOp::Not => ops::logical_not(&value)?,
                };
                Ok(result)
            }

            Expr::Binary(binary) => {
                let lhs = self.eval_expr(&binary.lhs, refs)?;
                let rhs = self.eval_expr(&binary.rhs, refs)?;
                let op = match binary.op {
                    AstBinOp::Add => ArithOp::Add,
                    AstBinOp::Sub => ArithOp::Sub,
                    AstBinOp::Mul => ArithOp::Mul,
                    AstBinOp::Div => ArithOp::Div,
                    AstBinOp::Pow => ArithOp::Pow,
                };
                Ok(ops::binary(op, &lhs, &rhs, &UnitCoercer::new(self.config))?)
            }

            Expr::Logical(logical) => {
                let lhs = self.eval_expr(&logical.lhs, refs)?;
                let lhs = expect_boolean(lhs)?;
                // Short-circuit before touching the right side.
                match (logical.op, lhs) {
                    (LogicalOp::And, false) => Ok(Value::Boolean(false)),
                    (LogicalOp::Or, true) => Ok(Value::Boolean(true)),
                    _ => {
                        let rhs = self.eval_expr(&logical.rhs, refs)?;
                        Ok(Value::Boolean(expect_boolean(rhs)?))
                    }
                }
            }

            Expr::Compare(compare) => {
                let lhs = self.eval_expr(&compare.lhs, refs)?;
                let rhs = self.eval_expr(&compare.rhs, refs)?;
                let op = match compare.op {
                    AstCmpOp::Eq => CmpOp::Eq,
                    AstCmpOp::Ne => CmpOp::Ne,
                    AstCmpOp::Lt => CmpOp::Lt,
                    AstCmpOp::Le => CmpOp::Le,
                    AstCmpOp::Gt => CmpOp::Gt,
                    AstCmpOp::Ge => CmpOp::Ge,
                };
                Ok(ops::compare(
                    op,
                    &lhs,
                    &rhs,
                    &UnitCoercer::new(self.config),
                )?)
            }

            Expr::List(list) => {
                let mut items = Vec::with_capacity(list.items.len());
                for item in &list.items {
                    items.push(self.eval_expr(item, refs)?);
                }
                Ok(Value::List(List {
                    items,
                    is_implicit: list.is_implicit,
                }))
            }

            Expr::Call(call) => self.eval_call(call.name.as_str(), &call.args, call.span, refs),

            Expr::Attribute(attr) => self.eval_attribute(attr, refs),

            Expr::MethodCall(call) => self.eval_method_call(call, refs),
        }
    }

    fn eval_call(
        &mut self,
        name: &str,
        args: &[Expr],
        span: Span,
        refs: &References,
    ) -> Result<Value> {
        let config = self.config;

        if let Some(function) = config.functions.lookup(name) {
            // Explicit list arguments flatten into the argument vector.
            let args = self.eval_args(args, refs, true)?;
            return match function {
                FunctionImpl::Builtin(builtin) => builtins::call_builtin(*builtin, args, config),
                FunctionImpl::User(user) => {
                    let input = Value::List(List::explicit(args));
                    convert::eval_script(config, &user.script, input)
                }
            };
        }

        if let Some(initializer) = config.colors.initializer(name) {
            let args = self.eval_args(args, refs, true)?;
            let input = Value::List(List::explicit(args));
            let result = convert::eval_script(config, &initializer.script, input)?;
            return convert::wrap_color_result(config, result, &initializer.subtype);
        }

        // CSS-like keywords pass through as text instead of failing.
        if is_uninterpreted_keyword(name) {
            let args = self.eval_args(args, refs, false)?;
            let body = args
                .iter()
                .map(Value::render)
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(Value::Str(format!("{name}({body})")));
        }

        Err(EvalError::UnknownFunction {
            name: name.to_string(),
            span,
        })
    }

    fn eval_attribute(&mut self, attr: &AttrExpr, refs: &References) -> Result<Value> {
        let value = self.eval_expr(&attr.receiver, refs)?;

        // `color.to` is only meaningful as `color.to.<subtype>()`, which
        // the method-call path intercepts before evaluation gets here.
        if attr.name.eq_ignore_ascii_case("to") && matches!(value, Value::Color(_)) {
            return Err(EvalError::BareConversionProxy { span: attr.span });
        }

        self.attr_or_zero_arg_method(value, &attr.name)
    }

    /// Attribute lookup, falling back to a zero-argument method of the
    /// same name (`s.length` works like `s.length()`).
    fn attr_or_zero_arg_method(&self, mut value: Value, name: &str) -> Result<Value> {
        match value.get_attribute(name) {
            Ok(found) => Ok(found),
            Err(err) => {
                if methods::has_method(&value, name) {
                    Ok(methods::call_method(&mut value, name, Vec::new())?)
                } else {
                    Err(err.into())
                }
            }
        }
    }

    fn eval_method_call(&mut self, call: &MethodCallExpr, refs: &References) -> Result<Value> {
        // The conversion proxy: `receiver.to.<subtype>()`.
        if let Expr::Attribute(attr) = call.receiver.as_ref() {
            if attr.name.eq_ignore_ascii_case("to") {
                let inner = self.eval_expr(&attr.receiver, refs)?;
                return match inner {
                    Value::Color(color) => {
                        if !call.args.is_empty() {
                            return Err(EvalError::InvalidArgument {
                                function: format!("to.{}", call.name),
                                message: "conversion takes no arguments".to_string(),
                            });
                        }
                        convert::convert_color(self.config, &color, &call.name)
                    }
                    other => Err(EvalError::ConversionOnNonColor {
                        found: other.type_name(),
                        span: attr.span,
                    }),
                };
            }
        }

        let args = self.eval_args(&call.args, refs, false)?;

        // Variable receivers dispatch on the symbol-table slot so mutating
        // methods stick.
        if let Expr::Str(lit) = call.receiver.as_ref() {
            if self.scope.exists(&lit.value) {
                let slot = self
                    .scope
                    .get_mut(&lit.value)
                    .expect("existence checked above");
                return Ok(methods::call_method(slot, &call.name, args)?);
            }
        }

        let mut receiver = self.eval_expr(&call.receiver, refs)?;
        Ok(methods::call_method(&mut receiver, &call.name, args)?)
    }

    fn eval_args(
        &mut self,
        args: &[Expr],
        refs: &References,
        flatten_explicit: bool,
    ) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.eval_expr(arg, refs)?;
            match value {
                Value::List(list) if flatten_explicit && !list.is_implicit => {
                    out.extend(list.items)
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

fn expect_boolean(value: Value) -> Result<bool> {
    match value {
        Value::Boolean(b) => Ok(b),
        other => Err(SymbolError::TypeMismatch {
            expected: "Boolean".to_string(),
            found: other.type_name(),
        }
        .into()),
    }
}
