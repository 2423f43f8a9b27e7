//! Statement parsing - variable declarations, assignment, if, while, return.

use tksc_lex::{Keyword, TokenKind};

use crate::ast::*;
use crate::{ParseError, Parser};

/// What may legally follow an unterminated expression.
#[derive(Clone, Copy, PartialEq, Eq)]
enum StmtEnd {
    /// Top level: end of input closes a trailing inline expression.
    Eof,
    /// Inside a block: `]` closes a trailing expression.
    Block,
}

impl<'a> Parser<'a> {
    /// Parses a whole script: statements plus an optional trailing
    /// expression with no terminator (inline mode).
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut stmts = Vec::new();
        let mut trailing = None;

        while !self.is_at_end() {
            match self.parse_stmt(StmtEnd::Eof)? {
                StmtOutcome::Stmt(stmt) => stmts.push(stmt),
                StmtOutcome::Trailing(expr) => {
                    trailing = Some(expr);
                    break;
                }
            }
        }

        Ok(Program { stmts, trailing })
    }

    /// Parses one statement, or the trailing expression closing the script
    /// or block.
    fn parse_stmt(&mut self, end: StmtEnd) -> Result<StmtOutcome, ParseError> {
        match self.current_kind() {
            TokenKind::Keyword(Keyword::Variable) => self.parse_var_decl().map(StmtOutcome::Stmt),
            TokenKind::Keyword(Keyword::If) => self.parse_if_stmt().map(StmtOutcome::Stmt),
            TokenKind::Keyword(Keyword::While) => self.parse_while_stmt().map(StmtOutcome::Stmt),
            TokenKind::Keyword(Keyword::Return) => self.parse_return_stmt().map(StmtOutcome::Stmt),
            _ => self.parse_expr_or_assign(end),
        }
    }

    /// Parses `variable name: Type(.Sub)? (= init)? ;`.
    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        self.advance()?; // 'variable'

        let name = match self.current_kind() {
            TokenKind::Str(name) => name.clone(),
            _ => {
                return Err(ParseError::MissingVariableName {
                    span: self.current_span(),
                })
            }
        };
        self.advance()?;

        if *self.current_kind() != TokenKind::Colon {
            return Err(ParseError::MissingType {
                span: self.current_span(),
            });
        }
        self.advance()?;

        let ty = self.parse_type_decl()?;

        let init = if self.eat(&TokenKind::Eq)? {
            Some(self.parse_list_expr()?)
        } else {
            None
        };

        let end = self.current_span();
        self.expect_semicolon()?;

        Ok(Stmt::VarDecl(VarDeclStmt {
            name,
            ty,
            init,
            span: start.to(end),
        }))
    }

    /// Parses `Type` or `Type.Sub`. Unit keywords are valid segments
    /// (`NumberWithUnit.Px` lexes its subtype as a unit token).
    fn parse_type_decl(&mut self) -> Result<TypeDecl, ParseError> {
        let start = self.current_span();
        let base = self.type_segment()?;
        let mut span = start;
        let mut sub = None;

        if self.eat(&TokenKind::Dot)? {
            span = start.to(self.current_span());
            sub = Some(self.type_segment()?);
        }

        Ok(TypeDecl { base, sub, span })
    }

    fn type_segment(&mut self) -> Result<String, ParseError> {
        let text = match self.current_kind() {
            TokenKind::Str(name) => name.clone(),
            TokenKind::Format(unit) => unit.clone(),
            _ => {
                return Err(ParseError::MissingType {
                    span: self.current_span(),
                })
            }
        };
        self.advance()?;
        Ok(text)
    }

    /// Parses `if (cond) block (elif (cond) block)* (else block)? ;?`.
    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        self.advance()?; // 'if'

        let mut arms = vec![self.parse_guarded_arm()?];
        let mut else_block = None;
        let mut end = arms[0].body.span;

        loop {
            match self.current_kind() {
                TokenKind::Keyword(Keyword::Elif) => {
                    self.advance()?;
                    let arm = self.parse_guarded_arm()?;
                    end = arm.body.span;
                    arms.push(arm);
                }
                TokenKind::Keyword(Keyword::Else) => {
                    self.advance()?;
                    let block = self.parse_block()?;
                    end = block.span;
                    else_block = Some(block);
                    break;
                }
                _ => break,
            }
        }

        // Statement terminator is optional after a block.
        self.eat(&TokenKind::Semicolon)?;

        Ok(Stmt::If(IfStmt {
            arms,
            else_block,
            span: start.to(end),
        }))
    }

    /// Parses `( cond ) block` - shared by `if` and `elif`.
    fn parse_guarded_arm(&mut self) -> Result<IfArm, ParseError> {
        self.expect(&TokenKind::LParen, "'(' before condition")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let body = self.parse_block()?;
        Ok(IfArm { cond, body })
    }

    /// Parses `while (cond) block ;?`.
    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        self.advance()?; // 'while'

        self.expect(&TokenKind::LParen, "'(' before condition")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let body = self.parse_block()?;
        let span = start.to(body.span);

        self.eat(&TokenKind::Semicolon)?;

        Ok(Stmt::While(WhileStmt { cond, body, span }))
    }

    /// Parses `return expr ;`.
    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        self.advance()?; // 'return'

        let value = self.parse_list_expr()?;
        let span = start.to(value.span());
        self.expect_semicolon()?;

        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    /// Parses `[ statement* ]`.
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::LBlock, "'[' to open block")?;

        let mut stmts = Vec::new();
        while !self.is_at_end() && *self.current_kind() != TokenKind::RBlock {
            match self.parse_stmt(StmtEnd::Block)? {
                StmtOutcome::Stmt(stmt) => stmts.push(stmt),
                StmtOutcome::Trailing(expr) => {
                    // A block has no value; keep the expression as a
                    // statement and let the closing bracket end the loop.
                    let span = expr.span();
                    stmts.push(Stmt::Expr(ExprStmt { expr, span }));
                    break;
                }
            }
        }

        let end = self.current_span();
        self.expect(&TokenKind::RBlock, "']' to close block")?;

        Ok(Block {
            stmts,
            span: start.to(end),
        })
    }

    /// Parses an expression statement or an assignment, depending on
    /// whether `=` follows the parsed expression.
    fn parse_expr_or_assign(&mut self, end: StmtEnd) -> Result<StmtOutcome, ParseError> {
        let expr = self.parse_list_expr()?;

        match self.current_kind() {
            TokenKind::Eq => {
                let target = lvalue_from_expr(expr)?;
                self.advance()?;
                let value = self.parse_list_expr()?;
                let span = target.span().to(value.span());
                self.expect_semicolon()?;
                Ok(StmtOutcome::Stmt(Stmt::Assign(AssignStmt {
                    target,
                    value,
                    span,
                })))
            }
            TokenKind::Semicolon => {
                let span = expr.span();
                self.advance()?;
                Ok(StmtOutcome::Stmt(Stmt::Expr(ExprStmt { expr, span })))
            }
            TokenKind::Eof if end == StmtEnd::Eof => Ok(StmtOutcome::Trailing(expr)),
            TokenKind::RBlock if end == StmtEnd::Block => Ok(StmtOutcome::Trailing(expr)),
            other => Err(ParseError::MissingTerminator {
                found: other.describe(),
                span: self.current_span(),
            }),
        }
    }
}

/// Outcome of parsing one statement position.
enum StmtOutcome {
    Stmt(Stmt),
    /// An expression ran into the end of the script/block with no `;`.
    Trailing(Expr),
}

/// Reinterprets an already-parsed expression as an assignment target.
fn lvalue_from_expr(expr: Expr) -> Result<LValue, ParseError> {
    let span = expr.span();
    match expr {
        Expr::Str(lit) => Ok(LValue::Var {
            name: lit.value,
            span: lit.span,
        }),
        Expr::Attribute(_) => {
            let mut chain = Vec::new();
            let mut cursor = expr;
            loop {
                match cursor {
                    Expr::Attribute(attr) => {
                        chain.push(attr.name);
                        cursor = *attr.receiver;
                    }
                    Expr::Str(lit) => {
                        chain.reverse();
                        return Ok(LValue::Attr {
                            base: lit.value,
                            chain,
                            span,
                        });
                    }
                    _ => return Err(ParseError::InvalidAssignTarget { span }),
                }
            }
        }
        _ => Err(ParseError::InvalidAssignTarget { span }),
    }
}
