//! Expression parsing with precedence climbing.
//!
//! Precedence, loosest to tightest: comma (explicit list), juxtaposition
//! (implicit list), `||`, `&&`, `!`, comparison, `+ -`, `* /`, `^`
//! (right-associative), unary `-`, postfix (unit suffix, `.attr`,
//! `.method(args)`), atom.

use tksc_lex::{Keyword, TokenKind};
use tksc_util::Span;

use crate::ast::*;
use crate::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// Comma level: `a, b, c` builds an explicit list.
    pub(crate) fn parse_list_expr(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_value_expr()?;
        if *self.current_kind() != TokenKind::Comma {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat(&TokenKind::Comma)? {
            items.push(self.parse_value_expr()?);
        }

        let span = span_of_items(&items);
        Ok(Expr::List(ListExpr {
            items,
            is_implicit: false,
            span,
        }))
    }

    /// Juxtaposition level: `1px 2px` builds an implicit list.
    pub(crate) fn parse_value_expr(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_expr()?;
        if !self.starts_expression() {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.starts_expression() {
            items.push(self.parse_expr()?);
        }

        let span = span_of_items(&items);
        Ok(Expr::List(ListExpr {
            items,
            is_implicit: true,
            span,
        }))
    }

    /// Scalar expression entry point (`or`-level).
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.eat(&TokenKind::OrOr)? {
            let rhs = self.parse_and()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Logical(LogicalExpr {
                op: LogicalOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_not()?;
        while self.eat(&TokenKind::AndAnd)? {
            let rhs = self.parse_not()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Logical(LogicalExpr {
                op: LogicalOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if *self.current_kind() == TokenKind::Not {
            let start = self.current_span();
            self.advance()?;
            let expr = self.parse_not()?;
            let span = start.to(expr.span());
            return Ok(Expr::Unary(UnaryExpr {
                op: UnaryOp::Not,
                expr: Box::new(expr),
                span,
            }));
        }
        self.parse_cmp()
    }

    /// Comparison does not chain: `a < b < c` leaves the second `<` for the
    /// caller, which will reject it.
    fn parse_cmp(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_add()?;
        let op = match self.current_kind() {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::Ne,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::Le,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance()?;
        let rhs = self.parse_add()?;
        let span = lhs.span().to(rhs.span());
        Ok(Expr::Compare(CompareExpr {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        }))
    }

    fn parse_add(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_mul()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_pow()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_pow()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    /// `^` is right-associative: `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
    fn parse_pow(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_unary()?;
        if !self.eat(&TokenKind::Caret)? {
            return Ok(base);
        }
        let exponent = self.parse_pow()?;
        let span = base.span().to(exponent.span());
        Ok(Expr::Binary(BinaryExpr {
            op: BinOp::Pow,
            lhs: Box::new(base),
            rhs: Box::new(exponent),
            span,
        }))
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if *self.current_kind() == TokenKind::Minus {
            let start = self.current_span();
            self.advance()?;
            let expr = self.parse_unary()?;
            let span = start.to(expr.span());
            return Ok(Expr::Unary(UnaryExpr {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
                span,
            }));
        }
        self.parse_postfix()
    }

    /// Postfix chain: unit suffixes, attribute access, and method calls.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.current_kind() {
                TokenKind::Format(unit) => {
                    let unit = unit.clone();
                    let span = expr.span().to(self.current_span());
                    self.advance()?;
                    expr = Expr::UnitSuffix(UnitSuffixExpr {
                        expr: Box::new(expr),
                        unit,
                        span,
                    });
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let (name, name_span) = self.member_name()?;
                    if *self.current_kind() == TokenKind::LParen {
                        let (args, args_span) = self.parse_call_args()?;
                        let span = expr.span().to(args_span);
                        expr = Expr::MethodCall(MethodCallExpr {
                            receiver: Box::new(expr),
                            name,
                            args,
                            span,
                        });
                    } else {
                        let span = expr.span().to(name_span);
                        expr = Expr::Attribute(AttrExpr {
                            receiver: Box::new(expr),
                            name,
                            span,
                        });
                    }
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// A member name after `.`: a plain identifier, or a unit keyword
    /// (method and attribute names may collide with units).
    fn member_name(&mut self) -> Result<(String, Span), ParseError> {
        let span = self.current_span();
        let name = match self.current_kind() {
            TokenKind::Str(name) => name.clone(),
            TokenKind::Format(unit) => unit.clone(),
            other => {
                return Err(ParseError::Expected {
                    expected: "attribute or method name".to_string(),
                    found: other.describe(),
                    span,
                })
            }
        };
        self.advance()?;
        Ok((name, span))
    }

    /// Parses `( arg (, arg)* )`; each argument may itself be an implicit
    /// list (`f(1px 2px, 3)`).
    fn parse_call_args(&mut self) -> Result<(Vec<Expr>, Span), ParseError> {
        let start = self.current_span();
        self.advance()?; // '(' checked by caller

        let mut args = Vec::new();
        if *self.current_kind() != TokenKind::RParen {
            loop {
                args.push(self.parse_value_expr()?);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }

        let end = self.current_span();
        self.expect(&TokenKind::RParen, "')' to close arguments")?;
        Ok((args, start.to(end)))
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let span = self.current_span();
        match self.current_kind().clone() {
            TokenKind::Number { value, is_float } => {
                self.advance()?;
                Ok(Expr::Number(NumberLit {
                    value,
                    is_float,
                    span,
                }))
            }
            TokenKind::ExplicitStr(value) => {
                self.advance()?;
                Ok(Expr::ExplicitStr(StrLit { value, span }))
            }
            TokenKind::HexColor(value) => {
                self.advance()?;
                Ok(Expr::HexColor(StrLit { value, span }))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance()?;
                Ok(Expr::Bool(BoolLit { value: true, span }))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance()?;
                Ok(Expr::Bool(BoolLit { value: false, span }))
            }
            TokenKind::Keyword(Keyword::Null) | TokenKind::Keyword(Keyword::Undefined) => {
                self.advance()?;
                Ok(Expr::Null(span))
            }
            TokenKind::Reference(name) => {
                self.record_reference(&name);
                self.advance()?;
                Ok(Expr::Reference(RefExpr { name, span }))
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')' to close group")?;
                Ok(inner)
            }
            TokenKind::Str(name) => {
                self.advance()?;
                if *self.current_kind() == TokenKind::LParen {
                    let (args, args_span) = self.parse_call_args()?;
                    Ok(Expr::Call(CallExpr {
                        name,
                        args,
                        span: span.to(args_span),
                    }))
                } else {
                    Ok(Expr::Str(StrLit { value: name, span }))
                }
            }
            other => Err(ParseError::InvalidExpression {
                found: other.describe(),
                span,
            }),
        }
    }

    /// True if the current token can begin a new expression; drives
    /// implicit-list juxtaposition.
    fn starts_expression(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Number { .. }
                | TokenKind::Str(_)
                | TokenKind::ExplicitStr(_)
                | TokenKind::HexColor(_)
                | TokenKind::Reference(_)
                | TokenKind::LParen
                | TokenKind::Keyword(Keyword::True)
                | TokenKind::Keyword(Keyword::False)
                | TokenKind::Keyword(Keyword::Null)
                | TokenKind::Keyword(Keyword::Undefined)
        )
    }

    pub(crate) fn record_reference(&mut self, name: &str) {
        self.references.insert(name.to_string());
    }
}

fn span_of_items(items: &[Expr]) -> Span {
    match (items.first(), items.last()) {
        (Some(first), Some(last)) => first.span().to(last.span()),
        _ => Span::DUMMY,
    }
}
