//! Expression parsing.
//!
//! One method per precedence level, loosest first:
//!
//! ```text
//! test        lambda | or_test ['if' or_test 'else' test]
//! or_test     and_test ('or' and_test)*
//! and_test    not_test ('and' not_test)*
//! not_test    'not' not_test | comparison
//! comparison  bitor (cmp_op bitor)*
//! bitor .. term   left-associative binary levels
//! unary       ('-' | '+' | '~') unary | power
//! power       primary ['**' unary]
//! primary     atom trailer*
//! ```

use std::rc::Rc;

use weft_ir::TokenKind;
use weft_stack::ensure_sufficient_stack;

use super::{is_keyword, literal, Parser};
use crate::ast::{
    Arg, BinaryOp, BoolOp, CmpOp, ComprehensionKind, Expr, ExprKind, Generator, Precedence,
    UnaryOp,
};
use crate::SyntaxError;

impl Parser {
    /// `test (',' test)* [',']`, a bare tuple when a comma is present.
    pub(super) fn parse_test_list(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_sequence(Self::parse_test)
    }

    /// Like [`parse_test_list`](Self::parse_test_list) but elements may be
    /// starred (`a, *rest = items`).
    pub(super) fn parse_test_list_star(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_sequence(Self::parse_star_or_test)
    }

    /// Loop and comprehension targets: `bitor` level so that `in` is not
    /// taken as a comparison.
    pub(super) fn parse_target_list(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_sequence(|parser| {
            if parser.cursor.check_op("*") {
                let line = parser.cursor.line();
                parser.cursor.advance();
                let inner = parser.parse_binary(Precedence::BitOr)?;
                return Ok(Expr::new(ExprKind::Starred(Box::new(inner)), line));
            }
            parser.parse_binary(Precedence::BitOr)
        })
    }

    fn parse_sequence(
        &mut self,
        element: impl Fn(&mut Self) -> Result<Expr, SyntaxError>,
    ) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        let first = element(self)?;
        if !self.cursor.check_op(",") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat_op(",") {
            if self.at_sequence_end() {
                break;
            }
            items.push(element(self)?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), line))
    }

    fn at_sequence_end(&self) -> bool {
        let token = self.cursor.current();
        match token.kind {
            TokenKind::Newline | TokenKind::EndMarker | TokenKind::Dedent => true,
            TokenKind::Op => {
                matches!(
                    token.text.as_str(),
                    "=" | ")" | "]" | "}" | ":" | ";"
                ) || BinaryOp::from_augmented(&token.text).is_some()
            }
            TokenKind::Name => token.text == "in",
            _ => false,
        }
    }

    fn parse_star_or_test(&mut self) -> Result<Expr, SyntaxError> {
        if self.cursor.check_op("*") {
            let line = self.cursor.line();
            self.cursor.advance();
            let inner = self.parse_binary(Precedence::BitOr)?;
            return Ok(Expr::new(ExprKind::Starred(Box::new(inner)), line));
        }
        self.parse_test()
    }

    pub(super) fn parse_test(&mut self) -> Result<Expr, SyntaxError> {
        ensure_sufficient_stack(|| self.parse_test_inner())
    }

    fn parse_test_inner(&mut self) -> Result<Expr, SyntaxError> {
        if self.cursor.check_name("lambda") {
            return self.parse_lambda();
        }
        let body = self.parse_or()?;
        if !self.cursor.check_name("if") {
            return Ok(body);
        }
        self.cursor.advance();
        let test = self.parse_or()?;
        self.cursor.expect_name_keyword("else")?;
        let orelse = self.parse_test()?;
        let line = body.line;
        Ok(Expr::new(
            ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            line,
        ))
    }

    fn parse_lambda(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        self.cursor.expect_name_keyword("lambda")?;
        let params = self.parse_params(":", false)?;
        self.cursor.expect_op(":")?;
        let (body, _) = self.in_function_body(Self::parse_test)?;
        Ok(Expr::new(
            ExprKind::Lambda {
                params: Rc::new(params),
                body: Rc::new(body),
            },
            line,
        ))
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.cursor.eat_name("or") {
            let right = self.parse_and()?;
            left = bool_op(left, BoolOp::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_not()?;
        while self.cursor.eat_name("and") {
            let right = self.parse_not()?;
            left = bool_op(left, BoolOp::And, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, SyntaxError> {
        if self.cursor.check_name("not") {
            let line = self.cursor.line();
            self.cursor.advance();
            let operand = self.parse_not()?;
            return Ok(unary(UnaryOp::Not, operand, line));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_binary(Precedence::BitOr)?;
        let mut ops = Vec::new();
        while let Some((op, width)) = self.comparison_op() {
            for _ in 0..width {
                self.cursor.advance();
            }
            ops.push((op, self.parse_binary(Precedence::BitOr)?));
        }
        if ops.is_empty() {
            return Ok(left);
        }
        let line = left.line;
        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
            },
            line,
        ))
    }

    /// The comparison operator at the cursor and how many tokens it spans.
    fn comparison_op(&self) -> Option<(CmpOp, usize)> {
        let token = self.cursor.current();
        let next = self.cursor.peek_at(1);
        match (token.kind, token.text.as_str()) {
            (TokenKind::Op, "==") => Some((CmpOp::Eq, 1)),
            (TokenKind::Op, "!=") => Some((CmpOp::NotEq, 1)),
            (TokenKind::Op, "<") => Some((CmpOp::Lt, 1)),
            (TokenKind::Op, "<=") => Some((CmpOp::LtEq, 1)),
            (TokenKind::Op, ">") => Some((CmpOp::Gt, 1)),
            (TokenKind::Op, ">=") => Some((CmpOp::GtEq, 1)),
            (TokenKind::Name, "in") => Some((CmpOp::In, 1)),
            (TokenKind::Name, "not") if next.is_name("in") => Some((CmpOp::NotIn, 2)),
            (TokenKind::Name, "is") if next.is_name("not") => Some((CmpOp::IsNot, 2)),
            (TokenKind::Name, "is") => Some((CmpOp::Is, 1)),
            _ => None,
        }
    }

    /// Left-associative binary levels from `BitOr` down to `Term`.
    fn parse_binary(&mut self, level: Precedence) -> Result<Expr, SyntaxError> {
        if level >= Precedence::Unary {
            return self.parse_unary();
        }
        let mut left = self.parse_binary(level.next())?;
        while let Some(op) = self.binary_op(level) {
            self.cursor.advance();
            let right = self.parse_binary(level.next())?;
            let line = left.line;
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                line,
            );
        }
        Ok(left)
    }

    fn binary_op(&self, level: Precedence) -> Option<BinaryOp> {
        let token = self.cursor.current();
        if token.kind != TokenKind::Op {
            return None;
        }
        let op = match token.text.as_str() {
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "&" => BinaryOp::BitAnd,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "//" => BinaryOp::FloorDiv,
            "%" => BinaryOp::Mod,
            "@" => BinaryOp::MatMul,
            _ => return None,
        };
        (op.precedence() == level).then_some(op)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        let op = match self.cursor.current() {
            token if token.is_op("-") => Some(UnaryOp::Neg),
            token if token.is_op("+") => Some(UnaryOp::Pos),
            token if token.is_op("~") => Some(UnaryOp::Invert),
            _ => None,
        };
        if let Some(op) = op {
            self.cursor.advance();
            let operand = ensure_sufficient_stack(|| self.parse_unary())?;
            return Ok(unary(op, operand, line));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.parse_primary()?;
        if !self.cursor.eat_op("**") {
            return Ok(base);
        }
        let exponent = self.parse_unary()?;
        let line = base.line;
        Ok(Expr::new(
            ExprKind::Binary {
                left: Box::new(base),
                op: BinaryOp::Pow,
                right: Box::new(exponent),
            },
            line,
        ))
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_atom()?;
        loop {
            let line = expr.line;
            if self.cursor.eat_op("(") {
                let args = self.parse_call_args()?;
                expr = Expr::new(
                    ExprKind::Call {
                        func: Box::new(expr),
                        args,
                    },
                    line,
                );
            } else if self.cursor.eat_op("[") {
                let index = self.parse_subscript()?;
                self.cursor.expect_op("]")?;
                expr = Expr::new(
                    ExprKind::Subscript {
                        value: Box::new(expr),
                        index: Box::new(index),
                    },
                    line,
                );
            } else if self.cursor.eat_op(".") {
                let attr = self.expect_identifier()?;
                expr = Expr::new(
                    ExprKind::Attribute {
                        value: Box::new(expr),
                        attr,
                    },
                    line,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// Arguments after `(`, consuming the closing `)`.
    fn parse_call_args(&mut self) -> Result<Vec<Arg>, SyntaxError> {
        let mut args = Vec::new();
        while !self.cursor.check_op(")") {
            let arg = if self.cursor.eat_op("*") {
                Arg::Star(self.parse_test()?)
            } else if self.cursor.eat_op("**") {
                Arg::DoubleStar(self.parse_test()?)
            } else if self.cursor.check(TokenKind::Name) && self.cursor.peek_at(1).is_op("=") {
                let name = self.expect_identifier()?;
                self.cursor.advance();
                Arg::Keyword(name, self.parse_test()?)
            } else {
                let value = self.parse_test()?;
                if self.cursor.check_name("for") {
                    if !args.is_empty() {
                        return Err(SyntaxError::new(
                            "generator expression must be parenthesized",
                            value.line,
                        ));
                    }
                    let generator = self.parse_comprehension(ComprehensionKind::Generator, value)?;
                    self.cursor.expect_op(")")?;
                    return Ok(vec![Arg::Positional(generator)]);
                }
                Arg::Positional(value)
            };
            let after_keywords = args
                .iter()
                .any(|arg| matches!(arg, Arg::Keyword(..) | Arg::DoubleStar(_)));
            if after_keywords && matches!(arg, Arg::Positional(_)) {
                return Err(SyntaxError::new(
                    "positional argument follows keyword argument",
                    self.cursor.line(),
                ));
            }
            args.push(arg);
            if !self.cursor.eat_op(",") {
                break;
            }
        }
        self.cursor.expect_op(")")?;
        Ok(args)
    }

    /// A subscript index: a slice, an expression, or a tuple of them.
    fn parse_subscript(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        let first = self.parse_slice_item()?;
        if !self.cursor.check_op(",") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.cursor.eat_op(",") {
            if self.cursor.check_op("]") {
                break;
            }
            items.push(self.parse_slice_item()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), line))
    }

    fn parse_slice_item(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        let lower = if self.cursor.check_op(":") {
            None
        } else {
            let value = self.parse_test()?;
            if !self.cursor.check_op(":") {
                return Ok(value);
            }
            Some(Box::new(value))
        };
        self.cursor.expect_op(":")?;
        let upper = self.parse_slice_part()?;
        let step = if self.cursor.eat_op(":") {
            self.parse_slice_part()?
        } else {
            None
        };
        Ok(Expr::new(ExprKind::Slice { lower, upper, step }, line))
    }

    fn parse_slice_part(&mut self) -> Result<Option<Box<Expr>>, SyntaxError> {
        if self.cursor.check_op(":") || self.cursor.check_op("]") || self.cursor.check_op(",") {
            Ok(None)
        } else {
            Ok(Some(Box::new(self.parse_test()?)))
        }
    }

    /// `for target in iter [if cond]*` clauses after `element`.
    fn parse_comprehension(
        &mut self,
        kind: ComprehensionKind,
        element: Expr,
    ) -> Result<Expr, SyntaxError> {
        let mut generators = Vec::new();
        while self.cursor.eat_name("for") {
            let target = self.parse_target_list()?;
            if !target.kind.is_target() {
                return Err(SyntaxError::new(
                    "cannot assign to comprehension target",
                    target.line,
                ));
            }
            self.cursor.expect_name_keyword("in")?;
            let iter = self.parse_or()?;
            let mut ifs = Vec::new();
            while self.cursor.eat_name("if") {
                ifs.push(self.parse_or()?);
            }
            generators.push(Generator { target, iter, ifs });
        }
        let line = element.line;
        Ok(Expr::new(
            ExprKind::Comprehension {
                kind,
                element: Box::new(element),
                generators,
            },
            line,
        ))
    }

    /// `yield [test_list]` or `yield from test`.
    pub(super) fn parse_yield(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        self.cursor.expect_name_keyword("yield")?;
        if !self.context.in_function() {
            return Err(SyntaxError::new("'yield' outside function", line));
        }
        self.saw_yield = true;
        if self.cursor.eat_name("from") {
            let value = self.parse_test()?;
            return Ok(Expr::new(ExprKind::YieldFrom(Box::new(value)), line));
        }
        let ends = self.cursor.check(TokenKind::Newline)
            || self.cursor.is_at_end()
            || self.cursor.check_op(")")
            || self.cursor.check_op("=")
            || self.cursor.check_op(";");
        let value = if ends {
            None
        } else {
            Some(Box::new(self.parse_test_list_star()?))
        };
        Ok(Expr::new(ExprKind::Yield(value), line))
    }

    // === Atoms ===

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        let token = self.cursor.current().clone();
        let kind = match token.kind {
            TokenKind::Name => {
                let kind = match token.text.as_str() {
                    "True" => ExprKind::Bool(true),
                    "False" => ExprKind::Bool(false),
                    "None" => ExprKind::None,
                    name if is_keyword(name) => {
                        return Err(SyntaxError::new(
                            format!("invalid syntax near '{name}'"),
                            line,
                        ))
                    }
                    name => ExprKind::Name(name.to_owned()),
                };
                self.cursor.advance();
                kind
            }
            TokenKind::Number => {
                self.cursor.advance();
                literal::parse_number(&token.text)
                    .map_err(|message| SyntaxError::new(message, line))?
            }
            TokenKind::String => {
                let mut pieces = Vec::new();
                while self.cursor.check(TokenKind::String) {
                    pieces.push(self.cursor.advance().text);
                }
                literal::parse_strings(&pieces, line)?
            }
            TokenKind::Op => match token.text.as_str() {
                "(" => return self.parse_paren(),
                "[" => return self.parse_list(),
                "{" => return self.parse_dict(),
                "..." => {
                    self.cursor.advance();
                    ExprKind::Ellipsis
                }
                _ => return Err(self.cursor.unexpected("an expression")),
            },
            _ => return Err(self.cursor.unexpected("an expression")),
        };
        Ok(Expr::new(kind, line))
    }

    fn parse_paren(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        self.cursor.expect_op("(")?;
        if self.cursor.eat_op(")") {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), line));
        }
        if self.cursor.check_name("yield") {
            let value = self.parse_yield()?;
            self.cursor.expect_op(")")?;
            return Ok(value);
        }
        let first = self.parse_star_or_test()?;
        if self.cursor.check_name("for") {
            let generator = self.parse_comprehension(ComprehensionKind::Generator, first)?;
            self.cursor.expect_op(")")?;
            return Ok(generator);
        }
        if !self.cursor.check_op(",") {
            self.cursor.expect_op(")")?;
            return Ok(first);
        }
        let items = self.parse_display_rest(first, ")")?;
        Ok(Expr::new(ExprKind::Tuple(items), line))
    }

    fn parse_list(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        self.cursor.expect_op("[")?;
        if self.cursor.eat_op("]") {
            return Ok(Expr::new(ExprKind::List(Vec::new()), line));
        }
        let first = self.parse_star_or_test()?;
        if self.cursor.check_name("for") {
            let comprehension = self.parse_comprehension(ComprehensionKind::List, first)?;
            self.cursor.expect_op("]")?;
            return Ok(comprehension);
        }
        let items = self.parse_display_rest(first, "]")?;
        Ok(Expr::new(ExprKind::List(items), line))
    }

    /// Remaining `, item` entries of a display, consuming `closing`.
    fn parse_display_rest(&mut self, first: Expr, closing: &str) -> Result<Vec<Expr>, SyntaxError> {
        let mut items = vec![first];
        while self.cursor.eat_op(",") {
            if self.cursor.check_op(closing) {
                break;
            }
            items.push(self.parse_star_or_test()?);
        }
        self.cursor.expect_op(closing)?;
        Ok(items)
    }

    fn parse_dict(&mut self) -> Result<Expr, SyntaxError> {
        let line = self.cursor.line();
        self.cursor.expect_op("{")?;
        let mut entries = Vec::new();
        while !self.cursor.check_op("}") {
            let key = self.parse_test()?;
            if !self.cursor.check_op(":") {
                return Err(SyntaxError::new("set displays are not supported", key.line));
            }
            self.cursor.advance();
            let value = self.parse_test()?;
            entries.push((key, value));
            if !self.cursor.eat_op(",") {
                break;
            }
        }
        self.cursor.expect_op("}")?;
        Ok(Expr::new(ExprKind::Dict(entries), line))
    }
}

fn bool_op(left: Expr, op: BoolOp, right: Expr) -> Expr {
    let line = left.line;
    Expr::new(
        ExprKind::BoolOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        line,
    )
}

fn unary(op: UnaryOp, operand: Expr, line: usize) -> Expr {
    Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        line,
    )
}
