//! Statement parsing.

use std::rc::Rc;

use weft_ir::TokenKind;
use weft_stack::ensure_sufficient_stack;

use super::Parser;
use crate::ast::{
    Alias, BinaryOp, ClassDef, Expr, ExprKind, FunctionDef, Param, Params, Stmt, StmtKind,
};
use crate::context::ParseContext;
use crate::SyntaxError;

impl Parser {
    /// Parse one statement line (or compound statement) into `out`. Simple
    /// statements separated by `;` produce several entries.
    pub(super) fn parse_statement(&mut self, out: &mut Vec<Stmt>) -> Result<(), SyntaxError> {
        ensure_sufficient_stack(|| self.parse_statement_inner(out))
    }

    fn parse_statement_inner(&mut self, out: &mut Vec<Stmt>) -> Result<(), SyntaxError> {
        let line = self.cursor.line();
        if self.cursor.check_op("@") {
            let decorators = self.parse_decorators()?;
            let stmt = if self.cursor.check_name("def") {
                self.parse_function_def(decorators, line)?
            } else if self.cursor.check_name("class") {
                self.parse_class_def(decorators, line)?
            } else {
                return Err(self.cursor.unexpected("'def' or 'class' after decorators"));
            };
            out.push(stmt);
            return Ok(());
        }

        let keyword = if self.cursor.check(TokenKind::Name) {
            self.cursor.current().text.clone()
        } else {
            String::new()
        };
        let compound = match keyword.as_str() {
            "def" => Some(self.parse_function_def(Vec::new(), line)?),
            "class" => Some(self.parse_class_def(Vec::new(), line)?),
            "if" => {
                self.cursor.advance();
                Some(self.parse_if_rest(line)?)
            }
            "for" => Some(self.parse_for()?),
            "while" => Some(self.parse_while()?),
            _ => None,
        };
        match compound {
            Some(stmt) => out.push(stmt),
            None => self.parse_simple_statements(out)?,
        }
        Ok(())
    }

    /// `small (';' small)* [';'] NEWLINE`
    fn parse_simple_statements(&mut self, out: &mut Vec<Stmt>) -> Result<(), SyntaxError> {
        loop {
            out.push(self.parse_simple_statement()?);
            if !self.cursor.eat_op(";") || self.at_line_end() {
                break;
            }
        }
        self.end_of_line()
    }

    fn at_line_end(&self) -> bool {
        self.cursor.check(TokenKind::Newline) || self.cursor.is_at_end()
    }

    fn end_of_line(&mut self) -> Result<(), SyntaxError> {
        if self.cursor.check(TokenKind::Newline) {
            self.cursor.advance();
            Ok(())
        } else if self.cursor.is_at_end() {
            Ok(())
        } else {
            Err(self.cursor.unexpected("end of line"))
        }
    }

    fn parse_simple_statement(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.cursor.line();
        let keyword = if self.cursor.check(TokenKind::Name) {
            self.cursor.current().text.clone()
        } else {
            String::new()
        };
        let kind = match keyword.as_str() {
            "pass" => {
                self.cursor.advance();
                StmtKind::Pass
            }
            "break" | "continue" => {
                if !self.context.in_loop() {
                    return Err(SyntaxError::new(format!("'{keyword}' outside loop"), line));
                }
                self.cursor.advance();
                if keyword == "break" {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                }
            }
            "return" => {
                if !self.context.in_function() {
                    return Err(SyntaxError::new("'return' outside function", line));
                }
                self.cursor.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_test_list_star()?)
                };
                StmtKind::Return(value)
            }
            "raise" => {
                self.cursor.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_test()?)
                };
                StmtKind::Raise(value)
            }
            "global" | "nonlocal" => {
                self.cursor.advance();
                let mut names = vec![self.expect_identifier()?];
                while self.cursor.eat_op(",") {
                    names.push(self.expect_identifier()?);
                }
                if keyword == "global" {
                    StmtKind::Global(names)
                } else {
                    StmtKind::Nonlocal(names)
                }
            }
            "import" => self.parse_import()?,
            "from" => self.parse_from_import()?,
            "assert" => {
                self.cursor.advance();
                let test = self.parse_test()?;
                let msg = if self.cursor.eat_op(",") {
                    Some(self.parse_test()?)
                } else {
                    None
                };
                StmtKind::Assert { test, msg }
            }
            _ => self.parse_expr_statement()?,
        };
        Ok(Stmt::new(kind, line))
    }

    fn at_statement_end(&self) -> bool {
        self.at_line_end() || self.cursor.check_op(";")
    }

    /// Expression statements and the assignment forms.
    fn parse_expr_statement(&mut self) -> Result<StmtKind, SyntaxError> {
        let first = self.parse_assignment_value()?;

        if self.cursor.check_op("=") {
            let mut targets = vec![first];
            let value = loop {
                self.cursor.advance();
                let next = self.parse_assignment_value()?;
                if !self.cursor.check_op("=") {
                    break next;
                }
                targets.push(next);
            };
            for target in &targets {
                check_target(target)?;
            }
            return Ok(StmtKind::Assign { targets, value });
        }

        let augmented = match self.cursor.current() {
            token if token.kind == TokenKind::Op => BinaryOp::from_augmented(&token.text),
            _ => None,
        };
        if let Some(op) = augmented {
            check_single_target(&first, "augmented assignment")?;
            self.cursor.advance();
            let value = self.parse_assignment_value()?;
            return Ok(StmtKind::AugAssign {
                target: first,
                op,
                value,
            });
        }

        if self.cursor.check_op(":") {
            check_single_target(&first, "annotated assignment")?;
            self.cursor.advance();
            let annotation = self.parse_test()?;
            let value = if self.cursor.eat_op("=") {
                Some(self.parse_assignment_value()?)
            } else {
                None
            };
            return Ok(StmtKind::AnnAssign {
                target: first,
                annotation,
                value,
            });
        }

        Ok(StmtKind::Expr(first))
    }

    fn parse_assignment_value(&mut self) -> Result<Expr, SyntaxError> {
        if self.cursor.check_name("yield") {
            self.parse_yield()
        } else {
            self.parse_test_list_star()
        }
    }

    // === Compound statements ===

    /// `':' simple_statements` or `':' NEWLINE INDENT statement+ DEDENT`
    fn parse_suite(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        self.cursor.expect_op(":")?;
        let mut body = Vec::new();
        if !self.cursor.check(TokenKind::Newline) {
            self.parse_simple_statements(&mut body)?;
            return Ok(body);
        }
        self.cursor.advance();
        self.skip_newlines();
        if !self.cursor.check(TokenKind::Indent) {
            return Err(self.cursor.unexpected("an indented block"));
        }
        self.cursor.advance();
        loop {
            self.skip_newlines();
            match self.cursor.current_kind() {
                TokenKind::Dedent => {
                    self.cursor.advance();
                    break;
                }
                TokenKind::EndMarker => break,
                TokenKind::Indent => {
                    return Err(SyntaxError::new("unexpected indent", self.cursor.line()))
                }
                _ => self.parse_statement(&mut body)?,
            }
        }
        Ok(body)
    }

    /// `('@' test NEWLINE)+`
    fn parse_decorators(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut decorators = Vec::new();
        while self.cursor.eat_op("@") {
            decorators.push(self.parse_test()?);
            if !self.cursor.check(TokenKind::Newline) {
                return Err(self.cursor.unexpected("end of line after decorator"));
            }
            self.skip_newlines();
        }
        Ok(decorators)
    }

    fn parse_function_def(
        &mut self,
        decorators: Vec<Expr>,
        line: usize,
    ) -> Result<Stmt, SyntaxError> {
        self.cursor.expect_name_keyword("def")?;
        let name = self.expect_identifier()?;
        self.cursor.expect_op("(")?;
        let params = self.parse_params(")", true)?;
        self.cursor.expect_op(")")?;
        let returns = if self.cursor.eat_op("->") {
            Some(self.parse_test()?)
        } else {
            None
        };
        let (body, is_generator) = self.in_function_body(Self::parse_suite)?;
        let def = FunctionDef {
            name,
            params,
            returns,
            body,
            decorators,
            is_generator,
        };
        Ok(Stmt::new(StmtKind::FunctionDef(Rc::new(def)), line))
    }

    /// Parameters up to (not including) `closing`. Lambdas pass `":"` and
    /// take no annotations.
    pub(super) fn parse_params(
        &mut self,
        closing: &str,
        annotations: bool,
    ) -> Result<Params, SyntaxError> {
        let mut params = Params::default();
        let mut seen_star = false;
        while !self.cursor.check_op(closing) {
            let line = self.cursor.line();
            if self.cursor.eat_op("**") {
                params.kwarg = Some(self.parse_param(annotations, false)?);
                self.cursor.eat_op(",");
                if !self.cursor.check_op(closing) {
                    return Err(self.cursor.unexpected(&format!("'{closing}' after '**' parameter")));
                }
                break;
            }
            if self.cursor.eat_op("*") {
                if seen_star {
                    return Err(SyntaxError::new("'*' parameter given twice", line));
                }
                seen_star = true;
                if self.cursor.check(TokenKind::Name) {
                    params.vararg = Some(self.parse_param(annotations, false)?);
                }
            } else {
                let param = self.parse_param(annotations, true)?;
                if seen_star {
                    params.keyword_only.push(param);
                } else {
                    let follows_default =
                        params.positional.last().is_some_and(|last| last.default.is_some());
                    if follows_default && param.default.is_none() {
                        return Err(SyntaxError::new(
                            "non-default argument follows default argument",
                            line,
                        ));
                    }
                    params.positional.push(param);
                }
            }
            if !self.cursor.eat_op(",") {
                break;
            }
        }
        if seen_star && params.vararg.is_none() && params.keyword_only.is_empty() {
            return Err(SyntaxError::new(
                "named arguments must follow bare *",
                self.cursor.line(),
            ));
        }
        let mut seen = Vec::new();
        let all = params
            .positional
            .iter()
            .chain(&params.vararg)
            .chain(&params.keyword_only)
            .chain(&params.kwarg);
        for param in all {
            if seen.contains(&param.name.as_str()) {
                return Err(SyntaxError::new(
                    format!("duplicate argument '{}' in function definition", param.name),
                    self.cursor.line(),
                ));
            }
            seen.push(param.name.as_str());
        }
        Ok(params)
    }

    fn parse_param(&mut self, annotations: bool, defaults: bool) -> Result<Param, SyntaxError> {
        let name = self.expect_identifier()?;
        let annotation = if annotations && self.cursor.eat_op(":") {
            Some(self.parse_test()?)
        } else {
            None
        };
        let default = if defaults && self.cursor.eat_op("=") {
            Some(self.parse_test()?)
        } else {
            None
        };
        Ok(Param {
            name,
            annotation,
            default,
        })
    }

    fn parse_class_def(&mut self, decorators: Vec<Expr>, line: usize) -> Result<Stmt, SyntaxError> {
        self.cursor.expect_name_keyword("class")?;
        let name = self.expect_identifier()?;
        let mut bases = Vec::new();
        if self.cursor.eat_op("(") {
            while !self.cursor.check_op(")") {
                bases.push(self.parse_test()?);
                if !self.cursor.eat_op(",") {
                    break;
                }
            }
            self.cursor.expect_op(")")?;
        }
        let body = self.with_context(ParseContext::class_body(), Self::parse_suite)?;
        let def = ClassDef {
            name,
            bases,
            body,
            decorators,
        };
        Ok(Stmt::new(StmtKind::ClassDef(Rc::new(def)), line))
    }

    /// After `if` or `elif`: `test suite [elif ... | else suite]`. An `elif`
    /// becomes a nested `If` in `orelse`.
    fn parse_if_rest(&mut self, line: usize) -> Result<Stmt, SyntaxError> {
        let test = self.parse_test()?;
        let body = self.parse_suite()?;
        self.skip_newlines();
        let orelse = if self.cursor.check_name("elif") {
            let line = self.cursor.line();
            self.cursor.advance();
            vec![self.parse_if_rest(line)?]
        } else {
            self.parse_else()?
        };
        Ok(Stmt::new(StmtKind::If { test, body, orelse }, line))
    }

    fn parse_else(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        if self.cursor.eat_name("else") {
            self.parse_suite()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_for(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.cursor.line();
        self.cursor.expect_name_keyword("for")?;
        let target = self.parse_target_list()?;
        check_target(&target)?;
        self.cursor.expect_name_keyword("in")?;
        let iter = self.parse_test_list()?;
        let body = self.with_context(self.context.enter_loop(), Self::parse_suite)?;
        self.skip_newlines();
        let orelse = self.parse_else()?;
        Ok(Stmt::new(
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            },
            line,
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.cursor.line();
        self.cursor.expect_name_keyword("while")?;
        let test = self.parse_test()?;
        let body = self.with_context(self.context.enter_loop(), Self::parse_suite)?;
        self.skip_newlines();
        let orelse = self.parse_else()?;
        Ok(Stmt::new(StmtKind::While { test, body, orelse }, line))
    }

    // === Imports ===

    /// `import a.b [as c], d`
    fn parse_import(&mut self) -> Result<StmtKind, SyntaxError> {
        self.cursor.expect_name_keyword("import")?;
        let mut names = Vec::new();
        loop {
            let name = self.parse_dotted_name()?;
            names.push(self.parse_alias(name)?);
            if !self.cursor.eat_op(",") {
                break;
            }
        }
        Ok(StmtKind::Import(names))
    }

    /// `from [.]*module import (a [as b], ...)`, `from m import *`
    fn parse_from_import(&mut self) -> Result<StmtKind, SyntaxError> {
        self.cursor.expect_name_keyword("from")?;
        let mut module = String::new();
        while self.cursor.check_op(".") || self.cursor.check_op("...") {
            module.push_str(&self.cursor.advance().text);
        }
        if !self.cursor.check_name("import") {
            module.push_str(&self.parse_dotted_name()?);
        }
        self.cursor.expect_name_keyword("import")?;

        let mut names = Vec::new();
        if self.cursor.eat_op("*") {
            names.push(Alias {
                name: "*".to_owned(),
                asname: None,
            });
            return Ok(StmtKind::ImportFrom { module, names });
        }
        let parenthesized = self.cursor.eat_op("(");
        loop {
            let name = self.expect_identifier()?;
            names.push(self.parse_alias(name)?);
            if !self.cursor.eat_op(",") {
                break;
            }
            if parenthesized && self.cursor.check_op(")") {
                break;
            }
        }
        if parenthesized {
            self.cursor.expect_op(")")?;
        }
        Ok(StmtKind::ImportFrom { module, names })
    }

    fn parse_dotted_name(&mut self) -> Result<String, SyntaxError> {
        let mut name = self.expect_identifier()?;
        while self.cursor.eat_op(".") {
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
        Ok(name)
    }

    fn parse_alias(&mut self, name: String) -> Result<Alias, SyntaxError> {
        let asname = if self.cursor.eat_name("as") {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        Ok(Alias { name, asname })
    }
}

fn check_target(target: &Expr) -> Result<(), SyntaxError> {
    if target.kind.is_target() {
        Ok(())
    } else {
        Err(SyntaxError::new(
            format!("cannot assign to {}", describe(&target.kind)),
            target.line,
        ))
    }
}

fn check_single_target(target: &Expr, what: &str) -> Result<(), SyntaxError> {
    match target.kind {
        ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
        _ => Err(SyntaxError::new(
            format!("illegal target for {what}"),
            target.line,
        )),
    }
}

fn describe(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::Call { .. } => "function call",
        ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Str(_) | ExprKind::Bool(_) => "literal",
        ExprKind::None | ExprKind::Ellipsis => "constant",
        ExprKind::Lambda { .. } => "lambda",
        ExprKind::Comprehension { .. } => "comprehension",
        _ => "expression",
    }
}
