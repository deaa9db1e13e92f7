//! Syntax tree to source text.
//!
//! The output uses four-space indentation and only the parentheses the
//! precedence rules require, except that tuples are always parenthesized.
//! Parsing the output yields a tree equal to the input.

use std::fmt::Write;

use weft_ir::quoted;

use crate::ast::{
    Arg, ClassDef, ComprehensionKind, Expr, ExprKind, FStringPart, FunctionDef, Module, Param,
    Params, Precedence, Stmt, StmtKind,
};

const INDENT: &str = "    ";

/// Render a module.
pub fn unparse(module: &Module) -> String {
    let mut unparser = Unparser::default();
    for stmt in &module.body {
        unparser.stmt(stmt);
    }
    unparser.out
}

/// Render one statement, including a trailing newline.
pub fn unparse_stmt(stmt: &Stmt) -> String {
    let mut unparser = Unparser::default();
    unparser.stmt(stmt);
    unparser.out
}

/// Render one expression.
pub fn unparse_expr(expr: &Expr) -> String {
    let mut unparser = Unparser::default();
    unparser.expr(expr, Precedence::Tuple);
    unparser.out
}

#[derive(Default)]
struct Unparser {
    out: String,
    depth: usize,
}

impl Unparser {
    fn line_start(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn block(&mut self, body: &[Stmt]) {
        self.out.push_str(":\n");
        self.depth += 1;
        for stmt in body {
            self.stmt(stmt);
        }
        self.depth -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::FunctionDef(def) => return self.function_def(def),
            StmtKind::ClassDef(def) => return self.class_def(def),
            StmtKind::If { test, body, orelse } => return self.if_chain("if", test, body, orelse),
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => {
                self.line_start();
                self.out.push_str("for ");
                self.expr(target, Precedence::BitOr);
                self.out.push_str(" in ");
                self.expr(iter, Precedence::Tuple);
                self.block(body);
                self.else_block(orelse);
                return;
            }
            StmtKind::While { test, body, orelse } => {
                self.line_start();
                self.out.push_str("while ");
                self.expr(test, Precedence::Lambda);
                self.block(body);
                self.else_block(orelse);
                return;
            }
            _ => {}
        }

        self.line_start();
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr, Precedence::Tuple),
            StmtKind::Assign { targets, value } => {
                for target in targets {
                    self.expr(target, Precedence::Tuple);
                    self.out.push_str(" = ");
                }
                self.expr(value, Precedence::Tuple);
            }
            StmtKind::AugAssign { target, op, value } => {
                self.expr(target, Precedence::Tuple);
                let _ = write!(self.out, " {}= ", op.as_symbol());
                self.expr(value, Precedence::Tuple);
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => {
                self.expr(target, Precedence::Tuple);
                self.out.push_str(": ");
                self.expr(annotation, Precedence::Lambda);
                if let Some(value) = value {
                    self.out.push_str(" = ");
                    self.expr(value, Precedence::Tuple);
                }
            }
            StmtKind::Return(value) => self.keyword_with("return", value.as_ref()),
            StmtKind::Raise(value) => self.keyword_with("raise", value.as_ref()),
            StmtKind::Break => self.out.push_str("break"),
            StmtKind::Continue => self.out.push_str("continue"),
            StmtKind::Pass => self.out.push_str("pass"),
            StmtKind::Import(names) => {
                self.out.push_str("import ");
                self.aliases(names);
            }
            StmtKind::ImportFrom { module, names } => {
                let _ = write!(self.out, "from {module} import ");
                self.aliases(names);
            }
            StmtKind::Assert { test, msg } => {
                self.out.push_str("assert ");
                self.expr(test, Precedence::Lambda);
                if let Some(msg) = msg {
                    self.out.push_str(", ");
                    self.expr(msg, Precedence::Lambda);
                }
            }
            StmtKind::Global(names) => {
                let _ = write!(self.out, "global {}", names.join(", "));
            }
            StmtKind::Nonlocal(names) => {
                let _ = write!(self.out, "nonlocal {}", names.join(", "));
            }
            StmtKind::FunctionDef(_)
            | StmtKind::ClassDef(_)
            | StmtKind::If { .. }
            | StmtKind::For { .. }
            | StmtKind::While { .. } => {}
        }
        self.out.push('\n');
    }

    fn keyword_with(&mut self, keyword: &str, value: Option<&Expr>) {
        self.out.push_str(keyword);
        if let Some(value) = value {
            self.out.push(' ');
            self.expr(value, Precedence::Tuple);
        }
    }

    fn aliases(&mut self, names: &[crate::ast::Alias]) {
        for (i, alias) in names.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&alias.name);
            if let Some(asname) = &alias.asname {
                let _ = write!(self.out, " as {asname}");
            }
        }
    }

    fn decorators(&mut self, decorators: &[Expr]) {
        for decorator in decorators {
            self.line_start();
            self.out.push('@');
            self.expr(decorator, Precedence::Lambda);
            self.out.push('\n');
        }
    }

    fn function_def(&mut self, def: &FunctionDef) {
        self.decorators(&def.decorators);
        self.line_start();
        let _ = write!(self.out, "def {}(", def.name);
        self.params(&def.params, true);
        self.out.push(')');
        if let Some(returns) = &def.returns {
            self.out.push_str(" -> ");
            self.expr(returns, Precedence::Lambda);
        }
        self.block(&def.body);
    }

    fn class_def(&mut self, def: &ClassDef) {
        self.decorators(&def.decorators);
        self.line_start();
        let _ = write!(self.out, "class {}", def.name);
        if !def.bases.is_empty() {
            self.out.push('(');
            self.comma_separated(&def.bases, Precedence::Lambda);
            self.out.push(')');
        }
        self.block(&def.body);
    }

    fn if_chain(&mut self, keyword: &str, test: &Expr, body: &[Stmt], orelse: &[Stmt]) {
        self.line_start();
        let _ = write!(self.out, "{keyword} ");
        self.expr(test, Precedence::Lambda);
        self.block(body);
        if let [Stmt {
            kind:
                StmtKind::If {
                    test,
                    body,
                    orelse,
                },
            ..
        }] = orelse
        {
            self.if_chain("elif", test, body, orelse);
        } else {
            self.else_block(orelse);
        }
    }

    fn else_block(&mut self, orelse: &[Stmt]) {
        if !orelse.is_empty() {
            self.line_start();
            self.out.push_str("else");
            self.block(orelse);
        }
    }

    fn params(&mut self, params: &Params, annotations: bool) {
        let mut first = true;
        let mut sep = |out: &mut String| {
            if !first {
                out.push_str(", ");
            }
            first = false;
        };
        for param in &params.positional {
            sep(&mut self.out);
            self.param(param, annotations);
        }
        if let Some(vararg) = &params.vararg {
            sep(&mut self.out);
            self.out.push('*');
            self.param(vararg, annotations);
        } else if !params.keyword_only.is_empty() {
            sep(&mut self.out);
            self.out.push('*');
        }
        for param in &params.keyword_only {
            sep(&mut self.out);
            self.param(param, annotations);
        }
        if let Some(kwarg) = &params.kwarg {
            sep(&mut self.out);
            self.out.push_str("**");
            self.param(kwarg, annotations);
        }
    }

    fn param(&mut self, param: &Param, annotations: bool) {
        self.out.push_str(&param.name);
        if let (true, Some(annotation)) = (annotations, &param.annotation) {
            self.out.push_str(": ");
            self.expr(annotation, Precedence::Lambda);
        }
        if let Some(default) = &param.default {
            self.out.push_str(if param.annotation.is_some() && annotations {
                " = "
            } else {
                "="
            });
            self.expr(default, Precedence::Lambda);
        }
    }

    fn comma_separated(&mut self, items: &[Expr], precedence: Precedence) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(item, precedence);
        }
    }

    // === Expressions ===

    /// Render `expr`, parenthesized when it binds looser than `min`.
    fn expr(&mut self, expr: &Expr, min: Precedence) {
        let precedence = precedence_of(&expr.kind);
        let parens = precedence < min;
        if parens {
            self.out.push('(');
        }
        self.expr_inner(expr);
        if parens {
            self.out.push(')');
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Name(name) => self.out.push_str(name),
            ExprKind::Int(value) => {
                let _ = write!(self.out, "{value}");
            }
            ExprKind::Float(value) => self.out.push_str(&float_literal(*value)),
            ExprKind::Str(value) => self.out.push_str(&quoted(value)),
            ExprKind::FString(parts) => self.fstring(parts),
            ExprKind::Bool(true) => self.out.push_str("True"),
            ExprKind::Bool(false) => self.out.push_str("False"),
            ExprKind::None => self.out.push_str("None"),
            ExprKind::Ellipsis => self.out.push_str("..."),
            ExprKind::Tuple(items) => {
                self.out.push('(');
                self.comma_separated(items, Precedence::Lambda);
                if items.len() == 1 {
                    self.out.push(',');
                }
                self.out.push(')');
            }
            ExprKind::List(items) => {
                self.out.push('[');
                self.comma_separated(items, Precedence::Lambda);
                self.out.push(']');
            }
            ExprKind::Dict(entries) => {
                self.out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(key, Precedence::Lambda);
                    self.out.push_str(": ");
                    self.expr(value, Precedence::Lambda);
                }
                self.out.push('}');
            }
            ExprKind::Attribute { value, attr } => {
                if matches!(value.kind, ExprKind::Int(_) | ExprKind::Float(_)) {
                    self.out.push('(');
                    self.expr_inner(value);
                    self.out.push(')');
                } else {
                    self.expr(value, Precedence::Primary);
                }
                let _ = write!(self.out, ".{attr}");
            }
            ExprKind::Subscript { value, index } => {
                self.expr(value, Precedence::Primary);
                self.out.push('[');
                match &index.kind {
                    ExprKind::Tuple(items) if !items.is_empty() => {
                        self.comma_separated(items, Precedence::Lambda);
                        if items.len() == 1 {
                            self.out.push(',');
                        }
                    }
                    _ => self.expr(index, Precedence::Lambda),
                }
                self.out.push(']');
            }
            ExprKind::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expr(lower, Precedence::Lambda);
                }
                self.out.push(':');
                if let Some(upper) = upper {
                    self.expr(upper, Precedence::Lambda);
                }
                if let Some(step) = step {
                    self.out.push(':');
                    self.expr(step, Precedence::Lambda);
                }
            }
            ExprKind::Call { func, args } => {
                self.expr(func, Precedence::Primary);
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.arg(arg);
                }
                self.out.push(')');
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(op.as_symbol());
                if matches!(op, crate::ast::UnaryOp::Not) {
                    self.out.push(' ');
                    self.expr(operand, Precedence::Not);
                } else {
                    self.expr(operand, Precedence::Unary);
                }
            }
            ExprKind::Binary { left, op, right } => {
                let precedence = op.precedence();
                if precedence == Precedence::Power {
                    self.expr(left, Precedence::Primary);
                    self.out.push_str(" ** ");
                    self.expr(right, Precedence::Unary);
                } else {
                    self.expr(left, precedence);
                    let _ = write!(self.out, " {} ", op.as_symbol());
                    self.expr(right, precedence.next());
                }
            }
            ExprKind::BoolOp { left, op, right } => {
                let precedence = precedence_of(&expr.kind);
                self.expr(left, precedence);
                let _ = write!(self.out, " {} ", op.as_symbol());
                self.expr(right, precedence.next());
            }
            ExprKind::Compare { left, ops } => {
                self.expr(left, Precedence::BitOr);
                for (op, right) in ops {
                    let _ = write!(self.out, " {} ", op.as_symbol());
                    self.expr(right, Precedence::BitOr);
                }
            }
            ExprKind::IfExp { test, body, orelse } => {
                self.expr(body, Precedence::Or);
                self.out.push_str(" if ");
                self.expr(test, Precedence::Or);
                self.out.push_str(" else ");
                self.expr(orelse, Precedence::Lambda);
            }
            ExprKind::Lambda { params, body } => {
                self.out.push_str("lambda");
                if !params.is_empty() {
                    self.out.push(' ');
                    self.params(params, false);
                }
                self.out.push_str(": ");
                self.expr(body, Precedence::Lambda);
            }
            ExprKind::Comprehension {
                kind,
                element,
                generators,
            } => {
                let (open, close) = match kind {
                    ComprehensionKind::List => ('[', ']'),
                    ComprehensionKind::Generator => ('(', ')'),
                };
                self.out.push(open);
                self.expr(element, Precedence::Lambda);
                for generator in generators {
                    self.out.push_str(" for ");
                    self.expr(&generator.target, Precedence::BitOr);
                    self.out.push_str(" in ");
                    self.expr(&generator.iter, Precedence::Or);
                    for condition in &generator.ifs {
                        self.out.push_str(" if ");
                        self.expr(condition, Precedence::Or);
                    }
                }
                self.out.push(close);
            }
            ExprKind::Yield(value) => {
                self.out.push_str("yield");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value, Precedence::Tuple);
                }
            }
            ExprKind::YieldFrom(value) => {
                self.out.push_str("yield from ");
                self.expr(value, Precedence::Lambda);
            }
            ExprKind::Starred(value) => {
                self.out.push('*');
                self.expr(value, Precedence::BitOr);
            }
        }
    }

    fn arg(&mut self, arg: &Arg) {
        match arg {
            Arg::Positional(value) => self.expr(value, Precedence::Lambda),
            Arg::Keyword(name, value) => {
                let _ = write!(self.out, "{name}=");
                self.expr(value, Precedence::Lambda);
            }
            Arg::Star(value) => {
                self.out.push('*');
                self.expr(value, Precedence::Lambda);
            }
            Arg::DoubleStar(value) => {
                self.out.push_str("**");
                self.expr(value, Precedence::Lambda);
            }
        }
    }

    fn fstring(&mut self, parts: &[FStringPart]) {
        let mut body = String::new();
        for part in parts {
            match part {
                FStringPart::Literal(text) => {
                    for c in text.chars() {
                        match c {
                            '{' => body.push_str("{{"),
                            '}' => body.push_str("}}"),
                            '\'' | '"' | '\\' => {
                                body.push('\\');
                                body.push(c);
                            }
                            '\n' => body.push_str("\\n"),
                            '\r' => body.push_str("\\r"),
                            '\t' => body.push_str("\\t"),
                            c if c.is_control() => {
                                let _ = write!(body, "\\x{:02x}", u32::from(c));
                            }
                            c => body.push(c),
                        }
                    }
                }
                FStringPart::Field {
                    value,
                    conversion,
                    spec,
                } => {
                    let source = unparse_expr(value);
                    body.push('{');
                    if source.starts_with('{') {
                        body.push(' ');
                    }
                    body.push_str(&source);
                    if let Some(conversion) = conversion {
                        body.push('!');
                        body.push(*conversion);
                    }
                    if let Some(spec) = spec {
                        body.push(':');
                        body.push_str(spec);
                    }
                    body.push('}');
                }
            }
        }
        let quote = if body.contains('\'') { '"' } else { '\'' };
        let _ = write!(self.out, "f{quote}{body}{quote}");
    }
}

fn precedence_of(kind: &ExprKind) -> Precedence {
    match kind {
        ExprKind::Yield(_) | ExprKind::YieldFrom(_) => Precedence::Tuple,
        ExprKind::Lambda { .. } => Precedence::Lambda,
        ExprKind::IfExp { .. } => Precedence::IfExp,
        ExprKind::BoolOp {
            op: crate::ast::BoolOp::Or,
            ..
        } => Precedence::Or,
        ExprKind::BoolOp { .. } => Precedence::And,
        ExprKind::Unary {
            op: crate::ast::UnaryOp::Not,
            ..
        } => Precedence::Not,
        ExprKind::Compare { .. } => Precedence::Compare,
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::Unary { .. } => Precedence::Unary,
        ExprKind::Attribute { .. } | ExprKind::Subscript { .. } | ExprKind::Call { .. } => {
            Precedence::Primary
        }
        ExprKind::Starred(_) => Precedence::BitOr,
        _ => Precedence::Atom,
    }
}

/// A float literal that parses back to the same value.
fn float_literal(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "1e999" } else { "-1e999" }.to_owned();
    }
    let text = format!("{value:?}");
    if text.contains(['.', 'e', 'E']) || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{text}.0")
    }
}
