use pretty_assertions::assert_eq;

use super::*;
use crate::parse_module_text;

/// Renames one name everywhere and drops `pass` statements.
struct Rename {
    from: &'static str,
    to: &'static str,
}

impl Fold for Rename {
    type Error = String;

    fn fold_expr(&mut self, expr: Expr) -> Result<Expr, String> {
        match &expr.kind {
            ExprKind::Name(id) if id == "boom" => Err(format!("line {}", expr.line)),
            ExprKind::Name(id) if id == self.from => Ok(Expr::name(self.to, expr.line)),
            _ => fold_expr_children(self, expr),
        }
    }

    fn fold_stmt(&mut self, stmt: Stmt) -> Result<Vec<Stmt>, String> {
        if matches!(stmt.kind, StmtKind::Pass) {
            return Ok(Vec::new());
        }
        Ok(vec![fold_stmt_children(self, stmt)?])
    }
}

fn rename(source: &str) -> Result<Module, String> {
    let module = parse_module_text(source).unwrap();
    fold_module_children(&mut Rename { from: "x", to: "y" }, module)
}

fn module(source: &str) -> Module {
    parse_module_text(source).unwrap()
}

#[test]
fn names_are_replaced_at_every_depth() {
    let cases = [
        (
            "def f(a=x):\n    return [x + i for i in x if x]\n",
            "def f(a=y):\n    return [y + i for i in y if y]\n",
        ),
        ("print(f'{x!r}', key=x.attr)\n", "print(f'{y!r}', key=y.attr)\n"),
        ("z = {x: x[1:x]} if not x else lambda q=x: x\n", "z = {y: y[1:y]} if not y else lambda q=y: y\n"),
        ("class C(x):\n    w = x\n", "class C(y):\n    w = y\n"),
    ];
    for (source, expected) in cases {
        assert_eq!(rename(source).unwrap(), module(expected), "{source}");
    }
}

#[test]
fn statements_can_be_removed() {
    assert_eq!(
        rename("if x:\n    pass\n    z = x\nwhile x:\n    x += 1\n").unwrap(),
        module("if y:\n    z = y\nwhile y:\n    y += 1\n")
    );
}

#[test]
fn untouched_nodes_are_rebuilt_equal() {
    let source = "import a\nfrom b import c as d\nfor i in range(3):\n    break\nelse:\n    raise E\n";
    assert_eq!(rename(source).unwrap(), module(source));
}

#[test]
fn first_error_stops_the_fold() {
    assert_eq!(rename("a = 1\nb = boom + x\n").unwrap_err(), "line 2");
}
