//! Syntax tree for weft macro code.
//!
//! Statements and expressions carry the 1-based line they start on. Line
//! numbers are diagnostic only: equality compares structure, so a tree and
//! the tree of its unparsed text are equal even when the layout changed.

mod operators;

use std::rc::Rc;

pub use operators::{BinaryOp, BoolOp, CmpOp, Precedence, UnaryOp};

/// A parsed source unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize) -> Self {
        Stmt { kind, line }
    }
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    /// `a = b = value`: every target receives the value.
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },
    AnnAssign {
        target: Expr,
        annotation: Expr,
        value: Option<Expr>,
    },
    FunctionDef(Rc<FunctionDef>),
    ClassDef(Rc<ClassDef>),
    Return(Option<Expr>),
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    Break,
    Continue,
    Pass,
    Import(Vec<Alias>),
    /// `from module import names`. `module` keeps leading dots of relative
    /// imports.
    ImportFrom {
        module: String,
        names: Vec<Alias>,
    },
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    Raise(Option<Expr>),
    Global(Vec<String>),
    Nonlocal(Vec<String>),
}

impl StmtKind {
    /// Node name as shown to macro code.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Expr(_) => "Expr",
            Self::Assign { .. } => "Assign",
            Self::AugAssign { .. } => "AugAssign",
            Self::AnnAssign { .. } => "AnnAssign",
            Self::FunctionDef(_) => "FunctionDef",
            Self::ClassDef(_) => "ClassDef",
            Self::Return(_) => "Return",
            Self::If { .. } => "If",
            Self::For { .. } => "For",
            Self::While { .. } => "While",
            Self::Break => "Break",
            Self::Continue => "Continue",
            Self::Pass => "Pass",
            Self::Import(_) => "Import",
            Self::ImportFrom { .. } => "ImportFrom",
            Self::Assert { .. } => "Assert",
            Self::Raise(_) => "Raise",
            Self::Global(_) => "Global",
            Self::Nonlocal(_) => "Nonlocal",
        }
    }
}

/// `name [as asname]` in an import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Params,
    pub returns: Option<Expr>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
    /// The body contains `yield` (outside nested functions).
    pub is_generator: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub decorators: Vec<Expr>,
}

/// A parameter list: `a, b=1, *args, c, **kwargs`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    pub positional: Vec<Param>,
    pub vararg: Option<Param>,
    /// Parameters after `*` or `*args`.
    pub keyword_only: Vec<Param>,
    pub kwarg: Option<Param>,
}

impl Params {
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
            && self.vararg.is_none()
            && self.keyword_only.is_empty()
            && self.kwarg.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<Expr>,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

impl Expr {
    pub fn new(kind: ExprKind, line: usize) -> Self {
        Expr { kind, line }
    }

    /// A plain name reference.
    pub fn name(name: impl Into<String>, line: usize) -> Self {
        Expr::new(ExprKind::Name(name.into()), line)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Name(String),
    Int(i64),
    Float(f64),
    Str(String),
    FString(Vec<FStringPart>),
    Bool(bool),
    None,
    Ellipsis,
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    /// `lower:upper:step`, only valid as a subscript index.
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Arg>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    BoolOp {
        left: Box<Expr>,
        op: BoolOp,
        right: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<(CmpOp, Expr)>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda {
        params: Rc<Params>,
        body: Rc<Expr>,
    },
    /// List comprehension or generator expression; both evaluate to a
    /// fully built sequence.
    Comprehension {
        kind: ComprehensionKind,
        element: Box<Expr>,
        generators: Vec<Generator>,
    },
    Yield(Option<Box<Expr>>),
    YieldFrom(Box<Expr>),
    /// `*value` in a call or display.
    Starred(Box<Expr>),
}

impl ExprKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Name(_) => "Name",
            Self::Int(_)
            | Self::Float(_)
            | Self::Str(_)
            | Self::Bool(_)
            | Self::None
            | Self::Ellipsis => "Constant",
            Self::FString(_) => "JoinedStr",
            Self::Tuple(_) => "Tuple",
            Self::List(_) => "List",
            Self::Dict(_) => "Dict",
            Self::Attribute { .. } => "Attribute",
            Self::Subscript { .. } => "Subscript",
            Self::Slice { .. } => "Slice",
            Self::Call { .. } => "Call",
            Self::Unary { .. } => "UnaryOp",
            Self::Binary { .. } => "BinOp",
            Self::BoolOp { .. } => "BoolOp",
            Self::Compare { .. } => "Compare",
            Self::IfExp { .. } => "IfExp",
            Self::Lambda { .. } => "Lambda",
            Self::Comprehension {
                kind: ComprehensionKind::List,
                ..
            } => "ListComp",
            Self::Comprehension {
                kind: ComprehensionKind::Generator,
                ..
            } => "GeneratorExp",
            Self::Yield(_) => "Yield",
            Self::YieldFrom(_) => "YieldFrom",
            Self::Starred(_) => "Starred",
        }
    }

    /// Whether this is a single literal constant.
    pub const fn is_constant(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Bool(_) | Self::None | Self::Ellipsis
        )
    }

    /// Whether this is a valid assignment target.
    pub fn is_target(&self) -> bool {
        match self {
            Self::Name(_) | Self::Attribute { .. } | Self::Subscript { .. } => true,
            Self::Tuple(items) | Self::List(items) => items.iter().all(|item| item.kind.is_target()),
            Self::Starred(inner) => inner.kind.is_target(),
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ComprehensionKind {
    List,
    Generator,
}

/// One `for target in iter [if cond]...` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct Generator {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Positional(Expr),
    Keyword(String, Expr),
    /// `*iterable`
    Star(Expr),
    /// `**mapping`
    DoubleStar(Expr),
}

/// A piece of an f-string.
#[derive(Clone, Debug, PartialEq)]
pub enum FStringPart {
    Literal(String),
    Field {
        value: Expr,
        /// `!r` or `!s`.
        conversion: Option<char>,
        spec: Option<String>,
    },
}
