//! Builtin functions available to every macro.

use weft_parse::ast::{BinaryOp, UnaryOp};

/// A builtin function. The behavior lives in the interpreter; this is the
/// name table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Len,
    Str,
    Repr,
    Int,
    Float,
    Bool,
    List,
    Tuple,
    Dict,
    Range,
    Enumerate,
    Zip,
    IsInstance,
    HasAttr,
    GetAttr,
    Min,
    Max,
    Sum,
    Sorted,
    Reversed,
    Any,
    All,
    Abs,
    Type,
    /// Marker for macro definitions; the identity function when called.
    Macro,
    /// Constructs user-origin `Code`.
    Code,
    Tokenize,
    Unparse,
    Token,
    /// `NodeTransformer.visit`, dispatching to `visit_<Kind>`.
    Visit,
    /// `NodeTransformer.generic_visit`, visiting every child.
    GenericVisit,
    /// `NodeTransformer.__call__`, rewriting a `Code` value.
    Transform,
    /// A node constructor of the `ast` module.
    Node(NodeCtor),
    /// An operator of the `ast` module, such as `ast.Add`.
    Operator(OperatorNode),
}

/// Node constructors of the `ast` module. Each also serves as a type for
/// `isinstance`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeCtor {
    Constant,
    Name,
    BinOp,
    UnaryOp,
    Call,
    Attribute,
    Subscript,
    Tuple,
    List,
    Expr,
    Return,
    Assign,
    Pass,
}

impl NodeCtor {
    pub const ALL: [NodeCtor; 13] = [
        NodeCtor::Constant,
        NodeCtor::Name,
        NodeCtor::BinOp,
        NodeCtor::UnaryOp,
        NodeCtor::Call,
        NodeCtor::Attribute,
        NodeCtor::Subscript,
        NodeCtor::Tuple,
        NodeCtor::List,
        NodeCtor::Expr,
        NodeCtor::Return,
        NodeCtor::Assign,
        NodeCtor::Pass,
    ];

    /// Matches `Node::kind` of the nodes it builds.
    pub const fn name(self) -> &'static str {
        match self {
            NodeCtor::Constant => "Constant",
            NodeCtor::Name => "Name",
            NodeCtor::BinOp => "BinOp",
            NodeCtor::UnaryOp => "UnaryOp",
            NodeCtor::Call => "Call",
            NodeCtor::Attribute => "Attribute",
            NodeCtor::Subscript => "Subscript",
            NodeCtor::Tuple => "Tuple",
            NodeCtor::List => "List",
            NodeCtor::Expr => "Expr",
            NodeCtor::Return => "Return",
            NodeCtor::Assign => "Assign",
            NodeCtor::Pass => "Pass",
        }
    }

    /// Field names in positional order.
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            NodeCtor::Constant | NodeCtor::Expr | NodeCtor::Return => &["value"],
            NodeCtor::Name => &["id"],
            NodeCtor::BinOp => &["left", "op", "right"],
            NodeCtor::UnaryOp => &["op", "operand"],
            NodeCtor::Call => &["func", "args"],
            NodeCtor::Attribute => &["value", "attr"],
            NodeCtor::Subscript => &["value", "slice"],
            NodeCtor::Tuple | NodeCtor::List => &["elts"],
            NodeCtor::Assign => &["targets", "value"],
            NodeCtor::Pass => &[],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperatorNode {
    Binary(BinaryOp),
    Unary(UnaryOp),
}

impl OperatorNode {
    pub fn all() -> impl Iterator<Item = OperatorNode> {
        BinaryOp::ALL
            .into_iter()
            .map(OperatorNode::Binary)
            .chain(UnaryOp::ALL.into_iter().map(OperatorNode::Unary))
    }

    pub const fn name(self) -> &'static str {
        match self {
            OperatorNode::Binary(op) => op.node_name(),
            OperatorNode::Unary(op) => op.node_name(),
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            OperatorNode::Binary(op) => op.as_symbol(),
            OperatorNode::Unary(op) => op.as_symbol(),
        }
    }
}

impl Builtin {
    pub const ALL: [Builtin; 30] = [
        Builtin::Print,
        Builtin::Len,
        Builtin::Str,
        Builtin::Repr,
        Builtin::Int,
        Builtin::Float,
        Builtin::Bool,
        Builtin::List,
        Builtin::Tuple,
        Builtin::Dict,
        Builtin::Range,
        Builtin::Enumerate,
        Builtin::Zip,
        Builtin::IsInstance,
        Builtin::HasAttr,
        Builtin::GetAttr,
        Builtin::Min,
        Builtin::Max,
        Builtin::Sum,
        Builtin::Sorted,
        Builtin::Reversed,
        Builtin::Any,
        Builtin::All,
        Builtin::Abs,
        Builtin::Type,
        Builtin::Macro,
        Builtin::Code,
        Builtin::Tokenize,
        Builtin::Unparse,
        Builtin::Token,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Repr => "repr",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Bool => "bool",
            Builtin::List => "list",
            Builtin::Tuple => "tuple",
            Builtin::Dict => "dict",
            Builtin::Range => "range",
            Builtin::Enumerate => "enumerate",
            Builtin::Zip => "zip",
            Builtin::IsInstance => "isinstance",
            Builtin::HasAttr => "hasattr",
            Builtin::GetAttr => "getattr",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Sorted => "sorted",
            Builtin::Reversed => "reversed",
            Builtin::Any => "any",
            Builtin::All => "all",
            Builtin::Abs => "abs",
            Builtin::Type => "type",
            Builtin::Macro => "macro",
            Builtin::Code => "Code",
            Builtin::Tokenize => "tokenize",
            Builtin::Unparse => "unparse",
            Builtin::Token => "Token",
            Builtin::Visit => "visit",
            Builtin::GenericVisit => "generic_visit",
            Builtin::Transform => "__call__",
            Builtin::Node(ctor) => ctor.name(),
            Builtin::Operator(op) => op.name(),
        }
    }

    /// Builtins stored on a class and bound to the instance on lookup.
    pub const fn is_method(self) -> bool {
        matches!(self, Builtin::Visit | Builtin::GenericVisit | Builtin::Transform)
    }

    /// Builtins that double as type objects for `isinstance`.
    pub const fn is_type(self) -> bool {
        matches!(
            self,
            Builtin::Str
                | Builtin::Int
                | Builtin::Float
                | Builtin::Bool
                | Builtin::List
                | Builtin::Tuple
                | Builtin::Dict
                | Builtin::Code
                | Builtin::Token
                | Builtin::Node(_)
        )
    }
}
