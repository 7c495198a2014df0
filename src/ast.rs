//! CPQL abstract syntax tree.
//!
//! AST nodes are arena-allocated with bumpalo; child nodes are `&'a T`
//! references and lists are `&'a [T]` slices, so a whole query tree lives
//! in one allocation region scoped to a single compilation. Identifiers
//! and string literals borrow from the input (decoded strings are copied
//! into the arena), keeping every node `Copy`.
//!
//! The hierarchy is closed: a query is exactly one of Select, Update, or
//! Delete, and the generator matches each variant exhaustively. Nodes form
//! a tree, never a graph — there is no sharing or back-reference between
//! nodes, so ownership is single-parent by construction.

/// One parsed query. The parser produces exactly one root per compilation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query<'a> {
    Select(&'a SelectQuery<'a>),
    Update(&'a UpdateQuery<'a>),
    Delete(&'a DeleteQuery<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectQuery<'a> {
    pub distinct: bool,
    pub items: &'a [SelectItem<'a>],
    /// FROM sources, at least one.
    pub from: &'a [EntityRef<'a>],
    pub joins: &'a [JoinClause<'a>],
    pub where_clause: Option<&'a Expr<'a>>,
    pub group_by: &'a [&'a Expr<'a>],
    pub having: Option<&'a Expr<'a>>,
    pub order_by: &'a [OrderByItem<'a>],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectItem<'a> {
    /// Bare `*`.
    Wildcard,
    /// `alias.*`.
    QualifiedWildcard(&'a str),
    Expr {
        expr: &'a Expr<'a>,
        alias: Option<&'a str>,
    },
}

/// A logical entity reference as written in the query, with its alias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRef<'a> {
    pub entity: &'a str,
    pub alias: Option<&'a str>,
}

impl<'a> EntityRef<'a> {
    /// The name other clauses use to refer to this source.
    pub fn binding(&self) -> &'a str {
        self.alias.unwrap_or(self.entity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinClause<'a> {
    pub join_type: JoinType,
    pub target: EntityRef<'a>,
    /// ON condition; mandatory, the parser rejects a join without one.
    pub on: &'a Expr<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderByItem<'a> {
    pub expr: &'a Expr<'a>,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateQuery<'a> {
    pub target: EntityRef<'a>,
    /// SET assignments in declaration order.
    pub assignments: &'a [Assignment<'a>],
    pub where_clause: Option<&'a Expr<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment<'a> {
    pub property: PropertyRef<'a>,
    pub value: &'a Expr<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeleteQuery<'a> {
    pub target: EntityRef<'a>,
    pub where_clause: Option<&'a Expr<'a>>,
}

/// A property access as written: `qualifier.Name` or bare `Name`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyRef<'a> {
    pub qualifier: Option<&'a str>,
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'a> {
    Literal(Literal<'a>),
    Property(PropertyRef<'a>),
    /// Named parameter reference, stored without the `:` sigil.
    Parameter(&'a str),
    BinaryOp {
        left: &'a Expr<'a>,
        op: BinaryOperator,
        right: &'a Expr<'a>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: &'a Expr<'a>,
    },
    IsNull {
        expr: &'a Expr<'a>,
        negated: bool,
    },
    InList {
        expr: &'a Expr<'a>,
        negated: bool,
        list: &'a [&'a Expr<'a>],
    },
    Like {
        expr: &'a Expr<'a>,
        negated: bool,
        pattern: &'a Expr<'a>,
    },
    Function(FunctionCall<'a>),
    /// `*` inside an expression position (function arguments only).
    Wildcard,
}

/// Literal values. Numbers are already parsed with locale-independent
/// rules; strings have escape sequences decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOperator {
    pub fn sql(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    pub distinct: bool,
    pub args: FunctionArgs<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FunctionArgs<'a> {
    /// `COUNT(*)`.
    Star,
    Args(&'a [&'a Expr<'a>]),
}

impl<'a> FunctionArgs<'a> {
    pub fn len(&self) -> usize {
        match self {
            FunctionArgs::Star => 1,
            FunctionArgs::Args(args) => args.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FunctionArgs::Args(args) if args.is_empty())
    }
}
