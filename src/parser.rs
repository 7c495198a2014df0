//! CPQL parser.
//!
//! Recursive descent over the eager token list, producing exactly one
//! arena-allocated [`Query`] root per compilation. Statement dispatch keys
//! on the first keyword (SELECT / UPDATE / DELETE); expressions use Pratt
//! binding powers:
//!
//! | Precedence | Operators |
//! |------------|-----------|
//! | 1 (lowest) | OR |
//! | 2 | AND |
//! | 3 | =, <>, LIKE, IN, IS [NOT] NULL |
//! | 4 | <, <=, >, >= |
//! | 5 | +, - (binary) |
//! | 6 | *, /, % |
//! | 7 (highest) | +, -, NOT (prefix) |
//!
//! Parenthesized sub-expressions recurse back to the lowest level.
//!
//! Parsing is fail-fast: the first structural violation aborts with a
//! [`Error::Syntax`] carrying the offending token's position. There is no
//! error recovery and no partial AST. Trailing tokens after a complete
//! statement are rejected.

use crate::ast::*;
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::token::{Keyword, Token, TokenInfo};
use bumpalo::Bump;
use std::borrow::Cow;

pub(crate) const BP_OR: (u8, u8) = (1, 2);
pub(crate) const BP_AND: (u8, u8) = (3, 4);
pub(crate) const BP_EQUALITY: (u8, u8) = (5, 6);
pub(crate) const BP_RELATIONAL: (u8, u8) = (7, 8);
pub(crate) const BP_ADDITIVE: (u8, u8) = (9, 10);
pub(crate) const BP_MULTIPLICATIVE: (u8, u8) = (11, 12);
pub(crate) const BP_UNARY: u8 = 13;

/// Binding powers for a binary operator. The generator consults the same
/// table to decide where parentheses are required in the output.
pub(crate) fn binary_binding(op: BinaryOperator) -> (u8, u8) {
    match op {
        BinaryOperator::Or => BP_OR,
        BinaryOperator::And => BP_AND,
        BinaryOperator::Eq | BinaryOperator::NotEq => BP_EQUALITY,
        BinaryOperator::Lt | BinaryOperator::LtEq | BinaryOperator::Gt | BinaryOperator::GtEq => {
            BP_RELATIONAL
        }
        BinaryOperator::Plus | BinaryOperator::Minus => BP_ADDITIVE,
        BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => {
            BP_MULTIPLICATIVE
        }
    }
}

pub struct Parser<'a> {
    input: &'a str,
    tokens: Vec<TokenInfo<'a>>,
    arena: &'a Bump,
    pos: usize,
}

/// Entity, property, and alias names may spell like reserved keywords
/// (`Order`, `Set`, …); in those grammar positions a keyword token is
/// re-read as a plain name.
fn is_name(token: &Token<'_>) -> bool {
    matches!(token, Token::Ident(_) | Token::Keyword(_))
}

impl<'a> Parser<'a> {
    /// Tokenizes the input eagerly; a lexical failure surfaces here, before
    /// any grammar work starts.
    pub fn new(input: &'a str, arena: &'a Bump) -> Result<Self> {
        let tokens = tokenize(input)?;
        Ok(Self {
            input,
            tokens,
            arena,
            pos: 0,
        })
    }

    /// Parses one complete query and demands end-of-input afterwards.
    pub fn parse_query(&mut self) -> Result<Query<'a>> {
        let query = match self.peek() {
            Token::Keyword(Keyword::Select) => {
                let select = self.parse_select()?;
                Query::Select(self.arena.alloc(select))
            }
            Token::Keyword(Keyword::Update) => {
                let update = self.parse_update()?;
                Query::Update(self.arena.alloc(update))
            }
            Token::Keyword(Keyword::Delete) => {
                let delete = self.parse_delete()?;
                Query::Delete(self.arena.alloc(delete))
            }
            other => {
                return Err(self.syntax_error(format!(
                    "expected SELECT, UPDATE, or DELETE, found {}",
                    other.describe()
                )));
            }
        };

        if !self.is_at_end() {
            return Err(self.syntax_error(format!(
                "expected end of input, found {}",
                self.peek().describe()
            )));
        }

        Ok(query)
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn current_info(&self) -> &TokenInfo<'a> {
        // tokenize() always terminates the list with Eof, so the cursor
        // never runs past the last entry.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token<'a> {
        &self.current_info().token
    }

    fn peek_nth(&self, n: usize) -> &Token<'a> {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn advance(&mut self) -> &TokenInfo<'a> {
        let info = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        info
    }

    fn syntax_error(&self, message: String) -> Error {
        let info = self.current_info();
        Error::syntax(message, info.line, info.column)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Token::Keyword(k) if *k == keyword)
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(format!(
                "expected {}, found {}",
                keyword.as_str(),
                self.peek().describe()
            )))
        }
    }

    fn check_token(&self, expected: &Token<'_>) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(expected)
    }

    fn consume_token(&mut self, expected: &Token<'_>) -> bool {
        if self.check_token(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: &Token<'_>) -> Result<()> {
        if self.check_token(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(format!(
                "expected {}, found {}",
                expected.describe(),
                self.peek().describe()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<&'a str> {
        if let Token::Ident(name) = self.peek() {
            let name = *name;
            self.advance();
            Ok(name)
        } else {
            Err(self.syntax_error(format!(
                "expected identifier, found {}",
                self.peek().describe()
            )))
        }
    }

    /// Like [`expect_ident`](Self::expect_ident), but also accepts a
    /// keyword token, recovering its original spelling from the input.
    fn expect_name(&mut self) -> Result<&'a str> {
        match self.peek() {
            Token::Ident(name) => {
                let name = *name;
                self.advance();
                Ok(name)
            }
            Token::Keyword(_) => {
                let span = self.current_info().span;
                let input = self.input;
                self.advance();
                Ok(&input[span.start..span.end()])
            }
            other => Err(self.syntax_error(format!(
                "expected identifier, found {}",
                other.describe()
            ))),
        }
    }

    fn parse_select(&mut self) -> Result<SelectQuery<'a>> {
        self.expect_keyword(Keyword::Select)?;

        let distinct = self.consume_keyword(Keyword::Distinct);
        let items = self.parse_select_items()?;

        self.expect_keyword(Keyword::From)?;
        let from = self.parse_from_list()?;

        let joins = self.parse_joins()?;

        let where_clause: Option<&Expr<'a>> = if self.consume_keyword(Keyword::Where) {
            let expr = self.parse_expr(0)?;
            Some(self.arena.alloc(expr))
        } else {
            None
        };

        let group_by = if self.consume_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            self.parse_expr_list()?
        } else {
            &[]
        };

        let having: Option<&Expr<'a>> = if self.consume_keyword(Keyword::Having) {
            let expr = self.parse_expr(0)?;
            Some(self.arena.alloc(expr))
        } else {
            None
        };

        let order_by = if self.consume_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            &[]
        };

        Ok(SelectQuery {
            distinct,
            items,
            from,
            joins,
            where_clause,
            group_by,
            having,
            order_by,
        })
    }

    fn parse_select_items(&mut self) -> Result<&'a [SelectItem<'a>]> {
        let mut items = Vec::new();
        loop {
            if self.consume_token(&Token::Star) {
                items.push(SelectItem::Wildcard);
            } else {
                let expr = self.parse_expr(0)?;

                // `alias.*` — the primary parser leaves the dot in place
                // when a star follows it.
                if let Expr::Property(prop) = expr {
                    if prop.qualifier.is_none() && self.check_token(&Token::Dot) {
                        if matches!(self.peek_nth(1), Token::Star) {
                            self.advance();
                            self.advance();
                            items.push(SelectItem::QualifiedWildcard(prop.name));
                            if !self.consume_token(&Token::Comma) {
                                break;
                            }
                            continue;
                        }
                    }
                }

                let alias = self.parse_optional_alias()?;
                items.push(SelectItem::Expr {
                    expr: self.arena.alloc(expr),
                    alias,
                });
            }

            if !self.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(self.arena.alloc_slice_copy(&items))
    }

    fn parse_optional_alias(&mut self) -> Result<Option<&'a str>> {
        if self.consume_keyword(Keyword::As) {
            Ok(Some(self.expect_name()?))
        } else if matches!(self.peek(), Token::Ident(_)) {
            Ok(Some(self.expect_ident()?))
        } else {
            Ok(None)
        }
    }

    fn parse_from_list(&mut self) -> Result<&'a [EntityRef<'a>]> {
        let mut sources = Vec::new();
        loop {
            sources.push(self.parse_entity_ref()?);
            if !self.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(self.arena.alloc_slice_copy(&sources))
    }

    // The entity position always requires a name, so a keyword spelling is
    // unambiguous here. A bare alias stays `Ident`-only: after `FROM User`
    // a keyword must remain readable as the next clause (`ORDER BY`, …).
    fn parse_entity_ref(&mut self) -> Result<EntityRef<'a>> {
        let entity = self.expect_name()?;
        let alias = self.parse_optional_alias()?;
        Ok(EntityRef { entity, alias })
    }

    fn parse_joins(&mut self) -> Result<&'a [JoinClause<'a>]> {
        let mut joins = Vec::new();
        while let Some(join_type) = self.parse_join_type() {
            let target = self.parse_entity_ref()?;
            self.expect_keyword(Keyword::On)?;
            let on = self.parse_expr(0)?;
            joins.push(JoinClause {
                join_type,
                target,
                on: self.arena.alloc(on),
            });
        }
        Ok(self.arena.alloc_slice_copy(&joins))
    }

    fn parse_join_type(&mut self) -> Option<JoinType> {
        if self.consume_keyword(Keyword::Inner) {
            self.consume_keyword(Keyword::Join);
            Some(JoinType::Inner)
        } else if self.consume_keyword(Keyword::Left) {
            self.consume_keyword(Keyword::Outer);
            self.consume_keyword(Keyword::Join);
            Some(JoinType::Left)
        } else if self.consume_keyword(Keyword::Right) {
            self.consume_keyword(Keyword::Outer);
            self.consume_keyword(Keyword::Join);
            Some(JoinType::Right)
        } else if self.consume_keyword(Keyword::Full) {
            self.consume_keyword(Keyword::Outer);
            self.consume_keyword(Keyword::Join);
            Some(JoinType::Full)
        } else if self.consume_keyword(Keyword::Join) {
            Some(JoinType::Inner)
        } else {
            None
        }
    }

    fn parse_order_by_list(&mut self) -> Result<&'a [OrderByItem<'a>]> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expr(0)?;
            let direction = if self.consume_keyword(Keyword::Desc) {
                OrderDirection::Desc
            } else {
                self.consume_keyword(Keyword::Asc);
                OrderDirection::Asc
            };
            items.push(OrderByItem {
                expr: self.arena.alloc(expr),
                direction,
            });
            if !self.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(self.arena.alloc_slice_copy(&items))
    }

    fn parse_update(&mut self) -> Result<UpdateQuery<'a>> {
        self.expect_keyword(Keyword::Update)?;
        let target = self.parse_entity_ref()?;
        self.expect_keyword(Keyword::Set)?;

        let mut assignments = Vec::new();
        loop {
            let property = self.parse_property_ref()?;
            self.expect_token(&Token::Eq)?;
            let value = self.parse_expr(0)?;
            assignments.push(Assignment {
                property,
                value: self.arena.alloc(value),
            });
            if !self.consume_token(&Token::Comma) {
                break;
            }
        }

        let where_clause: Option<&Expr<'a>> = if self.consume_keyword(Keyword::Where) {
            let expr = self.parse_expr(0)?;
            Some(self.arena.alloc(expr))
        } else {
            None
        };

        Ok(UpdateQuery {
            target,
            assignments: self.arena.alloc_slice_copy(&assignments),
            where_clause,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteQuery<'a>> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let target = self.parse_entity_ref()?;

        let where_clause: Option<&Expr<'a>> = if self.consume_keyword(Keyword::Where) {
            let expr = self.parse_expr(0)?;
            Some(self.arena.alloc(expr))
        } else {
            None
        };

        Ok(DeleteQuery {
            target,
            where_clause,
        })
    }

    fn parse_property_ref(&mut self) -> Result<PropertyRef<'a>> {
        let first = self.expect_name()?;
        if self.check_token(&Token::Dot) && is_name(self.peek_nth(1)) {
            self.advance();
            let name = self.expect_name()?;
            Ok(PropertyRef {
                qualifier: Some(first),
                name,
            })
        } else {
            Ok(PropertyRef {
                qualifier: None,
                name: first,
            })
        }
    }

    fn parse_expr_list(&mut self) -> Result<&'a [&'a Expr<'a>]> {
        let mut exprs: Vec<&'a Expr<'a>> = Vec::new();
        loop {
            let expr = self.parse_expr(0)?;
            exprs.push(self.arena.alloc(expr));
            if !self.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(self.arena.alloc_slice_copy(&exprs))
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr<'a>> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let op = match self.peek() {
                Token::Keyword(Keyword::Or) => Some(BinaryOperator::Or),
                Token::Keyword(Keyword::And) => Some(BinaryOperator::And),
                Token::Eq => Some(BinaryOperator::Eq),
                Token::NotEq => Some(BinaryOperator::NotEq),
                Token::Lt => Some(BinaryOperator::Lt),
                Token::LtEq => Some(BinaryOperator::LtEq),
                Token::Gt => Some(BinaryOperator::Gt),
                Token::GtEq => Some(BinaryOperator::GtEq),
                Token::Plus => Some(BinaryOperator::Plus),
                Token::Minus => Some(BinaryOperator::Minus),
                Token::Star => Some(BinaryOperator::Multiply),
                Token::Slash => Some(BinaryOperator::Divide),
                Token::Percent => Some(BinaryOperator::Modulo),
                _ => None,
            };

            if let Some(op) = op {
                let (l_bp, r_bp) = binary_binding(op);
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let rhs = self.parse_expr(r_bp)?;
                lhs = Expr::BinaryOp {
                    left: self.arena.alloc(lhs),
                    op,
                    right: self.arena.alloc(rhs),
                };
                continue;
            }

            // IS [NOT] NULL, [NOT] IN, [NOT] LIKE sit at the equality
            // level. NOT is only consumed when IN or LIKE follows it, so
            // prefix NOT on the right of AND/OR is untouched.
            if self.check_keyword(Keyword::Is) {
                if BP_EQUALITY.0 < min_bp {
                    break;
                }
                self.advance();
                let negated = self.consume_keyword(Keyword::Not);
                self.expect_keyword(Keyword::Null)?;
                lhs = Expr::IsNull {
                    expr: self.arena.alloc(lhs),
                    negated,
                };
                continue;
            }

            let negated_membership = self.check_keyword(Keyword::Not)
                && matches!(
                    self.peek_nth(1),
                    Token::Keyword(Keyword::In) | Token::Keyword(Keyword::Like)
                );

            if negated_membership || self.check_keyword(Keyword::In) || self.check_keyword(Keyword::Like)
            {
                if BP_EQUALITY.0 < min_bp {
                    break;
                }
                let negated = negated_membership;
                if negated {
                    self.advance();
                }

                if self.consume_keyword(Keyword::In) {
                    self.expect_token(&Token::LParen)?;
                    let list = self.parse_expr_list()?;
                    self.expect_token(&Token::RParen)?;
                    lhs = Expr::InList {
                        expr: self.arena.alloc(lhs),
                        negated,
                        list,
                    };
                } else {
                    self.expect_keyword(Keyword::Like)?;
                    let pattern = self.parse_expr(BP_EQUALITY.1)?;
                    lhs = Expr::Like {
                        expr: self.arena.alloc(lhs),
                        negated,
                        pattern: self.arena.alloc(pattern),
                    };
                }
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr<'a>> {
        match self.peek().clone() {
            Token::Keyword(Keyword::Not) => {
                self.advance();
                let expr = self.parse_expr(BP_UNARY)?;
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Not,
                    expr: self.arena.alloc(expr),
                })
            }
            Token::Minus => {
                self.advance();
                let expr = self.parse_expr(BP_UNARY)?;
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Minus,
                    expr: self.arena.alloc(expr),
                })
            }
            Token::Plus => {
                self.advance();
                let expr = self.parse_expr(BP_UNARY)?;
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Plus,
                    expr: self.arena.alloc(expr),
                })
            }
            Token::Integer(raw) => {
                let value: i64 = raw.parse().map_err(|_| {
                    self.syntax_error(format!("integer literal '{raw}' out of range"))
                })?;
                self.advance();
                Ok(Expr::Literal(Literal::Integer(value)))
            }
            Token::Float(raw) => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| self.syntax_error(format!("malformed numeric literal '{raw}'")))?;
                self.advance();
                Ok(Expr::Literal(Literal::Float(value)))
            }
            Token::String(value) => {
                self.advance();
                let stored = match value {
                    Cow::Borrowed(s) => s,
                    Cow::Owned(s) => self.arena.alloc_str(&s),
                };
                Ok(Expr::Literal(Literal::String(stored)))
            }
            Token::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(true)))
            }
            Token::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(false)))
            }
            Token::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            Token::Parameter(name) => {
                self.advance();
                Ok(Expr::Parameter(name))
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expr(0)?;
                self.expect_token(&Token::RParen)?;
                Ok(expr)
            }
            Token::Ident(name) => {
                self.advance();
                if self.check_token(&Token::LParen) {
                    self.parse_function_call(name)
                } else if self.check_token(&Token::Dot) && is_name(self.peek_nth(1)) {
                    self.advance();
                    let prop = self.expect_name()?;
                    Ok(Expr::Property(PropertyRef {
                        qualifier: Some(name),
                        name: prop,
                    }))
                } else {
                    // A trailing `.` is left in place for the select-item
                    // wildcard form `alias.*`.
                    Ok(Expr::Property(PropertyRef {
                        qualifier: None,
                        name,
                    }))
                }
            }
            other => Err(self.syntax_error(format!(
                "unexpected {} in expression",
                other.describe()
            ))),
        }
    }

    fn parse_function_call(&mut self, name: &'a str) -> Result<Expr<'a>> {
        self.expect_token(&Token::LParen)?;

        let distinct = self.consume_keyword(Keyword::Distinct);

        let args = if self.consume_token(&Token::Star) {
            FunctionArgs::Star
        } else if self.check_token(&Token::RParen) {
            FunctionArgs::Args(&[])
        } else {
            FunctionArgs::Args(self.parse_expr_list()?)
        };

        if distinct && args.len() != 1 {
            return Err(self.syntax_error(format!(
                "DISTINCT inside {name}(...) requires exactly one argument"
            )));
        }

        self.expect_token(&Token::RParen)?;

        Ok(Expr::Function(FunctionCall {
            name,
            distinct,
            args,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<'a>(input: &'a str, arena: &'a Bump) -> Result<Query<'a>> {
        Parser::new(input, arena)?.parse_query()
    }

    fn select<'a>(input: &'a str, arena: &'a Bump) -> &'a SelectQuery<'a> {
        match parse(input, arena).unwrap() {
            Query::Select(s) => s,
            other => panic!("expected Select, got {other:?}"),
        }
    }

    #[test]
    fn parse_minimal_select() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u", &arena);
        assert_eq!(query.items.len(), 1);
        assert_eq!(query.from.len(), 1);
        assert_eq!(query.from[0].entity, "User");
        assert_eq!(query.from[0].alias, Some("u"));
    }

    #[test]
    fn parse_select_distinct() {
        let arena = Bump::new();
        let query = select("SELECT DISTINCT u.Name FROM User u", &arena);
        assert!(query.distinct);
    }

    #[test]
    fn parse_select_wildcard() {
        let arena = Bump::new();
        let query = select("SELECT * FROM User", &arena);
        assert!(matches!(query.items[0], SelectItem::Wildcard));
    }

    #[test]
    fn parse_select_qualified_wildcard() {
        let arena = Bump::new();
        let query = select("SELECT u.* FROM User u", &arena);
        assert!(matches!(query.items[0], SelectItem::QualifiedWildcard("u")));
    }

    #[test]
    fn parse_select_item_alias() {
        let arena = Bump::new();
        let query = select("SELECT u.Name AS display_name FROM User u", &arena);
        match query.items[0] {
            SelectItem::Expr { alias, .. } => assert_eq!(alias, Some("display_name")),
            other => panic!("expected aliased expression, got {other:?}"),
        }
    }

    #[test]
    fn parse_select_bare_alias() {
        let arena = Bump::new();
        let query = select("SELECT u.Name display_name FROM User u", &arena);
        match query.items[0] {
            SelectItem::Expr { alias, .. } => assert_eq!(alias, Some("display_name")),
            other => panic!("expected aliased expression, got {other:?}"),
        }
    }

    #[test]
    fn keyword_spelled_entity_name_parses() {
        let arena = Bump::new();
        let query = select("SELECT o.Total FROM Order o", &arena);
        assert_eq!(query.from[0].entity, "Order");
        assert_eq!(query.from[0].alias, Some("o"));
    }

    #[test]
    fn keyword_spelled_alias_and_property_names() {
        let arena = Bump::new();
        let query = select("SELECT u.Group AS Set FROM User u", &arena);
        match query.items[0] {
            SelectItem::Expr { expr, alias } => {
                assert_eq!(
                    *expr,
                    Expr::Property(PropertyRef {
                        qualifier: Some("u"),
                        name: "Group",
                    })
                );
                assert_eq!(alias, Some("Set"));
            }
            other => panic!("expected aliased expression, got {other:?}"),
        }
    }

    #[test]
    fn keyword_spelled_update_assignment_target() {
        let arena = Bump::new();
        let query = parse("UPDATE User u SET u.Order = 1", &arena).unwrap();
        match query {
            Query::Update(update) => {
                assert_eq!(update.assignments[0].property.name, "Order");
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn keyword_entity_does_not_swallow_following_clause() {
        // A bare alias never claims a keyword, so ORDER BY still reads
        // as a clause right after the source list.
        let arena = Bump::new();
        let query = select("SELECT Total FROM Order ORDER BY Total", &arena);
        assert_eq!(query.from[0].entity, "Order");
        assert_eq!(query.from[0].alias, None);
        assert_eq!(query.order_by.len(), 1);
    }

    #[test]
    fn parse_multiple_from_sources() {
        let arena = Bump::new();
        let query = select("SELECT u.Name, o.Total FROM User u, Order o", &arena);
        assert_eq!(query.from.len(), 2);
        assert_eq!(query.from[1].entity, "Order");
    }

    #[test]
    fn parse_property_access() {
        let arena = Bump::new();
        let query = select("SELECT u.Name FROM User u", &arena);
        match query.items[0] {
            SelectItem::Expr { expr, .. } => {
                assert_eq!(
                    *expr,
                    Expr::Property(PropertyRef {
                        qualifier: Some("u"),
                        name: "Name",
                    })
                );
            }
            other => panic!("expected expression item, got {other:?}"),
        }
    }

    #[test]
    fn parse_where_comparison() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE u.Age >= 18", &arena);
        match query.where_clause.unwrap() {
            Expr::BinaryOp { op, .. } => assert_eq!(*op, BinaryOperator::GtEq),
            other => panic!("expected binary op, got {other:?}"),
        }
    }

    #[test]
    fn parse_named_parameter() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE u.Name = :name", &arena);
        match query.where_clause.unwrap() {
            Expr::BinaryOp { right, .. } => {
                assert_eq!(**right, Expr::Parameter("name"));
            }
            other => panic!("expected binary op, got {other:?}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE a OR b AND c", &arena);
        match query.where_clause.unwrap() {
            Expr::BinaryOp { op, right, .. } => {
                assert_eq!(*op, BinaryOperator::Or);
                assert!(matches!(
                    right,
                    Expr::BinaryOp {
                        op: BinaryOperator::And,
                        ..
                    }
                ));
            }
            other => panic!("expected OR at the root, got {other:?}"),
        }
    }

    #[test]
    fn relational_binds_tighter_than_equality() {
        // a = b < c parses as a = (b < c).
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE a = b < c", &arena);
        match query.where_clause.unwrap() {
            Expr::BinaryOp { op, right, .. } => {
                assert_eq!(*op, BinaryOperator::Eq);
                assert!(matches!(
                    right,
                    Expr::BinaryOp {
                        op: BinaryOperator::Lt,
                        ..
                    }
                ));
            }
            other => panic!("expected Eq at the root, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let arena = Bump::new();
        let query = select("SELECT 1 + 2 * 3 FROM User", &arena);
        match query.items[0] {
            SelectItem::Expr { expr, .. } => match expr {
                Expr::BinaryOp { op, right, .. } => {
                    assert_eq!(*op, BinaryOperator::Plus);
                    assert!(matches!(
                        right,
                        Expr::BinaryOp {
                            op: BinaryOperator::Multiply,
                            ..
                        }
                    ));
                }
                other => panic!("expected Plus at the root, got {other:?}"),
            },
            other => panic!("expected expression item, got {other:?}"),
        }
    }

    #[test]
    fn parentheses_override_precedence() {
        let arena = Bump::new();
        let query = select("SELECT (1 + 2) * 3 FROM User", &arena);
        match query.items[0] {
            SelectItem::Expr { expr, .. } => {
                assert!(matches!(
                    expr,
                    Expr::BinaryOp {
                        op: BinaryOperator::Multiply,
                        ..
                    }
                ));
            }
            other => panic!("expected expression item, got {other:?}"),
        }
    }

    #[test]
    fn parse_unary_not_and_minus() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE NOT u.Deleted", &arena);
        assert!(matches!(
            query.where_clause.unwrap(),
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                ..
            }
        ));

        let arena2 = Bump::new();
        let query2 = select("SELECT -u.Balance FROM User u", &arena2);
        match query2.items[0] {
            SelectItem::Expr { expr, .. } => assert!(matches!(
                expr,
                Expr::UnaryOp {
                    op: UnaryOperator::Minus,
                    ..
                }
            )),
            other => panic!("expected expression item, got {other:?}"),
        }
    }

    #[test]
    fn not_on_rhs_of_and_stays_prefix() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE a AND NOT b", &arena);
        match query.where_clause.unwrap() {
            Expr::BinaryOp { op, right, .. } => {
                assert_eq!(*op, BinaryOperator::And);
                assert!(matches!(
                    right,
                    Expr::UnaryOp {
                        op: UnaryOperator::Not,
                        ..
                    }
                ));
            }
            other => panic!("expected AND at the root, got {other:?}"),
        }
    }

    #[test]
    fn parse_is_null_and_is_not_null() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE u.DeletedAt IS NULL", &arena);
        assert!(matches!(
            query.where_clause.unwrap(),
            Expr::IsNull { negated: false, .. }
        ));

        let arena2 = Bump::new();
        let query2 = select("SELECT u FROM User u WHERE u.DeletedAt IS NOT NULL", &arena2);
        assert!(matches!(
            query2.where_clause.unwrap(),
            Expr::IsNull { negated: true, .. }
        ));
    }

    #[test]
    fn parse_in_list() {
        let arena = Bump::new();
        let query = select(
            "SELECT u FROM User u WHERE u.Status IN ('new', 'active')",
            &arena,
        );
        match query.where_clause.unwrap() {
            Expr::InList { negated, list, .. } => {
                assert!(!negated);
                assert_eq!(list.len(), 2);
            }
            other => panic!("expected IN list, got {other:?}"),
        }
    }

    #[test]
    fn parse_not_in_and_not_like() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE u.Status NOT IN (1, 2)", &arena);
        assert!(matches!(
            query.where_clause.unwrap(),
            Expr::InList { negated: true, .. }
        ));

        let arena2 = Bump::new();
        let query2 = select("SELECT u FROM User u WHERE u.Name NOT LIKE 'A%'", &arena2);
        assert!(matches!(
            query2.where_clause.unwrap(),
            Expr::Like { negated: true, .. }
        ));
    }

    #[test]
    fn parse_like() {
        let arena = Bump::new();
        let query = select("SELECT u FROM User u WHERE u.Name LIKE :pattern", &arena);
        assert!(matches!(
            query.where_clause.unwrap(),
            Expr::Like { negated: false, .. }
        ));
    }

    #[test]
    fn parse_function_call_with_args() {
        let arena = Bump::new();
        let query = select("SELECT UPPER(u.Name) FROM User u", &arena);
        match query.items[0] {
            SelectItem::Expr { expr, .. } => match expr {
                Expr::Function(call) => {
                    assert_eq!(call.name, "UPPER");
                    assert!(!call.distinct);
                    assert_eq!(call.args.len(), 1);
                }
                other => panic!("expected function call, got {other:?}"),
            },
            other => panic!("expected expression item, got {other:?}"),
        }
    }

    #[test]
    fn parse_count_star() {
        let arena = Bump::new();
        let query = select("SELECT COUNT(*) FROM User u", &arena);
        match query.items[0] {
            SelectItem::Expr { expr, .. } => match expr {
                Expr::Function(call) => {
                    assert_eq!(call.name, "COUNT");
                    assert!(matches!(call.args, FunctionArgs::Star));
                }
                other => panic!("expected function call, got {other:?}"),
            },
            other => panic!("expected expression item, got {other:?}"),
        }
    }

    #[test]
    fn parse_count_distinct() {
        let arena = Bump::new();
        let query = select("SELECT COUNT(DISTINCT p.Category) FROM Product p", &arena);
        match query.items[0] {
            SelectItem::Expr { expr, .. } => match expr {
                Expr::Function(call) => {
                    assert!(call.distinct);
                    assert_eq!(call.args.len(), 1);
                }
                other => panic!("expected function call, got {other:?}"),
            },
            other => panic!("expected expression item, got {other:?}"),
        }
    }

    #[test]
    fn distinct_with_two_args_is_syntax_error() {
        let arena = Bump::new();
        let err = parse("SELECT COUNT(DISTINCT a, b) FROM User", &arena).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn parse_joins_in_order() {
        let arena = Bump::new();
        let query = select(
            "SELECT u FROM User u \
             JOIN Order o ON o.UserId = u.Id \
             LEFT JOIN Invoice i ON i.OrderId = o.Id",
            &arena,
        );
        assert_eq!(query.joins.len(), 2);
        assert_eq!(query.joins[0].join_type, JoinType::Inner);
        assert_eq!(query.joins[0].target.entity, "Order");
        assert_eq!(query.joins[1].join_type, JoinType::Left);
    }

    #[test]
    fn join_type_keywords() {
        let arena = Bump::new();
        let query = select(
            "SELECT u FROM User u \
             INNER JOIN A a ON a.x = u.x \
             RIGHT OUTER JOIN B b ON b.x = u.x \
             FULL JOIN C c ON c.x = u.x",
            &arena,
        );
        assert_eq!(query.joins[0].join_type, JoinType::Inner);
        assert_eq!(query.joins[1].join_type, JoinType::Right);
        assert_eq!(query.joins[2].join_type, JoinType::Full);
    }

    #[test]
    fn join_without_on_is_syntax_error() {
        let arena = Bump::new();
        let err = parse("SELECT u FROM User u JOIN Order o WHERE u.Id = 1", &arena).unwrap_err();
        match err {
            Error::Syntax { message, .. } => assert!(message.contains("ON")),
            other => panic!("expected Syntax error, got {other:?}"),
        }
    }

    #[test]
    fn parse_group_by_and_having() {
        let arena = Bump::new();
        let query = select(
            "SELECT p.Category, COUNT(*) FROM Product p \
             GROUP BY p.Category HAVING COUNT(*) > 5",
            &arena,
        );
        assert_eq!(query.group_by.len(), 1);
        assert!(query.having.is_some());
    }

    #[test]
    fn parse_order_by_directions() {
        let arena = Bump::new();
        let query = select(
            "SELECT u FROM User u ORDER BY u.Name DESC, u.Age",
            &arena,
        );
        assert_eq!(query.order_by.len(), 2);
        assert_eq!(query.order_by[0].direction, OrderDirection::Desc);
        assert_eq!(query.order_by[1].direction, OrderDirection::Asc);
    }

    #[test]
    fn parse_update_with_assignments() {
        let arena = Bump::new();
        let query = parse(
            "UPDATE Product p SET p.Price = p.Price * :multiplier WHERE p.Category = :category",
            &arena,
        )
        .unwrap();
        match query {
            Query::Update(update) => {
                assert_eq!(update.target.entity, "Product");
                assert_eq!(update.assignments.len(), 1);
                assert_eq!(update.assignments[0].property.name, "Price");
                assert!(update.where_clause.is_some());
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn parse_update_multiple_assignments_in_order() {
        let arena = Bump::new();
        let query = parse("UPDATE User u SET u.A = 1, u.B = 2, u.C = 3", &arena).unwrap();
        match query {
            Query::Update(update) => {
                let names: Vec<_> = update
                    .assignments
                    .iter()
                    .map(|a| a.property.name)
                    .collect();
                assert_eq!(names, vec!["A", "B", "C"]);
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn parse_delete() {
        let arena = Bump::new();
        let query = parse("DELETE FROM User u WHERE u.Inactive = TRUE", &arena).unwrap();
        match query {
            Query::Delete(delete) => {
                assert_eq!(delete.target.entity, "User");
                assert!(delete.where_clause.is_some());
            }
            other => panic!("expected Delete, got {other:?}"),
        }
    }

    #[test]
    fn parse_delete_without_where() {
        let arena = Bump::new();
        let query = parse("DELETE FROM AuditLog", &arena).unwrap();
        match query {
            Query::Delete(delete) => assert!(delete.where_clause.is_none()),
            other => panic!("expected Delete, got {other:?}"),
        }
    }

    #[test]
    fn literal_parsing_is_locale_independent() {
        let arena = Bump::new();
        let query = select("SELECT 3.14, 42, 1.5e-3 FROM User", &arena);
        let values: Vec<_> = query
            .items
            .iter()
            .map(|item| match item {
                SelectItem::Expr { expr, .. } => **expr,
                other => panic!("expected expression item, got {other:?}"),
            })
            .collect();
        assert_eq!(values[0], Expr::Literal(Literal::Float(3.14)));
        assert_eq!(values[1], Expr::Literal(Literal::Integer(42)));
        assert_eq!(values[2], Expr::Literal(Literal::Float(0.0015)));
    }

    #[test]
    fn integer_overflow_is_syntax_error() {
        let arena = Bump::new();
        let err = parse("SELECT 99999999999999999999 FROM User", &arena).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn boolean_and_null_literals() {
        let arena = Bump::new();
        let query = select("SELECT TRUE, FALSE, NULL FROM User", &arena);
        let values: Vec<_> = query
            .items
            .iter()
            .map(|item| match item {
                SelectItem::Expr { expr, .. } => **expr,
                other => panic!("expected expression item, got {other:?}"),
            })
            .collect();
        assert_eq!(values[0], Expr::Literal(Literal::Boolean(true)));
        assert_eq!(values[1], Expr::Literal(Literal::Boolean(false)));
        assert_eq!(values[2], Expr::Literal(Literal::Null));
    }

    #[test]
    fn missing_select_list_positions_error_at_from() {
        let arena = Bump::new();
        let err = parse("SELECT FROM", &arena).unwrap_err();
        match err {
            Error::Syntax { line, column, message } => {
                assert_eq!(line, 1);
                assert_eq!(column, 8);
                assert!(message.contains("FROM"));
            }
            other => panic!("expected Syntax error, got {other:?}"),
        }
    }

    #[test]
    fn missing_from_is_syntax_error() {
        let arena = Bump::new();
        let err = parse("SELECT u WHERE u.Id = 1", &arena).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn unbalanced_parenthesis_is_syntax_error() {
        let arena = Bump::new();
        let err = parse("SELECT (1 + 2 FROM User", &arena).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let arena = Bump::new();
        let err = parse("SELECT u FROM User u extra, tokens", &arena).unwrap_err();
        match err {
            // "extra" is swallowed as a bare alias; the comma cannot be.
            Error::Syntax { message, .. } => assert!(message.contains("end of input")),
            other => panic!("expected Syntax error, got {other:?}"),
        }
    }

    #[test]
    fn non_statement_start_is_syntax_error() {
        let arena = Bump::new();
        let err = parse("FROM User", &arena).unwrap_err();
        match err {
            Error::Syntax { message, .. } => {
                assert!(message.contains("SELECT, UPDATE, or DELETE"));
            }
            other => panic!("expected Syntax error, got {other:?}"),
        }
    }

    #[test]
    fn comment_only_prefix_parses_like_plain_input() {
        let arena = Bump::new();
        let q1 = parse("-- comment\nSELECT u FROM User u", &arena).unwrap();
        let q2 = parse("SELECT u FROM User u", &arena).unwrap();
        match (q1, q2) {
            (Query::Select(a), Query::Select(b)) => assert_eq!(a, b),
            other => panic!("expected two Select queries, got {other:?}"),
        }
    }
}
