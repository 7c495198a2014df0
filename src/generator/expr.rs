//! Expression rendering.
//!
//! Parentheses are inserted only where the output would otherwise
//! re-associate: each node is rendered with the minimum binding power its
//! position requires, using the parser's own precedence table, and wrapped
//! exactly when its operator binds looser than that.

use super::{Emit, ParamValue, SqlParam};
use crate::ast::*;
use crate::error::{Error, Result};
use crate::parser::{binary_binding, BP_AND, BP_EQUALITY, BP_UNARY};

/// Binding power an expression exposes to its parent. Primaries never
/// need wrapping.
///
/// Prefix NOT is the one spot where the output grammar disagrees with
/// the source grammar: SQL's NOT binds below comparison and IS/IN/LIKE,
/// so a NOT node reports a power between AND and the comparisons and
/// gets parenthesized whenever it sits under one of them.
fn precedence(expr: &Expr<'_>) -> u8 {
    match expr {
        Expr::BinaryOp { op, .. } => binary_binding(*op).0,
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => BP_AND.1,
        Expr::UnaryOp { .. } => BP_UNARY,
        Expr::IsNull { .. } | Expr::InList { .. } | Expr::Like { .. } => BP_EQUALITY.0,
        Expr::Literal(_)
        | Expr::Property(_)
        | Expr::Parameter(_)
        | Expr::Function(_)
        | Expr::Wildcard => u8::MAX,
    }
}

impl<'g, 'a> Emit<'g, 'a> {
    /// Renders `expr`, parenthesized if it binds looser than `min_bp`.
    pub(super) fn render_expr(&mut self, expr: &Expr<'a>, min_bp: u8) -> Result<String> {
        let rendered = match expr {
            Expr::Literal(literal) => self.render_literal(literal)?,
            Expr::Property(prop) => self.render_property(prop)?,
            Expr::Parameter(name) => {
                self.params.push(SqlParam {
                    name: (*name).to_string(),
                    value: ParamValue::Unbound,
                });
                self.dialect.param_marker(name)
            }
            Expr::BinaryOp { left, op, right } => {
                let (l_bp, r_bp) = binary_binding(*op);
                let left = self.render_expr(left, l_bp)?;
                let right = self.render_expr(right, r_bp)?;
                format!("{left} {} {right}", op.sql())
            }
            Expr::UnaryOp { op, expr } => {
                let operand = self.render_expr(expr, BP_UNARY)?;
                match op {
                    UnaryOperator::Not => format!("NOT {operand}"),
                    UnaryOperator::Minus => format!("-{operand}"),
                    UnaryOperator::Plus => format!("+{operand}"),
                }
            }
            Expr::IsNull { expr, negated } => {
                let operand = self.render_expr(expr, BP_EQUALITY.0)?;
                if *negated {
                    format!("{operand} IS NOT NULL")
                } else {
                    format!("{operand} IS NULL")
                }
            }
            Expr::InList {
                expr,
                negated,
                list,
            } => {
                let operand = self.render_expr(expr, BP_EQUALITY.0)?;
                let mut items = Vec::with_capacity(list.len());
                for item in *list {
                    items.push(self.render_expr(item, 0)?);
                }
                let keyword = if *negated { "NOT IN" } else { "IN" };
                format!("{operand} {keyword} ({})", items.join(", "))
            }
            Expr::Like {
                expr,
                negated,
                pattern,
            } => {
                let operand = self.render_expr(expr, BP_EQUALITY.0)?;
                let pattern = self.render_expr(pattern, BP_EQUALITY.1)?;
                let keyword = if *negated { "NOT LIKE" } else { "LIKE" };
                format!("{operand} {keyword} {pattern}")
            }
            Expr::Function(call) => self.render_function(call)?,
            Expr::Wildcard => "*".to_string(),
        };

        if precedence(expr) < min_bp {
            Ok(format!("({rendered})"))
        } else {
            Ok(rendered)
        }
    }

    fn render_literal(&mut self, literal: &Literal<'a>) -> Result<String> {
        let value = match literal {
            Literal::Null => return Ok("NULL".to_string()),
            Literal::Boolean(b) => return Ok(self.dialect.boolean_literal(*b).to_string()),
            Literal::Integer(v) => ParamValue::Integer(*v),
            Literal::Float(v) => ParamValue::Float(*v),
            Literal::String(s) => ParamValue::String((*s).to_string()),
        };
        let name = self.next_auto_name();
        let marker = self.dialect.param_marker(&name);
        self.params.push(SqlParam { name, value });
        Ok(marker)
    }

    fn next_auto_name(&mut self) -> String {
        loop {
            let candidate = format!("p{}", self.auto_index);
            self.auto_index += 1;
            if !self.explicit.contains(candidate.as_str()) {
                return candidate;
            }
        }
    }

    pub(super) fn render_property(&mut self, prop: &PropertyRef<'a>) -> Result<String> {
        let (binding, entity) = match prop.qualifier {
            Some(qualifier) => (qualifier, self.entity_for_binding(qualifier)?),
            None => self.sole_binding()?,
        };
        let column = self.resolver.resolve_column(entity, prop.name)?;
        let column = self.dialect.quote_identifier(column);
        if self.qualify {
            Ok(format!(
                "{}.{column}",
                self.dialect.quote_identifier(binding)
            ))
        } else {
            Ok(column)
        }
    }

    fn render_function(&mut self, call: &FunctionCall<'a>) -> Result<String> {
        let aggregate = self.registry.is_aggregate(call.name);
        if aggregate && self.in_aggregate {
            return Err(Error::unsupported(format!(
                "aggregate '{}' nested inside another aggregate's argument",
                call.name
            )));
        }

        let was_in_aggregate = self.in_aggregate;
        if aggregate {
            self.in_aggregate = true;
        }

        let result = self.render_function_args(call);
        self.in_aggregate = was_in_aggregate;
        let mut args = result?;

        if call.distinct {
            // The parser guarantees exactly one argument under DISTINCT.
            args[0] = format!("DISTINCT {}", args[0]);
        }

        self.registry.expand(call.name, self.dialect, &args)
    }

    fn render_function_args(&mut self, call: &FunctionCall<'a>) -> Result<Vec<String>> {
        match call.args {
            FunctionArgs::Star => Ok(vec!["*".to_string()]),
            FunctionArgs::Args(args) => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.render_expr(arg, 0)?);
                }
                Ok(rendered)
            }
        }
    }
}
