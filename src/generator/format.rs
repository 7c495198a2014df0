//! Cosmetic layout for WHERE and HAVING conditions.
//!
//! In formatted mode a chain of one boolean operator breaks onto one line
//! per operand with the operator leading the continuation lines. Only
//! whitespace differs from compact output; operand traversal order, and
//! with it the parameter list, is identical.

use super::Emit;
use crate::ast::{BinaryOperator, Expr};
use crate::error::Result;
use crate::parser::binary_binding;

impl<'g, 'a> Emit<'g, 'a> {
    pub(super) fn render_condition(&mut self, expr: &Expr<'a>) -> Result<String> {
        if !self.formatted {
            return self.render_expr(expr, 0);
        }

        let op = match expr {
            Expr::BinaryOp { op, .. } if matches!(op, BinaryOperator::And | BinaryOperator::Or) => {
                *op
            }
            _ => return self.render_expr(expr, 0),
        };

        let mut operands = Vec::new();
        flatten(expr, op, &mut operands);

        let (_, r_bp) = binary_binding(op);
        let mut out = String::new();
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                out.push_str("\n  ");
                out.push_str(op.sql());
                out.push(' ');
            }
            out.push_str(&self.render_condition_operand(operand, r_bp)?);
        }
        Ok(out)
    }

    // Operands of the broken chain may themselves be chains of the other
    // boolean operator; those stay compact and parenthesized as usual.
    fn render_condition_operand(&mut self, expr: &Expr<'a>, min_bp: u8) -> Result<String> {
        self.render_expr(expr, min_bp)
    }
}

/// Collects the left-associative chain of `op` in source order.
fn flatten<'a, 'e>(expr: &'e Expr<'a>, op: BinaryOperator, out: &mut Vec<&'e Expr<'a>>) {
    match expr {
        Expr::BinaryOp {
            left,
            op: node_op,
            right,
        } if *node_op == op => {
            flatten(left, op, out);
            flatten(right, op, out);
        }
        _ => out.push(expr),
    }
}
