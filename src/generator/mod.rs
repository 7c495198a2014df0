//! SQL generation.
//!
//! The generator walks one parsed [`Query`] with an [`EntityResolver`],
//! a [`FunctionRegistry`], and a target [`Dialect`], and produces a SQL
//! string plus the ordered parameter list. It performs no I/O and keeps
//! no state between calls; any resolution failure aborts the whole
//! generation with no partial output.
//!
//! Literal values never appear inline in the SQL text. Each string or
//! numeric literal becomes a placeholder with an auto-assigned name
//! (`p0`, `p1`, … skipping names the query already uses explicitly) and
//! its value rides along in the parameter list. Boolean and NULL
//! literals render as dialect keywords instead. Named parameters pass
//! through unresolved, one list entry per occurrence.

mod expr;
mod format;

use crate::ast::*;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::functions::FunctionRegistry;
use crate::resolver::EntityResolver;
use hashbrown::HashSet;
use smallvec::SmallVec;

/// One entry in the output parameter list, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParam {
    pub name: String,
    pub value: ParamValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Float(f64),
    /// Named parameter from the query text; the caller binds the value.
    Unbound,
}

pub struct Generator<'g> {
    resolver: &'g EntityResolver,
    registry: &'g FunctionRegistry,
    dialect: Dialect,
    formatted: bool,
}

impl<'g> Generator<'g> {
    pub fn new(
        resolver: &'g EntityResolver,
        registry: &'g FunctionRegistry,
        dialect: Dialect,
    ) -> Self {
        Self {
            resolver,
            registry,
            dialect,
            formatted: false,
        }
    }

    /// Enables the cosmetic formatting mode: clause keywords on their own
    /// lines, AND/OR chains in WHERE and HAVING broken one operand per
    /// line. Parameter list and SQL semantics are unchanged.
    pub fn formatted(mut self, on: bool) -> Self {
        self.formatted = on;
        self
    }

    pub fn generate(&self, query: &Query<'_>) -> Result<(String, Vec<SqlParam>)> {
        let mut emit = Emit {
            resolver: self.resolver,
            registry: self.registry,
            dialect: self.dialect,
            formatted: self.formatted,
            scope: SmallVec::new(),
            qualify: true,
            params: Vec::new(),
            explicit: HashSet::new(),
            auto_index: 0,
            in_aggregate: false,
        };

        collect_parameter_names(query, &mut emit.explicit);

        let sql = match query {
            Query::Select(select) => emit.select(select)?,
            Query::Update(update) => emit.update(update)?,
            Query::Delete(delete) => emit.delete(delete)?,
        };

        Ok((sql, emit.params))
    }
}

struct Emit<'g, 'a> {
    resolver: &'g EntityResolver,
    registry: &'g FunctionRegistry,
    dialect: Dialect,
    formatted: bool,
    /// Binding name → entity, in declaration order (FROM first, then JOINs).
    scope: SmallVec<[(&'a str, &'a str); 4]>,
    /// UPDATE/DELETE emit unaliased tables, so columns stay unqualified.
    qualify: bool,
    params: Vec<SqlParam>,
    explicit: HashSet<&'a str>,
    auto_index: usize,
    in_aggregate: bool,
}

impl<'g, 'a> Emit<'g, 'a> {
    fn clause_sep(&self) -> &'static str {
        if self.formatted {
            "\n"
        } else {
            " "
        }
    }

    fn bind(&mut self, source: &EntityRef<'a>) -> Result<()> {
        let binding = source.binding();
        if self.scope.iter().any(|(b, _)| *b == binding) {
            return Err(Error::unsupported(format!(
                "duplicate alias '{binding}' in FROM/JOIN clauses"
            )));
        }
        // Entity must exist even if nothing references it later.
        self.resolver.resolve_table(source.entity)?;
        self.scope.push((binding, source.entity));
        Ok(())
    }

    fn entity_for_binding(&self, binding: &str) -> Result<&'a str> {
        self.scope
            .iter()
            .find(|(b, _)| *b == binding)
            .map(|(_, e)| *e)
            .ok_or_else(|| Error::UnknownEntity {
                entity: binding.to_string(),
            })
    }

    fn is_binding(&self, name: &str) -> bool {
        self.scope.iter().any(|(b, _)| *b == name)
    }

    fn sole_binding(&self) -> Result<(&'a str, &'a str)> {
        match self.scope.as_slice() {
            [only] => Ok(*only),
            _ => Err(Error::unsupported(
                "unqualified property is ambiguous with multiple FROM/JOIN sources".to_string(),
            )),
        }
    }

    fn quoted_table(&self, entity: &str) -> Result<String> {
        Ok(self.dialect.quote_identifier(self.resolver.resolve_table(entity)?))
    }

    fn table_ref(&self, source: &EntityRef<'a>) -> Result<String> {
        let table = self.quoted_table(source.entity)?;
        match source.alias {
            Some(alias) => Ok(format!("{table} {}", self.dialect.quote_identifier(alias))),
            None if self.qualify => Ok(format!(
                "{table} {}",
                self.dialect.quote_identifier(source.entity)
            )),
            None => Ok(table),
        }
    }

    fn select(&mut self, select: &SelectQuery<'a>) -> Result<String> {
        for source in select.from {
            self.bind(source)?;
        }
        for join in select.joins {
            self.bind(&join.target)?;
        }

        let sep = self.clause_sep();
        let mut sql = String::from("SELECT ");
        if select.distinct {
            sql.push_str("DISTINCT ");
        }

        for (i, item) in select.items.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&self.select_item(item)?);
        }

        sql.push_str(sep);
        sql.push_str("FROM ");
        for (i, source) in select.from.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&self.table_ref(source)?);
        }

        for join in select.joins {
            sql.push_str(sep);
            sql.push_str(join_keyword(join.join_type));
            sql.push(' ');
            sql.push_str(&self.table_ref(&join.target)?);
            sql.push_str(" ON ");
            sql.push_str(&self.render_expr(join.on, 0)?);
        }

        if let Some(filter) = select.where_clause {
            sql.push_str(sep);
            sql.push_str("WHERE ");
            sql.push_str(&self.render_condition(filter)?);
        }

        if !select.group_by.is_empty() {
            sql.push_str(sep);
            sql.push_str("GROUP BY ");
            for (i, expr) in select.group_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&self.render_expr(expr, 0)?);
            }
        }

        if let Some(having) = select.having {
            sql.push_str(sep);
            sql.push_str("HAVING ");
            sql.push_str(&self.render_condition(having)?);
        }

        if !select.order_by.is_empty() {
            sql.push_str(sep);
            sql.push_str("ORDER BY ");
            for (i, item) in select.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&self.render_expr(item.expr, 0)?);
                if item.direction == OrderDirection::Desc {
                    sql.push_str(" DESC");
                }
            }
        }

        Ok(sql)
    }

    fn select_item(&mut self, item: &SelectItem<'a>) -> Result<String> {
        match item {
            SelectItem::Wildcard => Ok("*".to_string()),
            SelectItem::QualifiedWildcard(binding) => {
                self.entity_for_binding(binding)?;
                Ok(format!("{}.*", self.dialect.quote_identifier(binding)))
            }
            SelectItem::Expr { expr, alias } => {
                // A bare binding name selects the whole row of that source.
                if let Expr::Property(prop) = expr {
                    if prop.qualifier.is_none() && self.is_binding(prop.name) {
                        return Ok(format!("{}.*", self.dialect.quote_identifier(prop.name)));
                    }
                }
                let rendered = self.render_expr(expr, 0)?;
                match alias {
                    Some(alias) => Ok(format!(
                        "{rendered} AS {}",
                        self.dialect.quote_identifier(alias)
                    )),
                    None => Ok(rendered),
                }
            }
        }
    }

    fn update(&mut self, update: &UpdateQuery<'a>) -> Result<String> {
        self.qualify = false;
        self.bind(&update.target)?;

        let sep = self.clause_sep();
        let mut sql = String::from("UPDATE ");
        sql.push_str(&self.quoted_table(update.target.entity)?);
        sql.push_str(sep);
        sql.push_str("SET ");

        for (i, assignment) in update.assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&self.render_property(&assignment.property)?);
            sql.push_str(" = ");
            sql.push_str(&self.render_expr(assignment.value, 0)?);
        }

        if let Some(filter) = update.where_clause {
            sql.push_str(sep);
            sql.push_str("WHERE ");
            sql.push_str(&self.render_condition(filter)?);
        }

        Ok(sql)
    }

    fn delete(&mut self, delete: &DeleteQuery<'a>) -> Result<String> {
        self.qualify = false;
        self.bind(&delete.target)?;

        let sep = self.clause_sep();
        let mut sql = String::from("DELETE FROM ");
        sql.push_str(&self.quoted_table(delete.target.entity)?);

        if let Some(filter) = delete.where_clause {
            sql.push_str(sep);
            sql.push_str("WHERE ");
            sql.push_str(&self.render_condition(filter)?);
        }

        Ok(sql)
    }
}

fn join_keyword(join_type: JoinType) -> &'static str {
    match join_type {
        JoinType::Inner => "INNER JOIN",
        JoinType::Left => "LEFT JOIN",
        JoinType::Right => "RIGHT JOIN",
        JoinType::Full => "FULL JOIN",
    }
}

fn collect_parameter_names<'a>(query: &Query<'a>, out: &mut HashSet<&'a str>) {
    match query {
        Query::Select(select) => {
            for item in select.items {
                if let SelectItem::Expr { expr, .. } = item {
                    collect_expr_parameters(expr, out);
                }
            }
            for join in select.joins {
                collect_expr_parameters(join.on, out);
            }
            if let Some(filter) = select.where_clause {
                collect_expr_parameters(filter, out);
            }
            for expr in select.group_by {
                collect_expr_parameters(expr, out);
            }
            if let Some(having) = select.having {
                collect_expr_parameters(having, out);
            }
            for item in select.order_by {
                collect_expr_parameters(item.expr, out);
            }
        }
        Query::Update(update) => {
            for assignment in update.assignments {
                collect_expr_parameters(assignment.value, out);
            }
            if let Some(filter) = update.where_clause {
                collect_expr_parameters(filter, out);
            }
        }
        Query::Delete(delete) => {
            if let Some(filter) = delete.where_clause {
                collect_expr_parameters(filter, out);
            }
        }
    }
}

fn collect_expr_parameters<'a>(expr: &Expr<'a>, out: &mut HashSet<&'a str>) {
    match expr {
        Expr::Parameter(name) => {
            out.insert(name);
        }
        Expr::BinaryOp { left, right, .. } => {
            collect_expr_parameters(left, out);
            collect_expr_parameters(right, out);
        }
        Expr::UnaryOp { expr, .. } => collect_expr_parameters(expr, out),
        Expr::IsNull { expr, .. } => collect_expr_parameters(expr, out),
        Expr::InList { expr, list, .. } => {
            collect_expr_parameters(expr, out);
            for item in *list {
                collect_expr_parameters(item, out);
            }
        }
        Expr::Like { expr, pattern, .. } => {
            collect_expr_parameters(expr, out);
            collect_expr_parameters(pattern, out);
        }
        Expr::Function(call) => {
            if let FunctionArgs::Args(args) = call.args {
                for arg in args {
                    collect_expr_parameters(arg, out);
                }
            }
        }
        Expr::Literal(_) | Expr::Property(_) | Expr::Wildcard => {}
    }
}
