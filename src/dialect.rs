//! Target SQL dialects.
//!
//! A dialect owns the output-side conventions the generator consults at
//! every identifier and literal: quoting style, parameter markers, and the
//! boolean keyword convention. The quoting table is fixed:
//!
//! | Dialect  | Quoting      | `Foo` escapes to |
//! |----------|--------------|------------------|
//! | Generic  | none         | `Foo`            |
//! | Postgres | double quote | `"Foo"`          |
//! | MySql    | backtick     | `` `Foo` ``      |
//! | Sqlite   | double quote | `"Foo"`          |
//!
//! A quote character embedded in an identifier is doubled on output.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// No identifier quoting; bare identifiers only.
    Generic,
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Escapes a single identifier (table, column, or alias name) for this
    /// dialect. Never applied to literal values, parameter markers, or `*`.
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Dialect::Generic => ident.to_string(),
            Dialect::Postgres | Dialect::Sqlite => {
                let mut out = String::with_capacity(ident.len() + 2);
                out.push('"');
                for ch in ident.chars() {
                    if ch == '"' {
                        out.push('"');
                    }
                    out.push(ch);
                }
                out.push('"');
                out
            }
            Dialect::MySql => {
                let mut out = String::with_capacity(ident.len() + 2);
                out.push('`');
                for ch in ident.chars() {
                    if ch == '`' {
                        out.push('`');
                    }
                    out.push(ch);
                }
                out.push('`');
                out
            }
        }
    }

    /// The parameter marker emitted for a named parameter. Every current
    /// dialect uses the `:name` form; the bound value is supplied by the
    /// caller's execution layer.
    pub fn param_marker(&self, name: &str) -> String {
        format!(":{name}")
    }

    /// Boolean literals render as SQL keywords rather than bound
    /// parameters. Generic and SQLite targets spell them numerically.
    pub fn boolean_literal(&self, value: bool) -> &'static str {
        match self {
            Dialect::Postgres | Dialect::MySql => {
                if value {
                    "TRUE"
                } else {
                    "FALSE"
                }
            }
            Dialect::Generic | Dialect::Sqlite => {
                if value {
                    "1"
                } else {
                    "0"
                }
            }
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Generic => "generic",
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_table_is_exact() {
        assert_eq!(Dialect::Generic.quote_identifier("Foo"), "Foo");
        assert_eq!(Dialect::Postgres.quote_identifier("Foo"), "\"Foo\"");
        assert_eq!(Dialect::MySql.quote_identifier("Foo"), "`Foo`");
        assert_eq!(Dialect::Sqlite.quote_identifier("Foo"), "\"Foo\"");
    }

    #[test]
    fn embedded_quote_characters_are_doubled() {
        assert_eq!(Dialect::Postgres.quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(Dialect::MySql.quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn param_marker_uses_colon_sigil() {
        assert_eq!(Dialect::Postgres.param_marker("active"), ":active");
        assert_eq!(Dialect::Generic.param_marker("p0"), ":p0");
    }

    #[test]
    fn boolean_convention_per_dialect() {
        assert_eq!(Dialect::Postgres.boolean_literal(true), "TRUE");
        assert_eq!(Dialect::MySql.boolean_literal(false), "FALSE");
        assert_eq!(Dialect::Generic.boolean_literal(true), "1");
        assert_eq!(Dialect::Sqlite.boolean_literal(false), "0");
    }

    #[test]
    fn display_names_are_lowercase() {
        assert_eq!(Dialect::MySql.to_string(), "mysql");
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
    }
}
