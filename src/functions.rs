//! Function catalogue.
//!
//! Logical function names map to per-dialect SQL templates. A template is
//! plain SQL text with `{0}`, `{1}`, … argument slots; `{..}` splices all
//! arguments comma-separated and `{||}` splices them joined with the SQL
//! concatenation operator. Lookup tries the dialect-specific entry first,
//! then a per-name fallback shared by every dialect.
//!
//! The built-in catalogue covers the aggregates COUNT/SUM/AVG/MIN/MAX,
//! the string functions UPPER/LOWER/LENGTH/SUBSTRING/TRIM/CONCAT, and the
//! date functions YEAR/MONTH/DAY/HOUR/MINUTE/SECOND/NOW. Hosts may add or
//! override entries at runtime before compiling.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use hashbrown::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Aggregate,
    Scalar,
}

#[derive(Debug, Clone)]
struct Entry {
    kind: FunctionKind,
    per_dialect: HashMap<Dialect, String>,
    fallback: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    entries: HashMap<String, Entry>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Builds the registry with the built-in catalogue pre-populated.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };
        registry.install_builtins();
        registry
    }

    /// An empty registry with no built-ins, for hosts that want full
    /// control over the catalogue.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn install_builtins(&mut self) {
        use FunctionKind::{Aggregate, Scalar};

        for name in ["COUNT", "SUM", "AVG", "MIN", "MAX"] {
            self.register_fallback(name, Aggregate, format!("{name}({{0}})"));
        }

        self.register_fallback("UPPER", Scalar, "UPPER({0})");
        self.register_fallback("LOWER", Scalar, "LOWER({0})");
        self.register_fallback("TRIM", Scalar, "TRIM({0})");

        self.register_fallback("LENGTH", Scalar, "LENGTH({0})");
        self.register("LENGTH", Scalar, Dialect::Generic, "LEN({0})");
        self.register("LENGTH", Scalar, Dialect::MySql, "CHAR_LENGTH({0})");

        self.register_fallback("SUBSTRING", Scalar, "SUBSTRING({0}, {1}, {2})");
        self.register(
            "SUBSTRING",
            Scalar,
            Dialect::Postgres,
            "SUBSTRING({0} FROM {1} FOR {2})",
        );
        self.register("SUBSTRING", Scalar, Dialect::Sqlite, "SUBSTR({0}, {1}, {2})");

        self.register_fallback("CONCAT", Scalar, "CONCAT({..})");
        self.register("CONCAT", Scalar, Dialect::Generic, "({||})");
        self.register("CONCAT", Scalar, Dialect::Sqlite, "({||})");

        for (name, field, strftime) in [
            ("YEAR", "YEAR", "%Y"),
            ("MONTH", "MONTH", "%m"),
            ("DAY", "DAY", "%d"),
            ("HOUR", "HOUR", "%H"),
            ("MINUTE", "MINUTE", "%M"),
            ("SECOND", "SECOND", "%S"),
        ] {
            self.register_fallback(name, Scalar, format!("EXTRACT({field} FROM {{0}})"));
            self.register(name, Scalar, Dialect::MySql, format!("{name}({{0}})"));
            self.register(
                name,
                Scalar,
                Dialect::Sqlite,
                format!("CAST(STRFTIME('{strftime}', {{0}}) AS INTEGER)"),
            );
        }

        self.register_fallback("NOW", Scalar, "CURRENT_TIMESTAMP");
        self.register("NOW", Scalar, Dialect::Postgres, "NOW()");
        self.register("NOW", Scalar, Dialect::MySql, "NOW()");
    }

    /// Registers (or overrides) a dialect-specific template. Names are
    /// case-insensitive; the kind of an existing entry is overwritten.
    pub fn register(
        &mut self,
        name: &str,
        kind: FunctionKind,
        dialect: Dialect,
        template: impl Into<String>,
    ) {
        let entry = self
            .entries
            .entry(name.to_ascii_uppercase())
            .or_insert_with(|| Entry {
                kind,
                per_dialect: HashMap::new(),
                fallback: None,
            });
        entry.kind = kind;
        entry.per_dialect.insert(dialect, template.into());
    }

    /// Registers a template used by every dialect without its own entry.
    pub fn register_fallback(&mut self, name: &str, kind: FunctionKind, template: impl Into<String>) {
        let entry = self
            .entries
            .entry(name.to_ascii_uppercase())
            .or_insert_with(|| Entry {
                kind,
                per_dialect: HashMap::new(),
                fallback: None,
            });
        entry.kind = kind;
        entry.fallback = Some(template.into());
    }

    pub fn lookup(&self, name: &str, dialect: Dialect) -> Result<&str> {
        let key = name.to_ascii_uppercase();
        let entry = self.entries.get(&key).ok_or_else(|| Error::UnknownFunction {
            name: name.to_string(),
            dialect,
        })?;
        entry
            .per_dialect
            .get(&dialect)
            .or(entry.fallback.as_ref())
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownFunction {
                name: name.to_string(),
                dialect,
            })
    }

    pub fn is_aggregate(&self, name: &str) -> bool {
        self.entries
            .get(&name.to_ascii_uppercase())
            .is_some_and(|e| e.kind == FunctionKind::Aggregate)
    }

    /// Looks up the template for `name` under `dialect` and substitutes
    /// the rendered argument strings into its slots. Arity mismatches
    /// against a fixed-slot template are rejected.
    pub fn expand(&self, name: &str, dialect: Dialect, args: &[String]) -> Result<String> {
        let template = self.lookup(name, dialect)?;
        expand_template(name, template, args)
    }
}

fn expand_template(name: &str, template: &str, args: &[String]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut max_slot: Option<usize> = None;
    let mut variadic = false;

    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            Error::unsupported(format!("malformed template for function '{name}'"))
        })?;
        let slot = &after[..close];
        rest = &after[close + 1..];

        match slot {
            ".." => {
                variadic = true;
                out.push_str(&args.join(", "));
            }
            "||" => {
                variadic = true;
                out.push_str(&args.join(" || "));
            }
            _ => {
                let index: usize = slot.parse().map_err(|_| {
                    Error::unsupported(format!("malformed template for function '{name}'"))
                })?;
                let arg = args.get(index).ok_or_else(|| {
                    Error::unsupported(format!(
                        "function '{name}' requires at least {} argument(s), got {}",
                        index + 1,
                        args.len()
                    ))
                })?;
                out.push_str(arg);
                max_slot = Some(max_slot.map_or(index, |m| m.max(index)));
            }
        }
    }
    out.push_str(rest);

    if !variadic {
        let expected = max_slot.map_or(0, |m| m + 1);
        if args.len() != expected {
            return Err(Error::unsupported(format!(
                "function '{name}' takes {expected} argument(s), got {}",
                args.len()
            )));
        }
    }

    Ok(out)
}
