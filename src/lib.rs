//! # CPQL - Entity Query Language Compiler
//!
//! CPQL compiles a JPQL/HQL-like entity query language into dialect-aware
//! SQL with an ordered named-parameter list. The pipeline is a hand-written
//! lexer, a recursive-descent parser with Pratt expression parsing into an
//! arena-allocated AST, and a generator that resolves logical entities and
//! properties to physical tables and columns. This implementation
//! prioritizes:
//!
//! - **Zero-copy front end**: Tokens and AST nodes borrow the query text;
//!   one bump arena per compilation, freed wholesale
//! - **No SQL injection surface**: Literal values never appear in the SQL
//!   text, only placeholders and a parameter list
//! - **Stateless compilation**: All mutable state (entity model, function
//!   catalogue, caches) is owned by the caller
//!
//! ## Quick Start
//!
//! ```
//! use cpql::{Compiler, Dialect, EntityResolver, FunctionRegistry};
//!
//! let mut resolver = EntityResolver::new();
//! resolver.register_entity("User", "users");
//! resolver.register_property("User", "IsActive", "is_active");
//!
//! let registry = FunctionRegistry::new();
//! let compiler = Compiler::new(&resolver, &registry, Dialect::Postgres);
//!
//! let compiled = compiler
//!     .compile("SELECT u FROM User u WHERE u.IsActive = :active")
//!     .unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT \"u\".* FROM \"users\" \"u\" WHERE \"u\".\"is_active\" = :active"
//! );
//! assert_eq!(compiled.params.len(), 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │        Public API (Compiler)          │
//! ├──────────────────────────────────────┤
//! │   Lexer → Parser → AST (bump arena)   │
//! ├──────────────────────────────────────┤
//! │ Generator │ Resolver │ Function Reg.  │
//! ├──────────────────────────────────────┤
//! │        Dialect (quoting, bools)       │
//! └──────────────────────────────────────┘
//! ```
//!
//! A compilation is CPU-bound and synchronous. The [`EntityResolver`] and
//! [`FunctionRegistry`] are read-mostly: populate them before concurrent
//! compilation traffic starts, or synchronize externally. [`QueryCache`]
//! memoizes compiled SQL per (query text, dialect).

pub mod ast;
pub mod cache;
pub mod dialect;
pub mod error;
pub mod functions;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod token;

pub use cache::QueryCache;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use functions::{FunctionKind, FunctionRegistry};
pub use generator::{Generator, ParamValue, SqlParam};
pub use parser::Parser;
pub use resolver::{EntityResolver, Resolved};

use bumpalo::Bump;

/// The output of one successful compilation: SQL text plus the parameter
/// list in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Front door for the whole pipeline. Borrows the entity model and
/// function catalogue; cheap to construct per dialect or per call.
#[derive(Clone, Copy)]
pub struct Compiler<'c> {
    resolver: &'c EntityResolver,
    registry: &'c FunctionRegistry,
    dialect: Dialect,
    formatted: bool,
}

impl<'c> Compiler<'c> {
    pub fn new(
        resolver: &'c EntityResolver,
        registry: &'c FunctionRegistry,
        dialect: Dialect,
    ) -> Self {
        Self {
            resolver,
            registry,
            dialect,
            formatted: false,
        }
    }

    /// Enables cosmetic SQL formatting. Parameter count, order, and
    /// binding are identical to compact output.
    pub fn formatted(mut self, on: bool) -> Self {
        self.formatted = on;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Runs lex → parse → generate for one query string.
    pub fn compile(&self, text: &str) -> Result<CompiledQuery> {
        let arena = Bump::new();
        let query = Parser::new(text, &arena)?.parse_query()?;
        let (sql, params) = Generator::new(self.resolver, self.registry, self.dialect)
            .formatted(self.formatted)
            .generate(&query)?;
        Ok(CompiledQuery { sql, params })
    }
}

/// One-shot convenience wrapper around [`Compiler::compile`].
pub fn compile(
    text: &str,
    resolver: &EntityResolver,
    registry: &FunctionRegistry,
    dialect: Dialect,
) -> Result<CompiledQuery> {
    Compiler::new(resolver, registry, dialect).compile(text)
}
