//! Compilation error taxonomy.
//!
//! Every stage of the pipeline fails fast: the first error aborts the whole
//! compilation and is surfaced as a single [`Error`] value. Lexical and
//! syntax errors carry the source position (1-based line/column) of the
//! offending input; resolution errors name the entity, property, or function
//! that had no registered mapping.

use crate::dialect::Dialect;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An unrecognized character or malformed literal during tokenization.
    #[error("lexical error at line {line} column {column}: {message}")]
    Lexical {
        message: String,
        line: u32,
        column: u32,
    },

    /// The token stream does not match the grammar.
    #[error("syntax error at line {line} column {column}: {message}")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
    },

    /// A FROM/JOIN target or property qualifier with no registered entity.
    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    /// A property access with no registered column for its entity.
    #[error("unknown property '{property}' on entity '{entity}'")]
    UnknownProperty { entity: String, property: String },

    /// A function call with no template for the requested name/dialect.
    #[error("unknown function '{name}' for dialect {dialect}")]
    UnknownFunction { name: String, dialect: Dialect },

    /// A parsed AST shape the generator cannot render.
    #[error("unsupported construct: {message}")]
    UnsupportedConstruct { message: String },
}

impl Error {
    pub(crate) fn lexical(message: impl Into<String>, line: u32, column: u32) -> Self {
        Error::Lexical {
            message: message.into(),
            line,
            column,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        Error::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedConstruct {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_error_carries_position() {
        let err = Error::lexical("unexpected character '#'", 3, 14);
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("column 14"));
        assert!(msg.contains('#'));
    }

    #[test]
    fn unknown_entity_names_the_entity() {
        let err = Error::UnknownEntity {
            entity: "Ghost".to_string(),
        };
        assert_eq!(err.to_string(), "unknown entity 'Ghost'");
    }

    #[test]
    fn unknown_function_names_dialect() {
        let err = Error::UnknownFunction {
            name: "SOUNDEX".to_string(),
            dialect: Dialect::Sqlite,
        };
        assert!(err.to_string().contains("SOUNDEX"));
        assert!(err.to_string().contains("sqlite"));
    }
}
