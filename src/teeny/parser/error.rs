use std::fmt;

use thiserror::Error;

use crate::teeny::lexer::{LexError, Token, TokenKind};

/// Broad category of a [`CompileError`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorClass {
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Lexical => write!(f, "lexical"),
            ErrorClass::Syntax => write!(f, "syntax"),
            ErrorClass::Semantic => write!(f, "semantic"),
        }
    }
}

/// Every error aborts the whole compilation.
#[derive(Error, Debug, PartialEq)]
pub enum CompileError {
    #[error("lexing error on line {line}: {source}")]
    Lex {
        line: usize,
        #[source]
        source: LexError,
    },

    #[error("line {line}: expected {expected}, got {found}")]
    UnexpectedToken {
        line: usize,
        expected: TokenKind,
        found: TokenKind,
    },

    #[error("line {}: expected comparison operator, got {0}", .0.line())]
    ExpectedComparison(Token),

    #[error("line {}: unexpected token {0}", .0.line())]
    UnexpectedPrimary(Token),

    #[error("line {}: invalid statement at {0}", .0.line())]
    InvalidStatement(Token),

    #[error("attempting to GOTO undeclared label `{0}`")]
    UndeclaredLabel(String),

    #[error("line {line}: label `{label}` already declared")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line}: referencing variable `{name}` before assignment")]
    UndeclaredVariable { line: usize, name: String },
}

impl CompileError {
    pub fn class(&self) -> ErrorClass {
        match self {
            CompileError::Lex { .. } => ErrorClass::Lexical,
            CompileError::UnexpectedToken { .. }
            | CompileError::ExpectedComparison(_)
            | CompileError::UnexpectedPrimary(_)
            | CompileError::InvalidStatement(_) => ErrorClass::Syntax,
            CompileError::UndeclaredLabel(_)
            | CompileError::DuplicateLabel { .. }
            | CompileError::UndeclaredVariable { .. } => ErrorClass::Semantic,
        }
    }
}
