use std::collections::HashSet;

use crate::teeny::{
    emitter::Emitter,
    lexer::{Lexer, Token, TokenKind},
};

use super::error::CompileError;

/// Cursor and bookkeeping for a single translation.
///
/// Holds the current token plus one token of lookahead, the emitter the
/// productions write into, and the label and variable sets used for the
/// static checks.
#[derive(Debug)]
pub struct ParseContext {
    lexer: Lexer,
    emitter: Emitter,
    current: Token,
    peek: Token,
    labels_declared: HashSet<String>,
    labels_gotoed: Vec<String>,
    symbols: HashSet<String>,
}

fn next_token(lexer: &mut Lexer) -> Result<Token, CompileError> {
    let line = lexer.line();
    let token = lexer
        .next_token()
        .map_err(|source| CompileError::Lex { line, source })?;
    log::trace!("token {}", token);
    Ok(token)
}

impl ParseContext {
    pub fn new(mut lexer: Lexer) -> Result<Self, CompileError> {
        let current = next_token(&mut lexer)?;
        let peek = next_token(&mut lexer)?;

        Ok(ParseContext {
            lexer,
            emitter: Emitter::new(),
            current,
            peek,
            labels_declared: HashSet::new(),
            labels_gotoed: vec![],
            symbols: HashSet::new(),
        })
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn peek(&self) -> &Token {
        &self.peek
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current.kind() == kind
    }

    /// Shifts the lookahead into the current slot and pulls a new lookahead
    /// token. Returns the token that was current before the call.
    pub fn advance(&mut self) -> Result<Token, CompileError> {
        let fresh = next_token(&mut self.lexer)?;
        let next = std::mem::replace(&mut self.peek, fresh);
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Consumes the current token if it has the given kind, otherwise fails
    /// naming both the expected and the actual kind.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        if !self.check(kind) {
            return Err(CompileError::UnexpectedToken {
                line: self.current.line(),
                expected: kind,
                found: self.current.kind(),
            });
        }
        self.advance()
    }

    pub fn emit(&mut self, code: &str) {
        self.emitter.emit(code);
    }

    pub fn emit_line(&mut self, code: &str) {
        self.emitter.emit_line(code);
    }

    pub fn header_line(&mut self, code: &str) {
        self.emitter.header_line(code);
    }

    /// Registers a `LABEL` declaration; a label may only be declared once.
    pub fn declare_label(&mut self, label: &Token) -> Result<(), CompileError> {
        if !self.labels_declared.insert(label.text().to_owned()) {
            return Err(CompileError::DuplicateLabel {
                line: label.line(),
                label: label.text().to_owned(),
            });
        }
        Ok(())
    }

    /// Records a `GOTO` target. Validated by [`ParseContext::check_labels`]
    /// once the whole program has been read.
    pub fn use_label(&mut self, label: &str) {
        if !self.labels_gotoed.iter().any(|l| l == label) {
            self.labels_gotoed.push(label.to_owned());
        }
    }

    /// Fails on the first GOTO target, in source order, that no LABEL declares.
    pub fn check_labels(&self) -> Result<(), CompileError> {
        match self
            .labels_gotoed
            .iter()
            .find(|label| !self.labels_declared.contains(*label))
        {
            Some(label) => Err(CompileError::UndeclaredLabel(label.clone())),
            None => Ok(()),
        }
    }

    /// Returns true if this is the first time the variable is seen.
    pub fn declare_symbol(&mut self, name: &str) -> bool {
        self.symbols.insert(name.to_owned())
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.symbols.contains(name)
    }

    pub fn into_emitter(self) -> Emitter {
        self.emitter
    }
}
