use std::fmt::Display;

use thiserror::Error;

/// Character reported once the cursor has moved past the end of the source.
pub const EOF_CHAR: char = '\0';

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum LexError {
    #[error("illegal character {0:?} in string")]
    IllegalStringChar(char),
    #[error("illegal character {0:?} in number")]
    IllegalNumberChar(char),
    #[error("expected `!=`, got `!` followed by {0:?}")]
    ExpectedNotEquals(char),
    #[error("unknown token {0:?}")]
    UnknownToken(char),
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TokenKind {
    Eof,
    Newline,
    Number,
    Ident,
    String,
    // Keywords
    Label,
    Goto,
    Print,
    Input,
    Let,
    If,
    Then,
    EndIf,
    While,
    Repeat,
    EndWhile,
    // Operators
    Eq,
    Plus,
    Minus,
    Asterisk,
    Slash,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("LABEL", TokenKind::Label),
    ("GOTO", TokenKind::Goto),
    ("PRINT", TokenKind::Print),
    ("INPUT", TokenKind::Input),
    ("LET", TokenKind::Let),
    ("IF", TokenKind::If),
    ("THEN", TokenKind::Then),
    ("ENDIF", TokenKind::EndIf),
    ("WHILE", TokenKind::While),
    ("REPEAT", TokenKind::Repeat),
    ("ENDWHILE", TokenKind::EndWhile),
];

impl TokenKind {
    /// Looks up a scanned alphabetic run in the keyword table.
    /// Matching is exact, so `print` and `Print` are identifiers.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == text)
            .map(|&(_, kind)| kind)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::Gt
                | TokenKind::GtEq
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Number => "NUMBER",
            TokenKind::Ident => "IDENT",
            TokenKind::String => "STRING",
            TokenKind::Label => "LABEL",
            TokenKind::Goto => "GOTO",
            TokenKind::Print => "PRINT",
            TokenKind::Input => "INPUT",
            TokenKind::Let => "LET",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::EndIf => "ENDIF",
            TokenKind::While => "WHILE",
            TokenKind::Repeat => "REPEAT",
            TokenKind::EndWhile => "ENDWHILE",
            TokenKind::Eq => "EQ",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Slash => "SLASH",
            TokenKind::EqEq => "EQEQ",
            TokenKind::NotEq => "NOTEQ",
            TokenKind::Lt => "LT",
            TokenKind::LtEq => "LTEQ",
            TokenKind::Gt => "GT",
            TokenKind::GtEq => "GTEQ",
        };
        f.pad(name)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    text: String,
    kind: TokenKind,
    line: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, line: usize) -> Self {
        Token {
            text: text.into(),
            kind,
            line,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// 1-based line the token starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof | TokenKind::Newline => write!(f, "{}", self.kind),
            _ => write!(f, "{} `{}`", self.kind, self.text),
        }
    }
}

/// Hand-rolled scanner over the whole source text.
///
/// The cursor always sits one character past the last character of the
/// most recently returned token. A line terminator is appended to the
/// source so the final statement ends like every other one.
#[derive(Debug)]
pub struct Lexer {
    src: Vec<char>,
    pos: usize,
    curr: char,
    line: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        let mut chars: Vec<char> = src.chars().collect();
        chars.push('\n');
        let curr = chars[0];
        Lexer {
            src: chars,
            pos: 0,
            curr,
            line: 1,
            finished: false,
        }
    }

    /// Line the cursor is currently on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the character after the current one without consuming anything.
    pub fn peek_char(&self) -> char {
        self.src.get(self.pos + 1).copied().unwrap_or(EOF_CHAR)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn advance(&mut self) {
        if self.pos < self.src.len() {
            self.pos += 1;
        }
        self.curr = self.src.get(self.pos).copied().unwrap_or(EOF_CHAR);
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.curr, ' ' | '\t' | '\r') {
            self.advance();
        }
    }

    fn skip_comment(&mut self) {
        if self.curr == '#' {
            while self.curr != '\n' && !self.at_end() {
                self.advance();
            }
        }
    }

    fn span(&self, start: usize, end: usize) -> String {
        self.src[start..end].iter().collect()
    }

    fn parse_char(&self, kind: TokenKind) -> Token {
        Token::new(self.curr, kind, self.line)
    }

    /// Handles `=`, `>` and `<`, which may be followed by a second `=`.
    fn parse_compound(&mut self, single: TokenKind, double: TokenKind) -> Token {
        if self.peek_char() == '=' {
            let first = self.curr;
            self.advance();
            Token::new(format!("{}=", first), double, self.line)
        } else {
            self.parse_char(single)
        }
    }

    fn parse_not_equals(&mut self) -> Result<Token, LexError> {
        match self.peek_char() {
            '=' => {
                self.advance();
                Ok(Token::new("!=", TokenKind::NotEq, self.line))
            }
            c => Err(LexError::ExpectedNotEquals(c)),
        }
    }

    fn parse_string(&mut self) -> Result<Token, LexError> {
        // Skip the opening quote; the quotes are not part of the text
        self.advance();
        let start = self.pos;

        while self.curr != '"' {
            match self.curr {
                '\r' | '\n' | '\t' | '\\' | '%' => {
                    return Err(LexError::IllegalStringChar(self.curr));
                }
                _ if self.at_end() => return Err(LexError::IllegalStringChar(EOF_CHAR)),
                _ => self.advance(),
            }
        }

        Ok(Token::new(
            self.span(start, self.pos),
            TokenKind::String,
            self.line,
        ))
    }

    fn parse_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        while self.peek_char().is_ascii_digit() {
            self.advance();
        }

        if self.peek_char() == '.' {
            self.advance();

            // Must have at least one digit after the decimal point
            let next = self.peek_char();
            if !next.is_ascii_digit() {
                return Err(LexError::IllegalNumberChar(next));
            }
            while self.peek_char().is_ascii_digit() {
                self.advance();
            }
        }

        Ok(Token::new(
            self.span(start, self.pos + 1),
            TokenKind::Number,
            self.line,
        ))
    }

    fn parse_word(&mut self) -> Token {
        let start = self.pos;
        while self.peek_char().is_ascii_alphabetic() {
            self.advance();
        }

        let text = self.span(start, self.pos + 1);
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Ident);
        Token::new(text, kind, self.line)
    }

    /// Produces the next token. Once the end of input has been reached every
    /// further call returns another `Eof` token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.skip_comment();

        if self.at_end() {
            return Ok(Token::new(EOF_CHAR, TokenKind::Eof, self.line));
        }

        let token = match self.curr {
            '+' => self.parse_char(TokenKind::Plus),
            '-' => self.parse_char(TokenKind::Minus),
            '*' => self.parse_char(TokenKind::Asterisk),
            '/' => self.parse_char(TokenKind::Slash),
            '=' => self.parse_compound(TokenKind::Eq, TokenKind::EqEq),
            '>' => self.parse_compound(TokenKind::Gt, TokenKind::GtEq),
            '<' => self.parse_compound(TokenKind::Lt, TokenKind::LtEq),
            '!' => self.parse_not_equals()?,
            '"' => self.parse_string()?,
            '\n' => {
                let token = self.parse_char(TokenKind::Newline);
                self.line += 1;
                token
            }
            c if c.is_ascii_digit() => self.parse_number()?,
            c if c.is_ascii_alphabetic() => self.parse_word(),
            c => return Err(LexError::UnknownToken(c)),
        };

        self.advance();
        Ok(token)
    }
}

/// Yields every token up to and including the single `Eof` token, or up to
/// the first error.
impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_token();
        self.finished = !matches!(&result, Ok(token) if !token.is_eof());
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .map(|result| result.unwrap().kind())
            .collect()
    }

    #[rstest]
    #[case("+", TokenKind::Plus)]
    #[case("-", TokenKind::Minus)]
    #[case("*", TokenKind::Asterisk)]
    #[case("/", TokenKind::Slash)]
    #[case("=", TokenKind::Eq)]
    #[case("==", TokenKind::EqEq)]
    #[case("!=", TokenKind::NotEq)]
    #[case(">", TokenKind::Gt)]
    #[case(">=", TokenKind::GtEq)]
    #[case("<", TokenKind::Lt)]
    #[case("<=", TokenKind::LtEq)]
    fn test_lexer_operator(#[case] src: &str, #[case] expected: TokenKind) {
        let token = Lexer::new(src).next_token().unwrap();
        assert_eq!(token, Token::new(src, expected, 1));
    }

    #[rstest]
    #[case("LABEL", TokenKind::Label)]
    #[case("GOTO", TokenKind::Goto)]
    #[case("PRINT", TokenKind::Print)]
    #[case("INPUT", TokenKind::Input)]
    #[case("LET", TokenKind::Let)]
    #[case("IF", TokenKind::If)]
    #[case("THEN", TokenKind::Then)]
    #[case("ENDIF", TokenKind::EndIf)]
    #[case("WHILE", TokenKind::While)]
    #[case("REPEAT", TokenKind::Repeat)]
    #[case("ENDWHILE", TokenKind::EndWhile)]
    #[case("print", TokenKind::Ident)]
    #[case("LABELS", TokenKind::Ident)]
    #[case("foo", TokenKind::Ident)]
    fn test_lexer_word(#[case] src: &str, #[case] expected: TokenKind) {
        let token = Lexer::new(src).next_token().unwrap();
        assert_eq!(token.kind(), expected);
        assert_eq!(token.text(), src);
    }

    #[test]
    fn test_lexer_identifier_stops_at_digit() {
        let mut lexer = Lexer::new("ab1");
        assert_eq!(lexer.next_token().unwrap(), Token::new("ab", TokenKind::Ident, 1));
        assert_eq!(lexer.next_token().unwrap(), Token::new("1", TokenKind::Number, 1));
    }

    #[rstest]
    #[case("123")]
    #[case("367.52")]
    #[case("0.5")]
    fn test_lexer_number(#[case] src: &str) {
        let token = Lexer::new(src).next_token().unwrap();
        assert_eq!(token, Token::new(src, TokenKind::Number, 1));
    }

    #[rstest]
    #[case("1.", '\n')]
    #[case("1.x", 'x')]
    #[case("12. ", ' ')]
    fn test_lexer_number_trailing_point(#[case] src: &str, #[case] found: char) {
        let result = Lexer::new(src).next_token();
        assert_eq!(result, Err(LexError::IllegalNumberChar(found)));
    }

    #[test]
    fn test_lexer_string_excludes_quotes() {
        let token = Lexer::new("\"hello world\"").next_token().unwrap();
        assert_eq!(token, Token::new("hello world", TokenKind::String, 1));
    }

    #[rstest]
    #[case("\"\tab\"", '\t')]
    #[case("\"a\tb\"", '\t')]
    #[case("\"ab\r\"", '\r')]
    #[case("\"a\\nb\"", '\\')]
    #[case("\"100%\"", '%')]
    #[case("\"unterminated", '\n')]
    fn test_lexer_string_illegal_char(#[case] src: &str, #[case] found: char) {
        let result = Lexer::new(src).next_token();
        assert_eq!(result, Err(LexError::IllegalStringChar(found)));
    }

    #[rstest]
    #[case("!", '\n')]
    #[case("!x", 'x')]
    fn test_lexer_bang_without_equals(#[case] src: &str, #[case] found: char) {
        let result = Lexer::new(src).next_token();
        assert_eq!(result, Err(LexError::ExpectedNotEquals(found)));
    }

    #[rstest]
    #[case("@", '@')]
    #[case("(", '(')]
    #[case("_x", '_')]
    fn test_lexer_unknown_token(#[case] src: &str, #[case] found: char) {
        let result = Lexer::new(src).next_token();
        assert_eq!(result, Err(LexError::UnknownToken(found)));
    }

    #[test]
    fn test_lexer_skips_whitespace_and_comments() {
        assert_eq!(
            kinds("  LET\tx = 1 # set x\r\n# whole line\nPRINT x"),
            vec![
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Print,
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_tutorial_input() {
        assert_eq!(
            kinds("IF+-123\"\" 367.52 foo*THEN"),
            vec![
                TokenKind::If,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::String,
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Asterisk,
                TokenKind::Then,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_eof_is_idempotent() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().unwrap().kind(), TokenKind::Newline);
        for _ in 0..3 {
            assert!(lexer.next_token().unwrap().is_eof());
        }
    }

    #[test]
    fn test_lexer_iterator_yields_single_eof() {
        let tokens: Vec<_> = Lexer::new("GOTO a\n\n").collect();
        let eofs = tokens
            .iter()
            .filter(|result| matches!(result, Ok(token) if token.is_eof()))
            .count();
        assert_eq!(eofs, 1);
        assert!(tokens.last().unwrap().as_ref().unwrap().is_eof());
    }

    #[test]
    fn test_lexer_iterator_stops_after_error() {
        let results: Vec<_> = Lexer::new("LET x = 1\n$\nPRINT x").collect();
        assert_eq!(results.len(), 6);
        assert_eq!(results[5], Err(LexError::UnknownToken('$')));
    }

    #[test]
    fn test_lexer_tracks_lines() {
        let lines: Vec<_> = Lexer::new("PRINT\n\nGOTO")
            .map(|result| result.unwrap().line())
            .collect();
        assert_eq!(lines, vec![1, 1, 2, 3, 3, 4]);
    }

    #[test]
    fn test_lexer_peek_char_does_not_consume() {
        let mut lexer = Lexer::new("ab");
        assert_eq!(lexer.peek_char(), 'b');
        assert_eq!(lexer.peek_char(), 'b');
        assert_eq!(lexer.next_token().unwrap().text(), "ab");
    }
}
