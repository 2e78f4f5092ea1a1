use std::fmt;

use crate::{
    ast::Literal,
    diagnostics::{Diagnostic, SourceSpan},
};

/// The three bracket shapes. The lexer keeps the shape so the parser can
/// check that an opening bracket is closed by the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Paren,
    Square,
    Curly,
}

impl Bracket {
    fn from_open(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Bracket::Paren),
            '[' => Some(Bracket::Square),
            '{' => Some(Bracket::Curly),
            _ => None,
        }
    }

    fn from_close(ch: char) -> Option<Self> {
        match ch {
            ')' => Some(Bracket::Paren),
            ']' => Some(Bracket::Square),
            '}' => Some(Bracket::Curly),
            _ => None,
        }
    }

    pub fn open_char(self) -> char {
        match self {
            Bracket::Paren => '(',
            Bracket::Square => '[',
            Bracket::Curly => '{',
        }
    }

    pub fn close_char(self) -> char {
        match self {
            Bracket::Paren => ')',
            Bracket::Square => ']',
            Bracket::Curly => '}',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Literal(Literal),
    Identifier(String),
    Newline,
    OpenBracket(Bracket),
    CloseBracket(Bracket),
    Assign,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Literal(lit) => write!(f, "literal `{lit}`"),
            TokenKind::Identifier(name) => write!(f, "identifier `{name}`"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::OpenBracket(b) => write!(f, "`{}`", b.open_char()),
            TokenKind::CloseBracket(b) => write!(f, "`{}`", b.close_char()),
            TokenKind::Assign => write!(f, "`:=`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: SourceSpan,
}

/// Single-character words that never merge with their neighbours.
const OPERATOR_SYMBOLS: [char; 6] = ['+', '-', '*', '/', '%', '='];

fn is_operator(ch: char) -> bool {
    OPERATOR_SYMBOLS.contains(&ch)
}

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r')
}

fn is_separator(ch: char) -> bool {
    is_blank(ch)
        || matches!(
            ch,
            '\n' | ':' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\''
        )
}

/// Convenience wrapper over [`Lexer::tokenize`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, Diagnostic> {
    Lexer::new(source).tokenize()
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: usize,
    peeked: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = match self.peeked.take() {
            Some(pair) => Some(pair),
            None => self.chars.next(),
        };
        if let Some((idx, ch)) = next {
            self.current = idx + ch.len_utf8();
        }
        next
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn match_next(&mut self, expected: char) -> bool {
        match self.peek() {
            Some((_, ch)) if ch == expected => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn eat_while<F>(&mut self, mut predicate: F)
    where
        F: FnMut(char) -> bool,
    {
        while let Some((_, ch)) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.bump();
        }
    }

    fn skip_blanks(&mut self) {
        self.eat_while(is_blank);
    }

    fn token(&self, start: usize, kind: TokenKind) -> Token {
        let end = self.current;
        Token {
            kind,
            lexeme: self.source[start..end].to_string(),
            span: SourceSpan::new(start, end),
        }
    }

    fn identifier(&mut self, start: usize) -> Token {
        self.eat_while(|ch| !is_separator(ch) && !is_operator(ch));
        let name = self.source[start..self.current].to_string();
        self.token(start, TokenKind::Identifier(name))
    }

    fn colon(&mut self, start: usize) -> Token {
        if self.match_next('=') {
            self.token(start, TokenKind::Assign)
        } else {
            self.token(start, TokenKind::Identifier(":".into()))
        }
    }

    fn number_literal(&mut self, start: usize) -> Result<Token, Diagnostic> {
        self.eat_while(|ch| ch.is_ascii_digit());
        let is_float = self.match_next('.');
        if is_float {
            self.eat_while(|ch| ch.is_ascii_digit());
        }
        let lexeme = &self.source[start..self.current];
        let span = SourceSpan::new(start, self.current);
        let literal = if is_float {
            // `1.` is accepted and means `1.0`
            let text = if lexeme.ends_with('.') {
                format!("{lexeme}0")
            } else {
                lexeme.to_string()
            };
            text.parse::<f64>().map(Literal::Float).map_err(|_| {
                Diagnostic::lexical(format!("invalid float literal `{lexeme}`")).with_span(span)
            })?
        } else {
            lexeme.parse::<i64>().map(Literal::Int).map_err(|_| {
                Diagnostic::lexical(format!("integer literal `{lexeme}` is out of range"))
                    .with_span(span)
            })?
        };
        Ok(self.token(start, TokenKind::Literal(literal)))
    }

    fn string_literal(&mut self, start: usize, quote: char) -> Result<Token, Diagnostic> {
        let mut value = String::new();
        loop {
            let Some((idx, ch)) = self.bump() else {
                return Err(Diagnostic::lexical("unterminated string literal")
                    .with_span(SourceSpan::new(start, self.current)));
            };
            match ch {
                c if c == quote => break,
                '\n' => {
                    return Err(Diagnostic::lexical("unexpected end of line in string literal")
                        .with_span(SourceSpan::new(start, idx)));
                }
                '\\' => self.escape(start, &mut value)?,
                _ => value.push(ch),
            }
        }
        Ok(self.token(start, TokenKind::Literal(Literal::String(value))))
    }

    fn escape(&mut self, start: usize, value: &mut String) -> Result<(), Diagnostic> {
        let Some((idx, esc)) = self.bump() else {
            return Err(Diagnostic::lexical("unterminated string literal")
                .with_span(SourceSpan::new(start, self.current)));
        };
        let decoded = match esc {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'x' => self.hex_escape(idx - 1, 2)?,
            'u' => self.hex_escape(idx - 1, 4)?,
            'U' => self.hex_escape(idx - 1, 8)?,
            other => {
                value.push('\\');
                other
            }
        };
        value.push(decoded);
        Ok(())
    }

    fn hex_escape(&mut self, start: usize, digits: usize) -> Result<char, Diagnostic> {
        let mut code: u32 = 0;
        for _ in 0..digits {
            match self.peek().and_then(|(_, ch)| ch.to_digit(16)) {
                Some(digit) => {
                    self.bump();
                    code = code * 16 + digit;
                }
                None => {
                    return Err(Diagnostic::lexical(format!(
                        "expected {digits} hex digits after escape sequence"
                    ))
                    .with_span(SourceSpan::new(start, self.current)));
                }
            }
        }
        char::from_u32(code).ok_or_else(|| {
            Diagnostic::lexical(format!("escape sequence encodes invalid code point {code:#x}"))
                .with_span(SourceSpan::new(start, self.current))
        })
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            self.skip_blanks();
            let Some((start, ch)) = self.bump() else {
                break;
            };
            let token = match ch {
                '\n' => self.token(start, TokenKind::Newline),
                ':' => self.colon(start),
                '0'..='9' => self.number_literal(start)?,
                '"' | '\'' => self.string_literal(start, ch)?,
                _ => {
                    if let Some(bracket) = Bracket::from_open(ch) {
                        self.token(start, TokenKind::OpenBracket(bracket))
                    } else if let Some(bracket) = Bracket::from_close(ch) {
                        self.token(start, TokenKind::CloseBracket(bracket))
                    } else if is_operator(ch) {
                        self.token(start, TokenKind::Identifier(ch.to_string()))
                    } else {
                        self.identifier(start)
                    }
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }
}
