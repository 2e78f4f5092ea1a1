//! Recursive-descent parser.
//!
//! ```text
//! program ::= (decl | expr)*
//! decl    ::= IDENT ':=' expr
//! expr    ::= atom*
//! atom    ::= LITERAL | IDENT | '[' expr ']' | '{' expr '}'
//! ```
//!
//! A line is a declaration exactly when its second token is `:=`. There is no
//! precedence: atoms run left to right. Brackets nest at most
//! [`MAX_NESTING_DEPTH`] levels deep.

use std::rc::Rc;

use crate::{
    ast::{Atom, AtomKind, Decl, Expr, Identifier, Program, Stmt, StmtKind},
    diagnostics::{Diagnostic, SourceSpan},
    lexer::{Bracket, Lexer, Token, TokenKind},
};

pub const MAX_NESTING_DEPTH: usize = 256;

pub fn parse_program(source: &str) -> Result<Program, Diagnostic> {
    let tokens = Lexer::new(source).tokenize()?;
    parse(tokens)
}

pub fn parse(tokens: Vec<Token>) -> Result<Program, Diagnostic> {
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
    end_of_input: usize,
    /// Brackets currently open.
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        let end_of_input = tokens.last().map(|tok| tok.span.end).unwrap_or(0);
        Self {
            tokens,
            current: 0,
            end_of_input,
            depth: 0,
        }
    }

    fn parse_program(&mut self) -> Result<Program, Diagnostic> {
        let mut statements = Vec::new();
        while let Some(token) = self.peek() {
            match &token.kind {
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::CloseBracket(bracket) => {
                    return Err(self.error(
                        token,
                        &format!("unexpected `{}` without an opening bracket", bracket.close_char()),
                    ));
                }
                _ => statements.push(self.parse_statement()?),
            }
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt, Diagnostic> {
        if self.is_declaration() {
            return self.parse_declaration();
        }
        let expr = self.parse_expression()?;
        Ok(Stmt {
            span: expr.span,
            kind: StmtKind::Expr(expr),
        })
    }

    fn is_declaration(&self) -> bool {
        matches!(
            self.tokens.get(self.current + 1).map(|tok| &tok.kind),
            Some(TokenKind::Assign)
        )
    }

    fn parse_declaration(&mut self) -> Result<Stmt, Diagnostic> {
        let name = self.consume_identifier("expected a name at the start of a declaration")?;
        let assign = self.consume_assign("expected `:=` after declaration name")?;
        let expr = self.parse_expression()?;
        let end = if expr.is_empty() {
            assign.span.end
        } else {
            expr.span.end
        };
        Ok(Stmt {
            span: SourceSpan::new(name.span.start, end),
            kind: StmtKind::Decl(Decl {
                name,
                expr: Rc::new(expr),
            }),
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        let start = self
            .peek()
            .map(|tok| tok.span.start)
            .unwrap_or(self.end_of_input);
        let mut atoms = Vec::new();
        while let Some(token) = self.peek() {
            if matches!(token.kind, TokenKind::Newline | TokenKind::CloseBracket(_)) {
                break;
            }
            atoms.push(self.parse_atom()?);
        }
        let end = atoms.last().map(|atom| atom.span.end).unwrap_or(start);
        Ok(Expr {
            atoms,
            span: SourceSpan::new(start, end),
        })
    }

    fn parse_atom(&mut self) -> Result<Atom, Diagnostic> {
        let token = self
            .advance()
            .ok_or_else(|| self.error_eof("unexpected end of input, expected an atom"))?;
        let kind = match token.kind {
            TokenKind::Literal(lit) => AtomKind::Literal(lit),
            TokenKind::Identifier(name) => AtomKind::Identifier(name),
            TokenKind::OpenBracket(open) => return self.parse_bracketed(open, token.span),
            TokenKind::Assign => {
                return Err(Diagnostic::parse(
                    "unexpected `:=`; a declaration is a single name followed by `:=`",
                )
                .with_span(token.span));
            }
            other => {
                return Err(
                    Diagnostic::parse(format!("unexpected {other}")).with_span(token.span)
                );
            }
        };
        Ok(Atom {
            kind,
            span: token.span,
        })
    }

    fn parse_bracketed(&mut self, open: Bracket, open_span: SourceSpan) -> Result<Atom, Diagnostic> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(Diagnostic::parse("brackets nested too deeply")
                .with_span(open_span)
                .with_note(format!("at most {MAX_NESTING_DEPTH} levels are allowed")));
        }
        self.depth += 1;
        let inner = self.parse_expression();
        self.depth -= 1;
        let inner = inner?;
        let close = match self.peek() {
            Some(Token {
                kind: TokenKind::CloseBracket(close),
                span,
                ..
            }) => (*close, *span),
            Some(other) => {
                return Err(self
                    .error(
                        other,
                        &format!(
                            "expected `{}` but found {}",
                            open.close_char(),
                            other.kind
                        ),
                    )
                    .with_note(opened_at(open, open_span)));
            }
            None => {
                return Err(self
                    .error_eof(&format!(
                        "unexpected end of input, expected `{}`",
                        open.close_char()
                    ))
                    .with_note(opened_at(open, open_span)));
            }
        };
        self.advance();
        let (close, close_span) = close;
        let span = SourceSpan::new(open_span.start, close_span.end);
        if close != open {
            return Err(Diagnostic::parse(format!(
                "mismatched brackets: `{}` closed by `{}`",
                open.open_char(),
                close.close_char()
            ))
            .with_span(span));
        }
        let kind = match open {
            Bracket::Square => AtomKind::Quotation(Rc::new(inner)),
            Bracket::Curly => AtomKind::ListBlock(inner),
            Bracket::Paren => {
                return Err(
                    Diagnostic::parse("parenthesised groups are not supported").with_span(span)
                );
            }
        };
        Ok(Atom { kind, span })
    }

    fn consume_identifier(&mut self, message: &str) -> Result<Identifier, Diagnostic> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                span,
                ..
            }) => {
                let ident = Identifier {
                    name: name.clone(),
                    span: *span,
                };
                self.advance();
                Ok(ident)
            }
            Some(other) => Err(self.error(other, &format!("{message}, found {}", other.kind))),
            None => Err(self.error_eof(message)),
        }
    }

    fn consume_assign(&mut self, message: &str) -> Result<Token, Diagnostic> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Assign => {
                self.advance().ok_or_else(|| self.error_eof(message))
            }
            Some(other) => Err(self.error(other, &format!("{message}, found {}", other.kind))),
            None => Err(self.error_eof(message)),
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn error(&self, token: &Token, message: &str) -> Diagnostic {
        Diagnostic::parse(message).with_span(token.span)
    }

    fn error_eof(&self, message: &str) -> Diagnostic {
        Diagnostic::parse(message).with_span(SourceSpan::point(self.end_of_input))
    }
}

fn opened_at(open: Bracket, span: SourceSpan) -> String {
    format!("`{}` opened at {}..{}", open.open_char(), span.start, span.end)
}
