use crate::{
    error::{ErrorKind, PResult},
    syntax::{
        ast::{FunctionDef, Prototype},
        lexer::Lexer,
        precedence::{Precedence, PrecedenceTable, DEFAULT_USER_PRECEDENCE, MAX_USER_PRECEDENCE},
        token::{Keyword, Token},
        ExprParser,
    },
};
use std::iter::Peekable;

pub(crate) struct Parser<'src> {
    pub(super) lexer: Peekable<Lexer<'src>>,
    pub(super) table: PrecedenceTable,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str) -> Self {
        Self::with_precedence(src, PrecedenceTable::standard())
    }

    pub fn with_precedence(src: &'src str, table: PrecedenceTable) -> Self {
        Self {
            lexer: Lexer::new(src).peekable(),
            table,
        }
    }

    pub fn precedence_table(&self) -> &PrecedenceTable {
        &self.table
    }

    pub fn precedence_table_mut(&mut self) -> &mut PrecedenceTable {
        &mut self.table
    }

    /// The lookahead token, `None` at end of input.
    pub fn current(&mut self) -> Option<Token<'src>> {
        self.lexer.peek().copied()
    }

    /// Drops the lookahead token. Used for error recovery.
    pub fn skip_token(&mut self) {
        self.bump();
    }

    /// `FUNC` prototype expression
    pub fn parse_definition(&mut self) -> PResult<FunctionDef<'src>> {
        self.expect_kw(Keyword::Func)?;
        let proto = self.parse_prototype()?;
        let body = self.parse_expr()?;

        Ok(FunctionDef { proto, body })
    }

    /// Wraps a free-standing expression into a nullary anonymous function.
    pub fn parse_top_level_expr(&mut self) -> PResult<FunctionDef<'src>> {
        let body = self.parse_expr()?;

        Ok(FunctionDef {
            proto: Prototype::anonymous(),
            body,
        })
    }

    pub fn parse_prototype(&mut self) -> PResult<Prototype<'src>> {
        let (name, arity, precedence) = match self.current() {
            Some(Token::Id(id)) => {
                self.bump();
                (id.to_string(), 0, 0)
            }
            Some(Token::Kw(Keyword::Unary)) => {
                self.bump();
                let op = self.parse_operator_char("unary")?;
                (Prototype::unary_name(op), 1, 0)
            }
            Some(Token::Kw(Keyword::Binary)) => {
                self.bump();
                let op = self.parse_operator_char("binary")?;
                let precedence = self.parse_operator_precedence()?;
                (Prototype::binary_name(op), 2, precedence)
            }
            other => {
                return Err(ErrorKind::ParseError(format!(
                    "Expected function name in prototype, found {}",
                    found(other)
                )))
            }
        };

        self.expect(Token::LPAREN)?;

        let mut params = vec![];
        while let Some(Token::Id(param)) = self.current() {
            params.push(param);
            self.bump();
        }

        self.expect(Token::RPAREN)?;

        if arity != 0 && params.len() != arity {
            return Err(ErrorKind::ParseError(format!(
                "Invalid number of operands for operator `{name}`: expected {arity}, found {}",
                params.len()
            )));
        }

        Ok(Prototype {
            name,
            params,
            is_operator: arity != 0,
            precedence,
        })
    }

    fn parse_operator_char(&mut self, kind: &str) -> PResult<char> {
        match self.current() {
            Some(Token::Char(c)) if c.is_ascii() && !matches!(c, '(' | ')' | ',' | ';') => {
                self.bump();
                Ok(c)
            }
            other => Err(ErrorKind::ParseError(format!(
                "Expected {kind} operator, found {}",
                found(other)
            ))),
        }
    }

    fn parse_operator_precedence(&mut self) -> PResult<Precedence> {
        match self.current() {
            Some(Token::Number(v)) => {
                if !(1.0..=MAX_USER_PRECEDENCE as f64).contains(&v) {
                    return Err(ErrorKind::ParseError(format!(
                        "Invalid precedence {v}: must be 1..{MAX_USER_PRECEDENCE}"
                    )));
                }
                self.bump();
                Ok(v as Precedence)
            }
            _ => Ok(DEFAULT_USER_PRECEDENCE),
        }
    }

    /// Precedence of the lookahead if it is a registered binary operator.
    pub(super) fn current_binop(&mut self) -> Option<(char, Precedence)> {
        match self.current() {
            Some(Token::Char(op)) => self.table.binary(op).map(|prec| (op, prec)),
            _ => None,
        }
    }

    pub(super) fn parse_id(&mut self) -> PResult<&'src str> {
        match self.current() {
            Some(Token::Id(id)) => {
                self.bump();
                Ok(id)
            }
            other => Err(ErrorKind::ParseError(format!(
                "Expected identifier, found {}",
                found(other)
            ))),
        }
    }

    #[inline(always)]
    pub(super) fn bump(&mut self) {
        let _ = self.lexer.next();
    }

    /// Consumes the lookahead only when it matches.
    pub(super) fn expect(&mut self, expected: Token) -> PResult<()> {
        match self.current() {
            Some(token) if token == expected => {
                self.bump();
                Ok(())
            }
            other => Err(ErrorKind::ParseError(format!(
                "Expected {expected:?}, found {}",
                found(other)
            ))),
        }
    }

    pub(super) fn expect_kw(&mut self, kw: Keyword) -> PResult<()> {
        match self.current() {
            Some(Token::Kw(found_kw)) if found_kw == kw => {
                self.bump();
                Ok(())
            }
            other => Err(ErrorKind::ParseError(format!(
                "Expected {}, found {}",
                kw.as_str(),
                found(other)
            ))),
        }
    }
}

pub(super) fn found(token: Option<Token>) -> String {
    match token {
        None => "EOF".into(),
        Some(token) => format!("{token:?}"),
    }
}
