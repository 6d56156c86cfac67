use std::{iter::Peekable, str::CharIndices};

use super::token::{Keyword, Token};

pub(crate) struct Lexer<'src> {
    src: &'src str,
    chars: Peekable<CharIndices<'src>>,
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Token::Eof => None,
            token => Some(token),
        }
    }
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    /// Returns the next token, or `Token::Eof` on every call once the
    /// input is exhausted.
    pub fn next_token(&mut self) -> Token<'src> {
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }

        let (off, c) = match self.chars.next() {
            None => return Token::Eof,
            Some(next) => next,
        };

        if c.is_ascii_alphabetic() {
            return self.read_id(off);
        }
        if c.is_ascii_digit() || c == '.' {
            return self.read_number(off);
        }
        if c == ':' {
            if let Some(&(_, '=')) = self.chars.peek() {
                self.bump();
                return Token::Assign;
            }
        }

        Token::Char(c)
    }

    #[inline]
    fn bump(&mut self) {
        let _ = self.chars.next();
    }

    fn slice_until<P>(&mut self, from_off: usize, predicate: P) -> &'src str
    where
        P: Fn(char) -> bool,
    {
        while let Some(&(off, c)) = self.chars.peek() {
            if predicate(c) {
                return &self.src[from_off..off];
            }
            self.bump();
        }
        &self.src[from_off..self.src.len()]
    }

    fn read_number(&mut self, from_off: usize) -> Token<'src> {
        let s = self.slice_until(from_off, |c| !(c.is_ascii_digit() || c == '.'));

        if s.matches('.').count() > 1 {
            return Token::Malformed(s);
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Token::Number(v),
            _ => Token::Malformed(s),
        }
    }

    fn read_id(&mut self, from_off: usize) -> Token<'src> {
        let s = self.slice_until(from_off, |c| !c.is_ascii_alphanumeric());
        match Keyword::lookup(s) {
            Some(kw) => Token::Kw(kw),
            None => Token::Id(s),
        }
    }
}
