use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum ErrorKind {
    LexError(String),
    ParseError(String),
    CodegenError(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexError(msg) => write!(f, "lex error: {msg}"),
            Self::ParseError(msg) => write!(f, "parse error: {msg}"),
            Self::CodegenError(msg) => write!(f, "codegen error: {msg}"),
        }
    }
}

impl std::error::Error for ErrorKind {}

pub(crate) type PResult<T> = Result<T, ErrorKind>;
