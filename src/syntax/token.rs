#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Func,
    Return,
    If,
    Then,
    Else,
    Fi,
    Do,
    While,
    Done,
    Continue,
    Print,
    Var,
    Binary,
    Unary,
}

impl Keyword {
    /// Keywords are matched case-sensitively, so `func` is an identifier.
    pub fn lookup(s: &str) -> Option<Self> {
        let kw = match s {
            "FUNC" => Self::Func,
            "RETURN" => Self::Return,
            "IF" => Self::If,
            "THEN" => Self::Then,
            "ELSE" => Self::Else,
            "FI" => Self::Fi,
            "DO" => Self::Do,
            "WHILE" => Self::While,
            "DONE" => Self::Done,
            "CONTINUE" => Self::Continue,
            "PRINT" => Self::Print,
            "VAR" => Self::Var,
            "BINARY" => Self::Binary,
            "UNARY" => Self::Unary,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Func => "FUNC",
            Self::Return => "RETURN",
            Self::If => "IF",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::Fi => "FI",
            Self::Do => "DO",
            Self::While => "WHILE",
            Self::Done => "DONE",
            Self::Continue => "CONTINUE",
            Self::Print => "PRINT",
            Self::Var => "VAR",
            Self::Binary => "BINARY",
            Self::Unary => "UNARY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token<'src> {
    Eof,
    Kw(Keyword),
    Id(&'src str),
    Number(f64),
    /// A digit/`.` run that is not a valid decimal numeral, e.g. `1.2.3`.
    Malformed(&'src str),
    /// `:=`
    Assign,
    /// Any other single character: punctuation or an operator.
    Char(char),
}

impl<'src> Token<'src> {
    pub const LPAREN: Self = Token::Char('(');
    pub const RPAREN: Self = Token::Char(')');
    pub const COMMA: Self = Token::Char(',');
    pub const SEMICOLON: Self = Token::Char(';');
}
