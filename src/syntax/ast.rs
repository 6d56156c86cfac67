use super::precedence::Precedence;

pub(crate) const ANON_FN_NAME: &str = "__anon_expr";

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum Expression<'src> {
    Number(f64),
    VarRef(&'src str),
    Unary {
        op: char,
        operand: Box<Expression<'src>>,
    },
    Binary {
        lhs: Box<Expression<'src>>,
        op: char,
        rhs: Box<Expression<'src>>,
    },
    Call {
        callee: &'src str,
        args: Vec<Expression<'src>>,
    },
    VarDecl {
        id: &'src str,
        init: Option<Box<Expression<'src>>>,
    },
    If {
        condition: Box<Expression<'src>>,
        then_branch: Box<Expression<'src>>,
        else_branch: Option<Box<Expression<'src>>>,
    },
    While {
        condition: Box<Expression<'src>>,
        body: Box<Expression<'src>>,
    },
    Return(Box<Expression<'src>>),
    Print(Box<Expression<'src>>),
}

/// Signature of a function, or of a user-defined operator when
/// `is_operator` is set. Operator prototypes are named `unary<op>` or
/// `binary<op>`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) struct Prototype<'src> {
    pub name: String,
    pub params: Vec<&'src str>,
    pub is_operator: bool,
    pub precedence: Precedence,
}

impl<'src> Prototype<'src> {
    pub fn new(name: impl Into<String>, params: Vec<&'src str>) -> Self {
        Self {
            name: name.into(),
            params,
            is_operator: false,
            precedence: 0,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(ANON_FN_NAME, vec![])
    }

    pub fn is_anonymous(&self) -> bool {
        !self.is_operator && self.name == ANON_FN_NAME
    }

    pub fn is_unary_op(&self) -> bool {
        self.is_operator && self.params.len() == 1
    }

    pub fn is_binary_op(&self) -> bool {
        self.is_operator && self.params.len() == 2
    }

    pub fn operator(&self) -> Option<char> {
        if !self.is_operator {
            return None;
        }
        self.name.chars().last()
    }

    pub fn unary_name(op: char) -> String {
        format!("unary{op}")
    }

    pub fn binary_name(op: char) -> String {
        format!("binary{op}")
    }
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct FunctionDef<'src> {
    pub proto: Prototype<'src>,
    pub body: Box<Expression<'src>>,
}
