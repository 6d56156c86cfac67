use std::collections::{HashMap, HashSet};

/// Higher binds tighter. Zero is never an operator.
pub(crate) type Precedence = u32;

pub(crate) const DEFAULT_USER_PRECEDENCE: Precedence = 30;
pub(crate) const MAX_USER_PRECEDENCE: Precedence = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PrecedenceTable {
    binary: HashMap<char, Precedence>,
    unary: HashSet<char>,
}

impl PrecedenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `=` < `<` < `+ -` < `*`
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.set_binary('=', 2);
        table.set_binary('<', 10);
        table.set_binary('+', 20);
        table.set_binary('-', 20);
        table.set_binary('*', 40);
        table
    }

    pub fn set_binary(&mut self, op: char, prec: Precedence) {
        if prec == 0 {
            self.binary.remove(&op);
        } else {
            self.binary.insert(op, prec);
        }
    }

    pub fn add_unary(&mut self, op: char) {
        self.unary.insert(op);
    }

    pub fn binary(&self, op: char) -> Option<Precedence> {
        self.binary.get(&op).copied().filter(|prec| *prec > 0)
    }

    pub fn is_unary(&self, op: char) -> bool {
        self.unary.contains(&op)
    }
}
