use crate::{
    error::ErrorKind,
    syntax::{FunctionDef, Keyword, Parser, PrecedenceTable, Prototype, Token},
};

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum TopLevel<'src> {
    Definition(FunctionDef<'src>),
    Expression(FunctionDef<'src>),
    Error(ErrorKind),
}

/// Pulls top-level units out of a source one at a time. A unit that fails
/// to parse is reported and its offending token skipped, so parsing
/// resumes with the next unit.
pub(crate) struct Driver<'src> {
    parser: Parser<'src>,
}

impl<'src> Iterator for Driver<'src> {
    type Item = TopLevel<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.parser.current() {
                None => return None,
                Some(token) if token == Token::SEMICOLON => self.parser.skip_token(),
                Some(Token::Kw(Keyword::Func)) => return Some(self.handle_definition()),
                Some(_) => return Some(self.handle_top_level_expr()),
            }
        }
    }
}

impl<'src> Driver<'src> {
    pub fn new(src: &'src str) -> Self {
        Self::with_precedence(src, PrecedenceTable::standard())
    }

    pub fn with_precedence(src: &'src str, table: PrecedenceTable) -> Self {
        Self {
            parser: Parser::with_precedence(src, table),
        }
    }

    pub fn precedence_table(&self) -> &PrecedenceTable {
        self.parser.precedence_table()
    }

    fn handle_definition(&mut self) -> TopLevel<'src> {
        match self.parser.parse_definition() {
            Ok(def) => {
                log::debug!("Parsed a function definition `{}`", def.proto.name);
                self.register_operator(&def.proto);
                TopLevel::Definition(def)
            }
            Err(why) => self.recover(why),
        }
    }

    fn handle_top_level_expr(&mut self) -> TopLevel<'src> {
        match self.parser.parse_top_level_expr() {
            Ok(def) => {
                log::debug!("Parsed a top-level expression");
                TopLevel::Expression(def)
            }
            Err(why) => self.recover(why),
        }
    }

    fn register_operator(&mut self, proto: &Prototype<'src>) {
        let table = self.parser.precedence_table_mut();

        match proto.operator() {
            Some(op) if proto.is_binary_op() => {
                log::debug!("Installing binary operator `{op}` with precedence {}", proto.precedence);
                table.set_binary(op, proto.precedence);
            }
            Some(op) if proto.is_unary_op() => {
                log::debug!("Installing unary operator `{op}`");
                table.add_unary(op);
            }
            _ => (),
        }
    }

    fn recover(&mut self, why: ErrorKind) -> TopLevel<'src> {
        log::error!("{why}");
        self.parser.skip_token();
        TopLevel::Error(why)
    }
}
