use crate::error::{ErrorKind, PResult};

use super::{
    parser::found,
    precedence::Precedence,
    token::{Keyword, Token},
    ExprParser, Expression, Parser,
};

impl<'src> ExprParser<'src> for Parser<'src> {
    fn parse_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        let lhs = self.parse_unary_expr()?;
        self.parse_bin_op_rhs(0, lhs)
    }

    /// Precedence climbing over the table: equal precedences group to the
    /// left, a tighter follow-on operator claims the right operand first.
    fn parse_bin_op_rhs(
        &mut self,
        min_prec: Precedence,
        mut lhs: Box<Expression<'src>>,
    ) -> PResult<Box<Expression<'src>>> {
        loop {
            let (op, prec) = match self.current_binop() {
                Some((op, prec)) if prec >= min_prec => (op, prec),
                _ => return Ok(lhs),
            };
            self.bump();

            let mut rhs = self.parse_unary_expr()?;

            if let Some((_, next_prec)) = self.current_binop() {
                if prec < next_prec {
                    rhs = self.parse_bin_op_rhs(prec + 1, rhs)?;
                }
            }

            lhs = Box::new(Expression::Binary { lhs, op, rhs });
        }
    }

    fn parse_unary_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        match self.current() {
            Some(Token::Char(op)) if self.table.is_unary(op) => {
                self.bump();
                let operand = self.parse_unary_expr()?;
                Ok(Box::new(Expression::Unary { op, operand }))
            }
            _ => self.parse_primary_expr(),
        }
    }

    fn parse_primary_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        match self.current() {
            Some(Token::Number(v)) => {
                self.bump();
                Ok(Box::new(Expression::Number(v)))
            }
            Some(Token::Malformed(s)) => Err(ErrorKind::LexError(format!(
                "Malformed number literal `{s}`"
            ))),
            Some(Token::Id(id)) => {
                self.bump();
                self.parse_id_expr(id)
            }
            Some(Token::Char('(')) => self.parse_grouping_expr(),
            Some(Token::Kw(Keyword::If)) => self.parse_if_expr(),
            Some(Token::Kw(Keyword::While)) => self.parse_while_expr(),
            Some(Token::Kw(Keyword::Var)) => self.parse_var_expr(),
            Some(Token::Kw(Keyword::Return)) => self.parse_return_expr(),
            Some(Token::Kw(Keyword::Print)) => self.parse_print_expr(),
            other => Err(ErrorKind::ParseError(format!(
                "Unexpected token {} when expecting an expression",
                found(other)
            ))),
        }
    }

    fn parse_id_expr(&mut self, id: &'src str) -> PResult<Box<Expression<'src>>> {
        match self.current() {
            Some(Token::Char('(')) => {
                self.bump();
                self.parse_call_expr(id)
            }
            _ => Ok(Box::new(Expression::VarRef(id))),
        }
    }

    fn parse_call_expr(&mut self, callee: &'src str) -> PResult<Box<Expression<'src>>> {
        let mut args = vec![];

        match self.current() {
            Some(token) if token == Token::RPAREN => (),
            _ => loop {
                let arg = self.parse_expr()?;
                args.push(*arg);

                match self.current() {
                    Some(token) if token == Token::RPAREN => break,
                    Some(token) if token == Token::COMMA => self.bump(),
                    other => {
                        return Err(ErrorKind::ParseError(format!(
                            "Expected `,` or `)` in argument list, found {}",
                            found(other)
                        )))
                    }
                }
            },
        }
        self.bump();

        Ok(Box::new(Expression::Call { callee, args }))
    }

    fn parse_grouping_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        self.expect(Token::LPAREN)?;
        let expr = self.parse_expr()?;
        self.expect(Token::RPAREN)?;

        Ok(expr)
    }

    /// `IF` cond `THEN` expr [`ELSE` expr] `FI`
    fn parse_if_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        self.expect_kw(Keyword::If)?;
        let condition = self.parse_expr()?;

        self.expect_kw(Keyword::Then)?;
        let then_branch = self.parse_expr()?;

        let else_branch = match self.current() {
            Some(Token::Kw(Keyword::Else)) => {
                self.bump();
                Some(self.parse_expr()?)
            }
            _ => None,
        };

        self.expect_kw(Keyword::Fi)?;

        Ok(Box::new(Expression::If {
            condition,
            then_branch,
            else_branch,
        }))
    }

    /// `WHILE` cond `DO` expr `DONE`
    fn parse_while_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        self.expect_kw(Keyword::While)?;
        let condition = self.parse_expr()?;

        self.expect_kw(Keyword::Do)?;
        let body = self.parse_expr()?;

        self.expect_kw(Keyword::Done)?;

        Ok(Box::new(Expression::While { condition, body }))
    }

    /// `VAR` id [`:=` expr]
    fn parse_var_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        self.expect_kw(Keyword::Var)?;
        let id = self.parse_id()?;

        let init = match self.current() {
            Some(Token::Assign) => {
                self.bump();
                Some(self.parse_expr()?)
            }
            _ => None,
        };

        Ok(Box::new(Expression::VarDecl { id, init }))
    }

    fn parse_return_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        self.expect_kw(Keyword::Return)?;
        Ok(Box::new(Expression::Return(self.parse_expr()?)))
    }

    fn parse_print_expr(&mut self) -> PResult<Box<Expression<'src>>> {
        self.expect_kw(Keyword::Print)?;
        Ok(Box::new(Expression::Print(self.parse_expr()?)))
    }
}

#[cfg(test)]
mod test {
    use super::Parser;
    use crate::{
        error::ErrorKind,
        syntax::{precedence::PrecedenceTable, ExprParser, Expression},
    };

    fn parse(src: &str) -> Box<Expression> {
        Parser::new(src).parse_expr().unwrap()
    }

    fn parse_err(src: &str) -> ErrorKind {
        Parser::new(src).parse_expr().unwrap_err()
    }

    fn num(v: f64) -> Box<Expression<'static>> {
        Box::new(Expression::Number(v))
    }

    fn var(id: &'static str) -> Box<Expression<'static>> {
        Box::new(Expression::VarRef(id))
    }

    fn bin(
        lhs: Box<Expression<'static>>,
        op: char,
        rhs: Box<Expression<'static>>,
    ) -> Box<Expression<'static>> {
        Box::new(Expression::Binary { lhs, op, rhs })
    }

    #[test]
    fn parse_binary_expr() {
        let expr = parse("1 + 2 * 3 - 4");
        let expected = bin(bin(num(1.0), '+', bin(num(2.0), '*', num(3.0))), '-', num(4.0));

        assert_eq!(expr, expected);
    }

    #[test]
    fn parse_binary_expr_2() {
        let expr = parse("a + b * c - d");
        let expected = bin(bin(var("a"), '+', bin(var("b"), '*', var("c"))), '-', var("d"));

        assert_eq!(expr, expected);
    }

    #[test]
    fn equal_precedence_is_left_associative() {
        let expr = parse("1 - 2 - 3");
        let expected = bin(bin(num(1.0), '-', num(2.0)), '-', num(3.0));

        assert_eq!(expr, expected);
    }

    #[test]
    fn assignment_binds_loosest() {
        let expr = parse("x = a < b + 1");
        let expected = bin(var("x"), '=', bin(var("a"), '<', bin(var("b"), '+', num(1.0))));

        assert_eq!(expr, expected);
    }

    #[test]
    fn tighter_operator_then_looser_one() {
        let expr = parse("a * b + c * d < e");
        let expected = bin(
            bin(bin(var("a"), '*', var("b")), '+', bin(var("c"), '*', var("d"))),
            '<',
            var("e"),
        );

        assert_eq!(expr, expected);
    }

    #[test]
    fn grouping_overrides_precedence() {
        let expr = parse("(1 + 2) * 3");
        let expected = bin(bin(num(1.0), '+', num(2.0)), '*', num(3.0));

        assert_eq!(expr, expected);
    }

    #[test]
    fn unregistered_operator_ends_expression() {
        let mut parser = Parser::new("a / b");
        let expr = parser.parse_expr().unwrap();

        assert_eq!(expr, var("a"));
        assert!(matches!(
            parser.current(),
            Some(crate::syntax::Token::Char('/'))
        ));
    }

    #[test]
    fn custom_precedence_table() {
        let mut table = PrecedenceTable::new();
        table.set_binary('+', 50);
        table.set_binary('*', 10);

        let expr = Parser::with_precedence("1 + 2 * 3", table)
            .parse_expr()
            .unwrap();
        let expected = bin(bin(num(1.0), '+', num(2.0)), '*', num(3.0));

        assert_eq!(expr, expected);
    }

    #[test]
    fn parse_call_expr() {
        let expr = parse("f(1, 2, 3)");
        let expected = Box::new(Expression::Call {
            callee: "f",
            args: vec![Expression::Number(1.0), Expression::Number(2.0), Expression::Number(3.0)],
        });

        assert_eq!(expr, expected);
    }

    #[test]
    fn parse_nullary_call() {
        let expr = parse("f()");
        let expected = Box::new(Expression::Call {
            callee: "f",
            args: vec![],
        });

        assert_eq!(expr, expected);
    }

    #[test]
    fn call_args_are_full_expressions() {
        let expr = parse("f(a + 1, g(b))");
        let expected = Box::new(Expression::Call {
            callee: "f",
            args: vec![
                *bin(var("a"), '+', num(1.0)),
                Expression::Call {
                    callee: "g",
                    args: vec![Expression::VarRef("b")],
                },
            ],
        });

        assert_eq!(expr, expected);
    }

    #[test]
    fn call_errors() {
        for src in ["f(1 2)", "f(1,)", "f(1", "f(,)"] {
            assert!(matches!(parse_err(src), ErrorKind::ParseError(_)), "{src}");
        }
    }

    #[test]
    fn unbalanced_grouping() {
        assert!(matches!(parse_err("(1 + 2"), ErrorKind::ParseError(_)));
        assert!(matches!(parse_err("(1 + 2;"), ErrorKind::ParseError(_)));
    }

    #[test]
    fn parse_if_expr() {
        let expr = parse("IF x THEN 1 FI");
        let expected = Box::new(Expression::If {
            condition: var("x"),
            then_branch: num(1.0),
            else_branch: None,
        });

        assert_eq!(expr, expected);
    }

    #[test]
    fn parse_if_else_expr() {
        let expr = parse("IF x < 3 THEN a + 1 ELSE f(x) FI");
        let expected = Box::new(Expression::If {
            condition: bin(var("x"), '<', num(3.0)),
            then_branch: bin(var("a"), '+', num(1.0)),
            else_branch: Some(Box::new(Expression::Call {
                callee: "f",
                args: vec![Expression::VarRef("x")],
            })),
        });

        assert_eq!(expr, expected);
    }

    #[test]
    fn if_errors() {
        assert_eq!(
            parse_err("IF x 1 FI"),
            ErrorKind::ParseError("Expected THEN, found Number(1.0)".into())
        );
        assert!(matches!(parse_err("IF x THEN 1"), ErrorKind::ParseError(_)));
        assert!(matches!(parse_err("IF x THEN 1 2 FI"), ErrorKind::ParseError(_)));
        assert!(matches!(parse_err("IF x THEN 1 ELSE FI"), ErrorKind::ParseError(_)));
    }

    #[test]
    fn parse_while_expr() {
        let expr = parse("WHILE x DO 1 DONE");
        let expected = Box::new(Expression::While {
            condition: var("x"),
            body: num(1.0),
        });

        assert_eq!(expr, expected);
    }

    #[test]
    fn while_errors() {
        assert!(matches!(parse_err("WHILE x 1 DONE"), ErrorKind::ParseError(_)));
        assert!(matches!(parse_err("WHILE x DO 1"), ErrorKind::ParseError(_)));
    }

    #[test]
    fn parse_var_expr() {
        let expr = parse("VAR x := 2 * y");
        let expected = Box::new(Expression::VarDecl {
            id: "x",
            init: Some(bin(num(2.0), '*', var("y"))),
        });
        assert_eq!(expr, expected);

        let expr = parse("VAR x");
        let expected = Box::new(Expression::VarDecl { id: "x", init: None });
        assert_eq!(expr, expected);
    }

    #[test]
    fn var_needs_identifier() {
        assert!(matches!(parse_err("VAR 1"), ErrorKind::ParseError(_)));
        assert!(matches!(parse_err("VAR := 1"), ErrorKind::ParseError(_)));
    }

    #[test]
    fn parse_return_and_print() {
        let expr = parse("RETURN a + 1");
        let expected = Box::new(Expression::Return(bin(var("a"), '+', num(1.0))));
        assert_eq!(expr, expected);

        let expr = parse("PRINT f(2)");
        let expected = Box::new(Expression::Print(Box::new(Expression::Call {
            callee: "f",
            args: vec![Expression::Number(2.0)],
        })));
        assert_eq!(expr, expected);
    }

    #[test]
    fn unexpected_tokens() {
        for src in ["", ")", "THEN", "CONTINUE", ",", "FI", "+ 1"] {
            assert!(matches!(parse_err(src), ErrorKind::ParseError(_)), "{src:?}");
        }
    }

    #[test]
    fn malformed_number_is_lex_error() {
        assert_eq!(
            parse_err("1 + 2.3.4"),
            ErrorKind::LexError("Malformed number literal `2.3.4`".into())
        );
    }

    #[test]
    fn registered_unary_operator() {
        let mut table = PrecedenceTable::standard();
        table.add_unary('!');

        let expr = Parser::with_precedence("!x + !!1", table)
            .parse_expr()
            .unwrap();
        let expected = bin(
            Box::new(Expression::Unary { op: '!', operand: var("x") }),
            '+',
            Box::new(Expression::Unary {
                op: '!',
                operand: Box::new(Expression::Unary { op: '!', operand: num(1.0) }),
            }),
        );

        assert_eq!(expr, expected);
    }

    #[test]
    fn unregistered_unary_is_unexpected() {
        assert!(matches!(parse_err("!x"), ErrorKind::ParseError(_)));
    }
}
