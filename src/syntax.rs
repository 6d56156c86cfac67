mod ast;
mod expr_parser;
mod lexer;
mod parser;
mod precedence;
mod token;

pub(crate) use ast::{Expression, FunctionDef, Prototype};
pub(crate) use parser::Parser;
pub(crate) use precedence::{Precedence, PrecedenceTable};
pub(crate) use token::{Keyword, Token};

use crate::error::PResult;

pub(crate) trait ExprParser<'src> {
    fn parse_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_bin_op_rhs(
        &mut self,
        min_prec: Precedence,
        lhs: Box<Expression<'src>>,
    ) -> PResult<Box<Expression<'src>>>;
    fn parse_unary_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_primary_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_id_expr(&mut self, id: &'src str) -> PResult<Box<Expression<'src>>>;
    fn parse_call_expr(&mut self, callee: &'src str) -> PResult<Box<Expression<'src>>>;
    fn parse_grouping_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_if_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_while_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_var_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_return_expr(&mut self) -> PResult<Box<Expression<'src>>>;
    fn parse_print_expr(&mut self) -> PResult<Box<Expression<'src>>>;
}
