pub use stmt::{parse_block, parse_line, Block, LineStmt, Stmt};

use num_complex::Complex64;

use crate::{Error, Kw, Op, Par, Result, Span, Token, TokenT, Value};

mod stmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Val(Value),
    Ident(String),
    Attr(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    List(Vec<Expr>),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Logic(LogicOp, Box<Expr>, Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

const CMP_OPS: [(Op, BinOp); 6] = [
    (Op::Eq, BinOp::Eq),
    (Op::Ne, BinOp::Ne),
    (Op::Lt, BinOp::Lt),
    (Op::Le, BinOp::Le),
    (Op::Gt, BinOp::Gt),
    (Op::Ge, BinOp::Ge),
];
const SUM_OPS: [(Op, BinOp); 2] = [(Op::Add, BinOp::Add), (Op::Sub, BinOp::Sub)];
const TERM_OPS: [(Op, BinOp); 4] = [
    (Op::Mul, BinOp::Mul),
    (Op::Div, BinOp::Div),
    (Op::IntDiv, BinOp::IntDiv),
    (Op::Rem, BinOp::Rem),
];

/// Parses the tokens as a single expression, requiring all of them to be
/// consumed.
pub fn parse_expr(tokens: &[Token]) -> Result<Expr> {
    let mut parser = Parser::new(tokens);
    let expr = parser.expr()?;
    match parser.next() {
        Some(t) => Err(Error::UnexpectedToken(t.typ.to_string(), t.span)),
        None => Ok(expr),
    }
}

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn end_span(&self) -> Span {
        match self.tokens.last() {
            Some(t) => Span::pos(t.span.end),
            None => Span::pos(0),
        }
    }

    fn next_if_op(&mut self, ops: &[(Op, BinOp)]) -> Option<BinOp> {
        if let Some(Token { typ: TokenT::Op(op), .. }) = self.peek() {
            if let Some((_, bin_op)) = ops.iter().find(|(o, _)| o == op) {
                self.pos += 1;
                return Some(*bin_op);
            }
        }
        None
    }

    fn next_if_kw(&mut self, kw: Kw) -> bool {
        match self.peek() {
            Some(t) if t.typ == TokenT::Kw(kw) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn next_if_par(&mut self, par: Par) -> bool {
        match self.peek() {
            Some(t) if t.typ == TokenT::Par(par) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn next_if_comma(&mut self) -> bool {
        match self.peek() {
            Some(t) if t.typ == TokenT::Comma => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn peek_is_par(&self, par: Par) -> bool {
        matches!(self.peek(), Some(t) if t.typ == TokenT::Par(par))
    }

    pub(crate) fn expect_par(&mut self, par: Par) -> Result<()> {
        match self.next() {
            Some(t) if t.typ == TokenT::Par(par) => Ok(()),
            Some(t) if !par.is_opening() => Err(Error::MissingClosingPar(t.span)),
            Some(t) => Err(Error::UnexpectedToken(t.typ.to_string(), t.span)),
            None => Err(Error::MissingClosingPar(self.end_span())),
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<String> {
        match self.next() {
            Some(Token {
                typ: TokenT::Ident(name),
                ..
            }) => Ok(name.clone()),
            Some(t) => Err(Error::ExpectedIdent(t.span)),
            None => Err(Error::ExpectedIdent(self.end_span())),
        }
    }

    pub(crate) fn expr(&mut self) -> Result<Expr> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.and_expr()?;
        while self.next_if_kw(Kw::Or) {
            let rhs = self.and_expr()?;
            lhs = Expr::Logic(LogicOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.not_expr()?;
        while self.next_if_kw(Kw::And) {
            let rhs = self.not_expr()?;
            lhs = Expr::Logic(LogicOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.next_if_kw(Kw::Not) {
            let operand = self.not_expr()?;
            Ok(Expr::Unary(UnOp::Not, Box::new(operand)))
        } else {
            self.cmp_expr()
        }
    }

    fn cmp_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.sum()?;
        while let Some(op) = self.next_if_op(&CMP_OPS) {
            let rhs = self.sum()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn sum(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        while let Some(op) = self.next_if_op(&SUM_OPS) {
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary_expr()?;
        while let Some(op) = self.next_if_op(&TERM_OPS) {
            let rhs = self.unary_expr()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Some(t) if t.typ == TokenT::Op(Op::Sub) => UnOp::Neg,
            Some(t) if t.typ == TokenT::Op(Op::Add) => UnOp::Pos,
            _ => return self.power(),
        };
        self.pos += 1;
        let operand = self.unary_expr()?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn power(&mut self) -> Result<Expr> {
        let lhs = self.postfix()?;
        if let Some(t) = self.peek() {
            if t.typ == TokenT::Op(Op::Pow) {
                self.pos += 1;
                // the right side binds unary operators, so 2 ** -3 parses
                let rhs = self.unary_expr()?;
                return Ok(Expr::Binary(BinOp::Pow, Box::new(lhs), Box::new(rhs)));
            }
        }
        Ok(lhs)
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.atom()?;
        loop {
            match self.peek().map(|t| &t.typ) {
                Some(TokenT::Dot) => {
                    self.pos += 1;
                    let attr = self.expect_ident()?;
                    expr = Expr::Attr(Box::new(expr), attr);
                }
                Some(TokenT::Par(Par::RoundOpen)) => {
                    self.pos += 1;
                    let args = self.call_args()?;
                    expr = Expr::Call(Box::new(expr), args);
                }
                Some(TokenT::Par(Par::SquareOpen)) => {
                    self.pos += 1;
                    let index = self.expr()?;
                    self.expect_par(Par::SquareClose)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn atom(&mut self) -> Result<Expr> {
        let Some(token) = self.next() else {
            return Err(Error::ExpectedExpr(self.end_span()));
        };
        match &token.typ {
            TokenT::Int(i) => Ok(Expr::Val(Value::Int(*i))),
            TokenT::Float(f) => Ok(Expr::Val(Value::Float(*f))),
            TokenT::Imag(f) => Ok(Expr::Val(Value::Complex(Complex64::new(0.0, *f)))),
            TokenT::Str(s) => Ok(Expr::Val(Value::Str(s.clone()))),
            TokenT::Kw(Kw::True) => Ok(Expr::Val(Value::Bool(true))),
            TokenT::Kw(Kw::False) => Ok(Expr::Val(Value::Bool(false))),
            TokenT::Kw(Kw::None) => Ok(Expr::Val(Value::None)),
            TokenT::Ident(name) => Ok(Expr::Ident(name.clone())),
            TokenT::Par(Par::RoundOpen) => {
                let expr = self.expr()?;
                self.expect_par(Par::RoundClose)?;
                Ok(expr)
            }
            TokenT::Par(Par::SquareOpen) => self.list_display(),
            typ => Err(Error::UnexpectedToken(typ.to_string(), token.span)),
        }
    }

    fn call_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.next_if_par(Par::RoundClose) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if !self.next_if_comma() {
                break;
            }
            if self.peek_is_par(Par::RoundClose) {
                break;
            }
        }
        self.expect_par(Par::RoundClose)?;
        Ok(args)
    }

    fn list_display(&mut self) -> Result<Expr> {
        let mut items = Vec::new();
        if self.next_if_par(Par::SquareClose) {
            return Ok(Expr::List(items));
        }
        loop {
            items.push(self.expr()?);
            if !self.next_if_comma() {
                break;
            }
            if self.peek_is_par(Par::SquareClose) {
                break;
            }
        }
        self.expect_par(Par::SquareClose)?;
        Ok(Expr::List(items))
    }
}
