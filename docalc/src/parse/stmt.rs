use super::{parse_expr, Expr, Parser};
use crate::{lex, Error, Kw, Op, Par, Result, Span, Token, TokenT};

pub type Block = Vec<Stmt>;

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign {
        name: String,
        value: Expr,
    },
    FuncDef {
        name: String,
        params: Vec<String>,
        body: Block,
    },
    If {
        branches: Vec<(Expr, Block)>,
        else_body: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    For {
        name: String,
        iter: Expr,
        body: Block,
    },
    Return(Option<Expr>),
    Break,
    Continue,
}

/// A statement that fits on a single line.
#[derive(Clone, Debug, PartialEq)]
pub enum LineStmt {
    Expr(Expr),
    Assign { name: String, value: Expr },
}

/// Parses a single line as either an assignment or a bare expression. The
/// split happens on the first top-level `=`, which the lexer already
/// distinguishes from `==`, `!=`, `<=` and `>=`.
pub fn parse_line(tokens: &[Token]) -> Result<LineStmt> {
    match assign_pos(tokens) {
        Some(i) => {
            let name = assign_target(&tokens[..i])?;
            let value = parse_expr(&tokens[i + 1..])?;
            Ok(LineStmt::Assign { name, value })
        }
        None => Ok(LineStmt::Expr(parse_expr(tokens)?)),
    }
}

fn assign_pos(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, t) in tokens.iter().enumerate() {
        match t.typ {
            TokenT::Par(p) if p.is_opening() => depth += 1,
            TokenT::Par(_) => depth -= 1,
            TokenT::Op(Op::Assign) if depth == 0 => return Some(i),
            _ => (),
        }
    }
    None
}

fn assign_target(tokens: &[Token]) -> Result<String> {
    match tokens {
        [Token {
            typ: TokenT::Ident(name),
            ..
        }] => Ok(name.clone()),
        _ => Err(Error::InvalidAssignTarget),
    }
}

struct Line {
    indent: usize,
    /// 1-based within the unit
    number: usize,
    tokens: Vec<Token>,
}

impl Line {
    fn first_kw(&self) -> Option<Kw> {
        match self.tokens.first()?.typ {
            TokenT::Kw(kw) => Some(kw),
            _ => None,
        }
    }
}

/// Parses a multi-line unit into a statement list, tracking indentation the
/// way Python does. Blank and comment-only lines are skipped.
pub fn parse_block(input: &str) -> Result<Block> {
    let mut lines = Vec::new();
    for (i, text) in input.lines().enumerate() {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens = lex::lex(trimmed)?;
        if tokens.is_empty() {
            continue;
        }
        lines.push(Line {
            indent: indent_of(text),
            number: i + 1,
            tokens,
        });
    }

    let base = lines.first().map_or(0, |l| l.indent);
    let mut parser = BlockParser { lines, pos: 0 };
    let stmts = parser.stmts(base)?;
    if let Some(line) = parser.peek() {
        return Err(Error::UnexpectedIndent(line.number));
    }
    Ok(stmts)
}

fn indent_of(text: &str) -> usize {
    let mut indent = 0;
    for c in text.chars() {
        match c {
            ' ' => indent += 1,
            '\t' => indent += 8 - indent % 8,
            _ => break,
        }
    }
    indent
}

struct BlockParser {
    lines: Vec<Line>,
    pos: usize,
}

impl BlockParser {
    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    fn take_line(&mut self) -> (Vec<Token>, usize, usize) {
        let line = &mut self.lines[self.pos];
        self.pos += 1;
        (std::mem::take(&mut line.tokens), line.indent, line.number)
    }

    fn stmts(&mut self, indent: usize) -> Result<Block> {
        let mut stmts = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(Error::UnexpectedIndent(line.number));
            }
            stmts.push(self.stmt()?);
        }
        Ok(stmts)
    }

    fn stmt(&mut self) -> Result<Stmt> {
        let (tokens, indent, number) = self.take_line();
        match tokens.first().map(|t| &t.typ) {
            Some(TokenT::Kw(Kw::Def)) => self.func_def(&tokens, indent, number),
            Some(TokenT::Kw(Kw::If)) => self.if_stmt(&tokens, indent, number),
            Some(TokenT::Kw(Kw::While)) => {
                let cond = header_expr(&tokens, 1, number)?;
                let body = self.suite(indent, number)?;
                Ok(Stmt::While { cond, body })
            }
            Some(TokenT::Kw(Kw::For)) => self.for_stmt(&tokens, indent, number),
            Some(TokenT::Kw(Kw::Return)) => {
                if tokens.len() == 1 {
                    Ok(Stmt::Return(None))
                } else {
                    Ok(Stmt::Return(Some(parse_expr(&tokens[1..])?)))
                }
            }
            Some(TokenT::Kw(Kw::Break)) => lone_kw(&tokens, Stmt::Break),
            Some(TokenT::Kw(Kw::Continue)) => lone_kw(&tokens, Stmt::Continue),
            Some(TokenT::Kw(Kw::Elif)) => {
                Err(Error::UnexpectedToken("elif".into(), tokens[0].span))
            }
            Some(TokenT::Kw(Kw::Else)) => {
                Err(Error::UnexpectedToken("else".into(), tokens[0].span))
            }
            Some(TokenT::Kw(Kw::Class)) => Err(Error::UnsupportedStatement("class", number)),
            Some(TokenT::Kw(Kw::Try | Kw::Except | Kw::Finally)) => {
                Err(Error::UnsupportedStatement("try", number))
            }
            Some(TokenT::Kw(Kw::With)) => Err(Error::UnsupportedStatement("with", number)),
            Some(TokenT::Kw(Kw::Import | Kw::From)) => {
                Err(Error::UnsupportedStatement("import", number))
            }
            Some(TokenT::Kw(Kw::Yield)) => Err(Error::UnsupportedStatement("yield", number)),
            _ => match parse_line(&tokens)? {
                LineStmt::Expr(expr) => Ok(Stmt::Expr(expr)),
                LineStmt::Assign { name, value } => Ok(Stmt::Assign { name, value }),
            },
        }
    }

    fn func_def(&mut self, tokens: &[Token], indent: usize, number: usize) -> Result<Stmt> {
        let header = header_tokens(tokens, number)?;
        let mut parser = Parser::new(&header[1..]);
        let name = parser.expect_ident()?;
        parser.expect_par(Par::RoundOpen)?;
        let mut params = Vec::new();
        if !parser.next_if_par(Par::RoundClose) {
            loop {
                params.push(parser.expect_ident()?);
                if !parser.next_if_comma() {
                    break;
                }
            }
            parser.expect_par(Par::RoundClose)?;
        }
        if let Some(t) = parser.next() {
            return Err(Error::UnexpectedToken(t.typ.to_string(), t.span));
        }
        let body = self.suite(indent, number)?;
        Ok(Stmt::FuncDef { name, params, body })
    }

    fn if_stmt(&mut self, tokens: &[Token], indent: usize, number: usize) -> Result<Stmt> {
        let cond = header_expr(tokens, 1, number)?;
        let body = self.suite(indent, number)?;
        let mut branches = vec![(cond, body)];
        let mut else_body = None;
        loop {
            match self.peek() {
                Some(line) if line.indent == indent && line.first_kw() == Some(Kw::Elif) => {
                    let (tokens, _, number) = self.take_line();
                    let cond = header_expr(&tokens, 1, number)?;
                    let body = self.suite(indent, number)?;
                    branches.push((cond, body));
                }
                Some(line) if line.indent == indent && line.first_kw() == Some(Kw::Else) => {
                    let (tokens, _, number) = self.take_line();
                    if tokens.len() != 2 || tokens[1].typ != TokenT::Colon {
                        return Err(Error::ExpectedColon(number));
                    }
                    else_body = Some(self.suite(indent, number)?);
                    break;
                }
                _ => break,
            }
        }
        Ok(Stmt::If {
            branches,
            else_body,
        })
    }

    fn for_stmt(&mut self, tokens: &[Token], indent: usize, number: usize) -> Result<Stmt> {
        let name = match tokens.get(1) {
            Some(Token {
                typ: TokenT::Ident(name),
                ..
            }) => name.clone(),
            Some(t) => return Err(Error::ExpectedIdent(t.span)),
            None => return Err(Error::ExpectedIdent(Span::pos(tokens[0].span.end))),
        };
        match tokens.get(2) {
            Some(t) if t.typ == TokenT::Kw(Kw::In) => (),
            Some(t) => return Err(Error::ExpectedToken("in", t.span)),
            None => return Err(Error::ExpectedToken("in", Span::pos(tokens[1].span.end))),
        }
        let iter = header_expr(tokens, 3, number)?;
        let body = self.suite(indent, number)?;
        Ok(Stmt::For { name, iter, body })
    }

    fn suite(&mut self, parent_indent: usize, header_number: usize) -> Result<Block> {
        match self.peek() {
            Some(line) if line.indent > parent_indent => {
                let indent = line.indent;
                self.stmts(indent)
            }
            Some(line) => Err(Error::ExpectedIndent(line.number)),
            None => Err(Error::ExpectedIndent(header_number + 1)),
        }
    }
}

/// Strips the trailing colon of a block header, reporting its absence.
fn header_tokens(tokens: &[Token], number: usize) -> Result<&[Token]> {
    match tokens.split_last() {
        Some((last, header)) if last.typ == TokenT::Colon => Ok(header),
        _ => Err(Error::ExpectedColon(number)),
    }
}

fn header_expr(tokens: &[Token], from: usize, number: usize) -> Result<Expr> {
    let header = header_tokens(tokens, number)?;
    if header.len() <= from {
        return Err(Error::ExpectedExpr(Span::pos(tokens[from - 1].span.end)));
    }
    parse_expr(&header[from..])
}

fn lone_kw(tokens: &[Token], stmt: Stmt) -> Result<Stmt> {
    match tokens.get(1) {
        Some(t) => Err(Error::UnexpectedToken(t.typ.to_string(), t.span)),
        None => Ok(stmt),
    }
}
