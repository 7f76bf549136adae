use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::{Error, Result, Span};

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub typ: TokenT,
    pub span: Span,
}

impl Token {
    pub const fn new(typ: TokenT, span: Span) -> Self {
        Self { typ, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenT {
    Int(i128),
    Float(f64),
    Imag(f64),
    Str(String),
    Ident(String),
    Kw(Kw),
    Op(Op),
    Par(Par),
    Comma,
    Colon,
    Dot,
}

impl fmt::Display for TokenT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Imag(v) => write!(f, "{v}j"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Ident(i) => write!(f, "{i}"),
            Self::Kw(k) => write!(f, "{}", k.name()),
            Self::Op(o) => write!(f, "{}", o.symbol()),
            Self::Par(p) => write!(f, "{}", p.symbol()),
            Self::Comma => write!(f, ","),
            Self::Colon => write!(f, ":"),
            Self::Dot => write!(f, "."),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kw {
    True,
    False,
    None,
    And,
    Or,
    Not,
    In,
    Def,
    If,
    Elif,
    Else,
    While,
    For,
    Return,
    Break,
    Continue,
    Class,
    Try,
    Except,
    Finally,
    With,
    Import,
    From,
    Yield,
}

impl Kw {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::True => "True",
            Self::False => "False",
            Self::None => "None",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::In => "in",
            Self::Def => "def",
            Self::If => "if",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::While => "while",
            Self::For => "for",
            Self::Return => "return",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Class => "class",
            Self::Try => "try",
            Self::Except => "except",
            Self::Finally => "finally",
            Self::With => "with",
            Self::Import => "import",
            Self::From => "from",
            Self::Yield => "yield",
        }
    }

    /// Keywords that open a statement rather than an expression.
    pub const fn starts_statement(&self) -> bool {
        !matches!(
            self,
            Self::True | Self::False | Self::None | Self::And | Self::Or | Self::Not | Self::In
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Rem,
    Pow,
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::IntDiv => "//",
            Self::Rem => "%",
            Self::Pow => "**",
            Self::Assign => "=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Par {
    RoundOpen,
    RoundClose,
    SquareOpen,
    SquareClose,
}

impl Par {
    pub const fn is_opening(&self) -> bool {
        matches!(self, Self::RoundOpen | Self::SquareOpen)
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::RoundOpen => "(",
            Self::RoundClose => ")",
            Self::SquareOpen => "[",
            Self::SquareClose => "]",
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    pos: usize,
}

/// Tokenizes a single logical line. A `#` starts a comment that runs to the
/// end of the line.
pub fn lex(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer {
        chars: input.chars().peekable(),
        tokens: Vec::new(),
        pos: 0,
    };
    while let Some(c) = lexer.next_char() {
        lexer.token(c)?;
    }
    Ok(lexer.tokens)
}

impl Lexer<'_> {
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn next_if(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn token(&mut self, c: char) -> Result<()> {
        let start = self.pos - 1;
        let typ = match c {
            ' ' | '\t' => return Ok(()),
            '#' => {
                while self.next_char().is_some() {}
                return Ok(());
            }
            '+' => TokenT::Op(Op::Add),
            '-' => TokenT::Op(Op::Sub),
            '*' => TokenT::Op(if self.next_if('*') { Op::Pow } else { Op::Mul }),
            '/' => TokenT::Op(if self.next_if('/') { Op::IntDiv } else { Op::Div }),
            '%' => TokenT::Op(Op::Rem),
            '=' => TokenT::Op(if self.next_if('=') { Op::Eq } else { Op::Assign }),
            '!' => {
                if self.next_if('=') {
                    TokenT::Op(Op::Ne)
                } else {
                    return Err(Error::InvalidChar('!', Span::pos(start)));
                }
            }
            '<' => TokenT::Op(if self.next_if('=') { Op::Le } else { Op::Lt }),
            '>' => TokenT::Op(if self.next_if('=') { Op::Ge } else { Op::Gt }),
            '(' => TokenT::Par(Par::RoundOpen),
            ')' => TokenT::Par(Par::RoundClose),
            '[' => TokenT::Par(Par::SquareOpen),
            ']' => TokenT::Par(Par::SquareClose),
            ',' => TokenT::Comma,
            ':' => TokenT::Colon,
            '.' => TokenT::Dot,
            '\'' | '"' => self.string(c, start)?,
            '0'..='9' => self.number(c, start)?,
            c if c.is_alphabetic() || c == '_' => self.ident(c),
            c => return Err(Error::InvalidChar(c, Span::pos(start))),
        };
        self.tokens.push(Token::new(typ, Span::of(start, self.pos)));
        Ok(())
    }

    fn string(&mut self, quote: char, start: usize) -> Result<TokenT> {
        let mut string = String::new();
        loop {
            match self.next_char() {
                None => return Err(Error::MissingClosingQuote(Span::of(start, self.pos))),
                Some(c) if c == quote => break,
                Some('\\') => match self.next_char() {
                    Some('n') => string.push('\n'),
                    Some('t') => string.push('\t'),
                    Some('\\') => string.push('\\'),
                    Some(c) if c == '\'' || c == '"' => string.push(c),
                    Some(c) => {
                        string.push('\\');
                        string.push(c);
                    }
                    None => return Err(Error::MissingClosingQuote(Span::of(start, self.pos))),
                },
                Some(c) => string.push(c),
            }
        }
        Ok(TokenT::Str(string))
    }

    fn number(&mut self, first: char, start: usize) -> Result<TokenT> {
        let mut literal = String::from(first);
        while let Some(&c) = self.chars.peek() {
            match c {
                '0'..='9' | '.' => {
                    literal.push(c);
                    self.next_char();
                }
                'e' | 'E' => {
                    // an exponent needs at least one (possibly signed) digit
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.next() {
                        Some('0'..='9') => {
                            literal.push(c);
                            self.next_char();
                        }
                        Some(sign @ ('+' | '-')) if matches!(ahead.next(), Some('0'..='9')) => {
                            literal.push(c);
                            self.next_char();
                            literal.push(sign);
                            self.next_char();
                        }
                        _ => break,
                    }
                }
                'j' | 'J' => {
                    self.next_char();
                    let f = literal
                        .parse::<f64>()
                        .map_err(|_| Error::InvalidNumber(literal, Span::of(start, self.pos)))?;
                    return Ok(TokenT::Imag(f));
                }
                _ => break,
            }
        }
        let span = Span::of(start, self.pos);
        if literal.contains(['.', 'e', 'E']) {
            let f = literal
                .parse::<f64>()
                .map_err(|_| Error::InvalidNumber(literal, span))?;
            Ok(TokenT::Float(f))
        } else if let Ok(i) = literal.parse::<i128>() {
            Ok(TokenT::Int(i))
        } else {
            // too big for an int, keep the magnitude as a float
            let f = literal
                .parse::<f64>()
                .map_err(|_| Error::InvalidNumber(literal, span))?;
            Ok(TokenT::Float(f))
        }
    }

    fn ident(&mut self, first: char) -> TokenT {
        let mut ident = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.next_char();
            } else {
                break;
            }
        }
        let kw = match ident.as_str() {
            "True" => Kw::True,
            "False" => Kw::False,
            "None" => Kw::None,
            "and" => Kw::And,
            "or" => Kw::Or,
            "not" => Kw::Not,
            "in" => Kw::In,
            "def" => Kw::Def,
            "if" => Kw::If,
            "elif" => Kw::Elif,
            "else" => Kw::Else,
            "while" => Kw::While,
            "for" => Kw::For,
            "return" => Kw::Return,
            "break" => Kw::Break,
            "continue" => Kw::Continue,
            "class" => Kw::Class,
            "try" => Kw::Try,
            "except" => Kw::Except,
            "finally" => Kw::Finally,
            "with" => Kw::With,
            "import" => Kw::Import,
            "from" => Kw::From,
            "yield" => Kw::Yield,
            _ => return TokenT::Ident(ident),
        };
        TokenT::Kw(kw)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn types(input: &str) -> Vec<TokenT> {
        lex(input)
            .unwrap()
            .into_iter()
            .map(|t| t.typ)
            .collect()
    }

    #[test]
    fn operators() {
        assert_eq!(
            types("1 ** 2 // 3 <= 4 != 5"),
            vec![
                TokenT::Int(1),
                TokenT::Op(Op::Pow),
                TokenT::Int(2),
                TokenT::Op(Op::IntDiv),
                TokenT::Int(3),
                TokenT::Op(Op::Le),
                TokenT::Int(4),
                TokenT::Op(Op::Ne),
                TokenT::Int(5),
            ],
        );
    }

    #[test]
    fn assign_is_not_eq() {
        assert_eq!(
            types("x = y == z"),
            vec![
                TokenT::Ident("x".into()),
                TokenT::Op(Op::Assign),
                TokenT::Ident("y".into()),
                TokenT::Op(Op::Eq),
                TokenT::Ident("z".into()),
            ],
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            types("12 3.5 1e12 2.5e-3 4j"),
            vec![
                TokenT::Int(12),
                TokenT::Float(3.5),
                TokenT::Float(1e12),
                TokenT::Float(2.5e-3),
                TokenT::Imag(4.0),
            ],
        );
    }

    #[test]
    fn exponent_needs_digits() {
        // `e` on its own is an identifier, not an exponent
        assert_eq!(
            types("2e"),
            vec![TokenT::Int(2), TokenT::Ident("e".into())],
        );
    }

    #[test]
    fn strings() {
        assert_eq!(types("'a b'"), vec![TokenT::Str("a b".into())]);
        assert_eq!(types(r#""it\'s""#), vec![TokenT::Str("it's".into())]);
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            lex("'abc").unwrap_err(),
            Error::MissingClosingQuote(Span::of(0, 4)),
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(
            types("if True else x"),
            vec![
                TokenT::Kw(Kw::If),
                TokenT::Kw(Kw::True),
                TokenT::Kw(Kw::Else),
                TokenT::Ident("x".into()),
            ],
        );
    }

    #[test]
    fn comment_ends_line() {
        assert_eq!(types("1 + 2 # three"), vec![
            TokenT::Int(1),
            TokenT::Op(Op::Add),
            TokenT::Int(2),
        ]);
    }

    #[test]
    fn spans() {
        let tokens = lex("10 + x").unwrap();
        assert_eq!(tokens[0].span, Span::of(0, 2));
        assert_eq!(tokens[1].span, Span::of(3, 4));
        assert_eq!(tokens[2].span, Span::of(5, 6));
    }

    #[test]
    fn invalid_char() {
        assert_eq!(lex("1 ? 2").unwrap_err(), Error::InvalidChar('?', Span::pos(2)));
    }
}
