use proc_macro::{Ident, Literal, TokenStream, TokenTree};
use std::borrow::Cow;
use std::fmt::Write as _;

struct Enum {
    name: String,
    rename_all: Option<Case>,
    members: Vec<Member>,
}

#[derive(Clone, Copy)]
enum Case {
    /// CaseExample
    Pascal,
    /// case_example
    Snake,
    /// case-example
    Kebab,
    /// caseexample
    Lower,
}

struct Member {
    ident: Ident,
    rename: Option<Literal>,
}

fn expect_punct_like(tokens: &mut impl Iterator<Item = TokenTree>, punct: &str) {
    match tokens.next() {
        Some(TokenTree::Punct(p)) if p.to_string() == punct => (),
        _ => panic!("expected punctuation: '{punct}'"),
    }
}

fn parse_enum(input: TokenStream) -> Enum {
    let mut tokens = input.into_iter().peekable();

    let mut rename_all = None;
    loop {
        match tokens.peek() {
            Some(TokenTree::Punct(p)) if p.to_string() == "#" => {
                tokens.next();

                let mut attributes = match tokens.next() {
                    Some(TokenTree::Group(g)) => g.stream().into_iter(),
                    _ => panic!("expected attribute list"),
                };

                let ident = match attributes.next() {
                    Some(TokenTree::Ident(i)) => i,
                    _ => panic!("expected attribute identifier"),
                };

                if ident.to_string() != "docalc" {
                    continue;
                }

                let mut attribute_args = match attributes.next() {
                    Some(TokenTree::Group(g)) => g.stream().into_iter(),
                    _ => panic!("expected attribute args"),
                };

                match attribute_args.next() {
                    Some(TokenTree::Ident(i)) if i.to_string() == "rename_all" => {
                        expect_punct_like(&mut attribute_args, "=");

                        match attribute_args.next() {
                            Some(TokenTree::Literal(l)) => {
                                rename_all = match l.to_string().trim_matches('"') {
                                    "PascalCase" => Some(Case::Pascal),
                                    "snake_case" => Some(Case::Snake),
                                    "kebab-case" => Some(Case::Kebab),
                                    "lowercase" => Some(Case::Lower),
                                    _ => panic!("unknown case"),
                                };
                            }
                            _ => panic!("expected rename literal"),
                        }
                    }
                    Some(t) => panic!("unexpected token: {}", t),
                    None => (),
                }
            }
            Some(TokenTree::Ident(i)) if i.to_string() == "pub" => {
                tokens.next();
            }
            _ => break,
        }
    }

    match tokens.next() {
        Some(TokenTree::Ident(i)) if i.to_string() == "enum" => (),
        Some(t) => panic!("expected enum keyword found {t}"),
        None => panic!("expected enum keyword"),
    }

    let name = match tokens.next() {
        Some(TokenTree::Ident(i)) => i.to_string(),
        _ => panic!("expected identifier"),
    };

    let mut body = match tokens.next() {
        Some(TokenTree::Group(g)) => g.stream().into_iter().peekable(),
        _ => panic!("expected body"),
    };

    let mut members = Vec::new();
    while let Some(t) = body.peek() {
        let rename = match t {
            TokenTree::Punct(p) if p.to_string() == "#" => {
                body.next();

                let mut attributes = match body.next() {
                    Some(TokenTree::Group(g)) => g.stream().into_iter(),
                    _ => panic!("expected attribute list"),
                };

                match attributes.next() {
                    Some(TokenTree::Ident(i)) => {
                        if i.to_string() != "docalc" {
                            continue;
                        }
                    }
                    _ => panic!("expected identifier"),
                }

                let mut attribute_args = match attributes.next() {
                    Some(TokenTree::Group(g)) => g.stream().into_iter(),
                    _ => panic!("expected attribute args"),
                };

                match attribute_args.next() {
                    Some(TokenTree::Ident(i)) if i.to_string() == "rename" => {
                        expect_punct_like(&mut attribute_args, "=");

                        match attribute_args.next() {
                            Some(TokenTree::Literal(l)) => Some(l),
                            _ => panic!("expected rename literal"),
                        }
                    }
                    Some(t) => panic!("unexpected token: {}", t),
                    None => None,
                }
            }
            _ => None,
        };

        match body.next() {
            Some(TokenTree::Ident(ident)) => {
                members.push(Member { ident, rename });
            }
            _ => panic!("expected enum variant name or attributes"),
        }

        match body.next() {
            Some(TokenTree::Punct(p)) if p.to_string() == "," => (),
            None => (),
            _ => panic!("expected ,"),
        }
    }

    Enum {
        name,
        rename_all,
        members,
    }
}

fn transform_case(input: &str, case: Case) -> Cow<str> {
    match case {
        Case::Pascal => Cow::Borrowed(input),
        Case::Snake => separated_lowercase(input, '_'),
        Case::Kebab => separated_lowercase(input, '-'),
        Case::Lower => Cow::Owned(input.to_ascii_lowercase()),
    }
}

fn separated_lowercase(input: &str, separator: char) -> Cow<str> {
    let mut output = String::with_capacity(input.len() + 3);
    let mut iter = input.chars();
    match iter.next() {
        Some(c) => output.push(c.to_ascii_lowercase()),
        None => panic!("empty variant name"),
    }
    for c in iter {
        if c.is_ascii_uppercase() {
            output.push(separator);
        }
        output.push(c.to_ascii_lowercase());
    }
    Cow::Owned(output)
}

#[proc_macro_derive(EnumDisplay, attributes(docalc))]
pub fn derive_display(input: TokenStream) -> TokenStream {
    let Enum {
        name,
        rename_all,
        members,
    } = parse_enum(input);

    let mut output = format!(
        "impl std::fmt::Display for {name} {{
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {{
                match self {{"
    );

    for m in members {
        let m_ident = m.ident.to_string();
        let _ = match m.rename {
            Some(r) => write!(output, "Self::{m_ident} => write!(f, {r}),"),
            None => match rename_all {
                Some(case) => {
                    let new_ident = transform_case(&m_ident, case);
                    write!(output, "Self::{m_ident} => write!(f, \"{new_ident}\"),")
                }
                None => write!(output, "Self::{m_ident} => write!(f, \"{m_ident}\"),"),
            },
        };
    }

    output.push_str("}}}");
    output.parse().unwrap()
}

#[proc_macro_derive(EnumFromStr, attributes(docalc))]
pub fn derive_from_str(input: TokenStream) -> TokenStream {
    let Enum {
        name,
        rename_all,
        members,
    } = parse_enum(input);

    let mut output = format!(
        "impl std::str::FromStr for {name} {{
            type Err = ();

            fn from_str(input: &str) -> Result<Self, Self::Err> {{
                match input {{"
    );

    for m in members {
        let m_ident = m.ident.to_string();
        let _ = match m.rename {
            Some(r) => write!(output, "{r} => Ok(Self::{m_ident}),"),
            None => match rename_all {
                Some(case) => {
                    let new_ident = transform_case(&m_ident, case);
                    write!(output, "\"{new_ident}\" => Ok(Self::{m_ident}),")
                }
                None => write!(output, "\"{m_ident}\" => Ok(Self::{m_ident}),"),
            },
        };
    }

    let _ = write!(output, "_ => Err(()),");

    output.push_str("}}}");
    output.parse().unwrap()
}
