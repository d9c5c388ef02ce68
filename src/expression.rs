use crate::nom_delimited_list::delimited_list;
use crate::parseresult::{failure, PResult};
use itertools::Itertools;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{cut, map, map_res, opt, recognize};
use nom::error::context;
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};
use nom::Parser;
use std::fmt::{self, Display};
use std::str::from_utf8;

/// An expression inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A dotted path into the render context, `pkg.owner.name`.
    Var(Vec<String>),
    /// A dotted path into the request globals, `g.user.name`.
    Global(Vec<String>),
    Str(String),
    Int(i64),
    Not(Box<Expr>),
    Call { helper: Helper, args: Vec<Expr> },
}

/// The helper functions available to templates as `h.name(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    CheckAccess,
    DisplayName,
    Translate,
    Markdown,
    FollowCount,
}

impl Helper {
    pub fn from_name(name: &str) -> Option<Helper> {
        match name {
            "check_access" => Some(Helper::CheckAccess),
            "display_name" => Some(Helper::DisplayName),
            "translate" => Some(Helper::Translate),
            "markdown" => Some(Helper::Markdown),
            "follow_count" => Some(Helper::FollowCount),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Helper::CheckAccess => "check_access",
            Helper::DisplayName => "display_name",
            Helper::Translate => "translate",
            Helper::Markdown => "markdown",
            Helper::FollowCount => "follow_count",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Helper::CheckAccess | Helper::FollowCount => 2,
            Helper::DisplayName | Helper::Translate | Helper::Markdown => 1,
        }
    }
}

impl Display for Expr {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(path) => write!(out, "{}", path.join(".")),
            Expr::Global(path) if path.is_empty() => write!(out, "g"),
            Expr::Global(path) => write!(out, "g.{}", path.join(".")),
            Expr::Str(s) => write!(out, "{s:?}"),
            Expr::Int(n) => write!(out, "{n}"),
            Expr::Not(expr) => write!(out, "!{expr}"),
            Expr::Call { helper, args } => {
                write!(out, "h.{}({})", helper.name(), args.iter().join(", "))
            }
        }
    }
}

pub fn expression(input: &[u8]) -> PResult<Expr> {
    alt((
        map(preceded(char('!'), expression), |e| Expr::Not(Box::new(e))),
        map(quoted_string, Expr::Str),
        integer,
        helper_call,
        path,
    ))
    .parse(input)
}

pub fn quoted_string(input: &[u8]) -> PResult<String> {
    map(
        delimited(char('"'), take_while(|c: u8| c != b'"'), char('"')),
        |text: &[u8]| String::from_utf8_lossy(text).into_owned(),
    )
    .parse(input)
}

fn integer(input: &[u8]) -> PResult<Expr> {
    map_res(recognize(pair(opt(char('-')), digit1)), |digits: &[u8]| {
        from_utf8(digits)
            .map_err(|_| ())
            .and_then(|s| s.parse::<i64>().map_err(|_| ()))
            .map(Expr::Int)
    })
    .parse(input)
}

fn helper_call(input: &[u8]) -> PResult<Expr> {
    let (rest, (name, args)) = preceded(
        tag("h."),
        cut(pair(
            rust_name,
            context("Expected helper arguments", argument_list),
        )),
    )
    .parse(input)?;
    match Helper::from_name(&name) {
        Some(helper) if helper.arity() == args.len() => {
            Ok((rest, Expr::Call { helper, args }))
        }
        Some(_) => failure(&input[2..], "Wrong number of helper arguments"),
        None => failure(&input[2..], "Unknown helper"),
    }
}

fn argument_list(input: &[u8]) -> PResult<Vec<Expr>> {
    delimited_list(
        pair(char('('), multispace0),
        expression,
        (multispace0, char(','), multispace0),
        pair(multispace0, char(')')),
    )
    .parse(input)
}

fn path(input: &[u8]) -> PResult<Expr> {
    map(
        pair(rust_name, many0(preceded(char('.'), rust_name))),
        |(first, mut rest)| {
            if first == "g" {
                Expr::Global(rest)
            } else {
                rest.insert(0, first);
                Expr::Var(rest)
            }
        },
    )
    .parse(input)
}

pub fn rust_name(input: &[u8]) -> PResult<String> {
    map(
        recognize(pair(
            take_while1(|c: u8| c.is_ascii_alphabetic() || c == b'_'),
            take_while(|c: u8| c.is_ascii_alphanumeric() || c == b'_'),
        )),
        |name: &[u8]| String::from_utf8_lossy(name).into_owned(),
    )
    .parse(input)
}
