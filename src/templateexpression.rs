use crate::expression::{expression, quoted_string, rust_name, Expr};
use crate::parseresult::{failure, PResult};
use crate::spacelike::{comment, spacelike};
use itertools::Itertools;
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{cut, map, opt, value};
use nom::error::context;
use nom::multi::{many0, many_till};
use nom::sequence::{preceded, terminated};
use nom::Parser;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateExpression {
    Comment,
    Text {
        text: String,
    },
    Expression {
        expr: Expr,
    },
    ForLoop {
        name: String,
        expr: Expr,
        body: Vec<TemplateExpression>,
    },
    IfBlock {
        expr: Expr,
        body: Vec<TemplateExpression>,
        else_body: Option<Vec<TemplateExpression>>,
    },
    /// A named region that descendant templates may override.
    Block {
        name: String,
        body: Vec<TemplateExpression>,
    },
    /// The body of the overridden block, from the closest ancestor.
    Super,
    /// A snippet, rendered with only the given arguments in scope.
    Include {
        path: String,
        args: Vec<(String, Expr)>,
    },
}

impl Display for TemplateExpression {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TemplateExpression::Comment => Ok(()),
            TemplateExpression::Text { text } => write!(out, "{text}"),
            TemplateExpression::Expression { expr } => write!(out, "@{expr}"),
            TemplateExpression::ForLoop { name, expr, .. } => {
                write!(out, "@for {name} in {expr} {{...}}")
            }
            TemplateExpression::IfBlock { expr, .. } => {
                write!(out, "@if {expr} {{...}}")
            }
            TemplateExpression::Block { name, .. } => {
                write!(out, "@block {name} {{...}}")
            }
            TemplateExpression::Super => write!(out, "@super()"),
            TemplateExpression::Include { path, args } => write!(
                out,
                "@include({path:?}{})",
                args.iter()
                    .map(|(name, expr)| format!(", {name} = {expr}"))
                    .join("")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Directive {
    OpenBrace,
    CloseBrace,
    At,
    Super,
    If,
    For,
    Block,
    Include,
    Extends,
}

fn directive(input: &[u8]) -> PResult<Option<Directive>> {
    opt(preceded(
        char('@'),
        alt((
            value(Directive::OpenBrace, char('{')),
            value(Directive::CloseBrace, char('}')),
            value(Directive::At, char('@')),
            value(Directive::Super, tag("super()")),
            value(Directive::Include, tag("include(")),
            value(Directive::Extends, tag("extends(")),
            terminated(
                alt((
                    value(Directive::If, tag("if")),
                    value(Directive::For, tag("for")),
                    value(Directive::Block, tag("block")),
                )),
                multispace1,
            ),
        )),
    ))
    .parse(input)
}

pub fn template_expression(input: &[u8]) -> PResult<TemplateExpression> {
    let (i, found) = directive(input)?;
    match found {
        Some(Directive::OpenBrace) => Ok((i, text("{"))),
        Some(Directive::CloseBrace) => Ok((i, text("}"))),
        Some(Directive::At) => Ok((i, text("@"))),
        Some(Directive::Super) => Ok((i, TemplateExpression::Super)),
        Some(Directive::If) => {
            context("Error in conditional expression:", cut(if_block))
                .parse(i)
        }
        Some(Directive::For) => {
            context("Error in loop expression:", cut(for_loop)).parse(i)
        }
        Some(Directive::Block) => {
            context("Error in block definition:", cut(block_definition))
                .parse(i)
        }
        Some(Directive::Include) => {
            context("Error in snippet inclusion:", cut(include_call))
                .parse(i)
        }
        // Only valid first in a template, where `template` takes it.
        Some(Directive::Extends) => failure(
            input,
            "@extends must come before anything else in the template",
        ),
        None => alt((
            map(comment, |()| TemplateExpression::Comment),
            map(is_not("@{}"), |text: &[u8]| TemplateExpression::Text {
                text: String::from_utf8_lossy(text).into_owned(),
            }),
            map(preceded(char('@'), expression), |expr| {
                TemplateExpression::Expression { expr }
            }),
        ))
        .parse(i),
    }
}

fn text(text: &str) -> TemplateExpression {
    TemplateExpression::Text { text: text.into() }
}

fn if_block(input: &[u8]) -> PResult<TemplateExpression> {
    map(
        (
            context("Expected condition", expression),
            spacelike,
            template_block,
            opt(preceded(
                (spacelike, tag("else"), spacelike),
                alt((
                    // `else if` is an if block as the only else content.
                    map(preceded(tag("@if"), preceded(multispace1, if_block)),
                        |nested| vec![nested]),
                    template_block,
                )),
            )),
        ),
        |(expr, (), body, else_body)| TemplateExpression::IfBlock {
            expr,
            body,
            else_body,
        },
    )
    .parse(input)
}

fn for_loop(input: &[u8]) -> PResult<TemplateExpression> {
    map(
        (
            context("Expected loop variable name", rust_name),
            multispace1,
            context("Expected \"in\"", tag("in")),
            multispace1,
            context("Expected iterable expression", expression),
            spacelike,
            template_block,
        ),
        |(name, _, _, _, expr, (), body)| TemplateExpression::ForLoop {
            name,
            expr,
            body,
        },
    )
    .parse(input)
}

fn block_definition(input: &[u8]) -> PResult<TemplateExpression> {
    map(
        (
            context("Expected block name", rust_name),
            spacelike,
            template_block,
        ),
        |(name, (), body)| TemplateExpression::Block { name, body },
    )
    .parse(input)
}

fn include_call(input: &[u8]) -> PResult<TemplateExpression> {
    map(
        (
            multispace0,
            context("Expected quoted snippet path", quoted_string),
            many0(preceded((multispace0, char(','), multispace0), named_arg)),
            multispace0,
            context("Expected \",\" or \")\"", char(')')),
        ),
        |(_, path, args, _, _)| TemplateExpression::Include { path, args },
    )
    .parse(input)
}

fn named_arg(input: &[u8]) -> PResult<(String, Expr)> {
    map(
        (
            rust_name,
            multispace0,
            char('='),
            multispace0,
            context("Expected argument value", cut(expression)),
        ),
        |(name, _, _, _, expr)| (name, expr),
    )
    .parse(input)
}

fn template_block(input: &[u8]) -> PResult<Vec<TemplateExpression>> {
    preceded(
        context("Expected \"{\"", char('{')),
        map(
            context(
                "Error in expression starting here:",
                cut(many_till(template_expression, char('}'))),
            ),
            |(body, _)| body,
        ),
    )
    .parse(input)
}
