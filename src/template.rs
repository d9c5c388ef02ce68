use crate::errors::{Error, Result};
use crate::expression::quoted_string;
use crate::parseresult::{show_errors, PResult};
use crate::spacelike::spacelike;
use crate::templateexpression::{template_expression, TemplateExpression};
use nom::bytes::complete::tag;
use nom::character::complete::{char, multispace0};
use nom::combinator::{cut, eof, map, opt, value};
use nom::error::context;
use nom::multi::many_till;
use nom::sequence::{delimited, preceded, terminated};
use nom::Parser;
use std::collections::BTreeSet;

/// A parsed template.
///
/// A template either extends a parent, in which case only its block
/// definitions matter, or is a base page whose body is rendered with
/// blocks substituted.
#[derive(Debug, PartialEq, Eq)]
pub struct Template {
    extends: Option<String>,
    body: Vec<TemplateExpression>,
}

impl Template {
    /// Parse and check the source of the template named `name`.
    pub fn parse(name: &str, source: &[u8]) -> Result<Template> {
        let template = match template(source) {
            Ok((_, template)) => template,
            Err(err) => {
                let mut message = Vec::new();
                show_errors(&mut message, source, &err, "")?;
                return Err(Error::Parse {
                    template: name.to_string(),
                    message: String::from_utf8_lossy(&message).into_owned(),
                });
            }
        };
        template.check(name)?;
        Ok(template)
    }

    /// The logical path of the parent template, if any.
    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    pub fn body(&self) -> &[TemplateExpression] {
        &self.body
    }

    /// All block definitions in this template, nested ones included,
    /// in document order.
    pub fn blocks(&self) -> Vec<(&str, &[TemplateExpression])> {
        let mut blocks = Vec::new();
        collect_blocks(&self.body, &mut blocks);
        blocks
    }

    fn check(&self, name: &str) -> Result<()> {
        let mut seen = BTreeSet::new();
        for (block, _) in self.blocks() {
            if !seen.insert(block) {
                return Err(Error::DuplicateBlock {
                    template: name.to_string(),
                    block: block.to_string(),
                });
            }
        }
        check_nodes(name, &self.body, false)
    }
}

fn collect_blocks<'a>(
    nodes: &'a [TemplateExpression],
    blocks: &mut Vec<(&'a str, &'a [TemplateExpression])>,
) {
    for node in nodes {
        match node {
            TemplateExpression::Block { name, body } => {
                blocks.push((name.as_str(), body.as_slice()));
                collect_blocks(body, blocks);
            }
            TemplateExpression::ForLoop { body, .. } => {
                collect_blocks(body, blocks);
            }
            TemplateExpression::IfBlock {
                body, else_body, ..
            } => {
                collect_blocks(body, blocks);
                if let Some(else_body) = else_body {
                    collect_blocks(else_body, blocks);
                }
            }
            _ => (),
        }
    }
}

fn check_nodes(
    name: &str,
    nodes: &[TemplateExpression],
    in_block: bool,
) -> Result<()> {
    for node in nodes {
        match node {
            TemplateExpression::Super if !in_block => {
                return Err(Error::SuperOutsideBlock {
                    template: name.to_string(),
                });
            }
            TemplateExpression::Block { body, .. } => {
                check_nodes(name, body, true)?;
            }
            TemplateExpression::ForLoop { body, .. } => {
                check_nodes(name, body, in_block)?;
            }
            TemplateExpression::IfBlock {
                body, else_body, ..
            } => {
                check_nodes(name, body, in_block)?;
                if let Some(else_body) = else_body {
                    check_nodes(name, else_body, in_block)?;
                }
            }
            TemplateExpression::Include { path, args } => {
                let mut seen = BTreeSet::new();
                for (arg, _) in args {
                    if !seen.insert(arg) {
                        return Err(Error::DuplicateParameter {
                            template: name.to_string(),
                            snippet: path.clone(),
                            parameter: arg.clone(),
                        });
                    }
                }
            }
            _ => (),
        }
    }
    Ok(())
}

fn template(input: &[u8]) -> PResult<Template> {
    map(
        (
            spacelike,
            opt(terminated(extends, spacelike)),
            many_till(template_expression, end),
        ),
        |((), extends, (body, ()))| Template { extends, body },
    )
    .parse(input)
}

fn extends(input: &[u8]) -> PResult<String> {
    preceded(
        tag("@extends("),
        cut(delimited(
            multispace0,
            context("Expected quoted parent template path", quoted_string),
            preceded(multispace0, context("Expected \")\"", char(')'))),
        )),
    )
    .parse(input)
}

fn end(input: &[u8]) -> PResult<()> {
    value((), eof).parse(input)
}
