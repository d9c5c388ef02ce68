//! Merging the blocks of an inheritance chain, and rendering the
//! result.

use crate::context::{Context, RenderEnv};
use crate::engine::Engine;
use crate::errors::{Error, Result};
use crate::expression::{Expr, Helper};
use crate::resolver::{Chain, Origin};
use crate::template_utils::ToHtml;
use crate::templateexpression::TemplateExpression;
use crate::value::Value;
use std::collections::HashMap;
use std::io::Write;

/// One definition of a block, and the template it is defined in.
#[derive(Debug, Clone, Copy)]
pub struct BlockDef<'a> {
    pub origin: &'a Origin,
    pub body: &'a [TemplateExpression],
}

/// All block definitions of a chain, by name.
///
/// The definitions of each name are ordered from the most derived
/// template to the most base one.
/// The first one is the effective body of the block; `@super()` in
/// definition `n` renders definition `n + 1`.
#[derive(Debug, Default)]
pub struct BlockTable<'a> {
    blocks: HashMap<&'a str, Vec<BlockDef<'a>>>,
}

impl<'a> BlockTable<'a> {
    /// The definition of `name` at `level`, 0 being the most derived.
    pub fn get(&self, name: &str, level: usize) -> Option<BlockDef<'a>> {
        self.blocks.get(name).and_then(|defs| defs.get(level)).copied()
    }

    /// The body that will actually be rendered for `name`.
    pub fn effective(&self, name: &str) -> Option<BlockDef<'a>> {
        self.get(name, 0)
    }

    /// Number of definitions of `name` in the chain.
    pub fn depth(&self, name: &str) -> usize {
        self.blocks.get(name).map_or(0, Vec::len)
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.blocks.keys().copied()
    }
}

/// Collect the block definitions of all templates in `chain`.
pub fn merge_blocks(chain: &Chain) -> BlockTable<'_> {
    let mut table = BlockTable::default();
    for loaded in chain.iter() {
        for (name, body) in loaded.template.blocks() {
            table.blocks.entry(name).or_default().push(BlockDef {
                origin: &loaded.origin,
                body,
            });
        }
    }
    table
}

/// Variables in scope while rendering: the template context, with
/// loop variables on top.
enum Scope<'s> {
    Root(&'s Context),
    Bound {
        name: &'s str,
        value: &'s Value,
        parent: &'s Scope<'s>,
    },
}

impl<'s> Scope<'s> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        match self {
            Scope::Root(context) => context.get(name),
            Scope::Bound {
                name: bound,
                value,
                parent,
            } => {
                if *bound == name {
                    Some(*value)
                } else {
                    parent.lookup(name)
                }
            }
        }
    }
}

/// The block currently being rendered, for `@super()`.
#[derive(Clone, Copy)]
struct Current<'a> {
    name: &'a str,
    level: usize,
}

pub(crate) struct Renderer<'a> {
    engine: &'a Engine,
    env: &'a RenderEnv,
    chain: &'a Chain,
    table: BlockTable<'a>,
    include_depth: usize,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        env: &'a RenderEnv,
        chain: &'a Chain,
        include_depth: usize,
    ) -> Self {
        Renderer {
            engine,
            env,
            chain,
            table: merge_blocks(chain),
            include_depth,
        }
    }

    pub(crate) fn render(
        &self,
        out: &mut dyn Write,
        context: &Context,
    ) -> Result<()> {
        let root = self.chain.root();
        self.render_nodes(
            out,
            root.template.body(),
            &Scope::Root(context),
            &root.origin,
            None,
        )
    }

    fn render_nodes(
        &self,
        out: &mut dyn Write,
        nodes: &'a [TemplateExpression],
        scope: &Scope<'_>,
        origin: &'a Origin,
        current: Option<Current<'a>>,
    ) -> Result<()> {
        for node in nodes {
            match node {
                TemplateExpression::Comment => (),
                TemplateExpression::Text { text } => {
                    out.write_all(text.as_bytes())?
                }
                TemplateExpression::Expression { expr } => {
                    let value = self.eval(expr, scope, origin)?;
                    if value.is_map() {
                        return Err(Error::NotDisplayable {
                            template: origin.to_string(),
                            expr: expr.to_string(),
                        });
                    }
                    value.to_html(out)?;
                }
                TemplateExpression::ForLoop { name, expr, body } => {
                    let items = match self.eval(expr, scope, origin)? {
                        Value::List(items) => items,
                        Value::Null => Vec::new(),
                        _ => {
                            return Err(Error::NotIterable {
                                template: origin.to_string(),
                                expr: expr.to_string(),
                            })
                        }
                    };
                    for item in &items {
                        let inner = Scope::Bound {
                            name: name.as_str(),
                            value: item,
                            parent: scope,
                        };
                        self.render_nodes(out, body, &inner, origin, current)?;
                    }
                }
                TemplateExpression::IfBlock {
                    expr,
                    body,
                    else_body,
                } => {
                    if self.condition(expr, scope, origin)? {
                        self.render_nodes(out, body, scope, origin, current)?;
                    } else if let Some(else_body) = else_body {
                        self.render_nodes(
                            out, else_body, scope, origin, current,
                        )?;
                    }
                }
                TemplateExpression::Block { name, .. } => {
                    self.render_block(out, name, 0, scope, origin)?;
                }
                TemplateExpression::Super => {
                    // Checked when parsing.
                    if let Some(Current { name, level }) = current {
                        self.render_block(out, name, level + 1, scope, origin)?;
                    }
                }
                TemplateExpression::Include { path, args } => {
                    let params = args
                        .iter()
                        .map(|(name, expr)| -> Result<(String, Value)> {
                            Ok((name.clone(), self.argument(expr, scope, origin)?))
                        })
                        .collect::<Result<Context>>()?;
                    self.engine.render_nested(
                        out,
                        path,
                        &params,
                        self.env,
                        self.include_depth + 1,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn render_block(
        &self,
        out: &mut dyn Write,
        name: &'a str,
        level: usize,
        scope: &Scope<'_>,
        caller: &Origin,
    ) -> Result<()> {
        let def = self.table.get(name, level).ok_or_else(|| {
            Error::NoParentBlock {
                template: caller.to_string(),
                block: name.to_string(),
            }
        })?;
        self.render_nodes(
            out,
            def.body,
            scope,
            def.origin,
            Some(Current { name, level }),
        )
    }

    /// Evaluate a condition; an undefined variable is just false.
    fn condition(
        &self,
        expr: &Expr,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> Result<bool> {
        match self.eval(expr, scope, origin) {
            Ok(value) => Ok(value.is_truthy()),
            Err(Error::UndefinedVariable { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Evaluate a snippet argument; an undefined variable is passed on
    /// as null, for the snippet to test with `@if`.
    fn argument(
        &self,
        expr: &Expr,
        scope: &Scope<'_>,
        origin: &Origin,
    ) -> Result<Value> {
        match self.eval(expr, scope, origin) {
            Err(Error::UndefinedVariable { .. }) => Ok(Value::Null),
            result => result,
        }
    }

    fn eval(&self, expr: &Expr, scope: &Scope<'_>, origin: &Origin) -> Result<Value> {
        let undefined = || Error::UndefinedVariable {
            template: origin.to_string(),
            name: expr.to_string(),
        };
        match expr {
            Expr::Var(path) => {
                let (first, rest) = path.split_first().ok_or_else(undefined)?;
                scope
                    .lookup(first)
                    .and_then(|value| value.get_path(rest))
                    .cloned()
                    .ok_or_else(undefined)
            }
            Expr::Global(path) => self
                .env
                .global_value()
                .get_path(path.as_slice())
                .cloned()
                .ok_or_else(undefined),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Not(inner) => {
                Ok(Value::Bool(!self.condition(inner, scope, origin)?))
            }
            Expr::Call { helper, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, scope, origin))
                    .collect::<Result<Vec<_>>>()?;
                self.call(*helper, &args, origin)
            }
        }
    }

    fn call(&self, helper: Helper, args: &[Value], origin: &Origin) -> Result<Value> {
        let h = self.env.helper_impl();
        match (helper, args) {
            (Helper::CheckAccess, [action, target]) => {
                Ok(Value::Bool(h.check_access(&action.text(), target)))
            }
            (Helper::DisplayName, [obj]) => Ok(Value::String(h.display_name(obj))),
            (Helper::Translate, [key]) => Ok(Value::String(h.translate(&key.text()))),
            (Helper::Markdown, [text]) => Ok(Value::Safe(h.markdown(&text.text()))),
            (Helper::FollowCount, [obj_type, obj_id]) => Ok(Value::Int(
                h.follow_count(&obj_type.text(), &obj_id.text()),
            )),
            _ => Err(Error::HelperArguments {
                template: origin.to_string(),
                helper: helper.name(),
            }),
        }
    }
}
