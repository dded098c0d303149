//! Predicate tree to SQL boolean expression.

use serde::{Deserialize, Serialize};

use crate::ast::{DeclaredType, LogicalOp, Method, NodeKind, Predicate, Value};
use crate::error::{PredsqlError, PredsqlResult};
use crate::transpiler::literal::{LiteralChannel, LiteralFormatter};
use crate::transpiler::params::{ParamContext, Parameter};

/// How literal values leave the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LiteralMode {
    /// Inline literal text.
    #[default]
    Inline,
    /// Named parameters with placeholders in the text.
    Bound,
}

/// What to do with `Convert` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConvertPolicy {
    /// Fail with `UnsupportedExpression`.
    #[default]
    Reject,
    /// Render as empty text, dropping the cast.
    Drop,
}

/// Compiler settings; the `[compiler]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub literals: LiteralMode,
    pub convert: ConvertPolicy,
    /// Bound placeholders read `@<prefix>0`, `@<prefix>1`, ...
    pub parameter_prefix: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            literals: LiteralMode::Inline,
            convert: ConvertPolicy::Reject,
            parameter_prefix: "p".to_string(),
        }
    }
}

/// A compiled filter fragment and the parameters its placeholders refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    pub sql: String,
    pub params: Vec<Parameter>,
}

impl CompiledFilter {
    /// An empty fragment means "no constraint".
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// Recursive-descent compiler over [`Predicate`] trees. Holds only options.
#[derive(Debug, Clone, Default)]
pub struct PredicateCompiler {
    options: CompileOptions,
}

impl PredicateCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile according to the configured literal mode.
    pub fn compile(&self, predicate: &Predicate) -> PredsqlResult<CompiledFilter> {
        match self.options.literals {
            LiteralMode::Inline => Ok(CompiledFilter {
                sql: self.compile_inline(predicate)?,
                params: Vec::new(),
            }),
            LiteralMode::Bound => {
                let mut ctx = ParamContext::with_prefix(self.options.parameter_prefix.clone());
                let sql = self.compile_into(predicate, &mut ctx)?;
                Ok(CompiledFilter {
                    sql,
                    params: ctx.into_params(),
                })
            }
        }
    }

    /// Compile with every literal inlined.
    pub fn compile_inline(&self, predicate: &Predicate) -> PredsqlResult<String> {
        self.top_level(predicate, &mut LiteralChannel::Inline)
    }

    /// Compile with literals routed into `ctx`.
    pub fn compile_into(&self, predicate: &Predicate, ctx: &mut ParamContext) -> PredsqlResult<String> {
        self.top_level(predicate, &mut LiteralChannel::Bound(ctx))
    }

    fn top_level(&self, predicate: &Predicate, channel: &mut LiteralChannel<'_>) -> PredsqlResult<String> {
        // A bare true base is what combining zero predicates leaves behind.
        if predicate.is_always_true() {
            return Ok(String::new());
        }
        let sql = self.visit(predicate, channel)?;
        tracing::debug!("Compiled filter ({} nodes): {}", predicate.node_count(), sql);
        Ok(sql)
    }

    fn visit(&self, node: &Predicate, channel: &mut LiteralChannel<'_>) -> PredsqlResult<String> {
        match node {
            Predicate::Comparison { op, left, right } => {
                let l = self.visit(left, channel)?;
                let r = self.visit(right, channel)?;
                let operator = match op.null_keyword() {
                    Some(keyword) if right.is_null_literal() => keyword,
                    _ => op.symbol(),
                };
                Ok(format!("{} {} {}", l, operator, r))
            }
            // The true base of a combined tree: `(1 AND P)` is just `(P)`.
            Predicate::Logical {
                op: LogicalOp::And,
                left,
                right,
            } if left.is_always_true() => Ok(format!("({})", self.visit(right, channel)?)),
            Predicate::Logical { op, left, right } => {
                let l = self.visit(left, channel)?;
                let r = self.visit(right, channel)?;
                Ok(format!("({} {} {})", l, op.keyword(), r))
            }
            Predicate::Not { operand } => Ok(format!("(NOT {})", self.visit(operand, channel)?)),
            Predicate::Member { path } => Ok(path.clone()),
            Predicate::Constant { value, declared } => {
                let declared = declared.clone().unwrap_or_else(|| value.declared_type());
                Ok(channel.literal(value, &declared))
            }
            Predicate::Conditional {
                test,
                if_true,
                if_false,
            } => {
                let test = self.visit(test, channel)?;
                let if_true = self.visit(if_true, channel)?;
                let if_false = self.visit(if_false, channel)?;
                Ok(format!("(CASE WHEN {} THEN {} ELSE {} END)", test, if_true, if_false))
            }
            Predicate::Call {
                method,
                receiver,
                args,
            } => self.visit_call(method, receiver.as_deref(), args, channel),
            Predicate::Convert { target, .. } => match self.options.convert {
                ConvertPolicy::Reject => Err(PredsqlError::unsupported(
                    NodeKind::Convert,
                    format!("cast to {} is not translated", target),
                )),
                ConvertPolicy::Drop => {
                    tracing::warn!("Dropping cast to {}: Convert renders as empty text", target);
                    Ok(String::new())
                }
            },
            Predicate::Parameter { name } => Err(PredsqlError::unsupported(
                NodeKind::Parameter,
                format!("record parameter '{}' has no SQL form", name),
            )),
        }
    }

    fn visit_call(
        &self,
        method: &str,
        receiver: Option<&Predicate>,
        args: &[Predicate],
        channel: &mut LiteralChannel<'_>,
    ) -> PredsqlResult<String> {
        let Some(resolved) = Method::from_name(method) else {
            return Err(PredsqlError::unsupported(
                NodeKind::Call,
                format!("method '{}' is not whitelisted", method),
            ));
        };

        match resolved {
            Method::Equals => {
                let (Some(receiver), [arg]) = (receiver, args) else {
                    return Err(arity_error(resolved, "a receiver and one argument"));
                };
                match (receiver, arg) {
                    (Predicate::Member { path }, Predicate::Constant { value, declared }) => {
                        let declared = declared.clone().unwrap_or_else(|| value.declared_type());
                        Ok(channel.equality(path, value, &declared))
                    }
                    _ => {
                        let l = self.visit(receiver, channel)?;
                        let r = self.visit(arg, channel)?;
                        Ok(format!("{} = {}", l, r))
                    }
                }
            }
            Method::ContainsAny => {
                let (collection, value) = match (receiver, args) {
                    (None, [collection, value]) => (collection, value),
                    (Some(collection), [value]) => (collection, value),
                    _ => return Err(arity_error(resolved, "a collection and a value")),
                };
                let Predicate::Constant {
                    value: Value::List(items),
                    declared,
                } = collection
                else {
                    return Err(PredsqlError::unsupported(
                        NodeKind::Call,
                        format!("{} expects a constant collection, got {}", resolved, collection.kind()),
                    ));
                };
                if items.is_empty() {
                    return Ok(String::new());
                }
                let declared = declared.clone().unwrap_or(DeclaredType::Unknown);
                let element = LiteralFormatter::element_type(items, &declared);
                let target = self.visit(value, channel)?;
                Ok(format!("{} IN ({})", target, channel.in_list(items, &element)))
            }
        }
    }
}

fn arity_error(method: Method, expected: &str) -> PredsqlError {
    PredsqlError::unsupported(NodeKind::Call, format!("{} expects {}", method, expected))
}
