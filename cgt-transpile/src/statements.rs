//! Statement translation
//!
//! C control flow mostly maps onto Go directly; the two places it does not
//! are loops whose condition or update carries side effects (lowered to
//! closures so `continue` still reaches the update) and switch, where the
//! default fall-through direction is reversed. Case bodies are flattened
//! into lexical groups and a `fallthrough` is appended to every group that
//! does not end in a jump; trailing `break`s disappear because Go breaks
//! implicitly.
//!
//! A statement that fails to translate with a recoverable error becomes a
//! comment in the output plus a warning diagnostic; translation continues
//! with the next statement.

use crate::go_ast::{GoCase, GoExpr, GoStmt};
use crate::Transpiler;
use cgt_ast::{CType, Expression, Statement, StatementKind};
use cgt_common::{SourceLocation, TranspileError};

/// One flattened switch case: its labels and the statements up to the next
/// label
struct CaseGroup<'a> {
    /// Empty marks the default case
    values: Vec<&'a Expression>,
    is_default: bool,
    stmts: Vec<&'a Statement>,
}

/// True if control cannot run off the end of this statement
fn terminates(s: &Statement) -> bool {
    match &s.kind {
        StatementKind::Break
        | StatementKind::Continue
        | StatementKind::Return(_)
        | StatementKind::Goto(_) => true,
        StatementKind::Compound(stmts) => stmts.last().is_some_and(terminates),
        StatementKind::If {
            then_stmt,
            else_stmt: Some(els),
            ..
        } => terminates(then_stmt) && terminates(els),
        StatementKind::Label { statement, .. } => terminates(statement),
        _ => false,
    }
}

/// Strip nested case/default labels off a statement, collecting them.
/// Returns the labelled statement itself, if any.
fn peel_labels<'a>(
    stmt: &'a Statement,
    values: &mut Vec<&'a Expression>,
    is_default: &mut bool,
) -> Option<&'a Statement> {
    match &stmt.kind {
        StatementKind::Case { value, statement } => {
            values.push(value);
            peel_labels(statement, values, is_default)
        }
        StatementKind::Default { statement } => {
            *is_default = true;
            peel_labels(statement, values, is_default)
        }
        StatementKind::Empty => None,
        _ => Some(stmt),
    }
}

/// A case/default label anywhere inside the statement, at this switch's
/// nesting level. Does not look into nested switches: their labels bind
/// there.
fn contains_case_label(stmt: &Statement) -> bool {
    match &stmt.kind {
        StatementKind::Case { .. } | StatementKind::Default { .. } => true,
        StatementKind::Compound(stmts) => stmts.iter().any(contains_case_label),
        StatementKind::Label { statement, .. } => contains_case_label(statement),
        _ => false,
    }
}

/// Split a switch body into lexical case groups. Case labels count in
/// lexical order even when a block nests them inside another case's body.
fn flatten_cases(body: &Statement) -> Vec<CaseGroup<'_>> {
    let mut groups: Vec<CaseGroup<'_>> = Vec::new();
    match &body.kind {
        StatementKind::Compound(stmts) => {
            for s in stmts {
                flatten_into(s, &mut groups);
            }
        }
        _ => flatten_into(body, &mut groups),
    }
    groups
}

fn flatten_into<'a>(child: &'a Statement, groups: &mut Vec<CaseGroup<'a>>) {
    let mut values = Vec::new();
    let mut is_default = false;
    let inner = peel_labels(child, &mut values, &mut is_default);

    if !values.is_empty() || is_default {
        groups.push(CaseGroup {
            values,
            is_default,
            stmts: Vec::new(),
        });
    }
    let Some(inner) = inner else { return };

    // A block hiding further labels is transparent: its children join the
    // lexical case order.
    if let StatementKind::Compound(stmts) = &inner.kind {
        if stmts.iter().any(contains_case_label) {
            for s in stmts {
                flatten_into(s, groups);
            }
            return;
        }
    }

    // Plain statement: belongs to the current group. Statements before
    // the first label are unreachable in C and dropped.
    if let Some(group) = groups.last_mut() {
        group.stmts.push(inner);
    }
}

impl Transpiler {
    /// Translate one C statement into Go statements
    pub(crate) fn statement(&mut self, s: &Statement) -> Result<Vec<GoStmt>, TranspileError> {
        match &s.kind {
            StatementKind::Expression(e) => self.expression_stmts(e),
            StatementKind::Compound(stmts) => {
                Ok(vec![GoStmt::Block(self.statement_list(stmts)?)])
            }
            StatementKind::Declaration(decls) => {
                let mut out = Vec::new();
                for d in decls {
                    out.extend(self.local_decl(d)?);
                }
                Ok(out)
            }
            StatementKind::If {
                condition,
                then_stmt,
                else_stmt,
            } => {
                let (cond, pre, cpost) = self.condition(condition)?;
                let then = self.block_stmts(then_stmt)?;
                let els = match else_stmt {
                    Some(e) => self.block_stmts(e)?,
                    None => Vec::new(),
                };
                Ok(self.branch_on(cond, pre, cpost, then, els))
            }
            StatementKind::While { condition, body } => {
                let go_cond = self.loop_condition(condition)?;
                Ok(vec![GoStmt::For {
                    init: None,
                    cond: Some(go_cond),
                    post: None,
                    body: self.block_stmts(body)?,
                }])
            }
            StatementKind::DoWhile { body, condition } => {
                // Go has no do-while; run the body once, then test at the
                // bottom of an infinite loop.
                let mut loop_body = self.block_stmts(body)?;
                let (cond, cpre, cpost) = self.condition(condition)?;
                let exit = vec![GoStmt::Break];
                let not = |c: GoExpr| GoExpr::Unary {
                    op: "!",
                    operand: Box::new(c),
                };
                loop_body.extend(cpre);
                if cpost.is_empty() {
                    loop_body.push(GoStmt::If {
                        cond: not(cond),
                        then: exit,
                        els: vec![],
                    });
                } else {
                    let tmp = self.fresh_temp();
                    loop_body.push(GoStmt::Define {
                        name: tmp.clone(),
                        value: cond,
                    });
                    loop_body.extend(cpost);
                    loop_body.push(GoStmt::If {
                        cond: not(GoExpr::ident(&tmp)),
                        then: exit,
                        els: vec![],
                    });
                }
                Ok(vec![GoStmt::For {
                    init: None,
                    cond: None,
                    post: None,
                    body: loop_body,
                }])
            }
            StatementKind::For {
                init,
                condition,
                update,
                body,
            } => self.for_stmt(init.as_deref(), condition.as_ref(), update.as_ref(), body),
            StatementKind::Switch { selector, body } => self.switch_stmt(selector, body, &s.loc),
            StatementKind::Case { .. } | StatementKind::Default { .. } => {
                Err(TranspileError::UnsupportedConstruct {
                    construct: "case label outside switch".to_string(),
                    location: s.loc.clone(),
                })
            }
            StatementKind::Break => Ok(vec![GoStmt::Break]),
            StatementKind::Continue => Ok(vec![GoStmt::Continue]),
            StatementKind::Return(value) => match (value, self.current_return.clone()) {
                (None, _) => Ok(vec![GoStmt::Return(None)]),
                (Some(e), Some(target)) => self.return_branch(e, &target),
                // Void context (including main): evaluate for effects only.
                (Some(e), None) => {
                    let mut out = self.expression_stmts(e)?;
                    out.push(GoStmt::Return(None));
                    Ok(out)
                }
            },
            StatementKind::Goto(label) => Ok(vec![GoStmt::Goto(label.clone())]),
            StatementKind::Label { name, statement } => {
                let mut out = vec![GoStmt::Label(name.clone())];
                out.extend(self.statement(statement)?);
                Ok(out)
            }
            StatementKind::Empty => Ok(vec![]),
        }
    }

    /// Translate a statement list, downgrading recoverable failures to
    /// warnings with a comment placeholder
    pub(crate) fn statement_list(
        &mut self,
        stmts: &[Statement],
    ) -> Result<Vec<GoStmt>, TranspileError> {
        let mut out = Vec::new();
        for s in stmts {
            match self.statement(s) {
                Ok(v) => out.extend(v),
                Err(err) if err.is_recoverable() => {
                    self.sink.recovered(&err);
                    out.push(GoStmt::Comment(format!("not translated: {err}")));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(out)
    }

    /// A statement used as a loop or branch body, without an extra brace
    /// level when it is already a compound statement
    pub(crate) fn block_stmts(&mut self, s: &Statement) -> Result<Vec<GoStmt>, TranspileError> {
        match &s.kind {
            StatementKind::Compound(stmts) => self.statement_list(stmts),
            _ => self.statement(s),
        }
    }

    /// Build an if statement, keeping condition side effects ordered
    fn branch_on(
        &mut self,
        cond: GoExpr,
        mut pre: Vec<GoStmt>,
        cpost: Vec<GoStmt>,
        then: Vec<GoStmt>,
        els: Vec<GoStmt>,
    ) -> Vec<GoStmt> {
        if cpost.is_empty() {
            pre.push(GoStmt::If { cond, then, els });
        } else {
            let tmp = self.fresh_temp();
            pre.push(GoStmt::Define {
                name: tmp.clone(),
                value: cond,
            });
            pre.extend(cpost);
            pre.push(GoStmt::If {
                cond: GoExpr::ident(&tmp),
                then,
                els,
            });
        }
        pre
    }

    /// A loop condition; side effects move into a bool closure so they run
    /// on every iteration
    fn loop_condition(&mut self, condition: &Expression) -> Result<GoExpr, TranspileError> {
        let (cond, pre, post) = self.condition(condition)?;
        if pre.is_empty() && post.is_empty() {
            Ok(cond)
        } else {
            Ok(self.bool_closure(pre, cond, post))
        }
    }

    fn for_stmt(
        &mut self,
        init: Option<&Statement>,
        condition: Option<&Expression>,
        update: Option<&Expression>,
        body: &Statement,
    ) -> Result<Vec<GoStmt>, TranspileError> {
        let init_stmts = match init {
            Some(s) => self.statement(s)?,
            None => Vec::new(),
        };
        let cond = match condition {
            Some(c) => Some(self.loop_condition(c)?),
            None => None,
        };
        // The update must stay in the post position so `continue` reaches
        // it; multi-statement updates become a closure call, which is a
        // valid Go post statement.
        let post = match update {
            Some(u) => {
                let stmts = self.expression_stmts(u)?;
                match stmts.len() {
                    0 => None,
                    1 if matches!(
                        stmts[0],
                        GoStmt::Assign { .. }
                            | GoStmt::IncDec { .. }
                            | GoStmt::Expr(_)
                            | GoStmt::Define { .. }
                    ) =>
                    {
                        Some(Box::new(stmts.into_iter().next().unwrap_or(GoStmt::Break)))
                    }
                    _ => Some(Box::new(GoStmt::Expr(GoExpr::call(
                        GoExpr::FuncLit {
                            result: None,
                            body: stmts,
                        },
                        vec![],
                    )))),
                }
            }
            None => None,
        };
        let go_for = GoStmt::For {
            init: None,
            cond,
            post,
            body: self.block_stmts(body)?,
        };
        if init_stmts.is_empty() {
            Ok(vec![go_for])
        } else {
            // Keep the init variables scoped to the loop.
            let mut block = init_stmts;
            block.push(go_for);
            Ok(vec![GoStmt::Block(block)])
        }
    }

    fn switch_stmt(
        &mut self,
        selector: &Expression,
        body: &Statement,
        loc: &SourceLocation,
    ) -> Result<Vec<GoStmt>, TranspileError> {
        let t = self.expression(selector)?;
        let tag = match t.ctype.canonical() {
            c if c.is_integer() => t.expr,
            // A comparison result as a selector: bridge it to an int so
            // case values compare against 0/1.
            CType::Bool => self.cast_value(t.expr, &CType::Bool, &CType::Int, loc)?,
            c => {
                return Err(TranspileError::IncompatibleOperands {
                    message: format!("switch selector of non-integer type {c}"),
                    location: loc.clone(),
                })
            }
        };

        let groups = flatten_cases(body);
        let last = groups.len().saturating_sub(1);
        let mut cases = Vec::with_capacity(groups.len());
        for (i, group) in groups.iter().enumerate() {
            // A body labelled both `case N:` and `default:` is reachable
            // for every selector value; default alone expresses that.
            let mut values = Vec::new();
            if !group.is_default {
                for v in &group.values {
                    let tv = self.expression(v)?;
                    values.push(tv.expr);
                }
            }

            let mut stmts = group.stmts.clone();
            let ends_in_jump = stmts.last().is_some_and(|s| terminates(s));
            // Go breaks out of a case implicitly.
            if matches!(stmts.last().map(|s| &s.kind), Some(StatementKind::Break)) {
                stmts.pop();
            }

            let mut case_body = Vec::new();
            for s in &stmts {
                match self.statement(s) {
                    Ok(v) => case_body.extend(v),
                    Err(err) if err.is_recoverable() => {
                        self.sink.recovered(&err);
                        case_body.push(GoStmt::Comment(format!("not translated: {err}")));
                    }
                    Err(err) => return Err(err),
                }
            }

            if !ends_in_jump && i < last {
                case_body.push(GoStmt::Fallthrough);
            }
            cases.push(GoCase {
                values,
                body: case_body,
            });
        }

        let mut out = t.pre;
        out.push(GoStmt::Switch {
            tag: Some(tag),
            cases,
        });
        out.extend(t.post);
        Ok(out)
    }
}
