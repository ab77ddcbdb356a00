//! Expression translation
//!
//! Every C expression translates to a Go expression plus two statement
//! lists: `pre` runs before the enclosing statement and `post` after it.
//! That is how side effects Go cannot express inline (postfix steps, the
//! comma operator, embedded assignments) survive the trip: the caller
//! splices the lists around wherever it places the value.
//!
//! Comparison and logical results are carried as Go `bool` with a C type
//! of `_Bool`; `cast_value` inserts the `noarch.BoolToInt32` bridge the
//! moment an integer context needs them.

use crate::go_ast::{GoExpr, GoStmt, GoType};
use crate::pointer::{self, PointerRepresentation};
use crate::shim::{BOOL_TO_INT, C_STRING, NOARCH_PACKAGE};
use crate::type_mapper;
use crate::Transpiler;
use cgt_ast::{BinaryOp, CType, Expression, ExpressionKind, UnaryOp};
use cgt_common::{SourceLocation, TranspileError};

/// Result of translating one C expression
#[derive(Debug, Clone)]
pub struct Translated {
    pub expr: GoExpr,
    /// C type of the value `expr` computes. `_Bool` marks a Go bool that
    /// has not been bridged to an integer yet.
    pub ctype: CType,
    /// Statements that must run before the enclosing statement
    pub pre: Vec<GoStmt>,
    /// Statements that must run after it
    pub post: Vec<GoStmt>,
}

impl Translated {
    fn pure(expr: GoExpr, ctype: CType) -> Self {
        Self {
            expr,
            ctype,
            pre: Vec::new(),
            post: Vec::new(),
        }
    }
}

/// Array-to-pointer decay: the value becomes a full slice of the array
pub(crate) fn decayed(t: Translated) -> Translated {
    if let CType::Array { element, .. } = t.ctype.canonical() {
        let element = element.clone();
        Translated {
            expr: pointer::rebase(t.expr, GoExpr::IntLit(0)),
            ctype: CType::Pointer(element),
            pre: t.pre,
            post: t.post,
        }
    } else {
        t
    }
}

fn zero_literal(ctype: &CType) -> GoExpr {
    if ctype.is_float() {
        GoExpr::FloatLit(0.0)
    } else {
        GoExpr::IntLit(0)
    }
}

fn go_binop(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::LeftShift => "<<",
        BinaryOp::RightShift => ">>",
        BinaryOp::LogicalAnd => "&&",
        BinaryOp::LogicalOr => "||",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::Less => "<",
        BinaryOp::Greater => ">",
        BinaryOp::LessEqual => "<=",
        BinaryOp::GreaterEqual => ">=",
        _ => "=",
    }
}

fn go_assign_op(base: BinaryOp) -> &'static str {
    match base {
        BinaryOp::Add => "+=",
        BinaryOp::Sub => "-=",
        BinaryOp::Mul => "*=",
        BinaryOp::Div => "/=",
        BinaryOp::Mod => "%=",
        BinaryOp::BitAnd => "&=",
        BinaryOp::BitOr => "|=",
        BinaryOp::BitXor => "^=",
        BinaryOp::LeftShift => "<<=",
        BinaryOp::RightShift => ">>=",
        _ => "=",
    }
}

/// Integer promotion: everything below `int` becomes `int`
fn promote_int(t: &CType) -> CType {
    match t.canonical() {
        CType::Bool
        | CType::Char
        | CType::SignedChar
        | CType::UnsignedChar
        | CType::Short
        | CType::UnsignedShort
        | CType::Enum { .. } => CType::Int,
        other => other.clone(),
    }
}

fn int_rank(t: &CType) -> u8 {
    match t.canonical() {
        CType::Int | CType::UnsignedInt => 3,
        CType::Long | CType::UnsignedLong => 4,
        CType::LongLong | CType::UnsignedLongLong => 5,
        _ => 3,
    }
}

fn make_int(rank: u8, unsigned: bool) -> CType {
    match (rank, unsigned) {
        (3, false) => CType::Int,
        (3, true) => CType::UnsignedInt,
        (4, false) => CType::Long,
        (4, true) => CType::UnsignedLong,
        (5, false) => CType::LongLong,
        (5, true) => CType::UnsignedLongLong,
        _ => CType::Int,
    }
}

/// Usual arithmetic conversions: the common type two operands compute in
fn usual_arithmetic(left: &CType, right: &CType) -> CType {
    for float in [CType::LongDouble, CType::Double, CType::Float] {
        if *left.canonical() == float || *right.canonical() == float {
            return float;
        }
    }
    let pl = promote_int(left);
    let pr = promote_int(right);
    if pl == pr {
        return pl;
    }
    let (rl, ul) = (int_rank(&pl), pl.is_unsigned_integer());
    let (rr, ur) = (int_rank(&pr), pr.is_unsigned_integer());
    // On LP64 a wider signed type holds every value of a narrower unsigned
    // one, so the higher rank decides signedness when ranks differ.
    let unsigned = if rl == rr {
        ul || ur
    } else if rl > rr {
        ul
    } else {
        ur
    };
    make_int(rl.max(rr), unsigned)
}

impl Transpiler {
    /// Translate one C expression into a Go value
    pub(crate) fn expression(&mut self, e: &Expression) -> Result<Translated, TranspileError> {
        match &e.kind {
            ExpressionKind::IntLiteral(v) => {
                Ok(Translated::pure(GoExpr::IntLit(*v), e.ctype.clone()))
            }
            ExpressionKind::FloatLiteral(v) => {
                Ok(Translated::pure(GoExpr::FloatLit(*v), e.ctype.clone()))
            }
            ExpressionKind::CharLiteral(b) => {
                Ok(Translated::pure(GoExpr::IntLit(i64::from(*b)), CType::Char))
            }
            ExpressionKind::StringLiteral(s) => {
                self.uses_noarch = true;
                let call = GoExpr::call(
                    GoExpr::qualified(NOARCH_PACKAGE, C_STRING),
                    vec![GoExpr::StringLit(s.clone())],
                );
                Ok(Translated::pure(call, CType::Pointer(Box::new(CType::Char))))
            }
            ExpressionKind::Identifier(name) => {
                // No local scope tracking here: a local that shadows an
                // enumerator name still folds to the enum constant.
                if let Some(entry) = self.enums.lookup(name) {
                    return Ok(Translated::pure(GoExpr::IntLit(entry.value), CType::Int));
                }
                Ok(Translated::pure(GoExpr::ident(name), e.ctype.clone()))
            }
            ExpressionKind::Binary { op, left, right } => self.binary(e, *op, left, right),
            ExpressionKind::Unary { op, operand } => self.unary(e, *op, operand),
            ExpressionKind::Call {
                function,
                arguments,
            } => self.call_expr(function, arguments),
            ExpressionKind::Member {
                object,
                member,
                is_arrow,
            } => {
                let t = self.expression(object)?;
                let base = if *is_arrow {
                    if object.ctype.is_void_pointer() {
                        return Err(TranspileError::UnsupportedConstruct {
                            construct: "member access through void pointer".to_string(),
                            location: e.loc.clone(),
                        });
                    }
                    pointer::deref(t.expr)
                } else {
                    t.expr
                };
                Ok(Translated {
                    expr: GoExpr::selector(base, member),
                    ctype: e.ctype.clone(),
                    pre: t.pre,
                    post: t.post,
                })
            }
            ExpressionKind::Index { base, index } => {
                let b = self.expression(base)?;
                let i = self.expression(index)?;
                let mut pre = b.pre;
                pre.extend(i.pre);
                let mut post = b.post;
                post.extend(i.post);
                Ok(Translated {
                    expr: GoExpr::index(b.expr, i.expr),
                    ctype: e.ctype.clone(),
                    pre,
                    post,
                })
            }
            ExpressionKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => self.conditional(e, condition, then_expr, else_expr),
            ExpressionKind::Cast { target, operand } => {
                if target.is_void() {
                    let stmts = self.expression_stmts(operand)?;
                    return Ok(Translated {
                        expr: GoExpr::Nil,
                        ctype: CType::Void,
                        pre: stmts,
                        post: Vec::new(),
                    });
                }
                let t = decayed(self.expression(operand)?);
                let expr = self.cast_value(t.expr, &t.ctype, target, &e.loc)?;
                Ok(Translated {
                    expr,
                    ctype: target.clone(),
                    pre: t.pre,
                    post: t.post,
                })
            }
            ExpressionKind::SizeofExpr(inner) => {
                // The operand is not evaluated; only its type matters.
                let size = type_mapper::size_of(&inner.ctype, &e.loc)?;
                Ok(Translated::pure(
                    GoExpr::IntLit(size as i64),
                    CType::UnsignedLong,
                ))
            }
            ExpressionKind::SizeofType(t) => {
                let size = type_mapper::size_of(t, &e.loc)?;
                Ok(Translated::pure(
                    GoExpr::IntLit(size as i64),
                    CType::UnsignedLong,
                ))
            }
            ExpressionKind::Unsupported { description } => {
                let err = TranspileError::UnsupportedConstruct {
                    construct: description.clone(),
                    location: e.loc.clone(),
                };
                self.sink.recovered(&err);
                let result = type_mapper::resolve(&e.ctype, &e.loc).ok();
                let body = vec![GoStmt::Expr(GoExpr::call(
                    GoExpr::ident("panic"),
                    vec![GoExpr::StringLit(format!("not translated: {description}"))],
                ))];
                Ok(Translated::pure(
                    GoExpr::call(GoExpr::FuncLit { result, body }, vec![]),
                    e.ctype.clone(),
                ))
            }
        }
    }

    /// Translate an expression whose value is discarded
    pub(crate) fn expression_stmts(
        &mut self,
        e: &Expression,
    ) -> Result<Vec<GoStmt>, TranspileError> {
        match &e.kind {
            ExpressionKind::Binary { op, left, right } if op.is_assignment() => {
                let (mut pre, _, post, _) = self.assign_parts(*op, left, right, &e.loc)?;
                pre.extend(post);
                Ok(pre)
            }
            ExpressionKind::Binary {
                op: BinaryOp::Comma,
                left,
                right,
            } => {
                let mut out = self.expression_stmts(left)?;
                out.extend(self.expression_stmts(right)?);
                Ok(out)
            }
            ExpressionKind::Unary { op, operand }
                if op.is_increment() || op.is_decrement() =>
            {
                let t = self.expression(operand)?;
                let step = self.step_stmt(&t.expr, &operand.ctype, op.is_decrement(), &e.loc)?;
                let mut out = t.pre;
                out.push(step);
                out.extend(t.post);
                Ok(out)
            }
            ExpressionKind::Cast { target, operand } if target.is_void() => {
                self.expression_stmts(operand)
            }
            ExpressionKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let (cond, mut out, cpost) = self.condition(condition)?;
                let then = self.expression_stmts(then_expr)?;
                let els = self.expression_stmts(else_expr)?;
                if cpost.is_empty() {
                    out.push(GoStmt::If { cond, then, els });
                } else {
                    let tmp = self.fresh_temp();
                    out.push(GoStmt::Define {
                        name: tmp.clone(),
                        value: cond,
                    });
                    out.extend(cpost);
                    out.push(GoStmt::If {
                        cond: GoExpr::ident(&tmp),
                        then,
                        els,
                    });
                }
                Ok(out)
            }
            ExpressionKind::Call { .. } => {
                let t = self.expression(e)?;
                let mut out = t.pre;
                out.push(GoStmt::Expr(t.expr));
                out.extend(t.post);
                Ok(out)
            }
            _ => {
                let t = self.expression(e)?;
                let mut out = t.pre;
                if e.has_side_effects() {
                    // Something in the value itself (an embedded call) still
                    // needs evaluating.
                    out.push(GoStmt::Assign {
                        lhs: GoExpr::ident("_"),
                        op: "=",
                        rhs: t.expr,
                    });
                }
                out.extend(t.post);
                Ok(out)
            }
        }
    }

    /// Translate an expression into a Go boolean for if/while/for
    pub(crate) fn condition(
        &mut self,
        e: &Expression,
    ) -> Result<(GoExpr, Vec<GoStmt>, Vec<GoStmt>), TranspileError> {
        let t = decayed(self.expression(e)?);
        let cond = match t.ctype.canonical() {
            CType::Bool => t.expr,
            c if c.is_arithmetic() => GoExpr::binary("!=", t.expr, zero_literal(c)),
            c if c.is_pointer() || matches!(c, CType::Function { .. }) => {
                GoExpr::binary("!=", t.expr, GoExpr::Nil)
            }
            c => {
                return Err(TranspileError::IncompatibleOperands {
                    message: format!("expression of type {c} used as a condition"),
                    location: e.loc.clone(),
                })
            }
        };
        Ok((cond, t.pre, t.post))
    }

    /// Convert a translated value from one C type to another.
    ///
    /// Handles the bool bridge, numeric conversions, null constants, decay
    /// leftovers and the `void*` round trip. Integer/pointer mixing is
    /// rejected: the slice representation has no address to reinterpret.
    pub(crate) fn cast_value(
        &mut self,
        value: GoExpr,
        from: &CType,
        to: &CType,
        loc: &SourceLocation,
    ) -> Result<GoExpr, TranspileError> {
        let from_c = from.canonical();
        let to_c = to.canonical();
        if from_c == to_c || to_c.is_void() {
            return Ok(value);
        }

        if matches!(from_c, CType::Bool) && to_c.is_arithmetic() {
            self.uses_noarch = true;
            let as_int = GoExpr::call(
                GoExpr::qualified(NOARCH_PACKAGE, BOOL_TO_INT),
                vec![value],
            );
            return if matches!(to_c, CType::Int) {
                Ok(as_int)
            } else {
                Ok(GoExpr::Conv {
                    ty: type_mapper::resolve(to_c, loc)?,
                    expr: Box::new(as_int),
                })
            };
        }
        if matches!(to_c, CType::Bool) && from_c.is_arithmetic() {
            return Ok(GoExpr::binary("!=", value, zero_literal(from_c)));
        }
        if from_c.is_arithmetic() && to_c.is_arithmetic() {
            let from_go = type_mapper::resolve(from_c, loc)?;
            let to_go = type_mapper::resolve(to_c, loc)?;
            return if from_go == to_go {
                Ok(value)
            } else {
                Ok(GoExpr::Conv {
                    ty: to_go,
                    expr: Box::new(value),
                })
            };
        }
        if from_c.is_integer() && to_c.is_pointer() {
            if matches!(value, GoExpr::IntLit(0)) {
                return Ok(GoExpr::Nil);
            }
            return Err(TranspileError::IncompatibleOperands {
                message: "integer to pointer conversion has no slice equivalent".to_string(),
                location: loc.clone(),
            });
        }
        if from_c.is_pointer_like() && to_c.is_integer() {
            return Err(TranspileError::IncompatibleOperands {
                message: "pointer to integer conversion has no slice equivalent".to_string(),
                location: loc.clone(),
            });
        }
        if from_c.is_pointer_like() && to_c.is_pointer() {
            if to_c.is_void_pointer() {
                return Ok(value);
            }
            if from_c.is_void_pointer() {
                // Cast back from void*: assert the concrete slice type.
                return Ok(GoExpr::TypeAssert {
                    expr: Box::new(value),
                    ty: type_mapper::resolve(to_c, loc)?,
                });
            }
            if from_c.pointee() == to_c.pointee() {
                return Ok(value);
            }
            return Err(TranspileError::IncompatibleOperands {
                message: format!("incompatible pointer conversion from {from} to {to}"),
                location: loc.clone(),
            });
        }
        if matches!(from_c, CType::Function { .. }) && to_c.is_function_pointer() {
            return Ok(value);
        }
        Err(TranspileError::IncompatibleOperands {
            message: format!("cannot convert {from} to {to}"),
            location: loc.clone(),
        })
    }

    fn binary(
        &mut self,
        e: &Expression,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
    ) -> Result<Translated, TranspileError> {
        match op {
            BinaryOp::Comma => {
                let mut pre = self.expression_stmts(left)?;
                let r = self.expression(right)?;
                pre.extend(r.pre);
                Ok(Translated {
                    expr: r.expr,
                    ctype: r.ctype,
                    pre,
                    post: r.post,
                })
            }
            op if op.is_assignment() => {
                let (pre, lvalue, post, ctype) = self.assign_parts(op, left, right, &e.loc)?;
                Ok(Translated {
                    expr: lvalue,
                    ctype,
                    pre,
                    post,
                })
            }
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
                let (lc, lpre, lpost) = self.condition(left)?;
                let (rc, rpre, rpost) = self.condition(right)?;
                // Side effects in the right operand must stay behind the
                // short circuit, so they move into a closure.
                let rhs = if rpre.is_empty() && rpost.is_empty() {
                    rc
                } else {
                    self.bool_closure(rpre, rc, rpost)
                };
                Ok(Translated {
                    expr: GoExpr::binary(go_binop(op), lc, rhs),
                    ctype: CType::Bool,
                    pre: lpre,
                    post: lpost,
                })
            }
            op if op.is_comparison() => self.comparison(op, left, right, &e.loc),
            BinaryOp::Add | BinaryOp::Sub
                if left.ctype.is_pointer_like() || right.ctype.is_pointer_like() =>
            {
                self.pointer_add_sub(op, left, right, &e.loc)
            }
            BinaryOp::LeftShift | BinaryOp::RightShift => {
                let l = self.expression(left)?;
                let r = self.expression(right)?;
                let mut pre = l.pre;
                pre.extend(r.pre);
                let mut post = l.post;
                post.extend(r.post);
                let shifted_ty = promote_int(&l.ctype);
                let le = self.cast_value(l.expr, &l.ctype, &shifted_ty, &e.loc)?;
                // Go accepts any integer type as a shift count.
                Ok(Translated {
                    expr: GoExpr::binary(go_binop(op), le, r.expr),
                    ctype: shifted_ty,
                    pre,
                    post,
                })
            }
            _ => {
                let l = decayed(self.expression(left)?);
                let r = decayed(self.expression(right)?);
                let mut pre = l.pre.clone();
                pre.extend(r.pre.clone());
                let mut post = l.post.clone();
                post.extend(r.post.clone());
                if matches!(op, BinaryOp::Mod)
                    && (l.ctype.is_float() || r.ctype.is_float())
                {
                    return Err(TranspileError::IncompatibleOperands {
                        message: "invalid operands to %".to_string(),
                        location: e.loc.clone(),
                    });
                }
                let common = usual_arithmetic(&l.ctype, &r.ctype);
                let le = self.cast_value(l.expr, &l.ctype, &common, &e.loc)?;
                let re = self.cast_value(r.expr, &r.ctype, &common, &e.loc)?;
                Ok(Translated {
                    expr: GoExpr::binary(go_binop(op), le, re),
                    ctype: common,
                    pre,
                    post,
                })
            }
        }
    }

    fn comparison(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        loc: &SourceLocation,
    ) -> Result<Translated, TranspileError> {
        let l = decayed(self.expression(left)?);
        let r = decayed(self.expression(right)?);
        let mut pre = l.pre;
        pre.extend(r.pre);
        let mut post = l.post;
        post.extend(r.post);

        let expr = if l.ctype.is_pointer() || r.ctype.is_pointer() {
            if matches!(r.expr, GoExpr::IntLit(0)) {
                GoExpr::binary(go_binop(op), l.expr, GoExpr::Nil)
            } else if matches!(l.expr, GoExpr::IntLit(0)) {
                GoExpr::binary(go_binop(op), GoExpr::Nil, r.expr)
            } else if l.ctype.is_pointer() && r.ctype.is_pointer() {
                self.require_related_origins(left, right, loc)?;
                // Remaining capacity shrinks as a view advances, so the
                // comparison flips around cap().
                GoExpr::binary(
                    go_binop(op),
                    GoExpr::call(GoExpr::ident("cap"), vec![r.expr]),
                    GoExpr::call(GoExpr::ident("cap"), vec![l.expr]),
                )
            } else {
                return Err(TranspileError::IncompatibleOperands {
                    message: "comparison between pointer and integer".to_string(),
                    location: loc.clone(),
                });
            }
        } else {
            let common = usual_arithmetic(&l.ctype, &r.ctype);
            let le = self.cast_value(l.expr, &l.ctype, &common, loc)?;
            let re = self.cast_value(r.expr, &r.ctype, &common, loc)?;
            GoExpr::binary(go_binop(op), le, re)
        };
        Ok(Translated {
            expr,
            ctype: CType::Bool,
            pre,
            post,
        })
    }

    fn pointer_add_sub(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        loc: &SourceLocation,
    ) -> Result<Translated, TranspileError> {
        let mut l = decayed(self.expression(left)?);
        let mut r = decayed(self.expression(right)?);
        let mut pre = std::mem::take(&mut l.pre);
        pre.append(&mut r.pre);
        let mut post = std::mem::take(&mut l.post);
        post.append(&mut r.post);

        // ptr - ptr: element distance via remaining capacity
        if op == BinaryOp::Sub && l.ctype.is_pointer() && r.ctype.is_pointer() {
            self.require_related_origins(left, right, loc)?;
            let diff = GoExpr::binary(
                "-",
                GoExpr::call(GoExpr::ident("cap"), vec![r.expr]),
                GoExpr::call(GoExpr::ident("cap"), vec![l.expr]),
            );
            return Ok(Translated {
                expr: GoExpr::Conv {
                    ty: GoType::named("int64"),
                    expr: Box::new(diff),
                },
                ctype: CType::Long,
                pre,
                post,
            });
        }

        let (ptr, off, off_c, ptr_c) = if l.ctype.is_pointer() {
            (l, r.expr, right, left)
        } else {
            (r, l.expr, left, right)
        };
        let elem = match ptr.ctype.pointee() {
            Some(t) => t.clone(),
            None => {
                return Err(TranspileError::Internal {
                    message: "pointer arithmetic on non-pointer value".to_string(),
                })
            }
        };
        let elem_go = type_mapper::resolve(&elem, loc)?;

        // A one-element &scalar view cannot be indexed past; arithmetic on
        // it gets a defensively sized view of the same storage instead.
        let base = match &ptr_c.kind {
            ExpressionKind::Unary {
                op: UnaryOp::AddressOf,
                operand: inner,
            } if matches!(inner.kind, ExpressionKind::Identifier(_))
                && !inner.ctype.is_pointer_like() =>
            {
                let it = self.expression(inner)?;
                self.uses_unsafe = true;
                pointer::defensive_slice(elem_go.clone(), it.expr)
            }
            _ => ptr.expr,
        };

        let expr = match (op, off_c.as_const_int()) {
            (BinaryOp::Add, Some(n)) if n >= 0 => pointer::rebase(base, off),
            (BinaryOp::Sub, Some(0)) => base,
            _ => {
                let offset = if op == BinaryOp::Sub {
                    GoExpr::Unary {
                        op: "-",
                        operand: Box::new(off),
                    }
                } else {
                    off
                };
                self.pointer_arith(base, offset, &elem_go)
            }
        };
        Ok(Translated {
            expr,
            ctype: CType::Pointer(Box::new(elem)),
            pre,
            post,
        })
    }

    /// Reject pointer difference/ordering only when the operands provably
    /// view distinct objects. Two opaque pointer values (parameters, loads)
    /// are assumed related, matching how C code actually uses them.
    fn require_related_origins(
        &self,
        left: &Expression,
        right: &Expression,
        loc: &SourceLocation,
    ) -> Result<(), TranspileError> {
        if pointer::provably_distinct(left, right) {
            return Err(TranspileError::IncompatibleOperands {
                message: "pointer operands view provably distinct arrays".to_string(),
                location: loc.clone(),
            });
        }
        Ok(())
    }

    fn unary(
        &mut self,
        e: &Expression,
        op: UnaryOp,
        operand: &Expression,
    ) -> Result<Translated, TranspileError> {
        match op {
            UnaryOp::Plus => self.expression(operand),
            UnaryOp::Minus => {
                let t = self.expression(operand)?;
                let promoted = promote_int(&t.ctype);
                let value = self.cast_value(t.expr, &t.ctype, &promoted, &e.loc)?;
                Ok(Translated {
                    expr: GoExpr::Unary {
                        op: "-",
                        operand: Box::new(value),
                    },
                    ctype: promoted,
                    pre: t.pre,
                    post: t.post,
                })
            }
            UnaryOp::BitNot => {
                let t = self.expression(operand)?;
                let promoted = promote_int(&t.ctype);
                let value = self.cast_value(t.expr, &t.ctype, &promoted, &e.loc)?;
                Ok(Translated {
                    expr: GoExpr::Unary {
                        op: "^",
                        operand: Box::new(value),
                    },
                    ctype: promoted,
                    pre: t.pre,
                    post: t.post,
                })
            }
            UnaryOp::LogicalNot => {
                let (cond, pre, post) = self.condition(operand)?;
                Ok(Translated {
                    expr: GoExpr::Unary {
                        op: "!",
                        operand: Box::new(cond),
                    },
                    ctype: CType::Bool,
                    pre,
                    post,
                })
            }
            UnaryOp::Dereference => match pointer::classify(operand) {
                PointerRepresentation::FunctionRef => self.expression(operand),
                PointerRepresentation::VoidRef => Err(TranspileError::UnsupportedConstruct {
                    construct: "dereference of void pointer without a cast".to_string(),
                    location: e.loc.clone(),
                }),
                PointerRepresentation::FatSlice { .. } | PointerRepresentation::RawScalar => {
                    // *&x collapses to x
                    if let ExpressionKind::Unary {
                        op: UnaryOp::AddressOf,
                        operand: inner,
                    } = &operand.kind
                    {
                        return self.expression(inner);
                    }
                    let t = decayed(self.expression(operand)?);
                    Ok(Translated {
                        expr: pointer::deref(t.expr),
                        ctype: e.ctype.clone(),
                        pre: t.pre,
                        post: t.post,
                    })
                }
            },
            UnaryOp::AddressOf => self.address_of(operand, &e.loc),
            UnaryOp::PreIncrement
            | UnaryOp::PostIncrement
            | UnaryOp::PreDecrement
            | UnaryOp::PostDecrement => {
                let t = self.expression(operand)?;
                let step = self.step_stmt(&t.expr, &operand.ctype, op.is_decrement(), &e.loc)?;
                let mut pre = t.pre;
                let mut post = t.post;
                if op.is_prefix_step() {
                    pre.push(step);
                } else {
                    post.push(step);
                }
                Ok(Translated {
                    expr: t.expr,
                    ctype: operand.ctype.clone(),
                    pre,
                    post,
                })
            }
        }
    }

    fn address_of(
        &mut self,
        operand: &Expression,
        loc: &SourceLocation,
    ) -> Result<Translated, TranspileError> {
        match &operand.kind {
            // &arr[i] is a view of the array starting at i
            ExpressionKind::Index { base, index } => {
                let b = decayed(self.expression(base)?);
                let i = self.expression(index)?;
                let mut pre = b.pre;
                pre.extend(i.pre);
                let mut post = b.post;
                post.extend(i.post);
                Ok(Translated {
                    expr: pointer::rebase(b.expr, i.expr),
                    ctype: CType::Pointer(Box::new(operand.ctype.clone())),
                    pre,
                    post,
                })
            }
            // &*p collapses to p
            ExpressionKind::Unary {
                op: UnaryOp::Dereference,
                operand: inner,
            } => Ok(decayed(self.expression(inner)?)),
            _ if operand.ctype.is_array() => Ok(decayed(self.expression(operand)?)),
            ExpressionKind::Identifier(_) | ExpressionKind::Member { .. } => {
                let t = self.expression(operand)?;
                let elem_go = type_mapper::resolve(&operand.ctype, loc)?;
                self.uses_unsafe = true;
                Ok(Translated {
                    expr: pointer::scalar_ref_slice(elem_go, t.expr),
                    ctype: CType::Pointer(Box::new(operand.ctype.clone())),
                    pre: t.pre,
                    post: t.post,
                })
            }
            _ => Err(TranspileError::UnsupportedConstruct {
                construct: "address of a non-lvalue expression".to_string(),
                location: loc.clone(),
            }),
        }
    }

    /// The statement form of `++`/`--`, pointer-aware
    fn step_stmt(
        &mut self,
        value: &GoExpr,
        ctype: &CType,
        dec: bool,
        loc: &SourceLocation,
    ) -> Result<GoStmt, TranspileError> {
        if ctype.is_pointer() {
            let elem = match ctype.pointee() {
                Some(t) => t.clone(),
                None => {
                    return Err(TranspileError::Internal {
                        message: "pointer step on non-pointer value".to_string(),
                    })
                }
            };
            let elem_go = type_mapper::resolve(&elem, loc)?;
            let rhs = if dec {
                self.pointer_arith(value.clone(), GoExpr::IntLit(-1), &elem_go)
            } else {
                pointer::rebase(value.clone(), GoExpr::IntLit(1))
            };
            return Ok(GoStmt::Assign {
                lhs: value.clone(),
                op: "=",
                rhs,
            });
        }
        Ok(GoStmt::IncDec {
            expr: value.clone(),
            dec,
        })
    }

    /// Assignment as statements plus the resulting lvalue
    fn assign_parts(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        loc: &SourceLocation,
    ) -> Result<(Vec<GoStmt>, GoExpr, Vec<GoStmt>, CType), TranspileError> {
        let lt = self.expression(left)?;
        let rt = decayed(self.expression(right)?);
        let mut pre = lt.pre;
        pre.extend(rt.pre);
        let mut post = lt.post;
        post.extend(rt.post);
        let lvalue = lt.expr;

        let stmt = if op == BinaryOp::Assign {
            let rhs = self.cast_value(rt.expr, &rt.ctype, &left.ctype, loc)?;
            GoStmt::Assign {
                lhs: lvalue.clone(),
                op: "=",
                rhs,
            }
        } else {
            let base = match op.compound_base() {
                Some(b) => b,
                None => {
                    return Err(TranspileError::Internal {
                        message: format!("not a compound assignment: {op}"),
                    })
                }
            };
            if left.ctype.is_pointer() && matches!(base, BinaryOp::Add | BinaryOp::Sub) {
                let elem = match left.ctype.pointee() {
                    Some(t) => t.clone(),
                    None => {
                        return Err(TranspileError::Internal {
                            message: "pointer compound assignment on non-pointer".to_string(),
                        })
                    }
                };
                let elem_go = type_mapper::resolve(&elem, loc)?;
                let rhs = match (base, right.as_const_int()) {
                    (BinaryOp::Add, Some(n)) if n >= 0 => {
                        pointer::rebase(lvalue.clone(), rt.expr)
                    }
                    _ => {
                        let offset = if base == BinaryOp::Sub {
                            GoExpr::Unary {
                                op: "-",
                                operand: Box::new(rt.expr),
                            }
                        } else {
                            rt.expr
                        };
                        self.pointer_arith(lvalue.clone(), offset, &elem_go)
                    }
                };
                GoStmt::Assign {
                    lhs: lvalue.clone(),
                    op: "=",
                    rhs,
                }
            } else {
                let rhs = match base {
                    // Go accepts any integer type as a shift count.
                    BinaryOp::LeftShift | BinaryOp::RightShift => rt.expr,
                    _ => self.cast_value(rt.expr, &rt.ctype, &left.ctype, loc)?,
                };
                GoStmt::Assign {
                    lhs: lvalue.clone(),
                    op: go_assign_op(base),
                    rhs,
                }
            }
        };
        pre.push(stmt);
        Ok((pre, lvalue, post, left.ctype.clone()))
    }

    fn conditional(
        &mut self,
        e: &Expression,
        condition: &Expression,
        then_expr: &Expression,
        else_expr: &Expression,
    ) -> Result<Translated, TranspileError> {
        let (cond, cpre, cpost) = self.condition(condition)?;

        if e.ctype.is_void() {
            let then = self.expression_stmts(then_expr)?;
            let els = self.expression_stmts(else_expr)?;
            let mut body = cpre;
            body.extend(cpost);
            body.push(GoStmt::If { cond, then, els });
            return Ok(Translated {
                expr: GoExpr::call(
                    GoExpr::FuncLit { result: None, body },
                    vec![],
                ),
                ctype: CType::Void,
                pre: Vec::new(),
                post: Vec::new(),
            });
        }

        let result_ty = type_mapper::resolve(&e.ctype, &e.loc)?;
        let then_branch = self.return_branch(then_expr, &e.ctype)?;
        let else_branch = self.return_branch(else_expr, &e.ctype)?;

        let mut body = cpre;
        if cpost.is_empty() {
            body.push(GoStmt::If {
                cond,
                then: then_branch,
                els: vec![],
            });
        } else {
            let tmp = self.fresh_temp();
            body.push(GoStmt::Define {
                name: tmp.clone(),
                value: cond,
            });
            body.extend(cpost);
            body.push(GoStmt::If {
                cond: GoExpr::ident(&tmp),
                then: then_branch,
                els: vec![],
            });
        }
        body.extend(else_branch);

        Ok(Translated::pure(
            GoExpr::call(
                GoExpr::FuncLit {
                    result: Some(result_ty),
                    body,
                },
                vec![],
            ),
            e.ctype.clone(),
        ))
    }

    /// An expression as a return: its pre statements, then `return value`
    pub(crate) fn return_branch(
        &mut self,
        branch: &Expression,
        to: &CType,
    ) -> Result<Vec<GoStmt>, TranspileError> {
        let t = decayed(self.expression(branch)?);
        let value = self.cast_value(t.expr, &t.ctype, to, &branch.loc)?;
        let mut body = t.pre;
        if t.post.is_empty() {
            body.push(GoStmt::Return(Some(value)));
        } else {
            let tmp = self.fresh_temp();
            body.push(GoStmt::Define {
                name: tmp.clone(),
                value,
            });
            body.extend(t.post);
            body.push(GoStmt::Return(Some(GoExpr::ident(&tmp))));
        }
        Ok(body)
    }

    pub(crate) fn bool_closure(
        &mut self,
        pre: Vec<GoStmt>,
        cond: GoExpr,
        post: Vec<GoStmt>,
    ) -> GoExpr {
        let mut body = pre;
        if post.is_empty() {
            body.push(GoStmt::Return(Some(cond)));
        } else {
            let tmp = self.fresh_temp();
            body.push(GoStmt::Define {
                name: tmp.clone(),
                value: cond,
            });
            body.extend(post);
            body.push(GoStmt::Return(Some(GoExpr::ident(&tmp))));
        }
        GoExpr::call(
            GoExpr::FuncLit {
                result: Some(GoType::named("bool")),
                body,
            },
            vec![],
        )
    }

    fn call_expr(
        &mut self,
        function: &Expression,
        arguments: &[Expression],
    ) -> Result<Translated, TranspileError> {
        let (param_types, return_type) = match function.ctype.canonical() {
            CType::Function {
                return_type,
                parameters,
                ..
            } => (parameters.clone(), (**return_type).clone()),
            CType::Pointer(inner) => match inner.canonical() {
                CType::Function {
                    return_type,
                    parameters,
                    ..
                } => (parameters.clone(), (**return_type).clone()),
                _ => {
                    return Err(TranspileError::UnsupportedConstruct {
                        construct: "call of a non-function value".to_string(),
                        location: function.loc.clone(),
                    })
                }
            },
            _ => {
                return Err(TranspileError::UnsupportedConstruct {
                    construct: "call of a non-function value".to_string(),
                    location: function.loc.clone(),
                })
            }
        };

        let mut pre = Vec::new();
        let mut post = Vec::new();
        let callee = match &function.kind {
            ExpressionKind::Identifier(name) if !function.ctype.is_function_pointer() => {
                if self.functions.contains(name.as_str()) {
                    GoExpr::ident(name)
                } else if let Some(shim) = self.shims.lookup(name) {
                    self.uses_noarch = true;
                    GoExpr::qualified(NOARCH_PACKAGE, shim.go_name)
                } else {
                    let err = TranspileError::UnresolvedSymbol {
                        name: name.clone(),
                        location: function.loc.clone(),
                    };
                    self.sink.recovered(&err);
                    GoExpr::ident(name)
                }
            }
            _ => {
                let t = self.expression(function)?;
                pre.extend(t.pre);
                post.extend(t.post);
                t.expr
            }
        };

        let mut args = Vec::with_capacity(arguments.len());
        for (i, a) in arguments.iter().enumerate() {
            let t = decayed(self.expression(a)?);
            pre.extend(t.pre);
            post.extend(t.post);
            let value = if let Some(param) = param_types.get(i) {
                self.cast_value(t.expr, &t.ctype, param, &a.loc)?
            } else if matches!(t.ctype.canonical(), CType::Bool) {
                self.uses_noarch = true;
                GoExpr::call(GoExpr::qualified(NOARCH_PACKAGE, BOOL_TO_INT), vec![t.expr])
            } else {
                t.expr
            };
            args.push(value);
        }

        Ok(Translated {
            expr: GoExpr::call(callee, args),
            ctype: return_type,
            pre,
            post,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go_ast::{GoDecl, GoFile};
    use cgt_common::SourceLocation;
    use pretty_assertions::assert_eq;

    fn loc() -> SourceLocation {
        SourceLocation::dummy()
    }

    fn ex(kind: ExpressionKind, ctype: CType) -> Expression {
        Expression {
            kind,
            ctype,
            loc: loc(),
        }
    }

    fn ident(name: &str, ctype: CType) -> Expression {
        ex(ExpressionKind::Identifier(name.to_string()), ctype)
    }

    fn int_lit(v: i64) -> Expression {
        ex(ExpressionKind::IntLiteral(v), CType::Int)
    }

    fn bin(op: BinaryOp, l: Expression, r: Expression, ctype: CType) -> Expression {
        ex(
            ExpressionKind::Binary {
                op,
                left: Box::new(l),
                right: Box::new(r),
            },
            ctype,
        )
    }

    fn int_ptr() -> CType {
        CType::Pointer(Box::new(CType::Int))
    }

    fn render_stmts(stmts: Vec<GoStmt>) -> String {
        let mut file = GoFile::new("main");
        file.decls.push(GoDecl::Func {
            name: "f".to_string(),
            params: vec![],
            variadic: false,
            result: None,
            body: stmts,
        });
        file.render()
    }

    #[test]
    fn test_mixed_width_arithmetic_widens_narrow_side() {
        let mut tr = Transpiler::new();
        let e = bin(
            BinaryOp::Add,
            ident("a", CType::Int),
            ident("b", CType::Long),
            CType::Long,
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(format!("{}", t.expr), "int64(a) + b");
        assert_eq!(t.ctype, CType::Long);
    }

    #[test]
    fn test_comparison_result_is_bool_until_bridged() {
        let mut tr = Transpiler::new();
        let cmp = bin(
            BinaryOp::Less,
            ident("a", CType::Int),
            ident("b", CType::Int),
            CType::Int,
        );
        let assign = bin(BinaryOp::Assign, ident("x", CType::Int), cmp, CType::Int);
        let stmts = tr.expression_stmts(&assign).unwrap();
        let out = render_stmts(stmts);
        assert!(out.contains("x = noarch.BoolToInt32(a < b)"), "{out}");
    }

    #[test]
    fn test_ternary_becomes_closure() {
        let mut tr = Transpiler::new();
        let e = ex(
            ExpressionKind::Conditional {
                condition: Box::new(ident("c", CType::Int)),
                then_expr: Box::new(int_lit(1)),
                else_expr: Box::new(int_lit(2)),
            },
            CType::Int,
        );
        let t = tr.expression(&e).unwrap();
        let out = format!("{}", t.expr);
        assert!(out.contains("func() int32 {"), "{out}");
        assert!(out.contains("if c != 0 {"), "{out}");
        assert!(out.contains("return 1"), "{out}");
        assert!(out.contains("return 2"), "{out}");
        assert!(out.ends_with("()"), "{out}");
    }

    #[test]
    fn test_pointer_plus_literal_reslices() {
        let mut tr = Transpiler::new();
        let e = bin(BinaryOp::Add, ident("p", int_ptr()), int_lit(3), int_ptr());
        let t = tr.expression(&e).unwrap();
        assert_eq!(format!("{}", t.expr), "p[3:]");
    }

    #[test]
    fn test_pointer_minus_variable_uses_helper() {
        let mut tr = Transpiler::new();
        let e = bin(
            BinaryOp::Sub,
            ident("p", int_ptr()),
            ident("n", CType::Int),
            int_ptr(),
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(format!("{}", t.expr), "cgtPointerArithInt32(p, int(-n))");
    }

    #[test]
    fn test_arithmetic_on_scalar_address_widens_the_view() {
        let mut tr = Transpiler::new();
        let addr = ex(
            ExpressionKind::Unary {
                op: UnaryOp::AddressOf,
                operand: Box::new(ident("x", CType::Int)),
            },
            int_ptr(),
        );
        let e = bin(BinaryOp::Add, addr, int_lit(2), int_ptr());
        let t = tr.expression(&e).unwrap();
        assert_eq!(
            format!("{}", t.expr),
            "(*[1000000]int32)(unsafe.Pointer(&x))[0:][2:]"
        );
        assert!(tr.uses_unsafe);
    }

    #[test]
    fn test_pointer_difference_uses_remaining_capacity() {
        let mut tr = Transpiler::new();
        // p2 derives from p: p2 = p + k elsewhere; here both roots are "p"
        let p = ident("p", int_ptr());
        let p2 = bin(BinaryOp::Add, p.clone(), ident("k", CType::Int), int_ptr());
        let diff = bin(BinaryOp::Sub, p2, p, CType::Long);
        let t = tr.expression(&diff).unwrap();
        let out = format!("{}", t.expr);
        assert!(out.starts_with("int64(cap(p) - cap("), "{out}");
        assert_eq!(t.ctype, CType::Long);
    }

    #[test]
    fn test_pointer_difference_between_parameters_is_accepted() {
        // end - start with two opaque pointer values, the usual length idiom
        let mut tr = Transpiler::new();
        let diff = bin(
            BinaryOp::Sub,
            ident("end", int_ptr()),
            ident("start", int_ptr()),
            CType::Long,
        );
        let t = tr.expression(&diff).unwrap();
        assert_eq!(format!("{}", t.expr), "int64(cap(start) - cap(end))");
        assert_eq!(t.ctype, CType::Long);
    }

    #[test]
    fn test_pointer_difference_between_distinct_arrays_is_rejected() {
        let mut tr = Transpiler::new();
        let arr = |name: &str| {
            ident(
                name,
                CType::Array {
                    element: Box::new(CType::Int),
                    len: Some(4),
                },
            )
        };
        let diff = bin(BinaryOp::Sub, arr("a"), arr("b"), CType::Long);
        let err = tr.expression(&diff).unwrap_err();
        assert!(matches!(err, TranspileError::IncompatibleOperands { .. }));
    }

    #[test]
    fn test_negating_a_narrow_operand_widens_first() {
        let mut tr = Transpiler::new();
        let e = ex(
            ExpressionKind::Unary {
                op: UnaryOp::Minus,
                operand: Box::new(ident("c", CType::Char)),
            },
            CType::Int,
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(format!("{}", t.expr), "-int32(c)");
        assert_eq!(t.ctype, CType::Int);
    }

    #[test]
    fn test_comma_hoists_left_operand() {
        let mut tr = Transpiler::new();
        let e = bin(
            BinaryOp::Comma,
            bin(
                BinaryOp::Assign,
                ident("x", CType::Int),
                int_lit(1),
                CType::Int,
            ),
            ident("y", CType::Int),
            CType::Int,
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(format!("{}", t.expr), "y");
        assert_eq!(t.pre.len(), 1);
        let out = render_stmts(t.pre);
        assert!(out.contains("x = 1"), "{out}");
    }

    #[test]
    fn test_post_increment_steps_after_use() {
        let mut tr = Transpiler::new();
        let inc = ex(
            ExpressionKind::Unary {
                op: UnaryOp::PostIncrement,
                operand: Box::new(ident("x", CType::Int)),
            },
            CType::Int,
        );
        let assign = bin(BinaryOp::Assign, ident("y", CType::Int), inc, CType::Int);
        let stmts = tr.expression_stmts(&assign).unwrap();
        let out = render_stmts(stmts);
        let assign_at = out.find("y = x").unwrap();
        let step_at = out.find("x++").unwrap();
        assert!(assign_at < step_at, "{out}");
    }

    #[test]
    fn test_logical_and_wraps_effectful_rhs() {
        let mut tr = Transpiler::new();
        let rhs = bin(
            BinaryOp::Comma,
            bin(
                BinaryOp::Assign,
                ident("b", CType::Int),
                int_lit(1),
                CType::Int,
            ),
            ident("b", CType::Int),
            CType::Int,
        );
        let e = bin(
            BinaryOp::LogicalAnd,
            ident("a", CType::Int),
            rhs,
            CType::Int,
        );
        let t = tr.expression(&e).unwrap();
        let out = format!("{}", t.expr);
        assert!(out.starts_with("(a != 0) && (func() bool {"), "{out}");
        assert!(out.contains("b = 1"), "{out}");
        assert!(out.contains("return b != 0"), "{out}");
    }

    #[test]
    fn test_string_literal_becomes_runtime_call() {
        let mut tr = Transpiler::new();
        let e = ex(
            ExpressionKind::StringLiteral("hi".to_string()),
            CType::Array {
                element: Box::new(CType::Char),
                len: Some(3),
            },
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(format!("{}", t.expr), "noarch.CString(\"hi\")");
        assert_eq!(t.ctype, CType::Pointer(Box::new(CType::Char)));
    }

    #[test]
    fn test_address_of_scalar_promotes_to_storage_view() {
        let mut tr = Transpiler::new();
        let e = ex(
            ExpressionKind::Unary {
                op: UnaryOp::AddressOf,
                operand: Box::new(ident("x", CType::Int)),
            },
            int_ptr(),
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(
            format!("{}", t.expr),
            "(*[1]int32)(unsafe.Pointer(&x))[0:]"
        );
    }

    #[test]
    fn test_null_comparison_uses_nil() {
        let mut tr = Transpiler::new();
        let e = bin(BinaryOp::Equal, ident("p", int_ptr()), int_lit(0), CType::Int);
        let t = tr.expression(&e).unwrap();
        assert_eq!(format!("{}", t.expr), "p == nil");
        assert_eq!(t.ctype, CType::Bool);
    }

    #[test]
    fn test_sizeof_folds_to_constant() {
        let mut tr = Transpiler::new();
        let e = ex(
            ExpressionKind::SizeofType(CType::Array {
                element: Box::new(CType::Int),
                len: Some(10),
            }),
            CType::UnsignedLong,
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(t.expr, GoExpr::IntLit(40));
    }

    #[test]
    fn test_sizeof_operand_side_effects_do_not_survive() {
        let mut tr = Transpiler::new();
        let inc = ex(
            ExpressionKind::Unary {
                op: UnaryOp::PostIncrement,
                operand: Box::new(ident("x", CType::Int)),
            },
            CType::Int,
        );
        let e = ex(
            ExpressionKind::SizeofExpr(Box::new(inc)),
            CType::UnsignedLong,
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(t.expr, GoExpr::IntLit(4));
        assert!(t.pre.is_empty());
        assert!(t.post.is_empty());
    }

    #[test]
    fn test_unknown_call_is_recovered_with_diagnostic() {
        let mut tr = Transpiler::new();
        let call = ex(
            ExpressionKind::Call {
                function: Box::new(ident(
                    "mystery",
                    CType::Function {
                        return_type: Box::new(CType::Int),
                        parameters: vec![],
                        is_variadic: false,
                    },
                )),
                arguments: vec![],
            },
            CType::Int,
        );
        let t = tr.expression(&call).unwrap();
        assert_eq!(format!("{}", t.expr), "mystery()");
        assert!(tr.sink.diagnostics().iter().any(|d| {
            format!("{d}").contains("mystery")
        }));
    }

    #[test]
    fn test_int_to_pointer_cast_rejected() {
        let mut tr = Transpiler::new();
        let e = ex(
            ExpressionKind::Cast {
                target: int_ptr(),
                operand: Box::new(ident("n", CType::Long)),
            },
            int_ptr(),
        );
        let err = tr.expression(&e).unwrap_err();
        assert!(matches!(err, TranspileError::IncompatibleOperands { .. }));
    }

    #[test]
    fn test_void_pointer_round_trip() {
        let mut tr = Transpiler::new();
        let to_void = ex(
            ExpressionKind::Cast {
                target: CType::Pointer(Box::new(CType::Void)),
                operand: Box::new(ident("p", int_ptr())),
            },
            CType::Pointer(Box::new(CType::Void)),
        );
        let t = tr.expression(&to_void).unwrap();
        assert_eq!(format!("{}", t.expr), "p");

        let back = ex(
            ExpressionKind::Cast {
                target: int_ptr(),
                operand: Box::new(ident("v", CType::Pointer(Box::new(CType::Void)))),
            },
            int_ptr(),
        );
        let t = tr.expression(&back).unwrap();
        assert_eq!(format!("{}", t.expr), "v.([]int32)");
    }

    #[test]
    fn test_arrow_member_access_goes_through_element_zero() {
        let mut tr = Transpiler::new();
        let obj = ident(
            "node",
            CType::Pointer(Box::new(CType::Struct {
                name: Some("node".to_string()),
                fields: vec![],
            })),
        );
        let e = ex(
            ExpressionKind::Member {
                object: Box::new(obj),
                member: "next".to_string(),
                is_arrow: true,
            },
            int_ptr(),
        );
        let t = tr.expression(&e).unwrap();
        assert_eq!(format!("{}", t.expr), "node[0].next");
    }
}
