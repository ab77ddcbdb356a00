//! Expression AST nodes
//!
//! Every expression node carries the C type the front end resolved for it.
//! The transpiler relies on that invariant: type questions are answered
//! locally, without a second resolution pass.

use crate::ops::{BinaryOp, UnaryOp};
use crate::types::CType;
use cgt_common::SourceLocation;
use serde::{Deserialize, Serialize};

/// A typed expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    /// Resolved C type of this expression (the front end fills this in)
    pub ctype: CType,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    /// Integer literal (also covers enum-typed constants folded upstream)
    IntLiteral(i64),

    /// Floating literal
    FloatLiteral(f64),

    /// Character literal, already narrowed to its byte value
    CharLiteral(u8),

    /// String literal without the implicit NUL terminator
    StringLiteral(String),

    /// Identifier reference
    Identifier(String),

    /// Binary operation, including assignments and the comma operator
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    /// Function call
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// Struct/union member access (`.` or `->`)
    Member {
        object: Box<Expression>,
        member: String,
        is_arrow: bool,
    },

    /// Array/pointer subscript
    Index {
        base: Box<Expression>,
        index: Box<Expression>,
    },

    /// Ternary conditional operator
    Conditional {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
    },

    /// Explicit cast
    Cast {
        target: CType,
        operand: Box<Expression>,
    },

    /// sizeof on an expression (not evaluated)
    SizeofExpr(Box<Expression>),

    /// sizeof on a type
    SizeofType(CType),

    /// A construct the front end parsed but the transpiler does not model
    /// (statement expressions, computed gotos, ...). Translated to a
    /// diagnostic plus a panic stub.
    Unsupported { description: String },
}

impl Expression {
    /// True if evaluating this expression can change program state.
    ///
    /// Used to decide what the comma operator and hoisted lvalue
    /// sub-expressions must preserve.
    pub fn has_side_effects(&self) -> bool {
        match &self.kind {
            ExpressionKind::IntLiteral(_)
            | ExpressionKind::FloatLiteral(_)
            | ExpressionKind::CharLiteral(_)
            | ExpressionKind::StringLiteral(_)
            | ExpressionKind::Identifier(_)
            | ExpressionKind::SizeofType(_) => false,
            ExpressionKind::SizeofExpr(_) => false, // operand is not evaluated
            ExpressionKind::Call { .. } => true,
            ExpressionKind::Unsupported { .. } => true,
            ExpressionKind::Binary { op, left, right } => {
                op.is_assignment() || left.has_side_effects() || right.has_side_effects()
            }
            ExpressionKind::Unary { op, operand } => {
                op.is_increment() || op.is_decrement() || operand.has_side_effects()
            }
            ExpressionKind::Member { object, .. } => object.has_side_effects(),
            ExpressionKind::Index { base, index } => {
                base.has_side_effects() || index.has_side_effects()
            }
            ExpressionKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                condition.has_side_effects()
                    || then_expr.has_side_effects()
                    || else_expr.has_side_effects()
            }
            ExpressionKind::Cast { operand, .. } => operand.has_side_effects(),
        }
    }

    /// Fold this expression to a constant integer if it is one.
    ///
    /// Case labels and designated array indices must be integer constant
    /// expressions; the front end usually folds them, so only the simple
    /// shapes are handled here.
    pub fn as_const_int(&self) -> Option<i64> {
        match &self.kind {
            ExpressionKind::IntLiteral(v) => Some(*v),
            ExpressionKind::CharLiteral(c) => Some(i64::from(*c)),
            ExpressionKind::Unary {
                op: UnaryOp::Minus,
                operand,
            } => operand.as_const_int().map(|v| -v),
            ExpressionKind::Unary {
                op: UnaryOp::Plus,
                operand,
            } => operand.as_const_int(),
            ExpressionKind::Cast { operand, .. } => operand.as_const_int(),
            _ => None,
        }
    }
}

/// Initializer for variables, arrays, structs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub kind: InitializerKind,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InitializerKind {
    /// Single expression
    Expression(Expression),

    /// Brace-enclosed list; items may mix positional and designated forms
    List(Vec<InitItem>),
}

/// One item of an initializer list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitItem {
    /// `None` for positional items; designators reset the position cursor
    pub designator: Option<Designator>,
    pub init: Initializer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Designator {
    /// Array index: `[idx] =` (constant, folded by the front end)
    Index(u64),

    /// Struct member: `.member =`
    Member(String),
}
