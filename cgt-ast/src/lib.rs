//! Typed C AST consumed by the transpiler
//!
//! The C parser lives in an external front end; what the transpiler sees is
//! this typed AST, usually deserialized from JSON. Every expression node
//! arrives with its C type already resolved (the front end's job), which is
//! what lets the translation pass stay single and strictly sequential.

pub mod expressions;
pub mod ops;
pub mod statements;
pub mod types;

pub use expressions::{Designator, Expression, ExpressionKind, InitItem, Initializer, InitializerKind};
pub use ops::{BinaryOp, UnaryOp};
pub use statements::{
    Declaration, FunctionDefinition, Parameter, Statement, StatementKind, TopLevelItem,
    TranslationUnit,
};
pub use types::{CType, Enumerator, Field, StorageClass};
