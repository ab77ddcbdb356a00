//! Statement AST nodes, declarations and the translation unit

use crate::expressions::{Expression, Initializer};
use crate::types::{CType, StorageClass};
use cgt_common::SourceLocation;
use serde::{Deserialize, Serialize};

/// AST statement node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// Expression statement
    Expression(Expression),

    /// Compound statement (block)
    Compound(Vec<Statement>),

    /// Local declarations
    Declaration(Vec<Declaration>),

    /// If statement
    If {
        condition: Expression,
        then_stmt: Box<Statement>,
        else_stmt: Option<Box<Statement>>,
    },

    /// While loop
    While {
        condition: Expression,
        body: Box<Statement>,
    },

    /// Do-while loop
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
    },

    /// For loop
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
    },

    /// Switch statement
    Switch {
        selector: Expression,
        body: Box<Statement>,
    },

    /// Case label; the labelled statement is nested (C attaches the label
    /// to the statement that follows it)
    Case {
        value: Expression,
        statement: Box<Statement>,
    },

    /// Default label
    Default { statement: Box<Statement> },

    Break,
    Continue,

    /// Return statement
    Return(Option<Expression>),

    Goto(String),

    /// Label statement
    Label {
        name: String,
        statement: Box<Statement>,
    },

    /// Empty statement (just a semicolon)
    Empty,
}

/// Variable declaration (local or global)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub ctype: CType,
    pub storage_class: StorageClass,
    pub initializer: Option<Initializer>,
    pub loc: SourceLocation,
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: CType,
    pub parameters: Vec<Parameter>,
    pub is_variadic: bool,
    pub body: Statement,
    pub storage_class: StorageClass,
    pub loc: SourceLocation,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Unnamed in prototypes
    pub name: Option<String>,
    pub ctype: CType,
    pub loc: SourceLocation,
}

/// One translation unit: everything from one input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Source file name, used for diagnostics and the output file name
    pub file: String,
    pub items: Vec<TopLevelItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopLevelItem {
    /// Function definition
    Function(FunctionDefinition),

    /// Global variable declaration
    Declaration(Declaration),

    /// Typedef
    Typedef {
        name: String,
        underlying: CType,
        loc: SourceLocation,
    },

    /// struct/union/enum definition
    TypeDefinition { ctype: CType, loc: SourceLocation },
}
