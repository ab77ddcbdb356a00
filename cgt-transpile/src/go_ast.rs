//! Go target AST and source printer
//!
//! A deliberately small model of Go: just the expressions, statements and
//! declarations the translator emits. The printer produces gofmt-shaped
//! output (tab indentation), which keeps the emitted files diffable against
//! hand-written Go.

use std::collections::BTreeSet;
use std::fmt;

/// Go types as they appear in emitted source
#[derive(Debug, Clone, PartialEq)]
pub enum GoType {
    /// A named type: `int32`, `float64`, `myStruct`
    Named(String),
    /// `[]T`
    Slice(Box<GoType>),
    /// `[N]T`
    Array { len: u64, elem: Box<GoType> },
    /// `*T`
    Ptr(Box<GoType>),
    /// `func(params) result`
    Func {
        params: Vec<GoType>,
        result: Option<Box<GoType>>,
    },
    /// `interface{}`
    Interface,
}

impl GoType {
    pub fn named(name: &str) -> Self {
        GoType::Named(name.to_string())
    }

    pub fn slice_of(elem: GoType) -> Self {
        GoType::Slice(Box::new(elem))
    }
}

impl fmt::Display for GoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoType::Named(name) => write!(f, "{name}"),
            GoType::Slice(elem) => write!(f, "[]{elem}"),
            GoType::Array { len, elem } => write!(f, "[{len}]{elem}"),
            GoType::Ptr(target) => write!(f, "*{target}"),
            GoType::Func { params, result } => {
                write!(f, "func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")?;
                if let Some(r) = result {
                    write!(f, " {r}")?;
                }
                Ok(())
            }
            GoType::Interface => write!(f, "interface{{}}"),
        }
    }
}

/// Go expressions
#[derive(Debug, Clone, PartialEq)]
pub enum GoExpr {
    Ident(String),
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    Nil,

    /// `left op right`
    Binary {
        op: &'static str,
        left: Box<GoExpr>,
        right: Box<GoExpr>,
    },

    /// `op operand` (`-`, `!`, `^`, `&`, `*`)
    Unary {
        op: &'static str,
        operand: Box<GoExpr>,
    },

    /// `func(args)`
    Call {
        func: Box<GoExpr>,
        args: Vec<GoExpr>,
    },

    /// `base[index]`
    Index {
        base: Box<GoExpr>,
        index: Box<GoExpr>,
    },

    /// `base[low:]`
    SliceFrom {
        base: Box<GoExpr>,
        low: Box<GoExpr>,
    },

    /// `base.field`
    Selector {
        base: Box<GoExpr>,
        field: String,
    },

    /// `T(expr)` - type conversion
    Conv {
        ty: GoType,
        expr: Box<GoExpr>,
    },

    /// `T{elems}` - composite literal
    Composite {
        ty: GoType,
        elems: Vec<GoExpr>,
    },

    /// `key: value` inside a composite literal
    KeyValue {
        key: Box<GoExpr>,
        value: Box<GoExpr>,
    },

    /// `func() T { body }` - parameterless closure
    FuncLit {
        result: Option<GoType>,
        body: Vec<GoStmt>,
    },

    /// `expr.(T)` - type assertion
    TypeAssert {
        expr: Box<GoExpr>,
        ty: GoType,
    },

    Paren(Box<GoExpr>),
}

impl GoExpr {
    pub fn ident(name: &str) -> Self {
        GoExpr::Ident(name.to_string())
    }

    pub fn call(func: GoExpr, args: Vec<GoExpr>) -> Self {
        GoExpr::Call {
            func: Box::new(func),
            args,
        }
    }

    pub fn binary(op: &'static str, left: GoExpr, right: GoExpr) -> Self {
        GoExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn index(base: GoExpr, index: GoExpr) -> Self {
        GoExpr::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    pub fn selector(base: GoExpr, field: &str) -> Self {
        GoExpr::Selector {
            base: Box::new(base),
            field: field.to_string(),
        }
    }

    /// `package.Name` as an expression
    pub fn qualified(package: &str, name: &str) -> Self {
        GoExpr::selector(GoExpr::ident(package), name)
    }
}

impl fmt::Display for GoExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer::new();
        printer.expr(self);
        write!(f, "{}", printer.finish())
    }
}

/// Go statements
#[derive(Debug, Clone, PartialEq)]
pub enum GoStmt {
    Expr(GoExpr),

    /// `lhs op rhs` where op is `=`, `+=`, ...
    Assign {
        lhs: GoExpr,
        op: &'static str,
        rhs: GoExpr,
    },

    /// `name := value`
    Define { name: String, value: GoExpr },

    /// `var name T = value`
    VarDecl {
        name: String,
        ty: Option<GoType>,
        value: Option<GoExpr>,
    },

    /// `expr++` / `expr--`
    IncDec { expr: GoExpr, dec: bool },

    Return(Option<GoExpr>),

    If {
        cond: GoExpr,
        then: Vec<GoStmt>,
        els: Vec<GoStmt>,
    },

    For {
        init: Option<Box<GoStmt>>,
        cond: Option<GoExpr>,
        post: Option<Box<GoStmt>>,
        body: Vec<GoStmt>,
    },

    Switch {
        tag: Option<GoExpr>,
        cases: Vec<GoCase>,
    },

    Break,
    Continue,
    Fallthrough,
    Goto(String),
    Label(String),
    Block(Vec<GoStmt>),
    Comment(String),
}

/// One arm of a Go switch; empty `values` is the default case
#[derive(Debug, Clone, PartialEq)]
pub struct GoCase {
    pub values: Vec<GoExpr>,
    pub body: Vec<GoStmt>,
}

/// Top-level Go declarations
#[derive(Debug, Clone, PartialEq)]
pub enum GoDecl {
    Func {
        name: String,
        params: Vec<(String, GoType)>,
        variadic: bool,
        result: Option<GoType>,
        body: Vec<GoStmt>,
    },

    Var {
        name: String,
        ty: Option<GoType>,
        value: Option<GoExpr>,
    },

    /// `type name struct { ... }`
    TypeStruct {
        name: String,
        fields: Vec<(String, GoType)>,
    },

    /// `type name = ty`
    TypeAlias { name: String, ty: GoType },

    /// `const ( name ty = value; ... )` - one block per C enum
    ConstGroup {
        ty: String,
        entries: Vec<(String, i64)>,
    },

    Comment(String),

    /// Verbatim Go source, used for generated runtime helpers
    Raw(String),
}

/// One emitted Go file
#[derive(Debug, Clone, Default)]
pub struct GoFile {
    pub package: String,
    pub imports: BTreeSet<String>,
    pub decls: Vec<GoDecl>,
}

impl GoFile {
    pub fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            imports: BTreeSet::new(),
            decls: Vec::new(),
        }
    }

    pub fn add_import(&mut self, path: &str) {
        self.imports.insert(path.to_string());
    }

    /// Render the file as Go source text
    pub fn render(&self) -> String {
        let mut printer = Printer::new();
        printer.file(self);
        printer.finish()
    }
}

/// Escape a string for a Go double-quoted literal
fn escape_go_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for b in s.bytes() {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out
}

/// Format a float so Go reads it back as a float constant
fn format_go_float(v: f64) -> String {
    let s = format!("{}", v);
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

struct Printer {
    buf: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            buf: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.buf
    }

    fn push(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
        for _ in 0..self.indent {
            self.buf.push('\t');
        }
    }

    fn type_conv_prefix(&mut self, ty: &GoType) {
        // Pointer and func types need parens when used as a conversion.
        match ty {
            GoType::Ptr(_) | GoType::Func { .. } => self.push(&format!("({ty})")),
            _ => self.push(&format!("{ty}")),
        }
    }

    fn expr(&mut self, e: &GoExpr) {
        match e {
            GoExpr::Ident(name) => self.push(name),
            GoExpr::IntLit(v) => self.push(&format!("{v}")),
            GoExpr::FloatLit(v) => self.push(&format_go_float(*v)),
            GoExpr::StringLit(s) => self.push(&format!("\"{}\"", escape_go_string(s))),
            GoExpr::Nil => self.push("nil"),
            GoExpr::Binary { op, left, right } => {
                self.child_expr(left);
                self.push(&format!(" {op} "));
                self.child_expr(right);
            }
            GoExpr::Unary { op, operand } => {
                self.push(op);
                self.child_expr(operand);
            }
            GoExpr::Call { func, args } => {
                self.child_expr(func);
                self.push("(");
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(a);
                }
                self.push(")");
            }
            GoExpr::Index { base, index } => {
                self.child_expr(base);
                self.push("[");
                self.expr(index);
                self.push("]");
            }
            GoExpr::SliceFrom { base, low } => {
                self.child_expr(base);
                self.push("[");
                self.expr(low);
                self.push(":]");
            }
            GoExpr::Selector { base, field } => {
                self.child_expr(base);
                self.push(&format!(".{field}"));
            }
            GoExpr::Conv { ty, expr } => {
                self.type_conv_prefix(ty);
                self.push("(");
                self.expr(expr);
                self.push(")");
            }
            GoExpr::Composite { ty, elems } => {
                self.push(&format!("{ty}{{"));
                for (i, el) in elems.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(el);
                }
                self.push("}");
            }
            GoExpr::KeyValue { key, value } => {
                self.expr(key);
                self.push(": ");
                self.expr(value);
            }
            GoExpr::FuncLit { result, body } => {
                self.push("func()");
                if let Some(r) = result {
                    self.push(&format!(" {r}"));
                }
                self.push(" {");
                self.indent += 1;
                for s in body {
                    self.newline();
                    self.stmt(s);
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            GoExpr::TypeAssert { expr, ty } => {
                self.child_expr(expr);
                self.push(&format!(".({ty})"));
            }
            GoExpr::Paren(inner) => {
                self.push("(");
                self.expr(inner);
                self.push(")");
            }
        }
    }

    /// Print a sub-expression, parenthesizing where Go precedence could
    /// otherwise regroup it
    fn child_expr(&mut self, e: &GoExpr) {
        match e {
            GoExpr::Binary { .. } | GoExpr::FuncLit { .. } | GoExpr::Conv { .. } => {
                // Conversions never need parens but binaries and closures in
                // operand position do; conversions print their own parens.
                if matches!(e, GoExpr::Conv { .. }) {
                    self.expr(e);
                } else {
                    self.push("(");
                    self.expr(e);
                    self.push(")");
                }
            }
            _ => self.expr(e),
        }
    }

    fn stmt(&mut self, s: &GoStmt) {
        match s {
            GoStmt::Expr(e) => self.expr(e),
            GoStmt::Assign { lhs, op, rhs } => {
                self.expr(lhs);
                self.push(&format!(" {op} "));
                self.expr(rhs);
            }
            GoStmt::Define { name, value } => {
                self.push(&format!("{name} := "));
                self.expr(value);
            }
            GoStmt::VarDecl { name, ty, value } => {
                self.push(&format!("var {name}"));
                if let Some(t) = ty {
                    self.push(&format!(" {t}"));
                }
                if let Some(v) = value {
                    self.push(" = ");
                    self.expr(v);
                }
            }
            GoStmt::IncDec { expr, dec } => {
                self.expr(expr);
                self.push(if *dec { "--" } else { "++" });
            }
            GoStmt::Return(value) => {
                self.push("return");
                if let Some(v) = value {
                    self.push(" ");
                    self.expr(v);
                }
            }
            GoStmt::If { cond, then, els } => {
                self.push("if ");
                self.expr(cond);
                self.push(" {");
                self.block_body(then);
                self.push("}");
                if !els.is_empty() {
                    self.push(" else {");
                    self.block_body(els);
                    self.push("}");
                }
            }
            GoStmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.push("for ");
                if init.is_some() || post.is_some() {
                    if let Some(i) = init {
                        self.stmt(i);
                    }
                    self.push("; ");
                    if let Some(c) = cond {
                        self.expr(c);
                    }
                    self.push("; ");
                    if let Some(p) = post {
                        self.stmt(p);
                    }
                    self.push(" ");
                } else if let Some(c) = cond {
                    self.expr(c);
                    self.push(" ");
                }
                self.push("{");
                self.block_body(body);
                self.push("}");
            }
            GoStmt::Switch { tag, cases } => {
                self.push("switch ");
                if let Some(t) = tag {
                    self.expr(t);
                    self.push(" ");
                }
                self.push("{");
                for case in cases {
                    self.newline();
                    if case.values.is_empty() {
                        self.push("default:");
                    } else {
                        self.push("case ");
                        for (i, v) in case.values.iter().enumerate() {
                            if i > 0 {
                                self.push(", ");
                            }
                            self.expr(v);
                        }
                        self.push(":");
                    }
                    self.indent += 1;
                    for s in &case.body {
                        self.newline();
                        self.stmt(s);
                    }
                    self.indent -= 1;
                }
                self.newline();
                self.push("}");
            }
            GoStmt::Break => self.push("break"),
            GoStmt::Continue => self.push("continue"),
            GoStmt::Fallthrough => self.push("fallthrough"),
            GoStmt::Goto(label) => self.push(&format!("goto {label}")),
            GoStmt::Label(name) => self.push(&format!("{name}:")),
            GoStmt::Block(stmts) => {
                self.push("{");
                self.block_body(stmts);
                self.push("}");
            }
            GoStmt::Comment(text) => self.push(&format!("// {text}")),
        }
    }

    fn block_body(&mut self, stmts: &[GoStmt]) {
        self.indent += 1;
        for s in stmts {
            self.newline();
            self.stmt(s);
        }
        self.indent -= 1;
        self.newline();
    }

    fn decl(&mut self, d: &GoDecl) {
        match d {
            GoDecl::Func {
                name,
                params,
                variadic,
                result,
                body,
            } => {
                self.push(&format!("func {name}("));
                for (i, (pname, pty)) in params.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    if *variadic && i == params.len() - 1 {
                        self.push(&format!("{pname} ...{pty}"));
                    } else {
                        self.push(&format!("{pname} {pty}"));
                    }
                }
                self.push(")");
                if let Some(r) = result {
                    self.push(&format!(" {r}"));
                }
                self.push(" {");
                self.block_body(body);
                self.push("}");
            }
            GoDecl::Var { name, ty, value } => {
                self.stmt(&GoStmt::VarDecl {
                    name: name.clone(),
                    ty: ty.clone(),
                    value: value.clone(),
                });
            }
            GoDecl::TypeStruct { name, fields } => {
                self.push(&format!("type {name} struct {{"));
                self.indent += 1;
                for (fname, fty) in fields {
                    self.newline();
                    self.push(&format!("{fname} {fty}"));
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            GoDecl::TypeAlias { name, ty } => {
                self.push(&format!("type {name} = {ty}"));
            }
            GoDecl::ConstGroup { ty, entries } => {
                self.push("const (");
                self.indent += 1;
                for (name, value) in entries {
                    self.newline();
                    self.push(&format!("{name} {ty} = {value}"));
                }
                self.indent -= 1;
                self.newline();
                self.push(")");
            }
            GoDecl::Comment(text) => self.push(&format!("// {text}")),
            GoDecl::Raw(src) => self.push(src),
        }
    }

    fn file(&mut self, f: &GoFile) {
        self.push(&format!("package {}\n", f.package));
        if !f.imports.is_empty() {
            self.push("\nimport (\n");
            for path in &f.imports {
                self.push(&format!("\t\"{path}\"\n"));
            }
            self.push(")\n");
        }
        for d in &f.decls {
            self.push("\n");
            self.decl(d);
            self.push("\n");
        }
    }
}
