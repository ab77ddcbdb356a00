//! AST-driven C to Go translation
//!
//! Takes a typed C translation unit (produced and serialized by a front
//! end) and emits one Go source file with the same observable behavior.
//! The pointer model is the heart of it: C pointers become Go slices that
//! carry base and bounds, so pointer arithmetic turns into re-slicing and
//! out-of-bounds access panics instead of corrupting memory.
//!
//! Translation never stops at the first problem. Recoverable errors leave
//! a placeholder comment (or a panicking stub) in the output and a warning
//! diagnostic in the [`TranslationOutput`]; only I/O failures abort.

pub mod enums;
pub mod go_ast;
pub mod layout;
pub mod pointer;
pub mod shim;
pub mod type_mapper;

mod declarations;
mod expressions;
mod statements;

use std::collections::{BTreeMap, HashMap, HashSet};

use cgt_ast::{CType, TopLevelItem, TranslationUnit};
use cgt_common::{Diagnostic, DiagnosticSink, TranspileError};
use enums::EnumSpace;
use go_ast::{GoDecl, GoExpr, GoFile, GoType};
use layout::StructLayout;
use log::{debug, info};
use shim::{ShimRegistry, NOARCH_IMPORT};

/// Result of translating one unit: the Go source plus everything the
/// translator had to say about it
#[derive(Debug)]
pub struct TranslationOutput {
    pub go_source: String,
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Per-unit translation state
pub struct Transpiler {
    pub(crate) sink: DiagnosticSink,
    pub(crate) enums: EnumSpace,
    pub(crate) records: HashMap<String, StructLayout>,
    pub(crate) shims: ShimRegistry,
    /// Functions defined or prototyped in the current unit; calls to
    /// anything else go through the shim registry
    pub(crate) functions: HashSet<String>,
    /// Return type of the function being translated, None in void context
    pub(crate) current_return: Option<CType>,
    pub(crate) uses_noarch: bool,
    pub(crate) uses_unsafe: bool,
    /// Generated pointer-arithmetic helpers, keyed by name so each element
    /// type gets exactly one
    pub(crate) arith_helpers: BTreeMap<String, String>,
    temp_counter: usize,
}

impl Transpiler {
    pub fn new() -> Self {
        Self {
            sink: DiagnosticSink::new(),
            enums: EnumSpace::new(),
            records: HashMap::new(),
            shims: ShimRegistry::standard(),
            functions: HashSet::new(),
            current_return: None,
            uses_noarch: false,
            uses_unsafe: false,
            arith_helpers: BTreeMap::new(),
            temp_counter: 0,
        }
    }

    /// Translate a unit into a Go file
    pub fn translate_unit(&mut self, unit: &TranslationUnit) -> Result<GoFile, TranspileError> {
        info!("translating {}", unit.file);

        // Calls may precede definitions; collect every function name the
        // unit itself provides before translating bodies.
        self.functions.clear();
        for item in &unit.items {
            match item {
                TopLevelItem::Function(f) => {
                    self.functions.insert(f.name.clone());
                }
                TopLevelItem::Declaration(d)
                    if matches!(d.ctype.canonical(), CType::Function { .. }) =>
                {
                    self.functions.insert(d.name.clone());
                }
                _ => {}
            }
        }

        let mut file = GoFile::new("main");
        for item in &unit.items {
            match self.top_level(item) {
                Ok(decls) => file.decls.extend(decls),
                Err(err) if err.is_recoverable() => {
                    self.sink.recovered(&err);
                    file.decls
                        .push(GoDecl::Comment(format!("not translated: {err}")));
                }
                Err(err) => return Err(err),
            }
        }

        for src in self.arith_helpers.values() {
            file.decls.push(GoDecl::Raw(src.clone()));
        }
        if self.uses_noarch {
            file.add_import(NOARCH_IMPORT);
        }
        if self.uses_unsafe {
            file.add_import("unsafe");
        }

        debug!(
            "{}: {} declarations, {}",
            unit.file,
            file.decls.len(),
            self.sink.summary()
        );
        Ok(file)
    }

    pub(crate) fn fresh_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("cgtTmp{}", self.temp_counter)
    }

    /// A call to the per-element-type helper that shifts a slice view by a
    /// signed offset, registering the helper for emission
    pub(crate) fn pointer_arith(
        &mut self,
        slice: GoExpr,
        offset: GoExpr,
        elem: &GoType,
    ) -> GoExpr {
        self.uses_unsafe = true;
        let name = pointer::arith_helper_name(elem);
        self.arith_helpers
            .entry(name.clone())
            .or_insert_with(|| pointer::arith_helper_source(elem));
        GoExpr::call(
            GoExpr::Ident(name),
            vec![
                slice,
                GoExpr::Conv {
                    ty: GoType::named("int"),
                    expr: Box::new(offset),
                },
            ],
        )
    }
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate one unit from AST to Go source
pub fn transpile(unit: &TranslationUnit) -> Result<TranslationOutput, TranspileError> {
    let mut transpiler = Transpiler::new();
    let file = transpiler.translate_unit(unit)?;
    let sink = transpiler.sink;
    Ok(TranslationOutput {
        go_source: file.render(),
        error_count: sink.error_count(),
        warning_count: sink.warning_count(),
        diagnostics: sink.into_diagnostics(),
    })
}
