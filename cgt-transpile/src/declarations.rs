//! Declaration and initializer translation
//!
//! Top-level items become Go declarations: functions, package vars, struct
//! types (with anonymous members flattened, matching the layout module),
//! enum const groups and type aliases for typedefs. Initializer lists walk
//! with a position cursor that designators reset, and whatever the list
//! leaves uncovered picks up Go's zero value, which coincides with C's
//! rule for partially initialized aggregates.

use crate::expressions::decayed;
use crate::go_ast::{GoDecl, GoExpr, GoStmt, GoType};
use crate::layout;
use crate::type_mapper;
use crate::Transpiler;
use cgt_ast::{
    CType, Declaration, Designator, Enumerator, ExpressionKind, FunctionDefinition, InitItem,
    Initializer, InitializerKind, StorageClass, TopLevelItem,
};
use cgt_common::{SourceLocation, TranspileError};

fn is_char_array(ty: &CType) -> bool {
    match ty.canonical() {
        CType::Array { element, .. } => matches!(
            element.canonical(),
            CType::Char | CType::SignedChar | CType::UnsignedChar
        ),
        _ => false,
    }
}

/// Bytes of a string literal as char-array elements; a declared length
/// truncates, an open length appends the NUL terminator
fn char_array_elems(s: &str, declared_len: Option<u64>) -> Vec<GoExpr> {
    let mut bytes: Vec<u8> = s.bytes().collect();
    match declared_len {
        Some(n) => bytes.truncate(n as usize),
        None => bytes.push(0),
    }
    bytes
        .into_iter()
        .map(|b| GoExpr::IntLit(i64::from(b)))
        .collect()
}

impl Transpiler {
    /// Translate one top-level item into Go declarations
    pub(crate) fn top_level(
        &mut self,
        item: &TopLevelItem,
    ) -> Result<Vec<GoDecl>, TranspileError> {
        match item {
            TopLevelItem::Function(f) => Ok(vec![self.function_def(f)?]),
            TopLevelItem::Declaration(d) => self.global_decl(d),
            TopLevelItem::Typedef {
                name,
                underlying,
                loc,
            } => self.typedef_decl(name, underlying, loc),
            TopLevelItem::TypeDefinition { ctype, loc } => self.type_definition(ctype, loc),
        }
    }

    fn type_definition(
        &mut self,
        ctype: &CType,
        loc: &SourceLocation,
    ) -> Result<Vec<GoDecl>, TranspileError> {
        match ctype.canonical() {
            CType::Struct { name: Some(n), .. } | CType::Union { name: Some(n), .. } => {
                Ok(vec![self.record_decl(n.clone(), ctype, loc)?])
            }
            CType::Enum { name, enumerators } => {
                Ok(self.enum_decl(name.as_deref(), enumerators))
            }
            // An anonymous record with no typedef cannot be referred to.
            _ => Ok(vec![]),
        }
    }

    /// Emit a Go struct for a C struct or union. Unions become plain Go
    /// structs: every member gets its own storage, so writing one member
    /// does not alias the others.
    fn record_decl(
        &mut self,
        name: String,
        ctype: &CType,
        loc: &SourceLocation,
    ) -> Result<GoDecl, TranspileError> {
        let lay = layout::layout_of(ctype, loc)?;
        let mut fields = Vec::with_capacity(lay.fields.len());
        for f in &lay.fields {
            fields.push((f.name.clone(), type_mapper::resolve(&f.ty, loc)?));
        }
        self.records.insert(name.clone(), lay);
        Ok(GoDecl::TypeStruct { name, fields })
    }

    fn enum_decl(&mut self, owner: Option<&str>, enumerators: &[Enumerator]) -> Vec<GoDecl> {
        let entries = self.enums.add_enum(owner, enumerators);
        if entries.is_empty() {
            vec![]
        } else {
            vec![GoDecl::ConstGroup {
                ty: "int32".to_string(),
                entries,
            }]
        }
    }

    fn typedef_decl(
        &mut self,
        name: &str,
        underlying: &CType,
        loc: &SourceLocation,
    ) -> Result<Vec<GoDecl>, TranspileError> {
        match underlying.canonical() {
            CType::Struct {
                name: inner_name, ..
            }
            | CType::Union {
                name: inner_name, ..
            } => match inner_name {
                // typedef struct tag {...} name: define the tag once,
                // alias the typedef to it.
                Some(inner) => {
                    let mut out = Vec::new();
                    if !self.records.contains_key(inner.as_str()) {
                        out.push(self.record_decl(inner.clone(), underlying, loc)?);
                    }
                    if inner != name {
                        out.push(GoDecl::TypeAlias {
                            name: name.to_string(),
                            ty: GoType::named(inner),
                        });
                    }
                    Ok(out)
                }
                // typedef struct {...} name: the typedef is the only name.
                None => Ok(vec![self.record_decl(name.to_string(), underlying, loc)?]),
            },
            CType::Enum {
                name: enum_name,
                enumerators,
            } => {
                let mut out = self.enum_decl(enum_name.as_deref(), enumerators);
                out.push(GoDecl::TypeAlias {
                    name: name.to_string(),
                    ty: GoType::named("int32"),
                });
                Ok(out)
            }
            other => Ok(vec![GoDecl::TypeAlias {
                name: name.to_string(),
                ty: type_mapper::resolve(other, loc)?,
            }]),
        }
    }

    fn global_decl(&mut self, d: &Declaration) -> Result<Vec<GoDecl>, TranspileError> {
        match d.storage_class {
            // Defined in another unit, or not a variable at all.
            StorageClass::Extern | StorageClass::Typedef => Ok(vec![]),
            // Function prototypes carry no code.
            _ if matches!(d.ctype.canonical(), CType::Function { .. }) => Ok(vec![]),
            _ => {
                let ty = type_mapper::resolve(&d.ctype, &d.loc)?;
                let value = match &d.initializer {
                    None => None,
                    Some(init) => {
                        let (v, pre) = self.initializer_value(init, &d.ctype)?;
                        if pre.is_empty() {
                            Some(v)
                        } else {
                            // Package-level vars cannot carry statements;
                            // fold them into an init closure.
                            let mut body = pre;
                            body.push(GoStmt::Return(Some(v)));
                            Some(GoExpr::call(
                                GoExpr::FuncLit {
                                    result: Some(ty.clone()),
                                    body,
                                },
                                vec![],
                            ))
                        }
                    }
                };
                Ok(vec![GoDecl::Var {
                    name: d.name.clone(),
                    ty: Some(ty),
                    value,
                }])
            }
        }
    }

    /// Translate a local declaration into statements
    pub(crate) fn local_decl(&mut self, d: &Declaration) -> Result<Vec<GoStmt>, TranspileError> {
        match d.storage_class {
            StorageClass::Extern | StorageClass::Typedef => return Ok(vec![]),
            StorageClass::Static => {
                // A static local's value would have to survive across
                // calls; emitted as an ordinary local, flagged.
                let err = TranspileError::UnsupportedConstruct {
                    construct: format!("static lifetime of local '{}' is not preserved", d.name),
                    location: d.loc.clone(),
                };
                self.sink.recovered(&err);
            }
            _ => {}
        }
        let ty = type_mapper::resolve(&d.ctype, &d.loc)?;
        match &d.initializer {
            None => Ok(vec![GoStmt::VarDecl {
                name: d.name.clone(),
                ty: Some(ty),
                value: None,
            }]),
            Some(init) => {
                let (value, mut pre) = self.initializer_value(init, &d.ctype)?;
                pre.push(GoStmt::VarDecl {
                    name: d.name.clone(),
                    ty: Some(ty),
                    value: Some(value),
                });
                Ok(pre)
            }
        }
    }

    /// Translate an initializer into a Go value, plus any statements its
    /// expressions hoisted
    pub(crate) fn initializer_value(
        &mut self,
        init: &Initializer,
        ty: &CType,
    ) -> Result<(GoExpr, Vec<GoStmt>), TranspileError> {
        match &init.kind {
            InitializerKind::Expression(e) => {
                // char buf[N] = "..." fills element by element
                if is_char_array(ty) {
                    if let ExpressionKind::StringLiteral(s) = &e.kind {
                        let len = match ty.canonical() {
                            CType::Array { len, .. } => *len,
                            _ => None,
                        };
                        let go_ty = type_mapper::resolve(ty, &init.loc)?;
                        return Ok((
                            GoExpr::Composite {
                                ty: go_ty,
                                elems: char_array_elems(s, len),
                            },
                            Vec::new(),
                        ));
                    }
                }
                let t = decayed(self.expression(e)?);
                let value = self.cast_value(t.expr, &t.ctype, ty, &e.loc)?;
                let mut pre = t.pre;
                if t.post.is_empty() {
                    Ok((value, pre))
                } else {
                    let tmp = self.fresh_temp();
                    pre.push(GoStmt::Define {
                        name: tmp.clone(),
                        value,
                    });
                    pre.extend(t.post);
                    Ok((GoExpr::ident(&tmp), pre))
                }
            }
            InitializerKind::List(items) => self.list_initializer(items, ty, &init.loc),
        }
    }

    fn list_initializer(
        &mut self,
        items: &[InitItem],
        ty: &CType,
        loc: &SourceLocation,
    ) -> Result<(GoExpr, Vec<GoStmt>), TranspileError> {
        match ty.canonical() {
            CType::Array { element, .. } => {
                let go_ty = type_mapper::resolve(ty, loc)?;
                let keyed = items.iter().any(|i| i.designator.is_some());
                let mut elems = Vec::with_capacity(items.len());
                let mut pre = Vec::new();
                let mut cursor = 0u64;
                for item in items {
                    match &item.designator {
                        Some(Designator::Index(i)) => cursor = *i,
                        Some(Designator::Member(m)) => {
                            return Err(TranspileError::IncompatibleOperands {
                                message: format!("member designator .{m} in array initializer"),
                                location: loc.clone(),
                            })
                        }
                        None => {}
                    }
                    let (v, p) = self.initializer_value(&item.init, element)?;
                    pre.extend(p);
                    elems.push(if keyed {
                        GoExpr::KeyValue {
                            key: Box::new(GoExpr::IntLit(cursor as i64)),
                            value: Box::new(v),
                        }
                    } else {
                        v
                    });
                    cursor += 1;
                }
                Ok((GoExpr::Composite { ty: go_ty, elems }, pre))
            }
            CType::Struct { .. } | CType::Union { .. } => {
                let lay = layout::layout_of(ty, loc)?;
                let go_ty = type_mapper::resolve(ty, loc)?;
                let mut elems = Vec::with_capacity(items.len());
                let mut pre = Vec::new();
                let mut idx = 0usize;
                for item in items {
                    match &item.designator {
                        Some(Designator::Member(name)) => {
                            idx = lay
                                .fields
                                .iter()
                                .position(|f| f.name == *name)
                                .ok_or_else(|| TranspileError::LayoutError {
                                    message: format!("no member '{name}' to designate"),
                                    location: loc.clone(),
                                })?;
                        }
                        Some(Designator::Index(i)) => {
                            return Err(TranspileError::IncompatibleOperands {
                                message: format!("index designator [{i}] in record initializer"),
                                location: loc.clone(),
                            })
                        }
                        None => {}
                    }
                    let field =
                        lay.fields
                            .get(idx)
                            .ok_or_else(|| TranspileError::LayoutError {
                                message: "too many initializers for record".to_string(),
                                location: loc.clone(),
                            })?;
                    let (v, p) = self.initializer_value(&item.init, &field.ty)?;
                    pre.extend(p);
                    elems.push(GoExpr::KeyValue {
                        key: Box::new(GoExpr::ident(&field.name)),
                        value: Box::new(v),
                    });
                    idx += 1;
                }
                Ok((GoExpr::Composite { ty: go_ty, elems }, pre))
            }
            // A scalar wrapped in braces
            _ if items.len() == 1 && items[0].designator.is_none() => {
                self.initializer_value(&items[0].init, ty)
            }
            other => Err(TranspileError::IncompatibleOperands {
                message: format!("initializer list for scalar type {other}"),
                location: loc.clone(),
            }),
        }
    }

    fn function_def(&mut self, f: &FunctionDefinition) -> Result<GoDecl, TranspileError> {
        let is_main = f.name == "main";
        let result = if is_main || f.return_type.is_void() {
            None
        } else {
            Some(type_mapper::resolve(&f.return_type, &f.loc)?)
        };
        self.current_return = result.as_ref().map(|_| f.return_type.clone());

        let mut params = Vec::with_capacity(f.parameters.len());
        if is_main && !f.parameters.is_empty() {
            let err = TranspileError::UnsupportedConstruct {
                construct: "main argc/argv parameters".to_string(),
                location: f.loc.clone(),
            };
            self.sink.recovered(&err);
        } else {
            for p in &f.parameters {
                let name = p.name.clone().unwrap_or_else(|| "_".to_string());
                // Array parameters are pointers.
                let cty = match p.ctype.canonical() {
                    CType::Array { element, .. } => CType::Pointer(element.clone()),
                    other => other.clone(),
                };
                params.push((name, type_mapper::resolve(&cty, &p.loc)?));
            }
        }
        let variadic = f.is_variadic && !is_main;
        if variadic {
            params.push(("args".to_string(), GoType::Interface));
        }

        let body = self.block_stmts(&f.body)?;
        self.current_return = None;
        Ok(GoDecl::Func {
            name: f.name.clone(),
            params,
            variadic,
            result,
            body,
        })
    }
}
