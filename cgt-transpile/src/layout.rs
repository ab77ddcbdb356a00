//! Struct/union layout calculation
//!
//! Computes field offsets and total sizes following standard C layout on
//! LP64: every field sits at its natural alignment and the total size is
//! rounded up to the largest member alignment, so `sizeof` in the emitted
//! code agrees with what a host C compiler reports for the source type.
//!
//! Anonymous struct/union members are flattened here: their fields appear
//! in the parent layout under their own names, at the offsets C gives them,
//! so `parent.field` member access resolves without knowing the nesting.

use crate::type_mapper;
use cgt_ast::{CType, Field};
use cgt_common::{SourceLocation, TranspileError};

/// Memory layout of a struct or union
#[derive(Debug, Clone, PartialEq)]
pub struct StructLayout {
    pub name: Option<String>,
    pub fields: Vec<FieldLayout>,
    /// Total size in bytes, padding included
    pub size: u64,
    /// Largest member alignment
    pub align: u64,
    pub is_union: bool,
}

/// Layout of a single (possibly promoted) field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub name: String,
    pub ty: CType,
    /// Byte offset from the start of the aggregate
    pub offset: u64,
    pub size: u64,
}

impl StructLayout {
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// `offsetof` equivalent
    pub fn offset_of(&self, name: &str) -> Option<u64> {
        self.field(name).map(|f| f.offset)
    }
}

fn round_up(value: u64, align: u64) -> u64 {
    if align == 0 {
        return value;
    }
    value.div_ceil(align) * align
}

/// Compute the layout for a struct or union type.
///
/// Fails with `LayoutError` when a member type cannot be sized (incomplete
/// arrays, unresolved types); bitfields are not modeled and arrive from the
/// front end as plain integer fields.
pub fn layout_of(ctype: &CType, loc: &SourceLocation) -> Result<StructLayout, TranspileError> {
    match ctype.canonical() {
        CType::Struct { name, fields } => layout_fields(name.clone(), fields, false, loc),
        CType::Union { name, fields } => layout_fields(name.clone(), fields, true, loc),
        other => Err(TranspileError::LayoutError {
            message: format!("not an aggregate type: {other}"),
            location: loc.clone(),
        }),
    }
}

fn member_error(field: &Field, err: TranspileError, loc: &SourceLocation) -> TranspileError {
    TranspileError::LayoutError {
        message: format!(
            "cannot lay out member '{}': {err}",
            field.name.as_deref().unwrap_or("<anonymous>")
        ),
        location: loc.clone(),
    }
}

fn layout_fields(
    name: Option<String>,
    fields: &[Field],
    is_union: bool,
    loc: &SourceLocation,
) -> Result<StructLayout, TranspileError> {
    let mut out = Vec::new();
    let mut offset = 0u64;
    let mut max_align = 1u64;
    let mut union_size = 0u64;

    for field in fields {
        let is_anonymous_aggregate = field.name.is_none()
            && matches!(
                field.ty.canonical(),
                CType::Struct { .. } | CType::Union { .. }
            );

        if is_anonymous_aggregate {
            // Flatten: the member's fields are promoted into this layout at
            // the offsets the anonymous aggregate occupies.
            let inner = layout_of(&field.ty, loc).map_err(|e| member_error(field, e, loc))?;
            let base = if is_union {
                0
            } else {
                round_up(offset, inner.align)
            };
            for f in &inner.fields {
                out.push(FieldLayout {
                    name: f.name.clone(),
                    ty: f.ty.clone(),
                    offset: base + f.offset,
                    size: f.size,
                });
            }
            max_align = max_align.max(inner.align);
            if is_union {
                union_size = union_size.max(inner.size);
            } else {
                offset = base + inner.size;
            }
            continue;
        }

        let fname = match &field.name {
            Some(n) => n.clone(),
            None => {
                return Err(TranspileError::LayoutError {
                    message: "unnamed member of non-aggregate type".to_string(),
                    location: loc.clone(),
                })
            }
        };

        let size =
            type_mapper::size_of(&field.ty, loc).map_err(|e| member_error(field, e, loc))?;
        let align =
            type_mapper::align_of(&field.ty, loc).map_err(|e| member_error(field, e, loc))?;
        max_align = max_align.max(align);

        let field_offset = if is_union {
            0
        } else {
            round_up(offset, align)
        };

        out.push(FieldLayout {
            name: fname,
            ty: field.ty.clone(),
            offset: field_offset,
            size,
        });

        if is_union {
            union_size = union_size.max(size);
        } else {
            offset = field_offset + size;
        }
    }

    let raw_size = if is_union { union_size } else { offset };
    Ok(StructLayout {
        name,
        fields: out,
        size: round_up(raw_size, max_align),
        align: max_align,
        is_union,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn loc() -> SourceLocation {
        SourceLocation::dummy()
    }

    fn named(name: &str, ty: CType) -> Field {
        Field {
            name: Some(name.to_string()),
            ty,
        }
    }

    #[test]
    fn test_natural_alignment_padding() {
        // struct { char c; int i; short s; } -> c@0, i@4, s@8, size 12
        let s = CType::Struct {
            name: Some("s".to_string()),
            fields: vec![
                named("c", CType::Char),
                named("i", CType::Int),
                named("s", CType::Short),
            ],
        };
        let l = layout_of(&s, &loc()).unwrap();
        assert_eq!(l.offset_of("c"), Some(0));
        assert_eq!(l.offset_of("i"), Some(4));
        assert_eq!(l.offset_of("s"), Some(8));
        assert_eq!(l.size, 12);
        assert_eq!(l.align, 4);
    }

    #[test]
    fn test_tail_padding_to_max_align() {
        // struct { long l; char c; } -> size 16, not 9
        let s = CType::Struct {
            name: None,
            fields: vec![named("l", CType::Long), named("c", CType::Char)],
        };
        let l = layout_of(&s, &loc()).unwrap();
        assert_eq!(l.size, 16);
        assert_eq!(l.align, 8);
    }

    #[test]
    fn test_union_size_is_max_member() {
        let u = CType::Union {
            name: Some("u".to_string()),
            fields: vec![
                named("c", CType::Char),
                named("d", CType::Double),
                named("i", CType::Int),
            ],
        };
        let l = layout_of(&u, &loc()).unwrap();
        assert_eq!(l.size, 8);
        assert!(l.is_union);
        assert_eq!(l.offset_of("c"), Some(0));
        assert_eq!(l.offset_of("d"), Some(0));
        assert_eq!(l.offset_of("i"), Some(0));
    }

    #[test]
    fn test_anonymous_union_members_are_promoted() {
        // struct { int tag; union { int i; double d; }; char end; }
        let s = CType::Struct {
            name: Some("v".to_string()),
            fields: vec![
                named("tag", CType::Int),
                Field {
                    name: None,
                    ty: CType::Union {
                        name: None,
                        fields: vec![named("i", CType::Int), named("d", CType::Double)],
                    },
                },
                named("end", CType::Char),
            ],
        };
        let l = layout_of(&s, &loc()).unwrap();
        // union aligns to 8: tag@0, union@8 (both members), end@16
        assert_eq!(l.offset_of("tag"), Some(0));
        assert_eq!(l.offset_of("i"), Some(8));
        assert_eq!(l.offset_of("d"), Some(8));
        assert_eq!(l.offset_of("end"), Some(16));
        assert_eq!(l.size, 24);
    }

    #[test]
    fn test_array_member() {
        let s = CType::Struct {
            name: None,
            fields: vec![
                named(
                    "buf",
                    CType::Array {
                        element: Box::new(CType::Char),
                        len: Some(10),
                    },
                ),
                named("n", CType::Int),
            ],
        };
        let l = layout_of(&s, &loc()).unwrap();
        assert_eq!(l.offset_of("buf"), Some(0));
        assert_eq!(l.offset_of("n"), Some(12));
        assert_eq!(l.size, 16);
    }

    #[test]
    fn test_incomplete_member_fails() {
        let s = CType::Struct {
            name: None,
            fields: vec![named(
                "flex",
                CType::Array {
                    element: Box::new(CType::Int),
                    len: None,
                },
            )],
        };
        let err = layout_of(&s, &loc()).unwrap_err();
        assert!(matches!(err, TranspileError::LayoutError { .. }));
    }

    #[test]
    fn test_pointer_members_are_eight_bytes() {
        let s = CType::Struct {
            name: None,
            fields: vec![
                named("p", CType::Pointer(Box::new(CType::Int))),
                named("c", CType::Char),
            ],
        };
        let l = layout_of(&s, &loc()).unwrap();
        assert_eq!(l.fields[0].size, 8);
        assert_eq!(l.size, 16);
    }
}
