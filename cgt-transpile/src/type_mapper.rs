//! C type to Go type mapping and the LP64 size/alignment tables
//!
//! Resolution is deterministic and pure: the same C type always maps to the
//! same Go type, and typedef chains collapse to one canonical result with no
//! loss of width or signedness. Sizes answer what a host C compiler on an
//! LP64 target reports for `sizeof`, which the emitted code depends on
//! (`sizeof` expressions are folded to constants at translation time).

use crate::go_ast::GoType;
use crate::layout;
use cgt_ast::CType;
use cgt_common::{SourceLocation, TranspileError};

/// Pointer size on the assumed ABI
pub const POINTER_SIZE: u64 = 8;

/// Map a C type to the Go type the emitted code uses for it.
///
/// Pointers become slices of the pointee (the fat representation that makes
/// pointer arithmetic re-slicing possible), `void*` becomes an empty
/// interface, and function pointers become Go func types.
pub fn resolve(ctype: &CType, loc: &SourceLocation) -> Result<GoType, TranspileError> {
    match ctype.canonical() {
        CType::Void => Err(TranspileError::UnknownType {
            name: "void has no value type".to_string(),
            location: loc.clone(),
        }),
        CType::Bool => Ok(GoType::named("bool")),
        CType::Char | CType::SignedChar => Ok(GoType::named("int8")),
        CType::UnsignedChar => Ok(GoType::named("uint8")),
        CType::Short => Ok(GoType::named("int16")),
        CType::UnsignedShort => Ok(GoType::named("uint16")),
        CType::Int => Ok(GoType::named("int32")),
        CType::UnsignedInt => Ok(GoType::named("uint32")),
        CType::Long | CType::LongLong => Ok(GoType::named("int64")),
        CType::UnsignedLong | CType::UnsignedLongLong => Ok(GoType::named("uint64")),
        CType::Float => Ok(GoType::named("float32")),
        // Go has no 80/128-bit float; long double keeps its C size for
        // sizeof purposes but is computed as float64.
        CType::Double | CType::LongDouble => Ok(GoType::named("float64")),
        CType::Pointer(target) => {
            if target.is_void() {
                return Ok(GoType::Interface);
            }
            match target.canonical() {
                CType::Function {
                    return_type,
                    parameters,
                    is_variadic,
                } => resolve_func_type(return_type, parameters, *is_variadic, loc),
                other => Ok(GoType::slice_of(resolve(other, loc)?)),
            }
        }
        CType::Array {
            element,
            len: Some(n),
        } => Ok(GoType::Array {
            len: *n,
            elem: Box::new(resolve(element, loc)?),
        }),
        // An incomplete array is already a decayed pointer value.
        CType::Array { element, len: None } => Ok(GoType::slice_of(resolve(element, loc)?)),
        CType::Function {
            return_type,
            parameters,
            is_variadic,
        } => resolve_func_type(return_type, parameters, *is_variadic, loc),
        CType::Struct { name, .. } | CType::Union { name, .. } => match name {
            Some(name) => Ok(GoType::named(name)),
            None => Err(TranspileError::UnknownType {
                name: "anonymous aggregate used as a value type".to_string(),
                location: loc.clone(),
            }),
        },
        CType::Enum { .. } => Ok(GoType::named("int32")),
        CType::Typedef { .. } => unreachable!("canonical() strips typedefs"),
        CType::Error => Err(TranspileError::UnknownType {
            name: "unresolved type from front end".to_string(),
            location: loc.clone(),
        }),
    }
}

fn resolve_func_type(
    return_type: &CType,
    parameters: &[CType],
    is_variadic: bool,
    loc: &SourceLocation,
) -> Result<GoType, TranspileError> {
    let mut params = Vec::with_capacity(parameters.len());
    for p in parameters {
        params.push(resolve(p, loc)?);
    }
    if is_variadic {
        params.push(GoType::slice_of(GoType::Interface));
    }
    let result = if return_type.is_void() {
        None
    } else {
        Some(Box::new(resolve(return_type, loc)?))
    };
    Ok(GoType::Func { params, result })
}

/// `sizeof` for a C type on the LP64 ABI, in bytes
pub fn size_of(ctype: &CType, loc: &SourceLocation) -> Result<u64, TranspileError> {
    match ctype.canonical() {
        CType::Void => Err(TranspileError::UnknownType {
            name: "sizeof(void)".to_string(),
            location: loc.clone(),
        }),
        CType::Bool | CType::Char | CType::SignedChar | CType::UnsignedChar => Ok(1),
        CType::Short | CType::UnsignedShort => Ok(2),
        CType::Int | CType::UnsignedInt => Ok(4),
        CType::Long | CType::UnsignedLong | CType::LongLong | CType::UnsignedLongLong => Ok(8),
        CType::Float => Ok(4),
        CType::Double => Ok(8),
        CType::LongDouble => Ok(16),
        CType::Pointer(_) => Ok(POINTER_SIZE),
        CType::Array {
            element,
            len: Some(n),
        } => Ok(size_of(element, loc)? * n),
        CType::Array { len: None, .. } => Err(TranspileError::UnknownType {
            name: "sizeof of incomplete array".to_string(),
            location: loc.clone(),
        }),
        CType::Function { .. } => Err(TranspileError::UnknownType {
            name: "sizeof of function type".to_string(),
            location: loc.clone(),
        }),
        CType::Enum { .. } => Ok(4),
        t @ (CType::Struct { .. } | CType::Union { .. }) => {
            Ok(layout::layout_of(t, loc)?.size)
        }
        CType::Typedef { .. } => unreachable!("canonical() strips typedefs"),
        CType::Error => Err(TranspileError::UnknownType {
            name: "sizeof of unresolved type".to_string(),
            location: loc.clone(),
        }),
    }
}

/// Natural alignment for a C type on the LP64 ABI
pub fn align_of(ctype: &CType, loc: &SourceLocation) -> Result<u64, TranspileError> {
    match ctype.canonical() {
        CType::Array { element, .. } => align_of(element, loc),
        t @ (CType::Struct { .. } | CType::Union { .. }) => {
            Ok(layout::layout_of(t, loc)?.align)
        }
        // Scalars align to their size on this ABI (long double included).
        other => size_of(other, loc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgt_ast::Field;
    use pretty_assertions::assert_eq;

    fn loc() -> SourceLocation {
        SourceLocation::dummy()
    }

    #[test]
    fn test_primitive_sizes_match_lp64() {
        assert_eq!(size_of(&CType::Char, &loc()).unwrap(), 1);
        assert_eq!(size_of(&CType::Short, &loc()).unwrap(), 2);
        assert_eq!(size_of(&CType::Int, &loc()).unwrap(), 4);
        assert_eq!(size_of(&CType::Long, &loc()).unwrap(), 8);
        assert_eq!(size_of(&CType::LongLong, &loc()).unwrap(), 8);
        assert_eq!(size_of(&CType::Float, &loc()).unwrap(), 4);
        assert_eq!(size_of(&CType::Double, &loc()).unwrap(), 8);
        assert_eq!(size_of(&CType::LongDouble, &loc()).unwrap(), 16);
        assert_eq!(
            size_of(&CType::Pointer(Box::new(CType::Char)), &loc()).unwrap(),
            8
        );
    }

    #[test]
    fn test_array_size() {
        let arr = CType::Array {
            element: Box::new(CType::Int),
            len: Some(10),
        };
        assert_eq!(size_of(&arr, &loc()).unwrap(), 40);
    }

    #[test]
    fn test_resolve_is_idempotent_through_typedefs() {
        let aliased = CType::Typedef {
            name: "counter".to_string(),
            underlying: Box::new(CType::Typedef {
                name: "number".to_string(),
                underlying: Box::new(CType::UnsignedInt),
            }),
        };
        let first = resolve(&aliased, &loc()).unwrap();
        let direct = resolve(&CType::UnsignedInt, &loc()).unwrap();
        assert_eq!(first, direct);
        assert_eq!(first, GoType::named("uint32"));
    }

    #[test]
    fn test_pointer_resolves_to_slice() {
        let p = CType::Pointer(Box::new(CType::Double));
        assert_eq!(
            resolve(&p, &loc()).unwrap(),
            GoType::slice_of(GoType::named("float64"))
        );
    }

    #[test]
    fn test_void_pointer_resolves_to_interface() {
        let p = CType::Pointer(Box::new(CType::Void));
        assert_eq!(resolve(&p, &loc()).unwrap(), GoType::Interface);
    }

    #[test]
    fn test_function_pointer_is_not_a_slice() {
        let fp = CType::Pointer(Box::new(CType::Function {
            return_type: Box::new(CType::Int),
            parameters: vec![CType::Int, CType::Int],
            is_variadic: false,
        }));
        assert_eq!(
            resolve(&fp, &loc()).unwrap(),
            GoType::Func {
                params: vec![GoType::named("int32"), GoType::named("int32")],
                result: Some(Box::new(GoType::named("int32"))),
            }
        );
    }

    #[test]
    fn test_multi_dimensional_array() {
        let a = CType::Array {
            element: Box::new(CType::Array {
                element: Box::new(CType::Int),
                len: Some(3),
            }),
            len: Some(2),
        };
        assert_eq!(
            resolve(&a, &loc()).unwrap(),
            GoType::Array {
                len: 2,
                elem: Box::new(GoType::Array {
                    len: 3,
                    elem: Box::new(GoType::named("int32")),
                }),
            }
        );
        assert_eq!(size_of(&a, &loc()).unwrap(), 24);
    }

    #[test]
    fn test_struct_size_goes_through_layout() {
        let s = CType::Struct {
            name: Some("pair".to_string()),
            fields: vec![
                Field {
                    name: Some("c".to_string()),
                    ty: CType::Char,
                },
                Field {
                    name: Some("l".to_string()),
                    ty: CType::Long,
                },
            ],
        };
        // char at 0, 7 bytes padding, long at 8 -> 16 total
        assert_eq!(size_of(&s, &loc()).unwrap(), 16);
        assert_eq!(align_of(&s, &loc()).unwrap(), 8);
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let err = resolve(&CType::Error, &loc()).unwrap_err();
        assert!(matches!(err, TranspileError::UnknownType { .. }));
    }
}
