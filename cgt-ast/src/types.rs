//! C type model
//!
//! The full C type of every expression, as resolved by the front end.
//! Aggregate types carry their members inline so the transpiler never has
//! to chase a symbol table to answer size/layout questions; typedefs carry
//! their underlying type for the same reason.

use serde::{Deserialize, Serialize};
use std::fmt;

/// C types on the assumed LP64 ABI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CType {
    Void,

    /// _Bool
    Bool,

    /// Character types. Plain `char` is signed on this ABI.
    Char,
    SignedChar,
    UnsignedChar,

    /// Integer types
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,

    /// Floating types
    Float,
    Double,
    LongDouble,

    /// Pointer to another type
    Pointer(Box<CType>),

    /// Array type with optional length (None = incomplete / decayed)
    Array {
        element: Box<CType>,
        len: Option<u64>,
    },

    /// Function type
    Function {
        return_type: Box<CType>,
        parameters: Vec<CType>,
        is_variadic: bool,
    },

    /// Struct type. A field with no name is an anonymous struct/union
    /// member whose fields are promoted into the parent.
    Struct {
        name: Option<String>,
        fields: Vec<Field>,
    },

    /// Union type
    Union {
        name: Option<String>,
        fields: Vec<Field>,
    },

    /// Enum type
    Enum {
        name: Option<String>,
        enumerators: Vec<Enumerator>,
    },

    /// Typedef alias carrying its underlying type
    Typedef {
        name: String,
        underlying: Box<CType>,
    },

    /// Placeholder for types the front end could not resolve
    Error,
}

impl CType {
    /// Strip typedef layers down to the canonical type
    pub fn canonical(&self) -> &CType {
        let mut t = self;
        while let CType::Typedef { underlying, .. } = t {
            t = underlying;
        }
        t
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.canonical(),
            CType::Bool
                | CType::Char
                | CType::SignedChar
                | CType::UnsignedChar
                | CType::Short
                | CType::UnsignedShort
                | CType::Int
                | CType::UnsignedInt
                | CType::Long
                | CType::UnsignedLong
                | CType::LongLong
                | CType::UnsignedLongLong
                | CType::Enum { .. }
        )
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self.canonical(),
            CType::Char
                | CType::SignedChar
                | CType::Short
                | CType::Int
                | CType::Long
                | CType::LongLong
                | CType::Enum { .. }
        )
    }

    pub fn is_unsigned_integer(&self) -> bool {
        self.is_integer() && !self.is_signed_integer()
    }

    pub fn is_float(&self) -> bool {
        matches!(
            self.canonical(),
            CType::Float | CType::Double | CType::LongDouble
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.canonical(), CType::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.canonical(), CType::Array { .. })
    }

    /// Pointer or array: anything that decays to a pointer value
    pub fn is_pointer_like(&self) -> bool {
        self.is_pointer() || self.is_array()
    }

    pub fn is_void(&self) -> bool {
        matches!(self.canonical(), CType::Void)
    }

    pub fn is_void_pointer(&self) -> bool {
        match self.canonical() {
            CType::Pointer(target) => target.is_void(),
            _ => false,
        }
    }

    pub fn is_function_pointer(&self) -> bool {
        match self.canonical() {
            CType::Pointer(target) => {
                matches!(target.canonical(), CType::Function { .. })
            }
            _ => false,
        }
    }

    /// Element type of a pointer or array value
    pub fn pointee(&self) -> Option<&CType> {
        match self.canonical() {
            CType::Pointer(target) => Some(target),
            CType::Array { element, .. } => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Void => write!(f, "void"),
            CType::Bool => write!(f, "_Bool"),
            CType::Char => write!(f, "char"),
            CType::SignedChar => write!(f, "signed char"),
            CType::UnsignedChar => write!(f, "unsigned char"),
            CType::Short => write!(f, "short"),
            CType::UnsignedShort => write!(f, "unsigned short"),
            CType::Int => write!(f, "int"),
            CType::UnsignedInt => write!(f, "unsigned int"),
            CType::Long => write!(f, "long"),
            CType::UnsignedLong => write!(f, "unsigned long"),
            CType::LongLong => write!(f, "long long"),
            CType::UnsignedLongLong => write!(f, "unsigned long long"),
            CType::Float => write!(f, "float"),
            CType::Double => write!(f, "double"),
            CType::LongDouble => write!(f, "long double"),
            CType::Pointer(target) => write!(f, "{target}*"),
            CType::Array {
                element,
                len: Some(n),
            } => write!(f, "{element}[{n}]"),
            CType::Array { element, len: None } => write!(f, "{element}[]"),
            CType::Function {
                return_type,
                parameters,
                is_variadic,
            } => {
                write!(f, "{return_type} (")?;
                for (i, param) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                if *is_variadic {
                    write!(f, ", ...")?;
                }
                write!(f, ")")
            }
            CType::Struct {
                name: Some(name), ..
            } => write!(f, "struct {name}"),
            CType::Struct { name: None, .. } => write!(f, "struct <anonymous>"),
            CType::Union {
                name: Some(name), ..
            } => write!(f, "union {name}"),
            CType::Union { name: None, .. } => write!(f, "union <anonymous>"),
            CType::Enum {
                name: Some(name), ..
            } => write!(f, "enum {name}"),
            CType::Enum { name: None, .. } => write!(f, "enum <anonymous>"),
            CType::Typedef { name, .. } => write!(f, "{name}"),
            CType::Error => write!(f, "<error>"),
        }
    }
}

/// Struct/union member. `name: None` marks an anonymous struct/union
/// member whose fields are visible in the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: Option<String>,
    pub ty: CType,
}

/// A single enumerator; `value: None` means "previous + 1" (C rule)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    pub value: Option<i64>,
}

/// Storage class specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageClass {
    Auto,
    Static,
    Extern,
    Register,
    Typedef,
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class_str = match self {
            StorageClass::Auto => "auto",
            StorageClass::Static => "static",
            StorageClass::Extern => "extern",
            StorageClass::Register => "register",
            StorageClass::Typedef => "typedef",
        };
        write!(f, "{class_str}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_ptr() -> CType {
        CType::Pointer(Box::new(CType::Int))
    }

    #[test]
    fn test_canonical_collapses_typedef_chain() {
        let t = CType::Typedef {
            name: "myint2".to_string(),
            underlying: Box::new(CType::Typedef {
                name: "myint".to_string(),
                underlying: Box::new(CType::Int),
            }),
        };
        assert_eq!(t.canonical(), &CType::Int);
        assert!(t.is_integer());
        assert!(t.is_signed_integer());
    }

    #[test]
    fn test_type_predicates() {
        assert!(CType::Int.is_integer());
        assert!(!CType::UnsignedInt.is_signed_integer());
        assert!(CType::Double.is_float());
        assert!(int_ptr().is_pointer());
        assert!(!CType::Int.is_pointer());
        assert!(CType::Pointer(Box::new(CType::Void)).is_void_pointer());

        let fn_ptr = CType::Pointer(Box::new(CType::Function {
            return_type: Box::new(CType::Int),
            parameters: vec![CType::Int],
            is_variadic: false,
        }));
        assert!(fn_ptr.is_function_pointer());
        assert!(!fn_ptr.is_void_pointer());
    }

    #[test]
    fn test_pointee() {
        assert_eq!(int_ptr().pointee(), Some(&CType::Int));

        let arr = CType::Array {
            element: Box::new(CType::Char),
            len: Some(8),
        };
        assert_eq!(arr.pointee(), Some(&CType::Char));
        assert!(arr.is_pointer_like());
        assert_eq!(CType::Int.pointee(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CType::Int), "int");
        assert_eq!(format!("{}", int_ptr()), "int*");
        assert_eq!(
            format!(
                "{}",
                CType::Array {
                    element: Box::new(CType::Double),
                    len: Some(4)
                }
            ),
            "double[4]"
        );
        assert_eq!(format!("{}", CType::LongDouble), "long double");
    }
}
