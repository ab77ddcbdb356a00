//! Pointer and array representation model
//!
//! C pointers do not survive translation as addresses. Every pointer-typed
//! value gets one of a small set of representations, and every expression
//! rule that touches a pointer goes through this module so the choice stays
//! consistent:
//!
//! - a pointer that provably views an array (decay, `&arr[i]`) is a
//!   `FatSlice`: a Go slice carrying base and bounds, where arithmetic
//!   re-slices instead of reinterpreting the base address;
//! - `&scalar` and pointers of unknown provenance are `RawScalar` and are
//!   promoted to a fixed-capacity slice over the scalar's storage the
//!   moment they are dereferenced or indexed;
//! - function pointers are direct func values, never data slices;
//! - `void*` is an untyped `interface{}` reference that regains a concrete
//!   representation only at an explicit cast back.
//!
//! Out-of-bounds arithmetic is translated as-is; the emitted code panics at
//! run time, which is this tool's rendering of C's undefined behavior.

use crate::go_ast::{GoExpr, GoType};
use cgt_ast::{CType, Expression, ExpressionKind, UnaryOp};

/// Capacity used when a scalar reference is promoted to a slice view.
/// Large enough that constant-folded offsets in real code stay in range;
/// the same trick the expected-output corpus uses for its unsafe casts.
pub const DEFENSIVE_CAPACITY: u64 = 1_000_000;

/// Where a pointer value came from, as far as static analysis can tell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Rooted at a named array or pointer variable
    Variable(String),
    Unknown,
}

/// How a pointer-typed value is represented in emitted code
#[derive(Debug, Clone, PartialEq)]
pub enum PointerRepresentation {
    /// Address of a scalar or a pointer with unknown provenance; promoted
    /// to a defensive FatSlice on dereference/index
    RawScalar,

    /// Slice view with base and bounds
    FatSlice { elem: CType, origin: Origin },

    /// Direct reference to a callable
    FunctionRef,

    /// Type-erased `void*`
    VoidRef,
}

/// Trace an expression back to the variable its pointer value derives from.
///
/// Casts, member/index steps and pointer arithmetic all preserve the root;
/// anything else is unknown. Classification uses this to tell anchored
/// views from pointers of unknown provenance.
pub fn origin_of(expr: &Expression) -> Origin {
    match &expr.kind {
        ExpressionKind::Identifier(name) => Origin::Variable(name.clone()),
        ExpressionKind::Cast { operand, .. } => origin_of(operand),
        ExpressionKind::Unary { op, operand } => match op {
            UnaryOp::AddressOf | UnaryOp::Dereference => origin_of(operand),
            UnaryOp::PreIncrement
            | UnaryOp::PostIncrement
            | UnaryOp::PreDecrement
            | UnaryOp::PostDecrement => origin_of(operand),
            _ => Origin::Unknown,
        },
        ExpressionKind::Binary { left, right, .. } => {
            // p + n / p - n: the pointer side carries the origin.
            if left.ctype.is_pointer_like() {
                origin_of(left)
            } else if right.ctype.is_pointer_like() {
                origin_of(right)
            } else {
                Origin::Unknown
            }
        }
        ExpressionKind::Index { base, .. } => origin_of(base),
        ExpressionKind::Member { object, member, .. } => match origin_of(object) {
            Origin::Variable(root) => Origin::Variable(format!("{root}.{member}")),
            Origin::Unknown => Origin::Unknown,
        },
        _ => Origin::Unknown,
    }
}

/// Two pointer values provably view distinct objects: each one roots at a
/// named array, and the arrays differ. Anything weaker is assumed related;
/// a difference between genuinely unrelated views is meaningless when the
/// emitted code runs, which C leaves undefined anyway.
pub fn provably_distinct(left: &Expression, right: &Expression) -> bool {
    match (array_root(left), array_root(right)) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

/// The named array an expression's pointer value is anchored in, when the
/// chain of casts, address-of steps and arithmetic makes that visible
fn array_root(expr: &Expression) -> Option<String> {
    match &expr.kind {
        ExpressionKind::Identifier(name) if expr.ctype.is_array() => Some(name.clone()),
        ExpressionKind::Cast { operand, .. } => array_root(operand),
        ExpressionKind::Unary { op, operand } => match op {
            UnaryOp::AddressOf | UnaryOp::Dereference => array_root(operand),
            _ => None,
        },
        ExpressionKind::Binary { left, right, .. } => {
            if left.ctype.is_pointer_like() {
                array_root(left)
            } else if right.ctype.is_pointer_like() {
                array_root(right)
            } else {
                None
            }
        }
        ExpressionKind::Index { base, .. } => array_root(base),
        _ => None,
    }
}

/// Classify a pointer-typed value
pub fn classify(expr: &Expression) -> PointerRepresentation {
    if expr.ctype.is_function_pointer() {
        return PointerRepresentation::FunctionRef;
    }
    if expr.ctype.is_void_pointer() {
        return PointerRepresentation::VoidRef;
    }

    let elem = match expr.ctype.pointee() {
        Some(e) => e.clone(),
        None => return PointerRepresentation::RawScalar,
    };

    // &scalar is a raw reference until promoted; &arr[i] decays to a view
    // of the array.
    if let ExpressionKind::Unary {
        op: UnaryOp::AddressOf,
        operand,
    } = &expr.kind
    {
        if !matches!(operand.kind, ExpressionKind::Index { .. })
            && !operand.ctype.is_array()
        {
            return PointerRepresentation::RawScalar;
        }
    }

    match origin_of(expr) {
        origin @ Origin::Variable(_) => PointerRepresentation::FatSlice { elem, origin },
        Origin::Unknown => PointerRepresentation::RawScalar,
    }
}

/// Re-slice a FatSlice view by a non-negative element offset: `base[off:]`
pub fn rebase(base: GoExpr, offset: GoExpr) -> GoExpr {
    GoExpr::SliceFrom {
        base: Box::new(base),
        low: Box::new(offset),
    }
}

/// Dereference a slice-represented pointer: `p[0]`
pub fn deref(expr: GoExpr) -> GoExpr {
    GoExpr::index(expr, GoExpr::IntLit(0))
}

/// View a scalar's storage as a length-1 slice:
/// `(*[1]T)(unsafe.Pointer(&x))[:]`
pub fn scalar_ref_slice(elem: GoType, target: GoExpr) -> GoExpr {
    storage_view(1, elem, target)
}

/// Promote a raw reference to a defensively sized view:
/// `(*[1000000]T)(unsafe.Pointer(&x))[:]`
pub fn defensive_slice(elem: GoType, target: GoExpr) -> GoExpr {
    storage_view(DEFENSIVE_CAPACITY, elem, target)
}

fn storage_view(len: u64, elem: GoType, target: GoExpr) -> GoExpr {
    let addr = GoExpr::Unary {
        op: "&",
        operand: Box::new(target),
    };
    let unsafe_ptr = GoExpr::call(GoExpr::qualified("unsafe", "Pointer"), vec![addr]);
    let array_view = GoExpr::Conv {
        ty: GoType::Ptr(Box::new(GoType::Array {
            len,
            elem: Box::new(elem),
        })),
        expr: Box::new(unsafe_ptr),
    };
    rebase(array_view, GoExpr::IntLit(0))
}

/// Name of the generated helper that adjusts a slice by a signed offset
pub fn arith_helper_name(elem: &GoType) -> String {
    format!("cgtPointerArith{}", mangle(elem))
}

/// Source of the generated helper. Negative offsets step backwards through
/// the backing array, which plain re-slicing cannot express, so the helper
/// rebuilds the view through unsafe.
pub fn arith_helper_source(elem: &GoType) -> String {
    let name = arith_helper_name(elem);
    format!(
        "// {name} adjusts a slice view by a signed element offset.\n\
         func {name}(s []{elem}, off int) []{elem} {{\n\
         \tif off < 0 {{\n\
         \t\tbase := unsafe.Add(unsafe.Pointer(&s[0]), off*int(unsafe.Sizeof(s[0])))\n\
         \t\treturn unsafe.Slice((*{elem})(base), len(s)-off)\n\
         \t}}\n\
         \treturn s[off:]\n\
         }}"
    )
}

fn mangle(ty: &GoType) -> String {
    match ty {
        GoType::Named(name) => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
        GoType::Slice(elem) => format!("SliceOf{}", mangle(elem)),
        GoType::Array { len, elem } => format!("Arr{len}{}", mangle(elem)),
        GoType::Ptr(target) => format!("PtrTo{}", mangle(target)),
        GoType::Func { .. } => "Func".to_string(),
        GoType::Interface => "Iface".to_string(),
    }
}
