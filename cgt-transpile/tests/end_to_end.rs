//! End-to-end translation tests: build a typed AST, translate it, and
//! check the rendered Go source.

use cgt_ast::{
    BinaryOp, CType, Declaration, Expression, ExpressionKind, Field, FunctionDefinition,
    InitItem, Initializer, InitializerKind, Parameter, Statement, StatementKind, StorageClass,
    TopLevelItem, TranslationUnit, UnaryOp,
};
use cgt_common::SourceLocation;
use cgt_transpile::transpile;
use indoc::indoc;
use pretty_assertions::assert_eq;

fn loc() -> SourceLocation {
    SourceLocation::dummy()
}

fn expr(kind: ExpressionKind, ctype: CType) -> Expression {
    Expression {
        kind,
        ctype,
        loc: loc(),
    }
}

fn int_lit(v: i64) -> Expression {
    expr(ExpressionKind::IntLiteral(v), CType::Int)
}

fn ident(name: &str, ctype: CType) -> Expression {
    expr(ExpressionKind::Identifier(name.to_string()), ctype)
}

fn stmt(kind: StatementKind) -> Statement {
    Statement { kind, loc: loc() }
}

fn unit(items: Vec<TopLevelItem>) -> TranslationUnit {
    TranslationUnit {
        file: "test.c".to_string(),
        items,
    }
}

fn function(
    name: &str,
    return_type: CType,
    parameters: Vec<(&str, CType)>,
    body: Vec<Statement>,
) -> TopLevelItem {
    TopLevelItem::Function(FunctionDefinition {
        name: name.to_string(),
        return_type,
        parameters: parameters
            .into_iter()
            .map(|(n, t)| Parameter {
                name: Some(n.to_string()),
                ctype: t,
                loc: loc(),
            })
            .collect(),
        is_variadic: false,
        body: stmt(StatementKind::Compound(body)),
        storage_class: StorageClass::Auto,
        loc: loc(),
    })
}

fn printf_type() -> CType {
    CType::Function {
        return_type: Box::new(CType::Int),
        parameters: vec![CType::Pointer(Box::new(CType::Char))],
        is_variadic: true,
    }
}

#[test]
fn test_hello_world() {
    let call = expr(
        ExpressionKind::Call {
            function: Box::new(ident("printf", printf_type())),
            arguments: vec![expr(
                ExpressionKind::StringLiteral("hello\n".to_string()),
                CType::Pointer(Box::new(CType::Char)),
            )],
        },
        CType::Int,
    );
    let u = unit(vec![function(
        "main",
        CType::Int,
        vec![],
        vec![
            stmt(StatementKind::Expression(call)),
            stmt(StatementKind::Return(Some(int_lit(0)))),
        ],
    )]);

    let out = transpile(&u).unwrap();
    assert_eq!(out.error_count, 0);
    // main returns nothing in Go, so `return 0` loses its value
    let expected = indoc! {r#"
        package main

        import (
        	"github.com/cgt/runtime/noarch"
        )

        func main() {
        	noarch.Printf(noarch.CString("hello\n"))
        	return
        }
    "#};
    assert_eq!(out.go_source, expected);
}

#[test]
fn test_function_signature_and_arithmetic() {
    let sum = expr(
        ExpressionKind::Binary {
            op: BinaryOp::Add,
            left: Box::new(ident("a", CType::Int)),
            right: Box::new(ident("b", CType::Int)),
        },
        CType::Int,
    );
    let u = unit(vec![function(
        "add",
        CType::Int,
        vec![("a", CType::Int), ("b", CType::Int)],
        vec![stmt(StatementKind::Return(Some(sum)))],
    )]);

    let out = transpile(&u).unwrap();
    assert!(out
        .go_source
        .contains("func add(a int32, b int32) int32 {"));
    assert!(out.go_source.contains("return a + b"));
}

#[test]
fn test_mixed_width_arithmetic_converts() {
    // long + int promotes the int operand
    let sum = expr(
        ExpressionKind::Binary {
            op: BinaryOp::Add,
            left: Box::new(ident("total", CType::Long)),
            right: Box::new(ident("n", CType::Int)),
        },
        CType::Long,
    );
    let u = unit(vec![function(
        "widen",
        CType::Long,
        vec![("total", CType::Long), ("n", CType::Int)],
        vec![stmt(StatementKind::Return(Some(sum)))],
    )]);

    let out = transpile(&u).unwrap();
    assert!(out.go_source.contains("return total + int64(n)"));
}

#[test]
fn test_sizeof_folds_to_layout_constant() {
    // struct { int x; double d; } is 16 bytes under natural alignment
    let record = CType::Struct {
        name: Some("pair".to_string()),
        fields: vec![
            Field {
                name: Some("x".to_string()),
                ty: CType::Int,
            },
            Field {
                name: Some("d".to_string()),
                ty: CType::Double,
            },
        ],
    };
    let u = unit(vec![
        TopLevelItem::TypeDefinition {
            ctype: record.clone(),
            loc: loc(),
        },
        TopLevelItem::Declaration(Declaration {
            name: "n".to_string(),
            ctype: CType::UnsignedLong,
            storage_class: StorageClass::Auto,
            initializer: Some(Initializer {
                kind: InitializerKind::Expression(expr(
                    ExpressionKind::SizeofType(record),
                    CType::UnsignedLong,
                )),
                loc: loc(),
            }),
            loc: loc(),
        }),
    ]);

    let out = transpile(&u).unwrap();
    assert!(out.go_source.contains("type pair struct {"));
    assert!(out.go_source.contains("var n uint64 = 16"));
}

#[test]
fn test_switch_fallthrough_insertion() {
    // case 1 has no break and must fall through; case 2's trailing break
    // disappears because Go breaks implicitly
    let assign = |v: i64| {
        stmt(StatementKind::Expression(expr(
            ExpressionKind::Binary {
                op: BinaryOp::Assign,
                left: Box::new(ident("y", CType::Int)),
                right: Box::new(int_lit(v)),
            },
            CType::Int,
        )))
    };
    let body = stmt(StatementKind::Compound(vec![
        stmt(StatementKind::Case {
            value: int_lit(1),
            statement: Box::new(assign(10)),
        }),
        stmt(StatementKind::Case {
            value: int_lit(2),
            statement: Box::new(assign(20)),
        }),
        stmt(StatementKind::Break),
        stmt(StatementKind::Default {
            statement: Box::new(assign(30)),
        }),
    ]));
    let u = unit(vec![function(
        "classify",
        CType::Void,
        vec![("x", CType::Int), ("y", CType::Int)],
        vec![stmt(StatementKind::Switch {
            selector: ident("x", CType::Int),
            body: Box::new(body),
        })],
    )]);

    let out = transpile(&u).unwrap();
    assert_eq!(out.error_count, 0);
    assert!(out.go_source.contains("switch x {"));
    assert!(out.go_source.contains("y = 10\n\t\tfallthrough"));
    assert!(out.go_source.contains("default:"));
    // the explicit break before default must not survive
    assert!(!out.go_source.contains("break"));
    assert!(!out.go_source.contains("y = 20\n\t\tfallthrough"));
}

#[test]
fn test_pointer_increment_and_deref() {
    let p_ty = CType::Pointer(Box::new(CType::Int));
    let inc = stmt(StatementKind::Expression(expr(
        ExpressionKind::Unary {
            op: UnaryOp::PostIncrement,
            operand: Box::new(ident("p", p_ty.clone())),
        },
        p_ty.clone(),
    )));
    let deref = expr(
        ExpressionKind::Unary {
            op: UnaryOp::Dereference,
            operand: Box::new(ident("p", p_ty.clone())),
        },
        CType::Int,
    );
    let u = unit(vec![function(
        "next",
        CType::Int,
        vec![("p", p_ty)],
        vec![inc, stmt(StatementKind::Return(Some(deref)))],
    )]);

    let out = transpile(&u).unwrap();
    assert!(out.go_source.contains("func next(p []int32) int32 {"));
    assert!(out.go_source.contains("p = p[1:]"));
    assert!(out.go_source.contains("return p[0]"));
}

#[test]
fn test_pointer_subtraction_uses_capacity() {
    let p_ty = CType::Pointer(Box::new(CType::Char));
    let diff = expr(
        ExpressionKind::Binary {
            op: BinaryOp::Sub,
            left: Box::new(ident("end", p_ty.clone())),
            right: Box::new(ident("start", p_ty.clone())),
        },
        CType::Long,
    );
    let u = unit(vec![function(
        "length",
        CType::Long,
        vec![("start", p_ty.clone()), ("end", p_ty)],
        vec![stmt(StatementKind::Return(Some(diff)))],
    )]);

    let out = transpile(&u).unwrap();
    assert!(out
        .go_source
        .contains("return int64(cap(start) - cap(end))"));
}

#[test]
fn test_ternary_becomes_closure() {
    let cond = expr(
        ExpressionKind::Binary {
            op: BinaryOp::Greater,
            left: Box::new(ident("a", CType::Int)),
            right: Box::new(ident("b", CType::Int)),
        },
        CType::Int,
    );
    let pick = expr(
        ExpressionKind::Conditional {
            condition: Box::new(cond),
            then_expr: Box::new(ident("a", CType::Int)),
            else_expr: Box::new(ident("b", CType::Int)),
        },
        CType::Int,
    );
    let decl = stmt(StatementKind::Declaration(vec![Declaration {
        name: "m".to_string(),
        ctype: CType::Int,
        storage_class: StorageClass::Auto,
        initializer: Some(Initializer {
            kind: InitializerKind::Expression(pick),
            loc: loc(),
        }),
        loc: loc(),
    }]));
    let u = unit(vec![function(
        "max",
        CType::Int,
        vec![("a", CType::Int), ("b", CType::Int)],
        vec![
            decl,
            stmt(StatementKind::Return(Some(ident("m", CType::Int)))),
        ],
    )]);

    let out = transpile(&u).unwrap();
    assert!(out.go_source.contains("var m int32 = (func() int32 {"));
    assert!(out.go_source.contains("if a > b {"));
    assert!(out.go_source.contains("return a"));
    assert!(out.go_source.contains("return b"));
}

#[test]
fn test_enum_becomes_const_group() {
    let colors = CType::Enum {
        name: Some("color".to_string()),
        enumerators: vec![
            cgt_ast::Enumerator {
                name: "RED".to_string(),
                value: None,
            },
            cgt_ast::Enumerator {
                name: "GREEN".to_string(),
                value: Some(5),
            },
            cgt_ast::Enumerator {
                name: "BLUE".to_string(),
                value: None,
            },
        ],
    };
    let u = unit(vec![TopLevelItem::TypeDefinition {
        ctype: colors,
        loc: loc(),
    }]);

    let out = transpile(&u).unwrap();
    assert!(out.go_source.contains("RED int32 = 0"));
    assert!(out.go_source.contains("GREEN int32 = 5"));
    assert!(out.go_source.contains("BLUE int32 = 6"));
}

#[test]
fn test_char_array_from_string_initializer() {
    let u = unit(vec![TopLevelItem::Declaration(Declaration {
        name: "msg".to_string(),
        ctype: CType::Array {
            element: Box::new(CType::Char),
            len: Some(3),
        },
        storage_class: StorageClass::Auto,
        initializer: Some(Initializer {
            kind: InitializerKind::Expression(expr(
                ExpressionKind::StringLiteral("hi".to_string()),
                CType::Array {
                    element: Box::new(CType::Char),
                    len: Some(3),
                },
            )),
            loc: loc(),
        }),
        loc: loc(),
    })]);

    let out = transpile(&u).unwrap();
    // the NUL terminator comes from Go's zero fill
    assert!(out.go_source.contains("var msg [3]int8 = [3]int8{104, 105}"));
}

#[test]
fn test_unsupported_construct_recovers_with_stub() {
    let bad = expr(
        ExpressionKind::Unsupported {
            description: "statement expression".to_string(),
        },
        CType::Int,
    );
    let u = unit(vec![function(
        "f",
        CType::Void,
        vec![],
        vec![stmt(StatementKind::Expression(bad))],
    )]);

    let out = transpile(&u).unwrap();
    assert_eq!(out.error_count, 0);
    assert!(out.warning_count >= 1);
    assert!(out.go_source.contains("panic("));
    assert!(out
        .diagnostics
        .iter()
        .any(|d| d.to_string().contains("statement expression")));
}

#[test]
fn test_do_while_runs_body_first() {
    let cond = expr(
        ExpressionKind::Binary {
            op: BinaryOp::Less,
            left: Box::new(ident("i", CType::Int)),
            right: Box::new(int_lit(10)),
        },
        CType::Int,
    );
    let body = stmt(StatementKind::Expression(expr(
        ExpressionKind::Unary {
            op: UnaryOp::PostIncrement,
            operand: Box::new(ident("i", CType::Int)),
        },
        CType::Int,
    )));
    let u = unit(vec![function(
        "spin",
        CType::Void,
        vec![("i", CType::Int)],
        vec![stmt(StatementKind::DoWhile {
            body: Box::new(body),
            condition: cond,
        })],
    )]);

    let out = transpile(&u).unwrap();
    assert!(out.go_source.contains("for {"));
    assert!(out.go_source.contains("i++"));
    assert!(out.go_source.contains("if !(i < 10) {"));
    assert!(out.go_source.contains("break"));
}

#[test]
fn test_address_of_scalar_uses_unsafe_view() {
    let take = CType::Function {
        return_type: Box::new(CType::Void),
        parameters: vec![CType::Pointer(Box::new(CType::Int))],
        is_variadic: false,
    };
    let call = expr(
        ExpressionKind::Call {
            function: Box::new(ident("touch", take.clone())),
            arguments: vec![expr(
                ExpressionKind::Unary {
                    op: UnaryOp::AddressOf,
                    operand: Box::new(ident("x", CType::Int)),
                },
                CType::Pointer(Box::new(CType::Int)),
            )],
        },
        CType::Void,
    );
    let u = unit(vec![
        TopLevelItem::Declaration(Declaration {
            name: "touch".to_string(),
            ctype: take,
            storage_class: StorageClass::Extern,
            initializer: None,
            loc: loc(),
        }),
        function(
            "caller",
            CType::Void,
            vec![("x", CType::Int)],
            vec![stmt(StatementKind::Expression(call))],
        ),
    ]);

    let out = transpile(&u).unwrap();
    assert!(out
        .go_source
        .contains("touch((*[1]int32)(unsafe.Pointer(&x))[0:])"));
    assert!(out.go_source.contains("\"unsafe\""));
}

#[test]
fn test_array_initializer_keeps_zero_filled_tail() {
    // double a[4] = {1.1, 2.2}; Go zero-fills the unwritten elements
    let arr_ty = CType::Array {
        element: Box::new(CType::Double),
        len: Some(4),
    };
    let items = [1.1, 2.2]
        .iter()
        .map(|v| InitItem {
            designator: None,
            init: Initializer {
                kind: InitializerKind::Expression(expr(
                    ExpressionKind::FloatLiteral(*v),
                    CType::Double,
                )),
                loc: loc(),
            },
        })
        .collect();
    let decl = stmt(StatementKind::Declaration(vec![Declaration {
        name: "a".to_string(),
        ctype: arr_ty.clone(),
        storage_class: StorageClass::Auto,
        initializer: Some(Initializer {
            kind: InitializerKind::List(items),
            loc: loc(),
        }),
        loc: loc(),
    }]));
    let last = expr(
        ExpressionKind::Index {
            base: Box::new(ident("a", arr_ty)),
            index: Box::new(int_lit(3)),
        },
        CType::Double,
    );
    let u = unit(vec![function(
        "tail",
        CType::Double,
        vec![],
        vec![decl, stmt(StatementKind::Return(Some(last)))],
    )]);

    let out = transpile(&u).unwrap();
    assert!(out
        .go_source
        .contains("var a [4]float64 = [4]float64{1.1, 2.2}"));
    assert!(out.go_source.contains("return a[3]"));
}

#[test]
fn test_unsigned_char_narrowing_is_explicit() {
    // char c = -1; unsigned char u = c; the conversion must be spelled out
    let decls = stmt(StatementKind::Declaration(vec![
        Declaration {
            name: "c".to_string(),
            ctype: CType::Char,
            storage_class: StorageClass::Auto,
            initializer: Some(Initializer {
                kind: InitializerKind::Expression(int_lit(-1)),
                loc: loc(),
            }),
            loc: loc(),
        },
        Declaration {
            name: "u".to_string(),
            ctype: CType::UnsignedChar,
            storage_class: StorageClass::Auto,
            initializer: Some(Initializer {
                kind: InitializerKind::Expression(ident("c", CType::Char)),
                loc: loc(),
            }),
            loc: loc(),
        },
    ]));
    let u = unit(vec![function("narrow", CType::Void, vec![], vec![decls])]);

    let out = transpile(&u).unwrap();
    assert!(out.go_source.contains("var c int8 = int8(-1)"));
    assert!(out.go_source.contains("var u uint8 = uint8(c)"));
}

#[test]
fn test_pointer_compound_assign_rebases() {
    // p += 3; v = *p;
    let p_ty = CType::Pointer(Box::new(CType::Int));
    let step = stmt(StatementKind::Expression(expr(
        ExpressionKind::Binary {
            op: BinaryOp::AddAssign,
            left: Box::new(ident("p", p_ty.clone())),
            right: Box::new(int_lit(3)),
        },
        p_ty.clone(),
    )));
    let deref = expr(
        ExpressionKind::Unary {
            op: UnaryOp::Dereference,
            operand: Box::new(ident("p", p_ty.clone())),
        },
        CType::Int,
    );
    let u = unit(vec![function(
        "skip",
        CType::Int,
        vec![("p", p_ty)],
        vec![step, stmt(StatementKind::Return(Some(deref)))],
    )]);

    let out = transpile(&u).unwrap();
    assert!(out.go_source.contains("p = p[3:]"));
    assert!(out.go_source.contains("return p[0]"));
}

#[test]
fn test_deref_of_pointer_offset_reads_indexed_element() {
    // *(p + 2) and p[2] must read the same element
    let p_ty = CType::Pointer(Box::new(CType::Int));
    let sum = expr(
        ExpressionKind::Binary {
            op: BinaryOp::Add,
            left: Box::new(ident("p", p_ty.clone())),
            right: Box::new(int_lit(2)),
        },
        p_ty.clone(),
    );
    let deref = expr(
        ExpressionKind::Unary {
            op: UnaryOp::Dereference,
            operand: Box::new(sum),
        },
        CType::Int,
    );
    let indexed = expr(
        ExpressionKind::Index {
            base: Box::new(ident("p", p_ty.clone())),
            index: Box::new(int_lit(2)),
        },
        CType::Int,
    );
    let u = unit(vec![
        function(
            "via_arith",
            CType::Int,
            vec![("p", p_ty.clone())],
            vec![stmt(StatementKind::Return(Some(deref)))],
        ),
        function(
            "via_index",
            CType::Int,
            vec![("p", p_ty)],
            vec![stmt(StatementKind::Return(Some(indexed)))],
        ),
    ]);

    let out = transpile(&u).unwrap();
    assert_eq!(out.error_count, 0);
    assert!(out.go_source.contains("return p[2:][0]"));
    assert!(out.go_source.contains("return p[2]"));
}

#[test]
fn test_unsized_array_initializer_and_element_read() {
    // int a[] = {10, 20, 30}; return a[1];
    let arr_ty = CType::Array {
        element: Box::new(CType::Int),
        len: None,
    };
    let items = [10, 20, 30]
        .iter()
        .map(|v| InitItem {
            designator: None,
            init: Initializer {
                kind: InitializerKind::Expression(int_lit(*v)),
                loc: loc(),
            },
        })
        .collect();
    let decl = stmt(StatementKind::Declaration(vec![Declaration {
        name: "a".to_string(),
        ctype: arr_ty.clone(),
        storage_class: StorageClass::Auto,
        initializer: Some(Initializer {
            kind: InitializerKind::List(items),
            loc: loc(),
        }),
        loc: loc(),
    }]));
    let read = expr(
        ExpressionKind::Index {
            base: Box::new(ident("a", arr_ty)),
            index: Box::new(int_lit(1)),
        },
        CType::Int,
    );
    let u = unit(vec![function(
        "second",
        CType::Int,
        vec![],
        vec![decl, stmt(StatementKind::Return(Some(read)))],
    )]);

    let out = transpile(&u).unwrap();
    assert_eq!(out.error_count, 0);
    assert!(out.go_source.contains("var a []int32 = []int32{10, 20, 30}"));
    assert!(out.go_source.contains("return a[1]"));
}

#[test]
fn test_unit_round_trips_through_json() {
    let u = unit(vec![function(
        "add",
        CType::Int,
        vec![("a", CType::Int), ("b", CType::Int)],
        vec![stmt(StatementKind::Return(Some(expr(
            ExpressionKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(ident("a", CType::Int)),
                right: Box::new(ident("b", CType::Int)),
            },
            CType::Int,
        ))))],
    )]);

    let json = serde_json::to_string(&u).unwrap();
    let back: TranslationUnit = serde_json::from_str(&json).unwrap();
    let direct = transpile(&u).unwrap();
    let via_json = transpile(&back).unwrap();
    assert_eq!(direct.go_source, via_json.go_source);
}
