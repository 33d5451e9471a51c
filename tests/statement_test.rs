mod common;
use common::*;
use rule::lang::ErrorCode;
use rule::mach::{Role, Value};
use rule::Runner;

#[test]
fn test_declare_assign_read() {
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "declare x; x = 6 - 4"), "");
    assert_eq!(value(&r, "x"), Value::Float(2.0));
    let x = r.symbol_table().get("x").unwrap();
    assert_eq!(x.role(), Role::UserDynamic);
    assert!(x.is_modified());
    assert_eq!(exec(&mut r, "#directive_clear_modified"), "");
    assert!(!r.symbol_table().get("x").unwrap().is_modified());
}

#[test]
fn test_declare_list() {
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "declare a, b, c; a = 1; b = 2; c = a + b"), "");
    assert_eq!(r.value_string("c"), "3");
}

#[test]
fn test_declare_twice() {
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "declare x"), "");
    let e = fail(&mut r, "declare x");
    assert_eq!(e.code(), ErrorCode::AlreadyDeclared);
    assert_eq!(e.text(), "The variable 'x' has already been declared.");
}

#[test]
fn test_reset_removes_declared() {
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "declare x; x = 1; y = 2"), "");
    r.reset();
    assert!(r.value("x").is_none());
    assert_eq!(r.value("y"), Some(&Value::default()));
    assert_eq!(exec(&mut r, "declare x"), "");
}

#[test]
fn test_modified_names() {
    let mut r = Runner::new();
    let row = vec![
        ("b".to_string(), Value::Float(1.0)),
        ("a".to_string(), Value::Float(1.0)),
        ("c".to_string(), Value::Float(1.0)),
    ];
    r.apply_row(&row, "b = b + 1; a = 0").unwrap();
    assert!(r.symbol_table().is_modified());
    assert_eq!(r.symbol_table().modified_names(), "a,b");
    assert_eq!(exec(&mut r, "#directive_clear_modified"), "");
    assert!(!r.symbol_table().is_modified());
    assert_eq!(r.symbol_table().modified_names(), "");
}

#[test]
fn test_undeclared_at_run_time() {
    let mut r = Runner::new();
    r.options_mut().scan_strict = true;
    let e = fail(&mut r, "y = 1");
    assert_eq!(e.code(), ErrorCode::UndeclaredVariable);
    assert_eq!(e.text(), "The symbol 'y' must be declared prior to use.");
}

#[test]
fn test_strict_parse() {
    let mut r = strict();
    let e = fail(&mut r, "y = z + 1");
    assert_eq!(e.code(), ErrorCode::SyntaxError);
    assert_eq!(e.text(), "Undefined symbol y");
    assert_eq!(exec(&mut r, "declare y; y = 1"), "");
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "y = z + 1"), "");
    assert_eq!(value(&r, "z"), Value::default());
}

#[test]
fn test_lines_and_comments() {
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "a = 1; ## first\r\nb = a + 1;\nc = b * 2"), "");
    assert_eq!(r.value_string("c"), "4");
}

#[test]
fn test_bare_expression_statement() {
    let mut r = Runner::new();
    assert_eq!(exec(&mut r, "'ignored'; (1 + 2); x = 1"), "");
    assert_eq!(r.value_string("x"), "1");
}

#[test]
fn test_label_is_rejected() {
    let mut r = Runner::new();
    let e = fail(&mut r, "top: x = 1");
    assert_eq!(e.code(), ErrorCode::SyntaxError);
    assert_eq!(e.text(), "Unexpected Symbol 'top:'");
}

#[test]
fn test_scan_error() {
    let mut r = Runner::new();
    let e = fail(&mut r, "x = 1 @ 2");
    assert_eq!(e.code(), ErrorCode::ScanError);
    assert_eq!(
        e.text(),
        "Failed to scan the input document, unrecognized character '@'"
    );
}

#[test]
fn test_single_ampersand() {
    let mut r = Runner::new();
    let e = fail(&mut r, "x = (1 & 2)");
    assert_eq!(e.text(), "Unexpected Symbol '&'");
}
