mod common;
use common::*;
use rule::lang::ErrorCode;
use rule::mach::link::address_sites;
use rule::mach::{fixup, Listing, Opcode, Program, ValueType};
use rule::Runner;

fn runner_with(names: &[&str]) -> Runner {
    let mut r = Runner::new();
    r.symbol_table_mut().add_user_symbols(names.iter().copied());
    r
}

#[test]
fn test_compile_is_deterministic() {
    let mut r = runner_with(&["x"]);
    let text = "if (x == 1) x = 2; else x = 3;";
    let first = r.compile(text).unwrap();
    let second = r.compile(text).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_compiled_program_replays() {
    let mut r = runner_with(&["x", "y"]);
    let program = r.compile("y = x * 2").unwrap();
    for n in 1..4 {
        r.reset();
        r.symbol_table_mut()
            .set_value("x", rule::mach::Value::Float(n as f64));
        r.execute(&program).unwrap();
        assert_eq!(r.value_string("y"), (n * 2).to_string());
    }
}

#[test]
fn test_fixup_moves_addresses_only() {
    let mut r = runner_with(&["x"]);
    let program = r.compile("if (x == 1) x = 2; else x = 3;").unwrap();
    let before = address_sites(&program).unwrap();
    assert_eq!(before.len(), 2);
    let mut moved = program.clone();
    assert_eq!(fixup(&mut moved, 1000).unwrap(), 2);
    let after = address_sites(&moved).unwrap();
    for ((site, addr), (site2, addr2)) in before.iter().zip(after.iter()) {
        assert_eq!(site, site2);
        assert_eq!(addr + 1000, *addr2);
    }
    let old = Listing::disassemble(&program).unwrap();
    let new = Listing::disassemble(&moved).unwrap();
    for (a, b) in old.opcodes().zip(new.opcodes()) {
        match (a, b) {
            (Opcode::Defaddr(x), Opcode::Defaddr(y)) | (Opcode::Goto(x), Opcode::Goto(y)) => {
                assert_eq!(x + 1000, *y)
            }
            _ => assert_eq!(a, b),
        }
    }
}

#[test]
fn test_concat_programs() {
    let mut r = runner_with(&["a", "b"]);
    let mut program = r.compile("a = 1").unwrap();
    let second = r.compile("if (a == 1) b = 2; else b = 3;").unwrap();
    program.concat(&second).unwrap();
    r.execute(&program).unwrap();
    assert_eq!(r.value_string("b"), "2");
}

#[test]
fn test_disassemble() {
    let mut r = runner_with(&["x"]);
    let program = r.compile("x = 1").unwrap();
    let listing = Listing::disassemble(&program).unwrap();
    let ops: Vec<Opcode> = listing.opcodes().cloned().collect();
    assert_eq!(
        ops,
        vec![
            Opcode::VariableAccess("x".into()),
            Opcode::Push(ValueType::Double, "1".into()),
            Opcode::Assign,
            Opcode::CodeEnd,
        ]
    );
    assert_eq!(listing.end_of_code(), Some(program.len() - 4));
    assert_eq!(
        listing.to_string(),
        "     0  VARIABLEACCESS(x)\n    19  PUSH(double, 1)\n    38  ASSIGN\n    42  CODEEND\n"
    );
}

#[test]
fn test_error_position() {
    let mut r = runner_with(&["x"]);
    let e = r.compile("x = 1;\r\nx = ) + )").unwrap_err();
    assert_eq!(
        e.to_string(),
        "SYNTAX ERROR AT LINE 1 STATEMENT 1 SYMBOL 2; Unexpected Symbol ')'"
    );
    assert_eq!(r.last_message(), e.to_string());
}

#[test]
fn test_only_first_error_reported() {
    let mut r = runner_with(&["x"]);
    let e = r.compile("x = abs(; x = )").unwrap_err();
    assert_eq!(e.text(), "Unexpected Symbol ';'");
}

#[test]
fn test_syntax_check() {
    let mut r = Runner::new();
    assert!(r.syntax_check("anything = other + 1").is_ok());
    let e = r.syntax_check("## only a comment").unwrap_err();
    assert_eq!(e.code(), ErrorCode::SyntaxError);
    assert_eq!(
        e.text(),
        "The input document does not contain any valid statements."
    );
    assert!(r.syntax_check("x = ").is_err());
    assert!(r.value("anything").is_none());
}

#[test]
fn test_strict_compile() {
    let mut r = strict();
    let e = r.compile("q = 1").unwrap_err();
    assert_eq!(e.text(), "Undefined symbol q");
    r.options_mut().parse_strict = false;
    let program: Program = r.compile("q = 1").unwrap();
    assert!(!program.is_empty());
}
