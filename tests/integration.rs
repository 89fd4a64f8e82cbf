//! End-to-end tests: source text in, printed output or a reported error out.

mod common;

use common::{assert_program_output, expect_error, load_fixture, run, run_with_config};
use kindle::bytecode::{Bytecode, CompileError, OpCode, compile};
use kindle::frontend::{parse, tokenize};
use kindle::pipeline::{Error, Pipeline};
use kindle::runtime::{RuntimeError, VmBc, VmBcConfig};

// ============================================================
// Arithmetic and precedence
// ============================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_program_output("print(1 + 2 * 3);", "7");
}

#[test]
fn test_equal_precedence_groups_left() {
    assert_program_output("print(10 - 3 - 2);", "5");
    assert_program_output("print(100 / 10 / 5);", "2");
}

#[test]
fn test_parentheses_override_precedence() {
    assert_program_output("print((1 + 2) * 3);", "9");
    assert_program_output("print(10 - (3 - 2));", "9");
}

#[test]
fn test_comparisons_print_zero_or_one() {
    assert_program_output("print(1 < 2); print(2 < 1); print(3 == 3); print(3 != 3);", "1010");
}

// ============================================================
// Variables
// ============================================================

#[test]
fn test_assignment_then_read() {
    assert_program_output("$x = 5; print($x);", "5");
}

#[test]
fn test_unset_variable_reads_zero() {
    assert_program_output("print($y);", "0");
}

#[test]
fn test_plain_identifiers_are_variables_too() {
    assert_program_output("count = 2; count = count * 21; print(count);", "42");
}

// ============================================================
// Control flow
// ============================================================

#[test]
fn test_if_else_takes_then_branch() {
    assert_program_output("if (1 < 2) { print(1); } else { print(2); }", "1");
}

#[test]
fn test_if_else_takes_else_branch() {
    assert_program_output("if (2 < 1) { print(1); } else { print(2); }", "2");
}

#[test]
fn test_if_without_else() {
    assert_program_output("if (0) { print(1); } print(9);", "9");
}

#[test]
fn test_while_counts_to_five() {
    assert_program_output(
        "$i = 0; while ($i < 5) { $i = $i + 1; } print($i);",
        "5",
    );
}

#[test]
fn test_while_with_false_condition_never_runs() {
    assert_program_output("while (0) { print(1); } print(2);", "2");
}

#[test]
fn test_countdown_fixture() {
    assert_program_output(&load_fixture("countdown"), "54321");
}

#[test]
fn test_nested_control_flow_fixture() {
    assert_program_output(&load_fixture("fizz"), "001021001201003");
}

#[test]
fn test_factorial_fixture() {
    assert_program_output(&load_fixture("factorial"), "3628800");
}

#[test]
fn test_function_declarations_are_skipped() {
    assert_program_output(&load_fixture("functions"), "21");
}

#[test]
fn test_top_level_return_stops_the_program() {
    assert_program_output("print(1); return 0; print(2);", "1");
}

// ============================================================
// Compiler properties
// ============================================================

fn build(source: &str) -> Bytecode {
    compile(&parse(tokenize(source)).expect("parses")).expect("compiles")
}

#[test]
fn test_compilation_is_deterministic() {
    let source = load_fixture("fizz");
    let a = build(&source);
    let b = build(&source);
    assert_eq!(a.code, b.code);
    assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
}

#[test]
fn test_restored_image_runs_the_same() {
    let bc = build(&load_fixture("countdown"));
    let restored = Bytecode::from_bytes(&bc.to_bytes().unwrap()).unwrap();

    let mut vm = VmBc::with_output(VmBcConfig::default(), Vec::new());
    vm.run(&restored).unwrap();
    assert_eq!(vm.into_output(), b"54321");
}

#[test]
fn test_256_distinct_constants_run() {
    let source: String = (0..256).map(|i| format!("$x = {};", i)).collect();
    let source = format!("{} print($x);", source);
    assert_program_output(&source, "255");
}

#[test]
fn test_257_distinct_constants_fail_to_compile() {
    let source: String = (0..257).map(|i| format!("$x = {};", i)).collect();
    assert!(matches!(
        expect_error(&source),
        Error::Compile(CompileError::TooManyConstants)
    ));
}

#[test]
fn test_string_literals_are_rejected() {
    let err = expect_error("$s = \"hello\";");
    assert!(matches!(err, Error::Compile(CompileError::Unsupported { .. })));
}

// ============================================================
// Errors
// ============================================================

#[test]
fn test_parse_error_reports_position() {
    let err = expect_error("$x = ;");
    assert!(matches!(err, Error::Parse(_)));
    assert!(err.to_string().starts_with("Parse error: 1:6:"), "{}", err);
}

#[test]
fn test_lexical_error_surfaces_through_parser() {
    let err = expect_error("$x = 1 @ 2;");
    assert!(err.to_string().contains("'@'"), "{}", err);
}

#[test]
fn test_division_by_zero() {
    assert!(matches!(
        expect_error("$z = 0; print(10 / $z);"),
        Error::Runtime(RuntimeError::DivisionByZero { .. })
    ));
}

#[test]
fn test_output_before_runtime_error_is_kept() {
    let mut out = Vec::new();
    let result = Pipeline::new("print(1); print(1 % 0);").run_to(&mut out, VmBcConfig::default());
    assert!(result.is_err());
    assert_eq!(out, b"1");
}

#[test]
fn test_unknown_opcode_is_reported() {
    let mut bc = build("print(1);");
    bc.code.insert(0, 0xaa);
    let mut vm = VmBc::with_output(VmBcConfig::default(), Vec::new());
    match vm.run(&bc) {
        Err(RuntimeError::UnknownOpcode { opcode, offset }) => {
            assert_eq!(opcode, 0xaa);
            assert_eq!(offset, 0);
        }
        other => panic!("expected UnknownOpcode, got {:?}", other),
    }
}

#[test]
fn test_expression_statements_overflow_the_stack() {
    // Each `1;` leaves a value behind.
    let err = expect_error("while (1) { 1; }");
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::StackOverflow { limit: 256, .. })
    ));
}

#[test]
fn test_step_limit_stops_infinite_loops() {
    let config = VmBcConfig {
        max_steps: Some(1_000),
        ..VmBcConfig::default()
    };
    let result = run_with_config("$i = 0; while (1) { $i = $i + 1; }", config);
    assert!(matches!(
        result,
        Err(Error::Runtime(RuntimeError::StepLimitExceeded { limit: 1_000 }))
    ));
}

#[test]
fn test_hand_built_program() {
    let mut bc = Bytecode::new();
    let idx = bc.add_constant(9).unwrap();
    bc.emit_op_operand(OpCode::Constant, idx);
    bc.emit_op(OpCode::Print);
    bc.emit_op(OpCode::Halt);

    let mut vm = VmBc::with_output(VmBcConfig::default(), Vec::new());
    vm.run(&bc).unwrap();
    assert_eq!(vm.output(), b"9");
}

#[test]
fn test_empty_source_prints_nothing() {
    assert_eq!(run("").unwrap(), "");
    assert_eq!(run("// only a comment\n").unwrap(), "");
}
