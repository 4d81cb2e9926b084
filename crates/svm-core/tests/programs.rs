//! End-to-end programs: compile source, execute, compare printed output.

use svm_core::{
    compile, compile_with, execute_with, BytecodeWriter, ErrorCategory, OpCode, SvmConfig,
    SvmError,
};

fn run(source: &str) -> Result<String, SvmError> {
    let code = compile(source)?;
    let mut out: Vec<u8> = Vec::new();
    execute_with(&code, &SvmConfig::default(), &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

/// Run and return the output printed before the failure, plus the error
fn run_until_error(source: &str) -> (String, SvmError) {
    let code = compile(source).expect("compile failed");
    let mut out: Vec<u8> = Vec::new();
    let err = execute_with(&code, &SvmConfig::default(), &mut out).expect_err("should fail");
    (String::from_utf8(out).unwrap(), err)
}

#[test]
fn numeric_addition() {
    let out = run("var x = 10; var y = 20; var z = x + y; print(z);").unwrap();
    assert_eq!(out, "30\n");
}

#[test]
fn string_concatenation() {
    let out = run(r#"var a = "foo"; var b = "bar"; print(a + b);"#).unwrap();
    assert_eq!(out, "foobar\n");
}

#[test]
fn mixed_coercion_uses_two_decimals() {
    assert_eq!(run(r#"print(1 + "x");"#).unwrap(), "1.00x\n");
    assert_eq!(run(r#"print("x" + 1);"#).unwrap(), "x1.00\n");
}

#[test]
fn coercion_of_every_kind() {
    let out = run(
        r#"
        var o = {};
        print("" + true + false + undefined + null + o);
        "#,
    )
    .unwrap();
    assert_eq!(out, "truefalseundefinednull[object Object]\n");
}

#[test]
fn non_integral_numbers_print_two_decimals() {
    assert_eq!(run("print(0.25 + 1)").unwrap(), "1.25\n");
    assert_eq!(run("print(1.5 + 1.5)").unwrap(), "3\n");
}

#[test]
fn inner_scope_shadows_without_mutating() {
    let out = run("var x = 1; { var x = 2; print(x); } print(x);").unwrap();
    assert_eq!(out, "2\n1\n");
}

#[test]
fn assignment_in_block_shadows_outer_binding() {
    let out = run("var x = 1; { x = 5; print(x); } print(x);").unwrap();
    assert_eq!(out, "5\n1\n");
}

#[test]
fn outer_bindings_visible_in_nested_blocks() {
    let out = run(r#"var g = "g"; { var a = "a"; { print(g + a); } }"#).unwrap();
    assert_eq!(out, "ga\n");
}

#[test]
fn block_bindings_are_gone_after_the_block() {
    let (out, err) = run_until_error("{ var inner = 1; print(inner); } print(inner);");
    assert_eq!(out, "1\n");
    assert!(matches!(err, SvmError::UndefinedVariable(ref name) if name == "inner"));
    assert_eq!(err.category(), ErrorCategory::Name);
}

#[test]
fn object_properties() {
    assert_eq!(run("var o = {}; o.p = 5; print(o.p);").unwrap(), "5\n");
    assert_eq!(run("var o = {}; print(o.missing);").unwrap(), "undefined\n");
}

#[test]
fn object_literal_and_overwrite() {
    let out = run(r#"var o = { name: "svm", n: 1 }; o.n = o.n + 1; print(o.name + o.n);"#).unwrap();
    assert_eq!(out, "svm2.00\n");
}

#[test]
fn nested_objects() {
    let out = run("var o = { inner: { v: 7 } }; print(o.inner.v); o.inner.v = 8; print(o.inner.v);")
        .unwrap();
    assert_eq!(out, "7\n8\n");
}

#[test]
fn objects_are_shared_by_reference() {
    let out = run("var a = {}; var b = a; b.p = 3; print(a.p); print(a);").unwrap();
    assert_eq!(out, "3\n[object Object]\n");
}

#[test]
fn declarations_and_prints_keep_order() {
    let out = run(
        r#"
        // comments are fine
        var n = 1;
        var s = "two";
        var u;
        /* block comment */
        print(n);
        print(s);
        print(u);
        print(null);
        print(false);
        "#,
    )
    .unwrap();
    assert_eq!(out, "1\ntwo\nundefined\nnull\nfalse\n");
}

#[test]
fn semicolons_are_optional() {
    assert_eq!(run("var a = 1 print(a) { print(a) }").unwrap(), "1\n1\n");
}

#[test]
fn property_access_on_non_object_is_type_error() {
    let (out, err) = run_until_error("var n = 1; print(n); print(n.p); print(2);");
    assert_eq!(out, "1\n");
    assert!(matches!(err, SvmError::NotAnObject { op: "GET_PROP", .. }));
    assert_eq!(err.category(), ErrorCategory::Type);

    let (_, err) = run_until_error(r#"var s = "x"; s.p = 1;"#);
    assert!(matches!(err, SvmError::NotAnObject { op: "SET_PROP", found: "string" }));
}

#[test]
fn unsupported_addition_stops_execution() {
    let (out, err) = run_until_error("print(1); print(true + 1); print(2);");
    assert_eq!(out, "1\n");
    assert!(matches!(err, SvmError::UnsupportedAdd { left: "boolean", right: "number" }));

    let (_, err) = run_until_error("print(null + false);");
    assert!(matches!(err, SvmError::UnsupportedAdd { left: "null", right: "boolean" }));

    let (_, err) = run_until_error("var o = {}; print(o + 1);");
    assert!(matches!(err, SvmError::UnsupportedAdd { left: "object", .. }));
}

#[test]
fn hand_written_boolean_plus_number_fails() {
    let mut w = BytecodeWriter::new(64);
    w.emit_op(OpCode::PushBool).unwrap();
    w.emit_u8(0).unwrap();
    w.emit_op(OpCode::PushNum).unwrap();
    w.emit_f64(3.0).unwrap();
    w.emit_op(OpCode::Add).unwrap();
    w.emit_op(OpCode::Print).unwrap();
    w.emit_op(OpCode::Exit).unwrap();

    let mut out: Vec<u8> = Vec::new();
    let err = execute_with(&w.finish(), &SvmConfig::default(), &mut out).unwrap_err();
    assert!(matches!(err, SvmError::UnsupportedAdd { .. }));
    assert!(out.is_empty());
}

#[test]
fn overlong_string_literal_fails_to_compile() {
    let source = format!(r#"var s = "{}";"#, "a".repeat(300));
    let mut config = SvmConfig::default();
    config.max_bytecode_len = 4096;
    let err = compile_with(&source, &config).unwrap_err();
    assert!(matches!(err, SvmError::OperandTooLong { len: 300 }));
    assert_eq!(err.category(), ErrorCategory::Limit);

    // 255 bytes is still encodable
    let source = format!(r#"var s = "{}";"#, "a".repeat(255));
    assert!(compile_with(&source, &config).is_ok());
}

#[test]
fn too_many_bindings_in_one_scope() {
    let source: String = (0..33).map(|i| format!("var v{} = {};", i, i)).collect();
    let mut config = SvmConfig::default();
    config.max_bytecode_len = 4096;
    let code = compile_with(&source, &config).unwrap();
    let err = execute_with(&code, &config, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, SvmError::TooManyBindings { limit: 32 }));
}

#[test]
fn too_many_properties_on_one_object() {
    let mut config = SvmConfig::default();
    config.max_properties = 2;
    let code = compile("var o = { a: 1, b: 2 }; o.a = 3; o.c = 4;").unwrap();
    let err = execute_with(&code, &config, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, SvmError::TooManyProperties { limit: 2 }));
}

#[test]
fn bare_expression_statements_accumulate_on_the_stack() {
    let mut config = SvmConfig::default();
    config.max_stack_size = 3;
    config.max_bytecode_len = 4096;
    let code = compile_with("var x = 1; x; x; x;", &config).unwrap();
    assert!(execute_with(&code, &config, &mut Vec::<u8>::new()).is_ok());

    let code = compile_with("var x = 1; x; x; x; x;", &config).unwrap();
    let err = execute_with(&code, &config, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, SvmError::StackOverflow));
    assert_eq!(err.category(), ErrorCategory::Resource);
}
