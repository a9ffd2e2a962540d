//! Single-argument operator calls: number helpers, power pairing, indexing.

mod common;

use common::{emit, emit_with, fixture, run, run_with};
use insta::assert_snapshot;
use sitegen::config::CodegenOptions;
use sitegen::diagnostics::CompileError;

const OPERATORS: &str = r#"
[[classes]]
name = "app.Main"

[[classes]]
name = "app.Plain"

[[classes]]
name = "app.Grid"
methods = [{ name = "getAt", params = ["Number"], returns = "String" }]

[[sites]]
name = "decimal-power"
enclosing = "app.Main"
kind = "operator"
receiver = { local = 1, type = "BigDecimal" }
op = "power"
argument = { local = 2, type = "Integer" }
locals = [{ slot = 1, value = { decimal = 1.5 } }, { slot = 2, value = { integer = 2 } }]

[[sites]]
name = "long-power"
enclosing = "app.Main"
kind = "operator"
receiver = { local = 1, type = "long" }
op = "power"
argument = { value = { int = 3 } }
locals = [{ slot = 1, value = { long = 2 } }]

[[sites]]
name = "int-plus"
enclosing = "app.Main"
kind = "operator"
receiver = { local = 1, type = "int" }
op = "plus"
argument = { value = { int = 2 } }
locals = [{ slot = 1, value = { int = 40 } }]

[[sites]]
name = "int-div"
enclosing = "app.Main"
kind = "operator"
receiver = { value = { int = 1 } }
op = "div"
argument = { value = { int = 4 } }

[[sites]]
name = "string-plus"
enclosing = "app.Main"
kind = "operator"
receiver = { value = { str = "n=" } }
op = "plus"
argument = { value = { int = 3 } }

[[sites]]
name = "array-index"
enclosing = "app.Main"
kind = "operator"
receiver = { local = 1, type = "String[]" }
op = "getAt"
argument = { local = 2, type = "Integer" }
locals = [{ slot = 1, value = { array = [{ str = "x" }, { str = "y" }] } }, { slot = 2, value = { integer = 1 } }]

[[sites]]
name = "list-index"
enclosing = "app.Main"
kind = "operator"
receiver = { local = 1, type = "java.util.List<String>" }
op = "getAt"
argument = { value = { int = -1 } }
locals = [{ slot = 1, value = { list = [{ str = "a" }, { str = "b" }] } }]

[[sites]]
name = "map-index"
enclosing = "app.Main"
kind = "operator"
receiver = { local = 1, type = "java.util.Map" }
op = "getAt"
argument = { value = { str = "k" } }
locals = [{ slot = 1, value = { map = { k = { int = 7 } } } }]

[[sites]]
name = "grid-index"
enclosing = "app.Main"
kind = "operator"
receiver = { local = 1, type = "app.Grid" }
op = "getAt"
argument = { value = { int = 0 } }

[[sites]]
name = "plain-index"
enclosing = "app.Main"
kind = "operator"
receiver = { local = 1, type = "app.Plain" }
op = "getAt"
argument = { value = { int = 0 } }
"#;

#[test]
fn big_decimal_power_uses_the_exact_pair_helper() {
    let fixture = fixture(OPERATORS);
    let emitted = emit(&fixture, "decimal-power");
    assert_eq!(emitted.selection.strategy, "Power");
    assert_eq!(emitted.result, "java.lang.Number");
    assert_snapshot!(emitted.listing(), @r"
    aload 1
    aload 2
    invokestatic org/codehaus/groovy/runtime/DefaultGroovyMethods.power (Ljava/math/BigDecimal;Ljava/lang/Integer;)Ljava/lang/Number;
    ");
    assert_eq!(run(&fixture, "decimal-power"), "2.25");
}

#[test]
fn generic_power_helper_when_fast_paths_are_off() {
    let fixture = fixture(OPERATORS);
    let options = CodegenOptions { power_fast_paths: false, ..CodegenOptions::default() };
    let emitted = emit_with(&fixture, "decimal-power", &options);
    let call = emitted.insns.last().unwrap().to_string();
    assert!(call.ends_with("power (Ljava/lang/Number;Ljava/lang/Number;)Ljava/lang/Number;"), "{call}");
    assert_eq!(run_with(&fixture, "decimal-power", &options), "2.25");
}

#[test]
fn primitive_long_power_boxes_both_operands() {
    let fixture = fixture(OPERATORS);
    let emitted = emit(&fixture, "long-power");
    assert_snapshot!(emitted.listing(), @r"
    lload 1
    invokestatic java/lang/Long.valueOf (J)Ljava/lang/Long;
    ldc 3
    invokestatic java/lang/Integer.valueOf (I)Ljava/lang/Integer;
    invokestatic org/codehaus/groovy/runtime/DefaultGroovyMethods.power (Ljava/lang/Long;Ljava/lang/Integer;)Ljava/lang/Number;
    ");
    assert_eq!(run(&fixture, "long-power"), "8");
}

#[test]
fn number_plus_goes_through_number_number_helper() {
    let fixture = fixture(OPERATORS);
    let emitted = emit(&fixture, "int-plus");
    assert_eq!(emitted.selection.strategy, "NumberNumber");
    assert_snapshot!(emitted.listing(), @r"
    iload 1
    invokestatic java/lang/Integer.valueOf (I)Ljava/lang/Integer;
    ldc 2
    invokestatic java/lang/Integer.valueOf (I)Ljava/lang/Integer;
    invokestatic org/codehaus/groovy/runtime/dgmimpl/NumberNumberPlus.plus (Ljava/lang/Number;Ljava/lang/Number;)Ljava/lang/Number;
    ");
    assert_eq!(run(&fixture, "int-plus"), "42");
}

#[test]
fn integer_division_yields_a_decimal() {
    let fixture = fixture(OPERATORS);
    assert_eq!(run(&fixture, "int-div"), "0.25");
}

#[test]
fn string_plus_concatenates() {
    let fixture = fixture(OPERATORS);
    let emitted = emit(&fixture, "string-plus");
    assert_eq!(emitted.selection.strategy, "StringPlus");
    assert_eq!(emitted.result, "java.lang.String");
    assert_eq!(run(&fixture, "string-plus"), "n=3");
}

#[test]
fn array_index_unboxes_to_int() {
    let fixture = fixture(OPERATORS);
    let emitted = emit(&fixture, "array-index");
    assert_eq!(emitted.selection.strategy, "ArrayGet");
    assert_snapshot!(emitted.listing(), @r"
    aload 1
    aload 2
    invokevirtual java/lang/Integer.intValue ()I
    aaload
    ");
    assert_eq!(run(&fixture, "array-index"), "y");
}

#[test]
fn list_and_map_index_bind_to_extensions() {
    let fixture = fixture(OPERATORS);
    let list = emit(&fixture, "list-index");
    assert_eq!(list.selection.strategy, "ExtensionCall");
    assert_eq!(
        list.insns.last().unwrap().to_string(),
        "invokestatic org/codehaus/groovy/runtime/DefaultGroovyMethods.getAt (Ljava/util/List;I)Ljava/lang/Object;"
    );
    assert_eq!(run(&fixture, "list-index"), "b");

    let map = emit(&fixture, "map-index");
    assert_eq!(map.selection.strategy, "ExtensionCall");
    assert_eq!(run(&fixture, "map-index"), "7");
}

#[test]
fn declared_get_at_is_called_directly() {
    let fixture = fixture(OPERATORS);
    let site = fixture.site("grid-index").unwrap();
    let selection = fixture.select(site, &CodegenOptions::default());
    assert_eq!(selection.strategy, "GetAtMethod");
    assert_eq!(selection.target.as_deref(), Some("app.Grid.getAt"));
}

#[test]
fn nothing_applicable_is_a_fatal_internal_error() {
    let fixture = fixture(OPERATORS);
    let site = fixture.site("plain-index").unwrap();
    assert_eq!(fixture.select(site, &CodegenOptions::default()).strategy, "None");

    let err = fixture.emit(site, &CodegenOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Internal { .. }));
    assert!(err.is_fatal());
    let message = err.to_string();
    assert!(message.contains("On receiver: local1 with message: getAt and arguments: 0"), "{message}");
    assert!(message.ends_with("This method should not have been called."), "{message}");
}
