//! Private fields read from another compilation unit through generated accessors.

mod common;

use common::{emit, fixture, run};
use insta::assert_snapshot;

const UNITS: &str = r#"
bridge_pairs = [["app.A", "app.B"]]

[[classes]]
name = "app.A"
unit = 1
fields = [
    { name = "x", type = "int", visibility = "private" },
    { name = "COUNT", type = "int", visibility = "private", static = true, value = { int = 7 } },
]
bridges = [
    { field = "x", method = "pfaccess$0", returns = "int" },
    { field = "COUNT", method = "pfaccess$1", returns = "int" },
]

[[classes]]
name = "app.B"
unit = 2

[[classes]]
name = "app.C"
unit = 3

[[sites]]
name = "from-b"
enclosing = "app.B"
receiver = { local = 1, type = "app.A" }
member = "x"
locals = [{ slot = 1, value = { object = { class = "app.A", fields = { x = { int = 42 } } } } }]

[[sites]]
name = "from-a"
enclosing = "app.A"
receiver = { local = 1, type = "app.A" }
member = "x"
locals = [{ slot = 1, value = { object = { class = "app.A", fields = { x = { int = 42 } } } } }]

[[sites]]
name = "static-from-b"
enclosing = "app.B"
receiver = { local = 1, type = "app.A" }
member = "COUNT"
locals = [{ slot = 1, value = "null" }]

[[sites]]
name = "from-c"
enclosing = "app.C"
receiver = { local = 1, type = "app.A" }
member = "x"
"#;

#[test]
fn private_field_from_other_unit_uses_the_bridge() {
    let fixture = fixture(UNITS);
    let emitted = emit(&fixture, "from-b");
    assert_eq!(emitted.selection.rule, "bridge-accessor");
    assert_eq!(emitted.selection.strategy, "BridgeAccessor");
    assert_eq!(emitted.selection.target.as_deref(), Some("app.A.pfaccess$0"));
    assert_snapshot!(emitted.listing(), @r"
    aload 1
    invokestatic app/A.pfaccess$0 (Lapp/A;)I
    ");
    assert_eq!(run(&fixture, "from-b"), "42");
}

#[test]
fn bridge_reads_the_same_value_as_direct_access() {
    let fixture = fixture(UNITS);
    let direct = emit(&fixture, "from-a");
    assert_eq!(direct.selection.strategy, "DirectField");
    assert_snapshot!(direct.listing(), @r"
    aload 1
    getfield app/A.x I
    ");
    assert_eq!(run(&fixture, "from-a"), run(&fixture, "from-b"));
}

#[test]
fn static_bridge_passes_null_instead_of_the_receiver() {
    let fixture = fixture(UNITS);
    let emitted = emit(&fixture, "static-from-b");
    assert_snapshot!(emitted.listing(), @r"
    aconst_null
    checkcast app/A
    invokestatic app/A.pfaccess$1 (Lapp/A;)I
    ");
    assert_eq!(run(&fixture, "static-from-b"), "7");
}

#[test]
fn no_bridge_without_a_registered_pair() {
    let fixture = fixture(UNITS);
    let emitted = emit(&fixture, "from-c");
    assert_eq!(emitted.selection.strategy, "Unresolvable");
    assert_eq!(emitted.diagnostics.len(), 1);
    assert_eq!(emitted.diagnostics[0].to_string(), "Access error: Access to app.A#x is forbidden");
}
