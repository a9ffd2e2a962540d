//! Property access sites: strategy selection, emitted code, and results in the VM.

mod common;

use common::{emit, fixture, run};
use insta::assert_snapshot;

const SHOP: &str = r#"
[[classes]]
name = "app.Main"

[[classes]]
name = "app.Person"
fields = [{ name = "name", type = "String", visibility = "private" }]
methods = [{ name = "getName", returns = "String" }]

[[classes]]
name = "app.Order"
fields = [{ name = "total", type = "int", visibility = "private" }]
methods = [{ name = "getTotal", returns = "int" }]

[[classes]]
name = "app.Config"
fields = [{ name = "LIMIT", type = "int", static = true, value = { int = 10 } }]

[[classes]]
name = "app.Color"
kind = "enum"
constants = ["RED", "GREEN"]

[[classes]]
name = "app.Plain"

[[extensions]]
name = "getShout"
params = ["String"]
returns = "String"

[[sites]]
name = "array-length"
enclosing = "app.Main"
receiver = { local = 1, type = "int[]" }
member = "length"
locals = [{ slot = 1, value = { array = [{ int = 4 }, { int = 5 }, { int = 6 }] } }]

[[sites]]
name = "map-key"
enclosing = "app.Main"
receiver = { local = 1, type = "java.util.Map<String, Object>" }
member = "name"
locals = [{ slot = 1, value = { map = { name = { str = "Ada" } } } }]

[[sites]]
name = "person-name"
enclosing = "app.Main"
receiver = { local = 1, type = "app.Person" }
member = "name"
locals = [{ slot = 1, value = { object = { class = "app.Person", fields = { name = { str = "Ada" } } } } }]

[[sites]]
name = "safe-name"
enclosing = "app.Main"
receiver = { local = 1, type = "app.Person" }
member = "name"
safe = true
locals = [{ slot = 1, value = "null" }]

[[sites]]
name = "safe-total"
enclosing = "app.Main"
receiver = { local = 1, type = "app.Order" }
member = "total"
safe = true
locals = [{ slot = 1, value = { object = { class = "app.Order", fields = { total = { int = 12 } } } } }]

[[sites]]
name = "own-name"
enclosing = "app.Person"
member = "name"
this = { object = { class = "app.Person", fields = { name = { str = "Grace" } } } }

[[sites]]
name = "config-limit"
enclosing = "app.Main"
receiver = { class = "app.Config" }
member = "LIMIT"

[[sites]]
name = "green"
enclosing = "app.Main"
receiver = { class = "app.Color" }
member = "GREEN"

[[sites]]
name = "shout"
enclosing = "app.Main"
receiver = { value = { str = "hi" } }
member = "shout"

[[sites]]
name = "plain-zzz"
enclosing = "app.Main"
receiver = { local = 1, type = "app.Plain" }
member = "zzz"
locals = [{ slot = 1, value = { object = { class = "app.Plain" } } }]
"#;

fn strategy_of(site: &str) -> String {
    let fixture = fixture(SHOP);
    let site = fixture.site(site).unwrap();
    fixture.select(site, &Default::default()).strategy
}

#[test]
fn array_length_is_a_single_instruction() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "array-length");
    assert_eq!(emitted.selection.strategy, "ArrayLength");
    assert_eq!(emitted.result, "int");
    assert!(emitted.insns.iter().all(|i| !i.to_string().starts_with("invoke")));
    assert_snapshot!(emitted.listing(), @r"
    aload 1
    arraylength
    ");
    assert_eq!(run(&fixture, "array-length"), "3");
}

#[test]
fn map_property_is_a_get_call() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "map-key");
    assert_eq!(emitted.selection.rule, "map-list-sugar");
    assert_eq!(emitted.selection.strategy, "MapGet");
    assert_eq!(emitted.result, "java.lang.Object");
    assert_snapshot!(emitted.listing(), @r#"
    aload 1
    ldc "name"
    invokeinterface java/util/Map.get (Ljava/lang/Object;)Ljava/lang/Object;
    "#);
    assert_eq!(run(&fixture, "map-key"), "Ada");
}

#[test]
fn getter_beats_private_field() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "person-name");
    assert_eq!(emitted.selection.strategy, "GetterCall");
    assert_eq!(emitted.selection.target.as_deref(), Some("app.Person.getName"));
    assert_snapshot!(emitted.listing(), @r"
    aload 1
    invokevirtual app/Person.getName ()Ljava/lang/String;
    ");
    assert_eq!(run(&fixture, "person-name"), "Ada");
}

#[test]
fn safe_navigation_on_null_yields_null() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "safe-name");
    assert_snapshot!(emitted.listing(), @r"
    aload 1
    dup
    ifnull L0
    invokevirtual app/Person.getName ()Ljava/lang/String;
    goto L1
    L0:
    pop
    aconst_null
    L1:
    ");
    assert_eq!(run(&fixture, "safe-name"), "null");
}

#[test]
fn safe_navigation_boxes_primitive_results() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "safe-total");
    assert_eq!(emitted.result, "java.lang.Integer");
    assert!(
        emitted
            .listing()
            .contains("invokestatic java/lang/Integer.valueOf (I)Ljava/lang/Integer;")
    );
    assert_eq!(run(&fixture, "safe-total"), "12");
}

#[test]
fn implicit_this_reads_own_property() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "own-name");
    assert_eq!(emitted.selection.rule, "getter");
    assert_eq!(emitted.insns[0].to_string(), "aload 0");
    assert_eq!(run(&fixture, "own-name"), "Grace");
}

#[test]
fn static_field_does_not_evaluate_receiver() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "config-limit");
    assert_eq!(emitted.selection.strategy, "DirectField");
    assert_snapshot!(emitted.listing(), @"getstatic app/Config.LIMIT I");
    assert_eq!(run(&fixture, "config-limit"), "10");
}

#[test]
fn enum_member_reads_the_constant() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "green");
    assert_eq!(emitted.selection.strategy, "EnumConstant");
    assert_snapshot!(emitted.listing(), @"getstatic app/Color.GREEN Lapp/Color;");
    assert!(run(&fixture, "green").starts_with("app.Color@"));
}

#[test]
fn extension_getter_on_string() {
    assert_eq!(strategy_of("shout"), "ExtensionMethodCall");
}

#[test]
fn unknown_member_is_unresolvable_with_placeholder() {
    let fixture = fixture(SHOP);
    let emitted = emit(&fixture, "plain-zzz");
    assert_eq!(emitted.selection.strategy, "Unresolvable");
    assert_eq!(emitted.result, "java.lang.Object");
    assert_eq!(emitted.diagnostics.len(), 1);
    assert_snapshot!(emitted.diagnostics[0].to_string(), @"Access error: Access to app.Plain#zzz is forbidden");
    assert_snapshot!(emitted.listing(), @"aconst_null");
    assert_eq!(run(&fixture, "plain-zzz"), "null");
}

#[test]
fn selection_is_repeatable() {
    let fixture = fixture(SHOP);
    let options = Default::default();
    for site in &fixture.sites {
        assert_eq!(fixture.select(site, &options), fixture.select(site, &options), "{}", site.name);
    }
}
