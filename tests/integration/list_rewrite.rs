//! `list.p` compiled as a loop collecting `p` from every element.

mod common;

use common::{emit, fixture, run};
use insta::assert_snapshot;
use sitegen::ast::{AccessSite, Constant, Expr};
use sitegen::codegen::{CallSiteWriter, EmissionContext, InsnBuffer};
use sitegen::config::CodegenOptions;
use sitegen::diagnostics::{CompileError, Diagnostics};
use sitegen::typeck::{known, ClassKind, ClassTable, JvmType, PropertyInfo};

const PEOPLE: &str = r#"
[[classes]]
name = "app.Main"

[[classes]]
name = "app.Person"
properties = [{ name = "name", type = "String" }, { name = "age", type = "int" }]

[[sites]]
name = "names"
enclosing = "app.Main"
receiver = { local = 1, type = "java.util.List<app.Person>" }
member = "name"
max_locals = 2

[[sites.locals]]
slot = 1
value = { list = [{ object = { class = "app.Person", fields = { name = { str = "a" }, age = { int = 30 } } } }, { object = { class = "app.Person", fields = { name = { str = "b" }, age = { int = 41 } } } }] }

[[sites]]
name = "ages"
enclosing = "app.Main"
receiver = { local = 1, type = "java.util.List<app.Person>" }
member = "age"
max_locals = 2

[[sites.locals]]
slot = 1
value = { list = [{ object = { class = "app.Person", fields = { age = { int = 30 } } } }, { object = { class = "app.Person", fields = { age = { int = 41 } } } }] }

[[sites]]
name = "empty"
enclosing = "app.Main"
receiver = { local = 1, component = "app.Person", type = "java.util.List" }
member = "name"
max_locals = 2
locals = [{ slot = 1, value = { list = [] } }]

[[sites]]
name = "nested"
enclosing = "app.Main"
member = "size"
receiver = { property = { receiver = { local = 1, type = "java.util.List<app.Person>" }, member = "name" }, type = "java.util.List" }
max_locals = 2

[[sites.locals]]
slot = 1
value = { list = [{ object = { class = "app.Person", fields = { name = { str = "a" } } } }] }
"#;

#[test]
fn collects_the_property_of_every_element() {
    let fixture = fixture(PEOPLE);
    let emitted = emit(&fixture, "names");
    assert_eq!(emitted.selection.strategy, "ListPropertyRewrite");
    assert_eq!(emitted.selection.target.as_deref(), Some("app.Person"));
    assert_eq!(emitted.result, "java.util.ArrayList");
    assert_snapshot!(emitted.listing(), @r"
    aload 1
    astore 3
    new java/util/ArrayList
    dup
    aload 3
    invokeinterface java/util/List.size ()I
    invokespecial java/util/ArrayList.<init> (I)V
    astore 2
    aload 3
    invokeinterface java/util/List.iterator ()Ljava/util/Iterator;
    astore 3
    L0:
    aload 3
    invokeinterface java/util/Iterator.hasNext ()Z
    ifeq L1
    aload 3
    invokeinterface java/util/Iterator.next ()Ljava/lang/Object;
    checkcast app/Person
    astore 4
    aload 2
    aload 4
    invokevirtual app/Person.getName ()Ljava/lang/String;
    invokeinterface java/util/List.add (Ljava/lang/Object;)Z
    pop
    goto L0
    L1:
    aload 2
    ");
    assert_eq!(run(&fixture, "names"), "[a, b]");
}

#[test]
fn primitive_properties_are_boxed_before_add() {
    let fixture = fixture(PEOPLE);
    let emitted = emit(&fixture, "ages");
    assert!(
        emitted
            .listing()
            .contains("invokestatic java/lang/Integer.valueOf (I)Ljava/lang/Integer;")
    );
    assert_eq!(run(&fixture, "ages"), "[30, 41]");
}

#[test]
fn empty_list_gives_empty_result() {
    let fixture = fixture(PEOPLE);
    assert_eq!(run(&fixture, "empty"), "[]");
}

#[test]
fn rewritten_list_feeds_an_outer_access() {
    let fixture = fixture(PEOPLE);
    let emitted = emit(&fixture, "nested");
    assert_eq!(emitted.selection.strategy, "CollectionSize");
    assert_eq!(run(&fixture, "nested"), "1");
}

#[test]
fn temporaries_are_released() {
    let mut table = ClassTable::new();
    let main = table.declare("app.Main", ClassKind::Class).unwrap();
    let person = table.declare("app.Person", ClassKind::Class).unwrap();
    table.add_property(person, PropertyInfo::new("name", JvmType::object(known::STRING)));

    let options = CodegenOptions::default();
    let mut buf = InsnBuffer::new();
    let mut diagnostics = Diagnostics::new();
    let ctx = EmissionContext::new(&table, main, &options, &mut buf, &mut diagnostics).with_max_locals(2);
    let mut writer = CallSiteWriter::new(ctx);

    let people = JvmType::generic(known::LIST, vec![JvmType::object(person)]);
    let site = AccessSite::new(Expr::local(1, people), "name");
    assert_eq!(writer.context().temps.active_count(), 0);
    let ty = writer.make_get_property_site(&site).unwrap();
    assert_eq!(ty, JvmType::object(known::ARRAY_LIST));
    assert_eq!(writer.context().temps.active_count(), 0);
    assert_eq!(writer.context().stack.len(), 1);

    // a second rewrite reuses the same slots
    writer.make_get_property_site(&site).unwrap();
    assert_eq!(writer.context().temps.active_count(), 0);
    assert_eq!(writer.context().stack.len(), 2);
    drop(writer);
    assert!(diagnostics.is_empty());
    assert_eq!(buf.insns().iter().filter(|i| i.to_string() == "astore 4").count(), 2);
}

#[test]
fn temporaries_are_released_when_the_loop_fails() {
    let mut table = ClassTable::new();
    let main = table.declare("app.Main", ClassKind::Class).unwrap();
    let person = table.declare("app.Person", ClassKind::Class).unwrap();
    let plain = table.declare("app.Plain", ClassKind::Class).unwrap();
    table.add_property(person, PropertyInfo::new("name", JvmType::object(known::STRING)));

    let options = CodegenOptions::default();
    let mut buf = InsnBuffer::new();
    let mut diagnostics = Diagnostics::new();
    let ctx = EmissionContext::new(&table, main, &options, &mut buf, &mut diagnostics).with_max_locals(2);
    let mut writer = CallSiteWriter::new(ctx);

    // `plain[0]` typed as a list of people, with no way to compile the subscript
    let people = JvmType::generic(known::LIST, vec![JvmType::object(person)]);
    let broken = Expr::operator(
        Expr::local(1, JvmType::object(plain)).with_text("plain"),
        "getAt",
        Expr::constant(Constant::Int(0)).with_text("0"),
        people,
    );
    let site = AccessSite::new(broken, "name");
    let err = writer.make_get_property_site(&site).unwrap_err();
    assert!(matches!(err, CompileError::Internal { .. }), "{err}");
    assert!(err.is_fatal());
    assert!(err.to_string().contains("with message: getAt and arguments: 0"), "{err}");
    assert_eq!(writer.context().temps.active_count(), 0);
    drop(writer);
    assert!(diagnostics.is_empty());
}
