//! Recoverable access errors are reported once and never stop sibling sites.

mod common;

use common::{emit, fixture};
use insta::assert_snapshot;
use sitegen::ast::{AccessSite, Expr};
use sitegen::codegen::{CallSiteWriter, EmissionContext, InsnBuffer};
use sitegen::config::CodegenOptions;
use sitegen::diagnostics::{render_error, CompileError, Diagnostics};
use sitegen::span::Span;
use sitegen::typeck::{known, ClassKind, ClassTable, FieldInfo, JvmType};

const BROKEN: &str = r#"
[[classes]]
name = "app.Main"

[[classes]]
name = "app.Plain"
fields = [{ name = "count", type = "int" }]

[[sites]]
name = "bad"
enclosing = "app.Main"
receiver = { local = 1, type = "app.Plain" }
member = "zzz"

[[sites]]
name = "good"
enclosing = "app.Main"
receiver = { local = 1, type = "app.Plain" }
member = "count"

[[sites]]
name = "static-bad"
enclosing = "app.Main"
receiver = { class = "app.Plain" }
member = "missing"
"#;

#[test]
fn sibling_sites_still_compile() {
    let fixture = fixture(BROKEN);
    let bad = emit(&fixture, "bad");
    let good = emit(&fixture, "good");
    assert_eq!(bad.diagnostics.len(), 1);
    assert!(good.diagnostics.is_empty());
    assert_snapshot!(good.listing(), @r"
    aload 1
    getfield app/Plain.count I
    ");
}

#[test]
fn diagnostic_points_at_the_member() {
    let fixture = fixture(BROKEN);
    let bad = emit(&fixture, "bad");
    let span = bad.diagnostics[0].span().unwrap();
    assert!(fixture.source[span.start..span.end].contains("zzz"));
    assert_eq!(span.line, 13);
    render_error(&fixture.source, &bad.diagnostics[0]);
}

#[test]
fn class_literal_reports_the_literal_type() {
    let fixture = fixture(BROKEN);
    let emitted = emit(&fixture, "static-bad");
    assert_snapshot!(
        emitted.diagnostics[0].to_string(),
        @"Access error: Access to app.Plain#missing is forbidden"
    );
}

#[test]
fn one_report_per_unresolvable_site() {
    let mut table = ClassTable::new();
    let main = table.declare("app.Main", ClassKind::Class).unwrap();
    let plain = table.declare("app.Plain", ClassKind::Class).unwrap();
    table.add_field(plain, FieldInfo::new("count", JvmType::int()));

    let options = CodegenOptions::default();
    let mut buf = InsnBuffer::new();
    let mut diagnostics = Diagnostics::new();
    {
        let ctx = EmissionContext::new(&table, main, &options, &mut buf, &mut diagnostics);
        let mut writer = CallSiteWriter::new(ctx);
        let receiver = Expr::local(1, JvmType::object(plain)).with_text("p");
        for member in ["a", "count", "b"] {
            let site = AccessSite::new(receiver.clone(), member).at(Span::new(0, 1));
            let ty = writer.make_get_property_site(&site).unwrap();
            let expected = if member == "count" { JvmType::int() } else { JvmType::object(known::OBJECT) };
            assert_eq!(ty, expected);
        }
        assert_eq!(writer.context().stack.len(), 3);
    }
    let messages: Vec<String> = diagnostics.errors().iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            "Access error: Access to app.Plain#a is forbidden",
            "Access error: Access to app.Plain#b is forbidden",
        ]
    );
    assert!(diagnostics.errors().iter().all(|e| !e.is_fatal()));
    assert!(matches!(diagnostics.errors()[0], CompileError::Access { .. }));
}

#[test]
fn fixture_errors_name_the_file() {
    let err = sitegen::fixture::Fixture::parse("[[sites]]\nname = 1\n", std::path::Path::new("broken.toml"))
        .err()
        .unwrap();
    assert!(matches!(err, CompileError::Fixture { .. }));
    assert!(err.to_string().starts_with("Fixture error: broken.toml: invalid syntax"), "{err}");
}
