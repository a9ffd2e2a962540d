//! The `sitegen` binary end to end.

mod common;

use common::{sitegen, write_fixture};

const ORDERS: &str = r#"
[[classes]]
name = "shop.Order"
fields = [{ name = "total", type = "int", visibility = "private" }]
methods = [{ name = "getTotal", returns = "int" }]

[[classes]]
name = "shop.Report"

[[sites]]
name = "order-total"
enclosing = "shop.Report"
receiver = { local = 1, type = "shop.Order" }
member = "total"
locals = [{ slot = 1, value = { object = { class = "shop.Order", fields = { total = { int = 3 } } } } }]

[[sites]]
name = "order-size"
enclosing = "shop.Report"
receiver = { local = 1, type = "java.util.List" }
member = "size"
locals = [{ slot = 1, value = { list = [{ int = 1 }, { int = 2 }] } }]
"#;

const BROKEN: &str = r#"
[[classes]]
name = "shop.Report"

[[sites]]
name = "nothing"
enclosing = "shop.Report"
receiver = { local = 1, type = "shop.Report" }
member = "zzz"
"#;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn select_prints_rule_and_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "orders.toml", ORDERS);
    let output = sitegen().arg("select").arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("order-total: getter -> GetterCall (shop.Order.getTotal)"), "{out}");
    assert!(out.contains("order-size: collection-size -> CollectionSize"), "{out}");
}

#[test]
fn select_json_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "orders.toml", ORDERS);
    let output = sitegen()
        .args(["select", "--json", "--site", "order-total"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let sites = parsed.as_array().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0]["site"], "order-total");
    assert_eq!(sites[0]["strategy"], "GetterCall");
    assert_eq!(sites[0]["target"], "shop.Order.getTotal");
}

#[test]
fn emit_prints_listings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "orders.toml", ORDERS);
    let output = sitegen().arg("emit").arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("== order-total (getter -> GetterCall): int"), "{out}");
    assert!(out.contains("invokevirtual shop/Order.getTotal ()I"), "{out}");
    assert!(out.contains("invokeinterface java/util/Collection.size ()I"), "{out}");
}

#[test]
fn run_executes_every_site() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "orders.toml", ORDERS);
    let output = sitegen().arg("run").arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("order-total = 3"), "{out}");
    assert!(out.contains("order-size = 2"), "{out}");
}

#[test]
fn emit_fails_when_access_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "broken.toml", BROKEN);
    let output = sitegen().arg("emit").arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(stdout(&output).contains("aconst_null"));
    assert!(stderr(&output).contains("1 error(s) reported"), "{}", stderr(&output));
}

#[test]
fn missing_fixture_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = sitegen().arg("select").arg(dir.path().join("nope.toml")).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("could not read file"), "{}", stderr(&output));
}

#[test]
fn unknown_site_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "orders.toml", ORDERS);
    let output = sitegen().args(["run", "--site", "nope"]).arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no site named 'nope'"), "{}", stderr(&output));
}

#[test]
fn config_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "orders.toml", ORDERS);
    let config = write_fixture(dir.path(), "sitegen.toml", "[log]\nlevel = \"loud\"\n");
    let output = sitegen().arg("--config").arg(&config).arg("select").arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown log level"), "{}", stderr(&output));
}

#[test]
fn config_can_disable_power_fast_paths() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = r#"
[[classes]]
name = "app.Main"

[[sites]]
name = "square"
enclosing = "app.Main"
kind = "operator"
receiver = { value = { int = 3 } }
op = "power"
argument = { value = { int = 2 } }
"#;
    let path = write_fixture(dir.path(), "power.toml", fixture);
    let config = write_fixture(dir.path(), "sitegen.toml", "[codegen]\npower_fast_paths = false\n");

    let output = sitegen().arg("emit").arg(&path).output().unwrap();
    assert!(stdout(&output).contains("(Ljava/lang/Integer;Ljava/lang/Integer;)Ljava/lang/Number;"));

    let output = sitegen().arg("--config").arg(&config).arg("emit").arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("(Ljava/lang/Number;Ljava/lang/Number;)Ljava/lang/Number;"));

    let output = sitegen().arg("--config").arg(&config).arg("run").arg(&path).output().unwrap();
    assert!(stdout(&output).contains("square = 9"), "{}", stdout(&output));
}
