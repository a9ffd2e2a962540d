#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use sitegen::config::CodegenOptions;
use sitegen::fixture::{Emitted, Fixture};

pub fn sitegen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sitegen"))
}

pub fn fixture(source: &str) -> Fixture {
    match Fixture::parse(source, Path::new("test.toml")) {
        Ok(fixture) => fixture,
        Err(err) => panic!("fixture failed to load: {err}"),
    }
}

/// Emit the named site with default options.
pub fn emit(fixture: &Fixture, site: &str) -> Emitted {
    emit_with(fixture, site, &CodegenOptions::default())
}

pub fn emit_with(fixture: &Fixture, site: &str, options: &CodegenOptions) -> Emitted {
    let site = fixture.site(site).unwrap_or_else(|| panic!("no site named {site}"));
    fixture.emit(site, options).unwrap()
}

/// Emit and execute the named site, returning the rendered result.
pub fn run(fixture: &Fixture, site: &str) -> String {
    run_with(fixture, site, &CodegenOptions::default())
}

pub fn run_with(fixture: &Fixture, site: &str, options: &CodegenOptions) -> String {
    let site = fixture.site(site).unwrap_or_else(|| panic!("no site named {site}"));
    match fixture.run(site, options) {
        Ok((_, rendered)) => rendered,
        Err(err) => panic!("site {} failed: {err}", site.name),
    }
}

/// Write `source` to a file in `dir` and return its path.
pub fn write_fixture(dir: &Path, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}
