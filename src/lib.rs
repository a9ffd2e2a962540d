//! Static call-site code generation for property access and single-argument
//! operator calls on a JVM-style object model.
//!
//! The type checker hands code generation a typed [`ast::Expr`] tree and a
//! [`typeck::TypeResolver`]. [`codegen::CallSiteWriter`] turns each access site
//! into a verifiable instruction sequence; [`vm`] can execute those sequences,
//! and [`fixture`] loads class universes and sites from TOML.

pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod fixture;
pub mod span;
pub mod typeck;
pub mod vm;

use std::path::Path;

use config::Config;
use diagnostics::CompileError;

/// Load `sitegen.toml` from `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<Config, CompileError> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}
