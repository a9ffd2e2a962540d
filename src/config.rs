use std::path::Path;

use serde::Deserialize;

use crate::diagnostics::CompileError;

pub const DEFAULT_EXTENSION_OWNER: &str = "org/codehaus/groovy/runtime/DefaultGroovyMethods";
pub const DEFAULT_NUMBER_HELPER_PACKAGE: &str = "org/codehaus/groovy/runtime/dgmimpl";

/// Contents of `sitegen.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub codegen: CodegenOptions,
    #[serde(default)]
    pub log: LogOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CodegenOptions {
    /// Use the exact-pair `power` helpers (BigDecimal×Integer, ...) instead of the generic one.
    pub power_fast_paths: bool,
    /// Internal name of the class holding extension methods.
    pub extension_owner: String,
    /// Internal package of the `NumberNumber<Op>` helpers.
    pub number_helper_package: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            power_fast_paths: true,
            extension_owner: DEFAULT_EXTENSION_OWNER.to_string(),
            number_helper_package: DEFAULT_NUMBER_HELPER_PACKAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LogOptions {
    pub level: String,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { level: "warn".to_string() }
    }
}

impl Config {
    pub fn parse(content: &str, path: &Path) -> Result<Self, CompileError> {
        let config: Config = toml::from_str(content).map_err(|e| {
            CompileError::config(format!("sitegen.toml: invalid syntax: {e}"), path.to_path_buf())
        })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CompileError::config(format!("sitegen.toml: could not read file: {e}"), path.to_path_buf())
        })?;
        Self::parse(&content, path)
    }

    fn validate(&self, path: &Path) -> Result<(), CompileError> {
        const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            return Err(CompileError::config(
                format!("sitegen.toml: unknown log level '{}'", self.log.level),
                path.to_path_buf(),
            ));
        }
        if self.codegen.extension_owner.trim().is_empty() {
            return Err(CompileError::config(
                "sitegen.toml: 'extension_owner' must not be empty",
                path.to_path_buf(),
            ));
        }
        Ok(())
    }
}
