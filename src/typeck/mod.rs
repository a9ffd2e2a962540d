//! The type information call-site generation consumes: the JVM type model,
//! the class table describing the compilation's type universe, and the
//! resolver interface the code generator queries it through.

pub mod env;
pub mod resolve;
pub mod types;

pub use env::{known, ClassInfo, ClassKind, ClassTable, FieldInfo, MethodInfo, PropertyInfo, Visibility};
pub use resolve::TypeResolver;
pub use types::{ClassId, JvmType, Primitive};

/// `name` with its first character upper-cased, as used to build getter names.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
