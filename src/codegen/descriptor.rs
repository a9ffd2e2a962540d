use crate::typeck::{known, JvmType, TypeResolver};

/// JVM field descriptor of `ty`: `I`, `Ljava/lang/String;`, `[I`, ...
/// Type variables erase to `java.lang.Object`.
pub fn descriptor(resolver: &dyn TypeResolver, ty: &JvmType) -> String {
    match ty {
        JvmType::Void => "V".to_string(),
        JvmType::Prim(p) => p.descriptor().to_string(),
        JvmType::Object { class, .. } => format!("L{};", resolver.class(*class).internal_name()),
        JvmType::Array(inner) => format!("[{}", descriptor(resolver, inner)),
        JvmType::TypeVar(_) => format!("L{};", resolver.class(known::OBJECT).internal_name()),
    }
}

pub fn method_descriptor(resolver: &dyn TypeResolver, params: &[JvmType], ret: &JvmType) -> String {
    let params: String = params.iter().map(|p| descriptor(resolver, p)).collect();
    format!("({params}){}", descriptor(resolver, ret))
}

/// Internal name used by `new`/`checkcast`: class internal name, or the descriptor for arrays.
pub fn internal_name(resolver: &dyn TypeResolver, ty: &JvmType) -> String {
    match ty {
        JvmType::Object { class, .. } => resolver.class(*class).internal_name(),
        JvmType::TypeVar(_) => resolver.class(known::OBJECT).internal_name(),
        other => descriptor(resolver, other),
    }
}

/// Number of arguments a method descriptor takes.
pub fn arg_count(desc: &str) -> usize {
    let Some(params) = desc.strip_prefix('(').and_then(|d| d.split_once(')')).map(|(p, _)| p) else {
        return 0;
    };
    let mut count = 0;
    let mut chars = params.chars();
    while let Some(c) = chars.next() {
        match c {
            '[' => continue,
            'L' => {
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                }
                count += 1;
            }
            _ => count += 1,
        }
    }
    count
}

/// Whether a method descriptor returns `void`.
pub fn returns_void(desc: &str) -> bool {
    desc.ends_with(")V")
}
