use serde::{Deserialize, Serialize};

/// Index of a class in a [`super::env::ClassTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub fn descriptor(self) -> char {
        match self {
            Primitive::Boolean => 'Z',
            Primitive::Byte => 'B',
            Primitive::Char => 'C',
            Primitive::Short => 'S',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Float => 'F',
            Primitive::Double => 'D',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "char" => Primitive::Char,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }

    /// Load/store prefix letter used by typed JVM opcodes (`iload`, `aaload`, ...).
    pub fn opcode_prefix(self) -> char {
        match self {
            Primitive::Long => 'l',
            Primitive::Float => 'f',
            Primitive::Double => 'd',
            _ => 'i',
        }
    }
}

/// A statically inferred type as seen by code generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JvmType {
    Void,
    Prim(Primitive),
    /// A class or interface, with generic type arguments when known.
    Object { class: ClassId, args: Vec<JvmType> },
    Array(Box<JvmType>),
    /// An unresolved generic placeholder such as `T`.
    TypeVar(String),
}

impl JvmType {
    pub fn object(class: ClassId) -> Self {
        JvmType::Object { class, args: Vec::new() }
    }

    pub fn generic(class: ClassId, args: Vec<JvmType>) -> Self {
        JvmType::Object { class, args }
    }

    pub fn array_of(component: JvmType) -> Self {
        JvmType::Array(Box::new(component))
    }

    pub fn int() -> Self {
        JvmType::Prim(Primitive::Int)
    }

    pub fn boolean() -> Self {
        JvmType::Prim(Primitive::Boolean)
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            JvmType::Object { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, JvmType::Array(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, JvmType::Prim(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, JvmType::Object { .. } | JvmType::Array(_) | JvmType::TypeVar(_))
    }

    pub fn component(&self) -> Option<&JvmType> {
        match self {
            JvmType::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// Same nominal type, ignoring generic arguments.
    pub fn same_class(&self, other: &JvmType) -> bool {
        match (self, other) {
            (JvmType::Object { class: a, .. }, JvmType::Object { class: b, .. }) => a == b,
            _ => self == other,
        }
    }

    pub fn erasure(&self) -> JvmType {
        match self {
            JvmType::Object { class, .. } => JvmType::object(*class),
            JvmType::Array(inner) => JvmType::array_of(inner.erasure()),
            other => other.clone(),
        }
    }
}
