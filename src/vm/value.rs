use std::fmt;

/// Index of an object on the [`super::Vm`] heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef(pub usize);

/// A boxed number or boolean. `float` is carried as `double`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boxed {
    Integer(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    BigInteger(i64),
    BigDecimal(f64),
}

impl Boxed {
    /// Internal name of the wrapper class.
    pub fn class_name(self) -> &'static str {
        match self {
            Boxed::Integer(_) => "java/lang/Integer",
            Boxed::Long(_) => "java/lang/Long",
            Boxed::Double(_) => "java/lang/Double",
            Boxed::Boolean(_) => "java/lang/Boolean",
            Boxed::BigInteger(_) => "java/math/BigInteger",
            Boxed::BigDecimal(_) => "java/math/BigDecimal",
        }
    }

    pub fn is_number(self) -> bool {
        !matches!(self, Boxed::Boolean(_))
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Boxed::Integer(v) => i64::from(v),
            Boxed::Long(v) | Boxed::BigInteger(v) => v,
            Boxed::Double(v) | Boxed::BigDecimal(v) => v as i64,
            Boxed::Boolean(b) => i64::from(b),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Boxed::Integer(v) => f64::from(v),
            Boxed::Long(v) | Boxed::BigInteger(v) => v as f64,
            Boxed::Double(v) | Boxed::BigDecimal(v) => v,
            Boxed::Boolean(b) => f64::from(u8::from(b)),
        }
    }

    fn is_integral(self) -> bool {
        matches!(self, Boxed::Integer(_) | Boxed::Long(_) | Boxed::BigInteger(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// Every sub-int primitive and `boolean` lives on the stack as an int.
    Int(i32),
    Long(i64),
    Double(f64),
    Str(String),
    Boxed(Boxed),
    /// A class constant, by internal name.
    Class(String),
    Ref(ObjRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::Str(_) => "String",
            Value::Boxed(_) => "boxed",
            Value::Class(_) => "Class",
            Value::Ref(_) => "reference",
        }
    }

    /// Numeric view of a primitive or boxed number.
    pub fn as_number(&self) -> Option<Boxed> {
        match self {
            Value::Int(v) => Some(Boxed::Integer(*v)),
            Value::Long(v) => Some(Boxed::Long(*v)),
            Value::Double(v) => Some(Boxed::Double(*v)),
            Value::Boxed(b) if b.is_number() => Some(*b),
            _ => None,
        }
    }
}

/// Result type of binary arithmetic on two numbers: the wider of the two kinds.
pub(crate) fn widen(a: Boxed, b: Boxed, int: impl Fn(i64, i64) -> Option<i64>, float: impl Fn(f64, f64) -> f64) -> Option<Boxed> {
    if a.is_integral() && b.is_integral() {
        let v = int(a.as_i64(), b.as_i64())?;
        return Some(match (a, b) {
            (Boxed::BigInteger(_), _) | (_, Boxed::BigInteger(_)) => Boxed::BigInteger(v),
            (Boxed::Long(_), _) | (_, Boxed::Long(_)) => Boxed::Long(v),
            _ => match i32::try_from(v) {
                Ok(small) => Boxed::Integer(small),
                Err(_) => Boxed::Long(v),
            },
        });
    }
    let v = float(a.as_f64(), b.as_f64());
    Some(match (a, b) {
        (Boxed::BigDecimal(_), _) | (_, Boxed::BigDecimal(_)) => Boxed::BigDecimal(v),
        _ => Boxed::Double(v),
    })
}

impl fmt::Display for Boxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boxed::Integer(v) => write!(f, "{v}"),
            Boxed::Long(v) | Boxed::BigInteger(v) => write!(f, "{v}"),
            Boxed::Double(v) | Boxed::BigDecimal(v) => write!(f, "{v:?}"),
            Boxed::Boolean(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeapObject {
    Instance { class: String, fields: Vec<(String, Value)> },
    List(Vec<Value>),
    /// Insertion ordered, like `LinkedHashMap`.
    Map(Vec<(Value, Value)>),
    Iterator { items: Vec<Value>, pos: usize },
    Array(Vec<Value>),
}

impl HeapObject {
    /// Internal name of the runtime class.
    pub fn class_name(&self) -> &str {
        match self {
            HeapObject::Instance { class, .. } => class,
            HeapObject::List(_) => "java/util/ArrayList",
            HeapObject::Map(_) => "java/util/LinkedHashMap",
            HeapObject::Iterator { .. } => "java/util/Iterator",
            HeapObject::Array(_) => "java/lang/Object",
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            HeapObject::Instance { fields, .. } => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}
