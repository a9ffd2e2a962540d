//! A small interpreter for emitted instruction sequences.
//!
//! Only the instructions and library calls call-site code produces are
//! supported. Classes come from the same [`ClassTable`] code generation used;
//! instances store their fields by name, and the `java.util` collections are
//! built-in heap objects.

pub mod value;

use std::collections::HashMap;

use thiserror::Error;

use crate::codegen::descriptor::{arg_count, returns_void};
use crate::codegen::insn::{Insn, InvokeKind, Label, LdcValue, MemberRef};
use crate::config::CodegenOptions;
use crate::typeck::{ClassId, ClassTable, Primitive};

pub use value::{Boxed, HeapObject, ObjRef, Value};

/// Default bound on executed instructions per [`Vm::run`].
pub const DEFAULT_STEP_LIMIT: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    #[error("null pointer dereference in {0}")]
    NullPointer(String),
    #[error("cannot cast {value} to {target}")]
    ClassCast { value: String, target: String },
    #[error("no such field: {0}")]
    NoSuchField(String),
    #[error("no such method: {0}")]
    NoSuchMethod(String),
    #[error("operand stack underflow at instruction {0}")]
    StackUnderflow(usize),
    #[error("unknown label L{0}")]
    UnknownLabel(u32),
    #[error("type error: {0}")]
    Type(String),
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("step limit of {0} instructions exceeded")]
    StepLimit(usize),
    #[error("local {0} read before it was stored")]
    UnsetLocal(u16),
}

/// Host implementation of a library method. Receives the receiver (if any)
/// followed by the arguments; returns `None` for `void`.
pub type NativeFn = fn(&mut Vm<'_>, Vec<Value>) -> Result<Option<Value>, VmError>;

pub struct Vm<'t> {
    table: &'t ClassTable,
    heap: Vec<HeapObject>,
    statics: HashMap<(String, String), Value>,
    natives: HashMap<(String, String), NativeFn>,
    step_limit: usize,
}

impl<'t> Vm<'t> {
    /// A VM with the runtime helpers `options` points generated code at.
    pub fn new(table: &'t ClassTable, options: &CodegenOptions) -> Self {
        let mut vm = Self {
            table,
            heap: Vec::new(),
            statics: HashMap::new(),
            natives: HashMap::new(),
            step_limit: DEFAULT_STEP_LIMIT,
        };
        let helpers = &options.number_helper_package;
        vm.register_native(&format!("{helpers}/NumberNumberPlus"), "plus", number_plus);
        vm.register_native(&format!("{helpers}/NumberNumberMinus"), "minus", number_minus);
        vm.register_native(&format!("{helpers}/NumberNumberMultiply"), "multiply", number_multiply);
        vm.register_native(&format!("{helpers}/NumberNumberDiv"), "div", number_div);
        let extensions = &options.extension_owner;
        vm.register_native(extensions, "power", power);
        vm.register_native(extensions, "plus", string_plus);
        vm.register_native(extensions, "getAt", get_at);
        vm
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// Bind `owner.name` (internal owner name) to a host function. Later
    /// registrations replace earlier ones.
    pub fn register_native(&mut self, owner: &str, name: &str, native: NativeFn) {
        self.natives.insert((owner.to_string(), name.to_string()), native);
    }

    pub fn set_static(&mut self, owner: &str, name: &str, value: Value) {
        self.statics.insert((owner.to_string(), name.to_string()), value);
    }

    pub fn get_static(&self, owner: &str, name: &str) -> Option<&Value> {
        self.statics.get(&(owner.to_string(), name.to_string()))
    }

    // ---- heap ----

    pub fn alloc(&mut self, object: HeapObject) -> Value {
        self.heap.push(object);
        Value::Ref(ObjRef(self.heap.len() - 1))
    }

    pub fn new_instance(&mut self, class: &str, fields: Vec<(String, Value)>) -> Value {
        self.alloc(HeapObject::Instance { class: class.to_string(), fields })
    }

    pub fn new_list(&mut self, items: Vec<Value>) -> Value {
        self.alloc(HeapObject::List(items))
    }

    pub fn new_map(&mut self, entries: Vec<(Value, Value)>) -> Value {
        self.alloc(HeapObject::Map(entries))
    }

    pub fn new_array(&mut self, items: Vec<Value>) -> Value {
        self.alloc(HeapObject::Array(items))
    }

    pub fn object(&self, r: ObjRef) -> Option<&HeapObject> {
        self.heap.get(r.0)
    }

    fn object_mut(&mut self, r: ObjRef) -> Result<&mut HeapObject, VmError> {
        self.heap
            .get_mut(r.0)
            .ok_or_else(|| VmError::Type(format!("dangling reference #{}", r.0)))
    }

    fn deref(&self, value: &Value, context: &str) -> Result<(ObjRef, &HeapObject), VmError> {
        match value {
            Value::Ref(r) => self
                .object(*r)
                .map(|o| (*r, o))
                .ok_or_else(|| VmError::Type(format!("dangling reference #{}", r.0))),
            Value::Null => Err(VmError::NullPointer(context.to_string())),
            other => Err(VmError::Type(format!("{context}: expected an object, got {}", other.kind()))),
        }
    }

    /// Groovy-style text of a value: lists as `[a, b]`, maps as `[k:v]`.
    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::Double(v) => format!("{v:?}"),
            Value::Str(s) => s.clone(),
            Value::Boxed(b) => b.to_string(),
            Value::Class(name) => name.replace('/', "."),
            Value::Ref(r) => match self.object(*r) {
                Some(HeapObject::List(items) | HeapObject::Array(items)) => {
                    let parts: Vec<String> = items.iter().map(|v| self.render(v)).collect();
                    format!("[{}]", parts.join(", "))
                }
                Some(HeapObject::Map(entries)) => {
                    let parts: Vec<String> =
                        entries.iter().map(|(k, v)| format!("{}:{}", self.render(k), self.render(v))).collect();
                    format!("[{}]", parts.join(", "))
                }
                Some(HeapObject::Instance { class, .. }) => format!("{}@{}", class.replace('/', "."), r.0),
                Some(HeapObject::Iterator { .. }) => format!("java.util.Iterator@{}", r.0),
                None => format!("<dangling #{}>", r.0),
            },
        }
    }

    // ---- execution ----

    /// Execute `insns` with the given local slots and return the value left on
    /// top of the stack, `null` when the stack ends empty.
    pub fn run(&mut self, insns: &[Insn], locals: Vec<Value>) -> Result<Value, VmError> {
        let labels: HashMap<Label, usize> = insns
            .iter()
            .enumerate()
            .filter_map(|(pc, insn)| match insn {
                Insn::Label(l) => Some((*l, pc)),
                _ => None,
            })
            .collect();
        let jump = |label: &Label| labels.get(label).copied().ok_or(VmError::UnknownLabel(label.0));

        let mut locals: Vec<Option<Value>> = locals.into_iter().map(Some).collect();
        let mut stack: Vec<Value> = Vec::new();
        let mut pc = 0;
        let mut steps = 0;

        while let Some(insn) = insns.get(pc) {
            steps += 1;
            if steps > self.step_limit {
                return Err(VmError::StepLimit(self.step_limit));
            }
            tracing::trace!(pc, %insn, depth = stack.len(), "exec");
            let at = pc;
            pc += 1;
            let pop = move |stack: &mut Vec<Value>| stack.pop().ok_or(VmError::StackUnderflow(at));

            match insn {
                Insn::Label(_) => {}
                Insn::AconstNull => stack.push(Value::Null),
                Insn::Ldc(constant) => stack.push(match constant {
                    LdcValue::Int(v) => Value::Int(*v),
                    LdcValue::Long(v) => Value::Long(*v),
                    LdcValue::Double(v) => Value::Double(*v),
                    LdcValue::Str(s) => Value::Str(s.clone()),
                    LdcValue::Type(desc) => Value::Class(class_name_of(desc)),
                }),
                Insn::Load(_, slot) => {
                    let value = locals
                        .get(usize::from(*slot))
                        .and_then(Option::as_ref)
                        .ok_or(VmError::UnsetLocal(*slot))?;
                    stack.push(value.clone());
                }
                Insn::Store(_, slot) => {
                    let value = pop(&mut stack)?;
                    let slot = usize::from(*slot);
                    if locals.len() <= slot {
                        locals.resize(slot + 1, None);
                    }
                    locals[slot] = Some(value);
                }
                Insn::New(owner) => {
                    let object = match owner.as_str() {
                        "java/util/ArrayList" => HeapObject::List(Vec::new()),
                        "java/util/LinkedHashMap" | "java/util/HashMap" => HeapObject::Map(Vec::new()),
                        _ => HeapObject::Instance { class: owner.clone(), fields: Vec::new() },
                    };
                    let r = self.alloc(object);
                    stack.push(r);
                }
                Insn::Dup => {
                    let top = stack.last().cloned().ok_or(VmError::StackUnderflow(at))?;
                    stack.push(top);
                }
                Insn::Pop => {
                    pop(&mut stack)?;
                }
                Insn::CheckCast(target) => {
                    let top = stack.last().ok_or(VmError::StackUnderflow(at))?;
                    if !self.instance_of(top, target) {
                        return Err(VmError::ClassCast { value: self.render(top), target: target.clone() });
                    }
                }
                Insn::GetField(m) => {
                    let receiver = pop(&mut stack)?;
                    let (_, object) = self.deref(&receiver, &format!("getfield {}.{}", m.owner, m.name))?;
                    let value = object
                        .field(&m.name)
                        .cloned()
                        .ok_or_else(|| VmError::NoSuchField(format!("{}.{}", m.owner, m.name)))?;
                    stack.push(value);
                }
                Insn::GetStatic(m) => {
                    let value = self
                        .get_static(&m.owner, &m.name)
                        .cloned()
                        .ok_or_else(|| VmError::NoSuchField(format!("{}.{}", m.owner, m.name)))?;
                    stack.push(value);
                }
                Insn::Invoke(kind, m) => {
                    let receiver = usize::from(*kind != InvokeKind::Static);
                    let count = arg_count(&m.desc) + receiver;
                    if stack.len() < count {
                        return Err(VmError::StackUnderflow(at));
                    }
                    let args = stack.split_off(stack.len() - count);
                    let result = self.invoke(*kind, m, args)?;
                    if !returns_void(&m.desc) {
                        stack.push(result.unwrap_or(Value::Null));
                    }
                }
                Insn::ArrayLength => {
                    let array = pop(&mut stack)?;
                    match self.deref(&array, "arraylength")? {
                        (_, HeapObject::Array(items)) => stack.push(Value::Int(items.len() as i32)),
                        _ => return Err(VmError::Type("arraylength on a non-array".to_string())),
                    }
                }
                Insn::ArrayLoad(_) => {
                    let index = pop(&mut stack)?;
                    let array = pop(&mut stack)?;
                    let Value::Int(index) = index else {
                        return Err(VmError::Type(format!("array index must be an int, got {}", index.kind())));
                    };
                    let (_, HeapObject::Array(items)) = self.deref(&array, "array load")? else {
                        return Err(VmError::Type("array load on a non-array".to_string()));
                    };
                    let element = usize::try_from(index)
                        .ok()
                        .and_then(|i| items.get(i))
                        .cloned()
                        .ok_or(VmError::IndexOutOfBounds { index: i64::from(index), len: items.len() })?;
                    stack.push(element);
                }
                Insn::Convert(_, to) => {
                    let value = pop(&mut stack)?;
                    let Some(n) = value.as_number() else {
                        return Err(VmError::Type(format!("cannot convert {} to {}", value.kind(), to.name())));
                    };
                    stack.push(primitive_value(n, *to));
                }
                Insn::IfEq(label) => {
                    let value = pop(&mut stack)?;
                    if value == Value::Int(0) {
                        pc = jump(label)?;
                    }
                }
                Insn::IfNull(label) => {
                    if pop(&mut stack)?.is_null() {
                        pc = jump(label)?;
                    }
                }
                Insn::Goto(label) => pc = jump(label)?,
            }
        }

        tracing::debug!(steps, depth = stack.len(), "vm run finished");
        Ok(stack.pop().unwrap_or(Value::Null))
    }

    fn invoke(&mut self, kind: InvokeKind, m: &MemberRef, args: Vec<Value>) -> Result<Option<Value>, VmError> {
        if kind == InvokeKind::Special && m.name == "<init>" {
            return self.construct(m, args);
        }
        if let Some(native) = self.natives.get(&(m.owner.clone(), m.name.clone())).copied() {
            return native(self, args);
        }
        match kind {
            InvokeKind::Static => self.invoke_static(m, args),
            _ => self.invoke_virtual(m, args),
        }
    }

    /// Constructors of built-in collections take an optional capacity; user
    /// classes start with no fields.
    fn construct(&mut self, m: &MemberRef, args: Vec<Value>) -> Result<Option<Value>, VmError> {
        let receiver = args.first().cloned().unwrap_or(Value::Null);
        self.deref(&receiver, &format!("{}.<init>", m.owner))?;
        Ok(None)
    }

    fn invoke_static(&mut self, m: &MemberRef, args: Vec<Value>) -> Result<Option<Value>, VmError> {
        if m.name == "valueOf" {
            if let Some(boxed) = args.first().and_then(|v| box_as(&m.owner, v)) {
                return Ok(Some(Value::Boxed(boxed)));
            }
        }

        if let Some(field) = self.bridged_field(m) {
            let value = match args.first() {
                Some(Value::Null) | None => self.get_static(&m.owner, &field).cloned(),
                Some(receiver) => {
                    let (_, object) = self.deref(receiver, &format!("{}.{}", m.owner, m.name))?;
                    object.field(&field).cloned()
                }
            };
            return value
                .map(Some)
                .ok_or_else(|| VmError::NoSuchField(format!("{}.{field}", m.owner)));
        }

        if args.is_empty() {
            if let Some(property) = property_of(&m.name) {
                if let Some(value) = self.get_static(&m.owner, &property) {
                    return Ok(Some(value.clone()));
                }
            }
        }
        Err(VmError::NoSuchMethod(format!("{}.{}{}", m.owner, m.name, m.desc)))
    }

    fn bridged_field(&self, m: &MemberRef) -> Option<String> {
        let class = self.class_id(&m.owner)?;
        self.table
            .get(class)
            .bridge_accessors
            .iter()
            .find(|(_, accessor)| accessor.name == m.name)
            .map(|(field, _)| field.clone())
    }

    fn invoke_virtual(&mut self, m: &MemberRef, mut args: Vec<Value>) -> Result<Option<Value>, VmError> {
        let context = format!("{}.{}", m.owner, m.name);
        if args.is_empty() {
            return Err(VmError::StackUnderflow(0));
        }
        let receiver = args.remove(0);
        let name = m.name.as_str();

        match (&receiver, name) {
            (Value::Null, _) => return Err(VmError::NullPointer(context)),
            (_, "getClass") => return Ok(Some(Value::Class(self.runtime_class(&receiver)))),
            (_, "toString") => return Ok(Some(Value::Str(self.render(&receiver)))),
            (Value::Boxed(b), _) => {
                return unbox(*b, name).map(Some).ok_or_else(|| VmError::NoSuchMethod(context));
            }
            (Value::Str(s), "length") => return Ok(Some(Value::Int(s.chars().count() as i32))),
            (Value::Str(s), "isEmpty") => return Ok(Some(Value::Int(i32::from(s.is_empty())))),
            (Value::Class(c), "getName") => return Ok(Some(Value::Str(c.replace('/', ".")))),
            (Value::Class(c), "getSimpleName") => {
                let simple = c.rsplit('/').next().unwrap_or(c);
                return Ok(Some(Value::Str(simple.to_string())));
            }
            _ => {}
        }

        let (r, object) = self.deref(&receiver, &context)?;
        match (object, name) {
            (HeapObject::List(items), "size") | (HeapObject::Array(items), "size") => {
                Ok(Some(Value::Int(items.len() as i32)))
            }
            (HeapObject::List(items), "isEmpty") => Ok(Some(Value::Int(i32::from(items.is_empty())))),
            (HeapObject::List(items), "get") => {
                let index = int_arg(&args, 0)?;
                let item = list_item(items, index)?;
                Ok(Some(item))
            }
            (HeapObject::List(items), "iterator") => {
                let items = items.clone();
                Ok(Some(self.alloc(HeapObject::Iterator { items, pos: 0 })))
            }
            (HeapObject::List(_), "add") => {
                let item = args.into_iter().next().unwrap_or(Value::Null);
                if let HeapObject::List(items) = self.object_mut(r)? {
                    items.push(item);
                }
                Ok(Some(Value::Int(1)))
            }
            (HeapObject::Map(entries), "get") => {
                let key = args.first().cloned().unwrap_or(Value::Null);
                Ok(Some(map_get(entries, &key)))
            }
            (HeapObject::Map(entries), "size") => Ok(Some(Value::Int(entries.len() as i32))),
            (HeapObject::Map(entries), "isEmpty") => Ok(Some(Value::Int(i32::from(entries.is_empty())))),
            (HeapObject::Iterator { items, pos }, "hasNext") => Ok(Some(Value::Int(i32::from(*pos < items.len())))),
            (HeapObject::Iterator { .. }, "next") => {
                let HeapObject::Iterator { items, pos } = self.object_mut(r)? else {
                    return Err(VmError::Type(context));
                };
                let item = items
                    .get(*pos)
                    .cloned()
                    .ok_or(VmError::IndexOutOfBounds { index: *pos as i64, len: items.len() })?;
                *pos += 1;
                Ok(Some(item))
            }
            (HeapObject::Instance { .. }, "getProperty") => {
                let Some(Value::Str(property)) = args.first() else {
                    return Err(VmError::Type("getProperty expects a String name".to_string()));
                };
                object
                    .field(property)
                    .cloned()
                    .map(Some)
                    .ok_or_else(|| VmError::NoSuchField(format!("{}.{property}", object.class_name())))
            }
            (HeapObject::Instance { .. }, _) if args.is_empty() => {
                // getters read the backing field; `name()`-style accessors read the field of the same name
                let field = property_of(name).unwrap_or_else(|| name.to_string());
                object
                    .field(&field)
                    .or_else(|| object.field(name))
                    .cloned()
                    .map(Some)
                    .ok_or_else(|| VmError::NoSuchMethod(format!("{context}{}", m.desc)))
            }
            _ => Err(VmError::NoSuchMethod(format!("{context}{}", m.desc))),
        }
    }

    // ---- types ----

    fn class_id(&self, internal: &str) -> Option<ClassId> {
        self.table.lookup(&internal.replace('/', "."))
    }

    fn runtime_class(&self, value: &Value) -> String {
        match value {
            Value::Null => "java/lang/Object".to_string(),
            Value::Int(_) => "java/lang/Integer".to_string(),
            Value::Long(_) => "java/lang/Long".to_string(),
            Value::Double(_) => "java/lang/Double".to_string(),
            Value::Str(_) => "java/lang/String".to_string(),
            Value::Boxed(b) => b.class_name().to_string(),
            Value::Class(_) => "java/lang/Class".to_string(),
            Value::Ref(r) => self.object(*r).map_or("java/lang/Object", HeapObject::class_name).to_string(),
        }
    }

    /// `checkcast` semantics. Classes the table does not know are accepted.
    fn instance_of(&self, value: &Value, target: &str) -> bool {
        match value {
            Value::Null => return true,
            Value::Int(_) | Value::Long(_) | Value::Double(_) => return false,
            Value::Ref(r) => {
                if let Some(HeapObject::Array(_)) = self.object(*r) {
                    return target.starts_with('[') || target == "java/lang/Object";
                }
            }
            _ => {}
        }
        let runtime = self.runtime_class(value);
        if runtime == target || target == "java/lang/Object" {
            return true;
        }
        match (self.class_id(&runtime), self.class_id(target)) {
            (Some(rt), Some(t)) => self.table.is_derived_from(rt, t) || self.table.implements_interface(rt, t),
            _ => true,
        }
    }
}

/// Internal class name from an `ldc` type descriptor.
fn class_name_of(desc: &str) -> String {
    match desc.strip_prefix('L').and_then(|d| d.strip_suffix(';')) {
        Some(name) => name.to_string(),
        None => match desc.chars().next().filter(|_| desc.len() == 1) {
            Some(c) => primitive_of_descriptor(c).map_or(desc.to_string(), |p| p.name().to_string()),
            None => desc.to_string(),
        },
    }
}

fn primitive_of_descriptor(c: char) -> Option<Primitive> {
    Some(match c {
        'Z' => Primitive::Boolean,
        'B' => Primitive::Byte,
        'C' => Primitive::Char,
        'S' => Primitive::Short,
        'I' => Primitive::Int,
        'J' => Primitive::Long,
        'F' => Primitive::Float,
        'D' => Primitive::Double,
        _ => return None,
    })
}

/// Bean property read by a getter name: `getName` -> `name`, `isActive` -> `active`,
/// `getURL` -> `URL`.
pub fn property_of(method: &str) -> Option<String> {
    let rest = method.strip_prefix("get").or_else(|| method.strip_prefix("is"))?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    if chars.next().is_some_and(char::is_uppercase) {
        return Some(rest.to_string());
    }
    let mut out = first.to_lowercase().collect::<String>();
    out.push_str(&rest[first.len_utf8()..]);
    Some(out)
}

fn primitive_value(n: Boxed, to: Primitive) -> Value {
    match to {
        Primitive::Long => Value::Long(n.as_i64()),
        Primitive::Float | Primitive::Double => Value::Double(n.as_f64()),
        _ => Value::Int(n.as_i64() as i32),
    }
}

fn box_as(owner: &str, value: &Value) -> Option<Boxed> {
    let n = match value {
        Value::Int(v) => Boxed::Integer(*v),
        Value::Long(v) => Boxed::Long(*v),
        Value::Double(v) => Boxed::Double(*v),
        _ => return None,
    };
    Some(match owner {
        "java/lang/Boolean" => Boxed::Boolean(n.as_i64() != 0),
        "java/lang/Long" => Boxed::Long(n.as_i64()),
        "java/lang/Double" | "java/lang/Float" => Boxed::Double(n.as_f64()),
        _ => Boxed::Integer(n.as_i64() as i32),
    })
}

fn unbox(b: Boxed, method: &str) -> Option<Value> {
    Some(match (b, method) {
        (Boxed::Boolean(v), "booleanValue") => Value::Int(i32::from(v)),
        (Boxed::Boolean(_), _) => return None,
        (_, "intValue" | "shortValue" | "byteValue" | "charValue") => Value::Int(b.as_i64() as i32),
        (_, "longValue") => Value::Long(b.as_i64()),
        (_, "doubleValue" | "floatValue") => Value::Double(b.as_f64()),
        _ => return None,
    })
}

fn int_arg(args: &[Value], i: usize) -> Result<i64, VmError> {
    match args.get(i).and_then(Value::as_number) {
        Some(n) => Ok(n.as_i64()),
        None => Err(VmError::Type(format!("argument {i} must be a number"))),
    }
}

/// Element at `index`; negative indices count from the end.
fn list_item(items: &[Value], index: i64) -> Result<Value, VmError> {
    let len = items.len() as i64;
    let resolved = if index < 0 { index + len } else { index };
    usize::try_from(resolved)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or(VmError::IndexOutOfBounds { index, len: items.len() })
}

fn map_get(entries: &[(Value, Value)], key: &Value) -> Value {
    entries.iter().find(|(k, _)| k == key).map_or(Value::Null, |(_, v)| v.clone())
}

// ---- runtime helpers ----

fn number_pair(args: &[Value], op: &str) -> Result<(Boxed, Boxed), VmError> {
    match (args.first(), args.get(1)) {
        (Some(Value::Null), _) | (_, Some(Value::Null)) => Err(VmError::NullPointer(op.to_string())),
        (Some(a), Some(b)) => match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(VmError::Type(format!("{op} expects two numbers"))),
        },
        _ => Err(VmError::Type(format!("{op} expects two arguments"))),
    }
}

fn arithmetic(
    args: &[Value],
    op: &str,
    int: impl Fn(i64, i64) -> Option<i64>,
    float: impl Fn(f64, f64) -> f64,
) -> Result<Option<Value>, VmError> {
    let (a, b) = number_pair(args, op)?;
    value::widen(a, b, int, float)
        .map(|n| Some(Value::Boxed(n)))
        .ok_or_else(|| VmError::Arithmetic(format!("{op} overflow")))
}

fn number_plus(_: &mut Vm<'_>, args: Vec<Value>) -> Result<Option<Value>, VmError> {
    arithmetic(&args, "plus", i64::checked_add, |a, b| a + b)
}

fn number_minus(_: &mut Vm<'_>, args: Vec<Value>) -> Result<Option<Value>, VmError> {
    arithmetic(&args, "minus", i64::checked_sub, |a, b| a - b)
}

fn number_multiply(_: &mut Vm<'_>, args: Vec<Value>) -> Result<Option<Value>, VmError> {
    arithmetic(&args, "multiply", i64::checked_mul, |a, b| a * b)
}

/// Division of two integral numbers yields a BigDecimal.
fn number_div(_: &mut Vm<'_>, args: Vec<Value>) -> Result<Option<Value>, VmError> {
    let (a, b) = number_pair(&args, "div")?;
    if b.as_f64() == 0.0 && !matches!(b, Boxed::Double(_)) {
        return Err(VmError::Arithmetic("division by zero".to_string()));
    }
    let quotient = a.as_f64() / b.as_f64();
    let result = match (a, b) {
        (Boxed::Double(_), _) | (_, Boxed::Double(_)) => Boxed::Double(quotient),
        _ => Boxed::BigDecimal(quotient),
    };
    Ok(Some(Value::Boxed(result)))
}

fn power(_: &mut Vm<'_>, args: Vec<Value>) -> Result<Option<Value>, VmError> {
    let (base, exponent) = number_pair(&args, "power")?;
    let integral_exponent = matches!(exponent, Boxed::Integer(_));
    let result = match base {
        Boxed::BigDecimal(v) if integral_exponent => Boxed::BigDecimal(v.powi(exponent.as_i64() as i32)),
        Boxed::Integer(_) | Boxed::Long(_) | Boxed::BigInteger(_) if integral_exponent && exponent.as_i64() >= 0 => {
            let exp = u32::try_from(exponent.as_i64()).map_err(|_| VmError::Arithmetic("power overflow".to_string()))?;
            let v = base
                .as_i64()
                .checked_pow(exp)
                .ok_or_else(|| VmError::Arithmetic("power overflow".to_string()))?;
            match base {
                Boxed::BigInteger(_) => Boxed::BigInteger(v),
                Boxed::Integer(_) => i32::try_from(v).map_or(Boxed::Long(v), Boxed::Integer),
                _ => Boxed::Long(v),
            }
        }
        _ => Boxed::Double(base.as_f64().powf(exponent.as_f64())),
    };
    Ok(Some(Value::Boxed(result)))
}

fn string_plus(vm: &mut Vm<'_>, args: Vec<Value>) -> Result<Option<Value>, VmError> {
    let mut args = args.into_iter();
    let left = match args.next() {
        Some(Value::Str(s)) => s,
        Some(Value::Null) => return Err(VmError::NullPointer("String.plus".to_string())),
        Some(other) => return Err(VmError::Type(format!("String.plus on {}", other.kind()))),
        None => return Err(VmError::Type("String.plus expects two arguments".to_string())),
    };
    let right = args.next().unwrap_or(Value::Null);
    Ok(Some(Value::Str(left + &vm.render(&right))))
}

fn get_at(vm: &mut Vm<'_>, args: Vec<Value>) -> Result<Option<Value>, VmError> {
    let receiver = args.first().cloned().unwrap_or(Value::Null);
    if let Value::Str(s) = &receiver {
        let chars: Vec<Value> = s.chars().map(|c| Value::Str(c.to_string())).collect();
        return list_item(&chars, int_arg(&args, 1)?).map(Some);
    }
    match vm.deref(&receiver, "getAt")? {
        (_, HeapObject::List(items)) => list_item(items, int_arg(&args, 1)?).map(Some),
        (_, HeapObject::Map(entries)) => Ok(Some(map_get(entries, args.get(1).unwrap_or(&Value::Null)))),
        (_, other) => Err(VmError::NoSuchMethod(format!("getAt on {}", other.class_name()))),
    }
}
