use std::collections::{HashMap, HashSet};

use crate::diagnostics::CompileError;
use super::types::{ClassId, JvmType, Primitive};

/// Classes every table starts with. Ids are fixed so they can be named as constants.
pub mod known {
    use super::ClassId;

    pub const OBJECT: ClassId = ClassId(0);
    pub const CLASS: ClassId = ClassId(1);
    pub const STRING: ClassId = ClassId(2);
    pub const NUMBER: ClassId = ClassId(3);
    pub const INTEGER: ClassId = ClassId(4);
    pub const LONG: ClassId = ClassId(5);
    pub const SHORT: ClassId = ClassId(6);
    pub const BYTE: ClassId = ClassId(7);
    pub const FLOAT: ClassId = ClassId(8);
    pub const DOUBLE: ClassId = ClassId(9);
    pub const CHARACTER: ClassId = ClassId(10);
    pub const BOOLEAN: ClassId = ClassId(11);
    pub const BIG_INTEGER: ClassId = ClassId(12);
    pub const BIG_DECIMAL: ClassId = ClassId(13);
    pub const ITERABLE: ClassId = ClassId(14);
    pub const COLLECTION: ClassId = ClassId(15);
    pub const LIST: ClassId = ClassId(16);
    pub const ARRAY_LIST: ClassId = ClassId(17);
    pub const MAP: ClassId = ClassId(18);
    pub const LINKED_HASH_MAP: ClassId = ClassId(19);
    pub const ITERATOR: ClassId = ClassId(20);
    pub const GROOVY_OBJECT: ClassId = ClassId(21);
    pub const ENUM: ClassId = ClassId(22);
    pub const EXTENSIONS: ClassId = ClassId(23);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub owner: ClassId,
    pub ty: JvmType,
    pub is_static: bool,
    pub visibility: Visibility,
}

impl FieldInfo {
    /// A public instance field. `owner` is filled in by [`ClassTable::add_field`].
    pub fn new(name: impl Into<String>, ty: JvmType) -> Self {
        Self { name: name.into(), owner: known::OBJECT, ty, is_static: false, visibility: Visibility::Public }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub owner: ClassId,
    pub params: Vec<JvmType>,
    pub ret: JvmType,
    pub is_static: bool,
    pub visibility: Visibility,
    /// Not declared in source: property getters synthesised during selection, bridge accessors.
    pub synthetic: bool,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, params: Vec<JvmType>, ret: JvmType) -> Self {
        Self {
            name: name.into(),
            owner: known::OBJECT,
            params,
            ret,
            is_static: false,
            visibility: Visibility::Public,
            synthetic: false,
        }
    }

    pub fn getter(name: impl Into<String>, ret: JvmType) -> Self {
        Self::new(name, Vec::new(), ret)
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A declared property whose getter may not have been generated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: JvmType,
    pub is_static: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, ty: JvmType) -> Self {
        Self { name: name.into(), ty, is_static: false }
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassKind,
    pub superclass: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub outer: Option<ClassId>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub properties: Vec<PropertyInfo>,
    /// field name → generated static accessor
    pub bridge_accessors: Vec<(String, MethodInfo)>,
    pub unit: u32,
    /// The class is a closure body used as the argument of `with { }`.
    pub with_closure: bool,
}

impl ClassInfo {
    fn new(name: &str, kind: ClassKind, superclass: Option<ClassId>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            superclass,
            interfaces: Vec::new(),
            outer: None,
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            bridge_accessors: Vec::new(),
            unit: 0,
            with_closure: false,
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    pub fn internal_name(&self) -> String {
        self.name.replace('.', "/")
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }
}

/// The nominal type universe code generation runs against.
#[derive(Debug)]
pub struct ClassTable {
    classes: Vec<ClassInfo>,
    by_name: HashMap<String, ClassId>,
    extensions: Vec<MethodInfo>,
    bridge_pairs: HashSet<(ClassId, ClassId)>,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTable {
    pub fn new() -> Self {
        let mut table = Self {
            classes: Vec::new(),
            by_name: HashMap::new(),
            extensions: Vec::new(),
            bridge_pairs: HashSet::new(),
        };
        table.register_builtins();
        table
    }

    fn push_builtin(&mut self, expected: ClassId, name: &str, kind: ClassKind, superclass: Option<ClassId>) {
        let id = ClassId(self.classes.len() as u32);
        debug_assert_eq!(id, expected, "builtin {name} registered out of order");
        self.by_name.insert(name.to_string(), id);
        self.classes.push(ClassInfo::new(name, kind, superclass));
    }

    fn register_builtins(&mut self) {
        use known::*;
        use ClassKind::{Class, Interface};
        let obj = Some(OBJECT);

        self.push_builtin(OBJECT, "java.lang.Object", Class, None);
        self.push_builtin(CLASS, "java.lang.Class", Class, obj);
        self.push_builtin(STRING, "java.lang.String", Class, obj);
        self.push_builtin(NUMBER, "java.lang.Number", Class, obj);
        self.push_builtin(INTEGER, "java.lang.Integer", Class, Some(NUMBER));
        self.push_builtin(LONG, "java.lang.Long", Class, Some(NUMBER));
        self.push_builtin(SHORT, "java.lang.Short", Class, Some(NUMBER));
        self.push_builtin(BYTE, "java.lang.Byte", Class, Some(NUMBER));
        self.push_builtin(FLOAT, "java.lang.Float", Class, Some(NUMBER));
        self.push_builtin(DOUBLE, "java.lang.Double", Class, Some(NUMBER));
        self.push_builtin(CHARACTER, "java.lang.Character", Class, obj);
        self.push_builtin(BOOLEAN, "java.lang.Boolean", Class, obj);
        self.push_builtin(BIG_INTEGER, "java.math.BigInteger", Class, Some(NUMBER));
        self.push_builtin(BIG_DECIMAL, "java.math.BigDecimal", Class, Some(NUMBER));
        self.push_builtin(ITERABLE, "java.lang.Iterable", Interface, obj);
        self.push_builtin(COLLECTION, "java.util.Collection", Interface, obj);
        self.push_builtin(LIST, "java.util.List", Interface, obj);
        self.push_builtin(ARRAY_LIST, "java.util.ArrayList", Class, obj);
        self.push_builtin(MAP, "java.util.Map", Interface, obj);
        self.push_builtin(LINKED_HASH_MAP, "java.util.LinkedHashMap", Class, obj);
        self.push_builtin(ITERATOR, "java.util.Iterator", Interface, obj);
        self.push_builtin(GROOVY_OBJECT, "groovy.lang.GroovyObject", Interface, obj);
        self.push_builtin(ENUM, "java.lang.Enum", Class, obj);
        self.push_builtin(EXTENSIONS, "org.codehaus.groovy.runtime.DefaultGroovyMethods", Class, obj);

        self.classes[COLLECTION.0 as usize].interfaces.push(ITERABLE);
        self.classes[LIST.0 as usize].interfaces.push(COLLECTION);
        self.classes[ARRAY_LIST.0 as usize].interfaces.push(LIST);
        self.classes[LINKED_HASH_MAP.0 as usize].interfaces.push(MAP);

        let string = JvmType::object(STRING);
        let object = JvmType::object(OBJECT);
        let wildcard_class = JvmType::generic(CLASS, vec![JvmType::TypeVar("?".to_string())]);

        self.add_method(OBJECT, MethodInfo::getter("getClass", wildcard_class));
        self.add_method(OBJECT, MethodInfo::getter("hashCode", JvmType::int()));
        self.add_method(OBJECT, MethodInfo::getter("toString", string.clone()));
        self.add_method(CLASS, MethodInfo::getter("getName", string.clone()));
        self.add_method(CLASS, MethodInfo::getter("getSimpleName", string.clone()));
        self.add_method(CLASS, MethodInfo::getter("isInterface", JvmType::boolean()));
        self.add_method(STRING, MethodInfo::getter("length", JvmType::int()));
        self.add_method(STRING, MethodInfo::getter("isEmpty", JvmType::boolean()));
        self.add_method(NUMBER, MethodInfo::getter("intValue", JvmType::int()));
        self.add_method(NUMBER, MethodInfo::getter("longValue", JvmType::Prim(Primitive::Long)));
        self.add_method(NUMBER, MethodInfo::getter("doubleValue", JvmType::Prim(Primitive::Double)));
        self.add_method(ITERABLE, MethodInfo::getter("iterator", JvmType::object(ITERATOR)));
        self.add_method(COLLECTION, MethodInfo::getter("size", JvmType::int()));
        self.add_method(COLLECTION, MethodInfo::getter("isEmpty", JvmType::boolean()));
        self.add_method(COLLECTION, MethodInfo::new("add", vec![object.clone()], JvmType::boolean()));
        self.add_method(LIST, MethodInfo::new("get", vec![JvmType::int()], object.clone()));
        self.add_method(MAP, MethodInfo::new("get", vec![object.clone()], object.clone()));
        self.add_method(MAP, MethodInfo::getter("size", JvmType::int()));
        self.add_method(MAP, MethodInfo::getter("isEmpty", JvmType::boolean()));
        self.add_method(ITERATOR, MethodInfo::getter("hasNext", JvmType::boolean()));
        self.add_method(ITERATOR, MethodInfo::getter("next", object.clone()));
        self.add_method(GROOVY_OBJECT, MethodInfo::new("getProperty", vec![string.clone()], object.clone()));
        self.add_method(ENUM, MethodInfo::getter("name", string.clone()));
        self.add_method(ENUM, MethodInfo::getter("ordinal", JvmType::int()));

        self.add_extension_method(MethodInfo::new(
            "getAt",
            vec![JvmType::object(LIST), JvmType::int()],
            object.clone(),
        ));
        self.add_extension_method(MethodInfo::new(
            "getAt",
            vec![JvmType::object(MAP), object.clone()],
            object,
        ));
        self.add_extension_method(MethodInfo::new(
            "getAt",
            vec![string.clone(), JvmType::int()],
            string,
        ));
    }

    // ---- construction ----

    /// Declare a new class. Classes extend `java.lang.Object` (enums extend `java.lang.Enum`)
    /// until [`ClassTable::set_superclass`] says otherwise.
    pub fn declare(&mut self, name: &str, kind: ClassKind) -> Result<ClassId, CompileError> {
        if self.by_name.contains_key(name) {
            return Err(CompileError::hierarchy(format!("class '{name}' is declared twice")));
        }
        let superclass = match kind {
            ClassKind::Enum => known::ENUM,
            _ => known::OBJECT,
        };
        let id = ClassId(self.classes.len() as u32);
        self.by_name.insert(name.to_string(), id);
        self.classes.push(ClassInfo::new(name, kind, Some(superclass)));
        Ok(id)
    }

    /// Link `id` to `superclass`, rejecting links that would make the hierarchy cyclic.
    pub fn set_superclass(&mut self, id: ClassId, superclass: ClassId) -> Result<(), CompileError> {
        if self.superclass_chain(superclass).any(|c| c == id) {
            return Err(CompileError::hierarchy(format!(
                "cyclic inheritance: '{}' cannot extend '{}'",
                self.name(id),
                self.name(superclass),
            )));
        }
        self.classes[id.0 as usize].superclass = Some(superclass);
        Ok(())
    }

    pub fn add_interface(&mut self, id: ClassId, interface: ClassId) {
        let info = &mut self.classes[id.0 as usize];
        if !info.interfaces.contains(&interface) {
            info.interfaces.push(interface);
        }
    }

    /// Nest `id` inside `outer`; the outer chain must stay acyclic too.
    pub fn set_outer(&mut self, id: ClassId, outer: ClassId) -> Result<(), CompileError> {
        if self.outer_chain(outer).any(|c| c == id) {
            return Err(CompileError::hierarchy(format!(
                "cyclic nesting: '{}' cannot be nested in '{}'",
                self.name(id),
                self.name(outer),
            )));
        }
        self.classes[id.0 as usize].outer = Some(outer);
        Ok(())
    }

    pub fn set_unit(&mut self, id: ClassId, unit: u32) {
        self.classes[id.0 as usize].unit = unit;
    }

    pub fn mark_with_closure(&mut self, id: ClassId) {
        self.classes[id.0 as usize].with_closure = true;
    }

    pub fn add_field(&mut self, id: ClassId, mut field: FieldInfo) {
        field.owner = id;
        self.classes[id.0 as usize].fields.push(field);
    }

    pub fn add_method(&mut self, id: ClassId, mut method: MethodInfo) {
        method.owner = id;
        self.classes[id.0 as usize].methods.push(method);
    }

    pub fn add_property(&mut self, id: ClassId, property: PropertyInfo) {
        self.classes[id.0 as usize].properties.push(property);
    }

    /// Register the static accessor generated for the private field `field` of `id`.
    pub fn add_bridge_accessor(&mut self, id: ClassId, field: &str, mut accessor: MethodInfo) {
        accessor.owner = id;
        accessor.is_static = true;
        accessor.synthetic = true;
        self.classes[id.0 as usize].bridge_accessors.push((field.to_string(), accessor));
    }

    /// Allow bridge accessor calls between two otherwise unrelated classes.
    pub fn allow_bridge_calls(&mut self, a: ClassId, b: ClassId) {
        self.bridge_pairs.insert((a.min(b), a.max(b)));
    }

    /// Register an extension method. `params[0]` is the receiver ("self") type.
    pub fn add_extension_method(&mut self, mut method: MethodInfo) {
        method.owner = known::EXTENSIONS;
        method.is_static = true;
        self.extensions.push(method);
    }

    // ---- lookup ----

    pub fn get(&self, id: ClassId) -> &ClassInfo {
        &self.classes[id.0 as usize]
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ClassId) -> &str {
        &self.get(id).name
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn extensions(&self) -> &[MethodInfo] {
        &self.extensions
    }

    pub fn field(&self, id: ClassId, name: &str) -> Option<&FieldInfo> {
        self.get(id).fields.iter().find(|f| f.name == name)
    }

    pub fn property(&self, id: ClassId, name: &str) -> Option<&PropertyInfo> {
        self.get(id).properties.iter().find(|p| p.name == name)
    }

    /// Declared method by name with exactly these parameter types.
    pub fn declared_method(&self, id: ClassId, name: &str, params: &[JvmType]) -> Option<&MethodInfo> {
        self.get(id).methods.iter().find(|m| m.name == name && m.params == params)
    }

    /// Zero-argument, value-returning method named `getter_name` on `id` or a superclass.
    /// `is...` getters must return a primitive boolean.
    pub fn getter_method(&self, id: ClassId, getter_name: &str) -> Option<&MethodInfo> {
        let needs_boolean = getter_name.starts_with("is");
        for class in self.superclass_chain(id) {
            let found = self.get(class).methods.iter().find(|m| {
                m.name == getter_name
                    && m.params.is_empty()
                    && m.ret != JvmType::Void
                    && (!needs_boolean || m.ret == JvmType::boolean())
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    pub fn bridge_accessor(&self, id: ClassId, field: &str) -> Option<&MethodInfo> {
        self.get(id)
            .bridge_accessors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, m)| m)
    }

    /// Whether code in `caller` may call bridge accessors generated on `receiver`:
    /// same class, nested relationship, or an explicitly registered pair.
    pub fn bridge_calls_allowed(&self, receiver: ClassId, caller: ClassId) -> bool {
        if self.bridge_pairs.contains(&(receiver.min(caller), receiver.max(caller))) {
            return true;
        }
        self.nested_access(Some(receiver), caller)
    }

    fn nested_access(&self, receiver: Option<ClassId>, caller: ClassId) -> bool {
        let Some(receiver) = receiver else { return false };
        if receiver == caller {
            return true;
        }
        match self.get(caller).outer {
            Some(caller_outer) => {
                self.nested_access(Some(receiver), caller_outer)
                    || self.nested_access(self.get(receiver).outer, caller)
            }
            None => false,
        }
    }

    // ---- hierarchy ----

    pub fn super_class(&self, id: ClassId) -> Option<ClassId> {
        self.get(id).superclass
    }

    /// `id` followed by its superclasses, nearest first.
    pub fn superclass_chain(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(Some(id), move |c| self.get(*c).superclass)
    }

    /// `id` followed by its enclosing classes, innermost first.
    pub fn outer_chain(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(Some(id), move |c| self.get(*c).outer)
    }

    pub fn is_derived_from(&self, id: ClassId, ancestor: ClassId) -> bool {
        self.superclass_chain(id).any(|c| c == ancestor)
    }

    /// Every interface `id` implements, directly or through superclasses and
    /// super-interfaces, in discovery order. An interface includes itself.
    pub fn all_interfaces(&self, id: ClassId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for class in self.superclass_chain(id) {
            self.collect_interfaces(class, &mut out, &mut seen);
        }
        out
    }

    fn collect_interfaces(&self, class: ClassId, out: &mut Vec<ClassId>, seen: &mut HashSet<ClassId>) {
        let mut pending = vec![class];
        while let Some(current) = pending.pop() {
            let info = self.get(current);
            if info.is_interface() && seen.insert(current) {
                out.push(current);
            }
            // reversed so declaration order is preserved when popping
            for iface in info.interfaces.iter().rev() {
                if !seen.contains(iface) {
                    pending.push(*iface);
                }
            }
        }
    }

    pub fn implements_interface(&self, id: ClassId, interface: ClassId) -> bool {
        self.all_interfaces(id).contains(&interface)
    }

    /// The type is `capability` or derives from / implements it.
    pub fn has_capability(&self, ty: &JvmType, capability: ClassId) -> bool {
        match ty.class_id() {
            Some(id) => self.is_derived_from(id, capability) || self.implements_interface(id, capability),
            None => false,
        }
    }

    // ---- types ----

    pub fn wrapper(&self, ty: &JvmType) -> JvmType {
        match ty {
            JvmType::Prim(p) => JvmType::object(wrapper_class(*p)),
            other => other.clone(),
        }
    }

    /// Conversion cost from `from` to `to`, `None` when not assignable.
    /// Superclass steps cost 2, an interface adds 1, boxing adds 1.
    pub fn distance(&self, from: &JvmType, to: &JvmType) -> Option<u32> {
        match (from, to) {
            (JvmType::Void, JvmType::Void) => Some(0),
            (JvmType::Prim(a), JvmType::Prim(b)) => (a == b).then_some(0),
            (JvmType::Prim(p), _) => self
                .distance(&JvmType::object(wrapper_class(*p)), to)
                .map(|d| d + 1),
            (JvmType::Object { class, .. }, JvmType::Prim(p)) => {
                (*class == wrapper_class(*p)).then_some(1)
            }
            (JvmType::Object { class: a, .. }, JvmType::Object { class: b, .. }) => {
                self.class_distance(*a, *b)
            }
            (JvmType::Object { class, .. }, JvmType::TypeVar(_)) => {
                self.class_distance(*class, known::OBJECT)
            }
            (JvmType::Array(_), JvmType::Object { class, .. }) => {
                (*class == known::OBJECT).then_some(2)
            }
            (JvmType::Array(a), JvmType::Array(b)) => {
                if a == b {
                    Some(0)
                } else if a.is_reference() && b.is_reference() {
                    self.distance(a, b)
                } else {
                    None
                }
            }
            (JvmType::Array(_), JvmType::TypeVar(_)) => Some(2),
            (JvmType::TypeVar(_), JvmType::TypeVar(_)) => Some(0),
            (JvmType::TypeVar(_), JvmType::Object { class, .. }) => {
                (*class == known::OBJECT).then_some(0)
            }
            _ => None,
        }
    }

    pub fn is_assignable(&self, from: &JvmType, to: &JvmType) -> bool {
        self.distance(from, to).is_some()
    }

    /// Two per superclass step, one per super-interface hop from the level
    /// that reaches `to`. `java.lang.Object` ranks behind every interface.
    fn class_distance(&self, from: ClassId, to: ClassId) -> Option<u32> {
        if to == known::OBJECT && from != known::OBJECT {
            let depth = self.superclass_chain(from).position(|c| c == known::OBJECT)?;
            return Some(depth as u32 * 2 + self.all_interfaces(from).len() as u32 + 1);
        }
        let mut best: Option<u32> = None;
        for (depth, class) in self.superclass_chain(from).enumerate() {
            let base = depth as u32 * 2;
            if class == to {
                return Some(best.map_or(base, |b| b.min(base)));
            }
            if let Some(hops) = self.interface_hops(class, to) {
                let candidate = base + hops;
                best = Some(best.map_or(candidate, |b| b.min(candidate)));
            }
        }
        best
    }

    /// Fewest `interfaces` edges from `class` to the interface `target`.
    fn interface_hops(&self, class: ClassId, target: ClassId) -> Option<u32> {
        let mut seen = HashSet::from([class]);
        let mut frontier = vec![class];
        let mut hops = 0;
        while !frontier.is_empty() {
            hops += 1;
            let mut next = Vec::new();
            for current in frontier {
                for iface in &self.get(current).interfaces {
                    if *iface == target {
                        return Some(hops);
                    }
                    if seen.insert(*iface) {
                        next.push(*iface);
                    }
                }
            }
            frontier = next;
        }
        None
    }

    /// Human-readable type name used in diagnostics.
    pub fn describe(&self, ty: &JvmType) -> String {
        match ty {
            JvmType::Void => "void".to_string(),
            JvmType::Prim(p) => p.name().to_string(),
            JvmType::Object { class, args } if args.is_empty() => self.name(*class).to_string(),
            JvmType::Object { class, args } => {
                let args: Vec<String> = args.iter().map(|a| self.describe(a)).collect();
                format!("{}<{}>", self.name(*class), args.join(", "))
            }
            JvmType::Array(inner) => format!("{}[]", self.describe(inner)),
            JvmType::TypeVar(name) => name.clone(),
        }
    }
}

pub fn wrapper_class(p: Primitive) -> ClassId {
    match p {
        Primitive::Boolean => known::BOOLEAN,
        Primitive::Byte => known::BYTE,
        Primitive::Char => known::CHARACTER,
        Primitive::Short => known::SHORT,
        Primitive::Int => known::INTEGER,
        Primitive::Long => known::LONG,
        Primitive::Float => known::FLOAT,
        Primitive::Double => known::DOUBLE,
    }
}

/// Inverse of [`wrapper_class`].
pub fn unboxed(class: ClassId) -> Option<Primitive> {
    Some(match class {
        known::BOOLEAN => Primitive::Boolean,
        known::BYTE => Primitive::Byte,
        known::CHARACTER => Primitive::Char,
        known::SHORT => Primitive::Short,
        known::INTEGER => Primitive::Int,
        known::LONG => Primitive::Long,
        known::FLOAT => Primitive::Float,
        known::DOUBLE => Primitive::Double,
        _ => return None,
    })
}
