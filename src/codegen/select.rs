//! Choosing how a property access is compiled.
//!
//! Selection is an ordered table of named rules. Each rule inspects the access
//! site and the receiver type and either commits to an [`AccessStrategy`] or
//! declines; the first rule that commits wins. Rules only read the
//! [`TypeResolver`], so selecting twice for the same input gives the same answer.

use std::fmt;

use serde::Serialize;

use crate::ast::AccessSite;
use crate::typeck::{capitalize, known, ClassId, FieldInfo, JvmType, MethodInfo, TypeResolver, Visibility};

#[derive(Debug, Clone, PartialEq)]
pub enum AccessStrategy {
    /// `arraylength` on an array receiver.
    ArrayLength,
    /// `size`/`length` on a collection, compiled as `Collection.size()`.
    CollectionSize,
    GetterCall(MethodInfo),
    DirectField(FieldInfo),
    /// Call to the static accessor generated for a private field.
    BridgeAccessor { method: MethodInfo, field_static: bool },
    EnumConstant { owner: ClassId },
    InterfaceDefaultGetter(MethodInfo),
    ExtensionMethodCall(MethodInfo),
    /// `map.key` compiled as `map.get("key")`.
    MapGet,
    /// `list.p` compiled as a loop collecting `p` of every element.
    ListPropertyRewrite { component: JvmType },
    /// `GroovyObject.getProperty(name)` on a receiver nothing static is known about.
    DynamicFallback { property: String },
    Unresolvable,
}

/// Payload-free tag of an [`AccessStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StrategyKind {
    ArrayLength,
    CollectionSize,
    GetterCall,
    DirectField,
    BridgeAccessor,
    EnumConstant,
    InterfaceDefaultGetter,
    ExtensionMethodCall,
    MapGet,
    ListPropertyRewrite,
    DynamicFallback,
    Unresolvable,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl AccessStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            AccessStrategy::ArrayLength => StrategyKind::ArrayLength,
            AccessStrategy::CollectionSize => StrategyKind::CollectionSize,
            AccessStrategy::GetterCall(_) => StrategyKind::GetterCall,
            AccessStrategy::DirectField(_) => StrategyKind::DirectField,
            AccessStrategy::BridgeAccessor { .. } => StrategyKind::BridgeAccessor,
            AccessStrategy::EnumConstant { .. } => StrategyKind::EnumConstant,
            AccessStrategy::InterfaceDefaultGetter(_) => StrategyKind::InterfaceDefaultGetter,
            AccessStrategy::ExtensionMethodCall(_) => StrategyKind::ExtensionMethodCall,
            AccessStrategy::MapGet => StrategyKind::MapGet,
            AccessStrategy::ListPropertyRewrite { .. } => StrategyKind::ListPropertyRewrite,
            AccessStrategy::DynamicFallback { .. } => StrategyKind::DynamicFallback,
            AccessStrategy::Unresolvable => StrategyKind::Unresolvable,
        }
    }

    /// The member the strategy binds to, as `owner.name`, when there is one.
    pub fn target(&self, resolver: &dyn TypeResolver) -> Option<String> {
        let owner = |id: ClassId| resolver.class(id).name.clone();
        match self {
            AccessStrategy::GetterCall(m)
            | AccessStrategy::BridgeAccessor { method: m, .. }
            | AccessStrategy::InterfaceDefaultGetter(m)
            | AccessStrategy::ExtensionMethodCall(m) => Some(format!("{}.{}", owner(m.owner), m.name)),
            AccessStrategy::DirectField(f) => Some(format!("{}.{}", owner(f.owner), f.name)),
            AccessStrategy::EnumConstant { owner: id } => Some(owner(*id)),
            AccessStrategy::ListPropertyRewrite { component } => Some(resolver.describe(component)),
            AccessStrategy::DynamicFallback { property } => Some(property.clone()),
            _ => None,
        }
    }
}

/// Capability queries on the receiver type, answered once per site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub collection: bool,
    pub map: bool,
    pub list: bool,
    pub interface: bool,
    pub enumeration: bool,
}

impl Capabilities {
    pub fn of(resolver: &dyn TypeResolver, ty: &JvmType) -> Self {
        let info = ty.class_id().map(|id| resolver.class(id));
        Self {
            collection: resolver.has_capability(ty, known::COLLECTION),
            map: resolver.has_capability(ty, known::MAP),
            list: resolver.has_capability(ty, known::LIST),
            interface: info.is_some_and(|c| c.is_interface()),
            enumeration: info.is_some_and(|c| c.is_enum()),
        }
    }
}

/// Everything the rules look at for one access site.
#[derive(Debug, Clone)]
pub struct SelectInput<'s> {
    pub site: &'s AccessSite,
    /// Member being resolved; differs from the site's member only for renamed closure properties.
    pub member: String,
    /// Receiver type, flow type preferred, with `Class<T>` unwrapped to `T`.
    pub receiver_type: JvmType,
    /// The receiver was a `Class<T>` with a concrete `T`.
    pub is_class_receiver: bool,
    pub enclosing: ClassId,
    pub caps: Capabilities,
}

impl<'s> SelectInput<'s> {
    pub fn new(resolver: &dyn TypeResolver, site: &'s AccessSite, enclosing: ClassId) -> Self {
        let resolved = resolver.resolve_type(&site.receiver, enclosing);
        let (receiver_type, is_class_receiver) = match resolved {
            JvmType::Object { class, mut args } if class == known::CLASS && is_concrete(args.first()) => {
                (args.swap_remove(0), true)
            }
            other => (other, false),
        };
        Self::build(resolver, site, site.member.clone(), receiver_type, is_class_receiver, enclosing)
    }

    /// Input for a receiver known to be a `GroovyObject`: `this` outside a closure is the
    /// enclosing class, and `owner` inside a `with` closure means the closure's delegate.
    pub fn for_groovy_object(
        resolver: &dyn TypeResolver,
        site: &'s AccessSite,
        enclosing: ClassId,
        in_closure: bool,
    ) -> Self {
        let receiver_type = if site.receiver.is_this() && !in_closure {
            JvmType::object(enclosing)
        } else {
            resolver.resolve_type(&site.receiver, enclosing)
        };
        let member = if resolver.class(enclosing).with_closure && site.member == "owner" {
            "delegate".to_string()
        } else {
            site.member.clone()
        };
        Self::build(resolver, site, member, receiver_type, false, enclosing)
    }

    fn build(
        resolver: &dyn TypeResolver,
        site: &'s AccessSite,
        member: String,
        receiver_type: JvmType,
        is_class_receiver: bool,
        enclosing: ClassId,
    ) -> Self {
        let caps = Capabilities::of(resolver, &receiver_type);
        Self { site, member, receiver_type, is_class_receiver, enclosing, caps }
    }

    /// The type an unresolvable access is reported against.
    pub fn diagnostic_type(&self) -> &JvmType {
        self.site.literal_type().unwrap_or(&self.receiver_type)
    }
}

fn is_concrete(arg: Option<&JvmType>) -> bool {
    matches!(arg, Some(ty) if !matches!(ty, JvmType::TypeVar(_)))
}

type RuleFn = fn(&dyn TypeResolver, &SelectInput<'_>) -> Option<AccessStrategy>;

pub struct Rule {
    pub name: &'static str,
    pub apply: RuleFn,
}

/// Property access rules, highest priority first.
pub const PROPERTY_RULES: &[Rule] = &[
    Rule { name: "array-length", apply: array_length },
    Rule { name: "collection-size", apply: collection_size },
    Rule { name: "getter", apply: getter },
    Rule { name: "field", apply: field },
    Rule { name: "enum-constant", apply: enum_constant },
    Rule { name: "class-literal", apply: class_literal },
    Rule { name: "class-receiver", apply: class_receiver },
    Rule { name: "bridge-accessor", apply: bridge_accessor },
    Rule { name: "interface-getter", apply: interface_getter },
    Rule { name: "extension-getter", apply: extension_getter },
    Rule { name: "map-list-sugar", apply: map_list_sugar },
];

/// Rules for receivers known to be `GroovyObject`s; anything else goes through `getProperty`.
pub const GROOVY_OBJECT_RULES: &[Rule] = &[
    Rule { name: "getter", apply: getter },
    Rule { name: "field", apply: field },
];

pub fn select(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> AccessStrategy {
    select_traced(resolver, input).1
}

/// Like [`select`], also returning the name of the rule that matched.
pub fn select_traced(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> (&'static str, AccessStrategy) {
    run_rules(PROPERTY_RULES, resolver, input).unwrap_or(("unresolvable", AccessStrategy::Unresolvable))
}

pub fn select_groovy_object(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> (&'static str, AccessStrategy) {
    run_rules(GROOVY_OBJECT_RULES, resolver, input).unwrap_or_else(|| {
        ("dynamic-fallback", AccessStrategy::DynamicFallback { property: input.member.clone() })
    })
}

fn run_rules(
    rules: &[Rule],
    resolver: &dyn TypeResolver,
    input: &SelectInput<'_>,
) -> Option<(&'static str, AccessStrategy)> {
    let chosen = rules
        .iter()
        .find_map(|rule| (rule.apply)(resolver, input).map(|strategy| (rule.name, strategy)));
    match &chosen {
        Some((rule, strategy)) => tracing::debug!(
            member = %input.member,
            receiver = %resolver.describe(&input.receiver_type),
            rule,
            strategy = %strategy.kind(),
            "selected access strategy"
        ),
        None => tracing::debug!(member = %input.member, "no access rule matched"),
    }
    chosen
}

// ---- rules ----

fn array_length(_: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    (input.receiver_type.is_array() && input.member == "length").then_some(AccessStrategy::ArrayLength)
}

fn collection_size(_: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    let size_like = matches!(input.member.as_str(), "size" | "length");
    (input.caps.collection && size_like).then_some(AccessStrategy::CollectionSize)
}

fn getter(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    let class = input.receiver_type.class_id()?;
    getter_on(resolver, input, class).map(AccessStrategy::GetterCall)
}

fn field(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    let class = input.receiver_type.class_id()?;
    let same_package = same_package(resolver, class, input.enclosing);
    field_on(resolver, input, class, same_package).map(AccessStrategy::DirectField)
}

fn enum_constant(_: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    let owner = input.receiver_type.class_id()?;
    input.caps.enumeration.then_some(AccessStrategy::EnumConstant { owner })
}

fn class_literal(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    let literal = input.site.literal_type()?.class_id()?;
    let same_package = same_package(resolver, literal, input.enclosing);
    field_on(resolver, input, literal, same_package)
        .map(AccessStrategy::DirectField)
        .or_else(|| getter_on(resolver, input, literal).map(AccessStrategy::GetterCall))
}

fn class_receiver(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    if !input.is_class_receiver {
        return None;
    }
    getter_on(resolver, input, known::CLASS)
        .map(AccessStrategy::GetterCall)
        .or_else(|| field_on(resolver, input, known::CLASS, true).map(AccessStrategy::DirectField))
}

fn bridge_accessor(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    let class = input.receiver_type.class_id()?;
    let field = resolver.field(class, &input.member)?;
    if field.visibility != Visibility::Private || class == input.enclosing {
        return None;
    }
    let allowed = resolver.bridge_calls_allowed(class, input.enclosing)
        || resolver.bridge_calls_allowed(input.enclosing, class);
    if !allowed {
        return None;
    }
    let method = resolver.bridge_accessor(class, &input.member)?;
    Some(AccessStrategy::BridgeAccessor { method: method.clone(), field_static: field.is_static })
}

fn interface_getter(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    if !input.caps.interface {
        return None;
    }
    let class = input.receiver_type.class_id()?;
    let getter_name = format!("get{}", capitalize(&input.member));
    resolver
        .all_interfaces(class)
        .into_iter()
        .find_map(|iface| resolver.getter_method(iface, &getter_name))
        // marker interfaces declare nothing, but every receiver is an Object
        .or_else(|| resolver.getter_method(known::OBJECT, &getter_name))
        .cloned()
        .map(AccessStrategy::InterfaceDefaultGetter)
}

fn extension_getter(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    let getter_name = format!("get{}", capitalize(&input.member));
    let candidates = resolver.find_extension_methods(&input.receiver_type, &getter_name, &[]);
    if candidates.is_empty() {
        return None;
    }
    let mut best = resolver.choose_best_overload(&input.receiver_type, candidates, &[]);
    if best.len() != 1 {
        tracing::debug!(getter = %getter_name, candidates = best.len(), "ambiguous extension getter");
        return None;
    }
    best.pop().map(AccessStrategy::ExtensionMethodCall)
}

fn map_list_sugar(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> Option<AccessStrategy> {
    if is_static_property(resolver, input) {
        return None;
    }
    if input.caps.map {
        return Some(AccessStrategy::MapGet);
    }
    if input.caps.list {
        return Some(AccessStrategy::ListPropertyRewrite { component: list_component(input) });
    }
    None
}

// ---- helpers ----

fn superclasses<'r>(resolver: &'r dyn TypeResolver, start: ClassId) -> impl Iterator<Item = ClassId> + 'r {
    std::iter::successors(Some(start), move |c| resolver.super_class(*c))
}

fn same_package(resolver: &dyn TypeResolver, a: ClassId, b: ClassId) -> bool {
    resolver.class(a).package() == resolver.class(b).package()
}

/// Getter for the member on `start` or a superclass, synthesising one for a declared
/// property whose accessor has not been generated yet.
fn getter_on(resolver: &dyn TypeResolver, input: &SelectInput<'_>, start: ClassId) -> Option<MethodInfo> {
    let cap = capitalize(&input.member);
    let literal_receiver = input.site.is_class_literal();
    for class in superclasses(resolver, start) {
        let mut found = resolver
            .getter_method(class, &format!("get{cap}"))
            .or_else(|| resolver.getter_method(class, &format!("is{cap}")))
            .cloned();
        // a class literal only reaches static members, except on java.lang.Class itself
        let instance_getter = found.as_ref().is_some_and(|m| !m.is_static);
        if instance_getter && literal_receiver && class != known::CLASS {
            return None;
        }
        if let Some((ty, is_static)) = resolver.property_type(class, &input.member) {
            found = Some(synthesized_getter(class, &cap, ty, is_static));
        }
        if found.is_some() {
            return found;
        }
    }
    None
}

fn synthesized_getter(owner: ClassId, cap: &str, ty: JvmType, is_static: bool) -> MethodInfo {
    let prefix = if ty == JvmType::boolean() { "is" } else { "get" };
    let mut method = MethodInfo::getter(format!("{prefix}{cap}"), ty);
    method.owner = owner;
    method.is_static = is_static;
    method.synthetic = true;
    method
}

/// First field named like the member on `start` or a superclass, if code in the
/// enclosing class may read it directly.
fn field_on(
    resolver: &dyn TypeResolver,
    input: &SelectInput<'_>,
    start: ClassId,
    same_package: bool,
) -> Option<FieldInfo> {
    let field = superclasses(resolver, start).find_map(|c| resolver.field(c, &input.member))?;
    direct_access_allowed(resolver, field, input.enclosing, same_package).then(|| field.clone())
}

fn direct_access_allowed(resolver: &dyn TypeResolver, field: &FieldInfo, enclosing: ClassId, same_package: bool) -> bool {
    let nested_in_owner =
        std::iter::successors(Some(enclosing), |c| resolver.class(*c).outer).any(|c| c == field.owner);
    if nested_in_owner {
        return true;
    }
    match field.visibility {
        Visibility::Public => true,
        Visibility::Protected => same_package,
        Visibility::Package | Visibility::Private => false,
    }
}

fn is_static_property(resolver: &dyn TypeResolver, input: &SelectInput<'_>) -> bool {
    let Some(literal) = input.site.literal_type().and_then(JvmType::class_id) else {
        return false;
    };
    let Some(receiver) = input.receiver_type.class_id() else {
        return false;
    };
    resolver.is_derived_from(receiver, literal) || resolver.all_interfaces(receiver).contains(&literal)
}

fn list_component(input: &SelectInput<'_>) -> JvmType {
    if let Some(component) = &input.site.receiver.component {
        return component.clone();
    }
    match &input.receiver_type {
        JvmType::Object { args, .. } if is_concrete(args.first()) => args[0].clone(),
        _ => JvmType::object(known::OBJECT),
    }
}
