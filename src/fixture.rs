//! TOML fixtures: a class universe plus the access sites to compile against it.
//!
//! ```toml
//! [[classes]]
//! name = "shop.Order"
//! fields = [{ name = "total", type = "int", visibility = "private" }]
//! methods = [{ name = "getTotal", returns = "int" }]
//!
//! [[classes]]
//! name = "shop.Report"
//!
//! [[sites]]
//! name = "order-total"
//! enclosing = "shop.Report"
//! receiver = { local = 1, type = "shop.Order" }
//! member = "total"
//! locals = [{ slot = 1, value = { object = { class = "shop.Order", fields = { total = { int = 3 } } } } }]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::{AccessSite, Constant, Expr};
use crate::codegen::operators::{select_operator, OperatorStrategy};
use crate::codegen::select::{select_groovy_object, select_traced};
use crate::codegen::{CallSiteWriter, EmissionContext, Insn, InsnBuffer, SelectInput};
use crate::config::CodegenOptions;
use crate::diagnostics::{CompileError, Diagnostics};
use crate::span::Span;
use crate::typeck::{
    known, ClassId, ClassKind, ClassTable, FieldInfo, JvmType, MethodInfo, Primitive, PropertyInfo, TypeResolver,
    Visibility,
};
use crate::vm::{Boxed, Value, Vm, VmError};

// ---- TOML deserialization types ----

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlFixture {
    #[serde(default)]
    classes: Vec<TomlClass>,
    /// Classes allowed to call each other's bridge accessors.
    #[serde(default)]
    bridge_pairs: Vec<[String; 2]>,
    #[serde(default)]
    extensions: Vec<TomlMethod>,
    #[serde(default)]
    sites: Vec<TomlSite>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlClass {
    name: String,
    kind: Option<ClassKind>,
    superclass: Option<String>,
    #[serde(default)]
    interfaces: Vec<String>,
    outer: Option<String>,
    #[serde(default)]
    unit: u32,
    #[serde(default)]
    with_closure: bool,
    /// Enum constants, in ordinal order.
    #[serde(default)]
    constants: Vec<String>,
    #[serde(default)]
    fields: Vec<TomlField>,
    #[serde(default)]
    methods: Vec<TomlMethod>,
    #[serde(default)]
    properties: Vec<TomlProperty>,
    #[serde(default)]
    bridges: Vec<TomlBridge>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default, rename = "static")]
    is_static: bool,
    visibility: Option<Visibility>,
    /// Initial value of a static field.
    value: Option<ValueSpec>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlMethod {
    name: String,
    #[serde(default)]
    params: Vec<String>,
    returns: String,
    #[serde(default, rename = "static")]
    is_static: bool,
    visibility: Option<Visibility>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlProperty {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default, rename = "static")]
    is_static: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlBridge {
    field: String,
    method: String,
    /// Defaults to a single parameter of the owning class.
    params: Option<Vec<String>>,
    returns: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSite {
    name: String,
    enclosing: String,
    #[serde(default)]
    kind: SiteKind,
    /// Omitted for an implicit-this access.
    receiver: Option<ExprSpec>,
    member: Option<toml::Spanned<String>>,
    #[serde(default)]
    safe: bool,
    #[serde(default)]
    implicit_this: bool,
    op: Option<toml::Spanned<String>>,
    argument: Option<ExprSpec>,
    max_locals: Option<u16>,
    #[serde(default)]
    in_closure: bool,
    #[serde(default)]
    locals: Vec<LocalSpec>,
    this: Option<ValueSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExprSpec {
    #[serde(default)]
    this: bool,
    local: Option<u16>,
    class: Option<String>,
    value: Option<ValueSpec>,
    property: Option<Box<PropertySpec>>,
    #[serde(rename = "type")]
    ty: Option<String>,
    inferred: Option<String>,
    component: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertySpec {
    receiver: ExprSpec,
    member: String,
    #[serde(default)]
    safe: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocalSpec {
    slot: u16,
    value: ValueSpec,
}

/// A runtime value as written in a fixture. Scalars inside lists and maps are boxed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSpec {
    Null,
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Str(String),
    /// A boxed `java.lang.Integer`.
    Integer(i32),
    /// A `java.math.BigDecimal`.
    Decimal(f64),
    List(Vec<ValueSpec>),
    Array(Vec<ValueSpec>),
    Map(BTreeMap<String, ValueSpec>),
    Object {
        class: String,
        #[serde(default)]
        fields: BTreeMap<String, ValueSpec>,
    },
}

// ---- loaded fixture ----

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteKind {
    #[default]
    Property,
    GroovyObject,
    Operator,
}

#[derive(Debug, Clone)]
pub enum SiteNode {
    Property(AccessSite),
    GroovyObject(AccessSite),
    Operator { receiver: Expr, op: String, argument: Expr },
}

#[derive(Debug, Clone)]
pub struct Site {
    pub name: String,
    pub enclosing: ClassId,
    pub node: SiteNode,
    pub max_locals: Option<u16>,
    pub in_closure: bool,
    pub span: Span,
    this: Option<ValueSpec>,
    locals: Vec<(u16, ValueSpec)>,
}

/// Which rule and strategy a site resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub site: String,
    pub rule: String,
    pub strategy: String,
    pub target: Option<String>,
}

#[derive(Debug)]
pub struct Emitted {
    pub selection: Selection,
    /// Static type of the pushed value.
    pub result: String,
    pub insns: Vec<Insn>,
    pub diagnostics: Vec<CompileError>,
}

impl Emitted {
    pub fn listing(&self) -> String {
        crate::codegen::insn::listing(&self.insns)
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("runtime error: {0}")]
    Vm(#[from] VmError),
}

pub struct Fixture {
    pub path: PathBuf,
    pub source: String,
    pub table: ClassTable,
    pub sites: Vec<Site>,
    /// (owner internal name, field, value)
    statics: Vec<(String, String, ValueSpec)>,
    /// (enum internal name, constants in ordinal order)
    enum_constants: Vec<(String, Vec<String>)>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            CompileError::fixture(format!("{}: could not read file: {e}", path.display()), path.to_path_buf())
        })?;
        Self::parse(&source, path)
    }

    pub fn parse(source: &str, path: &Path) -> Result<Self, CompileError> {
        let raw: TomlFixture = toml::from_str(source).map_err(|e| {
            CompileError::fixture(format!("{}: invalid syntax: {e}", path.display()), path.to_path_buf())
        })?;
        let fixture = Loader { path, source }.build(raw)?;
        tracing::debug!(
            path = %path.display(),
            classes = fixture.table.len(),
            sites = fixture.sites.len(),
            "loaded fixture"
        );
        Ok(fixture)
    }

    pub fn site(&self, name: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.name == name)
    }

    /// Run selection only.
    pub fn select(&self, site: &Site, options: &CodegenOptions) -> Selection {
        let table = &self.table;
        let (rule, strategy, target) = match &site.node {
            SiteNode::Property(access) => {
                let input = SelectInput::new(table, access, site.enclosing);
                let (rule, strategy) = select_traced(table, &input);
                (rule, strategy.kind().to_string(), strategy.target(table))
            }
            SiteNode::GroovyObject(access) => {
                let input = SelectInput::for_groovy_object(table, access, site.enclosing, site.in_closure);
                let (rule, strategy) = select_groovy_object(table, &input);
                (rule, strategy.kind().to_string(), strategy.target(table))
            }
            SiteNode::Operator { receiver, op, argument } => {
                let r = table.resolve_type(receiver, site.enclosing);
                let a = table.resolve_type(argument, site.enclosing);
                match select_operator(table, options, &r, &a, op) {
                    Some(strategy) => {
                        let target = match &strategy {
                            OperatorStrategy::GetAtMethod(m) | OperatorStrategy::ExtensionCall(m) => {
                                Some(format!("{}.{}", table.name(m.owner), m.name))
                            }
                            _ => None,
                        };
                        ("operator", strategy.kind().to_string(), target)
                    }
                    None => ("operator", "None".to_string(), None),
                }
            }
        };
        Selection { site: site.name.clone(), rule: rule.to_string(), strategy, target }
    }

    /// Generate code for one site. Recoverable diagnostics are returned alongside
    /// the instructions; fatal errors abort.
    pub fn emit(&self, site: &Site, options: &CodegenOptions) -> Result<Emitted, CompileError> {
        let selection = self.select(site, options);
        let mut buf = InsnBuffer::new();
        let mut diagnostics = Diagnostics::new();
        let result = {
            let mut ctx = EmissionContext::new(&self.table, site.enclosing, options, &mut buf, &mut diagnostics)
                .in_closure(site.in_closure);
            if let Some(max_locals) = site.max_locals {
                ctx = ctx.with_max_locals(max_locals);
            }
            let mut writer = CallSiteWriter::new(ctx);
            match &site.node {
                SiteNode::Property(access) => writer.make_get_property_site(access)?,
                SiteNode::GroovyObject(access) => writer.make_groovy_object_get_property_site(access)?,
                SiteNode::Operator { receiver, op, argument } => {
                    writer.make_single_argument_call(receiver, op, argument)?
                }
            }
        };
        Ok(Emitted {
            selection,
            result: self.table.describe(&result),
            insns: buf.into_insns(),
            diagnostics: diagnostics.into_errors(),
        })
    }

    /// Generate code for one site and execute it against the site's `this` and locals.
    /// Returns the emitted code and the rendered result.
    pub fn run(&self, site: &Site, options: &CodegenOptions) -> Result<(Emitted, String), RunError> {
        let emitted = self.emit(site, options)?;
        let mut vm = Vm::new(&self.table, options);
        let locals = self.prepare(&mut vm, site);
        let value = vm.run(&emitted.insns, locals)?;
        let rendered = vm.render(&value);
        tracing::debug!(site = %site.name, result = %rendered, "ran site");
        Ok((emitted, rendered))
    }

    /// Install statics and enum constants; build the local slots for `site`.
    pub fn prepare(&self, vm: &mut Vm<'_>, site: &Site) -> Vec<Value> {
        for (owner, name, value) in &self.statics {
            let value = materialize(vm, value, false);
            vm.set_static(owner, name, value);
        }
        for (owner, constants) in &self.enum_constants {
            for (ordinal, name) in constants.iter().enumerate() {
                let constant = vm.new_instance(
                    owner,
                    vec![
                        ("name".to_string(), Value::Str(name.clone())),
                        ("ordinal".to_string(), Value::Int(ordinal as i32)),
                    ],
                );
                vm.set_static(owner, name, constant);
            }
        }

        let width = site.locals.iter().map(|(slot, _)| usize::from(*slot) + 1).max().unwrap_or(1);
        let mut locals = vec![Value::Null; width.max(1)];
        if let Some(this) = &site.this {
            locals[0] = materialize(vm, this, false);
        }
        for (slot, value) in &site.locals {
            locals[usize::from(*slot)] = materialize(vm, value, false);
        }
        locals
    }
}

/// Allocate `spec` on the VM heap. `boxed` boxes scalars, as stored in collections.
pub fn materialize(vm: &mut Vm<'_>, spec: &ValueSpec, boxed: bool) -> Value {
    match spec {
        ValueSpec::Null => Value::Null,
        ValueSpec::Int(v) if boxed => Value::Boxed(Boxed::Integer(*v)),
        ValueSpec::Int(v) => Value::Int(*v),
        ValueSpec::Long(v) if boxed => Value::Boxed(Boxed::Long(*v)),
        ValueSpec::Long(v) => Value::Long(*v),
        ValueSpec::Double(v) if boxed => Value::Boxed(Boxed::Double(*v)),
        ValueSpec::Double(v) => Value::Double(*v),
        ValueSpec::Bool(b) if boxed => Value::Boxed(Boxed::Boolean(*b)),
        ValueSpec::Bool(b) => Value::Int(i32::from(*b)),
        ValueSpec::Integer(v) => Value::Boxed(Boxed::Integer(*v)),
        ValueSpec::Decimal(v) => Value::Boxed(Boxed::BigDecimal(*v)),
        ValueSpec::Str(s) => Value::Str(s.clone()),
        ValueSpec::List(items) => {
            let items = items.iter().map(|item| materialize(vm, item, true)).collect();
            vm.new_list(items)
        }
        ValueSpec::Array(items) => {
            let items = items.iter().map(|item| materialize(vm, item, false)).collect();
            vm.new_array(items)
        }
        ValueSpec::Map(entries) => {
            let entries = entries
                .iter()
                .map(|(k, v)| (Value::Str(k.clone()), materialize(vm, v, true)))
                .collect();
            vm.new_map(entries)
        }
        ValueSpec::Object { class, fields } => {
            let fields = fields
                .iter()
                .map(|(name, v)| (name.clone(), materialize(vm, v, false)))
                .collect();
            vm.new_instance(&class.replace('.', "/"), fields)
        }
    }
}

// ---- building ----

struct Loader<'a> {
    path: &'a Path,
    source: &'a str,
}

impl Loader<'_> {
    fn error(&self, msg: impl std::fmt::Display) -> CompileError {
        CompileError::fixture(format!("{}: {msg}", self.path.display()), self.path.to_path_buf())
    }

    fn build(&self, raw: TomlFixture) -> Result<Fixture, CompileError> {
        let mut table = ClassTable::new();

        // declare everything first so members and links may refer to any class
        let mut ids = Vec::with_capacity(raw.classes.len());
        for class in &raw.classes {
            ids.push(table.declare(&class.name, class.kind.unwrap_or(ClassKind::Class))?);
        }

        for (class, &id) in raw.classes.iter().zip(&ids) {
            if let Some(superclass) = &class.superclass {
                let superclass = class_named(&table, superclass).map_err(|e| self.error(e))?;
                table.set_superclass(id, superclass)?;
            }
            for iface in &class.interfaces {
                let iface = class_named(&table, iface).map_err(|e| self.error(e))?;
                table.add_interface(id, iface);
            }
            if let Some(outer) = &class.outer {
                let outer = class_named(&table, outer).map_err(|e| self.error(e))?;
                table.set_outer(id, outer)?;
            }
            table.set_unit(id, class.unit);
            if class.with_closure {
                table.mark_with_closure(id);
            }
        }

        let mut statics = Vec::new();
        let mut enum_constants = Vec::new();
        for (class, &id) in raw.classes.iter().zip(&ids) {
            let owner = table.get(id).internal_name();
            let in_class = |e: String| self.error(format!("class '{}': {e}", class.name));

            for field in &class.fields {
                let ty = parse_type(&table, &field.ty).map_err(in_class)?;
                let mut info = FieldInfo::new(&field.name, ty);
                if let Some(visibility) = field.visibility {
                    info = info.with_visibility(visibility);
                }
                if field.is_static {
                    info = info.into_static();
                }
                table.add_field(id, info);
                match (&field.value, field.is_static) {
                    (Some(value), true) => statics.push((owner.clone(), field.name.clone(), value.clone())),
                    (Some(_), false) => {
                        return Err(in_class(format!("field '{}': only static fields take a 'value'", field.name)));
                    }
                    (None, _) => {}
                }
            }
            for method in &class.methods {
                let method = build_method(&table, method).map_err(in_class)?;
                table.add_method(id, method);
            }
            for property in &class.properties {
                let ty = parse_type(&table, &property.ty).map_err(in_class)?;
                let mut info = PropertyInfo::new(&property.name, ty);
                if property.is_static {
                    info = info.into_static();
                }
                table.add_property(id, info);
            }
            for bridge in &class.bridges {
                let params = match &bridge.params {
                    Some(params) => parse_types(&table, params).map_err(in_class)?,
                    None => vec![JvmType::object(id)],
                };
                let ret = parse_type(&table, &bridge.returns).map_err(in_class)?;
                table.add_bridge_accessor(id, &bridge.field, MethodInfo::new(&bridge.method, params, ret));
            }
            if !class.constants.is_empty() {
                if !table.get(id).is_enum() {
                    return Err(in_class("only enums declare 'constants'".to_string()));
                }
                enum_constants.push((owner, class.constants.clone()));
            }
        }

        for extension in &raw.extensions {
            let method = build_method(&table, extension).map_err(|e| self.error(e))?;
            if method.params.is_empty() {
                return Err(self.error(format!(
                    "extension method '{}' needs its receiver type as the first parameter",
                    method.name
                )));
            }
            table.add_extension_method(method);
        }

        for [a, b] in &raw.bridge_pairs {
            let a = class_named(&table, a).map_err(|e| self.error(e))?;
            let b = class_named(&table, b).map_err(|e| self.error(e))?;
            table.allow_bridge_calls(a, b);
        }

        let mut sites = Vec::with_capacity(raw.sites.len());
        for site in &raw.sites {
            let built = self
                .build_site(&table, site)
                .map_err(|e| self.error(format!("site '{}': {e}", site.name)))?;
            sites.push(built);
        }

        Ok(Fixture {
            path: self.path.to_path_buf(),
            source: self.source.to_string(),
            table,
            sites,
            statics,
            enum_constants,
        })
    }

    fn build_site(&self, table: &ClassTable, raw: &TomlSite) -> Result<Site, String> {
        let enclosing = class_named(table, &raw.enclosing)?;
        let anchor = raw.member.as_ref().or(raw.op.as_ref()).map(|s| s.span()).unwrap_or(0..0);
        let span = Span::new(anchor.start, anchor.end).located_in(self.source);

        let node = match raw.kind {
            SiteKind::Property | SiteKind::GroovyObject => {
                let member = raw.member.as_ref().ok_or("property sites need a 'member'")?.get_ref().clone();
                let receiver = match &raw.receiver {
                    Some(spec) => build_expr(table, spec, enclosing, span)?,
                    None => Expr::this(JvmType::object(enclosing)).with_span(span),
                };
                let mut access = AccessSite::new(receiver, member).at(span);
                if raw.safe {
                    access = access.safe();
                }
                if raw.implicit_this || raw.receiver.is_none() {
                    access = access.implicit_this();
                }
                match raw.kind {
                    SiteKind::GroovyObject => SiteNode::GroovyObject(access),
                    _ => SiteNode::Property(access),
                }
            }
            SiteKind::Operator => {
                let op = raw.op.as_ref().ok_or("operator sites need an 'op'")?.get_ref().clone();
                let receiver = raw.receiver.as_ref().ok_or("operator sites need a 'receiver'")?;
                let argument = raw.argument.as_ref().ok_or("operator sites need an 'argument'")?;
                SiteNode::Operator {
                    receiver: build_expr(table, receiver, enclosing, span)?,
                    op,
                    argument: build_expr(table, argument, enclosing, span)?,
                }
            }
        };

        Ok(Site {
            name: raw.name.clone(),
            enclosing,
            node,
            max_locals: raw.max_locals,
            in_closure: raw.in_closure,
            span,
            this: raw.this.clone(),
            locals: raw.locals.iter().map(|l| (l.slot, l.value.clone())).collect(),
        })
    }
}

fn build_method(table: &ClassTable, raw: &TomlMethod) -> Result<MethodInfo, String> {
    let params = parse_types(table, &raw.params)?;
    let ret = parse_type(table, &raw.returns)?;
    let mut method = MethodInfo::new(&raw.name, params, ret);
    if let Some(visibility) = raw.visibility {
        method = method.with_visibility(visibility);
    }
    if raw.is_static {
        method = method.into_static();
    }
    Ok(method)
}

fn build_expr(table: &ClassTable, spec: &ExprSpec, enclosing: ClassId, span: Span) -> Result<Expr, String> {
    let declared = spec.ty.as_deref().map(|t| parse_type(table, t)).transpose()?;
    let mut expr = match (spec.this, spec.local, &spec.class, &spec.value, &spec.property) {
        (true, None, None, None, None) => Expr::this(JvmType::object(enclosing)),
        (false, Some(slot), None, None, None) => {
            let ty = declared.clone().ok_or_else(|| format!("local {slot} needs a 'type'"))?;
            Expr::local(slot, ty).with_text(format!("local{slot}"))
        }
        (false, None, Some(class), None, None) => {
            Expr::class_literal(parse_type(table, class)?).with_text(class.clone())
        }
        (false, None, None, Some(value), None) => {
            let constant = constant_of(value)?;
            let text = constant_text(&constant);
            Expr::constant(constant).with_text(text)
        }
        (false, None, None, None, Some(property)) => {
            let receiver = build_expr(table, &property.receiver, enclosing, span)?;
            let text = format!("{}.{}", receiver.text, property.member);
            let mut access = AccessSite::new(receiver, property.member.clone()).at(span);
            if property.safe {
                access = access.safe();
            }
            let ty = declared.clone().unwrap_or_else(|| JvmType::object(known::OBJECT));
            Expr::property(access, ty).with_text(text)
        }
        _ => {
            return Err("an expression needs exactly one of 'this', 'local', 'class', 'value' or 'property'".to_string());
        }
    };
    if let Some(ty) = declared {
        expr.ty = ty;
    }
    if let Some(inferred) = &spec.inferred {
        expr = expr.with_inferred(parse_type(table, inferred)?);
    }
    if let Some(component) = &spec.component {
        expr = expr.with_component(parse_type(table, component)?);
    }
    if let Some(text) = &spec.text {
        expr = expr.with_text(text.clone());
    }
    Ok(expr.with_span(span))
}

fn constant_of(value: &ValueSpec) -> Result<Constant, String> {
    Ok(match value {
        ValueSpec::Null => Constant::Null,
        ValueSpec::Int(v) => Constant::Int(*v),
        ValueSpec::Long(v) => Constant::Long(*v),
        ValueSpec::Double(v) => Constant::Double(*v),
        ValueSpec::Bool(b) => Constant::Bool(*b),
        ValueSpec::Str(s) => Constant::Str(s.clone()),
        _ => return Err("only null, int, long, double, bool and str values can be constants".to_string()),
    })
}

fn constant_text(constant: &Constant) -> String {
    match constant {
        Constant::Null => "null".to_string(),
        Constant::Int(v) => v.to_string(),
        Constant::Long(v) => format!("{v}L"),
        Constant::Double(v) => format!("{v:?}"),
        Constant::Bool(b) => b.to_string(),
        Constant::Str(s) => format!("{s:?}"),
    }
}

// ---- type syntax ----

const IMPLICIT_PACKAGES: &[&str] = &["java.lang", "java.util", "java.math", "groovy.lang"];

/// Class by qualified name; unqualified names are looked up in the implicit packages.
fn class_named(table: &ClassTable, name: &str) -> Result<ClassId, String> {
    let found = if name.contains('.') {
        table.lookup(name)
    } else {
        table.lookup(name).or_else(|| {
            IMPLICIT_PACKAGES
                .iter()
                .find_map(|pkg| table.lookup(&format!("{pkg}.{name}")))
        })
    };
    found.ok_or_else(|| format!("unknown class '{name}'"))
}

/// Parse `int`, `a.B`, `int[]`, `java.util.List<a.B>`, `T`. An unqualified name that is
/// neither a primitive nor a known class is a type variable.
pub fn parse_type(table: &ClassTable, text: &str) -> Result<JvmType, String> {
    let text = text.trim();
    if let Some(inner) = text.strip_suffix("[]") {
        return Ok(JvmType::array_of(parse_type(table, inner)?));
    }
    if text == "void" {
        return Ok(JvmType::Void);
    }
    if let Some(p) = Primitive::from_name(text) {
        return Ok(JvmType::Prim(p));
    }
    if let Some((base, rest)) = text.split_once('<') {
        let inner = rest.strip_suffix('>').ok_or_else(|| format!("unbalanced '<' in type '{text}'"))?;
        let class = class_named(table, base.trim())?;
        let args = split_type_args(inner)
            .into_iter()
            .map(|arg| parse_type(table, arg))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(JvmType::generic(class, args));
    }
    if text.is_empty() {
        return Err("empty type".to_string());
    }
    match class_named(table, text) {
        Ok(class) => Ok(JvmType::object(class)),
        Err(e) if text.contains('.') => Err(e),
        Err(_) => Ok(JvmType::TypeVar(text.to_string())),
    }
}

fn parse_types(table: &ClassTable, texts: &[String]) -> Result<Vec<JvmType>, String> {
    texts.iter().map(|t| parse_type(table, t)).collect()
}

/// Split generic arguments at top-level commas.
fn split_type_args(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}
