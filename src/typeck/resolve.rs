use crate::ast::{Expr, ExprKind};
use super::env::{known, ClassInfo, ClassTable, FieldInfo, MethodInfo};
use super::types::{ClassId, JvmType};

/// Type information code generation consumes from the type checker.
///
/// Implementations must be deterministic: the same question always gets the same answer,
/// and lists are returned in a stable order.
pub trait TypeResolver {
    fn class(&self, id: ClassId) -> &ClassInfo;

    /// Static type of `expr` as seen from code in `enclosing`.
    fn resolve_type(&self, expr: &Expr, enclosing: ClassId) -> JvmType;

    /// Field declared directly on `owner`.
    fn field(&self, owner: ClassId, name: &str) -> Option<&FieldInfo>;

    fn getter_method(&self, owner: ClassId, getter_name: &str) -> Option<&MethodInfo>;

    fn all_interfaces(&self, id: ClassId) -> Vec<ClassId>;

    fn super_class(&self, id: ClassId) -> Option<ClassId>;

    fn find_extension_methods(&self, receiver: &JvmType, name: &str, args: &[JvmType]) -> Vec<MethodInfo>;

    /// All candidates sharing the lowest conversion cost. More than one means ambiguous.
    fn choose_best_overload(&self, receiver: &JvmType, candidates: Vec<MethodInfo>, args: &[JvmType]) -> Vec<MethodInfo>;

    fn bridge_accessor(&self, owner: ClassId, field: &str) -> Option<&MethodInfo>;

    fn bridge_calls_allowed(&self, receiver: ClassId, caller: ClassId) -> bool;

    fn declared_methods(&self, owner: ClassId) -> &[MethodInfo];

    fn property_type(&self, owner: ClassId, name: &str) -> Option<(JvmType, bool)>;

    fn is_derived_from(&self, id: ClassId, ancestor: ClassId) -> bool;

    fn has_capability(&self, ty: &JvmType, capability: ClassId) -> bool;

    fn is_assignable(&self, from: &JvmType, to: &JvmType) -> bool;

    fn wrapper(&self, ty: &JvmType) -> JvmType;

    fn describe(&self, ty: &JvmType) -> String;
}

impl TypeResolver for ClassTable {
    fn class(&self, id: ClassId) -> &ClassInfo {
        self.get(id)
    }

    fn resolve_type(&self, expr: &Expr, enclosing: ClassId) -> JvmType {
        if let Some(flow) = &expr.inferred {
            return flow.clone();
        }
        match &expr.kind {
            ExprKind::This => JvmType::object(enclosing),
            ExprKind::ClassLiteral(ty) => JvmType::generic(known::CLASS, vec![ty.clone()]),
            _ => expr.ty.clone(),
        }
    }

    fn field(&self, owner: ClassId, name: &str) -> Option<&FieldInfo> {
        ClassTable::field(self, owner, name)
    }

    fn getter_method(&self, owner: ClassId, getter_name: &str) -> Option<&MethodInfo> {
        ClassTable::getter_method(self, owner, getter_name)
    }

    fn all_interfaces(&self, id: ClassId) -> Vec<ClassId> {
        ClassTable::all_interfaces(self, id)
    }

    fn super_class(&self, id: ClassId) -> Option<ClassId> {
        ClassTable::super_class(self, id)
    }

    fn find_extension_methods(&self, receiver: &JvmType, name: &str, args: &[JvmType]) -> Vec<MethodInfo> {
        self.extensions()
            .iter()
            .filter(|m| m.name == name && m.params.len() == args.len() + 1)
            .filter(|m| self.is_assignable(receiver, &m.params[0]))
            .filter(|m| args.iter().zip(&m.params[1..]).all(|(a, p)| self.is_assignable(a, p)))
            .cloned()
            .collect()
    }

    fn choose_best_overload(&self, receiver: &JvmType, candidates: Vec<MethodInfo>, args: &[JvmType]) -> Vec<MethodInfo> {
        let ranked: Vec<(u32, MethodInfo)> = candidates
            .into_iter()
            .filter_map(|m| {
                let mut total = self.distance(receiver, m.params.first()?)?;
                for (arg, param) in args.iter().zip(m.params.iter().skip(1)) {
                    total += self.distance(arg, param)?;
                }
                Some((total, m))
            })
            .collect();
        let Some(best) = ranked.iter().map(|(d, _)| *d).min() else {
            return Vec::new();
        };
        ranked.into_iter().filter(|(d, _)| *d == best).map(|(_, m)| m).collect()
    }

    fn bridge_accessor(&self, owner: ClassId, field: &str) -> Option<&MethodInfo> {
        ClassTable::bridge_accessor(self, owner, field)
    }

    fn bridge_calls_allowed(&self, receiver: ClassId, caller: ClassId) -> bool {
        ClassTable::bridge_calls_allowed(self, receiver, caller)
    }

    fn declared_methods(&self, owner: ClassId) -> &[MethodInfo] {
        &self.get(owner).methods
    }

    fn property_type(&self, owner: ClassId, name: &str) -> Option<(JvmType, bool)> {
        self.property(owner, name).map(|p| (p.ty.clone(), p.is_static))
    }

    fn is_derived_from(&self, id: ClassId, ancestor: ClassId) -> bool {
        ClassTable::is_derived_from(self, id, ancestor)
    }

    fn has_capability(&self, ty: &JvmType, capability: ClassId) -> bool {
        ClassTable::has_capability(self, ty, capability)
    }

    fn is_assignable(&self, from: &JvmType, to: &JvmType) -> bool {
        ClassTable::is_assignable(self, from, to)
    }

    fn wrapper(&self, ty: &JvmType) -> JvmType {
        ClassTable::wrapper(self, ty)
    }

    fn describe(&self, ty: &JvmType) -> String {
        ClassTable::describe(self, ty)
    }
}
