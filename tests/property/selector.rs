//! Property-based tests for strategy selection.
//!
//! Class universes are generated with random names and packages; the
//! properties must hold whatever they are called.

use proptest::prelude::*;
use sitegen::ast::{AccessSite, Expr};
use sitegen::codegen::select::{select, SelectInput};
use sitegen::codegen::{AccessStrategy, CallSiteWriter, EmissionContext, InsnBuffer, StrategyKind};
use sitegen::config::CodegenOptions;
use sitegen::diagnostics::Diagnostics;
use sitegen::typeck::{known, ClassId, ClassKind, ClassTable, FieldInfo, JvmType, MethodInfo, Primitive, Visibility};

fn arb_package() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn arb_member() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,8}"
}

fn arb_primitive() -> impl Strategy<Value = Primitive> {
    prop_oneof![
        Just(Primitive::Boolean),
        Just(Primitive::Byte),
        Just(Primitive::Char),
        Just(Primitive::Short),
        Just(Primitive::Int),
        Just(Primitive::Long),
        Just(Primitive::Float),
        Just(Primitive::Double),
    ]
}

fn arb_array_type() -> impl Strategy<Value = JvmType> {
    let element = prop_oneof![
        arb_primitive().prop_map(JvmType::Prim),
        Just(JvmType::object(known::STRING)),
        Just(JvmType::object(known::OBJECT)),
        Just(JvmType::array_of(JvmType::int())),
    ];
    element.prop_map(JvmType::array_of)
}

fn arb_collection_type() -> impl Strategy<Value = JvmType> {
    prop_oneof![
        Just(JvmType::object(known::COLLECTION)),
        Just(JvmType::object(known::LIST)),
        Just(JvmType::object(known::ARRAY_LIST)),
        Just(JvmType::generic(known::LIST, vec![JvmType::object(known::STRING)])),
        Just(JvmType::generic(known::ARRAY_LIST, vec![JvmType::object(known::INTEGER)])),
    ]
}

fn kind_of(table: &ClassTable, receiver: JvmType, member: &str, enclosing: ClassId) -> StrategyKind {
    let site = AccessSite::new(Expr::local(1, receiver), member);
    let input = SelectInput::new(table, &site, enclosing);
    select(table, &input).kind()
}

fn listing_of(table: &ClassTable, receiver: JvmType, member: &str) -> String {
    let options = CodegenOptions::default();
    let mut buf = InsnBuffer::new();
    let mut diagnostics = Diagnostics::new();
    let ctx = EmissionContext::new(table, known::OBJECT, &options, &mut buf, &mut diagnostics).with_max_locals(2);
    let site = AccessSite::new(Expr::local(1, receiver), member);
    CallSiteWriter::new(ctx).make_get_property_site(&site).unwrap();
    buf.listing()
}

/// A table with `{pkg}.Owner` holding one field, and `{caller_pkg}.Caller`.
fn owner_and_caller(pkg: &str, caller_pkg: &str, field: FieldInfo) -> (ClassTable, ClassId, ClassId) {
    let mut table = ClassTable::new();
    let owner = table.declare(&format!("{pkg}.Owner"), ClassKind::Class).unwrap();
    let caller = table.declare(&format!("{caller_pkg}.Caller"), ClassKind::Class).unwrap();
    table.add_field(owner, field);
    (table, owner, caller)
}

proptest! {
    #[test]
    fn selection_is_deterministic(member in arb_member(), receiver in arb_collection_type()) {
        let table = ClassTable::new();
        let site = AccessSite::new(Expr::local(1, receiver), member);
        let input = SelectInput::new(&table, &site, known::OBJECT);
        prop_assert_eq!(select(&table, &input), select(&table, &input));
    }

    #[test]
    fn size_and_length_compile_alike_on_collections(receiver in arb_collection_type()) {
        let table = ClassTable::new();
        prop_assert_eq!(kind_of(&table, receiver.clone(), "size", known::OBJECT), StrategyKind::CollectionSize);
        prop_assert_eq!(kind_of(&table, receiver.clone(), "length", known::OBJECT), StrategyKind::CollectionSize);
        let size = listing_of(&table, receiver.clone(), "size");
        prop_assert_eq!(&size, &listing_of(&table, receiver, "length"));
        prop_assert_eq!(size, "aload 1\ninvokeinterface java/util/Collection.size ()I");
    }

    #[test]
    fn array_length_never_looks_for_members(array in arb_array_type()) {
        let table = ClassTable::new();
        prop_assert_eq!(kind_of(&table, array.clone(), "length", known::OBJECT), StrategyKind::ArrayLength);
        prop_assert_eq!(listing_of(&table, array, "length"), "aload 1\narraylength");
    }

    #[test]
    fn bridged_private_field_never_reads_directly(
        pkg in arb_package(),
        caller_pkg in arb_package(),
        member in arb_member(),
        is_static in any::<bool>(),
    ) {
        // `class` is java.lang.Object's getClass()
        prop_assume!(member != "class");
        let mut field = FieldInfo::new(member.clone(), JvmType::int()).with_visibility(Visibility::Private);
        if is_static {
            field = field.into_static();
        }
        let (mut table, owner, caller) = owner_and_caller(&pkg, &caller_pkg, field);
        let accessor = MethodInfo::new("pfaccess$0", vec![JvmType::object(owner)], JvmType::int());
        table.add_bridge_accessor(owner, &member, accessor);
        table.allow_bridge_calls(owner, caller);

        let site = AccessSite::new(Expr::local(1, JvmType::object(owner)), member.as_str());
        let input = SelectInput::new(&table, &site, caller);
        match select(&table, &input) {
            AccessStrategy::BridgeAccessor { method, field_static } => {
                prop_assert_eq!(method.name, "pfaccess$0");
                prop_assert_eq!(field_static, is_static);
            }
            other => prop_assert!(false, "expected a bridge accessor, got {:?}", other.kind()),
        }
    }

    #[test]
    fn protected_fields_need_the_same_package(
        pkg in arb_package(),
        caller_pkg in arb_package(),
        member in arb_member(),
    ) {
        prop_assume!(member != "class");
        let field = FieldInfo::new(member.clone(), JvmType::int()).with_visibility(Visibility::Protected);
        let (table, owner, caller) = owner_and_caller(&pkg, &caller_pkg, field);
        let kind = kind_of(&table, JvmType::object(owner), &member, caller);
        if pkg == caller_pkg {
            prop_assert_eq!(kind, StrategyKind::DirectField);
        } else {
            prop_assert_ne!(kind, StrategyKind::DirectField);
        }
    }
}
