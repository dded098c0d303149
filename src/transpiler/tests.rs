//! Predicate compiler tests.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::ast::builders::*;
use crate::ast::{DeclaredType, NodeKind, Value};
use crate::error::PredsqlError;
use crate::transpiler::*;

fn sql(p: &crate::ast::Predicate) -> String {
    compile_predicate(p).unwrap()
}

// ============= Comparisons =============

#[test]
fn test_comparison_symbols() {
    assert_eq!(sql(&eq(field("Age"), lit(30))), "Age = 30");
    assert_eq!(sql(&ne(field("Age"), lit(30))), "Age <> 30");
    assert_eq!(sql(&lt(field("Age"), lit(30))), "Age < 30");
    assert_eq!(sql(&lte(field("Age"), lit(30))), "Age <= 30");
    assert_eq!(sql(&gt(field("Age"), lit(30))), "Age > 30");
    assert_eq!(sql(&gte(field("Age"), lit(30))), "Age >= 30");
}

#[test]
fn test_null_comparisons() {
    assert_eq!(sql(&eq(field("Status"), null())), "Status IS NULL");
    assert_eq!(sql(&ne(field("Status"), null())), "Status IS NOT NULL");
    assert_eq!(sql(&is_null("Deleted")), "Deleted IS NULL");
    assert_eq!(sql(&is_not_null("Deleted")), "Deleted IS NOT NULL");
}

#[test]
fn test_literals_in_comparisons() {
    assert_eq!(sql(&eq(field("Active"), lit(true))), "Active = 1");
    assert_eq!(sql(&eq(field("Name"), lit("Ann"))), "Name = 'Ann'");

    let dt = NaiveDate::from_ymd_opt(2023, 12, 31)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();
    assert_eq!(
        sql(&gte(field("CreatedAt"), lit(dt))),
        "CreatedAt >= CAST('2023-12-31 23:59:59' AS DATE)"
    );
}

// ============= Connectives =============

#[test]
fn test_logical_parenthesized() {
    let p = eq(field("A"), lit(1)).and(eq(field("B"), lit(2)));
    assert_eq!(sql(&p), "(A = 1 AND B = 2)");

    let p = eq(field("A"), lit(1)).or(eq(field("B"), lit(2)).and(is_null("C")));
    assert_eq!(sql(&p), "(A = 1 OR (B = 2 AND C IS NULL))");
}

#[test]
fn test_not() {
    assert_eq!(sql(&not(eq(field("A"), lit(1)))), "(NOT A = 1)");
}

#[test]
fn test_conditional() {
    let p = eq(
        case_when(eq(field("Kind"), lit("vip")), field("VipLimit"), field("Limit")),
        lit(10),
    );
    assert_eq!(
        sql(&p),
        "(CASE WHEN Kind = 'vip' THEN VipLimit ELSE Limit END) = 10"
    );
}

#[test]
fn test_member_path_verbatim() {
    assert_eq!(sql(&eq(field("Address.City"), lit("Oslo"))), "Address.City = 'Oslo'");
}

// ============= Calls =============

#[test]
fn test_equals_call() {
    assert_eq!(sql(&equals(field("Name"), lit("Ann"))), "Name = 'Ann'");
    assert_eq!(sql(&equals(field("Age"), lit(4))), "Age = 4");
    assert_eq!(sql(&equals(field("OwnerId"), field("UserId"))), "OwnerId = UserId");
}

#[test]
fn test_contains_any_strings() {
    let p = contains_any(lit(vec!["a", "b"]), field("Name"));
    assert_eq!(sql(&p), "Name IN ('a',' b')");
}

#[test]
fn test_contains_any_numbers() {
    let p = contains_any(lit(vec![1, 2, 3]), field("RoleId"));
    assert_eq!(sql(&p), "RoleId IN (1,2,3)");
}

#[test]
fn test_contains_any_empty_vanishes() {
    let p = contains_any(list_of(DeclaredType::String, Vec::<&str>::new()), field("Name"));
    assert_eq!(sql(&p), "");

    let untyped = contains_any(lit(Value::List(vec![])), field("Name"));
    assert_eq!(sql(&untyped), "");
}

#[test]
fn test_contains_any_dates_are_quote_joined() {
    let p = contains_any(
        list_of(DeclaredType::DateTime, vec!["2024-01-01 00:00:00", "2024-02-01 00:00:00"]),
        field("Day"),
    );
    assert_eq!(sql(&p), "Day IN ('2024-01-01 00:00:00',' 2024-02-01 00:00:00')");
}

#[test]
fn test_contains_any_with_receiver() {
    let p = call("containsAny", Some(lit(vec![5, 6])), vec![field("Id")]);
    assert_eq!(sql(&p), "Id IN (5,6)");
}

// ============= Fail fast =============

fn unsupported_kind(err: PredsqlError) -> NodeKind {
    match err {
        PredsqlError::UnsupportedExpression { kind, .. } => kind,
        other => panic!("expected UnsupportedExpression, got {other:?}"),
    }
}

#[test]
fn test_unknown_method_rejected() {
    let p = call("startsWith", Some(field("Name")), vec![lit("A")]);
    let err = compile_predicate(&p).unwrap_err();
    assert!(err.to_string().contains("startsWith"));
    assert_eq!(unsupported_kind(err), NodeKind::Call);
}

#[test]
fn test_parameter_node_rejected() {
    let p = eq(crate::ast::Predicate::Parameter { name: "x".into() }, lit(1));
    assert_eq!(unsupported_kind(compile_predicate(&p).unwrap_err()), NodeKind::Parameter);
}

#[test]
fn test_wrong_arity_rejected() {
    let p = call("equals", Some(field("Name")), vec![]);
    assert_eq!(unsupported_kind(compile_predicate(&p).unwrap_err()), NodeKind::Call);

    let p = call("containsAny", None, vec![field("Name")]);
    assert_eq!(unsupported_kind(compile_predicate(&p).unwrap_err()), NodeKind::Call);
}

#[test]
fn test_non_constant_collection_rejected() {
    let p = contains_any(field("Tags"), field("Name"));
    let err = compile_predicate(&p).unwrap_err();
    assert!(err.to_string().contains("constant collection"));
}

#[test]
fn test_error_inside_tree_is_not_partially_rendered() {
    let p = eq(field("A"), lit(1)).and(call("like", None, vec![]));
    assert!(compile_predicate(&p).is_err());
}

#[test]
fn test_convert_rejected_by_default() {
    let p = eq(convert(field("Age"), DeclaredType::Decimal), lit(1));
    let err = compile_predicate(&p).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported expression: Convert (cast to decimal is not translated)");
}

#[test]
fn test_convert_dropped_when_configured() {
    let compiler = PredicateCompiler::new(CompileOptions {
        convert: ConvertPolicy::Drop,
        ..CompileOptions::default()
    });
    let p = convert(field("Age"), DeclaredType::Decimal);
    assert_eq!(compiler.compile_inline(&p).unwrap(), "");
}

// ============= Bound literals =============

#[test]
fn test_bound_mode_routes_literals() {
    let compiler = PredicateCompiler::new(CompileOptions {
        literals: LiteralMode::Bound,
        ..CompileOptions::default()
    });
    let p = eq(field("Name"), lit("O'Brien"))
        .and(is_null("DeletedAt"))
        .and(contains_any(lit(vec![1, 2]), field("RoleId")));
    let compiled = compiler.compile(&p).unwrap();

    assert_eq!(
        compiled.sql,
        "((Name = @p0 AND DeletedAt IS NULL) AND RoleId IN (@p1, @p2))"
    );
    assert_eq!(compiled.params.len(), 3);
    assert_eq!(compiled.params[0].value, Value::from("O'Brien"));
    assert_eq!(compiled.params[0].sql_type, SqlType::NVarChar);
    assert_eq!(compiled.params[2].name, "@p2");
}

#[test]
fn test_bound_equals_call() {
    let mut ctx = ParamContext::with_prefix("f");
    let sql = PredicateCompiler::default()
        .compile_into(&equals(field("Age"), lit(40)), &mut ctx)
        .unwrap();
    assert_eq!(sql, "Age = @f0");
    assert_eq!(ctx.params()[0].sql_type, SqlType::BigInt);
}

#[test]
fn test_bound_mode_elides_true_base() {
    let compiler = PredicateCompiler::new(CompileOptions {
        literals: LiteralMode::Bound,
        ..CompileOptions::default()
    });
    let p = crate::filter::combine([eq(field("Active"), lit(true)), eq(field("Name"), lit("Ann"))]);
    let compiled = compiler.compile(&p).unwrap();
    assert_eq!(compiled.sql, "((Active = 1) AND Name = @p0)");
    assert_eq!(compiled.params.len(), 1);
}

#[test]
fn test_bound_mode_recombined_criteria() {
    let compiler = PredicateCompiler::new(CompileOptions {
        literals: LiteralMode::Bound,
        ..CompileOptions::default()
    });
    let earlier = crate::filter::combine([eq(field("Name"), lit("Ann"))]);
    let p = crate::filter::combine([earlier, gt(field("Age"), lit(30))]);
    let compiled = compiler.compile(&p).unwrap();
    assert_eq!(compiled.sql, "(((Name = @p0)) AND Age > @p1)");
    assert_eq!(compiled.params.len(), 2);
}

#[test]
fn test_true_operand_outside_the_base_position_is_rendered() {
    assert_eq!(sql(&eq(field("A"), lit(1)).and(lit(true))), "(A = 1 AND 1)");
    assert_eq!(sql(&lit(true).or(eq(field("A"), lit(1)))), "(1 OR A = 1)");
}

#[test]
fn test_inline_mode_has_no_params() {
    let compiled = PredicateCompiler::default()
        .compile(&eq(field("A"), lit(1)))
        .unwrap();
    assert!(compiled.params.is_empty());
    assert_eq!(compiled.sql, "A = 1");
}

// ============= Properties =============

fn leaf() -> impl Strategy<Value = crate::ast::Predicate> {
    let name = "[A-Z][a-zA-Z]{0,8}";
    prop_oneof![
        (name, any::<i32>()).prop_map(|(f, n)| gt(field(f), lit(n))),
        (name, "[a-z]{0,6}").prop_map(|(f, s)| eq(field(f), lit(s))),
        name.prop_map(|f| is_null(f)),
    ]
}

fn tree() -> impl Strategy<Value = crate::ast::Predicate> {
    leaf().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.or(r)),
            inner.prop_map(not),
        ]
    })
}

proptest! {
    #[test]
    fn prop_and_wraps_operands(p in tree(), q in tree()) {
        let combined = sql(&and(p.clone(), q.clone()));
        prop_assert_eq!(combined, format!("({} AND {})", sql(&p), sql(&q)));
    }

    #[test]
    fn prop_compile_is_deterministic(p in tree()) {
        prop_assert_eq!(sql(&p), sql(&p.clone()));
    }
}
