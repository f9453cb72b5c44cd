use std::sync::Arc;

use fbquery_compilers_base::interface::LastStatementRecorder;
use fbquery_compilers_firebird::{CompilerSession, FirebirdQuery};
use fbquery_core::{
    config::CompilerConfig,
    data::DataType,
    err::CompileError,
    qtree::{
        col, constant, equal, not_equal, param, source, source_as, static_member, Method,
        OrderingType, Property, QueryNode,
    },
    version::ServerVersion,
};
use pretty_assertions::assert_eq;
use regex::Regex;

fn session() -> CompilerSession {
    fbquery_logging::init_for_tests();
    CompilerSession::for_version(ServerVersion::LATEST, CompilerConfig::default())
}

fn compile(query: QueryNode) -> FirebirdQuery {
    session().compile(&query).unwrap()
}

fn attachments() -> QueryNode {
    source("MON$ATTACHMENTS")
}

fn name() -> QueryNode {
    col("MON$ATTACHMENT_NAME")
}

fn timestamp() -> QueryNode {
    col("MON$TIMESTAMP")
}

#[test]
fn test_filter_on_trimmed_attachment_name() {
    let compiled = compile(attachments().filter(not_equal(
        name().call(Method::Trim, vec![]),
        constant(""),
    )));

    assert!(compiled.query.contains(r#"TRIM("m"."MON$ATTACHMENT_NAME")"#));
    assert_eq!(
        compiled.query,
        r#"SELECT "m".* FROM "MON$ATTACHMENTS" "m" WHERE TRIM("m"."MON$ATTACHMENT_NAME") <> ''"#
    );
    assert_eq!(compiled.params, vec![]);
}

#[test]
fn test_project_timestamp_components() {
    let compiled = compile(attachments().project([
        ("Second", timestamp().member(Property::Second)),
        ("DayOfYear", timestamp().member(Property::DayOfYear)),
    ]));

    assert_eq!(
        compiled.query,
        r#"SELECT TRUNC(EXTRACT(SECOND FROM "m"."MON$TIMESTAMP")) AS "Second", EXTRACT(YEARDAY FROM "m"."MON$TIMESTAMP") + 1 AS "DayOfYear" FROM "MON$ATTACHMENTS" "m""#
    );
}

#[test]
fn test_substring_with_literal_arguments() {
    let compiled = compile(attachments().project([
        ("One", name().call(Method::Substring, vec![constant(0)])),
        (
            "Two",
            name().call(Method::Substring, vec![constant(1), constant(2)]),
        ),
    ]));

    assert_eq!(
        compiled.query,
        r#"SELECT SUBSTRING("m"."MON$ATTACHMENT_NAME" FROM 1) AS "One", SUBSTRING("m"."MON$ATTACHMENT_NAME" FROM 2 FOR 2) AS "Two" FROM "MON$ATTACHMENTS" "m""#
    );
}

#[test]
fn test_substring_with_column_arguments() {
    let compiled = compile(attachments().project([(
        "Name",
        name().call(
            Method::Substring,
            vec![col("MON$ATTACHMENT_ID"), col("MON$SERVER_PID")],
        ),
    )]));

    assert_eq!(
        compiled.query,
        r#"SELECT SUBSTRING("m"."MON$ATTACHMENT_NAME" FROM "m"."MON$ATTACHMENT_ID" + 1 FOR "m"."MON$SERVER_PID") AS "Name" FROM "MON$ATTACHMENTS" "m""#
    );
}

#[test]
fn test_substring_with_negative_start_is_rejected() {
    let err = session()
        .compile(&attachments().project([(
            "Name",
            name().call(Method::Substring, vec![constant(-1)]),
        )]))
        .unwrap_err();

    assert!(matches!(
        CompileError::of(&err),
        Some(CompileError::InvalidArgument(_))
    ));
}

#[test]
fn test_date_compared_to_current_date() {
    let compiled = compile(attachments().filter(equal(
        timestamp().member(Property::Date),
        static_member(Property::Now).member(Property::Date),
    )));

    assert_eq!(
        compiled.query,
        r#"SELECT "m".* FROM "MON$ATTACHMENTS" "m" WHERE CAST("m"."MON$TIMESTAMP" AS DATE) = CAST(CURRENT_TIMESTAMP AS DATE)"#
    );
}

#[test]
fn test_take_renders_single_bound() {
    let compiled = compile(attachments().take(constant(3)));

    assert!(Regex::new(r"ROWS \(3\)$").unwrap().is_match(&compiled.query));
    assert!(!compiled.query.contains(" TO "));
}

#[test]
fn test_skip_take_reuses_lower_bound() {
    let compiled = compile(attachments().skip(constant(1)).take(constant(3)));

    let re = Regex::new(r"ROWS \((.+) \+ 1\) TO \((.+) \+ 3\)$").unwrap();
    let caps = re.captures(&compiled.query).unwrap();

    assert_eq!(&caps[1], "1");
    assert_eq!(&caps[1], &caps[2]);
    assert_eq!(
        compiled.query,
        r#"SELECT "m".* FROM "MON$ATTACHMENTS" "m" ROWS (1 + 1) TO (1 + 3)"#
    );
}

#[test]
fn test_skip_take_parameters_stay_symbolic() {
    let compiled = compile(
        attachments()
            .skip(param("skip", DataType::Int32))
            .take(param("take", DataType::Int32)),
    );

    assert_eq!(
        compiled.query,
        r#"SELECT "m".* FROM "MON$ATTACHMENTS" "m" ROWS (? + 1) TO (? + ?)"#
    );
    assert_eq!(compiled.params.len(), 3);
    assert_eq!(compiled.params[0], compiled.params[1]);
}

#[test]
fn test_skip_renders_open_ended_window() {
    let compiled = compile(attachments().skip(constant(5)));

    assert!(compiled
        .query
        .ends_with("ROWS (5 + 1) TO (9223372036854775807)"));
}

#[test]
fn test_skip_after_ordered_take_keeps_ordering() {
    let compiled = compile(
        attachments()
            .order_by(timestamp(), OrderingType::Desc)
            .take(constant(10))
            .skip(constant(2)),
    );

    assert_eq!(
        compiled.query,
        r#"SELECT "t0".* FROM (SELECT "m".* FROM "MON$ATTACHMENTS" "m" ORDER BY "m"."MON$TIMESTAMP" DESC ROWS (10)) "t0" ORDER BY "t0"."MON$TIMESTAMP" DESC ROWS (2 + 1) TO (9223372036854775807)"#
    );
}

#[test]
fn test_derived_table_does_not_shadow_source_alias() {
    let compiled = compile(
        source_as("MON$ATTACHMENTS", "t0")
            .take(constant(10))
            .filter(not_equal(col("MON$ATTACHMENT_ID"), constant(0))),
    );

    assert_eq!(
        compiled.query,
        r#"SELECT "t1".* FROM (SELECT "t0".* FROM "MON$ATTACHMENTS" "t0" ROWS (10)) "t1" WHERE "t1"."MON$ATTACHMENT_ID" <> 0"#
    );
}

#[test]
fn test_top_level_any_is_gated_by_version() {
    let query = attachments().any(Some(not_equal(col("MON$ATTACHMENT_ID"), constant(0))));

    let compiled = session().compile(&query).unwrap();
    assert_eq!(
        compiled.query,
        r#"SELECT CASE WHEN EXISTS (SELECT 1 FROM "MON$ATTACHMENTS" "m" WHERE "m"."MON$ATTACHMENT_ID" <> 0) THEN TRUE ELSE FALSE END FROM RDB$DATABASE"#
    );

    let legacy = CompilerSession::for_server(
        "WI-V2.5.9.27139 Firebird 2.5",
        CompilerConfig::default(),
    )
    .unwrap();
    let err = legacy.compile(&query).unwrap_err();

    assert!(matches!(
        CompileError::of(&err),
        Some(CompileError::UnsupportedFeature(_))
    ));
}

#[test]
fn test_compilation_is_deterministic() {
    let query = attachments()
        .filter(not_equal(name().call(Method::Trim, vec![]), constant("")))
        .skip(param("skip", DataType::Int64))
        .take(constant(10));

    let session = session();

    assert_eq!(
        session.compile(&query).unwrap(),
        session.compile(&query).unwrap()
    );
}

#[test]
fn test_observer_sees_exact_statement_text() {
    let recorder = Arc::new(LastStatementRecorder::new());
    let session = session().with_observer(recorder.clone());

    let compiled = session.compile(&attachments().take(constant(1))).unwrap();
    assert_eq!(recorder.last_text().unwrap(), Some(compiled.query));

    recorder.clear().unwrap();
    session
        .compile(&attachments().call(Method::Trim, vec![]))
        .unwrap_err();

    assert_eq!(recorder.last().unwrap(), None);
}
