// SPDX-License-Identifier: MIT
//! Engine semantics: aggregation, silencing, and the sync/async contract.

use std::collections::BTreeMap;

use dockerflow::checks::{
    self, run_checks, run_checks_async, Check, CheckDetail, CheckMessage, ERROR, WARNING,
};
use serial_test::serial;

type CheckFn = Box<dyn Fn() -> Vec<CheckMessage>>;

fn error_check() -> Vec<CheckMessage> {
    vec![CheckMessage::error("my error message").with_id("my.error")]
}

fn warning_check() -> Vec<CheckMessage> {
    vec![CheckMessage::warning("my warning message").with_id("my.warning")]
}

#[test]
fn empty_input_is_all_ok() {
    let results = run_checks(Vec::<(&str, CheckFn)>::new(), &[]);
    assert_eq!(results.level, 0);
    assert_eq!(results.status(), "ok");
    assert!(results.statuses.is_empty());
    assert!(results.details.is_empty());
}

#[tokio::test]
async fn empty_input_is_all_ok_async() {
    let results = run_checks_async(Vec::<(String, Check)>::new(), &[]).await;
    assert_eq!(results.level, 0);
    assert!(results.statuses.is_empty());
    assert!(results.details.is_empty());
}

#[test]
fn single_failing_check_payload() {
    let results = run_checks([("returns_error", error_check)], &[]);

    assert_eq!(results.level, ERROR);
    assert_eq!(results.statuses["returns_error"], "error");
    assert_eq!(
        results.details["returns_error"],
        CheckDetail {
            status: "error".to_string(),
            level: ERROR,
            messages: BTreeMap::from([("my.error".to_string(), "my error message".to_string())]),
        }
    );
}

#[test]
fn passing_check_is_omitted_from_details() {
    let checks: Vec<(&str, CheckFn)> = vec![
        ("passes", Box::new(Vec::new)),
        ("returns_error", Box::new(error_check)),
    ];
    let results = run_checks(checks, &[]);

    assert_eq!(results.statuses["passes"], "ok");
    assert!(!results.details.contains_key("passes"));
    assert!(results.details.contains_key("returns_error"));
}

#[test]
fn overall_level_is_the_worst_check() {
    let checks: Vec<(&str, CheckFn)> = vec![
        ("returns_error", Box::new(error_check)),
        ("returns_warning", Box::new(warning_check)),
    ];
    let results = run_checks(checks, &[]);

    assert_eq!(results.level, ERROR);
    assert_eq!(results.statuses["returns_error"], "error");
    assert_eq!(results.statuses["returns_warning"], "warning");
}

#[test]
fn silencing_drops_only_the_named_ids() {
    let checks: Vec<(&str, CheckFn)> = vec![
        ("returns_error", Box::new(error_check)),
        ("returns_warning", Box::new(warning_check)),
    ];
    let results = run_checks(checks, &["my.error".to_string()]);

    // The silenced check drops back to passing and out of details.
    assert_eq!(results.level, WARNING);
    assert_eq!(results.statuses["returns_error"], "ok");
    assert!(!results.details.contains_key("returns_error"));

    // The other check is untouched.
    assert_eq!(results.statuses["returns_warning"], "warning");
    assert_eq!(
        results.details["returns_warning"].messages["my.warning"],
        "my warning message"
    );
}

#[test]
fn one_check_returning_multiple_messages() {
    let checks = [(
        "returns_messages",
        || {
            vec![
                CheckMessage::error("my error message").with_id("my.error"),
                CheckMessage::warning("my warning message").with_id("my.warning"),
            ]
        },
    )];
    let results = run_checks(checks, &[]);

    let detail = &results.details["returns_messages"];
    assert_eq!(detail.level, ERROR);
    assert_eq!(detail.messages.len(), 2);
    assert_eq!(detail.messages["my.error"], "my error message");
    assert_eq!(detail.messages["my.warning"], "my warning message");
}

#[tokio::test]
async fn sync_and_async_modes_agree() {
    let sync_checks: Vec<(&str, CheckFn)> = vec![
        ("returns_error", Box::new(error_check)),
        ("returns_warning", Box::new(warning_check)),
        ("passes", Box::new(Vec::new)),
    ];
    let async_checks = vec![
        ("returns_error".to_string(), Check::sync(error_check)),
        ("returns_warning".to_string(), Check::sync(warning_check)),
        ("passes".to_string(), Check::sync(Vec::new)),
    ];

    let sync_results = run_checks(sync_checks, &[]);
    let async_results = run_checks_async(async_checks, &[]).await;

    assert_eq!(sync_results, async_results);
}

#[tokio::test]
async fn mixed_sync_and_async_checks_aggregate_together() {
    let checks = vec![
        (
            "async_error".to_string(),
            Check::async_fn(|| async { vec![CheckMessage::error("gone").with_id("a.E1")] }),
        ),
        ("blocking_warning".to_string(), Check::sync(warning_check)),
    ];
    let results = run_checks_async(checks, &[]).await;

    assert_eq!(results.level, ERROR);
    assert_eq!(results.statuses["async_error"], "error");
    assert_eq!(results.statuses["blocking_warning"], "warning");
}

#[test]
fn pure_checks_are_idempotent() {
    let first = run_checks([("returns_error", error_check)], &[]);
    let second = run_checks([("returns_error", error_check)], &[]);
    assert_eq!(first, second);
}

#[test]
fn unmapped_levels_count_toward_the_max_but_read_unknown() {
    let checks = [("odd", || vec![CheckMessage::info("odd").with_level(25)])];
    let results = run_checks(checks, &[]);

    assert_eq!(results.level, 25);
    assert_eq!(results.statuses["odd"], "unknown");
    assert_eq!(checks::level_to_text(25), "unknown");
}

#[test]
fn duplicate_names_overwrite_in_the_output() {
    let checks: Vec<(&str, CheckFn)> = vec![
        ("dup", Box::new(error_check)),
        ("dup", Box::new(warning_check)),
    ];
    let results = run_checks(checks, &[]);

    assert_eq!(results.statuses.len(), 1);
    assert_eq!(results.statuses["dup"], "warning");
}

#[tokio::test]
#[serial]
async fn default_registry_round_trip() {
    checks::clear_checks();
    checks::register("returns_error", error_check);
    checks::register_async("async_ok", || async { Vec::new() });

    let results = run_checks_async(checks::get_checks(), &[]).await;
    assert_eq!(results.level, ERROR);
    assert_eq!(results.statuses["returns_error"], "error");
    assert_eq!(results.statuses["async_ok"], "ok");

    checks::clear_checks();
    assert!(checks::get_checks().is_empty());
}
