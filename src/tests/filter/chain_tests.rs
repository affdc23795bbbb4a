use super::{chain, lines, messages};
use crate::config::FilterConfig;
use crate::error::{ErrorPolicy, FilterError};
use crate::filter::{
    FileContext, Filter, FilterChain, FilterStage, Record, RecordFilter, Span,
};

#[derive(Debug)]
struct Exploding;

impl RecordFilter for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    fn apply(&mut self, _record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        Err(FilterError::Structural {
            filter: "exploding".into(),
            message: "state corrupted".into(),
        })
    }
}

fn split_on_comma() -> FilterConfig {
    FilterConfig::new("split").with_arg("separator", ",")
}

fn group_by(field: &str) -> FilterConfig {
    FilterConfig::new("group_row").with_arg("fields", field)
}

fn keyed(key: &str, message: &str) -> Record {
    let mut record = Record::from_message(message);
    record.insert("k", key);
    record
}

#[test]
fn fan_out_then_drop_matches_sequential_application() {
    let mut chain = chain(vec![
        split_on_comma(),
        FilterConfig::new("drop").with_arg("contains", "x"),
    ]);

    let output = chain.apply(lines(&["a,x1,b", "x2,c"]), true).unwrap();

    assert_eq!(messages(&output.records), vec!["a", "b", "c"]);
    assert!(output.failures.is_empty());
}

#[test]
fn grouping_stage_flushes_exactly_once() {
    let mut chain = chain(vec![group_by("k")]);

    let held = chain
        .apply(vec![keyed("a", "1"), keyed("b", "2"), keyed("a", "3")], true)
        .unwrap();
    assert!(held.records.is_empty());

    let flushed = chain.apply(Vec::new(), false).unwrap();
    assert_eq!(flushed.records.len(), 2);
    assert_eq!(flushed.records[0].get_str("k"), Some("a"));
    assert_eq!(
        flushed.records[0].get("records").and_then(|v| v.as_array()).map(Vec::len),
        Some(2)
    );

    assert!(chain.drain().unwrap().records.is_empty());
    assert!(chain.apply(Vec::new(), false).unwrap().records.is_empty());
}

#[test]
fn last_record_in_final_batch_triggers_flush() {
    let mut chain = chain(vec![group_by("k")]);

    let output = chain
        .apply(vec![keyed("a", "1"), keyed("a", "2")], false)
        .unwrap();

    assert_eq!(output.records.len(), 1);
    assert!(chain.drain().unwrap().records.is_empty());
}

#[test]
fn fan_out_feeds_grouping_before_flush() {
    let mut chain = chain(vec![split_on_comma(), group_by("message")]);

    let output = chain.apply(lines(&["a,b", "a"]), false).unwrap();

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[0].get_str("message"), Some("a"));
    assert_eq!(
        output.records[0].get("records").and_then(|v| v.as_array()).map(Vec::len),
        Some(2)
    );
    assert_eq!(output.records[1].get_str("message"), Some("b"));
}

#[test]
fn drained_records_pass_through_later_stages() {
    let mut chain = chain(vec![
        FilterConfig::new("multi_row")
            .with_arg("pattern", " ")
            .with_arg("separator", "|"),
        FilterConfig::new("drop").with_arg("contains", "skip"),
    ]);

    let held = chain.apply(lines(&["first", " more", "skip me"]), true).unwrap();
    assert_eq!(messages(&held.records), vec!["first| more"]);

    let drained = chain.drain().unwrap();
    assert!(drained.records.is_empty());

    let tail = chain.apply(lines(&["last", " line"]), true).unwrap();
    assert!(tail.records.is_empty());
    let drained = chain.drain().unwrap();
    assert_eq!(messages(&drained.records), vec!["last| line"]);
}

#[test]
fn multi_row_merges_spans() {
    let mut chain = chain(vec![FilterConfig::new("multi_row").with_arg("pattern", " ")]);
    let records = vec![
        Record::from_message("start").with_span(Span::new(0, 6)),
        Record::from_message(" a").with_span(Span::new(6, 9)),
        Record::from_message("next").with_span(Span::new(9, 14)),
    ];

    let output = chain.apply(records, false).unwrap();

    assert_eq!(messages(&output.records), vec!["start\n a", "next"]);
    assert_eq!(output.records[0].span(), Some(Span::new(0, 9)));
    assert_eq!(output.records[1].span(), Some(Span::new(9, 14)));
}

#[test]
fn record_failures_are_collected_and_processing_continues() {
    let mut chain = chain(vec![FilterConfig::new("json")]);
    let records = vec![
        Record::from_message(r#"{"a":1}"#).with_span(Span::new(0, 8)),
        Record::from_message("not json").with_span(Span::new(8, 17)),
        Record::from_message(r#"{"a":2}"#).with_span(Span::new(17, 25)),
    ];

    let output = chain.apply(records, true).unwrap();

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[1].get("a"), Some(&serde_json::json!(2)));
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].stage, "json");
    assert_eq!(output.failures[0].span, Some(Span::new(8, 17)));
    assert!(output.failures[0].error.is_recoverable());
}

#[test]
fn fast_fail_aborts_on_first_record_failure() {
    let registry = crate::filter::default_registry();
    let stage = registry.create(&FilterConfig::new("json")).unwrap();
    let mut chain = FilterChain::new(vec![stage]).with_policy(ErrorPolicy::FastFail);
    chain.init(&FileContext::new("test")).unwrap();

    let err = chain.apply(lines(&["{}", "oops"]), true).unwrap_err();

    assert!(matches!(err, FilterError::Record { .. }));
}

#[test]
fn ignore_failure_passes_the_original_record() {
    let mut chain = chain(vec![FilterConfig::new("json").with_ignore_failure(true)]);

    let output = chain.apply(lines(&["not json", r#"{"a":1}"#]), true).unwrap();

    assert!(output.failures.is_empty());
    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[0].message(), Some("not json"));
    assert_eq!(output.records[1].get("a"), Some(&serde_json::json!(1)));
}

#[test]
fn structural_errors_abort_under_any_policy() {
    let stage = FilterStage::new("boom", Filter::Custom(Box::new(Exploding)));
    let mut chain = FilterChain::new(vec![stage]);
    chain.init(&FileContext::new("test")).unwrap();

    let err = chain.apply(lines(&["a"]), true).unwrap_err();

    assert!(matches!(err, FilterError::Structural { .. }));
}

#[test]
fn init_failure_names_the_stage() {
    let registry = crate::filter::default_registry();
    let stage = registry
        .create(
            &FilterConfig::new("append")
                .with_name("tag-host")
                .with_arg("field", "host")
                .with_arg("metadata", "hostname"),
        )
        .unwrap();
    let mut chain = FilterChain::new(vec![stage]);

    let err = chain.init(&FileContext::new("test")).unwrap_err();

    match err {
        FilterError::ChainInitialization { stage, source } => {
            assert_eq!(stage, "tag-host");
            assert!(matches!(*source, FilterError::MissingArgument { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!chain.is_initialized());
}

#[test]
fn apply_before_init_is_rejected() {
    let mut chain = FilterChain::new(Vec::new());

    assert!(matches!(
        chain.apply(lines(&["a"]), true),
        Err(FilterError::NotInitialized)
    ));
}

#[test]
fn records_a_stage_does_not_accept_pass_unchanged() {
    let mut chain = chain(vec![
        FilterConfig::new("drop")
            .with_arg("field", "level")
            .with_arg("equals", "debug"),
    ]);
    let mut debug = Record::from_message("noisy");
    debug.insert("level", "debug");

    let output = chain
        .apply(vec![debug, Record::from_message("no level")], true)
        .unwrap();

    assert_eq!(messages(&output.records), vec!["no level"]);
}

#[test]
fn empty_chain_passes_records_through() {
    let mut chain = chain(Vec::new());

    let output = chain.apply(lines(&["a", "b"]), false).unwrap();

    assert_eq!(messages(&output.records), vec!["a", "b"]);
    assert!(chain.is_empty());
}

#[test]
fn stage_names_keep_configuration_order() {
    let chain = chain(vec![
        FilterConfig::new("json").with_name("parse"),
        FilterConfig::new("exclude").with_arg("fields", "raw"),
    ]);

    assert_eq!(chain.stage_names(), vec!["parse", "exclude"]);
    assert_eq!(chain.len(), 2);
}
