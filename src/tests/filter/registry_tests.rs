use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::filter::{
    FileContext, FilterArgs, FilterChain, FilterRegistry, Record, RecordFilter, default_registry,
};

#[derive(Debug)]
struct Upper {
    field: String,
}

impl Upper {
    fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        Ok(Self {
            field: args.str_or("field", Record::MESSAGE)?,
        })
    }
}

impl RecordFilter for Upper {
    fn name(&self) -> &str {
        "upper"
    }

    fn apply(&mut self, mut record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        if let Some(value) = record.get_str(&self.field).map(str::to_uppercase) {
            record.insert(self.field.clone(), value);
        }
        Ok(vec![record])
    }
}

#[test]
fn default_registry_has_builtins() {
    let registry = default_registry();

    for key in ["drop", "exclude", "rename", "append", "split", "json", "multi_row", "group_row"] {
        assert!(registry.has_filter(key), "missing {key}");
    }
    #[cfg(feature = "csv")]
    assert!(registry.has_filter("delimited_row"));
}

#[test]
fn unknown_filter_is_reported() {
    let err = default_registry()
        .create(&FilterConfig::new("nope"))
        .unwrap_err();

    assert!(matches!(err, FilterError::UnknownFilter(ref kind) if kind == "nope"));
}

#[test]
fn keys_are_case_insensitive() {
    let stage = default_registry()
        .create(&FilterConfig::new("JSON"))
        .unwrap();

    assert_eq!(stage.name(), "JSON");
    assert_eq!(stage.filter().name(), "json");
}

#[test]
fn custom_filters_run_in_a_chain() {
    let mut registry = FilterRegistry::new();
    registry.register_custom("upper", Upper::prepare);
    let stage = registry
        .create(&FilterConfig::new("upper").with_name("shout"))
        .unwrap();
    let mut chain = FilterChain::new(vec![stage]);
    chain.init(&FileContext::new("test")).unwrap();

    let output = chain.apply(vec![Record::from_message("hey")], false).unwrap();

    assert_eq!(output.records[0].message(), Some("HEY"));
    assert_eq!(chain.stage_names(), vec!["shout"]);
}

#[test]
fn prepare_errors_surface_from_create() {
    let err = default_registry()
        .create(&FilterConfig::new("rename").with_arg("field", "a"))
        .unwrap_err();

    assert!(matches!(
        err,
        FilterError::MissingArgument { ref argument, .. } if argument == "target"
    ));
}
