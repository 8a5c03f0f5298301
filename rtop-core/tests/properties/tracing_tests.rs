//! Property-based tests for logging configuration

use std::path::PathBuf;

use proptest::prelude::*;
use rtop_core::tracing::span_names;
use rtop_core::{TracingConfig, TracingLevel, TracingOutput};

fn arb_tracing_level() -> impl Strategy<Value = TracingLevel> {
    prop_oneof![
        Just(TracingLevel::Error),
        Just(TracingLevel::Warn),
        Just(TracingLevel::Info),
        Just(TracingLevel::Debug),
        Just(TracingLevel::Trace),
    ]
}

fn arb_tracing_output() -> impl Strategy<Value = TracingOutput> {
    prop_oneof![
        Just(TracingOutput::Stderr),
        "/tmp/[a-z]{1,12}\\.log".prop_map(|p| TracingOutput::File { path: PathBuf::from(p) }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn tracing_config_builder_composable(
        level in arb_tracing_level(),
        output in arb_tracing_output(),
        filter in proptest::option::of("rtop_core=(debug|trace),russh=warn"),
    ) {
        let mut config = TracingConfig::new().with_level(level).with_output(output.clone());
        if let Some(filter) = &filter {
            config = config.with_filter(filter.clone());
        }

        prop_assert_eq!(config.level, level);
        prop_assert_eq!(config.output, output);
        prop_assert_eq!(config.filter, filter);
    }

    #[test]
    fn tracing_level_roundtrip(level in arb_tracing_level()) {
        prop_assert_eq!(level.to_string().parse::<TracingLevel>(), Ok(level));
        prop_assert_eq!(level.to_string().to_uppercase().parse::<TracingLevel>(), Ok(level));
    }

    /// Each extra `-v` raises verbosity by one step and never lowers it
    #[test]
    fn verbosity_is_monotonic(steps in 0u8..10) {
        let here = TracingLevel::from_verbosity(steps);
        let next = TracingLevel::from_verbosity(steps.saturating_add(1));
        prop_assert!(next >= here);
        prop_assert!(here >= TracingLevel::Warn);
    }
}

#[test]
fn verbosity_steps() {
    assert_eq!(TracingLevel::from_verbosity(0), TracingLevel::Warn);
    assert_eq!(TracingLevel::from_verbosity(1), TracingLevel::Info);
    assert_eq!(TracingLevel::from_verbosity(2), TracingLevel::Debug);
    assert_eq!(TracingLevel::from_verbosity(3), TracingLevel::Trace);
}

#[test]
fn span_names_follow_naming_convention() {
    for name in [span_names::CONNECT, span_names::AUTH_METHOD, span_names::HARVEST] {
        assert!(name.contains('.'), "{name} should be category.operation");
    }
}

#[test]
fn default_config_is_quiet() {
    let config = TracingConfig::default();
    assert_eq!(config.level, TracingLevel::Warn);
    assert_eq!(config.output, TracingOutput::Stderr);
    assert!(config.filter.is_none());
}
