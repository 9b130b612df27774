//! Structured diagnostics emitted while writing datasets.

mod common;

use colorlogic_core::{DatasetGenerator, GeneratorSpec, write_dataset};
use colorlogic_test_support::tracing::RecordingLayer;
use tracing::Level;

use common::config;

#[test]
fn write_emits_progress_and_summary_events() {
    let plan = config(GeneratorSpec::Cycle { pair: true }, "formula1", 3, 12)
        .validate()
        .expect("config is valid");
    let generator = DatasetGenerator::new(plan);
    let (result, layer) = RecordingLayer::capture(|| write_dataset(&generator, Vec::new()));
    let (_, stats) = result.expect("dataset generates");

    let progress: Vec<_> = layer
        .events()
        .into_iter()
        .filter(|event| event.message() == Some("graph written"))
        .collect();
    assert_eq!(progress.len(), 3);
    assert!(progress.iter().all(|event| event.level == Level::DEBUG));
    assert_eq!(progress[2].field("index"), Some("2"));
    assert_eq!(progress[2].field("total"), Some("3"));

    let summary = layer
        .event_with_message("dataset written")
        .expect("summary recorded");
    assert_eq!(summary.level, Level::INFO);
    assert_eq!(summary.field("graphs"), Some("3"));
    assert_eq!(
        summary.field("tagged_nodes"),
        Some(stats.tagged_nodes().to_string().as_str())
    );
    assert_eq!(summary.field("positive_graphs"), Some("3"));
    assert!(summary.field("tagged_fraction").is_some());

    let spans = layer.spans_named("dataset.write");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].field("formula"), Some("formula1"));
    assert_eq!(spans[0].field("seed"), Some("12"));
}

#[test]
fn entropy_seed_is_logged() {
    let plan = common::formulas();
    let config = colorlogic_core::DatasetConfig::new(
        1,
        colorlogic_core::NodeRange::new(3, 3).expect("valid range"),
        GeneratorSpec::Empty,
        plan,
        "formula1",
    );
    let (generator, layer) = RecordingLayer::capture(|| {
        DatasetGenerator::new(config.validate().expect("config is valid"))
    });
    let event = layer
        .events()
        .into_iter()
        .find(|event| event.field("seed").is_some())
        .expect("seed event recorded");
    assert_eq!(event.level, Level::INFO);
    assert_eq!(
        event.field("seed"),
        Some(generator.base_seed().to_string().as_str())
    );
}
