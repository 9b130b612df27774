//! Unit tests for the CLI commands.

use super::commands::{run_generate, run_inspect};
use super::{
    Cli, CliError, Command, ExecutionSummary, GenerateCommand, InspectCommand, LayoutArg,
    dataset_file_name, generator_label, load_config, render_summary, run_cli,
};

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colorlogic_core::{DatasetConfig, FormulaSet, GeneratorSpec, NodeRange, RandomModel};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tracing_subscriber::layer::SubscriberExt;

use colorlogic_test_support::tracing::RecordingLayer;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const LINE_CONFIG: &str = r#"{
    "seed": 3,
    "number_graphs": 3,
    "n_nodes": [4, 6],
    "number_colors": 3,
    "generator": {"kind": "line"},
    "formulas": {"formula1": {"formula1": {}}},
    "formula": "formula1"
}"#;

#[fixture]
fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture file writes");
    path
}

fn generate(config: PathBuf, data_dir: &Path) -> GenerateCommand {
    GenerateCommand {
        config,
        seed: None,
        graphs: None,
        output: None,
        data_dir: data_dir.to_path_buf(),
        name: None,
    }
}

fn config_for(generator: GeneratorSpec) -> DatasetConfig {
    DatasetConfig::new(
        50,
        NodeRange::new(4, 20).expect("valid range"),
        generator,
        FormulaSet::default(),
        "formula3",
    )
}

#[rstest]
#[case::line(GeneratorSpec::Line, "line", "formula3/line-50-4-20.txt")]
#[case::cycle(GeneratorSpec::Cycle { pair: true }, "cycle", "formula3/cycle-50-4-20.txt")]
#[case::barabasi(
    GeneratorSpec::Random { model: RandomModel::BarabasiAlbert { m: 3 } },
    "random",
    "formula3/random-50-4-20-3.txt"
)]
fn dataset_file_names_follow_the_convention(
    #[case] generator: GeneratorSpec,
    #[case] label: &str,
    #[case] expected: &str,
) {
    assert_eq!(generator_label(&generator), label);
    let config = config_for(generator);
    assert_eq!(dataset_file_name(&config, label), Path::new(expected));
}

#[rstest]
fn generate_writes_to_the_conventional_path(temp_dir: TempDir) -> TestResult {
    let config = write_file(&temp_dir, "config.json", LINE_CONFIG);
    let data_dir = temp_dir.path().join("data");
    let summary = run_generate(generate(config, &data_dir))?;

    assert_eq!(summary.path, data_dir.join("formula1/line-3-4-6.txt"));
    assert_eq!(summary.seed, 3);
    assert_eq!(summary.statistics.graphs(), 3);
    let text = fs::read_to_string(&summary.path)?;
    assert!(text.starts_with("3\n"));
    Ok(())
}

#[rstest]
fn overrides_replace_configured_values(temp_dir: TempDir) -> TestResult {
    let config = write_file(&temp_dir, "config.json", LINE_CONFIG);
    let output = temp_dir.path().join("nested").join("out.txt");
    let command = GenerateCommand {
        seed: Some(11),
        graphs: Some(5),
        output: Some(output.clone()),
        ..generate(config, temp_dir.path())
    };
    let summary = run_generate(command)?;

    assert_eq!(summary.path, output);
    assert_eq!(summary.seed, 11);
    assert_eq!(summary.statistics.graphs(), 5);
    Ok(())
}

#[rstest]
fn fixed_seed_runs_write_identical_files(temp_dir: TempDir) -> TestResult {
    let config = write_file(&temp_dir, "config.json", LINE_CONFIG);
    let first = run_generate(GenerateCommand {
        name: Some("a".into()),
        ..generate(config.clone(), temp_dir.path())
    })?;
    let second = run_generate(GenerateCommand {
        name: Some("b".into()),
        ..generate(config, temp_dir.path())
    })?;
    assert_ne!(first.path, second.path);
    assert_eq!(fs::read(&first.path)?, fs::read(&second.path)?);
    Ok(())
}

#[rstest]
fn inspect_reports_the_generated_dataset(temp_dir: TempDir) -> TestResult {
    let config = write_file(&temp_dir, "config.json", LINE_CONFIG);
    let generated = run_generate(generate(config, temp_dir.path()))?;
    let summary = run_inspect(&InspectCommand {
        path: generated.path.clone(),
        degree_as_tag: false,
        layout: LayoutArg::Plain,
    })?;

    assert_eq!(summary.graphs, 3);
    assert_eq!(summary.nodes, generated.statistics.total_nodes());
    assert_eq!(summary.max_degree, 2);
    assert!(summary.classes <= 2);
    Ok(())
}

#[rstest]
fn degree_as_tag_reports_degree_features(temp_dir: TempDir) -> TestResult {
    let path = write_file(&temp_dir, "star.txt", "1\n4 0\n0 3 1 2 3\n0 1 0\n0 1 0\n0 1 0\n");
    let summary = run_inspect(&InspectCommand {
        path,
        degree_as_tag: true,
        layout: LayoutArg::Auto,
    })?;
    assert_eq!(summary.feature_width, 2);
    assert_eq!(summary.max_degree, 3);
    Ok(())
}

#[rstest]
fn missing_configuration_is_an_io_error(temp_dir: TempDir) {
    let err = load_config(&temp_dir.path().join("absent.json")).expect_err("file is missing");
    assert!(matches!(err, CliError::Io { .. }));
    assert_eq!(err.code(), None);
}

#[rstest]
fn malformed_configuration_is_a_decode_error(temp_dir: TempDir) {
    let path = write_file(&temp_dir, "config.json", r#"{"number_graphs": "many"}"#);
    let err = load_config(&path).expect_err("document is malformed");
    assert!(matches!(err, CliError::Decode { .. }));
    assert!(err.to_string().contains("config.json"));
}

#[rstest]
fn rejected_configuration_reports_its_code(temp_dir: TempDir) {
    let json = LINE_CONFIG.replace(r#""number_colors": 3"#, r#""number_colors": 0"#);
    let config = write_file(&temp_dir, "config.json", &json);
    let err = run_generate(generate(config, temp_dir.path())).expect_err("palette is empty");
    assert!(matches!(err, CliError::Config(_)));
    assert_eq!(err.code(), Some("CONFIG_ZERO_COLORS"));
}

#[rstest]
fn corrupt_dataset_reports_its_code(temp_dir: TempDir) {
    let path = write_file(&temp_dir, "bad.txt", "2\n1 0\n0 0\n");
    let err = run_inspect(&InspectCommand {
        path,
        degree_as_tag: false,
        layout: LayoutArg::Auto,
    })
    .expect_err("second graph is missing");
    assert_eq!(err.code(), Some("FORMAT_MISSING_GRAPHS"));
}

#[rstest]
#[case::generate(&["colorlogic", "generate", "--config", "c.json", "--graphs", "5", "--seed", "9"])]
#[case::generate_with_output(&["colorlogic", "generate", "--config", "c.json", "--output", "out.txt"])]
#[case::inspect(&["colorlogic", "inspect", "d.txt", "--layout", "featured", "--degree-as-tag"])]
fn command_lines_parse(#[case] args: &[&str]) {
    let cli = Cli::try_parse_from(args).expect("arguments parse");
    match cli.command {
        Command::Generate(command) => {
            assert_eq!(command.config, PathBuf::from("c.json"));
            assert_eq!(command.data_dir, PathBuf::from("data"));
        }
        Command::Inspect(command) => {
            assert_eq!(command.layout, LayoutArg::Featured);
            assert!(command.degree_as_tag);
        }
    }
}

#[rstest]
#[case::unknown_layout(&["colorlogic", "inspect", "d.txt", "--layout", "xml"])]
#[case::missing_config(&["colorlogic", "generate"])]
#[case::negative_graphs(&["colorlogic", "generate", "--config", "c.json", "--graphs", "-1"])]
fn invalid_command_lines_are_rejected(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err());
}

#[rstest]
fn run_cli_records_the_command_on_its_span(temp_dir: TempDir) -> TestResult {
    let config = write_file(&temp_dir, "config.json", LINE_CONFIG);
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let cli = Cli {
        command: Command::Generate(generate(config, temp_dir.path())),
    };

    let summary = tracing::subscriber::with_default(subscriber, || run_cli(cli))?;
    assert!(matches!(summary, ExecutionSummary::Generated(_)));

    let spans = layer.spans();
    let run = spans
        .iter()
        .find(|span| span.name == "cli.run")
        .expect("cli.run span must exist");
    assert_eq!(run.field("command"), Some("generate"));
    let generate = spans
        .iter()
        .find(|span| span.name == "cli.generate")
        .expect("cli.generate span must exist");
    assert!(
        generate
            .field("output")
            .is_some_and(|output| output.ends_with("line-3-4-6.txt"))
    );
    let event = layer
        .event_with_message("dataset generated")
        .expect("completion event must exist");
    assert_eq!(event.field("graphs"), Some("3"));
    Ok(())
}

#[rstest]
fn summaries_render_as_text(temp_dir: TempDir) -> TestResult {
    let config = write_file(&temp_dir, "config.json", LINE_CONFIG);
    let summary = ExecutionSummary::Generated(run_generate(generate(config, temp_dir.path()))?);
    let mut rendered = Vec::new();
    render_summary(&summary, &mut rendered)?;
    let text = String::from_utf8(rendered)?;
    assert!(text.contains("seed: 3\n"));
    assert!(text.contains("graphs: 3\n"));
    assert!(text.contains("tagged nodes: "));
    Ok(())
}
