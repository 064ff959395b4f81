//! End-to-end tests of the report pipeline through the library API.

mod common;

use std::fs;
use std::path::PathBuf;

use profreport::output::{FigureBody, InMemoryOutput, SvgOutput};
use profreport::{generate, ParseError, ReportConfig};
use tempfile::TempDir;

use common::{write_capture, write_lines, REPORT_TITLES};

fn config(input: PathBuf, output_dir: PathBuf) -> ReportConfig {
    ReportConfig {
        input,
        output_dir,
        ..ReportConfig::default()
    }
}

fn series_values(output: &InMemoryOutput, title: &str) -> Vec<Vec<f64>> {
    match &output.get(title).expect("missing chart").body {
        FigureBody::Line { series } | FigureBody::StackedArea { series } => series
            .iter()
            .map(|s| s.points.iter().map(|p| p.1).collect())
            .collect(),
        other => panic!("{title} is a {} chart", other.kind()),
    }
}

#[test]
fn test_report_renders_fixed_charts_in_order() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path());
    let out_dir = dir.path().join("charts");

    let mut output = InMemoryOutput::new();
    let summary = generate(&config(input.clone(), out_dir.clone()), &mut output).unwrap();

    let titles: Vec<&str> = output.figures().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, REPORT_TITLES);

    let expected: Vec<PathBuf> = REPORT_TITLES
        .iter()
        .map(|t| out_dir.join(t.replace(' ', "_")))
        .collect();
    assert_eq!(summary.artifacts, expected);
    assert_eq!(output.paths(), expected);

    assert_eq!(summary.input, input);
    assert_eq!(summary.process_rows, 12);
    assert_eq!(summary.cgroup_rows, 6);
    let range = summary.time_range.unwrap();
    assert_eq!(range.start, "2024/03/01T10:00:00");
    assert_eq!(range.end, "2024/03/01T10:00:05");
}

#[test]
fn test_report_values() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path());
    let mut output = InMemoryOutput::new();
    generate(&config(input, dir.path().join("out")), &mut output).unwrap();

    // Two pids at 10% and 20% every second.
    assert_eq!(series_values(&output, "CPU Usage (Sum)"), vec![vec![30.0; 6]]);

    // 262144 resident pages per pid, charted as pages / 1024^2.
    assert_eq!(series_values(&output, "RSS Usage (Sum)"), vec![vec![0.5; 6]]);
    // 1 GB of vsize per pid.
    assert_eq!(
        series_values(&output, "RSS & VSize Usage"),
        vec![vec![0.5; 6], vec![2.0; 6]]
    );

    // cputime grows by 3 per pid per second; first difference starts at 0.
    assert_eq!(
        series_values(&output, "CPU Time (Sum)"),
        vec![vec![0.0, 6.0, 6.0, 6.0, 6.0, 6.0]]
    );

    // rchar grows by 4 KB per pid per second, wchar never moves.
    let io = series_values(&output, "IO Activity");
    assert_eq!(io[0], vec![0.0, 8.0, 8.0, 8.0, 8.0, 8.0]);
    assert!(io[1].iter().all(|v| *v == 0.0));
}

#[test]
fn test_report_state_timeline_and_distribution() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path());
    let mut output = InMemoryOutput::new();
    generate(&config(input, dir.path().join("out")), &mut output).unwrap();

    let FigureBody::Timeline { tracks } = &output.get("CPU Process State").unwrap().body else {
        panic!("expected a timeline");
    };
    let labels: Vec<&str> = tracks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["CPU 0", "CPU 1"]);
    assert_eq!(tracks[0].bars.len(), 1);
    assert_eq!(tracks[0].bars[0].label, "Running");
    assert_eq!(tracks[0].bars[0].seconds, 5.0);
    assert_eq!(tracks[1].bars[0].label, "Sleep");

    let figure = output.get("IO Distribution").unwrap();
    assert_eq!(figure.x_label, "IO Sizes");
    assert_eq!(figure.y_label, "IO Frequency");
    let FigureBody::Bars { categories, series } = &figure.body else {
        panic!("expected bars");
    };
    assert_eq!(categories.len(), 16);
    assert_eq!(series[0].name, "Read");
    assert_eq!(series[1].name, "Write");

    let k4 = categories.iter().position(|c| c == "4K").unwrap();
    assert_eq!(series[0].values[0], 2.0);
    assert_eq!(series[0].values[k4], 10.0);
    assert_eq!(series[1].values[0], 12.0);
    assert_eq!(series[1].values.iter().sum::<f64>(), 12.0);
}

#[test]
fn test_report_without_process_records() {
    let dir = TempDir::new().unwrap();
    let input = write_lines(
        dir.path(),
        "cgroup_only.csv",
        &[common::cgroup_line(0), common::cgroup_line(1)],
    );

    let mut output = InMemoryOutput::new();
    let summary = generate(&config(input, dir.path().join("out")), &mut output).unwrap();

    assert_eq!(summary.artifacts.len(), 15);
    assert_eq!(summary.process_rows, 0);
    assert_eq!(summary.cgroup_rows, 2);
    assert!(summary.time_range.is_none());
    assert!(series_values(&output, "CPU Usage (Sum)")[0].is_empty());
}

#[test]
fn test_report_writes_svg_files() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path());
    let out_dir = dir.path().join("charts");
    fs::create_dir_all(&out_dir).unwrap();

    let mut output = SvgOutput::new(800, 600).with_tick_interval(1);
    let summary = generate(&config(input, out_dir.clone()), &mut output).unwrap();

    assert_eq!(summary.artifacts.len(), 15);
    for (artifact, title) in summary.artifacts.iter().zip(REPORT_TITLES) {
        let expected = out_dir.join(format!("{}.svg", title.replace(' ', "_")));
        assert_eq!(artifact, &expected);
        let svg = fs::read_to_string(artifact).unwrap();
        assert!(svg.contains("<svg"), "{} is not an SVG", artifact.display());
    }
}

#[test]
fn test_malformed_record_aborts_report() {
    let dir = TempDir::new().unwrap();
    let input = write_lines(
        dir.path(),
        "bad.csv",
        &[
            common::process_line(0, 1),
            "2024/03/01T10:00:01,/proc/1,1,R".to_string(),
        ],
    );

    let mut output = InMemoryOutput::new();
    let err = generate(&config(input, dir.path().join("out")), &mut output).unwrap_err();

    let parse = err.downcast_ref::<ParseError>().expect("expected a ParseError");
    assert!(matches!(
        parse,
        ParseError::FieldCount {
            line: 2,
            expected: 27,
            got: 4
        }
    ));
    assert!(output.is_empty());
}

#[test]
fn test_rss_charts_use_resident_pages() {
    let dir = TempDir::new().unwrap();
    let input = write_capture(dir.path());
    let mut output = InMemoryOutput::new();
    generate(&config(input, dir.path().join("out")), &mut output).unwrap();

    for title in ["RSS & VSize Usage", "RSS & VSize Stacked Usage"] {
        let legend: Vec<String> = output
            .get(title)
            .unwrap()
            .legend()
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(legend, vec!["rss", "vsize"], "{title}");
    }
}

#[test]
fn test_bad_cgroup_record_keeps_charts() {
    let dir = TempDir::new().unwrap();
    let input = write_lines(
        dir.path(),
        "bad_cgroup.csv",
        &[
            common::process_line(0, 1),
            common::process_line(1, 1),
            "2024/03/01T10:00:01,/cgroup/job_1/step_0,2".to_string(),
        ],
    );

    let mut output = InMemoryOutput::new();
    let err = generate(&config(input, dir.path().join("out")), &mut output).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::FieldCount {
            line: 1,
            expected: 12,
            got: 3
        })
    ));
    assert_eq!(output.len(), REPORT_TITLES.len());
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut output = InMemoryOutput::new();
    let err = generate(
        &config(dir.path().join("missing.csv"), dir.path().join("out")),
        &mut output,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("missing.csv"));
}
