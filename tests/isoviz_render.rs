//! End-to-end runs of the isometric renderer through the processor dispatch

use dataset_processors::config::IsovizConfig;
use dataset_processors::isoviz::{self, ingest, intervals};
use dataset_processors::pipeline::{run_processor, ProcessorRequest};
use dataset_processors::platform::{
    DatasetInfo, LocalContext, ParameterSet, ProcessorContext, ProcessorError, ProcessorKind,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Context that raises the interruption flag once a number of graphs were started
struct InterruptAfter {
    graphs: usize,
    started: AtomicUsize,
    interrupted: AtomicBool,
    statuses: Mutex<Vec<String>>,
}

impl InterruptAfter {
    fn new(graphs: usize) -> Self {
        InterruptAfter {
            graphs,
            started: AtomicUsize::new(0),
            interrupted: AtomicBool::new(false),
            statuses: Mutex::new(Vec::new()),
        }
    }
}

impl ProcessorContext for InterruptAfter {
    fn update_status(&self, message: &str, _is_final: bool) {
        self.statuses.lock().unwrap().push(message.to_string());
        if message.starts_with("Rendering graph for")
            && self.started.fetch_add(1, Ordering::SeqCst) + 1 >= self.graphs
        {
            self.interrupted.store(true, Ordering::SeqCst);
        }
    }

    fn update_progress(&self, _fraction: f64) {}

    fn log(&self, _message: &str) {}

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

fn write_csv(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("input.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

fn leftover_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != "input.csv")
        .collect();
    names.sort();
    names
}

#[test]
fn renders_through_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "item,date,value\nA,2020-01,1\nA,2020-03,3\nB,2020-02,2\n",
    );
    let output = dir.path().join("out").join("graphs.svg");

    let mut request = ProcessorRequest::new(Some(input), &output);
    request.params = ParameterSet::from_pairs(&["smooth=false"]).unwrap();
    request.parent = Some(DatasetInfo {
        dataset_type: "vector-ranker".to_string(),
        ..DatasetInfo::default()
    });

    let ctx = LocalContext::detached();
    let outcome = run_processor(ProcessorKind::IsometricGraphs, &ctx, &request).unwrap();

    assert_eq!(outcome.items, 2);
    assert_eq!(outcome.output.as_deref(), Some(output.as_path()));
    let svg = std::fs::read_to_string(&output).unwrap();
    assert!(svg.contains("<svg"));
    assert_eq!(svg.matches("<path").count(), 2);
    assert_eq!(ctx.progress(), 1.0);
}

#[test]
fn worked_example_axis_and_values() {
    let data = "item,date,value\nA,2020-01,1\nA,2020-03,3\nB,2020-02,2\n";
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let raw = ingest::read_series(&mut reader, &LocalContext::detached()).unwrap();
    let table = intervals::complete(raw).unwrap();

    assert_eq!(table.axis_keys(), vec!["2020-01", "2020-02", "2020-03"]);
    assert_eq!(table.get("A").unwrap().values, vec![1.0, 0.0, 3.0]);
    assert_eq!(table.get("B").unwrap().values, vec![0.0, 2.0, 0.0]);
}

#[test]
fn empty_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "item,date,value\n");
    let output = dir.path().join("graphs.svg");

    let outcome = isoviz::render_isometric_graphs(
        &LocalContext::detached(),
        &input,
        &output,
        &IsovizConfig::default(),
    )
    .unwrap();

    assert_eq!(outcome.items, 0);
    assert!(outcome.output.is_none());
    assert!(leftover_files(dir.path()).is_empty());
}

#[test]
fn headerless_or_unrecognised_empty_input_writes_nothing() {
    for contents in ["", "word,count\n"] {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(dir.path(), contents);
        let output = dir.path().join("graphs.svg");

        let outcome = isoviz::render_isometric_graphs(
            &LocalContext::detached(),
            &input,
            &output,
            &IsovizConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.items, 0, "input {:?}", contents);
        assert!(outcome.output.is_none());
        assert!(leftover_files(dir.path()).is_empty());
    }
}

#[test]
fn interruption_after_first_graph_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "item,date,value\nA,2020,1\nB,2020,2\nC,2021,3\n",
    );
    let output = dir.path().join("graphs.svg");

    let ctx = InterruptAfter::new(1);
    let err =
        isoviz::render_isometric_graphs(&ctx, &input, &output, &IsovizConfig::default())
            .unwrap_err();

    assert!(matches!(err, ProcessorError::Interrupted(_)));
    assert!(leftover_files(dir.path()).is_empty());

    // Only the first graph (the last series) was started
    let statuses = ctx.statuses.lock().unwrap();
    let rendering: Vec<&String> = statuses
        .iter()
        .filter(|s| s.starts_with("Rendering graph for"))
        .collect();
    assert_eq!(rendering, vec!["Rendering graph for 'C'"]);
}

#[test]
fn incompatible_parent_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "item,date,value\nA,2020,1\n");
    let output = dir.path().join("graphs.svg");

    let mut request = ProcessorRequest::new(Some(input), &output);
    request.parent = Some(DatasetInfo {
        dataset_type: "video-downloader".to_string(),
        ..DatasetInfo::default()
    });

    let err = run_processor(
        ProcessorKind::IsometricGraphs,
        &LocalContext::detached(),
        &request,
    )
    .unwrap_err();
    assert!(matches!(err, ProcessorError::Incompatible { .. }));
    assert!(!output.exists());
}
