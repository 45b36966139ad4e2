//! Pipeline Properties
//!
//! Ordering, loss and isolation guarantees of the full pipeline, exercised
//! through the public API with mock processors.

use batchcls_core::application::{ItemSource, Pipeline, PipelineConfig, PipelineState};
use batchcls_core::port::error_reporter::mocks::CollectingReporter;
use batchcls_core::port::processor::mocks::MockProcessor;
use batchcls_core::port::{CollectingSink, LineWriterSink, ProcessError};
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

/// Three items, two workers: every result arrives, order is unspecified
#[tokio::test]
async fn test_three_items_two_workers() {
    let reporter = Arc::new(CollectingReporter::new());
    let report = Pipeline::new(
        PipelineConfig::with_workers(2),
        Arc::new(MockProcessor::upper()),
        CollectingSink::new(),
    )
    .with_reporter(reporter.clone())
    .run(ItemSource::items(["a.txt", "b.txt", "c.txt"]))
    .await
    .unwrap();

    assert_eq!(
        sorted(report.sink.into_results()),
        vec!["A.TXT", "B.TXT", "C.TXT"]
    );
    assert_eq!(report.final_state, PipelineState::Done);
    assert!(reporter.failures().is_empty());
}

/// One bad item out of many produces exactly one error and N-1 results
#[tokio::test]
async fn test_single_failure_is_isolated() {
    let items: Vec<String> = (0..40).map(|i| format!("img{}.png", i)).collect();
    let reporter = Arc::new(CollectingReporter::new());

    let report = Pipeline::new(
        PipelineConfig::with_workers(4),
        Arc::new(MockProcessor::failing_on(["img13.png"])),
        CollectingSink::new(),
    )
    .with_reporter(reporter.clone())
    .run(ItemSource::items(items))
    .await
    .unwrap();

    assert_eq!(report.submitted, 40);
    assert_eq!(report.succeeded, 39);
    assert_eq!(report.failed, 1);
    assert_eq!(report.sink.results().len(), 39);
    assert_eq!(
        reporter.messages(),
        vec!["could not process img13.png: mock failure".to_string()]
    );
}

/// Every submitted item ends up as exactly one result or one error
#[tokio::test]
async fn test_no_loss_no_duplication_under_contention() {
    let items: Vec<String> = (0..300).map(|i| format!("item-{:03}", i)).collect();
    let failing: Vec<String> = (0..300).step_by(7).map(|i| format!("item-{:03}", i)).collect();
    let reporter = Arc::new(CollectingReporter::new());

    let report = Pipeline::new(
        PipelineConfig::with_workers(8),
        Arc::new(MockProcessor::failing_on(failing.clone())),
        CollectingSink::new(),
    )
    .with_reporter(reporter.clone())
    .run(ItemSource::items(items.clone()))
    .await
    .unwrap();

    let results = report.sink.into_results();
    let failures: Vec<String> = reporter.failures().into_iter().map(|f| f.item).collect();
    assert_eq!(results.len() + failures.len(), items.len());
    assert_eq!(failures.len(), failing.len());

    let mut seen: HashSet<String> = results.iter().map(|r| r.to_lowercase()).collect();
    seen.extend(failures);
    assert_eq!(seen.len(), items.len());
}

/// A panicking processor call is one failed item, not a dead worker
#[tokio::test]
async fn test_panic_in_processor_is_contained() {
    let reporter = Arc::new(CollectingReporter::new());

    let report = Pipeline::new(
        PipelineConfig::with_workers(1),
        Arc::new(MockProcessor::panicking_on(["boom"])),
        CollectingSink::new(),
    )
    .with_reporter(reporter.clone())
    .run(ItemSource::items(["before", "boom", "after"]))
    .await
    .unwrap();

    assert_eq!(sorted(report.sink.into_results()), vec!["AFTER", "BEFORE"]);
    let failures = reporter.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].reason.contains("panicked"));
}

/// Sink sees every result even when the last worker finishes late
#[tokio::test]
async fn test_slow_workers_never_lose_tail_results() {
    let report = Pipeline::new(
        PipelineConfig::with_workers(3),
        Arc::new(MockProcessor::slow(Duration::from_millis(15))),
        CollectingSink::new(),
    )
    .run(ItemSource::items((0..9).map(|i| i.to_string())))
    .await
    .unwrap();

    assert_eq!(report.emitted, 9);
    assert_eq!(report.sink.results().len(), 9);
}

/// Streaming mode: filter applies per line, stream end closes the input
#[tokio::test]
async fn test_streaming_with_filter() {
    let input = "keep-1\nskip-1\r\nkeep-2\nskip-2\nkeep-3";
    let report = Pipeline::new(
        PipelineConfig::with_workers(2),
        Arc::new(MockProcessor::upper()),
        CollectingSink::new(),
    )
    .with_filter(Arc::new(|line: &str| line.starts_with("keep")))
    .run(ItemSource::lines(Cursor::new(input.as_bytes().to_vec())))
    .await
    .unwrap();

    assert_eq!(report.submitted, 3);
    assert_eq!(
        sorted(report.sink.into_results()),
        vec!["KEEP-1", "KEEP-2", "KEEP-3"]
    );
}

/// Enumerated items skip the filter; it is a streaming-only concern
#[tokio::test]
async fn test_enumeration_ignores_filter() {
    let report = Pipeline::new(
        PipelineConfig::with_workers(2),
        Arc::new(MockProcessor::upper()),
        CollectingSink::new(),
    )
    .with_filter(Arc::new(|_: &str| false))
    .run(ItemSource::items(["x", "y"]))
    .await
    .unwrap();

    assert_eq!(report.submitted, 2);
    assert_eq!(report.sink.results().len(), 2);
}

/// Empty input still walks the whole state machine
#[tokio::test]
async fn test_empty_input_reaches_done() {
    let report = Pipeline::new(
        PipelineConfig::with_workers(4),
        Arc::new(MockProcessor::upper()),
        CollectingSink::new(),
    )
    .run(ItemSource::items(Vec::<String>::new()))
    .await
    .unwrap();

    assert_eq!(report.submitted, 0);
    assert_eq!(
        report.history,
        vec![
            PipelineState::Starting,
            PipelineState::Producing,
            PipelineState::DrainingWorkers,
            PipelineState::ClosingOutput,
            PipelineState::DrainingSink,
            PipelineState::Done,
        ]
    );
}

/// Processor is shared by all workers; calls overlap when workers > 1
#[tokio::test]
async fn test_workers_run_concurrently() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let processor = {
        let active = Arc::clone(&active);
        let peak = Arc::clone(&peak);
        move |item: &str| -> Result<String, ProcessError> {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(30));
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(item.to_string())
        }
    };

    Pipeline::new(
        PipelineConfig::with_workers(4),
        Arc::new(processor),
        CollectingSink::new(),
    )
    .run(ItemSource::items((0..8).map(|i| i.to_string())))
    .await
    .unwrap();

    assert!(peak.load(Ordering::SeqCst) > 1);
}

/// Results are written one per line to a byte sink
#[tokio::test]
async fn test_line_writer_output() {
    let report = Pipeline::new(
        PipelineConfig::with_workers(1),
        Arc::new(MockProcessor::upper()),
        LineWriterSink::new(Vec::new()),
    )
    .run(ItemSource::items(["one", "two"]))
    .await
    .unwrap();

    let written = String::from_utf8(report.sink.into_inner()).unwrap();
    assert_eq!(written, "ONE\nTWO\n");
}

async fn stream_file_through(workers: usize, list: std::path::PathBuf) -> usize {
    let file = tokio::fs::File::open(list).await.unwrap();
    let report = Pipeline::new(
        PipelineConfig::with_workers(workers),
        Arc::new(MockProcessor::upper()),
        CollectingSink::new(),
    )
    .run(ItemSource::lines(tokio::io::BufReader::new(file)))
    .await
    .unwrap();
    report.sink.results().len()
}

fn write_list(dir: &tempfile::TempDir, count: usize) -> std::path::PathBuf {
    let path = dir.path().join("paths.txt");
    let body: String = (0..count).map(|i| format!("img{}.png\n", i)).collect();
    std::fs::write(&path, body).unwrap();
    path
}

/// File reads go through tokio's blocking pool; more workers than that pool
/// has threads must not starve the reader
#[tokio::test(flavor = "multi_thread")]
async fn test_streaming_with_more_workers_than_blocking_threads() {
    let dir = tempfile::tempdir().unwrap();
    let list = write_list(&dir, 50);

    let emitted = tokio::time::timeout(Duration::from_secs(60), stream_file_through(600, list))
        .await
        .expect("streaming run with 600 workers did not finish");
    assert_eq!(emitted, 50);
}

/// Same situation on a runtime whose blocking pool has a single thread
#[test]
fn test_streaming_on_minimal_blocking_pool() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .max_blocking_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let list = write_list(&dir, 200);

    let emitted = rt.block_on(async {
        tokio::time::timeout(Duration::from_secs(30), stream_file_through(8, list))
            .await
            .expect("reader starved by pipeline threads")
    });
    assert_eq!(emitted, 200);
}
