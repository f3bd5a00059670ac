use std::sync::{Arc, Mutex};

use tabload::LoadError;
use tabload::loader::{DataLoader, FileLoader, LoadRequest};
use tabload::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStage, LoadStats};
use tabload::reader::ReadOptions;
use tabload::sink::{Sink, WriteOptions};
use tabload::types::{Column, DataType, TabularData, Value};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(LoadStage, usize)>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push((ctx.stage, stats.rows));
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &LoadError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

struct NullSink;

impl Sink for NullSink {
    fn write(
        &mut self,
        data: &TabularData,
        _table: &str,
        _options: &WriteOptions,
    ) -> Result<usize, LoadError> {
        Ok(data.row_count())
    }
}

struct FailingSink;

impl Sink for FailingSink {
    fn write(
        &mut self,
        _data: &TabularData,
        table: &str,
        _options: &WriteOptions,
    ) -> Result<usize, LoadError> {
        Err(LoadError::SchemaMismatch {
            message: format!("table '{table}' is incompatible"),
        })
    }
}

fn one_row() -> TabularData {
    TabularData::new(vec![Column::new(
        "id",
        DataType::Integer,
        vec![Value::Integer(1)],
    )])
    .unwrap()
}

#[test]
fn missing_file_reports_a_critical_failure_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let loader = FileLoader::new("tests/fixtures/does_not_exist.csv", ReadOptions::default())
        .with_observer(obs.clone(), LoadSeverity::Critical);

    let mut sink = NullSink;
    let _ = loader
        .load_into(&mut sink, &LoadRequest::new("t"))
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Critical]);
}

#[test]
fn write_failures_report_error_severity_without_alerting() {
    let obs = Arc::new(RecordingObserver::default());
    let loader =
        DataLoader::new(one_row()).with_observer(obs.clone(), LoadSeverity::Critical);

    let mut sink = FailingSink;
    let _ = loader
        .load_into(&mut sink, &LoadRequest::new("t"))
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lowering_the_threshold_turns_failures_into_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let loader = DataLoader::new(one_row()).with_observer(obs.clone(), LoadSeverity::Error);

    let mut sink = FailingSink;
    let _ = loader
        .load_into(&mut sink, &LoadRequest::new("t"))
        .unwrap_err();

    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Error]);
}

#[test]
fn both_stages_report_success_with_row_counts() {
    let obs = Arc::new(RecordingObserver::default());
    let loader = FileLoader::new("tests/fixtures/people.csv", ReadOptions::default())
        .with_observer(obs.clone(), LoadSeverity::Critical);

    let mut sink = NullSink;
    let written = loader.load_into(&mut sink, &LoadRequest::new("people")).unwrap();
    assert_eq!(written, 3);

    assert_eq!(
        *obs.successes.lock().unwrap(),
        vec![(LoadStage::Read, 3), (LoadStage::Write, 3)]
    );
}
