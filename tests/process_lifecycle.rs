// tests/process_lifecycle.rs
//
// Real build tool and real processes, driven through the rebuild pipeline.
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, wait_until, with_timeout};

use std::fs;
use std::path::{Path, PathBuf};

use livereload::engine::{CycleOutcome, RebuildPipeline};
use livereload::exec::{BuildSpec, CommandBuilder, Supervisor, TokioLauncher};
use livereload::status::{SharedSink, StatusLevel};
use livereload::types::Stream;
use livereload_test_utils::sink::RecordingSink;

/// Build command that writes a long-running shell script named `app`.
fn script_build(dir: &Path) -> BuildSpec {
    BuildSpec {
        command: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            concat!(
                "if [ -f broken ]; then echo 'syntax error' >&2; exit 2; fi; ",
                "printf '#!/bin/sh\\necho started \"$@\"\\nexec sleep 30\\n' > app && chmod +x app",
            )
            .to_string(),
        ],
        output: PathBuf::from("app"),
        working_dir: Some(dir.to_path_buf()),
    }
}

fn pipeline(spec: BuildSpec, sink: &SharedSink, args: Vec<String>) -> RebuildPipeline {
    let launcher = TokioLauncher::new(sink.clone(), spec.working_dir.clone());
    let supervisor = Supervisor::new(Box::new(launcher), &spec.output, args, sink.clone());
    RebuildPipeline::new(
        Box::new(CommandBuilder::new(spec, sink.clone())),
        supervisor,
        true,
        sink.clone(),
    )
}

fn alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
        && fs::read_to_string(format!("/proc/{pid}/stat"))
            .map(|stat| !stat.contains(") Z "))
            .unwrap_or(false)
}

/// Tear down the instance left running at the end of a test.
fn reap(pid: Option<u32>) {
    if let Some(pid) = pid {
        let _ = std::process::Command::new("kill")
            .args(["-9", &pid.to_string()])
            .status();
    }
}

#[tokio::test]
async fn build_launch_and_replace_a_real_process() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let recording = RecordingSink::new();
    let sink: SharedSink = recording.clone();
    let pipeline = pipeline(script_build(dir.path()), &sink, vec!["--port=8080".to_string()]);

    assert_eq!(with_timeout(pipeline.run_cycle()).await, CycleOutcome::Restarted);
    let first = pipeline.current_pid().await.unwrap();

    wait_until(|| {
        recording
            .relayed()
            .iter()
            .any(|(_, stream, line)| *stream == Stream::Stdout && line == "started --port=8080")
    })
    .await;

    assert_eq!(with_timeout(pipeline.run_cycle()).await, CycleOutcome::Restarted);
    let second = pipeline.current_pid().await.unwrap();
    assert_ne!(first, second);

    if Path::new("/proc").exists() {
        wait_until(|| !alive(first)).await;
        assert!(alive(second));
    }

    reap(Some(second));
}

#[tokio::test]
async fn failed_build_keeps_the_running_process() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let recording = RecordingSink::new();
    let sink: SharedSink = recording.clone();
    let pipeline = pipeline(script_build(dir.path()), &sink, Vec::new());

    assert_eq!(with_timeout(pipeline.run_cycle()).await, CycleOutcome::Restarted);
    let pid = pipeline.current_pid().await;

    fs::write(dir.path().join("broken"), "").unwrap();
    assert_eq!(with_timeout(pipeline.run_cycle()).await, CycleOutcome::BuildFailed);

    assert_eq!(pipeline.current_pid().await, pid);
    assert!(recording.contains(StatusLevel::Error, "exited with status 2"));
    assert!(recording
        .relayed()
        .iter()
        .any(|(_, stream, line)| *stream == Stream::Stderr && line == "syntax error"));

    reap(pid);
}

#[tokio::test]
async fn program_outlives_a_dropped_pipeline() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let sink: SharedSink = RecordingSink::new();
    let pipeline = pipeline(script_build(dir.path()), &sink, Vec::new());

    assert_eq!(with_timeout(pipeline.run_cycle()).await, CycleOutcome::Restarted);
    let pid = pipeline.current_pid().await.unwrap();
    drop(pipeline);

    if Path::new("/proc").exists() {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(alive(pid));
    }
    reap(Some(pid));
}

#[tokio::test]
async fn missing_artifact_is_a_launch_failure() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let sink: SharedSink = RecordingSink::new();
    let spec = BuildSpec {
        command: "true".to_string(),
        args: Vec::new(),
        output: PathBuf::from("never-built"),
        working_dir: Some(dir.path().to_path_buf()),
    };
    let pipeline = pipeline(spec, &sink, Vec::new());

    assert_eq!(with_timeout(pipeline.run_cycle()).await, CycleOutcome::LaunchFailed);
    assert!(!pipeline.is_running().await);
}
