//! E2E tests for `kiln watch`

mod common;

use std::io::{BufRead, BufReader};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Duration as TimeDelta, FixedOffset, Utc};
use common::TestProject;

fn events_until(
    lines: &mpsc::Receiver<String>,
    timeout: Duration,
    done: impl Fn(&[String]) -> bool,
) -> Vec<String> {
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    while !done(&seen) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match lines.recv_timeout(remaining) {
            Ok(line) => seen.push(line),
            Err(_) => break,
        }
    }
    seen
}

fn count(events: &[String], name: &str) -> usize {
    let needle = format!("\"event\":\"{name}\"");
    events.iter().filter(|line| line.contains(&needle)).count()
}

#[test]
fn watch_json_reports_start_and_rebuilds_on_change() {
    let project = TestProject::new();
    project
        .write("kiln.toml", "[compiler]\nout_dir = \"dist\"\n[watch]\ndebounce_ms = 50\n")
        .write("a.ts", "export const a = 1;\n");

    let mut child = project.spawn(&["watch", "--json"]);
    let stdout = child.stdout.take().unwrap();
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if sender.send(line).is_err() {
                break;
            }
        }
    });

    let started = events_until(&receiver, Duration::from_secs(10), |seen| {
        count(seen, "watch_started") > 0
    });
    assert_eq!(count(&started, "cycle_complete"), 1, "events:\n{}", started.join("\n"));
    assert!(started.iter().all(|line| line.contains("\"command\":\"watch\"")));
    assert!(project.path("dist/a.js").exists());

    // Give the native watcher a moment before touching the file.
    thread::sleep(Duration::from_millis(300));
    project.write("a.ts", "export const a = 'x\n");

    let rebuilt = events_until(&receiver, Duration::from_secs(10), |seen| {
        count(seen, "cycle_complete") > 0
    });
    let _ = child.kill();
    let _ = child.wait();

    assert!(count(&rebuilt, "file_changed") >= 1, "events:\n{}", rebuilt.join("\n"));
    assert!(
        rebuilt.iter().any(|line| line.contains("\"code\":1002")),
        "events:\n{}",
        rebuilt.join("\n")
    );
    assert!(rebuilt.iter().any(|line| line.contains("\"errors\":1")));
}

#[test]
fn watch_with_unusable_config_exits_two() {
    let project = TestProject::new();
    project.write("kiln.toml", "[compiler\n");

    let result = project.run(&["watch"]);
    assert_eq!(result.exit_code, 2);
    assert!(result.stdout.contains("error KL5014"), "stdout:\n{}", result.stdout);
}

#[test]
fn watch_status_time_is_local_wall_time() {
    let project = TestProject::new();
    project
        .write("kiln.toml", "[compiler]\nno_emit = true\n")
        .write("a.ts", "export {};\n");

    // UTC+9 without DST, in POSIX form so no zoneinfo lookup is needed.
    let mut child = project
        .command(&["watch", "--preserve-watch-output"])
        .env("TZ", "JST-9")
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .expect("Failed to spawn kiln");
    let before = Utc::now();
    let stdout = child.stdout.take().unwrap();
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if sender.send(line).is_err() {
                break;
            }
        }
    });

    let lines = events_until(&receiver, Duration::from_secs(10), |seen| {
        seen.iter().any(|line| line.contains("Starting compilation in watch mode"))
    });
    let _ = child.kill();
    let _ = child.wait();

    let status = lines
        .iter()
        .find(|line| line.contains("Starting compilation in watch mode"))
        .unwrap_or_else(|| panic!("no status line in:\n{}", lines.join("\n")));
    let shown = status.split(" - ").next().unwrap().trim().to_string();

    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let candidates: Vec<String> = (-1..=10)
        .map(|offset| {
            (before + TimeDelta::seconds(offset))
                .with_timezone(&tokyo)
                .format("%-I:%M:%S %p")
                .to_string()
        })
        .collect();
    assert!(
        candidates.contains(&shown),
        "status time {shown:?} is not local time; expected one of {candidates:?}"
    );
}
