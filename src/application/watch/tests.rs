//! Tests for the watch driver

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use super::{WatchCompilerHost, WatchDriver, WatchEvent};
use crate::config::Config;
use crate::domain::entities::{Diagnostic, DiagnosticCategory};
use crate::domain::ports::{CompilerHost, FileWatcherEventKind, Program, ProgramFactory, ProgramInput};
use crate::domain::value_objects::CompilerOptions;
use crate::test_support::{SpyProgram, Stage, TestSystem};

const CONFIG: &str = "[watch]\ndebounce_ms = 50\n";

fn project() -> TestSystem {
    TestSystem::new("/p")
        .with_watch()
        .with_file("/p/kiln.toml", CONFIG)
        .with_file("/p/a.ts", "let a = 1;")
        .with_file("/p/b.ts", "let b = 1;")
}

/// Reads every root through the host; files mentioning `missing` get an error.
fn reading_factory(builds: Rc<Cell<usize>>) -> Rc<dyn ProgramFactory> {
    Rc::new(move |input: &ProgramInput, host: Rc<dyn CompilerHost>| -> Rc<dyn Program> {
        builds.set(builds.get() + 1);
        let mut program = SpyProgram::new(&host.current_directory());
        program.set_options(input.options.clone());
        let mut semantic = Vec::new();
        for name in &input.root_names {
            if let Some(file) = host.get_source_file(name, &mut |_| {}) {
                if file.text().contains("missing") {
                    semantic.push(Diagnostic::new(DiagnosticCategory::Error, 2307, "Cannot find module 'missing'."));
                }
                program.add_file(file.file_name(), file.text());
            }
        }
        program.set_diagnostics(Stage::ConfigFile, input.config_file_parsing_diagnostics.clone());
        program.set_diagnostics(Stage::Semantic, semantic);
        Rc::new(program)
    })
}

fn session(test: &TestSystem) -> (WatchDriver, Rc<Cell<usize>>) {
    let builds = Rc::new(Cell::new(0));
    let host = WatchCompilerHost::of_config_file(
        "kiln.toml",
        CompilerOptions::default(),
        &test.system(),
        reading_factory(Rc::clone(&builds)),
        None,
        None,
    );
    (WatchDriver::new(host), builds)
}

fn source_names(driver: &WatchDriver) -> Vec<String> {
    driver
        .program()
        .map(|program| program.source_files().iter().map(|f| f.file_name().to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn initial_build_reports_status_and_watches_inputs() {
    let test = project();
    let (driver, builds) = session(&test);
    driver.start().unwrap();

    assert_eq!(builds.get(), 1);
    assert_eq!(driver.cycles(), 1);
    assert_eq!(driver.last_error_count(), Some(0));
    assert_eq!(
        test.output(),
        "\n12:00:00 AM - Starting compilation in watch mode...\n\n\
         \n12:00:00 AM - Found 0 errors. Watching for file changes.\n"
    );
    assert_eq!(test.watch().watched_files(), vec!["/p/a.ts", "/p/b.ts", "/p/kiln.toml"]);
    assert_eq!(test.watch().watched_directories(), vec!["/p"]);
    assert!(!driver.has_pending_rebuild());
}

#[test]
fn save_without_content_change_is_ignored() {
    let test = project();
    let (driver, builds) = session(&test);
    driver.start().unwrap();

    test.watch().trigger_file("/p/a.ts", FileWatcherEventKind::Changed);
    test.watch().trigger_file("/p/kiln.toml", FileWatcherEventKind::Changed);

    assert_eq!(test.watch().pending_timers(), 0);
    assert!(!driver.has_pending_rebuild());
    assert_eq!(builds.get(), 1);
}

#[test]
fn changes_are_debounced_into_one_rebuild() {
    let test = project();
    let (driver, builds) = session(&test);
    driver.start().unwrap();
    test.take_output();

    test.fs().add_file("/p/a.ts", "let a = 2;");
    test.watch().trigger_file("/p/a.ts", FileWatcherEventKind::Changed);
    test.fs().add_file("/p/b.ts", "let b = 2;");
    test.watch().trigger_file("/p/b.ts", FileWatcherEventKind::Changed);

    assert!(driver.has_pending_rebuild());
    assert_eq!(test.watch().pending_timers(), 1);
    assert_eq!(test.watch().cleared_timers(), 1);
    assert_eq!(test.watch().last_delay(), Some(Duration::from_millis(50)));
    assert_eq!(builds.get(), 1);

    assert_eq!(test.watch().run_timers(), 1);
    assert_eq!(builds.get(), 2);
    assert_eq!(driver.cycles(), 2);
    assert!(!driver.has_pending_rebuild());
    let output = test.output();
    assert!(output.starts_with("\n12:00:00 AM - File change detected. Starting incremental compilation...\n\n"));
    assert!(output.ends_with("Found 0 errors. Watching for file changes.\n"));
}

#[test]
fn rebuild_reports_new_errors_in_summary() {
    let test = project();
    let (driver, _) = session(&test);
    driver.start().unwrap();
    test.take_output();

    test.fs().add_file("/p/b.ts", "import { x } from \"missing\";");
    test.watch().trigger_file("/p/b.ts", FileWatcherEventKind::Changed);
    test.watch().run_timers();

    assert_eq!(driver.last_error_count(), Some(1));
    let output = test.output();
    assert!(output.contains("error KL2307: Cannot find module 'missing'."));
    assert!(output.ends_with("Found 1 error. Watching for file changes.\n"));
}

#[test]
fn deleted_file_triggers_rebuild() {
    let test = project();
    let (driver, builds) = session(&test);
    driver.start().unwrap();

    test.fs().remove("/p/b.ts");
    test.watch().trigger_file("/p/b.ts", FileWatcherEventKind::Deleted);
    test.watch().run_timers();

    assert_eq!(builds.get(), 2);
    assert_eq!(source_names(&driver), vec!["/p/a.ts"]);
}

#[test]
fn config_change_reloads_file_list_and_watches() {
    let test = project();
    let (driver, _) = session(&test);
    driver.start().unwrap();

    test.fs().add_file("/p/kiln.toml", "[files]\nfiles = [\"a.ts\"]\n\n[watch]\ndebounce_ms = 80\n");
    test.watch().trigger_file("/p/kiln.toml", FileWatcherEventKind::Changed);
    assert_eq!(test.watch().last_delay(), Some(Duration::from_millis(50)));
    test.watch().run_timers();

    assert_eq!(source_names(&driver), vec!["/p/a.ts"]);
    assert_eq!(test.watch().watched_files(), vec!["/p/a.ts", "/p/kiln.toml"]);
    assert!(test.watch().watched_directories().is_empty());

    test.fs().add_file("/p/a.ts", "let a = 3;");
    test.watch().trigger_file("/p/a.ts", FileWatcherEventKind::Changed);
    assert_eq!(test.watch().last_delay(), Some(Duration::from_millis(80)));
}

#[test]
fn new_file_in_wildcard_directory_is_picked_up() {
    let test = project();
    let (driver, _) = session(&test);
    driver.start().unwrap();

    test.fs().add_file("/p/notes.md", "");
    test.watch().trigger_directory("/p/notes.md");
    assert_eq!(test.watch().pending_timers(), 0);

    test.fs().add_file("/p/c.ts", "let c;");
    test.watch().trigger_directory("/p/c.ts");
    assert_eq!(test.watch().pending_timers(), 1);
    test.watch().run_timers();

    assert_eq!(source_names(&driver), vec!["/p/a.ts", "/p/b.ts", "/p/c.ts"]);
    assert!(test.watch().watched_files().contains(&"/p/c.ts".to_string()));
}

#[test]
fn broken_config_during_watch_is_fatal() {
    let test = project();
    let (driver, builds) = session(&test);
    driver.start().unwrap();

    test.fs().add_file("/p/kiln.toml", "[compiler\n");
    test.watch().trigger_file("/p/kiln.toml", FileWatcherEventKind::Changed);
    test.watch().run_timers();

    assert_eq!(driver.fatal().map(|d| d.code()), Some(5014));
    assert_eq!(builds.get(), 1);
    assert!(test.watch().watched_files().is_empty());
    assert!(test.watch().watched_directories().is_empty());
    assert!(test.output().contains("Failed to parse file '/p/kiln.toml'"));
}

#[test]
fn missing_config_at_start_builds_nothing() {
    let test = TestSystem::new("/p").with_watch().with_file("/p/a.ts", "");
    let (driver, builds) = session(&test);

    let err = driver.start().unwrap_err();
    assert_eq!(err.code(), 6053);
    assert_eq!(driver.fatal().map(|d| d.code()), Some(6053));
    assert_eq!(builds.get(), 0);
    assert!(test.watch().watched_files().is_empty());
}

#[test]
fn observer_sees_session_milestones() {
    let test = project();
    let (driver, _) = session(&test);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let driver = driver.with_observer(Rc::new(move |event: &WatchEvent| sink.borrow_mut().push(event.clone())));

    driver.start().unwrap();
    test.fs().add_file("/p/a.ts", "let a = 2;");
    test.watch().trigger_file("/p/a.ts", FileWatcherEventKind::Changed);
    test.watch().trigger_file("/p/a.ts", FileWatcherEventKind::Changed);
    test.watch().run_timers();
    driver.close();

    assert_eq!(
        *events.borrow(),
        vec![
            WatchEvent::CycleComplete { errors: 0, emitted: 0 },
            WatchEvent::WatchStarted {
                config: Some("/p/kiln.toml".into()),
                watching: vec!["/p/a.ts".into(), "/p/b.ts".into(), "/p/kiln.toml".into()],
            },
            WatchEvent::FileChanged { path: "/p/a.ts".into() },
            WatchEvent::CycleComplete { errors: 0, emitted: 0 },
            WatchEvent::Shutdown,
        ]
    );
    assert!(test.watch().watched_files().is_empty());
}

#[test]
fn dropped_driver_stops_reacting() {
    let test = project();
    let (driver, builds) = session(&test);
    driver.start().unwrap();
    drop(driver);

    test.fs().add_file("/p/a.ts", "let a = 2;");
    test.watch().trigger_file("/p/a.ts", FileWatcherEventKind::Changed);
    assert_eq!(test.watch().pending_timers(), 0);
    assert_eq!(builds.get(), 1);
}

#[test]
fn root_files_session_watches_only_roots() {
    let test = project();
    let builds = Rc::new(Cell::new(0));
    let host = WatchCompilerHost::of_root_files(
        vec!["a.ts".into()],
        Config::default(),
        CompilerOptions::default(),
        &test.system(),
        reading_factory(Rc::clone(&builds)),
        None,
        None,
    );
    assert_eq!(host.config_file_name(), None);
    let driver = WatchDriver::new(host);
    driver.start().unwrap();

    assert_eq!(test.watch().watched_files(), vec!["/p/a.ts"]);
    assert!(test.watch().watched_directories().is_empty());
}

#[test]
fn extended_diagnostics_print_timings_each_cycle() {
    let test = TestSystem::new("/p")
        .with_watch()
        .with_file("/p/kiln.toml", "[compiler]\nextended_diagnostics = true\n")
        .with_file("/p/a.ts", "");
    let (driver, _) = session(&test);
    driver.start().unwrap();

    let output = test.output();
    assert!(output.contains("I/O Read time:"), "{output}");
    assert_eq!(output.matches("I/O Read time:").count(), 1);
}

#[test]
fn status_lines_use_configured_new_line() {
    let test = TestSystem::new("/p")
        .with_watch()
        .with_file("/p/kiln.toml", "[compiler]\nnew_line = \"crlf\"\n")
        .with_file("/p/a.ts", "let a = 1;");
    let (driver, _) = session(&test);
    driver.start().unwrap();

    assert_eq!(
        test.output(),
        "\r\n12:00:00 AM - Starting compilation in watch mode...\r\n\r\n\
         \r\n12:00:00 AM - Found 0 errors. Watching for file changes.\r\n"
    );
}
