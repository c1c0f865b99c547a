use std::{
    cell::RefCell,
    io,
    rc::Rc,
    sync::{Arc, Mutex},
};

use kisuite::{
    declare::BuildContext,
    discover,
    outcome::{NamePath, TestStatus, display_path},
    report::RunReport,
    reporter::{CollectingReporter, Event, color::SupportsColor, pretty::PrettyReporter},
    session::{CycleOutcome, Session},
};
use pretty_assertions::assert_eq;

mod specs;

#[derive(Debug, Default, Clone)]
struct Calls(Rc<RefCell<Vec<String>>>);

impl Calls {
    fn record(&self, label: &'static str) -> impl Fn() + 'static {
        let calls = self.0.clone();
        move || calls.borrow_mut().push(label.to_string())
    }

    fn take(&self) -> Vec<String> {
        self.0.take()
    }
}

#[derive(Debug, Default, Clone)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("poison error"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SupportsColor for Buffer {
    fn supports_color(&self) -> bool {
        false
    }
}

impl Buffer {
    fn to_string_lossy(&self) -> String {
        let guard = self.0.lock().unwrap();
        String::from_utf8_lossy(&guard).into_owned()
    }
}

fn outcome_lines(report: &RunReport) -> Vec<String> {
    report
        .outcomes()
        .into_iter()
        .map(|(path, outcome)| {
            let status = match outcome.status {
                TestStatus::Passed => "pass",
                TestStatus::Failed(_) => "fail",
                TestStatus::Errored(_) => "error",
            };
            format!("{} {status}", display_path(path))
        })
        .collect()
}

fn a_and_b(cx: &mut BuildContext<'_>, calls: &Calls, t3_only: bool) {
    cx.describe("A", |cx| {
        cx.before(calls.record("A before"));
        cx.after(calls.record("A after"));
        cx.test("t1", || ());
        cx.test("t2", || -> Result<(), &str> { Err("expected 1, got 2") });
    });
    cx.describe("B", |cx| match t3_only {
        true => {
            cx.test_only("t3", || ());
        }
        false => {
            cx.test("t3", || ());
        }
    });
}

#[test]
fn runs_in_declaration_order_and_summarizes() {
    let calls = Calls::default();
    let mut session = Session::new();
    session.declare(|cx| a_and_b(cx, &calls, false));

    let report = session.run_all_tests();

    assert_eq!(
        outcome_lines(&report),
        ["A > t1 pass", "A > t2 fail", "B > t3 pass"]
    );
    assert_eq!(report.summary.passed, 2);
    assert_eq!(report.summary.failed, 1);
    assert!(!report.summary.is_success());
    assert_eq!(calls.take(), ["A before", "A after"]);
}

#[test]
fn only_skips_unrelated_suites_and_their_hooks() {
    let calls = Calls::default();
    let mut session = Session::new();
    session.declare(|cx| a_and_b(cx, &calls, true));

    let report = session.run_all_tests();

    assert_eq!(outcome_lines(&report), ["B > t3 pass"]);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.filtered_out, 2);
    assert!(calls.take().is_empty());
}

#[test]
fn reset_and_reload_is_idempotent() {
    let calls = Calls::default();
    let mut session = Session::new();

    let mut cycles = Vec::new();
    for _ in 0..2 {
        session.reset();
        session.declare(|cx| a_and_b(cx, &calls, false));
        cycles.push(outcome_lines(&session.run_all_tests()));
    }

    assert_eq!(cycles[0], cycles[1]);
    assert_eq!(session.tree().test_count(), 3);
}

#[test]
fn skip_wins_over_nested_only() {
    let mut session = Session::new();
    session.declare(|cx| {
        cx.describe_skip("skipped", |cx| {
            cx.describe("inner", |cx| {
                cx.it_only("focused", || ());
            });
        });
        cx.describe("kept", |cx| {
            cx.it("runs", || ());
        });
    });

    let report = session.run_all_tests();

    // "skipped" carries the only mark up, so "kept" is filtered too
    assert!(report.outcomes().is_empty());
    assert_eq!(report.summary.filtered_out, 2);
}

#[test]
fn deeply_nested_only_runs_every_ancestor() {
    let mut session = Session::new();
    session.declare(|cx| {
        cx.describe("outer", |cx| {
            cx.it("sibling", || ());
            cx.describe("middle", |cx| {
                cx.it("other", || ());
                cx.describe("inner", |cx| {
                    cx.it_only("focused", || ());
                    cx.it("neighbour", || ());
                });
            });
        });
        cx.describe("unrelated", |cx| {
            cx.it("never", || ());
        });
    });

    let report = session.run_all_tests();

    assert_eq!(
        outcome_lines(&report),
        ["outer > middle > inner > focused pass"]
    );
}

#[test]
fn each_hooks_nest_around_tests() {
    let calls = Calls::default();
    let mut session = Session::new();
    session.declare(|cx| {
        cx.describe("one", |cx| {
            cx.before_each(calls.record("one before_each"));
            cx.after_each(calls.record("one after_each"));
            cx.describe("two", |cx| {
                cx.before_each(calls.record("two before_each"));
                cx.after_each(calls.record("two after_each"));
                cx.describe("three", |cx| {
                    cx.before_each(calls.record("three before_each"));
                    cx.after_each(calls.record("three after_each"));
                    cx.it("test", calls.record("test"));
                });
            });
        });
    });

    assert!(session.run_all_tests().summary.is_success());
    assert_eq!(
        calls.take(),
        [
            "one before_each",
            "two before_each",
            "three before_each",
            "test",
            "three after_each",
            "two after_each",
            "one after_each",
        ]
    );
}

#[test]
fn failing_before_errors_its_suite_and_siblings_continue() {
    let calls = Calls::default();
    let collecting = CollectingReporter::new();
    let mut session = Session::new().with_reporter(collecting.clone());
    session.declare(|cx| {
        cx.describe("broken", |cx| {
            cx.before(|| -> Result<(), &str> { Err("database unavailable") });
            cx.after(calls.record("broken after"));
            cx.it("never runs", calls.record("never runs"));
        });
        cx.describe("healthy", |cx| {
            cx.it("runs", calls.record("runs"));
        });
    });

    let report = session.run_all_tests();

    assert_eq!(
        outcome_lines(&report),
        ["broken > never runs error", "healthy > runs pass"]
    );
    assert_eq!(report.summary.errored, 1);
    assert_eq!(calls.take(), ["runs"]);

    let hook_errors: Vec<NamePath> = collecting
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::HookError(failure) => Some(failure.suite),
            _ => None,
        })
        .collect();
    assert_eq!(hook_errors, [vec!["broken".to_string()]]);
}

#[test]
fn async_actions_are_awaited() {
    let mut session = Session::new();
    session.declare(|cx| {
        cx.it(
            "resolves",
            kisuite::action::ActionHandle::from_future(|| async { Ok::<(), String>(()) }),
        );
        cx.it(
            "rejects",
            kisuite::action::ActionHandle::from_future(|| async {
                Err::<(), _>("rejected".to_string())
            }),
        );
    });

    let report = session.run_all_tests();

    assert_eq!(outcome_lines(&report), ["resolves pass", "rejects fail"]);
}

#[test]
fn pretty_output() {
    let buffer = Buffer::default();
    let calls = Calls::default();
    let mut session = Session::new().with_reporter(
        PrettyReporter::default()
            .with_target(buffer.clone())
            .with_color_setting(kisuite::reporter::color::ColorSetting::Never),
    );
    session.declare(|cx| a_and_b(cx, &calls, false));

    let report = session.run_all_tests();
    assert!(report.reporter_errors.is_empty());

    let output = buffer.to_string_lossy();
    let mut lines = output.lines().filter(|line| !line.is_empty());
    assert_eq!(lines.next(), Some("running 3 tests"));
    assert_eq!(lines.next(), Some("test A > t1 ... ok"));
    assert_eq!(lines.next(), Some("test A > t2 ... FAILED"));
    assert_eq!(lines.next(), Some("test B > t3 ... ok"));
    assert!(output.contains("\"expected 1, got 2\""));
    let summary = output.lines().rev().find(|line| !line.is_empty()).unwrap();
    assert!(
        summary.starts_with("test result: FAILED. 2 passed; 1 failed; 0 errored; 0 hook errors; 0 filtered out;"),
        "{summary}"
    );
}

#[test]
fn failed_after_hook_shows_in_the_summary() {
    let buffer = Buffer::default();
    let collecting = CollectingReporter::new();
    let mut session = Session::new()
        .with_reporter(
            PrettyReporter::default()
                .with_target(buffer.clone())
                .with_color_setting(kisuite::reporter::color::ColorSetting::Never),
        )
        .with_reporter(collecting.clone());
    session.declare(|cx| {
        cx.describe("db", |cx| {
            cx.after(|| -> Result<(), &str> { Err("pool still busy") });
            cx.it("connects", || ());
        });
    });

    let report = session.run_all_tests();

    assert_eq!(report.summary.hook_errors, 1);
    assert!(!report.summary.is_success());
    let finished: Vec<_> = collecting
        .finished()
        .into_iter()
        .map(|data| display_path(&data.path))
        .collect();
    assert_eq!(finished, ["db > connects"]);

    let output = buffer.to_string_lossy();
    assert!(output.contains("---- db (after hook) ----"), "{output}");
    let summary = output.lines().rev().find(|line| !line.is_empty()).unwrap();
    assert!(
        summary.starts_with("test result: FAILED. 1 passed; 0 failed; 0 errored; 1 hook errors; 0 filtered out;"),
        "{summary}"
    );
}

#[test]
fn registered_spec_files_are_discovered() {
    let all = discover::discover(&[]).unwrap();
    let paths: Vec<_> = all.iter().map(|file| file.path).collect();
    assert_eq!(
        paths,
        [
            "tests/scenarios/specs/ambient.rs",
            "tests/scenarios/specs/explicit.rs"
        ]
    );

    let err = discover::discover(&["no/such/*.rs".to_string()]).unwrap_err();
    assert!(err.to_string().contains("no/such/*.rs"));
}

#[test]
fn cli_cycle_runs_registered_files() {
    let outcome = kisuite::run_from([
        "kisuite",
        "--globals",
        "--format",
        "none",
        "tests/scenarios/specs/*.rs",
    ])
    .unwrap();

    let CycleOutcome::Ran(report) = outcome else {
        panic!("expected a run");
    };
    assert_eq!(
        outcome_lines(&report),
        ["ambient > declared without a context pass", "explicit > adds pass"]
    );
}

#[test]
fn ambient_files_need_globals_on_the_command_line() {
    let err = kisuite::run_from(["kisuite", "--format", "none"]).unwrap_err();
    assert!(err.to_string().contains("enable globals"), "{err}");
}
