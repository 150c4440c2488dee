// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reclassify failed test attempts that were followed by a rerun.
//!
//! CI tooling that retries flaky tests typically appends the retried attempt right after the
//! failed one, with the same test name. The failed attempt is then stale: the last attempt is
//! what decides the outcome. Reconciliation turns each stale failure into a skip whose message is
//! [`RERUN_PREFIX`] followed by the original failure text, so the diagnostic isn't lost.

use crate::{Report, SkipRecord, TestCase, TestCaseOutcome, TestSuite};

/// The prefix of the skip message written for a superseded failure.
pub const RERUN_PREFIX: &str = "RERUN: ";

impl Report {
    /// Reclassifies every failed testcase that is immediately followed by a testcase with the same
    /// name in the same testsuite.
    ///
    /// Each testsuite is processed independently: the last testcase of a testsuite is never
    /// compared with the first testcase of the next one.
    pub fn reconcile_reruns(&mut self) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        for testsuite in &mut self.testsuites {
            testsuite.reconcile_reruns_impl(&mut summary);
        }
        summary
    }
}

impl TestSuite {
    /// Reclassifies every failed testcase in this testsuite that is immediately followed by a
    /// testcase with the same name.
    ///
    /// This is a single left-to-right pass. Only the name is compared, not the classname, and the
    /// outcome of the following testcase doesn't matter.
    pub fn reconcile_reruns(&mut self) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        self.reconcile_reruns_impl(&mut summary);
        summary
    }

    fn reconcile_reruns_impl(&mut self, summary: &mut ReconcileSummary) {
        // The last testcase has no successor, so it can never be superseded.
        for index in 0..self.testcases.len().saturating_sub(1) {
            if self.testcases[index].name != self.testcases[index + 1].name {
                continue;
            }

            let testcase = &mut self.testcases[index];
            if testcase.supersede_failure() {
                summary.superseded.push(SupersededTestCase {
                    testsuite: self.name.clone(),
                    classname: testcase.classname.clone(),
                    name: testcase.name.clone(),
                    index,
                });
            }
        }
    }
}

impl TestCase {
    /// Marks this testcase as superseded by a rerun, if it failed.
    ///
    /// The failure is replaced with a skip whose message is [`RERUN_PREFIX`] followed by the
    /// failure contents. The failure message and type are dropped. Returns true if the outcome
    /// was changed; testcases that passed or were skipped are left as they are.
    pub fn supersede_failure(&mut self) -> bool {
        let TestCaseOutcome::Failed(failure) = &self.outcome else {
            return false;
        };

        let skip = SkipRecord::new(format!("{RERUN_PREFIX}{}", failure.contents));
        self.outcome = TestCaseOutcome::Skipped(skip);
        true
    }
}

/// The testcases changed by a reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Testcases whose failure was replaced with a skip, in document order.
    pub superseded: Vec<SupersededTestCase>,
}

impl ReconcileSummary {
    /// Returns the number of superseded testcases.
    pub fn len(&self) -> usize {
        self.superseded.len()
    }

    /// Returns true if no testcases were changed.
    pub fn is_empty(&self) -> bool {
        self.superseded.is_empty()
    }
}

/// A failed testcase that was followed by a rerun.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupersededTestCase {
    /// The name of the testsuite the testcase belongs to.
    pub testsuite: String,

    /// The classname of the testcase.
    pub classname: String,

    /// The name of the testcase.
    pub name: String,

    /// The position of the testcase within its testsuite.
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailureRecord, Property};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[derive(Clone, Copy, Debug)]
    enum Case {
        Normal(&'static str),
        Failed(&'static str, &'static str),
        Skipped(&'static str, &'static str),
    }

    impl Case {
        fn to_testcase(self) -> TestCase {
            let (name, outcome) = match self {
                Case::Normal(name) => (name, TestCaseOutcome::Normal),
                Case::Failed(name, contents) => {
                    let mut failure = FailureRecord::new(contents);
                    failure.set_message("Failed").set_type("assertion");
                    (name, TestCaseOutcome::Failed(failure))
                }
                Case::Skipped(name, message) => (name, TestCaseOutcome::skipped(message)),
            };
            let mut testcase = TestCase::new(name, outcome);
            testcase.set_classname("pkg").set_time("0.010");
            testcase
        }
    }

    fn make_suite(name: &str, cases: &[Case]) -> TestSuite {
        let mut testsuite = TestSuite::new(name);
        testsuite
            .set_tests(cases.len().to_string())
            .set_failures("1")
            .set_time("1.5")
            .add_property(Property::new("go.version", "go1.21.3"));
        testsuite.add_testcases(cases.iter().map(|case| case.to_testcase()));
        testsuite
    }

    fn outcomes(testsuite: &TestSuite) -> Vec<TestCaseOutcome> {
        testsuite
            .testcases
            .iter()
            .map(|testcase| testcase.outcome.clone())
            .collect()
    }

    fn failed(contents: &'static str) -> TestCaseOutcome {
        Case::Failed("", contents).to_testcase().outcome
    }

    #[test_case(
        &[Case::Failed("TestFoo", "assert 1==2"), Case::Normal("TestFoo")],
        vec![TestCaseOutcome::skipped("RERUN: assert 1==2"), TestCaseOutcome::Normal]
        ; "failure followed by rerun"
    )]
    #[test_case(
        &[Case::Failed("TestFoo", "assert 1==2"), Case::Normal("TestBar")],
        vec![failed("assert 1==2"), TestCaseOutcome::Normal]
        ; "different names"
    )]
    #[test_case(
        &[Case::Failed("TestFoo", "first"), Case::Failed("TestFoo", "second"), Case::Normal("TestFoo")],
        vec![
            TestCaseOutcome::skipped("RERUN: first"),
            TestCaseOutcome::skipped("RERUN: second"),
            TestCaseOutcome::Normal,
        ]
        ; "chain of reruns"
    )]
    #[test_case(
        &[Case::Failed("TestFoo", "first"), Case::Failed("TestFoo", "second")],
        vec![TestCaseOutcome::skipped("RERUN: first"), failed("second")]
        ; "rerun failed again"
    )]
    #[test_case(
        &[Case::Failed("TestFoo", "only")],
        vec![failed("only")]
        ; "single failure"
    )]
    #[test_case(
        &[],
        vec![]
        ; "empty suite"
    )]
    #[test_case(
        &[Case::Failed("TestFoo", "boom"), Case::Skipped("TestFoo", "skipped later")],
        vec![TestCaseOutcome::skipped("RERUN: boom"), TestCaseOutcome::skipped("skipped later")]
        ; "rerun was skipped"
    )]
    #[test_case(
        &[Case::Skipped("TestFoo", "not run"), Case::Normal("TestFoo"), Case::Normal("TestFoo")],
        vec![TestCaseOutcome::skipped("not run"), TestCaseOutcome::Normal, TestCaseOutcome::Normal]
        ; "skipped and normal untouched"
    )]
    #[test_case(
        &[Case::Failed("TestFoo", "a"), Case::Normal("TestBar"), Case::Failed("TestFoo", "b"), Case::Normal("TestFoo")],
        vec![failed("a"), TestCaseOutcome::Normal, TestCaseOutcome::skipped("RERUN: b"), TestCaseOutcome::Normal]
        ; "only adjacent names match"
    )]
    #[test_case(
        &[Case::Failed("TestFoo", ""), Case::Normal("TestFoo")],
        vec![TestCaseOutcome::skipped("RERUN: "), TestCaseOutcome::Normal]
        ; "empty failure contents"
    )]
    fn reconcile_suite(cases: &[Case], expected: Vec<TestCaseOutcome>) {
        let original = make_suite("pkg", cases);
        let mut testsuite = original.clone();
        testsuite.reconcile_reruns();

        assert_eq!(outcomes(&testsuite), expected);

        // Everything but the outcomes is preserved.
        assert_eq!(testsuite.name, original.name);
        assert_eq!(testsuite.tests, original.tests);
        assert_eq!(testsuite.failures, original.failures);
        assert_eq!(testsuite.time, original.time);
        assert_eq!(testsuite.properties, original.properties);
        assert_eq!(testsuite.testcases.len(), original.testcases.len());
        for (after, before) in testsuite.testcases.iter().zip(&original.testcases) {
            assert_eq!(after.classname, before.classname);
            assert_eq!(after.name, before.name);
            assert_eq!(after.time, before.time);
        }
    }

    #[test]
    fn reconcile_uses_contents_not_message() {
        let mut failure = FailureRecord::new("widget_test.go:12: want 2, got 1");
        failure.set_message("Failed").set_type("go test");

        let mut testsuite = TestSuite::new("pkg");
        testsuite.add_testcases([
            TestCase::new("TestFoo", TestCaseOutcome::Failed(failure)),
            TestCase::new("TestFoo", TestCaseOutcome::Normal),
        ]);
        testsuite.reconcile_reruns();

        assert_eq!(
            testsuite.testcases[0].outcome,
            TestCaseOutcome::Skipped(SkipRecord::new(
                "RERUN: widget_test.go:12: want 2, got 1"
            )),
        );
    }

    #[test]
    fn reconcile_ignores_classname() {
        let mut first = TestCase::new("TestFoo", TestCaseOutcome::failed("boom"));
        first.set_classname("pkg/a");
        let mut second = TestCase::new("TestFoo", TestCaseOutcome::Normal);
        second.set_classname("pkg/b");

        let mut testsuite = TestSuite::new("pkg");
        testsuite.add_testcases([first, second]);
        let summary = testsuite.reconcile_reruns();

        assert_eq!(summary.len(), 1);
        assert_eq!(
            testsuite.testcases[0].outcome.skip_message(),
            Some("RERUN: boom")
        );
    }

    #[test]
    fn reconcile_never_crosses_testsuites() {
        let mut report = Report::new();
        report.add_testsuites([
            make_suite("first", &[Case::Normal("TestA"), Case::Failed("TestFoo", "boom")]),
            make_suite("second", &[Case::Normal("TestFoo"), Case::Normal("TestB")]),
        ]);
        let original = report.clone();

        let summary = report.reconcile_reruns();

        assert!(summary.is_empty());
        assert_eq!(report, original);
    }

    #[test]
    fn reconcile_report_summary() {
        let mut report = Report::new();
        report.add_testsuites([
            make_suite(
                "first",
                &[
                    Case::Failed("TestFoo", "a"),
                    Case::Normal("TestFoo"),
                    Case::Normal("TestBar"),
                ],
            ),
            make_suite(
                "second",
                &[
                    Case::Normal("TestBaz"),
                    Case::Failed("TestQux", "b"),
                    Case::Failed("TestQux", "c"),
                ],
            ),
        ]);

        let summary = report.reconcile_reruns();

        assert_eq!(
            summary.superseded,
            vec![
                SupersededTestCase {
                    testsuite: "first".to_owned(),
                    classname: "pkg".to_owned(),
                    name: "TestFoo".to_owned(),
                    index: 0,
                },
                SupersededTestCase {
                    testsuite: "second".to_owned(),
                    classname: "pkg".to_owned(),
                    name: "TestQux".to_owned(),
                    index: 1,
                },
            ]
        );
        assert_eq!(report.testsuites.len(), 2);
        assert!(report.testsuites[1].testcases[2].outcome.is_failed());
    }

    #[test]
    fn reconcile_twice_changes_nothing_more() {
        let mut report = Report::new();
        report.add_testsuite(make_suite(
            "pkg",
            &[
                Case::Failed("TestFoo", "a"),
                Case::Failed("TestFoo", "b"),
                Case::Normal("TestFoo"),
            ],
        ));

        assert_eq!(report.reconcile_reruns().len(), 2);
        let once = report.clone();
        assert!(report.reconcile_reruns().is_empty());
        assert_eq!(report, once);
    }

    #[test]
    fn supersede_failure_only_changes_failures() {
        let mut testcase = TestCase::new("TestFoo", TestCaseOutcome::Normal);
        assert!(!testcase.supersede_failure());
        assert_eq!(testcase.outcome, TestCaseOutcome::Normal);

        let mut testcase = TestCase::new("TestFoo", TestCaseOutcome::skipped("not run"));
        assert!(!testcase.supersede_failure());
        assert_eq!(testcase.outcome.skip_message(), Some("not run"));

        let mut testcase = TestCase::new("TestFoo", TestCaseOutcome::failed("boom"));
        assert!(testcase.supersede_failure());
        assert!(testcase.outcome.is_skipped());
        assert_eq!(testcase.outcome.failure(), None);
    }
}
