// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read, reconcile and write JUnit reports produced by CI runs that retry flaky tests.
//!
//! A retried test shows up in a JUnit report as two adjacent `<testcase>` elements with the same
//! name. [`Report::reconcile_reruns`] marks every failed attempt that was followed by a rerun as
//! skipped, keeping the original failure text in the skip message.
//!
//! ```
//! use junit_rerun::{Report, TestCaseOutcome};
//!
//! let input = r#"<testsuites>
//!     <testsuite tests="2" failures="1" time="0.5" name="pkg">
//!         <testcase classname="pkg" name="TestFoo" time="0.1">
//!             <failure message="Failed" type="">assert 1==2</failure>
//!         </testcase>
//!         <testcase classname="pkg" name="TestFoo" time="0.1"></testcase>
//!     </testsuite>
//! </testsuites>"#;
//!
//! let mut report = Report::deserialize_from_str(input).unwrap();
//! let summary = report.reconcile_reruns();
//! assert_eq!(summary.len(), 1);
//!
//! let first = &report.testsuites[0].testcases[0];
//! assert_eq!(
//!     first.outcome.skip_message(),
//!     Some("RERUN: assert 1==2"),
//! );
//! ```

#![warn(missing_docs)]

mod deserialize;
mod errors;
mod reconcile;
mod report;
mod serialize;

pub use errors::*;
pub use reconcile::*;
pub use report::*;
