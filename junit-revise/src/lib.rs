// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Revises JUnit XML reports produced by test runners that rerun failing tests.
//!
//! Run `junit-revise --file report.xml` to write `report.xml.revised`, in which every failed
//! attempt that was immediately retried is recorded as skipped instead. See [`junit_rerun`] for
//! the library that does the work.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::ReviseExitCode;
#[doc(hidden)]
pub use output::OutputWriter;
pub use output::{LOG_ENV, OutputContext, StderrStyles};
