// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `junit-revise` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum ReviseExitCode {}

impl ReviseExitCode {
    /// No errors occurred and `junit-revise` exited normally.
    ///
    /// This is also the exit code when no input file was given and only usage was printed.
    pub const OK: i32 = 0;

    /// The input report could not be opened or read.
    pub const INPUT_READ_FAILED: i32 = 96;

    /// The input is not a recognizable JUnit report.
    pub const REPORT_PARSE_FAILED: i32 = 97;

    /// Serializing or writing the revised report, or writing to stderr, produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
