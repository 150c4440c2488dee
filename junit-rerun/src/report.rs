// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    DeserializeError, SerializeError, deserialize::deserialize_report,
    serialize::serialize_report,
};
use std::io;

/// The root element of a JUnit report (`<testsuites>`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// The test suites contained in this report, in document order.
    pub testsuites: Vec<TestSuite>,
}

impl Report {
    /// Creates a new, empty `Report`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a testsuite to the end of this report.
    pub fn add_testsuite(&mut self, testsuite: TestSuite) -> &mut Self {
        self.testsuites.push(testsuite);
        self
    }

    /// Adds several testsuites to the end of this report.
    pub fn add_testsuites(&mut self, testsuites: impl IntoIterator<Item = TestSuite>) -> &mut Self {
        self.testsuites.extend(testsuites);
        self
    }

    /// Reads a report from an XML string.
    ///
    /// Elements and attributes that are not part of the data model (for example `<system-out>`)
    /// are ignored.
    pub fn deserialize_from_str(input: &str) -> Result<Self, DeserializeError> {
        deserialize_report(input)
    }

    /// Reads a report from XML bytes, which must be valid UTF-8.
    pub fn deserialize_from_slice(input: &[u8]) -> Result<Self, DeserializeError> {
        let input = std::str::from_utf8(input).map_err(|err| DeserializeError::InvalidUtf8 {
            position: err.valid_up_to(),
            err,
        })?;
        deserialize_report(input)
    }

    /// Serialize this report to the given writer.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_report(self, writer).map_err(SerializeError::from)
    }

    /// Serialize this report to a string.
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        String::from_utf8(buf).map_err(|utf8_err| {
            SerializeError::from(quick_xml::Error::NonDecodable(Some(utf8_err.utf8_error())))
        })
    }
}

/// Represents a single testsuite.
///
/// A `TestSuite` groups together several `TestCase` instances. The counts and time are carried as
/// written in the source document and are never recomputed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestSuite {
    /// The name of this testsuite.
    pub name: String,

    /// The declared number of tests, verbatim.
    pub tests: String,

    /// The declared number of failures, verbatim.
    pub failures: String,

    /// The time taken by the testsuite, verbatim.
    pub time: String,

    /// Custom properties recorded for the testsuite, e.g. the toolchain version.
    pub properties: Vec<Property>,

    /// The testcases that form this testsuite, in document order.
    pub testcases: Vec<TestCase>,
}

impl TestSuite {
    /// Creates a new `TestSuite` with zero declared tests and failures.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: "0".to_owned(),
            failures: "0".to_owned(),
            time: String::new(),
            properties: vec![],
            testcases: vec![],
        }
    }

    /// Sets the declared number of tests.
    pub fn set_tests(&mut self, tests: impl Into<String>) -> &mut Self {
        self.tests = tests.into();
        self
    }

    /// Sets the declared number of failures.
    pub fn set_failures(&mut self, failures: impl Into<String>) -> &mut Self {
        self.failures = failures.into();
        self
    }

    /// Sets the time taken for the testsuite.
    pub fn set_time(&mut self, time: impl Into<String>) -> &mut Self {
        self.time = time.into();
        self
    }

    /// Returns the declared number of tests, if it is a valid count.
    pub fn declared_tests(&self) -> Option<usize> {
        self.tests.trim().parse().ok()
    }

    /// Returns the declared number of failures, if it is a valid count.
    pub fn declared_failures(&self) -> Option<usize> {
        self.failures.trim().parse().ok()
    }

    /// Adds a property to this testsuite.
    pub fn add_property(&mut self, property: impl Into<Property>) -> &mut Self {
        self.properties.push(property.into());
        self
    }

    /// Adds several properties to the end of this testsuite.
    pub fn add_properties(
        &mut self,
        properties: impl IntoIterator<Item = impl Into<Property>>,
    ) -> &mut Self {
        for property in properties {
            self.add_property(property);
        }
        self
    }

    /// Adds a testcase to the end of this testsuite.
    ///
    /// The declared counts are left untouched.
    pub fn add_testcase(&mut self, testcase: TestCase) -> &mut Self {
        self.testcases.push(testcase);
        self
    }

    /// Adds several testcases to the end of this testsuite.
    pub fn add_testcases(&mut self, testcases: impl IntoIterator<Item = TestCase>) -> &mut Self {
        self.testcases.extend(testcases);
        self
    }
}

/// Represents a single testcase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    /// The "classname" of the testcase.
    ///
    /// Typically, this represents the package or module the test lives in. Together with `name`
    /// it identifies a test, but only `name` is used to detect reruns.
    pub classname: String,

    /// The name of the testcase.
    pub name: String,

    /// The time it took to execute this testcase, verbatim.
    pub time: String,

    /// The outcome of this testcase.
    pub outcome: TestCaseOutcome,
}

impl TestCase {
    /// Creates a new testcase.
    pub fn new(name: impl Into<String>, outcome: TestCaseOutcome) -> Self {
        Self {
            classname: String::new(),
            name: name.into(),
            time: String::new(),
            outcome,
        }
    }

    /// Sets the classname of the test.
    pub fn set_classname(&mut self, classname: impl Into<String>) -> &mut Self {
        self.classname = classname.into();
        self
    }

    /// Sets the time taken for the testcase.
    pub fn set_time(&mut self, time: impl Into<String>) -> &mut Self {
        self.time = time.into();
        self
    }

    /// Replaces the outcome of this testcase, returning the previous one.
    pub fn replace_outcome(&mut self, outcome: TestCaseOutcome) -> TestCaseOutcome {
        std::mem::replace(&mut self.outcome, outcome)
    }
}

/// The outcome of a testcase.
///
/// A testcase carries at most one of a failure or a skip record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TestCaseOutcome {
    /// This testcase has no outcome annotation, i.e. it passed.
    #[default]
    Normal,

    /// This testcase failed. Serialized as `<failure>`.
    Failed(FailureRecord),

    /// This testcase was skipped. Serialized as `<skipped>`.
    Skipped(SkipRecord),
}

impl TestCaseOutcome {
    /// Creates a new failed outcome with the given diagnostic text.
    pub fn failed(contents: impl Into<String>) -> Self {
        TestCaseOutcome::Failed(FailureRecord::new(contents))
    }

    /// Creates a new skipped outcome with the given message.
    pub fn skipped(message: impl Into<String>) -> Self {
        TestCaseOutcome::Skipped(SkipRecord::new(message))
    }

    /// Returns true if this outcome is a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, TestCaseOutcome::Failed(_))
    }

    /// Returns true if this outcome is a skip.
    pub fn is_skipped(&self) -> bool {
        matches!(self, TestCaseOutcome::Skipped(_))
    }

    /// Returns the failure record, if this outcome is a failure.
    pub fn failure(&self) -> Option<&FailureRecord> {
        match self {
            TestCaseOutcome::Failed(failure) => Some(failure),
            TestCaseOutcome::Normal | TestCaseOutcome::Skipped(_) => None,
        }
    }

    /// Returns the skip message, if this outcome is a skip.
    pub fn skip_message(&self) -> Option<&str> {
        match self {
            TestCaseOutcome::Skipped(skip) => Some(&skip.message),
            TestCaseOutcome::Normal | TestCaseOutcome::Failed(_) => None,
        }
    }
}

/// Data attached to a failed testcase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FailureRecord {
    /// The failure message.
    pub message: String,

    /// The "type" of failure that occurred.
    pub ty: String,

    /// The diagnostic text of the failure.
    ///
    /// This is serialized and deserialized from the text node of the element.
    pub contents: String,
}

impl FailureRecord {
    /// Creates a new `FailureRecord` with the given diagnostic text.
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            message: String::new(),
            ty: String::new(),
            contents: contents.into(),
        }
    }

    /// Sets the message.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = message.into();
        self
    }

    /// Sets the type.
    pub fn set_type(&mut self, ty: impl Into<String>) -> &mut Self {
        self.ty = ty.into();
        self
    }
}

/// Data attached to a skipped testcase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkipRecord {
    /// The reason why the testcase was skipped.
    pub message: String,
}

impl SkipRecord {
    /// Creates a new `SkipRecord`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Custom properties set during test execution, e.g. environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    /// The name of the property.
    pub name: String,

    /// The value of the property.
    pub value: String,
}

impl Property {
    /// Creates a new `Property` instance.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T> From<(T, T)> for Property
where
    T: Into<String>,
{
    fn from((k, v): (T, T)) -> Self {
        Property::new(k, v)
    }
}
