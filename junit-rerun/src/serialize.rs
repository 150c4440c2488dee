// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `Report`.

use crate::{
    FailureRecord, Property, Report, SkipRecord, TestCase, TestCaseOutcome, TestSuite,
};
use quick_xml::{
    Writer,
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{borrow::Cow, io};

pub(crate) static TESTSUITES_TAG: &str = "testsuites";
pub(crate) static TESTSUITE_TAG: &str = "testsuite";
pub(crate) static TESTCASE_TAG: &str = "testcase";
pub(crate) static PROPERTIES_TAG: &str = "properties";
pub(crate) static PROPERTY_TAG: &str = "property";
pub(crate) static FAILURE_TAG: &str = "failure";
pub(crate) static SKIPPED_TAG: &str = "skipped";

pub(crate) fn serialize_report(report: &Report, writer: impl io::Write) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b'\t', 1);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_report_impl(report, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()
}

pub(crate) fn serialize_report_impl(
    report: &Report,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let Report { testsuites } = report;

    serialize_empty_start_tag(TESTSUITES_TAG, writer)?;
    for testsuite in testsuites {
        serialize_testsuite(testsuite, writer)?;
    }
    serialize_end_tag(TESTSUITES_TAG, writer)
}

fn serialize_testsuite(
    testsuite: &TestSuite,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let TestSuite {
        name,
        tests,
        failures,
        time,
        properties,
        testcases,
    } = testsuite;

    let mut testsuite_tag = BytesStart::new(TESTSUITE_TAG);
    push_attributes(
        &mut testsuite_tag,
        [
            ("tests", tests.as_str()),
            ("failures", failures.as_str()),
            ("time", time.as_str()),
            ("name", name.as_str()),
        ],
    );

    if properties.is_empty() && testcases.is_empty() {
        return writer.write_event(Event::Empty(testsuite_tag));
    }
    writer.write_event(Event::Start(testsuite_tag))?;

    if !properties.is_empty() {
        serialize_empty_start_tag(PROPERTIES_TAG, writer)?;
        for property in properties {
            serialize_property(property, writer)?;
        }
        serialize_end_tag(PROPERTIES_TAG, writer)?;
    }

    for testcase in testcases {
        serialize_testcase(testcase, writer)?;
    }

    serialize_end_tag(TESTSUITE_TAG, writer)
}

fn serialize_property(
    property: &Property,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut property_tag = BytesStart::new(PROPERTY_TAG);
    push_attributes(
        &mut property_tag,
        [
            ("name", property.name.as_str()),
            ("value", property.value.as_str()),
        ],
    );

    writer.write_event(Event::Empty(property_tag))
}

fn serialize_testcase(
    testcase: &TestCase,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let TestCase {
        classname,
        name,
        time,
        outcome,
    } = testcase;

    let mut testcase_tag = BytesStart::new(TESTCASE_TAG);
    push_attributes(
        &mut testcase_tag,
        [
            ("classname", classname.as_str()),
            ("name", name.as_str()),
            ("time", time.as_str()),
        ],
    );

    match outcome {
        TestCaseOutcome::Normal => writer.write_event(Event::Empty(testcase_tag)),
        TestCaseOutcome::Failed(failure) => {
            writer.write_event(Event::Start(testcase_tag))?;
            serialize_failure(failure, writer)?;
            serialize_end_tag(TESTCASE_TAG, writer)
        }
        TestCaseOutcome::Skipped(skip) => {
            writer.write_event(Event::Start(testcase_tag))?;
            serialize_skip(skip, writer)?;
            serialize_end_tag(TESTCASE_TAG, writer)
        }
    }
}

fn serialize_failure(
    failure: &FailureRecord,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let FailureRecord {
        message,
        ty,
        contents,
    } = failure;

    let mut tag = BytesStart::new(FAILURE_TAG);
    push_attributes(&mut tag, [("message", message.as_str()), ("type", ty.as_str())]);

    if contents.is_empty() {
        return writer.write_event(Event::Empty(tag));
    }

    // The text is written on the same line as the tag so that the contents round-trip exactly.
    writer.write_event(Event::Start(tag))?;
    writer.write_event(Event::Text(BytesText::from_escaped(escape_text(contents))))?;
    serialize_end_tag(FAILURE_TAG, writer)
}

fn serialize_skip(skip: &SkipRecord, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    let mut tag = BytesStart::new(SKIPPED_TAG);
    push_attributes(&mut tag, [("message", skip.message.as_str())]);

    writer.write_event(Event::Empty(tag))
}

/// Adds attributes to `tag`, escaping whitespace that readers would otherwise normalize away.
fn push_attributes<'a>(
    tag: &mut BytesStart<'_>,
    attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
) {
    for (key, value) in attributes {
        let value = escape_attribute(value);
        tag.push_attribute((key.as_bytes(), value.as_bytes()));
    }
}

/// Escapes an attribute value.
///
/// Attribute-value normalization turns literal newlines, carriage returns and tabs into spaces,
/// so they are written as character references.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape_chars(escape(value), &['\n', '\r', '\t'])
}

/// Escapes element text. Readers normalize a literal `\r\n` to `\n`, so `\r` is written as a
/// character reference.
fn escape_text(text: &str) -> Cow<'_, str> {
    escape_chars(escape(text), &['\r'])
}

fn escape_chars<'a>(escaped: Cow<'a, str>, chars: &[char]) -> Cow<'a, str> {
    if !escaped.contains(chars) {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' if chars.contains(&c) => out.push_str("&#xA;"),
            '\r' if chars.contains(&c) => out.push_str("&#xD;"),
            '\t' if chars.contains(&c) => out.push_str("&#x9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn serialize_empty_start_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let tag = BytesStart::new(tag_name);
    writer.write_event(Event::Start(tag))
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let end_tag = BytesEnd::new(tag_name);
    writer.write_event(Event::End(end_tag))
}
