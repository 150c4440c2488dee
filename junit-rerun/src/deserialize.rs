// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deserialize a `Report`.
//!
//! Only the elements and attributes that are part of the data model are read. Everything else is
//! skipped, the way Go's `encoding/xml` (which produces most of the reports this crate deals with)
//! ignores unknown fields.

use crate::{
    DeserializeError, FailureRecord, Property, Report, SkipRecord, TestCase, TestCaseOutcome,
    TestSuite,
    serialize::{
        FAILURE_TAG, PROPERTIES_TAG, PROPERTY_TAG, SKIPPED_TAG, TESTCASE_TAG, TESTSUITE_TAG,
        TESTSUITES_TAG,
    },
};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

type XmlReader<'i> = Reader<&'i [u8]>;

pub(crate) fn deserialize_report(input: &str) -> Result<Report, DeserializeError> {
    let mut reader = Reader::from_str(input);

    loop {
        let position = reader.buffer_position();
        match read_event(&mut reader)? {
            Event::Start(start) => {
                check_root(&start, position)?;
                return deserialize_testsuites(&mut reader);
            }
            Event::Empty(start) => {
                check_root(&start, position)?;
                return Ok(Report::new());
            }
            Event::Eof => return Err(DeserializeError::MissingRoot),
            // Declarations, comments, doctypes and whitespace before the root.
            _ => {}
        }
    }
}

fn check_root(start: &BytesStart<'_>, position: usize) -> Result<(), DeserializeError> {
    if is_tag(start, TESTSUITES_TAG) {
        Ok(())
    } else {
        Err(DeserializeError::UnexpectedRoot {
            found: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            position,
        })
    }
}

fn deserialize_testsuites(reader: &mut XmlReader<'_>) -> Result<Report, DeserializeError> {
    let mut report = Report::new();

    loop {
        let position = reader.buffer_position();
        match read_event(reader)? {
            Event::Start(start) if is_tag(&start, TESTSUITE_TAG) => {
                let mut testsuite = testsuite_from_attributes(&start, position)?;
                deserialize_testsuite_children(reader, &mut testsuite)?;
                report.add_testsuite(testsuite);
            }
            Event::Empty(start) if is_tag(&start, TESTSUITE_TAG) => {
                report.add_testsuite(testsuite_from_attributes(&start, position)?);
            }
            Event::Start(start) => skip_element(reader, &start)?,
            Event::End(_) => return Ok(report),
            Event::Eof => {
                return Err(DeserializeError::UnexpectedEof {
                    element: TESTSUITES_TAG,
                });
            }
            _ => {}
        }
    }
}

fn testsuite_from_attributes(
    start: &BytesStart<'_>,
    position: usize,
) -> Result<TestSuite, DeserializeError> {
    let mut testsuite = TestSuite::new("");
    for_each_attribute(start, position, |key, value| match key {
        b"name" => testsuite.name = value,
        b"tests" => testsuite.tests = value,
        b"failures" => testsuite.failures = value,
        b"time" => testsuite.time = value,
        _ => {}
    })?;
    Ok(testsuite)
}

fn deserialize_testsuite_children(
    reader: &mut XmlReader<'_>,
    testsuite: &mut TestSuite,
) -> Result<(), DeserializeError> {
    loop {
        let position = reader.buffer_position();
        match read_event(reader)? {
            Event::Start(start) if is_tag(&start, PROPERTIES_TAG) => {
                deserialize_properties(reader, &mut testsuite.properties)?;
            }
            Event::Start(start) if is_tag(&start, TESTCASE_TAG) => {
                let mut testcase = testcase_from_attributes(&start, position)?;
                deserialize_testcase_children(reader, &mut testcase)?;
                testsuite.add_testcase(testcase);
            }
            Event::Empty(start) if is_tag(&start, TESTCASE_TAG) => {
                testsuite.add_testcase(testcase_from_attributes(&start, position)?);
            }
            Event::Start(start) => skip_element(reader, &start)?,
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(DeserializeError::UnexpectedEof {
                    element: TESTSUITE_TAG,
                });
            }
            _ => {}
        }
    }
}

fn deserialize_properties(
    reader: &mut XmlReader<'_>,
    properties: &mut Vec<Property>,
) -> Result<(), DeserializeError> {
    loop {
        let position = reader.buffer_position();
        match read_event(reader)? {
            Event::Empty(start) if is_tag(&start, PROPERTY_TAG) => {
                properties.push(property_from_attributes(&start, position)?);
            }
            Event::Start(start) if is_tag(&start, PROPERTY_TAG) => {
                properties.push(property_from_attributes(&start, position)?);
                skip_element(reader, &start)?;
            }
            Event::Start(start) => skip_element(reader, &start)?,
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(DeserializeError::UnexpectedEof {
                    element: PROPERTIES_TAG,
                });
            }
            _ => {}
        }
    }
}

fn property_from_attributes(
    start: &BytesStart<'_>,
    position: usize,
) -> Result<Property, DeserializeError> {
    let mut property = Property::new("", "");
    for_each_attribute(start, position, |key, value| match key {
        b"name" => property.name = value,
        b"value" => property.value = value,
        _ => {}
    })?;
    Ok(property)
}

fn testcase_from_attributes(
    start: &BytesStart<'_>,
    position: usize,
) -> Result<TestCase, DeserializeError> {
    let mut testcase = TestCase::new("", TestCaseOutcome::Normal);
    for_each_attribute(start, position, |key, value| match key {
        b"classname" => testcase.classname = value,
        b"name" => testcase.name = value,
        b"time" => testcase.time = value,
        _ => {}
    })?;
    Ok(testcase)
}

fn deserialize_testcase_children(
    reader: &mut XmlReader<'_>,
    testcase: &mut TestCase,
) -> Result<(), DeserializeError> {
    loop {
        let position = reader.buffer_position();
        let outcome = match read_event(reader)? {
            Event::Start(start) if is_tag(&start, FAILURE_TAG) => {
                let mut failure = failure_from_attributes(&start, position)?;
                failure.contents = read_text_contents(reader, FAILURE_TAG)?;
                TestCaseOutcome::Failed(failure)
            }
            Event::Empty(start) if is_tag(&start, FAILURE_TAG) => {
                TestCaseOutcome::Failed(failure_from_attributes(&start, position)?)
            }
            Event::Start(start) if is_tag(&start, SKIPPED_TAG) => {
                let skip = skip_from_attributes(&start, position)?;
                skip_element(reader, &start)?;
                TestCaseOutcome::Skipped(skip)
            }
            Event::Empty(start) if is_tag(&start, SKIPPED_TAG) => {
                TestCaseOutcome::Skipped(skip_from_attributes(&start, position)?)
            }
            Event::Start(start) => {
                skip_element(reader, &start)?;
                continue;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(DeserializeError::UnexpectedEof {
                    element: TESTCASE_TAG,
                });
            }
            _ => continue,
        };

        set_outcome(testcase, outcome, position)?;
    }
}

/// Records an outcome read from the document.
///
/// A repeated element of the same kind replaces the earlier one. A failure and a skip on the same
/// testcase can't be represented and are rejected.
fn set_outcome(
    testcase: &mut TestCase,
    outcome: TestCaseOutcome,
    position: usize,
) -> Result<(), DeserializeError> {
    let conflicting = matches!(
        (&testcase.outcome, &outcome),
        (TestCaseOutcome::Failed(_), TestCaseOutcome::Skipped(_))
            | (TestCaseOutcome::Skipped(_), TestCaseOutcome::Failed(_))
    );
    if conflicting {
        return Err(DeserializeError::ConflictingOutcome {
            name: testcase.name.clone(),
            position,
        });
    }

    testcase.outcome = outcome;
    Ok(())
}

fn failure_from_attributes(
    start: &BytesStart<'_>,
    position: usize,
) -> Result<FailureRecord, DeserializeError> {
    let mut failure = FailureRecord::default();
    for_each_attribute(start, position, |key, value| match key {
        b"message" => failure.message = value,
        b"type" => failure.ty = value,
        _ => {}
    })?;
    Ok(failure)
}

fn skip_from_attributes(
    start: &BytesStart<'_>,
    position: usize,
) -> Result<SkipRecord, DeserializeError> {
    let mut skip = SkipRecord::default();
    for_each_attribute(start, position, |key, value| {
        if key == b"message" {
            skip.message = value;
        }
    })?;
    Ok(skip)
}

/// Reads the direct text and CDATA contents of an element, up to and including its end tag.
///
/// Text inside nested elements is not included.
fn read_text_contents(
    reader: &mut XmlReader<'_>,
    element: &'static str,
) -> Result<String, DeserializeError> {
    let mut contents = String::new();

    loop {
        let position = reader.buffer_position();
        match read_event(reader)? {
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| DeserializeError::xml(position, err))?;
                contents.push_str(&text);
            }
            Event::CData(cdata) => {
                let text = reader
                    .decoder()
                    .decode(&cdata)
                    .map_err(|err| DeserializeError::xml(position, err))?;
                contents.push_str(&text);
            }
            Event::Start(start) => skip_element(reader, &start)?,
            Event::End(_) => return Ok(contents),
            Event::Eof => return Err(DeserializeError::UnexpectedEof { element }),
            _ => {}
        }
    }
}

/// Calls `f` with the name and unescaped value of every attribute of `start`.
fn for_each_attribute(
    start: &BytesStart<'_>,
    position: usize,
    mut f: impl FnMut(&[u8], String),
) -> Result<(), DeserializeError> {
    for attr in start.attributes() {
        let attr = attr.map_err(|err| DeserializeError::xml(position, err))?;
        let value = attr
            .unescape_value()
            .map_err(|err| DeserializeError::xml(position, err))?;
        f(attr.key.as_ref(), value.into_owned());
    }
    Ok(())
}

fn skip_element(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> Result<(), DeserializeError> {
    reader
        .read_to_end(start.name())
        .map_err(|err| DeserializeError::xml(reader.buffer_position(), err))?;
    Ok(())
}

fn read_event<'i>(reader: &mut XmlReader<'i>) -> Result<Event<'i>, DeserializeError> {
    reader
        .read_event()
        .map_err(|err| DeserializeError::xml(reader.buffer_position(), err))
}

fn is_tag(start: &BytesStart<'_>, tag: &str) -> bool {
    start.name().as_ref() == tag.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn deserialize_go_junit_report() {
        let input = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <testsuites>
            	<testsuite tests="3" failures="1" time="1.250" name="github.com/acme/widget">
            		<properties>
            			<property name="go.version" value="go1.21.3"></property>
            		</properties>
            		<testcase classname="widget" name="TestFoo" time="0.010">
            			<failure message="Failed" type="">widget_test.go:12: &#xA;want 2, got 1</failure>
            		</testcase>
            		<testcase classname="widget" name="TestFoo" time="0.008"></testcase>
            		<testcase classname="widget" name="TestBaz" time="0.001">
            			<skipped message="not on this platform"></skipped>
            		</testcase>
            	</testsuite>
            </testsuites>
        "#};

        let report = Report::deserialize_from_str(input).expect("report is valid");

        let mut testsuite = TestSuite::new("github.com/acme/widget");
        testsuite.set_tests("3").set_failures("1").set_time("1.250");
        testsuite.add_property(("go.version", "go1.21.3"));

        let mut failure = FailureRecord::new("widget_test.go:12: \nwant 2, got 1");
        failure.set_message("Failed");
        let mut testcase = TestCase::new("TestFoo", TestCaseOutcome::Failed(failure));
        testcase.set_classname("widget").set_time("0.010");
        testsuite.add_testcase(testcase);

        let mut testcase = TestCase::new("TestFoo", TestCaseOutcome::Normal);
        testcase.set_classname("widget").set_time("0.008");
        testsuite.add_testcase(testcase);

        let mut testcase =
            TestCase::new("TestBaz", TestCaseOutcome::skipped("not on this platform"));
        testcase.set_classname("widget").set_time("0.001");
        testsuite.add_testcase(testcase);

        let mut expected = Report::new();
        expected.add_testsuite(testsuite);

        assert_eq!(report, expected);
    }

    #[test]
    fn deserialize_ignores_unknown_elements_and_attributes() {
        let input = indoc! {r#"
            <!-- produced by some tool -->
            <testsuites name="run" tests="2">
            	<testsuite tests="2" failures="1" errors="0" hostname="ci-1" time="0.3" name="pkg">
            		<system-out>suite output</system-out>
            		<testcase classname="pkg" name="TestA" time="0.1" assertions="4">
            			<system-err>noise</system-err>
            			<failure message="boom" type="panic">first line<detail>nested text</detail> second line<![CDATA[ <raw> ]]></failure>
            		</testcase>
            		<testcase name="TestB"/>
            	</testsuite>
            	<unknown><testsuite name="hidden"/></unknown>
            </testsuites>
            trailing text
        "#};

        let report = Report::deserialize_from_str(input).expect("report is valid");
        assert_eq!(report.testsuites.len(), 1, "nested unknown content is skipped");

        let testsuite = &report.testsuites[0];
        assert_eq!(testsuite.name, "pkg");
        assert_eq!(testsuite.declared_tests(), Some(2));
        assert_eq!(testsuite.declared_failures(), Some(1));
        assert!(testsuite.properties.is_empty());
        assert_eq!(testsuite.testcases.len(), 2);

        let failure = testsuite.testcases[0]
            .outcome
            .failure()
            .expect("first testcase failed");
        assert_eq!(failure.message, "boom");
        assert_eq!(failure.ty, "panic");
        assert_eq!(failure.contents, "first line second line <raw> ");

        let second = &testsuite.testcases[1];
        assert_eq!(second.name, "TestB");
        assert_eq!(second.classname, "");
        assert_eq!(second.time, "");
        assert_eq!(second.outcome, TestCaseOutcome::Normal);
    }

    #[test]
    fn deserialize_keeps_counts_verbatim() {
        let input = r#"<testsuites><testsuite tests="many" time="soon" name="odd"/></testsuites>"#;
        let report = Report::deserialize_from_str(input).expect("report is valid");

        let testsuite = &report.testsuites[0];
        assert_eq!(testsuite.tests, "many");
        assert_eq!(testsuite.declared_tests(), None);
        assert_eq!(testsuite.failures, "0", "missing count defaults to 0");
        assert_eq!(testsuite.time, "soon");
    }

    #[test]
    fn deserialize_empty_root() {
        let report = Report::deserialize_from_str("<testsuites/>").expect("report is valid");
        assert_eq!(report, Report::new());
    }

    #[test]
    fn deserialize_repeated_failure_keeps_last() {
        let input = indoc! {r#"
            <testsuites><testsuite name="s"><testcase name="t">
                <failure message="first">one</failure>
                <failure message="second">two</failure>
            </testcase></testsuite></testsuites>
        "#};
        let report = Report::deserialize_from_str(input).expect("report is valid");
        let failure = report.testsuites[0].testcases[0].outcome.failure().unwrap();
        assert_eq!(failure.message, "second");
        assert_eq!(failure.contents, "two");
    }

    #[test_case(
        "",
        |err| matches!(err, DeserializeError::MissingRoot)
        ; "empty input"
    )]
    #[test_case(
        "<?xml version=\"1.0\"?>\n<!-- nothing -->\n",
        |err| matches!(err, DeserializeError::MissingRoot)
        ; "no elements"
    )]
    #[test_case(
        "<testsuite name=\"s\"></testsuite>",
        |err| matches!(err, DeserializeError::UnexpectedRoot { found, position: 0 } if found == "testsuite")
        ; "wrong root"
    )]
    #[test_case(
        "<testsuites><testsuite name=\"s\"><testcase name=\"t\">",
        |err| matches!(err, DeserializeError::UnexpectedEof { element: "testcase" })
        ; "truncated testcase"
    )]
    #[test_case(
        "<testsuites><testsuite name=\"s\">",
        |err| matches!(err, DeserializeError::UnexpectedEof { element: "testsuite" })
        ; "truncated testsuite"
    )]
    #[test_case(
        "<testsuites><testsuite name=\"s\"></testcase></testsuites>",
        |err| matches!(err, DeserializeError::Xml { .. })
        ; "mismatched end tag"
    )]
    #[test_case(
        "<testsuites><testsuite name=\"s\"><testcase name=\"t\"><failure>x</failure><skipped/></testcase></testsuite></testsuites>",
        |err| matches!(err, DeserializeError::ConflictingOutcome { name, .. } if name == "t")
        ; "failure and skipped"
    )]
    #[test_case(
        "<testsuites><testsuite name=\"a&bogus;b\"/></testsuites>",
        |err| matches!(err, DeserializeError::Xml { .. })
        ; "unknown entity"
    )]
    fn deserialize_errors(input: &str, check: fn(&DeserializeError) -> bool) {
        let err = Report::deserialize_from_str(input).expect_err("input is invalid");
        assert!(check(&err), "unexpected error: {err:?}");
    }

    #[test]
    fn deserialize_from_slice_rejects_invalid_utf8() {
        let input = b"<testsuites><testsuite name=\"\xff\"/></testsuites>";
        let err = Report::deserialize_from_slice(input).expect_err("input is not UTF-8");
        assert!(
            matches!(err, DeserializeError::InvalidUtf8 { position: 29, .. }),
            "unexpected error: {err:?}"
        );

        let report = Report::deserialize_from_slice(b"<testsuites/>").expect("report is valid");
        assert_eq!(report, Report::new());
    }
}
