// Copyright (c) The junit-rerun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// An error that occurs while serializing a [`Report`](crate::Report).
///
/// Returned by [`Report::serialize`](crate::Report::serialize) and
/// [`Report::to_string`](crate::Report::to_string).
#[derive(Debug, Error)]
#[error("error serializing JUnit report")]
pub struct SerializeError {
    #[from]
    inner: quick_xml::Error,
}

/// An error that occurs while reading a [`Report`](crate::Report) from XML.
///
/// Returned by [`Report::deserialize_from_str`](crate::Report::deserialize_from_str) and
/// [`Report::deserialize_from_slice`](crate::Report::deserialize_from_slice).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeserializeError {
    /// The input is not well-formed XML.
    #[error("invalid XML at byte {position}")]
    Xml {
        /// The byte offset at which the error was detected.
        position: usize,

        /// The underlying error.
        #[source]
        err: quick_xml::Error,
    },

    /// The input is not valid UTF-8.
    #[error("input is not valid UTF-8 at byte {position}")]
    InvalidUtf8 {
        /// The byte offset of the first invalid sequence.
        position: usize,

        /// The underlying error.
        #[source]
        err: std::str::Utf8Error,
    },

    /// The input does not contain any elements.
    #[error("no root element found, expected <testsuites>")]
    MissingRoot,

    /// The root element is not `<testsuites>`.
    #[error("expected root element <testsuites>, found <{found}> at byte {position}")]
    UnexpectedRoot {
        /// The name of the root element that was found.
        found: String,

        /// The byte offset of the root element.
        position: usize,
    },

    /// The input ended while an element was still open.
    #[error("unexpected end of input inside <{element}>")]
    UnexpectedEof {
        /// The element that was still open.
        element: &'static str,
    },

    /// A testcase has both a `<failure>` and a `<skipped>` child.
    #[error("testcase `{name}` has both <failure> and <skipped> (at byte {position})")]
    ConflictingOutcome {
        /// The name of the testcase.
        name: String,

        /// The byte offset at which the second outcome element was found.
        position: usize,
    },
}

impl DeserializeError {
    pub(crate) fn xml(position: usize, err: impl Into<quick_xml::Error>) -> Self {
        Self::Xml {
            position,
            err: err.into(),
        }
    }
}
