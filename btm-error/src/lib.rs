//! The common [`ErrorKind`] trait shared by every user-facing error of the engine, along with the
//! span-carrying [`Error`] wrapper used to render them.

// allows the `ErrorKind` derive to refer to this crate as `::btm_error` from inside it
extern crate self as btm_error;

use ariadne::{Color, Report, Source};
use std::{fmt::Debug, ops::Range};

/// The color used to highlight expressions in rendered reports.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Any kind of error that can be rendered as an [`ariadne`] report.
pub trait ErrorKind: Debug + Send {
    /// Builds the report for this error, pointing at the given spans of the source.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)>;
}

/// An error associated with regions of source text that can be highlighted.
#[derive(Debug)]
pub struct Error {
    /// The regions of the source text that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given spans and kind.
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self { spans, kind: Box::new(kind) }
    }

    /// Creates a new error pointing at a single region.
    pub fn at(span: Range<usize>, kind: impl ErrorKind + 'static) -> Self {
        Self::new(vec![span], kind)
    }

    /// Builds a report from this error.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }

    /// Renders the report to a string, with the given source text as its context.
    pub fn render(&self, src_id: &str, source: &str) -> String {
        let mut buf = Vec::new();
        // writing into a `Vec` only fails if the report itself is malformed
        if self.build_report(src_id).write((src_id, Source::from(source)), &mut buf).is_err() {
            return format!("{:?}", self.kind);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Prints the report to stderr, with the given source text as its context.
    pub fn report_to_stderr(&self, src_id: &str, source: &str) {
        if let Err(err) = self.build_report(src_id).eprint((src_id, Source::from(source))) {
            eprintln!("{}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btm_attrs::ErrorKind;

    /// An operator without a right-hand operand.
    #[derive(Debug, ErrorKind)]
    #[error(
        message = format!("missing value for `{}`", op),
        labels = ["this operator"],
        help = "add a value after the operator",
    )]
    struct MissingValue {
        op: char,
    }

    /// A note-only error.
    #[derive(Debug, ErrorKind)]
    #[error(message = "rule rejected", labels = [""], note = "rules need exactly one `==`")]
    struct Rejected;

    #[test]
    fn render_message_and_help() {
        let err = Error::at(2..3, MissingValue { op: '+' });
        let out = strip_ansi_escapes::strip_str(err.render("input", "1 +"));
        assert!(out.contains("missing value for `+`"), "{}", out);
        assert!(out.contains("this operator"), "{}", out);
        assert!(out.contains("add a value after the operator"), "{}", out);
    }

    #[test]
    fn render_note() {
        let err = Error::at(0..5, Rejected);
        let out = strip_ansi_escapes::strip_str(err.render("rule", "a + b"));
        assert!(out.contains("rule rejected"), "{}", out);
        assert!(out.contains("rules need exactly one `==`"), "{}", out);
    }
}
