use ariadne::Source;
use btm_error::Error as ReportError;

/// Utility enum to package errors that can occur while running a command.
#[derive(Debug)]
pub enum Error {
    /// An error pointing into the text that was being parsed.
    Report {
        /// The text the spans of the error refer to.
        source: String,

        /// The error itself.
        error: ReportError,
    },

    /// The command itself was malformed.
    Usage(String),
}

impl Error {
    /// Creates an error pointing into the given text.
    pub fn report(source: &str, error: ReportError) -> Self {
        Self::Report { source: source.to_string(), error }
    }

    /// Report the error to stderr.
    ///
    /// The `ariadne` crate's [`Report`](ariadne::Report) type does not have a `Display`
    /// implementation, so we can only use its `eprint` method to print to stderr.
    pub fn report_to_stderr(&self) {
        match self {
            Self::Report { source, error } => {
                if let Err(err) = error.build_report("input").eprint(("input", Source::from(source))) {
                    eprintln!("{}", err);
                }
            },
            Self::Usage(msg) => eprintln!("{}", msg),
        }
    }
}
