use std::fmt;

/// Failure raised while driving a grammar.
///
/// Grammar failures and tokenizer failures share this one type so that a
/// `feed` call has a single error channel.
#[derive(Debug)]
pub enum ParseError {
    /// An element opened where a different one was expected.
    UnexpectedElement { expected: String, found: String },
    /// A close tag arrived with no element open to receive it.
    UnexpectedEnd { name: String },
    /// A close tag did not match the innermost open element.
    MismatchedEnd { expected: String, found: String },
    /// A new element started after the enclosing element had closed.
    ElementClosed { name: String, found: String },
    ConstraintNotMatched,
    NoAlternativesLeft,
    /// Input ended while an element was still open.
    Truncated { open: String },
    /// The pending input exceeded the configured limit.
    BufferLimit { limit: usize, pending: usize },
    /// Input was fed after the parser had been finished.
    Finished,
    Xml(quick_xml::Error),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedElement { expected, found } => {
                write!(f, "expected element {expected}, got {found}")
            }
            ParseError::UnexpectedEnd { name } => write!(f, "unexpected end of element {name}"),
            ParseError::MismatchedEnd { expected, found } => {
                write!(f, "expected end of {expected}, got {found}")
            }
            ParseError::ElementClosed { name, found } => {
                write!(f, "did not expect element {found} after {name} closed")
            }
            ParseError::ConstraintNotMatched => f.write_str("constraint not matched"),
            ParseError::NoAlternativesLeft => f.write_str("no alternatives left"),
            ParseError::Truncated { open } => write!(f, "input ended inside element {open}"),
            ParseError::BufferLimit { limit, pending } => {
                write!(f, "{pending} bytes pending exceeds limit of {limit}")
            }
            ParseError::Finished => f.write_str("parser already finished"),
            ParseError::Xml(err) => write!(f, "XML error: {err}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Xml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Xml(err)
    }
}
