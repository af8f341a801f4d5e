use std::fmt;

/// One signal in the uniform event stream fed to a consumer tree.
///
/// Every element yields its `StartElement`, then one `Attribute` per
/// attribute in document order, then its content, then exactly one
/// `EndElement`. Character data may arrive split across several
/// `Characters` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    StartElement { name: &'a str },
    Attribute { key: &'a str, value: &'a str },
    Characters { text: &'a str },
    EndElement { name: &'a str },
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::StartElement { name } => write!(f, "<{name}>"),
            Event::Attribute { key, value } => write!(f, "{key}={value:?}"),
            Event::Characters { text } => write!(f, "{text:?}"),
            Event::EndElement { name } => write!(f, "</{name}>"),
        }
    }
}
