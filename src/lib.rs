//! Streaming extraction of typed values from XML with composable consumers.
//!
//! A grammar is built from small consumers (`element`, `text`, `many`, ...)
//! and driven by [`Parser`] as the document arrives in chunks; no document
//! tree is ever built.

pub mod adapter;
pub mod combinators;
pub mod config;
pub mod consumer;
pub mod error;
pub mod event;
pub mod parser;
pub mod tokenizer;

pub use combinators::{
    anything, attribute, attributes, constraint, element, lift, many, one_of, text, Anything,
    Attribute, Attributes, Constraint, Element, Expect, Lift, Many, OneOf, Text,
};
pub use config::ParserConfig;
pub use consumer::{nothing, BoxedConsumer, Consumer, Continuation, Nothing, OutputOf};
pub use error::ParseError;
pub use event::Event;
pub use parser::{parse_str, Parser};
