#![allow(dead_code)]
use feedmonster::{Continuation, OutputOf, ParseError, Parser};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Feeds `xml` in one chunk, panicking on a feed error.
pub fn parse<K: Continuation>(xml: &str, grammar: K) -> Option<OutputOf<K>> {
    try_parse(xml, grammar).unwrap_or_else(|e| panic!("failed to parse {xml:?}: {e}"))
}

pub fn try_parse<K: Continuation>(xml: &str, grammar: K) -> Result<Option<OutputOf<K>>, ParseError> {
    init_tracing();
    feedmonster::parse_str(grammar, xml)
}

/// Feeds `xml` in chunks of `size` bytes.
pub fn parse_chunked<K: Continuation>(
    xml: &str,
    size: usize,
    grammar: K,
) -> Result<Option<OutputOf<K>>, ParseError> {
    init_tracing();
    let mut parser = Parser::new(grammar);
    for chunk in xml.as_bytes().chunks(size) {
        parser.feed(chunk)?;
    }
    parser.finish();
    Ok(parser.result())
}
