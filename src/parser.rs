use crate::adapter::StreamAdapter;
use crate::config::ParserConfig;
use crate::consumer::{Consumer, Continuation, OutputOf};
use crate::error::ParseError;
use crate::tokenizer::PushTokenizer;

/// Drives one grammar with a document fed in chunks.
///
/// Errors raised while chunks are fed abort the parse and are returned to
/// the caller. [`finish`](Parser::finish) is lenient: a document cut off
/// after the grammar already captured what it needed still yields that
/// result. A grammar that never got that far simply has no result.
pub struct Parser<C> {
    tokenizer: PushTokenizer,
    adapter: StreamAdapter<C>,
    finished: bool,
}

impl<C: Consumer> Parser<C> {
    pub fn new<K>(grammar: K) -> Self
    where
        K: Continuation<Consumer = C>,
    {
        Self::with_config(grammar, ParserConfig::default())
    }

    pub fn with_config<K>(mut grammar: K, config: ParserConfig) -> Self
    where
        K: Continuation<Consumer = C>,
    {
        Self {
            tokenizer: PushTokenizer::new(&config),
            adapter: StreamAdapter::new(grammar.create()),
            finished: false,
        }
    }

    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) -> Result<(), ParseError> {
        if self.finished {
            return Err(ParseError::Finished);
        }
        self.tokenizer.append(chunk.as_ref(), &mut self.adapter)
    }

    /// Ends the input, discarding any complaint about its tail.
    pub fn finish(&mut self) {
        if let Err(err) = self.try_finish() {
            tracing::debug!(%err, complete = self.is_complete(), "ignoring error at end of input");
        }
    }

    /// Ends the input, reporting a truncated or malformed tail.
    pub fn try_finish(&mut self) -> Result<(), ParseError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.tokenizer.finish(&mut self.adapter)
    }

    pub fn is_complete(&self) -> bool {
        self.adapter.root().is_complete()
    }

    /// The root consumer's result; read it after finishing.
    pub fn result(&self) -> Option<C::Output> {
        self.adapter.root().value()
    }
}

/// Feeds a whole document, finishes leniently and returns the result.
pub fn parse_str<K>(grammar: K, xml: &str) -> Result<Option<OutputOf<K>>, ParseError>
where
    K: Continuation,
{
    let mut parser = Parser::new(grammar);
    parser.feed(xml)?;
    parser.finish();
    Ok(parser.result())
}
