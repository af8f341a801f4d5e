use quick_xml::errors::SyntaxError;
use quick_xml::escape::unescape;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;

use crate::config::ParserConfig;
use crate::error::ParseError;

/// Callbacks a [`PushTokenizer`] drives, in document order.
pub trait SaxHandler {
    fn start_element(&mut self, name: &str, attributes: &[(String, String)])
        -> Result<(), ParseError>;
    fn end_element(&mut self, name: &str) -> Result<(), ParseError>;
    fn characters(&mut self, text: &str) -> Result<(), ParseError>;
    fn cdata(&mut self, text: &str) -> Result<(), ParseError>;
}

/// Push-style front end over quick-xml's slice reader.
///
/// Input accumulates in a pending buffer. Each append tokenizes as far as
/// the buffer holds complete tokens; a tag is delivered once its `>` has
/// arrived. A character run reaching the end of the buffer is delivered up
/// to its last complete character or entity, so only that short tail waits
/// for the next append. With `trim_text` the whole run waits for the next
/// `<`, since trimming needs both ends of it.
#[derive(Debug)]
pub struct PushTokenizer {
    pending: Vec<u8>,
    open: Vec<String>,
    trim_text: bool,
    max_pending_bytes: Option<usize>,
    /// Byte the stalled tail needs before tokenizing again can progress.
    resume_on: Option<u8>,
}

impl PushTokenizer {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            pending: Vec::new(),
            open: Vec::new(),
            trim_text: config.trim_text,
            max_pending_bytes: config.max_pending_bytes,
            resume_on: None,
        }
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn append<H: SaxHandler>(&mut self, chunk: &[u8], handler: &mut H) -> Result<(), ParseError> {
        self.pending.extend_from_slice(chunk);
        let stalled = self.resume_on.is_some_and(|byte| !chunk.contains(&byte));
        if !stalled {
            self.drain(handler, false)?;
        }
        match self.max_pending_bytes {
            Some(limit) if self.pending.len() > limit => Err(ParseError::BufferLimit {
                limit,
                pending: self.pending.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Tokenizes whatever is left as the end of the document.
    ///
    /// Fails on a trailing token that never closed or on elements still
    /// open; everything complete before that point has been delivered.
    pub fn finish<H: SaxHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        self.drain(handler, true)?;
        match self.open.last() {
            Some(open) => Err(ParseError::Truncated { open: open.clone() }),
            None => Ok(()),
        }
    }

    fn drain<H: SaxHandler>(&mut self, handler: &mut H, at_eof: bool) -> Result<(), ParseError> {
        let mut consumed = 0;
        let result = tokenize(
            &self.pending,
            &mut self.open,
            self.trim_text,
            at_eof,
            handler,
            &mut consumed,
        );
        self.pending.drain(..consumed);
        self.resume_on = result?;
        Ok(())
    }
}

/// Tokenizes `input` until it runs out of complete tokens.
///
/// Returns the byte a stalled tail is waiting for, if any one byte will do.
fn tokenize<H: SaxHandler>(
    input: &[u8],
    open: &mut Vec<String>,
    trim_text: bool,
    at_eof: bool,
    handler: &mut H,
    consumed: &mut usize,
) -> Result<Option<u8>, ParseError> {
    let mut reader = Reader::from_reader(input);
    let config = reader.config_mut();
    config.trim_text(trim_text);
    config.expand_empty_elements = true;
    // Every drain starts a fresh reader over the tail, so end tags are
    // checked against `open` instead.
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(quick_xml::Error::Syntax(err)) if !at_eof => {
                let tail = skip_whitespace(&input[*consumed..]);
                match incomplete_markup(&err, tail) {
                    Some(resume_on) => {
                        tracing::trace!(%err, pending = tail.len(), "waiting for more input");
                        return Ok(resume_on);
                    }
                    None => return Err(quick_xml::Error::Syntax(err).into()),
                }
            }
            Err(err) => return Err(err.into()),
        };
        let end = reader.buffer_position() as usize;
        match event {
            XmlEvent::Eof => {
                *consumed = input.len();
                return Ok(None);
            }
            // The run may continue in the next chunk.
            XmlEvent::Text(_) if !at_eof && end == input.len() => {
                if trim_text {
                    return Ok(Some(b'<'));
                }
                let raw = complete_text(&input[*consumed..]);
                if !raw.is_empty() {
                    handler.characters(&unescape(raw).map_err(quick_xml::Error::from)?)?;
                    *consumed += raw.len();
                }
                return Ok(None);
            }
            _ => {}
        }
        *consumed = end;
        dispatch(event, open, handler)?;
    }
}

/// Whether a syntax error only means the markup has not fully arrived.
///
/// Unclosed tags, comments, CDATA, doctypes and processing instructions all
/// end in `>`. A `<!` that may still grow into one of those waits for any
/// byte; anything else after `<!` is malformed.
fn incomplete_markup(err: &SyntaxError, tail: &[u8]) -> Option<Option<u8>> {
    match err {
        SyntaxError::UnclosedTag
        | SyntaxError::UnclosedComment
        | SyntaxError::UnclosedCData
        | SyntaxError::UnclosedDoctype
        | SyntaxError::UnclosedPIOrXmlDecl => Some(Some(b'>')),
        SyntaxError::InvalidBangMarkup => {
            let opens = [&b"<!--"[..], b"<![CDATA[", b"<!DOCTYPE"];
            opens
                .iter()
                .any(|open| tail.len() < open.len() && open[..tail.len()].eq_ignore_ascii_case(tail))
                .then_some(None)
        }
    }
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

/// The longest prefix of a character run that can be delivered on its own:
/// no cut through a multi-byte character or an unterminated entity.
fn complete_text(run: &[u8]) -> &str {
    let end = match run.iter().rposition(|&b| b == b'&') {
        Some(amp) if !run[amp..].contains(&b';') => amp,
        _ => run.len(),
    };
    match std::str::from_utf8(&run[..end]) {
        Ok(text) => text,
        Err(err) => std::str::from_utf8(&run[..err.valid_up_to()]).unwrap_or_default(),
    }
}

fn dispatch<H: SaxHandler>(
    event: XmlEvent<'_>,
    open: &mut Vec<String>,
    handler: &mut H,
) -> Result<(), ParseError> {
    match event {
        XmlEvent::Start(start) => {
            let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
            let mut attributes = Vec::new();
            for attr in start.attributes().with_checks(false) {
                let attr = attr.map_err(quick_xml::Error::from)?;
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr.unescape_value()?.into_owned();
                attributes.push((key, value));
            }
            handler.start_element(&name, &attributes)?;
            open.push(name);
        }
        XmlEvent::End(end) => {
            let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
            match open.pop() {
                Some(expected) if expected == name => {}
                Some(expected) => {
                    return Err(ParseError::MismatchedEnd {
                        expected,
                        found: name,
                    })
                }
                None => return Err(ParseError::UnexpectedEnd { name }),
            }
            handler.end_element(&name)?;
        }
        XmlEvent::Text(text) => handler.characters(&text.unescape()?)?,
        XmlEvent::CData(cdata) => handler.cdata(&String::from_utf8_lossy(cdata.as_ref()))?,
        // Comments, processing instructions, declarations and doctypes.
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl SaxHandler for Recorder {
        fn start_element(
            &mut self,
            name: &str,
            attributes: &[(String, String)],
        ) -> Result<(), ParseError> {
            let attrs: Vec<String> = attributes.iter().map(|(k, v)| format!(" {k}={v}")).collect();
            self.calls.push(format!("<{name}{}>", attrs.concat()));
            Ok(())
        }

        fn end_element(&mut self, name: &str) -> Result<(), ParseError> {
            self.calls.push(format!("</{name}>"));
            Ok(())
        }

        fn characters(&mut self, text: &str) -> Result<(), ParseError> {
            self.calls.push(format!("text:{text}"));
            Ok(())
        }

        fn cdata(&mut self, text: &str) -> Result<(), ParseError> {
            self.calls.push(format!("cdata:{text}"));
            Ok(())
        }
    }

    impl Recorder {
        fn text(&self) -> String {
            self.calls
                .iter()
                .filter_map(|call| call.strip_prefix("text:"))
                .collect()
        }
    }

    fn tokenize_chunks(chunks: &[&str]) -> (Recorder, Result<(), ParseError>) {
        let mut tokenizer = PushTokenizer::new(&ParserConfig::default());
        let mut recorder = Recorder::default();
        for chunk in chunks {
            if let Err(err) = tokenizer.append(chunk.as_bytes(), &mut recorder) {
                return (recorder, Err(err));
            }
        }
        let result = tokenizer.finish(&mut recorder);
        (recorder, result)
    }

    #[test]
    fn delivers_events_in_document_order() {
        let (recorder, result) =
            tokenize_chunks(&["<body><img src='a.jpg' alt=\"x &amp; y\"/>Hi<![CDATA[<b>]]></body>"]);
        result.unwrap();
        assert_eq!(
            recorder.calls,
            vec![
                "<body>",
                "<img src=a.jpg alt=x & y>",
                "</img>",
                "text:Hi",
                "cdata:<b>",
                "</body>",
            ]
        );
    }

    #[test]
    fn split_tags_wait_for_their_close() {
        let (recorder, result) = tokenize_chunks(&["<bo", "dy cl", "ass='x'>te", "xt</bo", "dy>"]);
        result.unwrap();
        assert_eq!(
            recorder.calls,
            vec!["<body class=x>", "text:te", "text:xt", "</body>"]
        );
    }

    #[test]
    fn split_entity_waits_for_its_semicolon() {
        let (recorder, result) = tokenize_chunks(&["<p>a &a", "mp; b</p>"]);
        result.unwrap();
        assert_eq!(recorder.calls, vec!["<p>", "text:a ", "text:& b", "</p>"]);
    }

    #[test]
    fn split_character_waits_for_its_last_byte() {
        let bytes = "<p>é</p>".as_bytes();
        let mut tokenizer = PushTokenizer::new(&ParserConfig::default());
        let mut recorder = Recorder::default();
        for byte in bytes {
            tokenizer.append(std::slice::from_ref(byte), &mut recorder).unwrap();
        }
        tokenizer.finish(&mut recorder).unwrap();
        assert_eq!(recorder.calls, vec!["<p>", "text:é", "</p>"]);
    }

    #[test]
    fn long_text_fed_bytewise_stays_out_of_the_buffer() {
        let run = "ab &amp; cd é ".repeat(2_000);
        let xml = format!("<p>{run}</p>");
        let mut tokenizer = PushTokenizer::new(&ParserConfig::default());
        let mut recorder = Recorder::default();
        for byte in xml.as_bytes() {
            tokenizer.append(std::slice::from_ref(byte), &mut recorder).unwrap();
            assert!(tokenizer.pending() <= 8, "{} bytes pending", tokenizer.pending());
        }
        tokenizer.finish(&mut recorder).unwrap();
        assert_eq!(recorder.text(), run.replace("&amp;", "&"));
    }

    #[test]
    fn split_comment_resumes_at_its_close() {
        let (recorder, result) = tokenize_chunks(&["<p>a<!-- x > y", " -", "->b</p>"]);
        result.unwrap();
        assert_eq!(recorder.calls, vec!["<p>", "text:a", "text:b", "</p>"]);
    }

    #[test]
    fn malformed_bang_markup_fails_while_feeding() {
        let mut tokenizer = PushTokenizer::new(&ParserConfig::default());
        let mut recorder = Recorder::default();
        let err = tokenizer
            .append(b"<body><!x><p>Two</p>", &mut recorder)
            .unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
        assert_eq!(recorder.calls, vec!["<body>"]);
    }

    #[test]
    fn bang_prefix_waits_then_fails() {
        let mut tokenizer = PushTokenizer::new(&ParserConfig::default());
        let mut recorder = Recorder::default();
        tokenizer.append(b"<body><!", &mut recorder).unwrap();
        assert_eq!(tokenizer.pending(), 2);
        assert!(tokenizer.append(b"x>", &mut recorder).is_err());
    }

    #[test]
    fn skips_declarations_and_comments() {
        let (recorder, result) = tokenize_chunks(&["<?xml version='1.0'?><!-- c --><p/>"]);
        result.unwrap();
        assert_eq!(recorder.calls, vec!["<p>", "</p>"]);
    }

    #[test]
    fn truncated_close_is_reported_at_finish() {
        let mut tokenizer = PushTokenizer::new(&ParserConfig::default());
        let mut recorder = Recorder::default();
        tokenizer.append(b"<p>Foobar</", &mut recorder).unwrap();
        assert_eq!(recorder.calls, vec!["<p>", "text:Foobar"]);
        assert_eq!(tokenizer.pending(), 2);
        assert!(tokenizer.finish(&mut recorder).is_err());
    }

    #[test]
    fn unclosed_element_is_truncated() {
        let (_, result) = tokenize_chunks(&["<body><p>x</p>"]);
        assert!(matches!(result, Err(ParseError::Truncated { ref open }) if open == "body"));
    }

    #[test]
    fn mismatched_end_across_chunks() {
        let (_, result) = tokenize_chunks(&["<a><b>", "</a>"]);
        assert!(matches!(
            result,
            Err(ParseError::MismatchedEnd { ref expected, ref found }) if expected == "b" && found == "a"
        ));
    }

    #[test]
    fn pending_limit_is_enforced() {
        let config = ParserConfig {
            max_pending_bytes: Some(8),
            ..ParserConfig::default()
        };
        let mut tokenizer = PushTokenizer::new(&config);
        let mut recorder = Recorder::default();
        let err = tokenizer
            .append(b"<p a='0123456789", &mut recorder)
            .unwrap_err();
        assert!(matches!(err, ParseError::BufferLimit { limit: 8, .. }));
    }

    #[test]
    fn trim_text_drops_whitespace_runs() {
        let config = ParserConfig {
            trim_text: true,
            ..ParserConfig::default()
        };
        let mut tokenizer = PushTokenizer::new(&config);
        let mut recorder = Recorder::default();
        tokenizer
            .append(b"<a>\n  <b> x </b>\n</a>", &mut recorder)
            .unwrap();
        tokenizer.finish(&mut recorder).unwrap();
        assert_eq!(recorder.calls, vec!["<a>", "<b>", "text:x", "</b>", "</a>"]);
    }
}
