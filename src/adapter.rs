use crate::consumer::Consumer;
use crate::error::ParseError;
use crate::event::Event;
use crate::tokenizer::SaxHandler;

/// Turns tokenizer callbacks into the uniform event stream for one root
/// consumer.
#[derive(Debug)]
pub struct StreamAdapter<C> {
    root: C,
}

impl<C: Consumer> StreamAdapter<C> {
    pub fn new(root: C) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &C {
        &self.root
    }
}

impl<C: Consumer> SaxHandler for StreamAdapter<C> {
    fn start_element(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
    ) -> Result<(), ParseError> {
        self.root.handle(&Event::StartElement { name })?;
        for (key, value) in attributes {
            self.root.handle(&Event::Attribute { key, value })?;
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), ParseError> {
        self.root.handle(&Event::EndElement { name })
    }

    fn characters(&mut self, text: &str) -> Result<(), ParseError> {
        self.root.handle(&Event::Characters { text })
    }

    fn cdata(&mut self, text: &str) -> Result<(), ParseError> {
        self.characters(text)
    }
}
