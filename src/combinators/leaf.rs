use std::collections::HashMap;

use crate::consumer::Consumer;
use crate::error::ParseError;
use crate::event::Event;

/// Concatenates every character run it sees. Never completes on its own.
#[derive(Debug, Clone, Default)]
pub struct Text {
    buffer: String,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Consumer for Text {
    type Output = String;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        if let Event::Characters { text } = event {
            self.buffer.push_str(text);
        }
        Ok(())
    }

    fn value(&self) -> Option<String> {
        Some(self.buffer.clone())
    }
}

/// Captures the value of one named attribute of the element it starts in.
///
/// Looking stops at the matching attribute or at the first event that is
/// not an attribute, so it must be the first interior consumer of its
/// element to see that element's attributes.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    value: Option<String>,
    looking: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            looking: true,
        }
    }
}

impl Consumer for Attribute {
    type Output = Option<String>;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        if !self.looking {
            return Ok(());
        }
        match event {
            Event::Attribute { key, value } => {
                if *key == self.name {
                    self.value = Some(value.to_string());
                    self.looking = false;
                }
            }
            _ => self.looking = false,
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        !self.looking
    }

    fn value(&self) -> Option<Option<String>> {
        Some(self.value.clone())
    }
}

/// Collects every attribute up to the first non-attribute event.
#[derive(Debug, Clone)]
pub struct Attributes {
    values: HashMap<String, String>,
    looking: bool,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new()
    }
}

impl Attributes {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            looking: true,
        }
    }
}

impl Consumer for Attributes {
    type Output = HashMap<String, String>;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        if !self.looking {
            return Ok(());
        }
        match event {
            Event::Attribute { key, value } => {
                self.values.insert(key.to_string(), value.to_string());
            }
            _ => self.looking = false,
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        !self.looking
    }

    fn value(&self) -> Option<HashMap<String, String>> {
        Some(self.values.clone())
    }
}
