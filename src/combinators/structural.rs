use std::mem;

use crate::consumer::{BoxedConsumer, Consumer, Continuation, OutputOf};
use crate::error::ParseError;
use crate::event::Event;

enum ElementState<C> {
    Waiting,
    Active(C),
    Done(C),
}

/// Matches one element by name and hands its interior to a child.
///
/// The child is created from the continuation when the element opens.
/// Nested elements are tracked on a name stack, so the element's own close
/// is recognised here and never forwarded: it is what bounds interiors
/// that cannot complete by themselves (text, repetitions).
pub struct Element<K: Continuation> {
    name: String,
    continuation: K,
    open: Vec<String>,
    state: ElementState<K::Consumer>,
}

impl<K: Continuation> Element<K> {
    pub fn new(name: impl Into<String>, continuation: K) -> Self {
        Self {
            name: name.into(),
            continuation,
            open: Vec::new(),
            state: ElementState::Waiting,
        }
    }

    fn close(&mut self) {
        if let ElementState::Active(child) = mem::replace(&mut self.state, ElementState::Waiting) {
            tracing::trace!(element = %self.name, "element closed");
            self.state = ElementState::Done(child);
        }
    }
}

impl<K: Continuation> Consumer for Element<K> {
    type Output = OutputOf<K>;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        match &mut self.state {
            ElementState::Waiting => match event {
                Event::StartElement { name } if *name == self.name.as_str() => {
                    tracing::trace!(element = %self.name, "element opened");
                    self.state = ElementState::Active(self.continuation.create());
                    Ok(())
                }
                Event::StartElement { name } => Err(ParseError::UnexpectedElement {
                    expected: self.name.clone(),
                    found: name.to_string(),
                }),
                Event::EndElement { name } => Err(ParseError::UnexpectedEnd {
                    name: name.to_string(),
                }),
                // Cannot precede a start tag in a well-ordered stream.
                Event::Attribute { .. } | Event::Characters { .. } => Ok(()),
            },
            ElementState::Active(child) => match event {
                Event::StartElement { name } => {
                    self.open.push(name.to_string());
                    child.handle(event)
                }
                Event::EndElement { name } => match self.open.pop() {
                    Some(expected) if expected == *name => child.handle(event),
                    Some(expected) => Err(ParseError::MismatchedEnd {
                        expected,
                        found: name.to_string(),
                    }),
                    None => {
                        self.close();
                        Ok(())
                    }
                },
                _ => child.handle(event),
            },
            ElementState::Done(_) => match event {
                Event::StartElement { name } => Err(ParseError::ElementClosed {
                    name: self.name.clone(),
                    found: name.to_string(),
                }),
                _ => Ok(()),
            },
        }
    }

    fn is_complete(&self) -> bool {
        matches!(self.state, ElementState::Done(_))
    }

    fn value(&self) -> Option<Self::Output> {
        match &self.state {
            ElementState::Waiting => None,
            ElementState::Active(child) | ElementState::Done(child) => child.value(),
        }
    }
}

/// Swallows exactly one event, then hands the rest to a fresh child.
pub struct Anything<K: Continuation> {
    continuation: K,
    child: Option<K::Consumer>,
}

impl<K: Continuation> Anything<K> {
    pub fn new(continuation: K) -> Self {
        Self {
            continuation,
            child: None,
        }
    }
}

impl<K: Continuation> Consumer for Anything<K> {
    type Output = OutputOf<K>;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        match &mut self.child {
            Some(child) => child.handle(event),
            None => {
                tracing::trace!(%event, "skipped");
                self.child = Some(self.continuation.create());
                Ok(())
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.child.as_ref().is_some_and(|child| child.is_complete())
    }

    fn value(&self) -> Option<Self::Output> {
        self.child.as_ref().and_then(|child| child.value())
    }
}

/// Repeats a child grammar, collecting each completed result in order.
///
/// Every completed child keeps its place, as `None` when it completed
/// without a result. Never completes by itself; the enclosing element's
/// close ends it. A child still open at that point contributes nothing.
pub struct Many<K: Continuation> {
    continuation: K,
    current: Option<K::Consumer>,
    results: Vec<Option<OutputOf<K>>>,
}

impl<K: Continuation> Many<K> {
    pub fn new(continuation: K) -> Self {
        Self {
            continuation,
            current: None,
            results: Vec::new(),
        }
    }
}

impl<K> Consumer for Many<K>
where
    K: Continuation,
    OutputOf<K>: Clone,
{
    type Output = Vec<Option<OutputOf<K>>>;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        let child = self
            .current
            .get_or_insert_with(|| self.continuation.create());
        child.handle(event)?;
        if child.is_complete() {
            let value = self.current.take().and_then(|child| child.value());
            self.results.push(value);
        }
        Ok(())
    }

    fn value(&self) -> Option<Self::Output> {
        Some(self.results.clone())
    }
}

/// Runs every alternative side by side, dropping the ones that fail.
///
/// The result is that of the first surviving alternative in declaration
/// order, even when a later one is also complete.
pub struct OneOf<'a, T> {
    candidates: Vec<BoxedConsumer<'a, T>>,
}

impl<'a, T> OneOf<'a, T> {
    pub fn new(candidates: Vec<BoxedConsumer<'a, T>>) -> Self {
        Self { candidates }
    }

    #[cfg(test)]
    fn live(&self) -> usize {
        self.candidates.len()
    }
}

impl<T> Consumer for OneOf<'_, T> {
    type Output = T;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        self.candidates
            .retain_mut(|candidate| match candidate.handle(event) {
                Ok(()) => true,
                Err(err) => {
                    tracing::trace!(%err, %event, "alternative pruned");
                    false
                }
            });
        if self.candidates.is_empty() {
            return Err(ParseError::NoAlternativesLeft);
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.candidates.iter().any(|candidate| candidate.is_complete())
    }

    fn value(&self) -> Option<T> {
        self.candidates.first().and_then(|candidate| candidate.value())
    }
}

/// What a [`Constraint`] compares its probe's result against.
pub enum Expect<T> {
    Literal(T),
    Predicate(Box<dyn Fn(&T) -> bool>),
}

impl<T> Expect<T> {
    pub fn literal(value: T) -> Self {
        Expect::Literal(value)
    }

    pub fn predicate(check: impl Fn(&T) -> bool + 'static) -> Self {
        Expect::Predicate(Box::new(check))
    }
}

impl<T: PartialEq> Expect<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Expect::Literal(expected) => expected == value,
            Expect::Predicate(check) => check(value),
        }
    }
}

/// Gates a branch on the result of a probe consumer.
///
/// Events go to the probe until it completes. The event that completes it
/// is not replayed; only later events reach the continuation's consumer.
pub struct Constraint<P: Consumer, K: Continuation> {
    probe: P,
    expected: Expect<P::Output>,
    continuation: K,
    matched: Option<K::Consumer>,
}

impl<P: Consumer, K: Continuation> Constraint<P, K> {
    pub fn new(probe: P, expected: Expect<P::Output>, continuation: K) -> Self {
        Self {
            probe,
            expected,
            continuation,
            matched: None,
        }
    }
}

impl<P, K> Consumer for Constraint<P, K>
where
    P: Consumer,
    P::Output: PartialEq,
    K: Continuation,
{
    type Output = OutputOf<K>;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        if let Some(child) = &mut self.matched {
            return child.handle(event);
        }
        self.probe.handle(event)?;
        if self.probe.is_complete() {
            let satisfied = self
                .probe
                .value()
                .is_some_and(|value| self.expected.matches(&value));
            if !satisfied {
                return Err(ParseError::ConstraintNotMatched);
            }
            self.matched = Some(self.continuation.create());
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.matched.as_ref().is_some_and(|child| child.is_complete())
    }

    fn value(&self) -> Option<Self::Output> {
        self.matched.as_ref().and_then(|child| child.value())
    }
}

/// Maps a child's result; events pass through untouched.
pub struct Lift<C, F> {
    child: C,
    transform: F,
}

impl<C, F> Lift<C, F> {
    pub fn new<U>(child: C, transform: F) -> Self
    where
        C: Consumer,
        F: Fn(C::Output) -> U,
    {
        Self { child, transform }
    }
}

impl<C, F, U> Consumer for Lift<C, F>
where
    C: Consumer,
    F: Fn(C::Output) -> U,
{
    type Output = U;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        self.child.handle(event)
    }

    fn is_complete(&self) -> bool {
        self.child.is_complete()
    }

    fn value(&self) -> Option<U> {
        self.child.value().map(&self.transform)
    }
}
