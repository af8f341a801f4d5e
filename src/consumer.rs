use crate::error::ParseError;
use crate::event::Event;

/// A stateful unit that accepts events and eventually yields a result.
///
/// A consumer is in one of three states: still open, complete, or failed.
/// `handle` returning an error is the failed state; the enclosing
/// combinator decides whether that aborts the parse (most do) or only
/// prunes a branch ([`OneOf`](crate::OneOf)).
///
/// Text, Many and Anything-with-an-open-tail never complete by
/// themselves. Their boundary is the enclosing [`Element`](crate::Element)
/// closing, so they must sit (directly or indirectly) inside one; used as
/// the top level of a grammar they stay open until the input ends.
pub trait Consumer {
    type Output;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError>;

    /// True once no further events should be routed to this consumer.
    fn is_complete(&self) -> bool {
        false
    }

    /// The result so far, `None` meaning nil.
    ///
    /// Final once `is_complete` holds, though a complete consumer may still
    /// be nil: `element("item", || element("title", text))` over
    /// `<item></item>` never opened its title. Reading it earlier yields
    /// whatever partial result the consumer has, which is how a truncated
    /// document still produces the text captured before the cut.
    fn value(&self) -> Option<Self::Output>;

    fn boxed<'a>(self) -> BoxedConsumer<'a, Self::Output>
    where
        Self: Sized + 'a,
    {
        Box::new(self)
    }
}

pub type BoxedConsumer<'a, T> = Box<dyn Consumer<Output = T> + 'a>;

impl<C: Consumer + ?Sized> Consumer for Box<C> {
    type Output = C::Output;

    fn handle(&mut self, event: &Event<'_>) -> Result<(), ParseError> {
        (**self).handle(event)
    }

    fn is_complete(&self) -> bool {
        (**self).is_complete()
    }

    fn value(&self) -> Option<Self::Output> {
        (**self).value()
    }
}

/// Deferred construction of a child consumer.
///
/// Invoked at the moment the child is first needed, and again for every
/// fresh child a repetition asks for. Any `FnMut() -> C` closure (or a
/// plain function such as [`text`](crate::text)) is a continuation.
pub trait Continuation {
    type Consumer: Consumer;

    fn create(&mut self) -> Self::Consumer;
}

impl<F, C> Continuation for F
where
    F: FnMut() -> C,
    C: Consumer,
{
    type Consumer = C;

    fn create(&mut self) -> C {
        self()
    }
}

/// Output type of the consumers a continuation creates.
pub type OutputOf<K> = <<K as Continuation>::Consumer as Consumer>::Output;

/// The absent continuation: always complete, ignores every event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nothing;

impl Consumer for Nothing {
    type Output = ();

    fn handle(&mut self, _event: &Event<'_>) -> Result<(), ParseError> {
        Ok(())
    }

    fn is_complete(&self) -> bool {
        true
    }

    fn value(&self) -> Option<()> {
        Some(())
    }
}

pub fn nothing() -> Nothing {
    Nothing
}
