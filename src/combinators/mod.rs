//! Grammar construction surface.
//!
//! ```ignore
//! let grammar = || element("body", || many(|| element("p", text)));
//! ```

mod leaf;
mod structural;

pub use leaf::{Attribute, Attributes, Text};
pub use structural::{Anything, Constraint, Element, Expect, Lift, Many, OneOf};

use crate::consumer::{BoxedConsumer, Consumer, Continuation};

/// Expects the element `name`; its interior goes to `continuation`.
///
/// Pass [`nothing`](crate::nothing) for an element whose content is of no
/// interest.
pub fn element<K: Continuation>(name: impl Into<String>, continuation: K) -> Element<K> {
    Element::new(name, continuation)
}

pub fn text() -> Text {
    Text::new()
}

pub fn attribute(name: impl Into<String>) -> Attribute {
    Attribute::new(name)
}

pub fn attributes() -> Attributes {
    Attributes::new()
}

pub fn anything<K: Continuation>(continuation: K) -> Anything<K> {
    Anything::new(continuation)
}

pub fn many<K: Continuation>(continuation: K) -> Many<K> {
    Many::new(continuation)
}

pub fn one_of<'a, T>(alternatives: Vec<BoxedConsumer<'a, T>>) -> OneOf<'a, T> {
    OneOf::new(alternatives)
}

/// Runs the probe built by `getter` and continues only if its result
/// satisfies `expected`.
pub fn constraint<G, K>(
    mut getter: G,
    expected: Expect<<G::Consumer as Consumer>::Output>,
    continuation: K,
) -> Constraint<G::Consumer, K>
where
    G: Continuation,
    K: Continuation,
{
    Constraint::new(getter.create(), expected, continuation)
}

pub fn lift<C, F, U>(child: C, transform: F) -> Lift<C, F>
where
    C: Consumer,
    F: Fn(C::Output) -> U,
{
    Lift::new(child, transform)
}
