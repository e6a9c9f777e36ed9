use std::iter::Peekable;

/// An input source for the matching engine.
///
/// The engine reads input one element at a time with a single element of
/// lookahead: [`Input::peek`] returns the current unread element and
/// [`Input::advance`] consumes it. The source is owned by the caller, and
/// any blocking (waiting on a stream, for example) happens inside these two
/// methods; the engine itself performs no end-of-stream bookkeeping and
/// defines no timeout or cancellation of its own.
pub trait Input {
    /// Returns the current unread element without consuming it, or `None`
    /// if the source is exhausted.
    fn peek(&mut self) -> Option<u8>;

    /// Advances past the current element.
    fn advance(&mut self);
}

/// Any peekable byte iterator is an input source.
impl<I> Input for Peekable<I>
where
    I: Iterator<Item = u8>,
{
    fn peek(&mut self) -> Option<u8> {
        Peekable::peek(self).copied()
    }

    fn advance(&mut self) {
        self.next();
    }
}
