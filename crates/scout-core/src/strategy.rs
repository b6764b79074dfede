//! Ordered fallback chains.
//!
//! A chain is a slice of named [`Strategy`] values sharing one signature.
//! [`first_success`] runs them in order and stops at the first that yields
//! something, so each link can also be tested on its own.

/// One link of a fallback chain.
pub struct Strategy<I: ?Sized, O> {
    pub name: &'static str,
    pub attempt: fn(&I) -> Option<O>,
}

impl<I: ?Sized, O> Strategy<I, O> {
    pub const fn new(name: &'static str, attempt: fn(&I) -> Option<O>) -> Self {
        Self { name, attempt }
    }
}

/// Run `strategies` in order and return the first output with the name of
/// the strategy that produced it.
pub fn first_success<I: ?Sized, O>(
    strategies: &[Strategy<I, O>],
    input: &I,
) -> Option<(&'static str, O)> {
    strategies.iter().find_map(|strategy| {
        let output = (strategy.attempt)(input);
        if output.is_none() {
            tracing::debug!(strategy = strategy.name, "Strategy yielded nothing");
        }
        output.map(|o| (strategy.name, o))
    })
}
