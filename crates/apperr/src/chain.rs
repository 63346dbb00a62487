//! Walking `source()` chains.

use std::error::Error as StdError;

use crate::Error;

/// Iterator over an error and its successive sources.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Chain<'a> {
    pub fn new(head: &'a (dyn StdError + 'static)) -> Self {
        Self { next: Some(head) }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Reports whether any apperr `Error` in the chain of `err` matches `target`
/// according to [`Error::is`].
pub fn is_in_chain(err: &(dyn StdError + 'static), target: &Error) -> bool {
    Chain::new(err).any(|link| {
        link.downcast_ref::<Error>()
            .is_some_and(|app| app.is(target))
    })
}
