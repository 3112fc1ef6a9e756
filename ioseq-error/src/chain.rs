use std::{error::Error as StdError, iter::FusedIterator};

/// Iterator over an error followed by each of its sources, outermost first.
///
/// Created by [`chain`] or [`ErrorExt::chain`](crate::ErrorExt::chain).
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.source();
        Some(current)
    }
}

impl FusedIterator for Chain<'_> {}

/// Walk `error` and every source below it.
///
/// Note that an [`std::io::Error`] wrapping a custom error reports the sources
/// of that custom error, not the custom error itself. Use
/// [`std::io::Error::get_ref`] to get to it.
pub fn chain<'a>(error: &'a (dyn StdError + 'static)) -> Chain<'a> {
    Chain { next: Some(error) }
}

/// The first error of type `T` found in the [`chain`] of `error`.
pub fn find_source<'a, T>(error: &'a (dyn StdError + 'static)) -> Option<&'a T>
where
    T: StdError + 'static,
{
    chain(error).find_map(|cause| cause.downcast_ref::<T>())
}
