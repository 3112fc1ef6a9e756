use crate::{BoxError, find_source};
use std::{
    error::Error as StdError,
    fmt::{self, Debug, Display},
    io,
    sync::Arc,
};

/// A cheaply cloneable error, used to report one terminal failure
/// on every operation that follows it.
///
/// [`std::io::Error`] is not [`Clone`], yet a reader that failed once has to keep
/// returning that same failure. [`SharedError`] keeps the original error behind an
/// [`Arc`] and hands out [`io::Error`] values that wrap it, preserving the
/// original [`io::ErrorKind`] if the source was an I/O error.
#[derive(Clone)]
pub struct SharedError(Arc<dyn StdError + Send + Sync>);

impl SharedError {
    /// Create a [`SharedError`] from any boxable error.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self(Arc::from(error.into()))
    }

    /// The [`io::ErrorKind`] of the first I/O error in the [`chain`](crate::chain)
    /// of the original error, or [`io::ErrorKind::Other`] if there is none.
    pub fn kind(&self) -> io::ErrorKind {
        find_source::<io::Error>(&*self.0).map_or(io::ErrorKind::Other, io::Error::kind)
    }

    /// Returns true if the original error is of type `T`.
    pub fn is<T>(&self) -> bool
    where
        T: StdError + 'static,
    {
        self.0.is::<T>()
    }

    /// Attempts to downcast the original error to a shared reference
    /// of the concrete type `T`.
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.0.downcast_ref()
    }

    /// Wrap (a handle to) the original error in an [`io::Error`].
    pub fn into_io_error(self) -> io::Error {
        io::Error::new(self.kind(), self)
    }
}

impl Debug for SharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for SharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for SharedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<BoxError> for SharedError {
    fn from(error: BoxError) -> Self {
        Self(Arc::from(error))
    }
}
