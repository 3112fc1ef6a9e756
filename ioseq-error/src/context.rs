use std::{
    error::Error as StdError,
    fmt::{self, Debug, Display},
};

use crate::{Chain, chain};

/// An error annotated with what was being done when it happened.
///
/// Displayed as `{context}: {error}`, with the annotated error as its source.
pub struct ContextError<C, E> {
    context: C,
    error: E,
}

impl<C, E> ContextError<C, E> {
    /// The context message.
    pub fn message(&self) -> &C {
        &self.context
    }

    /// The annotated error.
    pub fn get_ref(&self) -> &E {
        &self.error
    }

    /// Drop the context, returning the annotated error.
    pub fn into_inner(self) -> E {
        self.error
    }
}

impl<C: Display, E: Debug> Debug for ContextError<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextError")
            .field("context", &format_args!("{}", self.context))
            .field("error", &self.error)
            .finish()
    }
}

impl<C: Display, E: Display> Display for ContextError<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.error)
    }
}

impl<C, E> StdError for ContextError<C, E>
where
    C: Display,
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

/// Extends [`Result`] with methods for adding context to its error.
///
/// # Examples
///
/// ```
/// use ioseq_error::ErrorContext;
///
/// let result = "hello".parse::<i32>().context("parse integer");
/// assert_eq!("parse integer: invalid digit found in string", result.unwrap_err().to_string());
/// ```
pub trait ErrorContext<T, E>: private::SealedErrorContext {
    /// Annotate the error, if any, with `context`.
    fn context<C: Display>(self, context: C) -> Result<T, ContextError<C, E>>;

    /// Annotate the error, if any, with the context returned by `f`.
    fn with_context<C, F>(self, f: F) -> Result<T, ContextError<C, E>>
    where
        C: Display,
        F: FnOnce() -> C;
}

impl<T, E: StdError> ErrorContext<T, E> for Result<T, E> {
    fn context<C: Display>(self, context: C) -> Result<T, ContextError<C, E>> {
        self.map_err(|error| ContextError { context, error })
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ContextError<C, E>>
    where
        C: Display,
        F: FnOnce() -> C,
    {
        self.map_err(|error| ContextError {
            context: f(),
            error,
        })
    }
}

/// Extends errors with methods to annotate them and to look through their sources.
///
/// # Examples
///
/// ```
/// use std::io;
/// use ioseq_error::ErrorExt;
///
/// let error = io::Error::other("disk on fire").context("fill chunk");
/// assert_eq!(error.to_string(), "fill chunk: disk on fire");
/// assert!(error.root_cause().is::<io::Error>());
/// ```
pub trait ErrorExt: StdError + private::SealedErrorExt {
    /// Annotate the error with `context`.
    fn context<C: Display>(self, context: C) -> ContextError<C, Self>
    where
        Self: Sized;

    /// Iterate over this error and its sources.
    fn chain(&self) -> Chain<'_>;

    /// The innermost source of this error, or the error itself if it has none.
    fn root_cause(&self) -> &(dyn StdError + 'static);
}

impl<E: StdError + 'static> ErrorExt for E {
    fn context<C: Display>(self, context: C) -> ContextError<C, Self> {
        ContextError {
            context,
            error: self,
        }
    }

    fn chain(&self) -> Chain<'_> {
        chain(self)
    }

    fn root_cause(&self) -> &(dyn StdError + 'static) {
        let this: &(dyn StdError + 'static) = self;
        chain(this).last().unwrap_or(this)
    }
}

mod private {
    pub trait SealedErrorContext {}

    impl<T, E> SealedErrorContext for Result<T, E> {}

    pub trait SealedErrorExt {}

    impl<E: std::error::Error + 'static> SealedErrorExt for E {}
}
