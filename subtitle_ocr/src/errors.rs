//! Error types for this crate.

use std::{io, path::PathBuf, result};

/// A `Result` type which defaults to our own `Error`.
pub type Result<T, E = Error> = result::Result<T, E>;

/// Errors which can be returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// We could not construct an OCR engine. Nothing can be recognized
    /// without one, so callers should treat this as fatal.
    #[error("could not initialize OCR engine (language {language:?}): {message}")]
    #[non_exhaustive]
    EngineInit {
        /// The language we asked the engine to load.
        language: String,
        /// What the engine told us.
        message: String,
    },

    /// This build has no usable OCR engine.
    #[error("OCR engine {name:?} is not available in this build")]
    #[non_exhaustive]
    EngineUnavailable {
        /// The name of the missing engine.
        name: &'static str,
    },

    /// The engine failed to recognize a single subtitle.
    #[error("text recognition failed: {message}")]
    #[non_exhaustive]
    Recognition {
        /// What the engine told us.
        message: String,
    },

    /// A worker thread panicked while recognizing a subtitle.
    #[error("OCR worker in slot {slot} panicked")]
    #[non_exhaustive]
    WorkerPanicked {
        /// The pool slot which was running the worker.
        slot: usize,
    },

    /// We could not spawn a worker thread.
    #[error("could not start OCR worker thread")]
    SpawnWorker(#[source] io::Error),

    /// An I/O error involving a specific file.
    #[error("error accessing {}", path.display())]
    #[non_exhaustive]
    Io {
        /// The file we were working with.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// An I/O error writing output.
    #[error("error writing subtitles")]
    Write(#[source] io::Error),

    /// An error encoding or decoding an image.
    #[error("image error")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// An engine could not be constructed. For use by `EngineFactory`
    /// implementations.
    pub fn engine_init<L, M>(language: L, message: M) -> Error
    where
        L: Into<String>,
        M: Into<String>,
    {
        Error::EngineInit {
            language: language.into(),
            message: message.into(),
        }
    }

    /// An engine could not recognize an image. For use by `Recognizer`
    /// implementations.
    pub fn recognition<M: Into<String>>(message: M) -> Error {
        Error::Recognition {
            message: message.into(),
        }
    }

    /// Wrap an `io::Error` with the path that caused it.
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
