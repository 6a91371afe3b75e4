//! Error Types
//!
//! The per-root engine never fails: cycles and missing capabilities are
//! reported through a [`DiagnosticSink`](crate::DiagnosticSink) and the
//! query continues. Only the whole-corpus ordering and the manifest loaders
//! surface errors.

use std::fmt::{self, Debug};

use thiserror::Error;

/// A circular run-before chain found while computing a global order.
///
/// `chain` lists the ancestor chain of the failing insertion, ending with
/// the type that closed the loop (so `[A, B, A]` for `A -> B -> A`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circular reference detected in dependency chain: {}", render_chain(.chain))]
pub struct CycleError<T: Debug> {
    pub chain: Vec<T>,
}

impl<T: Debug> CycleError<T> {
    /// The type that was reached twice.
    pub fn repeated(&self) -> Option<&T> {
        self.chain.last()
    }
}

fn render_chain<T: Debug>(chain: &[T]) -> String {
    struct Chain<'a, T>(&'a [T]);

    impl<T: Debug> fmt::Display for Chain<'_, T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (i, ty) in self.0.iter().enumerate() {
                if i > 0 {
                    f.write_str(" -> ")?;
                }
                write!(f, "{ty:?}")?;
            }
            Ok(())
        }
    }

    Chain(chain).to_string()
}

/// Errors raised while loading declarations or computing a global order.
#[derive(Debug, Error)]
pub enum Error {
    /// A declaration manifest could not be parsed.
    #[error("invalid declaration manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The run-before relation of a manifest contains a cycle.
    #[error("circular reference detected in dependency chain: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },
}

impl From<CycleError<String>> for Error {
    fn from(err: CycleError<String>) -> Self {
        Error::Cycle { chain: err.chain }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
