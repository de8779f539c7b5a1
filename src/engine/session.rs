//! Scoped engine lifetime
//!
//! Acquire, run all jobs, release: the release happens once whether the jobs
//! succeed, fail, or panic.

use super::types::TableEngine;
use crate::error::Result;

/// RAII guard that releases its engine exactly once
pub struct EngineSession<E: TableEngine> {
    engine: E,
    released: bool,
}

impl<E: TableEngine> EngineSession<E> {
    /// Take ownership of an acquired engine
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            released: false,
        }
    }

    /// Borrow the engine
    pub fn engine(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Release the engine now and report the outcome
    pub fn close(mut self) -> Result<()> {
        self.released = true;
        self.engine.release()
    }
}

impl<E: TableEngine> Drop for EngineSession<E> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.engine.release() {
            tracing::warn!(error = %e, "Failed to release engine");
        }
    }
}

/// Run `f` against `engine`, then release the engine.
///
/// An error from `f` takes precedence over an error from the release.
pub fn scoped<E, T, F>(engine: E, f: F) -> Result<T>
where
    E: TableEngine,
    F: FnOnce(&mut E) -> Result<T>,
{
    let mut session = EngineSession::new(engine);
    let outcome = f(session.engine());
    let released = session.close();

    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release_err)) => {
            tracing::warn!(error = %release_err, "Failed to release engine after job error");
            Err(e)
        }
    }
}
