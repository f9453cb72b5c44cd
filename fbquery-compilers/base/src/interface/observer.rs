use std::sync::{Mutex, MutexGuard};

use fbquery_core::err::{bail, Result};

use super::LoggedQuery;

/// Receives every statement produced by a compiler session.
///
/// Called exactly once per successfully compiled statement, never for failed compilations.
pub trait StatementObserver: Send + Sync {
    fn statement_compiled(&self, query: &LoggedQuery) -> Result<()>;
}

/// Remembers the most recently compiled statement
#[derive(Debug, Default)]
pub struct LastStatementRecorder {
    last: Mutex<Option<LoggedQuery>>,
}

impl LastStatementRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the last compiled statement, if any
    pub fn last(&self) -> Result<Option<LoggedQuery>> {
        Ok(self.lock()?.clone())
    }

    /// Gets the sql text of the last compiled statement, if any
    pub fn last_text(&self) -> Result<Option<String>> {
        Ok(self.lock()?.as_ref().map(|q| q.query().to_string()))
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.take();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<Option<LoggedQuery>>> {
        Ok(match self.last.lock() {
            Ok(q) => q,
            Err(err) => bail!("Failed to lock last statement: {:?}", err),
        })
    }
}

impl StatementObserver for LastStatementRecorder {
    fn statement_compiled(&self, query: &LoggedQuery) -> Result<()> {
        *self.lock()? = Some(query.clone());
        Ok(())
    }
}
