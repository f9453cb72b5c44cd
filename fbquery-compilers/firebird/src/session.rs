use std::{fmt, sync::Arc};

use fbquery_compilers_base::interface::{QueryCompiler, StatementObserver};
use fbquery_core::{
    config::CompilerConfig,
    err::{Context, Result},
    qtree::QueryNode,
    version::ServerVersion,
};
use fbquery_logging::{debug, trace, warn, MaxLogLength};

use crate::{
    capabilities::{capabilities_for, DialectCapabilities},
    query_compiler::{FirebirdQuery, FirebirdQueryCompiler},
};

/// Compiles statements for a single connection.
///
/// The capabilities are derived once from the server version, every successfully
/// compiled statement is reported to the registered observers.
pub struct CompilerSession {
    caps: DialectCapabilities,
    conf: CompilerConfig,
    observers: Vec<Arc<dyn StatementObserver>>,
}

impl CompilerSession {
    /// Creates a session targeting the configured server version
    pub fn new(conf: CompilerConfig) -> Result<Self> {
        let version = conf.server_version()?;

        Ok(Self::for_version(version, conf))
    }

    /// Creates a session for the version reported by the connected server
    pub fn for_version(version: ServerVersion, conf: CompilerConfig) -> Self {
        Self {
            caps: capabilities_for(version),
            conf,
            observers: vec![],
        }
    }

    /// Creates a session from the server's version string, eg "WI-V3.0.7.33374 Firebird 3.0"
    pub fn for_server(version: &str, conf: CompilerConfig) -> Result<Self> {
        let version = ServerVersion::parse(version)
            .with_context(|| format!("Failed to determine dialect of server \"{}\"", version))?;

        Ok(Self::for_version(version, conf))
    }

    pub fn with_observer(mut self, observer: Arc<dyn StatementObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn StatementObserver>) {
        self.observers.push(observer);
    }

    pub fn capabilities(&self) -> &DialectCapabilities {
        &self.caps
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.conf
    }

    /// Compiles the query and notifies the observers.
    /// Nothing is reported if compilation fails.
    pub fn compile(&self, query: &QueryNode) -> Result<FirebirdQuery> {
        let compiled = match FirebirdQueryCompiler::compile_query(&self.caps, &self.conf, query) {
            Ok(compiled) => compiled,
            Err(err) => {
                trace!("Rejected {} query: {:?}", query.kind(), err);
                return Err(err);
            }
        };

        let logged = compiled.logged();
        debug!(
            "Compiled statement: {} {:?}",
            MaxLogLength::new(self.conf.log_max_length, logged.query()),
            MaxLogLength::new(self.conf.log_max_length, logged.params())
        );

        for observer in self.observers.iter() {
            if let Err(err) = observer.statement_compiled(&logged) {
                warn!("Statement observer failed: {:?}", err);
            }
        }

        Ok(compiled)
    }
}

impl fmt::Debug for CompilerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerSession")
            .field("caps", &self.caps)
            .field("conf", &self.conf)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use fbquery_compilers_base::interface::{LastStatementRecorder, LoggedQuery};
    use fbquery_core::qtree::source;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct CountingObserver {
        calls: AtomicUsize,
    }

    impl StatementObserver for CountingObserver {
        fn statement_compiled(&self, _query: &LoggedQuery) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_compiler_session_defaults_to_latest() {
        fbquery_logging::init_for_tests();
        let session = CompilerSession::new(CompilerConfig::default()).unwrap();

        assert_eq!(session.capabilities().server_version, ServerVersion::LATEST);
    }

    #[test]
    fn test_compiler_session_for_server() {
        let session =
            CompilerSession::for_server("WI-V2.5.9.27139 Firebird 2.5", CompilerConfig::default())
                .unwrap();

        assert!(!session.capabilities().supports_top_level_any);

        CompilerSession::for_server("unknown", CompilerConfig::default()).unwrap_err();
    }

    #[test]
    fn test_compiler_session_notifies_observers_once() {
        fbquery_logging::init_for_tests();
        let counter = Arc::new(CountingObserver::default());
        let recorder = Arc::new(LastStatementRecorder::new());
        let session = CompilerSession::new(CompilerConfig::default())
            .unwrap()
            .with_observer(counter.clone())
            .with_observer(recorder.clone());

        let compiled = session.compile(&source("MON$ATTACHMENTS")).unwrap();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.last_text().unwrap(), Some(compiled.query));
    }

    #[test]
    fn test_compiler_session_does_not_notify_on_failure() {
        let counter = Arc::new(CountingObserver::default());
        let session =
            CompilerSession::for_version(ServerVersion::new(2, 5, 0, 0), CompilerConfig::default())
                .with_observer(counter.clone());

        session
            .compile(&source("MON$ATTACHMENTS").any(None))
            .unwrap_err();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
    }
}
