//! Per-command compile pipeline and batch driver.
//!
//! Each command runs analyze, catalogue lookup, check and build in that
//! order. Analysis never touches the database, so structurally broken
//! records fail before any query is issued.

use crate::{
    artifact::{Batch, Compiled},
    config::{CompilerConfig, FailurePolicy},
    error::Error,
};
use std::sync::Arc;
use tagsql_core::{
    catalog::{Catalog, CatalogCache, CatalogIdentity},
    check::check_command,
    db::Connection,
    obs::trace::{TraceEvent, TraceSink, emit},
    sql::build,
};
use tagsql_ir::{HostField, analyze_command};
use tracing::{debug, info, warn};

///
/// CommandSource
///
/// One annotated record as reported by the frontend.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandSource {
    pub name: String,
    pub fields: Vec<HostField>,
}

impl CommandSource {
    pub fn new(name: impl Into<String>, fields: Vec<HostField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

///
/// Compiler
///
/// Compiles commands against live schemas. The catalogue cache is shared,
/// so one compiler (or several built over the same cache) can serve
/// concurrent callers, each with its own connection.
///

pub struct Compiler {
    cache: Arc<CatalogCache>,
    config: CompilerConfig,
    trace: Option<Arc<dyn TraceSink>>,
}

impl Compiler {
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_cache(Arc::new(CatalogCache::new()), config)
    }

    #[must_use]
    pub const fn with_cache(cache: Arc<CatalogCache>, config: CompilerConfig) -> Self {
        Self {
            cache,
            config,
            trace: None,
        }
    }

    #[must_use]
    pub fn with_trace(mut self, trace: Arc<dyn TraceSink>) -> Self {
        self.trace = Some(trace);
        self
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Catalogue for the session behind `conn`, loading it on first use.
    pub fn catalog(&self, conn: &mut dyn Connection) -> Result<Arc<Catalog>, Error> {
        let identity = self.identity(conn)?;

        Ok(self
            .cache
            .load_traced(conn, &identity, self.trace.as_deref())?)
    }

    /// Compile a single command.
    pub fn compile(
        &self,
        conn: &mut dyn Connection,
        source: &CommandSource,
    ) -> Result<Compiled, Error> {
        let name = source.name.as_str();
        let trace = self.trace.as_deref();

        let cmd = analyze_command(name, &source.fields, &self.config.analyze_options())
            .map_err(|err| Error::from(err).with_command(name))?;
        let catalog = self
            .catalog(conn)
            .map_err(|err| err.with_command(name))?;
        let checked = check_command(conn, &catalog, cmd, &self.config.check_options(), trace)
            .map_err(|err| Error::from(err).with_command(name))?;
        let lowered = build(&checked).map_err(|err| Error::from(err).with_command(name))?;

        let compiled = Compiled::new(checked, lowered);
        emit(
            trace,
            TraceEvent::CommandCompiled {
                command: name,
                kind: compiled.kind,
                params: compiled.args.len(),
            },
        );
        info!(
            command = name,
            kind = %compiled.kind,
            params = compiled.args.len(),
            "command compiled"
        );

        Ok(compiled)
    }

    /// Compile `sources` in order under the configured failure policy.
    ///
    /// With [`FailurePolicy::Abort`] the first failure is returned. With
    /// [`FailurePolicy::Collect`] per-command failures are gathered into
    /// the batch; fatal failures still end the run.
    pub fn compile_all(
        &self,
        conn: &mut dyn Connection,
        sources: &[CommandSource],
    ) -> Result<Batch, Error> {
        let mut batch = Batch::default();

        for source in sources {
            match self.compile(conn, source) {
                Ok(compiled) => batch.compiled.push(compiled),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Collect => {
                        warn!(command = %source.name, kind = %err.kind, error = %err, "command failed");
                        batch.failures.push(err);
                    }
                },
            }
        }

        debug!(
            compiled = batch.compiled.len(),
            failed = batch.failures.len(),
            policy = %self.config.failure_policy,
            "batch compiled"
        );

        Ok(batch)
    }

    fn identity(&self, conn: &mut dyn Connection) -> Result<CatalogIdentity, Error> {
        match &self.config.identity {
            Some(identity) => Ok(identity.clone().into()),
            None => Ok(CatalogIdentity::probe(conn, &self.config.address)?),
        }
    }
}
