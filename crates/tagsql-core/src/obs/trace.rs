//! Compile tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect
//! compilation semantics.

use tagsql_ir::CommandKind;

///
/// TraceSink
///

pub trait TraceSink: Send + Sync {
    fn on_event(&self, event: TraceEvent<'_>);
}

///
/// CheckStep
///
/// States of the command checker, in execution order.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CheckStep {
    LoadTarget,
    LoadJoins,
    CheckOnConflict,
    CheckWhere,
    CheckOrderBy,
    CheckDefaults,
    CheckForce,
    CheckReturning,
    CheckTextSearch,
    CheckBindings,
    Done,
}

impl CheckStep {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::LoadTarget => Self::LoadJoins,
            Self::LoadJoins => Self::CheckOnConflict,
            Self::CheckOnConflict => Self::CheckWhere,
            Self::CheckWhere => Self::CheckOrderBy,
            Self::CheckOrderBy => Self::CheckDefaults,
            Self::CheckDefaults => Self::CheckForce,
            Self::CheckForce => Self::CheckReturning,
            Self::CheckReturning => Self::CheckTextSearch,
            Self::CheckTextSearch => Self::CheckBindings,
            Self::CheckBindings | Self::Done => Self::Done,
        }
    }
}

///
/// TraceEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraceEvent<'a> {
    /// A catalogue snapshot was served from the cache.
    CatalogHit { database: &'a str },
    CatalogLoaded {
        database: &'a str,
        types: usize,
        operators: usize,
        casts: usize,
        procedures: usize,
    },
    RelationLoaded {
        relation: &'a str,
        columns: usize,
    },
    Step {
        command: &'a str,
        step: CheckStep,
    },
    /// One predicate node visited while checking a WHERE block.
    Predicate {
        command: &'a str,
        depth: usize,
        group: bool,
    },
    CommandCompiled {
        command: &'a str,
        kind: CommandKind,
        params: usize,
    },
}

/// Forward an event to an optional sink.
pub fn emit(sink: Option<&dyn TraceSink>, event: TraceEvent<'_>) {
    if let Some(sink) = sink {
        sink.on_event(event);
    }
}
