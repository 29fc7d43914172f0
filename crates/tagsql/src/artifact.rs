//! Serialisable compile output handed to code emitters.

use crate::error::Error;
use serde::Serialize;
use tagsql_core::{
    check::{CheckedCommand, Pairing},
    sql::{ArgSource, FilterMap, Lowered},
};
use tagsql_ir::CommandKind;
use tagsql_utils::fingerprint::Fingerprint;

/// Prefix of generated prepared statement names.
pub const STATEMENT_NAME_PREFIX: &str = "tagsql_";

///
/// Compiled
///
/// One command ready for code generation. Filter commands carry a `filter`
/// map instead of SQL.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Compiled {
    pub name: String,
    pub kind: CommandKind,
    pub sql: Option<String>,
    /// Hex SHA-256 of the statement kind and text.
    pub fingerprint: Option<String>,
    pub args: Vec<ArgSource>,
    pub inputs: Vec<Pairing>,
    pub outputs: Vec<Pairing>,
    pub filter: Option<FilterMap>,
    pub multi_row: bool,

    /// Field receiving the affected row count.
    pub rows_affected: Option<String>,
    pub error_handler: Option<String>,
}

impl Compiled {
    pub(crate) fn new(checked: CheckedCommand, lowered: Lowered) -> Self {
        let CheckedCommand {
            command,
            inputs,
            outputs,
            ..
        } = checked;

        let (sql, fingerprint, args, filter, multi_row) = match lowered {
            Lowered::Statement(bound) => {
                let sql = bound.sql();
                let fingerprint = Fingerprint::of_statement(command.kind.as_str(), &sql).to_hex();

                (Some(sql), Some(fingerprint), bound.args, None, bound.multi_row)
            }
            Lowered::Filter(map) => (None, None, Vec::new(), Some(map), false),
        };

        Self {
            name: command.name,
            kind: command.kind,
            sql,
            fingerprint,
            args,
            inputs,
            outputs,
            filter,
            multi_row,
            rows_affected: command.rows_affected.map(|field| field.key()),
            error_handler: command.error_handler.map(|field| field.key()),
        }
    }

    /// Prepared statement name derived from the fingerprint.
    #[must_use]
    pub fn statement_name(&self) -> Option<String> {
        self.fingerprint
            .as_deref()
            .and_then(|hex| hex.get(..16))
            .map(|short| format!("{STATEMENT_NAME_PREFIX}{short}"))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

///
/// Batch
///
/// Result of compiling several commands under the collect policy.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Batch {
    pub compiled: Vec<Compiled>,
    pub failures: Vec<Error>,
}

impl Batch {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure for the named command, if it failed.
    #[must_use]
    pub fn failure(&self, command: &str) -> Option<&Error> {
        self.failures
            .iter()
            .find(|err| err.command.as_deref() == Some(command))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
