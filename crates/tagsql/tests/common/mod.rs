#![allow(dead_code)]

use std::sync::Mutex;
use tagsql::{
    CommandSource, Compiler, CompilerConfig,
    core::{
        obs::trace::{TraceEvent, TraceSink},
        test_support::{FakeConnection, posts_table, users_table},
    },
    ir::{Directive, HostField, HostType, Tag, host::ScalarKind},
};

pub fn int() -> HostType {
    HostType::scalar(ScalarKind::I32)
}

pub fn rel(name: &str, rel: &str, ty: HostType) -> HostField {
    HostField::new(name, Tag::new().with("rel", rel), ty)
}

pub fn directive(d: Directive, sql: &str) -> HostField {
    if sql.is_empty() {
        HostField::new("_", Tag::new(), d.host_type())
    } else {
        HostField::sql("_", sql, d.host_type())
    }
}

pub fn block(name: &str, members: Vec<HostField>) -> HostField {
    HostField::new(name, Tag::new(), HostType::record(members))
}

pub fn user_record() -> HostType {
    HostType::record(vec![
        HostField::sql("Id", "id", int()),
        HostField::sql("Name", "name", HostType::text()),
        HostField::sql("Email", "email", HostType::text()),
    ])
}

pub fn connection() -> FakeConnection {
    FakeConnection::new()
        .with_relation(users_table())
        .with_relation(posts_table())
}

pub fn compiler() -> Compiler {
    Compiler::new(CompilerConfig::default())
}

/// `InsertUser { User: users { Name, Email } }`.
pub fn insert_user() -> CommandSource {
    let record = HostType::record(vec![
        HostField::sql("Name", "name", HostType::text()),
        HostField::sql("Email", "email", HostType::text()),
    ]);

    CommandSource::new("InsertUser", vec![rel("User", "users", record)])
}

/// `SelectUser { User: users, Where { Email } }` with the given email type.
pub fn select_user(email: HostType) -> CommandSource {
    CommandSource::new(
        "SelectUser",
        vec![
            rel("User", "users", user_record()),
            block("Where", vec![HostField::sql("Email", "email", email)]),
        ],
    )
}

///
/// EventLog
///
/// Owned copies of the trace events a test cares about.
///

#[derive(Debug, Default)]
pub struct EventLog {
    pub catalog_loads: Mutex<usize>,
    pub catalog_hits: Mutex<usize>,
    pub predicates: Mutex<Vec<(usize, bool)>>,
    pub compiled: Mutex<Vec<(String, usize)>>,
}

impl EventLog {
    pub fn loads(&self) -> usize {
        *self.catalog_loads.lock().unwrap()
    }

    pub fn hits(&self) -> usize {
        *self.catalog_hits.lock().unwrap()
    }
}

impl TraceSink for EventLog {
    fn on_event(&self, event: TraceEvent<'_>) {
        match event {
            TraceEvent::CatalogLoaded { .. } => *self.catalog_loads.lock().unwrap() += 1,
            TraceEvent::CatalogHit { .. } => *self.catalog_hits.lock().unwrap() += 1,
            TraceEvent::Predicate { depth, group, .. } => {
                self.predicates.lock().unwrap().push((depth, group));
            }
            TraceEvent::CommandCompiled {
                command, params, ..
            } => {
                self.compiled
                    .lock()
                    .unwrap()
                    .push((command.to_string(), params));
            }
            _ => {}
        }
    }
}
