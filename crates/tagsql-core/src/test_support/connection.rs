use super::{
    catalog::{standard_casts, standard_operators, standard_procedures, standard_types},
    relation::FakeRelation,
};
use crate::{
    catalog::{
        CastContext, CatalogCast, CatalogOperator, CatalogProcedure, CatalogType, Oid, TypeClass,
        oid, query as catalog_query,
    },
    db::{Cell, Connection, ConnectionError, QueryParam, Row},
    relation::query as relation_query,
};
use std::collections::HashMap;

/// `server_version_num` reported unless overridden.
pub const DEFAULT_SERVER_VERSION: i64 = 160_002;

///
/// FakeConnection
///
/// Scripted session answering the compiler's introspection queries from the
/// canned catalogue and registered relations. Every query is logged.
///

#[derive(Clone, Debug)]
pub struct FakeConnection {
    database: String,
    version: i64,
    types: Vec<CatalogType>,
    operators: Vec<CatalogOperator>,
    casts: Vec<CatalogCast>,
    procedures: Vec<(String, CatalogProcedure)>,
    relations: Vec<FakeRelation>,
    literals: HashMap<String, Oid>,
    fail_on: Option<String>,
    log: Vec<String>,
}

impl Default for FakeConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeConnection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            database: "app".to_string(),
            version: DEFAULT_SERVER_VERSION,
            types: standard_types(),
            operators: standard_operators(),
            casts: standard_casts(),
            procedures: standard_procedures(),
            relations: Vec::new(),
            literals: HashMap::new(),
            fail_on: None,
            log: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    #[must_use]
    pub const fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_relation(mut self, relation: FakeRelation) -> Self {
        self.relations.push(relation);
        self
    }

    #[must_use]
    pub fn with_type(mut self, ty: CatalogType) -> Self {
        self.types.push(ty);
        self
    }

    /// Fix the type reported for one literal probe.
    #[must_use]
    pub fn with_literal(mut self, literal: &str, type_oid: Oid) -> Self {
        self.literals.insert(literal.to_string(), type_oid);
        self
    }

    /// Fail every query whose text starts with `prefix`.
    #[must_use]
    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    /// Fail the catalogue load midway, after types were fetched.
    #[must_use]
    pub fn failing_catalog_load(self) -> Self {
        self.failing_on(catalog_query::OPERATORS)
    }

    #[must_use]
    pub fn query_count(&self) -> usize {
        self.log.len()
    }

    #[must_use]
    pub fn queries(&self) -> &[String] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn relation_by_oid(&self, params: &[QueryParam<'_>]) -> Option<&FakeRelation> {
        let [QueryParam::Oid(relid)] = params else {
            return None;
        };

        self.relations.iter().find(|rel| rel.oid == *relid)
    }

    fn literal_oid(&self, literal: &str) -> Result<Oid, ConnectionError> {
        if let Some(type_oid) = self.literals.get(literal) {
            return Ok(*type_oid);
        }

        // explicit casts name their type
        if let Some((_, ty)) = literal.rsplit_once("::") {
            return self
                .types
                .iter()
                .find(|t| t.name == ty.trim() || t.formatted_name == ty.trim())
                .map(|t| t.oid)
                .ok_or_else(|| query_error(&format!("type \"{ty}\" does not exist")));
        }

        let lower = literal.to_ascii_lowercase();
        let type_oid = match lower.as_str() {
            "true" | "false" => oid::BOOL,
            "null" => oid::UNKNOWN,
            "now()" | "current_timestamp" => oid::TIMESTAMPTZ,
            "current_date" => oid::DATE,
            "current_time" => oid::TIMETZ,
            "localtime" => oid::TIME,
            "localtimestamp" => oid::TIMESTAMP,
            _ if literal.starts_with('\'') => oid::UNKNOWN,
            _ if literal.parse::<i32>().is_ok() => oid::INT4,
            _ if literal.parse::<i64>().is_ok() => oid::INT8,
            _ if literal.parse::<f64>().is_ok() => oid::NUMERIC,
            _ => return Err(query_error(&format!("syntax error at or near \"{literal}\""))),
        };

        Ok(type_oid)
    }

    fn answer(&self, sql: &str, params: &[QueryParam<'_>]) -> Result<Vec<Row>, ConnectionError> {
        let rows = match sql {
            catalog_query::CURRENT_DATABASE => vec![Row::new(vec![Cell::from(self.database.as_str())])],
            catalog_query::SERVER_VERSION => {
                vec![Row::new(vec![Cell::Text(self.version.to_string())])]
            }
            catalog_query::TYPES => self.types.iter().map(type_row).collect(),
            catalog_query::OPERATORS => self
                .operators
                .iter()
                .map(|op| {
                    Row::new(vec![
                        Cell::from(op.name.as_str()),
                        Cell::Oid(op.left),
                        Cell::Oid(op.right),
                        Cell::Oid(op.result),
                    ])
                })
                .collect(),
            catalog_query::CASTS => self
                .casts
                .iter()
                .map(|cast| {
                    Row::new(vec![
                        Cell::Oid(cast.target),
                        Cell::Oid(cast.source),
                        Cell::from(cast_context(cast.context)),
                    ])
                })
                .collect(),
            catalog_query::PROCEDURES | catalog_query::PROCEDURES_LEGACY => self
                .procedures
                .iter()
                .map(|(name, procedure)| {
                    Row::new(vec![
                        Cell::from(name.as_str()),
                        Cell::Oid(procedure.arg),
                        Cell::Oid(procedure.ret),
                        Cell::Bool(procedure.aggregate),
                    ])
                })
                .collect(),
            relation_query::RELATION => {
                let [QueryParam::Text(name), QueryParam::Text(namespace)] = params else {
                    return Err(query_error("relation lookup expects name and namespace"));
                };
                self.relations
                    .iter()
                    .filter(|rel| rel.name == *name && rel.namespace == *namespace)
                    .map(FakeRelation::relation_row)
                    .collect()
            }
            relation_query::COLUMNS => self
                .relation_by_oid(params)
                .map(FakeRelation::column_rows)
                .unwrap_or_default(),
            relation_query::CONSTRAINTS => self
                .relation_by_oid(params)
                .map(FakeRelation::constraint_rows)
                .unwrap_or_default(),
            relation_query::INDEXES => self
                .relation_by_oid(params)
                .map(FakeRelation::index_rows)
                .unwrap_or_default(),
            _ => {
                let Some(literal) = sql
                    .strip_prefix(catalog_query::LITERAL_TYPE_PREFIX)
                    .and_then(|rest| rest.strip_suffix(")::oid"))
                else {
                    return Err(query_error(&format!("unexpected query: {sql}")));
                };
                vec![Row::new(vec![Cell::Oid(self.literal_oid(literal.trim())?)])]
            }
        };

        Ok(rows)
    }
}

impl Connection for FakeConnection {
    fn query(&mut self, sql: &str, params: &[QueryParam<'_>]) -> Result<Vec<Row>, ConnectionError> {
        self.log.push(sql.to_string());

        if let Some(prefix) = &self.fail_on
            && sql.starts_with(prefix.as_str())
        {
            return Err(query_error("scripted failure"));
        }

        self.answer(sql, params)
    }
}

fn type_row(ty: &CatalogType) -> Row {
    Row::new(vec![
        Cell::Oid(ty.oid),
        Cell::from(ty.name.as_str()),
        Cell::from(ty.formatted_name.as_str()),
        Cell::Int(i64::from(ty.length)),
        Cell::from(class_char(ty)),
        Cell::Text(ty.category.as_char().to_string()),
        Cell::Oid(ty.element),
        Cell::Bool(ty.preferred),
    ])
}

const fn class_char(ty: &CatalogType) -> &'static str {
    match ty.class {
        TypeClass::Base => "b",
        TypeClass::Composite => "c",
        TypeClass::Domain => "d",
        TypeClass::Enum => "e",
        TypeClass::Multirange => "m",
        TypeClass::Pseudo => "p",
        TypeClass::Range => "r",
    }
}

const fn cast_context(context: CastContext) -> &'static str {
    match context {
        CastContext::Explicit => "e",
        CastContext::Implicit => "i",
        CastContext::Assignment => "a",
    }
}

fn query_error(message: &str) -> ConnectionError {
    ConnectionError::Query {
        message: message.to_string(),
    }
}
