use super::{Catalog, CatalogError, query};
use crate::{
    db::Connection,
    obs::trace::{TraceEvent, TraceSink, emit},
};
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, RwLock},
};
use tracing::{debug, info};

///
/// CatalogIdentity
///
/// Cache key: the server address the caller connected to plus the database
/// the session reports.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CatalogIdentity {
    pub address: String,
    pub database: String,
}

impl CatalogIdentity {
    pub fn new(address: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            database: database.into(),
        }
    }

    /// Build an identity from `address` and `SELECT current_database()`.
    pub fn probe(conn: &mut dyn Connection, address: &str) -> Result<Self, CatalogError> {
        let database = query::current_database(conn)?;

        Ok(Self::new(address, database))
    }
}

impl fmt::Display for CatalogIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.database, self.address)
    }
}

// One identity's snapshot. Empty until its first load succeeds.
type Slot = Arc<Mutex<Option<Arc<Catalog>>>>;

///
/// CatalogCache
///
/// Shared catalogue snapshots keyed by identity. The map lock is only held
/// to find or create an identity's slot; the first load of an identity
/// holds that slot's lock until the snapshot is published, so concurrent
/// callers never load twice and other identities are never blocked.
///

#[derive(Debug, Default)]
pub struct CatalogCache {
    slots: RwLock<HashMap<CatalogIdentity, Slot>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(
        &self,
        conn: &mut dyn Connection,
        identity: &CatalogIdentity,
    ) -> Result<Arc<Catalog>, CatalogError> {
        self.load_traced(conn, identity, None)
    }

    pub fn load_traced(
        &self,
        conn: &mut dyn Connection,
        identity: &CatalogIdentity,
        trace: Option<&dyn TraceSink>,
    ) -> Result<Arc<Catalog>, CatalogError> {
        let slot = self.slot(identity)?;
        let mut entry = slot.lock().map_err(|_| CatalogError::CachePoisoned)?;
        if let Some(catalog) = entry.as_ref() {
            Self::hit(identity, trace);
            return Ok(Arc::clone(catalog));
        }

        // nothing is published unless every set loads
        let catalog = Arc::new(fetch(conn)?);
        info!(
            identity = %identity,
            types = catalog.type_count(),
            operators = catalog.operator_count(),
            casts = catalog.cast_count(),
            procedures = catalog.procedure_count(),
            "catalogue loaded"
        );
        emit(
            trace,
            TraceEvent::CatalogLoaded {
                database: &identity.database,
                types: catalog.type_count(),
                operators: catalog.operator_count(),
                casts: catalog.cast_count(),
                procedures: catalog.procedure_count(),
            },
        );
        *entry = Some(Arc::clone(&catalog));

        Ok(catalog)
    }

    /// Snapshot for `identity`, if already loaded. Waits for a load of the
    /// same identity that is in flight.
    pub fn cached(&self, identity: &CatalogIdentity) -> Result<Option<Arc<Catalog>>, CatalogError> {
        let slot = {
            let slots = self.slots.read().map_err(|_| CatalogError::CachePoisoned)?;
            match slots.get(identity) {
                Some(slot) => Arc::clone(slot),
                None => return Ok(None),
            }
        };
        let entry = slot.lock().map_err(|_| CatalogError::CachePoisoned)?;

        Ok(entry.clone())
    }

    /// Publish a snapshot obtained elsewhere, replacing any cached one.
    pub fn insert(
        &self,
        identity: CatalogIdentity,
        catalog: Catalog,
    ) -> Result<Arc<Catalog>, CatalogError> {
        let catalog = Arc::new(catalog);
        let slot = self.slot(&identity)?;
        *slot.lock().map_err(|_| CatalogError::CachePoisoned)? = Some(Arc::clone(&catalog));

        Ok(catalog)
    }

    /// Number of loaded snapshots.
    pub fn len(&self) -> Result<usize, CatalogError> {
        let slots: Vec<Slot> = {
            let slots = self.slots.read().map_err(|_| CatalogError::CachePoisoned)?;
            slots.values().cloned().collect()
        };

        let mut loaded = 0;
        for slot in slots {
            if slot.lock().map_err(|_| CatalogError::CachePoisoned)?.is_some() {
                loaded += 1;
            }
        }

        Ok(loaded)
    }

    fn slot(&self, identity: &CatalogIdentity) -> Result<Slot, CatalogError> {
        {
            let slots = self.slots.read().map_err(|_| CatalogError::CachePoisoned)?;
            if let Some(slot) = slots.get(identity) {
                return Ok(Arc::clone(slot));
            }
        }

        let mut slots = self.slots.write().map_err(|_| CatalogError::CachePoisoned)?;

        Ok(Arc::clone(slots.entry(identity.clone()).or_default()))
    }

    fn hit(identity: &CatalogIdentity, trace: Option<&dyn TraceSink>) {
        debug!(identity = %identity, "catalogue cache hit");
        emit(
            trace,
            TraceEvent::CatalogHit {
                database: &identity.database,
            },
        );
    }
}

fn fetch(conn: &mut dyn Connection) -> Result<Catalog, CatalogError> {
    let version = query::server_version(conn)?;
    let types = query::load_types(conn)?;
    let operators = query::load_operators(conn)?;
    let casts = query::load_casts(conn)?;
    let procedures = query::load_procedures(conn, version)?;

    Ok(Catalog::new(types, operators, casts, procedures))
}
