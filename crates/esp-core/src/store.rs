//! Security Association store
//!
//! Registry of provisioned SAs keyed by SPI. Each record sits behind its
//! own mutex so traffic on different SPIs never serializes on a single
//! lock; the outer map lock is held only long enough to find, insert, or
//! remove a record, never across cryptographic work.
//!
//! Insert and remove go through the same locks, so a concurrent
//! decapsulate either sees a whole SA or none at all.

use crate::sa::SecurityAssociation;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Shared handle to one SA record
pub type SaRecord = Arc<Mutex<SecurityAssociation>>;

/// Store of all provisioned Security Associations
#[derive(Debug, Default)]
pub struct SaStore {
    records: RwLock<HashMap<u32, SaRecord>>,
}

impl SaStore {
    /// Create an empty store
    pub fn new() -> Self {
        SaStore {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a newly provisioned SA
    ///
    /// # Errors
    ///
    /// - `InvalidSpi` for SPI 0 (reserved by ESP)
    /// - `DuplicateSpi` if an SA with this SPI already exists
    pub fn insert(&self, sa: SecurityAssociation) -> Result<()> {
        if sa.spi == 0 {
            return Err(Error::InvalidSpi(0));
        }

        let mut records = self
            .records
            .write()
            .map_err(|_| Error::Internal("SA store lock poisoned".into()))?;

        if records.contains_key(&sa.spi) {
            return Err(Error::DuplicateSpi(sa.spi));
        }

        records.insert(sa.spi, Arc::new(Mutex::new(sa)));
        Ok(())
    }

    /// Look up the SA record for an SPI
    ///
    /// Returns a clone of the record handle; callers lock it for the
    /// duration of one encapsulate/decapsulate operation.
    pub fn lookup(&self, spi: u32) -> Result<SaRecord> {
        let records = self
            .records
            .read()
            .map_err(|_| Error::Internal("SA store lock poisoned".into()))?;

        records.get(&spi).cloned().ok_or(Error::UnknownSpi(spi))
    }

    /// Remove an SA (teardown)
    pub fn remove(&self, spi: u32) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::Internal("SA store lock poisoned".into()))?;

        records.remove(&spi).map(|_| ()).ok_or(Error::UnknownSpi(spi))
    }

    /// Whether an SA exists for this SPI
    pub fn contains(&self, spi: u32) -> bool {
        self.records
            .read()
            .map(|records| records.contains_key(&spi))
            .unwrap_or(false)
    }

    /// Number of provisioned SAs
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
