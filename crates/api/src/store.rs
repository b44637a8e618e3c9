//! In-memory stores for invoices and clients.
//!
//! Persistence proper is owned by an external storage layer; this store
//! exists to give the API boundary the write discipline the domain
//! requires: per-invoice mutual exclusion for the duration of a mutation
//! (a `DashMap` entry lock) plus an optimistic version check against stale
//! reads. Mutations are applied copy-on-write, so a failed operation
//! leaves the stored invoice untouched.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};

use facture_core::invoice::{Invoice, InvoiceError};
use facture_core::lifecycle::InvoiceStatus;
use facture_shared::types::{ClientId, InvoiceId};

/// A client record, supplied by the external client directory.
///
/// The send guard only needs a recipient address; the rest is display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// Recipient email address (required for sending invoices).
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// In-memory client directory.
#[derive(Debug, Default)]
pub struct ClientDirectory {
    clients: DashMap<ClientId, Client>,
}

impl ClientDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a client.
    pub fn insert(&self, client: Client) {
        self.clients.insert(client.id, client);
    }

    /// Looks up a client by ID.
    #[must_use]
    pub fn get(&self, id: ClientId) -> Option<Client> {
        self.clients.get(&id).map(|entry| entry.value().clone())
    }
}

/// In-memory invoice store with optimistic concurrency.
#[derive(Debug, Default)]
pub struct InvoiceStore {
    invoices: DashMap<InvoiceId, Invoice>,
}

impl InvoiceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly created invoice.
    pub fn insert(&self, invoice: Invoice) {
        self.invoices.insert(invoice.id, invoice);
    }

    /// Returns a snapshot of an invoice.
    pub fn get(&self, id: InvoiceId) -> Result<Invoice, InvoiceError> {
        self.invoices
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(InvoiceError::NotFound(id))
    }

    /// Returns snapshots of all invoices matching the filter.
    #[must_use]
    pub fn list(
        &self,
        client_id: Option<ClientId>,
        status: Option<InvoiceStatus>,
        today: chrono::NaiveDate,
    ) -> Vec<Invoice> {
        let mut invoices: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|entry| client_id.is_none_or(|c| entry.client_id == c))
            .filter(|entry| status.is_none_or(|s| entry.status_as_of(today) == s))
            .map(|entry| entry.value().clone())
            .collect();
        // UUID v7 IDs are time-ordered, so this is creation order
        invoices.sort_by_key(|invoice| invoice.id.into_inner());
        invoices
    }

    /// Applies a mutation under the invoice's entry lock.
    ///
    /// When `expected_version` is given, the write is refused if the stored
    /// invoice has moved past it; the caller re-reads and retries. The
    /// mutation runs against a copy that only replaces the stored invoice
    /// on success, so every operation is atomic at the store boundary.
    pub fn mutate<T>(
        &self,
        id: InvoiceId,
        expected_version: Option<u64>,
        f: impl FnOnce(&mut Invoice) -> Result<T, InvoiceError>,
    ) -> Result<T, InvoiceError> {
        let mut entry = self
            .invoices
            .get_mut(&id)
            .ok_or(InvoiceError::NotFound(id))?;

        if let Some(expected) = expected_version
            && expected != entry.version
        {
            return Err(InvoiceError::VersionMismatch {
                expected,
                actual: entry.version,
            });
        }

        let mut draft = entry.value().clone();
        let out = f(&mut draft)?;
        *entry = draft;
        Ok(out)
    }

    /// Deletes an invoice, refusing when it holds completed payments.
    pub fn remove(&self, id: InvoiceId) -> Result<(), InvoiceError> {
        match self.invoices.entry(id) {
            Entry::Occupied(entry) => {
                entry.get().ensure_deletable()?;
                entry.remove();
                Ok(())
            }
            Entry::Vacant(_) => Err(InvoiceError::NotFound(id)),
        }
    }
}
