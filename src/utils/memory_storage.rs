//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Clone, Default)]
struct Tables {
    traders: HashMap<Uuid, Trader>,
    clients: HashMap<Uuid, Client>,
    sales: HashMap<Uuid, Sale>,
    sale_months: HashMap<Uuid, Vec<SaleMonth>>,
}

#[derive(Debug, Default)]
struct State {
    tables: Tables,
    /// Copy of `tables` taken at `begin`, restored on `rollback`
    snapshot: Option<Tables>,
}

/// In-memory storage implementation for testing and development
///
/// Clones share the same data, so a test can keep a handle while the
/// importer owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> ImportResult<()> {
        *self.write()? = State::default();
        Ok(())
    }

    pub fn all_clients(&self) -> ImportResult<Vec<Client>> {
        Ok(self.read()?.tables.clients.values().cloned().collect())
    }

    pub fn all_sales(&self) -> ImportResult<Vec<Sale>> {
        Ok(self.read()?.tables.sales.values().cloned().collect())
    }

    fn read(&self) -> ImportResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| ImportError::Storage("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> ImportResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| ImportError::Storage("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn begin(&mut self) -> ImportResult<()> {
        let mut state = self.write()?;
        if state.snapshot.is_some() {
            return Err(ImportError::Storage(
                "A batch is already open on this store".to_string(),
            ));
        }
        state.snapshot = Some(state.tables.clone());
        Ok(())
    }

    async fn commit(&mut self) -> ImportResult<()> {
        self.write()?
            .snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| ImportError::Storage("No open batch to commit".to_string()))
    }

    async fn rollback(&mut self) -> ImportResult<()> {
        let mut state = self.write()?;
        let snapshot = state
            .snapshot
            .take()
            .ok_or_else(|| ImportError::Storage("No open batch to roll back".to_string()))?;
        state.tables = snapshot;
        Ok(())
    }

    async fn save_trader(&mut self, trader: &Trader) -> ImportResult<()> {
        self.write()?
            .tables
            .traders
            .insert(trader.uuid, trader.clone());
        Ok(())
    }

    async fn traders_by_email(&self, email: &str) -> ImportResult<Vec<Trader>> {
        Ok(self
            .read()?
            .tables
            .traders
            .values()
            .filter(|trader| trader.email == email)
            .cloned()
            .collect())
    }

    async fn save_client(&mut self, client: &Client) -> ImportResult<()> {
        self.write()?
            .tables
            .clients
            .insert(client.uuid, client.clone());
        Ok(())
    }

    async fn update_client(&mut self, client: &Client) -> ImportResult<()> {
        let mut state = self.write()?;
        match state.tables.clients.get_mut(&client.uuid) {
            Some(stored) => {
                *stored = client.clone();
                Ok(())
            }
            None => Err(ImportError::NotFound(format!("client {}", client.uuid))),
        }
    }

    async fn find_client_by_nip(&self, nip: &str) -> ImportResult<Option<Client>> {
        Ok(self
            .read()?
            .tables
            .clients
            .values()
            .find(|client| client.nip == nip)
            .cloned())
    }

    async fn clients_by_name(&self, name: &str) -> ImportResult<Vec<Client>> {
        Ok(self
            .read()?
            .tables
            .clients
            .values()
            .filter(|client| client.name == name)
            .cloned()
            .collect())
    }

    async fn client_email_taken(&self, email: &str, except: Option<Uuid>) -> ImportResult<bool> {
        Ok(self
            .read()?
            .tables
            .clients
            .values()
            .any(|client| client.email == email && Some(client.uuid) != except))
    }

    async fn save_sale(&mut self, sale: &Sale) -> ImportResult<()> {
        self.write()?.tables.sales.insert(sale.uuid, sale.clone());
        Ok(())
    }

    async fn update_sale(&mut self, sale: &Sale) -> ImportResult<()> {
        let mut state = self.write()?;
        match state.tables.sales.get_mut(&sale.uuid) {
            Some(stored) => {
                *stored = sale.clone();
                Ok(())
            }
            None => Err(ImportError::NotFound(format!("sale {}", sale.uuid))),
        }
    }

    async fn find_sale_by_external_id(&self, external_id: &Uuid) -> ImportResult<Option<Sale>> {
        Ok(self
            .read()?
            .tables
            .sales
            .values()
            .find(|sale| sale.external_id.as_ref() == Some(external_id))
            .cloned())
    }

    async fn replace_sale_months(
        &mut self,
        sale: &Uuid,
        months: &[SaleMonth],
    ) -> ImportResult<()> {
        self.write()?
            .tables
            .sale_months
            .insert(*sale, months.to_vec());
        Ok(())
    }

    async fn sale_months(&self, sale: &Uuid) -> ImportResult<Vec<SaleMonth>> {
        Ok(self
            .read()?
            .tables
            .sale_months
            .get(sale)
            .cloned()
            .unwrap_or_default())
    }
}
