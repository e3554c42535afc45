use crate::domain::order::Order;
use crate::domain::payment::PaymentId;
use crate::domain::ports::OrderStore;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing orders, keyed by order number.
pub const CF_ORDERS: &str = "orders";
/// Column Family mapping payment ids to the number of the owning order.
pub const CF_PAYMENT_INDEX: &str = "payment_index";

/// A persistent order store using RocksDB.
///
/// Orders are stored as JSON under their number; the payment index lives in
/// its own Column Family and is written in the same batch as the order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("orders" and "payment_index") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_index = ColumnFamilyDescriptor::new(CF_PAYMENT_INDEX, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_index])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            GatewayError::InternalError(Box::new(std::io::Error::other(format!(
                "Column family '{name}' not found"
            ))))
        })
    }

    fn decode_order(bytes: &[u8]) -> Result<Order> {
        serde_json::from_slice(bytes).map_err(|e| {
            GatewayError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to deserialize order: {e}"),
            )))
        })
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn store(&self, order: Order) -> Result<()> {
        let orders = self.cf(CF_ORDERS)?;
        let index = self.cf(CF_PAYMENT_INDEX)?;

        let mut batch = WriteBatch::default();
        for payment in order.payments() {
            if let Some(owner) = self.db.get_cf(index, payment.id.0.as_bytes())?
                && owner.as_slice() != order.number.as_bytes()
            {
                return Err(GatewayError::ValidationError(format!(
                    "Payment {} already belongs to order {}",
                    payment.id,
                    String::from_utf8_lossy(&owner)
                )));
            }
            batch.put_cf(index, payment.id.0.as_bytes(), order.number.as_bytes());
        }

        let value = serde_json::to_vec(&order).map_err(|e| {
            GatewayError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {e}"),
            )))
        })?;
        batch.put_cf(orders, order.number.as_bytes(), value);

        self.db.write(batch)?;
        Ok(())
    }

    async fn get(&self, number: &str) -> Result<Option<Order>> {
        let cf = self.cf(CF_ORDERS)?;
        match self.db.get_cf(cf, number.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_order(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn order_number_for(&self, payment_id: &PaymentId) -> Result<Option<String>> {
        let cf = self.cf(CF_PAYMENT_INDEX)?;
        let result = self.db.get_cf(cf, payment_id.0.as_bytes())?;
        Ok(result.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let cf = self.cf(CF_ORDERS)?;

        let mut orders = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(Self::decode_order(&value)?);
        }

        Ok(orders)
    }
}
