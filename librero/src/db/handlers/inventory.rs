//! The inventory ledger engine.
//!
//! Owns the relationship between a book's denormalized stock counter and the
//! append-only movement ledger that explains it. Every mutation serializes
//! on an exclusive row lock (`SELECT ... FOR UPDATE`) held for the lifetime
//! of the enclosing transaction: a second writer targeting the same
//! inventory row blocks until the first commits or rolls back, and observes
//! the committed value before computing its own delta. Writers on different
//! rows never block each other.
//!
//! The lock wait is bounded by `SET LOCAL lock_timeout`; expiry surfaces as
//! [`DbError::LockTimeout`], which callers may retry. Invariant violations
//! (stock going negative, insufficient stock for an outflow) surface as
//! [`DbError::InvalidState`] and must not be retried blindly.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection, Postgres, Transaction};
use tracing::instrument;

use crate::api::models::movements::{Direction, MovementKind};
use crate::db::{
    errors::{DbError, Result},
    models::{
        inventory::{InventoryDBResponse, InventoryWithBookDBResponse, LowStockDBResponse},
        movements::{MovementCreateDBRequest, MovementDBResponse},
    },
};
use crate::types::{BookId, InventoryId, UserId};

/// Apply a signed delta to a stock level, guarding the non-negative
/// invariant. Returns `None` when the result would be negative (or would
/// overflow the counter), in which case nothing must be written.
pub fn checked_apply(stock: i32, delta: i32) -> Option<i32> {
    let new = stock.checked_add(delta)?;
    (new >= 0).then_some(new)
}

const INVENTORY_COLUMNS: &str = "id, book_id, stock, updated_at";

#[derive(Debug, Clone, FromRow)]
struct InventoryRow {
    pub id: InventoryId,
    pub book_id: BookId,
    pub stock: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryDBResponse {
    fn from(r: InventoryRow) -> Self {
        Self {
            id: r.id,
            book_id: r.book_id,
            stock: r.stock,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct InventoryWithBookRow {
    pub id: InventoryId,
    pub book_id: BookId,
    pub title: String,
    pub stock: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<InventoryWithBookRow> for InventoryWithBookDBResponse {
    fn from(r: InventoryWithBookRow) -> Self {
        Self {
            id: r.id,
            book_id: r.book_id,
            title: r.title,
            stock: r.stock,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct LowStockRow {
    pub book_id: BookId,
    pub title: String,
    pub stock: i32,
    pub stock_minimo: i32,
}

#[derive(Debug, Clone, FromRow)]
struct MovementRow {
    pub id: i64,
    pub inventory_id: InventoryId,
    pub kind: MovementKind,
    pub quantity: i32,
    pub user_id: Option<UserId>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl From<MovementRow> for MovementDBResponse {
    fn from(m: MovementRow) -> Self {
        Self {
            id: m.id,
            inventory_id: m.inventory_id,
            kind: m.kind,
            quantity: m.quantity,
            user_id: m.user_id,
            notes: m.notes,
            occurred_at: m.occurred_at,
        }
    }
}

pub struct Inventory<'c> {
    db: &'c mut PgConnection,
    lock_timeout: Duration,
}

impl<'c> Inventory<'c> {
    pub fn new(db: &'c mut PgConnection, lock_timeout: Duration) -> Self {
        Self { db, lock_timeout }
    }

    /// Open a transaction with the configured lock-wait bound applied.
    /// `SET LOCAL` scopes the timeout to this transaction only.
    async fn begin(&mut self) -> Result<Transaction<'_, Postgres>> {
        let mut tx = self.db.begin().await?;
        sqlx::query(&format!(
            "SET LOCAL lock_timeout = {}",
            self.lock_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        Ok(tx)
    }

    /// Create the inventory record for a book, starting at stock 0.
    ///
    /// Idempotent: if a record already exists for the book, it is returned
    /// unchanged. Fails with [`DbError::NotFound`] when the book itself does
    /// not exist.
    #[instrument(skip(self), err)]
    pub async fn create_for_book(&mut self, book_id: BookId) -> Result<InventoryDBResponse> {
        let mut tx = self.db.begin().await?;

        let book: Option<BookId> = sqlx::query_scalar("SELECT id FROM books WHERE id = $1")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;
        if book.is_none() {
            return Err(DbError::NotFound);
        }

        // ON CONFLICT DO NOTHING returns no row when the record already
        // exists; fall back to the existing one.
        let inserted = sqlx::query_as::<_, InventoryRow>(&format!(
            "INSERT INTO inventory (book_id, stock) VALUES ($1, 0) \
             ON CONFLICT (book_id) DO NOTHING \
             RETURNING {INVENTORY_COLUMNS}"
        ))
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match inserted {
            Some(row) => row,
            None => {
                sqlx::query_as::<_, InventoryRow>(&format!(
                    "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE book_id = $1"
                ))
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(row.into())
    }

    /// Read the current stock for a book. Plain read, no locking.
    #[instrument(skip(self), err)]
    pub async fn get_by_book(&mut self, book_id: BookId) -> Result<Option<InventoryDBResponse>> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE book_id = $1"
        ))
        .bind(book_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List inventory joined with book titles, optionally filtered by title.
    #[instrument(skip(self, q), err)]
    pub async fn list(&mut self, q: Option<&str>) -> Result<Vec<InventoryWithBookDBResponse>> {
        let rows = match q {
            Some(q) => {
                sqlx::query_as::<_, InventoryWithBookRow>(
                    r#"
                    SELECT i.id, i.book_id, b.title, i.stock, i.updated_at
                    FROM inventory i
                    JOIN books b ON b.id = i.book_id
                    WHERE b.title ILIKE $1
                    ORDER BY b.title ASC
                    "#,
                )
                .bind(format!("%{q}%"))
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryWithBookRow>(
                    r#"
                    SELECT i.id, i.book_id, b.title, i.stock, i.updated_at
                    FROM inventory i
                    JOIN books b ON b.id = i.book_id
                    ORDER BY b.title ASC
                    "#,
                )
                .fetch_all(&mut *self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Adjust the stock of a book by a signed delta under an exclusive row
    /// lock. Fails with [`DbError::InvalidState`] and writes nothing when
    /// the result would be negative. Writes no ledger entry.
    #[instrument(skip(self), err)]
    pub async fn adjust_stock(&mut self, book_id: BookId, delta: i32) -> Result<InventoryDBResponse> {
        let mut tx = self.begin().await?;

        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE book_id = $1 FOR UPDATE"
        ))
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        let new_stock = checked_apply(row.stock, delta).ok_or_else(|| DbError::InvalidState {
            message: "adjustment would leave stock negative".to_string(),
        })?;

        let updated = Self::write_stock(&mut tx, row.id, new_stock).await?;
        tx.commit().await?;
        Ok(updated.into())
    }

    /// Overwrite the stock of a book with an absolute value under an
    /// exclusive row lock. The caller validates non-negativity before this
    /// is reached. Writes no ledger entry.
    #[instrument(skip(self), err)]
    pub async fn set_stock(&mut self, book_id: BookId, stock: i32) -> Result<InventoryDBResponse> {
        let mut tx = self.begin().await?;

        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE book_id = $1 FOR UPDATE"
        ))
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        let updated = Self::write_stock(&mut tx, row.id, stock).await?;
        tx.commit().await?;
        Ok(updated.into())
    }

    /// List books whose stock sits strictly below their configured minimum.
    #[instrument(skip(self), err)]
    pub async fn low_stock(&mut self) -> Result<Vec<LowStockDBResponse>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT b.id AS book_id, b.title, i.stock, b.stock_minimo
            FROM inventory i
            JOIN books b ON b.id = i.book_id
            WHERE i.stock < b.stock_minimo
            ORDER BY b.title ASC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LowStockDBResponse {
                book_id: r.book_id,
                title: r.title,
                stock: r.stock,
                stock_minimo: r.stock_minimo,
            })
            .collect())
    }

    /// Record a movement: apply its stock delta and append the ledger entry
    /// in one atomic transaction.
    ///
    /// Locks the inventory row for the whole read-modify-write, verifies a
    /// supplied acting user exists, classifies the kind into inflow/outflow,
    /// and refuses outflows that exceed the current stock — in which case
    /// neither the counter nor the ledger is touched.
    #[instrument(
        skip(self, request),
        fields(inventory_id = request.inventory_id, kind = ?request.kind, quantity = request.quantity),
        err
    )]
    pub async fn record_movement(
        &mut self,
        request: &MovementCreateDBRequest,
    ) -> Result<MovementDBResponse> {
        let mut tx = self.begin().await?;

        let inv = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE id = $1 FOR UPDATE"
        ))
        .bind(request.inventory_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if let Some(user_id) = request.user_id {
            let user: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
            if user.is_none() {
                return Err(DbError::ForeignKeyViolation {
                    constraint: None,
                    table: Some("users".to_string()),
                    message: format!("user {user_id} does not exist"),
                });
            }
        }

        let delta = request.kind.signed_delta(request.quantity);
        let new_stock = match checked_apply(inv.stock, delta) {
            Some(stock) => stock,
            None => {
                let message = match request.kind.direction() {
                    Direction::Outflow => "insufficient stock",
                    Direction::Inflow => "stock counter would overflow",
                };
                return Err(DbError::InvalidState {
                    message: message.to_string(),
                });
            }
        };

        Self::write_stock(&mut tx, inv.id, new_stock).await?;

        let movement = sqlx::query_as::<_, MovementRow>(
            r#"
            INSERT INTO movements (inventory_id, kind, quantity, user_id, notes, occurred_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
            RETURNING id, inventory_id, kind, quantity, user_id, notes, occurred_at
            "#,
        )
        .bind(request.inventory_id)
        .bind(request.kind)
        .bind(request.quantity)
        .bind(request.user_id)
        .bind(&request.notes)
        .bind(request.occurred_at)
        .fetch_one(&mut *tx)
        .await?;

        // Stock mutation and ledger append commit as one unit.
        tx.commit().await?;
        Ok(movement.into())
    }

    /// List ledger entries newest-first, optionally restricted to one kind.
    #[instrument(skip(self), err)]
    pub async fn list_movements(
        &mut self,
        kind: Option<MovementKind>,
    ) -> Result<Vec<MovementDBResponse>> {
        let rows = match kind {
            Some(kind) => {
                sqlx::query_as::<_, MovementRow>(
                    r#"
                    SELECT id, inventory_id, kind, quantity, user_id, notes, occurred_at
                    FROM movements
                    WHERE kind = $1
                    ORDER BY occurred_at DESC, id DESC
                    "#,
                )
                .bind(kind)
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, MovementRow>(
                    r#"
                    SELECT id, inventory_id, kind, quantity, user_id, notes, occurred_at
                    FROM movements
                    ORDER BY occurred_at DESC, id DESC
                    "#,
                )
                .fetch_all(&mut *self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn write_stock(
        tx: &mut Transaction<'_, Postgres>,
        inventory_id: InventoryId,
        stock: i32,
    ) -> Result<InventoryRow> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "UPDATE inventory SET stock = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {INVENTORY_COLUMNS}"
        ))
        .bind(inventory_id)
        .bind(stock)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::{Barrier, Mutex};

    use super::*;

    /// Apply a movement to a guarded stock value the way the engine does
    /// under its row lock: exclusive access for the whole read-modify-write.
    async fn try_movement(stock: &Mutex<i32>, kind: MovementKind, quantity: i32) -> bool {
        let mut guard = stock.lock().await;
        match checked_apply(*guard, kind.signed_delta(quantity)) {
            Some(new) => {
                *guard = new;
                true
            }
            None => false,
        }
    }

    #[test]
    fn inflows_and_outflows_apply_their_sign() {
        assert_eq!(checked_apply(10, MovementKind::Entrada.signed_delta(5)), Some(15));
        assert_eq!(checked_apply(10, MovementKind::Ajuste.signed_delta(5)), Some(15));
        assert_eq!(checked_apply(10, MovementKind::Salida.signed_delta(5)), Some(5));
        assert_eq!(checked_apply(10, MovementKind::Venta.signed_delta(10)), Some(0));
    }

    #[test]
    fn outflow_exceeding_stock_is_refused() {
        assert_eq!(checked_apply(3, MovementKind::Venta.signed_delta(5)), None);
        assert_eq!(checked_apply(0, MovementKind::Salida.signed_delta(1)), None);
    }

    #[test]
    fn overflowing_inflow_is_refused() {
        assert_eq!(checked_apply(i32::MAX, MovementKind::Entrada.signed_delta(1)), None);
    }

    #[test]
    fn sale_drives_stock_under_threshold_then_further_sale_is_refused() {
        // stock 10, stock_minimo 5: a sale of 7 succeeds leaving 3 (below
        // the threshold), a further sale of 5 is refused leaving 3.
        let mut stock = 10;
        stock = checked_apply(stock, MovementKind::Venta.signed_delta(7)).unwrap();
        assert_eq!(stock, 3);
        assert!(stock < 5);

        assert_eq!(checked_apply(stock, MovementKind::Venta.signed_delta(5)), None);
        assert_eq!(stock, 3);
    }

    #[test]
    fn adjust_to_zero_then_below_is_refused() {
        let mut stock = 3;
        stock = checked_apply(stock, -3).unwrap();
        assert_eq!(stock, 0);

        assert_eq!(checked_apply(stock, -1), None);
        assert_eq!(stock, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_overdraining_movements_admit_at_most_one() {
        // Two sales of 7 against a stock of 10: each fits alone, the pair
        // does not. Exactly one must win and the loser must leave no trace.
        let stock = Arc::new(Mutex::new(10));
        let barrier = Arc::new(Barrier::new(2));

        let mut tasks = Vec::new();
        for _ in 0..2 {
            let stock = Arc::clone(&stock);
            let barrier = Arc::clone(&barrier);
            tasks.push(tokio::spawn(async move {
                barrier.wait().await;
                try_movement(&stock, MovementKind::Venta, 7).await
            }));
        }

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(*stock.lock().await, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stock_never_goes_negative_under_contention() {
        let stock = Arc::new(Mutex::new(20));
        let barrier = Arc::new(Barrier::new(8));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let stock = Arc::clone(&stock);
            let barrier = Arc::clone(&barrier);
            tasks.push(tokio::spawn(async move {
                barrier.wait().await;
                let kind = if i % 2 == 0 {
                    MovementKind::Venta
                } else {
                    MovementKind::Entrada
                };
                let accepted = try_movement(&stock, kind, 7).await;
                // Every committed intermediate state satisfies the invariant.
                assert!(*stock.lock().await >= 0);
                (kind, accepted)
            }));
        }

        let mut expected: i64 = 20;
        let mut outcomes = Vec::new();
        for task in tasks {
            outcomes.push(task.await.unwrap());
        }
        for (kind, accepted) in outcomes {
            if accepted {
                expected += i64::from(kind.signed_delta(7));
            }
        }

        let final_stock = *stock.lock().await;
        assert!(final_stock >= 0);
        // Final stock equals initial plus the sum of accepted signed deltas.
        assert_eq!(i64::from(final_stock), expected);
    }
}
