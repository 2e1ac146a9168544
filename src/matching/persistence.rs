//! Durable sink for orders and trades.
//!
//! Persistence is write-only and best-effort from the matching core's point
//! of view: a write failure is logged and the in-memory result still stands.
//! There is no recovery path that rebuilds a book from this store on
//! restart.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::order::{Order, OrderStatus, OrderType, Side};
use super::trade::Trade;

#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn insert_order(&self, order: &Order) -> anyhow::Result<()>;
    async fn upsert_order(&self, order: &Order) -> anyhow::Result<()>;
    async fn insert_trade(&self, trade: &Trade) -> anyhow::Result<()>;
}

pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn side_str(side: Side) -> &'static str {
    match side {
        Side::Buy => "buy",
        Side::Sell => "sell",
    }
}

fn order_type_str(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "market",
        OrderType::Limit => "limit",
        OrderType::Ioc => "ioc",
        OrderType::Fok => "fok",
    }
}

fn status_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Open => "open",
        OrderStatus::PartiallyFilled => "partially_filled",
        OrderStatus::Filled => "filled",
        OrderStatus::Cancelled => "cancelled",
    }
}

#[async_trait]
impl PersistenceAdapter for PostgresPersistence {
    async fn insert_order(&self, order: &Order) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, symbol, side, order_type, status, price, amount, filled_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(order.order_id)
        .bind(&order.symbol)
        .bind(side_str(order.side))
        .bind(order_type_str(order.order_type))
        .bind(status_str(order.status))
        .bind(order.price)
        .bind(order.original_quantity)
        .bind(order.filled_quantity())
        .bind(order.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_order(&self, order: &Order) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, filled_amount = $2
            WHERE id = $3
            "#,
        )
        .bind(status_str(order.status))
        .bind(order.filled_quantity())
        .bind(order.order_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_trade(&self, trade: &Trade) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trades (id, symbol, maker_order_id, taker_order_id, aggressor_side, price, amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(trade.trade_id)
        .bind(&trade.symbol)
        .bind(trade.maker_order_id)
        .bind(trade.taker_order_id)
        .bind(side_str(trade.aggressor_side))
        .bind(trade.price)
        .bind(trade.quantity)
        .bind(trade.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Default adapter for tests and demos: holds rows in memory, never errors.
#[derive(Default)]
pub struct InMemoryPersistence {
    orders: parking_lot::Mutex<Vec<(uuid::Uuid, OrderStatus, Decimal)>>,
    trades: parking_lot::Mutex<Vec<uuid::Uuid>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryPersistence {
    async fn insert_order(&self, order: &Order) -> anyhow::Result<()> {
        self.orders.lock().push((order.order_id, order.status, order.filled_quantity()));
        Ok(())
    }

    async fn upsert_order(&self, order: &Order) -> anyhow::Result<()> {
        let mut orders = self.orders.lock();
        if let Some(row) = orders.iter_mut().find(|(id, _, _)| *id == order.order_id) {
            row.1 = order.status;
            row.2 = order.filled_quantity();
        } else {
            orders.push((order.order_id, order.status, order.filled_quantity()));
        }
        Ok(())
    }

    async fn insert_trade(&self, trade: &Trade) -> anyhow::Result<()> {
        self.trades.lock().push(trade.trade_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_order() -> Order {
        Order {
            order_id: Uuid::new_v4(),
            symbol: "BTCUSD".into(),
            side: Side::Buy,
            order_type: OrderType::Limit,
            original_quantity: dec!(1),
            remaining_quantity: dec!(1),
            price: Some(dec!(100)),
            status: OrderStatus::Open,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_upsert_updates_existing_row() {
        let persistence = InMemoryPersistence::new();
        let mut order = sample_order();
        persistence.insert_order(&order).await.unwrap();

        order.apply_fill(dec!(1));
        persistence.upsert_order(&order).await.unwrap();

        let orders = persistence.orders.lock();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].1, OrderStatus::Filled);
    }
}
