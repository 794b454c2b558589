use std::path::PathBuf;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::AppError;
use crate::models::driver::Driver;
use crate::models::inspection::{Cleanliness, Damage, Label};
use crate::models::order::{NewOrder, Order};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS drivers (
    id INTEGER PRIMARY KEY,
    name TEXT,
    car_model TEXT,
    car_number TEXT,
    rating REAL
);
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY,
    driver_id INTEGER,
    from_address TEXT,
    to_address TEXT,
    price INTEGER,
    cleanliness TEXT,
    damage TEXT,
    cleanliness_confidence REAL,
    damage_confidence REAL
);
";

pub const SEED_DRIVERS: [(i64, &str, &str, &str, f64); 4] = [
    (1, "Ivan Petrov", "Kia Rio", "A123VS77", 4.8),
    (2, "Maria Sidorova", "Hyundai Solaris", "V456OR77", 4.9),
    (3, "Alisher Zhumabaev", "Toyota Camry", "N789KZ77", 4.7),
    (4, "Aigul Saparbaeva", "Lada Granta", "T321OK77", 4.6),
];

const ORDER_COLUMNS: &str = "id, driver_id, from_address, to_address, price, cleanliness, damage, \
     cleanliness_confidence, damage_confidence";

/// SQLite-backed driver and order tables.
///
/// Holds only the database path: every operation opens its own connection
/// and drops it before returning.
#[derive(Debug, Clone)]
pub struct OrderStore {
    path: PathBuf,
}

impl OrderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the schema and seeds the fixed drivers when the table is empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = Self::new(path);
        store.init_schema()?;
        let seeded = store.seed_drivers()?;
        info!(path = %store.path.display(), seeded, "order store ready");
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, AppError> {
        Ok(Connection::open(&self.path)?)
    }

    pub fn init_schema(&self) -> Result<(), AppError> {
        self.connect()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Returns the number of drivers inserted; zero when drivers already exist.
    pub fn seed_drivers(&self) -> Result<usize, AppError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM drivers", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        {
            let mut insert = tx.prepare(
                "INSERT INTO drivers (id, name, car_model, car_number, rating)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (id, name, car_model, car_number, rating) in SEED_DRIVERS {
                insert.execute(params![id, name, car_model, car_number, rating])?;
            }
        }

        tx.commit()?;
        Ok(SEED_DRIVERS.len())
    }

    /// Every driver row counts as available; busy state is not tracked.
    pub fn list_available_drivers(&self) -> Result<Vec<Driver>, AppError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, car_model, car_number, rating FROM drivers ORDER BY id",
        )?;

        let drivers = stmt
            .query_map([], |row| {
                Ok(Driver {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    car_model: row.get(2)?,
                    car_number: row.get(3)?,
                    rating: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(drivers)
    }

    pub fn create_order(&self, order: &NewOrder) -> Result<i64, AppError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO orders (driver_id, from_address, to_address, price, cleanliness, damage,
                                 cleanliness_confidence, damage_confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                order.driver_id,
                order.from_address,
                order.to_address,
                order.price,
                order.cleanliness,
                order.damage,
                order.cleanliness_confidence,
                order.damage_confidence,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn get_order(&self, id: i64) -> Result<Option<Order>, AppError> {
        let conn = self.connect()?;
        let order = conn
            .query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                [id],
                order_from_row,
            )
            .optional()?;

        Ok(order)
    }

    /// Newest first.
    pub fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id DESC"
        ))?;

        let orders = stmt
            .query_map([], order_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(orders)
    }

    pub fn count_drivers(&self) -> Result<usize, AppError> {
        self.count("drivers")
    }

    pub fn count_orders(&self) -> Result<usize, AppError> {
        self.count("orders")
    }

    fn count(&self, table: &str) -> Result<usize, AppError> {
        let conn = self.connect()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        driver_id: row.get(1)?,
        from_address: row.get(2)?,
        to_address: row.get(3)?,
        price: row.get(4)?,
        cleanliness: row.get(5)?,
        damage: row.get(6)?,
        cleanliness_confidence: row.get(7)?,
        damage_confidence: row.get(8)?,
    })
}

macro_rules! label_column {
    ($label:ty) => {
        impl ToSql for $label {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $label {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|err| FromSqlError::Other(Box::new(err)))
            }
        }
    };
}

label_column!(Cleanliness);
label_column!(Damage);

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn temp_store() -> (TempDir, OrderStore) {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::open(dir.path().join("taxi.db")).unwrap();
        (dir, store)
    }

    fn new_order(driver_id: i64, price: u32) -> NewOrder {
        NewOrder {
            driver_id,
            from_address: "A".to_string(),
            to_address: "B".to_string(),
            price,
            cleanliness: Cleanliness::Dirty,
            damage: Damage::Intact,
            cleanliness_confidence: 0.8,
            damage_confidence: 0.9,
        }
    }

    #[test]
    fn fresh_store_lists_the_four_seeded_drivers() {
        let (_dir, store) = temp_store();
        let drivers = store.list_available_drivers().unwrap();

        assert_eq!(drivers.len(), 4);
        for (driver, (id, name, car_model, car_number, rating)) in drivers.iter().zip(SEED_DRIVERS) {
            assert_eq!(driver.id, id);
            assert_eq!(driver.name, name);
            assert_eq!(driver.car_model, car_model);
            assert_eq!(driver.car_number, car_number);
            assert_eq!(driver.rating, rating);
        }
    }

    #[test]
    fn reopening_does_not_reseed() {
        let (dir, store) = temp_store();
        assert_eq!(store.seed_drivers().unwrap(), 0);

        let reopened = OrderStore::open(dir.path().join("taxi.db")).unwrap();
        assert_eq!(reopened.count_drivers().unwrap(), 4);
    }

    #[test]
    fn created_order_reads_back_exactly() {
        let (_dir, store) = temp_store();

        let id = store.create_order(&new_order(1, 1000)).unwrap();
        assert_eq!(id, 1);

        let order = store.get_order(id).unwrap().unwrap();
        assert_eq!(order, Order::from_new(1, new_order(1, 1000)));
        assert_eq!(order.from_address, "A");
        assert_eq!(order.to_address, "B");
        assert_eq!(order.cleanliness, Cleanliness::Dirty);
        assert_eq!(order.damage, Damage::Intact);
        assert_eq!(order.cleanliness_confidence, 0.8);
        assert_eq!(order.damage_confidence, 0.9);
    }

    #[test]
    fn order_ids_strictly_increase() {
        let (_dir, store) = temp_store();

        let ids: Vec<i64> = (0..10)
            .map(|i| store.create_order(&new_order(1 + i % 4, 500 + i as u32)).unwrap())
            .collect();

        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(store.count_orders().unwrap(), 10);
    }

    #[test]
    fn driver_reference_is_not_enforced() {
        let (_dir, store) = temp_store();
        let id = store.create_order(&new_order(99, 700)).unwrap();

        assert_eq!(store.get_order(id).unwrap().unwrap().driver_id, 99);
    }

    #[test]
    fn missing_order_is_none() {
        let (_dir, store) = temp_store();
        assert!(store.get_order(42).unwrap().is_none());
    }

    #[test]
    fn order_history_is_newest_first() {
        let (_dir, store) = temp_store();
        let first = store.create_order(&new_order(1, 600)).unwrap();
        let second = store.create_order(&new_order(2, 700)).unwrap();

        let ids: Vec<i64> = store.list_orders().unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn unseeded_store_has_no_drivers() {
        let dir = TempDir::new().unwrap();
        let store = OrderStore::new(dir.path().join("empty.db"));
        store.init_schema().unwrap();

        assert!(store.list_available_drivers().unwrap().is_empty());
    }

    #[test]
    fn schema_init_is_idempotent() {
        let (_dir, store) = temp_store();
        store.create_order(&new_order(1, 900)).unwrap();

        store.init_schema().unwrap();
        assert_eq!(store.count_orders().unwrap(), 1);
    }
}
