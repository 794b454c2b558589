use std::ops::RangeInclusive;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::random::RandomSource;
use crate::error::AppError;
use crate::models::city::City;
use crate::models::driver::Driver;
use crate::models::inspection::Inspection;
use crate::models::order::Order;
use crate::models::quote::Quote;
use crate::store::OrderStore;

/// Ride prices, in tenge.
pub const PRICE_RANGE: RangeInclusive<u32> = 500..=2000;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DriverMatch {
    pub driver: Driver,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    NoDrivers,
    Matched(DriverMatch),
}

/// Picks a driver uniformly at random and prices the ride.
///
/// Returns `NoDrivers` without drawing any randomness when the store has no
/// available drivers.
pub fn find_match(
    store: &OrderStore,
    random: &mut dyn RandomSource,
) -> Result<MatchOutcome, AppError> {
    let mut drivers = store.list_available_drivers()?;
    if drivers.is_empty() {
        warn!("no available drivers");
        return Ok(MatchOutcome::NoDrivers);
    }

    let driver = drivers.swap_remove(random.index_below(drivers.len()));
    let price = random.int_between(*PRICE_RANGE.start(), *PRICE_RANGE.end());

    info!(driver_id = driver.id, price, "driver matched");
    Ok(MatchOutcome::Matched(DriverMatch { driver, price }))
}

/// Pickup and destination for a quote; city defaults fill in blanks.
#[derive(Debug, Clone, Default)]
pub struct Route {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
}

pub fn quote(matched: DriverMatch, inspection: Inspection, city: City, route: Route) -> Quote {
    let non_blank = |address: Option<String>| address.filter(|a| !a.trim().is_empty());

    Quote {
        id: Uuid::new_v4(),
        driver: matched.driver,
        price: matched.price,
        inspection,
        city,
        from_address: non_blank(route.from_address).unwrap_or_else(|| city.default_pickup()),
        to_address: non_blank(route.to_address).unwrap_or_else(|| city.default_destination()),
        created_at: Utc::now(),
    }
}

/// Persists the quoted ride and returns the stored order.
pub fn confirm(store: &OrderStore, quote: &Quote) -> Result<Order, AppError> {
    let new_order = quote.to_new_order();
    let id = store.create_order(&new_order)?;

    info!(
        order_id = id,
        quote_id = %quote.id,
        driver_id = quote.driver.id,
        price = quote.price,
        city = %quote.city,
        "order created"
    );

    Ok(Order::from_new(id, new_order))
}
