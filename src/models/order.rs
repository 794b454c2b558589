use serde::{Deserialize, Serialize};

use crate::models::inspection::{Cleanliness, Damage};

/// Fields supplied when persisting an order; the id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrder {
    pub driver_id: i64,
    pub from_address: String,
    pub to_address: String,
    pub price: u32,
    pub cleanliness: Cleanliness,
    pub damage: Damage,
    pub cleanliness_confidence: f64,
    pub damage_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub driver_id: i64,
    pub from_address: String,
    pub to_address: String,
    pub price: u32,
    pub cleanliness: Cleanliness,
    pub damage: Damage,
    pub cleanliness_confidence: f64,
    pub damage_confidence: f64,
}

impl Order {
    pub fn from_new(id: i64, order: NewOrder) -> Self {
        Self {
            id,
            driver_id: order.driver_id,
            from_address: order.from_address,
            to_address: order.to_address,
            price: order.price,
            cleanliness: order.cleanliness,
            damage: order.damage,
            cleanliness_confidence: order.cleanliness_confidence,
            damage_confidence: order.damage_confidence,
        }
    }
}
