use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::city::City;
use crate::models::driver::Driver;
use crate::models::inspection::Inspection;
use crate::models::order::NewOrder;

/// A driver match shown to the user and waiting for confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub id: Uuid,
    pub driver: Driver,
    pub price: u32,
    pub inspection: Inspection,
    pub city: City,
    pub from_address: String,
    pub to_address: String,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub fn to_new_order(&self) -> NewOrder {
        NewOrder {
            driver_id: self.driver.id,
            from_address: self.from_address.clone(),
            to_address: self.to_address.clone(),
            price: self.price,
            cleanliness: self.inspection.cleanliness.label,
            damage: self.inspection.damage.label,
            cleanliness_confidence: self.inspection.cleanliness.confidence,
            damage_confidence: self.inspection.damage.confidence,
        }
    }
}
