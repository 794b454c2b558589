use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub car_model: String,
    pub car_number: String,
    pub rating: f64,
}
