pub mod city;
pub mod driver;
pub mod inspection;
pub mod order;
pub mod quote;
