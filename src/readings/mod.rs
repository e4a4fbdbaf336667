pub mod dataset;
pub mod dates;
pub mod models;
pub mod parser;
pub mod services;
pub mod views;
