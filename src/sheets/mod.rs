pub mod models;
pub mod normalizer;
pub mod render;
pub mod views;
pub mod workbook;
