pub mod api;
pub mod errors;
pub mod models;
pub mod screener;
pub mod ui;
pub mod universe;
