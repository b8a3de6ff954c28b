pub mod base;
pub mod convert;
pub mod news;
pub mod rates;
pub mod setup;
pub mod trend;
pub mod ui;
