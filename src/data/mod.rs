//! Data module - CSV loading, filtering and export

pub mod dataset;
pub mod export;
pub mod filter;
mod loader;

pub use dataset::HousingData;
pub use loader::DatasetLoader;
