pub mod completeness;
pub mod gestation;
pub mod handlers;
pub mod models;
pub mod store;
