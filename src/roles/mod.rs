pub mod catalog;
pub mod models;

pub use catalog::RoleCatalog;
pub use models::*;
