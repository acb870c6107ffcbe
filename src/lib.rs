pub use sqlx::Error as DbError;
pub use sqlx::PgPool as Pool;

pub mod config;
pub mod errors;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod sources;
pub mod store;
pub mod transform;
