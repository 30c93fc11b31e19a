// Environment-driven configuration, database setup, and catalogue seeding

pub mod database;
pub mod seeding;

pub use database::{run_migrations, DatabaseConfig};
pub use seeding::CatalogSeeder;
