pub mod aggregate;
pub mod clean;
pub mod loader;
pub mod record;
