//! Database layer: connection pool and migrations.

pub mod migrations;
pub mod pool;
