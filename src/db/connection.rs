use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

use crate::config::DatabaseSettings;
use crate::errors::ApiError;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub fn build_pool(settings: &DatabaseSettings) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<PgConnection>::new(&settings.url);
    Pool::builder()
        .max_size(settings.pool_size)
        .connection_timeout(Duration::from_secs(settings.timeout_seconds))
        .build(manager)
}

/// Checks a connection out of the pool, mapping exhaustion to a dependency
/// error so handlers can use `?`.
pub fn conn(pool: &DbPool) -> Result<DbConnection, ApiError> {
    pool.get()
        .map_err(|err| ApiError::dependency("Нет соединения с базой данных", err))
}
