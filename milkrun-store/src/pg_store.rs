use sqlx::PgPool;

/// Postgres-backed record store. Each repository trait is implemented in its own module.
#[derive(Clone)]
pub struct PgRecordStore {
    pub(crate) pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
