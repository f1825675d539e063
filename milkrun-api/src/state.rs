use milkrun_billing::LedgerService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerService>,
    pub auth: AuthConfig,
    pub admin: AdminCredentials,
}
