use database::services::coordinator::MutationCoordinator;
use sea_orm::DatabaseConnection;

/// Shared handles for every request
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pool for the read-only reports
    pub db: DatabaseConnection,
    pub coordinator: MutationCoordinator,
}
