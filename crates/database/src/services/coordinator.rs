use crate::{
    config::StoreConfig,
    error::{MutationError, MutationResult},
    services::mutation::MutationService,
};
use log::{debug, error, info, warn};
use models::{
    fields::Fields,
    mutation::{Mutation, MutationKind},
};
use sea_orm::{DatabaseConnection, IsolationLevel, TransactionTrait};
use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;

/// Confirmation for a committed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub message: String,
}

/// Runs each guarded mutation in its own transaction: begin, check, write,
/// commit. Any failure rolls the transaction back and the store is left as it
/// was.
#[derive(Debug, Clone)]
pub struct MutationCoordinator {
    db: DatabaseConnection,
    isolation: Option<IsolationLevel>,
    timeout: Duration,
}

impl MutationCoordinator {
    pub fn new(db: DatabaseConnection, config: &StoreConfig) -> Self {
        Self {
            db,
            isolation: config.isolation,
            timeout: config.mutation_timeout,
        }
    }

    /// Parses an action and its fields, then executes the mutation
    pub async fn submit(&self, action: &str, fields: &Fields) -> MutationResult<MutationOutcome> {
        let mutation = Mutation::parse(action, fields).map_err(|err| {
            warn!("Rejected {action:?} before opening a transaction: {err}");
            MutationError::from(err)
        })?;

        self.execute(&mutation).await
    }

    pub async fn execute(&self, mutation: &Mutation) -> MutationResult<MutationOutcome> {
        let kind = mutation.kind();

        // Dropping the transaction future on expiry rolls it back
        let result = match timeout(self.timeout, self.run(mutation)).await {
            Ok(result) => result,
            Err(_) => Err(MutationError::Timeout(self.timeout)),
        };

        match result {
            Ok(()) => {
                let message = mutation.success_message();
                info!("Committed {kind}: {message}");
                Ok(MutationOutcome { kind, message })
            }
            Err(err) => {
                warn!("Rolled back {kind} ({:?}): {err}", err.kind());
                Err(err)
            }
        }
    }

    async fn run(&self, mutation: &Mutation) -> MutationResult<()> {
        let txn = self.db.begin_with_config(self.isolation, None).await?;
        debug!(
            "Began {} transaction (isolation {:?})",
            mutation.kind(),
            self.isolation
        );

        match MutationService::apply(&txn, mutation).await {
            Ok(()) => {
                txn.commit().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!(
                        "Rollback of {} failed after {err}: {rollback_err}",
                        mutation.kind()
                    );
                }
                Err(err)
            }
        }
    }
}
