//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod policy;
pub mod recovery;
pub mod sms;
pub mod sweeper;
pub mod users;

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::{AuthConfig, PolicyConfig},
    repository::Repository,
    services::sms::Notifier,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub circulation: circulation::CirculationService,
    pub recovery: recovery::RecoveryService,
}

impl Services {
    /// Create all services with the given repository and collaborators
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        policy: &PolicyConfig,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            circulation: circulation::CirculationService::new(
                repository.clone(),
                clock.clone(),
                policy.fine_per_day,
            ),
            recovery: recovery::RecoveryService::new(
                repository.users.clone(),
                notifier,
                clock,
                policy.otp_window_secs,
            ),
        }
    }
}
