use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, FeedService, FollowService, MicropostService, SeaOrmAuthService,
    SeaOrmFeedService, SeaOrmFollowService, SeaOrmMicropostService, SeaOrmUserService,
    UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub follow_service: Arc<dyn FollowService>,

    pub feed_service: Arc<dyn FeedService>,

    pub post_service: Arc<dyn MicropostService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone()));
        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
        ));
        let follow_service = Arc::new(SeaOrmFollowService::new(store.clone()));
        let feed_service = Arc::new(SeaOrmFeedService::new(store.clone(), config.feed.clone()));
        let post_service = Arc::new(SeaOrmMicropostService::new(store.clone()));

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            user_service,
            follow_service,
            feed_service,
            post_service,
        }
    }
}
