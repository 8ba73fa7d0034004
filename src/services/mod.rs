pub mod auth_service;
pub use auth_service::{AuthError, AuthService, LoginResult};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub use user_service::{NewUser, Profile, UserError, UserPatch, UserService};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;

pub mod follow_service;
pub use follow_service::{FollowError, FollowService};

pub mod follow_service_impl;
pub use follow_service_impl::SeaOrmFollowService;

pub mod feed_service;
pub use feed_service::{FeedError, FeedItem, FeedService};

pub mod feed_service_impl;
pub use feed_service_impl::SeaOrmFeedService;

pub mod micropost_service;
pub use micropost_service::{MicropostService, PostError};

pub mod micropost_service_impl;
pub use micropost_service_impl::SeaOrmMicropostService;
