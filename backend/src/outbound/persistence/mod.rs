//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! Adapters are thin translators: Diesel row structs (`models`) and table
//! definitions (`schema`) stay internal, every database error is mapped
//! to the owning port's error type, and no business logic lives here.

mod diesel_account_purge_repository;
mod diesel_activity_repository;
mod diesel_error_mapping;
mod diesel_rating_repository;
mod diesel_review_repository;
mod diesel_social_graph_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_account_purge_repository::DieselAccountPurgeRepository;
pub use diesel_activity_repository::DieselActivityRepository;
pub use diesel_rating_repository::DieselRatingRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_social_graph_repository::DieselSocialGraphRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
