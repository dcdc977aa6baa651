pub mod manager;
pub mod models;
pub mod query_builder;
pub mod spot_store;
pub mod user_store;

pub use manager::{DatabaseError, DatabaseManager};
pub use spot_store::{PgSpotStore, SpotStore};
pub use user_store::{NewUser, PgUserStore, UserStore};
