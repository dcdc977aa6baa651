pub mod spot;
pub mod user;

pub use spot::SpotRow;
pub use user::UserRow;
