pub mod ask;
pub mod health;
pub mod serve;
pub mod sessions;
