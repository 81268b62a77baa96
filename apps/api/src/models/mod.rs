pub mod cv;
pub mod interview;
pub mod user;
