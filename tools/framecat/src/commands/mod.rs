pub mod corr;
pub mod describe;
pub mod schema;
pub mod show;
