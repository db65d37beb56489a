pub mod classify;
pub mod version;
