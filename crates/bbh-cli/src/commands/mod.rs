pub mod check;
pub mod fmt;
pub mod keys;
pub mod show;
pub mod version;
