pub mod admin;
pub mod class;
pub mod data;
pub mod lending;
pub mod not_returned;
pub mod session;
pub mod stats;
pub mod toy;
