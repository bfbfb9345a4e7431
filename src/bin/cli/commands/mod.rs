pub mod auth;
pub mod list;
pub mod new;
pub mod push;
pub mod remove;
pub mod show;
pub mod sync;
