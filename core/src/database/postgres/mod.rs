pub mod client;
pub mod updater;
