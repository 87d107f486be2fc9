pub mod api;
pub mod settings;
pub mod state;
