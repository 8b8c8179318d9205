pub mod aggregate;
pub mod auth;
pub mod dataset;
pub mod export;
pub mod state;
pub mod view;
