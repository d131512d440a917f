pub mod admin;
pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod render;
pub mod session;
pub mod view;

#[cfg(test)]
mod test_support;
