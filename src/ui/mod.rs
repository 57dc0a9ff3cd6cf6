//! egui widgets drawing the dashboard from [`crate::state::AppState`].

pub mod charts;
pub mod panels;
pub mod tables;
