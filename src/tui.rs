//! Terminal front end: a ratatui table for one human against computer opponents.

pub mod app;
pub mod controller;
pub mod ui;
