//! COVID-19 tracker: loads the Our World in Data dataset once, derives global totals,
//! weekly world sums and a per-country snapshot, and serves them as an interactive dashboard.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod server;
pub mod view;
