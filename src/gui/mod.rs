//! GUI module - Sidebar, pages and shared widgets

mod analysis;
mod app;
mod explorer;
mod guide;
mod home;
mod prediction;
mod sidebar;
mod widgets;

pub use app::HousePredictApp;
