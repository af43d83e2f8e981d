//! The components module contains all shared components for our app.

mod app;
mod app_view;
mod file_picker;
mod hold_host;
mod icons;
mod navigation;
mod views;

pub use app::*;
pub use app_view::*;
pub use icons::*;
pub use navigation::*;
pub use views::{HomeView, UploadView};
