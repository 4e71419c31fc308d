//! FLTK widget builders. Widgets only send `Message`s; all state lives in
//! `app::state::AppState`.

pub mod icons;
pub mod main_window;
pub mod menu;
pub mod theme;
