pub mod app;
pub mod form;
pub mod predict;

pub use app::{health_check, index, not_found};
pub use form::{form_page, form_submit};
pub use predict::predict;
