//! egui widgets shared by both window layouts.

pub mod panels;
pub mod plot;
pub mod table;
