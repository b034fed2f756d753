//! Rendering collaborator: egui widgets over the core [`strain_viewer::state::Session`].

pub mod dialogs;
pub mod panels;
pub mod plot;
