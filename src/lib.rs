pub mod anki;
pub mod cloud;
pub mod core;
pub mod editor;
pub mod persistence;
pub mod settings;
