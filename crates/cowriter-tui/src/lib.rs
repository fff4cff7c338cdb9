//! Terminal editor with inline AI writing suggestions.
//!
//! Typing pauses are debounced into completion fetches against the
//! suggestion backend; results render as ghost text the user can accept
//! with Tab or type through.

pub mod action;
pub mod app;
pub mod components;
pub mod event;
pub mod suggest;
pub mod theme;

pub use app::App;
