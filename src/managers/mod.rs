// Markwise managers
// Repository facade, add-bookmark flow, and library view state.

pub mod add_bookmark_flow;
pub mod bookmark_manager;
pub mod library_view;
