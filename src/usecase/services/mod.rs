pub mod debounce;
pub mod list_view_controller;
pub mod preference_service;
