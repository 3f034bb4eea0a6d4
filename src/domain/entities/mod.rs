pub mod catalog;
pub mod column;
pub mod entity;
pub mod list_query;
pub mod preference;
