pub mod data_provider;
pub mod preference_store;
