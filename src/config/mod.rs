pub mod credentials;
pub mod env;
pub mod settings;
