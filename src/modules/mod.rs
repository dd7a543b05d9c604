pub mod jobs;
pub mod settings;
pub mod upload;
