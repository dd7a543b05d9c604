pub mod settings_guard;
