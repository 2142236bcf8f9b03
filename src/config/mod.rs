pub mod settings;

pub use settings::AppSettings;

#[cfg(test)]
pub use settings::test_settings;
