pub mod system;

pub use system::config::load_translator_config;
pub use system::logger::init_logger;
pub use system::validation::validate_translator_config;
