pub mod loader;
pub mod output;
pub mod validation;
