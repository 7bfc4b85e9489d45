mod validate;

pub use validate::{ValidateArgs, validate_command};
