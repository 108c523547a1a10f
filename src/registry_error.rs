use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Failed to acquire registry lock")]
    RegistryLock,
    #[error("Type mismatch in registry for type: {type_name}")]
    TypeMismatch { type_name: &'static str },
    #[error("Type not found in registry: {type_name}")]
    TypeNotFound { type_name: &'static str },
}
