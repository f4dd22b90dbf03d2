pub mod crypto;
pub mod error;
pub mod format;
pub mod keys;
pub mod message;
pub mod sig;
