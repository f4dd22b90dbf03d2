pub mod hash;
pub mod kdf;
pub mod sensitive;
