/// Command implementations for the minisig binary.
use std::path::{Path, PathBuf};

use minisig::crypto::sensitive::Password;
use minisig::error::Result;

pub mod generate;
pub mod sign;
pub mod verify;

/// Read a password from the terminal without echo.
pub(crate) fn prompt_password(prompt: &str) -> Result<Password> {
    let text = rpassword::prompt_password(prompt)?;
    Ok(Password::new(text))
}

/// Default signature path for a message file: `<file>.minisig`.
pub(crate) fn default_signature_path(message_path: &Path) -> PathBuf {
    let mut name = message_path.as_os_str().to_os_string();
    name.push(".minisig");
    PathBuf::from(name)
}
