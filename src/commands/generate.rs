/// Key pair generation.
use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Args;
use subtle::ConstantTimeEq;
use tracing::info;

use minisig::crypto::sensitive::Password;
use minisig::error::Result;
use minisig::keys::secret::SecretKeyBuilder;

#[derive(Args)]
pub struct GenerateArgs {
    /// Where to write the public key
    #[arg(short = 'p', long = "pubkey-file", default_value = "minisign.pub")]
    pub public_key_path: PathBuf,

    /// Where to write the encrypted secret key
    #[arg(short = 's', long = "seckey-file", default_value = "minisign.key")]
    pub secret_key_path: PathBuf,

    /// Overwrite existing key files
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Untrusted comment for the secret key file
    #[arg(short = 'c', long = "comment")]
    pub comment: Option<String>,
}

pub fn run(args: &GenerateArgs) -> Result<()> {
    if !args.force {
        for path in [&args.public_key_path, &args.secret_key_path] {
            if path.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists; use -f to overwrite", path.display()),
                )
                .into());
            }
        }
    }

    println!("Please enter a password to protect the secret key.");
    let password = read_new_password()?;

    let mut builder = SecretKeyBuilder::new();
    if let Some(comment) = &args.comment {
        builder = builder.untrusted_comment(comment);
    }
    let secret_key = builder.build();
    let public_key = secret_key.public_key();

    println!("Deriving a key from the password in order to encrypt the secret key...");
    let encrypted = secret_key.encrypt(password)?;

    fs::write(&args.secret_key_path, &encrypted)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&args.secret_key_path, fs::Permissions::from_mode(0o600))?;
    }
    info!(path = %args.secret_key_path.display(), "Wrote secret key");

    fs::write(&args.public_key_path, public_key.encode()?)?;
    info!(path = %args.public_key_path.display(), "Wrote public key");

    println!(
        "The secret key was saved as {} - Keep it secret!",
        args.secret_key_path.display()
    );
    println!(
        "The public key was saved as {} - That one can be public.",
        args.public_key_path.display()
    );
    println!();
    println!("Files signed using this key pair can be verified with the following command:");
    println!();
    println!("minisig verify -P {} -m <file>", public_key.to_base64());
    Ok(())
}

/// Prompt twice and loop until both entries match (constant-time compare).
fn read_new_password() -> Result<Password> {
    loop {
        let first = super::prompt_password("Password: ")?;
        let second = super::prompt_password("Password (one more time): ")?;
        if bool::from(first.as_bytes().ct_eq(second.as_bytes())) {
            return Ok(first);
        }
        eprintln!("Passwords don't match, try again.");
    }
}
