/// Signature verification.
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;

use minisig::error::{MinisignError, Result};
use minisig::keys::public::PublicKey;
use minisig::message::MessageFile;
use minisig::sig::file::SigFile;

#[derive(Args)]
pub struct VerifyArgs {
    /// File to verify
    #[arg(short = 'm', long = "message")]
    pub file: PathBuf,

    /// Public key file
    #[arg(short = 'p', long = "pubkey-file", conflicts_with = "pubkey")]
    pub pubkey_file: Option<PathBuf>,

    /// Public key as base64 (full payload or bare key)
    #[arg(short = 'P', long = "pubkey")]
    pub pubkey: Option<String>,

    /// Signature file (default <file>.minisig)
    #[arg(short = 'x', long = "sig-file")]
    pub signature_path: Option<PathBuf>,

    /// Print the verified file to stdout
    #[arg(short = 'o', long = "output")]
    pub output: bool,

    /// No output on success
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Print only the trusted comment on success
    #[arg(short = 'Q', long = "quiet-trusted", conflicts_with = "quiet")]
    pub quiet_trusted: bool,
}

pub fn run(args: &VerifyArgs) -> Result<()> {
    let public_key = match (&args.pubkey, &args.pubkey_file) {
        (Some(encoded), _) => PublicKey::from_base64(encoded)?,
        (None, Some(path)) => PublicKey::from_file(path)?,
        (None, None) => PublicKey::from_file(Path::new("minisign.pub"))?,
    };

    let signature_path = args
        .signature_path
        .clone()
        .unwrap_or_else(|| super::default_signature_path(&args.file));
    let signature = SigFile::from_file(&signature_path)?.deserialize()?;

    if !public_key.key_id().is_zero() && signature.key_id != public_key.key_id() {
        eprintln!(
            "Signature key id {} differs from the public key id {}",
            signature.key_id,
            public_key.key_id()
        );
        return Err(MinisignError::Verification);
    }

    let message = MessageFile::from_file(&args.file)?;
    message.verify(&public_key, &signature)?;

    if args.quiet_trusted {
        println!("{}", signature.trusted_comment);
    } else if !args.quiet {
        println!("Signature and comment signature verified");
        println!("Trusted comment: {}", signature.trusted_comment);
    }

    if args.output {
        std::io::stdout().write_all(message.contents())?;
    }
    Ok(())
}
