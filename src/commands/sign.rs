/// File signing.
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Args;
use tracing::info;

use minisig::error::Result;
use minisig::keys::secret::SecretKey;
use minisig::message::MessageFile;
use minisig::sig::file::SigFile;

const DEFAULT_UNTRUSTED_COMMENT: &str = "signature from minisign secret key";

#[derive(Args)]
pub struct SignArgs {
    /// Files to sign
    #[arg(short = 'm', long = "message", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Sign the BLAKE2b-512 digest instead of the file contents
    #[arg(short = 'H', long = "prehash")]
    pub prehash: bool,

    /// Signature path (only valid when signing a single file)
    #[arg(short = 'x', long = "sig-file")]
    pub signature_path: Option<PathBuf>,

    /// Secret key file
    #[arg(short = 's', long = "seckey-file", default_value = "minisign.key")]
    pub secret_key_path: PathBuf,

    /// Untrusted comment (not covered by the signature)
    #[arg(short = 'c', long = "comment")]
    pub untrusted_comment: Option<String>,

    /// Trusted comment (covered by the signature)
    #[arg(short = 't', long = "trusted-comment")]
    pub trusted_comment: Option<String>,
}

pub fn run(args: &SignArgs) -> Result<()> {
    if args.signature_path.is_some() && args.files.len() > 1 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "-x can only be used when signing a single file",
        )
        .into());
    }

    let password = super::prompt_password("Password: ")?;
    let secret_key = SecretKey::from_file(&args.secret_key_path, password)?;

    let untrusted = args
        .untrusted_comment
        .clone()
        .unwrap_or_else(|| DEFAULT_UNTRUSTED_COMMENT.to_string());

    for path in &args.files {
        let message = MessageFile::from_file(path)?;
        let trusted = match &args.trusted_comment {
            Some(comment) => comment.clone(),
            None => default_trusted_comment(path),
        };
        let signature = message.sign(&secret_key, args.prehash, &trusted, &untrusted)?;

        let signature_path = args
            .signature_path
            .clone()
            .unwrap_or_else(|| super::default_signature_path(path));
        SigFile::serialize(&signature)?.save_to(&signature_path)?;
        info!(file = %path.display(), sig = %signature_path.display(), "Signed");
    }
    Ok(())
}

/// `timestamp:<unix seconds>\tfile:<basename>`
fn default_trusted_comment(path: &Path) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("timestamp:{timestamp}\tfile:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_trusted_comment_shape() {
        let comment = default_trusted_comment(Path::new("dist/release.tar.gz"));
        let (timestamp_part, file_part) = comment.split_once('\t').unwrap();
        assert!(timestamp_part.strip_prefix("timestamp:").unwrap().parse::<u64>().is_ok());
        assert_eq!(file_part, "file:release.tar.gz");
    }
}
