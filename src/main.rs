use anyhow::Result;
use clap::{Parser, Subcommand};
mod auth;
use sealfile::{KdfParams, decrypt_file, encrypt_file};
use std::path::PathBuf;

#[derive(Debug, clap::Args)]
struct KdfArgs {
    /// PBKDF2-HMAC-SHA256 iteration count (default: 600000).
    /// Decryption must use the same count the file was encrypted with.
    #[arg(long = "kdf-iters", env = "SEALFILE_KDF_ITERS")]
    iterations: Option<u32>,
}

impl KdfArgs {
    fn to_kdf_params(&self) -> Result<KdfParams> {
        match self.iterations {
            Some(iterations) => Ok(KdfParams::new(iterations)?),
            None => Ok(KdfParams::default()),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sealfile")]
#[command(
    version,
    about = "Password-based authenticated file encryption (AES-256-GCM + PBKDF2)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a file into an authenticated container
    #[command(arg_required_else_help = true)]
    Encrypt {
        /// Plaintext input path
        input: PathBuf,
        /// Container output path
        output: PathBuf,

        #[command(flatten)]
        kdf: KdfArgs,
    },

    /// Decrypts a container back into the original file
    #[command(arg_required_else_help = true)]
    Decrypt {
        /// Container input path
        input: PathBuf,
        /// Plaintext output path
        output: PathBuf,

        #[command(flatten)]
        kdf: KdfArgs,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let password = auth::read_password()?;

    match args.command {
        Commands::Encrypt { input, output, kdf } => {
            encrypt_file(&password, kdf.to_kdf_params()?, &input, &output)?;
            println!("encrypted '{}' -> '{}'", input.display(), output.display());
        }
        Commands::Decrypt { input, output, kdf } => {
            decrypt_file(&password, kdf.to_kdf_params()?, &input, &output)?;
            println!("decrypted '{}' -> '{}'", input.display(), output.display());
        }
    }

    Ok(())
}
