// Command Line Interface
// Argument parsing and the handlers behind each subcommand

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::OsRng;
use tracing::info;

use secure_rsa::config::{CliConfig, KeyGenConfig, DEFAULT_KEY_BITS};
use secure_rsa::rsa::pem::{
    parse_pem, PRIVATE_KEY_LABEL, RSA_PRIVATE_KEY_LABEL, RSA_PUBLIC_KEY_LABEL,
};
use secure_rsa::rsa::{self, DigestAlgorithm};
use secure_rsa::task::{run_with_timeout, TaskOutcome};
use secure_rsa::util::file_ops::{self, KeyEncoding};

/// RSA toolkit.
#[derive(Parser, Debug)]
#[command(name = "secure-rsa")]
#[command(about = "RSA key generation, PKCS#1 v1.5 encryption and signatures")]
#[command(version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a key pair.
    Keygen {
        /// Modulus size in bits.
        #[arg(long, env = "SECURE_RSA_BITS", default_value_t = DEFAULT_KEY_BITS)]
        bits: usize,

        /// Private key output file.
        #[arg(long, default_value = "private.pem")]
        private_out: PathBuf,

        /// Public key output file.
        #[arg(long, default_value = "public.pem")]
        public_out: PathBuf,

        #[arg(long, value_enum, default_value_t = FileFormat::Pem)]
        format: FileFormat,

        /// Write the private key as PKCS#8 instead of PKCS#1.
        #[arg(long)]
        pkcs8: bool,

        /// Give up if generation takes longer than this.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Miller-Rabin rounds per prime candidate.
        #[arg(long, default_value_t = 20)]
        rounds: u32,
    },

    /// Derive the public key from a private key file.
    Pubkey {
        /// Private key file (PEM or DER).
        #[arg(long)]
        key: PathBuf,

        /// Output file. PEM goes to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = FileFormat::Pem)]
        format: FileFormat,
    },

    /// Encrypt a short message with a public key.
    Encrypt {
        /// Public key file (PEM or DER).
        #[arg(long)]
        key: PathBuf,

        #[command(flatten)]
        message: MessageArgs,

        /// Write raw ciphertext here instead of printing base64.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Decrypt a ciphertext with a private key.
    Decrypt {
        /// Private key file (PEM or DER).
        #[arg(long)]
        key: PathBuf,

        /// Base64 ciphertext.
        #[arg(long, conflicts_with = "input")]
        base64: Option<String>,

        /// File holding raw ciphertext.
        #[arg(long = "in")]
        input: Option<PathBuf>,

        /// Write the plaintext here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Sign a message with a private key.
    Sign {
        /// Private key file (PEM or DER).
        #[arg(long)]
        key: PathBuf,

        #[command(flatten)]
        message: MessageArgs,

        #[arg(long, default_value = "sha256")]
        digest: DigestAlgorithm,

        #[arg(long, value_enum, default_value_t = TextEncoding::Base64)]
        encoding: TextEncoding,
    },

    /// Verify a signature. Exits with status 1 when it does not match.
    Verify {
        /// Public key file (PEM or DER).
        #[arg(long)]
        key: PathBuf,

        #[command(flatten)]
        message: MessageArgs,

        /// Signature text.
        #[arg(long)]
        signature: String,

        #[arg(long, default_value = "sha256")]
        digest: DigestAlgorithm,

        #[arg(long, value_enum, default_value_t = TextEncoding::Base64)]
        encoding: TextEncoding,
    },

    /// Convert a private key between PKCS#8 and PKCS#1.
    Convert {
        #[arg(value_enum)]
        direction: Direction,

        /// Input key file (PEM or DER).
        #[arg(long = "in")]
        input: PathBuf,

        /// Output key file.
        #[arg(long)]
        out: PathBuf,

        #[arg(long, value_enum, default_value_t = FileFormat::Pem)]
        format: FileFormat,
    },
}

/// Message source: inline text, a file, or stdin when neither is given.
#[derive(clap::Args, Debug)]
pub struct MessageArgs {
    /// Message text.
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,

    /// File holding the message.
    #[arg(long = "in")]
    input: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Pem,
    Der,
}

impl From<FileFormat> for KeyEncoding {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Pem => KeyEncoding::Pem,
            FileFormat::Der => KeyEncoding::Der,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    Base64,
    Hex,
}

impl TextEncoding {
    fn encode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Base64 => BASE64.encode(bytes),
            TextEncoding::Hex => hex::encode(bytes),
        }
    }

    fn decode(self, text: &str) -> anyhow::Result<Vec<u8>> {
        let text = text.trim();
        match self {
            TextEncoding::Base64 => BASE64.decode(text).context("signature is not valid base64"),
            TextEncoding::Hex => hex::decode(text).context("signature is not valid hex"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Pkcs8ToPkcs1,
    Pkcs1ToPkcs8,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Settings derived from the parsed arguments
    pub fn config(&self) -> CliConfig {
        let mut config = CliConfig {
            log_level: self.log_level.clone(),
            ..CliConfig::default()
        };
        if let Command::Keygen {
            bits,
            timeout_secs,
            rounds,
            ..
        } = &self.command
        {
            config.bits = *bits;
            config.timeout = timeout_secs.map(Duration::from_secs);
            config.keygen = KeyGenConfig::default().with_miller_rabin_rounds(*rounds);
        }
        config
    }
}

impl MessageArgs {
    fn read(&self) -> anyhow::Result<Vec<u8>> {
        if let Some(text) = &self.text {
            return Ok(text.as_bytes().to_vec());
        }
        if let Some(path) = &self.input {
            return Ok(file_ops::read_file(path)?);
        }
        let mut data = Vec::new();
        io::stdin()
            .read_to_end(&mut data)
            .context("failed to read message from stdin")?;
        Ok(data)
    }
}

/// Execute the parsed command
pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.config();

    match cli.command {
        Command::Keygen {
            private_out,
            public_out,
            format,
            pkcs8,
            ..
        } => keygen(&config, &private_out, &public_out, format.into(), pkcs8),
        Command::Pubkey { key, out, format } => pubkey(&key, out.as_deref(), format.into()),
        Command::Encrypt { key, message, out } => {
            let public_key = file_ops::load_public_key(&key)?;
            let ciphertext = rsa::encrypt(&message.read()?, &public_key)?;
            match out {
                Some(path) => file_ops::write_file(&path, &ciphertext)?,
                None => println!("{}", BASE64.encode(&ciphertext)),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Decrypt {
            key,
            base64,
            input,
            out,
        } => {
            let private_key = file_ops::load_private_key(&key)?;
            let ciphertext = match (base64, input) {
                (Some(text), _) => BASE64
                    .decode(text.trim())
                    .context("ciphertext is not valid base64")?,
                (None, Some(path)) => file_ops::read_file(&path)?,
                (None, None) => bail!("pass the ciphertext with --base64 or --in"),
            };
            let plaintext = rsa::decrypt(&ciphertext, &private_key)?;
            match out {
                Some(path) => file_ops::write_file(&path, &plaintext)?,
                None => io::stdout()
                    .write_all(&plaintext)
                    .context("failed to write plaintext")?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Sign {
            key,
            message,
            digest,
            encoding,
        } => {
            let private_key = file_ops::load_private_key(&key)?;
            let signature = rsa::sign(&message.read()?, &private_key, digest)?;
            println!("{}", encoding.encode(&signature));
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify {
            key,
            message,
            signature,
            digest,
            encoding,
        } => {
            let public_key = file_ops::load_public_key(&key)?;
            let signature = encoding.decode(&signature)?;
            if rsa::verify(&message.read()?, &public_key, &signature, digest)? {
                println!("signature OK");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("signature does not match");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Convert {
            direction,
            input,
            out,
            format,
        } => convert(direction, &input, &out, format.into()),
    }
}

fn keygen(
    config: &CliConfig,
    private_out: &Path,
    public_out: &Path,
    encoding: KeyEncoding,
    pkcs8: bool,
) -> anyhow::Result<ExitCode> {
    let bits = config.bits;
    let keygen_config = config.keygen.clone();
    let generate = move || rsa::generate_with_rng(&mut OsRng, bits, &keygen_config);

    let pair = match config.timeout {
        Some(timeout) => match run_with_timeout(generate, timeout) {
            TaskOutcome::Finished(result) => result?,
            TaskOutcome::TimedOut => bail!("key generation timed out after {:?}", timeout),
        },
        None => generate()?,
    };

    let (private_der, private_label) = if pkcs8 {
        (rsa::convert_pkcs1_to_pkcs8(&pair.private_key)?, PRIVATE_KEY_LABEL)
    } else {
        (pair.private_key.clone(), RSA_PRIVATE_KEY_LABEL)
    };

    file_ops::save_key(private_out, &private_der, private_label, encoding)?;
    file_ops::save_key(public_out, &pair.public_key, RSA_PUBLIC_KEY_LABEL, encoding)?;
    info!(bits, private = %private_out.display(), public = %public_out.display(), "key pair written");

    println!(
        "Wrote {}-bit key pair to {} and {}",
        bits,
        private_out.display(),
        public_out.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn pubkey(key: &Path, out: Option<&Path>, encoding: KeyEncoding) -> anyhow::Result<ExitCode> {
    let private_key = file_ops::load_private_key(key)?;
    let public_key = rsa::extract_public_key(&private_key)?;

    match out {
        Some(path) => file_ops::save_key(path, &public_key, RSA_PUBLIC_KEY_LABEL, encoding)?,
        None => print!("{}", rsa::wrap_pem(&public_key, RSA_PUBLIC_KEY_LABEL)),
    }
    Ok(ExitCode::SUCCESS)
}

fn convert(
    direction: Direction,
    input: &Path,
    out: &Path,
    encoding: KeyEncoding,
) -> anyhow::Result<ExitCode> {
    let data = file_ops::read_file(input)?;
    let pem_der = std::str::from_utf8(&data)
        .ok()
        .and_then(|text| parse_pem(text).ok())
        .map(|block| block.der);
    let der = pem_der.unwrap_or(data);

    let (converted, label) = match direction {
        Direction::Pkcs8ToPkcs1 => (rsa::convert_pkcs8_to_pkcs1(&der)?, RSA_PRIVATE_KEY_LABEL),
        Direction::Pkcs1ToPkcs8 => (rsa::convert_pkcs1_to_pkcs8(&der)?, PRIVATE_KEY_LABEL),
    };
    file_ops::save_key(out, &converted, label, encoding)?;
    Ok(ExitCode::SUCCESS)
}
