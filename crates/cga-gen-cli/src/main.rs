//! cga-gen CLI: `cga-gen` command.
//!
//! Glue around the library: reads the public key and an optional
//! modifier file, picks a DAD oracle, runs generation and prints the
//! result. Input problems exit with status 2, generation failures
//! with status 1.

use std::net::Ipv6Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Args, Parser, Subcommand};

use cga_gen::{
    decode_public_key, generate, verify, CancelToken, CgaParams, DadPolicy, GenerationRequest,
    Modifier, NeighborTable, ParamsDocument, SubnetPrefix,
};

// ── Error classes ─────────────────────────────────────────────────────────────

/// Distinguishes configuration mistakes from protocol-level failures.
#[derive(Debug)]
enum CliError {
    /// Could not read or parse an input.
    Input(anyhow::Error),
    /// Inputs were fine but generation or verification failed.
    Generation(anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Input(_) => 2,
            Self::Generation(_) => 1,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(e) => write!(f, "{e:#}"),
            Self::Generation(e) => write!(f, "{e:#}"),
        }
    }
}

type CliResult<T> = std::result::Result<T, CliError>;

// ── Input helpers ─────────────────────────────────────────────────────────────

/// Read a public key file holding a SubjectPublicKeyInfo, as DER or as a
/// PEM `PUBLIC KEY` block.
fn read_public_key(path: &Path) -> anyhow::Result<Vec<u8>> {
    let raw = std::fs::read(path)
        .with_context(|| format!("could not open public key file '{}'", path.display()))?;
    let key = decode_public_key(&raw)
        .with_context(|| format!("invalid public key in '{}'", path.display()))?;
    Ok(key)
}

/// Read a base64 modifier file.
fn read_modifier(path: &Path) -> anyhow::Result<Modifier> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not open modifier file '{}'", path.display()))?;
    let modifier = Modifier::from_base64(&text)
        .with_context(|| format!("invalid modifier in '{}'", path.display()))?;
    Ok(modifier)
}

/// Parse a prefix. Without an explicit length, `2001:db8:0:1` is padded
/// to `2001:db8:0:1::` and read as a /64.
fn parse_prefix(text: &str) -> anyhow::Result<SubnetPrefix> {
    let mut text = text.to_string();
    if !text.contains('/') {
        if !text.ends_with(':') {
            text.push(':');
        }
        if !text.ends_with("::") {
            text.push(':');
        }
    }
    let prefix = text.parse::<SubnetPrefix>()?;
    Ok(prefix)
}

fn parse_extension(hex_block: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(hex_block).with_context(|| format!("extension '{hex_block}' is not valid hex"))
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// cga-gen: generate and verify IPv6 Cryptographically Generated Addresses.
#[derive(Parser, Debug)]
#[command(
    name = "cga-gen",
    about = "Generate and verify IPv6 CGAs (RFC 3972)",
    version
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a CGA for a public key
    Generate(GenerateArgs),

    /// Verify a CGA against a parameter document produced by `generate --json`
    Verify {
        /// Path to the JSON parameter document
        document: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// File containing the SubjectPublicKeyInfo (PEM "PUBLIC KEY" or DER)
    public_key: PathBuf,

    /// The /64 prefix to place the identifier under (e.g. 2001:db8:0:1::/64)
    #[arg(short = 'p', long)]
    prefix: String,

    /// The sec parameter
    #[arg(short = 's', long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=7))]
    sec: u8,

    /// Perform duplicate address detection
    #[arg(short = 'd', long)]
    dad: bool,

    /// Per-probe DAD timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    dad_timeout_ms: u64,

    /// Address known to be in use on the link (repeatable); consulted by DAD
    #[arg(long = "in-use", value_name = "ADDR")]
    in_use: Vec<Ipv6Addr>,

    /// File containing a 16-byte modifier in base64 (searched for by default)
    #[arg(short = 'm', long)]
    modifier: Option<PathBuf>,

    /// Write the modifier in base64 to this file
    #[arg(short = 'o', long)]
    modifier_out: Option<PathBuf>,

    /// Collision count; pinning it skips DAD
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(0..=2))]
    collision_count: Option<u8>,

    /// Extension field as a hex block; repeat the flag for more, hashed in order
    #[arg(short = 'e', long = "ext", value_name = "HEX", action = ArgAction::Append)]
    extensions: Vec<String>,

    /// Abort the modifier search after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Print the result as a JSON parameter document
    #[arg(long)]
    json: bool,
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Generate(args) => cmd_generate(args, verbose),
        Commands::Verify { document } => cmd_verify(&document, verbose),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// Everything `generate` reads before it starts work.
struct GenerateInputs {
    request: GenerationRequest,
    neighbors: Arc<NeighborTable>,
}

fn load_generate_inputs(args: &GenerateArgs) -> anyhow::Result<GenerateInputs> {
    let public_key = read_public_key(&args.public_key)?;
    let prefix = parse_prefix(&args.prefix)?;

    let mut builder = GenerationRequest::builder(prefix, public_key).sec(args.sec);

    for block in &args.extensions {
        builder = builder.extension(parse_extension(block)?);
    }
    if let Some(ref path) = args.modifier {
        builder = builder.modifier(read_modifier(path)?);
    }
    if let Some(count) = args.collision_count {
        builder = builder.collision_count(count);
    }
    if args.dad {
        builder = builder.dad(DadPolicy::Enabled {
            timeout: Duration::from_millis(args.dad_timeout_ms),
        });
    }

    let request = builder.build()?;
    let neighbors: NeighborTable = args.in_use.iter().copied().collect();
    if request.dad().is_enabled() && neighbors.is_empty() {
        log::warn!("DAD requested without --in-use addresses; every candidate will be free");
    }
    Ok(GenerateInputs {
        request,
        neighbors: Arc::new(neighbors),
    })
}

/// `cga-gen generate <KEY> -p PREFIX [-s SEC] [-d] [-m FILE] [-c N] [-e HEX...]`
fn cmd_generate(args: GenerateArgs, verbose: bool) -> CliResult<()> {
    let inputs = load_generate_inputs(&args).map_err(CliError::Input)?;

    let cancel = CancelToken::new();
    if let Some(secs) = args.time_limit {
        let token = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            token.cancel();
        });
    }

    log::info!(
        "generating CGA under {} with sec {}",
        inputs.request.prefix(),
        inputs.request.sec()
    );
    let cga = generate(&inputs.request, &inputs.neighbors, &cancel)
        .context("CGA generation failed")
        .map_err(CliError::Generation)?;

    if args.json {
        let json = ParamsDocument::from_generated(&cga)
            .to_json()
            .context("could not encode parameter document")
            .map_err(CliError::Generation)?;
        println!("{json}");
    } else {
        println!("            CGA: {}", cga.address);
        print!("       modifier: {}", cga.params.modifier);
        if args.modifier.is_some() {
            println!(" (from file)");
        } else if let Some(ref path) = args.modifier_out {
            match std::fs::write(path, format!("{}\n", cga.params.modifier)) {
                Ok(()) => println!(" (written to file '{}')", path.display()),
                Err(_) => println!(" (could not write to file '{}')", path.display()),
            }
        } else {
            println!();
        }

        print!("collision count: {}", cga.params.collision_count);
        let probed = inputs.request.dad().is_enabled() && inputs.request.collision_count().is_none();
        if probed && !inputs.neighbors.is_empty() {
            println!(
                " (duplicate address detection against {} offline neighbor entries)",
                inputs.neighbors.len()
            );
        } else if probed {
            println!(" (did NOT perform duplicate address detection: no --in-use neighbors given)");
        } else {
            println!(" (did NOT perform duplicate address detection)");
        }
    }

    if verbose {
        eprintln!("  Sec:        {}", cga.sec);
        eprintln!("  Iterations: {}", cga.search.iterations);
        eprintln!("  DAD probes: {}", cga.probes);
        eprintln!("  Params:     {}", hex::encode(cga.params.to_bytes()));
    }

    Ok(())
}

fn load_document(path: &Path) -> anyhow::Result<(Ipv6Addr, CgaParams)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("could not open document '{}'", path.display()))?;
    let doc = ParamsDocument::from_json(&json)?;
    Ok((doc.address()?, doc.params()?))
}

/// `cga-gen verify <DOCUMENT>`
fn cmd_verify(path: &Path, verbose: bool) -> CliResult<()> {
    let (address, params) = load_document(path).map_err(CliError::Input)?;

    let result = verify(&address, &params);

    if verbose {
        println!("  Prefix matches: {}", result.prefix_matches);
        println!("  Hash1 valid:    {}", result.hash1_valid);
        println!("  Hash2 valid:    {}", result.hash2_valid);
        println!("  Sec:            {}", result.sec);
    }

    if result.is_valid {
        println!("{address}: valid CGA (sec {})", result.sec);
        Ok(())
    } else {
        Err(CliError::Generation(anyhow!(
            "{address} does not verify against its parameters"
        )))
    }
}
