use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
mod auth;
use jasypt_pbe::{AlgorithmSpec, Config, DEFAULT_ALGORITHM, Jasypt, Mode, wrap_property};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct AlgorithmArgs {
    /// Algorithm id (default: PBEWITHHMACSHA512ANDAES_256)
    #[arg(short, long, env = "JASYPT_ALGORITHM")]
    algorithm: Option<String>,

    /// Use the default algorithm of a jasypt-spring-boot major version (takes precedence over --algorithm)
    #[arg(long = "spring-boot", value_name = "VERSION")]
    spring_boot: Option<String>,

    /// Key derivation iterations (default: the algorithm's catalog default)
    #[arg(short, long)]
    iterations: Option<u32>,
}

impl AlgorithmArgs {
    fn resolve<'a>(&self, jasypt: &'a Jasypt) -> Result<(&'a AlgorithmSpec, u32)> {
        let spec = match &self.spring_boot {
            Some(version) => jasypt
                .registry()
                .default_for_framework(version)
                .with_context(|| format!("no default algorithm for spring boot '{version}'"))?,
            None => jasypt.lookup_algorithm(self.algorithm.as_deref().unwrap_or(DEFAULT_ALGORITHM))?,
        };

        Ok((spec, self.iterations.unwrap_or(spec.default_iterations())))
    }
}

#[derive(Debug, Parser)]
#[command(name = "jasypt-pbe")]
#[command(
    version,
    about = "Encrypt and decrypt Jasypt-compatible standard PBE strings."
)]
struct Cli {
    /// Path to a JSON algorithm catalog
    #[arg(long, global = true, value_name = "PATH", env = "JASYPT_CATALOG")]
    catalog: Option<PathBuf>,

    /// Refuse iteration counts above this limit
    #[arg(long, global = true, value_name = "N", env = "JASYPT_MAX_ITERATIONS")]
    max_iterations: Option<u32>,

    /// Log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a plaintext string
    #[command(arg_required_else_help = true)]
    Encrypt {
        #[command(flatten)]
        algorithm: AlgorithmArgs,

        /// Print the result wrapped as ENC(...)
        #[arg(long, default_value_t = false)]
        wrap: bool,

        text: String,
    },

    /// Decrypts a Base64 envelope, with or without ENC(...)
    #[command(arg_required_else_help = true)]
    Decrypt {
        #[command(flatten)]
        algorithm: AlgorithmArgs,

        text: String,
    },

    /// Lists the algorithms in the catalog
    List,

    /// Shows catalog details of one algorithm
    #[command(arg_required_else_help = true)]
    Info { id: String },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_tracing(args.verbose);

    let jasypt = Config::resolve(args.catalog.clone(), args.max_iterations).build()?;

    match args.command {
        Commands::Encrypt {
            algorithm,
            wrap,
            text,
        } => {
            let (spec, iterations) = algorithm.resolve(&jasypt)?;
            let password = auth::read_new_password()?;
            let envelope = jasypt.process(Mode::Encrypt, spec.id(), &password, iterations, &text)?;
            if wrap {
                println!("{}", wrap_property(&envelope));
            } else {
                println!("{envelope}");
            }
        }
        Commands::Decrypt { algorithm, text } => {
            let (spec, iterations) = algorithm.resolve(&jasypt)?;
            let password = auth::read_password()?;
            let plaintext = jasypt.process(Mode::Decrypt, spec.id(), &password, iterations, &text)?;
            println!("{plaintext}");
        }
        Commands::List => {
            let specs: Vec<_> = jasypt.registry().iter().collect();

            let id_width = specs
                .iter()
                .map(|s| s.id().len())
                .chain(std::iter::once("Algorithm".len()))
                .max()
                .unwrap_or_default();

            let family_width = "Family".len();

            println!(
                "{:<id_width$}  {:<family_width$}  {:>10}  Spring Boot",
                "Algorithm", "Family", "Iterations"
            );
            println!("{:-<id_width$}  {:-<family_width$}  {:->10}  {:-<11}", "", "", "", "");

            for s in specs {
                println!(
                    "{:<id_width$}  {:<family_width$}  {:>10}  {}",
                    s.id(),
                    s.family().name(),
                    s.default_iterations(),
                    s.spring_boot_version().unwrap_or("-"),
                );
            }
        }
        Commands::Info { id } => {
            let spec = jasypt.lookup_algorithm(&id)?;
            let family = spec.family();
            println!("id:          {}", spec.id());
            println!("name:        {}", spec.name());
            println!("family:      {}", family.name());
            println!("cipher:      {}", family.cipher().label());
            println!("iterations:  {}", spec.default_iterations());
            if let Some(version) = spec.spring_boot_version() {
                println!("spring boot: {version}");
            }
            if let Some(major) = spec.spring_boot_default() {
                println!("default for: {major}.x");
            }
            if !spec.description().is_empty() {
                println!("{}", spec.description());
            }
        }
    }

    Ok(())
}
