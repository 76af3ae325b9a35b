use std::{fs, path::PathBuf, sync::atomic::AtomicBool, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vision_consensus::chain::MemoryChain;
use vision_consensus::config::{ChainConfig, EngineConfig, PowMode};
use vision_consensus::types::{Address, Header};
use vision_consensus::{ChainReader, PowEngine, ProtocolVersion, Sealer};

#[derive(Parser, Debug)]
#[command(name = "vision-pow", version, about = "Vision PoW consensus tools")]
struct Cli {
    /// Chain config (TOML); defaults to all forks from genesis
    #[arg(long, global = true)]
    chain: Option<PathBuf>,

    /// Engine mode: normal | test | fake | full_fake (overrides VISION_POW_MODE)
    #[arg(long, global = true)]
    mode: Option<PowMode>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the difficulty of a child of the given parent header
    Difficulty {
        /// Parent header (JSON)
        #[arg(long)]
        parent: PathBuf,

        /// Child timestamp (unix seconds)
        #[arg(long)]
        time: u64,

        /// Child protocol version tag
        #[arg(long, default_value = "")]
        version: String,
    },

    /// Verify a JSON array of headers; the first one is trusted as the anchor
    Verify {
        /// Header array (JSON)
        #[arg(long)]
        headers: PathBuf,

        /// Also verify seals
        #[arg(long)]
        seal: bool,

        /// Accounts allowed to mine (hex, comma separated)
        #[arg(long, value_delimiter = ',')]
        miners: Vec<String>,
    },

    /// Search for a seal for the given header and print the sealed header
    Seal {
        /// Header (JSON)
        #[arg(long)]
        header: PathBuf,

        /// Worker threads (default: all cores)
        #[arg(long)]
        threads: Option<usize>,
    },
}

fn init_tracing() {
    // init tracing from env VISION_LOG or RUST_LOG
    let filter = std::env::var("VISION_LOG")
        .unwrap_or_else(|_| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn load_chain_config(path: Option<&PathBuf>) -> Result<ChainConfig> {
    match path {
        Some(p) => ChainConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(ChainConfig::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn parse_address(raw: &str) -> Result<Address> {
    let raw = raw.trim();
    let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
        .with_context(|| format!("bad address hex: {raw}"))?;
    match Address::try_from(bytes.as_slice()) {
        Ok(addr) => Ok(addr),
        Err(_) => bail!("address must be 20 bytes, got {}", bytes.len()),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let chain_config = load_chain_config(cli.chain.as_ref())?;
    let mut engine_config = EngineConfig::from_env();
    if let Some(mode) = cli.mode {
        engine_config.pow_mode = mode;
    }
    tracing::info!(mode = %engine_config.pow_mode, "[VISION-POW] engine ready");
    let engine = PowEngine::new(engine_config);

    match cli.cmd {
        Commands::Difficulty {
            parent,
            time,
            version,
        } => {
            let parent: Header = read_json(&parent)?;
            let chain = MemoryChain::try_new(chain_config)?;
            let diff = engine.calc_difficulty(&chain, &ProtocolVersion::new(version), time, &parent);
            println!("{diff}");
        }

        Commands::Verify {
            headers,
            seal,
            miners,
        } => {
            let mut headers: Vec<Header> = read_json(&headers)?;
            if headers.is_empty() {
                bail!("header file is empty");
            }
            let anchor = headers.remove(0);

            let miners = miners
                .iter()
                .filter(|m| !m.trim().is_empty())
                .map(|m| parse_address(m))
                .collect::<Result<Vec<_>>>()?;
            let chain = MemoryChain::try_new(chain_config)?.with_inner_miners(miners);
            chain.insert_header(anchor);

            let numbers: Vec<u64> = headers.iter().map(|h| h.number).collect();
            let seals = vec![seal; headers.len()];
            let chain: Arc<dyn ChainReader> = Arc::new(chain);
            let (_abort, results) = engine.verify_headers(chain, headers, seals);

            let mut failed = 0usize;
            for (number, result) in numbers.iter().zip(results.iter()) {
                match result {
                    Ok(()) => println!("#{number}: ok"),
                    Err(e) => {
                        failed += 1;
                        println!("#{number}: {e}");
                    }
                }
            }
            if failed > 0 {
                bail!("{failed} of {} headers failed verification", numbers.len());
            }
        }

        Commands::Seal { header, threads } => {
            let header: Header = read_json(&header)?;
            let mut sealer = Sealer::new(engine);
            if let Some(n) = threads {
                sealer = sealer.with_threads(n);
            }
            tracing::info!(threads = sealer.threads(), number = header.number, "[VISION-POW] sealing");
            let stop = AtomicBool::new(false);
            match sealer.seal(&header, &stop)? {
                Some(sealed) => println!("{}", serde_json::to_string_pretty(&sealed)?),
                None => bail!("sealing stopped before a solution was found"),
            }
        }
    }
    Ok(())
}
