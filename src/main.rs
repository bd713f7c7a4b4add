mod cache;
mod classify;
mod error;
mod extract;
mod lookup;
mod record;
mod sru;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::cache::{KamerstukCache, KamerstukInfo};
use crate::lookup::KamerstukLookup;
use crate::sru::SruClient;

const DEFAULT_CACHE_FILE: &str = "kamerstuk_information.json";

#[derive(Parser)]
#[command(name = "kamerstuk_info", about = "Kamerstuk metadata via the KOOP SRU API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one kamerstuk by dossiernummer and ondernummer
    Lookup {
        dossiernummer: String,
        ondernummer: String,
    },
    /// Look up every pair in a file (one "dossiernummer ondernummer" per
    /// line, whitespace- or comma-separated; '#' starts a comment)
    Batch { file: String },
    /// Show cache statistics
    Stats,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Config::builder()
        .add_source(config::Environment::with_prefix("KST"))
        .build()
        .unwrap_or_default();
    let cache_path = settings
        .get_string("cache_path")
        .unwrap_or_else(|_| DEFAULT_CACHE_FILE.to_string());
    let endpoint = settings
        .get_string("endpoint")
        .unwrap_or_else(|_| sru::DEFAULT_ENDPOINT.to_string());

    match cli.command {
        Commands::Lookup {
            dossiernummer,
            ondernummer,
        } => {
            let mut lookup = build_lookup(&endpoint, &cache_path)?;
            let info = lookup.lookup(&dossiernummer, &ondernummer)?;
            print_info(&info);
            Ok(())
        }
        Commands::Batch { file } => {
            let pairs = read_pairs(&file)?;
            if pairs.is_empty() {
                println!("No pairs found in {}.", file);
                return Ok(());
            }
            println!("Looking up {} kamerstukken...", pairs.len());

            let mut lookup = build_lookup(&endpoint, &cache_path)?;
            let pb = ProgressBar::new(pairs.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                    .progress_chars("=> "),
            );

            let mut ok = 0usize;
            let mut errors = 0usize;
            for (dossiernummer, ondernummer) in &pairs {
                match lookup.lookup(dossiernummer, ondernummer) {
                    Ok(_) => ok += 1,
                    Err(e) => {
                        warn!(%dossiernummer, %ondernummer, error = %e, "lookup failed");
                        errors += 1;
                    }
                }
                pb.inc(1);
            }
            pb.finish_and_clear();

            println!("Done: {} ok, {} errors.", ok, errors);
            Ok(())
        }
        Commands::Stats => {
            let cache = KamerstukCache::load(&cache_path);
            println!("Cache file: {}", cache_path);
            println!("Dossiers:   {}", cache.dossier_count());
            println!("Entries:    {}", cache.entry_count());
            Ok(())
        }
    }
}

fn build_lookup(endpoint: &str, cache_path: &str) -> Result<KamerstukLookup<SruClient>> {
    let source = SruClient::new(endpoint)?;
    let cache = KamerstukCache::load(cache_path);
    Ok(KamerstukLookup::new(source, cache))
}

fn print_info(info: &KamerstukInfo) {
    println!("Dossiernummer: {}", info.dossiernummer);
    println!("Ondernummer:   {}", info.ondernummer);
    println!("Vergaderjaar:  {}", info.vergaderjaar);
    println!("Kamer:         {}", info.kamer);
    println!("Type:          {}", info.kamerstuktype);
    println!("Documenttitel: {}", info.documenttitel);
    println!("Dossiertitel:  {}", info.dossiertitel);
}

fn read_pairs(file: &str) -> Result<Vec<(String, String)>> {
    let contents =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;

    let mut pairs = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        let dossiernummer = parts.next().unwrap_or_default();
        let ondernummer = parts.next().unwrap_or_default();
        if dossiernummer.is_empty() || ondernummer.is_empty() {
            anyhow::bail!("{}:{}: expected 'dossiernummer ondernummer'", file, lineno + 1);
        }
        pairs.push((dossiernummer.to_string(), ondernummer.to_string()));
    }
    Ok(pairs)
}

// ── Tests ──
