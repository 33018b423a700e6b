//! Agora CLI
//!
//! Command-line interface for the Agora translation cache and API server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agora_api::{ApiConfig, ApiServer};
use agora_cache::{content_hash, CacheConfig, TranslationCache};
use agora_core::traits::Translator;
use agora_core::types::{LanguageCode, TranslationRequest};
use agora_ratelimit::{RateLimitPolicy, RateLimiter};
use agora_translate::{CachingTranslator, HttpTranslator, HttpTranslatorConfig};

/// Agora - cached translation with rate limiting
#[derive(Parser)]
#[command(name = "agora")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Translate text through the configured provider
    Translate {
        /// Text to translate
        text: String,
        /// Target language
        #[arg(short, long)]
        to: String,
        /// Source language
        #[arg(short, long, default_value = "auto")]
        from: String,
        /// Translation server URL
        #[arg(long, env = "TRANSLATOR_URL", default_value = "http://localhost:5000")]
        url: String,
        /// API key for the translation server
        #[arg(long, env = "TRANSLATOR_API_KEY")]
        api_key: Option<String>,
    },

    /// Print the cache key for a text and language pair
    Hash {
        /// Text to hash
        text: String,
        /// Source language
        #[arg(short, long, default_value = "auto")]
        from: String,
        /// Target language
        #[arg(short, long)]
        to: String,
    },

    /// Benchmark the cache and rate limiter
    Bench {
        /// Number of entries / requests
        #[arg(short, long, default_value = "10000")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "agora=debug,info"
    } else {
        "agora=info,warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Translate {
            text,
            to,
            from,
            url,
            api_key,
        } => cmd_translate(text, &from, &to, url, api_key).await,
        Commands::Hash { text, from, to } => cmd_hash(&text, &from, &to),
        Commands::Bench { count } => cmd_bench(count),
    }
}

fn parse_language(code: &str) -> Result<LanguageCode> {
    LanguageCode::parse(code).with_context(|| format!("invalid language '{}'", code))
}

/// Run API server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting Agora API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);

    let config = ApiConfig::from_env();
    println!("   {} {}", "Translator:".dimmed(), config.translator.endpoint);
    println!(
        "   {} {}",
        "Cache:".dimmed(),
        if config.enable_cache {
            format!("{} entries, {}s TTL", config.cache.max_entries, config.cache.default_ttl_seconds)
        } else {
            "disabled".to_string()
        }
    );
    println!(
        "   {} {} req / {}s ({} for translation)",
        "Rate limit:".dimmed(),
        config.rate_limit.max_requests,
        config.rate_limit.window.as_secs(),
        config.translate_rate_limit.max_requests
    );
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config).context("failed to configure server")?;

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    server.run(addr).await?;

    Ok(())
}

/// Translate one text
async fn cmd_translate(
    text: String,
    from: &str,
    to: &str,
    url: String,
    api_key: Option<String>,
) -> Result<()> {
    let request = TranslationRequest::new(text, parse_language(from)?, parse_language(to)?);
    request.validate()?;

    let translator = cli_translator(url, api_key)?;

    let start = Instant::now();
    let translation = translator
        .translate(&request)
        .await
        .context("translation failed")?;
    debug!(elapsed = ?start.elapsed(), "Translation finished");

    println!("{}", translation.text);
    if let Some(detected) = &translation.detected_source {
        eprintln!("{} {}", "Detected source:".dimmed(), detected);
    }

    Ok(())
}

/// Provider with validation and the same-language passthrough, no cache
fn cli_translator(url: String, api_key: Option<String>) -> Result<CachingTranslator> {
    let mut config = HttpTranslatorConfig::new(url);
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    let provider = HttpTranslator::with_config(config)?;
    Ok(CachingTranslator::uncached(Arc::new(provider)))
}

/// Print the content hash
fn cmd_hash(text: &str, from: &str, to: &str) -> Result<()> {
    let hash = content_hash(text, &parse_language(from)?, &parse_language(to)?);
    println!("{}", hash);
    Ok(())
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Run benchmarks
fn cmd_bench(count: usize) -> Result<()> {
    println!("{} {} entries", "📊 Benchmarking with".cyan().bold(), count);
    let count = count.max(1);

    let en = LanguageCode::parse("en")?;
    let fr = LanguageCode::parse("fr")?;
    let texts: Vec<String> = (0..count).map(|i| format!("message number {}", i)).collect();

    let cache = TranslationCache::with_config(CacheConfig {
        max_entries: count,
        ..CacheConfig::default()
    });

    // Insert
    println!("\n{}", "1. Filling cache...".dimmed());
    let pb = progress_bar(count)?;
    let start = Instant::now();
    for text in &texts {
        cache.insert(text, &en, &fr, text.to_uppercase(), None);
        pb.inc(1);
    }
    pb.finish();
    let insert_time = start.elapsed();
    println!("   ✓ Inserted {} entries: {:?}", count, insert_time);

    // Lookup
    println!("\n{}", "2. Looking up...".dimmed());
    let start = Instant::now();
    let hits = texts
        .iter()
        .filter(|text| cache.get(text, &en, &fr).is_some())
        .count();
    let lookup_time = start.elapsed();
    println!("   ✓ {} / {} hits: {:?}", hits, count, lookup_time);

    // Trim
    println!("\n{}", "3. Trimming to half...".dimmed());
    let start = Instant::now();
    let evicted = cache.enforce_size_limit(count / 2);
    println!("   ✓ Evicted {} entries: {:?}", evicted, start.elapsed());

    // Rate limiter
    println!("\n{}", "4. Rate limiter checks...".dimmed());
    let limiter = RateLimiter::new();
    let policy = RateLimitPolicy::new(100, Duration::from_secs(60));
    let start = Instant::now();
    let allowed = (0..count)
        .filter(|i| limiter.check(&format!("client-{}", i % 1000), "/bench", &policy).allowed)
        .count();
    let check_time = start.elapsed();
    println!("   ✓ {} checks, {} allowed: {:?}", count, allowed, check_time);

    println!("\n{}", "📈 Results:".green().bold());
    println!("   Insert rate: {:.0} entries/sec", count as f64 / insert_time.as_secs_f64());
    println!("   Lookup rate: {:.0} lookups/sec", count as f64 / lookup_time.as_secs_f64());
    println!("   Check rate: {:.0} checks/sec", count as f64 / check_time.as_secs_f64());

    if hits == count {
        println!("   {} All entries found!", "✅".green());
    } else {
        println!("   {} Expected {}, found {}", "❌".red(), count, hits);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_language_needs_no_server() {
        // Nothing listens on this port; a provider call would fail.
        let translator = cli_translator("http://127.0.0.1:9".into(), None).unwrap();
        let en = parse_language("en").unwrap();
        let request = TranslationRequest::new("hello", en.clone(), en);

        let translation = translator.translate(&request).await.unwrap();

        assert_eq!(translation.text, "hello");
        assert_eq!(translation.provider, "passthrough");
    }

    #[test]
    fn test_cli_translator_rejects_bad_url() {
        assert!(cli_translator("ftp://example.com".into(), None).is_err());
    }
}
