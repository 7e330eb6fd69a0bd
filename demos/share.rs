//! Example: browse a Baidu Netdisk share
//!
//! Usage:
//!   cargo run --example share -- --cookie "BDUSS=..." --surl 1AbCdEf [--pwd wxyz] [--path /dir]
//!   cargo run --example share -- --cookie "BDUSS=..." --surl 1AbCdEf --link FSID

use clap::Parser;
use panshare::{ClientOptions, ShareConfig, ShareDriver};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "List a Baidu Netdisk share or resolve a direct link")]
struct Args {
    /// Cookie string of a logged-in account (must contain BDUSS)
    #[arg(long, env = "PANSHARE_COOKIE")]
    cookie: String,

    /// Share short URL token
    #[arg(long)]
    surl: String,

    /// Share password
    #[arg(long, default_value = "")]
    pwd: String,

    /// Directory to list
    #[arg(long, default_value = "/")]
    path: String,

    /// Resolve a direct link for this file id instead of listing
    #[arg(long, value_name = "FSID")]
    link: Option<String>,

    /// HTTP proxy
    #[arg(long)]
    proxy: Option<String>,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("panshare=debug"));
    fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();

    let mut options = ClientOptions::default();
    if let Some(proxy) = &args.proxy {
        options = options.with_proxy(proxy);
    }
    let config = ShareConfig::new(&args.surl, &args.pwd, &args.cookie);
    let driver = match ShareDriver::new(config, options) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Failed to create driver: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(fsid) = &args.link {
        match driver.link(fsid).await {
            Ok(link) => {
                println!("URL: {}", link.url);
                println!("User-Agent: {}", link.user_agent);
            }
            Err(e) => {
                eprintln!("Failed to resolve link: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    match driver.list(&args.path).await {
        Ok(entries) => {
            println!("{} entries in {}", entries.len(), args.path);
            println!();
            for entry in entries {
                let kind = if entry.is_folder() { "d" } else { "-" };
                println!(
                    "{} {:>12} {:<20} {} {}",
                    kind,
                    entry.size,
                    entry.id,
                    entry.checksum.as_deref().unwrap_or("-"),
                    entry.path
                );
            }
        }
        Err(e) => {
            eprintln!("Failed to list {}: {}", args.path, e);
            std::process::exit(1);
        }
    }
}
