use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use dropbox_store::{
    AccessToken, DropboxClient, DropboxConfig, Entry, RemoteStore, ACCESS_TOKEN_ENV,
};

const ROOT_LIST_LIMIT: u32 = 10;
const PROBE_LIST_LIMIT: u32 = 10;
const SHOWN_ENTRIES: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "dropbox-diagnose")]
#[command(about = "Check Dropbox credentials, connectivity and folder access", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Extra folder to test list access on (repeatable)
    #[arg(long = "probe", value_name = "PATH")]
    pub probes: Vec<String>,

    /// Override the Dropbox RPC base URL
    #[arg(long, env = "DROPBOX_API_URL")]
    pub api_url: Option<String>,

    /// Override the Dropbox content base URL
    #[arg(long, env = "DROPBOX_CONTENT_URL")]
    pub content_url: Option<String>,
}

impl Cli {
    fn dropbox_config(&self) -> DropboxConfig {
        let mut config = DropboxConfig::default();
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(url) = &self.content_url {
            config.content_base_url = url.clone();
        }
        config
    }
}

pub async fn main_entry() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let raw_token = std::env::var(ACCESS_TOKEN_ENV).ok();

    let mut stdout = io::stdout().lock();
    let ok = diagnose(raw_token.as_deref(), cli.dropbox_config(), &cli.probes, &mut stdout).await?;
    stdout.flush()?;
    drop(stdout);

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Full diagnostic run; `Ok(false)` when the token is unusable or the account check fails.
pub async fn diagnose(
    raw_token: Option<&str>,
    config: DropboxConfig,
    probes: &[String],
    out: &mut impl Write,
) -> Result<bool> {
    let token = match AccessToken::parse(raw_token) {
        Ok(token) => token,
        Err(err) => {
            log::debug!("token check failed: {err:?}");
            writeln!(out, "Token: error ({err})")?;
            return Ok(false);
        }
    };
    writeln!(out, "Token: found ({})", token.masked())?;

    let client = DropboxClient::new(token, config)?;
    Ok(check_store(&client, probes, out).await?)
}

/// Account, listing and space checks against an already constructed store.
pub async fn check_store(
    store: &dyn RemoteStore,
    probes: &[String],
    out: &mut impl Write,
) -> io::Result<bool> {
    match store.current_account().await {
        Ok(account) => writeln!(
            out,
            "Account: ok ({}, {})",
            account.email, account.name.display_name
        )?,
        Err(err) => {
            log::debug!("account check failed: {err:?}");
            writeln!(out, "Account: error ({err})")?;
            return Ok(false);
        }
    }

    writeln!(out)?;
    report_folder(store, "Root folder ('')", "", ROOT_LIST_LIMIT, out).await?;
    for probe in probes {
        report_folder(store, &format!("Folder '{probe}'"), probe, PROBE_LIST_LIMIT, out).await?;
    }

    writeln!(out)?;
    match store.space_usage().await {
        Ok(usage) => match usage.allocation.and_then(|a| a.allocated) {
            Some(allocated) => writeln!(
                out,
                "Space used: {} bytes of {allocated} bytes",
                usage.used
            )?,
            None => writeln!(out, "Space used: {} bytes", usage.used)?,
        },
        Err(err) => {
            log::debug!("space usage check failed: {err:?}");
            writeln!(out, "Space used: error ({err})")?
        }
    }

    Ok(true)
}

async fn report_folder(
    store: &dyn RemoteStore,
    label: &str,
    path: &str,
    limit: u32,
    out: &mut impl Write,
) -> io::Result<()> {
    let entries = match store.list_folder(path, limit).await {
        Ok(entries) => entries,
        Err(err) => {
            log::debug!("listing {path:?} failed: {err:?}");
            return writeln!(out, "{label}: error ({err})");
        }
    };

    writeln!(out, "{label}: ok ({} items)", entries.len())?;
    if entries.is_empty() {
        return writeln!(out, "  (empty)");
    }
    for entry in entries.iter().take(SHOWN_ENTRIES) {
        match entry {
            Entry::File(meta) => writeln!(out, "  - {} ({} bytes)", meta.name, meta.size)?,
            Entry::Folder(_) => writeln!(out, "  - {}/", entry.name())?,
            Entry::Deleted(_) => writeln!(out, "  - {} (deleted)", entry.name())?,
        }
    }
    if entries.len() > SHOWN_ENTRIES {
        writeln!(out, "  ... and {} more", entries.len() - SHOWN_ENTRIES)?;
    }
    Ok(())
}
