use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use litefs::cli::{Cli, Command};
use litefs::logging::set_up_logging;
use litefs::path_ops::{self, EntryKind};
use litefs::{Bridge, Config, FileAccess, HostConstants};

fn main() -> Result<()> {
    set_up_logging();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve => serve(&config),
        Command::Constants => print_json(&HostConstants::load(&config)?),
        Command::Stat { path } => print_json(&path_ops::stat(&path)),
        Command::Exists { path } => print_json(&path_ops::exists(&path)),
        Command::Ls { path } => print_json(&path_ops::readdir(&path)?),
        Command::Rm { path } => Ok(path_ops::remove(&path)?),
        Command::Mv { src, dst } => print_json(&path_ops::rename(&src, &dst)?),
        Command::Cp { src, dst } => {
            print_json(&path_ops::copy(&src, &dst, config.copy_buffer_size)?)
        }
        Command::Touch { path, parents } => print_json(&path_ops::touch(&path, parents)?),
        Command::Mkdir { path, parents } => print_json(&path_ops::mkdir(&path, parents)?),
        Command::Cat { path, chunk } => cat(&config, &path, chunk),
    }
}

fn serve(config: &Config) -> Result<()> {
    let constants = HostConstants::load(config).context("failed to load host constants")?;
    let bridge = Bridge::new(config, constants);
    let stdin = io::stdin();
    let stdout = io::stdout();
    bridge.serve(stdin.lock(), stdout.lock())?;
    Ok(())
}

fn cat(config: &Config, path: &Path, chunk: i64) -> Result<()> {
    anyhow::ensure!(chunk > 0, "chunk size must be positive");
    anyhow::ensure!(
        path_ops::exists(path) == EntryKind::File,
        "not a regular file: {}",
        path.display()
    );
    let access = FileAccess::new(config.hex_decode);
    let fd = access.open(path)?;
    let mut out = io::stdout().lock();
    loop {
        let hex = access.read(fd, chunk)?;
        if hex.is_empty() {
            break;
        }
        out.write_all(hex.as_bytes())?;
    }
    writeln!(out)?;
    access.close(fd)?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).context("failed to encode output")?;
    writeln!(out)?;
    Ok(())
}
