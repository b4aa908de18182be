//! Interactive test driver
//!
//! Starts the device on an in-process host, writes one line typed by the
//! user, waits for ENTER and prints what the device returns.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use msgdev_core::{start, AccessMode, DeviceConfig, MemoryHost, BUFFER_LENGTH};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "msgdev", about = "Write a line to the message device and read it back")]
struct Args {
    /// Path to the device node, e.g. /dev/msgdev
    device: String,

    /// TOML file with device_name / class_name
    #[arg(long)]
    config: Option<PathBuf>,
}

fn prompt_line(stdin: &mut impl BufRead, prompt: &str) -> Result<String> {
    println!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DeviceConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DeviceConfig::default(),
    };

    let host = Arc::new(MemoryHost::new());
    let handle = start(host.clone(), &config).context("failed to start the device")?;
    info!("device available at {}", handle.node_path());

    println!("Starting device test code example...");
    let file = host
        .open(&args.device, AccessMode::ReadWrite)
        .with_context(|| format!("failed to open the device {}", args.device))?;

    let mut stdin = io::stdin().lock();
    let line = prompt_line(&mut stdin, "Type in a short string to send to the device:")?;
    println!("Writing message to the device [{}].", line);
    file.write(line.as_bytes())
        .context("failed to write the message to the device")?;

    prompt_line(&mut stdin, "Press ENTER to read back from the device...")?;

    println!("Reading from the device...");
    let mut receive = [0u8; BUFFER_LENGTH];
    let n = file
        .read(&mut receive)
        .context("failed to read the message from the device")?;
    println!(
        "The received message is: [{}]",
        String::from_utf8_lossy(&receive[..n])
    );

    file.close()?;
    handle.stop();
    println!("End of the program");
    Ok(())
}
