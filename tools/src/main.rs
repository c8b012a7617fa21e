use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use backend::ServiceConfig;
use clap::{Parser, Subcommand};
use glob::Pattern;
use lens_tools::{inspect_payload, scenario_payloads};

#[derive(Parser)]
#[command(
    name = "lens-tools",
    version,
    about = "photon-lens inspection and replay tools"
)]
struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect the structure of captured payload files.
    Inspect {
        /// Payload file or directory of payload files.
        payload_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Emit the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Replay payload files through a full service pipeline.
    Replay {
        /// Payload file or directory of payload files.
        payload_path: PathBuf,
        /// Optional glob filter when replaying a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Path to the items JSON asset for loot name resolution.
        #[arg(long)]
        items: Option<PathBuf>,
        /// Catalogue every observed event code.
        #[arg(long)]
        discovery: bool,
        /// Save the discovery catalogue to this file at the end.
        #[arg(long)]
        save_discovery: Option<PathBuf>,
        /// Emit events as JSON lines instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Write the documented wire-scenario fixtures to a directory.
    MakeFixtures {
        /// Output directory (created if needed).
        #[arg(default_value = "fixtures")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Command::Inspect {
            payload_path,
            glob,
            json,
        } => {
            for path in collect_payload_files(&payload_path, glob.as_deref())? {
                let bytes = fs::read(&path)
                    .with_context(|| format!("read payload {}", path.display()))?;
                let report = inspect_payload(&bytes);
                println!("== {} ({} bytes) ==", path.display(), bytes.len());
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_inspect_report(&report);
                }
            }
        }
        Command::Replay {
            payload_path,
            glob,
            items,
            discovery,
            save_discovery,
            json,
        } => {
            let mut config = ServiceConfig::new().discovery(discovery);
            if let Some(items) = items {
                config = config.item_index_path(items);
            }
            if let Some(path) = &save_discovery {
                config = config.discovery_output(path.clone());
            }
            let service = config.start().context("start service")?;
            let events = service.events();

            let src = IpAddr::V4(Ipv4Addr::LOCALHOST);
            for path in collect_payload_files(&payload_path, glob.as_deref())? {
                let bytes = fs::read(&path)
                    .with_context(|| format!("read payload {}", path.display()))?;
                service.feed(&bytes, src, src, backend::PORT_GAME, 0);

                for event in events.try_iter() {
                    if json {
                        println!("{}", serde_json::to_string(&event)?);
                    } else {
                        println!("[{}] {}", event.kind, event.message);
                    }
                }
            }

            // Let the sink drain before summarizing.
            while let Ok(event) = events.recv_timeout(Duration::from_millis(10)) {
                if json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    println!("[{}] {}", event.kind, event.message);
                }
            }

            println!("{}", service.stats_summary());
            let session = service.session();
            println!(
                "Session: fame {} | silver {} | kills {} | deaths {} | loot {}",
                session.fame, session.silver, session.kills, session.deaths, session.loot
            );
            service.stop();
        }
        Command::MakeFixtures { out_dir } => {
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("create {}", out_dir.display()))?;
            for scenario in scenario_payloads() {
                let path = out_dir.join(format!("{}.bin", scenario.name));
                fs::write(&path, &scenario.bytes)
                    .with_context(|| format!("write {}", path.display()))?;
                println!(
                    "{} ({} bytes) - {}",
                    path.display(),
                    scenario.bytes.len(),
                    scenario.description
                );
            }
        }
    }
    Ok(())
}

fn collect_payload_files(path: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let pattern = glob
        .map(Pattern::new)
        .transpose()
        .context("invalid glob pattern")?;

    let mut files = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("read dir {}", path.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !pattern.matches_path(&path) && !matches_name {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

fn print_inspect_report(report: &lens_tools::InspectReport) {
    let Some(header) = &report.header else {
        println!("  too short for a packet header");
        return;
    };
    println!(
        "  peer: {} flags: 0x{:02X} commands: {} encrypted: {} crc: {}",
        header.peer_id, header.flags, header.command_count, header.encrypted, header.crc_enabled
    );
    for command in &report.commands {
        let mut line = format!(
            "  {} (type {}): {} bytes, seq {}",
            command.kind, command.command_type, command.length, command.sequence_number
        );
        if let Some(message) = &command.message {
            line.push_str(&format!(
                " | message type {} code {} params {}",
                message.message_type, message.code, message.param_count
            ));
        }
        println!("{line}");
    }
}
