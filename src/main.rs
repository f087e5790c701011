//! dutil command line
//!
//! Checksums, sealed pack/unpack of files and path enumeration over TOML
//! graph descriptions, all backed by the dutil toolkit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dutil::commands::{self, Order};
use dutil::AppConfig;

fn cli() -> Command {
    Command::new("dutil")
        .version(dutil::VERSION)
        .about("Pooled data-structure toolkit utilities.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Configuration file path")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .global(true)
                .help("Log level (trace, debug, info, warn, error)")
        )
        .subcommand(
            Command::new("checksum")
                .about("Print the 32-bit checksum of a file")
                .arg(Arg::new("file").value_name("FILE").required(true))
        )
        .subcommand(
            Command::new("pack")
                .about("Seal a file into base64 text")
                .arg(Arg::new("file").value_name("FILE").required(true))
        )
        .subcommand(
            Command::new("unpack")
                .about("Verify and restore a packed file")
                .arg(Arg::new("packed").value_name("B64_FILE").required(true))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("DIR")
                        .help("Directory to restore into (default: current directory)")
                )
        )
        .subcommand(
            Command::new("paths")
                .about("Enumerate paths between two vertices of a TOML graph")
                .arg(Arg::new("graph").value_name("GRAPH_TOML").required(true))
                .arg(Arg::new("from").long("from").value_name("VERTEX").required(true))
                .arg(Arg::new("to").long("to").value_name("VERTEX").required(true))
                .arg(
                    Arg::new("breadth-first")
                        .long("breadth-first")
                        .action(ArgAction::SetTrue)
                        .help("Report shortest paths first")
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize))
                        .help("Stop after N paths")
                )
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Load configuration
    let mut config = if let Some(config_path) = matches.get_one::<String>("config") {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::load()?
    };

    // Apply CLI overrides
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
        config.validate()?;
    }

    dutil::init(&config)?;
    run(&matches, &config)
}

fn path_arg(matches: &ArgMatches, id: &str) -> Result<PathBuf> {
    matches
        .get_one::<String>(id)
        .map(PathBuf::from)
        .with_context(|| format!("Missing argument: {}", id))
}

fn run(matches: &ArgMatches, config: &AppConfig) -> Result<()> {
    match matches.subcommand() {
        Some(("checksum", sub)) => {
            println!("{}", commands::checksum_file(&path_arg(sub, "file")?)?);
        }
        Some(("pack", sub)) => {
            println!("{}", commands::pack(&path_arg(sub, "file")?, config)?);
        }
        Some(("unpack", sub)) => {
            let out = sub
                .get_one::<String>("out")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let restored = commands::unpack(&path_arg(sub, "packed")?, &out)?;
            println!("{}", restored.display());
        }
        Some(("paths", sub)) => {
            let graph = path_arg(sub, "graph")?;
            let from = sub.get_one::<String>("from").context("Missing argument: from")?;
            let to = sub.get_one::<String>("to").context("Missing argument: to")?;
            let order = if sub.get_flag("breadth-first") {
                Order::BreadthFirst
            } else {
                Order::DepthFirst
            };
            let limit = sub.get_one::<usize>("limit").copied();

            for path in commands::paths(&graph, from, to, order, limit, config)? {
                println!("{}\t{}", path.weight, path.vertices.join(" -> "));
            }
        }
        other => anyhow::bail!("Unknown command: {:?}", other.map(|(name, _)| name)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_paths_arguments() {
        let matches = cli()
            .try_get_matches_from(["dutil", "--log-level", "debug", "paths", "g.toml", "--from", "a", "--to", "b", "--breadth-first", "--limit", "3"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("log-level").map(String::as_str), Some("debug"));
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "paths");
        assert!(sub.get_flag("breadth-first"));
        assert_eq!(sub.get_one::<usize>("limit"), Some(&3));
    }
}
