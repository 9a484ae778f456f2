//! Mixdown CLI - run mastering, encode and archive requests from the command line
//!
//! ```text
//! mixdown [--config <path>] master <request.yaml|request.json>
//! mixdown [--config <path>] encode <request.yaml|request.json>
//! mixdown [--config <path>] archive <request.yaml|request.json>
//! mixdown [--config <path>] init-config
//! ```
//!
//! Responses are printed to stdout as JSON. Set RUST_LOG=debug for verbose
//! logging on stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use mixdown_core::config::{default_config_path, load_config, read_document, save_config, ServiceConfig};
use mixdown_core::services::{
    ArchiveService, EncodeRequest, EncodeService, MasterRequest, MasterService, ZipRequest,
};

const USAGE: &str = "usage: mixdown [--config <path>] <master|encode|archive> <request-file>\n       mixdown [--config <path>] init-config";

#[derive(Debug, PartialEq)]
enum Command {
    Master(PathBuf),
    Encode(PathBuf),
    Archive(PathBuf),
    InitConfig,
    Help,
}

#[derive(Debug, PartialEq)]
struct CliArgs {
    config_path: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                return Ok(CliArgs {
                    config_path,
                    command: Command::Help,
                })
            }
            other if other.starts_with('-') => bail!("unknown option '{}'", other),
            other => positional.push(other),
        }
    }

    let command = match positional.as_slice() {
        ["master", file] => Command::Master(PathBuf::from(file)),
        ["encode", file] => Command::Encode(PathBuf::from(file)),
        ["archive", file] => Command::Archive(PathBuf::from(file)),
        ["init-config"] => Command::InitConfig,
        [] => Command::Help,
        _ => bail!("unexpected arguments: {}", positional.join(" ")),
    };

    Ok(CliArgs {
        config_path,
        command,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize response")?;
    println!("{}", json);
    Ok(())
}

fn run(cli: CliArgs) -> Result<()> {
    let config_path = cli.config_path.unwrap_or_else(default_config_path);

    match cli.command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::InitConfig => {
            if config_path.exists() {
                bail!("config already exists at {:?}", config_path);
            }
            save_config(&ServiceConfig::default(), &config_path)?;
            println!("{}", config_path.display());
            Ok(())
        }
        Command::Master(request_path) => {
            let config: ServiceConfig = load_config(&config_path);
            let request: MasterRequest = read_document(&request_path)?;
            let service = MasterService::from_config(&config)?;
            let response = service
                .process(&request)
                .with_context(|| format!("Mastering {:?} failed", request_path))?;
            print_json(&response)
        }
        Command::Encode(request_path) => {
            let config: ServiceConfig = load_config(&config_path);
            let request: EncodeRequest = read_document(&request_path)?;
            let service = EncodeService::from_config(&config)?;
            let response = service
                .process(&request)
                .with_context(|| format!("Encoding {:?} failed", request_path))?;
            print_json(&response)
        }
        Command::Archive(request_path) => {
            let config: ServiceConfig = load_config(&config_path);
            let request: ZipRequest = read_document(&request_path)?;
            let service = ArchiveService::from_config(&config)?;
            let response = service
                .process(&request)
                .with_context(|| format!("Archiving {:?} failed", request_path))?;
            print_json(&response)
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean JSON
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {:#}\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
