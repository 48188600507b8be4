#![deny(missing_docs)]

//! Command-line entry point for the emotion recognition service.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;
use moodlens::config::{self, ServiceConfig};
use moodlens::logging;
use moodlens::service::{ErrorResponse, InferenceService};

enum Command {
    Predict(PathBuf),
    Health,
    Info,
}

fn main() -> ExitCode {
    let mut config_path: Option<PathBuf> = None;
    let mut command: Option<Command> = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(value) => config_path = Some(PathBuf::from(value)),
                None => return usage_error("--config requires a path"),
            },
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" | "-V" => {
                println!("moodlens {}", moodlens::service::VERSION);
                return ExitCode::SUCCESS;
            }
            "predict" => match args.next() {
                Some(value) => command = Some(Command::Predict(PathBuf::from(value))),
                None => return usage_error("predict requires an audio file"),
            },
            "health" => command = Some(Command::Health),
            "info" => command = Some(Command::Info),
            other => return usage_error(&format!("unknown argument '{other}'")),
        }
    }
    let Some(command) = command else {
        print_help();
        return ExitCode::FAILURE;
    };

    let config = match config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logging::init(&config.logging) {
        eprintln!("Logging disabled: {err}");
    }

    match command {
        Command::Predict(path) => run_predict(config, &path),
        Command::Health => match InferenceService::start_or_degrade(config) {
            Ok(service) => print_json(&service.health()),
            Err(err) => {
                eprintln!("Failed to start service: {err}");
                ExitCode::FAILURE
            }
        },
        Command::Info => match InferenceService::from_parts(config, None) {
            Ok(service) => print_json(&service.info()),
            Err(err) => {
                eprintln!("Failed to start service: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_predict(config: ServiceConfig, path: &Path) -> ExitCode {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let service = match InferenceService::start(config) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("Failed to start service: {err}");
            return ExitCode::FAILURE;
        }
    };
    match service.predict_upload(&filename, &bytes) {
        Ok(response) => print_json(&response),
        Err(err) => {
            let response = ErrorResponse::from(&err);
            let _ = print_json(&response);
            eprintln!("Prediction failed with status {}", response.status_code);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Failed to serialize response: {err}");
            ExitCode::FAILURE
        }
    }
}

fn usage_error(message: &str) -> ExitCode {
    eprintln!("{message}");
    print_help();
    ExitCode::FAILURE
}

fn print_help() {
    println!("Usage: moodlens [--config <path>] <command>");
    println!();
    println!("Commands:");
    println!("  predict <file>   Predict emotion scores for an audio file");
    println!("  health           Report whether the model loads");
    println!("  info             Print service metadata");
}
