use clap::Parser;
use pbit_converter::{Cli, ConverterError, UserFriendlyError};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let converter = match pbit_converter::converter_from_cli(&cli) {
        Ok(converter) => converter,
        Err(e) => {
            print_fatal_error(&e);
            return exit_code_for(&e);
        }
    };

    // Per-item failures are already in the log and never change the exit code
    match converter.run() {
        Ok(_) => 0,
        Err(e) => {
            converter.logger().error(&e.user_message());
            if let Some(suggestion) = e.suggestion() {
                converter.logger().error(&format!("Suggestion: {}", suggestion));
            }
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &ConverterError) -> i32 {
    match error {
        ConverterError::ToolNotFound { .. } => 3,
        ConverterError::Config { .. } => 2,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "pbit-converter.toml".to_string());

    match pbit_converter::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!(
                "  pbit-converter -r <reports> -o <output> -t <temp> --cli-path <dir> --core-path <dir> --config {}",
                config_path
            );
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_fatal_error(error: &ConverterError) {
    eprintln!("Error: {}", error.user_message());
    if let Some(suggestion) = error.suggestion() {
        eprintln!("Suggestion: {}", suggestion);
    }
}
