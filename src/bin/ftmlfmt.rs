//! ftmlfmt CLI tool
//!
//! Loads an FTML file, optionally validates it against a schema file,
//! and writes the canonically formatted result back out.
//!
//! Usage:
//!   ftmlfmt `<input-file>` [options]
//!
//! Options:
//!   --schema `<file>`    Validate against this schema before formatting
//!   --check           Exit non-zero if the file isn't already canonical
//!   --no-strict       Allow unknown fields/values when validating
//!   --write           Write the formatted result back to the input file

use clap::{Arg, ArgAction, Command};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use ftml::{dump, parse, Config, Schema, ValidateOptions};

fn main() -> ExitCode {
    let matches = Command::new("ftmlfmt")
        .version("0.1.0")
        .about("FTML format/validate CLI tool")
        .arg(Arg::new("input").help("Input FTML file").required(true).index(1))
        .arg(
            Arg::new("schema")
                .long("schema")
                .value_name("FILE")
                .help("Validate against this schema file before formatting"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Exit non-zero if the file isn't already canonical")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-strict")
                .long("no-strict")
                .help("Allow unknown fields/values when validating")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("write")
                .long("write")
                .help("Write the formatted result back to the input file")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let input_path = matches.get_one::<String>("input").expect("required");
    if !Path::new(input_path).exists() {
        eprintln!("Error: input file '{input_path}' does not exist");
        return ExitCode::FAILURE;
    }

    let source = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: failed to read '{input_path}': {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = Config::default();
    let parsed = match parse(&source, &config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut value = parsed.value.clone();

    if let Some(schema_path) = matches.get_one::<String>("schema") {
        let schema_text = match fs::read_to_string(schema_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: failed to read schema '{schema_path}': {e}");
                return ExitCode::FAILURE;
            }
        };
        let schema = match Schema::parse(&schema_text) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: invalid schema: {e}");
                return ExitCode::FAILURE;
            }
        };
        let opts = ValidateOptions {
            strict: !matches.get_flag("no-strict"),
            apply_defaults: true,
        };
        let errors = schema.validate(&mut value, &opts);
        if !errors.is_empty() {
            for err in &errors {
                eprintln!("validation error: {err}");
            }
            return ExitCode::FAILURE;
        }
    }

    let formatted = match dump(&value, Some(&parsed.doc), &config) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if matches.get_flag("check") {
        if formatted == source {
            return ExitCode::SUCCESS;
        }
        eprintln!("'{input_path}' is not canonically formatted");
        return ExitCode::FAILURE;
    }

    if matches.get_flag("write") {
        if let Err(e) = fs::write(input_path, &formatted) {
            eprintln!("Error: failed to write '{input_path}': {e}");
            return ExitCode::FAILURE;
        }
    } else {
        print!("{formatted}");
    }

    ExitCode::SUCCESS
}
