//! ASV Export - command line entry point.
//!
//! # Execution Flow
//!
//! 1. Read the raw command line and parse flags with clap (`--help` / `--version`
//!    exit 0, bad flags exit -1)
//! 2. Resolve the application paths and open `ASV_Error.log`
//! 3. Install a panic hook that records `Unhandled Exception`
//! 4. Route the tokens and run the export inside `catch_unwind`
//! 5. Exit with 0 on success and -1 on any failure or panic
//!
//! # Invocation
//!
//! ```text
//! asvexport [--output <PATH>] [--cluster <DIR>] [--log-file <PATH>] [--debug]
//!           [--command-line <LINE>] <mode> [input] [outputOrCluster] [output]
//! ```

use asv_export::cli::{CliArgs, process_args};
use asv_export::services::{EXIT_FAILURE, EXIT_SUCCESS, dispatch};
use asv_export::{APP_NAME, AppPaths, SnapshotBackend, VERSION};
use clap::Parser;
use clap::error::ErrorKind;

fn main() {
    let args = match CliArgs::try_parse_from(process_args()) {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_FAILURE,
            };
            if code == EXIT_FAILURE {
                let paths = AppPaths::discover();
                if asv_export::logging::setup_logging(paths.log_file(), false).is_ok() {
                    tracing::error!("Invalid command line: {}", e.to_string().trim());
                }
            }
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let mut paths = AppPaths::discover();
    if let Some(log_file) = args.log_file.as_deref() {
        paths = paths.with_log_file(log_file);
    }

    if let Err(e) = asv_export::logging::setup_logging(paths.log_file(), args.debug) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }
    tracing::debug!("Starting {} v{}", APP_NAME, VERSION);

    let tokens = args.tokens();
    let overrides = args.overrides();
    let code = dispatch::run_guarded(&tokens, &overrides, &paths, SnapshotBackend::new());
    std::process::exit(code);
}
