use clap::Parser;

/// Command line arguments for asvexport
///
/// The mode and its positional arguments are collected verbatim and handed to
/// the router, which keeps the historical positional layout.
#[derive(Parser, Debug, Default)]
#[command(
    name = "asvexport",
    version = env!("CARGO_PKG_VERSION"),
    about = "Export ARK save game content to JSON and content packs",
    long_about = "Export ARK save game content to JSON and content packs.\n\n\
        Modes: pack | arktribe | arkprofile | json | all | map | structures | logs |\n\
        tribes | players | wild | tamed\n\n\
        Usage: asvexport <mode> [input] [outputOrClusterFolder] [output]"
)]
pub struct CliArgs {
    /// Output path (takes precedence over the positional output)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Cluster data folder (takes precedence over the positional cluster folder)
    #[arg(long)]
    pub cluster: Option<String>,

    /// Log file location (defaults to ASV_Error.log next to the executable)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Complete command line as a single string, split with double-quote grouping
    #[arg(long, value_name = "LINE", conflicts_with = "args")]
    pub command_line: Option<String>,

    /// Mode followed by its positional arguments
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}
