use crate::config::AppPaths;
use crate::models::SingleTarget;
use crate::models::config::directory_part;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Operation selected by the mode token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Consolidated content pack driven by a configuration file.
    Pack,
    /// Raw stored tribe records.
    ArkTribe,
    /// Raw stored player profile records.
    ArkProfile,
    /// Batch JSON export driven by a configuration file.
    Json,
    /// One export straight from a save file.
    Single(SingleTarget),
    Unrecognized(String),
}

impl Mode {
    /// Case-insensitive, surrounding whitespace ignored.
    pub fn parse(token: &str) -> Self {
        let mode = token.trim().to_lowercase();
        match mode.as_str() {
            "pack" => Self::Pack,
            "arktribe" => Self::ArkTribe,
            "arkprofile" => Self::ArkProfile,
            "json" => Self::Json,
            other => match SingleTarget::parse(other) {
                Some(target) => Self::Single(target),
                None => Self::Unrecognized(mode),
            },
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("No command line arguments provided")]
    NoArguments,
}

/// Named flags that take precedence over the positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub output: Option<String>,
    pub cluster_folder: Option<String>,
}

/// A fully interpreted command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedCommand {
    pub mode: Mode,
    /// Save file, or configuration file for `pack` and `json`.
    pub input: String,
    pub output: Option<String>,
    pub cluster_folder: String,
    /// Directory part of `output`, or the default export folder.
    pub export_folder: Utf8PathBuf,
}

/// Interpret tokens (program name first) as a command.
///
/// Positional layout:
///
/// | tokens | meaning |
/// |---|---|
/// | `prog mode` | no input |
/// | `prog mode input` | default output |
/// | `prog mode input output` | |
/// | `prog mode input cluster output` | |
///
/// With exactly four tokens the third argument is always the output, even when
/// the caller meant a cluster folder.
pub fn route(
    tokens: &[String],
    overrides: &Overrides,
    paths: &AppPaths,
) -> Result<RoutedCommand, RouteError> {
    if tokens.len() <= 1 {
        return Err(RouteError::NoArguments);
    }

    tracing::info!("ASV Command Line Started with {} parameters.", tokens.len());
    for (index, arg) in tokens.iter().enumerate() {
        tracing::info!("CommandLineArg-{} = {}", index, arg);
    }

    let mode = Mode::parse(&tokens[1]);
    let positional = |index: usize| tokens.get(index).map(|t| t.trim().replace('"', ""));

    let input = positional(2).unwrap_or_default();
    if !input.is_empty() {
        tracing::info!("Input filename: {}", input);
    }

    let (mut cluster_folder, mut output) = match tokens.len() {
        0..=3 => (None, None),
        4 => (None, positional(3)),
        _ => (positional(3), positional(4)),
    };

    if overrides.output.is_some() {
        output = overrides.output.clone();
    }
    if overrides.cluster_folder.is_some() {
        cluster_folder = overrides.cluster_folder.clone();
    }

    let export_folder = match output.as_deref() {
        Some(out) => {
            tracing::info!("Export filename: {}", out);
            match directory_part(out) {
                "" => Utf8PathBuf::from("."),
                dir => Utf8PathBuf::from(dir),
            }
        }
        None => paths.export_dir().to_path_buf(),
    };

    let cluster_folder = cluster_folder.unwrap_or_default();
    if !cluster_folder.is_empty() {
        tracing::info!("Cluster folder: {}", cluster_folder);
    }

    Ok(RoutedCommand {
        mode,
        input,
        output,
        cluster_folder,
        export_folder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn paths() -> AppPaths {
        AppPaths::new("/opt/asv")
    }

    #[test]
    fn test_no_arguments() {
        let result = route(&tokens(&["asvexport"]), &Overrides::default(), &paths());
        assert_eq!(result, Err(RouteError::NoArguments));
        let result = route(&[], &Overrides::default(), &paths());
        assert_eq!(result, Err(RouteError::NoArguments));
    }

    #[test]
    fn test_mode_is_case_insensitive() {
        assert_eq!(Mode::parse(" PACK "), Mode::Pack);
        assert_eq!(Mode::parse("ArkTribe"), Mode::ArkTribe);
        assert_eq!(Mode::parse("Tamed"), Mode::Single(SingleTarget::Tamed));
        assert_eq!(Mode::parse("bogus"), Mode::Unrecognized("bogus".to_string()));
    }

    #[test]
    fn test_mode_only() {
        let cmd = route(&tokens(&["asvexport", "json"]), &Overrides::default(), &paths()).unwrap();
        assert_eq!(cmd.mode, Mode::Json);
        assert!(cmd.input.is_empty());
        assert_eq!(cmd.output, None);
        assert_eq!(cmd.export_folder, Utf8PathBuf::from("/opt/asv/Export"));
    }

    #[test]
    fn test_input_only_uses_default_folder() {
        let cmd = route(
            &tokens(&["asvexport", "tribes", "TheIsland.ark"]),
            &Overrides::default(),
            &paths(),
        )
        .unwrap();
        assert_eq!(cmd.input, "TheIsland.ark");
        assert_eq!(cmd.output, None);
        assert_eq!(cmd.export_folder, Utf8PathBuf::from("/opt/asv/Export"));
    }

    #[test]
    fn test_four_tokens_third_is_output() {
        let cmd = route(
            &tokens(&["asvexport", "tribes", "TheIsland.ark", "/out/tribes.json"]),
            &Overrides::default(),
            &paths(),
        )
        .unwrap();
        assert_eq!(cmd.output.as_deref(), Some("/out/tribes.json"));
        assert!(cmd.cluster_folder.is_empty());
        assert_eq!(cmd.export_folder, Utf8PathBuf::from("/out"));
    }

    #[test]
    fn test_five_tokens_third_is_cluster() {
        let cmd = route(
            &tokens(&["asvexport", "all", "TheIsland.ark", "/cluster", r"C:\export\"]),
            &Overrides::default(),
            &paths(),
        )
        .unwrap();
        assert_eq!(cmd.cluster_folder, "/cluster");
        assert_eq!(cmd.output.as_deref(), Some(r"C:\export\"));
        assert_eq!(cmd.export_folder, Utf8PathBuf::from(r"C:\export"));
    }

    #[test]
    fn test_output_without_folder() {
        let cmd = route(
            &tokens(&["asvexport", "wild", "TheIsland.ark", "wild.json"]),
            &Overrides::default(),
            &paths(),
        )
        .unwrap();
        assert_eq!(cmd.export_folder, Utf8PathBuf::from("."));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            output: Some("/named/out.json".to_string()),
            cluster_folder: Some("/named/cluster".to_string()),
        };
        let cmd = route(
            &tokens(&["asvexport", "tamed", "TheIsland.ark", "/positional/out.json"]),
            &overrides,
            &paths(),
        )
        .unwrap();
        assert_eq!(cmd.output.as_deref(), Some("/named/out.json"));
        assert_eq!(cmd.cluster_folder, "/named/cluster");
        assert_eq!(cmd.export_folder, Utf8PathBuf::from("/named"));
    }
}
