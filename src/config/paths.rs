use camino::{Utf8Path, Utf8PathBuf};

/// Environment variable that relocates the application directory.
pub const HOME_ENV_VAR: &str = "ASV_EXPORT_HOME";

/// Folder (under the application directory) that receives default exports.
pub const EXPORT_DIR_NAME: &str = "Export";

/// Append-only diagnostics log (under the application directory).
pub const LOG_FILE_NAME: &str = "ASV_Error.log";

/// Locations derived from the application directory.
///
/// The application directory is the folder holding the executable, so default
/// exports and the error log land next to the tool regardless of the caller's
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    base_dir: Utf8PathBuf,
    export_dir: Utf8PathBuf,
    log_file: Utf8PathBuf,
}

impl AppPaths {
    pub fn new<P: Into<Utf8PathBuf>>(base_dir: P) -> Self {
        let base_dir = base_dir.into();
        Self {
            export_dir: base_dir.join(EXPORT_DIR_NAME),
            log_file: base_dir.join(LOG_FILE_NAME),
            base_dir,
        }
    }

    /// Resolve the application directory from `ASV_EXPORT_HOME`, then the
    /// executable's folder, then the working directory.
    pub fn discover() -> Self {
        if let Ok(home) = std::env::var(HOME_ENV_VAR) {
            if !home.trim().is_empty() {
                return Self::new(home.trim());
            }
        }

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| Utf8PathBuf::try_from(exe).ok())
            .and_then(|exe| exe.parent().map(Utf8Path::to_path_buf));

        Self::new(exe_dir.unwrap_or_else(|| Utf8PathBuf::from(".")))
    }

    /// Replace the log file location, keeping the other paths.
    pub fn with_log_file<P: Into<Utf8PathBuf>>(mut self, log_file: P) -> Self {
        self.log_file = log_file.into();
        self
    }

    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    pub fn export_dir(&self) -> &Utf8Path {
        &self.export_dir
    }

    pub fn log_file(&self) -> &Utf8Path {
        &self.log_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_from_base() {
        let paths = AppPaths::new("/opt/asv");
        assert_eq!(paths.export_dir(), Utf8Path::new("/opt/asv/Export"));
        assert_eq!(paths.log_file(), Utf8Path::new("/opt/asv/ASV_Error.log"));
        assert_eq!(paths.base_dir(), Utf8Path::new("/opt/asv"));
    }

    #[test]
    fn test_log_file_override() {
        let paths = AppPaths::new("/opt/asv").with_log_file("/var/log/asv.log");
        assert_eq!(paths.log_file(), Utf8Path::new("/var/log/asv.log"));
        assert_eq!(paths.export_dir(), Utf8Path::new("/opt/asv/Export"));
    }
}
