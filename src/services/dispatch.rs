use super::export::{ExportError, ExportService, require_input};
use super::extraction::{extract_profiles, extract_tribes};
use crate::cli::{Mode, Overrides, RouteError, route};
use crate::config::AppPaths;
use crate::content::SaveGameBackend;
use crate::logging::log_failure;
use anyhow::Result;
use std::panic::{self, AssertUnwindSafe};

/// Exit code for a successful run.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for every kind of failure.
pub const EXIT_FAILURE: i32 = -1;

/// Route the invocation and run the selected export.
///
/// `tokens` starts with the program name.
pub fn run<B: SaveGameBackend>(
    tokens: &[String],
    overrides: &Overrides,
    paths: &AppPaths,
    backend: B,
) -> Result<()> {
    let command = route(tokens, overrides, paths)?;
    let service = ExportService::new(backend, paths.clone());

    match &command.mode {
        Mode::Pack => {
            service.export_pack(&command.input)?;
        }
        Mode::Json => {
            let report = service.export_batch(&command.input)?;
            if report.has_failures() {
                return Err(ExportError::TargetsFailed {
                    failed: report.failed(),
                    attempted: report.exported() + report.failed(),
                }
                .into());
            }
        }
        Mode::ArkTribe => {
            extract_tribes(service.backend(), &command.input, &command.export_folder)?;
        }
        Mode::ArkProfile => {
            extract_profiles(service.backend(), &command.input, &command.export_folder)?;
        }
        Mode::Single(target) => {
            service.export_single(*target, &command)?;
        }
        Mode::Unrecognized(mode) => {
            require_input(&command.input)?;
            return Err(ExportError::UnrecognizedMode(mode.clone()).into());
        }
    }

    service.metrics().log_summary();
    Ok(())
}

/// Record panics as `Unhandled Exception` with the panic location and a backtrace.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        tracing::error!(
            exception = %info,
            stack_trace = %std::backtrace::Backtrace::force_capture(),
            "Unhandled Exception"
        );
    }));
}

/// [`run`] behind the process boundary: failures are logged and a panic
/// anywhere in the export becomes [`EXIT_FAILURE`].
pub fn run_guarded<B: SaveGameBackend>(
    tokens: &[String],
    overrides: &Overrides,
    paths: &AppPaths,
    backend: B,
) -> i32 {
    install_panic_hook();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run(tokens, overrides, paths, backend)
    }));

    match outcome {
        Ok(result) => exit_code(&result),
        Err(_) => EXIT_FAILURE,
    }
}

/// Log a failed run. Expected failures get a plain record, anything else the
/// full exception sections.
pub fn report_failure(error: &anyhow::Error) {
    if let Some(e) = error.downcast_ref::<RouteError>() {
        tracing::error!("{}", e);
    } else if let Some(e) = error.downcast_ref::<ExportError>() {
        match e {
            ExportError::InputNotFound(_)
            | ExportError::UnrecognizedMode(_)
            | ExportError::TargetsFailed { .. } => tracing::error!("{}", e),
            _ => log_failure("Export failed", error),
        }
    } else {
        log_failure("Export failed", error);
    }
}

/// Map a run result to the process exit code, logging any failure.
pub fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            report_failure(e);
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{
        ContentContainer, ContentError, LoadRequest, MockSaveGameBackend, ReadingOptions,
        StoredRecords,
    };
    use crate::logging::DiagnosticsLayer;
    use tracing_subscriber::layer::SubscriberExt;
    use camino::{Utf8Path, Utf8PathBuf};
    use std::fs;
    use tempfile::TempDir;

    fn temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        (temp, path)
    }

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_arguments_fails() {
        let (_temp, dir) = temp_dir();
        let mut backend = MockSaveGameBackend::new();
        backend.expect_load().never();

        let result = run(
            &tokens(&["asvexport"]),
            &Overrides::default(),
            &AppPaths::new(&dir),
            backend,
        );
        assert!(result.as_ref().unwrap_err().downcast_ref::<RouteError>().is_some());
        assert_eq!(exit_code(&result), EXIT_FAILURE);
    }

    #[test]
    fn test_unrecognized_mode_with_existing_input_never_loads() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, "{}").unwrap();

        let mut backend = MockSaveGameBackend::new();
        backend.expect_load().never();
        backend.expect_read_archive().never();

        let result = run(
            &tokens(&["asvexport", "frobnicate", save.as_str()]),
            &Overrides::default(),
            &AppPaths::new(&dir),
            backend,
        );
        let err = result.as_ref().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::UnrecognizedMode(mode)) if mode == "frobnicate"
        ));
        assert_eq!(exit_code(&result), EXIT_FAILURE);
    }

    #[test]
    fn test_unrecognized_mode_with_missing_input() {
        let (_temp, dir) = temp_dir();
        let result = run(
            &tokens(&["asvexport", "frobnicate", dir.join("missing.ark").as_str()]),
            &Overrides::default(),
            &AppPaths::new(&dir),
            MockSaveGameBackend::new(),
        );
        assert!(matches!(
            result.unwrap_err().downcast_ref::<ExportError>(),
            Some(ExportError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_single_mode_success() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, "{}").unwrap();

        let mut backend = MockSaveGameBackend::new();
        backend
            .expect_load()
            .times(1)
            .returning(|_| Ok(ContentContainer::default()));

        let out = dir.join("out").join("players.json");
        let result = run(
            &tokens(&["asvexport", "PLAYERS", save.as_str(), out.as_str()]),
            &Overrides::default(),
            &AppPaths::new(&dir),
            backend,
        );
        assert_eq!(exit_code(&result), EXIT_SUCCESS);
        assert!(out.is_file());
    }

    #[test]
    fn test_arkprofile_uses_export_folder() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, "{}").unwrap();

        let mut backend = MockSaveGameBackend::new();
        backend
            .expect_read_archive()
            .withf(|_, options| options.stored_profiles)
            .times(1)
            .returning(|_, _| Ok(StoredRecords::default()));

        let result = run(
            &tokens(&["asvexport", "arkprofile", save.as_str()]),
            &Overrides::default(),
            &AppPaths::new(&dir),
            backend,
        );
        assert!(result.is_ok());
        assert!(dir.join("Export").is_dir());
    }

    struct PanickingBackend;

    impl SaveGameBackend for PanickingBackend {
        fn load(&self, _request: &LoadRequest) -> Result<ContentContainer, ContentError> {
            panic!("corrupt save header")
        }

        fn read_archive(
            &self,
            _save_file: &Utf8Path,
            _options: &ReadingOptions,
        ) -> Result<StoredRecords, ContentError> {
            panic!("corrupt save header")
        }
    }

    #[test]
    fn test_panicking_backend_maps_to_failure_and_is_logged() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, "{}").unwrap();
        let log_file = dir.join("ASV_Error.log");

        let layer = DiagnosticsLayer::open(&log_file, false).unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);
        let code = tracing::subscriber::with_default(subscriber, || {
            run_guarded(
                &tokens(&["asvexport", "tribes", save.as_str()]),
                &Overrides::default(),
                &AppPaths::new(&dir),
                PanickingBackend,
            )
        });

        assert_eq!(code, EXIT_FAILURE);
        let text = fs::read_to_string(&log_file).unwrap();
        assert!(text.contains("] Unhandled Exception\n"));
        assert!(text.contains("Exception: "));
        assert!(text.contains("corrupt save header"));
        assert!(text.contains("Stack Trace: "));
    }

    #[test]
    fn test_guarded_run_success_exit_code() {
        let (_temp, dir) = temp_dir();
        let save = dir.join("TheIsland.ark");
        fs::write(&save, "{}").unwrap();

        let mut backend = MockSaveGameBackend::new();
        backend
            .expect_load()
            .times(1)
            .returning(|_| Ok(ContentContainer::default()));

        let code = run_guarded(
            &tokens(&["asvexport", "tribes", save.as_str(), dir.join("t.json").as_str()]),
            &Overrides::default(),
            &AppPaths::new(&dir),
            backend,
        );
        assert_eq!(code, EXIT_SUCCESS);
    }
}
