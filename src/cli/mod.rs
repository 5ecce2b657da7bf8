//! Command line handling.
//!
//! - [`args`]: clap flags plus the raw positional arguments
//! - [`tokenizer`]: quote-aware splitting of raw command lines
//! - [`router`]: positional grammar to a [`RoutedCommand`]

pub mod args;
pub mod router;
pub mod tokenizer;

pub use args::CliArgs;
pub use router::{Mode, Overrides, RouteError, RoutedCommand, route};
pub use tokenizer::{normalize_args, tokenize};

/// Token 0 of every invocation.
pub const PROGRAM_TOKEN: &str = "asvexport";

/// The process arguments, program name first.
///
/// On Windows the raw command line is split with [`tokenize`], so a quoted
/// path ending in a backslash (`"C:\out\"`) stays one argument instead of
/// swallowing the arguments after it.
pub fn process_args() -> Vec<String> {
    let tokens = raw_command_line()
        .map(|line| tokenize(&line))
        .unwrap_or_default();
    if !tokens.is_empty() {
        return tokens;
    }

    std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[cfg(windows)]
fn raw_command_line() -> Option<String> {
    use windows_sys::Win32::System::Environment::GetCommandLineW;

    // SAFETY: GetCommandLineW returns a NUL-terminated buffer owned by the
    // process that stays valid until exit.
    unsafe {
        let line = GetCommandLineW() as *const u16;
        if line.is_null() {
            return None;
        }
        let mut len = 0;
        while *line.add(len) != 0 {
            len += 1;
        }
        Some(String::from_utf16_lossy(std::slice::from_raw_parts(line, len)))
    }
}

#[cfg(not(windows))]
fn raw_command_line() -> Option<String> {
    None
}

impl CliArgs {
    /// Invocation tokens, program name first.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = vec![PROGRAM_TOKEN.to_string()];
        match self.command_line.as_deref() {
            Some(line) => tokens.extend(normalize_args(tokenize(line))),
            None => tokens.extend(normalize_args(&self.args)),
        }
        tokens
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            output: self.output.clone(),
            cluster_folder: self.cluster.clone(),
        }
    }
}
