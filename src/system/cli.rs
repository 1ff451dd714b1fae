//! Command-line argument classification.
//!
//! Arguments are scanned left to right. Recognized flags are consumed, any
//! other dash-prefixed token aborts startup, and everything else is a file
//! name to open, kept in input order.

use crate::system::config::BuildFeatures;
use std::ffi::OsString;

pub const TEST_FILE_FLAG: &str = "--test-file";
pub const TEST_NO_EXIT_FLAG: &str = "--test-no-exit";
pub const DISABLE_SETTINGS_FLAG: &str = "--disable-settings";

/// Result of a successful argument scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArguments {
    /// Files to open, in command-line order
    pub file_names: Vec<String>,
    /// Skip loading and saving persisted settings
    pub disable_settings: bool,
    /// Scripted test to play after the main window is built
    pub test_file: Option<String>,
    /// Quit once the scripted test finishes
    pub test_exit_after_playback: bool,
}

impl Default for ParsedArguments {
    fn default() -> Self {
        Self {
            file_names: Vec::new(),
            disable_settings: false,
            test_file: None,
            test_exit_after_playback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// Dash-prefixed token that matches no known option
    UnknownOption(String),
    /// Test playback option given to a build without test playback
    TestingDisabled(String),
}

impl std::fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentError::UnknownOption(token) => write!(f, "Unknown command line option '{}'", token),
            ArgumentError::TestingDisabled(flag) => write!(f, "Avogadro called with {} but testing is disabled.", flag),
        }
    }
}

impl std::error::Error for ArgumentError {}

impl ArgumentError {
    pub fn exit_code(&self) -> i32 {
        crate::system::EXIT_FAILURE
    }
}

/// Classify `args` (program name already stripped).
///
/// Stops at the first error; no tokens after an offending one are looked at.
pub fn classify<S: AsRef<str>>(args: &[S], features: &BuildFeatures) -> Result<ParsedArguments, ArgumentError> {
    let mut parsed = ParsedArguments::default();
    let mut i = 0;

    while i < args.len() {
        let token = args[i].as_ref();

        // --test-file only matches when a value follows it
        if token == TEST_FILE_FLAG && i + 1 < args.len() {
            if !features.test_playback {
                return Err(ArgumentError::TestingDisabled(TEST_FILE_FLAG.to_string()));
            }
            parsed.test_file = Some(args[i + 1].as_ref().to_string());
            i += 2;
            continue;
        }

        if token == TEST_NO_EXIT_FLAG {
            if !features.test_playback {
                return Err(ArgumentError::TestingDisabled(TEST_NO_EXIT_FLAG.to_string()));
            }
            parsed.test_exit_after_playback = false;
        } else if token == DISABLE_SETTINGS_FLAG {
            parsed.disable_settings = true;
        } else if token.starts_with('-') {
            return Err(ArgumentError::UnknownOption(token.to_string()));
        } else {
            parsed.file_names.push(token.to_string());
        }
        i += 1;
    }

    Ok(parsed)
}

/// Turn raw process arguments into strings, replacing invalid UTF-8
/// sequences instead of failing. File names are passed through unchanged
/// when they are valid UTF-8.
pub fn lossy_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<String> {
    args.into_iter()
        .map(|arg| match arg.into_string() {
            Ok(arg) => arg,
            Err(raw) => {
                let lossy = raw.to_string_lossy().into_owned();
                log::warn!("Argument '{}' is not valid UTF-8", lossy);
                lossy
            }
        })
        .collect()
}
