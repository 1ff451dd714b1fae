//! Scripted UI test playback.
//!
//! A test script holds one remote command per line; blank lines and lines
//! starting with `#` are skipped. Commands run in order against the main
//! window, exactly as if they had arrived over the remote listener.

use crate::remote::protocol::{execute, parse_command, RemoteCommand, RemoteResponse};
use crate::remote::RemoteTarget;
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum PlaybackError {
    /// Script file could not be read
    Io(std::io::Error),
    /// Line could not be parsed as a command (1-based line number)
    Parse { line: usize, message: String },
}

impl std::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackError::Io(e) => write!(f, "Failed to read test file: {}", e),
            PlaybackError::Parse { line, message } => write!(f, "Line {}: {}", line, message),
        }
    }
}

impl std::error::Error for PlaybackError {}

impl From<std::io::Error> for PlaybackError {
    fn from(err: std::io::Error) -> Self {
        PlaybackError::Io(err)
    }
}

pub fn parse_script(text: &str) -> Result<Vec<RemoteCommand>, PlaybackError> {
    let mut commands = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let cmd = parse_command(line).map_err(|message| PlaybackError::Parse { line: idx + 1, message })?;
        commands.push(cmd);
    }
    Ok(commands)
}

pub fn load_script(path: &Path) -> Result<Vec<RemoteCommand>, PlaybackError> {
    let text = fs::read_to_string(path)?;
    parse_script(&text)
}

/// Run every command, returning the responses in order
pub fn play<T: RemoteTarget + ?Sized>(commands: Vec<RemoteCommand>, target: &mut T) -> Vec<RemoteResponse> {
    commands
        .into_iter()
        .map(|cmd| {
            log::info!("Playing test command: {:?}", cmd);
            execute(cmd, target)
        })
        .collect()
}

/// Play `test_file` against `target`.
///
/// With `exit_after_playback` a quit is requested afterwards: code 0 when
/// every command succeeded, 1 otherwise. No file means nothing happens.
pub fn play_test<T: RemoteTarget + ?Sized>(target: &mut T, test_file: Option<&str>, exit_after_playback: bool) {
    let Some(test_file) = test_file.filter(|f| !f.is_empty()) else {
        return;
    };

    log::info!("Playing test file {}", test_file);
    let succeeded = match load_script(Path::new(test_file)) {
        Ok(commands) => {
            let responses = play(commands, target);
            let failures = responses.iter().filter(|r| r.is_error()).count();
            if failures > 0 {
                log::error!("Test playback finished with {} failed command(s)", failures);
            }
            failures == 0
        }
        Err(e) => {
            log::error!("Cannot play {}: {}", test_file, e);
            false
        }
    };

    if exit_after_playback {
        target.request_quit(if succeeded { 0 } else { 1 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::protocol::tests::FakeTarget;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn script_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_script_skips_comments_and_blanks() {
        let script = "# open two molecules\n\n{\"type\":\"open_file\",\"path\":\"a.xyz\"}\n   \n{\"type\":\"list_files\"}\n";
        let commands = parse_script(script).unwrap();
        assert_eq!(
            commands,
            vec![
                RemoteCommand::OpenFile {
                    path: "a.xyz".to_string()
                },
                RemoteCommand::ListFiles
            ]
        );
    }

    #[test]
    fn test_parse_script_reports_line_number() {
        let script = "# header\n{\"type\":\"ping\"}\n{broken\n";
        match parse_script(script) {
            Err(PlaybackError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_play_test_success_exits_zero() {
        let file = script_file("{\"type\":\"open_file\",\"path\":\"a.xyz\"}\n{\"type\":\"open_file\",\"path\":\"b.xyz\"}\n");
        let mut target = FakeTarget::default();
        play_test(&mut target, file.path().to_str(), true);
        assert_eq!(target.files, vec!["a.xyz", "b.xyz"]);
        assert_eq!(target.quit, Some(0));
    }

    #[test]
    fn test_play_test_failure_exits_one() {
        let file = script_file("{\"type\":\"open_file\",\"path\":\"gone.missing\"}\n");
        let mut target = FakeTarget::default();
        play_test(&mut target, file.path().to_str(), true);
        assert_eq!(target.quit, Some(1));
    }

    #[test]
    fn test_play_test_no_exit_keeps_running() {
        let file = script_file("{\"type\":\"open_file\",\"path\":\"a.xyz\"}\n");
        let mut target = FakeTarget::default();
        play_test(&mut target, file.path().to_str(), false);
        assert_eq!(target.files, vec!["a.xyz"]);
        assert_eq!(target.quit, None);
    }

    #[test]
    fn test_play_test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        let mut target = FakeTarget::default();
        play_test(&mut target, path.to_str(), true);
        assert_eq!(target.quit, Some(1));
    }

    #[test]
    fn test_play_test_without_file_does_nothing() {
        let mut target = FakeTarget::default();
        play_test(&mut target, None, true);
        play_test(&mut target, Some(""), true);
        assert_eq!(target.quit, None);
    }
}
