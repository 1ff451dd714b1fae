use super::RemoteTarget;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RemoteCommand {
    #[serde(rename = "open_file")]
    OpenFile { path: String },
    #[serde(rename = "list_files")]
    ListFiles,
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "quit")]
    Quit {
        #[serde(default)]
        code: i32,
    },
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RemoteResponse {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "files")]
    Files { files: Vec<String> },
    #[serde(rename = "pong")]
    Pong { application: String, version: String },
    #[serde(rename = "error")]
    Error { message: String },
}

impl RemoteResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, RemoteResponse::Error { .. })
    }
}

pub fn parse_command(line: &str) -> Result<RemoteCommand, String> {
    serde_json::from_str(line).map_err(|e| format!("Invalid JSON: {}", e))
}

pub fn execute<T: RemoteTarget + ?Sized>(cmd: RemoteCommand, target: &mut T) -> RemoteResponse {
    match cmd {
        RemoteCommand::OpenFile { path } => match target.open_file(&path) {
            Ok(()) => RemoteResponse::Ok,
            Err(message) => RemoteResponse::Error { message },
        },
        RemoteCommand::ListFiles => RemoteResponse::Files {
            files: target.open_files(),
        },
        RemoteCommand::Ping => RemoteResponse::Pong {
            application: target.application_name(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        RemoteCommand::Quit { code } => {
            target.request_quit(code);
            RemoteResponse::Ok
        }
    }
}
