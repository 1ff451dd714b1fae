//! External control of a running instance.
//!
//! Commands arrive as newline-delimited JSON over a loopback TCP socket
//! (see [`listener`]) or from a scripted test file, and act on anything
//! implementing [`RemoteTarget`].

pub mod listener;
pub mod protocol;

pub use listener::RpcListener;

/// The part of the application remote commands are allowed to drive
pub trait RemoteTarget {
    /// Name the running instance reports to clients
    fn application_name(&self) -> String;

    fn open_file(&mut self, path: &str) -> Result<(), String>;

    fn open_files(&self) -> Vec<String>;

    fn request_quit(&mut self, code: i32);
}
