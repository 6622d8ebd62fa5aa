// Library root
// -----------
// This crate exposes the pieces the `teleput` binary wires together. The
// binary (`main.rs`) parses arguments, builds the collaborators and maps the
// dispatcher's outcome to an exit code.
//
// Module responsibilities:
// - `cli`: clap definition of the command line.
// - `config`: server URL, app name and config directory, with env overrides.
// - `key_store`: reads and writes the single-line key file.
// - `mime`: picks a content type for uploaded files.
// - `api`: request shapes and the blocking HTTP client for the relay.
// - `dispatch`: decides what an invocation means and issues one request.
// - `error`: error taxonomy and exit codes.
pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod key_store;
pub mod mime;
