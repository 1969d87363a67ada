// kvdash-console - Key-space traversal and value materialization
//
// The operation core of the console: resolve a key's representation, walk
// its contents incrementally, and assemble client-ready values, tracing
// every store command along the way

pub mod config;
pub mod error;
pub mod materialize;
pub mod ops;
pub mod request;
pub mod resolve;
pub mod scan;
pub mod trace;

pub use config::Limits;
pub use error::{ConsoleError, ConsoleResult};
pub use materialize::materialize;
pub use ops::{dispatch, error_message};
pub use resolve::resolve_kind;
pub use scan::{full_scan, normalize_pattern, scan_page, ScanKind, ScanPage};
pub use trace::{traced_command, Tracer};
