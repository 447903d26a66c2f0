// starlanes_output: writes a generated `Universe` to disk.
//
// Generation (in `starlanes_gen`) is synchronous and single-threaded. This
// crate is the only place with concurrency: every artifact is written by
// an independent tokio task, bounded by a semaphore so large catalogs
// never exhaust file descriptors.
//
// Module overview:
// - `writer.rs`: directory reset, job planning, bounded `JoinSet` writes.
// - `schema.rs`: MetadataFile, RoutesFile, and their record types.
// - `encode.rs`: costmap.bin and costmap.png encodings.
// - `error.rs`:  OutputError.

pub mod encode;
pub mod error;
pub mod schema;
pub mod writer;

pub use error::OutputError;
pub use writer::{MAX_IN_FLIGHT_WRITES, WriteReport, write_universe, write_universe_with_limit};
