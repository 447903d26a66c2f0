// Bounded-concurrency writer for the on-disk artifact set.
//
// Layout under the output root:
//
//   metadata.json       seed, configs, cost-map descriptor, stats (pretty)
//   costmap.png         8-bit grayscale image of the cost grid
//   costmap.bin         raw cost bytes, row-major
//   routes.json         { routes: [{ originId, destinationId, cost, path }] }
//   systems/<id>.json   one record per star system
//
// The root is deleted and recreated first, so a run never merges with a
// previous one. Every artifact is serialized up front into a `WriteJob`
// (path plus owned bytes); jobs then run as tasks on a `JoinSet`, each
// holding a `Semaphore` permit for the duration of its write. A permit is
// acquired before the task is spawned, so at most `limit` writes are ever
// in flight and the set never holds more than `limit` tasks.
//
// The first failed write aborts everything still pending and is returned
// to the caller.
//
// See also: `schema.rs` for the JSON shapes, `encode.rs` for the cost-map
// encodings.

use crate::encode::{cost_map_bin, cost_map_png};
use crate::error::OutputError;
use crate::schema::{MetadataFile, RoutesFile};
use serde::Serialize;
use starlanes_gen::Universe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Default ceiling on simultaneous in-flight writes.
pub const MAX_IN_FLIGHT_WRITES: usize = 100;

pub const METADATA_FILE: &str = "metadata.json";
pub const COSTMAP_PNG_FILE: &str = "costmap.png";
pub const COSTMAP_BIN_FILE: &str = "costmap.bin";
pub const ROUTES_FILE: &str = "routes.json";
pub const SYSTEMS_DIR: &str = "systems";

/// What a finished write batch did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteReport {
    pub files_written: usize,
    /// Highest number of writes observed in flight at once.
    pub peak_in_flight: usize,
}

/// One file to write.
#[derive(Clone, Debug)]
pub struct WriteJob {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Write `universe` under `out_dir` with the default concurrency cap.
pub async fn write_universe(
    out_dir: &Path,
    universe: &Universe,
) -> Result<WriteReport, OutputError> {
    write_universe_with_limit(out_dir, universe, MAX_IN_FLIGHT_WRITES).await
}

/// Write `universe` under `out_dir` with at most `limit` writes in flight
/// (a `limit` of 0 is treated as 1).
pub async fn write_universe_with_limit(
    out_dir: &Path,
    universe: &Universe,
    limit: usize,
) -> Result<WriteReport, OutputError> {
    reset_dir(out_dir).await?;
    let jobs = plan_jobs(out_dir, universe)?;
    tracing::debug!(jobs = jobs.len(), limit, "dispatching writes");
    let report = run_jobs(jobs, limit).await?;
    tracing::info!(
        out_dir = %out_dir.display(),
        files = report.files_written,
        peak_in_flight = report.peak_in_flight,
        "wrote universe"
    );
    Ok(report)
}

/// Delete `out_dir` if it exists and recreate it with its `systems/`
/// subdirectory.
async fn reset_dir(out_dir: &Path) -> Result<(), OutputError> {
    match tokio::fs::remove_dir_all(out_dir).await {
        Ok(()) => tracing::debug!(out_dir = %out_dir.display(), "removed previous output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(OutputError::io(out_dir, e)),
    }
    let systems_dir = out_dir.join(SYSTEMS_DIR);
    tokio::fs::create_dir_all(&systems_dir)
        .await
        .map_err(|e| OutputError::io(systems_dir, e))
}

fn json_bytes<T: Serialize>(what: &str, value: &T, pretty: bool) -> Result<Vec<u8>, OutputError> {
    let result = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    result.map_err(|e| OutputError::json(what, e))
}

/// Serialize every artifact into a job. Fixed artifacts come first, then
/// one job per system in catalog order.
pub fn plan_jobs(out_dir: &Path, universe: &Universe) -> Result<Vec<WriteJob>, OutputError> {
    let mut jobs = Vec::with_capacity(universe.systems.len() + 4);
    jobs.push(WriteJob {
        path: out_dir.join(METADATA_FILE),
        bytes: json_bytes(METADATA_FILE, &MetadataFile::from_universe(universe), true)?,
    });
    jobs.push(WriteJob {
        path: out_dir.join(COSTMAP_PNG_FILE),
        bytes: cost_map_png(&universe.cost_map)?,
    });
    jobs.push(WriteJob {
        path: out_dir.join(COSTMAP_BIN_FILE),
        bytes: cost_map_bin(&universe.cost_map),
    });
    jobs.push(WriteJob {
        path: out_dir.join(ROUTES_FILE),
        bytes: json_bytes(
            ROUTES_FILE,
            &RoutesFile::from_routes(&universe.network.routes),
            false,
        )?,
    });

    let systems_dir = out_dir.join(SYSTEMS_DIR);
    for system in &universe.systems {
        let name = format!("{}.json", system.id);
        jobs.push(WriteJob {
            bytes: json_bytes(&name, system, true)?,
            path: systems_dir.join(name),
        });
    }
    Ok(jobs)
}

/// Shared counters for the in-flight high-water mark.
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Run `jobs` with at most `limit` in flight. Stops at the first failure.
pub async fn run_jobs(jobs: Vec<WriteJob>, limit: usize) -> Result<WriteReport, OutputError> {
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let in_flight = Arc::new(InFlight::default());
    let mut set = JoinSet::new();
    let mut files_written = 0;

    for job in jobs {
        while let Some(done) = set.try_join_next() {
            files_written += settle(&mut set, done)?;
        }
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| OutputError::LimiterClosed)?;
        let in_flight = Arc::clone(&in_flight);
        set.spawn(async move {
            in_flight.enter();
            let result = tokio::fs::write(&job.path, &job.bytes)
                .await
                .map_err(|e| OutputError::io(job.path, e));
            in_flight.leave();
            drop(permit);
            result
        });
    }

    while let Some(done) = set.join_next().await {
        files_written += settle(&mut set, done)?;
    }

    Ok(WriteReport {
        files_written,
        peak_in_flight: in_flight.peak.load(Ordering::SeqCst),
    })
}

/// Count a finished task, or abort the rest of the set and surface its
/// error.
fn settle(
    set: &mut JoinSet<Result<(), OutputError>>,
    done: Result<Result<(), OutputError>, JoinError>,
) -> Result<usize, OutputError> {
    let outcome = done.map_err(OutputError::from).and_then(|r| r);
    if let Err(e) = outcome {
        set.abort_all();
        tracing::error!(error = %e, "write failed, aborting remaining writes");
        return Err(e);
    }
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlanes_gen::UniverseConfig;
    use starlanes_gen::cost_map::{CostMap, Quantization};
    use starlanes_gen::routes::RouteNetwork;
    use starlanes_gen::stats::GenerationStats;
    use starlanes_gen::types::{Coordinate, Region, Route, RouteKind, StarSystem};
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicU64;

    static NEXT_DIR: AtomicU64 = AtomicU64::new(0);

    /// A unique scratch directory under the system temp dir.
    fn scratch_dir(tag: &str) -> PathBuf {
        let n = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("starlanes_output_{tag}_{}_{n}", std::process::id()))
    }

    fn universe_with(system_ids: Vec<String>) -> Universe {
        let systems: Vec<StarSystem> = system_ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| StarSystem {
                id,
                x: (i % 10) as i32,
                y: (i / 10 % 10) as i32,
                region: if i < 2 { Region::Oikumene } else { Region::Beyond },
                attributes: BTreeMap::new(),
            })
            .collect();
        let quantization = Quantization {
            min_cost: 1,
            max_cost: 100,
            grid_origin_x: 0,
            grid_origin_y: 0,
            grid_width: 10,
            grid_height: 10,
        };
        let route = Route {
            origin_id: systems[0].id.clone(),
            destination_id: systems[1].id.clone(),
            cost: 1,
            path: vec![Coordinate::new(0, 0), Coordinate::new(1, 0)],
            kind: RouteKind::Direct,
        };
        let network = RouteNetwork {
            routes: vec![route],
            direct_routes: 1,
            components_before_bridging: 1,
            ..RouteNetwork::default()
        };
        let stats = GenerationStats::compute(&systems, 0, &network);
        Universe {
            seed: "test".to_string(),
            config: UniverseConfig::default(),
            systems,
            cost_map: CostMap::uniform(quantization).unwrap(),
            network,
            stats,
        }
    }

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("SYS-{i:06}")).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn writes_every_file_within_the_cap() {
        let dir = scratch_dir("cap");
        let universe = universe_with(numbered(250));
        let report = write_universe(&dir, &universe).await.unwrap();

        assert_eq!(report.files_written, 250 + 4);
        assert!(report.peak_in_flight >= 1);
        assert!(report.peak_in_flight <= MAX_IN_FLIGHT_WRITES);

        let systems = std::fs::read_dir(dir.join(SYSTEMS_DIR)).unwrap().count();
        assert_eq!(systems, 250);
        for name in [METADATA_FILE, COSTMAP_PNG_FILE, COSTMAP_BIN_FILE, ROUTES_FILE] {
            assert!(dir.join(name).is_file(), "{name} missing");
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    /// Every object key under `value` is camelCase.
    fn assert_snake_free(value: &serde_json::Value, at: &str) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, child) in map {
                    assert!(!key.contains('_'), "snake_case key `{at}.{key}`");
                    assert_snake_free(child, &format!("{at}.{key}"));
                }
            }
            serde_json::Value::Array(items) => {
                for item in items {
                    assert_snake_free(item, at);
                }
            }
            _ => {}
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn small_limit_is_respected() {
        let dir = scratch_dir("limit");
        let universe = universe_with(numbered(40));
        let report = write_universe_with_limit(&dir, &universe, 3).await.unwrap();
        assert_eq!(report.files_written, 44);
        assert!(report.peak_in_flight <= 3);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn previous_output_is_removed() {
        let dir = scratch_dir("reset");
        std::fs::create_dir_all(dir.join(SYSTEMS_DIR)).unwrap();
        std::fs::write(dir.join("stale.txt"), b"old").unwrap();
        std::fs::write(dir.join(SYSTEMS_DIR).join("SYS-999999.json"), b"{}").unwrap();

        write_universe(&dir, &universe_with(numbered(3))).await.unwrap();
        assert!(!dir.join("stale.txt").exists());
        assert!(!dir.join(SYSTEMS_DIR).join("SYS-999999.json").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn artifacts_have_the_expected_shape() {
        let dir = scratch_dir("shape");
        let universe = universe_with(numbered(3));
        write_universe(&dir, &universe).await.unwrap();

        let metadata: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.join(METADATA_FILE)).unwrap()).unwrap();
        assert_eq!(metadata["seed"], "test");
        assert_eq!(metadata["costMap"]["quantization"], "uint8_linear");
        assert_eq!(metadata["costMap"]["gridWidth"], 10);
        assert_eq!(metadata["stats"]["totalSystems"], 3);
        assert_eq!(metadata["cellularAutomata"]["fillProbability"], 0.45);
        assert_eq!(metadata["galaxy"]["dynSizeFactor"], 1.0);
        assert_snake_free(&metadata, "metadata");

        let bin = std::fs::read(dir.join(COSTMAP_BIN_FILE)).unwrap();
        assert_eq!(bin, universe.cost_map.data());

        let routes: RoutesFile =
            serde_json::from_slice(&std::fs::read(dir.join(ROUTES_FILE)).unwrap()).unwrap();
        assert_eq!(routes.routes.len(), 1);
        assert_eq!(routes.routes[0].path, vec![[0, 0], [1, 0]]);

        let system: StarSystem = serde_json::from_slice(
            &std::fs::read(dir.join(SYSTEMS_DIR).join("SYS-000001.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(system, universe.systems[1]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        let dir = scratch_dir("fail");
        let mut ids = numbered(20);
        // The `missing/` subdirectory is never created, so this write fails.
        ids[10] = "missing/SYS-000010".to_string();
        let err = write_universe(&dir, &universe_with(ids)).await.unwrap_err();
        match err {
            OutputError::Io { path, .. } => assert!(path.ends_with("missing/SYS-000010.json")),
            other => panic!("unexpected error: {other}"),
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn unusable_output_root_fails_before_writing() {
        let file = scratch_dir("file_root");
        std::fs::write(&file, b"not a directory").unwrap();
        let err = write_universe(&file.join("out"), &universe_with(numbered(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, OutputError::Io { .. }));
        std::fs::remove_file(&file).unwrap();
    }
}
