// Shared fixtures for the end-to-end pipeline tests.
//
// Provides a small-but-real `UniverseConfig` (a few hundred stars, a
// couple of dozen Oikumene systems) that generates quickly in debug
// builds, and `ScratchDir`, a uniquely named temp directory removed on
// drop.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use starlanes_gen::UniverseConfig;
use starlanes_gen::config::{GalaxyConfig, OikumeneConfig, RouteConfig};

/// A compact galaxy: two arms, at most 600 stars, a 40-system Oikumene.
pub fn test_config(seed: &str) -> UniverseConfig {
    UniverseConfig {
        seed: seed.to_string(),
        galaxy: GalaxyConfig {
            size: (40.0, 40.0),
            deg: 360.0,
            arms: 2,
            spc_factor: 1.0,
            multiplier: 2.0,
            limit: Some(600),
            ..GalaxyConfig::default()
        },
        oikumene: OikumeneConfig {
            core_exclusion_radius: 8.0,
            rim_exclusion_radius: 120.0,
            cluster_radius: 70.0,
            target_count: 40,
        },
        routes: RouteConfig {
            max_range: 18,
            ..RouteConfig::default()
        },
        ..UniverseConfig::default()
    }
}

static NEXT_SCRATCH: AtomicU64 = AtomicU64::new(0);

/// A temp directory path unique to this process and call. The directory
/// itself is not created; whatever ends up there is removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(tag: &str) -> Self {
        let n = NEXT_SCRATCH.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "starlanes_pipeline_{tag}_{}_{n}",
            std::process::id()
        ));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
