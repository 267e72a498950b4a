use crate::api::GrimoireApi;
use crate::config::GrimoireConfig;
use crate::store::fs_backend::FsBackend;
use std::path::PathBuf;
use tempfile::TempDir;

/// An API over a filesystem store inside a fresh temp dir.
pub struct TestEnv {
    _temp_dir: TempDir,
    pub data_dir: PathBuf,
    pub api: GrimoireApi<FsBackend>,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_path_buf();
        let config = GrimoireConfig::default();
        let backend = FsBackend::new(&data_dir, &config.database);
        let api = GrimoireApi::new(backend, config);

        Self {
            _temp_dir: temp_dir,
            data_dir,
            api,
        }
    }

    /// Directory that holds the aggregate files.
    pub fn store_root(&self) -> PathBuf {
        self.data_dir.join(&self.api.config().database)
    }
}
