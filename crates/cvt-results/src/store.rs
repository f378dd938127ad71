//! Run cache kept beside each project file.
//!
//! ```text
//! <project dir>/.cvtsim/runs/<run_id>/timeseries.jsonl
//!                                    /manifest.json
//! ```
//!
//! The manifest is written after the timeseries, so a run directory without
//! one is an interrupted save and every query skips it.

use crate::types::{RunId, RunManifest, RunSettings, TimeseriesRecord};
use crate::{ResultsError, ResultsResult};
use chrono::{DateTime, FixedOffset};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const CACHE_DIR: &str = ".cvtsim";
const RUNS_DIR: &str = "runs";
const MANIFEST_FILE: &str = "manifest.json";
const TIMESERIES_FILE: &str = "timeseries.jsonl";

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    /// Store for the project file at `project_path`.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let project_dir = project_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: format!("{} has no parent directory", project_path.display()),
            })?;
        Self::new(project_dir.join(CACHE_DIR).join(RUNS_DIR))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn manifest_path(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id).join(MANIFEST_FILE)
    }

    fn timeseries_path(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id).join(TIMESERIES_FILE)
    }

    /// True when a completed run with this id is cached.
    pub fn has_run(&self, run_id: &str) -> bool {
        self.manifest_path(run_id).is_file()
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        records: &[TimeseriesRecord],
    ) -> ResultsResult<()> {
        fs::create_dir_all(self.root_dir.join(&manifest.run_id))?;

        let mut out = BufWriter::new(File::create(self.timeseries_path(&manifest.run_id))?);
        for record in records {
            serde_json::to_writer(&mut out, record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.manifest_path(&manifest.run_id), manifest_json)?;
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let path = self.manifest_path(run_id);
        if !path.is_file() {
            return Err(not_found(run_id));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn load_timeseries(&self, run_id: &str) -> ResultsResult<Vec<TimeseriesRecord>> {
        let path = self.timeseries_path(run_id);
        if !self.has_run(run_id) || !path.is_file() {
            return Err(not_found(run_id));
        }

        let mut records = Vec::new();
        for line in BufReader::new(File::open(path)?).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(&line)?);
            }
        }
        Ok(records)
    }

    /// Completed runs, newest first, optionally only those of one project.
    pub fn list_runs(&self, project_name: Option<&str>) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().into_owned();
            // Half-written or foreign directories are not runs.
            let Ok(manifest) = self.load_manifest(&run_id) else {
                continue;
            };
            if project_name.is_none_or(|name| manifest.project_name == name) {
                runs.push(manifest);
            }
        }

        runs.sort_by(|a, b| {
            created_at(b)
                .cmp(&created_at(a))
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        Ok(runs)
    }

    /// Most recent run of `project_name` integrated with exactly `settings`.
    ///
    /// Run ids also hash the project contents, so this finds the last result
    /// for a solver setup even after the vehicle has been edited.
    pub fn latest_run(
        &self,
        project_name: &str,
        settings: &RunSettings,
    ) -> ResultsResult<Option<RunManifest>> {
        Ok(self
            .list_runs(Some(project_name))?
            .into_iter()
            .find(|m| &m.settings == settings))
    }

    /// Delete all but the `keep` newest runs of `project_name`, returning the
    /// ids that were removed.
    pub fn prune_runs(&self, project_name: &str, keep: usize) -> ResultsResult<Vec<RunId>> {
        let stale: Vec<RunId> = self
            .list_runs(Some(project_name))?
            .into_iter()
            .skip(keep)
            .map(|m| m.run_id)
            .collect();
        for run_id in &stale {
            self.delete_run(run_id)?;
        }
        Ok(stale)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.root_dir.join(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

fn not_found(run_id: &str) -> ResultsError {
    ResultsError::RunNotFound {
        run_id: run_id.to_string(),
    }
}

fn created_at(manifest: &RunManifest) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(&manifest.timestamp).ok()
}
