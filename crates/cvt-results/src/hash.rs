//! Content-based hashing for run IDs.

use crate::types::RunSettings;
use cvt_project::schema::Project;
use sha2::{Digest, Sha256};

pub fn compute_run_id(project: &Project, settings: &RunSettings, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let project_json = serde_json::to_string(project).unwrap_or_default();
    hasher.update(project_json.as_bytes());

    let settings_json = serde_json::to_string(settings).unwrap_or_default();
    hasher.update(settings_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
