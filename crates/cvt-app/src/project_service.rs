//! Project loading, saving and validation.

use std::path::Path;

use cvt_project::schema::Project;
use cvt_project::{presets, validate};

use crate::error::{AppError, AppResult};

/// Load and validate a project, YAML or JSON by extension.
pub fn load_project(path: &Path) -> AppResult<Project> {
    Ok(cvt_project::load_project(path)?)
}

/// Validate and save a project as YAML.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    Ok(cvt_project::save_yaml(path, project)?)
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    Ok(validate::validate_project(project)?)
}

/// Write the reference vehicle to `path`. Refuses to overwrite unless `force`.
pub fn init_project(path: &Path, name: &str, force: bool) -> AppResult<Project> {
    if path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists",
            path.display()
        )));
    }
    let project = presets::reference_project(name);
    save_project(path, &project)?;
    Ok(project)
}
