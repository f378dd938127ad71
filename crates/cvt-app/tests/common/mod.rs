#![allow(dead_code)]

use std::path::PathBuf;

use cvt_project::schema::Project;
use cvt_project::{reference_project, save_yaml};

/// Reference vehicle shortened to a fraction of a second.
pub fn short_project(name: &str, t_end_s: f64) -> Project {
    let mut project = reference_project(name);
    project.run.t_end_s = t_end_s;
    project.run.record_every = 50;
    project.run.progress_interval_s = 0.1;
    project
}

/// Fresh directory holding `project` as `project.yaml`.
pub fn write_project(dir_name: &str, project: &Project) -> PathBuf {
    let dir = std::env::temp_dir().join(dir_name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("project.yaml");
    save_yaml(&path, project).unwrap();
    path
}
