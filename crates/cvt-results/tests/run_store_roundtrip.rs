use cvt_results::*;

fn manifest(run_id: &str, project: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        project_name: project.to_string(),
        timestamp: timestamp.to_string(),
        settings: RunSettings {
            dt_s: 1e-4,
            t_end_s: 2.0,
            integrator: "rk4".to_string(),
            record_every: 10,
            track_length_m: None,
        },
        solver_version: "0.1.0".to_string(),
        termination: "completed".to_string(),
        steps: 20_000,
        record_count: 2,
    }
}

fn record(t: f64) -> TimeseriesRecord {
    TimeseriesRecord {
        time_s: t,
        engine_angular_velocity_rad_s: 260.0,
        engine_angular_position_rad: 260.0 * t,
        vehicle_velocity_mps: 3.0,
        vehicle_position_m: 3.0 * t,
        shift_velocity_mps: 0.0,
        shift_distance_m: 0.001,
        cvt_ratio: 3.7,
        engine_rpm: 2483.0,
        engine_torque_nm: 24.9,
        vehicle_speed_kmh: 10.8,
        shift_percent: 4.5,
        secondary_angular_position_rad: 2.2 * t,
        primary_net_force_n: 120.0,
        secondary_net_force_n: 80.0,
        primary_radial_force_n: 300.0,
        secondary_radial_force_n: 250.0,
    }
}

fn temp_store(name: &str) -> RunStore {
    let dir = std::env::temp_dir().join(format!("cvt_results_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    RunStore::new(dir).unwrap()
}

#[test]
fn save_and_load_run() {
    let store = temp_store("save_and_load");
    let m = manifest("abc", "Baja", "2026-01-01T00:00:00+00:00");
    let records = vec![record(0.0), record(0.5)];

    assert!(!store.has_run("abc"));
    store.save_run(&m, &records).unwrap();
    assert!(store.has_run("abc"));

    assert_eq!(store.load_manifest("abc").unwrap(), m);
    assert_eq!(store.load_timeseries("abc").unwrap(), records);
}

#[test]
fn missing_run_is_not_found() {
    let store = temp_store("missing");
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(matches!(
        store.load_timeseries("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
}

#[test]
fn list_filters_by_project_newest_first() {
    let store = temp_store("list");
    store
        .save_run(&manifest("b", "Baja", "2026-01-02T00:00:00+00:00"), &[])
        .unwrap();
    store
        .save_run(&manifest("a", "Baja", "2026-01-01T00:00:00+00:00"), &[])
        .unwrap();
    store
        .save_run(&manifest("c", "Other", "2026-01-03T00:00:00+00:00"), &[])
        .unwrap();

    let baja: Vec<_> = store
        .list_runs(Some("Baja"))
        .unwrap()
        .into_iter()
        .map(|m| m.run_id)
        .collect();
    assert_eq!(baja, vec!["b", "a"]);
    assert_eq!(store.list_runs(None).unwrap().len(), 3);

    store.delete_run("a").unwrap();
    assert_eq!(store.list_runs(Some("Baja")).unwrap().len(), 1);
}

#[test]
fn interrupted_save_is_not_a_run() {
    let store = temp_store("interrupted");
    let dir = store.root_dir().join("half");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("timeseries.jsonl"), "").unwrap();

    assert!(!store.has_run("half"));
    assert!(store.list_runs(None).unwrap().is_empty());
    assert!(matches!(
        store.load_timeseries("half"),
        Err(ResultsError::RunNotFound { .. })
    ));
}

#[test]
fn latest_run_matches_project_and_settings() {
    let store = temp_store("latest");
    let older = manifest("old", "Baja", "2026-01-01T00:00:00+00:00");
    let newer = manifest("new", "Baja", "2026-01-01T00:00:00.250+00:00");
    let mut euler = manifest("euler", "Baja", "2026-01-02T00:00:00+00:00");
    euler.settings.integrator = "forward_euler".to_string();
    let other = manifest("other", "Other", "2026-01-03T00:00:00+00:00");
    for m in [&older, &newer, &euler, &other] {
        store.save_run(m, &[]).unwrap();
    }

    let rk4 = store.latest_run("Baja", &older.settings).unwrap().unwrap();
    assert_eq!(rk4.run_id, "new");
    let by_euler = store.latest_run("Baja", &euler.settings).unwrap().unwrap();
    assert_eq!(by_euler.run_id, "euler");

    let mut longer = older.settings.clone();
    longer.t_end_s = 10.0;
    assert!(store.latest_run("Baja", &longer).unwrap().is_none());
    assert!(store.latest_run("Nobody", &older.settings).unwrap().is_none());
}

#[test]
fn prune_keeps_newest_runs_of_one_project() {
    let store = temp_store("prune");
    for (id, day) in [("d1", 1), ("d2", 2), ("d3", 3)] {
        let ts = format!("2026-02-0{day}T12:00:00+00:00");
        store.save_run(&manifest(id, "Baja", &ts), &[record(0.0)]).unwrap();
    }
    store
        .save_run(&manifest("x", "Other", "2026-01-01T00:00:00+00:00"), &[])
        .unwrap();

    let removed = store.prune_runs("Baja", 1).unwrap();
    assert_eq!(removed, vec!["d2", "d1"]);
    assert!(store.has_run("d3"));
    assert!(!store.has_run("d1") && !store.has_run("d2"));
    assert!(store.has_run("x"));

    assert!(store.prune_runs("Baja", 5).unwrap().is_empty());
}

#[test]
fn for_project_uses_hidden_directory() {
    let dir = std::env::temp_dir().join("cvt_results_for_project");
    std::fs::create_dir_all(&dir).unwrap();
    let store = RunStore::for_project(&dir.join("baja.yaml")).unwrap();
    assert!(store.root_dir().ends_with(".cvtsim/runs"));
    assert!(store.root_dir().exists());
}

#[test]
fn csv_has_header_and_one_line_per_record() {
    let mut out = Vec::new();
    write_csv(&mut out, &[record(0.0), record(0.1)]).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    let columns = CSV_HEADER.split(',').count();
    assert!(lines[1..].iter().all(|l| l.split(',').count() == columns));
    assert!(lines[2].starts_with("0.1,2483,"));
}
