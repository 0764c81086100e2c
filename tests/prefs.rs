//! Split-fraction persistence through the YAML preferences file

use spectre::layout::{FrameScheduler, PaneGeometry, SplitPane, SplitStore, YamlPrefs, DEFAULT_SPLIT, SPLIT_KEY};

#[test]
fn fraction_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.yaml");
    let mut scheduler = FrameScheduler::new();

    let prefs = YamlPrefs::new(&path);
    assert_eq!(prefs.path(), path.as_path());
    let mut pane = SplitPane::restore(PaneGeometry::default(), Box::new(prefs));
    assert_eq!(pane.fraction(), DEFAULT_SPLIT);
    pane.set_container_width(1006.0, &mut scheduler);
    pane.press();
    pane.drag_to(700.0, &mut scheduler);
    assert!(!path.exists(), "nothing is written mid-drag");
    pane.release(&mut scheduler);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains(SPLIT_KEY));

    let restored = SplitPane::restore(PaneGeometry::default(), Box::new(YamlPrefs::new(&path)));
    assert!((restored.fraction() - 0.7).abs() < 1e-6);
}

#[test]
fn unreadable_prefs_fall_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.yaml");

    std::fs::write(&path, "spectre_split_frac: [not, a, number").unwrap();
    assert_eq!(YamlPrefs::new(&path).load(), None);

    std::fs::write(&path, "spectre_split_frac: 1.7\n").unwrap();
    let pane = SplitPane::restore(PaneGeometry::default(), Box::new(YamlPrefs::new(&path)));
    assert_eq!(pane.fraction(), DEFAULT_SPLIT);
}

#[test]
fn save_into_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut prefs = YamlPrefs::new(dir.path().join("nope").join("prefs.yaml"));
    assert!(prefs.save(0.4).is_err());
}

#[test]
fn narrow_window_does_not_persist_degraded_fraction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.yaml");
    std::fs::write(&path, "spectre_split_frac: 0.3\n").unwrap();
    let mut scheduler = FrameScheduler::new();

    let mut pane = SplitPane::restore(PaneGeometry::default(), Box::new(YamlPrefs::new(&path)));
    pane.set_container_width(1006.0, &mut scheduler);
    pane.set_container_width(300.0, &mut scheduler);
    pane.set_container_width(1006.0, &mut scheduler);
    pane.press();
    pane.release(&mut scheduler);

    let restored = SplitPane::restore(PaneGeometry::default(), Box::new(YamlPrefs::new(&path)));
    assert!((restored.fraction() - 0.3).abs() < 1e-9);
}
