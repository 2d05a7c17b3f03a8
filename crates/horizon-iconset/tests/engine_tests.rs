//! Integration tests for the composed engine.

use std::fs;
use std::path::Path;

use horizon_iconset::prelude::*;
use tempfile::TempDir;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();
}

fn engine_for(temp: &TempDir) -> IconEngine {
    IconEngine::new(
        LayerRegistry::builder()
            .application_root(temp.path().join("app/icons"))
            .plugin("UiKit", temp.path().join("plugins/ui_kit/icons"))
            .build()
            .unwrap(),
    )
}

#[test]
fn resolve_and_discover_agree() {
    init_logging();
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("app/icons"), "feather/home.svg");
    touch(&temp.path().join("app/icons"), "feather/arrow left.svg");
    touch(&temp.path().join("app/icons"), "Material Icons/home.svg");
    touch(&temp.path().join("plugins/ui_kit/icons"), "feather/settings.svg");
    touch(&temp.path().join("plugins/ui_kit/icons"), "Font Awesome/circle check.svg");
    let engine = engine_for(&temp);

    let libraries = engine.discover_all().unwrap();
    assert!(libraries["feather"].contains("arrow left"));
    assert!(libraries.contains_key("Material Icons"));
    assert!(libraries.contains_key("ui_kit:Font Awesome"));
    for (key, library) in libraries.iter() {
        for name in &library.icon_names {
            let handle = engine.resolve(&format!("{key}/{name}")).unwrap();
            assert_eq!(&handle.library_key, key);
            assert_eq!(handle.file_path, library.root.join(format!("{name}.svg")));
        }
    }

    let ui = engine.library("ui_kit:feather").unwrap().unwrap();
    assert!(ui.contains("settings"));
    assert!(engine.library("ui_kit:heroicons").unwrap().is_none());
}

#[test]
fn unknown_namespace_names_available_ones() {
    init_logging();
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("app/icons"), "feather/home.svg");
    touch(&temp.path().join("plugins/ui_kit/icons"), "feather/settings.svg");
    let engine = engine_for(&temp);

    let err = engine.resolve("admin:feather/home").unwrap_err();
    assert!(err.to_string().contains("ui_kit"));
    assert!(err.is_not_found());
}

#[test]
fn invalidate_picks_up_new_roots_and_icons() {
    init_logging();
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("app/icons"), "feather/home.svg");
    let engine = engine_for(&temp);

    assert_eq!(engine.layers().len(), 1);
    assert_eq!(engine.discover_all().unwrap().len(), 1);

    touch(&temp.path().join("plugins/ui_kit/icons"), "feather/settings.svg");
    assert!(engine.resolve("ui_kit:feather/settings").is_err());
    assert_eq!(engine.discover_all().unwrap().len(), 1);

    engine.invalidate();
    assert_eq!(engine.layers().len(), 2);
    assert!(engine.resolve("ui_kit:feather/settings").is_ok());
    assert_eq!(engine.discover_all().unwrap().len(), 2);
}

#[test]
fn engine_from_config_file() {
    init_logging();
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("app/icons"), "feather/home.svg");
    touch(&temp.path().join("vendor/admin"), "tabler/user.svg");

    let config_path = temp.path().join("iconset.toml");
    fs::write(
        &config_path,
        r#"
[application]
root = "app/icons"

[[plugins]]
id = "AdminPanel"
root = "vendor/admin"
"#,
    )
    .unwrap();

    let engine = IconEngine::from_config(IconsetConfig::from_file(&config_path).unwrap()).unwrap();
    let handle = engine.resolve("admin_panel:tabler/user").unwrap();
    assert_eq!(handle.file_path, temp.path().join("vendor/admin/tabler/user.svg"));
    assert!(engine.resolve("feather/home").is_ok());
}

#[test]
fn engine_shared_across_threads() {
    init_logging();
    let temp = TempDir::new().unwrap();
    for i in 0..10 {
        touch(&temp.path().join("app/icons"), &format!("set{i}/icon.svg"));
    }
    let engine = std::sync::Arc::new(engine_for(&temp));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || {
                if i % 2 == 0 {
                    engine.invalidate();
                }
                assert_eq!(engine.discover_all().unwrap().len(), 10);
                assert!(engine.resolve("set3/icon").is_ok());
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[cfg(feature = "hot-reload")]
#[test]
fn watcher_applies_changes_to_engine() {
    init_logging();
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("app/icons"), "feather/home.svg");
    let engine = engine_for(&temp);
    engine.discover_all().unwrap();

    let mut watcher = IconWatcher::new().unwrap();
    assert_eq!(watcher.watch_layers(&engine).unwrap(), 1);

    let change = IconChangeEvent {
        path: temp.path().join("app/icons/feather/new.svg"),
        kind: ChangeKind::Modified,
    };
    assert!(watcher.apply(&engine, &[change]));
    assert!(!engine.discovery().is_fresh());
}
