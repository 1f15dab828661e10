//! End-to-end tests against real directories and filesystem events.

use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use fs_runtime::loader::{self, DirectoryRefresher, SymlinkRefresher};
use fs_runtime::{Loader, LoaderOptions, RuntimeLoader, RuntimeSnapshot};

mod common;
use common::{make_file_in_dir, wait_for, TIMEOUT};

fn sorted_keys(snapshot: &dyn RuntimeSnapshot) -> Vec<String> {
    let mut keys = snapshot.keys();
    keys.sort();
    keys
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_symlink_refresher() {
    let base = tempfile::tempdir().unwrap();
    let base = base.path();

    make_file_in_dir(base, &base.join("testdir1/app/file1"), "hello");
    make_file_in_dir(base, &base.join("testdir1/app/dir/file2"), "world");
    make_file_in_dir(base, &base.join("testdir1/app/dir2/file3"), "\n 34  ");
    std::os::unix::fs::symlink(base.join("testdir1"), base.join("current")).unwrap();

    let current = base.join("current");
    let loader = Loader::start(
        &current,
        "app",
        SymlinkRefresher::new(&current),
        LoaderOptions::allow_dotfiles(),
    )
    .unwrap();
    let (tx, mut updates) = mpsc::channel(1);
    loader.add_update_callback(tx).unwrap();

    let snapshot = loader.current();
    assert_eq!(snapshot.get("foo"), "");
    assert_eq!(snapshot.get_integer("foo", 5), 5);
    assert_eq!(snapshot.get("file1"), "hello");
    assert_eq!(snapshot.get_integer("file1", 6), 6);
    assert_eq!(snapshot.get("dir.file2"), "world");
    assert_eq!(snapshot.get_integer("dir.file2", 7), 7);
    assert_eq!(snapshot.get_integer("dir2.file3", 100), 34);

    let modified = fs::metadata(base.join("testdir1/app/file1")).unwrap().modified().unwrap();
    assert_eq!(snapshot.get_modified("file1"), modified);
    assert_eq!(sorted_keys(&*snapshot), vec!["dir.file2", "dir2.file3", "file1"]);

    make_file_in_dir(base, &base.join("testdir2/app/file1"), "hello2");
    make_file_in_dir(base, &base.join("testdir2/app/dir/file2"), "world2");
    make_file_in_dir(base, &base.join("testdir2/app/dir2/file3"), "100");
    std::os::unix::fs::symlink(base.join("testdir2"), base.join("current_new")).unwrap();
    fs::rename(base.join("current_new"), &current).unwrap();

    wait_for(&loader, &mut updates, |s| s.get("file1") == "hello2").await;

    let snapshot = loader.current();
    assert_eq!(snapshot.get("foo"), "");
    assert_eq!(snapshot.get("dir.file2"), "world2");
    assert_eq!(snapshot.get_integer("dir2.file3", 0), 100);
    assert!(snapshot.feature_enabled("dir2.file3", 0));
    assert_eq!(sorted_keys(&*snapshot), vec!["dir.file2", "dir2.file3", "file1"]);
    assert!(loader.stats().load_attempts >= 2);
    assert_eq!(loader.stats().num_values, 3);
}

#[tokio::test]
async fn test_ignore_dotfiles() {
    let base = tempfile::tempdir().unwrap();
    let base = base.path();
    make_file_in_dir(base, &base.join("testdir1/app/dir3/.file4"), ".file4");
    make_file_in_dir(base, &base.join("testdir1/app/.dir/file5"), ".dir");

    let root = base.join("testdir1");
    let ignoring = Loader::start(&root, "app", SymlinkRefresher::new(&root), LoaderOptions::ignore_dotfiles()).unwrap();
    let snapshot = ignoring.current();
    assert_eq!(snapshot.get("dir3..file4"), "");
    assert_eq!(snapshot.get(".dir.file5"), "");
    assert!(snapshot.is_empty());

    let including = Loader::start(&root, "app", SymlinkRefresher::new(&root), LoaderOptions::allow_dotfiles()).unwrap();
    let snapshot = including.current();
    assert_eq!(snapshot.get("dir3..file4"), ".file4");
    assert_eq!(snapshot.get(".dir.file5"), ".dir");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_directory_refresher() {
    let base = tempfile::tempdir().unwrap();
    let base = base.path();
    let app = base.join("app");
    fs::create_dir_all(&app).unwrap();

    let loader = Loader::start(base, "app", DirectoryRefresher::new(), LoaderOptions::allow_dotfiles()).unwrap();
    let (tx, mut updates) = mpsc::channel(1);
    loader.add_update_callback(tx).unwrap();
    assert_eq!(loader.current().get("file1"), "");

    make_file_in_dir(base, &app.join("file1"), "hello");
    wait_for(&loader, &mut updates, |s| s.get("file1") == "hello").await;

    make_file_in_dir(base, &app.join("file2"), "hello2");
    wait_for(&loader, &mut updates, |s| s.get("file2") == "hello2").await;

    let mut f = fs::OpenOptions::new().write(true).open(app.join("file2")).unwrap();
    f.write_all(b"hello3").unwrap();
    f.sync_all().unwrap();
    drop(f);
    wait_for(&loader, &mut updates, |s| s.get("file2") == "hello3").await;

    assert_eq!(loader.current().get("file1"), "hello");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_directory_refresher_custom_ops() {
    let base = tempfile::tempdir().unwrap();
    let base = base.path();
    let app = base.join("app");
    fs::create_dir_all(&app).unwrap();
    fs::write(app.join("doomed"), "1").unwrap();

    let refresher = DirectoryRefresher::new().with_ops([loader::FileSystemOp::Remove]);
    let loader = Loader::start(base, "app", refresher, LoaderOptions::default()).unwrap();
    let (tx, mut updates) = mpsc::channel(1);
    loader.add_update_callback(tx).unwrap();
    assert_eq!(loader.current().get("doomed"), "1");

    fs::remove_file(app.join("doomed")).unwrap();
    wait_for(&loader, &mut updates, |s| s.is_empty()).await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_partial_failure_isolation() {
    let base = tempfile::tempdir().unwrap();
    let app = base.path().join("app");
    fs::create_dir_all(app.join("dir")).unwrap();
    fs::write(app.join("file1"), "hello").unwrap();
    fs::write(app.join("dir/file2"), "world").unwrap();
    // unreadable for every user, root included
    std::os::unix::fs::symlink(app.join("gone"), app.join("broken")).unwrap();

    let loader = Loader::start(base.path(), "app", DirectoryRefresher::new(), LoaderOptions::default()).unwrap();
    let snapshot = loader.current();
    assert_eq!(sorted_keys(&*snapshot), vec!["dir.file2", "file1"]);

    let stats = loader.stats();
    assert_eq!(stats.load_attempts, 1);
    assert_eq!(stats.load_failures, 1);
    assert_eq!(stats.num_values, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_non_blocking_fanout() {
    let base = tempfile::tempdir().unwrap();
    let base = base.path();
    let app = base.join("app");
    fs::create_dir_all(&app).unwrap();

    let loader = Loader::start(base, "app", DirectoryRefresher::new(), LoaderOptions::default()).unwrap();

    // registered first so it sits ahead of everyone else
    let (stuck_tx, _stuck_rx) = mpsc::channel(1);
    loader.add_update_callback(stuck_tx).unwrap();

    let mut drained = Vec::new();
    for _ in 0..10 {
        let (tx, rx) = mpsc::channel(1);
        loader.add_update_callback(tx).unwrap();
        drained.push(rx);
    }

    for round in 0..3 {
        let name = format!("file{}", round);
        make_file_in_dir(base, &app.join(&name), "x");
        for rx in drained.iter_mut() {
            timeout(TIMEOUT, rx.recv())
                .await
                .expect("drained subscriber starved")
                .unwrap();
        }
        // drop any extra coalesced signal so the next round waits on a fresh one
        let deadline = tokio::time::Instant::now() + TIMEOUT;
        while loader.current().get(&name) != "x" {
            assert!(tokio::time::Instant::now() < deadline);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        for rx in drained.iter_mut() {
            while rx.try_recv().is_ok() {}
        }
    }
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_readers_see_whole_snapshots() {
    let base = tempfile::tempdir().unwrap();
    let base = base.path().to_path_buf();

    let write_generation = |generation: usize| {
        for name in ["a", "b", "dir/c"] {
            let path = base.join(format!("gen{}/app/{}", generation, name));
            make_file_in_dir(&base, &path, &generation.to_string());
        }
    };

    write_generation(0);
    std::os::unix::fs::symlink(base.join("gen0"), base.join("current")).unwrap();
    let current = base.join("current");
    let loader = Loader::start(&current, "app", SymlinkRefresher::new(&current), LoaderOptions::default()).unwrap();
    let (tx, mut updates) = mpsc::channel(1);
    loader.add_update_callback(tx).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let loader = loader.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                let mut reads = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    let snapshot = loader.current();
                    let a = snapshot.get_integer("a", u64::MAX);
                    assert_eq!(a, snapshot.get_integer("b", u64::MAX - 1));
                    assert_eq!(a, snapshot.get_integer("dir.c", u64::MAX - 2));
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    for generation in 1..=5usize {
        write_generation(generation);
        let link = base.join("current_new");
        std::os::unix::fs::symlink(base.join(format!("gen{}", generation)), &link).unwrap();
        fs::rename(&link, &current).unwrap();
        wait_for(&loader, &mut updates, |s| s.get_integer("a", 0) == generation as u64).await;
    }

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert!(loader.stats().load_attempts >= 6);
}

#[tokio::test]
async fn test_nil_loader() {
    let runtime = loader::new("", "app", SymlinkRefresher::new(""), LoaderOptions::default()).unwrap();
    let snapshot = runtime.snapshot();
    assert_eq!(snapshot.get("anything"), "");
    assert_eq!(snapshot.get_integer("x", 100), 100);
    for _ in 0..1000 {
        assert!(snapshot.feature_enabled("y", 100));
        assert!(!snapshot.feature_enabled("y", 0));
    }

    let (tx, mut rx) = mpsc::channel(1);
    runtime.add_update_callback(tx).unwrap();
    assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
}

#[tokio::test]
async fn test_new_returns_watching_loader() {
    let base = tempfile::tempdir().unwrap();
    fs::create_dir_all(base.path().join("app")).unwrap();
    fs::write(base.path().join("app/pct"), "47").unwrap();

    let runtime: Arc<dyn RuntimeLoader> =
        loader::new(base.path(), "app", DirectoryRefresher::new(), LoaderOptions::default()).unwrap();
    let snapshot = runtime.snapshot();
    assert_eq!(snapshot.get_integer("pct", 0), 47);

    let enabled = (0..10_000u64)
        .filter(|id| snapshot.feature_enabled_for_id("pct", *id, 0))
        .count();
    assert!((4300..5100).contains(&enabled), "enabled {}", enabled);
    for id in 0..100u64 {
        assert_eq!(
            snapshot.feature_enabled_for_id("pct", id, 0),
            snapshot.feature_enabled_for_id("pct", id, 0)
        );
    }
}
