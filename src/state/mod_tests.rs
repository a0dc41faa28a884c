//! Tests for baseline persistence.

use std::sync::Arc;

use tempfile::TempDir;

use crate::state::{BaselineStore, FileBaselineStore, MemoryBaselineStore, StateError};

mod file_baseline_store {
    use super::*;

    fn store_in(dir: &TempDir) -> FileBaselineStore {
        FileBaselineStore::new(dir.path().join("current-ip.txt"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.load().unwrap().is_none());
        assert_eq!(store.read().unwrap(), "");
    }

    #[test]
    fn whitespace_only_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "  \n").unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn read_trims_surrounding_whitespace() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "203.0.113.1\n").unwrap();

        let baseline = store.load().unwrap().unwrap();

        assert_eq!(baseline.value, "203.0.113.1");
        assert!(baseline.persisted_at.is_some());
    }

    #[tokio::test]
    async fn write_then_read_returns_value() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write("203.0.113.9").await.unwrap();

        assert_eq!(store.read().unwrap(), "203.0.113.9");
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "203.0.113.9"
        );
    }

    #[tokio::test]
    async fn write_overwrites_in_place() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write("203.0.113.1").await.unwrap();
        store.write("203.0.113.9").await.unwrap();

        assert_eq!(store.read().unwrap(), "203.0.113.9");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp file must not linger");
    }

    #[tokio::test]
    async fn writing_same_value_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.write("203.0.113.9").await.unwrap();
        let before = std::fs::metadata(store.path()).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        store.write("203.0.113.9\n").await.unwrap();

        let after = std::fs::metadata(store.path()).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileBaselineStore::new(dir.path().join("nested/deeper/tunnel-url.txt"));

        store.write("https://abc.tunnel.example").await.unwrap();

        assert_eq!(store.read().unwrap(), "https://abc.tunnel.example");
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be read as a file.
        let store = FileBaselineStore::new(dir.path());

        assert!(matches!(store.load(), Err(StateError::Read(_))));
    }

    #[tokio::test]
    async fn write_into_file_as_directory_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let store = FileBaselineStore::new(blocker.join("baseline.txt"));

        let result = store.write("203.0.113.9").await;

        assert!(matches!(result, Err(StateError::Write(_))));
    }
}

mod memory_baseline_store {
    use super::*;

    #[test]
    fn starts_empty() {
        let store = MemoryBaselineStore::new();
        assert_eq!(store.read().unwrap(), "");
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn with_value_is_preloaded() {
        let store = MemoryBaselineStore::with_value("203.0.113.1");
        assert_eq!(store.read().unwrap(), "203.0.113.1");
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn counts_only_effective_writes() {
        let store = MemoryBaselineStore::new();

        store.write("203.0.113.1").await.unwrap();
        store.write("203.0.113.1").await.unwrap();
        store.write("203.0.113.9").await.unwrap();

        assert_eq!(store.writes(), 2);
        assert_eq!(store.read().unwrap(), "203.0.113.9");
    }

    #[tokio::test]
    async fn arc_delegates_to_inner_store() {
        let store = Arc::new(MemoryBaselineStore::new());

        BaselineStore::write(&store, "10.0.0.5").await.unwrap();

        assert_eq!(store.read().unwrap(), "10.0.0.5");
        assert_eq!(store.writes(), 1);
    }
}
