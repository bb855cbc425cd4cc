//! End-to-end sync passes over real stores.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Notify;

use vaultsync::crypt::{EncryptedStore, EncryptionKey};
use vaultsync::store::{
    FileStore, MemoryStore, MemoryWatermark, Result as StoreResult, SqliteStore, WatermarkStore,
};
use vaultsync::{ActionKind, EngineError, FileRecord, Strategy, SyncEngine, SyncSettings, Timestamp};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

type SharedEngine = SyncEngine<MemoryStore, Arc<MemoryStore>, MemoryWatermark>;

fn host_on(remote: &Arc<MemoryStore>, settings: SyncSettings) -> Result<SharedEngine> {
    Ok(SyncEngine::new(
        MemoryStore::new(),
        remote.clone(),
        MemoryWatermark::default(),
        settings,
    )?)
}

#[tokio::test]
async fn test_edit_propagates_between_hosts() -> Result<()> {
    init_tracing();
    let remote = Arc::new(MemoryStore::new());
    let laptop = host_on(&remote, SyncSettings::default())?;
    let phone = host_on(&remote, SyncSettings::default())?;

    laptop.host().put("notes/a.md", &b"# Draft\n"[..], 100)?;
    let report = laptop.sync_at(1_000).await?;
    assert_eq!(report.count(ActionKind::Push), 1);

    let report = phone.sync_at(1_100).await?;
    assert_eq!(report.count(ActionKind::Pull), 1);
    assert_eq!(
        phone.host().content("notes/a.md"),
        Some(Bytes::from_static(b"# Draft\n"))
    );

    // Both hosts idle afterwards
    assert!(laptop.sync_at(1_200).await?.is_noop());
    assert!(phone.sync_at(1_300).await?.is_noop());
    Ok(())
}

#[tokio::test]
async fn test_deletion_propagates_and_remote_keeps_tombstone() -> Result<()> {
    init_tracing();
    let remote = Arc::new(MemoryStore::new());
    let laptop = host_on(&remote, SyncSettings::default())?;
    let phone = host_on(&remote, SyncSettings::default())?;

    laptop.host().put("old.md", &b"bye"[..], 100)?;
    laptop.sync_at(1_000).await?;
    phone.sync_at(1_100).await?;

    laptop.host().delete("old.md", 2_000)?;
    let report = laptop.sync_at(2_100).await?;
    assert_eq!(report.count(ActionKind::Remove), 1);
    assert!(remote.record("old.md").is_some_and(|r| r.is_tombstone()));
    assert!(laptop.host().record("old.md").is_none());

    let report = phone.sync_at(2_200).await?;
    assert_eq!(report.count(ActionKind::Remove), 1);
    assert!(phone.host().record("old.md").is_none());

    // The remote tombstone outlives both hosts' bookkeeping
    assert!(remote.record("old.md").is_some_and(|r| r.is_tombstone()));
    assert!(laptop.preview().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_recreated_file_survives_old_tombstone() -> Result<()> {
    init_tracing();
    let remote = Arc::new(MemoryStore::new());
    remote.seed(FileRecord::tombstone("todo.md", 500), Bytes::new())?;

    let engine = host_on(&remote, SyncSettings::default())?;
    engine.host().put("todo.md", &b"- new list\n"[..], 800)?;

    let report = engine.sync_at(1_000).await?;
    assert_eq!(report.count(ActionKind::Push), 1);
    assert_eq!(
        remote.content("todo.md"),
        Some(Bytes::from_static(b"- new list\n"))
    );
    Ok(())
}

#[tokio::test]
async fn test_concurrent_text_edits_merge() -> Result<()> {
    init_tracing();
    let remote = Arc::new(MemoryStore::new());
    let engine = host_on(&remote, SyncSettings::default())?;

    engine.host().put("config.json", &b"{\n  \"a\": 1\n}\n"[..], 100)?;
    engine.sync_at(1_000).await?;

    engine.host().put("config.json", &b"{\n  \"a\": 2\n}\n"[..], 1_500)?;
    remote.put("config.json", &b"{\n  \"a\": 3\n}\n"[..], 1_600)?;

    let report = engine.sync_at(2_000).await?;
    assert_eq!(report.count(ActionKind::Conflict), 1);

    // Older-as-base merge: the newer side's text carries through
    let expected = Bytes::from_static(b"{\n  \"a\": 3\n}\n");
    assert_eq!(engine.host().content("config.json"), Some(expected.clone()));
    assert_eq!(remote.content("config.json"), Some(expected));
    assert!(engine.verify().await?.is_converged());
    assert!(engine.preview().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_same_timestamp_different_content_converges() -> Result<()> {
    init_tracing();
    let remote = Arc::new(MemoryStore::new());
    let engine = host_on(&remote, SyncSettings::default())?;

    engine.host().put("n.md", &b"host edit\n"[..], 300)?;
    remote.put("n.md", &b"a longer remote edit of this note\n"[..], 300)?;

    let report = engine.sync_at(1_000).await?;
    assert_eq!(report.count(ActionKind::Conflict), 1);

    // Host counts as older on a tie, so the remote text wins the merge
    let expected = Bytes::from_static(b"a longer remote edit of this note\n");
    assert_eq!(engine.host().content("n.md"), Some(expected.clone()));
    assert_eq!(remote.content("n.md"), Some(expected));
    assert!(engine.verify().await?.is_converged());
    assert!(engine.sync_at(2_000).await?.is_noop());
    Ok(())
}

#[tokio::test]
async fn test_binary_conflict_follows_rules() -> Result<()> {
    init_tracing();
    let remote = Arc::new(MemoryStore::new());
    let settings = SyncSettings::from_json(
        r#"{
            "conflict_rules": [{ "glob": "*.png", "strategy": "always-push" }],
            "fallback_strategy": "ignore"
        }"#,
    )?;
    let engine = host_on(&remote, settings)?;

    engine.host().put("img.png", Bytes::from_static(&[1]), 100)?;
    engine.host().put("doc.pdf", Bytes::from_static(&[1]), 100)?;
    engine.sync_at(1_000).await?;

    engine.host().put("img.png", Bytes::from_static(&[2]), 1_100)?;
    engine.host().put("doc.pdf", Bytes::from_static(&[2]), 1_100)?;
    remote.put("img.png", Bytes::from_static(&[3]), 1_200)?;
    remote.put("doc.pdf", Bytes::from_static(&[3]), 1_200)?;

    let report = engine.sync_at(2_000).await?;
    assert_eq!(report.count(ActionKind::Conflict), 2);

    assert_eq!(remote.content("img.png"), Some(Bytes::from_static(&[2])));
    // Ignored: both sides keep their own bytes
    assert_eq!(remote.content("doc.pdf"), Some(Bytes::from_static(&[3])));
    assert_eq!(engine.host().content("doc.pdf"), Some(Bytes::from_static(&[2])));
    Ok(())
}

#[tokio::test]
async fn test_exclusions_apply_to_both_sides() -> Result<()> {
    init_tracing();
    let remote = Arc::new(MemoryStore::new());
    let settings = SyncSettings::from_json(r#"{ "exclusions": ".obsidian/**\n*.tmp" }"#)?;
    let engine = host_on(&remote, settings)?;

    engine.host().put(".obsidian/workspace.json", &b"{}"[..], 100)?;
    engine.host().put("scratch.tmp", &b"x"[..], 100)?;
    remote.put(".obsidian/plugins.json", &b"[]"[..], 100)?;
    engine.host().put("keep.md", &b"k"[..], 100)?;

    let report = engine.sync_at(1_000).await?;
    assert_eq!(report.actions.len(), 1);
    assert_eq!(report.actions[0].path(), "keep.md");

    assert!(remote.record(".obsidian/workspace.json").is_none());
    assert!(engine.host().record(".obsidian/plugins.json").is_none());
    assert!(engine.verify().await?.is_converged());
    Ok(())
}

/// Applies a foreign write right after every listing, as if another host
/// raced this one.
struct RacingStore {
    inner: MemoryStore,
    race: Mutex<Option<(String, Bytes, Timestamp)>>,
}

#[async_trait]
impl FileStore for RacingStore {
    async fn list_files(&self) -> StoreResult<Vec<FileRecord>> {
        let records = self.inner.list_files().await?;
        let pending = self.race.lock().map(|mut r| r.take()).unwrap_or(None);
        if let Some((path, content, at)) = pending {
            self.inner.put(&path, content, at)?;
        }
        Ok(records)
    }

    async fn get_file_content(&self, path: &str) -> StoreResult<Bytes> {
        self.inner.get_file_content(path).await
    }

    async fn update(
        &self,
        path: &str,
        content: Bytes,
        prev: Timestamp,
        new: Timestamp,
    ) -> StoreResult<()> {
        self.inner.update(path, content, prev, new).await
    }

    async fn remove(&self, path: &str, prev: Timestamp, now: Timestamp) -> StoreResult<()> {
        self.inner.remove(path, prev, now).await
    }

    async fn touch(&self, path: &str, prev: Timestamp, new: Timestamp) -> StoreResult<()> {
        self.inner.touch(path, prev, new).await
    }

    async fn prune(&self, path: &str) -> StoreResult<()> {
        self.inner.prune(path).await
    }
}

#[tokio::test]
async fn test_stale_write_aborts_pass_and_keeps_watermark() -> Result<()> {
    init_tracing();
    let remote = RacingStore {
        inner: MemoryStore::new(),
        race: Mutex::new(None),
    };
    remote.inner.put("shared.md", &b"v1"[..], 100)?;
    let engine = SyncEngine::new(
        MemoryStore::new(),
        remote,
        MemoryWatermark::starting_at(500),
        SyncSettings::default(),
    )?;
    engine.host().put("shared.md", &b"v2"[..], 900)?;
    *engine.remote().race.lock().unwrap() =
        Some(("shared.md".into(), Bytes::from_static(b"v3"), 950));

    let err = engine.sync_at(1_000).await.unwrap_err();
    assert!(err.is_stale_write(), "{err}");
    assert_eq!(engine.watermark().get(), 500);
    assert!(!engine.is_running());

    // The racing write survives and the retry sees both sides changed
    assert_eq!(
        engine.remote().inner.content("shared.md"),
        Some(Bytes::from_static(b"v3"))
    );
    let report = engine.sync_at(2_000).await?;
    assert_eq!(report.count(ActionKind::Conflict), 1);
    assert_eq!(engine.host().content("shared.md"), Some(Bytes::from_static(b"v3")));
    assert_eq!(engine.watermark().get(), 2_000);
    Ok(())
}

/// Blocks the first listing until released.
struct GatedStore {
    inner: MemoryStore,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl FileStore for GatedStore {
    async fn list_files(&self) -> StoreResult<Vec<FileRecord>> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.list_files().await
    }

    async fn get_file_content(&self, path: &str) -> StoreResult<Bytes> {
        self.inner.get_file_content(path).await
    }

    async fn update(
        &self,
        path: &str,
        content: Bytes,
        prev: Timestamp,
        new: Timestamp,
    ) -> StoreResult<()> {
        self.inner.update(path, content, prev, new).await
    }

    async fn remove(&self, path: &str, prev: Timestamp, now: Timestamp) -> StoreResult<()> {
        self.inner.remove(path, prev, now).await
    }

    async fn touch(&self, path: &str, prev: Timestamp, new: Timestamp) -> StoreResult<()> {
        self.inner.touch(path, prev, new).await
    }

    async fn prune(&self, path: &str) -> StoreResult<()> {
        self.inner.prune(path).await
    }
}

#[tokio::test]
async fn test_second_pass_refused_while_running() -> Result<()> {
    init_tracing();
    let host = GatedStore {
        inner: MemoryStore::new(),
        entered: Notify::new(),
        release: Notify::new(),
    };
    let engine = SyncEngine::new(
        host,
        MemoryStore::new(),
        MemoryWatermark::default(),
        SyncSettings::default(),
    )?;

    let first = engine.sync_at(1_000);
    let second = async {
        engine.host().entered.notified().await;
        let result = engine.sync_at(1_001).await;
        engine.host().release.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(matches!(second, Err(EngineError::AlreadyRunning)));
    assert_eq!(engine.watermark().get(), 1_000);
    Ok(())
}

#[tokio::test]
async fn test_sqlite_remote_and_watermark() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let remote_path = dir.path().join("remote.db");
    let state_path = dir.path().join("state.db");

    {
        let engine = SyncEngine::new(
            MemoryStore::new(),
            SqliteStore::open(&remote_path)?,
            SqliteStore::open(&state_path)?,
            SyncSettings::default(),
        )?;
        engine.host().put("notes/persist.md", &b"kept"[..], 100)?;
        engine.sync_at(1_000).await?;
    }

    let engine = SyncEngine::new(
        MemoryStore::new(),
        SqliteStore::open(&remote_path)?,
        SqliteStore::open(&state_path)?,
        SyncSettings::default(),
    )?;
    assert_eq!(engine.watermark().load_watermark().await?, 1_000);

    let report = engine.sync_at(2_000).await?;
    assert_eq!(report.count(ActionKind::Pull), 1);
    assert_eq!(
        engine.host().content("notes/persist.md"),
        Some(Bytes::from_static(b"kept"))
    );
    Ok(())
}

#[tokio::test]
async fn test_encrypted_remote() -> Result<()> {
    init_tracing();
    let key = EncryptionKey::from_passphrase("hunter2", "vault-1");
    let engine = SyncEngine::new(
        MemoryStore::new(),
        EncryptedStore::new(MemoryStore::new(), key),
        MemoryWatermark::default(),
        SyncSettings {
            fallback_strategy: Strategy::AlwaysPull,
            ..Default::default()
        },
    )?;

    engine.host().put("secret.md", &b"meet at noon"[..], 100)?;
    engine.sync_at(1_000).await?;

    let at_rest = engine.remote().inner().content("secret.md");
    assert!(at_rest.is_some_and(|b| !b.starts_with(b"meet")));
    assert!(engine.verify().await?.is_converged());
    assert!(engine.preview().await?.is_empty());
    Ok(())
}
