use kvport::common::{KeyType, Value};
use kvport::errors::KvPortResult;
use kvport::fields;
use kvport::store::memory::{InMemoryAdapterModule, InMemoryDataset};
use kvport::store::{AdapterContext, AdapterRegistry, BackendKind, StoreAdapter};
use kvport_fjall_adapter::FjallAdapterModule;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs, thread};

/// A registry with both backends: an in-memory store and a fjall store under a
/// fresh temporary directory.
pub struct TestContext {
    path: String,
    dataset: InMemoryDataset,
    registry: AdapterRegistry,
}

impl TestContext {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Data behind every in-memory adapter of this context.
    pub fn dataset(&self) -> &InMemoryDataset {
        &self.dataset
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Connects a standalone adapter for `kind`.
    pub fn connect(&self, kind: BackendKind) -> KvPortResult<StoreAdapter> {
        self.registry.connect(&AdapterContext::standalone(kind))
    }
}

pub fn create_test_context() -> TestContext {
    let path = random_path();
    let dataset = InMemoryDataset::new();
    let mut registry = AdapterRegistry::new();
    registry
        .register(InMemoryAdapterModule::with_dataset(dataset.clone()))
        .register(FjallAdapterModule::with_config().db_path(&path).build());

    TestContext {
        path,
        dataset,
        registry,
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    PathBuf::from(env::temp_dir())
        .join(format!("kvport-{}", id))
        .to_string_lossy()
        .to_string()
}

/// Drops the context and removes its fjall directory.
pub fn cleanup(ctx: TestContext) {
    let path = ctx.path.clone();
    drop(ctx);

    let mut retry = 0;
    while fs::metadata(&path).is_ok() && fs::remove_dir_all(&path).is_err() && retry < 2 {
        thread::sleep(Duration::from_millis(100));
        retry += 1;
    }
}

/// Writes a small forum-shaped dataset the way a string-typed engine holds it,
/// plus keys that must never be ported.
pub fn seed_forum(adapter: &StoreAdapter) -> KvPortResult<()> {
    adapter.write_scalar("cfg:title", "My Forum")?;
    adapter.write_hash(
        "global",
        &fields! { "nextUid": "3", "title": "My Forum", "open": "true" },
    )?;
    adapter.write_hash(
        "user:1",
        &fields! { "uid": "1", "username": "alice", "reputation": "-5", "banned": "false" },
    )?;
    adapter.write_hash(
        "user:2",
        &fields! { "uid": "2", "username": "true", "website": "1.5" },
    )?;
    adapter.add_set_members(
        "group:administrators:members",
        &["1".to_string(), "2".to_string()],
    )?;
    adapter.add_ordered_set_members(
        "users:joindate",
        &[1_500_000_000_000.0, 1_400_000_000_000.0],
        &["1".to_string(), "2".to_string()],
    )?;
    for version in ["v1", "v2", "v1"] {
        adapter.append_list_item("post:1:history", version)?;
    }

    adapter.write_scalar("sess:abc", "{\"cookie\":{}}")?;
    adapter.write_hash("nodebbpostsearch:1", &fields! { "content": "hello" })?;
    adapter.add_set_members("nodebbtopicsearch:2", &["word".to_string()])?;
    Ok(())
}

/// Portable keys written by [`seed_forum`].
pub const FORUM_PORTABLE_KEYS: [&str; 7] = [
    "cfg:title",
    "global",
    "group:administrators:members",
    "post:1:history",
    "user:1",
    "user:2",
    "users:joindate",
];

/// Readable dump of every key, independent of backend ordering details.
pub fn snapshot(adapter: &StoreAdapter) -> KvPortResult<BTreeMap<String, String>> {
    let mut dump = BTreeMap::new();
    for key in adapter.list_keys()? {
        let rendered = match adapter.type_of(&key)? {
            KeyType::Scalar => format!("string {:?}", adapter.read_scalar(&key)?),
            KeyType::Hash => {
                let fields: BTreeMap<String, Value> = adapter.read_hash(&key)?.into_iter().collect();
                format!("hash {:?}", fields)
            }
            KeyType::Set => {
                let mut members = adapter.read_set_members(&key)?;
                members.sort();
                format!("set {:?}", members)
            }
            KeyType::OrderedSet => format!("zset {:?}", adapter.read_ordered_set_scores(&key)?),
            KeyType::List => format!("list {:?}", adapter.read_list_range(&key, 0, -1)?),
            KeyType::None => continue,
        };
        dump.insert(key, rendered);
    }
    Ok(dump)
}
