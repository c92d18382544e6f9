// Disk-backed response cache sitting in front of the completion endpoint.
//
// Every distinct prompt maps to one file `<dir>/<sha256 hex>.json` holding
// the response text as a JSON string. Entries are never mutated, expired or
// evicted; pruning the directory is left to the operator.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::future::Future;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::client::Completer;
use crate::error::{CacheError, CompletionError};
use crate::metrics::{
    CACHE_HITS, CACHE_MISSES, CACHE_WRITE_FAILURES, ENTRIES_WRITTEN, REMOTE_FAILURES,
};

const ENTRY_EXTENSION: &str = "json";
const SCRATCH_DIR: &str = "tmp";

// Which parts of a request feed the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScope {
    // Only the user prompt: requests differing only in system instruction share one entry
    #[default]
    Prompt,
    // System instruction and prompt, in a separate keyspace from `Prompt`
    PromptAndSystem,
}

// What to do when a fetched response cannot be persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    // Log a warning and still hand the response to the caller
    #[default]
    Warn,
    // Fail the call with the write error
    Strict,
}

// Hex encoded SHA-256 fingerprint of a request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_prompt(prompt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    // Length-prefixed so moving text between the two fields changes the key
    pub fn for_request(system: &str, prompt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((system.len() as u64).to_le_bytes());
        hasher.update(system.as_bytes());
        hasher.update((prompt.len() as u64).to_le_bytes());
        hasher.update(prompt.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn scoped(scope: KeyScope, system: &str, prompt: &str) -> Self {
        match scope {
            KeyScope::Prompt => Self::for_prompt(prompt),
            KeyScope::PromptAndSystem => Self::for_request(system, prompt),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Prefix used in log lines
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// The persisted unit, serialized as a bare JSON string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheEntry {
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    // Another writer got there first; its entry is kept
    AlreadyPresent,
}

// Directory of cache entries, one file per key
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    // Ok(None) when no entry exists. A file that exists but cannot be read
    // or decoded is an error, never a miss.
    pub async fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(key);
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Read { path, source }),
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| CacheError::Decode { path, source })
    }

    // Writes into the scratch directory and moves the file into place
    // without replacing an existing entry
    pub async fn save(&self, key: &CacheKey, entry: &CacheEntry) -> Result<SaveOutcome, CacheError> {
        let path = self.entry_path(key);
        let write_err = |source: std::io::Error| CacheError::Write {
            path: path.clone(),
            source,
        };

        let json = serde_json::to_string(entry).map_err(|e| write_err(e.into()))?;
        let scratch = self.root.join(SCRATCH_DIR);
        tokio::fs::create_dir_all(&scratch).await.map_err(write_err)?;

        // tempfile write, fsync and rename are blocking
        let target = path.clone();
        tokio::task::spawn_blocking(move || persist_entry(&scratch, &target, json.as_bytes()))
            .await
            .map_err(|e| write_err(std::io::Error::other(e)))?
            .map_err(write_err)
    }

    // Number of entries on disk. A missing directory holds none.
    pub fn count(&self) -> std::io::Result<usize> {
        Ok(self.entry_files()?.len())
    }

    // Deletes every entry and the scratch directory, returning how many
    // entries were removed
    pub fn clear(&self) -> std::io::Result<usize> {
        let files = self.entry_files()?;
        for file in &files {
            std::fs::remove_file(file)?;
        }
        match std::fs::remove_dir_all(self.root.join(SCRATCH_DIR)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        Ok(files.len())
    }

    fn entry_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let dir = match std::fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut files = Vec::new();
        for item in dir {
            let path = item?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

fn persist_entry(scratch: &Path, path: &Path, json: &[u8]) -> std::io::Result<SaveOutcome> {
    let mut tmp = tempfile::Builder::new()
        .prefix("entry-")
        .suffix(".json")
        .tempfile_in(scratch)?;
    tmp.write_all(json)?;
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(SaveOutcome::Written),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(SaveOutcome::AlreadyPresent),
        Err(e) => Err(e.error),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Store,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub text: String,
    pub source: Source,
}

impl Fetched {
    pub fn cached(&self) -> bool {
        self.source == Source::Store
    }
}

type Gates = DashMap<CacheKey, Arc<Mutex<()>>>;

// A caller's membership in the per-key miss gate. Dropping it, whether the
// fetch finished or its future was cancelled, removes the gate once no other
// caller holds it.
struct InFlight<'a> {
    gates: &'a Gates,
    key: &'a CacheKey,
    gate: Arc<Mutex<()>>,
}

impl<'a> InFlight<'a> {
    fn join(gates: &'a Gates, key: &'a CacheKey) -> Self {
        let gate = gates.entry(key.clone()).or_default().clone();
        Self { gates, key, gate }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // our handle must be gone before counting the others
        drop(std::mem::take(&mut self.gate));
        self.gates
            .remove_if(self.key, |_, gate| Arc::strong_count(gate) == 1);
    }
}

// Serves repeated prompts from the store and only calls the remote service
// on a miss.
//
// Misses for the same key are serialized inside one process, so concurrent
// callers asking the same new prompt trigger a single remote call. Across
// processes the first persisted entry wins.
pub struct ResponseCache {
    store: Store,
    scope: KeyScope,
    write_policy: WritePolicy,
    in_flight: Gates,
}

impl ResponseCache {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            scope: KeyScope::default(),
            write_policy: WritePolicy::default(),
            in_flight: DashMap::new(),
        }
    }

    pub fn with_key_scope(mut self, scope: KeyScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn key_for(&self, system: &str, prompt: &str) -> CacheKey {
        CacheKey::scoped(self.scope, system, prompt)
    }

    // Returns the stored response for `prompt`, or calls `invoke` with the
    // system instruction and prompt, persists its answer and returns it.
    // A failed `invoke` is passed through and nothing is written.
    pub async fn fetch<F, Fut>(
        &self,
        system: &str,
        prompt: &str,
        invoke: F,
    ) -> Result<String, CacheError>
    where
        F: FnOnce(String, String) -> Fut,
        Fut: Future<Output = Result<String, CompletionError>>,
    {
        self.fetch_detailed(system, prompt, invoke)
            .await
            .map(|fetched| fetched.text)
    }

    pub async fn fetch_with(
        &self,
        system: &str,
        prompt: &str,
        completer: &dyn Completer,
    ) -> Result<Fetched, CacheError> {
        self.fetch_detailed(system, prompt, move |system, prompt| async move {
            completer.complete(&system, &prompt).await
        })
        .await
    }

    // Like `fetch` but also reports where the text came from
    pub async fn fetch_detailed<F, Fut>(
        &self,
        system: &str,
        prompt: &str,
        invoke: F,
    ) -> Result<Fetched, CacheError>
    where
        F: FnOnce(String, String) -> Fut,
        Fut: Future<Output = Result<String, CompletionError>>,
    {
        let key = self.key_for(system, prompt);

        if let Some(entry) = self.store.load(&key).await? {
            return Ok(self.hit(&key, entry));
        }

        let in_flight = InFlight::join(&self.in_flight, &key);
        let _turn = in_flight.gate.lock().await;

        self.fill(&key, system, prompt, invoke).await
    }

    async fn fill<F, Fut>(
        &self,
        key: &CacheKey,
        system: &str,
        prompt: &str,
        invoke: F,
    ) -> Result<Fetched, CacheError>
    where
        F: FnOnce(String, String) -> Fut,
        Fut: Future<Output = Result<String, CompletionError>>,
    {
        // filled by another caller while we waited on the gate
        if let Some(entry) = self.store.load(key).await? {
            return Ok(self.hit(key, entry));
        }

        CACHE_MISSES.inc();
        info!(key = key.short(), "cache miss, calling completion endpoint");

        let text = match invoke(system.to_string(), prompt.to_string()).await {
            Ok(text) => text,
            Err(e) => {
                REMOTE_FAILURES.inc();
                error!(key = key.short(), error = %e, "completion failed");
                return Err(e.into());
            }
        };

        let entry = CacheEntry { response: text };
        match self.store.save(key, &entry).await {
            Ok(SaveOutcome::Written) => {
                ENTRIES_WRITTEN.inc();
                debug!(key = key.short(), "response saved to cache");
            }
            Ok(SaveOutcome::AlreadyPresent) => {
                debug!(key = key.short(), "entry already written by another process, keeping it");
            }
            Err(e) => {
                CACHE_WRITE_FAILURES.inc();
                match self.write_policy {
                    WritePolicy::Strict => return Err(e),
                    WritePolicy::Warn => {
                        warn!(key = key.short(), error = %e, "could not persist response, returning it uncached")
                    }
                }
            }
        }

        Ok(Fetched {
            text: entry.response,
            source: Source::Remote,
        })
    }

    fn hit(&self, key: &CacheKey, entry: CacheEntry) -> Fetched {
        CACHE_HITS.inc();
        info!(key = key.short(), "loading response from cache");
        Fetched {
            text: entry.response,
            source: Source::Store,
        }
    }
}
