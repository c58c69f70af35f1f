use satchel_core::{ItemKey, ItemStack};
use std::path::Path;
use tempfile::TempDir;

/// Item record with the given key (default namespace allowed), quantity and
/// max. Panics on an invalid key.
pub fn stack(key: &str, quantity: u32, max: u32) -> ItemStack {
    let key = ItemKey::parse(key).unwrap_or_else(|err| panic!("fixture key {key:?}: {err}"));
    ItemStack::new(key, quantity, max)
}

/// Non-stackable record (max 1).
pub fn single(key: &str) -> ItemStack {
    stack(key, 1, 1)
}

/// Install a test-friendly tracing subscriber honouring `RUST_LOG`. Safe to
/// call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Unique temporary directory, removed on drop.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create `<tmp>/satchel_<label>_<random>`.
    pub fn new(label: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("satchel_{label}_"))
            .tempdir()
            .unwrap_or_else(|err| panic!("create scratch dir for {label}: {err}"));
        Self { dir }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
