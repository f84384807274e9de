//! Backend Equivalence Tests
//!
//! Toyota Way: Jidoka (built-in quality)
//! Ensures Filesystem == Memory == ObjectStore for every storage primitive
//!
//! References:
//! - Property-based testing: Claessen & Hughes (2000) QuickCheck
//!
//! ## Test Strategy
//!
//! 1. **Operation sequences**: quickcheck generates random write / read /
//!    list / exists / delete sequences over a small path alphabet
//! 2. **Backend Equivalence**: every backend must produce the same outcome
//!    for every step
//! 3. **Edge Cases**: reads of deleted values, listing of never-written
//!    paths, empty payloads
//!
//! Writes always land two segments deep and deletes remove whole top-level
//! directories, so no path is ever both a value and a directory.

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use rubicon_db::backend::{Backend, FilesystemBackend, MemoryBackend, ObjectStoreBackend};
use rubicon_db::identity::StoragePath;

const DIRS: &[&str] = &["a", "b", "Iris Model"];
const LEAVES: &[&str] = &["metadata", "data", "lr#1"];

/// One storage primitive applied to a generated path
#[derive(Debug, Clone)]
enum Op {
    Write(&'static str, &'static str, Vec<u8>),
    Read(&'static str, &'static str),
    Exists(&'static str, &'static str),
    ListRoot,
    ListDir(&'static str),
    Delete(&'static str),
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let dir = *g.choose(DIRS).unwrap_or(&"a");
        let leaf = *g.choose(LEAVES).unwrap_or(&"metadata");
        match u8::arbitrary(g) % 6 {
            0 | 1 => Self::Write(dir, leaf, Vec::<u8>::arbitrary(g)),
            2 => Self::Read(dir, leaf),
            3 => Self::Exists(dir, leaf),
            4 => {
                if bool::arbitrary(g) {
                    Self::ListRoot
                } else {
                    Self::ListDir(dir)
                }
            }
            _ => Self::Delete(dir),
        }
    }
}

/// Backend-independent result of one step
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    Bytes(Vec<u8>),
    Names(Vec<String>),
    Flag(bool),
    NotFound,
    Failed,
}

impl<T> From<rubicon_db::Result<T>> for Outcome
where
    T: Into<Self>,
{
    fn from(result: rubicon_db::Result<T>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(e) if e.is_not_found() => Self::NotFound,
            Err(_) => Self::Failed,
        }
    }
}

impl From<()> for Outcome {
    fn from((): ()) -> Self {
        Self::Done
    }
}

impl From<Vec<u8>> for Outcome {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<String>> for Outcome {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<bool> for Outcome {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

fn path(segments: &[&str]) -> StoragePath {
    segments
        .iter()
        .fold(StoragePath::root(), |path, segment| path.join(*segment))
}

async fn apply<B: Backend>(backend: &B, op: &Op) -> Outcome {
    match op {
        Op::Write(dir, leaf, bytes) => backend.write(&path(&[*dir, *leaf]), bytes.clone()).await.into(),
        Op::Read(dir, leaf) => backend.read(&path(&[*dir, *leaf])).await.into(),
        Op::Exists(dir, leaf) => backend.exists(&path(&[*dir, *leaf])).await.into(),
        Op::ListRoot => backend.list(&StoragePath::root()).await.into(),
        Op::ListDir(dir) => backend.list(&path(&[*dir])).await.into(),
        Op::Delete(dir) => backend.delete(&path(&[*dir])).await.into(),
    }
}

async fn run<B: Backend>(backend: &B, ops: &[Op]) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(ops.len());
    for op in ops {
        outcomes.push(apply(backend, op).await);
    }
    outcomes
}

#[allow(clippy::needless_pass_by_value)]
fn prop_backends_agree(ops: Vec<Op>) -> TestResult {
    let Ok(dir) = tempfile::tempdir() else {
        return TestResult::discard();
    };
    let Ok(rt) = tokio::runtime::Builder::new_current_thread().enable_all().build() else {
        return TestResult::discard();
    };

    let (filesystem, memory, object_store) = rt.block_on(async {
        (
            run(&FilesystemBackend::new(dir.path()), &ops).await,
            run(&MemoryBackend::isolated("equivalence"), &ops).await,
            run(&ObjectStoreBackend::in_memory("equivalence"), &ops).await,
        )
    });

    if filesystem.contains(&Outcome::Failed) {
        return TestResult::error(format!("filesystem backend failed: {ops:?}"));
    }
    TestResult::from_bool(filesystem == memory && memory == object_store)
}

#[test]
fn test_backends_agree_on_random_operation_sequences() {
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop_backends_agree as fn(Vec<Op>) -> TestResult);
}

#[tokio::test]
async fn test_backends_agree_on_fixed_sequence() {
    let ops = vec![
        Op::ListRoot,
        Op::Read("a", "metadata"),
        Op::Write("a", "metadata", b"one".to_vec()),
        Op::Write("a", "lr#1", Vec::new()),
        Op::Write("Iris Model", "data", b"two".to_vec()),
        Op::ListRoot,
        Op::ListDir("a"),
        Op::Exists("a", "data"),
        Op::Read("a", "lr#1"),
        Op::Delete("a"),
        Op::Delete("a"),
        Op::Read("a", "metadata"),
        Op::ListRoot,
    ];

    let dir = tempfile::tempdir().unwrap();
    let filesystem = run(&FilesystemBackend::new(dir.path()), &ops).await;
    let memory = run(&MemoryBackend::isolated("fixed"), &ops).await;
    let object_store = run(&ObjectStoreBackend::in_memory("fixed"), &ops).await;

    assert_eq!(filesystem, memory);
    assert_eq!(memory, object_store);
    assert_eq!(
        filesystem.last(),
        Some(&Outcome::Names(vec!["Iris Model".to_string()]))
    );
    assert_eq!(filesystem[8], Outcome::Bytes(Vec::new()));
}
