//! Shared test utilities for the agency-site test suite.
//!
//! Provides a hand-driven clock for cache tests, recording implementations of
//! the notification/confirmation/object-store seams, a store that fails on
//! demand, image byte fixtures, and lookup helpers that panic with a clear
//! message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let notifier = RecordingNotifier::default();
//! let mut editor = CollectionEditor::<Banner>::new(&store, &notifier);
//! editor.add().unwrap();
//! assert_eq!(notifier.messages(), ["Banner added!"]);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::cache::Clock;
use crate::content::Record;
use crate::notify::{Confirm, Level, Notification, Notifier};
use crate::store::{ContentStore, MemoryStore, Row, StoreError, Table};
use crate::upload::{ObjectStore, UploadError};

// =========================================================================
// Time
// =========================================================================

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// =========================================================================
// Notification and confirmation seams
// =========================================================================

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.seen.borrow().iter().map(|n| n.message.clone()).collect()
    }

    pub fn levels(&self) -> Vec<Level> {
        self.seen.borrow().iter().map(|n| n.level).collect()
    }

    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.borrow_mut().push(notification);
    }
}

/// Answers every prompt with a fixed reply and remembers the prompts.
#[derive(Debug)]
pub struct ScriptedConfirm {
    reply: bool,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn yes() -> Self {
        Self {
            reply: true,
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn no() -> Self {
        Self {
            reply: false,
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.reply
    }
}

// =========================================================================
// Storage doubles
// =========================================================================

/// Object store that keeps keys in memory and serves `https://cdn.test/`.
#[derive(Debug, Default)]
pub struct RecordingObjectStore {
    keys: RefCell<Vec<String>>,
}

impl RecordingObjectStore {
    pub fn keys(&self) -> Vec<String> {
        self.keys.borrow().clone()
    }
}

impl ObjectStore for RecordingObjectStore {
    fn put(&self, key: &str, _bytes: &[u8], _content_type: &str) -> Result<(), UploadError> {
        self.keys.borrow_mut().push(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.test/{key}")
    }
}

/// Memory store whose reads and writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: Cell<bool>,
    pub fail_writes: Cell<bool>,
}

impl FlakyStore {
    fn outage() -> StoreError {
        StoreError::Io(std::io::Error::other("store unavailable"))
    }
}

impl ContentStore for FlakyStore {
    fn select(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        if self.fail_reads.get() {
            return Err(Self::outage());
        }
        self.inner.select(table)
    }

    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        if self.fail_writes.get() {
            return Err(Self::outage());
        }
        self.inner.insert(table, row)
    }

    fn update(&self, table: Table, id: &str, row: Row) -> Result<Row, StoreError> {
        if self.fail_writes.get() {
            return Err(Self::outage());
        }
        self.inner.update(table, id, row)
    }

    fn delete(&self, table: Table, id: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(Self::outage());
        }
        self.inner.delete(table, id)
    }
}

// =========================================================================
// Image fixtures
// =========================================================================

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

fn padded(signature: &[u8], len: usize) -> Vec<u8> {
    let mut bytes = signature.to_vec();
    bytes.resize(len.max(signature.len()), 0);
    bytes
}

/// `len` bytes that sniff as PNG.
pub fn png_bytes(len: usize) -> Vec<u8> {
    padded(PNG_SIGNATURE, len)
}

/// `len` bytes that sniff as JPEG.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    padded(JPEG_SIGNATURE, len)
}

// =========================================================================
// Record lookups, panic with a clear message on miss
// =========================================================================

/// Find a record by id. Panics if not found.
pub fn find_by_id<'a, R: Record>(records: &'a [R], id: &str) -> &'a R {
    records.iter().find(|r| r.id() == id).unwrap_or_else(|| {
        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        panic!("{} '{id}' not found. Available: {ids:?}", R::NOUN)
    })
}

/// All record labels in list order.
pub fn labels<R: Record>(records: &[R]) -> Vec<String> {
    records.iter().map(Record::label).collect()
}
