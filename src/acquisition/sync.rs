// src/acquisition/sync.rs
//! Synchronization modes pacing the engine against a consumer
//!
//! Each mode owns exactly the signals it needs, so dispatch is a match
//! over the variant instead of mode switches scattered across call
//! sites. The signals are counting semaphores: `permission` gates the
//! start of an iteration (initially granted), `data_ready` is posted
//! after a chunk lands in the public buffer.

use crate::acquisition::buffer::PublicBuffer;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Synchronization policy of a session, fixed at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// No handshake; the engine runs at hardware pace
    Free,
    /// Strict alternation with one consumer via permission/data-ready
    Display,
    /// Permission owned by an external subsystem; the engine only waits
    External,
}

/// Counting semaphore on the crate's lock stack
pub(crate) struct Semaphore {
    count: Mutex<usize>,
    cvar: Condvar,
}

impl Semaphore {
    pub(crate) fn new(initial: usize) -> Self {
        Self {
            count: Mutex::new(initial),
            cvar: Condvar::new(),
        }
    }

    pub(crate) fn post(&self) {
        let mut count = self.count.lock();
        *count += 1;
        drop(count);
        self.cvar.notify_one();
    }

    pub(crate) fn wait(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.cvar.wait(&mut count);
        }
        *count -= 1;
    }

    /// Wait with a deadline; returns `false` on timeout
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count == 0 {
            if self.cvar.wait_until(&mut count, deadline).timed_out() {
                return false;
            }
        }
        *count -= 1;
        true
    }
}

/// The signals belonging to the active mode
pub(crate) enum SyncSignals {
    Free,
    Display {
        permission: Arc<Semaphore>,
        data_ready: Arc<Semaphore>,
    },
    External {
        permission: Arc<Semaphore>,
    },
}

impl SyncSignals {
    /// Create the signal set for `mode`. Permission starts granted so
    /// the first iteration needs no consumer action; data-ready starts
    /// empty.
    pub(crate) fn for_mode(mode: SyncMode) -> Self {
        match mode {
            SyncMode::Free => SyncSignals::Free,
            SyncMode::Display => SyncSignals::Display {
                permission: Arc::new(Semaphore::new(1)),
                data_ready: Arc::new(Semaphore::new(0)),
            },
            SyncMode::External => SyncSignals::External {
                permission: Arc::new(Semaphore::new(1)),
            },
        }
    }

    /// Engine side: block until this iteration may start
    pub(crate) fn wait_permission(&self) {
        match self {
            SyncSignals::Free => {}
            SyncSignals::Display { permission, .. } => permission.wait(),
            SyncSignals::External { permission } => permission.wait(),
        }
    }

    /// Engine side: announce a completed chunk
    pub(crate) fn post_data_ready(&self) {
        match self {
            SyncSignals::Display { data_ready, .. } => data_ready.post(),
            SyncSignals::Free | SyncSignals::External { .. } => {}
        }
    }

    /// Stop path: post the wake signal once so a blocked engine observes
    /// the stop request instead of waiting forever
    pub(crate) fn wake_for_stop(&self) {
        match self {
            SyncSignals::Free => {}
            SyncSignals::Display { permission, .. } => permission.post(),
            SyncSignals::External { permission } => permission.post(),
        }
    }

    pub(crate) fn clone_refs(&self) -> Self {
        match self {
            SyncSignals::Free => SyncSignals::Free,
            SyncSignals::Display {
                permission,
                data_ready,
            } => SyncSignals::Display {
                permission: Arc::clone(permission),
                data_ready: Arc::clone(data_ready),
            },
            SyncSignals::External { permission } => SyncSignals::External {
                permission: Arc::clone(permission),
            },
        }
    }
}

/// Consumer side of a `Display`-mode session.
///
/// Reads chunk-sized windows in acquisition order: waiting for
/// data-ready, copying the current window under the shared lock, then
/// posting permission for the next iteration. Holding the handle
/// without calling [`recv_chunk`](Self::recv_chunk) pauses the engine
/// after at most one chunk.
pub struct DisplayHandle {
    pub(crate) permission: Arc<Semaphore>,
    pub(crate) data_ready: Arc<Semaphore>,
    pub(crate) buffer: Arc<parking_lot::Mutex<PublicBuffer>>,
    pub(crate) chunk_samples: usize,
    pub(crate) capacity: usize,
    pub(crate) next_offset: usize,
}

impl DisplayHandle {
    /// Block until the next chunk is ready, copy it into `out`, and
    /// grant the engine permission for another iteration.
    ///
    /// `out` must hold at least one chunk; only the first
    /// `chunk_samples` slots are written.
    pub fn recv_chunk(&mut self, out: &mut [u16]) {
        self.data_ready.wait();
        self.read_and_release(out);
    }

    /// Like [`recv_chunk`](Self::recv_chunk) with a deadline; returns
    /// `false` and leaves `out` untouched on timeout.
    pub fn try_recv_chunk(&mut self, out: &mut [u16], timeout: Duration) -> bool {
        if !self.data_ready.wait_timeout(timeout) {
            return false;
        }
        self.read_and_release(out);
        true
    }

    /// Samples in one chunk
    pub fn chunk_samples(&self) -> usize {
        self.chunk_samples
    }

    fn read_and_release(&mut self, out: &mut [u16]) {
        let window = &mut out[..self.chunk_samples];
        {
            let buffer = self.buffer.lock();
            buffer.read_window(self.next_offset, window);
        }
        self.next_offset = (self.next_offset + self.chunk_samples) % self.capacity;
        self.permission.post();
    }
}

/// Grant handle for an `External`-mode session.
///
/// Whatever subsystem owns pacing calls [`grant`](Self::grant) once per
/// iteration it allows; the engine only ever waits on this signal.
#[derive(Clone)]
pub struct ExternalPermit {
    pub(crate) permission: Arc<Semaphore>,
}

impl ExternalPermit {
    /// Allow the engine one more acquisition iteration
    pub fn grant(&self) {
        self.permission.post();
    }
}
