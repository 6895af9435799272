// src/acquisition/engine.rs
//! The background acquisition loop
//!
//! One engine thread per session. Each iteration waits for permission
//! (paced modes), waits for the hardware write counter to prove the
//! next chunk exists, copies it into the public buffer under a
//! non-blocking lock, advances the read cursor, and signals data-ready.
//! The loop exits cooperatively when the stop flag is observed.

use crate::acquisition::buffer::PublicBuffer;
use crate::acquisition::session::EngineCounters;
use crate::acquisition::sync::SyncSignals;
use crate::hal::SampleSource;
use parking_lot::Mutex;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Everything the engine thread owns for its lifetime
pub(crate) struct EngineContext {
    pub(crate) source: Arc<dyn SampleSource>,
    pub(crate) buffer: Arc<Mutex<PublicBuffer>>,
    pub(crate) signals: SyncSignals,
    pub(crate) stop: Arc<Mutex<bool>>,
    pub(crate) counters: Arc<EngineCounters>,
    pub(crate) region_start: usize,
    pub(crate) region_end: usize,
    pub(crate) chunk_samples: usize,
    pub(crate) public_capacity: usize,
    pub(crate) poll_interval: Duration,
}

/// Non-blocking stop check; a missed acquisition is retried on the next
/// call, which bounds stop latency without ever stalling the loop.
fn stop_requested(stop: &Mutex<bool>) -> bool {
    match stop.try_lock() {
        Some(flag) => *flag,
        None => false,
    }
}

/// Run the acquisition loop to completion. Entry point of the engine
/// thread spawned by [`AcquisitionSession::start`](crate::acquisition::AcquisitionSession::start).
pub(crate) fn run(ctx: EngineContext) {
    let mut read_cursor = ctx.region_start;
    let mut public_offset = 0usize;

    debug!(
        region_start = ctx.region_start,
        region_end = ctx.region_end,
        chunk = ctx.chunk_samples,
        "acquisition engine running"
    );

    loop {
        // 1. Paced modes block here until the consumer (or the external
        //    owner) grants another iteration; the stop path posts this
        //    signal, so a wake may be a stop request.
        ctx.signals.wait_permission();
        if stop_requested(&ctx.stop) {
            break;
        }

        // 2. Next cursor position, wrapping to the region start when the
        //    step would reach or pass the end.
        let step_target = {
            let target = read_cursor + ctx.chunk_samples;
            if target >= ctx.region_end {
                ctx.region_start
            } else {
                target
            }
        };

        // 3. Wait until the hardware has produced the chunk. A step that
        //    stays below the wrap point is ready once the write counter
        //    reaches the target; a wrapping step is ready once the
        //    counter has visibly wrapped and fallen back below one
        //    chunk. Bounded sleeps, not a spin loop.
        let wraps = step_target <= read_cursor;
        loop {
            let write_index = ctx.source.write_index();
            let ready = if wraps {
                write_index <= ctx.chunk_samples
            } else {
                write_index >= step_target
            };
            if ready {
                break;
            }
            if stop_requested(&ctx.stop) {
                debug!("stop observed while waiting for hardware progress");
                return;
            }
            thread::sleep(ctx.poll_interval);
        }

        // 4. Copy under the buffer lock, or skip this chunk entirely if
        //    a reader holds it. The gap is counted, never blocked on.
        match ctx.buffer.try_lock() {
            Some(mut buffer) => {
                let window = buffer.window_mut(public_offset, ctx.chunk_samples);
                ctx.source.copy_region(read_cursor, window);
                ctx.counters.chunks_copied.fetch_add(1, Ordering::Relaxed);
                trace!(read_cursor, public_offset, "chunk copied");
            }
            None => {
                ctx.counters.chunks_skipped.fetch_add(1, Ordering::Relaxed);
                warn!(read_cursor, "buffer contended, chunk skipped");
            }
        }

        // 5. Advance both positions; the public offset moves even for a
        //    skipped chunk so the buffer layout stays aligned with
        //    acquisition time.
        read_cursor = step_target;
        public_offset = (public_offset + ctx.chunk_samples) % ctx.public_capacity;
        ctx.counters.iterations.fetch_add(1, Ordering::Relaxed);

        // 6. Hand the chunk to the consumer.
        ctx.signals.post_data_ready();

        // 7. Cooperative stop check, once per iteration.
        if stop_requested(&ctx.stop) {
            break;
        }
    }

    debug!("acquisition engine exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::sync::SyncMode;
    use crate::hal::tests::MockSource;
    use std::time::Instant;

    fn context(
        source: Arc<dyn SampleSource>,
        region_len: usize,
        chunk: usize,
        capacity: usize,
        mode: SyncMode,
    ) -> (EngineContext, Arc<Mutex<bool>>, Arc<EngineCounters>, SyncSignals) {
        let stop = Arc::new(Mutex::new(false));
        let counters = Arc::new(EngineCounters::default());
        let signals = SyncSignals::for_mode(mode);
        let ctx = EngineContext {
            source,
            buffer: Arc::new(Mutex::new(PublicBuffer::new(capacity).unwrap())),
            signals: signals.clone_refs(),
            stop: Arc::clone(&stop),
            counters: Arc::clone(&counters),
            region_start: 0,
            region_end: region_len,
            chunk_samples: chunk,
            public_capacity: capacity,
            poll_interval: Duration::from_millis(1),
        };
        (ctx, stop, counters, signals)
    }

    #[test]
    fn test_engine_copies_chunks_as_hardware_progresses() {
        let mock = MockSource::new(64);
        let control = mock.controller();
        let (ctx, stop, counters, _signals) =
            context(Arc::new(mock), 64, 8, 64, SyncMode::Free);
        let buffer = Arc::clone(&ctx.buffer);

        let engine = thread::spawn(move || run(ctx));

        // Two chunks of hardware progress
        control.push(16);
        let deadline = Instant::now() + Duration::from_secs(2);
        while counters.chunks_copied.load(Ordering::Relaxed) < 2 {
            assert!(Instant::now() < deadline, "engine never copied");
            thread::sleep(Duration::from_millis(1));
        }

        {
            let mut stop = stop.lock();
            *stop = true;
        }
        // Unblock the poll loop by feeding more progress
        control.push(8);
        engine.join().unwrap();

        // Ramp values 0..16 landed at offsets 0..16
        let buf = buffer.lock();
        let mut out = vec![0u16; 16];
        buf.read_window(0, &mut out);
        let expected: Vec<u16> = (0u16..16).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_engine_stops_while_polling_for_progress() {
        let mock = MockSource::new(64);
        let (ctx, stop, _counters, _signals) =
            context(Arc::new(mock), 64, 8, 64, SyncMode::Free);

        let engine = thread::spawn(move || run(ctx));
        thread::sleep(Duration::from_millis(20));

        {
            let mut stop = stop.lock();
            *stop = true;
        }
        // No hardware progress at all: the poll loop itself must
        // observe the stop flag.
        engine.join().unwrap();
    }

    #[test]
    fn test_display_mode_lags_at_most_one_chunk() {
        let mock = MockSource::new(64);
        let control = mock.controller();
        let (ctx, stop, counters, signals) =
            context(Arc::new(mock), 64, 8, 64, SyncMode::Display);

        let engine = thread::spawn(move || run(ctx));

        // Plenty of hardware progress for many chunks, but no consumer:
        // the engine must park after a single iteration. Seven chunks
        // keep the write counter short of wrapping back to zero.
        control.push(56);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(counters.iterations.load(Ordering::Relaxed), 1);

        {
            let mut stop = stop.lock();
            *stop = true;
        }
        signals.wake_for_stop();
        engine.join().unwrap();
    }
}
