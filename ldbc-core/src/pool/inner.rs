//! The guts of [`crate::pool::Pool`]: the idle queue, the FIFO waiter queue,
//! and the background maintenance task.
//!
//! The entry list, waiter queue, and size counter are the "shared resources"
//! this module's doc comments keep referring back to: each is protected by
//! its own short-lived lock (`idle` and `waiters` are plain `Mutex`es, `size`
//! is an atomic), and nothing here holds a lock across an `.await`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures_channel::oneshot;

use crate::connection::{Connect, Connection};
use crate::pool::options::PoolOptions;
use crate::pool::PoolConnection;
use crate::url::Url;

/// A connection sitting idle in the pool, with the bookkeeping needed to
/// decide when it should be validated or retired.
pub(crate) struct Idle<C> {
    pub(crate) conn: C,
    pub(crate) created_at: Instant,
    pub(crate) last_used_at: Instant,
    pub(crate) last_validated_at: Instant,
}

/// A connection that has been handed to a caller: the part of [`Idle`] that
/// survives a checkout, plus nothing else (the caller owns it exclusively
/// until it's dropped or explicitly released).
pub(crate) struct Live<C> {
    pub(crate) conn: C,
    pub(crate) created_at: Instant,
    pub(crate) last_validated_at: Instant,
}

/// An already-`fetch_add`'d slot in [`SharedPool::size`] that gives itself
/// back via `Drop` unless [`SizeGuard::defuse`] is called first.
struct SizeGuard<C: Connect> {
    pool: Arc<SharedPool<C>>,
    active: bool,
}

impl<C: Connect> SizeGuard<C> {
    /// The reserved slot now backs a real connection; stop counting it as
    /// released on drop.
    fn defuse(mut self) {
        self.active = false;
    }
}

impl<C: Connect> Drop for SizeGuard<C> {
    fn drop(&mut self) {
        if self.active {
            self.pool.size.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

pub(crate) struct SharedPool<C> {
    pub(crate) url: Url,
    pub(crate) options: PoolOptions,
    idle: Mutex<VecDeque<Idle<C>>>,
    waiters: Mutex<VecDeque<oneshot::Sender<Option<Idle<C>>>>>,
    size: AtomicU32,
    is_closed: AtomicBool,
    num_timed_out: AtomicU64,
}

impl<C> SharedPool<C>
where
    C: Connect,
{
    pub(crate) fn new(url: Url, options: PoolOptions) -> Arc<Self> {
        Arc::new(Self {
            url,
            options,
            idle: Mutex::new(VecDeque::new()),
            waiters: Mutex::new(VecDeque::new()),
            size: AtomicU32::new(0),
            is_closed: AtomicBool::new(false),
            num_timed_out: AtomicU64::new(0),
        })
    }

    pub(crate) fn size(&self) -> u32 {
        self.size.load(Ordering::Acquire)
    }

    pub(crate) fn num_idle(&self) -> usize {
        self.idle.lock().unwrap().len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.is_closed.load(Ordering::Acquire)
    }

    fn status(&self) -> String {
        format!(
            "{} idle, {} total, {} max, {} timed out since open",
            self.num_idle(),
            self.size(),
            self.options.max_connections,
            self.num_timed_out.load(Ordering::Relaxed)
        )
    }

    /// Establishes `min_connections` up front. Any failure here is fatal and
    /// propagated to the caller of [`crate::pool::options::PoolOptions::connect`].
    pub(crate) async fn fill_to_min(self: &Arc<Self>) -> crate::Result<()> {
        for _ in 0..self.options.min_connections {
            self.size.fetch_add(1, Ordering::SeqCst);

            match C::connect(self.url.clone()).await {
                Ok(conn) => {
                    let now = Instant::now();
                    self.idle.lock().unwrap().push_back(Idle {
                        conn,
                        created_at: now,
                        last_used_at: now,
                        last_validated_at: now,
                    });
                }
                Err(e) => {
                    self.size.fetch_sub(1, Ordering::SeqCst);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    pub(crate) fn spawn_maintenance(self: &Arc<Self>) {
        let pool = self.clone();
        crate::runtime::spawn(async move {
            loop {
                crate::runtime::sleep(pool.options.maintenance_interval).await;

                if pool.is_closed() {
                    return;
                }

                pool.run_maintenance().await;
            }
        });
    }

    fn try_increment_size(&self) -> bool {
        loop {
            let current = self.size.load(Ordering::SeqCst);

            if current >= self.options.max_connections {
                return false;
            }

            if self
                .size
                .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return true;
            }
        }
    }

    /// Reserves a size slot and gives back a guard that releases it again on
    /// drop. `acquire()` races this against `connect_timeout` via
    /// [`crate::runtime::timeout`], which just drops the losing future with
    /// no cancellation signal — without this guard a timeout firing mid-
    /// `connect` would leak the slot forever, since `try_increment_size` had
    /// already committed it. Call [`SizeGuard::defuse`] once the connection
    /// is established to keep the slot counted.
    fn try_reserve_size(self: &Arc<Self>) -> Option<SizeGuard<C>> {
        if self.try_increment_size() {
            Some(SizeGuard { pool: self.clone(), active: true })
        } else {
            None
        }
    }

    pub(crate) async fn acquire(self: &Arc<Self>) -> crate::Result<PoolConnection<C>> {
        let started_at = Instant::now();

        match crate::runtime::timeout(self.options.connect_timeout, self.acquire_inner()).await {
            Some(result) => result.map(|live| self.wrap(live)),
            None => {
                self.num_timed_out.fetch_add(1, Ordering::Relaxed);
                Err(crate::Error::AcquireTimeout {
                    waited: started_at.elapsed(),
                    status: self.status().into_boxed_str(),
                })
            }
        }
    }

    /// Tries to hand back an idle connection without waiting or opening a new
    /// one; used by [`crate::pool::Pool::try_acquire`].
    pub(crate) async fn try_acquire(self: &Arc<Self>) -> Option<PoolConnection<C>> {
        if self.is_closed() {
            return None;
        }

        loop {
            let idle = self.idle.lock().unwrap().pop_front()?;

            if let Some(live) = self.check_idle(idle).await {
                return Some(self.wrap(live));
            }
        }
    }

    async fn acquire_inner(self: &Arc<Self>) -> crate::Result<Live<C>> {
        loop {
            if self.is_closed() {
                return Err(crate::Error::PoolClosed);
            }

            if let Some(idle) = self.idle.lock().unwrap().pop_front() {
                match self.check_idle(idle).await {
                    Some(live) => return Ok(live),
                    None => continue,
                }
            }

            if let Some(guard) = self.try_reserve_size() {
                // the slot is committed to `size` the instant `try_reserve_size`
                // returns; if `acquire()`'s outer `runtime::timeout` fires while
                // `C::connect` is still in flight, this future is dropped
                // mid-`.await` and `guard` releases the slot instead of leaking it.
                return match C::connect(self.url.clone()).await {
                    Ok(conn) => {
                        guard.defuse();
                        let now = Instant::now();
                        Ok(Live { conn, created_at: now, last_validated_at: now })
                    }
                    Err(e) => Err(e),
                };
            }

            let (tx, rx) = oneshot::channel();
            self.waiters.lock().unwrap().push_back(tx);

            match rx.await {
                Ok(Some(idle)) => match self.check_idle(idle).await {
                    Some(live) => return Ok(live),
                    None => continue,
                },
                Ok(None) => return Err(crate::Error::PoolClosed),
                Err(_) => continue,
            }
        }
    }

    /// Applies the alive-bypass-window / validate-on-acquire rule from an
    /// idle entry, retiring it on failure.
    async fn check_idle(self: &Arc<Self>, idle: Idle<C>) -> Option<Live<C>> {
        let Idle { mut conn, created_at, last_used_at, last_validated_at } = idle;

        if self.is_expired(created_at, last_used_at) {
            self.retire(conn);
            return None;
        }

        let bypass = self
            .options
            .alive_bypass_window
            .map_or(false, |window| last_validated_at.elapsed() < window);

        if bypass {
            return Some(Live { conn, created_at, last_validated_at });
        }

        let validated = crate::runtime::timeout(self.options.validation_timeout, conn.ping()).await;

        match validated {
            Some(Ok(())) => Some(Live { conn, created_at, last_validated_at: Instant::now() }),
            _ => {
                self.retire(conn);
                None
            }
        }
    }

    fn is_expired(&self, created_at: Instant, last_used_at: Instant) -> bool {
        if self.options.max_lifetime.map_or(false, |max| created_at.elapsed() >= max) {
            return true;
        }

        self.options.idle_timeout.map_or(false, |idle| last_used_at.elapsed() >= idle)
    }

    fn retire(self: &Arc<Self>, conn: C) {
        self.size.fetch_sub(1, Ordering::SeqCst);

        crate::runtime::spawn(async move {
            let _ = conn.close().await;
        });
    }

    fn wrap(self: &Arc<Self>, live: Live<C>) -> PoolConnection<C> {
        let returned = Arc::new(AtomicBool::new(false));

        if let Some(threshold) = self.options.leak_detection_threshold {
            let returned = returned.clone();

            crate::runtime::spawn(async move {
                crate::runtime::sleep(threshold).await;

                if !returned.load(Ordering::Acquire) {
                    log::warn!(
                        "a pooled connection has been checked out for longer than the leak \
                         detection threshold ({:?}); this may indicate a connection leak",
                        threshold
                    );
                }
            });
        }

        PoolConnection::new(live, self.clone(), returned)
    }

    /// Called by [`PoolConnection`]'s drop/release path. Not `async` so it
    /// can run from `Drop`; anything requiring I/O (closing a retired
    /// connection, opening a replacement) is handed off to a spawned task.
    pub(crate) fn release(self: &Arc<Self>, live: Live<C>) {
        if self.is_closed() {
            self.retire(live.conn);
            return;
        }

        let lifetime_expired = self
            .options
            .max_lifetime
            .map_or(false, |max| live.created_at.elapsed() >= max);

        if lifetime_expired || !live.conn.is_valid() {
            self.retire(live.conn);
            self.spawn_replenish();
            return;
        }

        let mut idle = Idle {
            conn: live.conn,
            created_at: live.created_at,
            last_used_at: Instant::now(),
            last_validated_at: live.last_validated_at,
        };

        let mut waiters = self.waiters.lock().unwrap();

        while let Some(tx) = waiters.pop_front() {
            match tx.send(Some(idle)) {
                Ok(()) => return,
                Err(Some(returned)) => {
                    idle = returned;
                    continue;
                }
                Err(None) => unreachable!("release always sends Some"),
            }
        }

        drop(waiters);

        self.idle.lock().unwrap().push_back(idle);
    }

    fn spawn_replenish(self: &Arc<Self>) {
        let pool = self.clone();
        crate::runtime::spawn(async move { pool.replenish_to_min().await });
    }

    async fn replenish_to_min(self: Arc<Self>) {
        loop {
            if self.is_closed() || self.size() >= self.options.min_connections {
                return;
            }

            if !self.try_increment_size() {
                return;
            }

            match C::connect(self.url.clone()).await {
                Ok(conn) => {
                    let now = Instant::now();
                    self.release(Live { conn, created_at: now, last_validated_at: now });
                }
                Err(e) => {
                    self.size.fetch_sub(1, Ordering::SeqCst);
                    log::warn!("pool failed to open a replacement connection to maintain min_connections: {}", e);
                    return;
                }
            }
        }
    }

    /// The housekeeper tick: closes idle/lifetime-expired entries, runs a
    /// bounded batch of keepalive validations, and tops back up to
    /// `min_connections`.
    async fn run_maintenance(self: &Arc<Self>) {
        const MAX_VALIDATIONS_PER_TICK: usize = 5;

        let batch: Vec<Idle<C>> = {
            let mut idle = self.idle.lock().unwrap();
            idle.drain(..).collect()
        };

        let mut validations_left = MAX_VALIDATIONS_PER_TICK;
        let mut survivors = Vec::with_capacity(batch.len());

        for entry in batch {
            if self.is_expired(entry.created_at, entry.last_used_at) {
                self.retire(entry.conn);
                continue;
            }

            let due_for_keepalive = self
                .options
                .keepalive_time
                .map_or(false, |interval| entry.last_validated_at.elapsed() >= interval);

            if due_for_keepalive && validations_left > 0 {
                validations_left -= 1;

                let Idle { mut conn, created_at, last_used_at, last_validated_at: _ } = entry;
                let validated = crate::runtime::timeout(self.options.validation_timeout, conn.ping()).await;

                match validated {
                    Some(Ok(())) => survivors.push(Idle {
                        conn,
                        created_at,
                        last_used_at,
                        last_validated_at: Instant::now(),
                    }),
                    _ => self.retire(conn),
                }
            } else {
                survivors.push(entry);
            }
        }

        self.idle.lock().unwrap().extend(survivors);

        let deficit = self.options.min_connections.saturating_sub(self.size());

        for _ in 0..deficit {
            if !self.try_increment_size() {
                break;
            }

            match C::connect(self.url.clone()).await {
                Ok(conn) => {
                    let now = Instant::now();
                    self.release(Live { conn, created_at: now, last_validated_at: now });
                }
                Err(e) => {
                    self.size.fetch_sub(1, Ordering::SeqCst);
                    log::warn!("pool maintenance failed to top up min_connections: {}", e);
                    break;
                }
            }
        }

        log::debug!("pool maintenance complete: {}", self.status());
    }

    /// Closes the pool: rejects future acquires, wakes every waiter with
    /// `PoolClosed`, and closes every currently idle connection. Connections
    /// still checked out are closed as they're returned.
    pub(crate) async fn close(self: &Arc<Self>) {
        if self.is_closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let waiters: Vec<_> = self.waiters.lock().unwrap().drain(..).collect();
        for tx in waiters {
            let _ = tx.send(None);
        }

        let idle: Vec<_> = self.idle.lock().unwrap().drain(..).collect();
        for entry in idle {
            self.size.fetch_sub(1, Ordering::SeqCst);
            let _ = entry.conn.close().await;
        }
    }
}
