//! The running service: parser + interpreter + consumer channels.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, tick, Receiver, Sender};
use events::{ChannelSink, DiscoveredEvent, GameEvent, Interpreter, ItemIndex, SessionSnapshot};
use photon::{Parser, Stats, StatsSnapshot};
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::source::OFFLINE_AFTER;

/// How often stats snapshots are published and the online state checked.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A running observer backend.
///
/// Packet sources push payloads in through [`feed`](Self::feed);
/// frontends consume the [`events`](Self::events),
/// [`stats_updates`](Self::stats_updates), and
/// [`online_updates`](Self::online_updates) channels. All channel sends
/// are non-blocking; a slow consumer loses updates, never stalls capture.
pub struct Service {
    parser: Arc<Parser<Interpreter<ChannelSink>>>,
    stats: Arc<Stats>,
    events_rx: Receiver<GameEvent>,
    stats_rx: Receiver<StatsSnapshot>,
    online_rx: Receiver<bool>,
    online_tx: Sender<bool>,
    events_tx_info: ChannelSink,
    online: Arc<AtomicBool>,
    running: AtomicBool,
    discovery_output: Option<PathBuf>,
    ticker: Mutex<Option<Ticker>>,
}

struct Ticker {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl Service {
    pub(crate) fn start(config: ServiceConfig) -> ServiceResult<Self> {
        let stats = Arc::new(Stats::new());

        let items = match &config.item_index_path {
            Some(path) => Some(ItemIndex::load_from_file(path)?.into_shared()),
            None => None,
        };

        let (sink, events_rx) = ChannelSink::bounded(config.event_buffer);
        let mut interpreter = Interpreter::new(sink.clone(), Arc::clone(&stats));
        if let Some(items) = items {
            interpreter = interpreter.with_items(items);
        }
        if config.discovery {
            interpreter = interpreter.with_discovery();
        }

        let parser = Arc::new(Parser::with_stats(
            interpreter,
            config.limits,
            Arc::clone(&stats),
        ));

        let (stats_tx, stats_rx) = bounded(config.stats_buffer);
        let (online_tx, online_rx) = bounded(1);

        let service = Self {
            parser,
            stats,
            events_rx,
            stats_rx,
            online_rx,
            online_tx,
            events_tx_info: sink,
            online: Arc::new(AtomicBool::new(false)),
            running: AtomicBool::new(true),
            discovery_output: config.discovery_output,
            ticker: Mutex::new(None),
        };
        service.spawn_ticker(stats_tx);
        Ok(service)
    }

    fn spawn_ticker(&self, stats_tx: Sender<StatsSnapshot>) {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(TICK_INTERVAL);
        let stats = Arc::clone(&self.stats);
        let online_tx = self.online_tx.clone();
        let info_sink = self.events_tx_info.clone();
        // The ticker owns the offline edge; the online edge fires
        // synchronously in `feed`. Both flip the same shared flag.
        let online = Arc::clone(&self.online);

        let thread = std::thread::spawn(move || loop {
            crossbeam_channel::select! {
                recv(ticker) -> _ => {
                    let _ = stats_tx.try_send(stats.snapshot());

                    let is_quiet = stats
                        .since_last_packet()
                        .map_or(true, |elapsed| elapsed > OFFLINE_AFTER);
                    if is_quiet && online.swap(false, Ordering::Relaxed) {
                        debug!("no packets for {}s, link offline", OFFLINE_AFTER.as_secs());
                        let _ = online_tx.try_send(false);
                        let _ = events::EventSink::deliver(
                            &info_sink,
                            GameEvent::info("Waiting for game traffic..."),
                        );
                    }
                }
                recv(stop_rx) -> _ => return,
            }
        });

        if let Ok(mut guard) = self.ticker.lock() {
            *guard = Some(Ticker {
                stop: stop_tx,
                thread,
            });
        }
    }

    /// Feeds one captured UDP payload. Everything but the payload itself
    /// is ignored; pre-filtering to the game ports is the source's job.
    ///
    /// Safe for concurrent calls from multiple capture threads.
    pub fn feed(
        &self,
        payload: &[u8],
        _src_ip: IpAddr,
        _dst_ip: IpAddr,
        _src_port: u16,
        _dst_port: u16,
    ) {
        if !self.online.swap(true, Ordering::Relaxed) {
            debug!("game traffic detected, link online");
            let _ = self.online_tx.try_send(true);
            let _ = events::EventSink::deliver(
                &self.events_tx_info,
                GameEvent::info("Game traffic detected, capturing packets..."),
            );
        }

        self.parser.parse_packet(payload);
    }

    /// The normalized game-event channel.
    #[must_use]
    pub fn events(&self) -> Receiver<GameEvent> {
        self.events_rx.clone()
    }

    /// The periodic stats-snapshot channel (one per second).
    #[must_use]
    pub fn stats_updates(&self) -> Receiver<StatsSnapshot> {
        self.stats_rx.clone()
    }

    /// The online/offline edge channel.
    #[must_use]
    pub fn online_updates(&self) -> Receiver<bool> {
        self.online_rx.clone()
    }

    /// Current stats counters.
    #[must_use]
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// One-line stats summary.
    #[must_use]
    pub fn stats_summary(&self) -> String {
        self.stats.summary()
    }

    /// Current session accounting.
    #[must_use]
    pub fn session(&self) -> SessionSnapshot {
        self.parser.handler().session()
    }

    /// Whether qualifying traffic was seen within the offline window.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Whether [`stop`](Self::stop) has not been called yet.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Deep copy of the discovery catalogue, if discovery mode is on.
    #[must_use]
    pub fn discovered_events(&self) -> Option<std::collections::HashMap<i16, DiscoveredEvent>> {
        self.parser
            .handler()
            .discovery()
            .map(events::Discovery::snapshot)
    }

    /// Saves the discovery catalogue to `path` now.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ServiceError`] on write failure; does nothing
    /// when discovery mode is off.
    pub fn save_discovery(&self, path: impl AsRef<std::path::Path>) -> ServiceResult<()> {
        if let Some(discovery) = self.parser.handler().discovery() {
            discovery.save_to_file(path)?;
        }
        Ok(())
    }

    /// Stops the ticker and the parser sweeper, then saves the discovery
    /// catalogue when an output path was configured. Idempotent;
    /// in-flight `feed` calls run to completion.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::Relaxed) {
            let ticker = match self.ticker.lock() {
                Ok(mut guard) => guard.take(),
                Err(_) => None,
            };
            if let Some(ticker) = ticker {
                let _ = ticker.stop.send(());
                let _ = ticker.thread.join();
            }
            self.parser.close();

            if let Some(path) = &self.discovery_output {
                if let Err(err) = self.save_discovery(path) {
                    warn!(path = %path.display(), %err, "failed to save discovery catalogue");
                }
            }
        }
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        self.stop();
    }
}
