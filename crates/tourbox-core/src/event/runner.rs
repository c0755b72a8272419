// TourBox Run Loop
// Single consumer that reads bytes, decodes them and feeds the engine in order

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ProfileHandle, ReloadOutcome};
use crate::engine::Engine;
use crate::output::{CommandSpawner, KeySink};
use crate::protocol::decode;
use crate::transport::{Transport, TransportError};

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Upper bound on one transport read; also how often flags are checked
    pub read_timeout: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Bytes decoded and dispatched
    pub events: u64,
    /// Controls force-released during shutdown
    pub released_on_exit: usize,
}

/// Owns the device, the engine and the profile for the process lifetime
pub struct RunLoop<T, S, C> {
    transport: T,
    engine: Engine<S, C>,
    profile: ProfileHandle,
    running: Arc<AtomicBool>,
    reload: Arc<AtomicBool>,
    options: RunnerOptions,
}

impl<T, S, C> RunLoop<T, S, C>
where
    T: Transport,
    S: KeySink,
    C: CommandSpawner,
{
    pub fn new(transport: T, engine: Engine<S, C>, profile: ProfileHandle) -> Self {
        Self {
            transport,
            engine,
            profile,
            running: Arc::new(AtomicBool::new(true)),
            reload: Arc::new(AtomicBool::new(false)),
            options: RunnerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Share stop and reload flags created elsewhere, e.g. by a signal thread
    pub fn with_flags(mut self, running: Arc<AtomicBool>, reload: Arc<AtomicBool>) -> Self {
        self.running = running;
        self.reload = reload;
        self
    }

    /// Clear to stop the loop after the current iteration
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Set to re-read the profile before the next read
    pub fn reload_flag(&self) -> Arc<AtomicBool> {
        self.reload.clone()
    }

    pub fn engine(&self) -> &Engine<S, C> {
        &self.engine
    }

    pub fn profile(&self) -> &ProfileHandle {
        &self.profile
    }

    /// Run until the running flag clears or the transport fails.
    ///
    /// Held keys are released and the transport closed on every exit path. A
    /// read error is returned after that cleanup.
    pub fn run(&mut self) -> Result<RunStats, TransportError> {
        let result = self.pump();

        let released = self.engine.release_all();
        if released > 0 {
            log::info!("Released {} held control(s) on shutdown", released);
        }
        let closed = self.transport.close();

        let events = result?;
        closed?;
        Ok(RunStats {
            events,
            released_on_exit: released,
        })
    }

    fn pump(&mut self) -> Result<u64, TransportError> {
        let mut events = 0u64;

        while self.running.load(Ordering::SeqCst) {
            if self.reload.swap(false, Ordering::SeqCst) {
                self.reload_profile();
            }

            let Some(byte) = self.transport.read_byte(self.options.read_timeout)? else {
                continue;
            };

            let event = decode(byte);
            let profile = self.profile.snapshot();
            let outcome = self.engine.dispatch(&profile, event);
            events += 1;
            log::debug!("{:#04x} ({}) -> {:?}", byte, event.edge, outcome);
        }

        Ok(events)
    }

    fn reload_profile(&self) {
        match self.profile.reload() {
            Ok(ReloadOutcome::Reloaded) => {
                let profile = self.profile.snapshot();
                log::info!(
                    "Reloaded profile '{}' ({} mappings)",
                    profile.name(),
                    profile.len()
                );
            }
            Ok(ReloadOutcome::NoSource) => {
                log::info!("Built-in profile has no file; nothing to reload");
            }
            Err(e) => log::error!("Profile reload failed, keeping current profile: {}", e),
        }
    }
}

/// Log every decoded event without dispatching it. Returns the event count.
///
/// The transport is closed when the loop ends, whatever the reason.
pub fn monitor<T: Transport + ?Sized>(
    transport: &mut T,
    running: &AtomicBool,
    read_timeout: Duration,
) -> Result<u64, TransportError> {
    let mut count = 0u64;
    let result = log_events(transport, running, read_timeout, &mut count);

    let closed = transport.close();
    result?;
    closed?;
    Ok(count)
}

fn log_events<T: Transport + ?Sized>(
    transport: &mut T,
    running: &AtomicBool,
    read_timeout: Duration,
    count: &mut u64,
) -> Result<(), TransportError> {
    while running.load(Ordering::SeqCst) {
        let Some(byte) = transport.read_byte(read_timeout)? else {
            continue;
        };
        *count += 1;

        let event = decode(byte);
        match event.descriptor() {
            Ok(descriptor) => log::info!(
                "[{}] {:#04x} -> {} {} ({})",
                count,
                byte,
                descriptor.control,
                event.edge,
                descriptor.kind
            ),
            Err(unknown) => log::warn!("[{}] {}", count, unknown),
        }
    }
    Ok(())
}
