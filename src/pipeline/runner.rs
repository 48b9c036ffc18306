//! Runs one producer and one consumer per reader role over a shared queue

use crate::core::retry::{Backoff, PollPolicy};
use crate::core::shutdown::{ShutdownCoordinator, ShutdownSignal};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::sink::RecordSink;
use crate::pipeline::source::RecordSource;
use crate::queue::{
    Consumer, Producer, QueueConfig, QueueError, QueueStats, Removal, SharedQueue, DEFAULT_ROLES,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub queue: QueueConfig,
    /// Pause between produced records
    pub interval: Duration,
    /// Backoff for consumers with nothing to read and for a producer
    /// blocked on node capacity
    pub poll: PollPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            interval: Duration::ZERO,
            poll: PollPolicy::default(),
        }
    }
}

/// What one reader role did during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleReport {
    pub role: usize,
    pub sink: String,
    pub read: u64,
    pub removed: u64,
    pub retained: u64,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub produced: u64,
    pub roles: Vec<RoleReport>,
    /// Queue statistics just before the queue was destroyed
    pub final_stats: QueueStats,
    /// Nodes still queued when the queue was destroyed
    pub discarded: usize,
    pub interrupted: bool,
}

impl PipelineReport {
    pub fn total_removed(&self) -> u64 {
        self.roles.iter().map(|r| r.removed).sum()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "produced {} records, {} reclaimed, {} discarded{}",
            self.produced,
            self.final_stats.removed,
            self.discarded,
            if self.interrupted { " (interrupted)" } else { "" }
        )?;
        for role in &self.roles {
            writeln!(
                f,
                "  role {} [{}]: read {}, removed {}, retained {}",
                role.role, role.sink, role.read, role.removed, role.retained
            )?;
        }
        Ok(())
    }
}

/// Driver that exercises a [`SharedQueue`] end to end
pub struct Pipeline<const ROLES: usize = DEFAULT_ROLES>;

impl<const ROLES: usize> Pipeline<ROLES> {
    /// Run until the source is exhausted and every role has drained, or
    /// until `shutdown` is triggered
    ///
    /// `sinks[i]` receives what role `i` reads. The queue is destroyed
    /// before returning, whatever the outcome.
    pub async fn run<S>(
        config: PipelineConfig,
        source: S,
        sinks: Vec<Box<dyn RecordSink>>,
        shutdown: &ShutdownCoordinator,
    ) -> PipelineResult<PipelineReport>
    where
        S: RecordSource + 'static,
    {
        if sinks.len() != ROLES {
            return Err(PipelineError::Config {
                message: format!(
                    "expected {} sinks (one per reader role), got {}",
                    ROLES,
                    sinks.len()
                ),
            });
        }

        let queue = SharedQueue::<ROLES>::create(config.queue.clone())?;
        log::info!(
            "Pipeline started on queue '{}' with {} reader roles",
            queue.name(),
            ROLES
        );

        let outcome = Self::drive(&queue, &config, source, sinks, shutdown).await;

        let teardown = Self::teardown(&queue);
        let (produced, roles) = outcome?;
        let (final_stats, discarded) = teardown?;

        let report = PipelineReport {
            produced,
            roles,
            final_stats,
            discarded,
            interrupted: shutdown.is_shutdown_requested(),
        };
        log::info!(
            "Pipeline finished: {} produced, {} reclaimed, {} discarded",
            report.produced,
            report.final_stats.removed,
            report.discarded
        );
        Ok(report)
    }

    /// Sweep what every role has read, record the final statistics and
    /// destroy the queue
    ///
    /// The queue is destroyed even when the sweep or the statistics fail.
    pub(crate) fn teardown(queue: &SharedQueue<ROLES>) -> PipelineResult<(QueueStats, usize)> {
        match queue.reclaim() {
            Ok(0) => {}
            Ok(swept) => log::trace!("Swept {} fully read nodes before teardown", swept),
            Err(e) => log::warn!("Reclaim before tearing down '{}' failed: {}", queue.name(), e),
        }
        let final_stats = queue.stats();
        let discarded = queue.destroy();
        Ok((final_stats?, discarded?))
    }

    async fn drive<S>(
        queue: &Arc<SharedQueue<ROLES>>,
        config: &PipelineConfig,
        source: S,
        sinks: Vec<Box<dyn RecordSink>>,
        shutdown: &ShutdownCoordinator,
    ) -> PipelineResult<(u64, Vec<RoleReport>)>
    where
        S: RecordSource + 'static,
    {
        let producer_done = Arc::new(AtomicBool::new(false));

        // Claim every role before any task starts
        let consumers = (0..ROLES)
            .map(|role| queue.consumer(role))
            .collect::<Result<Vec<_>, _>>()?;

        let readers: Vec<JoinHandle<PipelineResult<RoleReport>>> = consumers
            .into_iter()
            .zip(sinks)
            .map(|(consumer, sink)| {
                let task = ReaderTask {
                    consumer,
                    sink,
                    poll: config.poll.clone(),
                    producer_done: Arc::clone(&producer_done),
                    shutdown: shutdown.signal(),
                    coordinator: shutdown.clone(),
                };
                tokio::spawn(task.run())
            })
            .collect();

        let writer = WriterTask {
            producer: queue.producer(),
            source,
            interval: config.interval,
            poll: config.poll.clone(),
            producer_done: Arc::clone(&producer_done),
            shutdown: shutdown.signal(),
            coordinator: shutdown.clone(),
        };
        let produced = join(tokio::spawn(writer.run())).await;

        let mut roles = Vec::with_capacity(ROLES);
        let mut reader_error = None;
        for handle in readers {
            match join(handle).await {
                Ok(report) => roles.push(report),
                Err(e) => {
                    reader_error.get_or_insert(e);
                }
            }
        }

        let produced = produced?;
        match reader_error {
            Some(e) => Err(e),
            None => Ok((produced, roles)),
        }
    }
}

async fn join<T>(handle: JoinHandle<PipelineResult<T>>) -> PipelineResult<T> {
    handle.await.map_err(|e| PipelineError::Task {
        message: e.to_string(),
    })?
}

struct WriterTask<S, const ROLES: usize> {
    producer: Producer<ROLES>,
    source: S,
    interval: Duration,
    poll: PollPolicy,
    producer_done: Arc<AtomicBool>,
    shutdown: ShutdownSignal,
    coordinator: ShutdownCoordinator,
}

impl<S: RecordSource, const ROLES: usize> WriterTask<S, ROLES> {
    async fn run(mut self) -> PipelineResult<u64> {
        let result = self.produce().await;
        self.producer_done.store(true, Ordering::Release);
        if result.is_err() {
            self.coordinator.trigger_shutdown();
        }
        result
    }

    async fn produce(&mut self) -> PipelineResult<u64> {
        let mut produced = 0;
        let mut backoff = Backoff::new(self.poll.clone());

        while let Some(record) = self.source.next_record() {
            loop {
                if self.shutdown.is_triggered() {
                    log::debug!("Producer stopping after {} records", produced);
                    return Ok(produced);
                }
                match self.producer.publish(record) {
                    Ok(()) => break,
                    Err(QueueError::Allocation { reason }) => {
                        log::trace!("Producer waiting for space: {}", reason);
                        let waited = tokio::select! {
                            waited = backoff.wait() => waited,
                            _ = self.shutdown.wait() => true,
                        };
                        if !waited {
                            return Err(QueueError::Allocation { reason }.into());
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            backoff.reset();
            produced += 1;

            if !self.interval.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = self.shutdown.wait() => {}
                }
            }
        }

        log::debug!("Source exhausted after {} records", produced);
        Ok(produced)
    }
}

struct ReaderTask<const ROLES: usize> {
    consumer: Consumer<ROLES>,
    sink: Box<dyn RecordSink>,
    poll: PollPolicy,
    producer_done: Arc<AtomicBool>,
    shutdown: ShutdownSignal,
    coordinator: ShutdownCoordinator,
}

impl<const ROLES: usize> ReaderTask<ROLES> {
    async fn run(mut self) -> PipelineResult<RoleReport> {
        let role = self.consumer.role();
        let mut report = RoleReport {
            role,
            sink: self.sink.name().to_string(),
            read: 0,
            removed: 0,
            retained: 0,
        };
        let result = self.consume(&mut report).await;
        if result.is_err() {
            self.coordinator.trigger_shutdown();
        }
        result.map(|()| report)
    }

    async fn consume(&mut self, report: &mut RoleReport) -> PipelineResult<()> {
        let role = report.role;
        let mut backoff = Backoff::new(self.poll.clone());

        loop {
            if self.shutdown.is_triggered() {
                log::debug!("Reader role {} stopping on shutdown", role);
                return Ok(());
            }

            if let Some((record, removal)) = self.consumer.read_and_reclaim()? {
                backoff.reset();
                report.read += 1;
                match removal {
                    Removal::Removed => report.removed += 1,
                    Removal::Retained => report.retained += 1,
                    Removal::NoData => {}
                }
                self.sink
                    .accept(&record)
                    .map_err(|source| PipelineError::Sink { role, source })?;
                continue;
            }

            // Checked after the empty read so the final records are not missed
            if self.producer_done.load(Ordering::Acquire) && self.consumer.pending()? == 0 {
                log::debug!("Reader role {} drained after {} records", role, report.read);
                return Ok(());
            }

            let waited = tokio::select! {
                waited = backoff.wait() => waited,
                _ = self.shutdown.wait() => true,
            };
            if !waited {
                log::warn!(
                    "Reader role {} gave up after {} empty polls",
                    role,
                    backoff.attempts()
                );
                return Ok(());
            }
        }
    }
}
