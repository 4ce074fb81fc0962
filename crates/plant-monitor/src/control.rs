use crate::retry::{retry, Clock, RetryPolicy};
use crate::{
    aggregate, capture_all, CameraVerdict, CycleObserver, CycleReport, MetricsHub, MonitorConfig,
    MonitorError, Result, SessionState,
};
use plant_vision::FrameSource;
use plc_link::{ControllerLink, PlcVariable, VariableStore};
use std::time::Duration;
use time::OffsetDateTime;

/// Where the loop is within a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Polling,
    Capturing,
    Aggregating,
    Reporting,
    Exited,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleSummary {
    pub session: i64,
    pub vertical: bool,
    pub verdicts: Vec<CameraVerdict>,
    /// False when writing the verdict to the controller failed.
    pub reported: bool,
}

/// What a single pass through `Polling` led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Exited,
    /// Every session read attempt failed.
    SessionUnavailable,
    /// Gate closed: not running, or the session was already processed.
    Idle { session: i64, running: bool },
    Cycle(CycleSummary),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub cycles: u64,
    pub vertical: u64,
    pub non_vertical: u64,
    pub last_processed_session: i64,
}

/// Session-gated poll loop driving cameras and the controller.
pub struct ControlLoop<F, S, C> {
    config: MonitorConfig,
    frames: F,
    link: ControllerLink<S>,
    clock: C,
    retry: RetryPolicy,
    session: SessionState,
    state: LoopState,
    observers: Vec<Box<dyn CycleObserver>>,
    metrics: Option<MetricsHub>,
}

impl<F, S, C> ControlLoop<F, S, C>
where
    F: FrameSource,
    S: VariableStore,
    C: Clock,
{
    /// Validate the configuration and seed the session gate from the
    /// controller. Both failures are fatal.
    pub fn start(config: MonitorConfig, frames: F, store: S, clock: C) -> Result<Self> {
        config.validate()?;
        let mut link = ControllerLink::new(store, config.plc.resolve());
        let policy = RetryPolicy::new(
            config.session.read_retries,
            Duration::from_millis(config.session.retry_delay_ms),
        );
        let initial = retry(&policy, &clock, "session number", || link.read_session())
            .map_err(|e| MonitorError::StartupFailed(format!("controller unreachable: {e}")))?;
        tracing::info!(
            "Monitoring {} cameras from session {} (max {})",
            config.cameras.len(),
            initial,
            config.session.max_session
        );
        let session = SessionState::new(initial, config.session.max_session);
        Ok(Self {
            config,
            frames,
            link,
            clock,
            retry: policy,
            session,
            state: LoopState::Polling,
            observers: Vec::new(),
            metrics: None,
        })
    }

    pub fn with_observer(mut self, observer: impl CycleObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHub) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn link(&self) -> &ControllerLink<S> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut ControllerLink<S> {
        &mut self.link
    }

    pub fn into_parts(self) -> (F, S) {
        (self.frames, self.link.into_store())
    }

    /// Poll the controller once and run a capture cycle if the gate opens.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state == LoopState::Exited {
            return TickOutcome::Exited;
        }
        self.state = LoopState::Polling;

        match self.link.read_flag(PlcVariable::Exit) {
            Ok(true) => {
                tracing::info!("Exit requested by controller");
                self.state = LoopState::Exited;
                return TickOutcome::Exited;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Failed to read {}: {}; treating as not exiting", PlcVariable::Exit, e);
                self.count_read_failure();
            }
        }

        let link = &mut self.link;
        let session = match retry(&self.retry, &self.clock, "session number", || {
            link.read_session()
        }) {
            Ok(session) => session,
            Err(_) => {
                self.count_read_failure();
                return TickOutcome::SessionUnavailable;
            }
        };

        let running = match self.link.read_flag(PlcVariable::Run) {
            Ok(running) => running,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}; treating as not running", PlcVariable::Run, e);
                self.count_read_failure();
                false
            }
        };

        if !running || !self.session.should_process(session) {
            tracing::debug!(
                "Idle: session {} (last processed {}), running={}",
                session,
                self.session.last_processed_session,
                running
            );
            return TickOutcome::Idle { session, running };
        }

        TickOutcome::Cycle(self.run_cycle(session))
    }

    fn run_cycle(&mut self, session: i64) -> CycleSummary {
        self.state = LoopState::Capturing;
        tracing::info!("Session {}: capturing", session);
        let captures = capture_all(
            &mut self.frames,
            &self.config.cameras,
            &self.config.silhouette,
            self.config.acquisition_timeout(),
        );

        self.state = LoopState::Aggregating;
        let verdicts: Vec<CameraVerdict> = captures.iter().map(|c| c.verdict.clone()).collect();
        let vertical = aggregate(&verdicts);

        self.state = LoopState::Reporting;
        let reported = match self.link.report_verdict(vertical) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Session {}: failed to report verdict: {}", session, e);
                if let Some(m) = &self.metrics {
                    m.monitor.plc_write_failures.inc();
                }
                false
            }
        };

        if !self.observers.is_empty() {
            let report = CycleReport {
                session,
                vertical,
                cameras: &self.config.cameras,
                captures: &captures,
                finished_at: OffsetDateTime::now_utc(),
            };
            for observer in &mut self.observers {
                if let Err(e) = observer.on_cycle(&report) {
                    tracing::warn!("Observer {} failed: {}", observer.name(), e);
                }
            }
        }

        self.session = self.session.advance(session);
        if let Some(m) = &self.metrics {
            m.monitor.cycles.inc();
            if vertical {
                m.monitor.vertical.inc();
            } else {
                m.monitor.non_vertical.inc();
            }
            for v in verdicts.iter().filter(|v| v.is_failure()) {
                m.monitor
                    .camera_failures
                    .with_label_values(&[v.camera_id.as_str()])
                    .inc();
            }
            m.monitor.last_session.set(self.session.last_processed_session);
        }
        self.state = LoopState::Polling;

        CycleSummary {
            session,
            vertical,
            verdicts,
            reported,
        }
    }

    fn count_read_failure(&self) {
        if let Some(m) = &self.metrics {
            m.monitor.plc_read_failures.inc();
        }
    }

    /// Tick until the controller raises the exit flag.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        loop {
            let outcome = self.tick();
            summary.ticks += 1;
            match outcome {
                TickOutcome::Exited => break,
                TickOutcome::Cycle(cycle) => {
                    summary.cycles += 1;
                    if cycle.vertical {
                        summary.vertical += 1;
                    } else {
                        summary.non_vertical += 1;
                    }
                }
                TickOutcome::Idle { .. } | TickOutcome::SessionUnavailable => {}
            }
            self.clock.sleep(self.config.cycle_delay());
        }
        summary.last_processed_session = self.session.last_processed_session;
        tracing::info!(
            "Stopped after {} cycles ({} vertical, {} not vertical)",
            summary.cycles,
            summary.vertical,
            summary.non_vertical
        );
        summary
    }
}
