//! Agent runtime
//!
//! Wires the configuration into clients, query decorators, evaluators and
//! dispatchers, then keeps one schedule per configured check running until
//! shutdown. Concurrency limits are published through `watch` cells so a
//! configuration reload takes effect without restarting the dispatchers.

use super::scheduler::run_schedule;
use super::status_board::StatusBoard;
use crate::config::{Config, TenantConfig};
use crate::core::dispatch::{Dispatcher, KindedDispatcher};
use crate::core::evaluators::{
    HealthEvaluator, HttpEvaluator, MetricEvaluator, VersionCheckKind, VersionEvaluator,
    WorkloadVersionLookup,
};
use crate::core::query::{CachingMetricQuery, MetricQuery, RangeQueryClient, ReportingMetricQuery};
use crate::core::reporting::{ApiClient, CheckDataSink};
use crate::core::types::HealthStatus;
use crate::utils::error::{AgentError, Result};
use crate::utils::net::{ClientOptions, HttpClientCache};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Builds an [`Agent`] from a validated configuration
pub struct AgentBuilder {
    config: Config,
    config_path: Option<PathBuf>,
    workloads: Option<Arc<dyn WorkloadVersionLookup>>,
    clients: Option<Arc<HttpClientCache>>,
}

impl AgentBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            config_path: None,
            workloads: None,
            clients: None,
        }
    }

    /// File re-read by the reload task
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn workload_lookup(mut self, lookup: Arc<dyn WorkloadVersionLookup>) -> Self {
        self.workloads = Some(lookup);
        self
    }

    pub fn http_clients(mut self, clients: Arc<HttpClientCache>) -> Self {
        self.clients = Some(clients);
        self
    }

    pub fn build(self) -> Result<Agent> {
        let config = self.config;
        config.validate()?;

        let clients = self.clients.unwrap_or_default();
        let backend_client = clients.client(ClientOptions::new(true, false))?;

        let reporting = &config.reporting;
        let sink: Option<Arc<dyn CheckDataSink>> = match (&reporting.url, reporting.enabled) {
            (Some(url), true) => {
                let mut api = ApiClient::new(url, reporting.timeout(), backend_client.clone());
                if let Some(token) = &reporting.bearer_token {
                    api = api.with_bearer_token(token);
                }
                info!(endpoint = %api.endpoint(), "Check data reporting enabled");
                Some(Arc::new(api))
            }
            _ => None,
        };

        let http = HttpEvaluator::new(clients.clone(), config.agent.probe_timeout());
        let mut health = HealthEvaluator::new(http);
        let mut caches = Vec::new();
        for (source, backend) in config.backends.configured() {
            let client = RangeQueryClient::new(
                source,
                &backend.url,
                backend.step(),
                backend.timeout(),
                backend_client.clone(),
            );
            debug!(%source, endpoint = %client.endpoint(), "Metric backend configured");

            let mut query: Arc<dyn MetricQuery> = Arc::new(client);
            if let Some(sink) = &sink {
                query = Arc::new(ReportingMetricQuery::new(query, sink.clone()));
            }
            let cache = Arc::new(CachingMetricQuery::new(query));
            caches.push(cache.clone());
            health = health.with_metric_source(source, MetricEvaluator::new(cache));
        }

        let mut versions = VersionEvaluator::new(clients, config.agent.probe_timeout());
        if let Some(lookup) = self.workloads {
            versions = versions.with_workload_lookup(lookup);
        }

        let health_limit = config.agent.max_concurrency;
        let version_limit = config.agent.version_max_concurrency;
        let health_dispatcher = Dispatcher::new("health", Arc::new(health), health_limit);
        let version_dispatcher = KindedDispatcher::new(
            "version",
            Arc::new(versions),
            VersionCheckKind::ALL.map(|kind| (kind, version_limit)),
        );

        let (health_limit, _) = watch::channel(health_limit);
        let (version_limit, _) = watch::channel(version_limit);

        Ok(Agent {
            inner: Arc::new(AgentInner {
                health: health_dispatcher,
                versions: Arc::new(version_dispatcher),
                board: Arc::new(StatusBoard::new()),
                caches,
                health_limit,
                version_limit,
                config_path: self.config_path,
                config: Mutex::new(config),
                tenants: Mutex::new(HashMap::new()),
                shutdown: CancellationToken::new(),
            }),
        })
    }
}

/// Schedules owned by one tenant
struct TenantSchedule {
    config: TenantConfig,
    cancel: CancellationToken,
}

struct AgentInner {
    health: Dispatcher<HealthEvaluator>,
    versions: Arc<KindedDispatcher<VersionEvaluator>>,
    board: Arc<StatusBoard>,
    caches: Vec<Arc<CachingMetricQuery>>,
    health_limit: watch::Sender<usize>,
    version_limit: watch::Sender<usize>,
    config_path: Option<PathBuf>,
    config: Mutex<Config>,
    tenants: Mutex<HashMap<String, TenantSchedule>>,
    shutdown: CancellationToken,
}

/// The monitoring agent
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

impl Agent {
    pub fn builder(config: Config) -> AgentBuilder {
        AgentBuilder::new(config)
    }

    pub fn status_board(&self) -> Arc<StatusBoard> {
        self.inner.board.clone()
    }

    pub fn health_dispatcher(&self) -> &Dispatcher<HealthEvaluator> {
        &self.inner.health
    }

    pub fn version_dispatcher(&self) -> &KindedDispatcher<VersionEvaluator> {
        &self.inner.versions
    }

    /// Names of tenants with running schedules
    pub fn tenants(&self) -> Vec<String> {
        let mut names: Vec<_> = self.inner.tenants.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Stop everything; `run` returns once the dispatch loops have drained
    pub fn shutdown(&self) {
        info!("Agent shutdown requested");
        self.inner.shutdown.cancel();
    }

    /// Run until [`Agent::shutdown`] is called
    pub async fn run(&self) -> Result<()> {
        let inner = &self.inner;
        let config = inner.config.lock().clone();
        info!(
            environment = %config.agent.environment,
            tenants = config.tenants.len(),
            polling_interval_secs = config.agent.polling_interval,
            "Starting agent"
        );

        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        let health = inner.health.clone();
        let cancel = inner.shutdown.clone();
        tasks.push(tokio::spawn(async move { health.run(cancel).await }));

        let versions = inner.versions.clone();
        let cancel = inner.shutdown.clone();
        tasks.push(tokio::spawn(async move { versions.run(cancel).await }));

        // Limits published before the watchers existed still have to be applied
        let mut health_limits = inner.health_limit.subscribe();
        health_limits.mark_changed();
        let health_watch = inner.health.watch_limit(health_limits);
        let version_watch = self.watch_version_limit();

        for tenant in &config.tenants {
            // apply_config may already have started it
            let running = inner.tenants.lock().contains_key(&tenant.name);
            if !running {
                self.schedule_tenant(tenant.clone(), &config);
            }
        }

        if let (Some(path), Some(interval)) = (&inner.config_path, config.agent.reload_interval()) {
            tasks.push(self.spawn_reload(path.clone(), interval));
        }

        inner.shutdown.cancelled().await;

        health_watch.abort();
        version_watch.abort();
        for (_, schedule) in inner.tenants.lock().drain() {
            schedule.cancel.cancel();
        }
        for task in tasks {
            if let Err(e) = task.await {
                if e.is_panic() {
                    return Err(AgentError::internal(format!("agent task panicked: {}", e)));
                }
            }
        }

        info!("Agent stopped");
        Ok(())
    }

    /// Stop a tenant's schedules and drop its queued checks
    pub fn remove_tenant(&self, tenant: &str) -> usize {
        let inner = &self.inner;
        let Some(schedule) = inner.tenants.lock().remove(tenant) else {
            return 0;
        };
        schedule.cancel.cancel();

        let cancelled = inner.health.cancel_tenant(tenant) + inner.versions.cancel_tenant(tenant);
        let forgotten = inner.board.remove_tenant(tenant);
        for cache in &inner.caches {
            cache.evict_tenant(tenant);
        }

        info!(tenant, cancelled, forgotten, "Tenant removed");
        cancelled
    }

    /// Apply a reloaded configuration. Concurrency limits and tenants are
    /// updated in place; other sections need a restart.
    pub fn apply_config(&self, config: Config) {
        let inner = &self.inner;
        publish_limit(&inner.health_limit, config.agent.max_concurrency);
        publish_limit(&inner.version_limit, config.agent.version_max_concurrency);

        let previous = inner.config.lock().clone();
        if previous.agent.environment != config.agent.environment
            || previous.agent.polling_interval != config.agent.polling_interval
            || previous.backends != config.backends
            || previous.reporting != config.reporting
        {
            warn!("Configuration changes outside limits and tenants take effect after a restart");
        }

        let mut stale = Vec::new();
        {
            let tenants = inner.tenants.lock();
            for (name, schedule) in tenants.iter() {
                match config.tenant(name) {
                    Some(updated) if *updated == schedule.config => {}
                    _ => stale.push(name.clone()),
                }
            }
        }
        for name in &stale {
            self.remove_tenant(name);
        }

        // Keep running schedules on the configuration they were started with
        let mut effective = config.clone();
        effective.agent.environment = previous.agent.environment.clone();
        effective.agent.polling_interval = previous.agent.polling_interval;

        for tenant in &config.tenants {
            let running = inner.tenants.lock().contains_key(&tenant.name);
            if !running && !inner.shutdown.is_cancelled() {
                self.schedule_tenant(tenant.clone(), &effective);
            }
        }

        *inner.config.lock() = effective;
    }

    fn schedule_tenant(&self, tenant: TenantConfig, config: &Config) {
        let inner = &self.inner;
        let cancel = inner.shutdown.child_token();
        let environment = config.agent.environment.as_str();
        let interval = config.agent.polling_interval();
        let mut scheduled = 0;

        for (identity, definition) in tenant.health_checks(environment) {
            let health = inner.health.clone();
            let board = inner.board.clone();
            let tenant_name = tenant.name.clone();
            let schedule = run_schedule(
                identity,
                definition.clone(),
                interval,
                cancel.clone(),
                move |identity, definition| {
                    health.submit(tenant_name.clone(), identity, definition)
                },
                move |identity, status: HealthStatus| {
                    match board.record_health(identity, status) {
                        Some(previous) if previous != status => {
                            info!(check = %identity, %previous, %status, "Health status changed")
                        }
                        None => info!(check = %identity, %status, "Health status"),
                        _ => debug!(check = %identity, %status, "Health status"),
                    }
                },
            );
            tokio::spawn(schedule);
            scheduled += 1;
        }

        for (identity, definition) in tenant.version_checks(environment) {
            let versions = inner.versions.clone();
            let board = inner.board.clone();
            let tenant_name = tenant.name.clone();
            let schedule = run_schedule(
                identity,
                definition.clone(),
                interval,
                cancel.clone(),
                move |identity, definition| {
                    versions.submit(tenant_name.clone(), identity, definition)
                },
                move |identity, version: Option<String>| {
                    let previous = board.record_version(identity, version.clone());
                    if previous != version {
                        info!(check = %identity, ?previous, ?version, "Version changed");
                    }
                },
            );
            tokio::spawn(schedule);
            scheduled += 1;
        }

        info!(tenant = %tenant.name, checks = scheduled, "Tenant scheduled");
        inner
            .tenants
            .lock()
            .insert(tenant.name.clone(), TenantSchedule { config: tenant, cancel });
    }

    fn watch_version_limit(&self) -> JoinHandle<()> {
        let versions = self.inner.versions.clone();
        let mut limits = self.inner.version_limit.subscribe();
        limits.mark_changed();
        tokio::spawn(async move {
            while limits.changed().await.is_ok() {
                let limit = *limits.borrow_and_update();
                versions.reconfigure_all(limit);
            }
        })
    }

    fn spawn_reload(&self, path: PathBuf, interval: std::time::Duration) -> JoinHandle<()> {
        let agent = self.clone();
        let cancel = self.inner.shutdown.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; the config was just loaded
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                match Config::from_file(&path).await {
                    Ok(config) => {
                        debug!(path = ?path, "Configuration reloaded");
                        agent.apply_config(config);
                    }
                    Err(e) => {
                        warn!(path = ?path, "Configuration reload failed, keeping current: {}", e)
                    }
                }
            }
        })
    }
}

fn publish_limit(cell: &watch::Sender<usize>, limit: usize) {
    cell.send_if_modified(|current| {
        if *current == limit {
            return false;
        }
        *current = limit;
        true
    });
}
