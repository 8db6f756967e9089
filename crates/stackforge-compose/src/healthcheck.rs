//! Health check factory.
//!
//! Every constructor takes [`HealthCheckOptions`] whose set fields
//! override the per-kind defaults.

use std::time::Duration;

use stackforge_common::types::DependencyKind;

/// A readiness probe embedded in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    /// Probe command; the first item is `CMD` or `CMD-SHELL`.
    pub test: Vec<String>,
    /// Time between probes.
    pub interval: Duration,
    /// Time a single probe may take.
    pub timeout: Duration,
    /// Consecutive failures before the service is unhealthy.
    pub retries: u32,
    /// Warm-up grace period.
    pub start_period: Option<Duration>,
}

/// Partial overrides for the factory defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthCheckOptions {
    /// Overrides the probe interval.
    pub interval: Option<Duration>,
    /// Overrides the probe timeout.
    pub timeout: Option<Duration>,
    /// Overrides the retry count.
    pub retries: Option<u32>,
    /// Overrides the warm-up grace period.
    pub start_period: Option<Duration>,
}

const fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn build(
    test: Vec<String>,
    options: HealthCheckOptions,
    (interval, timeout, retries): (Duration, Duration, u32),
    start_period: Option<Duration>,
) -> HealthCheck {
    HealthCheck {
        test,
        interval: options.interval.unwrap_or(interval),
        timeout: options.timeout.unwrap_or(timeout),
        retries: options.retries.unwrap_or(retries),
        start_period: options.start_period.or(start_period),
    }
}

fn command(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

/// HTTP probe against `http://localhost:<port><path>`.
#[must_use]
pub fn http(port: &str, path: &str, options: HealthCheckOptions) -> HealthCheck {
    build(
        command(&["CMD", "curl", "-f", &format!("http://localhost:{port}{path}")]),
        options,
        (secs(30), secs(10), 3),
        Some(secs(40)),
    )
}

/// PostgreSQL readiness probe for the given user.
#[must_use]
pub fn postgres(user: &str, options: HealthCheckOptions) -> HealthCheck {
    build(
        command(&["CMD-SHELL", &format!("pg_isready -U {user}")]),
        options,
        (secs(10), secs(5), 5),
        None,
    )
}

/// MySQL liveness probe.
#[must_use]
pub fn mysql(options: HealthCheckOptions) -> HealthCheck {
    build(
        command(&["CMD", "mysqladmin", "ping", "-h", "localhost"]),
        options,
        (secs(10), secs(5), 5),
        None,
    )
}

/// Redis liveness probe.
#[must_use]
pub fn redis(options: HealthCheckOptions) -> HealthCheck {
    build(
        command(&["CMD", "redis-cli", "ping"]),
        options,
        (secs(10), secs(5), 5),
        None,
    )
}

/// RabbitMQ liveness probe.
#[must_use]
pub fn rabbitmq(options: HealthCheckOptions) -> HealthCheck {
    build(
        command(&["CMD", "rabbitmq-diagnostics", "-q", "ping"]),
        options,
        (secs(30), secs(10), 3),
        None,
    )
}

/// Probe running an arbitrary command.
#[must_use]
pub fn custom(test: Vec<String>, options: HealthCheckOptions) -> HealthCheck {
    build(test, options, (secs(30), secs(10), 3), None)
}

/// The default probe of a managed dependency, with literal credentials.
///
/// The document store has no cheap readiness probe and returns `None`.
#[must_use]
pub fn for_dependency(kind: DependencyKind) -> Option<HealthCheck> {
    let defaults = HealthCheckOptions::default();
    match kind {
        DependencyKind::Postgres => Some(postgres("postgres", defaults)),
        DependencyKind::Mysql => Some(mysql(defaults)),
        DependencyKind::Mongodb => None,
        DependencyKind::Redis => Some(redis(defaults)),
        DependencyKind::Rabbitmq => Some(rabbitmq(defaults)),
    }
}

/// Renders a duration the way compose files spell it (`30s`).
#[must_use]
pub fn compose_duration(duration: Duration) -> String {
    format!("{}s", duration.as_secs())
}

impl HealthCheck {
    /// The probe as an exec argv, without the `CMD`/`CMD-SHELL` marker.
    ///
    /// Shell-form probes are wrapped in `sh -c`.
    #[must_use]
    pub fn exec_command(&self) -> Vec<String> {
        match self.test.split_first() {
            Some((marker, rest)) if marker == "CMD-SHELL" => {
                vec!["sh".into(), "-c".into(), rest.join(" ")]
            }
            Some((marker, rest)) if marker == "CMD" => rest.to_vec(),
            _ => self.test.clone(),
        }
    }
}
