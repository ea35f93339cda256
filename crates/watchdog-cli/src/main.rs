//! Watchdog CLI - thin process wrapper around the gate, posture engine,
//! and escalation interface. Wires concrete collaborators from a config
//! file and keeps the process alive; the hook protocol that actually
//! calls `Gate::intercept` per tool call is owned by whatever host
//! embeds this sidecar, not by this binary.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use watchdog_classifier::ClassifierClient;
use watchdog_escalation::interface::EscalationInterface;
use watchdog_gateway::adapters::{
    RegistryAuditor, RegistryEntryOverrideResolver, RegistryEscalationStore, RegistryPatternLookup, PipelineScannerBridge,
};
use watchdog_gateway::Gate;
use watchdog_posture::engine::PostureEngine;
use watchdog_registry::Registry;
use watchdog_scanner::fuzzy::FuzzyIndex;
use watchdog_scanner::pii::{CircuitBreaker, HttpPiiAnalyzer};
use watchdog_scanner::pipeline::ScanPipeline;
use watchdog_scanner::secrets::SubprocessCredentialScanner;
use watchdog_types::config::WatchdogConfig;
use watchdog_types::model::{DailyMetrics, HealthCheckRecord, PostureState};

mod channel;

use channel::LoggingChannelAdapter;

/// Default endpoint for the external structural-PII analyzer. Not part
/// of the configuration document; the analyzer is a fixed sidecar
/// service in this deployment shape.
const PII_ANALYZER_ENDPOINT: &str = "http://127.0.0.1:8091/analyze";
/// Default entity set requested from the PII analyzer.
const PII_ENTITIES: &[&str] = &["EMAIL_ADDRESS", "PHONE_NUMBER", "US_SSN", "PERSON", "LOCATION", "CREDIT_CARD"];
/// Subprocess invoked for the credential-scanning stage.
const CREDENTIAL_SCANNER_PROGRAM: &str = "watchdog-secrets-scan";

#[derive(Parser)]
#[command(name = "watchdog")]
#[command(about = "Security Watchdog - outbound content scanning sidecar")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start the watchdog gateway and background loops.
    Start,
    /// Validate the configuration document without starting anything.
    Check,
    /// Print a one-shot status summary from the registry.
    Status,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Start) | None => run_blocking(start)?,
        Some(Commands::Check) => check()?,
        Some(Commands::Status) => run_blocking(status)?,
    }

    Ok(())
}

fn run_blocking<F, Fut>(f: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    tokio::runtime::Runtime::new()?.block_on(f())
}

fn check() -> anyhow::Result<()> {
    let config = WatchdogConfig::from_env()?;
    println!("configuration is valid");
    println!("gateway.concurrency_limit = {}", config.gateway.concurrency_limit);
    println!("scanner.total_timeout_ms = {}", config.scanner.total_timeout_ms);
    println!("securityAgent.endpoint = {}", config.security_agent.endpoint);
    Ok(())
}

async fn status() -> anyhow::Result<()> {
    let config = WatchdogConfig::from_env()?;
    let registry = Registry::open(&config.auditor.db_path)?;
    let posture = registry.get_posture()?;
    let pending = registry.list_pending_escalations()?;
    let inventory = registry.inventory_counts()?;

    println!("posture: {:?}", posture.map(|p| p.level).unwrap_or(watchdog_types::enums::PostureLevel::Green));
    println!("pending escalations: {}", pending.len());
    println!(
        "inventory: never_share={} ask_first={} internal_only={}",
        inventory.never_share, inventory.ask_first, inventory.internal_only
    );
    Ok(())
}

async fn start() -> anyhow::Result<()> {
    let config = WatchdogConfig::from_env()?;
    let registry = Arc::new(Registry::open(&config.auditor.db_path)?);

    if registry.get_posture()?.is_none() {
        registry.save_posture(&PostureState {
            level: watchdog_types::enums::PostureLevel::Green,
            manual_override: None,
            last_calculated: chrono::Utc::now(),
            never_share_count: 0,
            ask_first_count: 0,
            internal_only_count: 0,
            downward_eligible_since: None,
        })?;
    }

    let fuzzy_index = Arc::new(FuzzyIndex::new());
    rebuild_fuzzy_index(&registry, &fuzzy_index)?;

    let pii_analyzer = Arc::new(HttpPiiAnalyzer::new(PII_ANALYZER_ENDPOINT, Duration::from_millis(config.scanner.pii_timeout_ms)));
    let pattern_lookup = Arc::new(RegistryPatternLookup::new(registry.clone()));
    let entry_override = Arc::new(RegistryEntryOverrideResolver::new(registry.clone()));
    let credential_scanner = Arc::new(SubprocessCredentialScanner::new(
        CREDENTIAL_SCANNER_PROGRAM,
        Duration::from_millis(config.scanner.secrets_timeout_ms),
    ));
    let pii_breaker = Arc::new(CircuitBreaker::new(config.scanner.circuit_breaker_threshold));

    let pipeline = Arc::new(ScanPipeline::new(
        pii_analyzer,
        pattern_lookup,
        entry_override,
        credential_scanner,
        fuzzy_index,
        pii_breaker.clone(),
        PII_ENTITIES.iter().map(|s| s.to_string()).collect(),
        config.scanner.pii_score_threshold,
        Duration::from_millis(config.scanner.pii_timeout_ms),
        Duration::from_millis(config.scanner.secrets_timeout_ms),
        Duration::from_millis(config.scanner.fuzzy_timeout_ms),
        Duration::from_millis(config.scanner.total_timeout_ms),
    ));

    let scanner = Arc::new(PipelineScannerBridge::new(pipeline, pii_breaker.clone()));
    let auditor = Arc::new(RegistryAuditor::new(registry.clone()));
    let store = Arc::new(RegistryEscalationStore::new(registry.clone())?);
    let channel = Arc::new(LoggingChannelAdapter::new());
    let classifier = Arc::new(ClassifierClient::new(config.security_agent.clone()));
    let escalation = Arc::new(tokio::sync::Mutex::new(EscalationInterface::new(
        &config.escalation,
        store,
        channel,
        "owner-primary",
        None,
        "owner",
    )));

    let gate = Arc::new(Gate::new(config.gateway.clone(), scanner, auditor, registry.clone(), classifier.clone(), escalation.clone())?);

    info!("watchdog gateway ready");

    tokio::spawn(posture_loop(registry.clone(), config.posture.recalc_interval_secs));
    tokio::spawn(escalation_loop(escalation));
    tokio::spawn(health_and_metrics_loop(registry.clone(), gate.clone(), classifier, pii_breaker));

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    let _ = gate.metrics().snapshot(gate.kill_switch().is_active());
    Ok(())
}

fn rebuild_fuzzy_index(registry: &Registry, fuzzy_index: &FuzzyIndex) -> anyhow::Result<()> {
    let entries = registry.list_active_user_entries()?;
    let mut user_entries = Vec::with_capacity(entries.len());
    let mut variants = Vec::new();
    for entry in &entries {
        user_entries.push((entry.id, entry.primary_value.clone(), entry.classification));
        for variant in registry.list_variants(entry.id)? {
            variants.push((variant.entry_id, variant.text, entry.classification));
        }
    }
    fuzzy_index.rebuild(&user_entries, &variants);
    Ok(())
}

/// Recomputes posture on a fixed interval from live inventory counts.
async fn posture_loop(registry: Arc<Registry>, recalc_interval_secs: u64) {
    let mut engine = PostureEngine::new(300);
    let mut ticker = tokio::time::interval(Duration::from_secs(recalc_interval_secs.max(1)));
    loop {
        ticker.tick().await;
        let Ok(mut state) = registry.get_posture().map(|s| {
            s.unwrap_or(PostureState {
                level: watchdog_types::enums::PostureLevel::Green,
                manual_override: None,
                last_calculated: chrono::Utc::now(),
                never_share_count: 0,
                ask_first_count: 0,
                internal_only_count: 0,
                downward_eligible_since: None,
            })
        }) else {
            continue;
        };
        let Ok(counts) = registry.inventory_counts() else { continue };
        let pending_block = registry.list_pending_escalations().map(|v| !v.is_empty()).unwrap_or(false);
        let changed = engine.recompute(
            &mut state,
            counts,
            chrono::Utc::now(),
            pending_block,
            watchdog_types::enums::PostureTrigger::InventoryChange,
        );
        if let Some(changed) = changed {
            info!(previous = ?changed.previous, new = ?changed.new, "posture transition");
        }
        if let Err(err) = registry.save_posture(&state) {
            warn!(error = %err, "failed to persist posture state");
        }
    }
}

/// Drives the escalation interface's batch flush and expiry timers.
async fn escalation_loop<S, C>(escalation: Arc<tokio::sync::Mutex<EscalationInterface<S, C>>>)
where
    S: watchdog_escalation::interface::EscalationStore,
    C: watchdog_types::bridges::ChannelAdapter,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let mut interface = escalation.lock().await;
        let now = chrono::Utc::now();

        if interface.should_flush_batch(now) {
            if let Err(err) = interface.flush_batch(now).await {
                warn!(error = %err, "failed to flush escalation batch");
            }
        }
        if let Err(err) = interface.check_expiries(now).await {
            warn!(error = %err, "failed to resolve expired escalations");
        }
        for short_id in interface.due_reminders(now) {
            info!(%short_id, "escalation reminder due");
        }
    }
}

/// Runs periodic self-checks (analyzer/classifier reachability via their
/// circuit breakers, registry flush latency) and, once per UTC day, rolls
/// the gate's counters into a `daily_metrics` row.
async fn health_and_metrics_loop(
    registry: Arc<Registry>,
    gate: Arc<Gate<PipelineScannerBridge, RegistryAuditor, RegistryEscalationStore, LoggingChannelAdapter>>,
    classifier: Arc<ClassifierClient>,
    pii_breaker: Arc<CircuitBreaker>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(60));
    let mut last_rollup_date: Option<String> = None;
    loop {
        ticker.tick().await;
        let now = chrono::Utc::now();

        let flush_started = std::time::Instant::now();
        let registry_healthy = registry.flush().is_ok();
        let flush_detail = format!("flush took {}ms", flush_started.elapsed().as_millis());
        record_health_check(&registry, "registry", registry_healthy, Some(flush_detail), now);
        record_health_check(&registry, "pii_analyzer", !pii_breaker.is_tripped(), None, now);
        record_health_check(&registry, "classifier", !classifier.is_degraded(), None, now);

        let today = now.format("%Y-%m-%d").to_string();
        if last_rollup_date.as_deref() != Some(today.as_str()) {
            let snapshot = gate.metrics().snapshot(gate.kill_switch().is_active());
            let rollup = DailyMetrics {
                date: today.clone(),
                intercepted: snapshot.intercepted,
                clean: snapshot.clean,
                quarantined: snapshot.quarantined,
                failed: snapshot.failed,
                bypassed: snapshot.bypassed,
                inbound_inspected: snapshot.inbound_inspected,
                inbound_errors: snapshot.inbound_errors,
            };
            if let Err(err) = registry.save_daily_metrics(&rollup) {
                warn!(error = %err, "failed to persist daily metrics rollup");
            }
            last_rollup_date = Some(today);
        }
    }
}

fn record_health_check(registry: &Registry, component: &str, healthy: bool, detail: Option<String>, now: chrono::DateTime<chrono::Utc>) {
    let record = HealthCheckRecord { id: uuid::Uuid::new_v4(), component: component.to_string(), healthy, detail, checked_at: now };
    if let Err(err) = registry.record_health_check(&record) {
        warn!(error = %err, component, "failed to persist health check");
    }
}
