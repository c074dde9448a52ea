//! Staker - Entry Point
//!
//! One subcommand per page of the lending client, plus `watch` and
//! `digest`.
//!
//! Wiring sequence:
//! 1. Parse the command line and load config.toml (env overrides applied)
//! 2. Init tracing (human-readable, or JSON with `app.json_logs`)
//! 3. Load the contract digest and connect to the node (optional signer
//!    from STAKER_PRIVATE_KEY)
//! 4. Validate the digest addresses against deployed code
//! 5. Run the command; `watch` polls until SIGINT

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use staker::adapters::chain::{signer_from_env, ChainSession, ContractValidator, EvmLedger, LedgerAddresses, NodeProvider};
use staker::adapters::digest::{generate_digest, locate_latest_run, write_digest, ContractDigest};
use staker::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use staker::adapters::status::NodeStatusClient;
use staker::config::{self, AppConfig};
use staker::domain::{FilAmount, FormAction, TransactTab, TransactView, TxIntent};
use staker::ports::session::WalletSession;
use staker::ports::telemetry::Telemetry;
use staker::usecases::{pool_options, LoanService, PortfolioService, Revalidator, TransactService};

#[derive(Parser)]
#[command(name = "staker", version)]
#[command(about = "Deposit into, borrow from and repay GLIF lending pools")]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    /// Print views as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pool count, total assets and node status
    Landing,
    /// Liquid FIL, holdings and opportunities
    Portfolio,
    /// Every pool with its rate and assets
    Pools,
    /// One pool's stats and transact panel
    Pool {
        id: String,
        /// Transact tab: deposit or withdraw
        #[arg(long, default_value = "deposit")]
        tab: TransactTab,
    },
    /// Wrap FIL into WFIL
    Wrap { amount: FilAmount },
    /// Allow a pool to spend WFIL
    Approve { pool: String, amount: FilAmount },
    /// Deposit WFIL into a pool (needs WFIL and an allowance; see `wrap` and `approve`)
    Deposit { pool: String, amount: FilAmount },
    /// Withdraw FIL from a pool
    Withdraw { pool: String, amount: FilAmount },
    /// Show a pool's borrow terms, or borrow with an amount
    Borrow { pool: String, amount: Option<FilAmount> },
    /// Show the loan in a pool, or repay with an amount
    Repay {
        pool: String,
        amount: Option<FilAmount>,
        /// Account repaying; defaults to the connected account
        #[arg(long)]
        payee: Option<Address>,
    },
    /// Poll pools and balances, serving /live, /ready and /metrics
    Watch {
        /// Also poll this pool's page
        #[arg(long)]
        pool: Option<String>,
    },
    /// Build the contract digest from a deployment broadcast
    Digest {
        /// Broadcast directory of the deployment script
        #[arg(long, default_value = "broadcast/Demo.s.sol")]
        broadcast: PathBuf,
        /// Compiler output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
        /// Destination; defaults to `contracts.digest_path`
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Connected adapters shared by every command.
struct App {
    config: AppConfig,
    provider: Arc<NodeProvider>,
    ledger: Arc<EvmLedger>,
    session: Arc<ChainSession>,
    digest: ContractDigest,
    metrics: Arc<MetricsRegistry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `digest` runs before the node exists, so it tolerates a missing config.
    if let Commands::Digest { broadcast, out, output } = &cli.command {
        let config = config::loader::load_config(&cli.config).ok();
        init_tracing(config.as_ref());
        let target = output.clone().unwrap_or_else(|| {
            config.map_or_else(
                || PathBuf::from("generated/contractDigest.json"),
                |c| PathBuf::from(c.contracts.digest_path),
            )
        });
        return run_digest(broadcast, out, &target);
    }

    let config = config::loader::load_config(&cli.config).context("Failed to load configuration")?;
    init_tracing(Some(&config));

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting staker"
    );

    let app = connect(config).await?;
    let json = cli.json;

    match cli.command {
        Commands::Landing => landing(&app, json).await,
        Commands::Portfolio => portfolio(&app, json).await,
        Commands::Pools => pools(&app, json).await,
        Commands::Pool { id, tab } => pool(&app, &id, tab, json).await,
        Commands::Wrap { amount } => transact(&app, TxIntent::WrapFil { amount }, json).await,
        Commands::Approve { pool, amount } => {
            let pool = portfolio_service(&app).pools().require(&pool).await?;
            let intent = TxIntent::ApproveWfil {
                spender: pool.address,
                amount,
            };
            transact(&app, intent, json).await
        }
        Commands::Deposit { pool, amount } => submit_form(&app, &pool, FormAction::Deposit, amount, json).await,
        Commands::Withdraw { pool, amount } => submit_form(&app, &pool, FormAction::Withdraw, amount, json).await,
        Commands::Borrow { pool, amount } => borrow(&app, &pool, amount, json).await,
        Commands::Repay { pool, amount, payee } => repay(&app, &pool, amount, payee, json).await,
        Commands::Watch { pool } => watch(app, pool).await,
        Commands::Digest { .. } => Ok(()),
    }
}

fn init_tracing(config: Option<&AppConfig>) {
    let level = config.map_or("info", |c| c.app.log_level.as_str());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if config.is_some_and(|c| c.app.json_logs) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn connect(config: AppConfig) -> Result<App> {
    let digest = ContractDigest::load(Path::new(&config.contracts.digest_path))
        .context("Failed to load contract digest")?;
    let addresses = LedgerAddresses::from_digest(&digest)?;

    let signer = signer_from_env()?;
    let provider = Arc::new(NodeProvider::connect(&config.network, signer).await?);

    ContractValidator::new(provider.inner())
        .validate_all(&addresses)
        .await
        .context("Contract digest does not match the connected node")?;

    let metrics = Arc::new(MetricsRegistry::new()?);
    let ledger = Arc::new(
        EvmLedger::new(Arc::clone(&provider), addresses, config.network.reads_per_second)
            .with_metrics(Arc::clone(&metrics)),
    );

    let watch_address = config
        .wallet
        .address
        .as_deref()
        .map(str::parse::<Address>)
        .transpose()
        .context("wallet.address is not an address")?;
    let session = Arc::new(ChainSession::new(Arc::clone(&provider), watch_address));

    match session.address() {
        Some(address) => info!(%address, can_sign = session.can_sign(), "Account selected"),
        None => warn!("No account configured; per-account views show zero balances"),
    }

    Ok(App {
        config,
        provider,
        ledger,
        session,
        digest,
        metrics,
    })
}

fn portfolio_service(app: &App) -> PortfolioService<EvmLedger, ChainSession> {
    PortfolioService::new(Arc::clone(&app.ledger), Arc::clone(&app.session))
}

fn transact_service(app: &App) -> TransactService<EvmLedger> {
    TransactService::new(Arc::clone(&app.ledger)).with_telemetry(Arc::clone(&app.metrics) as Arc<dyn Telemetry>)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: &[(&str, String)]) {
    for (label, value) in lines {
        println!("{label:<20} {value}");
    }
}

async fn landing(app: &App, json: bool) -> Result<()> {
    let landing = portfolio_service(app).landing().await?;

    let status = match &app.config.network.node_status_url {
        Some(url) => {
            let client = NodeStatusClient::new(url.clone(), Duration::from_secs(app.config.network.timeout_seconds))?;
            Some(client.probe().await)
        }
        None => None,
    };

    if json {
        return print_json(&serde_json::json!({ "landing": landing, "node_status": status }));
    }

    print_lines(&landing.stat_lines());
    if let Some(status) = status {
        let text = if status.reachable { "reachable" } else { "unreachable" };
        println!("{:<20} {text}", "Node status");
    }
    Ok(())
}

async fn portfolio(app: &App, json: bool) -> Result<()> {
    let portfolio = portfolio_service(app).portfolio().await?;
    if json {
        return print_json(&portfolio);
    }

    print_lines(&portfolio.stat_lines());

    println!("\nYour Holdings");
    if portfolio.holdings.is_empty() {
        println!("  none");
    } else {
        println!("  {}", staker::usecases::HoldingRow::COLUMNS.join(" | "));
        for row in &portfolio.holdings {
            println!("  {}", row.cells().join(" | "));
        }
    }

    println!("\nOpportunities");
    for opportunity in &portfolio.opportunities {
        println!("  Pool #{}", opportunity.pool_id);
        for (label, value) in opportunity.lines() {
            println!("    {label:<20} {value}");
        }
    }
    Ok(())
}

async fn pools(app: &App, json: bool) -> Result<()> {
    let pools = portfolio_service(app).pools().list().await?;
    if json {
        return print_json(&pools);
    }

    if pools.is_empty() {
        println!("No pools deployed");
    }
    for pool in &pools {
        println!("Pool #{} {}", pool.id, pool.name);
        for (label, value) in pool.picker_lines() {
            println!("  {label:<20} {value}");
        }
    }
    Ok(())
}

async fn pool(app: &App, id: &str, tab: TransactTab, json: bool) -> Result<()> {
    let page = portfolio_service(app).pool_page(id, tab).await?;
    if json {
        return print_json(&page);
    }

    print_lines(&page.pool.stat_lines());
    println!();
    print_lines(&page.holding_lines());
    println!("\n[{}]", page.tab);
    match &page.view {
        TransactView::Status(text) => println!("{text}"),
        TransactView::Form(form) => {
            println!("{}", form.header);
            if let Some(rate) = &form.exchange_rate_label {
                println!("{rate}");
            }
            println!("{} -> {}", form.input_label, form.submit_label);
        }
    }
    Ok(())
}

async fn transact(app: &App, intent: TxIntent, json: bool) -> Result<()> {
    let outcome = transact_service(app).submit(intent).await?;
    if json {
        return print_json(&outcome);
    }
    let status = if outcome.success { "confirmed" } else { "reverted" };
    println!("{status}: {}", outcome.tx_hash);
    Ok(())
}

/// Submit through the pool page's form so eligibility gates deposits.
async fn submit_form(app: &App, id: &str, action: FormAction, amount: FilAmount, json: bool) -> Result<()> {
    let tab = if action == FormAction::Withdraw { TransactTab::Withdraw } else { TransactTab::Deposit };
    let page = portfolio_service(app).pool_page(id, tab).await?;
    let form = match &page.view {
        TransactView::Form(form) => form,
        TransactView::Status(text) => anyhow::bail!("Cannot {tab} yet: {text}"),
    };
    let form = form
        .require_action(action)
        .context("Run `staker wrap` or `staker approve` first")?;

    if let Some(preview) = form.receive_preview(amount) {
        info!(%preview, "Submitting {}", form.submit_label);
    }

    let outcome = transact_service(app).submit_form(form, amount, &page.context).await?;
    if json {
        return print_json(&outcome);
    }
    let status = if outcome.success { "confirmed" } else { "reverted" };
    println!("{} {status}: {}", form.submit_label, outcome.tx_hash);
    Ok(())
}

async fn borrow(app: &App, id: &str, amount: Option<FilAmount>, json: bool) -> Result<()> {
    let service = portfolio_service(app);
    let Some(amount) = amount else {
        let pools = service.pools().list().await?;
        let pool = staker::usecases::find_pool(&pools, id);
        if json {
            return print_json(&serde_json::json!({ "options": pool_options(&pools), "selected": pool }));
        }
        println!("Pools: {}", pool_options(&pools).iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>().join(", "));
        if pool.is_placeholder() {
            println!("Select a pool");
        }
        print_lines(&pool.picker_lines());
        return Ok(());
    };

    let agent = app.digest.loan_agent()?;
    let pool = service.pools().require(id).await?;
    let outcome = transact_service(app).borrow(&pool, amount, agent).await?;
    if json {
        return print_json(&outcome);
    }
    println!("Borrowed {amount} FIL from pool #{}: {}", pool.id, outcome.tx_hash);
    Ok(())
}

async fn repay(app: &App, id: &str, amount: Option<FilAmount>, payee: Option<Address>, json: bool) -> Result<()> {
    let agent = app.digest.loan_agent()?;
    let pool = portfolio_service(app).pools().require(id).await?;

    let Some(amount) = amount else {
        let view = LoanService::new(Arc::clone(&app.ledger)).loan_view(&pool, agent).await?;
        if json {
            return print_json(&view);
        }
        print_lines(&pool.picker_lines());
        match view {
            Some(view) => print_lines(&view.lines()),
            None => println!("No loan"),
        }
        return Ok(());
    };

    let payee = payee
        .or_else(|| app.session.address())
        .ok_or(staker::StakerError::NotConnected)?;
    let outcome = transact_service(app).repay(&pool, amount, agent, payee).await?;
    if json {
        return print_json(&outcome);
    }
    println!("Repaid {amount} FIL to pool #{}: {}", pool.id, outcome.tx_hash);
    Ok(())
}

fn run_digest(broadcast: &Path, out: &Path, target: &Path) -> Result<()> {
    let run = locate_latest_run(broadcast)?;
    let digest = generate_digest(&run, out)?;
    write_digest(&digest, target)?;
    println!("Contract digest written to {}", target.display());
    Ok(())
}

fn spawn_poller<T>(
    poller: Arc<Revalidator<T>>,
    interval: Duration,
    shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move { poller.run(interval, shutdown_rx).await })
}

/// Poll pools, balances and optionally one pool page until SIGINT.
async fn watch(app: App, pool_id: Option<String>) -> Result<()> {
    let interval = Duration::from_millis(app.config.polling.refresh_interval_ms);
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());
    let service = Arc::new(portfolio_service(&app));

    let pools_service = Arc::clone(&service);
    let pools = Arc::new(
        Revalidator::new("pools", move || {
            let service = Arc::clone(&pools_service);
            async move { service.pools().list().await }
        })
        .with_telemetry(Arc::clone(&app.metrics) as Arc<dyn Telemetry>),
    );

    let balance_service = Arc::clone(&service);
    let balances = Arc::new(
        Revalidator::new("balances", move || {
            let service = Arc::clone(&balance_service);
            async move { service.balances().account_balances().await }
        })
        .with_telemetry(Arc::clone(&app.metrics) as Arc<dyn Telemetry>),
    );

    let mut handles = Vec::new();

    if app.config.metrics.enabled {
        let server = HealthServer::new(
            Arc::clone(&health),
            Arc::clone(&app.metrics),
            app.config.metrics.bind_address.clone(),
        );
        let rx = shutdown_tx.subscribe();
        handles.push(tokio::spawn(async move {
            if let Err(e) = server.run(rx).await {
                error!(error = %e, "Health server failed");
            }
        }));
    }

    handles.push(spawn_poller(Arc::clone(&pools), interval, shutdown_tx.subscribe()));
    handles.push(spawn_poller(Arc::clone(&balances), interval, shutdown_tx.subscribe()));

    if let Some(id) = pool_id {
        let page_service = Arc::clone(&service);
        let page = Arc::new(
            Revalidator::new("pool_page", move || {
                let service = Arc::clone(&page_service);
                let id = id.clone();
                async move { service.pool_page(&id, TransactTab::Deposit).await }
            })
            .with_telemetry(Arc::clone(&app.metrics) as Arc<dyn Telemetry>),
        );
        let mut page_rx = page.subscribe();
        handles.push(spawn_poller(page, interval, shutdown_tx.subscribe()));
        handles.push(tokio::spawn(async move {
            while page_rx.changed().await.is_ok() {
                let state = page_rx.borrow_and_update().clone();
                if let Some(page) = state.value() {
                    info!(pool = %page.pool.id, eligibility = ?page.eligibility, holdings = %page.holdings, "Pool page updated");
                }
            }
        }));
    }

    // Node health and the pools state drive readiness.
    let status_client = match &app.config.network.node_status_url {
        Some(url) => Some(NodeStatusClient::new(url.clone(), Duration::from_secs(app.config.network.timeout_seconds))?),
        None => None,
    };
    let mut pools_rx = pools.subscribe();
    let mut balances_rx = balances.subscribe();
    let mut health_tick = tokio::time::interval(interval);

    info!(interval_ms = app.config.polling.refresh_interval_ms, "Watching; Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("SIGINT received, shutting down");
                break;
            }
            _ = health_tick.tick() => {
                let mut healthy = app.provider.is_healthy().await;
                if let Some(client) = &status_client {
                    let status = client.probe().await;
                    app.metrics.node_reachable.set(i64::from(status.reachable));
                    healthy &= status.reachable;
                }
                health.set_node_healthy(healthy);
            }
            Ok(()) = pools_rx.changed() => {
                let state = pools_rx.borrow_and_update().clone();
                health.set_last_poll_ok(state.error().is_none() && !state.is_loading());
                if let Some(list) = state.value() {
                    let total: FilAmount = list.iter().map(|p| p.total_assets).sum();
                    info!(pools = list.len(), total_assets = %total, "Pools revalidated");
                }
            }
            Ok(()) = balances_rx.changed() => {
                let state = balances_rx.borrow_and_update().clone();
                if let Some(b) = state.value() {
                    info!(fil = %b.fil, wfil = %b.wfil, "Balances revalidated");
                }
            }
        }
    }

    let _ = shutdown_tx.send(());
    for handle in handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}
