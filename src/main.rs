#![deny(unused)]
//! DeFi Agent - natural-language DeFi query pipeline
//!
//! Classifies a free-form query, routes it to specialist agents, runs them
//! under a coordination strategy and prints the unified answer as JSON.

use clap::{Parser, ValueEnum};

use defi_agent_controller::Orchestrator;
use defi_agent_core::{
    config::AppConfig,
    types::{QueryRequest, RiskTolerance, UserProfile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Low,
    Medium,
    High,
}

impl From<ProfileArg> for RiskTolerance {
    fn from(profile: ProfileArg) -> Self {
        match profile {
            ProfileArg::Low => RiskTolerance::Low,
            ProfileArg::Medium => RiskTolerance::Medium,
            ProfileArg::High => RiskTolerance::High,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "defi-agent", version, about = "Answer a DeFi question with specialist agents")]
struct Cli {
    /// Stated risk tolerance of the user.
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// Include chart descriptors and suggested actions.
    #[arg(long)]
    visualize: bool,

    /// The question, e.g. "safe yield for my USDC".
    #[arg(required = true)]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration, using defaults: {}", e);
            AppConfig::default()
        }
    };

    // =========================================================================
    // Telemetry
    // =========================================================================
    defi_agent_governance::configure_tracing(&config.telemetry)?;

    let metrics_handle = if config.telemetry.prometheus {
        Some(defi_agent_governance::setup_metrics_recorder()?)
    } else {
        None
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = %config.inference.provider,
        model = %config.inference.model,
        "Starting DeFi agent"
    );

    // =========================================================================
    // Pipeline
    // =========================================================================
    let orchestrator = Orchestrator::from_config(&config)?;
    tracing::info!(
        agents = orchestrator.registry().len(),
        budget_ms = orchestrator.budget().as_millis() as u64,
        "Pipeline ready"
    );

    let mut request = QueryRequest::text(cli.query.join(" "));
    if let Some(profile) = cli.profile {
        request = request.with_profile(UserProfile::with_risk_tolerance(profile.into()));
    }
    if cli.visualize {
        request = request.with_visualization();
    }

    let response = orchestrator.run(request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }

    Ok(())
}
