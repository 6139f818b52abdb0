use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use api_shared::HealthData;
use cardio_core::{
    parse_assessment, prompt::build_prompt, risk::RiskBand, validation::validate_health_data,
    CoreConfig, GatewayClient, InferenceClient, ParseOutcome,
};

#[derive(Parser)]
#[command(name = "cardio")]
#[command(about = "Cardio risk assessment CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the model prompt for a health data JSON file
    Prompt {
        /// Path to a JSON file holding one health data object
        file: PathBuf,
    },
    /// Parse a saved model reply and print the resulting assessment
    Parse {
        /// Path to a text file holding the raw model reply
        file: PathBuf,
    },
    /// Show the risk band for a score
    Band {
        /// Risk score (0-100)
        score: u8,
    },
    /// Run a live assessment against the configured gateway (nothing is stored)
    Assess {
        /// Path to a JSON file holding one health data object
        file: PathBuf,
    },
}

/// Reads health data from either a bare object or a `{ "healthData": ... }` request body.
fn read_health_data(path: &Path) -> anyhow::Result<HealthData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let inner = value.get("healthData").cloned().unwrap_or(value);
    let data: HealthData =
        serde_json::from_value(inner).context("JSON does not match the health data shape")?;
    validate_health_data(&data)?;
    Ok(data)
}

fn print_outcome(outcome: &ParseOutcome) -> anyhow::Result<()> {
    let assessment = outcome.assessment();
    if let Some(reason) = outcome.fallback_reason() {
        eprintln!("Fallback used: {}", reason);
    }
    if assessment.level_adjusted {
        eprintln!("Risk level replaced to match the score band");
    }
    let json = serde_json::json!({
        "riskScore": assessment.risk_score,
        "riskLevel": assessment.risk_level,
        "recommendations": assessment.recommendations,
        "fallbackUsed": outcome.fallback_reason().is_some(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Prompt { file }) => {
            let data = read_health_data(&file)?;
            println!("{}", build_prompt(&data));
        }
        Some(Commands::Parse { file }) => {
            let reply = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            print_outcome(&parse_assessment(&reply))?;
        }
        Some(Commands::Band { score }) => {
            if score > 100 {
                anyhow::bail!("score must be between 0 and 100, got {score}");
            }
            let band = RiskBand::for_score(score);
            println!("{} ({})", band.risk_level(), band.label());
        }
        Some(Commands::Assess { file }) => {
            dotenvy::dotenv().ok();
            let data = read_health_data(&file)?;
            let cfg = CoreConfig::from_lookup(|name| std::env::var_os(name))?;
            let client = GatewayClient::new(cfg.gateway().clone())?;

            let reply = client.complete(&build_prompt(&data)).await?;
            print_outcome(&parse_assessment(&reply))?;
        }
        None => {
            println!("Use 'cardio --help' for commands");
        }
    }

    Ok(())
}
