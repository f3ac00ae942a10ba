//! Dosewise v0.3.0 - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dosewise::{
    advisory::{cancel_pair, AdvisoryOrchestrator, CancelHandle},
    cli::{Args, Commands, Verbosity},
    config::{Config, API_KEY_ENV},
    consultation::{AdvisoryOutcome, Consultation, DoseReport},
    dosing::{DoseCalculator, MedicineCatalog, MedicineRegistry},
    generation::{GeminiClient, TextGenerator},
    knowledge::{KnowledgeLookup, NoKnowledge, RxNavClient},
    logging,
    types::{Advisory, AdvisoryOrigin, DoseRequest, DoseResult, SafetyClassification},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    logging::init_with_level(verbosity.log_level());

    let config = load_config(&args)?;

    match &args.command {
        Commands::Calculate {
            registry,
            advise,
            json,
            ..
        } => {
            let request = args
                .command
                .dose_request()
                .context("calculate command without a dose request")?;
            let catalog = load_registry(registry.as_deref(), &config)?;
            run_calculate(&config, catalog, &request, *advise, *json, verbosity).await?;
        }
        Commands::Medicines { registry } => {
            let catalog = load_registry(registry.as_deref(), &config)?;
            list_medicines(catalog.as_ref());
        }
        Commands::Config { init } => {
            if *init {
                init_config(&args)?;
            } else {
                show_config(&args, &config)?;
            }
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn load_registry(cli_path: Option<&Path>, config: &Config) -> Result<Arc<MedicineCatalog>> {
    let path: PathBuf = cli_path
        .map(Path::to_path_buf)
        .or_else(|| config.registry.path.clone())
        .context("No medicine registry configured. Pass --registry <file> or set [registry] path in the config file")?;

    Ok(Arc::new(MedicineCatalog::load_from(&path)?))
}

fn build_orchestrator(config: &Config) -> Result<Option<AdvisoryOrchestrator>> {
    let Some(api_key) = config.generation.api_key.as_deref() else {
        return Ok(None);
    };

    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::with_config(
        &config.generation.base_url,
        &config.generation.model,
        api_key,
        config.generation.params(),
    )?);

    let knowledge: Arc<dyn KnowledgeLookup> = if config.knowledge.enabled {
        Arc::new(RxNavClient::with_config(
            &config.knowledge.base_url,
            config.knowledge.timeout(),
        )?)
    } else {
        Arc::new(NoKnowledge)
    };

    Ok(Some(
        AdvisoryOrchestrator::new(knowledge, generator)
            .with_retry_policy(config.generation.retry_policy()),
    ))
}

async fn run_calculate(
    config: &Config,
    catalog: Arc<MedicineCatalog>,
    request: &DoseRequest,
    advise: bool,
    json: bool,
    verbosity: Verbosity,
) -> Result<()> {
    let orchestrator = if advise {
        let orchestrator = build_orchestrator(config)?;
        if orchestrator.is_none() {
            eprintln!(
                "{}: no API key configured, skipping advisory (set {} or [generation] api_key)",
                "Warning".yellow(),
                API_KEY_ENV
            );
        }
        orchestrator
    } else {
        None
    };
    let Some(orchestrator) = orchestrator else {
        let dose = DoseCalculator::new(catalog).calculate(request)?;
        return print_output(&DoseReport::new(dose), json);
    };
    let consultation = Consultation::new(catalog, orchestrator);

    // Ctrl-C abandons the advisory; the dose is still printed
    let (handle, cancel) = cancel_pair();
    tokio::spawn(cancel_on_interrupt(tokio::signal::ctrl_c(), handle));

    // The dose is shown before the advisory is requested
    let dose = consultation.calculate(request)?;
    let mut report = DoseReport::new(dose);
    if !json {
        print!("{}", render_dose(&report.dose));
    }

    let spinner = if verbosity.show_progress() && !json {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        pb.set_message("Generando consejos...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = consultation.advise(&report.dose, &cancel).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    report.advisory = AdvisoryOutcome::from_result(result);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_advisory(&report.advisory);
    }

    Ok(())
}

/// Cancel through `handle` once `interrupt` resolves
///
/// If the interrupt source itself fails, the handle is held forever: dropping
/// it would cancel the advisory.
async fn cancel_on_interrupt<F>(interrupt: F, handle: CancelHandle)
where
    F: Future<Output = std::io::Result<()>>,
{
    match interrupt.await {
        Ok(()) => handle.cancel(),
        Err(e) => {
            tracing::warn!("cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
            drop(handle);
        }
    }
}

fn print_output(report: &DoseReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render_dose(&report.dose));
        print_advisory(&report.advisory);
    }

    Ok(())
}

fn render_dose(dose: &DoseResult) -> String {
    let alert = match dose.classification {
        SafetyClassification::Safe => dose.alert.green(),
        SafetyClassification::BelowRange => dose.alert.yellow(),
        SafetyClassification::AboveRange => dose.alert.red(),
    };

    format!(
        "\n{}\n  Dosis diaria:      {:.2} mg\n  Tomas por día:     {}\n  Dosis por toma:    {:.2} mg\n  Volumen por toma:  {:.2} ml\n  Rango seguro:      {}\n  {}\n\n",
        format!("{} ({} kg)", dose.medicine, dose.weight_kg).bold(),
        dose.mg_per_day,
        dose.doses_per_day,
        dose.mg_per_dose,
        dose.ml_per_dose,
        dose.safe_range,
        alert.bold()
    )
}

fn render_advisory(advisory: &Advisory) -> String {
    let heading = match advisory.origin {
        AdvisoryOrigin::Model => "Consejos".cyan(),
        AdvisoryOrigin::Patched => "Consejos (completados)".cyan(),
        AdvisoryOrigin::Fallback => "Consejos (genéricos)".yellow(),
    };

    let mut out = format!("{}\n  {}\n", heading.bold(), advisory.result.advice);

    out.push_str(&format!("\n{}\n", "Recomendaciones".bold()));
    for item in &advisory.result.recommendations {
        out.push_str(&format!("  • {}\n", item));
    }

    out.push_str(&format!("\n{}\n", "Precauciones".bold()));
    for item in &advisory.result.warnings {
        out.push_str(&format!("  • {}\n", item.yellow()));
    }
    out.push('\n');
    out
}

fn print_advisory(outcome: &AdvisoryOutcome) {
    match outcome {
        AdvisoryOutcome::NotRequested => {}
        AdvisoryOutcome::Ready { advisory } => print!("{}", render_advisory(advisory)),
        AdvisoryOutcome::TimedOut { message } | AdvisoryOutcome::Failed { message } => {
            eprintln!("{}: {}", "Advisory".red(), message);
        }
        AdvisoryOutcome::Cancelled => {
            eprintln!("{}", "Advisory cancelled".yellow());
        }
    }
}

fn list_medicines(registry: &dyn MedicineRegistry) {
    let profiles = registry.profiles();
    if profiles.is_empty() {
        println!("No medicines in registry.");
        return;
    }

    println!("Available medicines:");
    for profile in profiles {
        println!(
            "  • {} - {} mg/kg/día, {} tomas, {} mg / {} ml, rango {}",
            profile.name.bold(),
            profile.mg_kg_day,
            profile.doses_per_day,
            profile.concentration_mg,
            profile.concentration_ml,
            profile.safe_band()
        );
        if let Some(description) = &profile.description {
            println!("      {}", description.dimmed());
        }
    }
}

fn config_file(args: &Args) -> Result<PathBuf> {
    match &args.config {
        Some(path) => Ok(path.clone()),
        None => Config::config_path(),
    }
}

fn init_config(args: &Args) -> Result<()> {
    let path = config_file(args)?;

    if Config::init_at(&path)? {
        println!("{} {}", "Created".green(), path.display());
    } else {
        println!("{} already exists, left unchanged", path.display());
    }

    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let path = config_file(args)?;

    println!("{}", "Dosewise Configuration".bold());
    println!("  File:      {}", path.display());
    println!("  Verbosity: {}", args.verbosity().as_str());
    println!();
    println!("{}", toml::to_string_pretty(&config.redacted())?);

    Ok(())
}
