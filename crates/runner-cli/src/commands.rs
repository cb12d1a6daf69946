use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use runner_crypto::ContentHash;
use runner_diff::{ChangeKind, ChangeReport};
use runner_engine::{EngineConfig, FileStateStore, StateStore};
use runner_plan::{plan, validate_layer, EntryViolation, MergedOperation, ValidationPolicy};
use runner_types::{ContentReference, ErrorList, ResourceSpecification, Transition};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = EngineConfig::load_or_default(cli.config.as_deref())?;
    let format = cli.format;
    match cli.command {
        Command::Hash(args) => cmd_hash(args, format),
        Command::Validate(args) => cmd_validate(args, format),
        Command::Plan(args) => cmd_plan(args, &config, format),
        Command::Diff(args) => cmd_diff(args, &config, format),
        Command::State(args) => cmd_state(args, &config, format),
    }
}

fn load_spec(path: &Path) -> anyhow::Result<ResourceSpecification> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid specification {}", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn policy_for(config: &EngineConfig, transition: Transition) -> ValidationPolicy {
    match transition {
        Transition::Create => config.create_validation,
        Transition::Update => config.update_validation,
        Transition::Delete => config.delete_validation,
    }
}

fn cmd_hash(args: HashArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut rows = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let entry = ContentReference::local_file(path, None, None)
            .with_context(|| format!("cannot hash {path}"))?;
        let digest = entry.content_hash()?;
        rows.push((path, digest, entry.mode.unwrap_or_default()));
    }

    match format {
        OutputFormat::Text => {
            for (path, digest, mode) in &rows {
                println!("{}  {:04o}  {}", digest.to_hex().yellow(), mode, path);
            }
            Ok(())
        }
        OutputFormat::Json => {
            let value: Vec<_> = rows
                .iter()
                .map(|(path, digest, mode)| json!({ "path": path, "digest": digest, "mode": mode }))
                .collect();
            print_json(&value)
        }
    }
}

/// Findings for the resource payload and every operation payload.
fn validation_findings(spec: &ResourceSpecification) -> ErrorList<EntryViolation> {
    let (_, mut findings) = validate_layer("payload", &spec.payload);
    for transition in [Transition::Create, Transition::Update, Transition::Delete] {
        if let Some(operation) = spec.operation(transition) {
            let (_, more) = validate_layer(&format!("{transition}.payload"), &operation.payload);
            findings.merge(more);
        }
    }
    findings
}

fn cmd_validate(args: ValidateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let spec = load_spec(&args.spec)?;
    let findings = validation_findings(&spec);

    match format {
        OutputFormat::Text if findings.is_empty() => {
            println!("{} {} is valid", "✓".green().bold(), args.spec.display());
        }
        OutputFormat::Text => {
            for finding in &findings {
                println!("{} {}", "✗".red().bold(), finding);
            }
        }
        OutputFormat::Json => {
            let messages: Vec<String> = findings.iter().map(ToString::to_string).collect();
            print_json(&json!({ "valid": findings.is_empty(), "findings": messages }))?;
        }
    }

    if findings.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} payload entries failed validation", findings.len())
    }
}

fn payload_source(entry: &ContentReference) -> String {
    match entry.local_path.value() {
        Some(path) => path.to_string(),
        None => "(inline)".to_string(),
    }
}

fn operation_json(operation: &MergedOperation) -> serde_json::Value {
    let payload: Vec<_> = operation
        .payload
        .iter()
        .map(|entry| {
            json!({
                "filename": entry.identifier(),
                "mode": entry.mode,
                "source": payload_source(entry),
            })
        })
        .collect();
    json!({
        "transition": operation.transition,
        "command": operation.command,
        "environment": operation.environment,
        "payload": payload,
    })
}

fn cmd_plan(args: PlanArgs, config: &EngineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let transition = Transition::from(args.transition);
    let spec = load_spec(&args.spec)?;
    let planned = plan(transition, &spec, policy_for(config, transition))?;

    match (format, planned) {
        (OutputFormat::Json, planned) => print_json(&planned.as_ref().map(operation_json)),
        (OutputFormat::Text, None) => {
            println!("No {} operation defined; nothing to run.", transition.as_str().bold());
            Ok(())
        }
        (OutputFormat::Text, Some(operation)) => {
            println!("{} {}", "Transition:".bold(), transition.as_str().cyan());
            println!("{} {}", "Command:".bold(), operation.command);
            if !operation.environment.is_empty() {
                println!("{}", "Environment:".bold());
                for (key, value) in &operation.environment {
                    println!("  {}={}", key.yellow(), value);
                }
            }
            if !operation.payload.is_empty() {
                println!("{}", "Payload:".bold());
                for entry in &operation.payload {
                    println!(
                        "  {:04o}  {}  <- {}",
                        entry.mode.unwrap_or_default(),
                        entry.identifier().unwrap_or_default().green(),
                        payload_source(entry).dimmed()
                    );
                }
            }
            Ok(())
        }
    }
}

fn change_marker(kind: ChangeKind) -> colored::ColoredString {
    match kind {
        ChangeKind::Added | ChangeKind::AddedReplace => "+".green(),
        ChangeKind::Removed | ChangeKind::RemovedReplace => "-".red(),
        ChangeKind::Updated | ChangeKind::UpdatedReplace => "~".yellow(),
    }
}

fn print_report(report: &ChangeReport) {
    if !report.has_changes() {
        println!("No changes.");
        return;
    }
    for change in report.changes() {
        let suffix = if change.kind.is_replace() {
            " (forces replacement)".red().bold().to_string()
        } else {
            String::new()
        };
        println!("  {} {}{}", change_marker(change.kind), change.path, suffix);
    }
    println!("\n{} change(s).", report.len().to_string().bold());
}

fn cmd_diff(args: DiffArgs, config: &EngineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let spec = load_spec(&args.spec)?;
    let store = FileStateStore::new(&config.state_dir);
    let state = store
        .read(&args.name)?
        .with_context(|| format!("no stored state for {}", args.name))?;
    let report = runner_diff::diff(&state, &spec);

    match format {
        OutputFormat::Text => {
            print_report(&report);
            Ok(())
        }
        OutputFormat::Json => print_json(&report),
    }
}

fn cmd_state(args: StateArgs, config: &EngineConfig, format: OutputFormat) -> anyhow::Result<()> {
    let store = FileStateStore::new(&config.state_dir);
    match args.action {
        StateAction::Show { name } => {
            let state = store
                .read(&name)?
                .with_context(|| format!("no stored state for {name}"))?;
            print_json(&state)
        }
        StateAction::List => {
            let names = store.list()?;
            match format {
                OutputFormat::Json => print_json(&names),
                OutputFormat::Text if names.is_empty() => {
                    println!("No stored resources in {}.", store.dir().display());
                    Ok(())
                }
                OutputFormat::Text => {
                    for name in &names {
                        println!("{name}");
                    }
                    Ok(())
                }
            }
        }
    }
}
