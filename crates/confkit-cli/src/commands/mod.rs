//! CLI command implementations.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use std::path::Path;
use tracing::{debug, info};

use confkit_core::logging::LoggingConfig;
use confkit_core::pipeline::{Phase, PipelineConfig};

/// Which document dialect a path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocKind {
    Logging,
    Pipeline,
}

enum Document {
    Logging(LoggingConfig),
    Pipeline(PipelineConfig),
}

fn detect_kind(path: &str, kind: Option<DocKind>) -> Result<DocKind> {
    if let Some(kind) = kind {
        return Ok(kind);
    }
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext {
        "conf" | "ini" => Ok(DocKind::Logging),
        "yml" | "yaml" => Ok(DocKind::Pipeline),
        _ => bail!("cannot infer document kind from '{path}', pass --kind"),
    }
}

fn load(path: &str, kind: Option<DocKind>) -> Result<Document> {
    let kind = detect_kind(path, kind)?;
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    debug!(path, ?kind, "loading document");
    match kind {
        DocKind::Logging => Ok(Document::Logging(confkit_loader::parse_logging(&content)?)),
        DocKind::Pipeline => Ok(Document::Pipeline(confkit_loader::parse_pipeline(&content)?)),
    }
}

pub fn validate(path: &str, kind: Option<DocKind>) -> Result<()> {
    match load(path, kind) {
        Ok(_) => {
            println!("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {e:#}");
            std::process::exit(1);
        }
    }
}

pub fn show(path: &str, kind: Option<DocKind>, json: bool) -> Result<()> {
    let doc = load(path, kind)?;
    if json {
        let value = match &doc {
            Document::Logging(config) => serde_json::to_value(config)?,
            Document::Pipeline(config) => serde_json::to_value(config)?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    match doc {
        Document::Logging(config) => {
            println!("loggers:    {}", names(config.loggers.iter().map(|l| l.name.as_str())));
            println!("handlers:   {}", names(config.handlers.iter().map(|h| h.name.as_str())));
            println!("formatters: {}", names(config.formatters.iter().map(|f| f.name.as_str())));
        }
        Document::Pipeline(config) => {
            if let Some(language) = &config.language {
                println!("language: {language}");
            }
            if let Some(dist) = &config.dist {
                println!("dist:     {dist}");
            }
            if !config.services.is_empty() {
                println!("services: {}", config.services.join(", "));
            }
            println!("matrix:   {} entries", config.matrix.include.len());
            for phase in Phase::ORDER {
                let commands = config.commands(phase);
                if !commands.is_empty() {
                    println!("{}: {} commands", phase.as_key(), commands.len());
                }
            }
        }
    }
    Ok(())
}

pub fn fmt(path: &str, kind: Option<DocKind>, write: bool) -> Result<()> {
    let doc = load(path, kind)?;
    let output = match &doc {
        Document::Logging(config) => confkit_loader::serialize_logging(config),
        Document::Pipeline(config) => confkit_loader::serialize_pipeline(config)?,
    };
    if write {
        std::fs::write(path, &output).with_context(|| format!("writing {path}"))?;
        info!(path, "rewrote document in canonical form");
    } else {
        print!("{output}");
    }
    Ok(())
}

pub fn jobs(path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config = confkit_loader::parse_pipeline(&content)?;
    let jobs = config.jobs();
    if jobs.is_empty() {
        println!("no matrix entries");
        return Ok(());
    }
    for job in jobs {
        println!("{}", job.display_name());
    }
    Ok(())
}

pub fn topology(path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config = confkit_loader::parse_logging(&content)?;
    let topology = config.resolve()?;
    for wired in topology.loggers() {
        println!("logger {} [{}]", wired.logger.name, wired.logger.level);
        for handler in &wired.handlers {
            println!(
                "  -> handler {} ({}) [{}] via formatter {}",
                handler.handler.name,
                handler.handler.class,
                handler.handler.level,
                handler.formatter.name,
            );
        }
    }
    Ok(())
}

fn names<'a>(iter: impl Iterator<Item = &'a str>) -> String {
    iter.collect::<Vec<_>>().join(", ")
}
