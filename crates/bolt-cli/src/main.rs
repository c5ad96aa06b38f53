//! Command-line front end: build one bolt on the mock kernel and report it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bolt_builder::{BoltBuild, BoltBuilder, RawBoltParameters, UnitsManager};
use bolt_kernel::{JournalingKernel, MockKernel};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "bolt")]
#[command(about = "Build a parametric hex bolt and report the resulting body")]
struct Cli {
    /// JSON file with bolt parameters; flags override its values
    #[arg(long)]
    params: Option<PathBuf>,
    /// Body and component name
    #[arg(long)]
    name: Option<String>,
    /// Across-corners diameter of the hexagon head, e.g. "7.5 mm"
    #[arg(long)]
    head_diameter: Option<String>,
    /// Shaft diameter
    #[arg(long)]
    body_diameter: Option<String>,
    #[arg(long)]
    head_height: Option<String>,
    /// Shaft length below the head
    #[arg(long)]
    body_length: Option<String>,
    /// Under-head chamfer angle; unitless values are degrees
    #[arg(long)]
    cut_angle: Option<String>,
    #[arg(long)]
    chamfer_distance: Option<String>,
    #[arg(long)]
    fillet_radius: Option<String>,
    /// Unit applied to lengths given without one
    #[arg(long, default_value = "cm")]
    length_unit: String,
    /// Write the kernel call journal to this file, also on failure
    #[arg(long)]
    journal: Option<PathBuf>,
    /// Skip the thread stage
    #[arg(long)]
    no_thread: bool,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bolt_cli=info,bolt_builder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let raw = load_parameters(cli)?;
    let units = UnitsManager::new().with_default_length_unit(&cli.length_unit)?;

    let mut kernel = JournalingKernel::new(MockKernel::new());
    let result = BoltBuilder::new(&mut kernel)
        .with_threads(!cli.no_thread)
        .build_from_raw(&raw, &units);

    if let Some(path) = &cli.journal {
        let json = serde_json::to_string_pretty(kernel.journal())?;
        fs::write(path, json).with_context(|| format!("writing journal {}", path.display()))?;
        tracing::info!(path = %path.display(), calls = kernel.journal().len(), "journal written");
    }

    let build = result?;
    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&build)?),
        Format::Text => print!("{}", summary(&build)),
    }
    Ok(())
}

/// File values (or defaults) with command-line overrides applied.
fn load_parameters(cli: &Cli) -> Result<RawBoltParameters> {
    let mut raw = match &cli.params {
        Some(path) => read_parameters(path)?,
        None => RawBoltParameters::default(),
    };
    if let Some(name) = &cli.name {
        raw.name = name.clone();
    }
    let overrides = [
        (&cli.head_diameter, &mut raw.head_diameter),
        (&cli.body_diameter, &mut raw.body_diameter),
        (&cli.head_height, &mut raw.head_height),
        (&cli.body_length, &mut raw.body_length),
        (&cli.cut_angle, &mut raw.cut_angle),
        (&cli.chamfer_distance, &mut raw.chamfer_distance),
        (&cli.fillet_radius, &mut raw.fillet_radius),
    ];
    for (flag, slot) in overrides {
        if let Some(expression) = flag {
            *slot = expression.as_str().into();
        }
    }
    Ok(raw)
}

fn read_parameters(path: &Path) -> Result<RawBoltParameters> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading parameters {}", path.display()))?;
    RawBoltParameters::from_json(&text)
        .with_context(|| format!("parsing parameters {}", path.display()))
}

fn summary(build: &BoltBuild) -> String {
    let mut out = format!(
        "{}: {} on {} with {} faces\n",
        build.name, build.body, build.component, build.face_count
    );
    for record in &build.stages {
        out.push_str(&format!(
            "  {:<15} +{} faces, +{} edges, {} faces modified\n",
            record.stage.to_string(),
            record.faces_created,
            record.edges_created,
            record.faces_modified
        ));
    }
    match &build.thread {
        Some(thread) => out.push_str(&format!(
            "  thread {} {} ({})\n",
            thread.designation, thread.class, thread.thread_type
        )),
        None => out.push_str("  no thread\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bolt_builder::RawValue;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("bolt").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&["--name", "M5", "--body-length", "30 mm", "--format", "json"]);
        let raw = load_parameters(&cli).unwrap();
        assert_eq!(raw.name, "M5");
        assert_eq!(raw.body_length, RawValue::Expression("30 mm".to_string()));
        assert_eq!(raw.head_diameter, RawBoltParameters::default().head_diameter);
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn default_run_summary_mentions_thread() {
        let cli = parse(&[]);
        let raw = load_parameters(&cli).unwrap();
        let mut kernel = MockKernel::new();
        let build = BoltBuilder::new(&mut kernel)
            .build_from_raw(&raw, &UnitsManager::new())
            .unwrap();
        let text = summary(&build);
        assert!(text.starts_with("Bolt: body #"));
        assert!(text.contains("with 24 faces"));
        assert!(text.contains("thread M5x0.8 6g"));
    }
}
