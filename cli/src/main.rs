use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use emcode_core::{
    Analyzer, CodingTables, EngineConfig, MatchScope, PatientType, PayerMode, TierSelection,
};
use emcode_report::{render_text_report, report_file_name};
use emcode_tables::{load_tables_str, tables_to_json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "emcode",
    about = "Suggest an outpatient E/M code from a clinical note."
)]
struct Args {
    /// Note file to analyze, or `-` for stdin.
    #[arg(short, long, required_unless_present = "dump_tables")]
    input: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Patient::Established)]
    patient: Patient,

    /// Use Medicare thresholds and the G2212 add-on code.
    #[arg(long)]
    medicare: bool,

    /// JSON table document layered over the standard tables.
    #[arg(long, env = "EMCODE_TABLES")]
    tables: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Tiering::FirstQualifying)]
    tier_selection: Tiering,

    /// Report matched phrases from every matched level, not just the adopted one.
    #[arg(long)]
    all_matches: bool,

    /// Reject documented times above this many minutes.
    #[arg(long)]
    max_minutes: Option<u32>,

    /// Print the result as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Also write the text report into this directory.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the active coding tables as JSON and exit.
    #[arg(long)]
    dump_tables: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Patient {
    New,
    Established,
}

impl From<Patient> for PatientType {
    fn from(value: Patient) -> Self {
        match value {
            Patient::New => PatientType::New,
            Patient::Established => PatientType::Established,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Tiering {
    FirstQualifying,
    HighestQualifying,
}

impl From<Tiering> for TierSelection {
    fn from(value: Tiering) -> Self {
        match value {
            Tiering::FirstQualifying => TierSelection::FirstQualifying,
            Tiering::HighestQualifying => TierSelection::HighestQualifying,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("emcode=info,emcode_core=warn,emcode_tables=warn")
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let tables = match &args.tables {
        Some(path) => {
            let document = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read tables {:?}", path))?;
            load_tables_str(&document).with_context(|| format!("Invalid tables {:?}", path))?
        }
        None => CodingTables::standard(),
    };

    if args.dump_tables {
        println!("{}", tables_to_json(&tables)?);
        return Ok(());
    }

    let note = match args.input.as_deref() {
        Some(path) if path.as_os_str() == "-" => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Could not read note from stdin")?;
            buffer
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Could not read note {:?}", path))?,
        None => anyhow::bail!("--input is required"),
    };

    let config = EngineConfig {
        tier_selection: args.tier_selection.into(),
        match_scope: if args.all_matches {
            MatchScope::AllLevels
        } else {
            MatchScope::AdoptedLevel
        },
        max_minutes: args.max_minutes,
    };
    let payer = if args.medicare {
        PayerMode::Medicare
    } else {
        PayerMode::Commercial
    };

    let analyzer = Analyzer::new(tables, config)?;
    let result = analyzer.analyze(&note, args.patient.into(), payer)?;

    let now = chrono::Local::now();
    let report = render_text_report(&result, &note, &now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{report}");
    }

    if let Some(dir) = &args.export {
        let path = dir.join(report_file_name(now.date_naive()));
        std::fs::write(&path, &report)
            .with_context(|| format!("Could not write report {:?}", path))?;
        tracing::info!(path = %path.display(), "report exported");
    }

    Ok(())
}
