//! Writes JSON Schemas for the request and response types.
//!
//! ```bash
//! cargo run --features cli --bin export_schemas -- --out-dir schemas
//! ```

use anyhow::Context;
use clap::Parser;
use dealscope::application::services::{MatchReport, MatchRequest, ScoringReport, ScoringRequest};
use dealscope::domain::entities::{BusinessEntity, BuyBoxCriteria, EntitySignals};
use schemars::schema::RootSchema;
use schemars::schema_for;
use std::path::PathBuf;

/// Export JSON Schemas for the dealscope API.
#[derive(Debug, Parser)]
#[command(name = "export_schemas", version, about)]
struct Args {
    /// Directory the schema files are written to.
    #[arg(long, default_value = "schemas")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let schemas: [(&str, RootSchema); 7] = [
        ("scoring_request", schema_for!(ScoringRequest)),
        ("scoring_report", schema_for!(ScoringReport)),
        ("match_request", schema_for!(MatchRequest)),
        ("match_report", schema_for!(MatchReport)),
        ("business_entity", schema_for!(BusinessEntity)),
        ("buy_box_criteria", schema_for!(BuyBoxCriteria)),
        ("entity_signals", schema_for!(EntitySignals)),
    ];

    for (name, schema) in schemas {
        let path = args.out_dir.join(format!("{name}.schema.json"));
        let json = serde_json::to_string_pretty(&schema)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}
