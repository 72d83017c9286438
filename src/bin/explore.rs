//! `explore` CLI: for every skill not already present in a base query,
//! synthesizes a "just barely require this skill" probe and reports
//! pass/fail plus timing, reusing one snapshotted foundation across every
//! probe.
//!
//! Grounded in `ArmorUp::Explore` in
//! `examples/original_source/cpp/core/armor_up.h`.

use std::path::PathBuf;

use clap::Parser;
use gearsmith::catalog::Catalog;
use gearsmith::query::{Effect, Query, QueryDocument};
use gearsmith::search::SearchDriver;
use gearsmith::SkillId;

/// Sweep every skill in the catalog, reporting which are individually
/// reachable from a (possibly empty) base query.
#[derive(Parser, Debug)]
#[command(name = "explore", about = "Per-skill feasibility sweep")]
struct Args {
    /// Directory containing armors.json, jewels.json, skills.json.
    #[arg(long)]
    data: PathBuf,

    /// Skill id of the distinguished "torso up" skill.
    #[arg(long, default_value_t = 0)]
    torso_up: SkillId,

    /// Optional base query document to extend one skill at a time;
    /// omit for an unconstrained sweep.
    #[arg(long)]
    query: Option<PathBuf>,

    /// Verbosity of the terminal logger.
    #[arg(long, default_value_t = log::LevelFilter::Info)]
    verbosity: log::LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    gearsmith::init_logging(args.verbosity);

    let mut catalog = Catalog::load(&args.data, args.torso_up)?;
    catalog.amulets_mut();

    let base: Query = match &args.query {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let doc = QueryDocument::parse(&text)?;
            doc.into_query(
                std::rc::Rc::new(|_| true),
                std::rc::Rc::new(|_| true),
            )
        }
        None => Query {
            effects: Vec::<Effect>::new(),
            armor_filter: std::rc::Rc::new(|_| true),
            jewel_filter: std::rc::Rc::new(|_| true),
            amulets: Vec::new(),
            min_defense: None,
            max_results: 1,
        },
    };
    base.validate(&catalog)?;

    let driver = SearchDriver::new(&catalog);
    let results = driver.explore(&base)?;

    let mut feasible = 0;
    for result in &results {
        let name = catalog
            .skill(result.skill_id)
            .map(|s| s.name.as_str())
            .unwrap_or("?");
        println!(
            "{:>6} {:<24} {:>8} {:?}",
            result.skill_id,
            name,
            if result.feasible { "OK" } else { "infeasible" },
            result.elapsed,
        );
        if result.feasible {
            feasible += 1;
        }
    }
    log::info!("{feasible}/{} skills reachable", results.len());

    Ok(())
}
