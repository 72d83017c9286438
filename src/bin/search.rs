//! `search` CLI: loads a catalog, loads a query document, runs the search
//! driver, and streams the results through the selected formatter.
//!
//! Grounded in the `main()` driver in
//! `examples/original_source/cpp/core/armor_up.h`'s CLI entry point, using
//! `clap`'s derive API the way the teacher's own binaries
//! (`examples/krukah-robopoker/src/bin/*.rs`) parse arguments.

use std::path::PathBuf;

use clap::Parser;
use gearsmith::catalog::Catalog;
use gearsmith::format::OutputFormat;
use gearsmith::query::QueryDocument;
use gearsmith::search::SearchDriver;
use gearsmith::SkillId;

/// Search the catalog for armor sets satisfying a query's skill thresholds.
#[derive(Parser, Debug)]
#[command(name = "search", about = "Combinatorial armor-set search")]
struct Args {
    /// Directory containing armors.json, jewels.json, skills.json.
    #[arg(long)]
    data: PathBuf,

    /// JSON query document (effects, amulets, min_defense, max_results).
    #[arg(long)]
    query: PathBuf,

    /// Skill id of the distinguished "torso up" skill.
    #[arg(long, default_value_t = 0)]
    torso_up: SkillId,

    /// Output rendering.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Maximum rarity a piece may have to be considered (omitted = no cap).
    #[arg(long)]
    rare_max: Option<u8>,

    /// Verbosity of the terminal logger.
    #[arg(long, default_value_t = log::LevelFilter::Info)]
    verbosity: log::LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    gearsmith::init_logging(args.verbosity);

    let mut catalog = Catalog::load(&args.data, args.torso_up)?;
    log::info!(
        "loaded catalog: {} armors, {} jewels, {} skills",
        catalog.armor_count(),
        catalog.jewels().len(),
        catalog.skills().len()
    );

    let text = std::fs::read_to_string(&args.query)?;
    let doc = QueryDocument::parse(&text)?;

    let rare_max = args.rare_max;
    let armor_filter: gearsmith::catalog::ArmorFilter = match rare_max {
        Some(max) => std::rc::Rc::new(move |piece: &gearsmith::catalog::ArmorPiece| piece.rare <= max),
        None => std::rc::Rc::new(|_| true),
    };
    let jewel_filter: gearsmith::catalog::JewelFilter = std::rc::Rc::new(|_| true);

    let amulets = doc.amulets.clone();
    let mut query = doc.into_query(armor_filter, jewel_filter);

    catalog.amulets_mut();
    for amulet in amulets {
        let id = catalog.push_amulet(amulet);
        query.amulets.push(catalog.armor(id).expect("just pushed").clone());
    }

    let driver = SearchDriver::new(&catalog);
    let results = driver.search(&mut query)?;
    log::info!("found {} armor set(s)", results.len());

    for set in &results {
        println!("{}", args.format.render(&catalog, &query, set));
    }

    Ok(())
}
