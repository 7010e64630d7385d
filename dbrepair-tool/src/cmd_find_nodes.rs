use std::process;

use dbrepair::Source;

use crate::style::*;

pub(crate) fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if args.is_empty() {
        eprintln!("Usage: dbrepair-tool find-nodes <db-name>");
        process::exit(1);
    }
    let db_name = &args[0];

    header(&format!("Candidate By-Id Roots: {db_name}"));
    spinner_msg("Scanning");
    let offsets = dbrepair::find_nodes_quickly(Source::Name(db_name))?;
    spinner_done(&format!(" ({} found)", offsets.len()));

    section("Offsets");
    if offsets.is_empty() {
        println!("  {DIM}none found{RESET}");
    } else {
        for offset in &offsets {
            println!("  {offset}");
        }
    }
    println!();

    Ok(())
}
