use std::process;

use dbrepair::RepairOutcome;

use crate::style::*;

pub(crate) fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if args.is_empty() {
        eprintln!("Usage: dbrepair-tool repair <db-name>");
        process::exit(1);
    }
    let db_name = &args[0];

    header(&format!("Header Repair: {db_name}"));
    spinner_msg("Scanning for new roots");
    let outcome = dbrepair::repair(db_name)?;
    spinner_done("");

    section("Result");
    match outcome {
        RepairOutcome::NoHeader => {
            kv("Status", &format!("{YELLOW}no header found{RESET}"));
        }
        RepairOutcome::Ok => {
            kv_highlight("Status", "ok (no repair needed)");
        }
        RepairOutcome::Repaired {
            by_seq_offset,
            by_seq_last_key,
            by_id_offset,
            by_id_last_key,
        } => {
            kv_highlight("Status", "repaired");
            kv("by_seq root", &format!("offset {by_seq_offset}, update_seq {by_seq_last_key}"));
            match (by_id_offset, by_id_last_key) {
                (Some(offset), Some(last_key)) => kv(
                    "by_id root",
                    &format!("offset {offset}, last key {:?}", String::from_utf8_lossy(&last_key)),
                ),
                _ => kv("by_id root", &format!("{DIM}none{RESET}")),
            }
        }
    }
    println!();

    Ok(())
}
