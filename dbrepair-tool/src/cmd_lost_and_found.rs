use std::process;

use crate::style::*;

pub(crate) fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if args.is_empty() {
        eprintln!("Usage: dbrepair-tool lost-and-found <db-name>");
        process::exit(1);
    }
    let db_name = &args[0];

    header(&format!("Lost-and-Found: {db_name}"));
    spinner_msg("Signature-scanning for by-id roots");
    let recovered = dbrepair::make_lost_and_found(db_name)?;
    spinner_done("");

    section("Result");
    kv_highlight("Documents recovered", &recovered.to_string());
    kv("Target", &format!("lost+found/{db_name}.couch"));
    println!();

    Ok(())
}
