//! dbrepair-tool — salvage engine CLI for a block-structured document store
//!
//! # Usage
//!
//! ```text
//! dbrepair-tool repair <db-name>              Repair a missing trailing header
//! dbrepair-tool lost-and-found <db-name>       Recover documents into lost+found/<db-name>
//! dbrepair-tool find-nodes <db-name>            List candidate by-id root offsets
//! ```

mod cmd_find_nodes;
mod cmd_lost_and_found;
mod cmd_repair;
mod style;

use std::env;
use std::process;

use style::{BOLD, DIM, GREEN, RED, RESET};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "repair" => cmd_repair::run(&args[2..]),
        "lost-and-found" | "make-lost-and-found" => cmd_lost_and_found::run(&args[2..]),
        "find-nodes" => cmd_find_nodes::run(&args[2..]),
        "-h" | "--help" | "help" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("{RED}Unknown command: {}{RESET}", args[1]);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("{RED}error:{RESET} {e}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        r#"
{BOLD}dbrepair-tool{RESET} — document store salvage

{DIM}database_dir is resolved from $DATABASE_DIR, defaulting to "."{RESET}

{BOLD}USAGE:{RESET}
    dbrepair-tool <COMMAND> [OPTIONS]

{BOLD}COMMANDS:{RESET}
    {GREEN}repair{RESET}          <db-name>    Repair a missing trailing header
    {GREEN}lost-and-found{RESET}  <db-name>    Recover documents into lost+found/<db-name>
    {GREEN}find-nodes{RESET}      <db-name>    List candidate by-id root offsets

{BOLD}EXAMPLES:{RESET}
    dbrepair-tool repair shards
    dbrepair-tool lost-and-found shards
    dbrepair-tool find-nodes shards
"#
    );
}
