use std::path::Path;

use blockfile::BlockFile;
use bptree::Node;
use docmodel::MergeTarget;

use crate::config::{database_path, lost_and_found_path};
use crate::error::{RepairError, Result};
use crate::header_repair::{repair_header, RepairOutcome};
use crate::lost_and_found::run_lost_and_found;

/// Either a database name to open-and-close, or an already-open handle the
/// caller keeps ownership of (spec.md §6, `find_nodes_quickly`).
pub enum Source<'a> {
    Name(&'a str),
    Handle(&'a mut BlockFile),
}

/// Open a database file by its resolved path, reporting a missing file as
/// `RepairError::FileOpen` rather than the generic I/O error `BlockFile`
/// would otherwise surface (spec.md §7 names this as its own error kind).
fn open_db(path: &Path) -> Result<BlockFile> {
    BlockFile::open_existing(path).map_err(|e| match &e {
        blockfile::BlockFileError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
            RepairError::FileOpen(path.display().to_string())
        }
        _ => RepairError::from(e),
    })
}

/// Open `db_name`'s file under the configured database directory and run
/// Header Repair against it (spec.md §6, `repair`).
pub fn repair(db_name: &str) -> Result<RepairOutcome> {
    let mut bf = open_db(&database_path(db_name))?;
    repair_header(&mut bf)
}

/// Run the Lost-and-Found Driver against `db_name`, writing recovered
/// documents to `lost+found/<db_name>` (spec.md §6, `make_lost_and_found`).
/// Returns the total number of documents merged across every root found.
pub fn make_lost_and_found(db_name: &str) -> Result<usize> {
    let mut source = open_db(&database_path(db_name))?;
    let mut target = MergeTarget::open_or_create(lost_and_found_path(db_name))?;

    let results = run_lost_and_found(&mut source, &mut target)?;
    let total = results.iter().filter_map(|r| r.outcome.as_ref().ok()).sum();
    target.close();
    Ok(total)
}

/// Signature-scan for candidate by-id leaf offsets (spec.md §6,
/// `find_nodes_quickly`). Given a name, opens and closes the file; given a
/// handle, leaves it open for the caller.
pub fn find_nodes_quickly(source: Source) -> Result<Vec<u64>> {
    let offsets = match source {
        Source::Name(db_name) => {
            let mut bf = open_db(&database_path(db_name))?;
            crate::sig_scan::scan_for_kv_node_leaves(&mut bf)?
        }
        Source::Handle(bf) => crate::sig_scan::scan_for_kv_node_leaves(bf)?,
    };
    Ok(offsets.into_iter().map(|leaf| leaf.offset).collect())
}

/// Open or create `target_name` and fold `source_root`'s by-id tree into it
/// in batches of 1000 documents with a full commit per batch (spec.md §6,
/// `merge_to_file`). Returns the number of documents merged.
pub fn merge_to_file(source: &mut BlockFile, source_root: &Node, target_name: &str) -> Result<usize> {
    let mut target = MergeTarget::open_or_create(database_path(target_name))?;
    let n = docmodel::fold_by_id_into(source, source_root, &mut target)?;
    target.close();
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bptree::node::encode_leaf;
    use eterm::Term;

    fn with_database_dir<F: FnOnce(&std::path::Path)>(f: F) {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("DATABASE_DIR", dir.path());
        f(dir.path());
        std::env::remove_var("DATABASE_DIR");
    }

    #[test]
    fn repair_reports_file_open_error_for_a_missing_database() {
        with_database_dir(|_dir| {
            assert!(matches!(repair("does-not-exist"), Err(RepairError::FileOpen(_))));
        });
    }

    #[test]
    fn repair_reports_no_header_on_a_fresh_file() {
        with_database_dir(|dir| {
            BlockFile::open_or_create(dir.join("shards.couch")).unwrap();
            assert!(matches!(repair("shards").unwrap(), RepairOutcome::NoHeader));
        });
    }

    #[test]
    fn find_nodes_quickly_by_name_opens_and_closes() {
        with_database_dir(|dir| {
            let mut bf = BlockFile::open_or_create(dir.join("shards.couch")).unwrap();
            let leaf = encode_leaf(vec![(Term::Binary(b"doc".to_vec()), Term::Integer(1))]);
            let offset = bf.append_term(&eterm::encode(&leaf)).unwrap();
            drop(bf);

            let offsets = find_nodes_quickly(Source::Name("shards")).unwrap();
            assert_eq!(offsets, vec![offset]);
        });
    }

    #[test]
    fn make_lost_and_found_recovers_a_single_root() {
        with_database_dir(|dir| {
            let mut bf = BlockFile::open_or_create(dir.join("shards.couch")).unwrap();
            let leaf = encode_leaf(vec![
                (Term::Binary(b"a".to_vec()), doc_value()),
                (Term::Binary(b"b".to_vec()), doc_value()),
                (Term::Binary(b"c".to_vec()), doc_value()),
            ]);
            bf.append_term(&eterm::encode(&leaf)).unwrap();
            drop(bf);

            let n = make_lost_and_found("shards").unwrap();
            assert_eq!(n, 3);
            assert!(dir.join("lost+found").join("shards.couch").exists());
        });
    }

    fn doc_value() -> Term {
        Term::List(vec![Term::Tuple(vec![
            Term::Integer(1),
            Term::Integer(1),
            Term::Binary(vec![0xab]),
            Term::atom("false"),
            Term::Binary(b"{}".to_vec()),
        ])])
    }
}
