use std::sync::Mutex;

use blockfile::{BlockFile, Header, RootPtr, BLOCK_SIZE};
use bptree::node::encode_leaf;
use dbrepair::{find_nodes_quickly, make_lost_and_found, repair, RepairOutcome, Source};
use eterm::Term;

// `DATABASE_DIR` is process-global, so tests that touch it run serialized.
static DATABASE_DIR_LOCK: Mutex<()> = Mutex::new(());

fn with_database_dir<F: FnOnce(&std::path::Path)>(f: F) {
    let _guard = DATABASE_DIR_LOCK.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("DATABASE_DIR", dir.path());
    f(dir.path());
    std::env::remove_var("DATABASE_DIR");
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

fn append_leaf(bf: &mut BlockFile, entries: Vec<(Term, Term)>) -> u64 {
    let term = encode_leaf(entries);
    bf.append_term(&eterm::encode(&term)).unwrap()
}

/// Scenario 1: a valid trailing header with no node beyond it is a no-op.
#[test]
fn no_op_repair_on_a_healthy_file() {
    with_database_dir(|dir| {
        let mut bf = BlockFile::open_or_create(dir.join("shards.couch")).unwrap();
        let by_seq_off = append_leaf(&mut bf, vec![(Term::Integer(1), Term::Integer(0))]);
        bf.write_header(&Header {
            update_seq: 1,
            by_id_root: None,
            by_seq_root: Some(RootPtr {
                offset: by_seq_off,
                reduction: vec![],
            }),
            opaque: vec![],
        })
        .unwrap();
        drop(bf);

        assert!(matches!(repair("shards").unwrap(), RepairOutcome::Ok));
    });
}

/// Scenario 2: a missing trailing header (new by-seq and by-id nodes appended
/// after the last one) gets a fresh header pointing at the newest roots.
#[test]
fn repairs_a_missing_trailing_header() {
    with_database_dir(|dir| {
        let mut bf = BlockFile::open_or_create(dir.join("shards.couch")).unwrap();
        bf.write_header(&Header::empty()).unwrap();

        let by_seq_off = append_leaf(&mut bf, vec![(Term::Integer(42), Term::Integer(0))]);
        let by_id_off = append_leaf(
            &mut bf,
            vec![(Term::Binary(b"doc-1".to_vec()), Term::Integer(0))],
        );
        drop(bf);

        match repair("shards").unwrap() {
            RepairOutcome::Repaired {
                by_seq_offset,
                by_id_offset,
                ..
            } => {
                assert_eq!(by_seq_offset, by_seq_off);
                assert_eq!(by_id_offset, Some(by_id_off));
            }
            other => panic!("expected Repaired, got {other:?}"),
        }

        // Idempotence: repairing the freshly repaired file is a no-op.
        assert!(matches!(repair("shards").unwrap(), RepairOutcome::Ok));
    });
}

/// Scenario 3: a by-id leaf whose signature straddles a block boundary is
/// still found by the scanner.
#[test]
fn finds_a_root_whose_signature_straddles_a_block_boundary() {
    with_database_dir(|dir| {
        let mut bf = BlockFile::open_or_create(dir.join("shards.couch")).unwrap();

        loop {
            let filler = eterm::encode(&Term::Integer(1));
            let o = bf.append_term(&filler).unwrap();
            if (o - 4) % BLOCK_SIZE > BLOCK_SIZE - 20 {
                break;
            }
        }
        let offset = append_leaf(&mut bf, vec![(Term::Binary(b"straddler".to_vec()), Term::Integer(1))]);

        let found = find_nodes_quickly(Source::Handle(&mut bf)).unwrap();
        assert!(found.contains(&offset));
    });
}

/// Scenario 4: the raw signature embedded inside a document payload is not
/// mistaken for a second root.
#[test]
fn rejects_a_false_positive_signature_inside_a_payload() {
    with_database_dir(|dir| {
        let mut bf = BlockFile::open_or_create(dir.join("shards.couch")).unwrap();

        let mut payload = b"prefix-".to_vec();
        payload.extend_from_slice(&dbrepair::KV_NODE_SIGNATURE);
        payload.extend_from_slice(b"-suffix");
        append_leaf(&mut bf, vec![(Term::Binary(b"doc".to_vec()), Term::Binary(payload))]);

        let found = find_nodes_quickly(Source::Handle(&mut bf)).unwrap();
        assert_eq!(found.len(), 1);
    });
}

/// Scenario 5: a leaf whose first entry is a `_local/` document is skipped
/// by the node acceptor entirely.
#[test]
fn skips_a_local_doc_leaf() {
    with_database_dir(|dir| {
        let mut bf = BlockFile::open_or_create(dir.join("shards.couch")).unwrap();
        append_leaf(
            &mut bf,
            vec![(Term::Binary(b"_local/checkpoint".to_vec()), Term::Integer(1))],
        );

        let found = find_nodes_quickly(Source::Handle(&mut bf)).unwrap();
        assert!(found.is_empty());
    });
}

/// Scenario 6: a single by-id root with 3 documents is fully recovered into
/// `lost+found/<db-name>`.
#[test]
fn lost_and_found_recovers_a_single_root() {
    with_database_dir(|dir| {
        let mut bf = BlockFile::open_or_create(dir.join("shards.couch")).unwrap();
        append_leaf(
            &mut bf,
            vec![
                (Term::Binary(b"a".to_vec()), doc_value()),
                (Term::Binary(b"b".to_vec()), doc_value()),
                (Term::Binary(b"c".to_vec()), doc_value()),
            ],
        );
        drop(bf);

        let recovered = make_lost_and_found("shards").unwrap();
        assert_eq!(recovered, 3);
        assert!(dir.join("lost+found").join("shards.couch").exists());
    });
}
