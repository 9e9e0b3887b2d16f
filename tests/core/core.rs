use rusqlite::{Connection, params};
use std::fs;
use tempfile::tempdir;
use wordvault::core::broker::{self, DbBroker};
use wordvault::core::config::VaultConfig;
use wordvault::core::db;
use wordvault::core::error::VaultError;
use wordvault::core::migration;
use wordvault::core::schemas;
use wordvault::core::store::{STORE_DIR_NAME, Store, StoreKind};
use wordvault::plugins::review::ReviewMode;
use wordvault::plugins::sm2;
use wordvault::plugins::words::{self, WordDetails, WordStatus};

#[test]
fn fresh_vault_is_created_at_current_version() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join("nested").join("vault"));

    let report = db::initialize_vault(&store).expect("init");
    assert_eq!(report.from_version, schemas::SCHEMA_VERSION);
    assert_eq!(report.to_version, schemas::SCHEMA_VERSION);
    assert!(report.applied.is_empty());
    assert!(store.db_path().exists());

    let conn = Connection::open(store.db_path()).unwrap();
    assert_eq!(
        migration::stored_version(&conn).unwrap(),
        Some(schemas::SCHEMA_VERSION)
    );

    let again = db::initialize_vault(&store).expect("re-init");
    assert!(again.applied.is_empty());
}

#[test]
fn broker_audits_writes_but_not_reads() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path());
    db::initialize_vault(&store).unwrap();
    words::insert_word(&store, "cell", &WordDetails::default()).unwrap();
    let _ = words::get_word(&store, "missing");
    words::list_words(&store, None).unwrap();
    words::status_counts(&store).unwrap();
    words::eligible_for_review(&store, words::not_mastered).unwrap();
    words::set_status(&store, "cell", WordStatus::Learning).unwrap();

    let events = broker::read_events(&store.root).unwrap();
    let ops: Vec<&str> = events.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(ops, vec!["vault.init", "words.insert", "words.set_status"]);
    assert!(events.iter().all(|e| e.db_id == schemas::WORDS_DB_NAME));
    assert!(events.iter().all(|e| e.status == "success"));
    assert!(events.iter().all(|e| ulid::Ulid::from_string(&e.event_id).is_ok()));
}

#[test]
fn broker_marks_failed_operations() {
    let tmp = tempdir().expect("tempdir");
    let broker = DbBroker::new(tmp.path());
    let db_path = tmp.path().join(schemas::WORDS_DB_NAME);

    let result: Result<(), VaultError> =
        broker.with_conn(&db_path, "tester", "broken.op", |conn| {
            conn.execute("INSERT INTO no_such_table VALUES (1)", [])?;
            Ok(())
        });
    assert!(matches!(result, Err(VaultError::RusqliteError(_))));

    let events = broker::read_events(tmp.path()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].actor, "tester");
    assert_eq!(events[0].status, "error");
    assert!(broker.audit_log_path().exists());
}

#[test]
fn legacy_database_is_migrated_in_place() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path());
    {
        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute(schemas::LEGACY_WORDS_DB_SCHEMA, []).unwrap();
        let rows: [(&str, Option<&str>, &str, i64, i64, f64); 4] = [
            ("photosynthesis", Some("光合作用"), "需复习", 1, 1, 2.6),
            ("mitosis", Some(" "), schemas::LEGACY_MASTERED_LABEL, 6, 2, 2.7),
            ("enzyme", None, "需复习", 0, 0, 2.5),
            ("osmosis", Some("渗透"), "需复习", 16, 3, 2.9000000000000004),
        ];
        for (word, translation, status, interval, reps, ef) in rows {
            conn.execute(
                "INSERT INTO words(word, translation, status, interval, repetitions, easiness_factor)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
                params![word, translation, status, interval, reps, ef],
            )
            .unwrap();
        }
    }

    let report = db::initialize_vault(&store).expect("migrate");
    assert_eq!(report.from_version, schemas::LEGACY_SCHEMA_VERSION);
    assert_eq!(report.to_version, schemas::SCHEMA_VERSION);
    assert_eq!(report.applied.len(), 1);

    let photo = words::get_word(&store, "photosynthesis").unwrap();
    assert_eq!(photo.status, WordStatus::Learning);
    assert_eq!((photo.interval, photo.repetitions), (1, 1));
    assert_eq!(photo.translation.as_deref(), Some("光合作用"));

    let mitosis = words::get_word(&store, "mitosis").unwrap();
    assert_eq!(mitosis.status, WordStatus::Mastered);
    assert_eq!(mitosis.easiness_factor, sm2::MAX_EASINESS);
    assert!(mitosis.translation.is_none());

    let enzyme = words::get_word(&store, "enzyme").unwrap();
    assert_eq!(enzyme.status, WordStatus::Unlearned);

    let osmosis = words::get_word(&store, "osmosis").unwrap();
    assert_eq!(osmosis.easiness_factor, sm2::MAX_EASINESS);
    assert_eq!(osmosis.status, WordStatus::Mastered);

    let second = db::initialize_vault(&store).unwrap();
    assert!(second.applied.is_empty());
    assert_eq!(words::status_counts(&store).unwrap().total(), 4);
}

#[test]
fn newer_schema_is_refused() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path());
    db::initialize_vault(&store).unwrap();
    {
        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute(
            "UPDATE meta SET value = ?1 WHERE key = 'schema_version'",
            params![(schemas::SCHEMA_VERSION + 1).to_string()],
        )
        .unwrap();
    }
    assert!(matches!(
        db::initialize_vault(&store),
        Err(VaultError::StoreUnavailable(_))
    ));
}

#[test]
fn unusable_store_location_is_store_unavailable() {
    let tmp = tempdir().expect("tempdir");
    let blocker = tmp.path().join("file");
    fs::write(&blocker, "not a directory").unwrap();

    let store = Store::at(blocker.join("vault"));
    assert!(matches!(
        db::initialize_vault(&store),
        Err(VaultError::StoreUnavailable(_))
    ));
}

#[test]
fn explicit_db_path_wins_over_project_store() {
    let tmp = tempdir().expect("tempdir");
    let project = tmp.path().join("project");
    let deep = project.join("src").join("deep");
    fs::create_dir_all(&deep).unwrap();
    fs::create_dir_all(project.join(STORE_DIR_NAME)).unwrap();

    let found = Store::resolve(None, &deep).unwrap();
    assert_eq!(found.kind, StoreKind::Project);
    assert_eq!(found.root, project.join(STORE_DIR_NAME));
    assert_eq!(found.db_path(), project.join(STORE_DIR_NAME).join(schemas::WORDS_DB_NAME));

    let explicit = tmp.path().join("elsewhere").join("biology.db");
    let chosen = Store::resolve(Some(&explicit), &deep).unwrap();
    assert_eq!(chosen.kind, StoreKind::Explicit);
    assert_eq!(chosen.db_path(), explicit.as_path());
    assert_eq!(chosen.root, tmp.path().join("elsewhere"));

    db::initialize_vault(&chosen).unwrap();
    assert!(explicit.exists());
}

#[test]
fn config_file_in_store_root_is_loaded() {
    let tmp = tempdir().expect("tempdir");
    fs::write(
        tmp.path().join(schemas::CONFIG_FILE_NAME),
        "[review]\ndefault_mode = \"production\"\n\n[import]\nname_filter = \"vocab\"\n",
    )
    .unwrap();

    let config = VaultConfig::from_file(&tmp.path().join(schemas::CONFIG_FILE_NAME)).unwrap();
    assert_eq!(config.review.default_mode, ReviewMode::Production);
    assert_eq!(config.import.name_filter, "vocab");
    assert_eq!(config.import.extension, "txt");

    let missing = VaultConfig::from_file(&tmp.path().join("absent.toml")).unwrap();
    assert_eq!(missing, VaultConfig::default());
}
