use wordvault::core::db;
use wordvault::core::error::VaultError;
use wordvault::core::store::Store;
use wordvault::plugins::sm2::{self, Quality, Schedule};
use wordvault::plugins::words::{
    self, EditOutcome, InsertOutcome, WordDetails, WordRecord, WordStatus,
};
use tempfile::{TempDir, tempdir};

fn fresh_store() -> (TempDir, Store) {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path());
    db::initialize_vault(&store).expect("init vault");
    (tmp, store)
}

fn details(translation: &str) -> WordDetails {
    WordDetails {
        translation: Some(translation.to_string()),
        phonetic: Some("/test/".to_string()),
        example: Some(format!("An example with {}.", translation)),
    }
}

fn force_schedule(store: &Store, word: &str, interval: u32, repetitions: u32, ef: f64) {
    let schedule = Schedule {
        status: sm2::derive_status(repetitions, ef),
        interval,
        repetitions,
        easiness_factor: ef,
    };
    words::update_schedule(store, word, &schedule).expect("update schedule");
}

#[test]
fn inserted_word_starts_unlearned_with_default_schedule() {
    let (_tmp, store) = fresh_store();
    let outcome = words::insert_word(&store, "photosynthesis", &details("光合作用")).unwrap();
    assert_eq!(outcome, InsertOutcome::Inserted);

    let record = words::get_word(&store, "photosynthesis").unwrap();
    assert_eq!(record.status, WordStatus::Unlearned);
    assert_eq!(record.interval, 0);
    assert_eq!(record.repetitions, 0);
    assert_eq!(record.easiness_factor, sm2::DEFAULT_EASINESS);
    assert_eq!(record.translation.as_deref(), Some("光合作用"));
    assert!(record.has_details());
}

#[test]
fn get_word_missing_is_not_found() {
    let (_tmp, store) = fresh_store();
    assert!(words::find_word(&store, "nowhere").unwrap().is_none());
    assert!(matches!(
        words::get_word(&store, "nowhere"),
        Err(VaultError::NotFound(_))
    ));
}

#[test]
fn duplicate_insert_leaves_existing_record_untouched() {
    let (_tmp, store) = fresh_store();
    words::insert_word(&store, "cell", &details("细胞")).unwrap();
    force_schedule(&store, "cell", 6, 2, 2.7);

    let second = words::insert_word(&store, "cell", &details("something else")).unwrap();
    assert_eq!(second, InsertOutcome::AlreadyExists);

    let record = words::get_word(&store, "cell").unwrap();
    assert_eq!(record.translation.as_deref(), Some("细胞"));
    assert_eq!(record.repetitions, 2);
    assert_eq!(record.easiness_factor, 2.7);
}

#[test]
fn words_are_case_sensitive_keys() {
    let (_tmp, store) = fresh_store();
    words::insert_word(&store, "Photosynthesis", &WordDetails::default()).unwrap();
    assert!(words::find_word(&store, "photosynthesis").unwrap().is_none());
    assert_eq!(
        words::insert_word(&store, "photosynthesis", &WordDetails::default()).unwrap(),
        InsertOutcome::Inserted
    );
}

#[test]
fn empty_word_is_rejected() {
    let (_tmp, store) = fresh_store();
    assert!(matches!(
        words::insert_word(&store, "   ", &WordDetails::default()),
        Err(VaultError::ValidationError(_))
    ));
}

#[test]
fn blank_details_are_stored_as_absent() {
    let (_tmp, store) = fresh_store();
    let blank = WordDetails {
        translation: Some("  ".to_string()),
        phonetic: None,
        example: Some(String::new()),
    };
    words::insert_word(&store, "mitosis", &blank).unwrap();
    let record = words::get_word(&store, "mitosis").unwrap();
    assert!(!record.has_details());
}

#[test]
fn eligible_pool_is_weakest_first_and_excludes_mastered() {
    let (_tmp, store) = fresh_store();
    for w in ["alpha", "beta", "gamma", "delta"] {
        words::insert_word(&store, w, &WordDetails::default()).unwrap();
    }
    force_schedule(&store, "alpha", 6, 2, 2.7);
    force_schedule(&store, "beta", 1, 0, 2.3);
    force_schedule(&store, "gamma", 16, 3, 2.8);
    force_schedule(&store, "delta", 1, 1, 2.3);

    let pool = words::eligible_for_review(&store, words::not_mastered).unwrap();
    let order: Vec<&str> = pool.iter().map(|r| r.word.as_str()).collect();
    assert_eq!(order, vec!["beta", "delta", "alpha"]);
}

#[test]
fn manual_mastered_override_removes_word_from_pool() {
    let (_tmp, store) = fresh_store();
    words::insert_word(&store, "osmosis", &WordDetails::default()).unwrap();
    words::insert_word(&store, "enzyme", &WordDetails::default()).unwrap();

    let record = words::set_status(&store, "osmosis", WordStatus::Mastered).unwrap();
    assert_eq!(record.status, WordStatus::Mastered);
    assert_eq!(record.easiness_factor, sm2::MAX_EASINESS);
    assert_eq!(record.repetitions, 0);

    let pool = words::eligible_for_review(&store, words::not_mastered).unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].word, "enzyme");
}

#[test]
fn non_mastered_override_keeps_easiness_and_repetitions() {
    let (_tmp, store) = fresh_store();
    words::insert_word(&store, "ribosome", &WordDetails::default()).unwrap();
    force_schedule(&store, "ribosome", 16, 3, 2.8);

    let record = words::set_status(&store, "ribosome", WordStatus::Learning).unwrap();
    assert_eq!(record.status, WordStatus::Learning);
    assert_eq!(record.easiness_factor, 2.8);
    assert_eq!(record.repetitions, 3);
    assert_eq!(record.interval, 16);

    let pool = words::eligible_for_review(&store, words::not_mastered).unwrap();
    assert_eq!(pool.len(), 1);
}

#[test]
fn set_status_and_update_on_missing_word_are_not_found() {
    let (_tmp, store) = fresh_store();
    assert!(matches!(
        words::set_status(&store, "ghost", WordStatus::Mastered),
        Err(VaultError::NotFound(_))
    ));
    assert!(matches!(
        words::update_schedule(&store, "ghost", &Schedule::default()),
        Err(VaultError::NotFound(_))
    ));
}

#[test]
fn update_schedule_persists_review_result() {
    let (_tmp, store) = fresh_store();
    words::insert_word(&store, "nucleus", &WordDetails::default()).unwrap();
    let before = words::get_word(&store, "nucleus").unwrap().schedule();
    let after = sm2::apply_review(&before, Quality::Success);
    words::update_schedule(&store, "nucleus", &after).unwrap();

    let record: WordRecord = words::get_word(&store, "nucleus").unwrap();
    assert_eq!(record.schedule(), after);
    assert_eq!(record.status, WordStatus::Learning);
    assert_eq!(record.interval, 1);
}

#[test]
fn update_schedule_derives_status_from_clamped_easiness() {
    let (_tmp, store) = fresh_store();
    words::insert_word(&store, "vacuole", &WordDetails::default()).unwrap();

    let overshoot = Schedule {
        status: WordStatus::Learning,
        interval: 3,
        repetitions: 1,
        easiness_factor: 2.95,
    };
    words::update_schedule(&store, "vacuole", &overshoot).unwrap();
    let record = words::get_word(&store, "vacuole").unwrap();
    assert_eq!(record.easiness_factor, sm2::MAX_EASINESS);
    assert_eq!(record.status, WordStatus::Mastered);

    let stale = Schedule {
        status: WordStatus::Mastered,
        interval: 1,
        repetitions: 0,
        easiness_factor: 2.0,
    };
    words::update_schedule(&store, "vacuole", &stale).unwrap();
    let record = words::get_word(&store, "vacuole").unwrap();
    assert_eq!(record.status, WordStatus::Unlearned);
    assert_eq!(
        words::eligible_for_review(&store, words::not_mastered).unwrap().len(),
        1
    );
}

#[test]
fn edit_details_replaces_only_given_fields() {
    let (_tmp, store) = fresh_store();
    words::insert_word(&store, "chlorophyll", &details("叶绿素")).unwrap();

    let outcome =
        words::edit_details(&store, "chlorophyll", None, Some("Leaves are green.")).unwrap();
    assert_eq!(outcome, EditOutcome::Updated);
    let record = words::get_word(&store, "chlorophyll").unwrap();
    assert_eq!(record.translation.as_deref(), Some("叶绿素"));
    assert_eq!(record.example.as_deref(), Some("Leaves are green."));

    let same = words::edit_details(&store, "chlorophyll", Some("叶绿素"), Some("  ")).unwrap();
    assert_eq!(same, EditOutcome::Unchanged);

    assert!(matches!(
        words::edit_details(&store, "ghost", Some("x"), None),
        Err(VaultError::NotFound(_))
    ));
}

#[test]
fn list_and_counts_reflect_statuses() {
    let (_tmp, store) = fresh_store();
    for w in ["Zebra", "apple", "mango"] {
        words::insert_word(&store, w, &WordDetails::default()).unwrap();
    }
    words::set_status(&store, "mango", WordStatus::Mastered).unwrap();

    let all = words::list_words(&store, None).unwrap();
    let names: Vec<&str> = all.iter().map(|r| r.word.as_str()).collect();
    assert_eq!(names, vec!["apple", "mango", "Zebra"]);

    let mastered = words::list_words(&store, Some(WordStatus::Mastered)).unwrap();
    assert_eq!(mastered.len(), 1);

    let counts = words::status_counts(&store).unwrap();
    assert_eq!(counts.unlearned, 2);
    assert_eq!(counts.mastered, 1);
    assert_eq!(counts.total(), 3);
}

#[test]
fn status_parses_case_insensitively() {
    assert_eq!("Mastered".parse::<WordStatus>().unwrap(), WordStatus::Mastered);
    assert_eq!(" learning ".parse::<WordStatus>().unwrap(), WordStatus::Learning);
    assert!("done".parse::<WordStatus>().is_err());
    for status in WordStatus::ALL {
        assert_eq!(status.as_str().parse::<WordStatus>().unwrap(), status);
    }
}
