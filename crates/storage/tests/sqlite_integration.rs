use storage::repository::{BlobRepository, STATE_KEY, StateStore, Storage, StorageError};
use storage::sqlite::SqliteRepository;
use study_core::model::{AnswerOptions, AppState, NoteDraft, OptionLabel, QuestionDraft, SubjectId};

fn sample_state() -> AppState {
    let mut state = AppState::new();
    let subject = SubjectId::new("biologia");
    state
        .add_question(
            &subject,
            QuestionDraft {
                text: "Organela responsável pela respiração celular?".into(),
                options: AnswerOptions::new("Ribossomo", "Mitocôndria", "Lisossomo", "Núcleo"),
                correct: Some(OptionLabel::B),
                explanation: "A mitocôndria produz ATP.".into(),
            },
        )
        .unwrap();
    state
        .add_note(&subject, NoteDraft::new("Célula", "Unidade básica da vida"))
        .unwrap();
    state
}

#[tokio::test]
async fn sqlite_roundtrip_persists_state() {
    let storage = Storage::sqlite("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");

    assert!(storage.load_state().await.unwrap().is_none());

    let state = sample_state();
    storage.save_state(&state).await.unwrap();

    let loaded = storage.load_state().await.unwrap().expect("state saved");
    assert_eq!(loaded, state);
    assert_eq!(loaded.item_count(&SubjectId::new("biologia")), 2);
}

#[tokio::test]
async fn sqlite_save_overwrites_single_slot() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let storage = Storage::new(std::sync::Arc::new(repo.clone()));
    storage.save_state(&AppState::new()).await.unwrap();
    storage.save_state(&sample_state()).await.unwrap();

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(versions, 1);
}

#[tokio::test]
async fn sqlite_reports_corrupt_blob() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo.put_blob(STATE_KEY, "[1, 2, 3]").await.unwrap();

    let storage = Storage::new(std::sync::Arc::new(repo));
    let err = storage.load_state().await.unwrap_err();
    assert!(matches!(err, StorageError::Deserialization(_)));

    storage.clear_state().await.unwrap();
    assert!(storage.load_state().await.unwrap().is_none());
}
