use ainote_storage::{db::Db, models::NewNote, queries};
use ainote_testkit::TestDatabase;

async fn bootstrapped_db() -> Option<(TestDatabase, Db)> {
	let base = ainote_testkit::env_settings()?;
	let test_db = TestDatabase::new(&base).await.expect("Failed to create test database.");
	let db = Db::connect(test_db.settings()).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	Some((test_db, db))
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AINOTE_TEST_DB_HOST, AINOTE_TEST_DB_USER, and AINOTE_TEST_DB_PASSWORD to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some((test_db, db)) = bootstrapped_db().await else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set AINOTE_TEST_DB_* to run this test.");

		return;
	};

	db.ensure_schema().await.expect("Second bootstrap should succeed.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'notes'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AINOTE_TEST_DB_HOST, AINOTE_TEST_DB_USER, and AINOTE_TEST_DB_PASSWORD to run."]
async fn notes_list_newest_first() {
	let Some((test_db, db)) = bootstrapped_db().await else {
		eprintln!("Skipping notes_list_newest_first; set AINOTE_TEST_DB_* to run this test.");

		return;
	};
	let mut ids = Vec::new();

	for text in ["A", "B", "C"] {
		let note = NewNote { user_note: text.to_string(), ai_note: None };

		ids.push(queries::insert_note(&db, &note).await.expect("Failed to insert note."));
	}

	let notes = queries::list_notes(&db).await.expect("Failed to list notes.");
	let texts: Vec<_> = notes.iter().map(|note| note.user_note.as_str()).collect();

	assert_eq!(texts, vec!["C", "B", "A"]);
	assert!(notes.iter().all(|note| note.ai_note.is_none()));
	assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AINOTE_TEST_DB_HOST, AINOTE_TEST_DB_USER, and AINOTE_TEST_DB_PASSWORD to run."]
async fn deletes_report_affected_rows() {
	let Some((test_db, db)) = bootstrapped_db().await else {
		eprintln!("Skipping deletes_report_affected_rows; set AINOTE_TEST_DB_* to run this test.");

		return;
	};
	let note = NewNote {
		user_note: "Studied TCP".to_string(),
		ai_note: Some("Look into QUIC next.".to_string()),
	};
	let id = queries::insert_note(&db, &note).await.expect("Failed to insert note.");

	queries::insert_note(&db, &NewNote { user_note: "Other".to_string(), ai_note: None })
		.await
		.expect("Failed to insert note.");

	assert_eq!(queries::delete_note(&db, id).await.expect("Failed to delete note."), 1);
	assert_eq!(queries::delete_note(&db, id).await.expect("Failed to delete note."), 0);
	assert_eq!(queries::delete_all_notes(&db).await.expect("Failed to delete notes."), 1);
	assert_eq!(queries::delete_all_notes(&db).await.expect("Failed to delete notes."), 0);

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
async fn blank_note_is_rejected_before_io() {
	let settings = ainote_config::StoreSettings {
		host: "127.0.0.1".to_string(),
		port: 1,
		user: "nobody".to_string(),
		password: "nothing".to_string(),
		database: "none".to_string(),
		pool_max_conns: 1,
		connect_timeout_ms: 100,
	};
	let options = sqlx::postgres::PgConnectOptions::new()
		.host(&settings.host)
		.port(settings.port)
		.username(&settings.user)
		.password(&settings.password)
		.database(&settings.database);
	let db = Db { pool: sqlx::postgres::PgPoolOptions::new().connect_lazy_with(options) };
	let result =
		queries::insert_note(&db, &NewNote { user_note: "   ".to_string(), ai_note: None }).await;

	assert!(matches!(result, Err(ainote_storage::Error::InvalidArgument(_))));
}
