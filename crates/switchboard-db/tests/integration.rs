use switchboard_db::{checkout, create_pool, open_call_database, run_migrations, DbRuntimeSettings};

#[test]
fn file_backed_database_initializes_and_persists() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("switchboard.db");
    let path = path.to_str().expect("temp path should be utf-8");

    {
        let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to create pool");
        let conn = pool.get().expect("failed to get connection");

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("failed to query journal_mode");
        assert_eq!(mode, "wal");

        let applied = run_migrations(&conn).expect("failed to run migrations");
        assert_eq!(applied, 2);

        conn.execute(
            "INSERT INTO calls (call_sid, current_menu) VALUES ('CA-persist', 'second_menu')",
            [],
        )
        .expect("failed to insert call");
    }

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to reopen pool");
    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to re-run migrations");
    assert_eq!(applied, 0, "reopened database should already be migrated");

    let menu: String = conn
        .query_row(
            "SELECT current_menu FROM calls WHERE call_sid = 'CA-persist'",
            [],
            |row| row.get(0),
        )
        .expect("failed to read call");
    assert_eq!(menu, "second_menu");
}

#[test]
fn call_sid_is_unique() {
    let pool = create_pool(
        ":memory:",
        DbRuntimeSettings {
            pool_max_size: 1,
            ..DbRuntimeSettings::default()
        },
    )
    .expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    run_migrations(&conn).expect("failed to run migrations");

    conn.execute("INSERT INTO calls (call_sid) VALUES ('CA-dup')", [])
        .expect("first insert should succeed");
    let second = conn.execute("INSERT INTO calls (call_sid) VALUES ('CA-dup')", []);
    assert!(second.is_err(), "duplicate call_sid should be rejected");
}

#[test]
fn file_backed_pool_serves_concurrent_requests() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("calls.db");
    let path = path.to_str().expect("temp path should be utf-8");
    let pool = open_call_database(path, DbRuntimeSettings::default()).expect("failed to open");
    assert_eq!(pool.max_size(), 4);

    let writer = checkout(&pool).expect("writer checkout");
    let reader = checkout(&pool).expect("reader checkout");
    writer
        .execute(
            "INSERT INTO calls (call_sid, current_menu) VALUES ('CA-wal', 'third_menu')",
            [],
        )
        .expect("failed to insert call");

    let menu: String = reader
        .query_row(
            "SELECT current_menu FROM calls WHERE call_sid = 'CA-wal'",
            [],
            |row| row.get(0),
        )
        .expect("second connection should see the committed row");
    assert_eq!(menu, "third_menu");
}
