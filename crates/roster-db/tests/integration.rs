use roster_db::{create_pool, run_migrations, DbRuntimeSettings};

#[test]
fn db_initialization_works() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("user.db");
    let pool = create_pool(
        path.to_str().expect("temp path should be utf-8"),
        DbRuntimeSettings::default(),
    )
    .expect("failed to create pool");

    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to run migrations");
    assert_eq!(applied, 1);

    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(tables, vec!["_roster_migrations", "user"]);
}

#[test]
fn schema_is_visible_to_every_pooled_connection() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("user.db");
    let pool = create_pool(
        path.to_str().expect("temp path should be utf-8"),
        DbRuntimeSettings {
            busy_timeout_ms: 1_000,
            pool_max_size: 2,
        },
    )
    .expect("failed to create pool");

    let first = pool.get().expect("failed to get first connection");
    run_migrations(&first).expect("failed to run migrations");
    first
        .execute(
            "INSERT INTO user (id, nama, umur, alamat) VALUES (1, 'A', 20, NULL)",
            [],
        )
        .expect("failed to insert row");

    let second = pool.get().expect("failed to get second connection");
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))
        .expect("failed to count rows");
    assert_eq!(count, 1);
}

#[test]
fn reopening_a_file_skips_applied_migrations() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("user.db");
    let path = path.to_str().expect("temp path should be utf-8");

    {
        let pool = create_pool(path, DbRuntimeSettings::default()).expect("first pool");
        let conn = pool.get().expect("first connection");
        assert_eq!(run_migrations(&conn).expect("first run"), 1);
    }

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("second pool");
    let conn = pool.get().expect("second connection");
    assert_eq!(run_migrations(&conn).expect("second run"), 0);
}
