//! Integration tests running the fetcher, loader and full pipeline against a
//! mock GraphQL endpoint and a temporary SQLite file.

use mockito::{Matcher, Mock, ServerGuard};
use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use tempfile::TempDir;

use spacex_to_sqlite::graphql::{selected_fields, GraphqlClient, Source};
use spacex_to_sqlite::parser::flatten_records;
use spacex_to_sqlite::schema::{ALL_VITRINE, LAUNCHES, MISSIONS, ROCKETS};
use spacex_to_sqlite::ui::SilentUi;
use spacex_to_sqlite::writer::{SchemaStatus, SqliteWriter};
use spacex_to_sqlite::{run, EntityKind, EtlError, FailurePolicy};

// =============================================================================
// Fixtures
// =============================================================================

/// Random seed for reproducible generated rows
const RANDOM_SEED: u64 = 42;

static MISSIONS_RESPONSE: Lazy<Value> = Lazy::new(|| {
    json!({"data": {"missions": [
        {
            "id": "5eb87d30ffd86e000604b378",
            "description": "Starlink is a satellite internet constellation",
            "manufacturers": ["SpaceX"],
            "name": "Starlink",
            "twitter": "@Starlink",
            "website": "https://www.starlink.com/"
        }
    ]}})
});

static ROCKETS_RESPONSE: Lazy<Value> = Lazy::new(|| {
    json!({"data": {"rockets": [
        {
            "id": "5e9d0d95eda69955f709d1eb",
            "name": "Falcon 1",
            "active": false,
            "boosters": 0,
            "company": "SpaceX",
            "cost_per_launch": 6700000,
            "country": "Republic of the Marshall Islands",
            "diameter": {"meters": 1.68},
            "height": {"meters": 22.25},
            "mass": {"kg": 30146},
            "stages": 2,
            "success_rate_pct": 40,
            "type": "rocket"
        },
        {
            "id": "5e9d0d95eda69973a809d1ec",
            "name": "Falcon 9",
            "active": true,
            "boosters": 0,
            "company": "SpaceX",
            "cost_per_launch": 50000000,
            "country": "United States",
            "diameter": {"meters": 3.7},
            "height": {"meters": 70},
            "mass": {"kg": 549054},
            "stages": 2,
            "success_rate_pct": 98,
            "type": "rocket"
        }
    ]}})
});

static LAUNCHES_RESPONSE: Lazy<Value> = Lazy::new(|| {
    json!({"data": {"launches": [
        {
            "id": "5eb87cd9ffd86e000604b32a",
            "details": "Engine failure at 33 seconds and loss of vehicle",
            "mission_id": [],
            "mission_name": "FalconSat",
            "rocket": {
                "rocket_name": "Falcon 1",
                "rocket_type": "Merlin A",
                "rocket": {"id": "5e9d0d95eda69955f709d1eb"}
            },
            "upcoming": false,
            "launch_success": false
        },
        {
            "id": "62dd70d5202306255024d139",
            "details": null,
            "mission_id": ["EE86F74"],
            "mission_name": "Starlink 4-36",
            "rocket": {
                "rocket_name": "Falcon 9",
                "rocket_type": "FT",
                "rocket": {"id": "5e9d0d95eda69973a809d1ec"}
            },
            "upcoming": true,
            "launch_success": null
        }
    ]}})
});

fn response_for(kind: EntityKind) -> &'static Value {
    match kind {
        EntityKind::Missions => &MISSIONS_RESPONSE,
        EntityKind::Rockets => &ROCKETS_RESPONSE,
        EntityKind::Launches => &LAUNCHES_RESPONSE,
    }
}

// =============================================================================
// Mock Endpoint
// =============================================================================

/// Mock the GraphQL endpoint for one kind, matching on the query's root field
fn mock_kind(server: &mut ServerGuard, kind: EntityKind, body: &Value, hits: usize) -> Mock {
    server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Regex(format!("{} \\{{", kind.as_str())))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(hits)
        .create()
}

fn mock_all(server: &mut ServerGuard, hits: usize) -> Vec<Mock> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| mock_kind(server, kind, response_for(kind), hits))
        .collect()
}

fn client(server: &ServerGuard) -> GraphqlClient {
    GraphqlClient::new(format!("{}/", server.url()), None).expect("Failed to create client")
}

fn temp_db() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("space.db");
    (dir, path)
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

// =============================================================================
// Fetcher
// =============================================================================

#[test]
fn test_fetch_columns_match_requested_fields() {
    let mut server = mockito::Server::new();
    let mocks = mock_all(&mut server, 1);
    let client = client(&server);

    for kind in EntityKind::ALL {
        let table = client.fetch(kind).unwrap();
        let columns: HashSet<&str> = table.columns().iter().map(|c| c.as_str()).collect();
        let requested = selected_fields(kind.query());
        let requested: HashSet<&str> = requested.iter().map(|f| f.as_str()).collect();
        assert_eq!(columns, requested, "column mismatch for {}", kind);
    }

    for mock in mocks {
        mock.assert();
    }
}

#[test]
fn test_fetch_keeps_api_column_order() {
    let mut server = mockito::Server::new();
    let _mock = mock_kind(&mut server, EntityKind::Rockets, &ROCKETS_RESPONSE, 1);

    let table = client(&server).fetch(EntityKind::Rockets).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(&table.columns()[..3], &["id", "name", "active"]);
    assert_eq!(table.get(1, "diameter.meters"), Some(&json!(3.7)));
}

#[test]
fn test_fetch_http_error_status() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/")
        .with_status(502)
        .with_body("upstream unavailable")
        .create();

    let err = client(&server).fetch(EntityKind::Missions).unwrap_err();
    match err {
        EtlError::Status { status, body } => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_fetch_malformed_json() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body("{\"data\": ")
        .create();

    let err = client(&server).fetch(EntityKind::Launches).unwrap_err();
    assert!(matches!(err, EtlError::Json(_)));
}

#[test]
fn test_fetch_missing_data_key() {
    let mut server = mockito::Server::new();
    let _mock = mock_kind(&mut server, EntityKind::Rockets, &json!({"result": []}), 1);

    let err = client(&server).fetch(EntityKind::Rockets).unwrap_err();
    assert!(matches!(err, EtlError::MissingData(EntityKind::Rockets)));
}

#[test]
fn test_fetch_graphql_errors() {
    let mut server = mockito::Server::new();
    let body = json!({"errors": [{"message": "Cannot query field \"capsules\""}]});
    let _mock = mock_kind(&mut server, EntityKind::Missions, &body, 1);

    let err = client(&server).fetch(EntityKind::Missions).unwrap_err();
    assert!(matches!(err, EtlError::GraphQl(ref m) if m.contains("capsules")));
}

// =============================================================================
// Fetch + Load
// =============================================================================

#[test]
fn test_single_mission_is_fetched_and_loaded() {
    let mut server = mockito::Server::new();
    let mock = mock_kind(&mut server, EntityKind::Missions, &MISSIONS_RESPONSE, 1);
    let table = client(&server).fetch(EntityKind::Missions).unwrap();
    mock.assert();

    assert_eq!(table.len(), 1);
    assert_eq!(table.columns().len(), 6);

    let (_dir, db_path) = temp_db();
    let mut writer = SqliteWriter::open(&db_path).unwrap();
    let mut session = writer.session().unwrap();
    session.ensure_table(&MISSIONS).unwrap();
    assert_eq!(session.load_rows(&MISSIONS, &table).unwrap(), 1);
    session.commit().unwrap();
    writer.close().unwrap();

    let conn = Connection::open(&db_path).unwrap();
    let (id, manufacturers, twitter): (String, String, String) = conn
        .query_row(
            "SELECT id_mission, manufacturers, twitter FROM missions",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(id, "5eb87d30ffd86e000604b378");
    assert_eq!(manufacturers, "SpaceX");
    assert_eq!(twitter, "@Starlink");
}

#[test]
fn test_launch_nullable_fields() {
    let records = LAUNCHES_RESPONSE["data"]["launches"].as_array().unwrap();
    let table = flatten_records(EntityKind::Launches, records).unwrap();

    let mut writer = SqliteWriter::open_in_memory().unwrap();
    let mut session = writer.session().unwrap();
    session.ensure_table(&LAUNCHES).unwrap();
    session.load_rows(&LAUNCHES, &table).unwrap();
    session.commit().unwrap();

    let (success, details, mission, rocket): (Option<i64>, Option<String>, String, String) = writer
        .connection()
        .query_row(
            "SELECT launch_success, details, id_mission, id_rocket FROM launches WHERE upcoming = 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!(success, None);
    assert_eq!(details, None);
    assert_eq!(mission, "EE86F74");
    assert_eq!(rocket, "5e9d0d95eda69973a809d1ec");
}

#[test]
fn test_round_trip_random_rows() {
    const ROWS: usize = 40;
    let mut rng = rand::rngs::StdRng::seed_from_u64(RANDOM_SEED);
    let random_text = |rng: &mut rand::rngs::StdRng| -> String {
        let len = rng.gen_range(1..120);
        rng.sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    };

    let records: Vec<Value> = (0..ROWS)
        .map(|i| {
            json!({
                "id": format!("mission-{:03}", i),
                "description": random_text(&mut rng),
                "manufacturers": [random_text(&mut rng)],
                "name": random_text(&mut rng),
                "twitter": null,
                "website": random_text(&mut rng)
            })
        })
        .collect();
    let table = flatten_records(EntityKind::Missions, &records).unwrap();

    let mut writer = SqliteWriter::open_in_memory().unwrap();
    let mut session = writer.session().unwrap();
    session.ensure_table(&MISSIONS).unwrap();
    assert_eq!(session.load_rows(&MISSIONS, &table).unwrap(), ROWS);
    session.commit().unwrap();

    let conn = writer.connection();
    assert_eq!(count(conn, "missions"), ROWS as i64);

    let mut stmt = conn
        .prepare("SELECT id_mission, description, name, twitter FROM missions ORDER BY id_mission")
        .unwrap();
    let stored: Vec<(String, String, String, Option<String>)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    for (record, (id, description, name, twitter)) in records.iter().zip(&stored) {
        let expect = |field: &str| -> String { record[field].as_str().unwrap().chars().take(50).collect() };
        assert_eq!(id, &expect("id"));
        assert_eq!(description, &expect("description"));
        assert_eq!(name, &expect("name"));
        assert_eq!(twitter, &None);
        assert!(description.chars().count() <= 50);
    }
}

#[test]
fn test_duplicate_batch_persists_nothing() {
    let records = vec![
        json!({"id": "falcon9", "name": "Falcon 9"}),
        json!({"id": "falconheavy", "name": "Falcon Heavy"}),
        json!({"id": "falcon9", "name": "Falcon 9 again"}),
    ];
    let table = flatten_records(EntityKind::Rockets, &records).unwrap();

    let (_dir, db_path) = temp_db();
    let mut writer = SqliteWriter::open(&db_path).unwrap();
    let mut session = writer.session().unwrap();
    session.ensure_table(&ROCKETS).unwrap();
    let err = session.load_rows(&ROCKETS, &table).unwrap_err();
    assert!(matches!(err, EtlError::Load { table: "rockets", .. }));
    session.commit().unwrap();

    assert_eq!(writer.count_rows(&ROCKETS).unwrap(), 0);
}

// =============================================================================
// Schema Manager
// =============================================================================

#[test]
fn test_schema_survives_reopen() {
    let (_dir, db_path) = temp_db();

    let mut writer = SqliteWriter::open(&db_path).unwrap();
    let first = writer.create_schema().unwrap();
    writer.close().unwrap();

    let mut writer = SqliteWriter::open(&db_path).unwrap();
    let second = writer.create_schema().unwrap();

    assert!(first.iter().all(|(_, s)| *s == SchemaStatus::Created));
    assert!(second.iter().all(|(_, s)| *s == SchemaStatus::AlreadyExists));
    assert_eq!(writer.count_rows(&ALL_VITRINE).unwrap(), 0);
}

// =============================================================================
// End to End
// =============================================================================

#[test]
fn test_second_run_collides_on_primary_keys() {
    let mut server = mockito::Server::new();
    let mocks = mock_all(&mut server, 2);
    let client = client(&server);
    let (_dir, db_path) = temp_db();

    let mut writer = SqliteWriter::open(&db_path).unwrap();
    let first = run(&client, &mut writer, FailurePolicy::Continue, &mut SilentUi).unwrap();
    assert!(first.is_complete());
    assert_eq!(first.loaded_rows(), 5);
    writer.close().unwrap();

    // Re-running is insert-only: every entity hits its primary key
    let mut writer = SqliteWriter::open(&db_path).unwrap();
    let second = run(&client, &mut writer, FailurePolicy::Continue, &mut SilentUi).unwrap();
    assert!(!second.is_complete());
    let failed: Vec<EntityKind> = second.failures().map(|(k, _)| k).collect();
    assert_eq!(failed, EntityKind::ALL.to_vec());
    writer.close().unwrap();

    for mock in mocks {
        mock.assert();
    }

    let conn = Connection::open(&db_path).unwrap();
    assert_eq!(count(&conn, "missions"), 1);
    assert_eq!(count(&conn, "rockets"), 2);
    assert_eq!(count(&conn, "launches"), 2);
    assert_eq!(count(&conn, "all_vitrine"), 2);

    let counts: (i64, i64, i64) = conn
        .query_row(
            "SELECT count_missions, count_rockets, count_launches FROM all_vitrine WHERE id = ?1",
            [second.summary_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(counts, (1, 2, 2));
}

#[test]
fn test_second_run_with_abort_commits_nothing() {
    let mut server = mockito::Server::new();
    let _mocks = mock_all(&mut server, 2);
    let client = client(&server);
    let (_dir, db_path) = temp_db();

    let mut writer = SqliteWriter::open(&db_path).unwrap();
    run(&client, &mut writer, FailurePolicy::Continue, &mut SilentUi).unwrap();

    let err = run(&client, &mut writer, FailurePolicy::Abort, &mut SilentUi).unwrap_err();
    assert!(matches!(err, EtlError::Load { table: "missions", .. }));
    assert_eq!(writer.count_rows(&ALL_VITRINE).unwrap(), 1);
}

#[test]
fn test_fetch_failure_leaves_database_untouched() {
    let mut server = mockito::Server::new();
    let _missions = mock_kind(&mut server, EntityKind::Missions, &MISSIONS_RESPONSE, 1);
    let _rockets = server
        .mock("POST", "/")
        .match_body(Matcher::Regex("rockets \\{".to_string()))
        .with_status(500)
        .create();
    let client = client(&server);
    let (_dir, db_path) = temp_db();

    let mut writer = SqliteWriter::open(&db_path).unwrap();
    let err = run(&client, &mut writer, FailurePolicy::Continue, &mut SilentUi).unwrap_err();
    assert!(matches!(err, EtlError::Status { .. }));
    writer.close().unwrap();

    let conn = Connection::open(&db_path).unwrap();
    let tables: i64 = conn
        .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(tables, 0);
}
