//! Integration tests for the `geoplan` binary.
//!
//! Each test runs the compiled binary against its own temporary database,
//! with config, ERP exports and the gazetteer in a temp directory.

use std::path::Path;
use std::process::{Command, Output};

use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

use geoplan_db::queries::{orders, plans};
use geoplan_test_utils::TestDb;

const GEOPLAN_VARS: &[&str] = &[
    "GEOPLAN_DATABASE_URL",
    "GEOPLAN_DAYS_BACK",
    "GEOPLAN_DAYS_FORWARD",
    "GEOPLAN_ERP_DIR",
    "GEOPLAN_GAZETTEER",
];

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

struct Env {
    db: TestDb,
    url: String,
    home: TempDir,
}

impl Env {
    async fn new() -> Self {
        let db = TestDb::create().await;
        let url = db.url().await;
        let home = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(home.path().join("erp")).unwrap();
        std::fs::write(
            home.path().join("gazetteer.toml"),
            "[addresses]\n\"1 Main St\" = [47.2, 39.7]\n",
        )
        .unwrap();
        Self { db, url, home }
    }

    fn erp_dir(&self) -> std::path::PathBuf {
        self.home.path().join("erp")
    }

    fn write_export(&self, date: &str, body: serde_json::Value) {
        std::fs::write(
            self.erp_dir().join(format!("{date}.json")),
            body.to_string(),
        )
        .unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        geoplan(self.home.path(), args)
            .arg("--database-url")
            .arg(&self.url)
            .env("GEOPLAN_ERP_DIR", self.erp_dir())
            .env("GEOPLAN_GAZETTEER", self.home.path().join("gazetteer.toml"))
            .output()
            .expect("failed to run geoplan")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "geoplan {args:?} failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}

/// A `geoplan` command with a clean environment rooted at `config_home`.
fn geoplan(config_home: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_geoplan"));
    for var in GEOPLAN_VARS {
        cmd.env_remove(var);
    }
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("RUST_LOG", "warn")
        .args(args);
    cmd
}

fn plan_id_from(stdout: &str) -> Uuid {
    let line = stdout
        .lines()
        .find(|l| l.trim_start().starts_with("Plan ID:"))
        .unwrap_or_else(|| panic!("no plan id in output:\n{stdout}"));
    let id = line.split(':').nth(1).unwrap().trim();
    Uuid::parse_str(id).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// -----------------------------------------------------------------------
// init
// -----------------------------------------------------------------------

#[test]
fn init_writes_config_and_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();

    let output = geoplan(
        home.path(),
        &["init", "--db-url", "postgresql://db:5432/deliveries", "--days-back", "2"],
    )
    .output()
    .unwrap();
    assert!(output.status.success());

    let written = std::fs::read_to_string(home.path().join("geoplan/config.toml")).unwrap();
    assert!(written.contains("postgresql://db:5432/deliveries"));
    assert!(written.contains("days_back = 2"));
    assert!(written.contains("days_forward = 7"));

    let output = geoplan(home.path(), &["init"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));

    let output = geoplan(home.path(), &["init", "--force"]).output().unwrap();
    assert!(output.status.success());
}

// -----------------------------------------------------------------------
// plan
// -----------------------------------------------------------------------

#[tokio::test]
async fn plan_create_and_lookup_by_date() {
    let env = Env::new().await;

    let stdout = env.run_ok(&["plan", "create", "2024-06-01"]);
    let plan_id = plan_id_from(&stdout);

    let stored = plans::get_plan(&env.db.pool, plan_id)
        .await
        .unwrap()
        .expect("plan should be stored");
    assert_eq!(stored.delivery_date, date("2024-06-01"));

    let stdout = env.run_ok(&["plan", "on", "2024-06-01"]);
    assert!(stdout.contains(&plan_id.to_string()), "got:\n{stdout}");

    let stdout = env.run_ok(&["plan", "on", "2024-06-02"]);
    assert!(stdout.contains("No plans for 2024-06-02."));

    env.db.cleanup().await;
}

#[tokio::test]
async fn plan_recent_uses_window_from_env() {
    let env = Env::new().await;
    let today = chrono::Local::now().date_naive();
    let inside = plans::insert_plan(&env.db.pool, today).await.unwrap();
    let outside = plans::insert_plan(&env.db.pool, today + chrono::TimeDelta::days(30))
        .await
        .unwrap();

    let output = geoplan(env.home.path(), &["plan", "recent"])
        .arg("--database-url")
        .arg(&env.url)
        .env("GEOPLAN_DAYS_BACK", "1")
        .env("GEOPLAN_DAYS_FORWARD", "1")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(&inside.id.to_string()));
    assert!(!stdout.contains(&outside.id.to_string()));

    env.db.cleanup().await;
}

#[tokio::test]
async fn plan_show_rejects_bad_and_unknown_ids() {
    let env = Env::new().await;

    let output = env.run(&["plan", "show", "not-a-uuid"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid plan id"));

    let missing = Uuid::new_v4();
    let output = env.run(&["plan", "show", &missing.to_string()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));

    env.db.cleanup().await;
}

// -----------------------------------------------------------------------
// orders
// -----------------------------------------------------------------------

#[tokio::test]
async fn orders_fetch_geocode_and_add() {
    let env = Env::new().await;
    let plan_id = plan_id_from(&env.run_ok(&["plan", "create", "2024-06-01"]));
    let plan = plan_id.to_string();

    env.write_export(
        "2024-06-01",
        serde_json::json!([
            { "id": Uuid::new_v4(), "name": "ERP-1", "address": "1 Main St" },
            { "id": Uuid::new_v4(), "name": "ERP-2", "address": "Nowhere Lane" },
        ]),
    );

    let stdout = env.run_ok(&["orders", "fetch", &plan]);
    assert!(stdout.contains("OK: 2 new orders fetched"), "got:\n{stdout}");
    assert!(stdout.contains("Saved 2 orders."));

    let stdout = env.run_ok(&["orders", "fetch", &plan]);
    assert!(stdout.contains("No new orders"));
    assert!(stdout.contains("Nothing to save."));

    let stdout = env.run_ok(&["orders", "geocode", &plan]);
    assert!(stdout.contains("1 of 2 addresses geocoded"), "got:\n{stdout}");

    env.run_ok(&["orders", "add", &plan, "Walk-in", "--address", "  "]);

    let saved = orders::list_orders_for_plan(&env.db.pool, plan_id)
        .await
        .unwrap();
    let names: Vec<&str> = saved.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["ERP-1", "ERP-2", "Walk-in"]);
    let numbers: Vec<i32> = saved.iter().map(|o| o.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(saved[0].point.is_some());
    assert!(saved[1].point.is_none());
    assert!(saved[2].address.is_none());

    let stdout = env.run_ok(&["plan", "show", &plan]);
    assert!(stdout.contains("Orders:        3"));
    assert!(stdout.contains("Walk-in"));

    env.db.cleanup().await;
}

#[tokio::test]
async fn orders_fetch_without_erp_source_fails() {
    let env = Env::new().await;
    let plan_id = plan_id_from(&env.run_ok(&["plan", "create", "2024-06-01"]));

    let output = geoplan(env.home.path(), &["orders", "fetch", &plan_id.to_string()])
        .arg("--database-url")
        .arg(&env.url)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no ERP source configured"));

    env.db.cleanup().await;
}
