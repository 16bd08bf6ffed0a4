#![forbid(unsafe_code)]
use assert_cmd::Command;
use chrono::NaiveDate;
use pharmashift::{AmAssignment, Dataset, Employee, JobType, JsonStorage, Storage, TaskOption};
use predicates::prelude::*;
use std::path::Path;

fn cli(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pharmashift-cli").unwrap();
    cmd.arg("--data").arg(data);
    cmd
}

#[test]
fn import_assign_and_summarize() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.json");
    let staff = dir.path().join("staff.csv");
    std::fs::write(&staff, "name,job_type,id\n佐藤,薬剤師,p1\n鈴木,薬剤師,p2\n高橋,Assistant,a1\n").unwrap();
    let shifts = dir.path().join("shifts.csv");
    std::fs::write(&shifts, "employee_id,date,type\np1,2026-06-03,休み(終日)\na1,2026-06-02,午前休み\n").unwrap();

    cli(&data)
        .args(["import-employees", "--csv"])
        .arg(&staff)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 employee(s) imported"));
    cli(&data)
        .args(["import-shifts", "--csv"])
        .arg(&shifts)
        .assert()
        .success();
    cli(&data)
        .args(["add-task", "--name", "外来", "--order", "1"])
        .assert()
        .success();
    cli(&data)
        .args(["add-task", "--name", "病棟", "--order", "2", "--fallback"])
        .assert()
        .success();

    cli(&data)
        .args(["am-tasks", "--year", "2026", "--month", "6", "--apply", "--seed", "1"])
        .assert()
        .success();
    cli(&data)
        .args(["check-tasks", "--year", "2026", "--month", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));

    let loaded = JsonStorage::open(&data).unwrap().load().unwrap();
    assert!(!loaded.am_assignments.is_empty());
    assert!(loaded
        .am_assignments
        .iter()
        .all(|a| a.employee_id.as_str() != "a1"));

    cli(&data)
        .args(["rest-summary", "--year", "2026", "--month", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("佐藤\t1"))
        .stdout(predicate::str::contains("高橋\t0.5"));
}

#[test]
fn auto_shifts_dry_run_leaves_data_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.json");
    let settings = dir.path().join("settings.json");
    let out = dir.path().join("generated.csv");
    let dataset = Dataset {
        employees: vec![Employee::new("佐藤", JobType::Pharmacist)],
        ..Dataset::default()
    };
    JsonStorage::open(&data).unwrap().save(&dataset).unwrap();
    std::fs::write(&settings, r#"{"default_goal": {"min": 8, "max": 10}}"#).unwrap();

    cli(&data)
        .arg("--settings")
        .arg(&settings)
        .args(["auto-shifts", "--year", "2026", "--month", "6", "--seed", "4", "--out-csv"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("8 rest day(s) proposed (dry run)"));

    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("employee_id,date,type,reason\n"));
    assert_eq!(csv.lines().count(), 9);
    let loaded = JsonStorage::open(&data).unwrap().load().unwrap();
    assert!(loaded.shifts.is_empty());

    cli(&data)
        .arg("--settings")
        .arg(&settings)
        .args(["auto-shifts", "--year", "2026", "--month", "6", "--seed", "4", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 rest day(s) saved"));
    let loaded = JsonStorage::open(&data).unwrap().load().unwrap();
    assert_eq!(loaded.shifts.len(), 8);
}

#[test]
fn duplicate_tasks_exit_with_warning_code() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.json");
    let a = Employee::new("A", JobType::Pharmacist);
    let b = Employee::new("B", JobType::Pharmacist);
    let mon = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let dataset = Dataset {
        task_options: vec![TaskOption::new("外来", 1)],
        am_assignments: vec![
            AmAssignment::manual(a.id.clone(), mon, "外来"),
            AmAssignment::manual(b.id.clone(), mon, "外来"),
        ],
        employees: vec![a, b],
        ..Dataset::default()
    };
    JsonStorage::open(&data).unwrap().save(&dataset).unwrap();

    cli(&data)
        .args(["check-tasks", "--year", "2026", "--month", "6"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Found 1 duplicate task(s)"));
}

#[test]
fn invalid_month_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.json");

    cli(&data)
        .args(["rest-summary", "--year", "2026", "--month", "13"])
        .assert()
        .failure();
}
