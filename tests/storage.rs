#![forbid(unsafe_code)]
use chrono::NaiveDate;
use pharmashift::{
    AmAssignment, Dataset, Employee, GeneratedShift, JobType, JsonStorage, RestReason,
    SchedError, ShiftKind, ShiftRecord, Storage, TaskOption, YearMonth,
};

fn june(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
}

fn sample() -> Dataset {
    let a = Employee::new("佐藤", JobType::Pharmacist);
    let b = Employee::new("鈴木", JobType::Assistant);
    Dataset {
        shifts: vec![
            ShiftRecord::new(a.id.clone(), june(2), ShiftKind::RestAm),
            ShiftRecord::new(b.id.clone(), june(7), ShiftKind::HolidayWorkFull),
        ],
        task_options: vec![TaskOption::new("外来", 1), TaskOption::new("病棟", 2).fallback()],
        am_assignments: vec![AmAssignment::manual(a.id.clone(), june(3), "外来")],
        employees: vec![a, b],
        ..Dataset::default()
    }
}

#[test]
fn json_round_trip_keeps_labels() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("data.json")).unwrap();
    let data = sample();

    storage.save(&data).unwrap();
    let loaded = storage.load().unwrap();

    assert_eq!(loaded.employees, data.employees);
    assert_eq!(loaded.shifts, data.shifts);
    assert_eq!(loaded.task_options, data.task_options);
    let raw = std::fs::read_to_string(dir.path().join("data.json")).unwrap();
    assert!(raw.contains("休日出勤(1日)"));
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("absent.json")).unwrap();
    let data = storage.load_or_default().unwrap();
    assert!(data.employees.is_empty());
    assert!(storage.load().is_err());
}

#[test]
fn apply_refuses_occupied_cells_all_or_nothing() {
    let mut data = sample();
    let a = data.employees[0].id.clone();
    let before = data.shifts.len();
    let generated = vec![
        GeneratedShift::rest(a.clone(), june(4), RestReason::QuotaFill),
        GeneratedShift::rest(a.clone(), june(2), RestReason::StreakPrevention),
    ];

    let err = data.apply_generated_shifts(&generated).unwrap_err();
    assert!(matches!(err, SchedError::Occupied { date, .. } if date == june(2)));
    assert_eq!(data.shifts.len(), before);

    let added = data.apply_generated_shifts(&generated[..1]).unwrap();
    assert_eq!(added, 1);
    assert!(data
        .shifts
        .iter()
        .any(|s| s.employee_id == a && s.date == june(4) && s.kind == ShiftKind::RestFull));
}

#[test]
fn replacing_auto_assignments_keeps_manual_rows() {
    let mut data = sample();
    let a = data.employees[0].id.clone();
    let b = data.employees[1].id.clone();
    let july = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
    data.am_assignments.extend([
        AmAssignment::auto(a.clone(), june(4), "外来"),
        AmAssignment::auto(b.clone(), june(4), "病棟"),
        AmAssignment::auto(a.clone(), july, "外来"),
    ]);

    let removed = data.replace_auto_assignments(
        YearMonth::new(2026, 6).unwrap(),
        vec![AmAssignment::auto(b.clone(), june(5), "外来")],
    );

    assert_eq!(removed, 2);
    assert!(data
        .am_assignments
        .iter()
        .any(|x| !x.is_auto_assigned && x.date == june(3)));
    assert!(data.am_assignments.iter().any(|x| x.date == july));
    assert!(data.am_assignments.iter().any(|x| x.date == june(5)));
    assert_eq!(data.am_assignments.len(), 3);
}

#[test]
fn upsert_rejects_unknown_employees_and_replaces_pairs() {
    let mut data = sample();
    let a = data.employees[0].id.clone();

    let err = data
        .upsert_shifts(vec![ShiftRecord::new(
            pharmashift::EmployeeId::new("nobody"),
            june(1),
            ShiftKind::RestFull,
        )])
        .unwrap_err();
    assert!(matches!(err, SchedError::UnknownEmployee(_)));

    data.upsert_shifts(vec![ShiftRecord::new(a.clone(), june(2), ShiftKind::RestFull)])
        .unwrap();
    let on_2nd: Vec<&ShiftRecord> = data
        .shifts
        .iter()
        .filter(|s| s.employee_id == a && s.date == june(2))
        .collect();
    assert_eq!(on_2nd.len(), 1);
    assert_eq!(on_2nd[0].kind, ShiftKind::RestFull);
}
