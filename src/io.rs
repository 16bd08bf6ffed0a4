use crate::model::{AmAssignment, Employee, EmployeeId, GeneratedShift, JobType, ShiftKind, ShiftRecord};
use crate::scheduler::EmployeeSummary;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Import du personnel depuis CSV: header `name,job_type[,id]`
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let job = rec.get(1).context("missing job_type")?.trim();
        if name.is_empty() {
            bail!("invalid employee row (empty name)");
        }
        let job_type: JobType = job
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid job_type for {name}"))?;
        let mut employee = Employee::new(name, job_type);
        if let Some(id) = rec.get(2).map(str::trim).filter(|id| !id.is_empty()) {
            employee.id = EmployeeId::new(id);
        }
        out.push(employee);
    }
    Ok(out)
}

/// Import de shifts: header `employee_id,date,type` (date `YYYY-MM-DD`)
pub fn import_shifts_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let employee = rec.get(0).context("missing employee_id")?.trim();
        let date = rec.get(1).context("missing date")?.trim();
        let kind = rec.get(2).context("missing type")?.trim();
        if employee.is_empty() || kind.is_empty() {
            bail!("invalid shift row (empty)");
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {date}"))?;
        out.push(ShiftRecord::new(
            EmployeeId::new(employee),
            date,
            ShiftKind::from_label(kind),
        ));
    }
    Ok(out)
}

/// Export CSV des repos générés: header `employee_id,date,type,reason`
pub fn write_generated_csv<W: Write>(writer: W, shifts: &[GeneratedShift]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record(["employee_id", "date", "type", "reason"])?;
    for s in shifts {
        let date = s.date.to_string();
        w.write_record([s.employee_id.as_str(), date.as_str(), s.kind.label(), s.reason.label()])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du bilan: header `employee_id,name,current,added,total,goal_min,goal_max,reached,messages`
pub fn write_summary_csv<W: Write>(writer: W, results: &[EmployeeSummary]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record([
        "employee_id",
        "name",
        "current",
        "added",
        "total",
        "goal_min",
        "goal_max",
        "reached",
        "messages",
    ])?;
    for r in results {
        w.write_record([
            r.employee_id.as_str(),
            r.name.as_str(),
            &r.current.to_string(),
            &r.added.to_string(),
            &r.total.to_string(),
            &r.goal_min.to_string(),
            &r.goal_max.to_string(),
            if r.is_goal_reached { "yes" } else { "no" },
            &r.messages.join("; "),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des tâches du matin: header `employee_id,date,task,auto`
pub fn write_am_csv<W: Write>(writer: W, assignments: &[AmAssignment]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record(["employee_id", "date", "task", "auto"])?;
    for a in assignments {
        let date = a.date.to_string();
        w.write_record([
            a.employee_id.as_str(),
            date.as_str(),
            a.task_name.as_str(),
            if a.is_auto_assigned { "1" } else { "0" },
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_generated_csv<P: AsRef<Path>>(path: P, shifts: &[GeneratedShift]) -> anyhow::Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_generated_csv(file, shifts)
}

pub fn export_summary_csv<P: AsRef<Path>>(path: P, results: &[EmployeeSummary]) -> anyhow::Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_summary_csv(file, results)
}

pub fn export_am_csv<P: AsRef<Path>>(path: P, assignments: &[AmAssignment]) -> anyhow::Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_am_csv(file, assignments)
}
