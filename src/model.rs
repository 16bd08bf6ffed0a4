use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifiant fort pour Employee
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catégorie de poste. Les plafonds de repos journaliers sont calculés par catégorie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    Pharmacist,
    Assistant,
    PartTime,
    Other,
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pharmacist" | "薬剤師" => Ok(Self::Pharmacist),
            "Assistant" | "薬剤助手" => Ok(Self::Assistant),
            "PartTime" | "非常勤" => Ok(Self::PartTime),
            "Other" | "その他" => Ok(Self::Other),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// Membre du personnel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub job_type: JobType,
}

impl Employee {
    pub fn new<N: Into<String>>(name: N, job_type: JobType) -> Self {
        Self {
            id: EmployeeId::random(),
            name: name.into(),
            job_type,
        }
    }

    pub fn is_pharmacist(&self) -> bool {
        self.job_type == JobType::Pharmacist
    }
}

/// Type de shift. Les libellés inconnus (données anciennes, texte libre)
/// sont conservés tels quels dans `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShiftKind {
    RestFull,
    RestAm,
    RestPm,
    HopedRestFull,
    HopedRestAm,
    HopedRestPm,
    HolidayWorkFull,
    HolidayWorkAm,
    HolidayWorkPm,
    WorkFull,
    WorkAm,
    WorkPm,
    TripFull,
    TripAm,
    TripPm,
    SpecialLeave,
    Other(String),
}

impl ShiftKind {
    /// Tous les types connus, dans l'ordre d'affichage.
    pub const KNOWN: [ShiftKind; 16] = [
        ShiftKind::RestFull,
        ShiftKind::RestAm,
        ShiftKind::RestPm,
        ShiftKind::HopedRestFull,
        ShiftKind::HopedRestAm,
        ShiftKind::HopedRestPm,
        ShiftKind::HolidayWorkFull,
        ShiftKind::HolidayWorkAm,
        ShiftKind::HolidayWorkPm,
        ShiftKind::WorkFull,
        ShiftKind::WorkAm,
        ShiftKind::WorkPm,
        ShiftKind::TripFull,
        ShiftKind::TripAm,
        ShiftKind::TripPm,
        ShiftKind::SpecialLeave,
    ];

    pub fn label(&self) -> &str {
        match self {
            ShiftKind::RestFull => "休み(終日)",
            ShiftKind::RestAm => "午前休み",
            ShiftKind::RestPm => "午後休み",
            ShiftKind::HopedRestFull => "希望休み(終日)",
            ShiftKind::HopedRestAm => "希望午前休み",
            ShiftKind::HopedRestPm => "希望午後休み",
            ShiftKind::HolidayWorkFull => "休日出勤(1日)",
            ShiftKind::HolidayWorkAm => "休日出勤(午前)",
            ShiftKind::HolidayWorkPm => "休日出勤(午後)",
            ShiftKind::WorkFull => "出勤(1日)",
            ShiftKind::WorkAm => "出勤(午前)",
            ShiftKind::WorkPm => "出勤(午後)",
            ShiftKind::TripFull => "出張(終日)",
            ShiftKind::TripAm => "出張(午前)",
            ShiftKind::TripPm => "出張(午後)",
            ShiftKind::SpecialLeave => "特別休暇",
            ShiftKind::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::KNOWN
            .iter()
            .find(|k| k.label() == label)
            .cloned()
            .unwrap_or_else(|| ShiftKind::Other(label.to_string()))
    }

    /// Présence d'un travail (jour férié ou non) : rend le jour implicitement
    /// fermé pour ceux qui n'ont pas de shift explicite.
    pub fn is_duty(&self) -> bool {
        self.label().contains("出勤")
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ShiftKind {
    fn from(s: String) -> Self {
        ShiftKind::from_label(&s)
    }
}

impl From<ShiftKind> for String {
    fn from(kind: ShiftKind) -> Self {
        kind.label().to_string()
    }
}

/// Shift existant : au plus un par couple (employé, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: ShiftKind,
}

impl ShiftRecord {
    pub fn new(employee_id: EmployeeId, date: NaiveDate, kind: ShiftKind) -> Self {
        Self {
            employee_id,
            date,
            kind,
        }
    }
}

/// Motif d'un repos synthétisé.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestReason {
    #[serde(rename = "連勤防止")]
    StreakPrevention,
    #[serde(rename = "日数調整")]
    QuotaFill,
}

impl RestReason {
    pub fn label(self) -> &'static str {
        match self {
            RestReason::StreakPrevention => "連勤防止",
            RestReason::QuotaFill => "日数調整",
        }
    }
}

/// Repos généré par le moteur (toujours `RestFull`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedShift {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: ShiftKind,
    pub reason: RestReason,
}

impl GeneratedShift {
    pub fn rest(employee_id: EmployeeId, date: NaiveDate, reason: RestReason) -> Self {
        Self {
            employee_id,
            date,
            kind: ShiftKind::RestFull,
            reason,
        }
    }

    pub fn to_record(&self) -> ShiftRecord {
        ShiftRecord::new(self.employee_id.clone(), self.date, self.kind.clone())
    }
}

/// Objectif mensuel de jours de repos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestGoal {
    pub min: f64,
    pub max: f64,
}

impl RestGoal {
    pub fn new(min: f64, max: f64) -> Result<Self, String> {
        if min > max {
            return Err("rest goal min must not exceed max".to_string());
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, total: f64) -> bool {
        self.min <= total && total <= self.max
    }
}

/// Quand un rendez-vous fixe a lieu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleDate {
    DateSpecific { date: NaiveDate },
    /// N-ième occurrence (1-5) d'un jour de semaine dans le mois.
    MonthlyRecurring { week_number: u8, weekday: Weekday },
}

/// Rendez-vous fixe : bloque la pose d'un repos ce jour-là.
/// Sans employé, l'entrée est globale et ne bloque personne.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    pub when: ScheduleDate,
    #[serde(default)]
    pub text: String,
}

impl ScheduleEntry {
    /// Date effective dans le mois donné, si elle existe.
    pub fn date_in(&self, month: YearMonth) -> Option<NaiveDate> {
        match &self.when {
            ScheduleDate::DateSpecific { date } => month.contains(*date).then_some(*date),
            ScheduleDate::MonthlyRecurring {
                week_number,
                weekday,
            } => {
                if *week_number == 0 {
                    return None;
                }
                let date =
                    NaiveDate::from_weekday_of_month_opt(month.year, month.month, *weekday, *week_number)?;
                month.contains(date).then_some(date)
            }
        }
    }
}

/// Développe les rendez-vous d'un mois en couples (employé, date).
pub fn expand_schedules(entries: &[ScheduleEntry], month: YearMonth) -> Vec<(EmployeeId, NaiveDate)> {
    entries
        .iter()
        .filter_map(|entry| {
            let employee = entry.employee_id.clone()?;
            entry.date_in(month).map(|date| (employee, date))
        })
        .collect()
}

/// Tâche du matin configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bg_color: String,
    #[serde(default)]
    pub text_color: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(default)]
    pub exclude_from_auto: bool,
}

impl TaskOption {
    pub fn new<N: Into<String>>(name: N, order: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            bg_color: String::new(),
            text_color: String::new(),
            order,
            is_fallback: false,
            exclude_from_auto: false,
        }
    }

    pub fn fallback(mut self) -> Self {
        self.is_fallback = true;
        self
    }

    pub fn manual_only(mut self) -> Self {
        self.exclude_from_auto = true;
        self
    }
}

/// Marqueurs d'absence saisis à la main dans la grille des tâches.
pub const ABSENCE_MARKERS: [&str; 3] = ["休", "出張", "特別休暇"];

/// Tâche du matin d'un employé pour un jour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmAssignment {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub task_name: String,
    #[serde(default)]
    pub is_auto_assigned: bool,
}

impl AmAssignment {
    pub fn manual<T: Into<String>>(employee_id: EmployeeId, date: NaiveDate, task_name: T) -> Self {
        Self {
            employee_id,
            date,
            task_name: task_name.into(),
            is_auto_assigned: false,
        }
    }

    pub fn auto<T: Into<String>>(employee_id: EmployeeId, date: NaiveDate, task_name: T) -> Self {
        Self {
            employee_id,
            date,
            task_name: task_name.into(),
            is_auto_assigned: true,
        }
    }

    pub fn is_absence_marker(&self) -> bool {
        ABSENCE_MARKERS.contains(&self.task_name.as_str())
    }
}

/// Mois cible (month ∈ 1..=12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(format!("invalid month: {year}-{month}"));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        self.next().first_day()?.pred_opt()
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Toutes les dates du mois, dans l'ordre.
    pub fn dates(self) -> Vec<NaiveDate> {
        let Some(first) = self.first_day() else {
            return Vec::new();
        };
        first
            .iter_days()
            .take_while(|d| self.contains(*d))
            .collect()
    }

    /// Intervalle fermé [premier jour, dernier jour].
    pub fn bounds(self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first_day()?, self.last_day()?))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Lundi de la semaine ISO contenant `date`.
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn shift_kind_labels_roundtrip_through_serde() {
        let json = serde_json::to_string(&ShiftKind::HolidayWorkAm).unwrap();
        assert_eq!(json, "\"休日出勤(午前)\"");
        let legacy: ShiftKind = serde_json::from_str("\"有給休み\"").unwrap();
        assert_eq!(legacy, ShiftKind::Other("有給休み".into()));
    }

    #[test]
    fn duty_labels_include_half_days() {
        assert!(ShiftKind::WorkPm.is_duty());
        assert!(ShiftKind::HolidayWorkFull.is_duty());
        assert!(!ShiftKind::TripFull.is_duty());
    }

    #[test]
    fn year_month_navigation() {
        let jan = YearMonth::new(2026, 1).unwrap();
        assert_eq!(jan.prev(), YearMonth::new(2025, 12).unwrap());
        assert_eq!(jan.next().next().last_day(), Some(d(2026, 3, 31)));
        assert_eq!(YearMonth::new(2026, 2).unwrap().dates().len(), 28);
        assert!(YearMonth::new(2026, 13).is_err());
    }

    #[test]
    fn recurring_schedule_resolves_nth_weekday() {
        let june = YearMonth::new(2026, 6).unwrap();
        let entries = vec![
            ScheduleEntry {
                employee_id: Some(EmployeeId::new("a")),
                when: ScheduleDate::MonthlyRecurring {
                    week_number: 2,
                    weekday: Weekday::Wed,
                },
                text: "研修".into(),
            },
            ScheduleEntry {
                employee_id: Some(EmployeeId::new("a")),
                when: ScheduleDate::MonthlyRecurring {
                    week_number: 5,
                    weekday: Weekday::Fri,
                },
                text: "存在しない第5金曜".into(),
            },
            ScheduleEntry {
                employee_id: None,
                when: ScheduleDate::DateSpecific { date: d(2026, 6, 3) },
                text: "全体会議".into(),
            },
        ];
        assert_eq!(
            expand_schedules(&entries, june),
            vec![(EmployeeId::new("a"), d(2026, 6, 10))]
        );
    }

    #[test]
    fn iso_week_starts_on_monday() {
        assert_eq!(iso_week_start(d(2026, 6, 7)), d(2026, 6, 1));
        assert_eq!(iso_week_start(d(2026, 6, 8)), d(2026, 6, 8));
    }
}
