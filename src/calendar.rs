use crate::model::YearMonth;
use crate::scheduler::SchedError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Un jour de la grille d'un mois.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_sunday: bool,
    pub is_saturday: bool,
    pub is_holiday: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_name: Option<String>,
}

impl CalendarDay {
    /// Dimanche ou jour férié : pharmacie fermée sauf travail explicite.
    pub fn is_closed(&self) -> bool {
        self.is_sunday || self.is_holiday
    }
}

/// Énumération des jours d'un mois (classement dimanche / férié).
pub trait Calendar {
    fn month_days(&self, month: YearMonth) -> Result<Vec<CalendarDay>, SchedError>;
}

/// Grille de 42 jours commençant un dimanche, avec jours fériés configurés.
#[derive(Debug, Clone, Default)]
pub struct GridCalendar {
    holidays: BTreeMap<NaiveDate, String>,
}

const GRID_DAYS: i64 = 42;

impl GridCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holidays<I, S>(holidays: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, S)>,
        S: Into<String>,
    {
        Self {
            holidays: holidays
                .into_iter()
                .map(|(date, name)| (date, name.into()))
                .collect(),
        }
    }

    pub fn add_holiday<S: Into<String>>(&mut self, date: NaiveDate, name: S) {
        self.holidays.insert(date, name.into());
    }

    fn grid_start(month: YearMonth) -> Result<NaiveDate, SchedError> {
        let invalid = || SchedError::InvalidMonth {
            year: month.year,
            month: month.month,
        };
        let first = month.first_day().ok_or_else(invalid)?;
        let last = month.last_day().ok_or_else(invalid)?;

        let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
        let end = last + Duration::days(6 - i64::from(last.weekday().num_days_from_sunday()));
        let weeks = ((end - start).num_days() + 1) / 7;

        // un mois de 4 semaines exactes est centré dans la grille
        if weeks == 4 {
            return Ok(start - Duration::days(7));
        }
        Ok(start)
    }
}

impl Calendar for GridCalendar {
    fn month_days(&self, month: YearMonth) -> Result<Vec<CalendarDay>, SchedError> {
        let start = Self::grid_start(month)?;
        let mut out = Vec::with_capacity(GRID_DAYS as usize);
        let mut current = start;
        for _ in 0..GRID_DAYS {
            let holiday_name = self.holidays.get(&current).cloned();
            out.push(CalendarDay {
                date: current,
                is_current_month: month.contains(current),
                is_sunday: current.weekday() == Weekday::Sun,
                is_saturday: current.weekday() == Weekday::Sat,
                is_holiday: holiday_name.is_some(),
                holiday_name,
            });
            current = current.succ_opt().ok_or(SchedError::DateOverflow)?;
        }
        Ok(out)
    }
}

/// Jours du mois cible uniquement (sans le remplissage de la grille).
pub fn current_month_days<C: Calendar + ?Sized>(
    calendar: &C,
    month: YearMonth,
) -> Result<Vec<CalendarDay>, SchedError> {
    Ok(calendar
        .month_days(month)?
        .into_iter()
        .filter(|d| d.is_current_month)
        .collect())
}

/// Plage d'évaluation sur trois mois (précédent, cible, suivant) : union
/// chronologique et dédoublonnée des trois grilles, `is_current_month`
/// recalculé par rapport au mois cible.
pub fn evaluation_span<C: Calendar + ?Sized>(
    calendar: &C,
    month: YearMonth,
) -> Result<Vec<CalendarDay>, SchedError> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for m in [month.prev(), month, month.next()] {
        for mut day in calendar.month_days(m)? {
            if seen.insert(day.date) {
                day.is_current_month = month.contains(day.date);
                out.push(day);
            }
        }
    }
    out.sort_by_key(|d| d.date);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn grid_starts_on_sunday_and_has_six_weeks() {
        let days = GridCalendar::new().month_days(ym(2026, 6)).unwrap();
        assert_eq!(days.len(), 42);
        assert!(days[0].is_sunday);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 5, 31).unwrap());
        assert_eq!(days.iter().filter(|d| d.is_current_month).count(), 30);
    }

    #[test]
    fn four_week_month_is_padded_before() {
        // février 2026 : du dimanche 1er au samedi 28
        let days = GridCalendar::new().month_days(ym(2026, 2)).unwrap();
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 1, 25).unwrap());
        assert!(days[7].is_current_month);
    }

    #[test]
    fn holidays_are_flagged_closed() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 5).unwrap();
        let cal = GridCalendar::with_holidays([(date, "こどもの日")]);
        let days = current_month_days(&cal, ym(2026, 5)).unwrap();
        let day = days.iter().find(|d| d.date == date).unwrap();
        assert!(day.is_closed());
        assert_eq!(day.holiday_name.as_deref(), Some("こどもの日"));
    }

    #[test]
    fn evaluation_span_is_sorted_and_unique() {
        let span = evaluation_span(&GridCalendar::new(), ym(2026, 6)).unwrap();
        assert!(span.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(span.iter().filter(|d| d.is_current_month).count(), 30);
        assert!(span.first().unwrap().date.month() == 4);
    }
}
