use crate::classify::WORKDAY_MINUTES;
use crate::config::WageTable;
use crate::error::Result;
use crate::model::{
    ActivityLedger, OverallTotals, ReportRow, UserReport, UserWeeklyTotal, WeeklyReport, SCHEMA_VERSION,
};
use crate::util::{round2, WeekWindow};
use chrono::TimeZone;

/// Fold the ledger into per-user running totals and one row per active day.
///
/// Cost per line on each row is the author's cumulative figure as of that
/// day, not the final weekly one. Every author in the ledger must have a wage.
pub fn build_report<Tz: TimeZone>(
    ledger: &ActivityLedger,
    wages: &WageTable,
    window: &WeekWindow<Tz>,
) -> Result<WeeklyReport> {
    let total_days = window.total_days();
    let mut users = Vec::with_capacity(ledger.author_count());
    let mut overall = OverallTotals::default();

    for (author, days) in ledger.iter() {
        let rate = wages.rate(author)?;
        let mut total = UserWeeklyTotal::default();
        let mut rows = Vec::with_capacity(days.len());

        for (date, day) in days {
            total.add_day(day);
            if total.added > 0 {
                total.time_per_line = round2(WORKDAY_MINUTES * total_days as f64 / total.added as f64);
            }
            total.cost_per_line = round2(total.time_per_line * rate);

            rows.push(ReportRow {
                author: author.to_string(),
                date: *date,
                commits: day.commits,
                added: day.added,
                removed: day.removed,
                files_changed: day.files_changed,
                test_files_changed: day.test_files_changed,
                time_per_line: day.time_per_line,
                cost_per_line: total.cost_per_line,
            });
        }

        overall.add_user(&total);
        users.push(UserReport {
            author: author.to_string(),
            rows,
            total,
        });
    }

    Ok(WeeklyReport {
        version: SCHEMA_VERSION,
        week_start: window.monday(),
        total_days,
        users,
        overall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TeamweekError;
    use chrono::{DateTime, FixedOffset, NaiveDate};
    use pretty_assertions::assert_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    // Wednesday: three days into the week
    fn window() -> WeekWindow<FixedOffset> {
        WeekWindow::containing(DateTime::parse_from_rfc3339("2026-10-14T18:00:00+00:00").unwrap())
    }

    fn ledger() -> ActivityLedger {
        let mut ledger = ActivityLedger::new();
        let mon = ledger.day_mut("ana@example.com", date(12));
        mon.commits = 2;
        mon.added = 60;
        mon.removed = 5;
        mon.files_changed = 3;
        mon.test_files_changed = 1;
        mon.time_per_line = 7.0;

        let wed = ledger.day_mut("ana@example.com", date(14));
        wed.commits = 1;
        wed.added = 30;
        wed.large_commits = 1;
        wed.files_changed = 1;
        wed.time_per_line = 14.0;

        let bob = ledger.day_mut("bob@example.com", date(13));
        bob.commits = 1;
        bob.bad_messages = 1;
        ledger
    }

    fn wages() -> WageTable {
        [("ana@example.com", 0.5), ("bob@example.com", 0.4)].into_iter().collect()
    }

    #[test]
    fn rows_mix_daily_figures_with_running_cost() {
        let report = build_report(&ledger(), &wages(), &window()).unwrap();
        assert_eq!(report.total_days, 3);
        assert_eq!(report.week_start, date(12));

        let ana = &report.users[0];
        assert_eq!(ana.author, "ana@example.com");
        assert_eq!(ana.rows.len(), 2);

        // after Monday: 420 * 3 / 60 = 21 min/line, * 0.5
        assert_eq!(ana.rows[0].date, date(12));
        assert_eq!(ana.rows[0].added, 60);
        assert_eq!(ana.rows[0].time_per_line, 7.0);
        assert_eq!(ana.rows[0].cost_per_line, 10.5);

        // after Wednesday: 420 * 3 / 90 = 14 min/line, * 0.5
        assert_eq!(ana.rows[1].date, date(14));
        assert_eq!(ana.rows[1].added, 30);
        assert_eq!(ana.rows[1].time_per_line, 14.0);
        assert_eq!(ana.rows[1].cost_per_line, 7.0);

        assert_eq!(ana.total.added, 90);
        assert_eq!(ana.total.commits, 3);
        assert_eq!(ana.total.large_commits, 1);
        assert_eq!(ana.total.time_per_line, 14.0);
        assert_eq!(ana.total.cost_per_line, 7.0);
    }

    #[test]
    fn authors_without_added_lines_cost_nothing() {
        let report = build_report(&ledger(), &wages(), &window()).unwrap();
        let bob = &report.users[1];
        assert_eq!(bob.total.time_per_line, 0.0);
        assert_eq!(bob.rows[0].cost_per_line, 0.0);
        assert_eq!(bob.total.bad_messages, 1);
    }

    #[test]
    fn overall_totals_sum_every_user() {
        let report = build_report(&ledger(), &wages(), &window()).unwrap();
        assert_eq!(
            report.overall,
            OverallTotals {
                commits: 4,
                added: 90,
                removed: 5,
                large_commits: 1,
                bad_messages: 1,
                files_changed: 4,
                test_files_changed: 1,
            }
        );
        assert_eq!(report.rows().count(), 3);
    }

    #[test]
    fn cumulative_figures_are_rounded_to_cents() {
        let mut ledger = ActivityLedger::new();
        ledger.day_mut("ana@example.com", date(12)).added = 9;
        let wages: WageTable = [("ana@example.com", 0.33)].into_iter().collect();
        let report = build_report(&ledger, &wages, &window()).unwrap();
        // 1260 / 9 = 140.0, 140 * 0.33 = 46.2
        assert_eq!(report.users[0].total.time_per_line, 140.0);
        assert_eq!(report.users[0].total.cost_per_line, 46.2);

        let mut ledger = ActivityLedger::new();
        ledger.day_mut("ana@example.com", date(12)).added = 11;
        let report = build_report(&ledger, &wages, &window()).unwrap();
        // 1260 / 11 = 114.5454.. -> 114.55, * 0.33 = 37.8015 -> 37.8
        assert_eq!(report.users[0].total.time_per_line, 114.55);
        assert_eq!(report.users[0].total.cost_per_line, 37.8);
    }

    #[test]
    fn missing_wage_is_an_error() {
        let wages: WageTable = [("ana@example.com", 0.5)].into_iter().collect();
        let err = build_report(&ledger(), &wages, &window()).unwrap_err();
        assert!(matches!(err, TeamweekError::MissingWage(ref a) if a == "bob@example.com"));
    }
}
