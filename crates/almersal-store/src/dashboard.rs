use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc};
use rusqlite::params;
use rust_decimal::Decimal;

use crate::database::Database;
use crate::error::Result;
use crate::models::{format_ts, DashboardSummary};

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Midnight UTC of the first day of the month containing `now`.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or_else(|| start_of_day(now))
}

impl Database {
    pub fn count_remittances_since(&self, since: DateTime<Utc>) -> Result<i64> {
        Ok(self.conn().query_row(
            "SELECT COUNT(*) FROM remittances WHERE created_at >= ?1",
            params![format_ts(&since)],
            |row| row.get(0),
        )?)
    }

    /// Sum of `fee` over every record. Summed in decimal, not by SQLite,
    /// to keep exact cents.
    pub fn total_fees(&self) -> Result<Decimal> {
        let mut stmt = self.conn().prepare("SELECT fee FROM remittances")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut total = Decimal::ZERO;
        for row in rows {
            total += Decimal::from_str(&row?)?;
        }
        Ok(total)
    }

    pub fn dashboard_summary(&self, now: DateTime<Utc>) -> Result<DashboardSummary> {
        let today = self.count_remittances_since(start_of_day(now))?;
        let this_month = self.count_remittances_since(start_of_month(now))?;
        let total_commission = self.total_fees()?;
        let monthly_expense = self.settings_or_default()?.monthly_expense;

        Ok(DashboardSummary::new(
            today,
            this_month,
            total_commission,
            monthly_expense,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almersal_shared::Role;
    use rust_decimal_macros::dec;

    fn insert_at(db: &Database, internal_id: i64, fee: &str, at: DateTime<Utc>, user: i64) {
        db.conn()
            .execute(
                "INSERT INTO remittances (internal_id, provider, channel, amount_mru,
                     dest_country, dest_currency, tracking, fee, provider_fee, total, qr,
                     created_by, created_at)
                 VALUES (?1, 'WU', 'CASH', '0', '', '', 'T', ?2, '0', '0', '', ?3, ?4)",
                params![internal_id, fee, user, format_ts(&at)],
            )
            .unwrap();
    }

    #[test]
    fn period_boundaries() {
        let now = Utc.with_ymd_and_hms(2025, 8, 10, 15, 30, 0).unwrap();
        assert_eq!(
            start_of_day(now),
            Utc.with_ymd_and_hms(2025, 8, 10, 0, 0, 0).unwrap()
        );
        assert_eq!(
            start_of_month(now),
            Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn summary_counts_and_net() {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .create_user("a@almersal.local", None, "pw", Role::Admin)
            .unwrap()
            .id;
        let now = Utc.with_ymd_and_hms(2025, 8, 10, 15, 30, 0).unwrap();

        insert_at(&db, 1, "5.5", now, user);
        insert_at(&db, 2, "11", Utc.with_ymd_and_hms(2025, 8, 10, 0, 0, 0).unwrap(), user);
        insert_at(&db, 3, "80", Utc.with_ymd_and_hms(2025, 8, 2, 9, 0, 0).unwrap(), user);
        insert_at(&db, 4, "0.1", Utc.with_ymd_and_hms(2025, 7, 31, 23, 59, 59).unwrap(), user);

        let mut settings = db.settings_or_default().unwrap();
        settings.monthly_expense = dec!(50);
        db.upsert_settings(&settings).unwrap();

        let summary = db.dashboard_summary(now).unwrap();
        assert_eq!(summary.today, 2);
        assert_eq!(summary.this_month, 3);
        assert_eq!(summary.total_commission, dec!(96.6));
        assert_eq!(summary.monthly_expense, dec!(50));
        assert_eq!(summary.net, dec!(46.6));
    }

    #[test]
    fn empty_ledger_summary() {
        let db = Database::open_in_memory().unwrap();
        let summary = db.dashboard_summary(Utc::now()).unwrap();
        assert_eq!(summary.today, 0);
        assert_eq!(summary.total_commission, Decimal::ZERO);
        assert_eq!(summary.net, Decimal::ZERO);
    }
}
