use std::str::FromStr;

use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use almersal_shared::constants::SETTINGS_ID;

use crate::database::Database;
use crate::error::{conversion_err, Result};
use crate::models::Settings;

impl Database {
    /// The singleton settings row, if it has been written yet.
    pub fn get_settings(&self) -> Result<Option<Settings>> {
        let settings = self
            .conn()
            .query_row(
                "SELECT office_name, address, phone, logo_url, policies, monthly_expense
                 FROM settings WHERE id = ?1",
                params![SETTINGS_ID],
                |row| {
                    let expense: String = row.get(5)?;
                    Ok(Settings {
                        office_name: row.get(0)?,
                        address: row.get(1)?,
                        phone: row.get(2)?,
                        logo_url: row.get(3)?,
                        policies: row.get(4)?,
                        monthly_expense: Decimal::from_str(&expense)
                            .map_err(|e| conversion_err(5, e))?,
                    })
                },
            )
            .optional()?;
        Ok(settings)
    }

    /// Settings, or the defaults when none were saved.
    pub fn settings_or_default(&self) -> Result<Settings> {
        Ok(self.get_settings()?.unwrap_or_default())
    }

    /// Insert or replace the singleton row.
    pub fn upsert_settings(&self, settings: &Settings) -> Result<()> {
        self.conn().execute(
            "INSERT INTO settings (id, office_name, address, phone, logo_url, policies, monthly_expense)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                office_name = excluded.office_name,
                address = excluded.address,
                phone = excluded.phone,
                logo_url = excluded.logo_url,
                policies = excluded.policies,
                monthly_expense = excluded.monthly_expense",
            params![
                SETTINGS_ID,
                settings.office_name,
                settings.address,
                settings.phone,
                settings.logo_url,
                settings.policies,
                settings.monthly_expense.to_string(),
            ],
        )?;
        tracing::info!(office = %settings.office_name, "settings updated");
        Ok(())
    }

    /// Write `settings` only if no row exists yet. Returns whether it did.
    pub fn seed_settings(&self, settings: &Settings) -> Result<bool> {
        let affected = self.conn().execute(
            "INSERT OR IGNORE INTO settings (id, office_name, address, phone, logo_url, policies, monthly_expense)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                SETTINGS_ID,
                settings.office_name,
                settings.address,
                settings.phone,
                settings.logo_url,
                settings.policies,
                settings.monthly_expense.to_string(),
            ],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn count_rows(db: &Database) -> i64 {
        db.conn()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn empty_until_written() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_settings().unwrap().is_none());
        assert_eq!(db.settings_or_default().unwrap(), Settings::default());
    }

    #[test]
    fn upsert_then_get_returns_written_values() {
        let db = Database::open_in_memory().unwrap();
        let mut s = Settings {
            office_name: "Al Mersal Nouakchott".into(),
            address: "Tevragh Zeina".into(),
            phone: "+222 00 00 00 00".into(),
            logo_url: Some("https://example.org/logo.png".into()),
            policies: "No refunds on fees.".into(),
            monthly_expense: dec!(15000.50),
        };
        db.upsert_settings(&s).unwrap();
        assert_eq!(db.get_settings().unwrap(), Some(s.clone()));

        s.monthly_expense = dec!(2000);
        s.logo_url = None;
        db.upsert_settings(&s).unwrap();
        assert_eq!(db.get_settings().unwrap(), Some(s));
        assert_eq!(count_rows(&db), 1);
    }

    #[test]
    fn seed_does_not_overwrite() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.seed_settings(&Settings::default()).unwrap());

        let mut edited = Settings::default();
        edited.phone = "123".into();
        db.upsert_settings(&edited).unwrap();

        assert!(!db.seed_settings(&Settings::default()).unwrap());
        assert_eq!(db.get_settings().unwrap().unwrap().phone, "123");
        assert_eq!(count_rows(&db), 1);
    }

    #[test]
    fn second_row_is_rejected_by_schema() {
        let db = Database::open_in_memory().unwrap();
        let err = db.conn().execute(
            "INSERT INTO settings (id, office_name, address, phone, policies) VALUES (2, '', '', '', '')",
            [],
        );
        assert!(err.is_err());
    }
}
