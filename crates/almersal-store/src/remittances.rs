use std::str::FromStr;

use chrono::{SubsecRound, Utc};
use rusqlite::{params, TransactionBehavior};
use rust_decimal::Decimal;

use almersal_shared::fees::compute_fee;
use almersal_shared::qr::render_qr_data_url;
use almersal_shared::sequence::next_internal_id;
use almersal_shared::{Channel, Provider};

use crate::database::Database;
use crate::error::{conversion_err, not_found, Result};
use crate::models::{format_ts, parse_ts, NewRemittance, Remittance};

const SELECT_COLUMNS: &str = "SELECT id, internal_id, provider, channel, amount_mru,
        dest_country, dest_currency, tracking, fee, provider_fee, total, qr,
        created_by, created_at
 FROM remittances";

impl Database {
    /// Price, number and store a remittance.
    ///
    /// Reading the current maximum and inserting happen inside one
    /// `BEGIN IMMEDIATE` transaction, so two writers can never be handed
    /// the same internal id.
    pub fn create_remittance(&mut self, new: &NewRemittance, created_by: i64) -> Result<Remittance> {
        let fees = compute_fee(new.amount_mru)?;

        let tx = self
            .conn_mut()
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let last: Option<i64> =
            tx.query_row("SELECT MAX(internal_id) FROM remittances", [], |row| {
                row.get(0)
            })?;
        let internal_id = next_internal_id(last);
        let qr = render_qr_data_url(internal_id)?;
        // Stored with microsecond precision.
        let created_at = Utc::now().trunc_subsecs(6);

        tx.execute(
            "INSERT INTO remittances (internal_id, provider, channel, amount_mru,
                 dest_country, dest_currency, tracking, fee, provider_fee, total, qr,
                 created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                internal_id,
                new.provider.as_str(),
                new.channel.as_str(),
                new.amount_mru.to_string(),
                new.dest_country,
                new.dest_currency,
                new.tracking,
                fees.fee.to_string(),
                fees.provider_fee.to_string(),
                fees.total.to_string(),
                qr,
                created_by,
                format_ts(&created_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(
            internal_id,
            provider = new.provider.as_str(),
            amount = %new.amount_mru,
            fee = %fees.fee,
            "recorded remittance"
        );

        Ok(Remittance {
            id,
            internal_id,
            provider: new.provider,
            channel: new.channel,
            amount_mru: new.amount_mru,
            dest_country: new.dest_country.clone(),
            dest_currency: new.dest_currency.clone(),
            tracking: new.tracking.clone(),
            fee: fees.fee,
            provider_fee: fees.provider_fee,
            total: fees.total,
            qr,
            created_by,
            created_at,
        })
    }

    pub fn get_remittance(&self, internal_id: i64) -> Result<Remittance> {
        self.conn()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE internal_id = ?1"),
                params![internal_id],
                row_to_remittance,
            )
            .map_err(not_found)
    }

    /// Newest first. A non-empty `query` matches the internal id exactly,
    /// a substring of the tracking code, or the provider code.
    pub fn list_remittances(&self, query: Option<&str>) -> Result<Vec<Remittance>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let numeric = query.and_then(|q| q.parse::<i64>().ok());

        let mut stmt = self.conn().prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE ?1 IS NULL
                OR internal_id = ?2
                OR instr(tracking, ?1) > 0
                OR provider = upper(?1)
             ORDER BY id DESC"
        ))?;

        let rows = stmt.query_map(params![query, numeric], row_to_remittance)?;

        let mut remittances = Vec::new();
        for row in rows {
            remittances.push(row?);
        }
        Ok(remittances)
    }
}

fn decimal_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    Decimal::from_str(&s).map_err(|e| conversion_err(idx, e))
}

fn row_to_remittance(row: &rusqlite::Row<'_>) -> rusqlite::Result<Remittance> {
    let provider_str: String = row.get(2)?;
    let channel_str: String = row.get(3)?;
    let created_str: String = row.get(13)?;

    let provider = Provider::from_str(&provider_str).map_err(|e| conversion_err(2, e))?;
    let channel = Channel::from_str(&channel_str).map_err(|e| conversion_err(3, e))?;
    let created_at = parse_ts(&created_str).map_err(|e| conversion_err(13, e))?;

    Ok(Remittance {
        id: row.get(0)?,
        internal_id: row.get(1)?,
        provider,
        channel,
        amount_mru: decimal_col(row, 4)?,
        dest_country: row.get(5)?,
        dest_currency: row.get(6)?,
        tracking: row.get(7)?,
        fee: decimal_col(row, 8)?,
        provider_fee: decimal_col(row, 9)?,
        total: decimal_col(row, 10)?,
        qr: row.get(11)?,
        created_by: row.get(12)?,
        created_at,
    })
}
