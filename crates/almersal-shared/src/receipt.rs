//! Printable receipts.
//!
//! Every receipt carries two copies: one handed to the customer and one kept
//! by the office. They are identical except that only the customer copy
//! includes the office policies.

use serde::Serialize;

use crate::i18n::{Locale, Messages};
use crate::models::{Remittance, Settings};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CopyKind {
    Customer,
    Office,
}

impl CopyKind {
    fn title_key(&self) -> &'static str {
        match self {
            Self::Customer => "customerCopy",
            Self::Office => "officeCopy",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptCopy {
    pub kind: CopyKind,
    pub title: String,
    /// Label/value pairs, already translated.
    pub lines: Vec<(String, String)>,
    pub policies: Option<String>,
    pub signature_label: String,
    pub stamp_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub locale: Locale,
    pub rtl: bool,
    pub internal_id: i64,
    pub office_name: String,
    pub office_contact: String,
    pub copies: Vec<ReceiptCopy>,
    /// QR data URL stored with the record.
    pub qr: String,
}

impl Receipt {
    pub fn build(remittance: &Remittance, settings: &Settings, locale: Locale) -> Self {
        let m = Messages::get(locale);

        let copies = [CopyKind::Customer, CopyKind::Office]
            .into_iter()
            .map(|kind| ReceiptCopy {
                kind,
                title: m.t(kind.title_key()).to_string(),
                lines: detail_lines(remittance, m),
                policies: (kind == CopyKind::Customer).then(|| settings.policies.clone()),
                signature_label: m.t("signature").to_string(),
                stamp_label: m.t("stamp").to_string(),
            })
            .collect();

        Self {
            locale,
            rtl: locale.is_rtl(),
            internal_id: remittance.internal_id,
            office_name: settings.office_name.clone(),
            office_contact: format!("{} - {}", settings.address, settings.phone),
            copies,
            qr: remittance.qr.clone(),
        }
    }

    /// Plain-text rendering of both copies, separated by a cut line.
    pub fn render_text(&self) -> String {
        let m = Messages::get(self.locale);
        let mut out = String::new();

        for (i, copy) in self.copies.iter().enumerate() {
            if i > 0 {
                out.push_str("\n- - - - - - - - - - - - - - - - - - - - - - - -\n\n");
            }
            out.push_str(&self.office_name);
            out.push('\n');
            out.push_str(&self.office_contact);
            out.push_str("\n\n");
            out.push_str(&format!("== {} ==\n", copy.title));
            out.push_str(&format!("{} #{}\n", m.t("remittances"), self.internal_id));
            for (label, value) in &copy.lines {
                out.push_str(&format!("{label}: {value}\n"));
            }
            if let Some(policies) = &copy.policies {
                out.push_str(&format!("\n{}:\n{}\n", m.t("policies"), policies));
            }
            out.push_str(&format!(
                "\n{}: ____________    {}: ____________\n",
                copy.signature_label, copy.stamp_label
            ));
        }

        out
    }
}

fn detail_lines(r: &Remittance, m: &Messages) -> Vec<(String, String)> {
    let provider_key = format!("providers.{}", r.provider.as_str());
    let channel_key = format!("channel.{}", r.channel.as_str());

    vec![
        (m.t("amount").to_string(), r.amount_mru.to_string()),
        (m.t("fee").to_string(), r.fee.to_string()),
        (m.t("total").to_string(), r.total.to_string()),
        (m.t("provider").to_string(), m.t(&provider_key).to_string()),
        (m.t("channelLabel").to_string(), m.t(&channel_key).to_string()),
        (m.t("destCountry").to_string(), r.dest_country.clone()),
        (m.t("destCurrency").to_string(), r.dest_currency.clone()),
        (m.t("mtcn").to_string(), r.tracking.clone()),
    ]
}
