//! Maps the OCR vendor's per-document-type field names onto [`NormalizedRecord`].
//!
//! The vendor names the same concept differently for every invoice or ticket
//! type (`TotalFare` on taxi receipts, `ticket_rates` on train tickets, ...),
//! so extraction is driven by two tables keyed by the document-type tag:
//! [`TYPE_LABELS`] for display names and [`EXTRACTION_RULES`] for field overrides.
//! Supporting a new document type means adding rows, not branches.

use crate::error::{OcrError, Result};
use crate::types::NormalizedRecord;
use serde_json::Value;

pub const UNKNOWN_INVOICE_TYPE: &str = "unknown_invoice_type";

/// Document types the service recognises but that are refused outright.
pub const DISALLOWED_TYPES: &[&str] =
    &["others", "limit_invoice", "shopping_receipt", "pos_invoice"];

/// Document-type tag -> display label.
const TYPE_LABELS: &[(&str, &str)] = &[
    // Top-level document classes of the multi-invoice endpoint
    ("vat_invoice", "增值税发票"),
    ("taxi_receipt", "出租车票"),
    ("train_ticket", "火车票"),
    ("quota_invoice", "定额发票"),
    ("air_ticket", "飞机行程单"),
    ("roll_normal_invoice", "增值税普通发票（卷式）"),
    ("printed_invoice", "机打发票"),
    ("bus_ticket", "汽车票"),
    ("toll_invoice", "过路过桥费发票"),
    ("ferry_ticket", "船票"),
    ("motor_vehicle_invoice", "机动车销售发票"),
    ("used_vehicle_invoice", "二手车销售发票"),
    ("taxi_online_ticket", "网约车行程单"),
    ("limit_invoice", "限额发票"),
    ("shopping_receipt", "购物小票"),
    ("pos_invoice", "POS小票"),
    ("others", "其他"),
    // VAT sub-kinds
    ("special_vat_invoice", "增值税专用发票"),
    ("elec_special_vat_invoice", "增值税电子专票"),
    ("normal_invoice", "增值税普通发票"),
    ("elec_normal_invoice", "增值税普通发票（电子）"),
    ("elec_invoice_special", "全电发票（专用发票）"),
    ("elec_invoice_normal", "全电发票（普通发票）"),
    ("toll_elec_normal_invoice", "通行费增值税电子普通发票"),
    ("special_freight_transport_invoice", "货运运输业增值税专用发票"),
    ("blockchain_invoice", "区块链发票"),
    ("printed_elec_invoice", "通用机打电子发票"),
];

/// Label for a document-type tag; unknown tags get [`UNKNOWN_INVOICE_TYPE`].
pub fn type_label(tag: &str) -> &'static str {
    TYPE_LABELS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_INVOICE_TYPE)
}

const DEFAULT_CODE: &str = "InvoiceCode";
const DEFAULT_NUMBER: &str = "InvoiceNum";
const DEFAULT_AMOUNT: &str = "AmountInFiguers";
const DEFAULT_DATE: &str = "InvoiceDate";

/// Per-tag overrides. `None` keeps the generic default for that slot; a
/// `Some` field replaces it even when the payload lacks that field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionRule {
    pub code: Option<&'static str>,
    pub number: Option<&'static str>,
    pub amount: Option<&'static str>,
    pub date: Option<&'static str>,
    /// Read the type label from this payload field instead of [`type_label`].
    pub invoice_type: Option<&'static str>,
}

const NO_OVERRIDE: ExtractionRule = ExtractionRule {
    code: None,
    number: None,
    amount: None,
    date: None,
    invoice_type: None,
};

pub const EXTRACTION_RULES: &[(&str, ExtractionRule)] = &[
    (
        "vat_invoice",
        ExtractionRule {
            invoice_type: Some("InvoiceType"),
            ..NO_OVERRIDE
        },
    ),
    (
        "roll_normal_invoice",
        ExtractionRule {
            amount: Some("TotalAmount"),
            ..NO_OVERRIDE
        },
    ),
    (
        "printed_invoice",
        ExtractionRule {
            invoice_type: Some("InvoiceType"),
            ..NO_OVERRIDE
        },
    ),
    (
        "taxi_receipt",
        ExtractionRule {
            amount: Some("TotalFare"),
            date: Some("Date"),
            ..NO_OVERRIDE
        },
    ),
    (
        "train_ticket",
        ExtractionRule {
            number: Some("ticket_num"),
            amount: Some("ticket_rates"),
            date: Some("date"),
            ..NO_OVERRIDE
        },
    ),
    (
        "quota_invoice",
        ExtractionRule {
            code: Some("invoice_code"),
            number: Some("invoice_number"),
            amount: Some("invoice_rate_in_figure"),
            ..NO_OVERRIDE
        },
    ),
    (
        "air_ticket",
        ExtractionRule {
            number: Some("ticket_number"),
            amount: Some("ticket_rates"),
            date: Some("date"),
            ..NO_OVERRIDE
        },
    ),
    (
        "bus_ticket",
        ExtractionRule {
            amount: Some("Amount"),
            date: Some("Date"),
            ..NO_OVERRIDE
        },
    ),
    (
        "toll_invoice",
        ExtractionRule {
            amount: Some("TotalAmount"),
            date: Some("OutDate"),
            ..NO_OVERRIDE
        },
    ),
    (
        "ferry_ticket",
        ExtractionRule {
            amount: Some("Amount"),
            date: Some("Date"),
            invoice_type: Some("InvoiceType"),
            ..NO_OVERRIDE
        },
    ),
    (
        "motor_vehicle_invoice",
        ExtractionRule {
            amount: Some("PriceTaxLow"),
            ..NO_OVERRIDE
        },
    ),
    (
        "used_vehicle_invoice",
        ExtractionRule {
            amount: Some("TotalCarPrice"),
            ..NO_OVERRIDE
        },
    ),
    (
        "taxi_online_ticket",
        ExtractionRule {
            amount: Some("TotalFare"),
            date: Some("ApplicationDate"),
            ..NO_OVERRIDE
        },
    ),
];

pub fn extraction_rule(tag: &str) -> ExtractionRule {
    EXTRACTION_RULES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, rule)| *rule)
        .unwrap_or(NO_OVERRIDE)
}

/// First `word` of a vendor field (`field[0].word`), or `""` when any step is missing.
fn word(result: &Value, field: &str) -> String {
    result
        .get(field)
        .and_then(|v| v.get(0))
        .and_then(|w| w.get("word"))
        .and_then(|w| match w {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Normalise one `words_result` entry's `result` object for document type `tag`.
pub fn normalize_document(tag: &str, result: &Value) -> NormalizedRecord {
    let rule = extraction_rule(tag);
    let invoice_type = match rule.invoice_type {
        Some(field) => word(result, field),
        None => type_label(tag).to_string(),
    };
    NormalizedRecord {
        invoice_type,
        code: word(result, rule.code.unwrap_or(DEFAULT_CODE)),
        number: word(result, rule.number.unwrap_or(DEFAULT_NUMBER)),
        amount: word(result, rule.amount.unwrap_or(DEFAULT_AMOUNT)),
        date: word(result, rule.date.unwrap_or(DEFAULT_DATE)),
        source_file: None,
    }
}

fn vendor_error(response: &Value) -> OcrError {
    let msg = response
        .get("error_msg")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("recognition failed");
    OcrError::Recognition(msg.to_string())
}

/// Normalise a multi-invoice response. Only the first recognised document is
/// used; the rest are dropped.
pub fn normalize_generic(response: &Value) -> Result<NormalizedRecord> {
    let words_result = match response.get("words_result").and_then(Value::as_array) {
        Some(items) => items,
        None => return Err(vendor_error(response)),
    };
    let first = words_result
        .first()
        .ok_or_else(|| OcrError::Recognition("no document recognised".to_string()))?;
    if words_result.len() > 1 {
        log::debug!(
            "[ocr] {} documents recognised, keeping the first",
            words_result.len()
        );
    }

    let tag = first.get("type").and_then(Value::as_str).unwrap_or_default();
    if DISALLOWED_TYPES.contains(&tag) {
        return Err(OcrError::UnsupportedInvoice(type_label(tag).to_string()));
    }
    let empty = Value::Null;
    let result = first.get("result").unwrap_or(&empty);
    Ok(normalize_document(tag, result))
}

/// Normalise a custom-template (iOCR finance) response.
pub fn normalize_template(response: &Value) -> Result<NormalizedRecord> {
    let data = match response.get("data").filter(|d| d.is_object()) {
        Some(data) => data,
        None => return Err(vendor_error(response)),
    };
    let ret = data
        .get("ret")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let find = |name: &str| -> String {
        ret.iter()
            .find(|item| item.get("word_name").and_then(Value::as_str) == Some(name))
            .and_then(|item| item.get("word"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Ok(NormalizedRecord {
        invoice_type: data
            .get("templateName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        code: find("invoice_code"),
        number: find("invoice_num"),
        amount: find("total_amount"),
        date: find("invoice_date"),
        source_file: None,
    })
}
