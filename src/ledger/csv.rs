//! CSV export/import of ledger entries. Header:
//! date,description,amount,kind,payment_method,installment_index,installment_count,necessity

use std::io::{Read, Write};

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;

use crate::{
    error::{LedgerError, Result},
    models::{EntryKind, LedgerEntry, Necessity, PaymentMethod, clean_opt},
};

#[derive(serde::Deserialize)]
struct CsvRow {
    date: String,
    description: String,
    amount: String,
    kind: String,
    payment_method: Option<String>,
    installment_index: Option<String>,
    installment_count: Option<String>,
    necessity: Option<String>,
}

#[derive(serde::Serialize)]
struct CsvOutRow<'a> {
    date: String,
    description: &'a str,
    amount: String,
    kind: &'a str,
    payment_method: Option<&'a str>,
    installment_index: Option<u32>,
    installment_count: Option<u32>,
    necessity: Option<&'a str>,
}

pub fn write_entries<W: Write>(entries: &[LedgerEntry], w: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(w);
    for e in entries {
        wtr.serialize(CsvOutRow {
            date: e.date.format("%Y-%m-%d").to_string(),
            description: &e.description,
            amount: e.amount.to_string(),
            kind: e.kind.as_str(),
            payment_method: e.payment_method.as_ref().map(PaymentMethod::as_str),
            installment_index: e.installment_index,
            installment_count: e.installment_count,
            necessity: e.necessity.as_ref().map(Necessity::as_str),
        })
        .map_err(|err| LedgerError::Internal(format!("csv write: {err}")))?;
    }
    wtr.flush()
        .map_err(|err| LedgerError::Internal(format!("csv flush: {err}")))?;
    Ok(())
}

fn parse_optional_u32(value: Option<String>, label: &str) -> Result<Option<u32>> {
    clean_opt(value)
        .map(|v| {
            v.parse::<u32>()
                .map_err(|_| LedgerError::invalid(format!("{label} must be a whole number")))
        })
        .transpose()
}

fn parse_row(row: CsvRow, owner: &str) -> Result<LedgerEntry> {
    let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
        .map_err(|e| LedgerError::invalid(format!("date: {e}")))?;
    let amount: Decimal = row
        .amount
        .trim()
        .parse()
        .map_err(|e| LedgerError::invalid(format!("amount: {e}")))?;

    let entry = LedgerEntry {
        id: None,
        owner: owner.to_string(),
        date,
        description: row.description.trim().to_string(),
        amount,
        kind: row.kind.parse::<EntryKind>()?,
        payment_method: clean_opt(row.payment_method)
            .map(|v| v.parse::<PaymentMethod>())
            .transpose()?,
        installment_index: parse_optional_u32(row.installment_index, "installment_index")?,
        installment_count: parse_optional_u32(row.installment_count, "installment_count")?,
        necessity: clean_opt(row.necessity)
            .map(|v| v.parse::<Necessity>())
            .transpose()?,
    };
    entry.validate()?;
    Ok(entry)
}

/// Parses every row for `owner`. The first invalid row fails the whole
/// read, naming its 1-based data line.
pub fn read_entries<R: Read>(r: R, owner: &str) -> Result<Vec<LedgerEntry>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(r);
    let mut entries = Vec::new();
    for (i, rec) in rdr.deserialize::<CsvRow>().enumerate() {
        let line = i + 1;
        let row = rec.map_err(|e| LedgerError::invalid(format!("row {line}: {e}")))?;
        let entry = parse_row(row, owner).map_err(|e| match e {
            LedgerError::InvalidInput(msg) => LedgerError::invalid(format!("row {line}: {msg}")),
            other => other,
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = "\
date,description,amount,kind,payment_method,installment_index,installment_count,necessity
2024-01-05,Salary,1000.00,income,bank_transfer,,,
2024-01-10,Phone (installment 1/2),150.50,expense,credit_card,1,2,non_essential
";

    #[test]
    fn reads_rows_with_optional_columns() {
        let entries = read_entries(SAMPLE.as_bytes(), "ana").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].owner, "ana");
        assert_eq!(entries[0].kind, EntryKind::Income);
        assert_eq!(entries[0].installment_count, None);
        assert_eq!(entries[0].necessity, None);
        assert_eq!(entries[1].amount, dec!(150.50));
        assert_eq!(entries[1].payment_method, Some(PaymentMethod::CreditCard));
        assert_eq!(entries[1].installment_index, Some(1));
        assert_eq!(entries[1].necessity, Some(Necessity::NonEssential));
    }

    #[test]
    fn export_then_import_keeps_entries() {
        let entries = read_entries(SAMPLE.as_bytes(), "ana").unwrap();
        let mut buf = Vec::new();
        write_entries(&entries, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("date,description,amount,kind,payment_method"));
        assert_eq!(read_entries(buf.as_slice(), "ana").unwrap(), entries);
    }

    #[test]
    fn rejects_free_text_and_bad_invariants() {
        let bad_kind = "date,description,amount,kind,payment_method,installment_index,installment_count,necessity\n\
2024-01-05,Gift,10,Receita,,,,\n";
        let err = read_entries(bad_kind.as_bytes(), "ana").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(ref m) if m.starts_with("row 1")));

        let bad_installment = "date,description,amount,kind,payment_method,installment_index,installment_count,necessity\n\
2024-01-05,Tv,10,expense,credit_card,3,2,\n";
        assert!(read_entries(bad_installment.as_bytes(), "ana").is_err());

        let negative = "date,description,amount,kind,payment_method,installment_index,installment_count,necessity\n\
2024-01-05,Tv,-10,expense,,,,\n";
        assert!(read_entries(negative.as_bytes(), "ana").is_err());
    }

    #[test]
    fn rejects_amounts_above_the_cap() {
        let huge = "date,description,amount,kind,payment_method,installment_index,installment_count,necessity\n\
2024-01-05,Lottery,79228162514264337593543950335,income,,,,\n";
        let err = read_entries(huge.as_bytes(), "ana").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(ref m) if m.starts_with("row 1")));
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn write_failures_are_internal_errors() {
        let entries = read_entries(SAMPLE.as_bytes(), "ana").unwrap();
        assert!(matches!(
            write_entries(&entries, BrokenSink),
            Err(LedgerError::Internal(_))
        ));
    }
}
