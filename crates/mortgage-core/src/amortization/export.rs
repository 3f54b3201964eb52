//! CSV export of an amortization schedule.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::schedule::ScheduleRow;
use crate::MortgageResult;

/// File name used when the caller does not choose one.
pub const DEFAULT_EXPORT_FILE: &str = "mortgage_schedule.csv";

pub const CSV_HEADERS: [&str; 5] = [
    "Month",
    "Monthly Payment",
    "Interest",
    "Principal",
    "Remaining Amount",
];

/// Write the header and one record per row, amounts with two decimals.
pub fn write_schedule_csv<W: io::Write>(writer: W, rows: &[ScheduleRow]) -> MortgageResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADERS)?;

    for row in rows {
        wtr.write_record([
            row.period.to_string(),
            format!("{:.2}", row.payment),
            format!("{:.2}", row.interest),
            format!("{:.2}", row.principal),
            format!("{:.2}", row.remaining_balance),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the schedule to `path`, replacing any existing file.
pub fn export_schedule(path: impl AsRef<Path>, rows: &[ScheduleRow]) -> MortgageResult<PathBuf> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_schedule_csv(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "schedule exported");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::schedule::amortize;
    use crate::amortization::terms::LoanTerms;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_layout() {
        let terms = LoanTerms::new(dec!(1200), dec!(0), 1).unwrap();
        let (_, rows) = amortize(&terms);

        let mut buf = Vec::new();
        write_schedule_csv(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "Month,Monthly Payment,Interest,Principal,Remaining Amount");
        assert_eq!(lines[1], "1,100.00,0.00,100.00,1100.00");
        assert_eq!(lines[12], "12,100.00,0.00,100.00,0.00");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        let terms = LoanTerms::new(dec!(100000), dec!(0.12), 1).unwrap();
        let (_, rows) = amortize(&terms);

        let written = export_schedule(&path, &rows).unwrap();
        assert_eq!(written, path);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 13);
        assert!(text.lines().nth(1).unwrap().starts_with("1,8884.88,1000.00,7884.88,92115.12"));
    }
}
