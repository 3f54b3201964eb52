use mortgage_core::amortization::export;
use mortgage_core::amortization::ScheduleRow;
use serde_json::Value;
use std::io;

use super::schedule_of;

/// Write output as CSV to stdout.
///
/// Schedules use the same layout as the exported file; anything else is
/// written as two-column `field,value` records.
pub fn print_csv(value: &Value) {
    if let Some(schedule) = schedule_of(value) {
        match serde_json::from_value::<Vec<ScheduleRow>>(Value::Array(schedule.clone())) {
            Ok(rows) => {
                if let Err(e) = export::write_schedule_csv(io::stdout().lock(), &rows) {
                    eprintln!("CSV write error: {}", e);
                }
                return;
            }
            Err(e) => eprintln!("Unexpected schedule layout: {}", e),
        }
    }

    if let Err(e) = write_fields(io::stdout().lock(), value) {
        eprintln!("CSV write error: {}", e);
    }
}

/// Two-column `field,value` rendering of a result object.
fn write_fields<W: io::Write>(writer: W, value: &Value) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["field", "value"])?;

    let result = value.get("result").unwrap_or(value);
    match result {
        Value::Object(map) => {
            for (key, val) in map {
                wtr.write_record([key.as_str(), &format_csv_value(val)])?;
            }
        }
        other => {
            wtr.write_record(["value", &format_csv_value(other)])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct BrokenPipe;

    impl io::Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_fields_written_as_records() {
        let value = json!({"result": {"monthly_payment": "1717.83", "total_periods": 360}});
        let mut buf = Vec::new();
        write_fields(&mut buf, &value).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("field,value\n"));
        assert!(text.contains("monthly_payment,1717.83\n"));
        assert!(text.contains("total_periods,360\n"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let value = json!({"result": {"monthly_payment": "1717.83"}});
        assert!(write_fields(BrokenPipe, &value).is_err());
    }
}
