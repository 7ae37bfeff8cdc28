//! Tab-delimited snapshot codec
//!
//! One record per line: `company_id<TAB>total<NEWLINE>`. No header, no
//! escaping; a company id containing a tab or newline does not round-trip.
//! The transaction counter is not part of the format.

use super::state::AggregateSnapshot;
use std::collections::HashMap;
use std::fmt::Write;

/// Render a snapshot, or `None` when there is nothing to export
///
/// Records come out sorted by company id so equal stores export byte-equal
/// text.
pub fn serialize_tab_delimited(snapshot: &AggregateSnapshot) -> Option<String> {
    if snapshot.is_empty() {
        return None;
    }

    let mut records: Vec<(&String, &i64)> = snapshot.totals.iter().collect();
    records.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut output = String::with_capacity(records.len() * 16);
    for (company_id, total) in records {
        // Writing into a String cannot fail
        let _ = writeln!(output, "{}\t{}", company_id, total);
    }
    Some(output)
}

/// Parse snapshot text into a company -> total map
///
/// Lenient by contract:
/// - blank lines and lines with fewer than two non-empty tab-separated
///   fields are skipped
/// - a total that does not parse as an integer becomes 0
/// - a repeated company id overwrites the earlier record
pub fn parse_tab_delimited(text: &str) -> HashMap<String, i64> {
    let mut entries = HashMap::new();

    for line in text.lines() {
        let mut fields = line.split('\t').filter(|field| !field.is_empty());
        let (company_id, total) = match (fields.next(), fields.next()) {
            (Some(company_id), Some(total)) => (company_id, total),
            _ => {
                if !line.is_empty() {
                    log::debug!("Skipping malformed snapshot record: {:?}", line);
                }
                continue;
            }
        };

        let total = total.parse::<i64>().unwrap_or_else(|_| {
            log::debug!("Non-numeric total for {}: {:?}, using 0", company_id, total);
            0
        });
        entries.insert(company_id.to_string(), total);
    }

    entries
}
