//! Normalizes raw fuel-price rows into deduplicated catalog inserts.
//!
//! Expects the OPIS-style columns: `OPIS Truckstop ID`, `Truckstop Name`, `Address`, `City`,
//! `State`, `Rack ID`, `Retail Price`. A missing required column fails the whole run; an
//! individual malformed row is silently dropped.

use crate::error::{CatalogError, Result};
use crate::models::NewStation;
use std::collections::HashMap;
use std::io::Read;

const REQUIRED_COLUMNS: &[&str] = &[
    "OPIS Truckstop ID",
    "Truckstop Name",
    "Address",
    "City",
    "State",
    "Rack ID",
    "Retail Price",
];

/// Parses and normalizes rows from a CSV reader, deduplicating by canonical key and keeping
/// the cheapest price observed for each.
///
/// # Errors
///
/// Returns an error if a required column is missing from the header, or if the CSV itself
/// cannot be read.
pub fn normalize_csv<R: Read>(reader: R) -> Result<Vec<NewStation>> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: HashMap<String, usize> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.to_string(), idx))
        .collect();

    for column in REQUIRED_COLUMNS {
        if !headers.contains_key(*column) {
            return Err(CatalogError::MissingColumn(column));
        }
    }

    let mut best_by_key: HashMap<String, NewStation> = HashMap::new();

    for record in csv_reader.records() {
        let record = record?;
        let Some(row) = normalize_row(&record, &headers) else {
            continue;
        };

        best_by_key
            .entry(row.canonical_key.clone())
            .and_modify(|existing| {
                if row.price_milli_dollars < existing.price_milli_dollars {
                    *existing = row.clone();
                }
            })
            .or_insert(row);
    }

    let mut rows: Vec<NewStation> = best_by_key.into_values().collect();
    rows.sort_by(|a, b| a.canonical_key.cmp(&b.canonical_key));
    Ok(rows)
}

fn normalize_row(record: &csv::StringRecord, headers: &HashMap<String, usize>) -> Option<NewStation> {
    let get = |column: &str| -> Option<&str> { headers.get(column).and_then(|&idx| record.get(idx)) };

    let name = get("Truckstop Name")?.trim().to_string();
    let address = get("Address")?.trim().to_string();
    let city = get("City")?.trim().to_string();
    let state = get("State")?.trim().to_uppercase();
    let state: String = state.chars().take(2).collect();
    let price: f64 = get("Retail Price")?.trim().parse().ok()?;

    if address.is_empty() || city.is_empty() || state.len() != 2 || price <= 0.0 {
        return None;
    }

    let price_milli_dollars = (price * 1000.0).round() as i64;
    let canonical_key = format!(
        "{}|{}|{}",
        address.to_uppercase(),
        city.to_uppercase(),
        state
    );

    Some(NewStation {
        name,
        address,
        city,
        state,
        price_milli_dollars,
        canonical_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_WITH_DUPLICATE: &str = "\
OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price
1,Tulsa Fuel Stop,100 Main St,Tulsa,OK,10,3.500
2,Tulsa Fuel Stop,100 Main St,Tulsa,OK,10,3.200
3,Bad Row,200 Elm St,Springfield,MO,11,0.000
4,Denver Fuel,300 Oak Ave,Denver,CO,12,3.750
";

    #[test]
    fn dedups_by_canonical_key_keeping_cheapest_and_drops_nonpositive_price() {
        let rows = normalize_csv(CSV_WITH_DUPLICATE.as_bytes()).expect("normalize");
        assert_eq!(rows.len(), 2);

        let tulsa = rows
            .iter()
            .find(|r| r.city == "TULSA" || r.city == "Tulsa")
            .expect("tulsa row present");
        assert_eq!(tulsa.price_milli_dollars, 3200);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "Truckstop Name,Address,City,State\nA,B,C,OK\n";
        let err = normalize_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn(_)));
    }
}
