use std::fs::File;
use std::path::Path;

use tracing::{debug, warn};

use leads_common::error::Result;
use leads_common::{
    AllLeadsByDate, City, CityAggregate, LeadFile, LeadRecord, LeadsAggregate, LeadsError,
};

use crate::scanner::scan;

/// Scan `root` for every configured city and aggregate what it finds.
pub fn load_leads(root: &Path, date_prefix: &str) -> LeadsAggregate {
    aggregate(root, scan(root, &City::ALL, date_prefix))
}

/// Read each city's files in scan order and merge the rows.
///
/// A file that fails to read contributes nothing; the failure is logged and
/// the remaining files are still aggregated.
pub fn aggregate(root: &Path, scanned: Vec<(City, Vec<LeadFile>)>) -> LeadsAggregate {
    let mut cities = Vec::with_capacity(scanned.len());
    let mut all_leads = AllLeadsByDate::new();
    let mut total_leads = 0;

    for (city, files) in scanned {
        let city_dir = root.join(city.as_str());
        let mut city_agg = CityAggregate::empty(city);

        for file in &files {
            let path = city_dir.join(file.relative_path());
            match read_leads_file(&path) {
                Ok(leads) => {
                    total_leads += leads.len();
                    all_leads.insert(file.date.clone(), city, leads.iter().cloned());
                    city_agg.leads.extend(leads);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read leads file, skipping");
                }
            }
        }

        city_agg.files = files;
        cities.push(city_agg);
    }

    let aggregate = LeadsAggregate {
        cities,
        all_leads,
        total_leads,
    };
    debug!(
        total_leads = aggregate.total_leads,
        active_cities = aggregate.active_cities(),
        dates = aggregate.date_count(),
        "Aggregated leads"
    );
    aggregate
}

/// Parse one CSV export. The header row names the fields.
///
/// The whole file is parsed before anything is returned, so a failure part
/// way through yields an error rather than a partial set of rows. Rows
/// shorter than the header are accepted; rows longer than it are not.
pub fn read_leads_file(path: &Path) -> Result<Vec<LeadRecord>> {
    let file = File::open(path).map_err(|source| LeadsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source: csv::Error| LeadsError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = reader.headers().map_err(csv_err)?.clone();
    if headers.is_empty() {
        return Err(LeadsError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut leads = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        if record.len() > headers.len() {
            return Err(LeadsError::RaggedRow {
                path: path.to_path_buf(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: headers.len(),
                found: record.len(),
            });
        }

        leads.push(
            headers
                .iter()
                .zip(record.iter())
                .filter(|(_, value)| !value.is_empty())
                .collect(),
        );
    }

    Ok(leads)
}
