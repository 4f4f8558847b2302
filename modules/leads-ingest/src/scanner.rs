use std::fs;
use std::path::Path;

use tracing::debug;

use leads_common::{City, DateBucket, LeadFile};

/// List the CSV exports for every city in `cities`, in the same order.
pub fn scan(root: &Path, cities: &[City], date_prefix: &str) -> Vec<(City, Vec<LeadFile>)> {
    cities
        .iter()
        .map(|&city| (city, scan_city(root, city, date_prefix)))
        .collect()
}

/// List `<root>/<city>/<date>/*.csv` for dates starting with `date_prefix`.
///
/// Files come back newest date first, and by descending name within a date.
/// A missing or unreadable city directory yields no files.
pub fn scan_city(root: &Path, city: City, date_prefix: &str) -> Vec<LeadFile> {
    let city_dir = root.join(city.as_str());
    if !city_dir.is_dir() {
        return Vec::new();
    }

    let mut dates = list_names(&city_dir, |p| p.is_dir());
    dates.retain(|name| name.starts_with(date_prefix));
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let mut files = Vec::new();
    for date in dates {
        let mut names = list_names(&city_dir.join(&date), |p| p.is_file());
        names.retain(|name| name.ends_with(".csv"));
        names.sort_unstable_by(|a, b| b.cmp(a));

        let bucket = DateBucket::new(date);
        files.extend(names.into_iter().map(|name| LeadFile::new(bucket.clone(), name)));
    }
    files
}

/// Names of the immediate children of `dir` whose path passes `keep`.
/// Non-UTF-8 names and unreadable directories are skipped.
fn list_names(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| keep(&entry.path()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect()
}
