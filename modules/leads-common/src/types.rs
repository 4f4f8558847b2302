use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

// --- Cities ---

/// The fixed set of markets the scraper pipeline exports. Directories on disk
/// that don't name one of these are never treated as cities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum City {
    Nashville,
    Chattanooga,
    Austin,
    SanAntonio,
    Houston,
    Charlotte,
    Phoenix,
    Dallas,
    Raleigh,
    Philadelphia,
    Seattle,
    Chicago,
}

impl City {
    pub const ALL: [City; 12] = [
        City::Nashville,
        City::Chattanooga,
        City::Austin,
        City::SanAntonio,
        City::Houston,
        City::Charlotte,
        City::Phoenix,
        City::Dallas,
        City::Raleigh,
        City::Philadelphia,
        City::Seattle,
        City::Chicago,
    ];

    /// Directory name under the leads root.
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Nashville => "nashville",
            City::Chattanooga => "chattanooga",
            City::Austin => "austin",
            City::SanAntonio => "sanantonio",
            City::Houston => "houston",
            City::Charlotte => "charlotte",
            City::Phoenix => "phoenix",
            City::Dallas => "dallas",
            City::Raleigh => "raleigh",
            City::Philadelphia => "philadelphia",
            City::Seattle => "seattle",
            City::Chicago => "chicago",
        }
    }

    /// Title-cased directory name, e.g. `Sanantonio`.
    pub fn display_name(&self) -> String {
        title_case(self.as_str())
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

// --- Files ---

/// Name of a scrape-run directory, `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateBucket(String);

impl DateBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A CSV export inside a city directory, addressed as `date/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadFile {
    pub date: DateBucket,
    pub name: String,
}

impl LeadFile {
    pub fn new(date: DateBucket, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }

    /// Path relative to the city directory.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.date.as_str()).join(&self.name)
    }
}

impl fmt::Display for LeadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.date, self.name)
    }
}

// --- Records ---

/// One CSV data row, keyed by header name. Empty cells are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadRecord {
    fields: HashMap<String, String>,
}

impl LeadRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LeadRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// --- Aggregates ---

#[derive(Debug, Clone, PartialEq)]
pub struct CityAggregate {
    pub city: City,
    /// Most recent date first.
    pub files: Vec<LeadFile>,
    /// Concatenated across `files`, in the same order.
    pub leads: Vec<LeadRecord>,
}

impl CityAggregate {
    pub fn empty(city: City) -> Self {
        Self {
            city,
            files: Vec::new(),
            leads: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.leads.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityLeads {
    pub city: City,
    pub leads: Vec<LeadRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: DateBucket,
    pub cities: Vec<CityLeads>,
}

impl DateGroup {
    pub fn lead_count(&self) -> usize {
        self.cities.iter().map(|c| c.leads.len()).sum()
    }
}

/// Leads grouped by date, then city.
///
/// Both levels keep first-seen insertion order. Dates are NOT sorted: they
/// appear in the order the aggregator first met them while walking cities.
/// Use [`AllLeadsByDate::chronological`] when date order matters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllLeadsByDate {
    groups: Vec<DateGroup>,
}

impl AllLeadsByDate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add leads under `date` then `city`, appending if the pair already exists.
    pub fn insert(
        &mut self,
        date: DateBucket,
        city: City,
        leads: impl IntoIterator<Item = LeadRecord>,
    ) {
        let idx = match self.groups.iter().position(|g| g.date == date) {
            Some(idx) => idx,
            None => {
                self.groups.push(DateGroup {
                    date,
                    cities: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[idx];

        match group.cities.iter().position(|c| c.city == city) {
            Some(i) => group.cities[i].leads.extend(leads),
            None => group.cities.push(CityLeads {
                city,
                leads: leads.into_iter().collect(),
            }),
        }
    }

    pub fn get(&self, date: &DateBucket) -> Option<&DateGroup> {
        self.groups.iter().find(|g| &g.date == date)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DateGroup> {
        self.groups.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = &DateBucket> {
        self.groups.iter().map(|g| &g.date)
    }

    /// Groups sorted by date, oldest first.
    pub fn chronological(&self) -> Vec<&DateGroup> {
        let mut sorted: Vec<&DateGroup> = self.groups.iter().collect();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));
        sorted
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<'a> IntoIterator for &'a AllLeadsByDate {
    type Item = &'a DateGroup;
    type IntoIter = std::slice::Iter<'a, DateGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Everything the dashboard renders, rebuilt on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadsAggregate {
    /// One entry per configured city, in [`City::ALL`] order.
    pub cities: Vec<CityAggregate>,
    pub all_leads: AllLeadsByDate,
    pub total_leads: usize,
}

impl LeadsAggregate {
    pub fn city(&self, city: City) -> Option<&CityAggregate> {
        self.cities.iter().find(|c| c.city == city)
    }

    pub fn configured_cities(&self) -> usize {
        City::ALL.len()
    }

    pub fn active_cities(&self) -> usize {
        self.cities.iter().filter(|c| c.is_active()).count()
    }

    pub fn date_count(&self) -> usize {
        self.all_leads.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(permit: &str) -> LeadRecord {
        [("permit_number", permit)].into_iter().collect()
    }

    #[test]
    fn display_name_title_cases_directory_name() {
        assert_eq!(City::Nashville.display_name(), "Nashville");
        assert_eq!(City::SanAntonio.display_name(), "Sanantonio");
        assert_eq!(title_case("san-antonio tx"), "San-Antonio Tx");
        assert_eq!(title_case("FORT worth"), "Fort Worth");
    }

    #[test]
    fn lead_file_relative_path() {
        let file = LeadFile::new(DateBucket::new("2025-06-01"), "permits.csv");
        assert_eq!(file.relative_path(), PathBuf::from("2025-06-01").join("permits.csv"));
        assert_eq!(file.to_string(), "2025-06-01/permits.csv");
    }

    #[test]
    fn all_leads_keeps_first_seen_order() {
        let mut all = AllLeadsByDate::new();
        all.insert(DateBucket::new("2025-06-03"), City::Nashville, vec![lead("A")]);
        all.insert(DateBucket::new("2025-06-01"), City::Nashville, vec![lead("B")]);
        all.insert(DateBucket::new("2025-06-05"), City::Austin, vec![lead("C")]);
        all.insert(DateBucket::new("2025-06-03"), City::Austin, vec![lead("D")]);

        let dates: Vec<&str> = all.dates().map(DateBucket::as_str).collect();
        assert_eq!(dates, vec!["2025-06-03", "2025-06-01", "2025-06-05"]);

        let june3 = all.get(&DateBucket::new("2025-06-03")).unwrap();
        let cities: Vec<City> = june3.cities.iter().map(|c| c.city).collect();
        assert_eq!(cities, vec![City::Nashville, City::Austin]);
    }

    #[test]
    fn all_leads_appends_for_repeated_date_and_city() {
        let mut all = AllLeadsByDate::new();
        let date = DateBucket::new("2025-06-01");
        all.insert(date.clone(), City::Houston, vec![lead("A"), lead("B")]);
        all.insert(date.clone(), City::Houston, vec![lead("C")]);

        assert_eq!(all.len(), 1);
        let group = all.get(&date).unwrap();
        assert_eq!(group.cities.len(), 1);
        assert_eq!(group.lead_count(), 3);
    }

    #[test]
    fn chronological_sorts_without_touching_insertion_order() {
        let mut all = AllLeadsByDate::new();
        all.insert(DateBucket::new("2025-06-03"), City::Dallas, vec![lead("A")]);
        all.insert(DateBucket::new("2025-05-30"), City::Dallas, vec![lead("B")]);
        all.insert(DateBucket::new("2025-06-10"), City::Seattle, vec![lead("C")]);

        let sorted: Vec<&str> = all
            .chronological()
            .iter()
            .map(|g| g.date.as_str())
            .collect();
        assert_eq!(sorted, vec!["2025-05-30", "2025-06-03", "2025-06-10"]);

        let original: Vec<&str> = all.dates().map(DateBucket::as_str).collect();
        assert_eq!(original, vec!["2025-06-03", "2025-05-30", "2025-06-10"]);
    }

    #[test]
    fn aggregate_counts() {
        let aggregate = LeadsAggregate {
            cities: City::ALL
                .iter()
                .map(|&city| {
                    let mut agg = CityAggregate::empty(city);
                    if city == City::Phoenix {
                        agg.leads.push(lead("P-1"));
                    }
                    agg
                })
                .collect(),
            all_leads: AllLeadsByDate::new(),
            total_leads: 1,
        };

        assert_eq!(aggregate.configured_cities(), 12);
        assert_eq!(aggregate.active_cities(), 1);
        assert_eq!(aggregate.date_count(), 0);
        assert!(aggregate.city(City::Phoenix).unwrap().is_active());
        assert_eq!(aggregate.city(City::Chicago).unwrap(), &CityAggregate::empty(City::Chicago));
    }
}
