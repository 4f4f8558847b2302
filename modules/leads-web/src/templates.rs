use leads_common::{City, DateGroup, LeadRecord, LeadsAggregate};

/// Rows shown per city/date table.
pub const MAX_ROWS_PER_TABLE: usize = 100;

/// Render the admin dashboard.
pub fn render_dashboard(data: &LeadsAggregate) -> String {
    let stats = format!(
        r#"<div class="stats">
    <div class="stat-card"><div class="stat-number">{cities}</div><div class="stat-label">Total Cities</div></div>
    <div class="stat-card"><div class="stat-number">{total}</div><div class="stat-label">Total Leads Scraped</div></div>
    <div class="stat-card"><div class="stat-number">{days}</div><div class="stat-label">Days of Data</div></div>
    <div class="stat-card"><div class="stat-number">{active}</div><div class="stat-label">Active Cities</div></div>
</div>"#,
        cities = data.configured_cities(),
        total = data.total_leads,
        days = data.date_count(),
        active = data.active_cities(),
    );

    let city_cards: String = data
        .cities
        .iter()
        .map(|c| {
            format!(
                r#"<div class="city-card"><div class="city-header">{name}</div><div class="city-stats"><span>{leads} leads</span><span>{files} files</span></div></div>"#,
                name = html_escape(&c.city.display_name()),
                leads = c.leads.len(),
                files = c.files.len(),
            )
        })
        .collect();

    let leads_section = if data.all_leads.is_empty() {
        r#"<div class="no-data"><h3>No leads data found</h3><p>Check the leads path configuration.</p></div>"#
            .to_string()
    } else {
        let groups: String = data.all_leads.iter().map(render_date_group).collect();
        format!(
            r#"<div class="section"><div class="section-header">All Leads by Date</div>{groups}</div>"#
        )
    };

    let content = format!(
        r#"<div class="container">
{stats}
<div class="section"><div class="section-header">City Overview</div><div class="city-grid">{city_cards}</div></div>
{leads_section}
</div>
<script>{SORT_SCRIPT}</script>"#
    );

    build_page("Admin Dashboard", &content)
}

/// Render the login form, optionally with an inline error.
pub fn render_login(error: Option<&str>) -> String {
    let error_html = match error {
        Some(err) => format!(r#"<div class="error">{}</div>"#, html_escape(err)),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Admin Login — Contractor Leads</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",sans-serif;background:linear-gradient(135deg,#667eea 0%,#764ba2 100%);min-height:100vh;display:flex;align-items:center;justify-content:center;}}
.login-box{{background:#fff;padding:40px;border-radius:12px;box-shadow:0 20px 60px rgba(0,0,0,0.3);width:100%;max-width:400px;}}
h1{{color:#333;margin-bottom:10px;}}
p{{color:#666;margin-bottom:30px;}}
input{{width:100%;padding:12px;margin-bottom:20px;border:2px solid #e0e0e0;border-radius:6px;font-size:16px;}}
input:focus{{outline:none;border-color:#667eea;}}
.btn{{width:100%;padding:12px;background:linear-gradient(135deg,#667eea 0%,#764ba2 100%);color:#fff;border:none;border-radius:6px;font-size:16px;font-weight:600;cursor:pointer;}}
.btn:hover{{opacity:0.9;}}
.error{{background:#fee;color:#c33;padding:10px;border-radius:6px;margin-bottom:20px;}}
</style>
</head>
<body>
<div class="login-box">
    <h1>Admin Login</h1>
    <p>View all scraped data across all cities</p>
    {error_html}
    <form method="POST" action="/admin/login">
        <input type="password" name="secret" placeholder="Admin Secret" required autofocus>
        <button type="submit" class="btn">Access Admin Dashboard</button>
    </form>
</div>
</body>
</html>"#
    )
}

// --- Sections ---

fn render_date_group(group: &DateGroup) -> String {
    let tables: String = group
        .cities
        .iter()
        .map(|c| render_city_table(c.city, &c.leads))
        .collect();

    format!(
        r#"<div class="date-group"><h3 class="date-heading">{date}</h3>{tables}</div>"#,
        date = html_escape(group.date.as_str()),
    )
}

fn render_city_table(city: City, leads: &[LeadRecord]) -> String {
    let name = html_escape(&city.display_name());
    let rows: String = leads
        .iter()
        .take(MAX_ROWS_PER_TABLE)
        .map(|lead| render_lead_row(&name, lead))
        .collect();

    format!(
        r#"<div class="city-leads">
<div class="city-leads-header">{name} ({count} leads)</div>
<table class="leads-table">
<thead><tr><th>City</th><th>State</th><th>Permit #</th><th>Address</th><th>Type</th><th>Value</th></tr></thead>
<tbody>{rows}</tbody>
</table>
</div>"#,
        count = leads.len(),
    )
}

fn render_lead_row(city_name: &str, lead: &LeadRecord) -> String {
    format!(
        r#"<tr class="lead-row"><td><span class="city-name">{city_name}</span></td><td><span class="state-name">{state}</span></td><td><span class="permit-number">{permit}</span></td><td><span class="address">{address}</span></td><td><span class="permit-type">{kind}</span></td><td><span class="value">{value}</span></td></tr>"#,
        state = html_escape(lead.get("state").unwrap_or("N/A")),
        permit = field(lead, "permit_number"),
        address = field(lead, "address"),
        kind = field(lead, "type"),
        value = field(lead, "value"),
    )
}

/// Escaped field value, blank when the column is missing.
fn field(lead: &LeadRecord, name: &str) -> String {
    html_escape(lead.get(name).unwrap_or(""))
}

// --- Helpers ---

// Click a header to sort that table; the Value column sorts numerically.
const SORT_SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', function() {
    function sortTable(table, column, asc) {
        const dir = asc ? 1 : -1;
        const tBody = table.tBodies[0];
        const rows = Array.from(tBody.querySelectorAll('tr'));
        rows.sort((a, b) => {
            const aText = a.querySelector(`td:nth-child(${column + 1})`).textContent.trim();
            const bText = b.querySelector(`td:nth-child(${column + 1})`).textContent.trim();
            if (column === 5) {
                const aVal = parseFloat(aText.replace(/[$,]/g, '')) || 0;
                const bVal = parseFloat(bText.replace(/[$,]/g, '')) || 0;
                return aVal > bVal ? dir : aVal < bVal ? -dir : 0;
            }
            return aText > bText ? dir : aText < bText ? -dir : 0;
        });
        while (tBody.firstChild) { tBody.removeChild(tBody.firstChild); }
        tBody.append(...rows);
        table.querySelectorAll('th').forEach(th => th.classList.remove('sort-asc', 'sort-desc'));
        const th = table.querySelector(`th:nth-child(${column + 1})`);
        th.classList.toggle('sort-asc', asc);
        th.classList.toggle('sort-desc', !asc);
    }
    document.querySelectorAll('.leads-table th').forEach(cell => {
        cell.addEventListener('click', () => {
            const table = cell.closest('table');
            const index = Array.prototype.indexOf.call(cell.parentElement.children, cell);
            sortTable(table, index, !cell.classList.contains('sort-asc'));
        });
    });
});
"#;

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} — Contractor Leads</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",system-ui,sans-serif;background:#f8fafc;color:#1e293b;}}
.header{{background:linear-gradient(135deg,#dc2626 0%,#b91c1c 100%);color:#fff;padding:20px;display:flex;justify-content:space-between;align-items:center;}}
.logout-btn{{background:rgba(255,255,255,0.2);color:#fff;padding:8px 16px;border-radius:6px;text-decoration:none;font-size:14px;}}
.logout-btn:hover{{background:rgba(255,255,255,0.3);}}
.container{{max-width:1400px;margin:0 auto;padding:20px;}}
.stats{{display:grid;grid-template-columns:repeat(auto-fit,minmax(250px,1fr));gap:20px;margin-bottom:30px;}}
.stat-card{{background:#fff;padding:20px;border-radius:8px;box-shadow:0 2px 10px rgba(0,0,0,0.1);text-align:center;}}
.stat-number{{font-size:32px;font-weight:800;color:#dc2626;}}
.stat-label{{color:#64748b;margin-top:5px;}}
.section{{background:#fff;margin-bottom:20px;border-radius:8px;box-shadow:0 2px 10px rgba(0,0,0,0.1);overflow:hidden;}}
.section-header{{background:#f1f5f9;padding:15px 20px;border-bottom:1px solid #e2e8f0;font-weight:600;color:#374151;}}
.city-grid{{display:grid;grid-template-columns:repeat(auto-fit,minmax(300px,1fr));gap:20px;padding:20px;}}
.city-card{{border:1px solid #e2e8f0;border-radius:8px;overflow:hidden;}}
.city-header{{background:#f8fafc;padding:12px 15px;font-weight:600;color:#374151;border-bottom:1px solid #e2e8f0;}}
.city-stats{{padding:10px 15px;display:flex;justify-content:space-between;font-size:14px;}}
.date-group{{margin-bottom:30px;}}
.date-heading{{padding:15px 20px;background:#f8fafc;border-bottom:1px solid #e2e8f0;}}
.city-leads{{border-left:4px solid #dc2626;background:#fef2f2;margin:10px 20px;}}
.city-leads-header{{padding:10px 15px;font-weight:600;color:#dc2626;}}
.leads-table{{width:100%;border-collapse:collapse;font-size:14px;}}
.leads-table th{{background:#f8fafc;padding:10px;text-align:left;font-weight:600;color:#374151;border-bottom:2px solid #e2e8f0;cursor:pointer;user-select:none;}}
.leads-table th:hover{{background:#e2e8f0;}}
.leads-table th.sort-asc::after{{content:' \25B2';font-size:12px;color:#dc2626;}}
.leads-table th.sort-desc::after{{content:' \25BC';font-size:12px;color:#dc2626;}}
.leads-table td{{padding:8px 10px;border-bottom:1px solid #f1f5f9;}}
.leads-table tr:hover{{background:#f8fafc;}}
.permit-number{{font-weight:600;color:#dc2626;}}
.address{{color:#374151;}}
.permit-type{{background:#fee2e2;color:#991b1b;padding:2px 6px;border-radius:3px;font-size:11px;font-weight:600;}}
.value{{font-weight:700;color:#059669;}}
.no-data{{text-align:center;padding:40px;color:#64748b;}}
@media (max-width:768px){{.header{{flex-direction:column;gap:10px;text-align:center;}}.stats,.city-grid{{grid-template-columns:1fr;}}.leads-table{{font-size:12px;}}}}
</style>
</head>
<body>
<div class="header">
    <h1>Admin Dashboard - All Contractor Leads</h1>
    <a href="/admin?logout=1" class="logout-btn">Logout</a>
</div>
{content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use leads_common::{AllLeadsByDate, CityAggregate, DateBucket, LeadFile};

    fn lead(i: usize) -> LeadRecord {
        [
            ("permit_number", format!("BP-{i}")),
            ("address", format!("{i} Main St")),
            ("type", "Roofing".to_string()),
            ("value", "15000".to_string()),
            ("state", "TN".to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn aggregate_with(city: City, date: &str, leads: Vec<LeadRecord>) -> LeadsAggregate {
        let mut all_leads = AllLeadsByDate::new();
        all_leads.insert(DateBucket::new(date), city, leads.iter().cloned());
        let cities = City::ALL
            .iter()
            .map(|&c| {
                let mut agg = CityAggregate::empty(c);
                if c == city {
                    agg.files.push(LeadFile::new(DateBucket::new(date), "a.csv"));
                    agg.leads = leads.clone();
                }
                agg
            })
            .collect();
        LeadsAggregate {
            cities,
            all_leads,
            total_leads: leads.len(),
        }
    }

    fn empty_aggregate() -> LeadsAggregate {
        LeadsAggregate {
            cities: City::ALL.iter().map(|&c| CityAggregate::empty(c)).collect(),
            all_leads: AllLeadsByDate::new(),
            total_leads: 0,
        }
    }

    #[test]
    fn table_is_capped_at_one_hundred_rows() {
        let leads: Vec<LeadRecord> = (0..150).map(lead).collect();
        let html = render_dashboard(&aggregate_with(City::Austin, "2025-06-01", leads));

        assert_eq!(html.matches(r#"<tr class="lead-row">"#).count(), 100);
        assert!(html.contains("Austin (150 leads)"));
        assert!(html.contains("BP-99<"));
        assert!(!html.contains("BP-100<"));
    }

    #[test]
    fn missing_state_renders_placeholder_and_missing_fields_render_blank() {
        let sparse: LeadRecord = [("permit_number", "BP-7")].into_iter().collect();
        let html = render_dashboard(&aggregate_with(City::Houston, "2025-06-01", vec![sparse]));

        assert!(html.contains(r#"<span class="state-name">N/A</span>"#));
        assert!(html.contains(r#"<span class="permit-number">BP-7</span>"#));
        assert!(html.contains(r#"<span class="address"></span>"#));
        assert!(html.contains(r#"<span class="value"></span>"#));
    }

    #[test]
    fn stats_and_city_cards() {
        let html = render_dashboard(&aggregate_with(
            City::SanAntonio,
            "2025-06-01",
            (0..3).map(lead).collect(),
        ));

        assert!(html.contains(r#"<div class="stat-number">12</div><div class="stat-label">Total Cities</div>"#));
        assert!(html.contains(r#"<div class="stat-number">3</div><div class="stat-label">Total Leads Scraped</div>"#));
        assert!(html.contains(r#"<div class="stat-number">1</div><div class="stat-label">Days of Data</div>"#));
        assert!(html.contains(r#"<div class="stat-number">1</div><div class="stat-label">Active Cities</div>"#));
        assert!(html.contains(r#"<div class="city-header">Sanantonio</div><div class="city-stats"><span>3 leads</span><span>1 files</span>"#));
        assert_eq!(html.matches(r#"<div class="city-card">"#).count(), 12);
    }

    #[test]
    fn empty_aggregate_shows_no_data_placeholder() {
        let html = render_dashboard(&empty_aggregate());

        assert!(html.contains("No leads data found"));
        assert!(!html.contains("All Leads by Date"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn lead_values_are_escaped() {
        let nasty: LeadRecord = [
            ("permit_number", "<script>alert(1)</script>"),
            ("address", "Tom & Jerry's"),
        ]
        .into_iter()
        .collect();
        let html = render_dashboard(&aggregate_with(City::Dallas, "2025-06-01", vec![nasty]));

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Tom &amp; Jerry&#39;s"));
    }

    #[test]
    fn dates_render_in_aggregate_order() {
        let mut data = empty_aggregate();
        data.all_leads
            .insert(DateBucket::new("2025-06-01"), City::Nashville, vec![lead(1)]);
        data.all_leads
            .insert(DateBucket::new("2025-06-09"), City::Austin, vec![lead(2)]);

        let html = render_dashboard(&data);
        let first = html.find("2025-06-01").unwrap();
        let second = html.find("2025-06-09").unwrap();
        assert!(first < second);
    }

    #[test]
    fn login_page_shows_optional_error() {
        let plain = render_login(None);
        assert!(plain.contains(r#"action="/admin/login""#));
        assert!(plain.contains(r#"name="secret""#));
        assert!(!plain.contains(r#"class="error""#));

        let with_error = render_login(Some("Invalid admin secret"));
        assert!(with_error.contains(r#"<div class="error">Invalid admin secret</div>"#));
    }
}
