//! Company directory: the static dataset plus filter, sort, and pagination.
//!
//! The dataset ships with the build (`data/companies.json`) and is
//! immutable. Queries are plain in-memory transformations: linear filter
//! predicates over three fields, a single-key case-insensitive comparator
//! sort, and fixed-page-size slicing. The full query state round-trips
//! through a form-urlencoded query string so views are shareable and
//! bookmarkable.

use anyhow::{bail, Result};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::models::{Company, SearchFilters};

/// Industry filter vocabulary. `"All"` means no filter.
pub const INDUSTRIES: &[&str] = &[
    "All",
    "AI/ML",
    "Fintech",
    "Healthcare",
    "SaaS",
    "Consumer",
    "Enterprise",
];

/// Stage filter vocabulary. `"All"` means no filter.
pub const STAGES: &[&str] = &[
    "All",
    "Pre-seed",
    "Seed",
    "Series A",
    "Series B",
    "Series C+",
    "Public",
];

/// Fixed page size for directory views.
pub const PAGE_SIZE: usize = 20;

static DATASET: OnceLock<Vec<Company>> = OnceLock::new();

/// The shipped company dataset. Parsed once, then served from memory.
pub fn companies() -> &'static [Company] {
    DATASET.get_or_init(|| {
        // A parse failure here is a build defect, not a runtime condition.
        serde_json::from_str(include_str!("../data/companies.json"))
            .expect("embedded company dataset must be valid JSON")
    })
}

/// Look up a company by id.
pub fn find_company(id: &str) -> Option<&'static Company> {
    companies().iter().find(|c| c.id == id)
}

/// Column a directory view is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Industry,
    Stage,
    Location,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Industry => "industry",
            SortField::Stage => "stage",
            SortField::Location => "location",
        }
    }

    fn key<'a>(&self, company: &'a Company) -> &'a str {
        match self {
            SortField::Name => &company.name,
            SortField::Industry => &company.industry,
            SortField::Stage => &company.stage,
            SortField::Location => &company.location,
        }
    }
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(SortField::Name),
            "industry" => Ok(SortField::Industry),
            "stage" => Ok(SortField::Stage),
            "location" => Ok(SortField::Location),
            other => bail!(
                "Unknown sort field: {}. Use name, industry, stage, or location.",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => bail!("Unknown sort direction: {}. Use asc or desc.", other),
        }
    }
}

/// Complete state of a directory view: filters, sort, and page.
#[derive(Debug, Clone, Default)]
pub struct DirectoryQuery {
    pub filters: SearchFilters,
    pub sort: SortField,
    pub dir: SortDirection,
    /// 1-based page number.
    pub page: usize,
}

impl DirectoryQuery {
    pub fn new(filters: SearchFilters) -> Self {
        Self {
            filters,
            sort: SortField::default(),
            dir: SortDirection::default(),
            page: 1,
        }
    }

    /// Encode the query as a shareable form-urlencoded string.
    ///
    /// Default values are omitted: empty query, `"All"` filters, `name`
    /// sort, `asc` direction, page 1. `"AI/ML"` encodes as `AI%2FML`.
    pub fn to_query_string(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        if !self.filters.query.is_empty() {
            ser.append_pair("q", &self.filters.query);
        }
        if self.filters.industry != "All" {
            ser.append_pair("industry", &self.filters.industry);
        }
        if self.filters.stage != "All" {
            ser.append_pair("stage", &self.filters.stage);
        }
        if self.sort != SortField::Name {
            ser.append_pair("sort", self.sort.as_str());
        }
        if self.dir != SortDirection::Asc {
            ser.append_pair("dir", self.dir.as_str());
        }
        if self.page > 1 {
            ser.append_pair("page", &self.page.to_string());
        }
        ser.finish()
    }

    /// Reconstruct a query from a form-urlencoded string.
    ///
    /// Unknown parameters are ignored; missing ones take their defaults, so
    /// any URL produced by [`to_query_string`](Self::to_query_string)
    /// round-trips.
    pub fn from_query_string(query: &str) -> Result<Self> {
        let mut out = Self {
            page: 1,
            ..Self::default()
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" => out.filters.query = value.into_owned(),
                "industry" => out.filters.industry = value.into_owned(),
                "stage" => out.filters.stage = value.into_owned(),
                "sort" => out.sort = value.parse()?,
                "dir" => out.dir = value.parse()?,
                "page" => out.page = value.parse().unwrap_or(1).max(1),
                _ => {}
            }
        }
        Ok(out)
    }
}

/// One page of directory results.
#[derive(Debug, Clone)]
pub struct DirectoryPage {
    pub items: Vec<Company>,
    /// Total matches before pagination.
    pub total: usize,
    /// 1-based page number actually served.
    pub page: usize,
    pub total_pages: usize,
}

/// Filter the dataset by the query's text/industry/stage predicates.
///
/// The free-text query matches case-insensitively against name, industry,
/// and location.
pub fn filter_companies<'a>(source: &'a [Company], filters: &SearchFilters) -> Vec<&'a Company> {
    let needle = filters.query.to_lowercase();
    source
        .iter()
        .filter(|c| {
            if !needle.is_empty() {
                let hit = c.name.to_lowercase().contains(&needle)
                    || c.industry.to_lowercase().contains(&needle)
                    || c.location.to_lowercase().contains(&needle);
                if !hit {
                    return false;
                }
            }
            if filters.industry != "All" && c.industry != filters.industry {
                return false;
            }
            if filters.stage != "All" && c.stage != filters.stage {
                return false;
            }
            true
        })
        .collect()
}

/// Sort companies by a single key, case-insensitively.
pub fn sort_companies(companies: &mut [&Company], field: SortField, dir: SortDirection) {
    companies.sort_by(|a, b| {
        let ord = field
            .key(a)
            .to_lowercase()
            .cmp(&field.key(b).to_lowercase());
        match dir {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Run a full directory query against the shipped dataset.
pub fn run_query(query: &DirectoryQuery) -> DirectoryPage {
    query_dataset(companies(), query)
}

/// Run a full directory query against an arbitrary dataset slice.
///
/// An out-of-range page clamps to the last non-empty page (page 1 when
/// there are no matches).
pub fn query_dataset(source: &[Company], query: &DirectoryQuery) -> DirectoryPage {
    let mut matched = filter_companies(source, &query.filters);
    sort_companies(&mut matched, query.sort, query.dir);

    let total = matched.len();
    let total_pages = total.div_ceil(PAGE_SIZE).max(1);
    let page = query.page.clamp(1, total_pages);

    let start = (page - 1) * PAGE_SIZE;
    let items = matched
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    DirectoryPage {
        items,
        total,
        page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(id: &str, name: &str, industry: &str, stage: &str, location: &str) -> Company {
        Company {
            id: id.to_string(),
            name: name.to_string(),
            industry: industry.to_string(),
            stage: stage.to_string(),
            location: location.to_string(),
            website: format!("https://{}.example.com", id),
        }
    }

    fn fixture() -> Vec<Company> {
        vec![
            company("a", "Aster AI", "AI/ML", "Seed", "San Francisco, CA"),
            company("b", "bolt pay", "Fintech", "Series A", "New York, NY"),
            company("c", "Carelink", "Healthcare", "Seed", "Boston, MA"),
            company("d", "Dataloom", "SaaS", "Series B", "Austin, TX"),
        ]
    }

    #[test]
    fn test_dataset_parses_and_is_unique() {
        let all = companies();
        assert!(!all.is_empty());

        let mut ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all.len(), "company ids must be unique");

        for c in all {
            assert!(INDUSTRIES.contains(&c.industry.as_str()), "{}", c.industry);
            assert!(STAGES.contains(&c.stage.as_str()), "{}", c.stage);
        }
    }

    #[test]
    fn test_filter_by_query_matches_three_fields() {
        let data = fixture();

        // Name match, case-insensitive
        let filters = SearchFilters {
            query: "aster".to_string(),
            ..Default::default()
        };
        let out = filter_companies(&data, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");

        // Location match
        let filters = SearchFilters {
            query: "austin".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_companies(&data, &filters)[0].id, "d");

        // Industry substring match
        let filters = SearchFilters {
            query: "fintech".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_companies(&data, &filters)[0].id, "b");
    }

    #[test]
    fn test_filter_by_industry_and_stage() {
        let data = fixture();
        let filters = SearchFilters {
            query: String::new(),
            industry: "Healthcare".to_string(),
            stage: "Seed".to_string(),
        };
        let out = filter_companies(&data, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "c");
    }

    #[test]
    fn test_all_sentinel_filters_nothing() {
        let data = fixture();
        let out = filter_companies(&data, &SearchFilters::default());
        assert_eq!(out.len(), data.len());
    }

    #[test]
    fn test_sort_case_insensitive() {
        let data = fixture();
        let mut refs: Vec<&Company> = data.iter().collect();
        sort_companies(&mut refs, SortField::Name, SortDirection::Asc);
        // "bolt pay" sorts between "Aster AI" and "Carelink" despite case
        let names: Vec<&str> = refs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Aster AI", "bolt pay", "Carelink", "Dataloom"]);

        sort_companies(&mut refs, SortField::Name, SortDirection::Desc);
        assert_eq!(refs[0].name, "Dataloom");
    }

    #[test]
    fn test_pagination_slices_and_clamps() {
        let data: Vec<Company> = (0..45)
            .map(|i| company(&format!("c{:02}", i), &format!("Co {:02}", i), "SaaS", "Seed", "X"))
            .collect();

        let mut q = DirectoryQuery::default();
        q.page = 1;
        let page = query_dataset(&data, &q);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), PAGE_SIZE);

        q.page = 3;
        let page = query_dataset(&data, &q);
        assert_eq!(page.items.len(), 5);

        // Out-of-range page clamps to last
        q.page = 99;
        let page = query_dataset(&data, &q);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn test_query_string_omits_defaults() {
        let q = DirectoryQuery::default();
        assert_eq!(q.to_query_string(), "");
    }

    #[test]
    fn test_query_string_encodes_industry_slash() {
        let q = DirectoryQuery::new(SearchFilters {
            query: "ai".to_string(),
            industry: "AI/ML".to_string(),
            stage: "All".to_string(),
        });
        assert_eq!(q.to_query_string(), "q=ai&industry=AI%2FML");
    }

    #[test]
    fn test_query_string_roundtrip() {
        let mut q = DirectoryQuery::new(SearchFilters {
            query: "deep tech".to_string(),
            industry: "AI/ML".to_string(),
            stage: "Series A".to_string(),
        });
        q.sort = SortField::Stage;
        q.dir = SortDirection::Desc;
        q.page = 2;

        let encoded = q.to_query_string();
        let parsed = DirectoryQuery::from_query_string(&encoded).unwrap();
        assert_eq!(parsed.filters, q.filters);
        assert_eq!(parsed.sort, q.sort);
        assert_eq!(parsed.dir, q.dir);
        assert_eq!(parsed.page, q.page);
    }

    #[test]
    fn test_query_string_ignores_unknown_params() {
        let parsed = DirectoryQuery::from_query_string("q=ai&utm_source=mail").unwrap();
        assert_eq!(parsed.filters.query, "ai");
    }
}
