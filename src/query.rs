// Query Pipeline - filter, sort and paginate the in-memory records
//
// Pure functions over `&[School]`. Nothing here can fail: bad user input
// (e.g. a non-numeric minimum sample size) is mapped to a safe default.

use crate::school::{Category, School};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

pub const DEFAULT_MIN_SAMPLE_SIZE: u32 = 30;
pub const DEFAULT_PAGE_SIZE: usize = 20;

// ============================================================================
// FILTERS
// ============================================================================

/// Category filter: either variant or both
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    #[default]
    #[serde(alias = "todos")]
    #[value(alias = "todos")]
    All,
    #[serde(alias = "publica")]
    #[value(alias = "publica")]
    Public,
    #[serde(alias = "privada")]
    #[value(alias = "privada")]
    Private,
}

impl Segment {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            Segment::All => true,
            Segment::Public => category == Category::Public,
            Segment::Private => category == Category::Private,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::All => "Todas",
            Segment::Public => "Públicas",
            Segment::Private => "Privadas",
        }
    }

    /// All -> Public -> Private -> All
    pub fn cycle(&self) -> Self {
        match self {
            Segment::All => Segment::Public,
            Segment::Public => Segment::Private,
            Segment::Private => Segment::All,
        }
    }
}

/// Active filters. Every predicate must hold for a school to be kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Case-insensitive substring of the school name; empty matches all
    pub search: String,
    pub state: Option<String>,
    /// Only meaningful together with `state`
    pub city: Option<String>,
    /// Schools with fewer essays than this are dropped
    pub min_sample_size: u32,
    pub segment: Segment,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            search: String::new(),
            state: None,
            city: None,
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
            segment: Segment::All,
        }
    }
}

impl Filters {
    /// No predicate at all, including the sample-size threshold
    pub fn none() -> Self {
        Self {
            min_sample_size: 0,
            ..Self::default()
        }
    }

    pub fn matches(&self, school: &School) -> bool {
        self.matches_search(school)
            && self.state.as_ref().map_or(true, |uf| &school.state == uf)
            && self.city.as_ref().map_or(true, |city| &school.city == city)
            && school.sample_size >= self.min_sample_size
            && self.segment.matches(school.category)
    }

    fn matches_search(&self, school: &School) -> bool {
        if self.search.is_empty() {
            return true;
        }
        school
            .name
            .to_lowercase()
            .contains(&self.search.to_lowercase())
    }
}

/// Parse a user-typed minimum sample size.
///
/// Takes the leading integer like a lenient form field would ("30abc" is
/// 30, " 12.9" is 12). Empty, non-numeric or negative input gives 0, which
/// excludes nothing.
pub fn parse_min_sample_size(input: &str) -> u32 {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];

    if negative || digits.is_empty() {
        return 0;
    }

    digits.parse::<u32>().unwrap_or(u32::MAX)
}

// ============================================================================
// SORTING
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    #[serde(rename = "ranking")]
    #[value(name = "ranking")]
    Rank,
    #[serde(rename = "nome")]
    #[value(name = "nome")]
    Name,
    #[serde(rename = "uf")]
    #[value(name = "uf")]
    State,
    #[serde(rename = "cidade")]
    #[value(name = "cidade")]
    City,
    #[serde(rename = "dependencia")]
    #[value(name = "dependencia")]
    Category,
    #[serde(rename = "qtd_redacoes")]
    #[value(name = "qtd_redacoes")]
    SampleSize,
    #[serde(rename = "media_geral")]
    #[value(name = "media_geral")]
    OverallScore,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Rank,
        SortKey::Name,
        SortKey::State,
        SortKey::City,
        SortKey::Category,
        SortKey::SampleSize,
        SortKey::OverallScore,
    ];

    /// Column header
    pub fn title(&self) -> &'static str {
        match self {
            SortKey::Rank => "Ranking",
            SortKey::Name => "Escola",
            SortKey::State => "UF",
            SortKey::City => "Cidade",
            SortKey::Category => "Tipo",
            SortKey::SampleSize => "Alunos",
            SortKey::OverallScore => "Média",
        }
    }

    fn compare(&self, a: &School, b: &School) -> Ordering {
        match self {
            SortKey::Rank => a.rank.cmp(&b.rank),
            SortKey::Name => locale_cmp(&a.name, &b.name),
            SortKey::State => locale_cmp(&a.state, &b.state),
            SortKey::City => locale_cmp(&a.city, &b.city),
            SortKey::Category => locale_cmp(a.category.as_str(), b.category.as_str()),
            SortKey::SampleSize => a.sample_size.cmp(&b.sample_size),
            SortKey::OverallScore => a.overall.total_cmp(&b.overall),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// One active sort key plus its direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Selecting the active key flips direction; a new key starts ascending
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self::new(key, self.direction.flip())
        } else {
            Self::new(key, SortDirection::Asc)
        }
    }

    pub fn compare(&self, a: &School, b: &School) -> Ordering {
        let ord = self.key.compare(a, b);
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Locale-aware string ordering: accents and case are ignored at the
/// primary level, the raw strings only break primary ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(fold_char)
        .cmp(b.chars().flat_map(fold_char));
    primary.then_with(|| a.cmp(b))
}

fn fold_char(c: char) -> std::char::ToLowercase {
    let base = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    };
    base.to_lowercase()
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Filter then sort. The sort is stable, so ties keep dataset order.
pub fn query<'a>(schools: &'a [School], filters: &Filters, sort: SortConfig) -> Vec<&'a School> {
    let mut result: Vec<&School> = schools.iter().filter(|s| filters.matches(s)).collect();
    result.sort_by(|a, b| sort.compare(a, b));
    result
}

/// Distinct state codes, sorted
pub fn state_options(schools: &[School]) -> Vec<String> {
    distinct_sorted(schools.iter().map(|s| s.state.as_str()))
}

/// Distinct cities within `state`; empty when no state is selected
pub fn city_options(schools: &[School], state: Option<&str>) -> Vec<String> {
    match state {
        None => Vec::new(),
        Some(uf) => distinct_sorted(
            schools
                .iter()
                .filter(|s| s.state == uf)
                .map(|s| s.city.as_str()),
        ),
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// PAGINATION
// ============================================================================

/// One page of a derived view. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// Slice `items` into fixed-size pages and return page `page`.
/// Out-of-range requests clamp to the first or last page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let page = page.clamp(1, total_pages.max(1));

    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        rows: items[start..end].to_vec(),
        page,
        page_size,
        total_pages,
        total_items: items.len(),
    }
}
