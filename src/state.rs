// Dashboard State - filter/sort/page parameters as one immutable value
//
// Every interaction is an `Action` fed through `DashboardState::apply`,
// which returns the next state. Filter changes go back to page 1, sort
// changes keep the current page.

use crate::query::{
    city_options, paginate, parse_min_sample_size, query, total_pages, Filters, Page, Segment,
    SortConfig, SortKey, DEFAULT_MIN_SAMPLE_SIZE, DEFAULT_PAGE_SIZE,
};
use crate::school::School;
use crate::stats::OverviewStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search(String),
    /// Also clears the city, which depends on the state
    SelectState(Option<String>),
    SelectCity(Option<String>),
    /// Raw text as typed; parsed leniently
    SetMinSampleSize(String),
    SelectSegment(Segment),
    /// Resets search, state, city and segment; keeps the sample threshold
    ClearFilters,
    Sort(SortKey),
    NextPage,
    PreviousPage,
    GoToPage(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub filters: Filters,
    /// Threshold text as the user typed it
    pub min_sample_input: String,
    pub sort: SortConfig,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl DashboardState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            filters: Filters::default(),
            min_sample_input: DEFAULT_MIN_SAMPLE_SIZE.to_string(),
            sort: SortConfig::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Next state after `action`. Page navigation needs the current result
    /// size, so it takes the records the view is computed over.
    pub fn apply(self, action: Action, schools: &[School]) -> Self {
        match action {
            Action::Search(search) => self.refilter(|f| f.search = search),
            Action::SelectState(state) => self.refilter(|f| {
                f.state = state;
                f.city = None;
            }),
            Action::SelectCity(city) => self.refilter(|f| f.city = city),
            Action::SetMinSampleSize(text) => {
                let threshold = parse_min_sample_size(&text);
                let mut next = self.refilter(|f| f.min_sample_size = threshold);
                next.min_sample_input = text;
                next
            }
            Action::SelectSegment(segment) => self.refilter(|f| f.segment = segment),
            Action::ClearFilters => self.refilter(|f| {
                f.search.clear();
                f.state = None;
                f.city = None;
                f.segment = Segment::All;
            }),
            Action::Sort(key) => Self {
                sort: self.sort.toggle(key),
                ..self
            },
            Action::NextPage => {
                let last = self.total_pages(schools).max(1);
                Self {
                    page: (self.page + 1).min(last),
                    ..self
                }
            }
            Action::PreviousPage => Self {
                page: self.page.saturating_sub(1).max(1),
                ..self
            },
            Action::GoToPage(page) => {
                let last = self.total_pages(schools).max(1);
                Self {
                    page: page.clamp(1, last),
                    ..self
                }
            }
        }
    }

    fn refilter(self, change: impl FnOnce(&mut Filters)) -> Self {
        let mut filters = self.filters;
        change(&mut filters);
        Self {
            filters,
            page: 1,
            ..self
        }
    }

    /// Whether any filter besides the sample threshold is set
    pub fn has_active_filters(&self) -> bool {
        !self.filters.search.is_empty()
            || self.filters.state.is_some()
            || self.filters.segment != Segment::All
    }

    fn total_pages(&self, schools: &[School]) -> usize {
        let count = schools.iter().filter(|s| self.filters.matches(s)).count();
        total_pages(count, self.page_size)
    }

    /// Run the pipeline for this state
    pub fn view<'a>(&self, schools: &'a [School]) -> DashboardView<'a> {
        let filtered = query(schools, &self.filters, self.sort);
        let page = paginate(&filtered, self.page, self.page_size);
        let stats = OverviewStats::from_view(&filtered);
        let cities = city_options(schools, self.filters.state.as_deref());

        DashboardView {
            filtered,
            page,
            stats,
            cities,
        }
    }
}

/// Derived view for one state; recomputed on every change, never stored
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub filtered: Vec<&'a School>,
    pub page: Page<&'a School>,
    pub stats: OverviewStats,
    /// City choices for the selected state
    pub cities: Vec<String>,
}
