// General Analysis - public vs private comparison over the whole dataset

use crate::school::{Category, Competency, School};
use crate::stats::{calculate_averages, Averages};
use serde::Serialize;

pub const DEFAULT_TOP_PERFORMERS: usize = 10;

/// Mean score and size of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: Category,
    pub label: &'static str,
    pub mean: f64,
    pub count: usize,
}

/// Share of the dataset held by one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow {
    pub category: Category,
    pub count: usize,
    /// Percentage of all schools, 0 when the dataset is empty
    pub percentage: f64,
}

/// Per-competency means side by side, one row per competency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyRow {
    pub competency: Competency,
    pub code: &'static str,
    pub public: f64,
    pub private: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAnalysis {
    pub overall: Averages,
    pub public: Averages,
    pub private: Averages,
    pub public_count: usize,
    pub private_count: usize,
    pub comparison: Vec<CategoryRow>,
    pub distribution: Vec<DistributionRow>,
    pub competencies: Vec<CompetencyRow>,
    /// First schools of the collection in the order given
    pub top_performers: Vec<School>,
}

impl CategoryAnalysis {
    pub fn build(schools: &[School]) -> Self {
        Self::build_with_top(schools, DEFAULT_TOP_PERFORMERS)
    }

    pub fn build_with_top(schools: &[School], top: usize) -> Self {
        let public_schools: Vec<&School> = schools.iter().filter(|s| s.is_public()).collect();
        let private_schools: Vec<&School> = schools.iter().filter(|s| !s.is_public()).collect();

        let overall = calculate_averages(schools);
        let public = calculate_averages(public_schools.iter().copied());
        let private = calculate_averages(private_schools.iter().copied());

        let comparison = vec![
            CategoryRow {
                category: Category::Public,
                label: Category::Public.label(),
                mean: public.overall,
                count: public_schools.len(),
            },
            CategoryRow {
                category: Category::Private,
                label: Category::Private.label(),
                mean: private.overall,
                count: private_schools.len(),
            },
        ];

        let total = schools.len();
        let share = |count: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            }
        };
        let distribution = vec![
            DistributionRow {
                category: Category::Public,
                count: public_schools.len(),
                percentage: share(public_schools.len()),
            },
            DistributionRow {
                category: Category::Private,
                count: private_schools.len(),
                percentage: share(private_schools.len()),
            },
        ];

        let competencies = Competency::ALL
            .iter()
            .map(|c| CompetencyRow {
                competency: *c,
                code: c.code(),
                public: public.competency(*c),
                private: private.competency(*c),
            })
            .collect();

        Self {
            overall,
            public,
            private,
            public_count: public_schools.len(),
            private_count: private_schools.len(),
            comparison,
            distribution,
            competencies,
            top_performers: schools.iter().take(top).cloned().collect(),
        }
    }
}
