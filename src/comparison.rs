// School Comparison - up to five schools side by side

use crate::school::{Competency, School};
use crate::stats::format_number;
use serde::Serialize;
use thiserror::Error;

pub const MAX_COMPARED: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("limite de {} escolas atingido; remova uma para adicionar outra", MAX_COMPARED)]
    Full,

    #[error("a escola {0} já está selecionada")]
    Duplicate(String),
}

/// One school's value inside a chart row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedScore {
    pub name: String,
    pub value: f64,
}

/// One competency with every selected school's sub-score, in selection order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyChartRow {
    pub competency: &'static str,
    pub scores: Vec<NamedScore>,
}

impl CompetencyChartRow {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.name == name).map(|s| s.value)
    }
}

/// One line of the side-by-side metrics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: String,
    pub values: Vec<String>,
}

/// Ordered selection of schools, unique by id, at most `MAX_COMPARED`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    selected: Vec<School>,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[School] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= MAX_COMPARED
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s.id == id)
    }

    pub fn add(&mut self, school: &School) -> Result<(), ComparisonError> {
        if self.contains(&school.id) {
            return Err(ComparisonError::Duplicate(school.id.clone()));
        }
        if self.is_full() {
            return Err(ComparisonError::Full);
        }
        self.selected.push(school.clone());
        Ok(())
    }

    /// Returns whether anything was removed
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s.id != id);
        self.selected.len() != before
    }

    /// Schools that can still be added
    pub fn candidates<'a>(&self, schools: &'a [School]) -> Vec<&'a School> {
        schools.iter().filter(|s| !self.contains(&s.id)).collect()
    }

    /// Chart data: five rows (C1..C5) keyed by school name, or nothing when
    /// no school is selected
    pub fn competency_rows(&self) -> Vec<CompetencyChartRow> {
        if self.selected.is_empty() {
            return Vec::new();
        }

        Competency::ALL
            .iter()
            .map(|c| CompetencyChartRow {
                competency: c.code(),
                scores: self
                    .selected
                    .iter()
                    .map(|s| NamedScore {
                        name: s.name.clone(),
                        value: s.competency(*c),
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn metric_table(&self) -> Vec<MetricRow> {
        let row = |metric: String, f: &dyn Fn(&School) -> String| MetricRow {
            metric,
            values: self.selected.iter().map(f).collect(),
        };

        let mut rows = vec![row("Média Geral".to_string(), &|s: &School| {
            format_number(s.overall, 1)
        })];
        for c in Competency::ALL {
            rows.push(row(format!("{} - {}", c.code(), c.label()), &move |s: &School| {
                format_number(s.competency(c), 1)
            }));
        }
        rows.push(row("Alunos".to_string(), &|s: &School| s.sample_size.to_string()));
        rows.push(row("Ranking".to_string(), &|s: &School| format!("#{}", s.rank)));
        rows
    }
}
