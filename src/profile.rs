// School Profile - everything shown for a single school

use crate::school::{Competency, HistoryEntry, School};
use crate::stats::{efficiency, ranking_badge, Medal};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyScore {
    pub code: &'static str,
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolProfile {
    pub school: School,
    pub badge: Option<Medal>,
    pub efficiency: f64,
    pub competencies: Vec<CompetencyScore>,
    /// Prior years, oldest first
    pub history: Vec<HistoryEntry>,
}

impl SchoolProfile {
    pub fn build(school: &School) -> Self {
        let competencies = Competency::ALL
            .iter()
            .map(|c| CompetencyScore {
                code: c.code(),
                label: c.label(),
                value: school.competency(*c),
            })
            .collect();

        let mut history = school.history.clone().unwrap_or_default();
        history.sort_by_key(|h| h.year);

        Self {
            school: school.clone(),
            badge: ranking_badge(school.rank),
            efficiency: efficiency(school),
            competencies,
            history,
        }
    }

    /// Strongest and weakest competency, by score
    pub fn strongest_and_weakest(&self) -> Option<(&CompetencyScore, &CompetencyScore)> {
        let strongest = self
            .competencies
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))?;
        let weakest = self
            .competencies
            .iter()
            .min_by(|a, b| a.value.total_cmp(&b.value))?;
        Some((strongest, weakest))
    }
}

pub fn find_school<'a>(schools: &'a [School], id: &str) -> Option<&'a School> {
    schools.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::school::tests::create_test_school;
    use crate::school::Category;

    fn entry(year: i32, overall: f64) -> HistoryEntry {
        HistoryEntry {
            year,
            overall,
            comp1: 0.0,
            comp2: 0.0,
            comp3: 0.0,
            comp4: 0.0,
            comp5: 0.0,
        }
    }

    #[test]
    fn test_profile_build() {
        let mut school =
            create_test_school("42", "Escola X", "PE", "Recife", Category::Private, 70, 760.0);
        school.rank = 2;
        school.comp5 = 120.0;
        school.comp2 = 180.0;
        school.socioeconomic = Some(4.75);
        school.history = Some(vec![entry(2023, 740.0), entry(2021, 700.0), entry(2022, 720.0)]);

        let profile = SchoolProfile::build(&school);

        assert_eq!(profile.badge, Some(Medal::Silver));
        assert_eq!(profile.efficiency, 160.0);
        assert_eq!(profile.competencies.len(), 5);
        assert_eq!(profile.competencies[3].label, "Coesão");
        let years: Vec<i32> = profile.history.iter().map(|h| h.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023]);

        let (strongest, weakest) = profile.strongest_and_weakest().unwrap();
        assert_eq!(strongest.code, "C2");
        assert_eq!(weakest.code, "C5");
    }

    #[test]
    fn test_profile_without_history() {
        let school = create_test_school("1", "A", "SP", "X", Category::Public, 10, 600.0);
        let profile = SchoolProfile::build(&school);
        assert!(profile.history.is_empty());
        assert_eq!(profile.badge, Some(Medal::Gold));
    }

    #[test]
    fn test_find_school() {
        let schools = vec![
            create_test_school("1", "A", "SP", "X", Category::Public, 10, 600.0),
            create_test_school("2", "B", "SP", "X", Category::Public, 10, 600.0),
        ];
        assert_eq!(find_school(&schools, "2").map(|s| s.name.as_str()), Some("B"));
        assert!(find_school(&schools, "9").is_none());
    }
}
