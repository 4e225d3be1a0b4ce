// Aggregate Calculator - means, overview cards, efficiency score
//
// All functions accept an empty slice and return zeros rather than NaN.

use crate::school::{Competency, School};
use serde::{Deserialize, Serialize};

/// Divisor used when a school has no socioeconomic index
pub const DEFAULT_SOCIOECONOMIC_INDEX: f64 = 4.0;

/// Longest school name shown on the overview card before truncation
const BEST_NAME_MAX: usize = 35;

// ============================================================================
// AVERAGES
// ============================================================================

/// Mean overall score and per-competency means, rounded to one decimal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    #[serde(rename = "media_geral")]
    pub overall: f64,
    pub comp1: f64,
    pub comp2: f64,
    pub comp3: f64,
    pub comp4: f64,
    pub comp5: f64,
}

impl Averages {
    pub fn competencies(&self) -> [f64; 5] {
        [self.comp1, self.comp2, self.comp3, self.comp4, self.comp5]
    }

    pub fn competency(&self, competency: Competency) -> f64 {
        self.competencies()[competency.index()]
    }
}

/// Round to one decimal place, halves away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic means over exactly `schools`. Zero records give all zeros.
pub fn calculate_averages<'a, I>(schools: I) -> Averages
where
    I: IntoIterator<Item = &'a School>,
{
    let mut count = 0usize;
    let mut overall = 0.0;
    let mut comps = [0.0f64; 5];

    for school in schools {
        count += 1;
        overall += school.overall;
        for (sum, value) in comps.iter_mut().zip(school.competencies()) {
            *sum += value;
        }
    }

    if count == 0 {
        return Averages::default();
    }

    let n = count as f64;
    let mean = |sum: f64| round_to_tenth(sum / n);
    Averages {
        overall: mean(overall),
        comp1: mean(comps[0]),
        comp2: mean(comps[1]),
        comp3: mean(comps[2]),
        comp4: mean(comps[3]),
        comp5: mean(comps[4]),
    }
}

// ============================================================================
// OVERVIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSchool {
    pub name: String,
    pub overall: f64,
}

/// Numbers behind the four overview cards of the ranking page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    pub total_schools: usize,
    /// Mean overall score of the view, 0 when empty
    pub mean_overall: f64,
    /// First school of the view in its current order
    pub best: Option<BestSchool>,
    pub total_students: u64,
}

impl OverviewStats {
    pub fn from_view(view: &[&School]) -> Self {
        let total_schools = view.len();
        let mean_overall = if total_schools > 0 {
            view.iter().map(|s| s.overall).sum::<f64>() / total_schools as f64
        } else {
            0.0
        };

        Self {
            total_schools,
            mean_overall,
            best: view.first().map(|s| BestSchool {
                name: truncate_name(&s.name, BEST_NAME_MAX),
                overall: s.overall,
            }),
            total_students: view.iter().map(|s| u64::from(s.sample_size)).sum(),
        }
    }

    /// Mean formatted for display; "0" for an empty view
    pub fn mean_label(&self) -> String {
        if self.total_schools == 0 {
            "0".to_string()
        } else {
            format_number(self.mean_overall, 1)
        }
    }

    pub fn best_label(&self) -> String {
        self.best
            .as_ref()
            .map(|b| format_number(b.overall, 1))
            .unwrap_or_else(|| "0".to_string())
    }

    pub fn summary(&self) -> String {
        format!("{} escolas", format_count(self.total_schools as u64))
    }
}

/// Names longer than `max` chars become the first `max - 3` chars + "..."
pub fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let head: String = name.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

// ============================================================================
// FORMATTING + BADGES
// ============================================================================

pub fn format_number(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Thousands grouped with '.', as pt-BR does
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn emoji(&self) -> &'static str {
        match self {
            Medal::Gold => "🥇",
            Medal::Silver => "🥈",
            Medal::Bronze => "🥉",
        }
    }
}

/// Medal for the podium ranks, none otherwise
pub fn ranking_badge(rank: u32) -> Option<Medal> {
    match rank {
        1 => Some(Medal::Gold),
        2 => Some(Medal::Silver),
        3 => Some(Medal::Bronze),
        _ => None,
    }
}

// ============================================================================
// EFFICIENCY
// ============================================================================

/// Overall score per unit of socioeconomic index. Display metric only.
///
/// A missing, zero or NaN index uses the default divisor so the result
/// stays finite.
pub fn efficiency(school: &School) -> f64 {
    let divisor = match school.socioeconomic {
        Some(index) if index != 0.0 && !index.is_nan() => index,
        _ => DEFAULT_SOCIOECONOMIC_INDEX,
    };
    school.overall / divisor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::school::tests::create_test_school;
    use crate::school::Category;

    #[test]
    fn test_averages_empty() {
        let avg = calculate_averages(std::iter::empty::<&School>());
        assert_eq!(avg, Averages::default());
        assert_eq!(avg.overall, 0.0);
        assert!(avg.competencies().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_averages_single_record() {
        let mut school = create_test_school("1", "A", "SP", "X", Category::Public, 50, 712.34);
        school.comp1 = 150.04;
        school.comp2 = 140.06;
        school.comp3 = 130.0;
        school.comp4 = 160.15;
        school.comp5 = 132.09;

        let avg = calculate_averages(std::slice::from_ref(&school));

        assert_eq!(avg.overall, 712.3);
        assert_eq!(avg.comp1, 150.0);
        assert_eq!(avg.comp2, 140.1);
        assert_eq!(avg.comp3, 130.0);
        assert_eq!(avg.comp5, 132.1);
    }

    #[test]
    fn test_averages_two_records() {
        let schools = vec![
            create_test_school("a", "A", "SP", "X", Category::Public, 10, 700.0),
            create_test_school("b", "B", "SP", "X", Category::Private, 10, 800.0),
        ];

        let avg = calculate_averages(&schools);
        assert_eq!(avg.overall, 750.0);
        assert_eq!(avg.comp1, 150.0);

        // Subsets are computed independently
        let public = calculate_averages(schools.iter().filter(|s| s.is_public()));
        assert_eq!(public.overall, 700.0);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(1.25), 1.3);
        assert_eq!(round_to_tenth(-1.25), -1.3);
        assert_eq!(round_to_tenth(699.94), 699.9);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }

    #[test]
    fn test_overview_empty_view() {
        let stats = OverviewStats::from_view(&[]);
        assert_eq!(stats.total_schools, 0);
        assert_eq!(stats.mean_label(), "0");
        assert_eq!(stats.best_label(), "0");
        assert!(stats.best.is_none());
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.summary(), "0 escolas");
    }

    #[test]
    fn test_overview_uses_view_order() {
        let long_name = "Escola com um nome realmente muito comprido";
        let a = create_test_school("a", long_name, "SP", "X", Category::Public, 1500, 650.0);
        let b = create_test_school("b", "B", "SP", "X", Category::Private, 2500, 800.0);
        let view = vec![&a, &b];

        let stats = OverviewStats::from_view(&view);
        assert_eq!(stats.mean_label(), "725.0");
        assert_eq!(stats.total_students, 4000);
        let best = stats.best.unwrap();
        assert_eq!(best.name, "Escola com um nome realmente mui...");
        assert_eq!(best.name.chars().count(), 35);
        assert_eq!(best.overall, 650.0);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.000");
        assert_eq!(format_count(1234567), "1.234.567");
    }

    #[test]
    fn test_ranking_badge() {
        assert_eq!(ranking_badge(1), Some(Medal::Gold));
        assert_eq!(ranking_badge(3).map(|m| m.emoji()), Some("🥉"));
        assert_eq!(ranking_badge(4), None);
    }

    #[test]
    fn test_efficiency() {
        let mut school = create_test_school("1", "A", "SP", "X", Category::Public, 50, 800.0);
        assert_eq!(efficiency(&school), 200.0);

        school.socioeconomic = Some(5.0);
        assert_eq!(efficiency(&school), 160.0);

        school.socioeconomic = Some(0.0);
        assert_eq!(efficiency(&school), 200.0);
    }
}
