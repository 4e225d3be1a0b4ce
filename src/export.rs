// Export - write a derived view to CSV or JSON

use crate::query::{Filters, SortConfig};
use crate::school::School;
use crate::stats::{calculate_averages, efficiency, Averages};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Flat CSV line; optional fields become empty cells
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    ranking: u32,
    id: &'a str,
    nome: &'a str,
    uf: &'a str,
    cidade: &'a str,
    dependencia: &'static str,
    qtd_redacoes: u32,
    media_geral: f64,
    comp1: f64,
    comp2: f64,
    comp3: f64,
    comp4: f64,
    comp5: f64,
    nse: Option<f64>,
    eficiencia: f64,
}

impl<'a> From<&'a School> for CsvRow<'a> {
    fn from(s: &'a School) -> Self {
        Self {
            ranking: s.rank,
            id: &s.id,
            nome: &s.name,
            uf: &s.state,
            cidade: &s.city,
            dependencia: s.category.as_str(),
            qtd_redacoes: s.sample_size,
            media_geral: s.overall,
            comp1: s.comp1,
            comp2: s.comp2,
            comp3: s.comp3,
            comp4: s.comp4,
            comp5: s.comp5,
            nse: s.socioeconomic,
            eficiencia: efficiency(s),
        }
    }
}

/// JSON export document
#[derive(Debug, Serialize)]
pub struct ExportReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub filters: &'a Filters,
    pub sort: SortConfig,
    pub total: usize,
    pub averages: Averages,
    pub schools: &'a [&'a School],
}

impl<'a> ExportReport<'a> {
    pub fn new(view: &'a [&'a School], filters: &'a Filters, sort: SortConfig) -> Self {
        Self {
            generated_at: Utc::now(),
            filters,
            sort,
            total: view.len(),
            averages: calculate_averages(view.iter().copied()),
            schools: view,
        }
    }
}

pub fn write_csv<W: Write>(writer: W, view: &[&School]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for school in view {
        wtr.serialize(CsvRow::from(*school))
            .with_context(|| format!("Failed to write CSV row for school {}", school.id))?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, report: &ExportReport) -> Result<()> {
    serde_json::to_writer_pretty(writer, report).context("Failed to write JSON export")?;
    Ok(())
}

pub fn export_to_path(
    path: &Path,
    format: ExportFormat,
    view: &[&School],
    filters: &Filters,
    sort: SortConfig,
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);

    match format {
        ExportFormat::Csv => write_csv(writer, view)?,
        ExportFormat::Json => write_json(writer, &ExportReport::new(view, filters, sort))?,
    }

    tracing::info!(path = %path.display(), rows = view.len(), "export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::query;
    use crate::school::tests::create_test_school;
    use crate::school::Category;

    fn schools() -> Vec<School> {
        let name = "Escola, com vírgula";
        let mut a = create_test_school("1", name, "SP", "Campinas", Category::Public, 40, 700.0);
        a.socioeconomic = Some(3.5);
        let b = create_test_school("2", "Colégio B", "RJ", "Niterói", Category::Private, 60, 800.0);
        vec![a, b]
    }

    #[test]
    fn test_write_csv() {
        let schools = schools();
        let view: Vec<&School> = schools.iter().collect();
        let mut out = Vec::new();

        write_csv(&mut out, &view).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ranking,id,nome,uf,cidade,dependencia"));
        assert!(lines[1].contains("\"Escola, com vírgula\""));
        assert!(lines[1].contains(",3.5,200"));
        // Missing index leaves an empty cell, efficiency uses divisor 4
        assert!(lines[2].ends_with(",,200.0"));
    }

    #[test]
    fn test_export_json_file() {
        let schools = schools();
        let filters = Filters::none();
        let sort = SortConfig::default();
        let view = query(&schools, &filters, sort);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        export_to_path(&path, ExportFormat::Json, &view, &filters, sort).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["averages"]["media_geral"], 750.0);
        assert_eq!(value["sort"]["key"], "ranking");
        assert_eq!(value["schools"][1]["nome"], "Colégio B");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_export_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("export.csv");
        let err =
            export_to_path(&path, ExportFormat::Csv, &[], &Filters::none(), SortConfig::default())
                .unwrap_err();
        assert!(err.to_string().contains("Failed to create export file"));
    }
}
