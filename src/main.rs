// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use essay_ranking::config::{DataArgs, FilterArgs};
use essay_ranking::export::ExportFormat;
use essay_ranking::logging::init_logging;
use essay_ranking::{
    export_to_path, find_school, format_count, format_number, load_or_empty, paginate, query,
    CategoryAnalysis, Comparison, OverviewStats, School, SchoolProfile, DEFAULT_PAGE_SIZE,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "essay-ranking",
    version,
    about = "Ranking nacional de escolas por nota de redação"
)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    /// Rows per page
    #[arg(long, env = "ESSAY_RANKING_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive dashboard (default)
    Tui,
    /// Print one page of the filtered, sorted ranking
    Query {
        #[command(flatten)]
        filters: FilterArgs,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Public vs private breakdown over the whole dataset
    Analysis {
        #[arg(long, default_value_t = essay_ranking::analysis::DEFAULT_TOP_PERFORMERS)]
        top: usize,
        #[arg(long)]
        json: bool,
    },
    /// Side-by-side comparison of up to 5 schools
    Compare {
        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Detail view of one school
    Profile {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Write the whole filtered view to a file
    Export {
        #[arg(long, short = 'o')]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    init_logging("info");
    let cli = Cli::parse();

    let dataset = load_or_empty(&cli.data.source());
    let schools = dataset.schools;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => run_ui_mode(schools, cli.page_size)?,
        Command::Query { filters, page, format } => {
            run_query(&schools, &filters, page, cli.page_size, format)?
        }
        Command::Analysis { top, json } => run_analysis(&schools, top, json)?,
        Command::Compare { ids, json } => run_compare(&schools, &ids, json)?,
        Command::Profile { id, json } => run_profile(&schools, &id, json)?,
        Command::Export { out, format, filters } => {
            let view = query(&schools, &filters.filters(), filters.sort());
            export_to_path(&out, format, &view, &filters.filters(), filters.sort())?;
            println!("✓ Exported {} schools to {}", view.len(), out.display());
        }
    }

    Ok(())
}

fn run_query(
    schools: &[School],
    args: &FilterArgs,
    page: usize,
    page_size: usize,
    format: OutputFormat,
) -> Result<()> {
    let filters = args.filters();
    let view = query(schools, &filters, args.sort());
    let page = paginate(&view, page, page_size);

    match format {
        OutputFormat::Json => {
            let rows =
                serde_json::to_string_pretty(&page.rows).context("Failed to serialize page")?;
            println!("{}", rows);
        }
        OutputFormat::Csv => {
            essay_ranking::export::write_csv(std::io::stdout().lock(), &page.rows)?;
        }
        OutputFormat::Table => {
            let stats = OverviewStats::from_view(&view);
            println!("🏫 Ranking de Redação - {}", stats.summary());
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!(
                "Média Nacional: {}  |  Melhor: {}  |  Alunos: {}",
                stats.mean_label(),
                stats.best_label(),
                format_count(stats.total_students)
            );
            println!();
            println!(
                "{:>7}  {:<42} {:<3} {:<22} {:<8} {:>6} {:>7}",
                "Ranking", "Escola", "UF", "Cidade", "Tipo", "Alunos", "Média"
            );
            for s in &page.rows {
                println!(
                    "{:>7}  {:<42} {:<3} {:<22} {:<8} {:>6} {:>7}",
                    s.rank,
                    essay_ranking::stats::truncate_name(&s.name, 40),
                    s.state,
                    essay_ranking::stats::truncate_name(&s.city, 20),
                    s.category.as_str(),
                    s.sample_size,
                    format_number(s.overall, 1)
                );
            }
            println!();
            println!(
                "Página {} de {} ({} escolas)",
                page.page,
                page.total_pages.max(1),
                format_count(page.total_items as u64)
            );
        }
    }

    Ok(())
}

fn run_analysis(schools: &[School], top: usize, json: bool) -> Result<()> {
    let analysis = CategoryAnalysis::build_with_top(schools, top);

    if json {
        let doc =
            serde_json::to_string_pretty(&analysis).context("Failed to serialize analysis")?;
        println!("{}", doc);
        return Ok(());
    }

    println!("📊 Análise Geral - Pública vs Privada");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Média Nacional: {}", format_number(analysis.overall.overall, 1));
    for row in &analysis.comparison {
        println!(
            "  {:<18} {:>6}  ({} escolas)",
            row.label,
            format_number(row.mean, 1),
            format_count(row.count as u64)
        );
    }

    println!("\n📈 Distribuição");
    for d in &analysis.distribution {
        println!("  {:<8} {:>5.1}%", d.category.as_str(), d.percentage);
    }

    println!("\n✏️  Competências (pública / privada)");
    for c in &analysis.competencies {
        println!(
            "  {}  {:<26} {:>6} / {:>6}",
            c.code,
            c.competency.label(),
            format_number(c.public, 1),
            format_number(c.private, 1)
        );
    }

    println!("\n🏆 Top {} Escolas", analysis.top_performers.len());
    for (i, s) in analysis.top_performers.iter().enumerate() {
        println!(
            "  {:>2}. {:<42} {}  {}",
            i + 1,
            s.name,
            s.location(),
            format_number(s.overall, 1)
        );
    }

    Ok(())
}

fn run_compare(schools: &[School], ids: &[String], json: bool) -> Result<()> {
    let mut comparison = Comparison::new();
    for id in ids {
        let school =
            find_school(schools, id).with_context(|| format!("Escola não encontrada: {}", id))?;
        comparison.add(school)?;
    }

    if json {
        let doc = serde_json::json!({
            "schools": comparison.selected(),
            "competencies": comparison.competency_rows(),
            "metrics": comparison.metric_table(),
        });
        let doc = serde_json::to_string_pretty(&doc).context("Failed to serialize comparison")?;
        println!("{}", doc);
        return Ok(());
    }

    println!("⚖️  Comparação de Escolas");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for row in comparison.metric_table() {
        print!("{:<32}", row.metric);
        for value in &row.values {
            print!(" {:<28}", essay_ranking::stats::truncate_name(value, 26));
        }
        println!();
    }

    Ok(())
}

fn run_profile(schools: &[School], id: &str, json: bool) -> Result<()> {
    let Some(school) = find_school(schools, id) else {
        bail!("Escola não encontrada: {}", id);
    };
    let profile = SchoolProfile::build(school);

    if json {
        let doc = serde_json::to_string_pretty(&profile).context("Failed to serialize profile")?;
        println!("{}", doc);
        return Ok(());
    }

    let badge = profile.badge.map(|m| m.emoji()).unwrap_or("");
    println!("🏫 {} {}", school.name, badge);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📍 {}", school.location());
    println!("Ranking:     #{}", school.rank);
    println!("Tipo:        {}", school.category.as_str());
    println!("Alunos:      {}", school.sample_size);
    println!("Média Geral: {}", format_number(school.overall, 1));
    println!("Eficiência:  {}", format_number(profile.efficiency, 1));

    println!("\n✏️  Competências");
    for c in &profile.competencies {
        println!("  {}  {:<26} {:>6}", c.code, c.label, format_number(c.value, 1));
    }
    if let Some((strong, weak)) = profile.strongest_and_weakest() {
        println!("  Ponto forte: {}  |  A melhorar: {}", strong.label, weak.label);
    }

    if !profile.history.is_empty() {
        println!("\n📅 Histórico");
        for h in &profile.history {
            println!("  {}  {}", h.year, format_number(h.overall, 1));
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(schools: Vec<School>, page_size: usize) -> Result<()> {
    if schools.is_empty() {
        tracing::warn!("dataset is empty; the dashboard will show no schools");
    }

    let mut app = ui::App::new(schools, page_size);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_schools: Vec<School>, _page_size: usize) -> Result<()> {
    eprintln!("❌ TUI not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a subcommand: query, analysis, compare, profile, export");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use essay_ranking::{Segment, SortKey};

    #[test]
    fn test_default_command_is_tui() {
        let cli = Cli::try_parse_from(["essay-ranking"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_query_args() {
        let cli = Cli::try_parse_from([
            "essay-ranking",
            "query",
            "--segment",
            "publica",
            "--sort",
            "nome",
            "--page",
            "3",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Query { filters, page, format }) => {
                assert_eq!(filters.segment, Segment::Public);
                assert_eq!(filters.sort, SortKey::Name);
                assert_eq!(page, 3);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_compare_ids_split_on_comma() {
        let cli = Cli::try_parse_from(["essay-ranking", "compare", "a,b", "c"]).unwrap();
        match cli.command {
            Some(Command::Compare { ids, json }) => {
                assert_eq!(ids, vec!["a", "b", "c"]);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_compare_needs_ids() {
        assert!(Cli::try_parse_from(["essay-ranking", "compare"]).is_err());
    }

    #[test]
    fn test_export_args() {
        let cli = Cli::try_parse_from([
            "essay-ranking",
            "export",
            "-o",
            "out.json",
            "--format",
            "json",
            "--uf",
            "SP",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Export { out, format, filters }) => {
                assert_eq!(out, PathBuf::from("out.json"));
                assert_eq!(format, ExportFormat::Json);
                assert_eq!(filters.uf.as_deref(), Some("SP"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
