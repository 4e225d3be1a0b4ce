// Configuration - command-line / environment options shared by both binaries

use crate::loader::DatasetSource;
use crate::query::{parse_min_sample_size, Filters, Segment, SortConfig, SortDirection, SortKey};
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/escolas.json";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const LOG_ENV: &str = "ESSAY_RANKING_LOG";

/// Where to read the dataset from
#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Path to the escolas.json dataset
    #[arg(long, env = "ESSAY_RANKING_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Fetch the dataset over HTTP instead of reading --data
    #[cfg(feature = "remote")]
    #[arg(long, env = "ESSAY_RANKING_URL")]
    pub url: Option<String>,
}

impl DataArgs {
    pub fn source(&self) -> DatasetSource {
        #[cfg(feature = "remote")]
        if let Some(url) = &self.url {
            return DatasetSource::Url(url.clone());
        }
        DatasetSource::File(self.data.clone())
    }
}

/// Filter and sort flags for one-shot queries
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive substring of the school name
    #[arg(long, short = 's', default_value = "")]
    pub search: String,

    /// State code (UF), e.g. SP
    #[arg(long)]
    pub uf: Option<String>,

    /// City, only applied together with --uf
    #[arg(long, requires = "uf")]
    pub cidade: Option<String>,

    /// Minimum number of essays; non-numeric input means no minimum
    #[arg(long, default_value = "30")]
    pub min: String,

    #[arg(long, value_enum, default_value_t = Segment::All)]
    pub segment: Segment,

    #[arg(long, value_enum, default_value_t = SortKey::Rank)]
    pub sort: SortKey,

    #[arg(long, value_enum, default_value_t = SortDirection::Asc)]
    pub dir: SortDirection,
}

impl FilterArgs {
    pub fn filters(&self) -> Filters {
        Filters {
            search: self.search.clone(),
            state: self.uf.clone(),
            city: self.cidade.clone(),
            min_sample_size: parse_min_sample_size(&self.min),
            segment: self.segment,
        }
    }

    pub fn sort(&self) -> SortConfig {
        SortConfig::new(self.sort, self.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        filters: FilterArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();

        assert_eq!(cli.data.source(), DatasetSource::File(PathBuf::from(DEFAULT_DATA_PATH)));
        assert_eq!(cli.filters.filters(), Filters::default());
        assert_eq!(cli.filters.sort(), SortConfig::default());
    }

    #[test]
    fn test_filter_flags() {
        let cli = TestCli::try_parse_from([
            "test", "--uf", "SP", "--cidade", "Campinas", "--min", "x", "--segment", "private",
            "--sort", "media_geral", "--dir", "desc",
        ])
        .unwrap();

        let filters = cli.filters.filters();
        assert_eq!(filters.state.as_deref(), Some("SP"));
        assert_eq!(filters.city.as_deref(), Some("Campinas"));
        assert_eq!(filters.min_sample_size, 0);
        assert_eq!(filters.segment, Segment::Private);
        assert_eq!(cli.filters.sort(), SortConfig::new(SortKey::OverallScore, SortDirection::Desc));
    }

    #[test]
    fn test_city_requires_state() {
        assert!(TestCli::try_parse_from(["test", "--cidade", "Campinas"]).is_err());
    }

    #[test]
    fn test_data_path_flag() {
        let cli = TestCli::try_parse_from(["test", "--data", "ranking-2024.json"]).unwrap();
        assert_eq!(cli.data.source(), DatasetSource::File(PathBuf::from("ranking-2024.json")));
    }
}
