//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::profile::{Category, Country, CustomerProfile, Device, Gender};

#[derive(Debug, Parser)]
#[command(
    name = "churnradar",
    version,
    about = "Detect churn risk and segment customers instantly"
)]
pub struct Cli {
    /// Directory holding churn_model.json, segment_model.json and scaler.json
    #[arg(long, global = true, default_value = "models")]
    pub models: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score one customer profile and print the result card
    Analyze(AnalyzeArgs),
    /// Score every row of a profiles CSV
    Batch(BatchArgs),
    /// Print the encoded feature vectors without running the models
    Encode(ProfileArgs),
    /// Show details of the loaded model artifacts
    Models,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Also write the analysis as pretty-printed JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Input profiles CSV
    #[arg(long)]
    pub input: PathBuf,

    /// Output CSV with prediction columns appended
    #[arg(long)]
    pub output: PathBuf,

    /// Optional distribution charts (PNG); the churn histogram lands next
    /// to it with a _churn.png suffix
    #[arg(long)]
    pub plot: Option<PathBuf>,
}

/// Profile flags shared by `analyze` and `encode`. Defaults mirror the
/// analysis form; integer ranges are enforced while parsing.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Days since the customer's last purchase
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(0..=1000))]
    pub days_since_last_purchase: u32,

    /// Age of the account in days
    #[arg(long, default_value_t = 240, value_parser = clap::value_parser!(u32).range(0..=730))]
    pub account_age_days: u32,

    /// Country of the customer
    #[arg(long, value_enum, default_value = "australia")]
    pub country: Country,

    /// Customer age in years
    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(u32).range(18..=100))]
    pub age: u32,

    /// Customer gender
    #[arg(long, value_enum, default_value = "male")]
    pub gender: Gender,

    /// Device used for shopping
    #[arg(long, value_enum, default_value = "mobile")]
    pub device: Device,

    /// Favorite shopping category
    #[arg(long, value_enum, default_value = "beauty")]
    pub category: Category,

    /// Total number of orders
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=500))]
    pub total_orders: u32,

    /// Total amount spent
    #[arg(long, default_value_t = 500.0)]
    pub total_spent: f64,

    /// Premium membership
    #[arg(long)]
    pub premium: bool,
}

impl ProfileArgs {
    /// Build a validated profile from the parsed flags.
    pub fn to_profile(&self) -> crate::Result<CustomerProfile> {
        let profile = CustomerProfile {
            days_since_last_purchase: self.days_since_last_purchase,
            account_age_days: self.account_age_days,
            country: self.country,
            age: self.age,
            gender: self.gender,
            device: self.device,
            category: self.category,
            total_orders: self.total_orders,
            total_spent: self.total_spent,
            is_premium: self.premium,
        };
        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_the_form() {
        let cli = Cli::parse_from(["churnradar", "analyze"]);
        assert_eq!(cli.models, PathBuf::from("models"));

        let args = match cli.command {
            Commands::Analyze(args) => args,
            other => panic!("expected analyze, got {:?}", other),
        };
        assert!(args.json.is_none());

        let profile = args.profile.to_profile().unwrap();
        assert_eq!(
            profile,
            CustomerProfile {
                days_since_last_purchase: 30,
                account_age_days: 240,
                country: Country::Australia,
                age: 35,
                gender: Gender::Male,
                device: Device::Mobile,
                category: Category::Beauty,
                total_orders: 10,
                total_spent: 500.0,
                is_premium: false,
            }
        );
    }

    #[test]
    fn test_vocabulary_flags_parse() {
        let cli = Cli::parse_from([
            "churnradar",
            "analyze",
            "--country",
            "south-korea",
            "--category",
            "home-and-garden",
            "--gender",
            "other",
            "--device",
            "tablet",
            "--premium",
        ]);

        let args = match cli.command {
            Commands::Analyze(args) => args,
            other => panic!("expected analyze, got {:?}", other),
        };
        let profile = args.profile.to_profile().unwrap();
        assert_eq!(profile.country, Country::SouthKorea);
        assert_eq!(profile.category, Category::HomeAndGarden);
        assert_eq!(profile.gender, Gender::Other);
        assert_eq!(profile.device, Device::Tablet);
        assert!(profile.is_premium);
    }

    #[test]
    fn test_out_of_range_flags_are_rejected() {
        assert!(Cli::try_parse_from(["churnradar", "analyze", "--age", "17"]).is_err());
        assert!(Cli::try_parse_from(["churnradar", "analyze", "--age", "101"]).is_err());
        assert!(Cli::try_parse_from(["churnradar", "analyze", "--total-orders", "0"]).is_err());
        assert!(Cli::try_parse_from([
            "churnradar",
            "analyze",
            "--days-since-last-purchase",
            "1001"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["churnradar", "encode", "--account-age-days", "731"]).is_err());
    }

    #[test]
    fn test_overspend_is_rejected_by_validation() {
        let cli = Cli::parse_from(["churnradar", "analyze", "--total-spent", "60000"]);
        let args = match cli.command {
            Commands::Analyze(args) => args,
            other => panic!("expected analyze, got {:?}", other),
        };
        assert!(args.profile.to_profile().is_err());
    }

    #[test]
    fn test_unknown_vocabulary_is_rejected() {
        assert!(Cli::try_parse_from(["churnradar", "analyze", "--country", "atlantis"]).is_err());
    }

    #[test]
    fn test_batch_flags() {
        let cli = Cli::parse_from([
            "churnradar", "batch", "--input", "in.csv", "--output", "out.csv", "--plot",
            "dist.png",
        ]);

        let args = match cli.command {
            Commands::Batch(args) => args,
            other => panic!("expected batch, got {:?}", other),
        };
        assert_eq!(args.input, PathBuf::from("in.csv"));
        assert_eq!(args.output, PathBuf::from("out.csv"));
        assert_eq!(args.plot, Some(PathBuf::from("dist.png")));
    }

    #[test]
    fn test_models_dir_flag_is_global() {
        let cli = Cli::parse_from(["churnradar", "models", "--models", "/opt/artifacts"]);
        assert_eq!(cli.models, PathBuf::from("/opt/artifacts"));
        assert!(matches!(cli.command, Commands::Models));
    }
}
