//! Command-line arguments.

use asubeb_core::models::{DashboardParams, SortOrder};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Seconds between refreshes in watch mode
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 60;

#[derive(Parser, Debug)]
#[command(name = "asubeb")]
#[command(about = "View ASUBEB school performance data from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an Argon2 hash to put in config.json as pin_hash
    HashPin { pin: String },

    /// Unlock the dashboard for 30 minutes of activity
    Login { pin: String },

    /// End the PIN session
    Logout,

    /// Show session and API settings
    Status,

    /// Show the admin dashboard summary
    Dashboard {
        #[command(flatten)]
        filters: Filters,

        /// Bypass the cache and any previous failure
        #[arg(long)]
        force: bool,
    },

    /// Show the student performance table
    Students {
        #[command(flatten)]
        filters: Filters,

        /// Bypass the cache and any previous failure
        #[arg(long)]
        force: bool,
    },

    /// Re-render the dashboard on an interval
    Watch {
        #[command(flatten)]
        filters: Filters,

        /// Seconds between refreshes
        #[arg(long, default_value_t = DEFAULT_WATCH_INTERVAL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortOrder::Asc,
            Order::Desc => SortOrder::Desc,
        }
    }
}

/// Filter, sort and pagination flags shared by the data commands.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Academic session id
    #[arg(long)]
    session: Option<String>,

    /// Term id
    #[arg(long)]
    term: Option<String>,

    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    limit: Option<u32>,

    /// Free-text search over student names and exam numbers
    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    school: Option<String>,

    #[arg(long)]
    class: Option<String>,

    #[arg(long, value_parser = uppercase)]
    gender: Option<String>,

    #[arg(long)]
    lga: Option<String>,

    /// Field to sort by
    #[arg(long)]
    sort: Option<String>,

    #[arg(long, value_enum)]
    order: Option<Order>,

    #[arg(long)]
    include_students: bool,

    #[arg(long)]
    include_performance: bool,
}

fn uppercase(raw: &str) -> Result<String, String> {
    Ok(raw.to_uppercase())
}

impl From<Filters> for DashboardParams {
    fn from(f: Filters) -> Self {
        DashboardParams {
            session_id: f.session,
            term_id: f.term,
            page: f.page,
            limit: f.limit,
            search: f.search,
            school_id: f.school,
            class_id: f.class,
            gender: f.gender,
            lga_id: f.lga,
            sort_by: f.sort,
            sort_order: f.order.map(SortOrder::from),
            include_students: f.include_students.then_some(true),
            include_performance: f.include_performance.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("asubeb").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_students_filters() {
        let cli = parse(&[
            "students", "--term", "t2", "--page", "3", "--gender", "female", "--order", "desc", "--force",
        ])
        .unwrap();

        let Command::Students { filters, force } = cli.command else {
            panic!("expected students command");
        };
        assert!(force);

        let params = DashboardParams::from(filters);
        assert_eq!(params.term_id.as_deref(), Some("t2"));
        assert_eq!(params.page, Some(3));
        assert_eq!(params.gender.as_deref(), Some("FEMALE"));
        assert_eq!(params.sort_order, Some(SortOrder::Desc));
        assert_eq!(params.include_students, None);
    }

    #[test]
    fn test_no_filters_means_empty_params() {
        let cli = parse(&["dashboard"]).unwrap();
        let Command::Dashboard { filters, force } = cli.command else {
            panic!("expected dashboard command");
        };
        assert!(!force);
        assert!(DashboardParams::from(filters).is_empty());
    }

    #[test]
    fn test_include_flags() {
        let cli = parse(&["dashboard", "--include-performance"]).unwrap();
        let Command::Dashboard { filters, .. } = cli.command else {
            panic!("expected dashboard command");
        };
        let params = DashboardParams::from(filters);
        assert_eq!(params.include_performance, Some(true));
        assert_eq!(params.include_students, None);
    }

    #[test]
    fn test_watch_interval() {
        let cli = parse(&["watch"]).unwrap();
        let Command::Watch { interval, filters } = cli.command else {
            panic!("expected watch command");
        };
        assert_eq!(interval, DEFAULT_WATCH_INTERVAL_SECS);
        assert_eq!(filters, Filters::default());

        assert!(parse(&["watch", "--interval", "0"]).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["dashboard", "--page"]).is_err());
        assert!(parse(&["dashboard", "--page", "two"]).is_err());
        assert!(parse(&["dashboard", "--order", "sideways"]).is_err());
        assert!(parse(&["dashboard", "--colour", "red"]).is_err());
        assert!(parse(&["login"]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
    }
}
