use anyhow::Result;
use arcjet_core::fit::{fit_series, FitConfig, FitOrder};
use clap::Args;

use crate::summary::{print_fit_report, print_series_summary};

use super::parse_window;
use super::reduce::ReductionArgs;

#[derive(Args)]
pub struct FitArgs {
    #[command(flatten)]
    pub reduction: ReductionArgs,

    /// Time window in seconds as t0,t1 (half-open)
    #[arg(long, value_parser = parse_window)]
    pub window: Option<(f64, f64)>,

    /// Polynomial order: 1 (linear) or 2 (quadratic)
    #[arg(long, default_value = "linear")]
    pub order: FitOrder,

    /// Also fit the pixel-unit channels
    #[arg(long)]
    pub pixel: bool,
}

pub fn run(args: &FitArgs) -> Result<()> {
    let series = args.reduction.reduce()?;
    print_series_summary(&series);

    let config = FitConfig {
        window: args.window,
        order: args.order,
        include_pixel: args.pixel,
    };
    let report = fit_series(&series, &config);
    print_fit_report(&report);
    Ok(())
}
