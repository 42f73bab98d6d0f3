use anyhow::Result;
use clap::Args;
use pvsizer_core::dimensioning::SystemLosses;
use pvsizer_core::engineering::LossesEngine;

use super::utils::print_json;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Args)]
pub struct LossesArgs {
    /// Site latitude in degrees, negative south
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,
    /// Annual shading loss in percent
    #[arg(long)]
    shading: Option<f64>,
    #[arg(long)]
    soiling: Option<f64>,
    #[arg(long)]
    cabling: Option<f64>,
    #[arg(long)]
    inverter: Option<f64>,
    #[arg(long)]
    mismatch: Option<f64>,
    #[arg(long)]
    other: Option<f64>,
    #[arg(long)]
    json: bool,
}

pub fn run(args: LossesArgs) -> Result<()> {
    let mut base = SystemLosses::default();
    if let Some(v) = args.shading {
        base.shading = v;
    }
    if let Some(v) = args.soiling {
        base.soiling = v;
    }
    if let Some(v) = args.cabling {
        base.cabling = v;
    }
    if let Some(v) = args.inverter {
        base.inverter = v;
    }
    if let Some(v) = args.mismatch {
        base.mismatch = v;
    }
    if let Some(v) = args.other {
        base.other = v;
    }

    let losses = LossesEngine::monthly(&base, args.latitude);
    if args.json {
        return print_json(&losses);
    }

    println!("Latitude band: {:?}", losses.band);
    println!("Month  Shading  Soiling  Cabling  Inverter  Total");
    for (i, month) in MONTHS.iter().enumerate() {
        println!(
            "{:<5}  {:>7.2}  {:>7.2}  {:>7.2}  {:>8.2}  {:>5.2}",
            month,
            losses.shading[i],
            losses.soiling[i],
            losses.cabling[i],
            losses.inverter[i],
            losses.total[i]
        );
    }
    println!("Annual average: {:.2}%", losses.annual_average());
    Ok(())
}
