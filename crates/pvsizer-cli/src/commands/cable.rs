use anyhow::Result;
use clap::Args;
use pvsizer_core::engineering::{CableSizingEngine, CableSizingInput, DROP_LIMIT_PERCENT};

use super::utils::print_json;

#[derive(Args)]
pub struct CableArgs {
    /// Inverter AC output power in watts
    #[arg(long)]
    power_w: f64,
    /// single, dual or three
    #[arg(long)]
    connection: String,
    /// Line voltage in volts
    #[arg(long)]
    voltage: f64,
    /// copper or aluminum
    #[arg(long, default_value = "copper")]
    material: String,
    /// One-way circuit length in meters
    #[arg(long)]
    length: f64,
    /// Installation method code (B1, B2, C, D)
    #[arg(long, default_value = "B1")]
    method: String,
    /// PVC, EPR or XLPE
    #[arg(long, default_value = "PVC")]
    insulation: String,
    #[arg(long, default_value_t = 30.0)]
    ambient_c: f64,
    /// Circuits sharing the same conduit
    #[arg(long, default_value_t = 1)]
    circuits: u32,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CableArgs) -> Result<()> {
    let input = CableSizingInput {
        ac_power_w: args.power_w,
        connection: args.connection.parse()?,
        voltage_v: args.voltage,
        material: args.material.parse()?,
        length_m: args.length,
        installation_method: args.method,
        insulation: args.insulation,
        ambient_temp_c: args.ambient_c,
        grouped_circuits: args.circuits,
    };
    let sizing = CableSizingEngine::size(&input)?;

    if args.json {
        return print_json(&sizing);
    }

    println!("Design current:  {:.2} A", sizing.design_current_a);
    println!(
        "Corrections:     temperature {:.2}, grouping {:.2}",
        sizing.temperature_factor, sizing.grouping_factor
    );
    println!(
        "Section:         {} mm² (ampacity {:.0} A)",
        sizing.section_mm2, sizing.ampacity_a
    );
    println!(
        "Voltage drop:    {:.2} V ({:.3}%)",
        sizing.voltage_drop_v, sizing.voltage_drop_percent
    );
    if !sizing.drop_limit_satisfied {
        println!(
            "Warning: drop exceeds {}% even at the largest section",
            DROP_LIMIT_PERCENT
        );
    }
    Ok(())
}
