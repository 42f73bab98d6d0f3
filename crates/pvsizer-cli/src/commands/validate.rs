use anyhow::Result;
use pvsizer_core::dimensioning::{Step, StepGate};
use std::path::Path;

use super::utils::read_session;

pub fn run(path: &Path) -> Result<()> {
    let session = read_session(path)?;
    println!(
        "Session '{}' (group {}), current step {}",
        session.name,
        session.tariff_group(),
        session.current_step
    );

    let mut incomplete = 0;
    for step in Step::ALL {
        if step == Step::Results {
            continue;
        }
        let violations = StepGate::validate(step, &session);
        if violations.is_empty() {
            println!("  ✓ {}", step);
            continue;
        }
        incomplete += 1;
        println!("  ✗ {}", step);
        for v in violations {
            println!("      {}: {}", v.field, v.message);
        }
    }

    if incomplete > 0 {
        anyhow::bail!("{} step(s) incomplete", incomplete);
    }
    println!("All steps complete, ready to calculate");
    Ok(())
}
