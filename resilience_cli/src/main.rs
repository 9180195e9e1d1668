//! # Resilience CLI Application
//!
//! Terminal demo of the loss engine: derives the hinge parameters of the
//! built-in three-story frame, then prices one demand vector entered at
//! the prompt. Set `RUST_LOG=debug` for engine diagnostics.

use std::io::{self, BufRead, Write};

use log::info;

use resilience_core::calculations::{FrameHinges, FrameLayout};
use resilience_core::demand::DemandVector;
use resilience_core::errors::ResilienceResult;
use resilience_core::fragility::FragilityCatalog;
use resilience_core::loss::{ConsequenceParameters, LossOutcome, LossRng, OutcomeKind, ResilienceOutcomeModel};
use resilience_core::materials::builtin_shapes;
use resilience_core::study::AssessmentSettings;

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn main() {
    env_logger::init();

    println!("Resilience CLI - Seismic Loss Assessment");
    println!("========================================");
    println!();

    print_frame_hinges();

    println!("Enter peak demands for the three-story frame.");
    let idr: Vec<f64> = [0.010, 0.012, 0.008]
        .iter()
        .enumerate()
        .map(|(i, d)| prompt_f64(&format!("  Story {} drift ratio [{}]: ", i + 1, d), *d))
        .collect();
    let pfa: Vec<f64> = [0.30, 0.45, 0.55, 0.70]
        .iter()
        .enumerate()
        .map(|(i, a)| prompt_f64(&format!("  Floor {} acceleration (g) [{}]: ", i, a), *a))
        .collect();
    let residual = prompt_f64("  Residual drift ratio [0.002]: ", 0.002);
    let n = prompt_f64("  Realizations [1000]: ", 1000.0).max(1.0) as usize;

    println!();
    println!("Simulating {} realizations...", n);
    println!();

    match assess(idr, pfa, residual, n) {
        Ok((demand, outcome, replacement_cost)) => {
            print_report(&demand, &outcome, replacement_cost);

            println!();
            println!("JSON Output (for scripting):");
            if let Ok(json) = serde_json::to_string_pretty(&summary_json(&demand, &outcome, replacement_cost)) {
                println!("{}", json);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
        }
    }
}

fn assess(idr: Vec<f64>, pfa: Vec<f64>, residual: f64, n: usize) -> ResilienceResult<(DemandVector, LossOutcome, f64)> {
    let demand = DemandVector::new(idr, pfa, residual)?;
    let settings = AssessmentSettings { n_realizations: n, ..Default::default() };
    let mut rng = LossRng::default();

    let model = ResilienceOutcomeModel::new(
        FragilityCatalog::default(),
        ConsequenceParameters::default(),
        &settings,
        &mut rng,
    )?;
    let outcome = model.evaluate(&demand, n, &mut rng)?;

    info!("Assessed demand with max drift {:.4}", demand.max_drift());
    Ok((demand, outcome, model.replacement_cost()))
}

fn print_frame_hinges() {
    let layout = FrameLayout::three_story_office();
    match FrameHinges::build(&layout, builtin_shapes()) {
        Ok(hinges) => {
            println!("Frame hinge parameters (first bay / exterior pier):");
            for level in 1..=layout.stories() {
                if let Some(b) = hinges.beam(level, 0) {
                    println!(
                        "  {:<9} {:<7} My = {:>7.0} kip-in  θp = {:.4}  θpc = {:.4}",
                        b.label,
                        b.section,
                        b.hinge.effective_yield_moment_kip_in,
                        b.hinge.pre_capping_rotation,
                        b.hinge.post_capping_rotation
                    );
                }
                if let Some(c) = hinges.column(level, 0) {
                    println!(
                        "  {:<9} {:<7} My = {:>7.0} kip-in  θp = {:.4}  θpc = {:.4}",
                        c.label,
                        c.section,
                        c.hinge.effective_yield_moment_kip_in,
                        c.hinge.pre_capping_rotation,
                        c.hinge.post_capping_rotation
                    );
                }
            }
            println!();
        }
        Err(e) => eprintln!("Frame hinges unavailable: {}", e),
    }
}

fn print_report(demand: &DemandVector, outcome: &LossOutcome, replacement_cost: f64) {
    let n = outcome.realizations.len();
    println!("═══════════════════════════════════════");
    println!("  LOSS ASSESSMENT RESULTS");
    println!("═══════════════════════════════════════");
    println!();
    println!("Demand:");
    for (i, d) in demand.idr.iter().enumerate() {
        println!("  IDR story {}: {:.4}", i + 1, d);
    }
    for (i, a) in demand.pfa.iter().enumerate() {
        println!("  PFA floor {}: {:.2} g", i, a);
    }
    println!("  RIDR:        {:.4}", demand.residual_drift);
    println!();
    println!("Outcomes ({} realizations):", n);
    println!("  Collapse:    {}", outcome.count(OutcomeKind::Collapse));
    println!(
        "  Irreparable: {} (p = {:.2})",
        outcome.count(OutcomeKind::Irreparable),
        outcome.irreparable_probability
    );
    println!("  Repairable:  {}", outcome.count(OutcomeKind::Repairable));
    println!();
    match outcome.category_means() {
        Some(means) => {
            println!("Mean repair cost of repairable realizations:");
            println!("  Structural:    ${:>14.0}", means.structural);
            println!("  Nonstructural: ${:>14.0}", means.nonstructural);
            println!("  Contents:      ${:>14.0}", means.contents);
        }
        None => println!("No repairable realizations."),
    }
    println!();
    println!("═══════════════════════════════════════");
    println!("  LOSS: ${:.0} ({:?}) {}", outcome.summary, outcome.statistic, collapse_tag(outcome.is_collapse()));
    println!("  Replacement cost: ${:.0}", replacement_cost);
    println!("═══════════════════════════════════════");
}

fn summary_json(demand: &DemandVector, outcome: &LossOutcome, replacement_cost: f64) -> serde_json::Value {
    serde_json::json!({
        "demand": demand,
        "summary": outcome.summary,
        "statistic": outcome.statistic,
        "irreparable_probability": outcome.irreparable_probability,
        "replacement_cost": replacement_cost,
        "collapse": outcome.is_collapse(),
        "realizations": outcome.realizations.len(),
        "repair_by_category": outcome.category_means(),
    })
}

fn collapse_tag(collapse: bool) -> &'static str {
    match collapse {
        true => "[COLLAPSE]",
        false => "[REPAIRABLE]",
    }
}
