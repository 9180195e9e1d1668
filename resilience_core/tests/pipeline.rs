//! End-to-end assessment with stand-in collaborators: an attenuation-scaled
//! harmonic record generator and a single-degree-of-freedom solver built on
//! the frame's hinge parameters.

use std::env::temp_dir;
use std::fs;

use resilience_core::assessment::{
    AnalysisSettings, BatchSummary, GroundMotionGenerator, ResilienceAssessment, StructuralSolver,
};
use resilience_core::calculations::{FrameHinges, FrameLayout};
use resilience_core::errors::{ResilienceError, ResilienceResult};
use resilience_core::file_io::{load_study, save_study};
use resilience_core::ground_motion::{sdof_response, GroundMotion, GroundMotionScenario, SdofMethod};
use resilience_core::loss::LossRng;
use resilience_core::materials::builtin_shapes;
use resilience_core::parameters::UncertainParameters;
use resilience_core::study::{AssessmentSettings, Study};
use resilience_core::units::GRAVITY_M_S2;

const FT_TO_M: f64 = 0.3048;

struct HarmonicGenerator {
    silent: bool,
}

impl GroundMotionGenerator for HarmonicGenerator {
    fn generate(&self, scenario: &GroundMotionScenario, rng: &mut LossRng) -> ResilienceResult<GroundMotion> {
        let dt = 0.01;
        if self.silent {
            return GroundMotion::new(vec![0.0; 1500], dt);
        }
        let pga = 0.3 * (0.5 * (scenario.magnitude - 6.0)).exp() * 30.0 / (scenario.distance_km + 10.0)
            * (760.0 / scenario.vs30).powf(0.3)
            * (0.2 * rng.standard_normal()).exp();
        let period = 0.4 + 0.3 * scenario.fault_type;
        let acc = (0..1500)
            .map(|i| {
                let t = i as f64 * dt;
                let envelope = (t / 2.0).min(1.0) * (-(t - 2.0).max(0.0) / 5.0).exp();
                pga * envelope * (2.0 * std::f64::consts::PI * t / period).sin()
            })
            .collect();
        GroundMotion::new(acc, dt)
    }
}

struct SdofFrameSolver {
    hinges: FrameHinges,
    height_m: f64,
    drift_limit: f64,
}

impl SdofFrameSolver {
    fn new(drift_limit: f64) -> Self {
        let layout = FrameLayout::three_story_office();
        let height_m = layout.story_heights_ft.iter().sum::<f64>() * FT_TO_M;
        let hinges = FrameHinges::build(&layout, builtin_shapes()).unwrap();
        SdofFrameSolver { hinges, height_m, drift_limit }
    }
}

impl StructuralSolver for SdofFrameSolver {
    fn run_nonlinear_history(&self, motion: &GroundMotion, settings: &AnalysisSettings) -> ResilienceResult<Vec<f64>> {
        let period = 0.9 * settings.mass_multiplier.sqrt();
        let omega = 2.0 * std::f64::consts::PI / period;
        let response = sdof_response(
            omega,
            settings.damping_ratio,
            &motion.acceleration_m_s2(),
            settings.time_step,
            SdofMethod::NewmarkLinear,
        )?;

        let roof_drift = 1.3 * response.displacement / self.height_m;
        let idr = [1.1 * roof_drift, roof_drift, 0.9 * roof_drift];
        let max_idr = idr.iter().copied().fold(0.0, f64::max);
        if max_idr > self.drift_limit {
            return Err(ResilienceError::solver_non_convergence(format!(
                "Drift {:.3} exceeds model limit",
                max_idr
            )));
        }

        let yield_drift = self
            .hinges
            .beam(1, 0)
            .map(|b| b.hinge.yield_rotation())
            .unwrap_or(0.01);
        let residual = 0.5 * (max_idr - yield_drift).max(0.0);

        let pga = motion.pga();
        let sa_g = response.pseudo_acceleration / GRAVITY_M_S2;
        let mut edp = idr.to_vec();
        edp.extend((0..=3).map(|level| pga + sa_g * level as f64 / 3.0));
        edp.push(residual);
        Ok(edp)
    }
}

fn settings(base_seed: u64) -> AssessmentSettings {
    AssessmentSettings {
        n_realizations: 60,
        worst_case_realizations: 60,
        base_seed,
        ..Default::default()
    }
}

fn sample_rows(seed: u64, n: usize) -> Vec<Vec<f64>> {
    let mut rng = LossRng::from_seed_u64(seed);
    (0..n)
        .map(|_| UncertainParameters::sample(&mut rng).to_row().to_vec())
        .collect()
}

#[test]
fn pipeline_assesses_and_persists_a_study() {
    let generator = HarmonicGenerator { silent: false };
    let solver = SdofFrameSolver::new(1.0);
    let assessment = ResilienceAssessment::new(&generator, &solver, settings(11)).unwrap();

    let mut study = Study::new("Integration", "RSA-PIPE");
    study.frame = Some(FrameLayout::three_story_office());
    let summary = assessment.run_into_study(&mut study, &sample_rows(2024, 6)).unwrap();

    assert_eq!(summary.samples, 6);
    assert_eq!(summary.failed, 0);
    assert_eq!(study.sample_count(), 6);
    let mean = summary.mean_loss.unwrap();
    assert!(mean.is_finite() && mean >= 0.0);

    let path = temp_dir().join(format!("resilience_pipeline_{}.rsa", std::process::id()));
    save_study(&study, &path).unwrap();
    let loaded = load_study(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(loaded.settings, study.settings);
    let before = study.ordered_samples();
    let after = loaded.ordered_samples();
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.seed, b.seed);
        let (la, lb) = (a.loss.unwrap(), b.loss.unwrap());
        assert!((la - lb).abs() <= 1e-9 * la.abs().max(1.0));
    }

    let reloaded = BatchSummary::from_records(after);
    assert_eq!(reloaded.completed, summary.completed);
    assert_eq!(reloaded.collapsed, summary.collapsed);
}

#[test]
fn reruns_with_the_same_seed_are_identical() {
    let generator = HarmonicGenerator { silent: false };
    let solver = SdofFrameSolver::new(1.0);
    let assessment = ResilienceAssessment::new(&generator, &solver, settings(5)).unwrap();
    let samples: Vec<UncertainParameters> = sample_rows(77, 3)
        .iter()
        .map(|row| UncertainParameters::from_row(row).unwrap())
        .collect();

    let first = assessment.run_batch(&samples).unwrap();
    let second = assessment.run_batch(&samples).unwrap();
    assert_eq!(first, second);
}

#[test]
fn silent_record_costs_nothing() {
    let generator = HarmonicGenerator { silent: true };
    let solver = SdofFrameSolver::new(1.0);
    let assessment = ResilienceAssessment::new(&generator, &solver, settings(1)).unwrap();

    let record = assessment.run_sample(0, &UncertainParameters::default()).unwrap();
    assert_eq!(record.loss, Some(0.0));
    assert!(!record.collapse);
    assert_eq!(record.irreparable_probability, 0.0);
}

#[test]
fn non_converged_samples_are_sentinels() {
    let generator = HarmonicGenerator { silent: false };
    // Any drift at all exceeds this limit
    let solver = SdofFrameSolver::new(0.0);
    let assessment = ResilienceAssessment::new(&generator, &solver, settings(3)).unwrap();

    let samples = vec![UncertainParameters::default(); 3];
    let records = assessment.run_batch(&samples).unwrap();
    assert!(records.iter().all(|r| r.is_sentinel()));
    assert!(records.iter().all(|r| r.edp_row(3).iter().all(|v| v.is_nan())));

    let summary = BatchSummary::from_records(&records);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.mean_loss, None);
    assert_eq!(summary.collapse_rate, None);
}
