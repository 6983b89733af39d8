//! Example: Analyze a synthetic countermovement jump capture
//!
//! This example demonstrates the full pipeline on a generated landmark
//! sequence and prints the resulting metrics and validation report.

use apex_kinetics::{
    analyze_jump, AnalysisConfig, AnalysisRequest, FrameSample, JumpType, Landmark,
    LandmarkPoint, MetricOutcome, ReferenceTables,
};

const FPS: f32 = 60.0;

fn frame_at(hip_height: f32, foot_height: f32) -> FrameSample {
    let hip_y = 1.0 - hip_height;
    let foot_y = 1.0 - foot_height;
    FrameSample::empty()
        .with(Landmark::LeftHip, LandmarkPoint::new(0.48, hip_y, 0.95))
        .with(Landmark::RightHip, LandmarkPoint::new(0.52, hip_y, 0.95))
        .with(Landmark::LeftAnkle, LandmarkPoint::new(0.46, foot_y, 0.95))
        .with(Landmark::RightAnkle, LandmarkPoint::new(0.54, foot_y, 0.95))
        .with(Landmark::LeftHeel, LandmarkPoint::new(0.45, foot_y, 0.95))
        .with(Landmark::RightHeel, LandmarkPoint::new(0.55, foot_y, 0.95))
}

/// Countermovement jump: stand, squat, jump at frame 104, land at frame 141
fn synthetic_capture() -> Vec<FrameSample> {
    let n = 240;
    let mut hip = vec![0.5f32; n];

    let depth = 0.15f32;
    for f in 64..=87 {
        let u = (f - 64) as f32 / 23.0;
        hip[f] = 0.5 - 0.5 * depth * (1.0 - (std::f32::consts::PI * u).cos());
    }
    let t_rise = 17.0 / FPS;
    let t_flight = 37.0 / FPS;
    let g_units = 4.905f32;
    let v_takeoff = g_units * t_flight / 2.0;
    for f in 88..=104 {
        let t = (f - 87) as f32 / FPS;
        hip[f] = 0.35 + 0.5 * (v_takeoff / t_rise) * t * t;
    }
    let h_takeoff = hip[104];
    for f in 105..=141 {
        let t = (f - 104) as f32 / FPS;
        hip[f] = h_takeoff + v_takeoff * t - 0.5 * g_units * t * t;
    }
    let t_absorb = 12.0 / FPS;
    for f in 142..n {
        let t = (f - 141) as f32 / FPS;
        if t < t_absorb {
            hip[f] = h_takeoff - v_takeoff * t + 0.5 * (v_takeoff / t_absorb) * t * t;
        } else {
            hip[f] = h_takeoff - v_takeoff * t_absorb / 2.0;
        }
    }

    hip.iter().map(|&h| frame_at(h, 0.1)).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let frames = synthetic_capture();
    let request = AnalysisRequest::new(FPS, JumpType::Countermovement, "movenet_thunder");
    let config = AnalysisConfig::default();
    let tables = ReferenceTables::builtin();

    let result = analyze_jump(&frames, &request, &config, &tables)?;

    println!("Analysis Results ({} jump):", result.metadata.jump_type.key());
    println!("  Events:");
    for event in &result.events {
        println!(
            "    {:<16} frame {:>4}  (precise {:.2}, quality {:.2})",
            event.kind.key(),
            event.frame,
            event.frame_precise,
            event.quality
        );
    }
    println!("  Metrics:");
    for (name, outcome) in &result.metrics {
        if name.ends_with("_frame") || name.ends_with("_frame_precise") {
            continue;
        }
        match outcome {
            MetricOutcome::Value(value) => println!("    {:<30} {:.3}", name, value),
            MetricOutcome::Unimplemented(reason) => {
                println!("    {:<30} (not computed: {})", name, reason)
            }
        }
    }
    println!("  Validation: {:?}", result.validation.status);
    for issue in &result.validation.issues {
        println!("    [{:?}] {}", issue.severity, issue.message);
    }
    println!(
        "  Tracking quality {:.2}, processed in {:.2} ms",
        result.metadata.tracking_quality, result.metadata.processing_time_ms
    );

    Ok(())
}
