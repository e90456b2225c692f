//! Synthetic data sets for testing pipelines.

use std::f64::consts::PI;

use rand::Rng;

use crate::document::Document;
use crate::error::Result;
use crate::types::DocumentOptions;

/// Build a document with `Time`, `Event_Length` and `Sim_1..=Sim_channels`.
///
/// `Time` counts events from 1. `Event_Length` is normal(50, 10). Each
/// simulated channel draws from normal(50, 10) with probability 0.2 and
/// normal(80, 20) otherwise, clamped at 0.
pub fn simulate<R: Rng + ?Sized>(events: usize, channels: usize, rng: &mut R) -> Result<Document> {
    let mut document = Document::new(DocumentOptions::default());
    document.add_parameter("Time", 0)?;
    document.add_parameter("Event_Length", 1)?;
    for channel in 1..=channels {
        document.add_parameter(&format!("Sim_{channel}"), document.par())?;
    }

    let rows = (1..=events)
        .map(|event| {
            let mut row = Vec::with_capacity(channels + 2);
            row.push(event as f32);
            row.push(normal(rng, 50.0, 10.0) as f32);
            for _ in 0..channels {
                let value = if rng.random_bool(0.2) {
                    normal(rng, 50.0, 10.0)
                } else {
                    normal(rng, 80.0, 20.0)
                };
                row.push(value.max(0.0) as f32);
            }
            row
        })
        .collect();
    document.replace_matrix(rows)?;
    Ok(document)
}

/// Box-Muller draw from normal(mean, sd).
fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    mean + sd * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
