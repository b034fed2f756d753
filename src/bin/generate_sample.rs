use std::error::Error;
use std::fs::File;

use csv::{Writer, WriterBuilder};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_row(out: &mut Writer<File>, head: [&str; 3], values: &[String]) -> csv::Result<()> {
    out.write_record(head.iter().copied().chain(values.iter().map(String::as_str)))
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut rng = SimpleRng::new(42);

    // Fibre positions: 0 m → 19.9 m, step 0.1 m
    let distances: Vec<f64> = (0..200).map(|i| i as f64 * 0.1).collect();
    let n_timestamps = 120;

    let output_path = "sample_strain.tsv";
    // Header lines, metadata rows and data rows differ in width.
    let mut out = WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(output_path)?;

    // Instrument header block.
    for i in 0..31 {
        out.write_record(["Header", format!("line {i}").as_str()])?;
    }

    write_row(&mut out, ["Channel", "1", "Gage"], &vec![String::new(); distances.len()])?;

    // Baseline reading: small fixed offsets with a couple of corrupted cells.
    let tare: Vec<String> = distances
        .iter()
        .enumerate()
        .map(|(j, _)| {
            if j % 97 == 13 {
                "---".to_string()
            } else {
                format!("{:.3}", rng.gauss(0.0, 2.0))
            }
        })
        .collect();
    write_row(&mut out, ["Tare", "", ""], &tare)?;

    let axis: Vec<String> = distances.iter().map(|d| format!("{d:.1}")).collect();
    write_row(&mut out, ["x-axis (m)", "", ""], &axis)?;

    // A strain peak that grows and drifts along the fibre over time.
    for t in 0..n_timestamps {
        let progress = t as f64 / n_timestamps as f64;
        let mu = 5.0 + 10.0 * progress;
        let amplitude = 50.0 + 400.0 * progress;
        let values: Vec<String> = distances
            .iter()
            .map(|&d| {
                let v = gaussian(d, mu, 1.2, amplitude) + rng.gauss(0.0, 3.0);
                if rng.next_f64() < 0.002 {
                    "NaN".to_string()
                } else {
                    format!("{v:.3}")
                }
            })
            .collect();
        let stamp = format!("2024-01-01 00:{:02}:{:02}", t / 60, t % 60);
        write_row(&mut out, [stamp.as_str(), "", ""], &values)?;
    }
    out.flush()?;

    let points_path = "sample_points.csv";
    // A one-cell title line precedes the header.
    let mut points = WriterBuilder::new().flexible(true).from_path(points_path)?;
    points.write_record(["Survey points"])?;
    points.write_record(["Point Number", "X Coordinate", "Y Coordinate"])?;
    for i in 0..150 {
        let angle = i as f64 / 150.0 * std::f64::consts::TAU;
        points.write_record([
            (i + 1).to_string(),
            format!("{:.3}", 10.0 * angle.cos()),
            format!("{:.3}", 6.0 * angle.sin()),
        ])?;
    }
    points.flush()?;

    println!(
        "Wrote {n_timestamps} timestamps ({} distances each) to {output_path} and 150 points to {points_path}",
        distances.len()
    );
    Ok(())
}
