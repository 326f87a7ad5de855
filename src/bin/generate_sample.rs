use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{Duration, NaiveDate};

const PREAMBLE_LINES: usize = 26;
/// 0 m to 1000 m in 50 m steps.
const LEVELS: usize = 21;
const SCAN_INTERVAL_MIN: i64 = 5;

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

/// Air temperature at `altitude_m` and `hour` (fractional): a diurnal cycle
/// at the surface, a standard lapse rate aloft and a morning inversion below
/// 300 m.
fn temperature(altitude_m: f64, hour: f64, day_offset: f64) -> f64 {
    let surface = 18.0 + day_offset + 6.0 * ((hour - 9.0) / 24.0 * 2.0 * std::f64::consts::PI).sin();
    let lapse = -0.0065 * altitude_m;
    let inversion = if hour < 9.0 {
        let strength = (9.0 - hour) / 9.0 * 4.0;
        strength * (altitude_m / 300.0).min(1.0) * (1.0 - (altitude_m - 300.0).max(0.0) / 700.0)
    } else {
        0.0
    };
    surface + lapse + inversion
}

fn decimal_comma(v: f64) -> String {
    format!("{v:.2}").replace('.', ",")
}

fn write_day(path: &Path, date: NaiveDate, day_offset: f64, rng: &mut SimpleRng) -> std::io::Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "MTP-5 temperature profile")?;
    writeln!(out, "Date\t{}", date.format("%d/%m/%Y"))?;
    for i in 2..PREAMBLE_LINES {
        writeln!(out, "Header\t{i}\tSynthetic data")?;
    }

    let start = date.and_hms_opt(0, 0, 0).expect("midnight is valid");
    let scans = (24 * 60 / SCAN_INTERVAL_MIN) as usize;
    for k in 0..scans {
        let ts = start + Duration::minutes(k as i64 * SCAN_INTERVAL_MIN);
        let hour = k as f64 * SCAN_INTERVAL_MIN as f64 / 60.0;
        let temps: Vec<String> = (0..LEVELS)
            .map(|level| {
                let altitude = level as f64 * 50.0;
                decimal_comma(temperature(altitude, hour, day_offset) + rng.gauss(0.0, 0.05))
            })
            .collect();
        writeln!(out, "{}\t{}", ts.format("%d/%m/%Y %H:%M:%S"), temps.join("\t"))?;
    }
    // Real exports often end with a truncated record.
    writeln!(out, "end of data")?;
    out.flush()?;
    Ok(scans)
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let output_dir = Path::new("sample_data");
    std::fs::create_dir_all(output_dir).expect("Failed to create output directory");

    let first = NaiveDate::from_ymd_opt(2019, 6, 1).expect("valid date");
    for day in 0..3 {
        let date = first + Duration::days(day);
        let path = output_dir.join(format!("TPR_{}.txt", date.format("%Y%m%d")));
        let scans = write_day(&path, date, day as f64 * 1.5, &mut rng)
            .expect("Failed to write sample file");
        println!("Wrote {scans} scans x {LEVELS} levels to {}", path.display());
    }
}
