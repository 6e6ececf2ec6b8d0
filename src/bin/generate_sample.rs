use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

/// One compound as measured in one comparison.
struct Measurement {
    fold_change: f64,
    p_value: f64,
}

/// Latent per-compound effect plus comparison-specific noise. About one in
/// ten compounds is missing from a given comparison.
fn measure(effect: f64, noise: f64, rng: &mut SimpleRng) -> Option<Measurement> {
    if rng.next_f64() < 0.1 {
        return None;
    }
    let fold_change = rng.gauss(effect, noise);
    // Crude two-sided tail of a unit-variance statistic.
    let z = fold_change / 0.4;
    let p_value = (-0.5 * z * z).exp().clamp(1e-12, 1.0);
    Some(Measurement {
        fold_change,
        p_value,
    })
}

const N_COMPOUNDS: usize = 200;

fn main() {
    let mut rng = SimpleRng::new(42);

    let ids: Vec<String> = (0..N_COMPOUNDS).map(|i| format!("C{:04}", i + 1)).collect();
    let names: Vec<Option<String>> = (0..N_COMPOUNDS)
        .map(|i| (i % 4 != 0).then(|| format!("Compound {}", i + 1)))
        .collect();
    let masses: Vec<f64> = (0..N_COMPOUNDS)
        .map(|_| 100.0 + rng.next_f64() * 700.0)
        .collect();
    let effects: Vec<f64> = (0..N_COMPOUNDS)
        .map(|_| {
            if rng.next_f64() < 0.15 {
                rng.gauss(0.0, 2.5)
            } else {
                rng.gauss(0.0, 0.3)
            }
        })
        .collect();
    let checked: Vec<bool> = effects
        .iter()
        .map(|e| e.abs() > 0.3 || rng.next_f64() < 0.3)
        .collect();

    let comparisons = ["(a) / (ctrl)", "(b) / (ctrl)", "(c) / (ctrl)"];
    let measurements: Vec<Vec<Option<Measurement>>> = comparisons
        .iter()
        .enumerate()
        .map(|(c, _)| {
            let noise = 0.2 + 0.1 * c as f64;
            effects.iter().map(|&e| measure(e, noise, &mut rng)).collect()
        })
        .collect();

    // ---- Comparisons a and b share one Parquet file ----
    let mut fields = vec![
        Field::new("Compounds ID", DataType::Utf8, false),
        Field::new("Name", DataType::Utf8, true),
        Field::new("Calc. MW", DataType::Float64, false),
        Field::new("Checked", DataType::Boolean, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(ids.iter().map(|s| s.as_str()).collect::<Vec<_>>())),
        Arc::new(StringArray::from(names.iter().map(|s| s.as_deref()).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(masses.clone())),
        Arc::new(BooleanArray::from(checked.clone())),
    ];
    for (label, rows) in comparisons.iter().zip(&measurements).take(2) {
        fields.push(Field::new(format!("Log2 Fold Change: {label}"), DataType::Float64, true));
        fields.push(Field::new(format!("P-value: {label}"), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|m| m.as_ref().map(|m| m.fold_change)).collect::<Vec<_>>(),
        )));
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|m| m.as_ref().map(|m| m.p_value)).collect::<Vec<_>>(),
        )));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let parquet_path = "sample_ab_ctrl.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // ---- Comparison c goes to CSV ----
    let csv_path = "sample_c_ctrl.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    let label = comparisons[2];
    csv_writer
        .write_record([
            "Compounds ID".to_string(),
            "Name".to_string(),
            "Calc. MW".to_string(),
            "Checked".to_string(),
            format!("Log2 Fold Change: {label}"),
            format!("P-value: {label}"),
        ])
        .expect("Failed to write CSV header");
    for (i, m) in measurements[2].iter().enumerate() {
        let Some(m) = m else { continue };
        csv_writer
            .write_record([
                ids[i].clone(),
                names[i].clone().unwrap_or_default(),
                format!("{:.5}", masses[i]),
                if checked[i] { "True" } else { "False" }.to_string(),
                format!("{:.6}", m.fold_change),
                format!("{:.6e}", m.p_value),
            ])
            .expect("Failed to write CSV row");
    }
    csv_writer.flush().expect("Failed to flush CSV");

    println!(
        "Wrote {N_COMPOUNDS} compounds: comparisons {} and {} to {parquet_path}, {} to {csv_path}",
        comparisons[0], comparisons[1], comparisons[2]
    );
}
