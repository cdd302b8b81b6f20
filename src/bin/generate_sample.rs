//! Write `sample_data.parquet`: a small synthetic measurement table with
//! numeric, signed, missing and categorical columns for trying out `colmeans`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        // splitmix64 expansion of the seed
        let mut x = seed;
        let mut state = [0u64; 4];
        for slot in &mut state {
            x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = x;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            *slot = z ^ (z >> 31);
        }
        SimpleRng { state }
    }

    fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = s[1] << 17;
        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);
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

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let samples = [("Sample_A", 0.8), ("Sample_B", 1.4), ("Sample_C", 2.1)];
    let concentrations = [0.1, 0.5, 1.0, 2.0, 5.0];
    let operators = ["Alice", "Bob"];

    let mut sample_col: Vec<&str> = Vec::new();
    let mut operator_col: Vec<&str> = Vec::new();
    let mut concentration_col: Vec<f64> = Vec::new();
    let mut absorbance_col: Vec<Option<f64>> = Vec::new();
    let mut baseline_col: Vec<f64> = Vec::new();
    let mut id_col: Vec<i64> = Vec::new();

    let mut row_id: i64 = 0;
    for &(sample, response) in &samples {
        for &conc in &concentrations {
            for &operator in &operators {
                // log-normal noise keeps absorbance strictly positive
                let absorbance = response * conc * rng.gauss(0.0, 0.05).exp();
                // every 7th reading is lost
                let absorbance = (row_id % 7 != 6).then_some(absorbance);

                sample_col.push(sample);
                operator_col.push(operator);
                concentration_col.push(conc);
                absorbance_col.push(absorbance);
                baseline_col.push(rng.gauss(0.0, 0.02));
                id_col.push(row_id);
                row_id += 1;
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("sample", DataType::Utf8, false),
        Field::new("operator", DataType::Utf8, false),
        Field::new("concentration", DataType::Float64, false),
        Field::new("absorbance", DataType::Float64, true),
        Field::new("baseline", DataType::Float64, false),
        Field::new("measurement_id", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(sample_col)),
            Arc::new(StringArray::from(operator_col)),
            Arc::new(Float64Array::from(concentration_col)),
            Arc::new(Float64Array::from(absorbance_col)),
            Arc::new(Float64Array::from(baseline_col)),
            Arc::new(Int64Array::from(id_col)),
        ],
    )
    .context("building record batch")?;

    let output_path = "sample_data.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    log::info!("wrote {row_id} rows to {output_path}");
    println!("Wrote {row_id} measurements to {output_path}");
    Ok(())
}
