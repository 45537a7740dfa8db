use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const JOBS: [&str; 8] = [
    "admin.",
    "blue-collar",
    "technician",
    "services",
    "management",
    "retired",
    "entrepreneur",
    "student",
];
const MARITAL: [&str; 3] = ["married", "single", "divorced"];
const FLAGS: [&str; 3] = ["no", "yes", "unknown"];
const CONTACT: [&str; 2] = ["cellular", "telephone"];
const MONTHS: [&str; 10] = ["mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];
const DAYS: [&str; 5] = ["mon", "tue", "wed", "thu", "fri"];

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Weighted towards the first item, the way "no" dominates the flags.
    fn pick_skewed<'a>(&mut self, items: &[&'a str], first_share: f64) -> &'a str {
        if self.next_f64() < first_share {
            items[0]
        } else {
            self.pick(&items[1..])
        }
    }
}

/// One synthetic campaign contact; every field is a column.
struct Contact {
    age: i64,
    fields: [&'static str; 8],
    y: &'static str,
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Contact> {
    (0..n)
        .map(|_| {
            let age = 18 + (rng.next_f64() * rng.next_f64() * 70.0) as i64;
            let job = if age >= 62 { "retired" } else { rng.pick(&JOBS) };
            let fields = [
                job,
                rng.pick(&MARITAL),
                rng.pick_skewed(&FLAGS, 0.8),
                rng.pick_skewed(&FLAGS, 0.5),
                rng.pick_skewed(&FLAGS, 0.8),
                rng.pick(&CONTACT),
                rng.pick(&MONTHS),
                rng.pick(&DAYS),
            ];
            // Older and student contacts subscribe more often.
            let p_yes = if age >= 60 || job == "student" { 0.35 } else { 0.1 };
            let y = if rng.next_f64() < p_yes { "yes" } else { "no" };
            Contact { age, fields, y }
        })
        .collect()
}

const COLUMNS: [&str; 10] = [
    "age",
    "job",
    "marital",
    "default",
    "housing",
    "loan",
    "contact",
    "month",
    "day_of_week",
    "y",
];

fn write_csv(path: &str, contacts: &[Contact]) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
    writer.write_record(COLUMNS)?;
    for c in contacts {
        let age = c.age.to_string();
        let mut record = vec![age.as_str()];
        record.extend(c.fields);
        record.push(c.y);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, contacts: &[Contact]) -> Result<(), Box<dyn std::error::Error>> {
    let mut fields = vec![Field::new("age", DataType::Int64, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(Int64Array::from_iter_values(
        contacts.iter().map(|c| c.age),
    ))];
    for (i, name) in COLUMNS[1..9].iter().enumerate() {
        fields.push(Field::new(*name, DataType::Utf8, false));
        arrays.push(Arc::new(StringArray::from_iter_values(
            contacts.iter().map(|c| c.fields[i]),
        )));
    }
    fields.push(Field::new("y", DataType::Utf8, false));
    arrays.push(Arc::new(StringArray::from_iter_values(
        contacts.iter().map(|c| c.y),
    )));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SimpleRng::new(42);
    let contacts = generate(&mut rng, 2000);

    write_csv("sample_bank.csv", &contacts)?;
    write_parquet("sample_bank.parquet", &contacts)?;

    let yes = contacts.iter().filter(|c| c.y == "yes").count();
    println!(
        "Wrote {} contacts ({yes} subscribed) to sample_bank.csv and sample_bank.parquet",
        contacts.len()
    );
    Ok(())
}
