use anyhow::{Context, Result};

const OUTPUT_PATH: &str = "Mall_Customers.csv";
const CUSTOMERS: usize = 200;

/// Income band (k$) and the spending-score centre of each customer segment.
const SEGMENTS: [(f64, f64, f64); 5] = [
    (15.0, 40.0, 20.0),
    (15.0, 40.0, 80.0),
    (40.0, 70.0, 50.0),
    (70.0, 137.0, 17.0),
    (70.0, 137.0, 82.0),
];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Customer {
    gender: &'static str,
    age: i64,
    income: i64,
    score: i64,
}

fn generate_customer(rng: &mut SimpleRng) -> Customer {
    let (income_lo, income_hi, score_centre) = SEGMENTS[(rng.next_u64() % SEGMENTS.len() as u64) as usize];
    let gender = if rng.next_f64() < 0.44 { "Male" } else { "Female" };

    // High spenders skew younger.
    let age_centre = if score_centre > 60.0 { 30.0 } else { 45.0 };
    let age = rng.gauss(age_centre, 10.0).clamp(18.0, 70.0);

    Customer {
        gender,
        age: age.round() as i64,
        income: rng.uniform(income_lo, income_hi).round() as i64,
        score: rng.gauss(score_centre, 9.0).clamp(1.0, 99.0).round() as i64,
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut customers: Vec<Customer> = (0..CUSTOMERS).map(|_| generate_customer(&mut rng)).collect();
    customers.sort_by_key(|c| c.income);

    let mut writer = csv::Writer::from_path(OUTPUT_PATH)
        .with_context(|| format!("Failed to create {OUTPUT_PATH}"))?;
    writer.write_record([
        "CustomerID",
        "Gender",
        "Age",
        "Annual Income (k$)",
        "Spending Score (1-100)",
    ])?;
    for (id, c) in customers.iter().enumerate() {
        writer.write_record([
            (id + 1).to_string(),
            c.gender.to_string(),
            c.age.to_string(),
            c.income.to_string(),
            c.score.to_string(),
        ])?;
    }
    writer.flush().context("Failed to flush CSV writer")?;

    println!("Wrote {CUSTOMERS} customers to {OUTPUT_PATH}");
    Ok(())
}
