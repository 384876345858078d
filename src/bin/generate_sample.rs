use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic CORD-19-like `metadata.csv` for trying out the explorer
///
/// About 2% of rows get an unparsable date and 1% no title, so the cleaning
/// pass has something to do.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Number of rows to generate
    #[arg(short, long, default_value = "500")]
    rows: usize,

    /// Random seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Output file
    #[arg(short, long, default_value = "sample_metadata.csv")]
    output: PathBuf,
}

/// Column layout of the real metadata file (subset).
#[derive(Serialize)]
struct Row {
    cord_uid: String,
    source_x: &'static str,
    title: String,
    doi: String,
    #[serde(rename = "abstract")]
    abstract_text: String,
    publish_time: String,
    authors: String,
    journal: &'static str,
    url: String,
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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Pick from `items`, earlier items being more likely (weight 1/(i+1)).
    fn skewed<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let total: f64 = (1..=items.len()).map(|i| 1.0 / i as f64).sum();
        let mut target = self.next_f64() * total;
        for (i, item) in items.iter().enumerate() {
            target -= 1.0 / (i + 1) as f64;
            if target <= 0.0 {
                return item;
            }
        }
        &items[items.len() - 1]
    }
}

const SOURCES: [&str; 6] = ["PMC", "Medline", "WHO", "Elsevier", "medRxiv", "bioRxiv"];
const JOURNALS: [&str; 12] = [
    "PLoS One",
    "bioRxiv",
    "BMJ",
    "Sci Rep",
    "Nature",
    "Lancet",
    "Science",
    "J Virol",
    "Viruses",
    "Cell",
    "Emerg Infect Dis",
    "",
];
const TOPICS: [&str; 14] = [
    "SARS-CoV-2",
    "COVID-19",
    "coronavirus",
    "spike protein",
    "vaccine",
    "transmission",
    "mortality",
    "ACE2 receptor",
    "antibody response",
    "clinical outcomes",
    "lockdown",
    "mental health",
    "respiratory infection",
    "viral replication",
];
const FRAMES: [&str; 6] = [
    "A study of {}",
    "{} in hospitalized patients",
    "Modelling {} during the pandemic",
    "Review: {} and {}",
    "Early evidence on {}",
    "{} among healthcare workers",
];
/// Skewed towards the pandemic years, with a tail back to SARS (2003).
const YEARS: [i32; 11] = [2020, 2021, 2022, 2019, 2018, 2017, 2016, 2015, 2012, 2009, 2003];
const SURNAMES: [&str; 8] = [
    "Wang", "Smith", "Zhang", "Garcia", "Müller", "Rossi", "Kim", "Singh",
];

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    for i in 0..args.rows {
        let frame = FRAMES[rng.below(FRAMES.len())];
        let mut title = frame.to_string();
        while title.contains("{}") {
            let topic = *rng.skewed(&TOPICS);
            title = title.replacen("{}", topic, 1);
        }
        if rng.below(100) == 0 {
            title.clear();
        }

        let year = *rng.skewed(&YEARS);
        let publish_time = match rng.below(50) {
            0 => "unknown".to_string(),
            1..=5 => format!("{year}"),
            6..=8 => format!("{year} Mar"),
            _ => format!("{year}-{:02}-{:02}", 1 + rng.below(12), 1 + rng.below(28)),
        };

        let abstract_words = rng.below(300);
        let abstract_text = (0..abstract_words)
            .map(|_| TOPICS[rng.below(TOPICS.len())])
            .collect::<Vec<_>>()
            .join(" ");
        let authors = (0..1 + rng.below(4))
            .map(|_| {
                let surname = SURNAMES[rng.below(SURNAMES.len())];
                let initial = (b'A' + rng.below(26) as u8) as char;
                format!("{surname}, {initial}.")
            })
            .collect::<Vec<_>>()
            .join("; ");

        writer.serialize(Row {
            cord_uid: format!("{:08x}", rng.next_u64() as u32),
            source_x: *rng.skewed(&SOURCES),
            title,
            doi: format!("10.1000/sample.{i}"),
            abstract_text,
            publish_time,
            authors,
            journal: *rng.skewed(&JOURNALS),
            url: String::new(),
        })?;
    }
    writer.flush()?;

    log::info!("Wrote {} rows to {}", args.rows, args.output.display());
    println!("Wrote {} papers to {}", args.rows, args.output.display());
    Ok(())
}
