use crate::dataset;
use crate::rows::OrderMode;
use crate::schema::Schema;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Instant;

pub fn run(
    schema: PathBuf,
    data_dir: PathBuf,
    rows: u64,
    seed: u64,
    progress: bool,
) -> anyhow::Result<()> {
    let schema = Schema::load(&schema)?;
    if schema.tables.is_empty() {
        anyhow::bail!("schema declares no tables");
    }
    std::fs::create_dir_all(&data_dir)?;

    let pb = if progress {
        let pb = ProgressBar::new(schema.tables.len() as u64 * 2);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap()
            .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start_time = Instant::now();

    // One seeded source for the whole phase, consumed in a fixed order:
    // tables in declaration order, sequential dataset before random.
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut written = 0usize;
    for table in &schema.tables {
        for mode in OrderMode::BOTH {
            if let Some(pb) = &pb {
                pb.set_message(dataset::file_name(&table.name, mode));
            }
            dataset::write_table(&data_dir, table, mode, rows, &mut rng)?;
            written += 1;
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    println!(
        "Wrote {} dataset files ({} rows each) to {} in {:.2}s",
        written,
        rows,
        data_dir.display(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
