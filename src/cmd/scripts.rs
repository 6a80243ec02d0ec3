use crate::scenario::{scenario_matrix, ScenarioDriver, Sizes};
use crate::schema::Schema;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Instant;

pub fn run(
    schema: PathBuf,
    data_dir: PathBuf,
    script_dir: PathBuf,
    output_dir: PathBuf,
    seed: u64,
    progress: bool,
) -> anyhow::Result<()> {
    let schema = Schema::load(&schema)?;
    if !data_dir.is_dir() {
        anyhow::bail!(
            "dataset directory does not exist: {} (run the dataset command first)",
            data_dir.display()
        );
    }
    std::fs::create_dir_all(&script_dir)?;
    std::fs::create_dir_all(&output_dir)?;

    let specs = scenario_matrix(Sizes::default());
    let pb = if progress {
        let pb = ProgressBar::new(specs.len() as u64);
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

    // The script phase re-seeds from scratch, so it is reproducible on its
    // own; scenarios consume the source in matrix order.
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut driver = ScenarioDriver::new(&schema, &data_dir, &script_dir, &output_dir, &mut rng);
    let mut pairs = 0usize;
    for spec in &specs {
        if let Some(pb) = &pb {
            pb.set_message(format!("{}_{}", spec.name, spec.order.suffix()));
        }
        driver.run_scenario(spec)?;
        pairs += 1;
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    println!(
        "Wrote {} script/oracle pairs to {} and {} in {:.2}s",
        pairs,
        script_dir.display(),
        output_dir.display(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
