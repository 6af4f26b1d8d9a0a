//! `fixpoint run` - drive a queued workspace through the repair loop.

use anyhow::{bail, Context, Result};

use crate::domain::models::Config;
use crate::infrastructure::Pipeline;

pub async fn execute(
    config: Config,
    workspace: String,
    max_iters: Option<u32>,
    json: bool,
) -> Result<()> {
    let pipeline = Pipeline::from_config(config).context("Failed to build pipeline")?;

    let job = pipeline
        .jobs
        .load(&workspace)
        .await
        .context("Failed to load job")?;
    let Some(mut job) = job else {
        bail!("unknown workspace '{workspace}'");
    };
    if let Some(n) = max_iters {
        if n == 0 {
            bail!("max_iters must be at least 1");
        }
        job.max_iters = n;
    }
    if job.is_terminal() {
        bail!(
            "workspace '{workspace}' already finished with status '{}'",
            job.status.as_str()
        );
    }

    let result = pipeline
        .repair
        .run(job)
        .await
        .context("Repair pipeline failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.dynamic);
        println!();
        if result.repair.success {
            println!("Repair succeeded after {} iteration(s)", result.repair.iterations_run);
        } else {
            println!(
                "Repair did not converge ({} iteration(s), {} patch(es) applied)",
                result.repair.iterations_run, result.repair.patches_applied
            );
        }
    }
    Ok(())
}
