//! Sample flow creation and bulk start/stop

use anyhow::{bail, Context, Result};
use clap::Args;
use nf_rest_client::{FlowManager, NifiClient, ProcessorOutcome};

use crate::output::print_header;

/// Arguments for the create-flow command
#[derive(Args, Debug, Default)]
pub struct CreateFlowArgs {
    /// Process group to create the flow in (default: root)
    #[arg(long = "process-group", value_name = "ID")]
    pub process_group: Option<String>,
}

impl CreateFlowArgs {
    pub async fn run(self, client: &NifiClient) -> Result<()> {
        print_header("Create Sample Flow");

        let mut flow = FlowManager::new(client);
        let sample = flow
            .create_sample_flow(self.process_group.as_deref())
            .await
            .context("Failed to create flow")?;

        println!("Flow created successfully!");
        println!();
        println!("Component IDs:");
        println!("  GenerateFlowFile: {}", sample.generate_id);
        println!("  LogAttribute:     {}", sample.log_id);
        println!("  Connection:       {}", sample.connection_id);
        println!();
        println!("Next steps:");
        println!("  • View in UI: {}", client.ui_url());
        println!("  • Start flow: nifi-cli start-flow");
        Ok(())
    }
}

/// Arguments shared by start-flow and stop-flow
#[derive(Args, Debug, Default)]
pub struct RunFlowArgs {
    /// Process group whose processors are affected (default: root)
    #[arg(long = "process-group", value_name = "ID")]
    pub process_group: Option<String>,
}

impl RunFlowArgs {
    async fn track<'a>(&self, client: &'a NifiClient) -> Result<FlowManager<'a>> {
        let mut flow = FlowManager::new(client);
        let count = flow
            .track_processors_in_group(self.process_group.as_deref())
            .await
            .context("Failed to list processors")?;

        if count == 0 {
            bail!("No processors found. Create a flow first: nifi-cli create-flow");
        }

        println!("Found {} processors", count);
        println!();
        Ok(flow)
    }

    pub async fn start(self, client: &NifiClient) -> Result<()> {
        print_header("Start Flow");

        let flow = self.track(client).await?;
        let summary = flow.start_all_processors().await;

        for outcome in &summary.outcomes {
            match outcome {
                ProcessorOutcome::Changed(processor) => println!("  ✓ Started: {}", processor.name),
                ProcessorOutcome::Unchanged(processor) => {
                    println!("  ⚠ Already running: {}", processor.name)
                }
                ProcessorOutcome::Failed(failure) => {
                    println!("  ✗ Failed to start {}: {}", failure.id, failure.error)
                }
            }
        }

        println!();
        println!("Summary: {}", summary);
        if summary.failed().is_empty() {
            println!();
            println!("Flow is now running!");
        }
        Ok(())
    }

    pub async fn stop(self, client: &NifiClient) -> Result<()> {
        print_header("Stop Flow");

        let flow = self.track(client).await?;
        let summary = flow.stop_all_processors().await;

        for outcome in &summary.outcomes {
            match outcome {
                ProcessorOutcome::Changed(processor) => println!("  ✓ Stopped: {}", processor.name),
                ProcessorOutcome::Unchanged(processor) => {
                    println!("  ⚠ Already stopped: {}", processor.name)
                }
                ProcessorOutcome::Failed(failure) => {
                    println!("  ✗ Failed to stop {}: {}", failure.id, failure.error)
                }
            }
        }

        println!();
        println!("Summary: {}", summary);
        Ok(())
    }
}
