//! Processor listing

use anyhow::{Context, Result};
use clap::Args;
use nf_rest_client::{NifiClient, ProcessorManager};

use crate::output::{print_header, state_icon};

/// Arguments for the list command
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Process group to list (default: root)
    #[arg(long = "process-group", value_name = "ID")]
    pub process_group: Option<String>,
}

impl ListArgs {
    pub async fn run(self, client: &NifiClient) -> Result<()> {
        print_header("List Processors");

        let processors = ProcessorManager::new(client)
            .list_all(self.process_group.as_deref())
            .await
            .context("Failed to list processors")?;

        if processors.is_empty() {
            println!("No processors found");
            return Ok(());
        }

        println!("Found {} processors:", processors.len());
        println!();

        for processor in &processors {
            let state = processor.state();
            println!("  {} {}", state_icon(state), processor.name());
            println!("    Type:  {}", processor.component.short_type());
            println!("    ID:    {}", processor.id);
            println!("    State: {}", state);
            println!();
        }

        Ok(())
    }
}
