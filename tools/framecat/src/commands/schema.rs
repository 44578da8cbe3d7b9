use anyhow::Result;
use clap::Args;
use rowframe::Session;

use crate::source::SourceArgs;

#[derive(Args)]
pub struct SchemaArgs {
    #[command(flatten)]
    source: SourceArgs,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::new();
        self.source.open(&session)?.print_schema();
        Ok(())
    }
}
