use anyhow::Result;
use clap::Args;
use rowframe::Session;

use crate::source::SourceArgs;

#[derive(Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Column to describe (repeatable; all columns if not specified)
    #[arg(short, long = "column")]
    columns: Vec<String>,
}

impl DescribeArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::new();
        let relation = self.source.open(&session)?;
        let summary = if self.columns.is_empty() {
            relation.describe()?
        } else {
            let names: Vec<&str> = self.columns.iter().map(String::as_str).collect();
            relation.describe_columns(&names)?
        };
        summary.to_relation()?.show(5, false)?;
        Ok(())
    }
}
