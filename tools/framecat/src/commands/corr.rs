use anyhow::Result;
use clap::Args;
use rowframe::Session;

use crate::source::SourceArgs;

#[derive(Args)]
pub struct CorrArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// First numeric column
    a: String,

    /// Second numeric column
    b: String,
}

impl CorrArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::new();
        let relation = self.source.open(&session)?;
        match relation.corr(&self.a, &self.b)? {
            Some(r) => println!("{r}"),
            None => println!("null"),
        }
        Ok(())
    }
}
