use anyhow::Result;
use clap::Args;
use rowframe::Session;

use crate::source::SourceArgs;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Projection such as `upper(name) AS up` (repeatable)
    #[arg(long = "select")]
    select: Vec<String>,

    /// Row predicate such as `count > 3000` (repeatable, combined with AND)
    #[arg(long = "where")]
    predicates: Vec<String>,

    /// Number of rows to print
    #[arg(short = 'n', long, default_value_t = 20)]
    rows: usize,

    /// Print long cells in full
    #[arg(long)]
    no_truncate: bool,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let session = Session::new();
        let mut relation = self.source.open(&session)?;
        for predicate in &self.predicates {
            relation = relation.where_expr(predicate)?;
        }
        if !self.select.is_empty() {
            let exprs: Vec<&str> = self.select.iter().map(String::as_str).collect();
            relation = relation.select_expr(&exprs)?;
        }
        relation.show(self.rows, !self.no_truncate)?;
        Ok(())
    }
}
