use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use flicker_core::repository::{DatasetFilter, ImageRepository, LocalRepository, Session};

#[derive(Args)]
pub struct DatasetsArgs {
    /// Repository root directory
    pub root: PathBuf,

    /// Only list datasets owned by this user id
    #[arg(long)]
    pub owner: Option<i64>,

    /// Dataset name to leave out (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
}

pub fn run(args: &DatasetsArgs) -> Result<()> {
    let filter = DatasetFilter {
        owner: args.owner,
        exclude: args.exclude.clone(),
    };

    let mut repo = LocalRepository::new(&args.root);
    let session = Session::open(&mut repo)?;
    let datasets = session.list_datasets(&filter)?;

    println!("{:>8}  {:<32}  {:>6}  {:>7}", "ID", "Name", "Owner", "Images");
    println!("{}", "-".repeat(59));
    for ds in &datasets {
        let images = session.list_images(ds.id)?.len();
        let owner = ds.owner.map_or_else(|| "-".to_string(), |o| o.to_string());
        println!("{:>8}  {:<32}  {:>6}  {:>7}", ds.id, ds.name, owner, images);
    }
    println!("\n{} dataset(s)", datasets.len());

    Ok(())
}
