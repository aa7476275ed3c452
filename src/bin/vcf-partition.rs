//! vcf-partition CLI
//!
//! Prints one region per line for an indexed VCF/BCF file, ready for
//! `bcftools view -r` or `tabix`. Prints nothing (and logs why) when the file
//! is too small to split.
//!
//! # Usage
//!
//! ```bash
//! # Eight roughly equal parts, index found next to the file
//! vcf-partition --num-parts 8 variants.vcf.gz
//!
//! # Parts of about 64 MiB compressed, explicit index
//! vcf-partition --target-part-size 67108864 --index variants.bcf.csi variants.bcf
//!
//! # Fan out
//! vcf-partition -n 8 variants.vcf.gz | xargs -P 8 -I{} bcftools view -r {} variants.vcf.gz
//! ```

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use vcf_partition::partition_into_regions;

#[derive(Parser, Debug)]
#[command(version, about = "Split an indexed VCF/BCF file into roughly equal regions")]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["num_parts", "target_part_size"]),
))]
struct Args {
    /// BGZF-compressed VCF or BCF file
    input: PathBuf,

    /// Index file (.tbi or .csi); defaults to <INPUT>.tbi, then <INPUT>.csi
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Desired number of parts
    #[arg(short, long)]
    num_parts: Option<u64>,

    /// Desired compressed size of each part, in bytes
    #[arg(short, long)]
    target_part_size: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let regions = partition_into_regions(
        &args.input,
        args.index.as_deref(),
        args.num_parts,
        args.target_part_size,
    )
    .with_context(|| format!("Failed to partition {}", args.input.display()))?;

    match regions {
        Some(regions) => {
            info!("{} regions", regions.len());
            for region in regions {
                println!("{}", region);
            }
        }
        None => info!("{} does not need partitioning", args.input.display()),
    }

    Ok(())
}
