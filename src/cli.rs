//! Command line argument parser
use clap::Parser;

use crate::errors::{PermError, Result};
use crate::permutations::PermConfig;

#[derive(Parser)]
#[command(version)]
/// Intersect every subset of a group of bed files and test the overlaps by permutation
pub struct ArgParser {
    /// file listing bed files to compare, one path per line (chrom\tstart\tend)
    #[arg(short, long)]
    pub beds: std::path::PathBuf,

    /// chromosome extents (chrom\tlength or chrom\tstart\tend)
    #[arg(short, long)]
    pub genome: std::path::PathBuf,

    /// bed file of genome regions to mask (chrom\tstart\tend)
    #[arg(long)]
    pub mask: Option<std::path::PathBuf>,

    /// number of permutations to perform (0 skips permutation testing)
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub iterations: i64,

    /// random seed for permutations
    #[arg(short = 'r', long, default_value_t = 0)]
    pub seed: u64,

    /// maximum number of beds per combination (negative for no limit)
    #[arg(short, long = "max-comps", default_value_t = -1, allow_negative_numbers = true)]
    pub max_comps: i64,

    /// comma-separated 0-based indices of beds to permute (default all)
    #[arg(short, long, value_delimiter = ',')]
    pub permute: Vec<usize>,

    /// number of threads to use
    #[arg(short, long, default_value_t = 1)]
    pub threads: u8,

    /// output file (default stdout)
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,

    /// write a json summary of the permutations
    #[arg(long)]
    pub json: Option<std::path::PathBuf>,

    /// print much more information while running
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ArgParser {
    /// Validate command line arguments
    pub fn validate(&self) -> bool {
        let mut is_ok = true;
        if !self.beds.is_file() {
            error!("--beds file doesn't exist");
            is_ok = false;
        }
        if !self.genome.is_file() {
            error!("--genome file doesn't exist");
            is_ok = false;
        }

        if let Some(m) = &self.mask {
            if !m.is_file() {
                error!("--mask file doesn't exist");
                is_ok = false;
            }
        }

        if self.threads < 1 {
            warn!("need at least 1 thread");
            is_ok = false;
        }

        if self.json.is_some() && self.iterations <= 0 {
            warn!("--json summary needs --iterations > 0 and won't be written");
        }

        if (self.iterations > 0) & (self.iterations < 100) {
            warn!(
                "minimum non-zero p-value with {} permutations is {}.",
                self.iterations,
                1.0 / (self.iterations as f32)
            );
        }

        is_ok
    }

    /// Permutation settings for `num_sets` input beds
    pub fn perm_config(&self, num_sets: usize) -> Result<PermConfig> {
        if let Some(bad) = self.permute.iter().find(|i| **i >= num_sets) {
            return Err(PermError::Config(format!(
                "--permute index {} out of range for {} beds",
                bad, num_sets
            )));
        }
        let iterations = u32::try_from(self.iterations.max(0)).map_err(|_| {
            PermError::Config(format!("too many iterations: {}", self.iterations))
        })?;
        Ok(PermConfig {
            iterations,
            seed: self.seed,
            max_comps: self.max_comps,
            to_permute: self.permute.clone(),
            threads: self.threads as usize,
        })
    }
}
