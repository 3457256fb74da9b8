/// Options
use std::path::PathBuf;
use structopt::StructOpt;

/// Command line interface
#[derive(Debug, StructOpt)]
#[structopt(name = "jigsaw-ga", about = "Genetic jigsaw puzzle reconstruction")]
pub struct Options {
    /// Shuffled input image
    #[structopt(parse(from_os_str))]
    pub input: PathBuf,

    /// Where to write the reconstructed image
    #[structopt(
        short = "o",
        long = "output",
        default_value = "reconstructed.png",
        parse(from_os_str)
    )]
    pub output: PathBuf,

    /// Tile side length in pixels
    #[structopt(short = "s", long = "piece-size", default_value = "64")]
    pub piece_size: usize,

    /// Population size
    #[structopt(short = "p", long = "population", default_value = "100")]
    pub population: usize,

    /// Number of elite individuals copied unchanged into each generation
    #[structopt(short = "e", long = "elite", default_value = "4")]
    pub elite: usize,

    /// Number of generations to evolve
    #[structopt(short = "g", long = "generations", default_value = "20")]
    pub generations: usize,

    /// RNG seed (derived from the clock when absent)
    #[structopt(long = "seed")]
    pub seed: Option<u64>,

    /// Activate debug mode
    #[structopt(short, long)]
    pub debug: bool,
}
