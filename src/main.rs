mod opt;

use jigsaw_ga::img::{self, Bitmap};
use jigsaw_ga::{solve, Error, Params};
use opt::Options;
use std::time::{SystemTime, UNIX_EPOCH};
use structopt::StructOpt;

fn main() {
    env_logger::init();

    let name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown");
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown");
    println!("{} v{}", name, version);

    let args = Options::from_args();
    if args.debug {
        println!("{:?}", args);
    }

    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Options) -> Result<(), Error> {
    let image = Bitmap::load(&args.input)?;
    let tiles = img::split(&image, args.piece_size)?;
    let rows = image.height / args.piece_size;
    let columns = image.width / args.piece_size;

    let params = Params {
        population_size: args.population,
        elite_size: args.elite,
        generations: args.generations,
        seed: args.seed.unwrap_or_else(clock_seed),
    };
    let pieces = solve(&tiles, rows, columns, &params)?;

    let answer = img::merge(&tiles, &pieces, rows, columns)?;
    answer.save(&args.output)?;
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
