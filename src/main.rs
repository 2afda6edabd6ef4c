use std::path::Path;
use std::time::Instant;

use clap::Parser;
use log::info;
use mlpart::algorithms::{MultiLevelPartitioner, RecursiveBisection};
use mlpart::generators::random_weights;
use mlpart::io::read_matrix_market_as_graph;
use mlpart::PartitionParams;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the .mtx file
    mtx_filepath: String,

    /// Number of Partitions
    num_of_partitions: usize,

    /// Imbalance tolerance, 0.015 allows 1.5% above the target part weight
    tolerance: f64,

    /// Seed of the random source
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of FM passes per level
    #[arg(short, long, default_value_t = 25)]
    passes: usize,

    /// Stop coarsening once a graph has at most this many vertices
    #[arg(short, long, default_value_t = 100)]
    coarsest_size: usize,

    /// Draw vertex weights uniformly from MIN..=MAX instead of unit weights
    #[arg(short, long, num_args = 2, value_names = ["MIN", "MAX"])]
    random_weights: Option<Vec<i64>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut graph = read_matrix_market_as_graph(Path::new(&args.mtx_filepath))?;
    info!("loaded {} vertices, {} edges", graph.len(), graph.num_edges() / 2);

    if let Some(bounds) = &args.random_weights {
        let mut rng = match args.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let weights = random_weights(graph.len(), bounds[0], bounds[1], &mut rng)?;
        graph = graph.with_vertex_weights(weights)?;
    }

    let params = PartitionParams::new(args.num_of_partitions, args.tolerance)?;
    let partitioner = RecursiveBisection {
        multilevel: MultiLevelPartitioner {
            seed: args.seed,
            max_passes: args.passes,
            coarsest_size: args.coarsest_size,
            ..Default::default()
        },
    };

    let start = Instant::now();
    let partitioning = partitioner.partition_graph(&graph, &params)?;
    let elapsed_time = start.elapsed();

    println!("Edge cut {:?}", partitioning.cut_weight());
    println!("Imbalance {:?}", partitioning.imbalance(&params));
    println!("Execution time {:?}", elapsed_time);
    Ok(())
}
