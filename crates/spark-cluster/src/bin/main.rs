use clap::Parser;

use fluvio_future::task::run_block_on;
use spark_cluster::api::ClusterApi;
use spark_cluster::cli::{render, SparkClusterCli};
use spark_cluster::{EnvSource, K8Connector};

fn main() {
    fluvio_future::subscriber::init_logger();

    let cli = SparkClusterCli::parse();
    let api = ClusterApi::new(EnvSource, K8Connector);

    let response = run_block_on(cli.cmd.process(&api));
    match render(&response) {
        Ok(output) => println!("{output}"),
        Err(err) => eprintln!("unable to render response: {err:#}"),
    }

    if !response.is_success() {
        std::process::exit(1);
    }
}
