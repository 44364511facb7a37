use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use csrgraph::{Csr, Orientation, csr_dump, edge_list};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn cli() -> Command {
    let node_arg = Arg::new("node")
        .long("node")
        .short('i')
        .required(true)
        .value_parser(clap::value_parser!(u32))
        .help("Node id to look up");

    Command::new("csrgraph")
        .about("Build and query CSR adjacency structures from edge lists")
        .subcommand_required(true)
        .arg(
            Arg::new("edges")
                .long("edges")
                .short('e')
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Edge list file, one `source target` pair per line. Defaults to $DATA_DIR/edges.tsv"),
        )
        .arg(
            Arg::new("nodes")
                .long("nodes")
                .short('n')
                .global(true)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i32))
                .help("Number of nodes. Defaults to the largest id in the edge list + 1"),
        )
        .arg(
            Arg::new("reverse")
                .long("reverse")
                .short('r')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Group edges by target (incoming neighbors) instead of source"),
        )
        .subcommand(Command::new("stats").about("Print node, edge and degree statistics"))
        .subcommand(
            Command::new("neighbors")
                .about("List the neighbors of a node")
                .arg(node_arg.clone()),
        )
        .subcommand(
            Command::new("degree")
                .about("Print the number of neighbors of a node")
                .arg(node_arg),
        )
        .subcommand(
            Command::new("dump")
                .about("Build the CSR and write it as a binary dump")
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Destination file"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Load a binary dump and print its statistics")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Dump file written by `dump`"),
                ),
        )
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let matches = cli().get_matches();
    let stdout = io::stdout();
    run(&matches, &mut stdout.lock())
}

fn run(matches: &ArgMatches, out: &mut impl Write) -> Result<()> {
    match matches.subcommand() {
        Some(("stats", sub_m)) => handle_stats(&build_csr(sub_m)?, out),
        Some(("neighbors", sub_m)) => handle_neighbors(&build_csr(sub_m)?, sub_m, out),
        Some(("degree", sub_m)) => handle_degree(&build_csr(sub_m)?, sub_m, out),
        Some(("dump", sub_m)) => handle_dump(&build_csr(sub_m)?, sub_m, out),
        Some(("inspect", sub_m)) => handle_inspect(sub_m, out),
        _ => Err(anyhow!("No valid subcommand provided. Use --help for usage.")),
    }
}

fn edges_path(matches: &ArgMatches) -> PathBuf {
    match matches.get_one::<PathBuf>("edges") {
        Some(path) => path.clone(),
        None => {
            let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
            PathBuf::from(data_dir).join("edges.tsv")
        }
    }
}

fn build_csr(matches: &ArgMatches) -> Result<Csr> {
    let path = edges_path(matches);
    let start = Instant::now();

    let list = edge_list::load_edges(&path)
        .with_context(|| format!("Failed to read edge list {}", path.display()))?;
    let node_count = matches
        .get_one::<i32>("nodes")
        .copied()
        .unwrap_or_else(|| list.inferred_node_count());
    let orientation = Orientation::from_reverse(matches.get_flag("reverse"));

    let csr = Csr::new(Some(list.edges.as_slice()), node_count, orientation)
        .with_context(|| format!("Invalid edge list {}", path.display()))?;
    info!(
        path = %path.display(),
        nodes = csr.node_count(),
        edges = csr.edge_count(),
        "CSR ready in {:.2?}",
        start.elapsed()
    );
    Ok(csr)
}

fn lookup<'a>(csr: &'a Csr, matches: &ArgMatches) -> Result<(u32, &'a [u32])> {
    let node = *matches
        .get_one::<u32>("node")
        .context("missing --node")?;
    let run = csr.get(node).with_context(|| {
        format!(
            "Node {} is out of range, the graph has {} nodes",
            node,
            csr.node_count()
        )
    })?;
    Ok((node, run))
}

fn handle_stats(csr: &Csr, out: &mut impl Write) -> Result<()> {
    let direction = match csr.orientation() {
        Orientation::Forward => "forward (outgoing)",
        Orientation::Reverse => "reverse (incoming)",
    };
    writeln!(out, "orientation: {}", direction)?;
    writeln!(out, "nodes: {}", csr.node_count())?;
    writeln!(out, "edges: {}", csr.edge_count())?;
    writeln!(out, "max degree: {}", csr.max_degree())?;
    Ok(())
}

fn handle_neighbors(csr: &Csr, matches: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let (node, neighbors) = lookup(csr, matches)?;
    writeln!(out, "Found {} neighbors for node {}.", neighbors.len(), node)?;
    for neighbor in neighbors {
        writeln!(out, " - {}", neighbor)?;
    }
    Ok(())
}

fn handle_degree(csr: &Csr, matches: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let (_, neighbors) = lookup(csr, matches)?;
    writeln!(out, "{}", neighbors.len())?;
    Ok(())
}

fn handle_dump(csr: &Csr, matches: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let output = matches
        .get_one::<PathBuf>("output")
        .context("missing --output")?;
    csr_dump::save_csr(output, csr)
        .with_context(|| format!("Failed to write dump {}", output.display()))?;
    writeln!(out, "Successfully wrote CSR to {}", output.display())?;
    Ok(())
}

fn handle_inspect(matches: &ArgMatches, out: &mut impl Write) -> Result<()> {
    let input = matches
        .get_one::<PathBuf>("input")
        .context("missing --input")?;
    let csr = csr_dump::open_csr(input)
        .with_context(|| format!("Failed to load dump {}", input.display()))?;
    handle_stats(&csr, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn run_args(args: &[&str]) -> Result<String> {
        let matches = cli().try_get_matches_from(args)?;
        let mut out = Vec::new();
        run(&matches, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn edge_file(dir: &tempfile::TempDir, body: &str) -> String {
        let path = dir.path().join("edges.tsv");
        fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_stats_infers_node_count() {
        let dir = tempfile::tempdir().unwrap();
        let edges = edge_file(&dir, "0\t1\n0\t2\n2\t3\n");
        let output = run_args(&["csrgraph", "stats", "--edges", &edges]).unwrap();
        assert!(output.contains("nodes: 4"));
        assert!(output.contains("edges: 3"));
        assert!(output.contains("max degree: 2"));
        assert!(output.contains("forward"));
    }

    #[test]
    fn test_neighbors_forward_and_reverse() {
        let dir = tempfile::tempdir().unwrap();
        let edges = edge_file(&dir, "0\t1\n0\t2\n2\t3\n");

        let forward = run_args(&["csrgraph", "neighbors", "-e", &edges, "--node", "0"]).unwrap();
        assert!(forward.starts_with("Found 2 neighbors for node 0."));
        assert!(forward.contains(" - 1\n"));
        assert!(forward.contains(" - 2\n"));

        let reverse =
            run_args(&["csrgraph", "neighbors", "-e", &edges, "-r", "--node", "3"]).unwrap();
        assert_eq!(reverse, "Found 1 neighbors for node 3.\n - 2\n");
    }

    #[test]
    fn test_degree() {
        let dir = tempfile::tempdir().unwrap();
        let edges = edge_file(&dir, "0\t1\n0\t2\n2\t3\n");
        let output = run_args(&["csrgraph", "degree", "-e", &edges, "-i", "2"]).unwrap();
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_out_of_range_node_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let edges = edge_file(&dir, "0\t1\n");
        let err = run_args(&["csrgraph", "degree", "-e", &edges, "-i", "9"]).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_explicit_node_count_too_small() {
        let dir = tempfile::tempdir().unwrap();
        let edges = edge_file(&dir, "0\t1\n0\t2\n2\t3\n");
        let err = run_args(&["csrgraph", "stats", "-e", &edges, "-n", "2"]).unwrap_err();
        let kind = err.downcast_ref::<csrgraph::CsrError>();
        assert!(matches!(
            kind,
            Some(csrgraph::CsrError::NodeOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_negative_node_count() {
        let dir = tempfile::tempdir().unwrap();
        let edges = edge_file(&dir, "0\t1\n");
        let err = run_args(&["csrgraph", "stats", "-e", &edges, "-n", "-1"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<csrgraph::CsrError>(),
            Some(csrgraph::CsrError::InvalidNumNodes { node_count: -1 })
        ));
    }

    #[test]
    fn test_dump_then_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let edges = edge_file(&dir, "0\t1\n0\t2\n2\t3\n");
        let dump = dir.path().join("graph.csr");
        let dump = dump.to_string_lossy();

        let written = run_args(&["csrgraph", "dump", "-e", &edges, "-r", "-o", &dump]).unwrap();
        assert!(written.starts_with("Successfully wrote CSR"));

        let stats = run_args(&["csrgraph", "inspect", "--input", &dump]).unwrap();
        assert!(stats.contains("reverse"));
        assert!(stats.contains("nodes: 4"));
        assert!(stats.contains("edges: 3"));
    }

    #[test]
    fn test_missing_edge_file() {
        let err = run_args(&["csrgraph", "stats", "-e", "/no/such/edges.tsv"]).unwrap_err();
        assert!(err.to_string().contains("Failed to read edge list"));
    }
}
